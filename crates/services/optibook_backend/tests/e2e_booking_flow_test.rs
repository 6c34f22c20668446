mod fixtures;

use chrono::{TimeZone, Timelike};
use fixtures::{demo_config, spawn_server, upcoming_weekday};
use optibook_common::{NotificationService, PatientType, ServiceType};
use optibook_config::EmailConfig;
use optibook_notify::HttpBookingNotifier;
use optibook_scheduling::{BookingFlow, BookingStep, ContactForm};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn contact(email: &str) -> ContactForm {
    ContactForm {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        phone: "214-555-0100".to_string(),
        date_of_birth: "1990-12-10".to_string(),
        insurance: Some(true),
        reason_for_visit: Some("Blurry vision".to_string()),
        consent: true,
        ..ContactForm::default()
    }
}

async fn get_json(client: &reqwest::Client, url: String) -> (u16, Value) {
    let response = client.get(url).send().await.unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

#[tokio::test]
async fn test_server_routes_are_mounted_under_api() {
    let server = spawn_server(demo_config()).await;
    let client = reqwest::Client::new();

    let welcome = client.get(server.url("/api/")).send().await.unwrap();
    assert_eq!(welcome.status().as_u16(), 200);
    assert_eq!(welcome.text().await.unwrap(), optibook_backend::WELCOME_MESSAGE);

    let (status, health) = get_json(&client, server.url("/api/health")).await;
    assert_eq!(status, 200);
    assert_eq!(health, json!({ "status": "ok" }));

    let (status, env) = get_json(&client, server.url("/api/test")).await;
    assert_eq!(status, 200);
    assert_eq!(env["env"]["hasResendKey"], false);
}

#[tokio::test]
async fn test_booked_slot_is_blocked_for_the_next_visitor() {
    let server = spawn_server(demo_config()).await;
    let client = reqwest::Client::new();
    let date = upcoming_weekday(server.state.schedule.today());
    let date_str = date.format("%Y-%m-%d").to_string();

    let (status, slots) =
        get_json(&client, server.url(&format!("/api/slots?date={}", date_str))).await;
    assert_eq!(status, 200);
    let slots = slots["slots"].as_array().unwrap().clone();
    assert_eq!(slots.len(), 23);
    assert!(slots.iter().all(|s| s["is_booked"] == false));

    let response = client
        .post(server.url("/api/appointments"))
        .json(&json!({
            "patient_type": "new",
            "service": "general",
            "date": date_str,
            "time": "10:10",
            "contact": contact("ada@example.com")
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["notification_sent"], true);

    let (_, slots) =
        get_json(&client, server.url(&format!("/api/slots?date={}", date_str))).await;
    let booked: Vec<&str> = slots["slots"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["is_booked"] == true)
        .map(|s| s["time"].as_str().unwrap())
        .collect();
    assert_eq!(booked, vec!["10:10"]);

    let response = client
        .post(server.url("/api/appointments"))
        .json(&json!({
            "patient_type": "existing",
            "service": "general",
            "date": date_str,
            "time": "10:10",
            "contact": contact("grace@example.com")
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["field"], "time");
}

#[tokio::test]
async fn test_widget_flow_against_running_backend() {
    let server = spawn_server(demo_config()).await;
    let store = server.state.service_factory.appointment_store();
    let notifier: Arc<dyn NotificationService> =
        Arc::new(HttpBookingNotifier::new(server.url("/api/send-email")));
    let schedule = server.state.schedule.clone();
    let date = upcoming_weekday(schedule.today());

    let mut flow = BookingFlow::new(store.clone(), notifier, schedule.clone());
    flow.open();
    flow.choose_patient_type(PatientType::New).unwrap();
    flow.choose_service(ServiceType::GeneralOptometry).unwrap();

    let slots = flow.select_date(date).await.unwrap();
    assert!(slots.iter().all(|s| !s.is_booked));
    assert_eq!(slots.first().unwrap().label(), "9:10 AM");
    assert_eq!(slots.last().unwrap().label(), "5:30 PM");

    let ten_ten = slots
        .iter()
        .find(|s| s.starts_at.hour() == 10 && s.starts_at.minute() == 10)
        .unwrap()
        .starts_at;
    flow.choose_slot(ten_ten).unwrap();
    assert_eq!(flow.state().step, BookingStep::FinishScheduling);

    let outcome = flow.submit(&contact("ada@example.com")).await.unwrap();
    assert!(outcome.notification_sent);
    assert!(!flow.is_open());

    let expected = schedule
        .tz
        .from_local_datetime(&date.and_hms_opt(10, 10, 0).unwrap())
        .single()
        .unwrap();
    assert_eq!(outcome.appointment.starts_at, expected);

    // Reopening starts over, and the slot now shows as taken
    flow.open();
    assert_eq!(flow.state().step, BookingStep::PatientType);
    flow.choose_patient_type(PatientType::Current).unwrap();
    flow.choose_service(ServiceType::ContactLensFitting).unwrap();
    let slots = flow.select_date(date).await.unwrap();
    let booked: Vec<String> = slots
        .iter()
        .filter(|s| s.is_booked)
        .map(|s| s.wall_clock_key())
        .collect();
    assert_eq!(booked, vec!["10:10".to_string()]);
}

#[tokio::test]
async fn test_send_email_relays_to_provider() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "email-777" })))
        .expect(1)
        .mount(&provider)
        .await;

    let mut config = demo_config();
    config.use_email = true;
    config.email = Some(EmailConfig {
        api_key: Some("re_test".to_string()),
        from: "GoTo Optical <onboarding@resend.dev>".to_string(),
        admin_email: "info@gotooptical.com".to_string(),
        api_base: provider.uri(),
    });
    let server = spawn_server(config).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/send-email"))
        .json(&json!({
            "bookingData": {
                "patientType": "current",
                "appointmentType": "contact-lens",
                "appointmentDate": "Monday, August 25, 2025",
                "appointmentTime": "10:10 AM",
                "customerInfo": {
                    "firstName": "Ada",
                    "lastName": "Lovelace",
                    "email": "ada@example.com",
                    "phone": "214-555-0100",
                    "dateOfBirth": "1990-12-10"
                }
            }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["emailId"], "email-777");
    assert_eq!(body["data"]["patient"], "Ada Lovelace");
}
