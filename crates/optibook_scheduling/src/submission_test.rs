#[cfg(test)]
mod tests {
    use crate::mock::{MockNotifier, MockStore};
    use crate::submission::{
        build_email_data, build_notes, build_request, customer_name, submit_booking,
        BookingSelection, ContactForm, SubmissionError, GENERIC_FAILURE_MESSAGE,
    };
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::Chicago;
    use optibook_common::{PatientType, ServiceType, StoreError};

    const PHONE: &str = "(214) 550-5005";

    fn form() -> ContactForm {
        ContactForm {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "214-555-0100".to_string(),
            date_of_birth: "1990-12-10".to_string(),
            consent: true,
            ..ContactForm::default()
        }
    }

    fn selection() -> BookingSelection {
        BookingSelection {
            patient_type: PatientType::New,
            service: ServiceType::GeneralOptometry,
            starts_at: Some(Chicago.with_ymd_and_hms(2025, 8, 25, 10, 10, 0).unwrap()),
        }
    }

    #[test]
    fn test_notes_include_only_supplied_parts() {
        let mut form = form();
        assert_eq!(
            build_notes(&form).as_deref(),
            Some("Phone: 214-555-0100 | Date of birth: 1990-12-10")
        );

        form.reason_for_visit = Some("Blurry vision".to_string());
        form.insurance = Some(true);
        form.referral_source = Some("  ".to_string());
        form.notes = Some("Prefers mornings".to_string());
        assert_eq!(
            build_notes(&form).as_deref(),
            Some(
                "Reason for visit: Blurry vision | Phone: 214-555-0100 | \
                 Date of birth: 1990-12-10 | Insurance: Yes | Notes: Prefers mornings"
            )
        );

        let empty = ContactForm {
            email: "x@example.com".to_string(),
            ..ContactForm::default()
        };
        assert_eq!(build_notes(&empty), None);
    }

    #[test]
    fn test_customer_name_joins_present_parts() {
        let mut form = form();
        assert_eq!(customer_name(&form).as_deref(), Some("Ada Lovelace"));
        form.last_name = " ".to_string();
        assert_eq!(customer_name(&form).as_deref(), Some("Ada"));
        form.first_name.clear();
        assert_eq!(customer_name(&form), None);
    }

    #[test]
    fn test_request_uses_absolute_instant() {
        let request = build_request(
            ServiceType::ContactLensFitting,
            Chicago.with_ymd_and_hms(2025, 8, 25, 10, 10, 0).unwrap(),
            &form(),
        );
        assert_eq!(
            request.starts_at,
            Utc.with_ymd_and_hms(2025, 8, 25, 15, 10, 0).unwrap()
        );
        assert_eq!(request.service.as_deref(), Some("Contact Lens Fitting"));
        assert_eq!(request.customer_email, "ada@example.com");
    }

    #[test]
    fn test_email_data_is_rendered_in_clinic_time() {
        let mut form = form();
        form.insurance = Some(false);
        let data = build_email_data(
            PatientType::Current,
            ServiceType::GeneralOptometry,
            Chicago.with_ymd_and_hms(2025, 8, 25, 14, 30, 0).unwrap(),
            &form,
        );
        assert_eq!(data.appointment_date, "Monday, August 25, 2025");
        assert_eq!(data.appointment_time, "2:30 PM");
        assert_eq!(data.customer_info.insurance.as_deref(), Some("No"));
        assert_eq!(data.customer_info.reason_for_visit, None);
    }

    #[tokio::test]
    async fn test_empty_email_never_reaches_collaborators() {
        let store = MockStore::default();
        let notifier = MockNotifier::default();
        let mut form = form();
        form.email = "   ".to_string();

        let err = submit_booking(&store, &notifier, PHONE, &selection(), &form)
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("email"));
        assert_eq!(store.insert_count(), 0);
        assert_eq!(notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_consent_or_time_is_rejected() {
        let store = MockStore::default();
        let notifier = MockNotifier::default();

        let mut no_consent = form();
        no_consent.consent = false;
        let err = submit_booking(&store, &notifier, PHONE, &selection(), &no_consent)
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("consent"));

        let mut no_time = selection();
        no_time.starts_at = None;
        let err = submit_booking(&store, &notifier, PHONE, &no_time, &form())
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("appointment_time"));
        assert_eq!(store.insert_count(), 0);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_booking() {
        let store = MockStore::default();
        let notifier = MockNotifier::failing();

        let outcome = submit_booking(&store, &notifier, PHONE, &selection(), &form())
            .await
            .unwrap();
        assert!(!outcome.notification_sent);
        assert_eq!(outcome.appointment.id, "apt-1");
        assert_eq!(store.insert_count(), 1);
        assert_eq!(notifier.sent_count(), 1);
    }

    #[tokio::test]
    async fn test_policy_rejection_asks_to_call_and_skips_notification() {
        let store = MockStore::failing_inserts(StoreError::PolicyRejected(
            "new row violates row-level security policy".to_string(),
        ));
        let notifier = MockNotifier::default();

        let err = submit_booking(&store, &notifier, PHONE, &selection(), &form())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Booking system temporarily unavailable. Please call us at (214) 550-5005 to book your appointment."
        );
        assert_ne!(err.to_string(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(notifier.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_other_store_failure_is_generic_and_retryable() {
        let store = MockStore::failing_inserts(StoreError::Request("timeout".to_string()));
        let notifier = MockNotifier::default();

        let err = submit_booking(&store, &notifier, PHONE, &selection(), &form())
            .await
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Retryable(_)));
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
        assert_eq!(notifier.sent_count(), 0);
    }
}
