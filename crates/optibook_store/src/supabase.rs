//! PostgREST (Supabase) implementation of the appointment store.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use optibook_common::{
    AppointmentRequest, AppointmentStore, BoxFuture, ReservedStart, StoreError, StoredAppointment,
    HTTP_CLIENT,
};
use optibook_config::StoreConfig;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, error, warn};

/// Error body returned by PostgREST.
#[derive(Deserialize, Debug, Default)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Row returned with `Prefer: return=representation`.
#[derive(Deserialize, Debug)]
struct AppointmentRow {
    // bigint or uuid depending on the table definition
    id: serde_json::Value,
    customer_email: String,
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    service: Option<String>,
    starts_at: String,
    #[serde(default)]
    notes: Option<String>,
}

impl TryFrom<AppointmentRow> for StoredAppointment {
    type Error = StoreError;

    fn try_from(row: AppointmentRow) -> Result<Self, Self::Error> {
        let id = match row.id {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(StoreError::InvalidRecord(format!(
                    "unexpected id value {}",
                    other
                )))
            }
        };
        Ok(StoredAppointment {
            id,
            customer_email: row.customer_email,
            customer_name: row.customer_name,
            service: row.service,
            starts_at: parse_instant(&row.starts_at)?,
            notes: row.notes,
        })
    }
}

/// `timestamptz` columns carry an offset; plain `timestamp` columns are UTC.
fn parse_instant(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::InvalidRecord(format!("starts_at {:?}: {}", raw, e)))
}

/// Maps a non-success response to a [`StoreError`].
///
/// 401/403 mean the key may not write the table at all, which is a policy refusal
/// just like an explicit row-level security error.
pub fn classify_error(status: StatusCode, body: &str) -> StoreError {
    let parsed: PostgrestError = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), body));
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return StoreError::PolicyRejected(message);
    }
    StoreError::from_backend(parsed.code.as_deref(), message)
}

/// Rewrites a readable `starts_at` as an explicit UTC instant. Unreadable values pass through.
fn with_utc_offset(row: ReservedStart) -> ReservedStart {
    match parse_instant(&row.starts_at) {
        Ok(instant) => ReservedStart {
            starts_at: format_bound(&instant),
        },
        Err(_) => row,
    }
}

fn parse_rows<T: for<'de> Deserialize<'de>>(body: &str) -> Result<Vec<T>, StoreError> {
    serde_json::from_str(body).map_err(|e| StoreError::InvalidRecord(e.to_string()))
}

fn format_bound(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone)]
pub struct SupabaseAppointmentStore {
    base_url: String,
    api_key: String,
    table: String,
    client: Client,
}

impl SupabaseAppointmentStore {
    pub fn new(base_url: &str, api_key: &str, table: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            table: table.to_string(),
            client: HTTP_CLIENT.clone(),
        }
    }

    /// Requires `url` and `api_key`; the table defaults to `appointments`.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(StoreError::NotConfigured)?;
        if config.url.is_empty() {
            return Err(StoreError::NotConfigured);
        }
        Ok(Self::new(&config.url, api_key, &config.table))
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn read_body(response: reqwest::Response) -> Result<(StatusCode, String), StoreError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        Ok((status, body))
    }

    async fn insert(&self, request: AppointmentRequest) -> Result<StoredAppointment, StoreError> {
        debug!("Inserting appointment into {}", self.table);
        let response = self
            .authorized(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Appointment insert request failed: {}", e);
                StoreError::Request(e.to_string())
            })?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            let err = classify_error(status, &body);
            warn!("Appointment insert rejected ({}): {}", status, err);
            return Err(err);
        }

        parse_rows::<AppointmentRow>(&body)?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::InvalidRecord("insert returned no rows".to_string()))?
            .try_into()
    }

    async fn starts_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ReservedStart>, StoreError> {
        let params = [
            ("select", "starts_at".to_string()),
            ("starts_at", format!("gte.{}", format_bound(&start))),
            ("starts_at", format!("lt.{}", format_bound(&end))),
            ("order", "starts_at.asc".to_string()),
        ];
        let query = serde_urlencoded::to_string(params)
            .map_err(|e| StoreError::Request(format!("Failed to encode query: {}", e)))?;
        let url = format!("{}?{}", self.table_url(), query);

        let response = self
            .authorized(self.client.get(url))
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        let (status, body) = Self::read_body(response).await?;
        if !status.is_success() {
            return Err(classify_error(status, &body));
        }
        Ok(parse_rows::<ReservedStart>(&body)?
            .into_iter()
            .map(with_utc_offset)
            .collect())
    }
}

impl AppointmentStore for SupabaseAppointmentStore {
    fn insert_appointment(
        &self,
        request: AppointmentRequest,
    ) -> BoxFuture<'_, StoredAppointment, StoreError> {
        Box::pin(self.insert(request))
    }

    fn reserved_starts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<ReservedStart>, StoreError> {
        Box::pin(self.starts_between(start, end))
    }
}
