//! SQL implementation of the appointment store.
//!
//! Instants are stored as UTC text (`YYYY-MM-DDTHH:MM:SSZ`), which sorts the same
//! way the instants do, so day ranges are plain text comparisons.

use crate::client::DbClient;
use crate::error::DbError;
use chrono::{DateTime, Utc};
use optibook_common::{
    AppointmentRequest, AppointmentStore, BoxFuture, ReservedStart, StoreError, StoredAppointment,
};
use sqlx::Row;
use tracing::{debug, error, info};

const STORED_INSTANT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.format(STORED_INSTANT_FORMAT).to_string()
}

fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

#[derive(Debug, Clone)]
pub struct SqlAppointmentStore {
    db_client: DbClient,
    table: String,
}

impl SqlAppointmentStore {
    /// `table` is interpolated into SQL and must be a plain identifier.
    pub fn new(db_client: DbClient, table: &str) -> Result<Self, DbError> {
        if !is_valid_identifier(table) {
            return Err(DbError::ConfigError(format!(
                "Invalid appointments table name: {:?}",
                table
            )));
        }
        Ok(Self {
            db_client,
            table: table.to_string(),
        })
    }

    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing appointment schema in {}", self.table);

        let create_table = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                customer_email TEXT NOT NULL,
                customer_name TEXT,
                service TEXT,
                starts_at TEXT NOT NULL,
                notes TEXT,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            table = self.table
        );
        self.db_client.execute(&create_table).await?;

        let create_index = format!(
            "CREATE INDEX IF NOT EXISTS {table}_starts_at_idx ON {table} (starts_at)",
            table = self.table
        );
        self.db_client.execute(&create_index).await?;

        info!("Appointment schema initialized successfully");
        Ok(())
    }

    async fn insert(&self, request: AppointmentRequest) -> Result<StoredAppointment, DbError> {
        let id = uuid::Uuid::new_v4().to_string();
        debug!("Inserting appointment {}", id);

        let query = format!(
            r#"
            INSERT INTO {table} (id, customer_email, customer_name, service, starts_at, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, customer_email, customer_name, service, starts_at, notes
            "#,
            table = self.table
        );

        let row = sqlx::query(&query)
            .bind(&id)
            .bind(&request.customer_email)
            .bind(request.customer_name.as_deref())
            .bind(request.service.as_deref())
            .bind(format_instant(&request.starts_at))
            .bind(request.notes.as_deref())
            .fetch_one(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to insert appointment: {}", e);
                DbError::from_query(e)
            })?;

        let starts_at: String = row.try_get("starts_at")?;
        let starts_at = DateTime::parse_from_rfc3339(&starts_at)
            .map_err(|e| DbError::QueryError(format!("stored starts_at {:?}: {}", starts_at, e)))?
            .with_timezone(&Utc);

        Ok(StoredAppointment {
            id: row.try_get("id")?,
            customer_email: row.try_get("customer_email")?,
            customer_name: row.try_get("customer_name")?,
            service: row.try_get("service")?,
            starts_at,
            notes: row.try_get("notes")?,
        })
    }

    async fn starts_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ReservedStart>, DbError> {
        let query = format!(
            r#"
            SELECT starts_at FROM {table}
            WHERE starts_at >= $1 AND starts_at < $2
            ORDER BY starts_at
            "#,
            table = self.table
        );

        let rows = sqlx::query(&query)
            .bind(format_instant(&start))
            .bind(format_instant(&end))
            .fetch_all(self.db_client.pool())
            .await
            .map_err(|e| {
                error!("Failed to query appointments: {}", e);
                DbError::from_query(e)
            })?;

        rows.into_iter()
            .map(|row| {
                Ok(ReservedStart {
                    starts_at: row.try_get("starts_at")?,
                })
            })
            .collect()
    }
}

impl AppointmentStore for SqlAppointmentStore {
    fn insert_appointment(
        &self,
        request: AppointmentRequest,
    ) -> BoxFuture<'_, StoredAppointment, StoreError> {
        Box::pin(async move { self.insert(request).await.map_err(StoreError::from) })
    }

    fn reserved_starts(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<ReservedStart>, StoreError> {
        Box::pin(async move {
            self.starts_between(start, end)
                .await
                .map_err(StoreError::from)
        })
    }
}
