//! Appointment store adapters.
//!
//! Three implementations of [`optibook_common::AppointmentStore`]: a PostgREST
//! (Supabase) client, a sqlx pool for SQLite or PostgreSQL, and a process-local
//! fallback. [`store_from_config`] picks one from the `[store]` section.

pub mod client;
pub mod error;
pub mod memory;
pub mod sql;
pub mod supabase;

pub use client::DbClient;
pub use error::DbError;
pub use memory::InMemoryAppointmentStore;
pub use sql::SqlAppointmentStore;
pub use supabase::SupabaseAppointmentStore;

use optibook_common::{AppointmentStore, StoreError};
use optibook_config::{StoreBackend, StoreConfig};
use std::sync::Arc;
use tracing::info;

/// Builds the store selected by `config.backend`. The SQL backend creates its table.
pub async fn store_from_config(
    config: &StoreConfig,
) -> Result<Arc<dyn AppointmentStore>, StoreError> {
    match config.backend {
        StoreBackend::Supabase => {
            info!("Using Supabase appointment store at {}", config.url);
            Ok(Arc::new(SupabaseAppointmentStore::from_config(config)?))
        }
        StoreBackend::Sql => {
            let client = DbClient::from_config(config).await?;
            let store = SqlAppointmentStore::new(client, &config.table)?;
            store.init_schema().await?;
            info!("Using SQL appointment store (table {})", config.table);
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("Using in-memory appointment store");
            Ok(Arc::new(InMemoryAppointmentStore::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn config(backend: StoreBackend, url: &str) -> StoreConfig {
        StoreConfig {
            backend,
            url: url.to_string(),
            api_key: None,
            table: "appointments".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sql_backend_is_ready_to_query() {
        let store = store_from_config(&config(StoreBackend::Sql, "sqlite::memory:"))
            .await
            .unwrap();
        let rows = store
            .reserved_starts(
                Utc.with_ymd_and_hms(2025, 8, 25, 5, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2025, 8, 26, 5, 0, 0).unwrap(),
            )
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn test_sql_backend_without_url_is_not_configured() {
        let err = store_from_config(&config(StoreBackend::Sql, ""))
            .await
            .err()
            .unwrap();
        assert_eq!(err, StoreError::NotConfigured);
    }

    #[tokio::test]
    async fn test_supabase_backend_without_key_is_not_configured() {
        let err = store_from_config(&config(StoreBackend::Supabase, "https://x.supabase.co"))
            .await
            .err()
            .unwrap();
        assert_eq!(err, StoreError::NotConfigured);
    }
}
