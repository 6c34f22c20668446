//! Runtime feature switches.
//!
//! The store and the email provider are each turned on by a `use_*` flag plus a
//! matching config section. With either missing the backend falls back to the
//! in-memory store or log-only notifications.

use optibook_config::AppConfig;
use std::sync::Arc;

/// A feature is enabled only when its flag is set and its section is present.
pub fn is_feature_enabled<T>(use_feature: bool, feature_config: Option<&T>) -> bool {
    use_feature && feature_config.is_some()
}

pub fn is_store_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config.use_store, config.store.as_ref())
}

pub fn is_email_enabled(config: &Arc<AppConfig>) -> bool {
    is_feature_enabled(config.use_email, config.email.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use optibook_config::{StoreBackend, StoreConfig};

    #[test]
    fn test_flag_without_section_is_disabled() {
        let mut config = AppConfig::with_server("127.0.0.1", 8080);
        config.use_store = true;
        assert!(!is_store_enabled(&Arc::new(config)));
    }

    #[test]
    fn test_section_without_flag_is_disabled() {
        let mut config = AppConfig::with_server("127.0.0.1", 8080);
        config.store = Some(StoreConfig {
            backend: StoreBackend::Memory,
            url: String::new(),
            api_key: None,
            table: "appointments".to_string(),
        });
        let config = Arc::new(config);
        assert!(!is_store_enabled(&config));
        assert!(!is_email_enabled(&config));
    }
}
