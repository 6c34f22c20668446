use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use tracing::warn;
pub mod models;
pub use models::*;

/// Marker value replaced by an environment variable named after the value's path.
pub const SECRET_MARKER: &str = "secret_from_env";

/// Loads the layered configuration: `config/default`, `config/{RUN_ENV}`, then
/// `{PREFIX}__SECTION__KEY` environment variables, then `secret_from_env` markers.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "OPTIBOOK".to_string());
    let config_dir = PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator("__")
                .try_parsing(true),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Recursively replaces all "secret_from_env" string values with environment variable values
fn inject_env_secrets(value: &mut Value) {
    fn walk(path: Vec<String>, obj: &mut Value) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v);
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let env_key = path.join("_").to_uppercase();
                match std::env::var(&env_key) {
                    Ok(env_val) => *obj = Value::String(env_val),
                    Err(_) => warn!("env var {} not found for {}", env_key, SECRET_MARKER),
                }
            }
            _ => {}
        }
    }

    walk(vec![], value);
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("failed to serialize config: {err}")))?;
    inject_env_secrets(&mut json);
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("failed to rebuild config: {err}")))
}

/// Returns true when a configured secret is present and was actually resolved.
pub fn is_secret_set(value: Option<&String>) -> bool {
    value.is_some_and(|v| !v.is_empty() && v != SECRET_MARKER)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process and returns the path that was used.
///
/// `DOTENV_OVERRIDE` wins, then a first CLI argument starting with `.env`, then `.env`.
/// A missing file is not an error.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = std::env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_is_replaced_from_environment() {
        std::env::set_var("EMAIL_API_KEY", "re_test_key");
        let mut config = AppConfig::with_server("127.0.0.1", 8080);
        config.email = Some(EmailConfig {
            api_key: Some(SECRET_MARKER.to_string()),
            from: "Clinic <noreply@example.com>".to_string(),
            admin_email: "front-desk@example.com".to_string(),
            api_base: "https://api.resend.com".to_string(),
        });

        let resolved = apply_env_overrides_from_marker(config).unwrap();
        let email = resolved.email.unwrap();
        assert_eq!(email.api_key.as_deref(), Some("re_test_key"));
        assert_eq!(email.admin_email, "front-desk@example.com");
    }

    #[test]
    fn test_missing_secret_keeps_marker_and_counts_as_unset() {
        let mut config = AppConfig::with_server("127.0.0.1", 8080);
        config.store = Some(StoreConfig {
            backend: StoreBackend::Supabase,
            url: "https://example.supabase.co".to_string(),
            api_key: Some(SECRET_MARKER.to_string()),
            table: "appointments".to_string(),
        });
        // STORE_API_KEY is never set by the test suite
        let resolved = apply_env_overrides_from_marker(config).unwrap();
        let store = resolved.store.unwrap();
        assert_eq!(store.api_key.as_deref(), Some(SECRET_MARKER));
        assert!(!is_secret_set(store.api_key.as_ref()));
    }

    #[test]
    fn test_defaults_match_clinic_hours() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "server": { "host": "0.0.0.0", "port": 3000 } }"#).unwrap();
        assert_eq!(config.clinic.time_zone, "America/Chicago");
        assert_eq!(config.clinic.booking_horizon_months, 2);
        assert_eq!(config.clinic.closed_days, vec!["Sun".to_string()]);
        assert_eq!(config.business_hours.morning_start, "09:10");
        assert_eq!(config.business_hours.saturday_afternoon_last, "16:30");
        assert_eq!(config.business_hours.step_minutes, 20);
        assert!(!config.use_store);
        assert!(config.store.is_none());
    }

    #[test]
    fn test_store_backend_is_lowercase() {
        let store: StoreConfig =
            serde_json::from_str(r#"{ "backend": "sql", "url": "sqlite://data/optibook.db" }"#)
                .unwrap();
        assert_eq!(store.backend, StoreBackend::Sql);
        assert_eq!(store.table, "appointments");
    }
}
