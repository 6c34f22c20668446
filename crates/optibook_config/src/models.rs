// --- File: crates/optibook_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Clinic Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClinicConfig {
    #[serde(default = "default_clinic_name")]
    pub name: String,
    /// Shown to patients when online booking is refused by the store.
    #[serde(default = "default_clinic_phone")]
    pub phone: String,
    /// IANA zone name, e.g. "America/Chicago".
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_booking_horizon_months")]
    pub booking_horizon_months: u32,
    /// Weekdays that can never be booked ("Mon" .. "Sun").
    #[serde(default = "default_closed_days")]
    pub closed_days: Vec<String>,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            name: default_clinic_name(),
            phone: default_clinic_phone(),
            time_zone: default_time_zone(),
            booking_horizon_months: default_booking_horizon_months(),
            closed_days: default_closed_days(),
        }
    }
}

fn default_clinic_name() -> String {
    "GoTo Optical".to_string()
}
fn default_clinic_phone() -> String {
    "(214) 550-5005".to_string()
}
fn default_time_zone() -> String {
    "America/Chicago".to_string()
}
fn default_booking_horizon_months() -> u32 {
    2
}
fn default_closed_days() -> Vec<String> {
    vec!["Sun".to_string()]
}

// --- Business Hours Config ---
// Times are clinic wall-clock "HH:MM" strings; parsed and validated by the scheduling crate.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BusinessHoursConfig {
    #[serde(default = "default_morning_start")]
    pub morning_start: String,
    #[serde(default = "default_morning_last")]
    pub morning_last: String,
    #[serde(default = "default_afternoon_start")]
    pub afternoon_start: String,
    #[serde(default = "default_weekday_afternoon_last")]
    pub weekday_afternoon_last: String,
    #[serde(default = "default_saturday_afternoon_last")]
    pub saturday_afternoon_last: String,
    #[serde(default = "default_step_minutes")]
    pub step_minutes: i64,
}

impl Default for BusinessHoursConfig {
    fn default() -> Self {
        Self {
            morning_start: default_morning_start(),
            morning_last: default_morning_last(),
            afternoon_start: default_afternoon_start(),
            weekday_afternoon_last: default_weekday_afternoon_last(),
            saturday_afternoon_last: default_saturday_afternoon_last(),
            step_minutes: default_step_minutes(),
        }
    }
}

fn default_morning_start() -> String {
    "09:10".to_string()
}
fn default_morning_last() -> String {
    "13:10".to_string()
}
fn default_afternoon_start() -> String {
    "14:30".to_string()
}
fn default_weekday_afternoon_last() -> String {
    "17:30".to_string()
}
fn default_saturday_afternoon_last() -> String {
    "16:30".to_string()
}
fn default_step_minutes() -> i64 {
    20
}

// --- Appointment Store Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Hosted PostgREST endpoint (Supabase).
    Supabase,
    /// sqlx connection pool, `url` is the database URL.
    Sql,
    /// Process-local store, nothing survives a restart.
    Memory,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    #[serde(default)]
    pub url: String,
    // Usually "secret_from_env" -> STORE_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "appointments".to_string()
}

// --- Email Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct EmailConfig {
    // Usually "secret_from_env" -> EMAIL_API_KEY
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_from() -> String {
    "GoTo Optical <onboarding@resend.dev>".to_string()
}
fn default_admin_email() -> String {
    "info@gotooptical.com".to_string()
}
fn default_api_base() -> String {
    "https://api.resend.com".to_string()
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_store: bool,
    #[serde(default)]
    pub use_email: bool,

    #[serde(default)]
    pub clinic: ClinicConfig,
    #[serde(default)]
    pub business_hours: BusinessHoursConfig,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

impl AppConfig {
    /// A config with every optional section at its default, useful for tests and demo mode.
    pub fn with_server(host: &str, port: u16) -> Self {
        Self {
            server: ServerConfig {
                host: host.to_string(),
                port,
            },
            use_store: false,
            use_email: false,
            clinic: ClinicConfig::default(),
            business_hours: BusinessHoursConfig::default(),
            store: None,
            email: None,
            logging: None,
        }
    }
}
