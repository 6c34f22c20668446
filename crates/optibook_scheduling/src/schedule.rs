// --- File: crates/optibook_scheduling/src/schedule.rs ---
use crate::slots::BusinessHours;
use chrono::{NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use optibook_common::{config_error, OptibookError};
use optibook_config::AppConfig;

/// Everything needed to decide which days and times can be booked.
#[derive(Debug, Clone)]
pub struct ClinicSchedule {
    pub tz: Tz,
    pub hours: BusinessHours,
    pub horizon_months: u32,
    pub closed_days: Vec<Weekday>,
    /// Shown to patients when online booking is refused.
    pub phone: String,
}

impl ClinicSchedule {
    /// Builds and validates the schedule from the `clinic` and `business_hours` sections.
    pub fn from_config(config: &AppConfig) -> Result<Self, OptibookError> {
        let clinic = &config.clinic;
        let tz: Tz = clinic
            .time_zone
            .parse()
            .map_err(|_| config_error(format!("Unknown clinic time zone: {}", clinic.time_zone)))?;

        let closed_days = clinic
            .closed_days
            .iter()
            .map(|day| {
                day.parse::<Weekday>()
                    .map_err(|_| config_error(format!("Unknown weekday in closed_days: {}", day)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            tz,
            hours: BusinessHours::from_config(&config.business_hours)?,
            horizon_months: clinic.booking_horizon_months,
            closed_days,
            phone: clinic.phone.clone(),
        })
    }

    /// Current calendar date in the clinic's time zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

impl Default for ClinicSchedule {
    fn default() -> Self {
        Self {
            tz: chrono_tz::America::Chicago,
            hours: BusinessHours::default(),
            horizon_months: 2,
            closed_days: vec![Weekday::Sun],
            phone: "(214) 550-5005".to_string(),
        }
    }
}
