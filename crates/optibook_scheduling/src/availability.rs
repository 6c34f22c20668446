// --- File: crates/optibook_scheduling/src/availability.rs ---
//! Availability Resolver.
//!
//! Decides which dates can be booked, reads existing reservations for one day and marks
//! generated slots as booked by comparing clinic wall-clock "HH:MM" keys.
//!
//! Reads fail open: if the store cannot be queried the day is shown as fully available.
//! Writes (see `submission`) fail loud.

use crate::schedule::ClinicSchedule;
use crate::slots::{generate_slots, TimeSlot};
use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;
use optibook_common::{AppointmentStore, ReservedStart};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Last bookable date: `today` plus the horizon in calendar months.
pub fn horizon_end(today: NaiveDate, horizon_months: u32) -> NaiveDate {
    today
        .checked_add_months(Months::new(horizon_months))
        .unwrap_or(NaiveDate::MAX)
}

/// A date can be booked iff `today <= date <= today + horizon` and the clinic is open
/// that weekday.
pub fn is_date_selectable(
    date: NaiveDate,
    today: NaiveDate,
    horizon_months: u32,
    closed_days: &[Weekday],
) -> bool {
    date >= today
        && date <= horizon_end(today, horizon_months)
        && !closed_days.contains(&date.weekday())
}

/// Every selectable date from `today` through the horizon, ascending.
pub fn bookable_dates(today: NaiveDate, horizon_months: u32, closed_days: &[Weekday]) -> Vec<NaiveDate> {
    let end = horizon_end(today, horizon_months);
    today
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| !closed_days.contains(&day.weekday()))
        .collect()
}

/// First instant of `date` in `tz`.
///
/// Where local midnight does not exist the day starts at the first valid quarter hour.
fn local_day_start(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=16)
        .map(|quarter| midnight + Duration::minutes(15 * quarter))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Half-open UTC range `[start of date, start of next date)` in the clinic zone.
pub fn day_bounds(date: NaiveDate, tz: Tz) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_day_start(date, tz);
    let end = date
        .succ_opt()
        .map(|next| local_day_start(next, tz))
        .unwrap_or(start + Duration::days(1));
    (start, end)
}

/// Clinic wall-clock "HH:MM" of an instant.
pub fn wall_clock_key(instant: &DateTime<Tz>) -> String {
    instant.format("%H:%M").to_string()
}

/// Reads a stored `starts_at` back as clinic wall-clock time.
///
/// Values with an offset (`Z`, `+00:00`, `+00`) are converted to the clinic zone.
/// Values without one are already clinic wall-clock time. Returns `None` for
/// anything else.
pub fn normalize_reserved_start(raw: &str, tz: Tz) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz).naive_local());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&tz).naive_local());
        }
    }
    for format in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive);
        }
    }
    None
}

/// Wall-clock keys of the reservations that fall on `date`.
pub fn booked_start_times(date: NaiveDate, reserved: &[ReservedStart], tz: Tz) -> HashSet<String> {
    reserved
        .iter()
        .filter_map(|row| {
            let local = normalize_reserved_start(&row.starts_at, tz);
            if local.is_none() {
                warn!("Skipping reservation with unreadable starts_at: {:?}", row.starts_at);
            }
            local
        })
        .filter(|local| local.date() == date)
        .map(|local| local.format("%H:%M").to_string())
        .collect()
}

/// Queries the store for `date` and returns the booked wall-clock keys.
///
/// Never fails: a store error is logged and yields an empty set.
pub async fn fetch_booked_start_times(
    store: &dyn AppointmentStore,
    date: NaiveDate,
    schedule: &ClinicSchedule,
) -> HashSet<String> {
    let (start, end) = day_bounds(date, schedule.tz);
    match store.reserved_starts(start, end).await {
        Ok(rows) => {
            let booked = booked_start_times(date, &rows, schedule.tz);
            debug!("{} booked slot(s) on {}", booked.len(), date);
            booked
        }
        Err(e) => {
            warn!(
                "Could not load reservations for {}, showing all slots as available: {}",
                date, e
            );
            HashSet::new()
        }
    }
}

/// Generated slots for `date`, each marked booked iff its key is in `booked`.
pub fn resolve_slots(date: NaiveDate, schedule: &ClinicSchedule, booked: &HashSet<String>) -> Vec<TimeSlot> {
    generate_slots(date, &schedule.hours, schedule.tz)
        .into_iter()
        .map(|starts_at| {
            let is_booked = booked.contains(&wall_clock_key(&starts_at));
            TimeSlot {
                starts_at,
                is_booked,
            }
        })
        .collect()
}
