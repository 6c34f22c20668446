// --- File: crates/optibook_scheduling/src/slots.rs ---
//! Slot Generator.
//!
//! Turns a calendar date and the clinic's business hours into the ordered list of
//! appointment start times for that day. Reservation data plays no part here; see
//! `availability` for marking slots as booked.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;
use optibook_common::{config_error, OptibookError};
use optibook_config::BusinessHoursConfig;
use serde::Serialize;

/// Wall-clock time from hours and minutes; wraps past midnight instead of failing.
pub(crate) fn hm(hours: i64, minutes: i64) -> NaiveTime {
    NaiveTime::MIN + Duration::minutes(hours * 60 + minutes)
}

/// Morning and afternoon blocks with an explicit Saturday cutoff.
///
/// Invariant: `morning_start <= morning_last < afternoon_start <= min(afternoon cutoffs)`
/// and `step > 0`. Only constructible through [`BusinessHours::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessHours {
    morning_start: NaiveTime,
    morning_last: NaiveTime,
    afternoon_start: NaiveTime,
    weekday_afternoon_last: NaiveTime,
    saturday_afternoon_last: NaiveTime,
    step: Duration,
}

impl BusinessHours {
    pub fn new(
        morning_start: NaiveTime,
        morning_last: NaiveTime,
        afternoon_start: NaiveTime,
        weekday_afternoon_last: NaiveTime,
        saturday_afternoon_last: NaiveTime,
        step: Duration,
    ) -> Result<Self, OptibookError> {
        if step <= Duration::zero() {
            return Err(config_error("business_hours.step_minutes must be positive"));
        }
        if morning_start > morning_last {
            return Err(config_error(
                "business_hours.morning_start is after morning_last",
            ));
        }
        if morning_last >= afternoon_start {
            return Err(config_error(
                "business_hours.morning_last must be before afternoon_start",
            ));
        }
        if afternoon_start > weekday_afternoon_last || afternoon_start > saturday_afternoon_last {
            return Err(config_error(
                "business_hours.afternoon_start is after an afternoon cutoff",
            ));
        }
        Ok(Self {
            morning_start,
            morning_last,
            afternoon_start,
            weekday_afternoon_last,
            saturday_afternoon_last,
            step,
        })
    }

    pub fn from_config(config: &BusinessHoursConfig) -> Result<Self, OptibookError> {
        let step = Duration::try_minutes(config.step_minutes).ok_or_else(|| {
            config_error(format!(
                "business_hours.step_minutes is out of range: {}",
                config.step_minutes
            ))
        })?;
        Self::new(
            parse_hhmm("morning_start", &config.morning_start)?,
            parse_hhmm("morning_last", &config.morning_last)?,
            parse_hhmm("afternoon_start", &config.afternoon_start)?,
            parse_hhmm("weekday_afternoon_last", &config.weekday_afternoon_last)?,
            parse_hhmm("saturday_afternoon_last", &config.saturday_afternoon_last)?,
            step,
        )
    }

    /// Last permissible afternoon start on the given weekday.
    pub fn afternoon_last_for(&self, weekday: Weekday) -> NaiveTime {
        match weekday {
            Weekday::Sat => self.saturday_afternoon_last,
            _ => self.weekday_afternoon_last,
        }
    }

    pub fn morning_start(&self) -> NaiveTime {
        self.morning_start
    }

    pub fn morning_last(&self) -> NaiveTime {
        self.morning_last
    }

    pub fn afternoon_start(&self) -> NaiveTime {
        self.afternoon_start
    }

    pub fn step(&self) -> Duration {
        self.step
    }
}

impl Default for BusinessHours {
    /// 9:10-13:10 and 14:30-17:30 (16:30 on Saturday) every 20 minutes.
    fn default() -> Self {
        Self {
            morning_start: hm(9, 10),
            morning_last: hm(13, 10),
            afternoon_start: hm(14, 30),
            weekday_afternoon_last: hm(17, 30),
            saturday_afternoon_last: hm(16, 30),
            step: Duration::minutes(20),
        }
    }
}

fn parse_hhmm(field: &str, value: &str) -> Result<NaiveTime, OptibookError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| {
        config_error(format!(
            "business_hours.{} must be HH:MM, got {:?}: {}",
            field, value, e
        ))
    })
}

/// A candidate appointment start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub starts_at: DateTime<Tz>,
    /// Derived from reservations, never stored.
    pub is_booked: bool,
}

impl TimeSlot {
    /// Clinic wall-clock "HH:MM", the key used to match reservations.
    pub fn wall_clock_key(&self) -> String {
        crate::availability::wall_clock_key(&self.starts_at)
    }

    /// Display label, e.g. "2:30 PM".
    pub fn label(&self) -> String {
        self.starts_at.format("%-I:%M %p").to_string()
    }
}

/// JSON view of a [`TimeSlot`].
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SlotView {
    #[cfg_attr(feature = "openapi", schema(example = "2025-08-25T10:10:00-05:00"))]
    pub start_time: String,
    #[cfg_attr(feature = "openapi", schema(example = "10:10"))]
    pub time: String,
    #[cfg_attr(feature = "openapi", schema(example = "10:10 AM"))]
    pub label: String,
    pub is_booked: bool,
}

impl From<&TimeSlot> for SlotView {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            start_time: slot.starts_at.to_rfc3339(),
            time: slot.wall_clock_key(),
            label: slot.label(),
            is_booked: slot.is_booked,
        }
    }
}

fn push_block(
    date: NaiveDate,
    first: NaiveTime,
    last: NaiveTime,
    step: Duration,
    out: &mut Vec<NaiveDateTime>,
) {
    let mut current = first;
    while current <= last {
        out.push(date.and_time(current));
        let (next, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        current = next;
    }
}

/// All slot start times for `date`, as clinic wall-clock values, ascending.
///
/// Pure and total: no reservation data, no clock, no time zone. Sunday still gets
/// slots; whether a day can be booked at all is decided by date selectability.
pub fn generate_slot_times(date: NaiveDate, hours: &BusinessHours) -> Vec<NaiveDateTime> {
    let mut times = Vec::new();
    push_block(
        date,
        hours.morning_start,
        hours.morning_last,
        hours.step,
        &mut times,
    );
    push_block(
        date,
        hours.afternoon_start,
        hours.afternoon_last_for(date.weekday()),
        hours.step,
        &mut times,
    );
    times
}

/// Slot start times for `date` as instants in the clinic zone.
///
/// A wall-clock time that does not exist on that day (DST gap) is skipped; an
/// ambiguous one (DST overlap) resolves to the earlier instant.
pub fn generate_slots(date: NaiveDate, hours: &BusinessHours, tz: Tz) -> Vec<DateTime<Tz>> {
    generate_slot_times(date, hours)
        .into_iter()
        .filter_map(|local| tz.from_local_datetime(&local).earliest())
        .collect()
}
