#[cfg(test)]
mod tests {
    use crate::slots::{generate_slot_times, generate_slots, hm, BusinessHours};
    use chrono::{Datelike, Duration, NaiveDate, Weekday};
    use chrono_tz::America::Chicago;
    use proptest::prelude::*;

    // 2000-01-01 through 2040
    fn any_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..14_975).prop_map(|offset| {
            NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + Duration::days(offset)
        })
    }

    proptest! {
        #[test]
        fn test_slots_strictly_ascending(date in any_date()) {
            let slots = generate_slot_times(date, &BusinessHours::default());
            for pair in slots.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            let instants = generate_slots(date, &BusinessHours::default(), Chicago);
            for pair in instants.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }

        #[test]
        fn test_first_and_last_slot(date in any_date()) {
            let slots = generate_slot_times(date, &BusinessHours::default());
            prop_assert_eq!(slots[0].time(), hm(9, 10));
            let expected_last = if date.weekday() == Weekday::Sat { hm(16, 30) } else { hm(17, 30) };
            prop_assert_eq!(slots[slots.len() - 1].time(), expected_last);
        }

        #[test]
        fn test_no_slot_in_lunch_gap(date in any_date()) {
            for slot in generate_slot_times(date, &BusinessHours::default()) {
                prop_assert!(slot.time() <= hm(13, 10) || slot.time() >= hm(14, 30));
                prop_assert_eq!(slot.date(), date);
            }
        }

        #[test]
        fn test_generation_is_idempotent(date in any_date()) {
            prop_assert_eq!(
                generate_slot_times(date, &BusinessHours::default()),
                generate_slot_times(date, &BusinessHours::default())
            );
        }

        #[test]
        fn test_custom_steps_stay_within_blocks(
            date in any_date(),
            step in 5i64..90,
            morning_len in 0i64..240,
        ) {
            let hours = BusinessHours::new(
                hm(8, 0),
                hm(8, 0) + Duration::minutes(morning_len),
                hm(13, 0),
                hm(18, 0),
                hm(15, 0),
                Duration::minutes(step),
            ).unwrap();
            let slots = generate_slot_times(date, &hours);
            prop_assert!(!slots.is_empty());
            let last = hours.afternoon_last_for(date.weekday());
            for slot in &slots {
                let t = slot.time();
                let in_morning = t >= hours.morning_start() && t <= hours.morning_last();
                let in_afternoon = t >= hours.afternoon_start() && t <= last;
                prop_assert!(in_morning || in_afternoon);
            }
        }
    }
}
