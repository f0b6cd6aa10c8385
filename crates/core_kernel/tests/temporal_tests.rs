//! Comprehensive unit tests for the Temporal module
//!
//! Tests cover ValidPeriod and the injected Clock implementations.

use core_kernel::{Clock, FixedClock, SystemClock, ValidPeriod};
use core_kernel::temporal::TemporalError;
use chrono::{Duration, TimeZone, Utc};

mod valid_period {
    use super::*;

    mod creation {
        use super::*;

        #[test]
        fn test_new_creates_valid_period() {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let end = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
            let period = ValidPeriod::new(start, Some(end)).unwrap();

            assert_eq!(period.start, start);
            assert_eq!(period.end, Some(end));
        }

        #[test]
        fn test_new_with_none_end_is_current() {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let period = ValidPeriod::new(start, None).unwrap();

            assert!(period.is_current());
        }

        #[test]
        fn test_new_fails_when_start_after_end() {
            let start = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
            let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let result = ValidPeriod::new(start, Some(end));

            assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
        }

        #[test]
        fn test_new_fails_when_start_equals_end() {
            let start = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
            let result = ValidPeriod::new(start, Some(start));

            assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
        }

        #[test]
        fn test_from_creates_open_period() {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let period = ValidPeriod::from(start);

            assert_eq!(period.start, start);
            assert!(period.end.is_none());
        }
    }

    mod containment {
        use super::*;

        #[test]
        fn test_contains_start_boundary() {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let end = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
            let period = ValidPeriod::new(start, Some(end)).unwrap();

            // start is inclusive
            assert!(period.contains(start));
        }

        #[test]
        fn test_does_not_contain_end_boundary() {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let end = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
            let period = ValidPeriod::new(start, Some(end)).unwrap();

            // end is exclusive
            assert!(!period.contains(end));
        }

        #[test]
        fn test_open_period_contains_any_later_instant() {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let period = ValidPeriod::from(start);

            assert!(period.contains(start + Duration::days(10_000)));
            assert!(!period.contains(start - Duration::seconds(1)));
        }
    }

    mod overlap {
        use super::*;

        #[test]
        fn test_overlapping_periods() {
            let p1 = ValidPeriod::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Some(Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap()),
            )
            .unwrap();
            let p2 = ValidPeriod::new(
                Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
                Some(Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap()),
            )
            .unwrap();

            assert!(p1.overlaps(&p2));
            assert!(p2.overlaps(&p1));
        }

        #[test]
        fn test_adjacent_periods_do_not_overlap() {
            let boundary = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
            let p1 = ValidPeriod::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Some(boundary),
            )
            .unwrap();
            let p2 = ValidPeriod::from(boundary);

            assert!(!p1.overlaps(&p2));
            assert!(!p2.overlaps(&p1));
        }

        #[test]
        fn test_two_open_periods_overlap() {
            let p1 = ValidPeriod::from(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
            let p2 = ValidPeriod::from(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());

            assert!(p1.overlaps(&p2));
        }
    }

    mod closing {
        use super::*;

        #[test]
        fn test_close_at_sets_end() {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let end = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
            let mut period = ValidPeriod::from(start);

            period.close_at(end).unwrap();
            assert_eq!(period.end, Some(end));
            assert!(!period.is_current());
        }

        #[test]
        fn test_close_at_rejects_already_closed() {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let end = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
            let mut period = ValidPeriod::from(start);

            period.close_at(end).unwrap();
            let result = period.close_at(end + Duration::days(1));
            assert_eq!(result, Err(TemporalError::AlreadyClosed));
        }

        #[test]
        fn test_close_at_rejects_instant_before_start() {
            let start = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
            let mut period = ValidPeriod::from(start);

            let result = period.close_at(start - Duration::days(1));
            assert!(matches!(result, Err(TemporalError::InvalidPeriod { .. })));
        }

        #[test]
        fn test_reopen_makes_current_again() {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let mut period = ValidPeriod::from(start);
            period.close_at(start + Duration::days(30)).unwrap();

            period.reopen();
            assert!(period.is_current());
            assert_eq!(period.start, start);
        }

        #[test]
        fn test_duration_of_closed_period() {
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let mut period = ValidPeriod::from(start);
            assert!(period.duration().is_none());

            period.close_at(start + Duration::days(30)).unwrap();
            assert_eq!(period.duration(), Some(Duration::days(30)));
        }
    }

    mod serialization {
        use super::*;

        #[test]
        fn test_round_trips_through_json() {
            let period = ValidPeriod::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            )
            .unwrap();

            let json = serde_json::to_string(&period).unwrap();
            let back: ValidPeriod = serde_json::from_str(&json).unwrap();
            assert_eq!(period, back);
        }
    }
}

mod clocks {
    use super::*;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }

    #[test]
    fn test_fixed_clock_is_stable() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::at(instant);

        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), instant);
    }

    #[test]
    fn test_fixed_clock_advance_and_set() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock = FixedClock::at(instant);

        clock.advance(Duration::hours(3));
        assert_eq!(clock.now(), instant + Duration::hours(3));

        let pinned = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        clock.set(pinned);
        assert_eq!(clock.now(), pinned);
    }

    #[test]
    fn test_clock_trait_object() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let clock: Box<dyn Clock> = Box::new(FixedClock::at(instant));
        assert_eq!(clock.now(), instant);
    }
}
