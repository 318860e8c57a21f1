use chrono::{DateTime, Utc};

/// Where a moment falls relative to an event's admission window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCheck {
    TooEarly,
    Open,
    TooLate,
}

/// Classifies `now` against the half-open window `[start, end)`.
///
/// Both the gate scan and the read-only validity probe go through this one
/// function, so the two can never disagree about the boundaries: the start
/// instant admits, the end instant does not.
pub fn admission_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> WindowCheck {
    if now < start {
        WindowCheck::TooEarly
    } else if now >= end {
        WindowCheck::TooLate
    } else {
        WindowCheck::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn rank(check: WindowCheck) -> u8 {
        match check {
            WindowCheck::TooEarly => 0,
            WindowCheck::Open => 1,
            WindowCheck::TooLate => 2,
        }
    }

    #[test]
    fn before_start_is_too_early() {
        assert_eq!(admission_window(at(100), at(200), at(99)), WindowCheck::TooEarly);
    }

    #[test]
    fn start_instant_admits() {
        assert_eq!(admission_window(at(100), at(200), at(100)), WindowCheck::Open);
    }

    #[test]
    fn inside_the_window_admits() {
        assert_eq!(admission_window(at(100), at(200), at(150)), WindowCheck::Open);
    }

    #[test]
    fn end_instant_is_too_late() {
        assert_eq!(admission_window(at(100), at(200), at(200)), WindowCheck::TooLate);
    }

    #[test]
    fn after_end_is_too_late() {
        assert_eq!(admission_window(at(100), at(200), at(201)), WindowCheck::TooLate);
    }

    proptest! {
        // As now moves forward the classification can only move forward:
        // TooEarly, then Open, then TooLate.
        #[test]
        fn classification_is_monotonic_in_now(
            start in -100_000i64..100_000,
            len in 1i64..86_400,
            a in -200_000i64..200_000,
            b in -200_000i64..200_000,
        ) {
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let end = start + len;
            let first = admission_window(at(start), at(end), at(early));
            let second = admission_window(at(start), at(end), at(late));
            prop_assert!(rank(first) <= rank(second));
        }

        #[test]
        fn nonempty_window_admits_its_start(
            start in -100_000i64..100_000,
            len in 1i64..86_400,
        ) {
            prop_assert_eq!(
                admission_window(at(start), at(start + len), at(start)),
                WindowCheck::Open
            );
        }
    }
}
