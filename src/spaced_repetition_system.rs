// spaced_repetition_system.rs
use chrono::{Days, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ease factor given to every new item
pub const INITIAL_EASE_FACTOR: f64 = 2.5;
/// Floor the ease factor is clamped to after each review
pub const MIN_EASE_FACTOR: f64 = 1.3;
/// Interval (days) of a new item and of any item after a lapse
pub const INITIAL_INTERVAL_DAYS: i32 = 1;
/// Interval of the second consecutive successful review
pub const SECOND_INTERVAL_DAYS: i32 = 6;
/// Upper bound on the interval, keeps long streaks from overflowing
pub const MAX_INTERVAL_DAYS: i32 = 36_500;

pub const MIN_QUALITY: i32 = 0;
pub const MAX_QUALITY: i32 = 5;
/// Lowest quality that still counts as a successful recall
pub const PASSING_QUALITY: i32 = 3;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quality must be between 0 and 5, got {0}")]
pub struct InvalidQuality(pub i32);

/// Self-rated recall quality, always within 0..=5.
///
/// - 0: complete blackout
/// - 1: incorrect, answer recognised once shown
/// - 2: incorrect, answer seemed easy once shown
/// - 3: correct with serious difficulty
/// - 4: correct after hesitation
/// - 5: perfect recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quality(i32);

impl Quality {
    pub fn new(value: i32) -> Result<Self, InvalidQuality> {
        if (MIN_QUALITY..=MAX_QUALITY).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidQuality(value))
        }
    }

    pub fn value(self) -> i32 {
        self.0
    }

    pub fn is_pass(self) -> bool {
        self.0 >= PASSING_QUALITY
    }

    /// Every valid quality, lowest first
    pub fn all() -> impl Iterator<Item = Quality> {
        (MIN_QUALITY..=MAX_QUALITY).map(Quality)
    }
}

impl TryFrom<i32> for Quality {
    type Error = InvalidQuality;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Quality::new(value)
    }
}

impl From<Quality> for i32 {
    fn from(quality: Quality) -> i32 {
        quality.0
    }
}

/// The scheduling fields of an item that a review reads and rewrites
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleState {
    pub repetitions: i32,
    pub current_interval: i32,
    pub ease_factor: f64,
    pub lapses: i32,
}

impl ScheduleState {
    pub fn initial() -> Self {
        Self {
            repetitions: 0,
            current_interval: INITIAL_INTERVAL_DAYS,
            ease_factor: INITIAL_EASE_FACTOR,
            lapses: 0,
        }
    }
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Result of a single review, merged into the stored item as a whole
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewOutcome {
    pub state: ScheduleState,
    pub last_reviewed_at: NaiveDateTime,
    pub next_review_at: NaiveDateTime,
}

/// Computes the next schedule using the SM-2 recursion.
///
/// The interval is derived from the ease factor as it was *before* this
/// review; the ease update is applied afterwards in both branches.
/// Growth intervals are rounded to the nearest day, ties away from zero.
pub fn next_review(state: &ScheduleState, quality: Quality, now: NaiveDateTime) -> ReviewOutcome {
    let q = quality.value();
    let mut repetitions = state.repetitions.max(0);
    let mut lapses = state.lapses.max(0);
    let current_interval;

    if quality.is_pass() {
        repetitions = repetitions.saturating_add(1);
        current_interval = match repetitions {
            1 => INITIAL_INTERVAL_DAYS,
            2 => SECOND_INTERVAL_DAYS,
            _ => grow_interval(state.current_interval, state.ease_factor),
        };
    } else {
        repetitions = 0;
        current_interval = INITIAL_INTERVAL_DAYS;
        lapses = lapses.saturating_add(1);
    }

    // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
    let distance = f64::from(MAX_QUALITY - q);
    let ease_factor =
        (state.ease_factor + (0.1 - distance * (0.08 + distance * 0.02))).max(MIN_EASE_FACTOR);

    ReviewOutcome {
        state: ScheduleState {
            repetitions,
            current_interval,
            ease_factor,
            lapses,
        },
        last_reviewed_at: now,
        next_review_at: due_date(now, current_interval),
    }
}

fn grow_interval(previous_interval: i32, ease_factor: f64) -> i32 {
    let grown = (f64::from(previous_interval.max(INITIAL_INTERVAL_DAYS)) * ease_factor).round();
    grown.clamp(f64::from(INITIAL_INTERVAL_DAYS), f64::from(MAX_INTERVAL_DAYS)) as i32
}

/// `from` plus `interval_days` calendar days
pub fn due_date(from: NaiveDateTime, interval_days: i32) -> NaiveDateTime {
    let days = u64::try_from(interval_days.max(INITIAL_INTERVAL_DAYS)).unwrap_or(1);
    from.checked_add_days(Days::new(days)).unwrap_or(NaiveDateTime::MAX)
}

/// Interval each quality 0..=5 would produce, indexed by quality
pub fn preview_intervals(state: &ScheduleState, now: NaiveDateTime) -> [i32; 6] {
    let mut intervals = [INITIAL_INTERVAL_DAYS; 6];
    for quality in Quality::all() {
        intervals[quality.value() as usize] =
            next_review(state, quality, now).state.current_interval;
    }
    intervals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn q(value: i32) -> Quality {
        Quality::new(value).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_quality_range() {
        assert!(Quality::new(-1).is_err());
        assert!(Quality::new(6).is_err());
        assert_eq!(Quality::new(0).unwrap().value(), 0);
        assert_eq!(Quality::try_from(5).unwrap().value(), 5);
        assert_eq!(Quality::new(9), Err(InvalidQuality(9)));
        assert!(!q(2).is_pass());
        assert!(q(3).is_pass());
    }

    #[test]
    fn test_first_success_keeps_ease() {
        let result = next_review(&ScheduleState::initial(), q(4), at(1));

        assert_eq!(result.state.repetitions, 1);
        assert_eq!(result.state.current_interval, 1);
        assert!(close(result.state.ease_factor, 2.5));
        assert_eq!(result.last_reviewed_at, at(1));
        assert_eq!(result.next_review_at, at(2));
    }

    #[test]
    fn test_streak_of_successes() {
        let first = next_review(&ScheduleState::initial(), q(4), at(1));
        let second = next_review(&first.state, q(5), at(2));

        assert_eq!(second.state.repetitions, 2);
        assert_eq!(second.state.current_interval, 6);
        assert!(close(second.state.ease_factor, 2.6));
        assert_eq!(second.next_review_at, at(8));

        let third = next_review(&second.state, q(5), at(8));

        // round(6 * 2.6) with the ease from before this review
        assert_eq!(third.state.repetitions, 3);
        assert_eq!(third.state.current_interval, 16);
        assert!(close(third.state.ease_factor, 2.7));
        assert_eq!(third.next_review_at, at(24));
    }

    #[test]
    fn test_failure_resets_streak() {
        let state = ScheduleState {
            repetitions: 4,
            current_interval: 40,
            ease_factor: 2.5,
            lapses: 2,
        };

        let result = next_review(&state, q(1), at(5));

        assert_eq!(result.state.repetitions, 0);
        assert_eq!(result.state.current_interval, 1);
        assert_eq!(result.state.lapses, 3);
        assert!(close(result.state.ease_factor, 2.5 - 0.54));
        assert_eq!(result.next_review_at, at(6));
    }

    #[test]
    fn test_pass_at_three_lowers_ease() {
        let result = next_review(&ScheduleState::initial(), q(3), at(1));

        assert_eq!(result.state.repetitions, 1);
        assert_eq!(result.state.lapses, 0);
        assert!(close(result.state.ease_factor, 2.5 - 0.14));
    }

    #[test]
    fn test_ease_factor_floor() {
        let state = ScheduleState {
            ease_factor: 1.4,
            ..ScheduleState::initial()
        };

        let result = next_review(&state, q(0), at(1));
        assert!(close(result.state.ease_factor, MIN_EASE_FACTOR));

        let again = next_review(&result.state, q(0), at(2));
        assert!(close(again.state.ease_factor, MIN_EASE_FACTOR));
    }

    #[test]
    fn test_rounding_ties_away_from_zero() {
        // 5 * 2.5 = 12.5 -> 13
        let state = ScheduleState {
            repetitions: 3,
            current_interval: 5,
            ease_factor: 2.5,
            lapses: 0,
        };
        assert_eq!(next_review(&state, q(4), at(1)).state.current_interval, 13);
    }

    #[test]
    fn test_interval_ceiling() {
        let state = ScheduleState {
            repetitions: 30,
            current_interval: MAX_INTERVAL_DAYS,
            ease_factor: 3.0,
            lapses: 0,
        };
        assert_eq!(
            next_review(&state, q(5), at(1)).state.current_interval,
            MAX_INTERVAL_DAYS
        );
    }

    #[test]
    fn test_due_date_is_calendar_days() {
        let from = NaiveDate::from_ymd_opt(2024, 2, 28)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        let due = due_date(from, 2);
        assert_eq!(due.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(due.time(), from.time());
    }

    #[test]
    fn test_preview_intervals() {
        let state = ScheduleState {
            repetitions: 2,
            current_interval: 6,
            ease_factor: 2.5,
            lapses: 0,
        };
        assert_eq!(preview_intervals(&state, at(1)), [1, 1, 1, 15, 15, 15]);
        assert_eq!(preview_intervals(&ScheduleState::initial(), at(1)), [1; 6]);
    }

    fn arb_state() -> impl Strategy<Value = ScheduleState> {
        (0i32..20, 1i32..400, 130u32..=300, 0i32..50).prop_map(
            |(repetitions, current_interval, ease, lapses)| ScheduleState {
                repetitions,
                current_interval,
                ease_factor: f64::from(ease) / 100.0,
                lapses,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_review_sequences_hold_invariants(
            start in arb_state(),
            qualities in proptest::collection::vec(0i32..=5, 1..60),
        ) {
            let mut state = start;
            let mut now = at(1);
            for value in qualities {
                let quality = q(value);
                let result = next_review(&state, quality, now);

                prop_assert!(result.state.ease_factor >= MIN_EASE_FACTOR);
                prop_assert!(result.state.current_interval >= 1);
                prop_assert!(result.state.lapses >= state.lapses);
                prop_assert!(result.state.repetitions >= 0);
                if !quality.is_pass() {
                    prop_assert_eq!(result.state.repetitions, 0);
                    prop_assert_eq!(result.state.current_interval, 1);
                    prop_assert_eq!(result.state.lapses, state.lapses + 1);
                }
                prop_assert_eq!(result.next_review_at, due_date(now, result.state.current_interval));

                state = result.state;
                now = result.next_review_at;
            }
        }

        #[test]
        fn prop_next_review_is_deterministic(start in arb_state(), value in 0i32..=5) {
            let a = next_review(&start, q(value), at(3));
            let b = next_review(&start, q(value), at(3));
            prop_assert_eq!(a, b);
        }
    }
}
