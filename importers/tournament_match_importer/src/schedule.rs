//! Places the matches of a bracket round onto a Friday-to-Sunday window.
//!
//! The bracket service only knows round numbers, so every match gets a
//! synthetic date: round `n` plays in the first weekend window on or after
//! `round_start + 7 * (n - 1)` days, its matches spread evenly over the
//! three days with any remainder going to the earliest days.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

pub const WINDOW_DAYS: usize = 3;

const FIRST_SLOT_OFFSET_MINUTES: i64 = 30;
const ROUND_END_MARGIN_HOURS: i64 = 1;

/// Position of a match inside its round window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// 0 = first window day.
    pub day: usize,
    /// Order of the match within its day.
    pub slot: usize,
}

fn is_window_day(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Fri | Weekday::Sat | Weekday::Sun)
}

/// First day of the round's window, `None` when it falls outside the
/// representable calendar.
///
/// Losers-bracket rounds arrive as negative numbers and share the week of
/// the winners round with the same magnitude.
pub fn window_start(round_number: i32, round_start: DateTime<Utc>) -> Option<NaiveDate> {
    let weeks = u64::from(round_number.unsigned_abs().max(1)) - 1;
    let mut day = round_start
        .date_naive()
        .checked_add_days(Days::new(weeks * 7))?;
    while !is_window_day(day.weekday()) {
        day = day.succ_opt()?;
    }
    Some(day)
}

/// Number of matches each window day receives.
pub fn day_sizes(total_matches: usize) -> [usize; WINDOW_DAYS] {
    let base = total_matches / WINDOW_DAYS;
    let extra = total_matches % WINDOW_DAYS;
    std::array::from_fn(|day| base + usize::from(day < extra))
}

/// Maps a match index onto the partition from [`day_sizes`]. Indexes past
/// the end of the partition keep counting on the last window day.
pub fn locate(match_index: usize, total_matches: usize) -> Slot {
    let sizes = day_sizes(total_matches);
    let mut first = 0;
    for (day, size) in sizes.iter().enumerate() {
        if match_index < first + size {
            return Slot { day, slot: match_index - first };
        }
        first += size;
    }
    let last = WINDOW_DAYS - 1;
    Slot {
        day: last,
        slot: match_index - (first - sizes[last]),
    }
}

/// Computes the date of one match. Completed matches get midnight of their
/// window day; pending ones get a kickoff time derived from their slot,
/// capped one hour before `round_end` and at the end of the window day.
///
/// Returns `None` when the window day cannot be represented, which only
/// happens for absurd round numbers or a `round_start` at the end of time.
pub fn schedule_date(
    round_number: i32,
    round_start: DateTime<Utc>,
    round_end: DateTime<Utc>,
    match_index: usize,
    total_matches_in_round: usize,
    spacing: Duration,
    is_completed: bool,
) -> Option<DateTime<Utc>> {
    let Slot { day, slot } = locate(match_index, total_matches_in_round);
    let match_day = window_start(round_number, round_start)?.checked_add_days(Days::new(day as u64))?;
    let midnight = Utc.from_utc_datetime(&match_day.and_time(NaiveTime::default()));

    if is_completed {
        return Some(midnight);
    }

    let end_of_day = midnight.checked_add_days(Days::new(1))?;
    let latest = round_end
        .checked_sub_signed(Duration::hours(ROUND_END_MARGIN_HOURS))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let ceiling = latest.min(end_of_day);
    let first_slot = Duration::minutes(FIRST_SLOT_OFFSET_MINUTES);
    let offset = i32::try_from(slot)
        .ok()
        .and_then(|slot| spacing.max(Duration::zero()).checked_mul(slot))
        .and_then(|gap| gap.checked_add(&first_slot));

    let kickoff = match offset.and_then(|offset| midnight.checked_add_signed(offset)) {
        Some(kickoff) => kickoff.min(ceiling),
        None => ceiling,
    };
    Some(kickoff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // 2025-03-03 is a Monday.
    fn round_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 18, 0, 0).unwrap()
    }

    fn round_end() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_window_starts_on_first_friday() {
        assert_eq!(window_start(1, round_start()), Some(date(2025, 3, 7)));
        assert_eq!(window_start(2, round_start()), Some(date(2025, 3, 14)));
        assert_eq!(window_start(-2, round_start()), Some(date(2025, 3, 14)));

        let saturday = Utc.with_ymd_and_hms(2025, 3, 8, 9, 0, 0).unwrap();
        assert_eq!(window_start(1, saturday), Some(date(2025, 3, 8)));
    }

    #[test]
    fn test_six_matches_spread_evenly() {
        assert_eq!(day_sizes(6), [2, 2, 2]);
        let days: Vec<usize> = (0..6).map(|i| locate(i, 6).day).collect();
        assert_eq!(days, vec![0, 0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_remainder_goes_to_earliest_days() {
        assert_eq!(day_sizes(7), [3, 2, 2]);
        assert_eq!(day_sizes(8), [3, 3, 2]);
        let slots: Vec<Slot> = (0..7).map(|i| locate(i, 7)).collect();
        assert_eq!(slots[2], Slot { day: 0, slot: 2 });
        assert_eq!(slots[3], Slot { day: 1, slot: 0 });
        assert_eq!(slots[6], Slot { day: 2, slot: 1 });
    }

    #[test]
    fn test_overflowing_index_stays_on_last_day() {
        assert_eq!(locate(7, 7), Slot { day: 2, slot: 2 });
        assert_eq!(locate(1, 0), Slot { day: 2, slot: 1 });
    }

    #[test]
    fn test_schedule_is_deterministic() {
        let spacing = Duration::minutes(90);
        let first = schedule_date(2, round_start(), round_end(), 4, 7, spacing, false);
        let second = schedule_date(2, round_start(), round_end(), 4, 7, spacing, false);
        assert_eq!(first, second);
    }

    #[test]
    fn test_completed_match_has_no_time_of_day() {
        let spacing = Duration::minutes(90);
        for index in 0..7 {
            let scheduled = schedule_date(1, round_start(), round_end(), index, 7, spacing, true).unwrap();
            assert_eq!(scheduled.time(), NaiveTime::default());
        }
        assert_eq!(
            schedule_date(1, round_start(), round_end(), 3, 7, spacing, true),
            Some(at(2025, 3, 8, 0, 0))
        );
    }

    #[test]
    fn test_pending_match_kickoff_follows_slot() {
        let spacing = Duration::minutes(90);
        assert_eq!(
            schedule_date(1, round_start(), round_end(), 0, 7, spacing, false),
            Some(at(2025, 3, 7, 0, 30))
        );
        assert_eq!(
            schedule_date(1, round_start(), round_end(), 2, 7, spacing, false),
            Some(at(2025, 3, 7, 3, 30))
        );
        assert_eq!(
            schedule_date(1, round_start(), round_end(), 6, 7, spacing, false),
            Some(at(2025, 3, 9, 2, 0))
        );
    }

    #[test]
    fn test_pending_kickoff_capped_at_end_of_day() {
        let spacing = Duration::hours(12);
        assert_eq!(
            schedule_date(1, round_start(), round_end(), 2, 9, spacing, false),
            Some(at(2025, 3, 8, 0, 0))
        );
    }

    #[test]
    fn test_pending_kickoff_capped_before_round_end() {
        let end = at(2025, 3, 7, 2, 0);
        let spacing = Duration::minutes(90);
        let scheduled = schedule_date(1, round_start(), end, 1, 4, spacing, false).unwrap();
        assert_eq!(scheduled, at(2025, 3, 7, 1, 0));
        assert!(scheduled < end);
    }

    #[test]
    fn test_pending_kickoff_bounds() {
        let spacing = Duration::minutes(45);
        for index in 0..12 {
            let scheduled = schedule_date(1, round_start(), round_end(), index, 12, spacing, false).unwrap();
            let midnight = Utc.from_utc_datetime(&scheduled.date_naive().and_time(NaiveTime::default()));
            assert!(scheduled >= midnight + Duration::minutes(30));
            assert!(scheduled < round_end());
            assert!(is_window_day(scheduled.weekday()));
        }
    }

    #[test]
    fn test_unrepresentable_window_is_none() {
        let spacing = Duration::minutes(90);
        assert_eq!(window_start(50_000_000, round_start()), None);
        assert_eq!(window_start(i32::MIN, round_start()), None);
        assert_eq!(
            schedule_date(50_000_000, round_start(), round_end(), 0, 1, spacing, true),
            None
        );
        assert_eq!(
            schedule_date(2, DateTime::<Utc>::MAX_UTC, DateTime::<Utc>::MAX_UTC, 0, 1, spacing, false),
            None
        );
    }

    #[test]
    fn test_round_end_at_start_of_time_caps_without_overflow() {
        let spacing = Duration::minutes(90);
        let scheduled = schedule_date(1, round_start(), DateTime::<Utc>::MIN_UTC, 0, 1, spacing, false);
        assert_eq!(scheduled, Some(DateTime::<Utc>::MIN_UTC));
    }
}
