//! Occurrence expansion and membership tests.
//!
//! Every entry point parses the rule fresh from its string form. Expansion is
//! lazy internally and bounded by the rule's `COUNT`/`UNTIL`, or by a hard cap
//! when the rule has neither.

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, Utc, Weekday};
use serde::Serialize;

use crate::error::RecurrenceError;
use crate::rule::{parse_rule, Frequency, RecurrenceRule};

/// Hard cap applied to rules with neither `COUNT` nor `UNTIL` when the
/// caller does not pass one.
pub const DEFAULT_OCCURRENCE_CAP: usize = 365;

/// Bound used by membership tests on unbounded rules.
pub const MEMBERSHIP_SCAN_CAP: usize = 10_000;

/// One concrete instance of a recurring schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl Occurrence {
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.start.date_naive()
    }

    #[inline]
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }

    fn from_start(start: DateTime<Utc>, duration: Option<Duration>) -> Self {
        Self {
            start,
            end: duration.and_then(|d| start.checked_add_signed(d)),
        }
    }
}

/// Expands `rule` from `start`. When `end` is given every occurrence carries
/// the same duration as `end - start`.
///
/// `cap` only applies to rules without `COUNT` or `UNTIL`; `None` means
/// [`DEFAULT_OCCURRENCE_CAP`].
pub fn generate_occurrences(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    rule: &str,
    cap: Option<usize>,
) -> Result<Vec<Occurrence>, RecurrenceError> {
    let rule = parse_rule(rule)?;
    generate_rule_occurrences(&rule, start, end, cap)
}

/// Same as [`generate_occurrences`] for an already-built rule.
pub fn generate_rule_occurrences(
    rule: &RecurrenceRule,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    cap: Option<usize>,
) -> Result<Vec<Occurrence>, RecurrenceError> {
    rule.validate()?;
    let duration = end.map(|end| end - start);
    let limit = natural_limit(rule, cap.unwrap_or(DEFAULT_OCCURRENCE_CAP));

    let occurrences: Vec<Occurrence> = bounded_starts(rule, start, limit)
        .map(|s| Occurrence::from_start(s, duration))
        .collect();

    tracing::debug!(
        rule = %rule,
        start = %start,
        produced = occurrences.len(),
        bounded = rule.is_bounded(),
        "expanded recurrence rule"
    );

    Ok(occurrences)
}

/// First occurrence starting strictly after `reference`, within the rule's
/// own `COUNT`/`UNTIL` bound.
pub fn next_occurrence(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    rule: &str,
    reference: DateTime<Utc>,
) -> Result<Option<Occurrence>, RecurrenceError> {
    let rule = parse_rule(rule)?;
    next_rule_occurrence(&rule, start, end, reference)
}

pub fn next_rule_occurrence(
    rule: &RecurrenceRule,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    reference: DateTime<Utc>,
) -> Result<Option<Occurrence>, RecurrenceError> {
    rule.validate()?;
    let duration = end.map(|end| end - start);
    let limit = natural_limit(rule, usize::MAX);

    Ok(bounded_starts(rule, start, limit)
        .find(|s| *s > reference)
        .map(|s| Occurrence::from_start(s, duration)))
}

/// Whether `candidate` (a calendar date, time ignored) is the start date of
/// an occurrence of `rule` anchored at `start`.
pub fn is_occurrence(
    candidate: NaiveDate,
    start: DateTime<Utc>,
    rule: &str,
) -> Result<bool, RecurrenceError> {
    let rule = parse_rule(rule)?;
    rule_contains_date(&rule, start, candidate)
}

pub fn rule_contains_date(
    rule: &RecurrenceRule,
    start: DateTime<Utc>,
    candidate: NaiveDate,
) -> Result<bool, RecurrenceError> {
    rule.validate()?;
    let limit = natural_limit(rule, MEMBERSHIP_SCAN_CAP);

    if candidate < start.date_naive() {
        return Ok(false);
    }

    if rule.weekly_days().is_some() {
        return Ok(bounded_starts(rule, start, limit)
            .map(|s| s.date_naive())
            .take_while(|date| *date <= candidate)
            .any(|date| date == candidate));
    }

    let Some(index) = closed_form_index(rule, start.date_naive(), candidate) else {
        return Ok(false);
    };
    if index >= limit as u64 {
        return Ok(false);
    }

    let Some(steps) = index.checked_mul(u64::from(rule.interval)) else {
        return Ok(false);
    };
    Ok(match advance(start, rule.freq, steps) {
        Some(occurrence) => {
            occurrence.date_naive() == candidate
                && rule.until.map_or(true, |until| occurrence <= until)
        }
        None => false,
    })
}

/// Whether an occurrence of `rule` starts in `[from, to)`. Callers that
/// think in local calendar days pass the UTC bounds of that day.
///
/// Unbounded rules are scanned up to [`MEMBERSHIP_SCAN_CAP`] occurrences,
/// the same reach as [`rule_contains_date`].
pub fn rule_occurs_between(
    rule: &RecurrenceRule,
    start: DateTime<Utc>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<bool, RecurrenceError> {
    rule.validate()?;
    let limit = natural_limit(rule, MEMBERSHIP_SCAN_CAP);

    Ok(bounded_starts(rule, start, limit)
        .take_while(|s| *s < to)
        .any(|s| s >= from))
}

/// Index `k` of the occurrence that could fall on `candidate`, for rules
/// whose occurrences are `start + k * interval` units apart.
fn closed_form_index(rule: &RecurrenceRule, start: NaiveDate, candidate: NaiveDate) -> Option<u64> {
    let interval = i64::from(rule.interval);
    let (elapsed, step) = match rule.freq {
        Frequency::Daily => ((candidate - start).num_days(), interval),
        Frequency::Weekly => ((candidate - start).num_days(), 7 * interval),
        Frequency::Monthly => (months_between(start, candidate), interval),
        Frequency::Yearly => (months_between(start, candidate), 12 * interval),
    };
    if elapsed < 0 || elapsed % step != 0 {
        return None;
    }
    u64::try_from(elapsed / step).ok()
}

fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (i64::from(to.year()) - i64::from(from.year())) * 12 + i64::from(to.month())
        - i64::from(from.month())
}

/// How many occurrences the rule may produce: its `COUNT`, unlimited under
/// `UNTIL` alone, or `fallback` when unbounded.
fn natural_limit(rule: &RecurrenceRule, fallback: usize) -> usize {
    match (rule.count, rule.until) {
        (Some(count), _) => count as usize,
        (None, Some(_)) => usize::MAX,
        (None, None) => fallback,
    }
}

fn bounded_starts(
    rule: &RecurrenceRule,
    start: DateTime<Utc>,
    limit: usize,
) -> impl Iterator<Item = DateTime<Utc>> {
    let until = rule.until;
    OccurrenceStarts::new(rule, start)
        .take_while(move |candidate| until.map_or(true, |until| *candidate <= until))
        .take(limit)
}

/// Advances `start` by `steps` units of `freq`. Month and year steps are
/// computed from `start` and clamp the day to the end of shorter months.
fn advance(start: DateTime<Utc>, freq: Frequency, steps: u64) -> Option<DateTime<Utc>> {
    match freq {
        Frequency::Daily => start.checked_add_days(Days::new(steps)),
        Frequency::Weekly => steps
            .checked_mul(7)
            .and_then(|days| start.checked_add_days(Days::new(days))),
        Frequency::Monthly => u32::try_from(steps)
            .ok()
            .and_then(|months| start.checked_add_months(Months::new(months))),
        Frequency::Yearly => steps
            .checked_mul(12)
            .and_then(|months| u32::try_from(months).ok())
            .and_then(|months| start.checked_add_months(Months::new(months))),
    }
}

/// Unbounded, strictly ascending stream of candidate occurrence starts.
struct OccurrenceStarts {
    start: DateTime<Utc>,
    freq: Frequency,
    interval: u64,
    /// Weekly rules with `BYDAY`: the Monday of `start`'s week and the
    /// sorted weekdays to emit in each cycle.
    weekly: Option<(DateTime<Utc>, Vec<Weekday>)>,
    cycle: u64,
    slot: usize,
    exhausted: bool,
}

impl OccurrenceStarts {
    fn new(rule: &RecurrenceRule, start: DateTime<Utc>) -> Self {
        let weekly = rule.weekly_days().and_then(|days| {
            let offset = u64::from(start.weekday().num_days_from_monday());
            start
                .checked_sub_days(Days::new(offset))
                .map(|week_start| (week_start, days))
        });
        Self {
            start,
            freq: rule.freq,
            interval: u64::from(rule.interval),
            exhausted: rule.weekly_days().is_some() && weekly.is_none(),
            weekly,
            cycle: 0,
            slot: 0,
        }
    }

    fn next_weekly(&mut self) -> Option<DateTime<Utc>> {
        let (week_start, days) = self.weekly.as_ref()?;
        loop {
            if self.slot == days.len() {
                self.slot = 0;
                self.cycle += 1;
            }
            let day = days[self.slot];
            self.slot += 1;

            let candidate = self
                .cycle
                .checked_mul(self.interval)
                .and_then(|weeks| weeks.checked_mul(7))
                .and_then(|offset| offset.checked_add(u64::from(day.num_days_from_monday())))
                .and_then(|offset| week_start.checked_add_days(Days::new(offset)))?;

            // The first cycle may list weekdays that fall before the start.
            if candidate >= self.start {
                return Some(candidate);
            }
        }
    }
}

impl Iterator for OccurrenceStarts {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let next = if self.weekly.is_some() {
            self.next_weekly()
        } else {
            let candidate = self
                .cycle
                .checked_mul(self.interval)
                .and_then(|steps| advance(self.start, self.freq, steps));
            self.cycle += 1;
            candidate
        };

        if next.is_none() {
            self.exhausted = true;
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dates(occurrences: &[Occurrence]) -> Vec<NaiveDate> {
        occurrences.iter().map(Occurrence::date).collect()
    }

    mod generation_tests {
        use super::*;

        #[test]
        fn test_daily_count() {
            let occ = generate_occurrences(at(2025, 1, 1), None, "FREQ=DAILY;COUNT=5", None).unwrap();
            assert_eq!(
                dates(&occ),
                vec![
                    date(2025, 1, 1),
                    date(2025, 1, 2),
                    date(2025, 1, 3),
                    date(2025, 1, 4),
                    date(2025, 1, 5)
                ]
            );
            assert!(occ.iter().all(|o| o.end.is_none()));
        }

        #[test]
        fn test_daily_interval() {
            let occ = generate_occurrences(at(2025, 1, 1), None, "FREQ=DAILY;INTERVAL=3;COUNT=4", None)
                .unwrap();
            assert_eq!(
                dates(&occ),
                vec![date(2025, 1, 1), date(2025, 1, 4), date(2025, 1, 7), date(2025, 1, 10)]
            );
        }

        #[test]
        fn test_weekly_by_day_from_wednesday() {
            let occ = generate_occurrences(
                at(2025, 1, 1),
                None,
                "FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=6",
                None,
            )
            .unwrap();
            assert_eq!(
                dates(&occ),
                vec![
                    date(2025, 1, 1),
                    date(2025, 1, 3),
                    date(2025, 1, 6),
                    date(2025, 1, 8),
                    date(2025, 1, 10),
                    date(2025, 1, 13)
                ]
            );
            assert!(occ.iter().all(|o| o.start.time() == at(2025, 1, 1).time()));
        }

        #[test]
        fn test_weekly_by_day_input_order_does_not_matter() {
            let a = generate_occurrences(at(2025, 1, 1), None, "FREQ=WEEKLY;BYDAY=FR,WE,MO;COUNT=6", None)
                .unwrap();
            let b = generate_occurrences(at(2025, 1, 1), None, "FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=6", None)
                .unwrap();
            assert_eq!(a, b);
        }

        #[test]
        fn test_weekly_by_day_with_interval() {
            // Thursday start, every other week on Tuesday and Thursday.
            let occ = generate_occurrences(
                at(2025, 1, 2),
                None,
                "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU,TH;COUNT=4",
                None,
            )
            .unwrap();
            assert_eq!(
                dates(&occ),
                vec![date(2025, 1, 2), date(2025, 1, 14), date(2025, 1, 16), date(2025, 1, 28)]
            );
        }

        #[test]
        fn test_weekly_by_day_all_before_start_skips_to_next_cycle() {
            // Saturday start, only Monday selected.
            let occ = generate_occurrences(at(2025, 1, 4), None, "FREQ=WEEKLY;BYDAY=MO;COUNT=2", None)
                .unwrap();
            assert_eq!(dates(&occ), vec![date(2025, 1, 6), date(2025, 1, 13)]);
        }

        #[test]
        fn test_weekly_without_by_day() {
            let occ = generate_occurrences(at(2025, 1, 1), None, "FREQ=WEEKLY;INTERVAL=2;COUNT=3", None)
                .unwrap();
            assert_eq!(
                dates(&occ),
                vec![date(2025, 1, 1), date(2025, 1, 15), date(2025, 1, 29)]
            );
        }

        #[test]
        fn test_monthly_count() {
            let occ = generate_occurrences(at(2025, 1, 15), None, "FREQ=MONTHLY;COUNT=3", None).unwrap();
            assert_eq!(
                dates(&occ),
                vec![date(2025, 1, 15), date(2025, 2, 15), date(2025, 3, 15)]
            );
        }

        #[test]
        fn test_monthly_clamps_without_drift() {
            let occ = generate_occurrences(at(2025, 1, 31), None, "FREQ=MONTHLY;COUNT=4", None).unwrap();
            assert_eq!(
                dates(&occ),
                vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 31), date(2025, 4, 30)]
            );
        }

        #[test]
        fn test_yearly_leap_day_clamps() {
            let occ = generate_occurrences(at(2024, 2, 29), None, "FREQ=YEARLY;COUNT=5", None).unwrap();
            assert_eq!(
                dates(&occ),
                vec![
                    date(2024, 2, 29),
                    date(2025, 2, 28),
                    date(2026, 2, 28),
                    date(2027, 2, 28),
                    date(2028, 2, 29)
                ]
            );
        }

        #[test]
        fn test_until_is_inclusive() {
            let occ = generate_occurrences(
                at(2025, 1, 1),
                None,
                "FREQ=DAILY;UNTIL=20250103T090000Z",
                None,
            )
            .unwrap();
            assert_eq!(
                dates(&occ),
                vec![date(2025, 1, 1), date(2025, 1, 2), date(2025, 1, 3)]
            );
        }

        #[test]
        fn test_until_cuts_count_short() {
            let occ = generate_occurrences(
                at(2025, 1, 1),
                None,
                "FREQ=DAILY;COUNT=10;UNTIL=20250102T235959Z",
                None,
            )
            .unwrap();
            assert_eq!(occ.len(), 2);
        }

        #[test]
        fn test_until_before_start_is_empty() {
            let occ = generate_occurrences(at(2025, 1, 1), None, "FREQ=DAILY;UNTIL=20241231T000000Z", None)
                .unwrap();
            assert!(occ.is_empty());
        }

        #[rstest]
        #[case(None, DEFAULT_OCCURRENCE_CAP)]
        #[case(Some(12), 12)]
        #[case(Some(0), 0)]
        fn test_unbounded_rule_uses_cap(#[case] cap: Option<usize>, #[case] expected: usize) {
            let occ = generate_occurrences(at(2025, 1, 1), None, "FREQ=WEEKLY", cap).unwrap();
            assert_eq!(occ.len(), expected);
        }

        #[test]
        fn test_cap_ignored_when_count_given() {
            let occ = generate_occurrences(at(2025, 1, 1), None, "FREQ=DAILY;COUNT=20", Some(5)).unwrap();
            assert_eq!(occ.len(), 20);
        }

        #[test]
        fn test_duration_copied_to_every_occurrence() {
            let start = at(2025, 1, 1);
            let end = start + Duration::minutes(90);
            let occ = generate_occurrences(start, Some(end), "FREQ=MONTHLY;COUNT=3", None).unwrap();
            for o in &occ {
                assert_eq!(o.duration(), Some(Duration::minutes(90)));
            }
        }

        #[test]
        fn test_invalid_rule_is_reported() {
            let result = generate_occurrences(at(2025, 1, 1), None, "FREQ=FORTNIGHTLY", None);
            assert!(matches!(result, Err(RecurrenceError::InvalidRule(_))));
        }

        #[test]
        fn test_directly_built_rule_is_validated() {
            let rule = RecurrenceRule::new(Frequency::Daily).with_interval(0);
            let result = generate_rule_occurrences(&rule, at(2025, 1, 1), None, None);
            assert!(matches!(result, Err(RecurrenceError::InvalidRule(_))));
        }
    }

    mod next_occurrence_tests {
        use super::*;

        #[test]
        fn test_next_after_reference() {
            let next = next_occurrence(at(2025, 1, 1), None, "FREQ=DAILY", at(2025, 3, 10))
                .unwrap()
                .unwrap();
            assert_eq!(next.start, at(2025, 3, 11));
        }

        #[test]
        fn test_next_is_strictly_after() {
            let next = next_occurrence(at(2025, 1, 1), None, "FREQ=WEEKLY", at(2025, 1, 8))
                .unwrap()
                .unwrap();
            assert_eq!(next.start, at(2025, 1, 15));
        }

        #[test]
        fn test_next_respects_count() {
            let next = next_occurrence(at(2025, 1, 1), None, "FREQ=DAILY;COUNT=3", at(2025, 1, 3)).unwrap();
            assert_eq!(next, None);
        }

        #[test]
        fn test_next_before_series_start() {
            let next = next_occurrence(at(2025, 1, 1), None, "FREQ=DAILY;COUNT=3", at(2024, 6, 1))
                .unwrap()
                .unwrap();
            assert_eq!(next.start, at(2025, 1, 1));
        }
    }

    mod membership_tests {
        use super::*;

        #[rstest]
        #[case("FREQ=DAILY;INTERVAL=3;COUNT=4", date(2025, 1, 10), true)]
        #[case("FREQ=DAILY;INTERVAL=3;COUNT=4", date(2025, 1, 13), false)]
        #[case("FREQ=DAILY;INTERVAL=3", date(2025, 1, 11), false)]
        #[case("FREQ=DAILY", date(2024, 12, 31), false)]
        #[case("FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=6", date(2025, 1, 13), true)]
        #[case("FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=6", date(2025, 1, 15), false)]
        #[case("FREQ=WEEKLY;BYDAY=MO,WE,FR", date(2024, 12, 30), false)]
        #[case("FREQ=WEEKLY;BYDAY=MO,WE,FR", date(2025, 1, 7), false)]
        #[case("FREQ=WEEKLY", date(2025, 1, 22), true)]
        #[case("FREQ=MONTHLY;COUNT=3", date(2025, 3, 1), true)]
        #[case("FREQ=MONTHLY;COUNT=3", date(2025, 4, 1), false)]
        #[case("FREQ=YEARLY;UNTIL=20270101T000000Z", date(2026, 1, 1), true)]
        #[case("FREQ=YEARLY;UNTIL=20270101T000000Z", date(2027, 1, 1), false)]
        fn test_is_occurrence(#[case] rule: &str, #[case] candidate: NaiveDate, #[case] expected: bool) {
            let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
            assert_eq!(is_occurrence(candidate, start, rule).unwrap(), expected);
        }

        #[test]
        fn test_is_occurrence_on_clamped_month_end() {
            assert!(is_occurrence(date(2025, 2, 28), at(2025, 1, 31), "FREQ=MONTHLY").unwrap());
            assert!(!is_occurrence(date(2025, 2, 27), at(2025, 1, 31), "FREQ=MONTHLY").unwrap());
        }

        #[test]
        fn test_is_occurrence_invalid_rule() {
            let result = is_occurrence(date(2025, 1, 1), at(2025, 1, 1), "INTERVAL=2");
            assert!(matches!(result, Err(RecurrenceError::InvalidRule(_))));
        }

        #[test]
        fn test_occurs_between_half_open_window() {
            // 07:00 UTC+8 on Jan 1 is 23:00 UTC on Dec 31.
            let start = Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap();
            let rule = parse_rule("FREQ=DAILY;COUNT=2").unwrap();
            let window = |y, m, d| {
                let from = Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap() - Duration::hours(8);
                (from, from + Duration::days(1))
            };

            let (from, to) = window(2025, 1, 1);
            assert!(rule_occurs_between(&rule, start, from, to).unwrap());
            let (from, to) = window(2025, 1, 2);
            assert!(rule_occurs_between(&rule, start, from, to).unwrap());
            let (from, to) = window(2024, 12, 31);
            assert!(!rule_occurs_between(&rule, start, from, to).unwrap());
            let (from, to) = window(2025, 1, 3);
            assert!(!rule_occurs_between(&rule, start, from, to).unwrap());

            let second = Duration::seconds(1);
            assert!(rule_occurs_between(&rule, start, start, start + second).unwrap());
            assert!(!rule_occurs_between(&rule, start, start - second, start).unwrap());
        }
    }
}
