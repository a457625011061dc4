//! Contribution-calendar window normalization.
//!
//! Turns an arbitrary-order list of per-day activity counts into the bounded,
//! chronologically ordered, 7-day-bucketed window the site renders as a
//! heatmap. Pure date arithmetic only; fetching and persistence live in
//! `data` and `io`.

use chrono::{Days, NaiveDate};

use crate::domain::{ActivityDay, ContributionWindow};

/// Trailing window length in days (a year plus a few days of slack, so the
/// first rendered week is always complete).
pub const WINDOW_DAYS: u64 = 370;

const WEEK_LEN: usize = 7;

/// Normalize raw per-day records into the published contribution window.
///
/// `today` bounds the window and is injected by the caller (the pipeline
/// passes the current local date), keeping the computation deterministic and
/// testable.
///
/// Steps:
/// 1. sort ascending by date; input order is irrelevant
/// 2. keep only days in the inclusive range `[today - 370d, today]`; future
///    dates are dropped
/// 3. if the newest surviving day is older than `today`, append a zero-count
///    sentinel for `today` so the window always reaches the present
/// 4. bucket positionally into groups of 7, oldest first; the final bucket
///    keeps the remainder
///
/// Same-date duplicates are not collapsed: both records survive into the
/// output and both contribute to `total`. The upstream is treated as
/// authoritative about what constitutes a day record.
pub fn build_window(mut days: Vec<ActivityDay>, today: NaiveDate) -> ContributionWindow {
    days.sort_by_key(sort_key);

    let start_day = today - Days::new(WINDOW_DAYS);
    days.retain(|d| d.date >= start_day && d.date <= today);

    let needs_sentinel = days.last().is_some_and(|last| last.date != today);
    if needs_sentinel {
        days.push(ActivityDay {
            date: today,
            count: 0,
            level: 0,
        });
        days.sort_by_key(sort_key);
    }

    let total = days.iter().map(|d| u64::from(d.count)).sum();
    ContributionWindow {
        total,
        weeks: bucket_weeks(days),
    }
}

/// Full-record sort key: primary order is the date; count/level break ties so
/// the output is identical for every permutation of the input.
fn sort_key(day: &ActivityDay) -> (NaiveDate, u32, u8) {
    (day.date, day.count, day.level)
}

/// Split ordered days into 7-day buckets; the last bucket keeps the remainder
/// (1-6 days). No calendar alignment or padding, purely positional.
fn bucket_weeks(days: Vec<ActivityDay>) -> Vec<Vec<ActivityDay>> {
    days.chunks(WEEK_LEN).map(<[ActivityDay]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn day(s: &str, count: u32, level: u8) -> ActivityDay {
        ActivityDay {
            date: date(s),
            count,
            level,
        }
    }

    fn flatten(window: &ContributionWindow) -> Vec<ActivityDay> {
        window.weeks.iter().flatten().cloned().collect()
    }

    /// A gap-free run of `len` days ending exactly at `end`.
    fn contiguous_run(end: NaiveDate, len: u64) -> Vec<ActivityDay> {
        let start = end - Days::new(len - 1);
        (0..len)
            .map(|i| ActivityDay {
                date: start + Days::new(i),
                count: (i % 5) as u32,
                level: (i % 4) as u8,
            })
            .collect()
    }

    #[test]
    fn sorted_full_window_passes_through_unchanged() {
        let today = date("2024-06-15");
        let days = contiguous_run(today, 371);

        let window = build_window(days.clone(), today);

        assert_eq!(flatten(&window), days, "ordered input must round-trip");
        assert_eq!(window.weeks.len(), 53, "371 days is exactly 53 buckets");
        assert!(
            window.weeks.iter().all(|w| w.len() == 7),
            "371 = 53 * 7, every bucket must be full"
        );
    }

    #[test]
    fn output_is_invariant_under_input_permutation() {
        let today = date("2024-06-15");
        let days = vec![
            day("2024-06-10", 3, 1),
            day("2024-06-11", 0, 0),
            day("2024-06-12", 7, 3),
            day("2024-06-13", 1, 1),
        ];

        let reference = build_window(days.clone(), today);

        let mut reversed = days.clone();
        reversed.reverse();
        let mut rotated = days.clone();
        rotated.rotate_left(2);
        let swapped = vec![
            days[2].clone(),
            days[0].clone(),
            days[3].clone(),
            days[1].clone(),
        ];

        for permuted in [reversed, rotated, swapped] {
            assert_eq!(
                build_window(permuted, today),
                reference,
                "window must not depend on input order"
            );
        }
    }

    #[test]
    fn days_outside_the_window_are_dropped() {
        let today = date("2024-06-15");
        let start = today - Days::new(WINDOW_DAYS);

        let window = build_window(
            vec![
                day("2024-06-20", 9, 4),       // future
                day("2022-01-01", 9, 4),       // far past
                ActivityDay {
                    date: start - Days::new(1), // one day before the cutoff
                    count: 9,
                    level: 4,
                },
                ActivityDay {
                    date: start, // exactly at the cutoff, kept
                    count: 2,
                    level: 1,
                },
                day("2024-06-15", 4, 2),
            ],
            today,
        );

        let days = flatten(&window);
        assert_eq!(days.len(), 2, "only in-range days survive");
        assert!(
            days.iter().all(|d| d.date >= start && d.date <= today),
            "every surviving date must be inside [start, today]"
        );
        assert_eq!(days[0].date, start);
        assert_eq!(window.total, 6);
    }

    #[test]
    fn sentinel_is_appended_when_latest_day_is_stale() {
        let today = date("2024-06-15");
        let window = build_window(
            vec![day("2024-06-10", 2, 1), day("2024-06-12", 5, 2)],
            today,
        );

        let days = flatten(&window);
        assert_eq!(days.len(), 3);
        assert_eq!(
            days.last().unwrap(),
            &ActivityDay {
                date: today,
                count: 0,
                level: 0
            },
            "window must be padded out to today with a zero-count day"
        );
    }

    #[test]
    fn sentinel_is_suppressed_when_today_is_present() {
        let today = date("2024-06-15");
        let input = vec![
            day("2024-06-13", 1, 1),
            day("2024-06-14", 2, 1),
            day("2024-06-15", 3, 2),
        ];

        let window = build_window(input.clone(), today);

        let days = flatten(&window);
        assert_eq!(days.len(), input.len(), "nothing may be appended");
        assert_eq!(days.last(), input.last());
    }

    #[test]
    fn fifteen_days_bucket_as_seven_seven_one() {
        let today = date("2024-06-15");
        let days = contiguous_run(today, 15);

        let window = build_window(days.clone(), today);

        let sizes: Vec<usize> = window.weeks.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![7, 7, 1]);
        assert_eq!(
            flatten(&window),
            days,
            "bucket concatenation must equal the ordered day list"
        );
    }

    #[test]
    fn total_sums_counts_including_the_sentinel() {
        let today = date("2024-06-15");
        let window = build_window(
            vec![day("2024-06-11", 2, 1), day("2024-06-12", 0, 0), day("2024-06-13", 5, 2)],
            today,
        );

        let days = flatten(&window);
        let expected: u64 = days.iter().map(|d| u64::from(d.count)).sum();
        assert_eq!(window.total, expected);
        assert_eq!(window.total, 7, "sentinel and explicit zero add nothing");
        assert!(
            days.iter().any(|d| d.count == 0) && days.iter().any(|d| d.count > 0),
            "test input must cover both zero and non-zero counts"
        );
    }

    #[test]
    fn empty_input_yields_empty_window_without_sentinel() {
        let window = build_window(Vec::new(), date("2024-06-15"));
        assert_eq!(window.total, 0);
        assert!(window.weeks.is_empty(), "no sentinel for an empty window");
    }

    #[test]
    fn same_date_duplicates_survive_and_inflate_total() {
        // Deliberately preserved upstream-trusting behavior: duplicates are
        // not collapsed, so both records land in the output and the total.
        let today = date("2024-06-15");
        let window = build_window(
            vec![day("2024-06-14", 3, 1), day("2024-06-14", 3, 1)],
            today,
        );

        let days = flatten(&window);
        assert_eq!(days.len(), 3, "two duplicates plus the sentinel");
        assert_eq!(window.total, 6);
    }
}
