use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::sweep::{Dated, TimelineSweep};

/// How many points a chart wants per unit of time. `Light` is for small
/// sparkline-style charts, `Dense` for full-page charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Density {
    Light,
    Dense,
}

/// The stride between two bucket boundaries. Multi-unit strides (2 weeks,
/// 2 months) keep the bucket count bounded on long ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStep {
    Days(u32),
    Weeks(u32),
    Months(u32),
}

impl SegmentStep {
    /// The bucket boundary `n` strides before `end`.
    pub fn back_from(&self, end: NaiveDate, n: u32) -> NaiveDate {
        match self {
            SegmentStep::Days(k) => end - Duration::days(i64::from(k * n)),
            SegmentStep::Weeks(k) => end - Duration::weeks(i64::from(k * n)),
            SegmentStep::Months(k) => end
                .checked_sub_months(Months::new(k * n))
                .unwrap_or(NaiveDate::MIN), // only reachable near the calendar's edge
        }
    }
}

/// A bucketing of a date range: stride, visible bucket count, and how many
/// buckets sit between two axis labels.
///
/// Selection walks a fixed decision ladder from the coarsest stride down,
/// keeping the bucket count within roughly 50-370 regardless of how long the
/// range is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmentation {
    pub step: SegmentStep,
    pub bucket_count: usize,
    pub label_every_nth: usize,
}

/// Whole months between two dates: a month counts only once the
/// day-of-month has been reached again.
fn full_months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    if to < from {
        return 0;
    }
    let mut months =
        i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month());
    if to.day() < from.day() {
        months -= 1;
    }
    months.max(0)
}

impl Segmentation {
    /// Picks the stride and label thinning for the range at the given
    /// density.
    pub fn select(from: NaiveDate, to: NaiveDate, density: Density) -> Self {
        let diff_days = (to - from).num_days().max(0);
        let diff_weeks = diff_days / 7;
        let diff_months = full_months_between(from, to);

        let (step, label_every_nth, hops) = match density {
            Density::Light => Self::light_ladder(diff_days, diff_weeks, diff_months),
            Density::Dense => Self::dense_ladder(diff_days, diff_weeks, diff_months),
        };

        Segmentation {
            step,
            // hops strides back from `to`, plus the bucket at `to` itself
            bucket_count: hops as usize + 1,
            label_every_nth,
        }
    }

    fn light_ladder(diff_days: i64, diff_weeks: i64, diff_months: i64) -> (SegmentStep, usize, i64) {
        if diff_months > 30 * 12 {
            // Tick every year
            (SegmentStep::Months(12), 1, diff_months / 12 + 1)
        } else if diff_months > 72 {
            // Tick every 2 months, label every year
            (SegmentStep::Months(2), 6, diff_months / 2 + 1)
        } else if diff_months > 36 {
            // Tick every month, label every 6 months
            (SegmentStep::Months(1), 6, diff_months + 1)
        } else if diff_months > 24 {
            // Tick every month, label every 3 months
            (SegmentStep::Months(1), 3, diff_months + 1)
        } else if diff_weeks > 20 {
            // Tick every week, label every 4 weeks
            (SegmentStep::Weeks(1), 4, diff_weeks + 1)
        } else if diff_days > 50 {
            // Tick every day, label every week
            (SegmentStep::Days(1), 7, diff_days + 1)
        } else {
            (SegmentStep::Days(1), 2, diff_days + 1)
        }
    }

    fn dense_ladder(diff_days: i64, diff_weeks: i64, diff_months: i64) -> (SegmentStep, usize, i64) {
        if diff_months > 30 * 12 {
            // Tick every year; keeps the bucket count bounded however far
            // back the ledger reaches
            (SegmentStep::Months(12), 1, diff_months / 12 + 1)
        } else if diff_months > 5 * 12 {
            // above 5 years
            (SegmentStep::Months(1), 6, diff_months + 1)
        } else if diff_months > 4 * 12 {
            // between 4 and 5 years
            (SegmentStep::Weeks(1), 16, diff_weeks + 1)
        } else if diff_months > 3 * 12 {
            // between 3 and 4 years
            (SegmentStep::Weeks(2), 8, diff_weeks / 2 + 1)
        } else if diff_months > 2 * 12 {
            // between 2 and 3 years
            (SegmentStep::Weeks(1), 8, diff_weeks + 1)
        } else if diff_months > 12 {
            // between 1 and 2 years
            (SegmentStep::Weeks(1), 6, diff_weeks + 1)
        } else if diff_weeks > 6 * 4 {
            // between 6 months and 1 year
            (SegmentStep::Days(1), 30, diff_days + 1)
        } else if diff_days > 60 {
            // between 2 and 6 months
            (SegmentStep::Days(1), 7, diff_days + 1)
        } else {
            (SegmentStep::Days(1), 1, diff_days + 1)
        }
    }

    /// The visible bucket boundaries, oldest first; the last one is `to`.
    pub fn bucket_dates(&self, to: NaiveDate) -> Vec<NaiveDate> {
        (0..self.bucket_count)
            .rev()
            .map(|n| self.step.back_from(to, n as u32))
            .collect()
    }

    /// The boundary of the seed section: everything on or before this date
    /// is history that only shapes the starting state.
    pub fn seed_boundary(&self, to: NaiveDate) -> NaiveDate {
        self.step.back_from(to, self.bucket_count as u32)
    }

    /// A sweep over `items` (sorted ascending by date) aligned to this
    /// segmentation's buckets, ending at `to`.
    pub fn sweep<'a, T: Dated>(&self, to: NaiveDate, items: &'a [T]) -> TimelineSweep<'a, T> {
        let mut boundaries = Vec::with_capacity(self.bucket_count + 1);
        boundaries.push(self.seed_boundary(to));
        boundaries.extend(self.bucket_dates(to));
        TimelineSweep::new(boundaries, items)
    }
}
