use chrono::NaiveDate;

/// Anything that sits on the ledger timeline.
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// Which part of the range a sweep segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepSection {
    /// History before the visible range; shapes the starting state but
    /// produces no chart point.
    Seed,
    /// A visible bucket.
    Visible,
}

/// One step of the sweep: the bucket boundary and the items that fall into
/// it (date on or before `up_to`, after the previous boundary).
#[derive(Debug)]
pub struct SweepSegment<'a, T> {
    pub section: SweepSection,
    pub up_to: NaiveDate,
    pub items: &'a [T],
}

/// Two-pointer sweep over a date-ascending item slice.
///
/// Both the bucket boundaries and the items are ordered, so a single
/// monotonically advancing cursor partitions the whole slice in
/// O(items + buckets) - each item is visited exactly once for an entire
/// chart, not once per bucket.
pub struct TimelineSweep<'a, T> {
    boundaries: Vec<NaiveDate>,
    items: &'a [T],
    cursor: usize,
    next_boundary: usize,
}

impl<'a, T: Dated> TimelineSweep<'a, T> {
    /// `boundaries` holds the seed boundary first, then the visible bucket
    /// dates oldest to newest. `items` must be sorted ascending by date;
    /// the engine's entry point establishes this once.
    pub(crate) fn new(boundaries: Vec<NaiveDate>, items: &'a [T]) -> Self {
        debug_assert!(items.windows(2).all(|w| w[0].date() <= w[1].date()));
        TimelineSweep {
            boundaries,
            items,
            cursor: 0,
            next_boundary: 0,
        }
    }
}

impl<'a, T: Dated> Iterator for TimelineSweep<'a, T> {
    type Item = SweepSegment<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let up_to = *self.boundaries.get(self.next_boundary)?;

        let start = self.cursor;
        while self.cursor < self.items.len() && self.items[self.cursor].date() <= up_to {
            self.cursor += 1;
        }

        let section = if self.next_boundary == 0 {
            SweepSection::Seed
        } else {
            SweepSection::Visible
        };
        self.next_boundary += 1;

        Some(SweepSegment {
            section,
            up_to,
            items: &self.items[start..self.cursor],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{Density, Segmentation};

    #[derive(Debug, PartialEq)]
    struct Entry(NaiveDate);

    impl Dated for Entry {
        fn date(&self) -> NaiveDate {
            self.0
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_segment_is_the_seed_section() {
        let seg = Segmentation::select(date(2024, 3, 1), date(2024, 3, 10), Density::Dense);
        let items = [Entry(date(2024, 1, 5)), Entry(date(2024, 3, 5))];

        let segments: Vec<_> = seg.sweep(date(2024, 3, 10), &items).collect();
        assert_eq!(segments[0].section, SweepSection::Seed);
        assert_eq!(segments[0].items, &items[..1]);
        assert!(segments[1..]
            .iter()
            .all(|s| s.section == SweepSection::Visible));
    }

    #[test]
    fn test_every_item_is_yielded_exactly_once() {
        let to = date(2024, 6, 30);
        let seg = Segmentation::select(date(2024, 1, 1), to, Density::Dense);

        let mut items = Vec::new();
        let mut day = date(2023, 11, 1);
        while day <= to {
            items.push(Entry(day));
            day = day + chrono::Duration::days(3);
        }

        let yielded: usize = seg.sweep(to, &items).map(|s| s.items.len()).sum();
        assert_eq!(yielded, items.len());
    }

    #[test]
    fn test_sweep_matches_brute_force_rescan() {
        let to = date(2024, 4, 30);
        let seg = Segmentation::select(date(2024, 2, 1), to, Density::Light);

        let items: Vec<Entry> = (0..120)
            .map(|i| Entry(date(2023, 12, 1) + chrono::Duration::days(i)))
            .collect();

        let mut previous: Option<NaiveDate> = None;
        for segment in seg.sweep(to, &items) {
            let expected: Vec<&Entry> = items
                .iter()
                .filter(|e| {
                    e.0 <= segment.up_to && previous.map_or(true, |p| e.0 > p)
                })
                .collect();
            let got: Vec<&Entry> = segment.items.iter().collect();
            assert_eq!(got, expected, "bucket at {}", segment.up_to);
            previous = Some(segment.up_to);
        }
    }

    #[test]
    fn test_items_beyond_the_range_are_never_yielded() {
        let to = date(2024, 3, 10);
        let seg = Segmentation::select(date(2024, 3, 1), to, Density::Dense);
        let items = [Entry(date(2024, 3, 5)), Entry(date(2024, 7, 1))];

        let yielded: usize = seg.sweep(to, &items).map(|s| s.items.len()).sum();
        assert_eq!(yielded, 1);
    }

    #[test]
    fn test_empty_item_list_yields_empty_buckets() {
        let to = date(2024, 3, 10);
        let seg = Segmentation::select(date(2024, 3, 1), to, Density::Dense);
        let items: [Entry; 0] = [];

        let segments: Vec<_> = seg.sweep(to, &items).collect();
        assert_eq!(segments.len(), seg.bucket_count + 1);
        assert!(segments.iter().all(|s| s.items.is_empty()));
    }
}
