//! Running per-category report totals.

use globe_dataset_models::MonthRecord;
use globe_event_models::EventCategory;
use serde::{Serialize, Serializer, ser::SerializeMap as _};

use crate::classify;

/// Cumulative report count per [`EventCategory`].
///
/// Totals only ever grow through [`accumulate`](Self::accumulate); the only
/// way back down is [`reset`](Self::reset) or a full
/// [`rebuild`](Self::rebuild).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CumulativeCounts {
    totals: [u64; EventCategory::COUNT],
}

impl CumulativeCounts {
    /// Creates an all-zero set of totals.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            totals: [0; EventCategory::COUNT],
        }
    }

    /// Zeroes every category total.
    pub const fn reset(&mut self) {
        self.totals = [0; EventCategory::COUNT];
    }

    /// Adds every location of `month` to its category total.
    pub fn accumulate(&mut self, month: &MonthRecord) {
        for location in &month.locations {
            let category = classify(location);
            self.totals[category.index()] += u64::from(location.count);
        }
    }

    /// Recomputes the totals from scratch over `months[..=through]`.
    ///
    /// `through` is clamped to the last available month.
    pub fn rebuild(&mut self, months: &[MonthRecord], through: usize) {
        self.reset();
        let end = through.saturating_add(1).min(months.len());
        for month in &months[..end] {
            self.accumulate(month);
        }
    }

    /// Total for one category.
    #[must_use]
    pub const fn get(&self, category: EventCategory) -> u64 {
        self.totals[category.index()]
    }

    /// Sum over all categories.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.totals.iter().sum()
    }

    /// `(category, total)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (EventCategory, u64)> + '_ {
        EventCategory::all()
            .iter()
            .map(|category| (*category, self.get(*category)))
    }
}

impl Serialize for CumulativeCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(EventCategory::COUNT))?;
        for (category, total) in self.iter() {
            map.serialize_entry(category.as_ref(), &total)?;
        }
        map.end()
    }
}
