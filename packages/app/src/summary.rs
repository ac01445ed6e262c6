//! Whole-dataset totals for `globe summary`.

use std::fmt;

use globe_dataset_models::Dataset;
use globe_event::CumulativeCounts;

/// Totals over every month of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    /// Label of the first month.
    pub first_month: String,
    /// Label of the last month.
    pub last_month: String,
    /// Number of months.
    pub months: usize,
    /// Reports over all months.
    pub total_reports: u64,
    /// Location entries over all months.
    pub total_locations: u64,
    /// Per-category totals through the last month.
    pub counts: CumulativeCounts,
}

impl DatasetSummary {
    /// Summarizes `dataset`.
    #[must_use]
    pub fn new(dataset: &Dataset) -> Self {
        let mut counts = CumulativeCounts::new();
        counts.rebuild(dataset.months(), dataset.len() - 1);

        Self {
            first_month: dataset.first().month.clone(),
            last_month: dataset.last().month.clone(),
            months: dataset.len(),
            total_reports: dataset.total_reports(),
            total_locations: dataset.months().iter().map(|m| m.total_locations).sum(),
            counts,
        }
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} - {} ({} months)",
            self.first_month, self.last_month, self.months
        )?;
        writeln!(f, "{:<14} {}", "Reports", self.total_reports)?;
        writeln!(f, "{:<14} {}", "Locations", self.total_locations)?;
        writeln!(f, "{}", "-".repeat(30))?;
        write_counts(f, &self.counts)
    }
}

/// Writes one `name count` line per category.
///
/// # Errors
///
/// Propagates formatter errors.
pub fn write_counts(f: &mut impl fmt::Write, counts: &CumulativeCounts) -> fmt::Result {
    for (category, count) in counts.iter() {
        writeln!(f, "{:<14} {count}", category.display_name())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATASET: &str = r#"[
        {"month": "2020-01", "date": "2020-01-01", "total_reports": 5, "total_locations": 2,
         "locations": [
            {"lat": 1.0, "lon": 2.0, "count": 2, "is_covid": true},
            {"lat": 3.0, "lon": 4.0, "count": 3, "dtype_name": "Flood"}
         ]},
        {"month": "2020-02", "date": "2020-02-01", "total_reports": 4, "total_locations": 1,
         "locations": [{"lat": 5.0, "lon": 6.0, "count": 4, "dtype_name": "Fire"}]}
    ]"#;

    #[test]
    fn totals_cover_every_month() {
        let dataset = globe_dataset::parse_dataset(DATASET).unwrap();
        let summary = DatasetSummary::new(&dataset);

        assert_eq!(summary.first_month, "2020-01");
        assert_eq!(summary.last_month, "2020-02");
        assert_eq!(summary.months, 2);
        assert_eq!(summary.total_reports, 9);
        assert_eq!(summary.total_locations, 3);
        assert_eq!(summary.counts.total(), 9);

        let text = summary.to_string();
        assert!(text.starts_with("2020-01 - 2020-02 (2 months)"));
        assert_eq!(text.lines().count(), 4 + 9);
    }
}
