#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record types for the pre-aggregated field report dataset.
//!
//! The dataset is a JSON array of [`MonthRecord`]s, one per calendar month,
//! each listing the [`LocationRecord`] hotspots reported that month. Once
//! loaded and validated into a [`Dataset`] it is immutable.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One geographic aggregation point within a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lon: f64,
    /// Number of reports aggregated at this point. Always at least 1.
    pub count: u32,
    /// Country the reports belong to.
    #[serde(default)]
    pub country_name: Option<String>,
    /// ISO 3166-1 alpha-3 code of the country.
    #[serde(default)]
    pub country_iso3: Option<String>,
    /// Regional office name.
    #[serde(default)]
    pub region_name: Option<String>,
    /// Most common emergency event name among the reports.
    #[serde(default)]
    pub event_name: Option<String>,
    /// Most common disaster type name among the reports.
    #[serde(default)]
    pub dtype_name: Option<String>,
    /// Whether the majority of the reports are COVID-19 reports.
    #[serde(default)]
    pub is_covid: bool,
    /// A few unique report titles, used in the detail popup.
    #[serde(default)]
    pub titles: Vec<String>,
}

/// One month aggregation bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRecord {
    /// Display label for the bucket (e.g. `"2020-03"`).
    pub month: String,
    /// First day of the month.
    pub date: NaiveDate,
    /// Pre-computed number of reports in this month.
    pub total_reports: u64,
    /// Pre-computed number of locations in this month.
    pub total_locations: u64,
    /// Hotspots reported this month.
    #[serde(default)]
    pub locations: Vec<LocationRecord>,
}

/// Reasons a sequence of month records is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetValidationError {
    /// The dataset has no months at all.
    #[error("dataset contains no months")]
    Empty,

    /// Months are not strictly ascending by date.
    #[error("month {index} ({current}) is not after the previous month ({previous})")]
    OutOfOrder {
        /// Index of the offending month.
        index: usize,
        /// Date of the month before it.
        previous: NaiveDate,
        /// Date of the offending month.
        current: NaiveDate,
    },

    /// A location reports zero field reports.
    #[error("location {index} in month {month} has a count of zero")]
    ZeroCount {
        /// Label of the month containing the location.
        month: String,
        /// Index of the location within the month.
        index: usize,
    },

    /// A location has coordinates outside the valid range.
    #[error("location {index} in month {month} has invalid coordinates ({lat}, {lon})")]
    InvalidCoordinates {
        /// Label of the month containing the location.
        month: String,
        /// Index of the location within the month.
        index: usize,
        /// Offending latitude.
        lat: f64,
        /// Offending longitude.
        lon: f64,
    },
}

/// A validated, immutable, date-ordered sequence of months.
///
/// Cloning is cheap: the months are shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<MonthRecord>", into = "Vec<MonthRecord>")]
pub struct Dataset {
    months: Arc<[MonthRecord]>,
}

impl Dataset {
    /// Validates `months` and wraps them.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetValidationError`] if the sequence is empty, not
    /// strictly ascending by date, or contains a location with a zero
    /// count or out-of-range coordinates.
    pub fn new(months: Vec<MonthRecord>) -> Result<Self, DatasetValidationError> {
        if months.is_empty() {
            return Err(DatasetValidationError::Empty);
        }

        for (index, pair) in months.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(DatasetValidationError::OutOfOrder {
                    index: index + 1,
                    previous: pair[0].date,
                    current: pair[1].date,
                });
            }
        }

        for month in &months {
            for (index, location) in month.locations.iter().enumerate() {
                if location.count == 0 {
                    return Err(DatasetValidationError::ZeroCount {
                        month: month.month.clone(),
                        index,
                    });
                }
                if !valid_coordinates(location.lat, location.lon) {
                    return Err(DatasetValidationError::InvalidCoordinates {
                        month: month.month.clone(),
                        index,
                        lat: location.lat,
                        lon: location.lon,
                    });
                }
            }
        }

        Ok(Self {
            months: months.into(),
        })
    }

    /// Number of months. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.months.len()
    }

    /// Always `false`; kept for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// The month at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MonthRecord> {
        self.months.get(index)
    }

    /// All months in ascending date order.
    #[must_use]
    pub fn months(&self) -> &[MonthRecord] {
        &self.months
    }

    /// First month of the dataset.
    #[must_use]
    pub fn first(&self) -> &MonthRecord {
        &self.months[0]
    }

    /// Last month of the dataset.
    #[must_use]
    pub fn last(&self) -> &MonthRecord {
        &self.months[self.months.len() - 1]
    }

    /// Sum of the pre-computed `total_reports` over every month.
    #[must_use]
    pub fn total_reports(&self) -> u64 {
        self.months.iter().map(|m| m.total_reports).sum()
    }

    /// Label spanning the whole dataset, e.g. `"2018-03 - 2025-12"`.
    #[must_use]
    pub fn range_label(&self) -> String {
        format!("{} - {}", self.first().month, self.last().month)
    }
}

impl TryFrom<Vec<MonthRecord>> for Dataset {
    type Error = DatasetValidationError;

    fn try_from(months: Vec<MonthRecord>) -> Result<Self, Self::Error> {
        Self::new(months)
    }
}

impl From<Dataset> for Vec<MonthRecord> {
    fn from(dataset: Dataset) -> Self {
        dataset.months.to_vec()
    }
}

fn valid_coordinates(lat: f64, lon: f64) -> bool {
    lat.is_finite() && lon.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(count: u32) -> LocationRecord {
        LocationRecord {
            lat: 10.0,
            lon: 20.0,
            count,
            country_name: None,
            country_iso3: None,
            region_name: None,
            event_name: None,
            dtype_name: None,
            is_covid: false,
            titles: Vec::new(),
        }
    }

    fn month(label: &str, locations: Vec<LocationRecord>) -> MonthRecord {
        MonthRecord {
            month: label.to_string(),
            date: NaiveDate::parse_from_str(&format!("{label}-01"), "%Y-%m-%d").unwrap(),
            total_reports: locations.iter().map(|l| u64::from(l.count)).sum(),
            total_locations: locations.len() as u64,
            locations,
        }
    }

    #[test]
    fn rejects_empty_dataset() {
        assert_eq!(Dataset::new(Vec::new()).unwrap_err(), DatasetValidationError::Empty);
    }

    #[test]
    fn rejects_months_out_of_order() {
        let err = Dataset::new(vec![month("2020-02", vec![]), month("2020-01", vec![])])
            .unwrap_err();
        assert!(matches!(err, DatasetValidationError::OutOfOrder { index: 1, .. }));

        let err = Dataset::new(vec![month("2020-02", vec![]), month("2020-02", vec![])])
            .unwrap_err();
        assert!(matches!(err, DatasetValidationError::OutOfOrder { .. }));
    }

    #[test]
    fn rejects_zero_count_and_bad_coordinates() {
        let err = Dataset::new(vec![month("2020-01", vec![location(1), location(0)])]).unwrap_err();
        assert_eq!(
            err,
            DatasetValidationError::ZeroCount {
                month: "2020-01".to_string(),
                index: 1
            }
        );

        let mut bad = location(3);
        bad.lat = 91.0;
        let err = Dataset::new(vec![month("2020-01", vec![bad])]).unwrap_err();
        assert!(matches!(err, DatasetValidationError::InvalidCoordinates { index: 0, .. }));
    }

    #[test]
    fn summarises_valid_dataset() {
        let dataset = Dataset::new(vec![
            month("2018-03", vec![location(2), location(5)]),
            month("2018-04", vec![location(1)]),
        ])
        .unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.total_reports(), 8);
        assert_eq!(dataset.range_label(), "2018-03 - 2018-04");
        assert!(dataset.get(2).is_none());
    }

    #[test]
    fn deserializes_through_validation() {
        let json = r#"[
            {"month": "2018-03", "date": "2018-03-01", "total_reports": 4, "total_locations": 1,
             "locations": [{"lat": 1.5, "lon": -2.25, "count": 4, "country_name": "Kenya",
                            "event_name": "Kenya: Floods", "dtype_name": "Flood",
                            "is_covid": false, "reports": [11, 12, 13, 14],
                            "titles": ["Kenya floods update"]}]}
        ]"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();
        let location = &dataset.first().locations[0];
        assert_eq!(location.count, 4);
        assert_eq!(location.country_name.as_deref(), Some("Kenya"));
        assert_eq!(location.titles, vec!["Kenya floods update".to_string()]);

        assert!(serde_json::from_str::<Dataset>("[]").is_err());
    }
}
