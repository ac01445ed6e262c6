#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Event category taxonomy for humanitarian field reports.
//!
//! Every aggregated location is classified into exactly one of the nine
//! [`EventCategory`] variants. The category drives the marker color, the
//! popup label, and which running total the report count is added to.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The fixed set of event categories used for coloring and counting.
///
/// Variant order is the classification priority order and the order in
/// which totals are displayed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum EventCategory {
    /// Reports flagged as COVID-19 related
    Covid,
    /// Reports attached to the Ukraine crisis event
    Ukraine,
    /// Floods and flash floods
    Flood,
    /// Cyclones, hurricanes and typhoons
    Cyclone,
    /// Earthquakes
    Earthquake,
    /// Epidemics and disease outbreaks
    Epidemic,
    /// Droughts and food insecurity linked to drought
    Drought,
    /// Civil unrest, violence and conflict
    CivilUnrest,
    /// Anything not matching another category
    Others,
}

impl EventCategory {
    /// Number of categories.
    pub const COUNT: usize = 9;

    /// Returns all variants of this enum, in priority order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Covid,
            Self::Ukraine,
            Self::Flood,
            Self::Cyclone,
            Self::Earthquake,
            Self::Epidemic,
            Self::Drought,
            Self::CivilUnrest,
            Self::Others,
        ]
    }

    /// Position of this category in [`Self::all()`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Marker and ring color as a CSS hex string.
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Covid => "#ff4444",
            Self::Ukraine => "#ff8800",
            Self::Flood => "#2196F3",
            Self::Cyclone => "#9C27B0",
            Self::Earthquake => "#2600ffff",
            Self::Epidemic => "#4CAF50",
            Self::Drought => "#a4c422ff",
            Self::CivilUnrest => "#795548",
            Self::Others => "#607D8B",
        }
    }

    /// Human-readable label used in popups and count panels.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Covid => "COVID-19",
            Self::Ukraine => "Ukraine",
            Self::Flood => "Flood",
            Self::Cyclone => "Cyclone",
            Self::Earthquake => "Earthquake",
            Self::Epidemic => "Epidemic",
            Self::Drought => "Drought",
            Self::CivilUnrest => "Civil Unrest",
            Self::Others => "Others",
        }
    }
}
