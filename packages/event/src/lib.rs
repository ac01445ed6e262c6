#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Event classification and running totals.
//!
//! [`classify`] maps a [`LocationRecord`](globe_dataset_models::LocationRecord)
//! to its [`EventCategory`](globe_event_models::EventCategory), and
//! [`CumulativeCounts`] keeps the per-category report totals that grow as
//! playback moves forward through the months.

pub mod classify;
pub mod counters;

pub use classify::classify;
pub use counters::CumulativeCounts;
