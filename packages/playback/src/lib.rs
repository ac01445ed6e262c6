#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Playback core of the field report globe.
//!
//! A [`Session`] walks a [`globe_dataset_models::Dataset`] month by month,
//! placing one marker per location on a [`SceneRenderer`], animating ring
//! pulses, keeping cumulative per-category totals, and slowly rotating the
//! globe while autoplay runs. Time is virtual: the host advances the clock
//! and the session runs whatever timers fell due.

pub mod camera;
pub mod config;
pub mod controller;
pub mod markers;
pub mod progress;
pub mod readout;
pub mod scene;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use camera::{CameraTracker, InteractionEvent};
pub use config::{PlaybackConfig, PlaybackConfigError};
pub use controller::{PlaybackState, PlaybackStatus, Session};
pub use markers::{MarkerLayer, marker_size};
pub use progress::{NullProgress, ProgressCallback, null_progress};
pub use readout::Readout;
pub use scene::{
    FogSettings, LngLat, MarkerId, MarkerPopup, MarkerSpec, Projection, RingFeature,
    RingLayerStyle, SceneRenderer, ViewOptions,
};
pub use scheduler::{Scheduler, Task, TaskHandle};
