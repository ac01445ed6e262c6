//! Reporting hook for hosts that display playback progress.
//!
//! [`ProgressCallback`] lets a host mirror the month position somewhere
//! (an `indicatif` bar in the CLI, nothing in tests) without the playback
//! core knowing how it is rendered.

use std::sync::Arc;

use crate::readout::Readout;

/// Receives month-level progress from a playback run.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of months in the run.
    fn set_total(&self, total: u64);

    /// Sets the number of months shown so far.
    fn set_position(&self, pos: u64);

    /// Updates the caption shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks the run as complete with a final message.
    fn finish(&self, msg: String);

    /// Marks the run as complete and removes the indicator.
    fn finish_and_clear(&self);
}

/// Caption for a readout, e.g. `"March 2018: 42 reports, 7 locations"`.
#[must_use]
pub fn readout_message(readout: &Readout) -> String {
    format!(
        "{}: {} reports, {} locations",
        readout.current_month, readout.monthly_reports, readout.monthly_locations
    )
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn set_position(&self, _pos: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
