//! Text the UI binds to: month labels, monthly totals and timeline state.

use globe_dataset_models::Dataset;
use serde::Serialize;

/// Label of the play/pause button while playing.
pub const PAUSE_LABEL: &str = "⏸ Pause";

/// Label of the play/pause button while not playing.
pub const PLAY_LABEL: &str = "▶ Play";

/// Placeholder shown for the current month when nothing is displayed.
pub const NO_MONTH: &str = "--";

/// Display values derived from playback state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readout {
    /// Current month as `"March 2018"`, or [`NO_MONTH`].
    pub current_month: String,
    /// Reports in the displayed month.
    pub monthly_reports: u64,
    /// Locations in the displayed month.
    pub monthly_locations: u64,
    /// Timeline caption: the month label, or the dataset range when stopped.
    pub timeline_label: String,
    /// Timeline fill in percent.
    pub timeline_progress: f64,
    /// Reports over the whole dataset.
    pub total_reports: u64,
    /// Speed caption, e.g. `"2x"`.
    pub speed_label: String,
    /// Play/pause button caption.
    pub play_label: &'static str,
    /// Set when autoplay stopped because it ran past the last month.
    pub ended: bool,
}

impl Readout {
    /// Blank readout shown before playback starts and after a restart.
    #[must_use]
    pub fn stopped(dataset: &Dataset, speed: u32) -> Self {
        Self {
            current_month: NO_MONTH.to_string(),
            monthly_reports: 0,
            monthly_locations: 0,
            timeline_label: dataset.range_label(),
            timeline_progress: 0.0,
            total_reports: dataset.total_reports(),
            speed_label: speed_label(speed),
            play_label: PLAY_LABEL,
            ended: false,
        }
    }

    /// Updates the month fields for the month at `index`.
    pub fn show_month(&mut self, dataset: &Dataset, index: usize) {
        let Some(month) = dataset.get(index) else {
            return;
        };
        self.current_month = month.date.format("%B %Y").to_string();
        self.monthly_reports = month.total_reports;
        self.monthly_locations = month.total_locations;
        self.timeline_label.clone_from(&month.month);
        self.timeline_progress = timeline_progress(index, dataset.len());
    }

    /// Switches the play/pause caption.
    pub const fn set_playing(&mut self, playing: bool) {
        self.play_label = if playing { PAUSE_LABEL } else { PLAY_LABEL };
    }

    /// Updates the speed caption.
    pub fn set_speed(&mut self, speed: u32) {
        self.speed_label = speed_label(speed);
    }
}

fn speed_label(speed: u32) -> String {
    format!("{speed}x")
}

#[allow(clippy::cast_precision_loss)]
fn timeline_progress(index: usize, len: usize) -> f64 {
    if len <= 1 {
        return 100.0;
    }
    index as f64 / (len - 1) as f64 * 100.0
}
