//! The playback state machine.
//!
//! A [`Session`] owns everything one visualization needs: the dataset, the
//! playback state, the scheduler, the scene renderer, the markers and
//! rings, the cumulative counts and the camera tracker. User commands
//! (`play`, `pause`, `restart`, `set_speed`, `seek`, scrubbing, interaction
//! events) mutate it directly; timers run when the owner advances the
//! clock with [`Session::advance_to`].
//!
//! ```text
//!            play                      tick past last month
//! Stopped ─────────▶ Playing ◀──────▶ Paused ◀───────────── Playing
//!    ▲                 play / pause      │
//!    └──────────── restart ──────────────┘   (seek: any state ─▶ Paused)
//! ```

use std::time::Duration;

use globe_dataset_models::Dataset;
use globe_event::CumulativeCounts;

use crate::camera::{CameraTracker, InteractionEvent};
use crate::config::PlaybackConfig;
use crate::markers::{MarkerLayer, MarkerTimings};
use crate::readout::Readout;
use crate::scene::{FogSettings, RingLayerStyle, SceneRenderer};
use crate::scheduler::{Scheduler, Task, TaskHandle};

/// Coarse playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Nothing displayed; the next `play` starts from the first month.
    Stopped,
    /// Autoplay is advancing through the months.
    Playing,
    /// A month may be displayed but autoplay is not running.
    Paused,
}

/// Position and mode of playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    /// Index of the next month autoplay will display. Ranges over
    /// `0..=len`; `len` means the last month has been shown.
    pub current_month_index: usize,
    /// Current mode.
    pub status: PlaybackStatus,
    /// Speed multiplier, `1..=max_speed`.
    pub speed_multiplier: u32,
    /// Set when autoplay paused itself after the last month.
    pub ended: bool,
}

impl PlaybackState {
    /// Whether autoplay is running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }
}

/// One visualization session driving a [`SceneRenderer`].
pub struct Session<R: SceneRenderer> {
    dataset: Dataset,
    config: PlaybackConfig,
    state: PlaybackState,
    scheduler: Scheduler,
    scene: R,
    markers: MarkerLayer,
    counts: CumulativeCounts,
    camera: CameraTracker,
    readout: Readout,
    autoplay: Option<TaskHandle>,
    rotation: Option<TaskHandle>,
    scrubbing: bool,
}

impl<R: SceneRenderer> Session<R> {
    /// Creates a stopped session at time zero.
    #[must_use]
    pub fn new(dataset: Dataset, scene: R, config: PlaybackConfig) -> Self {
        let timings = MarkerTimings {
            fade_in_delay: config.fade_in_delay(),
            fade_out: config.fade_out(),
            ring_duration: config.ring_duration(),
        };
        let readout = Readout::stopped(&dataset, 1);

        Self {
            scheduler: Scheduler::new(config.frame_interval()),
            markers: MarkerLayer::new(timings),
            camera: CameraTracker::new(config.interaction_grace(), config.rotation_step_degrees),
            state: PlaybackState {
                current_month_index: 0,
                status: PlaybackStatus::Stopped,
                speed_multiplier: 1,
                ended: false,
            },
            counts: CumulativeCounts::new(),
            autoplay: None,
            rotation: None,
            scrubbing: false,
            dataset,
            config,
            scene,
            readout,
        }
    }

    /// Playback position and mode.
    #[must_use]
    pub const fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Cumulative per-category totals.
    #[must_use]
    pub const fn counts(&self) -> &CumulativeCounts {
        &self.counts
    }

    /// Display values.
    #[must_use]
    pub const fn readout(&self) -> &Readout {
        &self.readout
    }

    /// The dataset being played.
    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Markers and rings on the scene.
    #[must_use]
    pub const fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    /// The scene renderer.
    #[must_use]
    pub const fn scene(&self) -> &R {
        &self.scene
    }

    /// Mutable access to the scene renderer.
    pub const fn scene_mut(&mut self) -> &mut R {
        &mut self.scene
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Number of timers still scheduled.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Starts autoplay. No-op while already playing.
    ///
    /// From [`PlaybackStatus::Stopped`] the counts are reset and the first
    /// month is shown immediately; otherwise autoplay continues from the
    /// current index.
    pub fn play(&mut self) {
        if self.state.is_playing() {
            return;
        }

        let from_start = self.state.status == PlaybackStatus::Stopped;
        self.state.status = PlaybackStatus::Playing;
        self.state.ended = false;
        self.readout.ended = false;
        self.readout.set_playing(true);

        if from_start {
            self.counts.reset();
            self.state.current_month_index = 0;
            self.advance_month();
        }

        let interval = self.config.tick_interval(self.state.speed_multiplier);
        self.autoplay = Some(
            self.scheduler
                .schedule_repeating(interval, Task::AutoplayTick),
        );
        log::debug!(
            "Playing from month {} every {interval:?}",
            self.state.current_month_index
        );
    }

    /// Stops autoplay, keeping the displayed month. No-op unless playing.
    pub fn pause(&mut self) {
        if let Some(handle) = self.autoplay.take() {
            self.scheduler.cancel(handle);
        }
        if self.state.is_playing() {
            self.state.status = PlaybackStatus::Paused;
            self.readout.set_playing(false);
            log::debug!("Paused at month {}", self.state.current_month_index);
        }
    }

    /// The play/pause button: pauses while playing, plays otherwise.
    pub fn toggle(&mut self) {
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Returns to the stopped state: clears markers and rings without a
    /// transition, zeroes the counts and blanks the readout. Does not start
    /// playing.
    pub fn restart(&mut self) {
        self.pause();
        self.markers.clear(&mut self.scene, &mut self.scheduler);
        self.counts.reset();
        self.state.current_month_index = 0;
        self.state.status = PlaybackStatus::Stopped;
        self.state.ended = false;
        self.readout = Readout::stopped(&self.dataset, self.state.speed_multiplier);
        log::debug!("Restarted");
    }

    /// Changes the speed multiplier, clamped to `1..=max_speed`. While
    /// playing, the autoplay timer is restarted at the new interval.
    pub fn set_speed(&mut self, multiplier: u32) {
        let multiplier = multiplier.clamp(1, self.config.max_speed.max(1));
        self.state.speed_multiplier = multiplier;
        self.readout.set_speed(multiplier);
        log::debug!("Speed set to {multiplier}x");

        if self.state.is_playing() {
            self.pause();
            self.play();
        }
    }

    /// Jumps to month `target` (clamped to the dataset).
    ///
    /// Pauses, clears the scene without transitions, recomputes the counts
    /// over every month up to and including the target, and shows the
    /// target month without animation. A following [`Self::play`] continues
    /// with the month after it.
    pub fn seek(&mut self, target: usize) {
        self.pause();
        self.markers.clear(&mut self.scene, &mut self.scheduler);

        let target = target.min(self.dataset.len() - 1);
        self.counts.rebuild(self.dataset.months(), target);
        self.show_month(target, false);

        self.state.current_month_index = target + 1;
        self.state.status = PlaybackStatus::Paused;
        self.state.ended = false;
        self.readout.ended = false;
        log::debug!("Seeked to month {target}");
    }

    /// Month index for a position on the timeline bar, `fraction` being
    /// the horizontal position in `[0, 1]`.
    #[must_use]
    pub fn index_for_fraction(&self, fraction: f64) -> usize {
        let len = self.dataset.len();
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let index = (fraction * len as f64).floor() as usize;
        index.min(len - 1)
    }

    /// Press on the timeline bar: starts a scrub and seeks.
    pub fn begin_scrub(&mut self, fraction: f64) {
        self.scrubbing = true;
        self.seek(self.index_for_fraction(fraction));
    }

    /// Pointer movement; seeks only while a scrub is in progress.
    pub fn scrub(&mut self, fraction: f64) {
        if self.scrubbing {
            self.seek(self.index_for_fraction(fraction));
        }
    }

    /// Pointer release anywhere ends the scrub.
    pub const fn end_scrub(&mut self) {
        self.scrubbing = false;
    }

    /// Displays the month at `index`, replacing the current markers (with a
    /// fade when `animate` is set). Out-of-range indices are ignored.
    ///
    /// Counts are not touched; callers decide how the totals move.
    pub fn show_month(&mut self, index: usize, animate: bool) {
        let Some(month) = self.dataset.get(index) else {
            return;
        };

        let previous = self.markers.take_active();
        if animate {
            self.markers
                .fade_out_markers(previous, &mut self.scene, &mut self.scheduler);
        } else {
            self.markers.remove_now(previous, &mut self.scene);
        }

        for location in &month.locations {
            self.markers
                .create_marker(location, animate, &mut self.scene, &mut self.scheduler);
        }

        self.readout.show_month(&self.dataset, index);
    }

    /// The map style finished loading: applies fog and registers the ring
    /// source and layer.
    pub fn on_style_loaded(&mut self, fog: &FogSettings) {
        self.scene.set_fog(fog);
        self.scene.add_ring_layer(&RingLayerStyle::default());
        self.markers.push_rings(&mut self.scene);
    }

    /// The map finished loading: starts the rotation timer.
    pub fn on_map_loaded(&mut self) {
        if self.rotation.is_none() {
            self.rotation = Some(
                self.scheduler
                    .schedule_repeating(self.config.rotation_interval(), Task::RotationTick),
            );
        }
    }

    /// Forwards user interaction with the map view to the camera tracker.
    pub fn on_interaction(&mut self, event: InteractionEvent) {
        self.camera.record(event, &mut self.scheduler);
    }

    /// Runs every timer due at or before `time`, in order, then moves the
    /// clock to `time`.
    pub fn advance_to(&mut self, time: Duration) {
        while let Some((_, task)) = self.scheduler.pop_due(time) {
            self.dispatch(task);
        }
        self.scheduler.advance_clock(time);
    }

    /// Advances the clock by `delta`.
    pub fn advance_by(&mut self, delta: Duration) {
        self.advance_to(self.scheduler.now() + delta);
    }

    fn dispatch(&mut self, task: Task) {
        match task {
            Task::AutoplayTick => self.on_autoplay_tick(),
            Task::RingFrame(id) => {
                self.markers
                    .on_ring_frame(id, &mut self.scene, &mut self.scheduler);
            }
            Task::FadeIn(id) => self.markers.on_fade_in(id, &mut self.scene),
            Task::RemoveMarker(id) => self.markers.on_remove_marker(id, &mut self.scene),
            Task::RotationTick => self.on_rotation_tick(),
            Task::InteractionRelease => self.camera.on_release_elapsed(),
        }
    }

    fn on_autoplay_tick(&mut self) {
        if !self.state.is_playing() {
            return;
        }
        if self.state.current_month_index >= self.dataset.len() {
            self.state.ended = true;
            self.readout.ended = true;
            self.pause();
            log::debug!("Reached the last month, autoplay paused");
            return;
        }
        self.advance_month();
    }

    /// Shows the month at the current index with animation, adds it to the
    /// counts and moves the index forward.
    fn advance_month(&mut self) {
        let index = self.state.current_month_index;
        self.show_month(index, true);
        if let Some(month) = self.dataset.get(index) {
            self.counts.accumulate(month);
        }
        self.state.current_month_index = index + 1;
    }

    fn on_rotation_tick(&mut self) {
        if self
            .camera
            .should_rotate(self.scheduler.now(), self.state.is_playing())
        {
            let center = self.camera.rotate(self.scene.center());
            self.scene.set_center(center);
        }
    }
}
