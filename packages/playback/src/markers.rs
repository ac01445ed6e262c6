//! Marker placement, fade transitions and ring pulse animations.
//!
//! [`MarkerLayer`] owns every marker and ring the session has put on the
//! scene. Markers are created at full size immediately, optionally fading
//! in after a short delay and emitting a ring pulse. Replaced markers fade
//! out and are removed once the fade delay elapses. Ring pulses advance
//! once per animation frame until their progress reaches 1.
//!
//! All timer callbacks look their target up before touching it: a marker
//! or ring may have been cleared by a restart or seek between scheduling
//! and firing, in which case the callback does nothing.

use std::time::Duration;

use globe_dataset_models::LocationRecord;
use globe_event::classify;

use crate::scene::{LngLat, MarkerId, MarkerPopup, MarkerSpec, RingFeature, SceneRenderer};
use crate::scheduler::{Scheduler, Task, TaskHandle};

/// Smallest marker diameter, used for single-report locations.
pub const MIN_MARKER_SIZE: f64 = 8.0;

/// Largest marker diameter.
pub const MAX_MARKER_SIZE: f64 = 25.0;

/// Marker diameter for a location with `count` reports.
///
/// Grows with the logarithm of the count and saturates at
/// [`MAX_MARKER_SIZE`].
#[must_use]
pub fn marker_size(count: u32) -> f64 {
    let count = f64::from(count.max(1));
    count.ln().mul_add(3.0, MIN_MARKER_SIZE).min(MAX_MARKER_SIZE)
}

/// Identifier of a ring pulse animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RingId(u64);

/// State of one active ring pulse.
#[derive(Debug, Clone, PartialEq)]
pub struct RingAnimation {
    /// Identifier used by frame callbacks.
    pub id: RingId,
    /// Ring center.
    pub position: LngLat,
    /// CSS color.
    pub color: &'static str,
    /// Base radius.
    pub size: f64,
    /// Progress in `[0, 1]`.
    pub progress: f64,
    started_at: Duration,
    frame: Option<TaskHandle>,
}

impl RingAnimation {
    const fn feature(&self) -> RingFeature {
        RingFeature {
            position: self.position,
            color: self.color,
            size: self.size,
            progress: self.progress,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FadingMarker {
    id: MarkerId,
    removal: TaskHandle,
}

/// Timing used by [`MarkerLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerTimings {
    /// Delay before a new marker becomes fully opaque.
    pub fade_in_delay: Duration,
    /// Delay between fading a marker out and removing it.
    pub fade_out: Duration,
    /// Length of one ring pulse.
    pub ring_duration: Duration,
}

/// Markers and ring pulses currently on the scene.
#[derive(Debug)]
pub struct MarkerLayer {
    timings: MarkerTimings,
    next_marker: u64,
    next_ring: u64,
    active: Vec<MarkerId>,
    fading: Vec<FadingMarker>,
    rings: Vec<RingAnimation>,
}

impl MarkerLayer {
    /// Creates an empty layer.
    #[must_use]
    pub const fn new(timings: MarkerTimings) -> Self {
        Self {
            timings,
            next_marker: 0,
            next_ring: 0,
            active: Vec::new(),
            fading: Vec::new(),
            rings: Vec::new(),
        }
    }

    /// Markers belonging to the month on display.
    #[must_use]
    pub fn active_markers(&self) -> &[MarkerId] {
        &self.active
    }

    /// Number of markers fading out and awaiting removal.
    #[must_use]
    pub fn fading_count(&self) -> usize {
        self.fading.len()
    }

    /// Ring pulses in flight.
    #[must_use]
    pub fn rings(&self) -> &[RingAnimation] {
        &self.rings
    }

    /// Places a marker for `location`.
    ///
    /// Size comes from [`marker_size`], color from the location's category.
    /// When `animate` is set the marker starts transparent, fades in after
    /// the fade-in delay, and a ring pulse is started at its position.
    pub fn create_marker<R: SceneRenderer>(
        &mut self,
        location: &LocationRecord,
        animate: bool,
        scene: &mut R,
        scheduler: &mut Scheduler,
    ) -> MarkerId {
        let id = MarkerId(self.next_marker);
        self.next_marker += 1;

        let category = classify(location);
        let spec = MarkerSpec {
            id,
            position: LngLat::from(location),
            size: marker_size(location.count),
            color: category.color(),
            opacity: if animate { 0.0 } else { 1.0 },
            popup: MarkerPopup::new(location, category),
        };
        scene.add_marker(&spec);
        self.active.push(id);

        if animate {
            scheduler.schedule_once(self.timings.fade_in_delay, Task::FadeIn(id));
            self.create_ring_animation(spec.position, spec.size, spec.color, scene, scheduler);
        }

        id
    }

    /// Starts a ring pulse and requests its first animation frame.
    pub fn create_ring_animation<R: SceneRenderer>(
        &mut self,
        position: LngLat,
        size: f64,
        color: &'static str,
        scene: &mut R,
        scheduler: &mut Scheduler,
    ) -> RingId {
        let id = RingId(self.next_ring);
        self.next_ring += 1;

        let frame = scheduler.request_frame(Task::RingFrame(id));
        self.rings.push(RingAnimation {
            id,
            position,
            color,
            size,
            progress: 0.0,
            started_at: scheduler.now(),
            frame: Some(frame),
        });
        self.push_rings(scene);

        id
    }

    /// Advances one ring to the current time. Finished rings are dropped;
    /// unfinished ones request another frame.
    pub fn on_ring_frame<R: SceneRenderer>(
        &mut self,
        id: RingId,
        scene: &mut R,
        scheduler: &mut Scheduler,
    ) {
        let duration = self.timings.ring_duration.as_secs_f64();
        let now = scheduler.now();
        let Some(position) = self.rings.iter().position(|ring| ring.id == id) else {
            return;
        };

        let ring = &mut self.rings[position];
        let elapsed = now.saturating_sub(ring.started_at).as_secs_f64();
        ring.progress = if duration > 0.0 {
            (elapsed / duration).min(1.0)
        } else {
            1.0
        };

        if ring.progress < 1.0 {
            ring.frame = Some(scheduler.request_frame(Task::RingFrame(id)));
            self.push_rings(scene);
        } else {
            self.rings.remove(position);
            self.push_rings(scene);
        }
    }

    /// Brings a marker to full opacity if it is still on display.
    pub fn on_fade_in<R: SceneRenderer>(&self, id: MarkerId, scene: &mut R) {
        if self.active.contains(&id) {
            scene.set_marker_opacity(id, 1.0);
        }
    }

    /// Detaches and returns the markers of the month on display.
    pub fn take_active(&mut self) -> Vec<MarkerId> {
        std::mem::take(&mut self.active)
    }

    /// Fades `markers` out and schedules each for removal after the
    /// fade-out delay.
    pub fn fade_out_markers<R: SceneRenderer>(
        &mut self,
        markers: Vec<MarkerId>,
        scene: &mut R,
        scheduler: &mut Scheduler,
    ) {
        for id in markers {
            scene.set_marker_opacity(id, 0.0);
            let removal = scheduler.schedule_once(self.timings.fade_out, Task::RemoveMarker(id));
            self.fading.push(FadingMarker { id, removal });
        }
    }

    /// Removes a faded marker when its removal timer fires.
    pub fn on_remove_marker<R: SceneRenderer>(&mut self, id: MarkerId, scene: &mut R) {
        if let Some(position) = self.fading.iter().position(|m| m.id == id) {
            self.fading.swap_remove(position);
            scene.remove_marker(id);
        }
    }

    /// Removes `markers` right away, without a transition.
    pub fn remove_now<R: SceneRenderer>(&mut self, markers: Vec<MarkerId>, scene: &mut R) {
        for id in markers {
            scene.remove_marker(id);
        }
    }

    /// Removes every marker and ring immediately and cancels their timers.
    pub fn clear<R: SceneRenderer>(&mut self, scene: &mut R, scheduler: &mut Scheduler) {
        let active = self.take_active();
        self.remove_now(active, scene);

        for fading in self.fading.drain(..) {
            scheduler.cancel(fading.removal);
            scene.remove_marker(fading.id);
        }

        for ring in self.rings.drain(..) {
            if let Some(frame) = ring.frame {
                scheduler.cancel(frame);
            }
        }
        self.push_rings(scene);
    }

    /// Pushes the full active ring set to the scene's ring source.
    pub fn push_rings<R: SceneRenderer>(&self, scene: &mut R) {
        let features: Vec<RingFeature> = self.rings.iter().map(RingAnimation::feature).collect();
        if !scene.update_ring_data(&features) {
            log::trace!("Ring source not available, skipped {} ring(s)", features.len());
        }
    }
}
