//! Automatic globe rotation, suspended while the user handles the view.

use std::time::Duration;

use crate::scene::LngLat;
use crate::scheduler::{Scheduler, Task, TaskHandle};

/// Pointer, touch and wheel activity on the map view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    /// Mouse button pressed on the map.
    MouseDown,
    /// Mouse button released.
    MouseUp,
    /// Finger placed on the map.
    TouchStart,
    /// Finger lifted.
    TouchEnd,
    /// Scroll wheel.
    Wheel,
    /// Zoom through controls or gestures.
    Zoom,
    /// Map dragged.
    Drag,
}

impl InteractionEvent {
    const fn is_press(self) -> bool {
        matches!(self, Self::MouseDown | Self::TouchStart)
    }

    const fn is_release(self) -> bool {
        matches!(self, Self::MouseUp | Self::TouchEnd)
    }
}

/// Debounced gate deciding whether the rotation timer may move the camera.
#[derive(Debug)]
pub struct CameraTracker {
    grace: Duration,
    step_degrees: f64,
    interacting: bool,
    last_interaction: Option<Duration>,
    pending_release: Option<TaskHandle>,
}

impl CameraTracker {
    /// Creates a tracker that waits `grace` after the last interaction and
    /// rotates `step_degrees` westward per tick.
    #[must_use]
    pub const fn new(grace: Duration, step_degrees: f64) -> Self {
        Self {
            grace,
            step_degrees,
            interacting: false,
            last_interaction: None,
            pending_release: None,
        }
    }

    /// Whether a press is currently held (or its release grace is running).
    #[must_use]
    pub const fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// Records an interaction event at the scheduler's current time.
    ///
    /// Presses set the interacting flag and cancel any pending release.
    /// Releases clear the flag after the grace delay.
    pub fn record(&mut self, event: InteractionEvent, scheduler: &mut Scheduler) {
        self.last_interaction = Some(scheduler.now());

        if event.is_press() {
            self.interacting = true;
            if let Some(handle) = self.pending_release.take() {
                scheduler.cancel(handle);
            }
        } else if event.is_release() {
            if let Some(handle) = self.pending_release.take() {
                scheduler.cancel(handle);
            }
            self.pending_release =
                Some(scheduler.schedule_once(self.grace, Task::InteractionRelease));
        }
    }

    /// Called when the release grace delay elapses.
    pub const fn on_release_elapsed(&mut self) {
        self.interacting = false;
        self.pending_release = None;
    }

    /// Rotation runs only during autoplay, with no interaction in progress,
    /// and once the grace period has passed since the last interaction.
    #[must_use]
    pub fn should_rotate(&self, now: Duration, autoplay: bool) -> bool {
        if !autoplay || self.interacting {
            return false;
        }
        self.last_interaction
            .is_none_or(|last| now.saturating_sub(last) >= self.grace)
    }

    /// Next camera center: one step west, wrapping at the antimeridian.
    #[must_use]
    pub fn rotate(&self, center: LngLat) -> LngLat {
        let mut lng = center.lng - self.step_degrees;
        if lng < -180.0 {
            lng += 360.0;
        }
        LngLat::new(lng, center.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn tracker() -> CameraTracker {
        CameraTracker::new(ms(1_000), 0.1)
    }

    fn fire_releases(tracker: &mut CameraTracker, scheduler: &mut Scheduler, until: Duration) {
        while let Some((_, task)) = scheduler.pop_due(until) {
            if task == Task::InteractionRelease {
                tracker.on_release_elapsed();
            }
        }
        scheduler.advance_clock(until);
    }

    #[test]
    fn rotates_only_during_autoplay() {
        let tracker = tracker();
        assert!(tracker.should_rotate(ms(0), true));
        assert!(!tracker.should_rotate(ms(0), false));
    }

    #[test]
    fn press_suspends_until_release_grace_elapses() {
        let mut tracker = tracker();
        let mut scheduler = Scheduler::new(ms(16));

        tracker.record(InteractionEvent::MouseDown, &mut scheduler);
        assert!(tracker.is_interacting());

        fire_releases(&mut tracker, &mut scheduler, ms(3_000));
        assert!(!tracker.should_rotate(ms(3_000), true));

        tracker.record(InteractionEvent::MouseUp, &mut scheduler);
        fire_releases(&mut tracker, &mut scheduler, ms(3_999));
        assert!(tracker.is_interacting());

        fire_releases(&mut tracker, &mut scheduler, ms(4_000));
        assert!(!tracker.is_interacting());
        assert!(tracker.should_rotate(ms(4_000), true));
    }

    #[test]
    fn new_press_cancels_pending_release() {
        let mut tracker = tracker();
        let mut scheduler = Scheduler::new(ms(16));

        tracker.record(InteractionEvent::TouchStart, &mut scheduler);
        tracker.record(InteractionEvent::TouchEnd, &mut scheduler);
        fire_releases(&mut tracker, &mut scheduler, ms(500));
        tracker.record(InteractionEvent::TouchStart, &mut scheduler);

        fire_releases(&mut tracker, &mut scheduler, ms(2_000));
        assert!(tracker.is_interacting());
    }

    #[test]
    fn wheel_only_delays_rotation() {
        let mut tracker = tracker();
        let mut scheduler = Scheduler::new(ms(16));
        scheduler.advance_clock(ms(200));

        tracker.record(InteractionEvent::Wheel, &mut scheduler);
        assert!(!tracker.is_interacting());
        assert!(!tracker.should_rotate(ms(1_100), true));
        assert!(tracker.should_rotate(ms(1_200), true));
    }

    #[test]
    fn rotation_wraps_at_antimeridian() {
        let tracker = tracker();
        let next = tracker.rotate(LngLat::new(20.0, 5.0));
        assert!((next.lng - 19.9).abs() < 1e-9);
        assert!((next.lat - 5.0).abs() < 1e-9);

        let wrapped = tracker.rotate(LngLat::new(-179.95, 0.0));
        assert!((wrapped.lng - 179.95).abs() < 1e-9);
    }
}
