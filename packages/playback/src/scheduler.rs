//! Cooperative task scheduler driven by a virtual clock.
//!
//! Every timer in a playback session (the autoplay tick, per-frame ring
//! updates, delayed marker fades, the rotation timer and the interaction
//! grace delay) is a [`Task`] queued here. Nothing runs on its own: the
//! owner advances the clock and receives due tasks one at a time, so each
//! task executes atomically with respect to the others. Tests drive the
//! clock directly; the CLI drives it from wall-clock time.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};
use std::time::Duration;

use crate::markers::RingId;
use crate::scene::MarkerId;

/// Handle to a scheduled task, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

/// Work a session performs when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Advance autoplay by one month.
    AutoplayTick,
    /// Step one ring animation to the current frame.
    RingFrame(RingId),
    /// Bring a freshly placed marker to full opacity.
    FadeIn(MarkerId),
    /// Remove a marker that has finished fading out.
    RemoveMarker(MarkerId),
    /// Rotate the globe by one step.
    RotationTick,
    /// End the interaction grace delay after a release event.
    InteractionRelease,
}

#[derive(Debug)]
struct Entry {
    due: Duration,
    seq: u64,
    handle: TaskHandle,
    task: Task,
    period: Option<Duration>,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Priority queue of timers over a monotonically advancing virtual clock.
///
/// Tasks due at the same instant fire in the order they were scheduled.
#[derive(Debug)]
pub struct Scheduler {
    now: Duration,
    frame_interval: Duration,
    queue: BinaryHeap<Reverse<Entry>>,
    live: HashSet<TaskHandle>,
    next_seq: u64,
    next_handle: u64,
}

impl Scheduler {
    /// Creates a scheduler at time zero. `frame_interval` is the spacing of
    /// animation frames handed out by [`Self::request_frame`].
    #[must_use]
    pub fn new(frame_interval: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            frame_interval: frame_interval.max(Duration::from_millis(1)),
            queue: BinaryHeap::new(),
            live: HashSet::new(),
            next_seq: 0,
            next_handle: 0,
        }
    }

    /// Current virtual time.
    #[must_use]
    pub const fn now(&self) -> Duration {
        self.now
    }

    /// Number of tasks that are scheduled and not cancelled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.live.len()
    }

    /// Whether `handle` is still going to fire.
    #[must_use]
    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.live.contains(&handle)
    }

    /// Runs `task` once after `delay`.
    pub fn schedule_once(&mut self, delay: Duration, task: Task) -> TaskHandle {
        let handle = self.allocate_handle();
        self.push(self.now + delay, handle, task, None);
        handle
    }

    /// Runs `task` every `period`, first after one full period. The handle
    /// stays valid across firings until cancelled.
    pub fn schedule_repeating(&mut self, period: Duration, task: Task) -> TaskHandle {
        let period = period.max(Duration::from_nanos(1));
        let handle = self.allocate_handle();
        self.push(self.now + period, handle, task, Some(period));
        handle
    }

    /// Runs `task` at the next frame boundary strictly after now.
    pub fn request_frame(&mut self, task: Task) -> TaskHandle {
        let frame = self.frame_interval.as_nanos();
        let next = (self.now.as_nanos() / frame + 1) * frame;
        let due = Duration::from_nanos(u64::try_from(next).unwrap_or(u64::MAX));
        let handle = self.allocate_handle();
        self.push(due, handle, task, None);
        handle
    }

    /// Cancels a task. Returns `false` if it already fired or was already
    /// cancelled.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        self.live.remove(&handle)
    }

    /// Pops the earliest live task due at or before `until`, moving the
    /// clock to its due time. Repeating tasks are re-queued one period
    /// later under the same handle.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TaskHandle, Task)> {
        loop {
            let due = self.queue.peek()?.0.due;
            if due > until {
                return None;
            }
            let Reverse(entry) = self.queue.pop()?;
            if !self.live.contains(&entry.handle) {
                continue;
            }

            self.now = self.now.max(entry.due);
            match entry.period {
                Some(period) => self.push(entry.due + period, entry.handle, entry.task, Some(period)),
                None => {
                    self.live.remove(&entry.handle);
                }
            }
            return Some((entry.handle, entry.task));
        }
    }

    /// Moves the clock forward to `to` without running anything. Never
    /// moves backwards.
    pub fn advance_clock(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }

    const fn allocate_handle(&mut self) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    fn push(&mut self, due: Duration, handle: TaskHandle, task: Task, period: Option<Duration>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.live.insert(handle);
        self.queue.push(Reverse(Entry {
            due,
            seq,
            handle,
            task,
            period,
        }));
    }
}
