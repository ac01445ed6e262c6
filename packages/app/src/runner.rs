//! Drives a session in real time.
//!
//! The session's clock is virtual; this loop maps wall-clock time onto it
//! on a fixed tokio interval, mirrors month progress to a
//! [`ProgressCallback`], and stops when autoplay ends or `shutdown`
//! resolves.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use globe_playback::progress::readout_message;
use globe_playback::{ProgressCallback, SceneRenderer, Session};
use tokio::time::{Instant, MissedTickBehavior};

/// Why [`run_realtime`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Autoplay passed the last month and paused itself.
    Finished,
    /// Playback was paused or stopped without reaching the end.
    Stopped,
    /// `shutdown` resolved first.
    Interrupted,
}

/// Advances `session` in step with wall-clock time every `frame` until
/// playback stops or `shutdown` resolves.
///
/// Start playback (or seek) before calling; a session that is not playing
/// returns [`RunOutcome::Stopped`] on the first frame.
#[allow(clippy::future_not_send)]
pub async fn run_realtime<R: SceneRenderer>(
    session: &mut Session<R>,
    progress: &Arc<dyn ProgressCallback>,
    frame: Duration,
    shutdown: impl Future<Output = ()>,
) -> RunOutcome {
    let total = session.dataset().len();
    progress.set_total(as_u64(total));

    let base = session.now();
    let start = Instant::now();
    let mut ticker = tokio::time::interval(frame.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut shown = None;
    let outcome = loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break RunOutcome::Interrupted,
            _ = ticker.tick() => {}
        }

        session.advance_to(base + start.elapsed());

        let index = session.state().current_month_index;
        if shown != Some(index) {
            shown = Some(index);
            progress.set_position(as_u64(index.min(total)));
            progress.set_message(readout_message(session.readout()));
            log::info!(
                "{} | cumulative {} reports",
                readout_message(session.readout()),
                session.counts().total()
            );
        }

        if session.state().ended {
            break RunOutcome::Finished;
        }
        if !session.state().is_playing() {
            break RunOutcome::Stopped;
        }
    };

    match outcome {
        RunOutcome::Finished => progress.finish(format!(
            "{} months played, {} reports",
            total,
            session.counts().total()
        )),
        RunOutcome::Stopped | RunOutcome::Interrupted => progress.finish_and_clear(),
    }
    log::debug!("Realtime loop ended: {outcome:?}");
    outcome
}

fn as_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::NaiveDate;
    use globe_dataset_models::{Dataset, LocationRecord, MonthRecord};
    use globe_playback::{LngLat, PlaybackConfig};

    use super::*;
    use crate::headless::LogScene;

    #[derive(Default)]
    struct RecordingProgress {
        positions: Mutex<Vec<u64>>,
        finished: Mutex<Option<String>>,
    }

    impl ProgressCallback for RecordingProgress {
        fn set_total(&self, _total: u64) {}
        fn set_position(&self, pos: u64) {
            self.positions.lock().unwrap().push(pos);
        }
        fn set_message(&self, _msg: String) {}
        fn finish(&self, msg: String) {
            *self.finished.lock().unwrap() = Some(msg);
        }
        fn finish_and_clear(&self) {}
    }

    fn dataset(months: u32) -> Dataset {
        Dataset::new(
            (1..=months)
                .map(|m| MonthRecord {
                    month: format!("2022-{m:02}"),
                    date: NaiveDate::from_ymd_opt(2022, m, 1).unwrap(),
                    total_reports: 2,
                    total_locations: 1,
                    locations: vec![LocationRecord {
                        lat: 0.0,
                        lon: 0.0,
                        count: 2,
                        country_name: None,
                        country_iso3: None,
                        region_name: None,
                        event_name: None,
                        dtype_name: Some("Drought".to_string()),
                        is_covid: false,
                        titles: Vec::new(),
                    }],
                })
                .collect(),
        )
        .unwrap()
    }

    fn fast_session(months: u32) -> Session<LogScene> {
        let config = PlaybackConfig {
            tick_interval_ms: 10,
            ..PlaybackConfig::default()
        };
        Session::new(dataset(months), LogScene::new(LngLat::new(0.0, 0.0)), config)
    }

    #[tokio::test]
    async fn runs_to_the_end() {
        let mut session = fast_session(3);
        session.play();

        let recorder = Arc::new(RecordingProgress::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();
        let outcome = run_realtime(
            &mut session,
            &progress,
            Duration::from_millis(2),
            std::future::pending(),
        )
        .await;

        assert_eq!(outcome, RunOutcome::Finished);
        assert_eq!(session.counts().total(), 6);
        assert_eq!(recorder.positions.lock().unwrap().last(), Some(&3));
        assert!(recorder.finished.lock().unwrap().is_some());
    }

    #[tokio::test]
    async fn shutdown_interrupts() {
        let mut session = fast_session(3);
        session.play();

        let outcome = run_realtime(
            &mut session,
            &globe_playback::null_progress(),
            Duration::from_millis(2),
            std::future::ready(()),
        )
        .await;

        assert_eq!(outcome, RunOutcome::Interrupted);
        assert!(session.state().is_playing());
    }

    #[tokio::test]
    async fn idle_session_stops_immediately() {
        let mut session = fast_session(2);
        session.seek(0);

        let outcome = run_realtime(
            &mut session,
            &globe_playback::null_progress(),
            Duration::from_millis(2),
            std::future::pending(),
        )
        .await;

        assert_eq!(outcome, RunOutcome::Stopped);
    }
}
