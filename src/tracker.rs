//! The one piece of real state in the app: a pending session that is either
//! idle or running. A running session owns a [Ticker] that refreshes the
//! elapsed readout once per second; the row is written exactly once, on stop.

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::backend::{BackendError, TaskStore};
use crate::models::{AuthSession, Category, NewTask, Task};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("A title is required")]
    EmptyTitle,
    #[error("A session is already running")]
    AlreadyRunning,
    #[error("{0}")]
    Backend(#[from] BackendError),
}

/// Fields the user edits before and during a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSession {
    pub title: String,
    pub category: Category,
    pub notes: String,
    pub is_productive: bool,
}

impl Default for PendingSession {
    fn default() -> Self {
        Self {
            title: String::new(),
            category: Category::Study,
            notes: String::new(),
            is_productive: true,
        }
    }
}

/// Periodic display refresh owned by a running session. Dropping it stops the ticking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    period: Duration,
    next_due: DateTime<Utc>,
}

impl Ticker {
    pub fn new(started: DateTime<Utc>, period: Duration) -> Self {
        Self {
            period,
            next_due: started + period,
        }
    }

    /// True when at least one period has passed since the last fire.
    /// Missed periods collapse into a single fire.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if now < self.next_due {
            return false;
        }
        while self.next_due <= now {
            self.next_due += self.period;
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningSession {
    pub start_time: DateTime<Utc>,
    ticker: Ticker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Running(RunningSession),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StopOutcome {
    /// Nothing was running; no insert was made
    NotRunning,
    Saved(Task),
}

#[derive(Debug)]
pub struct Tracker {
    pending: PendingSession,
    state: TrackerState,
    elapsed_secs: i64,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            pending: PendingSession::default(),
            state: TrackerState::Idle,
            elapsed_secs: 0,
        }
    }

    pub fn pending(&self) -> &PendingSession {
        &self.pending
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TrackerState::Running(_))
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        match &self.state {
            TrackerState::Running(running) => Some(running.start_time),
            TrackerState::Idle => None,
        }
    }

    /// Seconds shown on the readout; refreshed by [Tracker::tick]
    pub fn elapsed_secs(&self) -> i64 {
        self.elapsed_secs
    }

    /// Whether the start/stop control is usable
    pub fn can_toggle(&self) -> bool {
        !self.pending.title.trim().is_empty()
    }

    pub fn set_title(&mut self, title: String) {
        self.pending.title = title;
    }

    pub fn set_notes(&mut self, notes: String) {
        self.pending.notes = notes;
    }

    pub fn set_category(&mut self, category: Category) {
        self.pending.category = category;
    }

    pub fn next_category(&mut self) {
        self.pending.category = self.pending.category.next();
    }

    pub fn previous_category(&mut self) {
        self.pending.category = self.pending.category.previous();
    }

    pub fn toggle_productive(&mut self) {
        self.pending.is_productive = !self.pending.is_productive;
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TrackerError> {
        if self.is_running() {
            return Err(TrackerError::AlreadyRunning);
        }
        if self.pending.title.trim().is_empty() {
            return Err(TrackerError::EmptyTitle);
        }

        self.state = TrackerState::Running(RunningSession {
            start_time: now,
            ticker: Ticker::new(now, Duration::seconds(1)),
        });
        self.elapsed_secs = 0;
        info!(title = %self.pending.title.trim(), category = self.pending.category.id(), "tracking started");
        Ok(())
    }

    /// Refresh the elapsed readout if the ticker is due. Returns whether it changed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let TrackerState::Running(running) = &mut self.state else {
            return false;
        };
        if !running.ticker.poll(now) {
            return false;
        }
        let elapsed = (now - running.start_time).num_seconds().max(0);
        let changed = elapsed != self.elapsed_secs;
        self.elapsed_secs = elapsed;
        changed
    }

    /// Close the running session and write it. A blank title or a failed insert
    /// leaves the session running.
    pub fn stop<S: TaskStore + ?Sized>(
        &mut self,
        store: &S,
        session: &AuthSession,
        now: DateTime<Utc>,
    ) -> Result<StopOutcome, TrackerError> {
        let Some(start_time) = self.start_time() else {
            return Ok(StopOutcome::NotRunning);
        };
        if self.pending.title.trim().is_empty() {
            return Err(TrackerError::EmptyTitle);
        }

        // A clock that stepped backwards ends the session at its start
        let row = self.build_row(session, start_time, now.max(start_time));
        match store.insert_task(session, &row) {
            Ok(saved) => {
                info!(task_id = %saved.id, duration = saved.duration, "tracking stopped, task saved");
                self.reset();
                Ok(StopOutcome::Saved(saved))
            }
            Err(e) => {
                warn!(error = %e, "failed to save task, session still running");
                Err(TrackerError::Backend(e))
            }
        }
    }

    /// Drop the running session without saving. Returns true if one was discarded.
    pub fn teardown(&mut self) -> bool {
        let discarded = self.is_running();
        if discarded {
            warn!(title = %self.pending.title, "running session discarded without saving");
        }
        self.state = TrackerState::Idle;
        self.elapsed_secs = 0;
        discarded
    }

    fn build_row(&self, session: &AuthSession, start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> NewTask {
        let notes = self.pending.notes.trim();
        NewTask {
            user_id: session.user.id.clone(),
            title: self.pending.title.trim().to_string(),
            category: self.pending.category,
            start_time,
            end_time: Some(end_time),
            duration: (end_time - start_time).num_seconds(),
            is_productive: self.pending.is_productive,
            notes: if notes.is_empty() { None } else { Some(notes.to_string()) },
        }
    }

    fn reset(&mut self) {
        self.pending = PendingSession::default();
        self.state = TrackerState::Idle;
        self.elapsed_secs = 0;
    }
}

/// Format seconds as `HH:MM:SS`
pub fn format_hms(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let remaining = seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockTaskStore;
    use crate::clock::{Clock, testing::ManualClock};
    use crate::models::User;
    use chrono::TimeZone;

    fn session() -> AuthSession {
        AuthSession {
            access_token: "token".into(),
            user: User {
                id: "user-1".into(),
                email: "ada@example.com".into(),
            },
        }
    }

    fn saved_from(row: &NewTask) -> Task {
        Task {
            id: "task-1".into(),
            user_id: row.user_id.clone(),
            title: row.title.clone(),
            category: row.category,
            start_time: row.start_time,
            end_time: row.end_time,
            duration: row.duration,
            is_productive: row.is_productive,
            notes: row.notes.clone(),
            created_at: row.end_time.unwrap_or(row.start_time),
        }
    }

    #[test]
    fn start_then_stop_inserts_the_expected_row() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        tracker.set_title("Read".into());
        tracker.start(clock.now()).unwrap();

        clock.advance(5);
        let mut store = MockTaskStore::new();
        store
            .expect_insert_task()
            .withf(|_, row| {
                row.duration == 5
                    && row.title == "Read"
                    && row.category == Category::Study
                    && row.is_productive
                    && row.user_id == "user-1"
                    && row.end_time == Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 5).unwrap())
            })
            .times(1)
            .returning(|_, row| Ok(saved_from(row)));

        let outcome = tracker.stop(&store, &session(), clock.now()).unwrap();
        let StopOutcome::Saved(task) = outcome else {
            panic!("expected a saved task");
        };
        assert_eq!(task.duration, 5);
        assert!(task.end_time.unwrap() > task.start_time);
        assert!(!tracker.is_running());
    }

    #[test]
    fn duration_matches_wall_clock_within_a_second() {
        let clock = ManualClock::at("2024-03-10T08:15:00Z");
        let mut tracker = Tracker::new();
        tracker.set_title("Code".into());
        tracker.start(clock.now()).unwrap();
        clock.advance_millis(2_700);

        let mut store = MockTaskStore::new();
        store.expect_insert_task().returning(|_, row| Ok(saved_from(row)));
        let StopOutcome::Saved(task) = tracker.stop(&store, &session(), clock.now()).unwrap() else {
            panic!("expected a saved task");
        };
        assert!((task.duration - 2).abs() <= 1);
        assert!(task.end_time.unwrap() > task.start_time);
    }

    #[test]
    fn stop_while_idle_is_a_no_op() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        tracker.set_title("Read".into());
        let mut store = MockTaskStore::new();
        store.expect_insert_task().never();

        let outcome = tracker.stop(&store, &session(), clock.now()).unwrap();
        assert_eq!(outcome, StopOutcome::NotRunning);
        assert_eq!(tracker.state(), &TrackerState::Idle);
        assert_eq!(tracker.pending().title, "Read");
    }

    #[test]
    fn start_rejects_blank_titles() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        assert!(matches!(tracker.start(clock.now()), Err(TrackerError::EmptyTitle)));
        tracker.set_title("   \t".into());
        assert!(matches!(tracker.start(clock.now()), Err(TrackerError::EmptyTitle)));
        assert!(!tracker.is_running());
        assert!(!tracker.can_toggle());
    }

    #[test]
    fn start_twice_is_rejected() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        tracker.set_title("Read".into());
        tracker.start(clock.now()).unwrap();
        clock.advance(3);
        assert!(matches!(tracker.start(clock.now()), Err(TrackerError::AlreadyRunning)));
        assert_eq!(tracker.start_time(), Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()));
    }

    #[test]
    fn successful_save_resets_pending_fields() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        tracker.set_title("Play".into());
        tracker.set_category(Category::Gaming);
        tracker.set_notes("boss fight".into());
        tracker.toggle_productive();
        tracker.start(clock.now()).unwrap();
        clock.advance(61);
        tracker.tick(clock.now());
        assert_eq!(tracker.elapsed_secs(), 61);

        let mut store = MockTaskStore::new();
        store
            .expect_insert_task()
            .withf(|_, row| {
                row.category == Category::Gaming
                    && !row.is_productive
                    && row.notes.as_deref() == Some("boss fight")
            })
            .returning(|_, row| Ok(saved_from(row)));
        tracker.stop(&store, &session(), clock.now()).unwrap();

        assert_eq!(
            tracker.pending(),
            &PendingSession {
                title: String::new(),
                category: Category::Study,
                notes: String::new(),
                is_productive: true,
            }
        );
        assert_eq!(tracker.elapsed_secs(), 0);
        assert_eq!(tracker.state(), &TrackerState::Idle);
    }

    #[test]
    fn failed_save_keeps_the_session_running() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        tracker.set_title("Read".into());
        tracker.start(clock.now()).unwrap();
        clock.advance(10);

        let mut store = MockTaskStore::new();
        store
            .expect_insert_task()
            .times(1)
            .returning(|_, _| Err(BackendError::InvalidRequest("network down".into())));

        let err = tracker.stop(&store, &session(), clock.now()).unwrap_err();
        assert_eq!(err.to_string(), "network down");
        assert!(tracker.is_running());
        assert_eq!(tracker.pending().title, "Read");
        assert_eq!(tracker.start_time(), Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()));

        // Ticker keeps running after the failure
        clock.advance(2);
        assert!(tracker.tick(clock.now()));
        assert_eq!(tracker.elapsed_secs(), 12);
    }

    #[test]
    fn clearing_the_title_while_running_blocks_stop() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        tracker.set_title("Read".into());
        tracker.start(clock.now()).unwrap();
        assert!(tracker.can_toggle());

        tracker.set_title("  ".into());
        assert!(!tracker.can_toggle());
        clock.advance(5);

        let mut store = MockTaskStore::new();
        store.expect_insert_task().never();
        assert!(matches!(
            tracker.stop(&store, &session(), clock.now()),
            Err(TrackerError::EmptyTitle)
        ));
        assert!(tracker.is_running());
        assert_eq!(tracker.start_time(), Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()));
    }

    #[test]
    fn clock_stepping_back_never_yields_negative_duration() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        tracker.set_title("Read".into());
        tracker.start(clock.now()).unwrap();
        clock.advance(-30);

        let mut store = MockTaskStore::new();
        store
            .expect_insert_task()
            .withf(|_, row| row.duration == 0 && row.end_time == Some(row.start_time))
            .times(1)
            .returning(|_, row| Ok(saved_from(row)));
        let StopOutcome::Saved(task) = tracker.stop(&store, &session(), clock.now()).unwrap() else {
            panic!("expected a saved task");
        };
        assert_eq!(task.duration, 0);
        assert!(task.end_time.unwrap() >= task.start_time);
    }

    #[test]
    fn blank_notes_are_stored_as_null_and_title_is_trimmed() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        tracker.set_title("  Read  ".into());
        tracker.set_notes("   ".into());
        tracker.start(clock.now()).unwrap();

        let mut store = MockTaskStore::new();
        store
            .expect_insert_task()
            .withf(|_, row| row.notes.is_none() && row.title == "Read")
            .returning(|_, row| Ok(saved_from(row)));
        tracker.stop(&store, &session(), clock.now()).unwrap();
    }

    #[test]
    fn category_and_productive_toggle_do_not_change_state() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        tracker.set_title("Read".into());
        tracker.start(clock.now()).unwrap();
        tracker.next_category();
        tracker.toggle_productive();
        assert!(tracker.is_running());
        assert_eq!(tracker.pending().category, Category::Coding);
        assert!(!tracker.pending().is_productive);
        tracker.previous_category();
        assert_eq!(tracker.pending().category, Category::Study);
    }

    #[test]
    fn tick_refreshes_only_when_due() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        assert!(!tracker.tick(clock.now()));

        tracker.set_title("Read".into());
        tracker.start(clock.now()).unwrap();
        clock.advance_millis(500);
        assert!(!tracker.tick(clock.now()));
        assert_eq!(tracker.elapsed_secs(), 0);

        clock.advance_millis(500);
        assert!(tracker.tick(clock.now()));
        assert_eq!(tracker.elapsed_secs(), 1);

        clock.advance(3);
        assert!(tracker.tick(clock.now()));
        assert_eq!(tracker.elapsed_secs(), 4);
    }

    #[test]
    fn ticker_collapses_missed_periods() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let mut ticker = Ticker::new(start, Duration::seconds(1));
        assert!(!ticker.poll(start));
        assert!(ticker.poll(start + Duration::seconds(5)));
        assert!(!ticker.poll(start + Duration::milliseconds(5_500)));
        assert!(ticker.poll(start + Duration::seconds(6)));
    }

    #[test]
    fn teardown_releases_running_state() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut tracker = Tracker::new();
        assert!(!tracker.teardown());
        tracker.set_title("Read".into());
        tracker.start(clock.now()).unwrap();
        clock.advance(4);
        tracker.tick(clock.now());
        assert!(tracker.teardown());
        assert!(!tracker.is_running());
        assert_eq!(tracker.elapsed_secs(), 0);
        clock.advance(4);
        assert!(!tracker.tick(clock.now()));
    }

    #[test]
    fn hms_formatting() {
        assert_eq!(format_hms(0), "00:00:00");
        assert_eq!(format_hms(5), "00:00:05");
        assert_eq!(format_hms(3_725), "01:02:05");
        assert_eq!(format_hms(-3), "00:00:00");
        assert_eq!(format_hms(100 * 3600), "100:00:00");
    }
}
