use chrono::{DateTime, Utc};
use ratatui::widgets::ListState;
use tracing::{info, warn};

use crate::auth::{self, AuthMode, AuthOutcome, SIGN_UP_SUCCESS_MESSAGE};
use crate::backend::{AuthApi, Backend};
use crate::clock::Clock;
use crate::history::TaskHistory;
use crate::models::{AuthSession, Credentials, Profile};
use crate::tracker::{StopOutcome, Tracker, TrackerError};
use crate::tui::widgets::editor::Editor;
use crate::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Auth,
    Dashboard,
    Tracker,
    Analytics,
    Calendar,
}

impl Route {
    /// Routes shown in the navigation bar, in order
    pub const NAV: [Route; 4] = [Route::Dashboard, Route::Tracker, Route::Analytics, Route::Calendar];

    pub fn title(self) -> &'static str {
        match self {
            Route::Auth => "Sign In",
            Route::Dashboard => "Dashboard",
            Route::Tracker => "Tracker",
            Route::Analytics => "Analytics",
            Route::Calendar => "Calendar",
        }
    }

    pub fn requires_session(self) -> bool {
        self != Route::Auth
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Email,
    Password,
    Submit,
    ModeSwitch,
}

impl AuthField {
    pub fn next(self) -> Self {
        match self {
            AuthField::Email => AuthField::Password,
            AuthField::Password => AuthField::Submit,
            AuthField::Submit => AuthField::ModeSwitch,
            AuthField::ModeSwitch => AuthField::Email,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            AuthField::Email => AuthField::ModeSwitch,
            AuthField::Password => AuthField::Email,
            AuthField::Submit => AuthField::Password,
            AuthField::ModeSwitch => AuthField::Submit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthViewState {
    pub mode: AuthMode,
    pub field: AuthField,
    pub email: Editor,
    pub password: Editor,
    /// Set while a submit is queued or in flight
    pub loading: bool,
}

impl Default for AuthViewState {
    fn default() -> Self {
        Self {
            mode: AuthMode::SignIn,
            field: AuthField::Email,
            email: Editor::new(),
            password: Editor::new(),
            loading: false,
        }
    }
}

impl AuthViewState {
    pub fn submit_label(&self) -> &'static str {
        if self.loading {
            "Loading..."
        } else {
            self.mode.submit_label()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerField {
    Title,
    Category,
    Notes,
    Productive,
    Toggle,
}

impl TrackerField {
    pub fn next(self) -> Self {
        match self {
            TrackerField::Title => TrackerField::Category,
            TrackerField::Category => TrackerField::Notes,
            TrackerField::Notes => TrackerField::Productive,
            TrackerField::Productive => TrackerField::Toggle,
            TrackerField::Toggle => TrackerField::Title,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            TrackerField::Title => TrackerField::Toggle,
            TrackerField::Category => TrackerField::Title,
            TrackerField::Notes => TrackerField::Category,
            TrackerField::Productive => TrackerField::Notes,
            TrackerField::Toggle => TrackerField::Productive,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackerViewState {
    pub field: TrackerField,
    pub title: Editor,
    pub notes: Editor,
    pub list_state: ListState,
}

impl Default for TrackerViewState {
    fn default() -> Self {
        Self {
            field: TrackerField::Title,
            title: Editor::new(),
            notes: Editor::new(),
            list_state: ListState::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub shown_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<StatusMessage>,
}

/// Work queued for the next loop iteration, after a frame has been drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    SubmitAuth,
}

pub struct App {
    // Core infrastructure
    pub config: Config,
    backend: Box<dyn Backend>,
    clock: Box<dyn Clock>,

    // Signed-in context; None on the Auth route
    pub session: Option<AuthSession>,
    pub profile: Option<Profile>,

    pub route: Route,
    pub mode: Mode,
    pub auth: AuthViewState,
    pub tracker: Tracker,
    pub tracker_view: TrackerViewState,
    pub history: TaskHistory,
    pub status: StatusState,
    pending: Option<PendingAction>,
}

impl App {
    pub fn new(config: Config, backend: Box<dyn Backend>, clock: Box<dyn Clock>) -> Self {
        Self {
            config,
            backend,
            clock,
            session: None,
            profile: None,
            route: Route::Auth,
            mode: Mode::Normal,
            auth: AuthViewState::default(),
            tracker: Tracker::new(),
            tracker_view: TrackerViewState::default(),
            history: TaskHistory::new(),
            status: StatusState::default(),
            pending: None,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Name shown in the navigation bar
    pub fn display_name(&self) -> Option<&str> {
        match (&self.profile, &self.session) {
            (Some(profile), _) => Some(profile.display_name()),
            (None, Some(session)) => Some(session.user.email.as_str()),
            (None, None) => None,
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status.message = Some(StatusMessage {
            text: text.into(),
            kind,
            shown_at: self.clock.now(),
        });
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
    }

    pub fn check_status_message_timeout(&mut self) {
        let timeout = chrono::Duration::seconds(self.config.status_timeout_secs as i64);
        if let Some(msg) = &self.status.message
            && self.clock.now() - msg.shown_at >= timeout
        {
            self.clear_status_message();
        }
    }

    /// Called once per loop iteration before drawing
    pub fn on_tick(&mut self) {
        let now = self.clock.now();
        self.tracker.tick(now);
        self.check_status_message_timeout();
    }

    pub fn enter_help_mode(&mut self) {
        self.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.mode = Mode::Normal;
    }

    /// Switch routes. Protected routes bounce back to Auth without a session.
    pub fn navigate(&mut self, route: Route) {
        if route.requires_session() && self.session.is_none() {
            self.route = Route::Auth;
            self.set_status(StatusKind::Error, "Sign in required");
            return;
        }
        self.route = route;
        if route == Route::Tracker {
            self.load_history();
        }
    }

    pub fn load_history(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        match self.history.reload(&*self.backend, session) {
            Ok(_) => self.sync_history_selection(),
            Err(e) => self.set_status(StatusKind::Error, format!("Failed to load tasks: {}", e)),
        }
    }

    fn sync_history_selection(&mut self) {
        if self.history.is_empty() {
            self.tracker_view.list_state.select(None);
        } else {
            let selected = self.tracker_view.list_state.selected().unwrap_or(0);
            self.tracker_view
                .list_state
                .select(Some(selected.min(self.history.len() - 1)));
        }
    }

    pub fn move_history_selection_up(&mut self) {
        if let Some(selected) = self.tracker_view.list_state.selected() {
            self.tracker_view.list_state.select(Some(selected.saturating_sub(1)));
        }
    }

    pub fn move_history_selection_down(&mut self) {
        if let Some(selected) = self.tracker_view.list_state.selected()
            && selected + 1 < self.history.len()
        {
            self.tracker_view.list_state.select(Some(selected + 1));
        }
    }

    // Auth view

    pub fn navigate_auth_field(&mut self, forward: bool) {
        self.auth.field = if forward {
            self.auth.field.next()
        } else {
            self.auth.field.previous()
        };
    }

    pub fn get_current_auth_editor(&mut self) -> Option<&mut Editor> {
        match self.auth.field {
            AuthField::Email => Some(&mut self.auth.email),
            AuthField::Password => Some(&mut self.auth.password),
            AuthField::Submit | AuthField::ModeSwitch => None,
        }
    }

    pub fn toggle_auth_mode(&mut self) {
        if self.auth.loading {
            return;
        }
        self.auth.mode = self.auth.mode.toggle();
    }

    /// Mark the form as loading and run the call on the next iteration,
    /// so the "Loading..." label gets drawn first. Ignored while loading.
    pub fn queue_auth_submit(&mut self) {
        if self.auth.loading {
            return;
        }
        self.auth.loading = true;
        self.pending = Some(PendingAction::SubmitAuth);
    }

    pub fn has_pending_action(&self) -> bool {
        self.pending.is_some()
    }

    pub fn run_pending(&mut self) {
        match self.pending.take() {
            Some(PendingAction::SubmitAuth) => {
                self.submit_auth();
                self.auth.loading = false;
            }
            None => {}
        }
    }

    fn submit_auth(&mut self) {
        let credentials = Credentials::new(self.auth.email.text(), self.auth.password.text());
        match auth::submit(&*self.backend, self.auth.mode, &credentials) {
            Ok(AuthOutcome::SignedIn(session)) => {
                self.profile = match self.backend.get_profile(&session) {
                    Ok(profile) => profile,
                    Err(e) => {
                        warn!(error = %e, "failed to load profile");
                        None
                    }
                };
                self.session = Some(session);
                self.auth.password.clear();
                self.clear_status_message();
                self.navigate(Route::Dashboard);
            }
            Ok(AuthOutcome::SignedUp(_)) => {
                self.auth.mode = AuthMode::SignIn;
                self.auth.password.clear();
                self.auth.field = AuthField::Password;
                self.set_status(StatusKind::Success, SIGN_UP_SUCCESS_MESSAGE);
            }
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }

    /// Sign out. On failure the session is kept.
    pub fn logout(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if let Err(e) = auth::sign_out(&*self.backend, session) {
            self.set_status(StatusKind::Error, e.to_string());
            return;
        }

        let discarded = self.tracker.teardown();
        self.session = None;
        self.profile = None;
        self.history.clear();
        self.tracker = Tracker::new();
        self.tracker_view = TrackerViewState::default();
        self.auth = AuthViewState::default();
        self.mode = Mode::Normal;
        self.route = Route::Auth;
        if discarded {
            self.set_status(StatusKind::Info, "Signed out. The running session was not saved");
        } else {
            self.set_status(StatusKind::Info, "Signed out");
        }
    }

    /// Release the running session before exit. Returns whether one was discarded.
    pub fn shutdown(&mut self) -> bool {
        let discarded = self.tracker.teardown();
        if discarded {
            info!("exiting with a running session; it was not saved");
        }
        discarded
    }

    // Tracker view

    pub fn navigate_tracker_field(&mut self, forward: bool) {
        self.tracker_view.field = if forward {
            self.tracker_view.field.next()
        } else {
            self.tracker_view.field.previous()
        };
    }

    pub fn get_current_tracker_editor(&mut self) -> Option<&mut Editor> {
        match self.tracker_view.field {
            TrackerField::Title => Some(&mut self.tracker_view.title),
            TrackerField::Notes => Some(&mut self.tracker_view.notes),
            TrackerField::Category | TrackerField::Productive | TrackerField::Toggle => None,
        }
    }

    /// Copy editor contents into the tracker's pending fields
    pub fn sync_tracker_fields(&mut self) {
        self.tracker.set_title(self.tracker_view.title.text());
        self.tracker.set_notes(self.tracker_view.notes.text());
    }

    /// Start when idle, stop and save when running
    pub fn toggle_tracking(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let now = self.clock.now();

        if !self.tracker.is_running() {
            self.tracker.set_title(self.tracker_view.title.text());
            self.tracker.set_notes(self.tracker_view.notes.text());
            if let Err(e) = self.tracker.start(now) {
                self.set_status(StatusKind::Error, e.to_string());
            }
            return;
        }

        match self.tracker.stop(&*self.backend, session, now) {
            Ok(StopOutcome::Saved(_)) => {
                self.tracker_view.title.clear();
                self.tracker_view.notes.clear();
                self.tracker_view.field = TrackerField::Title;
                self.set_status(StatusKind::Success, "Task saved successfully");
                self.load_history();
            }
            Ok(StopOutcome::NotRunning) => {}
            Err(TrackerError::Backend(e)) => {
                self.set_status(StatusKind::Error, format!("Failed to save task: {}", e));
            }
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }
}
