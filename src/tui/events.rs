use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size as terminal_size,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;
use std::time::Duration;

use crate::tui::App;
use crate::tui::app::{AuthField, Mode, Route, TrackerField};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::widgets::editor::Editor;
use crate::utils::{ParsedKeyBinding, has_primary_modifier, parse_key_binding};

/// Restores the terminal when dropped, including on panic
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;
    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        app.on_tick();

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect, show_nav(&app));
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Queued work runs after the frame that shows its loading state
        if app.has_pending_action() {
            app.run_pending();
            continue;
        }

        // Only Press events; Windows also reports Release
        if event::poll(Duration::from_millis(16))?
            && let Event::Key(key_event) = event::read()?
            && key_event.kind == KeyEventKind::Press
            && handle_key_event(&mut app, key_event)?
        {
            break;
        }
    }

    app.shutdown();
    guard.restore()?;
    Ok(())
}

pub(crate) fn show_nav(app: &App) -> bool {
    app.session.is_some() && app.route != Route::Auth
}

fn binding(key_str: &str) -> Result<ParsedKeyBinding, TuiError> {
    parse_key_binding(key_str).map_err(TuiError::KeyBindingError)
}

fn matches_key_event(key_event: KeyEvent, binding: &ParsedKeyBinding) -> bool {
    if binding.requires_ctrl != has_primary_modifier(key_event.modifiers) {
        return false;
    }
    binding.key_code == key_event.code
}

fn is(key_event: KeyEvent, key_str: &str) -> Result<bool, TuiError> {
    Ok(matches_key_event(key_event, &binding(key_str)?))
}

/// Returns true when the app should quit
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    if is(key_event, &kb.quit)? {
        return Ok(true);
    }

    if app.mode == Mode::Help {
        if key_event.code == KeyCode::Esc || is(key_event, &kb.help)? {
            app.exit_help_mode();
        }
        return Ok(false);
    }

    if is(key_event, &kb.help)? {
        app.enter_help_mode();
        return Ok(false);
    }

    if handle_global_key_bindings(app, key_event)? {
        return Ok(false);
    }

    match app.route {
        Route::Auth => handle_auth_keys(app, key_event)?,
        Route::Tracker => handle_tracker_keys(app, key_event)?,
        Route::Dashboard | Route::Analytics | Route::Calendar => {}
    }
    Ok(false)
}

/// Route switching and logout. Returns true if the key was consumed.
fn handle_global_key_bindings(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    let routes = [
        (&kb.dashboard, Route::Dashboard),
        (&kb.tracker, Route::Tracker),
        (&kb.analytics, Route::Analytics),
        (&kb.calendar, Route::Calendar),
    ];
    for (key_str, route) in routes {
        if is(key_event, key_str)? {
            if app.route != route {
                app.navigate(route);
            }
            return Ok(true);
        }
    }

    if is(key_event, &kb.logout)? {
        app.logout();
        return Ok(true);
    }

    Ok(false)
}

fn handle_auth_keys(app: &mut App, key_event: KeyEvent) -> Result<(), TuiError> {
    let kb = app.config.key_bindings.clone();

    if is(key_event, &kb.next_field)? {
        app.navigate_auth_field(true);
        return Ok(());
    }
    if is(key_event, &kb.previous_field)? {
        app.navigate_auth_field(false);
        return Ok(());
    }
    if is(key_event, &kb.submit)? {
        match app.auth.field {
            AuthField::ModeSwitch => app.toggle_auth_mode(),
            AuthField::Email | AuthField::Password | AuthField::Submit => app.queue_auth_submit(),
        }
        return Ok(());
    }
    if app.auth.loading {
        return Ok(());
    }

    let word_left = binding(&kb.word_left)?;
    let word_right = binding(&kb.word_right)?;
    let undo = binding(&kb.undo)?;
    if let Some(editor) = app.get_current_auth_editor() {
        edit_text(editor, key_event, &word_left, &word_right, &undo);
    }
    Ok(())
}

fn handle_tracker_keys(app: &mut App, key_event: KeyEvent) -> Result<(), TuiError> {
    let kb = app.config.key_bindings.clone();

    if is(key_event, &kb.toggle_tracking)? {
        app.toggle_tracking();
        return Ok(());
    }
    if is(key_event, &kb.toggle_productive)? {
        app.tracker.toggle_productive();
        return Ok(());
    }
    if is(key_event, &kb.next_field)? {
        app.navigate_tracker_field(true);
        return Ok(());
    }
    if is(key_event, &kb.previous_field)? {
        app.navigate_tracker_field(false);
        return Ok(());
    }

    match key_event.code {
        KeyCode::Up => {
            app.move_history_selection_up();
            return Ok(());
        }
        KeyCode::Down => {
            app.move_history_selection_down();
            return Ok(());
        }
        _ => {}
    }

    let submit = is(key_event, &kb.submit)?;
    match app.tracker_view.field {
        TrackerField::Category => match key_event.code {
            KeyCode::Left => app.tracker.previous_category(),
            KeyCode::Right | KeyCode::Char(' ') => app.tracker.next_category(),
            _ if submit => app.tracker.next_category(),
            _ => {}
        },
        TrackerField::Productive => {
            if submit || key_event.code == KeyCode::Char(' ') {
                app.tracker.toggle_productive();
            }
        }
        TrackerField::Toggle => {
            if submit || key_event.code == KeyCode::Char(' ') {
                app.toggle_tracking();
            }
        }
        TrackerField::Title | TrackerField::Notes => {
            if submit {
                app.toggle_tracking();
                return Ok(());
            }
            let word_left = binding(&kb.word_left)?;
            let word_right = binding(&kb.word_right)?;
            let undo = binding(&kb.undo)?;
            if let Some(editor) = app.get_current_tracker_editor() {
                edit_text(editor, key_event, &word_left, &word_right, &undo);
            }
            app.sync_tracker_fields();
        }
    }
    Ok(())
}

/// Shared single-line editing keys
fn edit_text(
    editor: &mut Editor,
    key_event: KeyEvent,
    word_left: &ParsedKeyBinding,
    word_right: &ParsedKeyBinding,
    undo: &ParsedKeyBinding,
) {
    if matches_key_event(key_event, undo) {
        editor.undo();
        return;
    }
    if matches_key_event(key_event, word_left) {
        editor.move_cursor_word_left();
        return;
    }
    if matches_key_event(key_event, word_right) {
        editor.move_cursor_word_right();
        return;
    }
    if has_primary_modifier(key_event.modifiers) {
        return;
    }

    match key_event.code {
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Backspace => editor.delete_char(),
        KeyCode::Delete => editor.delete_char_forward(),
        KeyCode::Left => editor.move_cursor_left(),
        KeyCode::Right => editor.move_cursor_right(),
        KeyCode::Home => editor.move_cursor_home(),
        KeyCode::End => editor.move_cursor_end(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use crate::backend::SqliteBackend;
    use crate::clock::testing::ManualClock;
    use crate::models::Category;
    use crossterm::event::KeyModifiers;

    fn app(clock: &ManualClock) -> App {
        let backend = SqliteBackend::open_in_memory().unwrap().with_hash_cost(4);
        App::new(Config::default(), Box::new(backend), Box::new(clock.clone()))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            handle_key_event(app, key(KeyCode::Char(ch))).unwrap();
        }
    }

    fn sign_up_and_in(app: &mut App) {
        type_text(app, "ada@example.com");
        handle_key_event(app, key(KeyCode::Tab)).unwrap();
        type_text(app, "secret1");
        app.toggle_auth_mode();
        handle_key_event(app, key(KeyCode::Enter)).unwrap();
        app.run_pending();
        type_text(app, "secret1");
        handle_key_event(app, key(KeyCode::Enter)).unwrap();
        app.run_pending();
    }

    #[test]
    fn quit_binding_requests_exit() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut app = app(&clock);
        assert!(handle_key_event(&mut app, ctrl('q')).unwrap());
        assert!(!handle_key_event(&mut app, key(KeyCode::Char('q'))).unwrap());
    }

    #[test]
    fn help_overlay_swallows_keys() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut app = app(&clock);
        handle_key_event(&mut app, key(KeyCode::F(1))).unwrap();
        assert_eq!(app.mode, Mode::Help);
        type_text(&mut app, "abc");
        assert!(app.auth.email.is_empty());
        handle_key_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn typing_fills_the_focused_auth_field() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut app = app(&clock);
        type_text(&mut app, "ada@example.com");
        handle_key_event(&mut app, key(KeyCode::Tab)).unwrap();
        type_text(&mut app, "pw");
        handle_key_event(&mut app, key(KeyCode::Backspace)).unwrap();
        assert_eq!(app.auth.email.text(), "ada@example.com");
        assert_eq!(app.auth.password.text(), "p");

        handle_key_event(&mut app, key(KeyCode::BackTab)).unwrap();
        assert_eq!(app.auth.field, AuthField::Email);
    }

    #[test]
    fn enter_on_mode_switch_flips_the_form() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut app = app(&clock);
        app.auth.field = AuthField::ModeSwitch;
        handle_key_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(app.auth.mode, crate::auth::AuthMode::SignUp);
        assert!(!app.has_pending_action());
    }

    #[test]
    fn route_keys_are_gated_by_session() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut app = app(&clock);
        handle_key_event(&mut app, key(KeyCode::F(3))).unwrap();
        assert_eq!(app.route, Route::Auth);

        sign_up_and_in(&mut app);
        assert_eq!(app.route, Route::Dashboard);
        handle_key_event(&mut app, key(KeyCode::F(3))).unwrap();
        assert_eq!(app.route, Route::Tracker);
        assert!(show_nav(&app));
    }

    #[test]
    fn tracker_keys_drive_a_session() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut app = app(&clock);
        sign_up_and_in(&mut app);
        handle_key_event(&mut app, key(KeyCode::F(3))).unwrap();

        type_text(&mut app, "Write report");
        assert_eq!(app.tracker.pending().title, "Write report");

        handle_key_event(&mut app, key(KeyCode::Tab)).unwrap();
        handle_key_event(&mut app, key(KeyCode::Right)).unwrap();
        assert_eq!(app.tracker.pending().category, Category::Coding);
        handle_key_event(&mut app, ctrl('p')).unwrap();
        assert!(!app.tracker.pending().is_productive);

        handle_key_event(&mut app, ctrl('t')).unwrap();
        assert!(app.tracker.is_running());
        clock.advance(90);
        handle_key_event(&mut app, ctrl('t')).unwrap();
        assert!(!app.tracker.is_running());

        let saved = &app.history.tasks()[0];
        assert_eq!(saved.title, "Write report");
        assert_eq!(saved.category, Category::Coding);
        assert!(!saved.is_productive);
        assert_eq!(saved.duration, 90);
    }

    #[test]
    fn erased_title_keeps_the_session_running() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut app = app(&clock);
        sign_up_and_in(&mut app);
        handle_key_event(&mut app, key(KeyCode::F(3))).unwrap();

        type_text(&mut app, "Read");
        handle_key_event(&mut app, ctrl('t')).unwrap();
        assert!(app.tracker.is_running());
        for _ in 0..4 {
            handle_key_event(&mut app, key(KeyCode::Backspace)).unwrap();
        }
        assert!(!app.tracker.can_toggle());

        clock.advance(5);
        handle_key_event(&mut app, ctrl('t')).unwrap();
        assert!(app.tracker.is_running());
        assert_eq!(app.status.message.as_ref().unwrap().text, "A title is required");

        app.load_history();
        assert!(app.history.is_empty());
    }

    #[test]
    fn logout_key_returns_to_auth() {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let mut app = app(&clock);
        sign_up_and_in(&mut app);
        handle_key_event(&mut app, ctrl('l')).unwrap();
        assert_eq!(app.route, Route::Auth);
        assert!(app.session.is_none());
        assert!(!show_nav(&app));
    }

    #[test]
    fn ctrl_binding_does_not_match_plain_key() {
        let binding = parse_key_binding("Ctrl+t").unwrap();
        assert!(matches_key_event(ctrl('t'), &binding));
        assert!(!matches_key_event(key(KeyCode::Char('t')), &binding));
    }
}
