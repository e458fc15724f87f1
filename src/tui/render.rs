use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout as RatLayout};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::tui::app::{AuthField, Mode, Route, TrackerField};
use crate::tui::widgets::{
    auth_form::render_auth_form,
    color::parse_color,
    help::render_help,
    nav_bar::render_nav_bar,
    placeholder::render_placeholder,
    session_list::render_session_list,
    status_bar::render_status_bar,
    tracker_view::{TRACKER_FORM_HEIGHT, render_tracker_form},
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display as display;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("TimeGuru")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    if layout.nav_area.height > 0 {
        render_nav_bar(f, layout.nav_area, app.route, app.display_name(), &app.config);
    }

    let cursor = match app.route {
        Route::Auth => render_auth_form(f, layout.content_area, &app.auth, &app.config),
        Route::Tracker => {
            let chunks = RatLayout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(TRACKER_FORM_HEIGHT), Constraint::Min(0)])
                .split(layout.content_area);
            let cursor = render_tracker_form(f, chunks[0], &app.tracker, &app.tracker_view, &app.config);
            render_session_list(
                f,
                chunks[1],
                app.history.tasks(),
                &mut app.tracker_view.list_state,
                &app.config,
            );
            cursor
        }
        route @ (Route::Dashboard | Route::Analytics | Route::Calendar) => {
            render_placeholder(f, layout.content_area, route, app.display_name(), &app.config);
            None
        }
    };

    if app.mode == Mode::Help {
        render_help(f, f.area(), &app.config);
    } else if let Some(position) = cursor {
        f.set_cursor_position(position);
    }

    let key_hints = get_key_hints(app);
    render_status_bar(
        f,
        layout.status_area,
        app.status.message.as_ref(),
        &key_hints,
        &app.config,
    );
}

fn get_key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    if app.mode == Mode::Help {
        return vec![format!("Esc or {}: Exit help", display(&kb.help))];
    }

    let mut hints = Vec::new();
    match app.route {
        Route::Auth => {
            let submit = match app.auth.field {
                AuthField::ModeSwitch => "Switch mode",
                AuthField::Email | AuthField::Password | AuthField::Submit => app.auth.mode.submit_label(),
            };
            hints.push(format!("{}: {}", display(&kb.submit), submit));
            hints.push(format!("{}/{}: Field", display(&kb.next_field), display(&kb.previous_field)));
        }
        Route::Tracker => {
            let action = if app.tracker.is_running() { "Stop" } else { "Start" };
            hints.push(format!("{}: {}", display(&kb.toggle_tracking), action));
            if app.tracker_view.field == TrackerField::Category {
                hints.push("←/→: Category".to_string());
            }
            hints.push(format!("{}: Productive", display(&kb.toggle_productive)));
            hints.push(format!("{}/{}: Field", display(&kb.next_field), display(&kb.previous_field)));
            hints.push("↑/↓: Tasks".to_string());
        }
        Route::Dashboard | Route::Analytics | Route::Calendar => {
            hints.push(format!("{}: Tracker", display(&kb.tracker)));
        }
    }
    if app.session.is_some() {
        hints.push(format!("{}: Logout", display(&kb.logout)));
    }
    hints.push(format!("{}: Help", display(&kb.help)));
    hints.push(format!("{}: Quit", display(&kb.quit)));
    hints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use crate::backend::SqliteBackend;
    use crate::clock::testing::ManualClock;
    use crate::tui::events::show_nav;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal
            .draw(|f| {
                let layout = Layout::calculate(f.area(), show_nav(app));
                render(f, app, &layout);
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn app() -> App {
        let clock = ManualClock::at("2024-01-01T10:00:00Z");
        let backend = SqliteBackend::open_in_memory().unwrap().with_hash_cost(4);
        App::new(Config::default(), Box::new(backend), Box::new(clock))
    }

    #[test]
    fn signed_out_screen_has_no_nav_bar() {
        let mut app = app();
        let screen = draw(&mut app);
        assert!(screen.contains("TimeGuru"));
        assert!(screen.contains("Welcome back"));
        assert!(!screen.contains("Analytics"));
    }

    #[test]
    fn help_overlay_is_drawn_over_content() {
        let mut app = app();
        app.enter_help_mode();
        let screen = draw(&mut app);
        assert!(screen.contains("Help - Key Bindings"));
        assert!(screen.contains("Exit help"));
    }

    #[test]
    fn hints_follow_the_route() {
        let mut app = app();
        let hints = get_key_hints(&app).join(" ");
        assert!(hints.contains("Sign In"));
        assert!(!hints.contains("Logout"));

        app.route = Route::Tracker;
        let hints = get_key_hints(&app).join(" ");
        assert!(hints.contains("Start"));
        assert!(hints.contains("Productive"));
    }
}
