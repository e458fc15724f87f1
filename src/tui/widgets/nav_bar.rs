use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Tabs};

use crate::Config;
use crate::tui::app::Route;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::utils::format_key_binding_for_display;

/// One-line navigation bar: route tabs on the left, user and logout hint on the right
pub fn render_nav_bar(f: &mut Frame, area: Rect, current: Route, display_name: Option<&str>, config: &Config) {
    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let nav_bg = parse_color(&active_theme.nav_bg);
    let nav_fg = get_contrast_text_color(nav_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let bindings = &config.key_bindings;
    let keys = [
        &bindings.dashboard,
        &bindings.tracker,
        &bindings.analytics,
        &bindings.calendar,
    ];
    let titles: Vec<Line> = Route::NAV
        .iter()
        .zip(keys)
        .map(|(route, key)| {
            Line::from(vec![
                Span::styled(" ", Style::default().bg(nav_bg)),
                Span::styled(
                    format!("{} {}", format_key_binding_for_display(key), route.title()),
                    Style::default().fg(nav_fg).bg(nav_bg),
                ),
                Span::styled(" ", Style::default().bg(nav_bg)),
            ])
        })
        .collect();

    let selected = Route::NAV.iter().position(|r| *r == current);

    let user = match display_name {
        Some(name) => format!(
            "{} · {} Logout",
            name,
            format_key_binding_for_display(&bindings.logout)
        ),
        None => String::new(),
    };
    let user_width = (user.chars().count() as u16).min(area.width / 2);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(user_width)])
        .split(area);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(fg_color).bg(bg_color))
        .highlight_style(
            Style::default()
                .fg(highlight_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" ")
        .padding("", "");
    f.render_widget(tabs, chunks[0]);

    if user_width > 0 {
        let paragraph = Paragraph::new(user).style(Style::default().fg(fg_color).add_modifier(Modifier::DIM));
        f.render_widget(paragraph, chunks[1]);
    }
}
