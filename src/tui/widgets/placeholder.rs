use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::tui::app::Route;
use crate::tui::widgets::color::parse_color;

/// Views that only show a heading for now: Dashboard, Analytics and Calendar
pub fn render_placeholder(f: &mut Frame, area: Rect, route: Route, display_name: Option<&str>, config: &Config) {
    let fg = parse_color(&config.get_active_theme().fg);

    let mut lines = vec![Line::styled(
        route.title().to_string(),
        Style::default().fg(fg).add_modifier(Modifier::BOLD),
    )];
    if route == Route::Dashboard
        && let Some(name) = display_name
    {
        lines.push(Line::from(format!("Welcome, {}", name)));
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "Coming soon",
        Style::default().fg(fg).add_modifier(Modifier::DIM | Modifier::ITALIC),
    ));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(route.title()));
    f.render_widget(paragraph, area);
}
