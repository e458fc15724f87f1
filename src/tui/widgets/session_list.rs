use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
    StatefulWidget,
};

use crate::Config;
use crate::models::Task;
use crate::tracker::format_hms;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};

/// "Recent Tasks": one entry per saved session, newest first
pub fn render_session_list(f: &mut Frame, area: Rect, tasks: &[Task], list_state: &mut ListState, config: &Config) {
    if area.height < 3 {
        return;
    }
    let max_width = area.width.saturating_sub(4) as usize;

    let active_theme = config.get_active_theme();
    let fg = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };

    let title = format!("Recent Tasks ({})", tasks.len());
    if tasks.is_empty() {
        let empty = Paragraph::new("No tasks yet. Start tracking to see them here.")
            .style(Style::default().fg(fg).add_modifier(Modifier::DIM))
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = tasks.iter().map(|task| session_item(task, max_width)).collect();

    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);
    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    let list = List::new(items.clone())
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(fg))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));
    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    let list_inner_height = list_area.height.saturating_sub(2) as usize;
    let total_lines: usize = items.iter().map(|item| item.height()).sum();
    if total_lines > list_inner_height && list_inner_height > 0 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1,
            scrollbar_area.width,
            list_area.height.saturating_sub(2),
        );
        let mut scrollbar_state = ScrollbarState::new(items.len())
            .viewport_content_length(list_inner_height)
            .position(list_state.selected().unwrap_or(0));
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }
}

fn session_item(task: &Task, max_width: usize) -> ListItem<'static> {
    let (badge, badge_color) = if task.is_productive {
        ("Productive", Color::Green)
    } else {
        ("Unproductive", Color::Red)
    };

    let badge_len = badge.chars().count() + 1;
    let title = truncate(&task.title, max_width.saturating_sub(badge_len));
    let first = Line::from(vec![
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(badge, Style::default().fg(badge_color)),
    ]);

    let second = Line::from(format!(
        "  {} · {} · {}",
        time_range(task),
        task.category.label(),
        format_hms(task.duration)
    ));

    let mut lines = vec![first, second];
    if let Some(notes) = &task.notes {
        lines.push(Line::styled(
            format!("  {}", truncate(notes, max_width.saturating_sub(2))),
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ));
    }
    ListItem::new(lines)
}

/// Local `start – end`; the date is included for sessions from other days
pub fn time_range(task: &Task) -> String {
    let start = task.start_time.with_timezone(&Local);
    let today = Local::now().date_naive();
    let start_str = if start.date_naive() == today {
        start.format("%H:%M").to_string()
    } else {
        start.format("%b %d %H:%M").to_string()
    };
    match task.end_time {
        Some(end) => format!("{} – {}", start_str, end.with_timezone(&Local).format("%H:%M")),
        None => format!("{} – …", start_str),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max.saturating_sub(3)).collect::<String>() + "..."
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::{Duration, TimeZone, Utc};

    fn task(notes: Option<&str>) -> Task {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        Task {
            id: "t1".into(),
            user_id: "u1".into(),
            title: "Read chapter three".into(),
            category: Category::Study,
            start_time: start,
            end_time: Some(start + Duration::seconds(3725)),
            duration: 3725,
            is_productive: true,
            notes: notes.map(str::to_string),
            created_at: start,
        }
    }

    #[test]
    fn notes_add_a_third_line() {
        assert_eq!(session_item(&task(None), 60).height(), 2);
        assert_eq!(session_item(&task(Some("ch. 3")), 60).height(), 3);
    }

    #[test]
    fn long_text_is_truncated() {
        assert_eq!(truncate("Read chapter three", 10), "Read ch...");
        assert_eq!(truncate("Read", 10), "Read");
    }

    #[test]
    fn past_sessions_show_their_date() {
        let range = time_range(&task(None));
        assert!(range.contains('–'));
        assert!(range.contains("Jan") || range.contains("Dec"));
    }
}
