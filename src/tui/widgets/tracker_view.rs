use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use crate::Config;
use crate::models::Category;
use crate::tracker::{Tracker, format_hms};
use crate::tui::app::{TrackerField, TrackerViewState};
use crate::tui::widgets::form::{FieldStyles, TextField, render_button, render_text_field};

/// Height of the form above the session list
pub const TRACKER_FORM_HEIGHT: u16 = 12;

/// Title, category picker, notes, productive toggle, readout and the start/stop button.
/// Returns the cursor position for the focused text input.
pub fn render_tracker_form(
    f: &mut Frame,
    area: Rect,
    tracker: &Tracker,
    view: &TrackerViewState,
    config: &Config,
) -> Option<(u16, u16)> {
    let styles = FieldStyles::from_config(config);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Category
            Constraint::Length(3), // Notes
            Constraint::Length(3), // Productive / readout / button
        ])
        .split(area);

    let title_cursor = render_text_field(
        f,
        rows[0],
        TextField {
            title: "Title",
            editor: &view.title,
            placeholder: "What are you working on?",
            mask: None,
            is_active: view.field == TrackerField::Title,
        },
        &styles,
    );

    render_category_picker(f, rows[1], tracker.pending().category, view.field == TrackerField::Category, &styles);

    let notes_cursor = render_text_field(
        f,
        rows[2],
        TextField {
            title: "Notes",
            editor: &view.notes,
            placeholder: "Add notes (optional)",
            mask: None,
            is_active: view.field == TrackerField::Notes,
        },
        &styles,
    );

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(18), Constraint::Min(12), Constraint::Length(12)])
        .split(rows[3]);

    render_productive_toggle(
        f,
        bottom[0],
        tracker.pending().is_productive,
        view.field == TrackerField::Productive,
        &styles,
    );
    render_readout(f, bottom[1], tracker, &styles);

    let label = if tracker.is_running() { "Stop" } else { "Start" };
    render_button(
        f,
        bottom[2],
        label,
        view.field == TrackerField::Toggle,
        tracker.can_toggle(),
        &styles,
    );

    title_cursor.or(notes_cursor)
}

fn render_category_picker(f: &mut Frame, area: Rect, selected: Category, is_active: bool, styles: &FieldStyles) {
    let titles: Vec<Line> = Category::ALL.iter().map(|c| Line::from(c.label())).collect();
    let selected_index = selected.index();
    let highlight = if is_active {
        styles.active.add_modifier(Modifier::BOLD)
    } else {
        styles.normal.add_modifier(Modifier::BOLD | Modifier::REVERSED)
    };
    let tabs = Tabs::new(titles)
        .select(selected_index)
        .style(styles.normal)
        .highlight_style(highlight)
        .divider(" ")
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Category")
                .border_style(if is_active { styles.active } else { styles.normal }),
        );
    f.render_widget(tabs, area);
}

fn render_productive_toggle(f: &mut Frame, area: Rect, is_productive: bool, is_active: bool, styles: &FieldStyles) {
    let (label, color) = if is_productive {
        ("✓ Productive", Color::Green)
    } else {
        ("✗ Unproductive", Color::Red)
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(if is_active { styles.active } else { styles.normal }),
    );
    f.render_widget(paragraph, area);
}

fn render_readout(f: &mut Frame, area: Rect, tracker: &Tracker, styles: &FieldStyles) {
    let style = if tracker.is_running() {
        styles.normal.add_modifier(Modifier::BOLD)
    } else {
        styles.normal.add_modifier(Modifier::DIM)
    };
    let paragraph = Paragraph::new(format_hms(tracker.elapsed_secs()))
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(styles.normal));
    f.render_widget(paragraph, area);
}
