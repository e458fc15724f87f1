use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::editor::Editor;

/// Styles shared by every form field, derived from the active theme
#[derive(Debug, Clone, Copy)]
pub struct FieldStyles {
    pub normal: Style,
    pub active: Style,
    pub inactive: Style,
    pub placeholder: Style,
    pub disabled: Style,
}

impl FieldStyles {
    pub fn from_config(config: &Config) -> Self {
        let active_theme = config.get_active_theme();
        let fg = parse_color(&active_theme.fg);
        let highlight_bg = parse_color(&active_theme.highlight_bg);
        let highlight_fg = if active_theme.highlight_fg.is_empty() {
            get_contrast_text_color(highlight_bg)
        } else {
            parse_color(&active_theme.highlight_fg)
        };

        Self {
            normal: Style::default().fg(fg),
            active: Style::default().fg(highlight_fg).bg(highlight_bg),
            inactive: Style::default().fg(fg),
            placeholder: Style::default().fg(fg).add_modifier(Modifier::DIM | Modifier::ITALIC),
            disabled: Style::default().fg(fg).add_modifier(Modifier::DIM | Modifier::CROSSED_OUT),
        }
    }

    pub fn for_focus(&self, is_active: bool) -> Style {
        if is_active { self.active } else { self.inactive }
    }
}

pub struct TextField<'a> {
    pub title: &'a str,
    pub editor: &'a Editor,
    pub placeholder: &'a str,
    /// Replaces every character when set (passwords)
    pub mask: Option<char>,
    pub is_active: bool,
}

/// Bordered single-line input. Returns the cursor position when the field is active.
pub fn render_text_field(f: &mut Frame, area: Rect, field: TextField<'_>, styles: &FieldStyles) -> Option<(u16, u16)> {
    let TextField {
        title,
        editor,
        placeholder,
        mask,
        is_active,
    } = field;
    if area.width < 3 || area.height < 3 {
        return None;
    }
    let content_width = area.width.saturating_sub(2) as usize;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(if is_active { styles.active } else { styles.normal });

    let (line, cursor_offset) = if editor.is_empty() && !is_active {
        (Line::from(Span::styled(placeholder.to_string(), styles.placeholder)), 0)
    } else {
        let (text, cursor) = editor.visible(content_width, mask);
        (Line::from(Span::styled(text, styles.for_focus(is_active))), cursor)
    };
    f.render_widget(Paragraph::new(line).block(block), area);

    if !is_active {
        return None;
    }
    let x = area.x + 1 + cursor_offset as u16;
    let y = area.y + 1;
    (x < area.x + area.width - 1).then_some((x, y))
}

/// Bordered, centred button label
pub fn render_button(f: &mut Frame, area: Rect, label: &str, is_active: bool, enabled: bool, styles: &FieldStyles) {
    let style = if !enabled {
        styles.disabled
    } else {
        styles.for_focus(is_active).add_modifier(Modifier::BOLD)
    };
    let paragraph = Paragraph::new(label.to_string())
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    f.render_widget(paragraph, area);
}
