use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::utils::format_key_binding_for_display as display;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 80);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

pub fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!(
        "  {} / {} / {} / {}: Dashboard / Tracker / Analytics / Calendar\n",
        display(&kb.dashboard),
        display(&kb.tracker),
        display(&kb.analytics),
        display(&kb.calendar)
    ));
    text.push_str(&format!(
        "  {} / {}: Next / previous field\n",
        display(&kb.next_field),
        display(&kb.previous_field)
    ));
    text.push_str(&format!("  {}: Sign out\n", display(&kb.logout)));
    text.push('\n');

    text.push_str("Sign in:\n");
    text.push_str(&format!("  {}: Submit, or switch between sign in and sign up\n", display(&kb.submit)));
    text.push('\n');

    text.push_str("Tracker:\n");
    text.push_str(&format!("  {}: Start / stop tracking\n", display(&kb.toggle_tracking)));
    text.push_str(&format!("  {}: Toggle productive\n", display(&kb.toggle_productive)));
    text.push_str("  Left / Right / Space: Change category\n");
    text.push_str("  Up / Down: Scroll recent tasks\n");
    text.push('\n');

    text.push_str("Editing:\n");
    text.push_str(&format!("  {}: Undo\n", display(&kb.undo)));
    text.push_str(&format!(
        "  {} / {}: Word navigation\n",
        display(&kb.word_left),
        display(&kb.word_right)
    ));
    text.push_str("  Home/End: Line start/end\n");
    text.push_str("  Backspace/Delete: Delete character\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", display(&kb.quit)));
    text.push_str(&format!("  {} / Esc: Show/hide help\n", display(&kb.help)));

    text
}
