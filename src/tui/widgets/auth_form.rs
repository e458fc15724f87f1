use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Flex, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::tui::app::{AuthField, AuthViewState};
use crate::tui::widgets::form::{FieldStyles, TextField, render_button, render_text_field};

const FORM_WIDTH: u16 = 44;
const FORM_HEIGHT: u16 = 15;

/// Centered sign-in / sign-up card. Returns the cursor position for the focused input.
pub fn render_auth_form(f: &mut Frame, area: Rect, state: &AuthViewState, config: &Config) -> Option<(u16, u16)> {
    let styles = FieldStyles::from_config(config);
    let card = centered(area, FORM_WIDTH, FORM_HEIGHT);

    let heading = match state.mode {
        crate::auth::AuthMode::SignIn => "Welcome back",
        crate::auth::AuthMode::SignUp => "Create your account",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(heading)
        .title_alignment(Alignment::Center)
        .style(styles.normal);
    let inner = block.inner(card);
    f.render_widget(block, card);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Email
            Constraint::Length(3), // Password
            Constraint::Length(3), // Submit
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Mode switch
            Constraint::Min(0),
        ])
        .split(inner);

    let email_cursor = render_text_field(
        f,
        rows[0],
        TextField {
            title: "Email",
            editor: &state.email,
            placeholder: "you@example.com",
            mask: None,
            is_active: state.field == AuthField::Email,
        },
        &styles,
    );
    let password_cursor = render_text_field(
        f,
        rows[1],
        TextField {
            title: "Password",
            editor: &state.password,
            placeholder: "••••••",
            mask: Some('•'),
            is_active: state.field == AuthField::Password,
        },
        &styles,
    );

    render_button(
        f,
        rows[2],
        state.submit_label(),
        state.field == AuthField::Submit,
        !state.loading,
        &styles,
    );

    let switch_style = if state.field == AuthField::ModeSwitch {
        styles.active
    } else {
        styles.normal.add_modifier(Modifier::UNDERLINED)
    };
    let switch = Paragraph::new(Line::styled(state.mode.switch_prompt(), switch_style)).alignment(Alignment::Center);
    f.render_widget(switch, rows[4]);

    email_cursor.or(password_cursor)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height.min(area.height))]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Length(width.min(area.width))]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
