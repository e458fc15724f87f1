use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub nav_area: Rect,
    pub content_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions inside the outer border.
    /// Height: nav (1) + tracker form (12) + list (2) + status (1)
    pub const MIN_WIDTH: u16 = 48;
    pub const MIN_HEIGHT: u16 = 16;

    pub fn calculate(size: Rect, show_nav: bool) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(if show_nav { 1 } else { 0 }), // Nav bar
                Constraint::Min(1),                               // Content
                Constraint::Length(1),                            // Status
            ])
            .split(inner_area);

        Self {
            inner_area,
            nav_area: vertical[0],
            content_area: vertical[1],
            status_area: vertical[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_bar_collapses_when_hidden() {
        let area = Rect::new(0, 0, 80, 24);
        let with_nav = Layout::calculate(area, true);
        assert_eq!(with_nav.nav_area.height, 1);
        assert_eq!(with_nav.status_area.height, 1);
        assert_eq!(with_nav.content_area.height, 22 - 2);

        let without_nav = Layout::calculate(area, false);
        assert_eq!(without_nav.nav_area.height, 0);
        assert_eq!(without_nav.content_area.height, 22 - 1);
    }

    #[test]
    fn small_terminals_are_clamped_to_minimum() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 5), true);
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.inner_area.height, Layout::MIN_HEIGHT);
    }
}
