use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use suspense::session::screen::Screen;

use crate::ui::theme::Theme;

/// Words of one screen at their laid-out positions. Words the curve has
/// already passed are dimmed.
pub struct TextBox<'a> {
    screen: &'a Screen,
    theme: &'a Theme,
}

impl<'a> TextBox<'a> {
    pub fn new(screen: &'a Screen, theme: &'a Theme) -> Self {
        Self { screen, theme }
    }
}

impl Widget for TextBox<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        for word in &self.screen.words {
            let x = area.x.saturating_add(word.position_x as u16);
            let y = area.y.saturating_add(word.position_y as u16);
            if x >= area.right() || y >= area.bottom() {
                continue;
            }
            let fg = if word.checked {
                colors.text_checked()
            } else {
                colors.text_unchecked()
            };
            let width = (area.right() - x) as usize;
            buf.set_stringn(x, y, &word.text, width, Style::default().fg(fg).bg(colors.bg()));
        }
    }
}
