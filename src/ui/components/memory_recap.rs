use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::widgets::Widget;
use ratatui::widgets::canvas::{Canvas, Line, Points};

use suspense::session::memory_box::MemoryBox;

use crate::ui::components::draw_canvas::format_ceiling;
use crate::ui::theme::Theme;

/// Miniature of the whole curve drawn so far, scaled to its own maximum.
pub struct MemoryRecap<'a> {
    memory: &'a MemoryBox,
    theme: &'a Theme,
    /// Draw in the accent colour right after new values arrived.
    highlight: bool,
}

impl<'a> MemoryRecap<'a> {
    pub fn new(memory: &'a MemoryBox, theme: &'a Theme, highlight: bool) -> Self {
        Self {
            memory,
            theme,
            highlight,
        }
    }
}

impl Widget for MemoryRecap<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let colors = &self.theme.colors;
        let height = self.memory.height;
        let points: Vec<(f64, f64)> = self
            .memory
            .map_to_pixel()
            .into_iter()
            .map(|(x, y)| (x, height - y))
            .collect();
        let color = if self.highlight {
            colors.accent()
        } else {
            colors.memory_line()
        };

        Canvas::default()
            .marker(Marker::Braille)
            .background_color(colors.bg())
            .x_bounds([0.0, self.memory.width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for pair in points.windows(2) {
                    let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
                    ctx.draw(&Line::new(x1, y1, x2, y2, color));
                }
                if points.len() == 1 {
                    ctx.draw(&Points {
                        coords: &points,
                        color,
                    });
                }
            })
            .render(area, buf);

        if !points.is_empty() {
            let label = format_ceiling(self.memory.display_max());
            let x = area.x.saturating_sub(label.len() as u16 + 1);
            buf.set_string(x, area.y, &label, Style::default().fg(colors.axis()).bg(colors.bg()));
        }
    }
}
