use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::symbols::Marker;
use ratatui::widgets::Widget;
use ratatui::widgets::canvas::{Canvas, Line, Points};

use suspense::session::draw_box::ZoomScale;
use suspense::session::screen::Screen;

use crate::ui::theme::Theme;

/// Ceiling label without trailing zeros: `10`, `2.5`, `0.125`.
pub fn format_ceiling(value: f64) -> String {
    let text = format!("{value:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// The drawing box: axes, the recorded trace, the cursor and the scale
/// labels left of the vertical axis.
pub struct DrawCanvas<'a> {
    screen: &'a Screen,
    zoom: &'a ZoomScale,
    theme: &'a Theme,
}

impl<'a> DrawCanvas<'a> {
    pub fn new(screen: &'a Screen, zoom: &'a ZoomScale, theme: &'a Theme) -> Self {
        Self { screen, zoom, theme }
    }
}

impl Widget for DrawCanvas<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let colors = &self.theme.colors;
        let draw_box = &self.screen.draw_box;
        let (width, height) = (draw_box.width, draw_box.height);
        // Canvas y grows upwards, pixel y downwards.
        let flip = |&(x, y): &(f64, f64)| (x, height - y);
        let trace: Vec<(f64, f64)> = draw_box.pixels.iter().map(flip).collect();
        let axis = colors.axis();
        let line = colors.draw_line();

        Canvas::default()
            .marker(Marker::Braille)
            .background_color(colors.bg())
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                ctx.draw(&Line::new(0.0, 0.0, width, 0.0, axis));
                ctx.draw(&Line::new(0.0, 0.0, 0.0, height, axis));
                for pair in trace.windows(2) {
                    let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
                    ctx.draw(&Line::new(x1, y1, x2, y2, line));
                }
                if trace.len() == 1 {
                    ctx.draw(&Points {
                        coords: &trace,
                        color: line,
                    });
                }
            })
            .render(area, buf);

        let label_style = Style::default().fg(axis).bg(colors.bg());
        let top = format_ceiling(self.zoom.current_max_y);
        let top_x = area.x.saturating_sub(top.len() as u16 + 1);
        buf.set_string(top_x, area.y, &top, label_style);
        buf.set_string(area.x.saturating_sub(2), area.bottom() - 1, "0", label_style);
        if area.y > 0 {
            buf.set_string(area.x, area.y - 1, "▲", label_style);
        }
        if area.right() < buf.area.right() {
            buf.set_string(area.right(), area.bottom() - 1, "▶", label_style);
        }

        let (cx, cy) = self.screen.mouse.relative;
        let cursor_x = area.x.saturating_add(cx.max(0.0) as u16).min(area.right() - 1);
        let cursor_y = area.y.saturating_add(cy.max(0.0) as u16).min(area.bottom() - 1);
        let cursor_style = if self.screen.allow_mouse {
            Style::default().fg(colors.draw_cursor())
        } else {
            Style::default().fg(colors.text_checked())
        };
        buf[(cursor_x, cursor_y)].set_symbol("●").set_style(cursor_style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ceiling() {
        assert_eq!(format_ceiling(10.0), "10");
        assert_eq!(format_ceiling(2.5), "2.5");
        assert_eq!(format_ceiling(0.125), "0.125");
        assert_eq!(format_ceiling(640.0), "640");
    }
}
