use ratatui::text::Span;

use crate::error::{Error, Result};

/// Text used to size fonts, tall glyphs plus capitals.
const SIZING_TEXT: &str = "Text I I II";
const MIN_FONT_SIZE: u32 = 1;
const MAX_FONT_SIZE: u32 = 50;

/// Measures rendered text. Only the returned numbers matter to layout.
pub trait FontMetrics {
    /// Width and height of `text` rendered at `size`.
    fn measure(&self, text: &str, size: u32) -> (f64, f64);
}

/// Terminal cells: every glyph is one row tall and as wide as its display
/// width, independent of the requested size.
#[derive(Clone, Copy, Debug, Default)]
pub struct CellMetrics;

impl FontMetrics for CellMetrics {
    fn measure(&self, text: &str, _size: u32) -> (f64, f64) {
        (Span::raw(text).width() as f64, 1.0)
    }
}

/// Largest font size whose sizing text height fits one of `n_lines` lines.
pub fn fit_font_size<M: FontMetrics + ?Sized>(
    metrics: &M,
    textbox_height: f64,
    n_lines: usize,
) -> Result<u32> {
    if n_lines == 0 {
        return Err(Error::InvalidGeometry("zero lines per screen".to_string()));
    }
    let line_height = textbox_height / n_lines as f64;
    let (mut left, mut right) = (MIN_FONT_SIZE, MAX_FONT_SIZE);
    while left <= right {
        let mid = (left + right) / 2;
        let (_, height) = metrics.measure(SIZING_TEXT, mid);
        if height > line_height {
            right = mid - 1;
        } else {
            left = mid + 1;
        }
    }
    let size = left - 1;
    if size < MIN_FONT_SIZE {
        return Err(Error::TextBoxTooSmall {
            height: textbox_height,
            lines: n_lines,
        });
    }
    Ok(size)
}
