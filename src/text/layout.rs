use crate::config::Proportions;
use crate::error::{Error, Result};
use crate::session::draw_box::DrawBox;
use crate::session::screen::Screen;
use crate::store::schema::LineRow;
use crate::text::metrics::FontMetrics;
use crate::text::unit::WordUnit;

/// Axis-aligned box in absolute pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutMode {
    /// Paragraphs start new lines; only the final paragraph forces a new screen.
    Main,
    /// Every paragraph gets its own screen.
    Training,
}

/// Fixed screen geometry, computed once at startup.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutGeometry {
    pub textbox: BoxRect,
    pub drawbox: BoxRect,
    pub memorybox: BoxRect,
    pub n_lines: usize,
    pub space_width: f64,
}

impl LayoutGeometry {
    /// Turn the relative proportions into absolute boxes for a screen of
    /// `width` x `height` pixels.
    pub fn from_screen(
        width: f64,
        height: f64,
        proportions: &Proportions,
        n_lines: usize,
        space_width: f64,
    ) -> Result<Self> {
        let p = proportions;
        let pct = |total: f64, value: f64| (total * value / 100.0).floor();

        let textbox = BoxRect::new(
            pct(width, p.text_x),
            pct(height, p.text_y),
            pct(width, p.text_width),
            pct(height, p.text_height),
        );
        let draw_height = pct(height, p.draw_height);
        let drawbox = BoxRect::new(
            textbox.x,
            (textbox.y - height * p.draw_space / 100.0 - draw_height).floor(),
            textbox.width,
            draw_height,
        );
        let memorybox = BoxRect::new(
            textbox.x,
            (textbox.bottom() + p.memory_gap).floor(),
            textbox.width,
            pct(height, p.memory_height),
        );

        let geometry = Self {
            textbox,
            drawbox,
            memorybox,
            n_lines,
            space_width,
        };
        geometry.check(width, height)?;
        Ok(geometry)
    }

    fn check(&self, width: f64, height: f64) -> Result<()> {
        if self.n_lines == 0 {
            return Err(Error::InvalidGeometry("zero lines per screen".to_string()));
        }
        if self.textbox.width <= 0.0 || self.textbox.height <= 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "text box is {}x{}",
                self.textbox.width, self.textbox.height
            )));
        }
        if self.drawbox.height <= 0.0 || self.drawbox.y < 0.0 {
            return Err(Error::InvalidGeometry(format!(
                "drawing box does not fit above the text (y = {}, height = {})",
                self.drawbox.y, self.drawbox.height
            )));
        }
        if self.textbox.x + self.textbox.width > width || self.memorybox.bottom() > height {
            return Err(Error::InvalidGeometry(format!(
                "boxes exceed the {width}x{height} screen"
            )));
        }
        Ok(())
    }

    pub fn line_height(&self) -> f64 {
        self.textbox.height / self.n_lines as f64
    }
}

/// Fill in pixel width and height of every word.
pub fn measure_words<M: FontMetrics + ?Sized>(words: &mut [WordUnit], metrics: &M, size: u32) {
    for word in words.iter_mut() {
        let (width, height) = metrics.measure(&word.text, size);
        word.width = width;
        word.height = height;
    }
}

/// Greedy line fill of measured words into screens.
///
/// Each word gets its on-screen position, its line and screen, and its
/// flattened position relative to the whole text of its screen as if that
/// text were a single line. One [`Screen`] per screen number is returned,
/// in order, each with a fresh drawing box.
pub fn paginate(
    mut words: Vec<WordUnit>,
    geometry: &LayoutGeometry,
    mode: LayoutMode,
) -> Result<Vec<Screen>> {
    if words.is_empty() {
        return Err(Error::EmptyInput);
    }
    if geometry.n_lines == 0 {
        return Err(Error::InvalidGeometry("zero lines per screen".to_string()));
    }

    let n_lines = geometry.n_lines;
    let space = geometry.space_width;
    let line_height = geometry.line_height();
    let max_paragraph = words.iter().map(|w| w.paragraph).max().unwrap_or(0);

    let mut current_paragraph = words[0].paragraph;
    let mut line = 1usize;
    let mut screen = 1usize;
    let mut current_x = 0.0;
    let mut total_x = 0.0;
    let mut screen_start = 0usize;

    for i in 0..words.len() {
        let width = words[i].width;
        let paragraph = words[i].paragraph;

        let mut new_line = false;
        let mut new_screen = false;
        if i == 0 {
            // the first word always opens line 1 of screen 1
        } else if paragraph != current_paragraph {
            current_paragraph = paragraph;
            if mode == LayoutMode::Training || paragraph == max_paragraph {
                new_screen = true;
            } else {
                new_line = true;
            }
        } else if current_x + width + space > geometry.textbox.width {
            new_line = true;
        }

        if new_line {
            line += 1;
            if line > n_lines {
                new_screen = true;
            }
        }
        if new_screen {
            for closed in &mut words[screen_start..i] {
                closed.cumulative_total = total_x;
            }
            screen += 1;
            line = 1;
            total_x = 0.0;
            screen_start = i;
        }
        if new_line || new_screen {
            current_x = 0.0;
        }

        let word = &mut words[i];
        word.position_x = current_x;
        word.position_y = line_height * (line - 1) as f64;
        word.cumulative_x = total_x;
        word.cumulative_end = total_x + width;
        word.screen_number = screen;
        word.line_on_screen = line;
        current_x += width + space;
        total_x += width + space;
    }
    for closed in &mut words[screen_start..] {
        closed.cumulative_total = total_x;
    }

    let mut screens: Vec<Screen> = Vec::with_capacity(screen);
    let mut pending = words.into_iter().peekable();
    for number in 1..=screen {
        let mut screen_words = Vec::new();
        while let Some(word) = pending.next_if(|w| w.screen_number == number) {
            screen_words.push(word);
        }
        let draw_box = DrawBox::new(geometry.drawbox);
        for word in &mut screen_words {
            word.screen_width = draw_box.width;
        }
        screens.push(Screen::new(number - 1, screen_words, draw_box));
    }

    tracing::debug!(
        "Paginated {} words into {} screens ({:?})",
        screens.iter().map(|s| s.words.len()).sum::<usize>(),
        screens.len(),
        mode
    );
    Ok(screens)
}

/// Text of every line of every screen, for categorising text units later.
pub fn line_dump(screens: &[Screen]) -> Vec<LineRow> {
    let mut rows = Vec::new();
    for screen in screens {
        let Some(last_line) = screen.words.iter().map(|w| w.line_on_screen).max() else {
            continue;
        };
        for line in 1..=last_line {
            let text = screen
                .words
                .iter()
                .filter(|w| w.line_on_screen == line)
                .map(|w| w.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            rows.push(LineRow {
                line_nr: rows.len(),
                screen_nr: screen.index + 1,
                line_nr_on_screen: line,
                text,
            });
        }
    }
    rows
}
