use std::collections::HashSet;

use crate::session::draw_box::{DrawBox, ZoomScale};
use crate::session::navigator::Action;
use crate::text::unit::WordUnit;

/// Where the drawing cursor is, in three coordinate systems.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseState {
    /// Terminal position.
    pub absolute: (f64, f64),
    /// Position inside the drawing box.
    pub relative: (f64, f64),
    /// Semantic value at the cursor height.
    pub value: f64,
}

/// One page of wrapped text with its own drawing box.
#[derive(Clone, Debug)]
pub struct Screen {
    pub index: usize,
    pub words: Vec<WordUnit>,
    pub draw_box: DrawBox,
    pub allowed: HashSet<Action>,
    pub mouse: MouseState,
    pub allow_mouse: bool,
    /// Screens that count as complete without any drawing.
    pub prechecked: bool,
}

impl Screen {
    pub fn new(index: usize, words: Vec<WordUnit>, draw_box: DrawBox) -> Self {
        let mut screen = Self {
            index,
            words,
            draw_box,
            allowed: HashSet::new(),
            mouse: MouseState {
                absolute: (0.0, 0.0),
                relative: (0.0, 0.0),
                value: 0.0,
            },
            allow_mouse: true,
            prechecked: false,
        };
        screen.reset_cursor();
        screen
    }

    pub fn allow(&mut self, action: Action) {
        self.allowed.insert(action);
    }

    pub fn allows(&self, action: Action) -> bool {
        self.allowed.contains(&action)
    }

    pub fn is_complete(&self) -> bool {
        self.prechecked || self.words.iter().all(|w| w.checked)
    }

    pub fn checked_count(&self) -> usize {
        self.words.iter().filter(|w| w.checked).count()
    }

    pub fn check_words(&mut self, slack: f64) {
        let x = self.mouse.relative.0;
        for word in &mut self.words {
            word.check(x, slack);
        }
    }

    pub fn uncheck_words(&mut self) {
        for word in &mut self.words {
            word.uncheck();
        }
    }

    /// Move the cursor to a position relative to the drawing box.
    pub fn set_cursor(&mut self, relative: (f64, f64)) {
        let (ox, oy) = self.draw_box.origin;
        self.mouse.relative = relative;
        self.mouse.absolute = (relative.0 + ox, relative.1 + oy);
    }

    /// Bottom-left corner of the drawing box, value zero.
    pub fn reset_cursor(&mut self) {
        self.set_cursor((0.0, self.draw_box.height));
        self.mouse.value = 0.0;
    }

    /// Store the semantic value under the cursor. The cursor may sit above
    /// the box after zooming out; its value is kept as is.
    pub fn remember_value(&mut self, zoom: &ZoomScale) {
        self.mouse.value = self.draw_box.to_value((0.0, self.mouse.relative.1), zoom).1;
    }

    /// Put the cursor back at the height of its stored semantic value.
    pub fn cursor_from_value(&mut self, zoom: &ZoomScale) {
        let (_, y) = self.draw_box.to_pixel((0.0, self.mouse.value), zoom);
        self.set_cursor((self.mouse.relative.0, y));
    }
}
