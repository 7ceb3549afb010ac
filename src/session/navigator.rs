use tracing::{debug, error};

use crate::session::draw_box::ZoomScale;
use crate::session::memory_box::MemoryBox;
use crate::session::screen::Screen;
use crate::text::unit::WordUnit;

/// Input the participant can give, independent of the key that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Backward,
    Delete,
    ZoomIn,
    ZoomOut,
    Quit,
}

/// Why the host should play its audible cue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CueReason {
    /// Forward pressed before every word on the screen was checked.
    IncompleteDrawing,
    /// Backward pressed on the first screen.
    FirstScreen,
    /// Drawing or deleting on a screen that was returned to.
    DrawingLocked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Stay,
    Moved(usize),
    Cue(CueReason),
    Finished,
    Quit,
}

/// State machine over an ordered sequence of screens.
#[derive(Clone, Debug)]
pub struct Navigator {
    pub screens: Vec<Screen>,
    pub current: usize,
    /// Training navigators never write to the memory recap.
    pub training: bool,
    check_slack: f64,
}

impl Navigator {
    pub fn new(screens: Vec<Screen>, training: bool, check_slack: f64) -> Self {
        Self {
            screens,
            current: 0,
            training,
            check_slack,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screens[self.current]
    }

    pub fn screen_count(&self) -> usize {
        self.screens.len()
    }

    pub fn words(&self) -> impl Iterator<Item = &WordUnit> {
        self.screens.iter().flat_map(|s| s.words.iter())
    }

    pub fn word_count(&self) -> usize {
        self.screens.iter().map(|s| s.words.len()).sum()
    }

    /// 1-based screen number and the time it was first shown, if ever.
    pub fn first_visits(&self) -> impl Iterator<Item = (usize, Option<f64>)> + '_ {
        self.screens
            .iter()
            .map(|s| (s.index + 1, s.draw_box.starting_time))
    }

    /// Bring the current screen up to date after it becomes visible: the
    /// trace is redrawn under the session zoom and the first visit is
    /// stamped.
    pub fn enter(&mut self, zoom: &ZoomScale, at: f64) {
        let slack = self.check_slack;
        let screen = &mut self.screens[self.current];
        screen.draw_box.map_to_pixel(zoom);
        screen.draw_box.set_starting_time(at);
        screen.check_words(slack);
    }

    /// Back to the first screen with a fresh cursor.
    pub fn restart(&mut self, zoom: &ZoomScale, at: f64) {
        self.current = 0;
        self.screens[0].reset_cursor();
        self.enter(zoom, at);
    }

    pub fn apply(
        &mut self,
        action: Action,
        zoom: &mut ZoomScale,
        memory: &mut MemoryBox,
        at: f64,
    ) -> Outcome {
        if !self.screen().allows(action) {
            debug!("Ignoring {:?} on screen {}", action, self.current + 1);
            return Outcome::Stay;
        }
        match action {
            Action::Forward => self.forward(zoom, memory, at),
            Action::Backward => self.backward(zoom, at),
            Action::Delete => self.delete(zoom),
            Action::ZoomIn => self.rezoom(zoom, ZoomScale::zoom_in),
            Action::ZoomOut => self.rezoom(zoom, ZoomScale::zoom_out),
            Action::Quit => Outcome::Quit,
        }
    }

    fn forward(&mut self, zoom: &ZoomScale, memory: &mut MemoryBox, at: f64) -> Outcome {
        let next = self.current + 1;
        if next >= self.screens.len() {
            if self.screen().allow_mouse && !self.screen().is_complete() {
                return Outcome::Cue(CueReason::IncompleteDrawing);
            }
            self.store_current(zoom, memory);
            return Outcome::Finished;
        }

        if self.screen().allow_mouse {
            if !self.screen().is_complete() {
                return Outcome::Cue(CueReason::IncompleteDrawing);
            }
            self.store_current(zoom, memory);
            let y = self.screens[self.current].mouse.relative.1;
            let upcoming = &mut self.screens[next];
            upcoming.set_cursor((0.0, y));
            upcoming.remember_value(zoom);
        } else if self.screens[next].mouse.value != 0.0 {
            self.screens[next].cursor_from_value(zoom);
        }

        self.current = next;
        self.enter(zoom, at);
        debug!("Forward to screen {}", self.current + 1);
        Outcome::Moved(self.current)
    }

    /// Commit the current trace into its words and the recap.
    fn store_current(&mut self, zoom: &ZoomScale, memory: &mut MemoryBox) {
        let training = self.training;
        let screen = &mut self.screens[self.current];
        if !screen.allow_mouse {
            return;
        }
        screen.remember_value(zoom);
        screen.draw_box.map_from_pixel(zoom);
        let values = screen.draw_box.values.clone();
        let times = screen.draw_box.times.clone();
        for word in &mut screen.words {
            let Some(mean) = word.store_values(&values, &times) else {
                continue;
            };
            if training || mean <= 0.0 {
                continue;
            }
            if let Err(e) = memory.update_values(mean.trunc()) {
                error!("Recap rejected value for word {}: {}", word.number, e);
            }
        }
        memory.due = true;
    }

    fn backward(&mut self, zoom: &ZoomScale, at: f64) -> Outcome {
        if self.current == 0 {
            return Outcome::Cue(CueReason::FirstScreen);
        }
        let screen = &mut self.screens[self.current];
        screen.remember_value(zoom);
        if screen.allow_mouse {
            screen.draw_box.map_from_pixel(zoom);
        }

        self.current -= 1;
        self.screens[self.current].allow_mouse = false;
        self.enter(zoom, at);
        debug!("Back to screen {}, drawing locked", self.current + 1);
        Outcome::Moved(self.current)
    }

    /// Erase the current trace and put the cursor back where the previous
    /// screen left off.
    fn delete(&mut self, zoom: &ZoomScale) -> Outcome {
        if !self.screen().allow_mouse {
            return Outcome::Cue(CueReason::DrawingLocked);
        }
        let carried = if self.current > 0 {
            self.screens[self.current - 1].mouse.value
        } else {
            0.0
        };
        let screen = &mut self.screens[self.current];
        let (_, y) = screen.draw_box.to_pixel((0.0, carried), zoom);
        screen.set_cursor((0.0, y));
        screen.mouse.value = carried;
        screen.draw_box.erase();
        screen.uncheck_words();
        debug!("Erased drawing on screen {}", self.current + 1);
        Outcome::Stay
    }

    fn rezoom(&mut self, zoom: &mut ZoomScale, step: fn(&mut ZoomScale) -> bool) -> Outcome {
        let screen = &mut self.screens[self.current];
        screen.remember_value(zoom);
        if !step(zoom) {
            debug!("Zoom at bound {}", zoom.current_max_y);
            return Outcome::Stay;
        }
        screen.draw_box.map_to_pixel(zoom);
        screen.cursor_from_value(zoom);
        debug!("Zoom ceiling now {}", zoom.current_max_y);
        Outcome::Stay
    }

    /// Extend the trace to `point`, relative to the drawing box.
    pub fn draw_to(&mut self, point: (f64, f64), zoom: &ZoomScale, at: f64) -> Outcome {
        let slack = self.check_slack;
        let screen = &mut self.screens[self.current];
        if !screen.allow_mouse {
            return Outcome::Cue(CueReason::DrawingLocked);
        }
        if !screen.draw_box.contains(point) || point.0 < screen.mouse.relative.0 {
            return Outcome::Stay;
        }
        let (old_x, old_y) = screen.mouse.relative;
        let old = (old_x, old_y.clamp(0.0, screen.draw_box.height));
        screen.draw_box.record_mouse(old, point, at, zoom);
        screen.set_cursor(point);
        screen.remember_value(zoom);
        screen.check_words(slack);
        Outcome::Stay
    }
}
