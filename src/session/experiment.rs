use tracing::info;

use crate::config::{Config, TrainingConfig};
use crate::error::Result;
use crate::session::draw_box::ZoomScale;
use crate::session::memory_box::MemoryBox;
use crate::session::navigator::{Action, Navigator, Outcome};
use crate::session::screen::Screen;
use crate::text::layout::{LayoutGeometry, LayoutMode, measure_words, paginate};
use crate::text::metrics::{FontMetrics, fit_font_size};
use crate::text::source::{Row, split_words};

const ALL_ACTIONS: [Action; 6] = [
    Action::Forward,
    Action::Backward,
    Action::Delete,
    Action::ZoomIn,
    Action::ZoomOut,
    Action::Quit,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Training,
    Main,
    Done,
}

/// A whole reading session: an optional training run followed by the main
/// text, sharing one zoom scale and one memory recap.
#[derive(Clone, Debug)]
pub struct Experiment {
    pub geometry: LayoutGeometry,
    pub font_size: u32,
    pub training: Option<Navigator>,
    pub main: Navigator,
    pub phase: Phase,
    pub zoom: ZoomScale,
    pub memory: MemoryBox,
}

impl Experiment {
    /// Lay out both texts for a `width` x `height` screen.
    pub fn build<M: FontMetrics + ?Sized>(
        main_rows: &[Row],
        training_rows: Option<&[Row]>,
        config: &Config,
        (width, height): (f64, f64),
        metrics: &M,
    ) -> Result<Self> {
        let n_lines = config.lines_per_screen;
        let sizing = LayoutGeometry::from_screen(width, height, &config.proportions, n_lines, 0.0)?;
        let font_size = fit_font_size(metrics, sizing.textbox.height, n_lines)?;
        let geometry = LayoutGeometry {
            space_width: metrics.measure(" ", font_size).0,
            ..sizing
        };

        let delimiter = config.unit_delimiter.as_deref();
        let layout = |rows: &[Row], mode: LayoutMode| -> Result<Vec<Screen>> {
            let mut words = split_words(rows, delimiter)?;
            measure_words(&mut words, metrics, font_size);
            paginate(words, &geometry, mode)
        };

        let mut main_screens = layout(main_rows, LayoutMode::Main)?;
        configure_main(&mut main_screens);
        let main = Navigator::new(main_screens, false, config.check_slack);

        let training = match training_rows {
            Some(rows) => {
                let mut screens = layout(rows, LayoutMode::Training)?;
                configure_training(&mut screens, &config.training);
                Some(Navigator::new(screens, true, config.check_slack))
            }
            None => None,
        };

        let memory = MemoryBox::new(geometry.memorybox, main.word_count())?;
        let phase = if training.is_some() {
            Phase::Training
        } else {
            Phase::Main
        };
        info!(
            "Built session: {} main screens, {} training screens, font size {}",
            main.screen_count(),
            training.as_ref().map_or(0, Navigator::screen_count),
            font_size
        );

        Ok(Self {
            geometry,
            font_size,
            training,
            main,
            phase,
            zoom: ZoomScale::from_config(&config.zoom),
            memory,
        })
    }

    /// Show the first screen of the current phase.
    pub fn start(&mut self, at: f64) {
        let zoom = self.zoom;
        self.navigator_mut().enter(&zoom, at);
    }

    pub fn navigator(&self) -> &Navigator {
        match (self.phase, &self.training) {
            (Phase::Training, Some(nav)) => nav,
            _ => &self.main,
        }
    }

    fn navigator_mut(&mut self) -> &mut Navigator {
        match (self.phase, &mut self.training) {
            (Phase::Training, Some(nav)) => nav,
            _ => &mut self.main,
        }
    }

    pub fn screen(&self) -> &Screen {
        self.navigator().screen()
    }

    pub fn is_training(&self) -> bool {
        self.phase == Phase::Training
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn apply(&mut self, action: Action, at: f64) -> Outcome {
        if self.phase == Phase::Done {
            return Outcome::Stay;
        }
        let nav = match (self.phase, &mut self.training) {
            (Phase::Training, Some(nav)) => nav,
            _ => &mut self.main,
        };
        let outcome = nav.apply(action, &mut self.zoom, &mut self.memory, at);
        match (self.phase, outcome) {
            (Phase::Training, Outcome::Finished | Outcome::Quit) => {
                self.begin_main(at);
                Outcome::Moved(0)
            }
            (Phase::Main, Outcome::Finished | Outcome::Quit) => {
                info!("Main text ended ({:?})", outcome);
                self.phase = Phase::Done;
                outcome
            }
            _ => outcome,
        }
    }

    /// Extend the trace on the current screen; `point` is absolute.
    pub fn draw_at(&mut self, (x, y): (f64, f64), at: f64) -> Outcome {
        if self.phase == Phase::Done {
            return Outcome::Stay;
        }
        let zoom = self.zoom;
        let nav = self.navigator_mut();
        let (ox, oy) = nav.screen().draw_box.origin;
        nav.draw_to((x - ox, y - oy), &zoom, at)
    }

    /// Leave training and start the main text from a clean slate.
    pub fn begin_main(&mut self, at: f64) {
        info!("Training finished, starting main text");
        self.phase = Phase::Main;
        self.zoom.reset();
        self.memory.restart();
        self.main.restart(&self.zoom, at);
    }
}

fn configure_main(screens: &mut [Screen]) {
    for screen in screens {
        for action in ALL_ACTIONS {
            screen.allow(action);
        }
        screen.allow_mouse = true;
    }
}

/// Training screens step through the controls one at a time. Screen numbers
/// in the configuration are 1-based.
fn configure_training(screens: &mut [Screen], config: &TrainingConfig) {
    for (i, screen) in screens.iter_mut().enumerate() {
        let number = i + 1;
        screen.allow(Action::Forward);
        screen.allow(Action::Backward);
        screen.allow_mouse = config.drawing_screens.contains(&number);
        screen.prechecked = !screen.allow_mouse;
        if config.zoom_in_screens.contains(&number) {
            screen.allow(Action::ZoomIn);
        }
        if config.zoom_out_screens.contains(&number) {
            screen.allow(Action::ZoomOut);
        }
        if config.delete_screens.contains(&number) {
            screen.allow(Action::Delete);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::navigator::CueReason;
    use crate::text::metrics::CellMetrics;
    use crate::text::source::rows_from_plain;

    const SIZE: (f64, f64) = (100.0, 60.0);

    fn config() -> Config {
        Config {
            lines_per_screen: 3,
            ..Config::default()
        }
    }

    fn build(training: bool) -> Experiment {
        let main = rows_from_plain("one two three four five six\nseven eight nine");
        let practice = rows_from_plain("alpha beta\ngamma\ndelta\nepsilon\nzeta\neta\ntheta");
        let mut exp = Experiment::build(
            &main,
            training.then_some(practice.as_slice()),
            &config(),
            SIZE,
            &CellMetrics,
        )
        .unwrap();
        exp.start(0.0);
        exp
    }

    /// Absolute point at the far right of the drawing box at value height `y`.
    fn sweep(exp: &mut Experiment, y: f64, at: f64) {
        let (ox, oy) = exp.screen().draw_box.origin;
        exp.draw_at((ox, oy + y), at);
        let width = exp.screen().draw_box.width;
        exp.draw_at((ox + width, oy + y), at);
    }

    #[test]
    fn test_build_geometry_and_memory() {
        let exp = build(false);
        assert_eq!(exp.phase, Phase::Main);
        assert_eq!(exp.font_size, 50);
        assert_eq!(exp.geometry.space_width, 1.0);
        assert_eq!(exp.memory.slots.len(), 9);
        assert_eq!(exp.main.screen_count(), 2);
    }

    #[test]
    fn test_training_configuration() {
        let exp = build(true);
        let training = exp.training.as_ref().unwrap();
        assert_eq!(training.screen_count(), 7);
        let first = &training.screens[0];
        assert!(first.allow_mouse);
        assert!(first.allows(Action::Forward) && first.allows(Action::Backward));
        assert!(!first.allows(Action::Delete));
        assert!(!training.screens[1].allow_mouse);
        assert!(training.screens[1].is_complete());
        assert!(training.screens[3].allows(Action::ZoomIn));
        assert!(training.screens[4].allows(Action::ZoomOut));
        assert!(training.screens[5].allows(Action::Delete));
        assert!(!training.screens[5].allows(Action::Quit));
    }

    #[test]
    fn test_training_then_main_restart() {
        let mut exp = build(true);
        assert!(exp.is_training());
        sweep(&mut exp, 5.0, 1.0);
        assert_eq!(exp.apply(Action::Forward, 2.0), Outcome::Moved(1));
        // No drawing on screen two: forward is free.
        assert_eq!(exp.apply(Action::Forward, 3.0), Outcome::Moved(2));
        sweep(&mut exp, 5.0, 4.0);
        exp.apply(Action::Forward, 5.0);
        sweep(&mut exp, 5.0, 6.0);
        exp.apply(Action::ZoomIn, 6.5);
        assert_eq!(exp.zoom.current_max_y, 20.0);
        assert_eq!(exp.memory.filled(), 0);

        for step in 0..4 {
            let at = 7.0 + step as f64;
            if exp.screen().allow_mouse && !exp.screen().is_complete() {
                sweep(&mut exp, 5.0, at);
            }
            exp.apply(Action::Forward, at);
        }
        assert_eq!(exp.phase, Phase::Main);
        assert_eq!(exp.zoom.current_max_y, 10.0);
        assert_eq!(exp.main.current, 0);
        let height = exp.screen().draw_box.height;
        assert_eq!(exp.screen().mouse.relative, (0.0, height));
        assert_eq!(exp.memory.filled(), 0);
    }

    #[test]
    fn test_main_run_fills_memory_and_finishes() {
        let mut exp = build(false);
        assert_eq!(
            exp.apply(Action::Forward, 1.0),
            Outcome::Cue(CueReason::IncompleteDrawing)
        );
        sweep(&mut exp, 2.0, 1.0);
        assert_eq!(exp.apply(Action::Forward, 2.0), Outcome::Moved(1));
        sweep(&mut exp, 2.0, 3.0);
        assert_eq!(exp.apply(Action::Forward, 4.0), Outcome::Finished);
        assert!(exp.is_done());
        assert_eq!(exp.memory.filled(), 9);
        assert_eq!(exp.apply(Action::Forward, 5.0), Outcome::Stay);
    }

    #[test]
    fn test_default_lines_need_about_thirty_rows() {
        let rows = rows_from_plain("a short text");
        let config = Config::default();
        // 80x24 terminal minus the status row
        let err = Experiment::build(&rows, None, &config, (80.0, 23.0), &CellMetrics).unwrap_err();
        assert!(matches!(err, crate::error::Error::TextBoxTooSmall { lines: 10, .. }));
        assert!(Experiment::build(&rows, None, &config, (80.0, 29.0), &CellMetrics).is_ok());
    }

    #[test]
    fn test_quit_ends_main() {
        let mut exp = build(false);
        assert_eq!(exp.apply(Action::Quit, 1.0), Outcome::Quit);
        assert!(exp.is_done());
    }
}
