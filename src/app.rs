use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use suspense::engine::aggregate::Aggregate;
use suspense::keymap::KeyMap;
use suspense::session::experiment::{Experiment, Phase};
use suspense::session::navigator::{Action, CueReason, Outcome};
use suspense::store::json_store::JsonStore;
use suspense::store::schema::{CompactRow, SampleRow, SessionMeta};
use suspense::text::unit::WordUnit;

use crate::ui::theme::Theme;

/// How long the status line stays highlighted after a cue.
const CUE_FLASH: Duration = Duration::from_millis(600);
/// Repeated cues while dragging ring the bell at most this often.
const BELL_INTERVAL: Duration = Duration::from_millis(400);

/// Wall clock in seconds since the UNIX epoch.
pub fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

pub struct App {
    pub experiment: Experiment,
    pub keymap: KeyMap,
    pub theme: &'static Theme,
    pub meta: SessionMeta,
    pub store: JsonStore,
    pub cue: Option<(CueReason, Instant)>,
    /// Last time the recap received new values.
    pub recap_flash: Option<Instant>,
    /// Set when the terminal bell should ring on the next frame.
    pub bell: bool,
    pub should_quit: bool,
    pub exported: Vec<PathBuf>,
}

impl App {
    pub fn new(
        experiment: Experiment,
        keymap: KeyMap,
        theme: &'static Theme,
        meta: SessionMeta,
        store: JsonStore,
    ) -> Self {
        Self {
            experiment,
            keymap,
            theme,
            meta,
            store,
            cue: None,
            recap_flash: None,
            bell: false,
            should_quit: false,
            exported: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.experiment.start(now_secs());
    }

    pub fn handle_action(&mut self, action: Action) {
        let before = self.experiment.phase;
        let outcome = self.experiment.apply(action, now_secs());
        if before == Phase::Training && self.experiment.phase == Phase::Main {
            info!("Participant {} finished training", self.meta.participant);
        }
        if self.experiment.memory.due {
            self.experiment.memory.due = false;
            self.recap_flash = Some(Instant::now());
        }
        self.react(outcome);
    }

    /// Pointer pressed or dragged at terminal cell `(column, row)`.
    pub fn handle_draw(&mut self, column: u16, row: u16) {
        let outcome = self
            .experiment
            .draw_at((f64::from(column), f64::from(row)), now_secs());
        self.react(outcome);
    }

    fn react(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Cue(reason) => {
                let now = Instant::now();
                let recent = self
                    .cue
                    .is_some_and(|(_, at)| now.duration_since(at) < BELL_INTERVAL);
                if !recent {
                    self.bell = true;
                }
                self.cue = Some((reason, now));
            }
            Outcome::Finished | Outcome::Quit if self.experiment.is_done() => self.finish(),
            _ => {}
        }
    }

    /// Cue to show on the status line, if one is still flashing.
    pub fn active_cue(&self) -> Option<CueReason> {
        self.cue
            .filter(|(_, at)| at.elapsed() < CUE_FLASH)
            .map(|(reason, _)| reason)
    }

    /// Whether the recap should still be highlighted after an update.
    pub fn recap_highlighted(&self) -> bool {
        self.recap_flash.is_some_and(|at| at.elapsed() < CUE_FLASH)
    }

    /// Export whatever the main text has recorded and leave.
    pub fn finish(&mut self) {
        if self.experiment.phase != Phase::Training {
            match self.export() {
                Ok(paths) => self.exported = paths,
                Err(e) => warn!("Export failed: {e:#}"),
            }
        }
        self.should_quit = true;
    }

    pub fn export(&self) -> Result<Vec<PathBuf>> {
        let words: Vec<&WordUnit> = self.experiment.main.words().collect();
        let aggregate = Aggregate::compute(words.iter().copied())
            .with_first_visits(self.experiment.main.first_visits());
        let samples = SampleRow::rows(&words, &aggregate, &self.meta);
        let compact = CompactRow::rows(&words, &aggregate, &self.meta);
        Ok(vec![
            self.store.save_samples(&self.meta, &samples)?,
            self.store.save_compact(&self.meta, &compact)?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suspense::config::{Config, KeyBindings};
    use suspense::text::metrics::CellMetrics;
    use suspense::text::source::rows_from_plain;
    use tempfile::TempDir;

    fn make_app(dir: &TempDir) -> App {
        let rows = rows_from_plain("one two three\nfour five");
        let config = Config {
            lines_per_screen: 3,
            ..Config::default()
        };
        let mut experiment = Experiment::build(&rows, None, &config, (100.0, 60.0), &CellMetrics).unwrap();
        experiment.start(0.0);
        App::new(
            experiment,
            KeyMap::from_config(&KeyBindings::default()).unwrap(),
            Box::leak(Box::new(Theme::default())),
            SessionMeta::new("p1", 1),
            JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap(),
        )
    }

    /// Drag across the drawing box of the current screen.
    fn sweep(app: &mut App) {
        let (ox, oy) = app.experiment.screen().draw_box.origin;
        let width = app.experiment.screen().draw_box.width;
        app.handle_draw(ox as u16, oy as u16 + 5);
        app.handle_draw((ox + width) as u16, oy as u16 + 5);
    }

    #[test]
    fn test_recap_update_is_highlighted_once_consumed() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);
        assert!(!app.recap_highlighted());

        sweep(&mut app);
        app.handle_action(Action::Forward);
        assert!(app.recap_highlighted());
        assert!(!app.experiment.memory.due);
        assert_eq!(app.experiment.memory.filled(), 3);
    }

    #[test]
    fn test_incomplete_forward_rings_bell() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);
        app.handle_action(Action::Forward);
        assert!(app.bell);
        assert_eq!(app.active_cue(), Some(CueReason::IncompleteDrawing));
        assert!(!app.recap_highlighted());
    }

    #[test]
    fn test_finishing_main_text_exports() {
        let dir = TempDir::new().unwrap();
        let mut app = make_app(&dir);
        sweep(&mut app);
        app.handle_action(Action::Forward);
        sweep(&mut app);
        app.handle_action(Action::Forward);
        assert!(app.should_quit);
        assert_eq!(app.exported.len(), 2);
        assert!(app.exported.iter().all(|p| p.exists()));
    }
}
