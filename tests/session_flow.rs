use std::fs;

use serde_json::Value;
use tempfile::TempDir;

use suspense::config::Config;
use suspense::engine::aggregate::{Aggregate, SENTINEL};
use suspense::session::experiment::{Experiment, Phase};
use suspense::session::navigator::{Action, CueReason, Outcome};
use suspense::store::json_store::JsonStore;
use suspense::store::schema::{CompactRow, SampleRow, SessionMeta};
use suspense::text::layout::line_dump;
use suspense::text::metrics::CellMetrics;
use suspense::text::source::{bundled_training_rows, rows_from_json, rows_from_plain};
use suspense::text::unit::WordUnit;

const STORY: &str = r#"[
    {"text": "The house at the end of the lane had been empty for years", "part": "setup"},
    {"text": "One night a light appeared in the attic window", "part": "setup"},
    {"text": "Nobody in the village dared to knock", "part": "climax"}
]"#;

fn config(lines_per_screen: usize) -> Config {
    Config {
        lines_per_screen,
        ..Config::default()
    }
}

/// Two-line screens split the story; ten lines fit every training paragraph
/// on its own screen.
fn build(training: bool) -> Experiment {
    let rows = rows_from_json(STORY).unwrap();
    let practice = bundled_training_rows().unwrap();
    let lines = if training { 10 } else { 2 };
    let mut experiment = Experiment::build(
        &rows,
        training.then_some(practice.as_slice()),
        &config(lines),
        (60.0, 40.0),
        &CellMetrics,
    )
    .unwrap();
    experiment.start(100.0);
    experiment
}

/// Flat stroke at pixel height `y` across the current drawing box.
fn sweep(experiment: &mut Experiment, y: f64, at: f64) {
    let (ox, oy) = experiment.screen().draw_box.origin;
    let width = experiment.screen().draw_box.width;
    experiment.draw_at((ox, oy + y), at);
    experiment.draw_at((ox + width / 2.0, oy + y), at + 0.5);
    experiment.draw_at((ox + width, oy + y), at + 1.0);
}

fn read_rows(path: &std::path::Path) -> Vec<Value> {
    let content: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    content["rows"].as_array().unwrap().clone()
}

#[test]
fn test_full_main_session_exports() {
    let dir = TempDir::new().unwrap();
    let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    let mut meta = SessionMeta::new("p7", 2);
    meta.extra.insert("group".to_string(), "b".to_string());

    let mut experiment = build(false);
    let lines = line_dump(&experiment.main.screens);
    assert!(lines.iter().all(|l| l.line_nr_on_screen <= 2));
    let lines_path = store.save_lines(&meta, &lines).unwrap();
    assert_eq!(read_rows(&lines_path).len(), lines.len());

    let screens = experiment.main.screen_count();
    assert!(screens >= 2);
    let mut at = 101.0;
    for _ in 0..screens {
        assert_eq!(
            experiment.apply(Action::Forward, at),
            Outcome::Cue(CueReason::IncompleteDrawing)
        );
        sweep(&mut experiment, 4.0, at);
        at += 2.0;
        experiment.apply(Action::Forward, at);
        at += 1.0;
    }
    assert_eq!(experiment.phase, Phase::Done);
    assert_eq!(experiment.memory.filled(), experiment.main.word_count());

    let words: Vec<&WordUnit> = experiment.main.words().collect();
    assert!(words.iter().all(|w| !w.values.is_empty()));
    let aggregate =
        Aggregate::compute(words.iter().copied()).with_first_visits(experiment.main.first_visits());
    assert_eq!(aggregate.screens.len(), screens);
    assert_eq!(aggregate.screens[&1].screen_first_shown_time, 100.0);
    assert!(aggregate.screens[&2].screen_first_shown_time > 100.0);
    assert_eq!(aggregate.screens[&screens].time_until_next_screen, SENTINEL);
    assert!(aggregate.session.min_screen_time <= aggregate.session.max_screen_time);

    let samples = SampleRow::rows(&words, &aggregate, &meta);
    let compact = CompactRow::rows(&words, &aggregate, &meta);
    let sample_count: usize = words.iter().map(|w| w.values.len()).sum();
    assert_eq!(samples.len(), sample_count);
    assert_eq!(compact.len(), words.len());

    let samples_path = store.save_samples(&meta, &samples).unwrap();
    let compact_path = store.save_compact(&meta, &compact).unwrap();

    let written = read_rows(&samples_path);
    assert_eq!(written.len(), sample_count);
    assert_eq!(written[0]["participant"], "p7");
    assert_eq!(written[0]["text_number_in_experiment"], 2);
    assert_eq!(written[0]["group"], "b");
    assert_eq!(written[0]["part"], "setup");
    assert_eq!(written[0]["screen_first_shown_time"], 100.0);

    let last = read_rows(&compact_path).last().cloned().unwrap();
    assert_eq!(last["part"], "climax");
    assert!(last.get("value").is_none());
}

#[test]
fn test_training_gates_controls_and_resets_before_main() {
    let mut experiment = build(true);
    assert_eq!(experiment.phase, Phase::Training);
    let training_screens = experiment.training.as_ref().unwrap().screen_count();
    assert_eq!(training_screens, 8);

    // The first training screen has no delete key.
    sweep(&mut experiment, 4.0, 101.0);
    assert_eq!(experiment.apply(Action::Delete, 102.0), Outcome::Stay);
    assert!(experiment.screen().is_complete());

    let mut at = 103.0;
    for _ in 0..training_screens {
        if experiment.screen().allow_mouse && !experiment.screen().is_complete() {
            sweep(&mut experiment, 4.0, at);
        }
        if experiment.screen().allows(Action::ZoomIn) {
            experiment.apply(Action::ZoomIn, at);
        }
        experiment.apply(Action::Forward, at + 1.0);
        at += 2.0;
    }

    assert_eq!(experiment.phase, Phase::Main);
    assert_eq!(experiment.main.current, 0);
    assert_eq!(experiment.zoom.current_max_y, Config::default().zoom.initial);
    assert_eq!(experiment.memory.filled(), 0);
    assert!(experiment.main.words().all(|w| w.values.is_empty()));
}

#[test]
fn test_quit_is_not_bound_during_training() {
    let mut experiment = build(true);
    // Quit is not bound on training screens.
    assert_eq!(experiment.apply(Action::Quit, 101.0), Outcome::Stay);
    assert_eq!(experiment.phase, Phase::Training);
}

/// Four paragraphs of sixty words each.
fn long_text() -> String {
    let vocabulary = ["the", "stairs", "creaked", "under", "her", "weight", "as", "something", "moved", "upstairs"];
    (0..4)
        .map(|p| {
            (0..60)
                .map(|i| vocabulary[(p * 3 + i) % vocabulary.len()])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_default_layout_records_every_word() {
    let rows = rows_from_plain(&long_text());
    let config = Config::default();
    let mut experiment =
        Experiment::build(&rows, None, &config, (100.0, 39.0), &CellMetrics).unwrap();
    experiment.start(100.0);
    assert_eq!(experiment.main.word_count(), 240);

    let mut at = 101.0;
    while experiment.phase != Phase::Done {
        assert!(at < 400.0, "session did not finish");
        sweep(&mut experiment, 4.0, at);
        experiment.apply(Action::Forward, at + 1.5);
        at += 3.0;
    }

    let bare: Vec<usize> = experiment
        .main
        .words()
        .filter(|w| w.values.is_empty())
        .map(|w| w.number)
        .collect();
    assert!(bare.is_empty(), "words without samples: {bare:?}");
    assert_eq!(experiment.memory.filled(), 240);

    let words: Vec<&WordUnit> = experiment.main.words().collect();
    let aggregate = Aggregate::compute(words.iter().copied());
    assert_eq!(aggregate.words.len(), 240);
    assert_eq!(CompactRow::rows(&words, &aggregate, &SessionMeta::new("p1", 1)).len(), 240);
}
