use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::aggregate::{Aggregate, ScreenStats, SessionStats, WordStats, round_time, round_value};
use crate::text::unit::WordUnit;

pub const EXPORT_VERSION: u32 = 1;

/// Who read which text when. `extra` holds free-form `key=value` answers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionMeta {
    pub participant: String,
    /// Position of this text within the participant's experiment.
    pub round: u32,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl SessionMeta {
    pub fn new(participant: &str, round: u32) -> Self {
        Self {
            participant: participant.to_string(),
            round,
            started_at: Utc::now(),
            extra: BTreeMap::new(),
        }
    }

    /// Filesystem-safe stem shared by all files of one session.
    pub fn file_stem(&self) -> String {
        let participant: String = self
            .participant
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!(
            "{}_r{}_{}",
            participant,
            self.round,
            self.started_at.format("%Y%m%d-%H%M%S")
        )
    }

    /// Row properties with the session answers underneath; word fields win.
    fn merged(&self, word: &WordUnit) -> BTreeMap<String, String> {
        let mut properties = self.extra.clone();
        properties.extend(word.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        properties
    }
}

/// One line of the text as laid out, written before the session starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineRow {
    pub line_nr: usize,
    pub screen_nr: usize,
    pub line_nr_on_screen: usize,
    pub text: String,
}

/// One recorded sample with everything known about its word.
#[derive(Clone, Debug, Serialize)]
pub struct SampleRow {
    pub participant: String,
    pub text_number_in_experiment: u32,
    pub text: String,
    pub number: usize,
    pub paragraph: usize,
    pub width: f64,
    pub height: f64,
    pub position_x: f64,
    pub position_y: f64,
    pub cumulative_x: f64,
    pub cumulative_end: f64,
    pub cumulative_total: f64,
    pub screen_width: f64,
    pub screen_number: usize,
    pub line_number_on_screen: usize,
    pub checked: bool,
    pub value: f64,
    pub time: f64,
    #[serde(flatten)]
    pub word_stats: WordStats,
    #[serde(flatten)]
    pub screen_stats: ScreenStats,
    #[serde(flatten)]
    pub session_stats: SessionStats,
    #[serde(flatten)]
    pub properties: BTreeMap<String, String>,
}

/// One row per sampled word, without geometry or raw samples.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompactRow {
    pub participant: String,
    pub text_number_in_experiment: u32,
    pub text: String,
    pub number: usize,
    pub paragraph: usize,
    pub position_x: f64,
    pub cumulative_x: f64,
    pub screen_number: usize,
    pub line_number_on_screen: usize,
    #[serde(flatten)]
    pub word_stats: WordStats,
    #[serde(flatten)]
    pub screen_stats: ScreenStats,
    #[serde(flatten)]
    pub session_stats: SessionStats,
    #[serde(flatten)]
    pub properties: BTreeMap<String, String>,
}

/// Envelope around exported rows so files can be told apart later.
#[derive(Clone, Debug, Serialize)]
pub struct ExportFile<'a, T> {
    pub suspense_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub meta: &'a SessionMeta,
    pub rows: &'a [T],
}

/// Words that received samples, paired with their derived metrics.
fn sampled<'a>(
    words: &'a [&'a WordUnit],
    aggregate: &'a Aggregate,
) -> impl Iterator<Item = (&'a WordUnit, &'a WordStats, &'a ScreenStats)> {
    words.iter().filter_map(move |w| {
        let word_stats = aggregate.words.get(&w.number)?;
        let screen_stats = aggregate.screens.get(&w.screen_number)?;
        Some((*w, word_stats, screen_stats))
    })
}

impl SampleRow {
    pub fn rows(words: &[&WordUnit], aggregate: &Aggregate, meta: &SessionMeta) -> Vec<Self> {
        let mut rows = Vec::new();
        for (word, word_stats, screen_stats) in sampled(words, aggregate) {
            let properties = meta.merged(word);
            for (&value, &time) in word.values.iter().zip(&word.times) {
                rows.push(Self {
                    participant: meta.participant.clone(),
                    text_number_in_experiment: meta.round,
                    text: word.text.clone(),
                    number: word.number,
                    paragraph: word.paragraph,
                    width: word.width,
                    height: word.height,
                    position_x: word.position_x,
                    position_y: word.position_y,
                    cumulative_x: word.cumulative_x,
                    cumulative_end: word.cumulative_end,
                    cumulative_total: word.cumulative_total,
                    screen_width: word.screen_width,
                    screen_number: word.screen_number,
                    line_number_on_screen: word.line_on_screen,
                    checked: word.checked,
                    value: round_value(value),
                    time: round_time(time),
                    word_stats: word_stats.clone(),
                    screen_stats: screen_stats.clone(),
                    session_stats: aggregate.session.clone(),
                    properties: properties.clone(),
                });
            }
        }
        rows
    }
}

impl CompactRow {
    pub fn rows(words: &[&WordUnit], aggregate: &Aggregate, meta: &SessionMeta) -> Vec<Self> {
        let mut rows: Vec<Self> = Vec::new();
        for (word, word_stats, screen_stats) in sampled(words, aggregate) {
            let row = Self {
                participant: meta.participant.clone(),
                text_number_in_experiment: meta.round,
                text: word.text.clone(),
                number: word.number,
                paragraph: word.paragraph,
                position_x: word.position_x,
                cumulative_x: word.cumulative_x,
                screen_number: word.screen_number,
                line_number_on_screen: word.line_on_screen,
                word_stats: word_stats.clone(),
                screen_stats: screen_stats.clone(),
                session_stats: aggregate.session.clone(),
                properties: meta.merged(word),
            };
            if !rows.contains(&row) {
                rows.push(row);
            }
        }
        rows
    }
}
