use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::text::unit::WordUnit;

/// Stand-in for a time that does not exist, e.g. the gap after the last screen.
pub const SENTINEL: f64 = 99999.0;

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Values are reported to 3 decimals.
pub fn round_value(value: f64) -> f64 {
    round_to(value, 3)
}

/// Times and durations are reported to 4 decimals.
pub fn round_time(value: f64) -> f64 {
    round_to(value, 4)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScreenStats {
    /// Rows carry the word's own screen number.
    #[serde(skip)]
    pub screen_number: usize,
    /// When the screen was first shown, before any drawing.
    pub screen_first_shown_time: f64,
    pub screen_starting_time: f64,
    pub screen_ending_time: f64,
    pub mean_screen_value: f64,
    pub screen_drawing_time: f64,
    pub time_until_next_screen: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordStats {
    pub mean_value: f64,
    pub drawing_time_word: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub mean_screen_time: f64,
    pub min_screen_time: f64,
    pub max_screen_time: f64,
    pub average_word_time: f64,
}

/// Derived metrics of one finished text. Only words and screens that
/// received samples are present.
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregate {
    /// Keyed by word number.
    pub words: BTreeMap<usize, WordStats>,
    /// Keyed by 1-based screen number.
    pub screens: BTreeMap<usize, ScreenStats>,
    pub session: SessionStats,
}

impl Aggregate {
    pub fn compute<'a, I>(words: I) -> Self
    where
        I: IntoIterator<Item = &'a WordUnit>,
    {
        let sampled: Vec<&WordUnit> = words.into_iter().filter(|w| !w.values.is_empty()).collect();

        let mut by_screen: BTreeMap<usize, Vec<&WordUnit>> = BTreeMap::new();
        for &word in &sampled {
            by_screen.entry(word.screen_number).or_default().push(word);
        }

        let mut screens: BTreeMap<usize, ScreenStats> = by_screen
            .iter()
            .map(|(&number, screen_words)| {
                let times = screen_words.iter().flat_map(|w| w.times.iter().copied());
                let start = round_time(times.clone().fold(f64::INFINITY, f64::min));
                let end = round_time(times.fold(f64::NEG_INFINITY, f64::max));
                let values: Vec<f64> = screen_words
                    .iter()
                    .flat_map(|w| w.values.iter().copied())
                    .collect();
                let stats = ScreenStats {
                    screen_number: number,
                    screen_first_shown_time: SENTINEL,
                    screen_starting_time: start,
                    screen_ending_time: end,
                    mean_screen_value: round_value(mean(&values).unwrap_or(0.0)),
                    screen_drawing_time: round_time(end - start),
                    time_until_next_screen: SENTINEL,
                };
                (number, stats)
            })
            .collect();

        let mut starts: Vec<f64> = screens.values().map(|s| s.screen_starting_time).collect();
        starts.sort_by(f64::total_cmp);
        starts.dedup();
        for stats in screens.values_mut() {
            if let Some(&next) = starts.iter().find(|&&t| t > stats.screen_starting_time) {
                stats.time_until_next_screen = round_time(next - stats.screen_starting_time);
            }
        }

        let words: BTreeMap<usize, WordStats> = sampled
            .iter()
            .map(|w| {
                let first = w.times.iter().copied().fold(f64::INFINITY, f64::min);
                let last = w.times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let stats = WordStats {
                    mean_value: round_value(w.mean_value().unwrap_or(0.0)),
                    drawing_time_word: round_time(last - first),
                };
                (w.number, stats)
            })
            .collect();

        let screen_times: Vec<f64> = screens.values().map(|s| s.screen_drawing_time).collect();
        let word_times: Vec<f64> = words.values().map(|w| w.drawing_time_word).collect();
        let session = SessionStats {
            mean_screen_time: mean(&screen_times).map_or(SENTINEL, round_time),
            min_screen_time: screen_times.iter().copied().reduce(f64::min).unwrap_or(SENTINEL),
            max_screen_time: screen_times.iter().copied().reduce(f64::max).unwrap_or(SENTINEL),
            average_word_time: mean(&word_times).map_or(SENTINEL, round_time),
        };

        tracing::debug!(
            "Aggregated {} sampled words over {} screens",
            words.len(),
            screens.len()
        );
        Self {
            words,
            screens,
            session,
        }
    }

    /// Attach the first-visit stamps of the screens, keyed by 1-based
    /// screen number. Screens never shown keep the sentinel.
    pub fn with_first_visits<I>(mut self, visits: I) -> Self
    where
        I: IntoIterator<Item = (usize, Option<f64>)>,
    {
        for (number, shown_at) in visits {
            if let (Some(stats), Some(at)) = (self.screens.get_mut(&number), shown_at) {
                stats.screen_first_shown_time = round_time(at);
            }
        }
        self
    }
}
