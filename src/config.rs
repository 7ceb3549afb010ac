use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_lines_per_screen")]
    pub lines_per_screen: usize,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub unit_delimiter: Option<String>,
    #[serde(default = "default_check_slack")]
    pub check_slack: f64,
    #[serde(default = "default_training_enabled")]
    pub training_enabled: bool,
    #[serde(default = "default_results_dir")]
    pub results_dir: String,
    #[serde(default)]
    pub proportions: Proportions,
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub keys: KeyBindings,
}

/// Box placement as percentages of the terminal size, mirroring how the
/// experiment was laid out on a 1920x1080 display.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proportions {
    #[serde(default = "default_text_height")]
    pub text_height: f64,
    #[serde(default = "default_text_width")]
    pub text_width: f64,
    #[serde(default = "default_text_y")]
    pub text_y: f64,
    #[serde(default = "default_text_x")]
    pub text_x: f64,
    #[serde(default = "default_draw_height")]
    pub draw_height: f64,
    #[serde(default = "default_draw_space")]
    pub draw_space: f64,
    #[serde(default = "default_memory_height")]
    pub memory_height: f64,
    /// Cells between the bottom of the text box and the memory box.
    #[serde(default = "default_memory_gap")]
    pub memory_gap: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ZoomConfig {
    #[serde(default = "default_zoom_initial")]
    pub initial: f64,
    #[serde(default = "default_zoom_min")]
    pub min: f64,
    #[serde(default = "default_zoom_max")]
    pub max: f64,
}

/// Which training screens (1-based) unlock drawing and extra actions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_drawing_screens")]
    pub drawing_screens: Vec<usize>,
    #[serde(default = "default_zoom_in_screens")]
    pub zoom_in_screens: Vec<usize>,
    #[serde(default = "default_zoom_out_screens")]
    pub zoom_out_screens: Vec<usize>,
    #[serde(default = "default_delete_screens")]
    pub delete_screens: Vec<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_key_forward")]
    pub forward: String,
    #[serde(default = "default_key_backward")]
    pub backward: String,
    #[serde(default = "default_key_zoom_in")]
    pub zoom_in: String,
    #[serde(default = "default_key_zoom_out")]
    pub zoom_out: String,
    #[serde(default = "default_key_delete")]
    pub delete: String,
    #[serde(default = "default_key_quit")]
    pub quit: String,
}

fn default_lines_per_screen() -> usize {
    10
}
fn default_theme() -> String {
    "paper".to_string()
}
fn default_check_slack() -> f64 {
    1.0
}
fn default_training_enabled() -> bool {
    true
}
fn default_results_dir() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("suspense")
        .join("results")
        .to_string_lossy()
        .to_string()
}
fn default_text_height() -> f64 {
    35.0
}
fn default_text_width() -> f64 {
    80.0
}
fn default_text_y() -> f64 {
    45.0
}
fn default_text_x() -> f64 {
    10.0
}
fn default_draw_height() -> f64 {
    35.0
}
fn default_draw_space() -> f64 {
    5.0
}
fn default_memory_height() -> f64 {
    15.0
}
fn default_memory_gap() -> f64 {
    1.0
}
fn default_zoom_initial() -> f64 {
    10.0
}
fn default_zoom_min() -> f64 {
    0.1
}
fn default_zoom_max() -> f64 {
    1000.0
}
fn default_drawing_screens() -> Vec<usize> {
    vec![1, 3, 4, 5, 6, 7]
}
fn default_zoom_in_screens() -> Vec<usize> {
    vec![4]
}
fn default_zoom_out_screens() -> Vec<usize> {
    vec![5]
}
fn default_delete_screens() -> Vec<usize> {
    vec![6]
}
fn default_key_forward() -> String {
    "s".to_string()
}
fn default_key_backward() -> String {
    "a".to_string()
}
fn default_key_zoom_in() -> String {
    "d".to_string()
}
fn default_key_zoom_out() -> String {
    "e".to_string()
}
fn default_key_delete() -> String {
    "esc".to_string()
}
fn default_key_quit() -> String {
    "q".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lines_per_screen: default_lines_per_screen(),
            theme: default_theme(),
            unit_delimiter: None,
            check_slack: default_check_slack(),
            training_enabled: default_training_enabled(),
            results_dir: default_results_dir(),
            proportions: Proportions::default(),
            zoom: ZoomConfig::default(),
            training: TrainingConfig::default(),
            keys: KeyBindings::default(),
        }
    }
}

impl Default for Proportions {
    fn default() -> Self {
        Self {
            text_height: default_text_height(),
            text_width: default_text_width(),
            text_y: default_text_y(),
            text_x: default_text_x(),
            draw_height: default_draw_height(),
            draw_space: default_draw_space(),
            memory_height: default_memory_height(),
            memory_gap: default_memory_gap(),
        }
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            initial: default_zoom_initial(),
            min: default_zoom_min(),
            max: default_zoom_max(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            drawing_screens: default_drawing_screens(),
            zoom_in_screens: default_zoom_in_screens(),
            zoom_out_screens: default_zoom_out_screens(),
            delete_screens: default_delete_screens(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: default_key_forward(),
            backward: default_key_backward(),
            zoom_in: default_key_zoom_in(),
            zoom_out: default_key_zoom_out(),
            delete: default_key_delete(),
            quit: default_key_quit(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("suspense")
            .join("config.toml")
    }

    /// Clamp values a hand-edited config file may have pushed out of range.
    pub fn validate(&mut self) {
        self.lines_per_screen = self.lines_per_screen.clamp(1, 50);
        self.check_slack = self.check_slack.clamp(0.0, 20.0);

        if !(self.zoom.min > 0.0) {
            self.zoom.min = default_zoom_min();
        }
        if self.zoom.max < self.zoom.min {
            self.zoom.max = self.zoom.min;
        }
        self.zoom.initial = self.zoom.initial.clamp(self.zoom.min, self.zoom.max);

        let p = &mut self.proportions;
        for pct in [
            &mut p.text_height,
            &mut p.text_width,
            &mut p.text_y,
            &mut p.text_x,
            &mut p.draw_height,
            &mut p.draw_space,
            &mut p.memory_height,
        ] {
            *pct = pct.clamp(0.0, 100.0);
        }
        p.memory_gap = p.memory_gap.max(0.0);

        if let Some(delim) = &self.unit_delimiter
            && delim.is_empty()
        {
            self.unit_delimiter = None;
        }
    }
}
