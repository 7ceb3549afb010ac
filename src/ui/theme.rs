use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub text_unchecked: String,
    pub text_checked: String,
    pub draw_line: String,
    pub draw_cursor: String,
    pub axis: String,
    pub memory_line: String,
    pub status_bg: String,
    pub status_fg: String,
    pub cue: String,
    pub accent: String,
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        // User themes shadow the bundled ones
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("suspense")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path)
                && let Ok(theme) = toml::from_str::<Theme>(&content)
            {
                return Some(theme);
            }
        }

        let file = ThemeAssets::get(&format!("{name}.toml"))?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("paper").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#fbf8f1".to_string(),
            fg: "#2b2b2b".to_string(),
            text_unchecked: "#2b2b2b".to_string(),
            text_checked: "#9a9a9a".to_string(),
            draw_line: "#1f5fbf".to_string(),
            draw_cursor: "#c0392b".to_string(),
            axis: "#555555".to_string(),
            memory_line: "#7f8c8d".to_string(),
            status_bg: "#e8e2d4".to_string(),
            status_fg: "#2b2b2b".to_string(),
            cue: "#c0392b".to_string(),
            accent: "#1f5fbf".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn text_unchecked(&self) -> Color { Self::parse_color(&self.text_unchecked) }
    pub fn text_checked(&self) -> Color { Self::parse_color(&self.text_checked) }
    pub fn draw_line(&self) -> Color { Self::parse_color(&self.draw_line) }
    pub fn draw_cursor(&self) -> Color { Self::parse_color(&self.draw_cursor) }
    pub fn axis(&self) -> Color { Self::parse_color(&self.axis) }
    pub fn memory_line(&self) -> Color { Self::parse_color(&self.memory_line) }
    pub fn status_bg(&self) -> Color { Self::parse_color(&self.status_bg) }
    pub fn status_fg(&self) -> Color { Self::parse_color(&self.status_fg) }
    pub fn cue(&self) -> Color { Self::parse_color(&self.cue) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(ThemeColors::parse_color("#1f5fbf"), Color::Rgb(0x1f, 0x5f, 0xbf));
        assert_eq!(ThemeColors::parse_color("zzzzzz"), Color::White);
        assert_eq!(ThemeColors::parse_color("#fff"), Color::White);
    }

    #[test]
    fn test_bundled_themes_parse() {
        let names = Theme::available_themes();
        assert!(names.contains(&"paper".to_string()));
        assert!(names.contains(&"night".to_string()));
        for name in names {
            let file = ThemeAssets::get(&format!("{name}.toml")).unwrap();
            let content = std::str::from_utf8(file.data.as_ref()).unwrap();
            assert!(toml::from_str::<Theme>(content).is_ok(), "theme {name} parses");
        }
    }
}
