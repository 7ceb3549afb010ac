use crossterm::event::{KeyCode, KeyEvent};

use crate::config::KeyBindings;
use crate::error::{Error, Result};
use crate::session::navigator::Action;

/// Parse a key name from the config file: a single character, or one of
/// the named keys (`esc`, `enter`, `space`, `tab`, `backspace`, arrows,
/// `pageup`, `pagedown`). Case-insensitive.
pub fn parse_key(name: &str) -> Result<KeyCode> {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c.to_ascii_lowercase()));
    }
    let code = match trimmed.to_ascii_lowercase().as_str() {
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "space" => KeyCode::Char(' '),
        "tab" => KeyCode::Tab,
        "backspace" => KeyCode::Backspace,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        _ => return Err(Error::UnknownKey(name.to_string())),
    };
    Ok(code)
}

/// Translates raw key events into navigator actions.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyMap {
    bindings: Vec<(KeyCode, Action)>,
}

impl KeyMap {
    pub fn from_config(keys: &KeyBindings) -> Result<Self> {
        let bindings = [
            (&keys.forward, Action::Forward),
            (&keys.backward, Action::Backward),
            (&keys.delete, Action::Delete),
            (&keys.zoom_in, Action::ZoomIn),
            (&keys.zoom_out, Action::ZoomOut),
            (&keys.quit, Action::Quit),
        ]
        .into_iter()
        .map(|(name, action)| Ok((parse_key(name)?, action)))
        .collect::<Result<Vec<_>>>()?;
        Ok(Self { bindings })
    }

    pub fn action_for(&self, key: &KeyEvent) -> Option<Action> {
        let code = match key.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|&(_, action)| action)
    }

    /// Key name shown in hints, e.g. `s` or `Esc`.
    pub fn label(&self, action: Action) -> String {
        let Some((code, _)) = self.bindings.iter().find(|(_, a)| *a == action) else {
            return "-".to_string();
        };
        match code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::PageUp => "PgUp".to_string(),
            KeyCode::PageDown => "PgDn".to_string(),
            _ => "?".to_string(),
        }
    }
}
