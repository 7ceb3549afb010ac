use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_embed::Embed;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::text::unit::WordUnit;

#[derive(Embed)]
#[folder = "assets/training/"]
struct TrainingAssets;

const TEXT_FIELD: &str = "text";
const BUNDLED_TRAINING: &str = "training.json";

/// One record of the row source: a `text` field plus arbitrary string
/// properties that are carried through to every word of the row.
pub type Row = BTreeMap<String, String>;

/// Rows from a JSON array of objects. Non-string values are stringified.
pub fn rows_from_json(content: &str) -> Result<Vec<Row>> {
    let parsed: Vec<Value> = serde_json::from_str(content)?;
    parsed
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let Value::Object(fields) = value else {
                return Err(Error::MissingTextField { row: i + 1 });
            };
            Ok(fields
                .into_iter()
                .map(|(key, value)| {
                    let value = match value {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (key, value)
                })
                .collect())
        })
        .collect()
}

/// Rows from plain text: every non-blank line is one paragraph.
pub fn rows_from_plain(content: &str) -> Vec<Row> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Row::from([(TEXT_FIELD.to_string(), line.to_string())]))
        .collect()
}

/// Load rows from a `.json` file, or treat any other file as plain text.
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let rows = if is_json {
        rows_from_json(&content)?
    } else {
        rows_from_plain(&content)
    };
    tracing::info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// The training text shipped with the binary.
pub fn bundled_training_rows() -> Result<Vec<Row>> {
    let file = TrainingAssets::get(BUNDLED_TRAINING).ok_or_else(|| {
        Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "bundled training text missing",
        ))
    })?;
    let content = String::from_utf8_lossy(file.data.as_ref());
    rows_from_json(&content)
}

/// Split every row's text into word units. Each row is one paragraph and
/// its remaining fields become the properties of its words.
pub fn split_words(rows: &[Row], delimiter: Option<&str>) -> Result<Vec<WordUnit>> {
    let mut words = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let paragraph = i + 1;
        let text = row
            .get(TEXT_FIELD)
            .ok_or(Error::MissingTextField { row: paragraph })?;
        let properties: BTreeMap<String, String> = row
            .iter()
            .filter(|(key, _)| key.as_str() != TEXT_FIELD)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let tokens: Vec<&str> = match delimiter {
            Some(delim) => text.split(delim).filter(|t| !t.trim().is_empty()).collect(),
            None => text.split_whitespace().collect(),
        };
        for token in tokens {
            let number = words.len() + 1;
            words.push(WordUnit::new(token, number, paragraph, properties.clone()));
        }
    }
    if words.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(words)
}
