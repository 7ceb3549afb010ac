use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;

use crate::store::schema::{CompactRow, EXPORT_VERSION, ExportFile, LineRow, SampleRow, SessionMeta};

/// Results directory. Every session writes its own set of files, named
/// after the participant, round and start time.
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn file_path(&self, meta: &SessionMeta, kind: &str) -> PathBuf {
        self.base_dir.join(format!("{}_{}.json", meta.file_stem(), kind))
    }

    fn save<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn save_rows<T: Serialize>(&self, meta: &SessionMeta, kind: &str, rows: &[T]) -> Result<PathBuf> {
        let path = self.file_path(meta, kind);
        let file = ExportFile {
            suspense_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            meta,
            rows,
        };
        self.save(&path, &file)?;
        tracing::info!("Wrote {} {} rows to {}", rows.len(), kind, path.display());
        Ok(path)
    }

    pub fn save_lines(&self, meta: &SessionMeta, rows: &[LineRow]) -> Result<PathBuf> {
        self.save_rows(meta, "lines", rows)
    }

    pub fn save_samples(&self, meta: &SessionMeta, rows: &[SampleRow]) -> Result<PathBuf> {
        self.save_rows(meta, "samples", rows)
    }

    pub fn save_compact(&self, meta: &SessionMeta, rows: &[CompactRow]) -> Result<PathBuf> {
        self.save_rows(meta, "compact", rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().join("results")).unwrap();
        (dir, store)
    }

    fn lines() -> Vec<LineRow> {
        vec![
            LineRow {
                line_nr: 0,
                screen_nr: 1,
                line_nr_on_screen: 1,
                text: "it was a dark".to_string(),
            },
            LineRow {
                line_nr: 1,
                screen_nr: 1,
                line_nr_on_screen: 2,
                text: "and stormy night".to_string(),
            },
        ]
    }

    #[test]
    fn test_with_base_dir_creates_directory() {
        let (_dir, store) = make_test_store();
        assert!(store.base_dir().is_dir());
    }

    #[test]
    fn test_save_lines_round_trip() {
        let (_dir, store) = make_test_store();
        let meta = SessionMeta::new("p1", 1);
        let path = store.save_lines(&meta, &lines()).unwrap();

        assert!(path.file_name().unwrap().to_str().unwrap().ends_with("_lines.json"));
        let content: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["suspense_export_version"], EXPORT_VERSION);
        assert_eq!(content["meta"]["participant"], "p1");
        let rows: Vec<LineRow> = serde_json::from_value(content["rows"].clone()).unwrap();
        assert_eq!(rows, lines());
    }

    #[test]
    fn test_save_leaves_no_tmp_files() {
        let (_dir, store) = make_test_store();
        let meta = SessionMeta::new("p1", 1);
        store.save_lines(&meta, &lines()).unwrap();
        store.save_lines(&meta, &lines()[..1]).unwrap();

        let tmp_files: Vec<_> = fs::read_dir(store.base_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("tmp"))
            .collect();
        assert!(tmp_files.is_empty(), "no residual .tmp files");

        let path = store.file_path(&meta, "lines");
        let content: Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(content["rows"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_session_files_are_distinct() {
        let (_dir, store) = make_test_store();
        let meta = SessionMeta::new("p1", 3);
        let samples = store.save_samples(&meta, &[]).unwrap();
        let compact = store.save_compact(&meta, &[]).unwrap();
        assert_ne!(samples, compact);
        assert!(samples.exists() && compact.exists());
    }
}
