use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::types::RawRecord;

/// Loads POI records from `.json` (a single object or an array of objects)
/// and `.jsonl` (one object per line) files under a directory.
#[derive(Default)]
pub struct RecordLoader {
    limit: Option<usize>,
}

impl RecordLoader {
    pub fn new() -> Self { Self::default() }

    /// Stop after this many records.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn load_directory(&self, data_dir: &Path) -> Result<Vec<RawRecord>> {
        let files = self.list_record_files(data_dir);
        if files.is_empty() {
            warn!(dir = %data_dir.display(), "no .json/.jsonl files found");
            return Ok(vec![]);
        }
        let mut all = Vec::new();
        for (file_index, file_path) in files.iter().enumerate() {
            debug!(file = %file_path.display(), "loading records {}/{}", file_index + 1, files.len());
            all.extend(self.load_file(file_path)?);
            if let Some(limit) = self.limit {
                if all.len() >= limit { all.truncate(limit); break; }
            }
        }
        Ok(all)
    }

    pub fn load_file(&self, file_path: &Path) -> Result<Vec<RawRecord>> {
        let content = fs::read_to_string(file_path)
            .with_context(|| format!("reading {}", file_path.display()))?;
        let is_lines = file_path.extension().and_then(|s| s.to_str()) == Some("jsonl");
        let mut records = Vec::new();
        if is_lines {
            for (n, line) in content.lines().enumerate() {
                let line = line.trim(); if line.is_empty() { continue; }
                let value: Value = serde_json::from_str(line)
                    .with_context(|| format!("{}:{}", file_path.display(), n + 1))?;
                push_objects(value, &mut records, file_path);
            }
        } else {
            let value: Value = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", file_path.display()))?;
            push_objects(value, &mut records, file_path);
        }
        Ok(records)
    }

    fn list_record_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if matches!(path.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) { files.push(path.to_path_buf()); }
        }
        files.sort(); files
    }
}

fn push_objects(value: Value, out: &mut Vec<RawRecord>, file_path: &Path) {
    match value {
        Value::Object(map) => out.push(map),
        Value::Array(items) => for item in items { push_objects(item, out, file_path) },
        other => warn!(file = %file_path.display(), kind = %json_kind(&other), "ignoring non-object record"),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
