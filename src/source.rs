//! SDE input discovery and JSON Lines reading
//!
//! The export archive unpacks either flat or into a single nested folder,
//! so `*.jsonl` files are collected up to two levels below the given path.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{ConvertError, Result};

/// Index of the JSON Lines files available in one SDE export
#[derive(Debug, Clone)]
pub struct SdeSource {
    root: PathBuf,
    files: BTreeMap<String, PathBuf>,
}

impl SdeSource {
    /// Scan `root` for `*.jsonl` files. The shallowest file wins when the
    /// same name appears at several depths.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ConvertError::SdeNotFound(root));
        }

        let mut files = BTreeMap::new();
        for entry in WalkDir::new(&root)
            .max_depth(2)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| {
                e.map_err(|err| warn!("Skipping unreadable entry under {}: {}", root.display(), err))
                    .ok()
            })
        {
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "jsonl") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let depth = entry.depth();
            match files.get(name) {
                Some((existing, _)) if *existing <= depth => {}
                _ => {
                    files.insert(name.to_string(), (depth, path.to_path_buf()));
                }
            }
        }

        let files: BTreeMap<String, PathBuf> =
            files.into_iter().map(|(name, (_, path))| (name, path)).collect();
        debug!("Found {} JSONL files under {}", files.len(), root.display());

        Ok(Self { root, files })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, file: &str) -> bool {
        self.files.contains_key(file)
    }

    /// File names present in the export, sorted
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    fn path_of(&self, file: &str) -> Result<&Path> {
        self.files
            .get(file)
            .map(PathBuf::as_path)
            .ok_or_else(|| ConvertError::MissingInputFile {
                file: file.to_string(),
                dir: self.root.clone(),
            })
    }

    /// Read every record of `file`. Blank lines are ignored; any other line
    /// that does not parse fails the whole read.
    pub fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.path_of(file)?;
        let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;

        let mut records = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).map_err(|source| {
                ConvertError::MalformedRecord {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    source,
                }
            })?;
            records.push(record);
        }

        debug!("Read {} records from {}", records.len(), path.display());
        Ok(records)
    }
}
