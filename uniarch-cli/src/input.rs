//! File-backed inputs: archive bytes, header blob and column definitions.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{debug, warn};
use serde::Deserialize;
use uniarch_core::header::format_arch_def_id;
use uniarch_core::source::parse_entry_timestamp;
use uniarch_core::{ArchError, ArchiveKey, ArchiveSource, ColumnDefinition, ColumnDefinitionSource};

fn io_to_arch(path: &Path, e: io::Error) -> ArchError {
    match e.kind() {
        io::ErrorKind::NotFound => ArchError::NotFound(path.display().to_string()),
        _ => ArchError::InvalidInput(format!("{}: {}", path.display(), e)),
    }
}

// =============================================================================
// Archive Files
// =============================================================================

/// An archive and its optional header, read straight from disk.
///
/// Record and archive ids in keys are ignored: there is exactly one archive.
#[derive(Debug, Clone)]
pub struct FileArchive {
    archive: PathBuf,
    header: Option<PathBuf>,
}

impl FileArchive {
    pub fn new(archive: impl Into<PathBuf>, header: Option<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            header,
        }
    }

    pub fn path(&self) -> &Path {
        &self.archive
    }

    /// Key for this archive. Record and archive ids come from the two parent
    /// directories when the file sits in a `UNI/<record>/<archive>/` layout,
    /// and are 0 otherwise.
    pub fn key(&self, timestamp: NaiveDateTime) -> ArchiveKey {
        let mut dirs = self
            .archive
            .parent()
            .into_iter()
            .flat_map(|p| p.components().rev())
            .map(|c| c.as_os_str().to_str().unwrap_or_default());
        let archive_id = dirs.next().and_then(|s| s.parse::<u8>().ok());
        let record_id = dirs.next().and_then(|s| s.parse::<u32>().ok());
        match (record_id, archive_id) {
            (Some(record_id), Some(archive_id)) => {
                ArchiveKey::new(record_id, archive_id, timestamp)
            }
            _ => ArchiveKey::new(0, 0, timestamp),
        }
    }

    pub fn read(&self) -> Result<Vec<u8>, ArchError> {
        let data = fs::read(&self.archive).map_err(|e| io_to_arch(&self.archive, e))?;
        debug!("Read {} bytes from {}", data.len(), self.archive.display());
        Ok(data)
    }
}

impl ArchiveSource for FileArchive {
    fn read_archive(&self, _key: &ArchiveKey) -> Result<Vec<u8>, ArchError> {
        self.read()
    }

    fn read_header(&self, _record_id: u32, _archive_id: u8) -> Result<Vec<u8>, ArchError> {
        match &self.header {
            Some(path) => fs::read(path).map_err(|e| io_to_arch(path, e)),
            None => Err(ArchError::NotFound("no header file given".to_string())),
        }
    }
}

/// Start time encoded in an archive file name, if it follows the entry layout.
pub fn start_from_path(path: &Path) -> Option<NaiveDateTime> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(parse_entry_timestamp)
}

/// Explicit start, else the file name, else the Unix epoch.
pub fn resolve_start(explicit: Option<NaiveDateTime>, path: &Path) -> NaiveDateTime {
    if let Some(start) = explicit {
        return start;
    }
    match start_from_path(path) {
        Some(start) => {
            debug!("Start time {} taken from file name", start);
            start
        }
        None => {
            warn!(
                "No start time given and {} does not encode one, using the Unix epoch",
                path.display()
            );
            NaiveDateTime::default()
        }
    }
}

// =============================================================================
// Column Definitions
// =============================================================================

/// Contents of a `--columns` file
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColumnFile {
    /// Definitions that apply to any archive
    List(Vec<ColumnDefinition>),
    /// Definitions keyed by archive-definition id (8 hex digits)
    ById(HashMap<String, Vec<ColumnDefinition>>),
}

impl ColumnFile {
    pub fn load(path: &Path) -> Result<Self, ArchError> {
        let text = fs::read_to_string(path).map_err(|e| io_to_arch(path, e))?;
        Self::from_json(&text).map_err(|e| {
            ArchError::InvalidInput(format!("{}: {}", path.display(), e))
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let file: ColumnFile = serde_json::from_str(text)?;
        Ok(match file {
            ColumnFile::ById(map) => ColumnFile::ById(
                map.into_iter()
                    .map(|(id, defs)| (id.trim().to_ascii_uppercase(), defs))
                    .collect(),
            ),
            list => list,
        })
    }
}

impl ColumnDefinitionSource for ColumnFile {
    fn column_definitions(&self, arch_def_id: u32) -> Result<Vec<ColumnDefinition>, ArchError> {
        match self {
            ColumnFile::List(defs) => Ok(defs.clone()),
            ColumnFile::ById(map) => {
                let key = format_arch_def_id(arch_def_id);
                map.get(&key)
                    .cloned()
                    .ok_or_else(|| ArchError::NotFound(format!("archive definition {}", key)))
            }
        }
    }
}
