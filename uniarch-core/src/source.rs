//! Boundaries to the archive store and the column-definition resolver.
//!
//! Locating archive entries inside a packed store and parsing definition
//! documents happen outside this crate. Callers plug those in through
//! [`ArchiveSource`] and [`ColumnDefinitionSource`]; [`load_table`] ties them
//! to the decoder.
//!
//! Only a missing *archive* is an error. When the header or the column
//! definitions cannot be resolved the table is still decoded, with default
//! column names.

use chrono::NaiveDateTime;
use log::{debug, warn};

use crate::decoder::{parse_table, DecodeOptions};
use crate::error::ArchError;
use crate::header::{format_arch_def_id, parse_arch_def_id};
use crate::inference::RowWidthInference;
use crate::table::{ColumnDefinition, Table};

/// Timestamp layout of archive entry names, e.g. `2024-01-01-00-00-00-000`
pub const ENTRY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S-%3f";

/// File extension of archive entries
pub const ENTRY_EXTENSION: &str = "arch";

// =============================================================================
// Archive Keys
// =============================================================================

/// Identifies one archive file in a store
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveKey {
    /// Recorder id
    pub record_id: u32,
    /// Sub-stream id within the recorder
    pub archive_id: u8,
    /// Time of the first row, encoded in the entry name
    pub timestamp: NaiveDateTime,
}

impl ArchiveKey {
    pub fn new(record_id: u32, archive_id: u8, timestamp: NaiveDateTime) -> Self {
        Self {
            record_id,
            archive_id,
            timestamp,
        }
    }

    /// Entry file name, e.g. `2024-01-01-00-00-00-000.arch`
    pub fn entry_name(&self) -> String {
        format!(
            "{}.{}",
            self.timestamp.format(ENTRY_TIMESTAMP_FORMAT),
            ENTRY_EXTENSION
        )
    }
}

impl std::fmt::Display for ArchiveKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "UNI/{}/{}/{}",
            self.record_id,
            self.archive_id,
            self.entry_name()
        )
    }
}

/// Parse the timestamp out of an entry name, with or without extension.
pub fn parse_entry_timestamp(name: &str) -> Option<NaiveDateTime> {
    let stem = name
        .strip_suffix(ENTRY_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .unwrap_or(name);
    NaiveDateTime::parse_from_str(stem, ENTRY_TIMESTAMP_FORMAT).ok()
}

// =============================================================================
// Collaborator Traits
// =============================================================================

/// Supplies raw archive and header bytes.
pub trait ArchiveSource {
    /// Full contents of one archive file, or [`ArchError::NotFound`].
    fn read_archive(&self, key: &ArchiveKey) -> Result<Vec<u8>, ArchError>;

    /// Contents of the sub-stream's `header.bin`, or [`ArchError::NotFound`].
    fn read_header(&self, record_id: u32, archive_id: u8) -> Result<Vec<u8>, ArchError>;
}

/// Resolves column names and units for an archive-definition id.
pub trait ColumnDefinitionSource {
    fn column_definitions(&self, arch_def_id: u32) -> Result<Vec<ColumnDefinition>, ArchError>;
}

/// A definition source that never has anything; every table gets default
/// column names.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDefinitions;

impl ColumnDefinitionSource for NoDefinitions {
    fn column_definitions(&self, arch_def_id: u32) -> Result<Vec<ColumnDefinition>, ArchError> {
        Err(ArchError::NotFound(format!(
            "archive definition {}",
            format_arch_def_id(arch_def_id)
        )))
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Resolve column definitions for a sub-stream, or `None` when any step fails.
pub fn resolve_definitions(
    archives: &dyn ArchiveSource,
    definitions: &dyn ColumnDefinitionSource,
    record_id: u32,
    archive_id: u8,
) -> Option<Vec<ColumnDefinition>> {
    let header = archives
        .read_header(record_id, archive_id)
        .map_err(|e| warn!("No header for UNI/{}/{}: {}", record_id, archive_id, e))
        .ok()?;
    let arch_def_id = parse_arch_def_id(&header)
        .map_err(|e| warn!("Unreadable header for UNI/{}/{}: {}", record_id, archive_id, e))
        .ok()?;
    let defs = definitions
        .column_definitions(arch_def_id)
        .map_err(|e| {
            warn!(
                "No column definitions for {}: {}",
                format_arch_def_id(arch_def_id),
                e
            )
        })
        .ok()?;

    debug!(
        "Archive definition {} has {} columns",
        format_arch_def_id(arch_def_id),
        defs.len()
    );
    (!defs.is_empty()).then_some(defs)
}

/// Fetch, infer and decode one archive.
///
/// The key's timestamp overrides `options.start`.
pub fn load_table(
    archives: &dyn ArchiveSource,
    definitions: &dyn ColumnDefinitionSource,
    key: &ArchiveKey,
    inference: &dyn RowWidthInference,
    options: &DecodeOptions,
) -> Result<Table, ArchError> {
    let data = archives.read_archive(key)?;
    let defs = resolve_definitions(archives, definitions, key.record_id, key.archive_id);

    let options = DecodeOptions {
        start: key.timestamp,
        ..options.clone()
    };
    parse_table(&data, inference, &options, defs.as_deref())
}
