//! Row decoding.
//!
//! Turns an archive buffer plus a row width into a [`Table`]:
//!
//! ```text
//! [00 00 00 AD]?  row 0: [svc]..[svc][f32 BE]..[f32 BE]  row 1: ...  [partial]
//!  ^ optional      ^ service fields   ^ measurement fields           ^ dropped
//! ```

use chrono::{Duration, NaiveDateTime};
use log::debug;

use crate::bytes::{fields_be, has_marker_prefix, FIELD_SIZE};
use crate::error::ArchError;
use crate::inference::{RowWidthInference, MIN_ROW_WIDTH};
use crate::table::{build_columns, ColumnDefinition, Table};

// =============================================================================
// Constants
// =============================================================================

/// Smallest buffer accepted for decoding
pub const MIN_BUFFER_LEN: usize = 8;

/// Leading bookkeeping fields per row
pub const DEFAULT_SERVICE_FIELDS: usize = 2;

/// One row per minute
pub const DEFAULT_PERIOD_MS: u32 = 60_000;

/// Row cap applied when none is given
pub const DEFAULT_MAX_ROWS: usize = 500;

// =============================================================================
// Options
// =============================================================================

/// Parameters for decoding one archive
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeOptions {
    /// Skip the first 4 bytes when they hold the marker
    pub skip_marker_prefix: bool,
    /// Leading fields per row excluded from the measurements
    pub service_fields: usize,
    /// Timestamp of the first row
    pub start: NaiveDateTime,
    /// Interval between rows in milliseconds
    pub period_ms: u32,
    /// Maximum number of rows to decode
    pub max_rows: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            skip_marker_prefix: true,
            service_fields: DEFAULT_SERVICE_FIELDS,
            start: NaiveDateTime::default(),
            period_ms: DEFAULT_PERIOD_MS,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Byte offset of the first row: 4 when a marker prefix is present and
/// skipping is enabled, 0 otherwise.
pub fn payload_offset(data: &[u8], skip_marker_prefix: bool) -> usize {
    if skip_marker_prefix && has_marker_prefix(data) {
        FIELD_SIZE
    } else {
        0
    }
}

/// Number of rows [`decode_rows`] produces for a buffer and raw row width.
pub fn decoded_row_count(data: &[u8], width: usize, options: &DecodeOptions) -> usize {
    let offset = payload_offset(data, options.skip_marker_prefix);
    match width.checked_mul(FIELD_SIZE) {
        Some(row_bytes) if row_bytes > 0 => {
            ((data.len().saturating_sub(offset)) / row_bytes).min(options.max_rows)
        }
        _ => 0,
    }
}

/// Timestamp of row `row`: `start + row * period_ms`.
pub fn row_timestamp(
    start: NaiveDateTime,
    period_ms: u32,
    row: usize,
) -> Result<NaiveDateTime, ArchError> {
    let overflow = || ArchError::InvalidInput(format!("timestamp of row {} overflows", row));

    let offset_ms = i64::try_from(row)
        .ok()
        .and_then(|r| r.checked_mul(i64::from(period_ms)))
        .ok_or_else(overflow)?;
    let delta = Duration::try_milliseconds(offset_ms).ok_or_else(overflow)?;
    start.checked_add_signed(delta).ok_or_else(overflow)
}

/// Decode rows of a known raw width (service fields included).
///
/// Trailing bytes that do not make up a full row are ignored.
pub fn decode_rows(
    data: &[u8],
    width: usize,
    options: &DecodeOptions,
    definitions: Option<&[ColumnDefinition]>,
) -> Result<Table, ArchError> {
    if data.len() < MIN_BUFFER_LEN {
        return Err(ArchError::TooShort {
            expected: MIN_BUFFER_LEN,
            actual: data.len(),
        });
    }
    if width < MIN_ROW_WIDTH {
        return Err(ArchError::InvalidInput(format!(
            "row width {} is below the minimum of {}",
            width, MIN_ROW_WIDTH
        )));
    }
    if options.service_fields >= width {
        return Err(ArchError::InvalidInput(format!(
            "{} service fields leave no measurements in a row of {}",
            options.service_fields, width
        )));
    }

    let offset = payload_offset(data, options.skip_marker_prefix);
    let payload = &data[offset..];
    let row_bytes = width
        .checked_mul(FIELD_SIZE)
        .ok_or_else(|| ArchError::InvalidInput(format!("row width {} is too large", width)))?;
    if payload.len() < row_bytes {
        return Err(ArchError::TooShort {
            expected: offset + row_bytes,
            actual: data.len(),
        });
    }

    let row_count = (payload.len() / row_bytes).min(options.max_rows);
    let service_bytes = options.service_fields * FIELD_SIZE;

    let mut timestamps = Vec::with_capacity(row_count);
    let mut rows = Vec::with_capacity(row_count);
    for (r, row) in payload.chunks_exact(row_bytes).take(row_count).enumerate() {
        rows.push(
            fields_be(&row[service_bytes..])
                .map(f32::from_bits)
                .collect::<Vec<f32>>(),
        );
        timestamps.push(row_timestamp(options.start, options.period_ms, r)?);
    }

    debug!(
        "Decoded {} rows of {} fields ({} service) from {} bytes at offset {}",
        row_count,
        width,
        options.service_fields,
        data.len(),
        offset
    );

    let columns = build_columns(width - options.service_fields, definitions);
    Table::new(timestamps, columns, rows)
}

/// Infer the row width with `inference`, then decode.
pub fn parse_table(
    data: &[u8],
    inference: &dyn RowWidthInference,
    options: &DecodeOptions,
    definitions: Option<&[ColumnDefinition]>,
) -> Result<Table, ArchError> {
    if data.len() < MIN_BUFFER_LEN {
        return Err(ArchError::TooShort {
            expected: MIN_BUFFER_LEN,
            actual: data.len(),
        });
    }

    let offset = payload_offset(data, options.skip_marker_prefix);
    let width = inference.infer(&data[offset..]);
    debug!("{} inference: {} fields per row", inference.strategy(), width);

    decode_rows(data, width, options, definitions)
}
