//! # UniArch Core
//!
//! Schema-less decoding of UNI measurement archives.
//!
//! UNI archive files hold fixed-period rows of big-endian `f32` fields but do
//! not declare how wide a row is. This crate recovers the row width from the
//! bytes alone and decodes the archive into a timestamped [`Table`]. It has
//! **zero I/O dependencies**: callers hand in byte buffers, and everything
//! here is a pure function of its inputs.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  uniarch-core (pure, no filesystem / network)                │
//! │  ├── bytes/      (big-endian field access, marker constant)  │
//! │  ├── inference/  (row-width strategies)                      │
//! │  ├── decoder/    (rows, timestamps, DecodeOptions)           │
//! │  ├── table/      (Table, Column, ColumnDefinition)           │
//! │  ├── header/     (archive-definition id)                     │
//! │  └── source/     (ArchiveSource / ColumnDefinitionSource)    │
//! └───────────────────────────────────────────────────────────────┘
//!                               ▲
//!                  ┌────────────┴────────────┐
//!                  │  uniarch-cli            │
//!                  │  (files, CSV / JSON)    │
//!                  └─────────────────────────┘
//! ```
//!
//! ## Row-Width Strategies
//!
//! | Strategy             | Signal                                   | Fallback        |
//! |----------------------|------------------------------------------|-----------------|
//! | `marker-periodicity` | spacing of `00 00 00 AD` marker fields   | 47              |
//! | `plausibility`       | first-row frequency/voltage/current ranges | one single row |
//! | `fixed`              | none                                     | configured width |
//!
//! ## Example: Decoding an Archive
//!
//! ```rust
//! use uniarch_core::{parse_table, DecodeOptions, MarkerPeriodicity, MARKER_BYTES};
//!
//! // Prefix marker, then three rows of [marker, service, 230.0, 50.0]
//! let mut data = MARKER_BYTES.to_vec();
//! for _ in 0..3 {
//!     data.extend_from_slice(&MARKER_BYTES);
//!     for v in [0.0f32, 230.0, 50.0] {
//!         data.extend_from_slice(&v.to_be_bytes());
//!     }
//! }
//!
//! let table = parse_table(&data, &MarkerPeriodicity, &DecodeOptions::default(), None).unwrap();
//! assert_eq!(table.row_count(), 3);
//! assert_eq!(table.columns()[0].display_name(), "Value1");
//! assert_eq!(table.rows()[2], vec![230.0, 50.0]);
//! ```
//!
//! ## Example: Selecting a Strategy by Name
//!
//! ```rust
//! use uniarch_core::{create_inference, InferenceStrategy};
//!
//! let strategy = InferenceStrategy::try_from("plausibility").unwrap();
//! let inference = create_inference(strategy);
//! // Seven fields: no candidate width divides them, so the payload is one row
//! assert_eq!(inference.infer(&[0u8; 28]), 7);
//! ```

pub mod bytes;
pub mod decoder;
pub mod error;
pub mod header;
pub mod inference;
pub mod source;
pub mod table;

// Re-export commonly used types
pub use bytes::{MARKER, MARKER_BYTES};
pub use decoder::{decode_rows, parse_table, DecodeOptions};
pub use error::{ArchError, ErrorKind};
pub use header::parse_arch_def_id;
pub use inference::{
    create_inference, FixedWidth, InferenceStrategy, MarkerPeriodicity, PlausibilityScoring,
    RowWidthInference, DEFAULT_ROW_WIDTH,
};
pub use source::{load_table, ArchiveKey, ArchiveSource, ColumnDefinitionSource, NoDefinitions};
pub use table::{Column, ColumnDefinition, Table};
