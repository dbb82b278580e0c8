//! Archive header parsing.
//!
//! Each archive sub-stream ships a `header.bin` next to its data files. The
//! only field the decoder needs is the archive-definition id, which selects
//! the document describing column names and units.

use serde::Deserialize;

use crate::error::ArchError;

/// Fixed leading part of `header.bin`
#[derive(Deserialize, Debug, Copy, Clone)]
#[repr(C, packed)]
pub struct UniHeader {
    /// Fields not interpreted by the decoder
    _reserved: [u8; 20],
    /// Archive-definition id, little-endian
    pub arch_def_id: [u8; 4],
}

/// Minimum header size in bytes
pub const UNI_HEADER_SIZE: usize = std::mem::size_of::<UniHeader>();

/// Read the archive-definition id from a header blob.
pub fn parse_arch_def_id(data: &[u8]) -> Result<u32, ArchError> {
    if data.len() < UNI_HEADER_SIZE {
        return Err(ArchError::TooShort {
            expected: UNI_HEADER_SIZE,
            actual: data.len(),
        });
    }

    let header: UniHeader = bincode::deserialize(&data[..UNI_HEADER_SIZE])?;
    Ok(u32::from_le_bytes(header.arch_def_id))
}

/// Id as it appears in archive-definition document names, e.g. `0000BEEF`
pub fn format_arch_def_id(id: u32) -> String {
    format!("{:08X}", id)
}
