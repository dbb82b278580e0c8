//! Field-level access to archive buffers.
//!
//! Every field in a UNI archive is 4 bytes wide and big-endian, regardless of
//! the host platform. Floats are stored as their raw IEEE-754 bit pattern, so
//! reading one is a byte-order swap followed by [`f32::from_bits`].

// =============================================================================
// Format Constants
// =============================================================================

/// Size of one archive field in bytes
pub const FIELD_SIZE: usize = 4;

/// Row/group marker, compared as raw bits
pub const MARKER: u32 = 0x0000_00AD;

/// Marker as it appears on disk
pub const MARKER_BYTES: [u8; FIELD_SIZE] = MARKER.to_be_bytes();

// =============================================================================
// Field Readers
// =============================================================================

/// Read the big-endian `u32` at `field_index`, or `None` past the end.
pub fn read_u32_be(data: &[u8], field_index: usize) -> Option<u32> {
    let start = field_index.checked_mul(FIELD_SIZE)?;
    let end = start.checked_add(FIELD_SIZE)?;
    let bytes: [u8; FIELD_SIZE] = data.get(start..end)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

/// Read the big-endian `f32` at `field_index`, or `None` past the end.
pub fn read_f32_be(data: &[u8], field_index: usize) -> Option<f32> {
    read_u32_be(data, field_index).map(f32::from_bits)
}

/// True when the field at `field_index` carries the marker bit pattern.
pub fn is_marker_at(data: &[u8], field_index: usize) -> bool {
    read_u32_be(data, field_index) == Some(MARKER)
}

/// Number of whole fields in `data`
pub fn field_count(data: &[u8]) -> usize {
    data.len() / FIELD_SIZE
}

/// Iterate the big-endian fields of `data`, dropping any trailing partial field.
pub fn fields_be(data: &[u8]) -> impl Iterator<Item = u32> + '_ {
    data.chunks_exact(FIELD_SIZE)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
}

/// Whether the buffer starts with the optional 4-byte marker prefix
pub fn has_marker_prefix(data: &[u8]) -> bool {
    data.starts_with(&MARKER_BYTES)
}
