//! Binary glTF (GLB) container header validation.
//!
//! Only the fixed 12-byte header and the first chunk header are inspected.
//! That is enough to reject truncated exports and non-GLB files before a
//! viewer is told to reload.

/// `glTF` in little-endian byte order.
pub const GLB_MAGIC: u32 = 0x4654_6C67;

/// The only container version in use.
pub const GLB_VERSION: u32 = 2;

/// `JSON` chunk type in little-endian byte order.
pub const CHUNK_JSON: u32 = 0x4E4F_534A;

/// Size of the file header plus the first chunk header.
pub const MIN_GLB_LEN: usize = 20;

/// Error returned by [`GlbHeader::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GlbError {
    /// Fewer bytes than a header plus one chunk header.
    #[error("file too short for a GLB header: {0} bytes")]
    TooShort(usize),
    /// The first four bytes are not `glTF`.
    #[error("bad GLB magic: {0:#010x}")]
    BadMagic(u32),
    /// A container version other than 2.
    #[error("unsupported GLB version: {0}")]
    UnsupportedVersion(u32),
    /// The header's declared total length disagrees with the data.
    #[error("GLB declares {declared} bytes but {actual} are present")]
    LengthMismatch { declared: u32, actual: usize },
    /// The first chunk is not the JSON chunk.
    #[error("first GLB chunk is not JSON (type {0:#010x})")]
    MissingJsonChunk(u32),
}

/// Parsed GLB header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlbHeader {
    pub version: u32,
    /// Total file length in bytes, as declared.
    pub length: u32,
    /// Length of the JSON chunk payload.
    pub json_length: u32,
}

impl GlbHeader {
    /// Validate the header of a complete GLB file.
    ///
    /// # Errors
    ///
    /// Returns a [`GlbError`] describing the first check that failed.
    pub fn parse(bytes: &[u8]) -> Result<Self, GlbError> {
        if bytes.len() < MIN_GLB_LEN {
            return Err(GlbError::TooShort(bytes.len()));
        }
        let magic = read_u32(bytes, 0);
        if magic != GLB_MAGIC {
            return Err(GlbError::BadMagic(magic));
        }
        let version = read_u32(bytes, 4);
        if version != GLB_VERSION {
            return Err(GlbError::UnsupportedVersion(version));
        }
        let length = read_u32(bytes, 8);
        if usize::try_from(length).map_or(true, |declared| declared != bytes.len()) {
            return Err(GlbError::LengthMismatch { declared: length, actual: bytes.len() });
        }
        let json_length = read_u32(bytes, 12);
        let chunk_type = read_u32(bytes, 16);
        if chunk_type != CHUNK_JSON {
            return Err(GlbError::MissingJsonChunk(chunk_type));
        }
        Ok(Self { version, length, json_length })
    }
}

/// Read a little-endian `u32`. Callers guarantee `offset + 4 <= bytes.len()`.
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut word = [0_u8; 4];
    word.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(word)
}

#[cfg(test)]
#[path = "glb_test.rs"]
mod tests;
