//! On-disk snapshot format for the URL registry.
//!
//! A snapshot is a fixed header followed by a bincode payload:
//!
//! ```text
//! +----------+----------------+---------------------------------+
//! | URLSNAP1 | version: u32le | bincode(HashMap<String,String>) |
//! +----------+----------------+---------------------------------+
//! ```

use std::{collections::HashMap, mem::size_of};

use thiserror::Error;

/// Magic bytes identifying a registry snapshot.
pub const MAGIC: &[u8; 8] = b"URLSNAP1";

/// Payload schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Total header size in bytes (magic + version).
pub const HEADER_SIZE: usize = MAGIC.len() + size_of::<u32>();

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("file too short to contain a snapshot header ({0} bytes)")]
    Truncated(usize),

    #[error("missing snapshot magic bytes")]
    BadMagic,

    #[error("unsupported snapshot version {0} (expected {})", SCHEMA_VERSION)]
    UnsupportedVersion(u32),

    #[error("payload decoding failed: {0}")]
    Payload(#[from] bincode::Error),
}

/// Encode a mapping into snapshot bytes.
pub fn encode(urls: &HashMap<String, String>) -> Result<Vec<u8>, SnapshotError> {
    let payload = bincode::serialize(urls)?;
    let mut out = Vec::with_capacity(HEADER_SIZE + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&SCHEMA_VERSION.to_le_bytes());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode snapshot bytes back into a mapping.
pub fn decode(data: &[u8]) -> Result<HashMap<String, String>, SnapshotError> {
    if data.len() < HEADER_SIZE {
        return Err(SnapshotError::Truncated(data.len()));
    }
    if &data[..MAGIC.len()] != MAGIC {
        return Err(SnapshotError::BadMagic);
    }

    let mut version = [0u8; 4];
    version.copy_from_slice(&data[MAGIC.len()..HEADER_SIZE]);
    let version = u32::from_le_bytes(version);
    if version != SCHEMA_VERSION {
        return Err(SnapshotError::UnsupportedVersion(version));
    }

    Ok(bincode::deserialize(&data[HEADER_SIZE..])?)
}
