//! Blob Codec
//!
//! Every value stored in a named map is an opaque bincode blob. Encoding is
//! fixed-width little endian and decoding rejects trailing bytes, so a record
//! read back as the wrong type fails instead of silently yielding garbage.

use crate::error::StorageError;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Serialize a value stored under `key`.
pub fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Vec<u8>, StorageError> {
    options()
        .serialize(value)
        .map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })
}

/// Deserialize the record stored under `key` in `map`.
///
/// A failure is reported as [`StorageError::CorruptRecord`], which callers may
/// match on to recover from a single unreadable record.
pub fn decode<T: DeserializeOwned>(map: &str, key: &str, bytes: &[u8]) -> Result<T, StorageError> {
    options()
        .deserialize(bytes)
        .map_err(|source| StorageError::CorruptRecord {
            map: map.to_string(),
            key: key.to_string(),
            source,
        })
}
