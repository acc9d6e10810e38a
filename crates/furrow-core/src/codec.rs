//! Byte-exact record encoding.
//!
//! Every record that crosses the host boundary (method arguments and
//! persisted state) uses bincode with fixed-width little-endian integers and
//! no length prefixes on arrays. Field order is declaration order, with no
//! padding, so a record's size is the sum of its field widths.

use bincode::config::{Configuration, Fixint, LittleEndian};
use bincode::{Decode, Encode};

use crate::error::RecordError;

/// The bincode configuration for all fixed-layout records.
pub fn record_config() -> Configuration<LittleEndian, Fixint> {
    bincode::config::standard()
        .with_little_endian()
        .with_fixed_int_encoding()
}

/// Encode a record into its fixed-layout bytes.
pub fn encode_record<T: Encode>(value: &T) -> Result<Vec<u8>, RecordError> {
    bincode::encode_to_vec(value, record_config()).map_err(|e| RecordError::Encode(e.to_string()))
}

/// Decode a record that must occupy exactly `expected` bytes.
///
/// The length is checked up front so truncated and oversized inputs are
/// reported the same way, with the record `kind` in the message.
pub fn decode_record<T: Decode<()>>(
    bytes: &[u8],
    kind: &'static str,
    expected: usize,
) -> Result<T, RecordError> {
    if bytes.len() != expected {
        return Err(RecordError::InvalidLength {
            kind,
            expected,
            got: bytes.len(),
        });
    }
    let (value, used) = bincode::decode_from_slice(bytes, record_config())
        .map_err(|e| RecordError::Decode(e.to_string()))?;
    if used != expected {
        return Err(RecordError::InvalidLength {
            kind,
            expected,
            got: used,
        });
    }
    Ok(value)
}
