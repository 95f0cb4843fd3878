//! Fixed binary layout of the ledger account that holds the batch records.
//!
//! The account data is `header || record_count (u32 LE) || records || bitmap`.
//! Each record is a fixed-size slot; writes land at computed offsets and the
//! verifier reads them back the same way.

use thiserror::Error;

/// Capacity of a record's name buffer.
pub const MAX_NAME_LEN: usize = 32;
/// Capacity of a record's uri buffer.
pub const MAX_URI_LEN: usize = 200;

/// `[4-byte name len][32-byte name buf][4-byte uri len][200-byte uri buf]`
pub const RECORD_SIZE: usize = 4 + MAX_NAME_LEN + 4 + MAX_URI_LEN;

/// Scalar and vector fields preceding the record array:
///
/// - authority address        32
/// - registration id          4 + 6
/// - symbol                   4 + 10
/// - seller fee basis points  2
/// - is_mutable               1
/// - retain_authority         1
/// - max supply               8
/// - item capacity            4
/// - creators vec             4 + 4 * (32 + 1 + 1)
pub const HEADER_SIZE: usize = 32 + (4 + 6) + (4 + 10) + 2 + 1 + 1 + 8 + 4 + (4 + 4 * 34);

/// Characters of the account address used as the registration id.
pub const REGISTRATION_ID_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("record {index} is out of bounds for account of {len} bytes")]
    OutOfBounds { index: usize, len: usize },

    #[error("record {index} holds invalid utf-8")]
    InvalidUtf8 { index: usize },

    #[error("{field} exceeds its buffer ({len} > {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

/// Decoded name/uri pair of one record slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFields {
    pub name: String,
    pub uri: String,
}

/// Total account size for a collection of `item_capacity` records:
/// header, record count, record array, one presence bit per item.
pub fn account_size(item_capacity: usize) -> usize {
    HEADER_SIZE + 4 + item_capacity * RECORD_SIZE + item_capacity / 8 + 1
}

/// Byte offset of record `index` inside the account data.
pub fn record_offset(index: usize) -> usize {
    HEADER_SIZE + 4 + index * RECORD_SIZE
}

/// Decode the record at `index`, trimming trailing zero padding from the
/// fixed-width buffers.
pub fn decode_record(data: &[u8], index: usize) -> Result<RecordFields, LayoutError> {
    let off = record_offset(index);
    if off + RECORD_SIZE > data.len() {
        return Err(LayoutError::OutOfBounds {
            index,
            len: data.len(),
        });
    }

    let name_buf = &data[off + 4..off + 4 + MAX_NAME_LEN];
    let uri_buf = &data[off + 4 + MAX_NAME_LEN + 4..off + RECORD_SIZE];

    let trim = |buf: &[u8]| -> Result<String, LayoutError> {
        let end = buf
            .iter()
            .rposition(|&b| b != 0)
            .map(|p| p + 1)
            .unwrap_or(0);
        std::str::from_utf8(&buf[..end])
            .map(|s| s.to_string())
            .map_err(|_| LayoutError::InvalidUtf8 { index })
    };

    Ok(RecordFields {
        name: trim(name_buf)?,
        uri: trim(uri_buf)?,
    })
}

/// Encode a record into its slot, zero-padding the fixed-width buffers.
pub fn encode_record(
    data: &mut [u8],
    index: usize,
    name: &str,
    uri: &str,
) -> Result<(), LayoutError> {
    if name.len() > MAX_NAME_LEN {
        return Err(LayoutError::FieldTooLong {
            field: "name",
            len: name.len(),
            max: MAX_NAME_LEN,
        });
    }
    if uri.len() > MAX_URI_LEN {
        return Err(LayoutError::FieldTooLong {
            field: "uri",
            len: uri.len(),
            max: MAX_URI_LEN,
        });
    }

    let off = record_offset(index);
    if off + RECORD_SIZE > data.len() {
        return Err(LayoutError::OutOfBounds {
            index,
            len: data.len(),
        });
    }

    data[off..off + 4].copy_from_slice(&(name.len() as u32).to_le_bytes());
    data[off + 4..off + 4 + name.len()].copy_from_slice(name.as_bytes());
    data[off + 4 + name.len()..off + 4 + MAX_NAME_LEN].fill(0);

    let uri_off = off + 4 + MAX_NAME_LEN;
    data[uri_off..uri_off + 4].copy_from_slice(&(uri.len() as u32).to_le_bytes());
    data[uri_off + 4..uri_off + 4 + uri.len()].copy_from_slice(uri.as_bytes());
    data[uri_off + 4 + uri.len()..off + RECORD_SIZE].fill(0);

    Ok(())
}

/// Read the record count stored right after the header.
pub fn record_count(data: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    if data.len() >= HEADER_SIZE + 4 {
        buf.copy_from_slice(&data[HEADER_SIZE..HEADER_SIZE + 4]);
    }
    u32::from_le_bytes(buf)
}

/// Store the record count.
pub fn set_record_count(data: &mut [u8], count: u32) {
    if data.len() >= HEADER_SIZE + 4 {
        data[HEADER_SIZE..HEADER_SIZE + 4].copy_from_slice(&count.to_le_bytes());
    }
}

/// Set the presence bit for `index` in the bitmap trailing the record array.
pub fn set_presence(data: &mut [u8], item_capacity: usize, index: usize) {
    let base = HEADER_SIZE + 4 + item_capacity * RECORD_SIZE;
    let byte = base + index / 8;
    if byte < data.len() {
        data[byte] |= 1 << (index % 8);
    }
}

/// Check the presence bit for `index`.
pub fn presence(data: &[u8], item_capacity: usize, index: usize) -> bool {
    let base = HEADER_SIZE + 4 + item_capacity * RECORD_SIZE;
    let byte = base + index / 8;
    byte < data.len() && data[byte] & (1 << (index % 8)) != 0
}
