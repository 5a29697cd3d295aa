//! Chunk requests and their form-field encoding.
//!
//! Two generations of clients are in the wild. Older uploaders send
//! `filepath_b64`, `data_b64` and `checksum_sha1`; newer ones send
//! `filepath`, `data` and `checksum`. Both send `offset` and `size`.
//! Decoding accepts the superset. When both spellings of a field are present
//! the newer name wins.

use std::collections::HashMap;
use std::path::PathBuf;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use bytes::Bytes;

use crate::error::ChunkError;

/// Form field names.
pub mod field {
    pub const FUNCTION: &str = "function";
    pub const FILEPATH: &str = "filepath";
    pub const FILEPATH_B64: &str = "filepath_b64";
    pub const OFFSET: &str = "offset";
    pub const DATA: &str = "data";
    pub const DATA_B64: &str = "data_b64";
    pub const CHECKSUM: &str = "checksum";
    pub const CHECKSUM_SHA1: &str = "checksum_sha1";
    pub const SIZE: &str = "size";
}

/// Values of the `function` field.
pub mod function {
    pub const UPLOAD: &str = "upload";
    pub const SET_UPLOAD_MODE: &str = "set_upload_mode";
    pub const SET_DEFAULT_MODE: &str = "set_default_mode";
}

/// Standard alphabet, padding optional on decode.
const LENIENT_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// One chunk write, decoded from a single inbound call and discarded after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRequest {
    /// Destination of the assembled file. Relative paths resolve against the
    /// storage root.
    pub path: PathBuf,
    /// `0` starts a new file, anything else writes at that byte position.
    /// Kept signed so a negative value fails at the seek, not at decode.
    pub offset: i64,
    pub payload: Bytes,
    /// Byte count the caller asserts will be written. Never derived from
    /// `payload`.
    pub declared_size: i64,
    /// Lowercase hex SHA-1 of `payload`.
    pub checksum: String,
}

impl ChunkRequest {
    /// Decode a request from urlencoded form fields.
    ///
    /// Missing fields decode as empty values.
    pub fn from_form(fields: &HashMap<String, String>) -> Result<Self, ChunkError> {
        let get = |name: &str| fields.get(name).map(String::as_str);

        let path = match (get(field::FILEPATH), get(field::FILEPATH_B64)) {
            (Some(plain), _) => PathBuf::from(plain),
            (None, Some(encoded)) => path_from_bytes(decode_b64(encoded, field::FILEPATH_B64)?),
            (None, None) => PathBuf::new(),
        };

        let payload = match (get(field::DATA), get(field::DATA_B64)) {
            (Some(encoded), _) => decode_b64(encoded, field::DATA)?,
            (None, Some(encoded)) => decode_b64(encoded, field::DATA_B64)?,
            (None, None) => Vec::new(),
        };

        let checksum = get(field::CHECKSUM)
            .or_else(|| get(field::CHECKSUM_SHA1))
            .unwrap_or("")
            .to_string();

        Ok(Self {
            path,
            offset: lenient_int(get(field::OFFSET).unwrap_or("")),
            payload: Bytes::from(payload),
            declared_size: lenient_int(get(field::SIZE).unwrap_or("")),
            checksum,
        })
    }

    /// Encode as the form fields the older uploaders send.
    pub fn to_form(&self) -> Vec<(&'static str, String)> {
        vec![
            (field::FUNCTION, function::UPLOAD.to_string()),
            (field::FILEPATH_B64, encode_b64(path_to_bytes(&self.path))),
            (field::CHECKSUM_SHA1, self.checksum.clone()),
            (field::SIZE, self.declared_size.to_string()),
            (field::OFFSET, self.offset.to_string()),
            (field::DATA_B64, encode_b64(&self.payload)),
        ]
    }
}

/// Parse an integer the way a loosely typed form field is coerced: leading
/// whitespace, an optional sign, then as many digits as are present. Anything
/// unparsable is `0`; out-of-range values saturate.
pub fn lenient_int(raw: &str) -> i64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        value = match value.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(d)
            } else {
                v.checked_add(d)
            }
        }) {
            Some(v) => v,
            None => return if negative { i64::MIN } else { i64::MAX },
        };
    }
    value
}

/// Decode a base64 form value.
///
/// Urlencoded bodies turn a literal `+` into a space when the client forgot to
/// escape it, so spaces are mapped back. Line breaks are ignored.
pub fn decode_b64(encoded: &str, name: &'static str) -> Result<Vec<u8>, ChunkError> {
    let cleaned: String = encoded
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .map(|c| if c == ' ' { '+' } else { c })
        .collect();
    LENIENT_B64.decode(cleaned).map_err(|e| {
        tracing::debug!(field = name, error = %e, "base64 decode failed");
        ChunkError::Decode(name)
    })
}

pub fn encode_b64(data: impl AsRef<[u8]>) -> String {
    base64::engine::general_purpose::STANDARD.encode(data)
}

#[cfg(unix)]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(std::ffi::OsString::from_vec(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: Vec<u8>) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(unix)]
fn path_to_bytes(path: &std::path::Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_to_bytes(path: &std::path::Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}
