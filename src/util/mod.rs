mod error;

pub use error::{Error, ErrorKind};

/// Hex encodes `bytes` with a `0x` prefix, lowercase.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decodes a hex string with or without a `0x` prefix.
pub fn from_hex(s: &str) -> Result<Vec<u8>, Error> {
    let digits = strip_hex_prefix(s);
    if digits.len() % 2 != 0 {
        return Err(crate::error!(Encoding, "odd number of hex digits in {}", s));
    }
    Ok(hex::decode(digits)?)
}

pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

pub fn unix_time_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
