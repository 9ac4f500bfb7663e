//! Just enough of the contract ABI to read the DON public key.

use primitive_types::U256;

use crate::keys::keccak256;
use crate::util::Error;
use crate::bail;

pub const WORD: usize = 32;

pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Right-pads a short ASCII identifier into a `bytes32`.
pub fn bytes32_from_str(s: &str) -> Result<[u8; WORD], Error> {
    if s.len() > WORD {
        bail!(Encoding, "{} does not fit in bytes32", s);
    }
    let mut word = [0u8; WORD];
    word[..s.len()].copy_from_slice(s.as_bytes());
    Ok(word)
}

pub fn call_data(signature: &str, args: &[[u8; WORD]]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len() * WORD);
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(arg);
    }
    data
}

fn word_as_usize(data: &[u8], at: usize) -> Result<usize, Error> {
    let end = at.checked_add(WORD).filter(|end| *end <= data.len());
    let Some(end) = end else {
        bail!(Encoding, "ABI data truncated at offset {}", at);
    };
    let value = U256::from_big_endian(&data[at..end]);
    if value > U256::from(usize::MAX) {
        bail!(Encoding, "ABI offset {} out of range", value);
    }
    Ok(value.as_usize())
}

/// Decodes a single dynamic `bytes` return value.
pub fn decode_bytes(data: &[u8]) -> Result<Vec<u8>, Error> {
    let offset = word_as_usize(data, 0)?;
    let len = word_as_usize(data, offset)?;
    let start = offset + WORD;
    match start.checked_add(len) {
        Some(end) if end <= data.len() => Ok(data[start..end].to_vec()),
        _ => bail!(Encoding, "ABI bytes of length {} run past the data", len),
    }
}
