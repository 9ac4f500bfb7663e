//! Return-value encoders handed to scripts, and the fixed-point helpers the
//! scripts share.
//!
//! Integers travel as 32-byte big-endian words, the layout Solidity expects
//! for `uint256`/`int256`. Strings travel as raw UTF-8.

use primitive_types::U256;

use crate::util::Error;
use crate::{bail, error};

pub const WORD_LEN: usize = 32;

/// 10^16, the scale applied to every value these scripts report.
pub fn precision() -> U256 {
    U256::exp10(16)
}

pub fn encode_uint256(value: U256) -> [u8; WORD_LEN] {
    let mut word = [0u8; WORD_LEN];
    value.to_big_endian(&mut word);
    word
}

pub fn encode_int256(value: i128) -> [u8; WORD_LEN] {
    let mut word = if value < 0 {
        [0xffu8; WORD_LEN]
    } else {
        [0u8; WORD_LEN]
    };
    word[WORD_LEN - 16..].copy_from_slice(&value.to_be_bytes());
    word
}

pub fn encode_string(value: &str) -> Vec<u8> {
    value.as_bytes().to_vec()
}

pub fn decode_uint256(bytes: &[u8]) -> Result<U256, Error> {
    if bytes.len() > WORD_LEN {
        bail!(Encoding, "{} bytes do not fit in a uint256", bytes.len());
    }
    Ok(U256::from_big_endian(bytes))
}

/// Decodes a two's complement word into its sign and magnitude.
pub fn decode_int256(bytes: &[u8]) -> Result<(bool, U256), Error> {
    if bytes.len() != WORD_LEN {
        bail!(Encoding, "an int256 is {} bytes, got {}", WORD_LEN, bytes.len());
    }
    let raw = U256::from_big_endian(bytes);
    if bytes[0] & 0x80 == 0 {
        return Ok((false, raw));
    }
    let (magnitude, _) = (!raw).overflowing_add(U256::one());
    Ok((true, magnitude))
}

/// Converts a signed amount in minor units into an unsigned word.
pub fn non_negative(value: i64) -> Result<U256, Error> {
    u64::try_from(value)
        .map(U256::from)
        .map_err(|_| error!(Encoding, "cannot encode negative value {} as uint256", value))
}

/// `value * precision()`, failing instead of wrapping.
pub fn to_fixed_point(value: U256) -> Result<U256, Error> {
    value
        .checked_mul(precision())
        .ok_or_else(|| error!(Encoding, "{} overflows uint256 once scaled", value))
}
