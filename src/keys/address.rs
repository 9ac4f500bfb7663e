use std::fmt;
use std::str::FromStr;

use k256::ecdsa::VerifyingKey;

use super::keccak256;
use crate::util::{self, Error};
use crate::bail;

/// 160 bit account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; 20]);

impl Address {
    pub const LEN: usize = 20;

    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Last 20 bytes of the keccak256 of the uncompressed public key.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let hash = keccak256(&point.as_bytes()[1..]);
        let mut bytes = [0u8; Self::LEN];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    /// Takes the address from the low 20 bytes of an ABI word.
    pub fn from_word(word: &[u8]) -> Result<Self, Error> {
        if word.len() != 32 || word[..12].iter().any(|b| *b != 0) {
            bail!(Encoding, "not an ABI-encoded address");
        }
        let mut bytes = [0u8; Self::LEN];
        bytes.copy_from_slice(&word[12..]);
        Ok(Self(bytes))
    }

    pub fn to_lower_hex(&self) -> String {
        util::to_hex(&self.0)
    }

    /// EIP-55 mixed-case checksum encoding.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (hash[i / 2] >> (4 * (1 - i % 2))) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = util::from_hex(s)?;
        if bytes.len() != Self::LEN {
            bail!(Encoding, "address must be {} bytes, got {}", Self::LEN, bytes.len());
        }
        let mut out = [0u8; Self::LEN];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}
