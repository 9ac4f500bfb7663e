use std::fmt;
use std::str::FromStr;

use k256::ecdsa::SigningKey;

use crate::util::Error;
use crate::{bail, error};

/// Number of hex digits after the `0x` prefix.
pub const HEX_LEN: usize = 64;

/// Accepts exactly `0x` followed by 64 hex digits, either case.
pub fn is_valid_private_key(s: &str) -> bool {
    match s.strip_prefix("0x") {
        Some(digits) => digits.len() == HEX_LEN && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// 256 bit secp256k1 private key. Never printed.
#[derive(Clone)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    pub const LEN: usize = 32;

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn to_signing_key(&self) -> Result<SigningKey, Error> {
        SigningKey::from_slice(&self.0)
            .map_err(|_| error!(Input, "private key is not a valid secp256k1 scalar"))
    }
}

impl FromStr for PrivateKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_valid_private_key(s) {
            bail!(Input, "private key must be 0x followed by {} hex characters", HEX_LEN);
        }
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(&s[2..], &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.0 = [0u8; Self::LEN];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::ErrorKind;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn validation() {
        assert!(is_valid_private_key(KEY));
        assert!(is_valid_private_key(&KEY.to_uppercase().replacen("0X", "0x", 1)));
        assert!(!is_valid_private_key(&KEY[2..]));
        assert!(!is_valid_private_key(&format!("{}0", KEY)));
        assert!(!is_valid_private_key(&KEY[..KEY.len() - 1]));
        assert!(!is_valid_private_key(&KEY.replacen("0x", "0X", 1)));
        assert!(!is_valid_private_key(&KEY.replace('a', "g")));
        assert!(!is_valid_private_key(&format!(" {}", KEY)));
        assert!(!is_valid_private_key(""));
    }

    #[test]
    fn parse_rejects_before_decoding() {
        let err = "0x1234".parse::<PrivateKey>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn zero_key_is_not_a_signing_key() {
        let zero = format!("0x{}", "0".repeat(64));
        let key: PrivateKey = zero.parse().unwrap();
        assert_eq!(key.to_signing_key().unwrap_err().kind(), ErrorKind::Input);
    }

    #[test]
    fn debug_is_redacted() {
        let key: PrivateKey = KEY.parse().unwrap();
        assert_eq!(format!("{:?}", key), "PrivateKey(<redacted>)");
    }
}
