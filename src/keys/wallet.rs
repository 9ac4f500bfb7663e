use k256::ecdsa::{SigningKey, VerifyingKey};

use super::{keccak256, Address, PrivateKey};
use crate::util::Error;

/// The signing identity used to authenticate requests to the oracle network.
pub struct Wallet {
    signing_key: SigningKey,
    address: Address,
}

impl Wallet {
    pub fn new(private: &PrivateKey) -> Result<Self, Error> {
        let signing_key = private.to_signing_key()?;
        let address = Address::from_verifying_key(signing_key.verifying_key());
        Ok(Self {
            signing_key,
            address,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Signs a 32 byte digest, returning `r || s || v` with `v` in {27, 28}.
    pub fn sign_hash(&self, hash: &[u8; 32]) -> Result<[u8; 65], Error> {
        let (signature, recovery_id) = self.signing_key.sign_prehash_recoverable(hash)?;
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = 27 + recovery_id.to_byte();
        Ok(out)
    }

    /// EIP-191 personal message signature.
    pub fn sign_message(&self, message: &[u8]) -> Result<[u8; 65], Error> {
        self.sign_hash(&hash_message(message))
    }
}

pub fn hash_message(message: &[u8]) -> [u8; 32] {
    let mut prefixed = format!("\x19Ethereum Signed Message:\n{}", message.len()).into_bytes();
    prefixed.extend_from_slice(message);
    keccak256(&prefixed)
}
