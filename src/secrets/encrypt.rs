//! Encrypts a credential set so that only the oracle network can read it.
//!
//! Layout of the output: the sender's ephemeral secp256k1 public key
//! (65 bytes, uncompressed), a 12 byte AES-GCM nonce, then the ciphertext.
//! The AES-256 key is the SHA-256 of the ECDH shared secret between the
//! ephemeral key and the DON public key.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use k256::ecdh::EphemeralSecret;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::functions::Secrets;
use crate::util::Error;
use crate::{bail, error};

const EPHEMERAL_LEN: usize = 65;
const NONCE_LEN: usize = 12;

/// Accepts the 64 byte `x || y` form the coordinator stores, or any SEC1
/// encoding.
pub fn don_public_key(bytes: &[u8]) -> Result<PublicKey, Error> {
    if bytes.len() == 64 {
        let mut sec1 = Vec::with_capacity(EPHEMERAL_LEN);
        sec1.push(0x04);
        sec1.extend_from_slice(bytes);
        return Ok(PublicKey::from_sec1_bytes(&sec1)?);
    }
    Ok(PublicKey::from_sec1_bytes(bytes)?)
}

fn cipher(shared_secret: &[u8]) -> Result<Aes256Gcm, Error> {
    let key = Sha256::digest(shared_secret);
    Aes256Gcm::new_from_slice(&key).map_err(|e| error!(Crypto, "failed to create cipher: {}", e))
}

pub fn encrypt_secrets(secrets: &Secrets, don_key: &PublicKey) -> Result<Vec<u8>, Error> {
    let plaintext = serde_json::to_vec(secrets)?;

    let ephemeral = EphemeralSecret::random(&mut OsRng);
    let shared = ephemeral.diffie_hellman(don_key);
    let cipher = cipher(shared.raw_secret_bytes())?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_ref())
        .map_err(|e| error!(Crypto, "encryption failed: {}", e))?;

    let mut out = Vec::with_capacity(EPHEMERAL_LEN + NONCE_LEN + ciphertext.len());
    out.extend_from_slice(ephemeral.public_key().to_encoded_point(false).as_bytes());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// The receiving side of [`encrypt_secrets`].
pub fn decrypt_secrets(data: &[u8], don_secret: &SecretKey) -> Result<Secrets, Error> {
    if data.len() < EPHEMERAL_LEN + NONCE_LEN {
        bail!(Crypto, "encrypted secrets are too short");
    }
    let (ephemeral, rest) = data.split_at(EPHEMERAL_LEN);
    let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

    let ephemeral = PublicKey::from_sec1_bytes(ephemeral)?;
    let shared = k256::ecdh::diffie_hellman(don_secret.to_nonzero_scalar(), ephemeral.as_affine());
    let plaintext = cipher(shared.raw_secret_bytes())?
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| error!(Crypto, "encrypted secrets failed authentication"))?;
    Ok(serde_json::from_slice(&plaintext)?)
}
