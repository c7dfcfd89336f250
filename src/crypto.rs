//! The cryptographic primitives shared by the key-establishment engines.
//!
//! Symmetric encryption is XChaCha20-Poly1305 with a fresh random 24-byte
//! nonce prepended to every ciphertext. Key derivation is BLAKE2b truncated
//! to 32 bytes over domain-separated input. Password stretching is Argon2id
//! with a single lane and costs taken from the settings.

use argon2::{Algorithm, Argon2, Params, Version};
use blake2::{Blake2b512, Digest};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::{CryptoRng, Rng};
use zeroize::Zeroize;

use crate::constants::{KEY_LENGTH, NONCE_LENGTH, SALT_LENGTH, TAG_LENGTH};
use crate::errors::DecryptError;
use crate::keys::Secret;
use crate::settings::Settings;

/// The number of bytes [`encrypt_and_sign`] adds to a plaintext.
pub const OVERHEAD: usize = NONCE_LENGTH + TAG_LENGTH;

/// Encrypts and authenticates the given plaintext, returning
/// `nonce || ciphertext || tag`. The nonce is drawn fresh from the CSPRNG
/// on every call.
#[must_use]
pub fn encrypt_and_sign(plaintext: &[u8], key: &Secret, mut rng: impl CryptoRng + Rng) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes()).expect("valid key length");
    let nonce: [u8; NONCE_LENGTH] = rng.gen();
    let ciphertext =
        cipher.encrypt(XNonce::from_slice(&nonce), plaintext).expect("plaintext too large");

    let mut out = Vec::with_capacity(plaintext.len() + OVERHEAD);
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    out
}

/// Verifies and opens a `nonce || ciphertext || tag` envelope produced by
/// [`encrypt_and_sign`].
pub fn auth_and_decrypt(ciphertext: &[u8], key: &Secret) -> Result<Vec<u8>, DecryptError> {
    if ciphertext.len() < OVERHEAD {
        return Err(DecryptError::TruncatedCiphertext);
    }
    let (nonce, ciphertext) = ciphertext.split_at(NONCE_LENGTH);

    let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes()).expect("valid key length");
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map_err(|_| DecryptError::InvalidCiphertext)
}

/// A domain-separating key derivation hash: BLAKE2b over the concatenation
/// of the given parts, truncated to 32 bytes.
///
/// Callers pass structured input of the form
/// `shared_secret || public_key || context_tag`; the context tags live in
/// [`constants`](crate::constants).
#[must_use]
pub fn hash_chain(parts: &[&[u8]]) -> Secret {
    let mut hasher = Blake2b512::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();

    let mut out = [0u8; KEY_LENGTH];
    out.copy_from_slice(&digest[..KEY_LENGTH]);
    let secret = Secret::from_bytes(out);
    out.zeroize();
    secret
}

/// Derives a 32-byte key encryption key from a password and salt with
/// Argon2id v1.3. Parallelism is fixed at one lane; time and memory costs
/// come from the settings. Parameter or derivation failure panics, the
/// same way a failed CSPRNG does.
#[must_use]
pub fn argon2_kdf(password: &str, salt: &[u8; SALT_LENGTH], settings: &Settings) -> Secret {
    let params = Params::new(
        settings.argon2_memory_cost,
        settings.argon2_time_cost,
        1,
        Some(KEY_LENGTH),
    )
    .expect("valid Argon2 parameters");

    let mut out = [0u8; KEY_LENGTH];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, &mut out)
        .expect("Argon2 derivation");
    let kek = Secret::from_bytes(out);
    out.zeroize();
    kek
}
