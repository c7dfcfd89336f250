use std::fmt::{Debug, Formatter};

use rand::{CryptoRng, Rng};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::constants::{FINGERPRINT_LENGTH, KEY_LENGTH};

/// A key fingerprint, spoken aloud during out-of-band verification.
pub type Fingerprint = [u8; FINGERPRINT_LENGTH];

/// The fingerprint recorded when no X25519 fingerprint exists: pre-shared
/// keys and the local pseudo-contact.
pub const ZERO_FINGERPRINT: Fingerprint = [0u8; FINGERPRINT_LENGTH];

/// A 32-byte secret.
///
/// Zeroized on drop and compared in constant time. Deliberately has no
/// `Debug` or `Display`; the only rendering path is the Base58-check
/// printer, and only for secrets meant to be transcribed by hand.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret([u8; KEY_LENGTH]);

impl Secret {
    /// Draws a fresh secret from the given CSPRNG. A failure of the
    /// operating system's randomness source panics; no key material is
    /// ever produced from a degraded source.
    #[must_use]
    pub fn random(mut rng: impl CryptoRng + Rng) -> Secret {
        Secret(rng.gen())
    }

    /// Wraps the given bytes as a secret.
    #[must_use]
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Secret {
        Secret(bytes)
    }

    /// The raw bytes of the secret.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }
}

impl Debug for Secret {
    // The redaction is the point: dbg!() and assertion failures must never
    // spill key material.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl Eq for Secret {}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

/// The two keys used for one direction of one conversation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyBundle {
    /// Encrypts assembly packet contents.
    pub message_key: Secret,
    /// Encrypts assembly packet headers.
    pub header_key: Secret,
}

impl KeyBundle {
    /// A bundle of fresh random keys.
    ///
    /// The transmitter fills the rx-direction slots of every key database
    /// entry with one of these: uniformly distributed but known to no one,
    /// so accidental use of the wrong direction can never decrypt anything.
    #[must_use]
    pub fn random(mut rng: impl CryptoRng + Rng) -> KeyBundle {
        KeyBundle {
            message_key: Secret::random(&mut rng),
            header_key: Secret::random(&mut rng),
        }
    }
}

/// A record for the key management queue, installing keys for one peer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyDbEntry {
    /// [`LOCAL_ID`](crate::constants::LOCAL_ID) or a remote account.
    pub peer_id: String,
    /// Keys for traffic this endpoint sends.
    pub tx: KeyBundle,
    /// Keys for traffic this endpoint receives; random placeholders on the
    /// transmitter.
    pub rx: KeyBundle,
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    use super::*;

    #[test]
    fn constant_time_equality() {
        let a = Secret::from_bytes([7u8; KEY_LENGTH]);
        let b = Secret::from_bytes([7u8; KEY_LENGTH]);
        let mut c_bytes = [7u8; KEY_LENGTH];
        c_bytes[KEY_LENGTH - 1] ^= 1;
        let c = Secret::from_bytes(c_bytes);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn random_secrets_are_distinct() {
        let mut rng = ChaChaRng::seed_from_u64(0xA1A);
        let a = Secret::random(&mut rng);
        let b = Secret::random(&mut rng);

        assert_ne!(a, b);
    }
}
