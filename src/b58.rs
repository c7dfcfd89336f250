//! Base58-check rendering and parsing of 32-byte keys.
//!
//! Two alphabets are in use: one for local key decryption keys, one for
//! public keys. The version byte is part of the alphabet, so a key encoded
//! for one alphabet never parses under the other, and the four-byte
//! checksum catches transcription mistakes before any key material is used.

use crate::constants::{B58_LOCAL_KEY_VERSION, B58_PUBLIC_KEY_VERSION, KEY_LENGTH};
use crate::errors::ParseKeyError;

/// The kind of key being rendered or parsed, selecting the version byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeyKind {
    /// A local key decryption key, typed into the receiver by hand.
    LocalKey,
    /// An X25519 public key, transcribed from the contact's transmitter.
    PublicKey,
}

impl KeyKind {
    fn version(self) -> u8 {
        match self {
            KeyKind::LocalKey => B58_LOCAL_KEY_VERSION,
            KeyKind::PublicKey => B58_PUBLIC_KEY_VERSION,
        }
    }
}

/// Encodes a 32-byte key for human transcription.
#[must_use]
pub fn encode(key: &[u8; KEY_LENGTH], kind: KeyKind) -> String {
    bs58::encode(key).with_check_version(kind.version()).into_string()
}

/// Parses a Base58-check string back into a 32-byte key.
pub fn decode(s: &str, kind: KeyKind) -> Result<[u8; KEY_LENGTH], ParseKeyError> {
    let decoded = bs58::decode(s).with_check(Some(kind.version())).into_vec()?;
    if decoded.len() != KEY_LENGTH + 1 {
        return Err(ParseKeyError::InvalidLength);
    }

    let mut key = [0u8; KEY_LENGTH];
    key.copy_from_slice(&decoded[1..]);
    Ok(key)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    use super::*;

    #[test]
    fn round_trip_both_alphabets() {
        let mut rng = ChaChaRng::seed_from_u64(0xB58);
        for kind in [KeyKind::LocalKey, KeyKind::PublicKey] {
            let key = rng.gen::<[u8; KEY_LENGTH]>();
            assert_eq!(Ok(key), decode(&encode(&key, kind), kind));
        }
    }

    #[test]
    fn alphabets_do_not_cross_parse() {
        let key = [0x42u8; KEY_LENGTH];

        let encoded = encode(&key, KeyKind::LocalKey);
        assert_matches!(
            decode(&encoded, KeyKind::PublicKey),
            Err(ParseKeyError::InvalidEncoding(_))
        );
    }

    #[test]
    fn mutated_character_fails_parse() {
        let key = [0x42u8; KEY_LENGTH];
        let encoded = encode(&key, KeyKind::PublicKey);

        for i in 0..encoded.len() {
            let mut mutated = encoded.clone().into_bytes();
            mutated[i] = if mutated[i] == b'3' { b'4' } else { b'3' };
            let mutated = String::from_utf8(mutated).expect("ascii");
            assert!(
                decode(&mutated, KeyKind::PublicKey).is_err(),
                "mutation at {i} still parsed",
            );
        }
    }

    #[test]
    fn short_and_long_keys_are_rejected() {
        let short = bs58::encode(&[1u8; KEY_LENGTH - 1])
            .with_check_version(B58_PUBLIC_KEY_VERSION)
            .into_string();
        let long = bs58::encode(&[1u8; KEY_LENGTH + 1])
            .with_check_version(B58_PUBLIC_KEY_VERSION)
            .into_string();

        assert_eq!(Err(ParseKeyError::InvalidLength), decode(&short, KeyKind::PublicKey));
        assert_eq!(Err(ParseKeyError::InvalidLength), decode(&long, KeyKind::PublicKey));
    }
}
