use thiserror::Error;

/// An error returned when a key-establishment engine stops without
/// committing.
///
/// The re-promptable conditions (wrong confirmation code, unparseable
/// Base58, unwritable PSK directory) are handled inside the engines'
/// input loops and never surface here; every variant of this enum means
/// the engine wrote no state.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum KexError {
    /// The command is forbidden while session traffic masking is active.
    #[error("command is disabled during traffic masking")]
    Disabled,

    /// The peer supplied an all-zero public key.
    #[error("received a zero public key")]
    ZeroPublicKey,

    /// The user rejected the out-of-band fingerprint comparison.
    #[error("fingerprint mismatch")]
    FingerprintMismatch,

    /// A group window is selected where a contact window is required.
    #[error("a group is selected")]
    GroupSelected,

    /// The selected contact's keys came from X25519, not a PSK.
    #[error("current key was exchanged with X25519")]
    KeyedWithX25519,

    /// No contact with the given account exists.
    #[error("unknown contact")]
    UnknownContact,

    /// The user interrupted the exchange at a prompt.
    #[error("aborted by user")]
    Aborted,

    /// An outbound queue was closed by its consumer.
    #[error("outbound queue disconnected")]
    Disconnected,
}

/// An error returned when parsing a Base58-check encoded key was
/// unsuccessful.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ParseKeyError {
    /// Parsing failed because the decoded key was not the correct length.
    #[error("invalid key length")]
    InvalidLength,

    /// Parsing failed because the value was not valid Base58-check or
    /// carried the wrong version byte.
    #[error("invalid base58 encoding")]
    InvalidEncoding(#[from] bs58::decode::Error),
}

/// An error returned when opening an authenticated ciphertext was
/// unsuccessful.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DecryptError {
    /// The ciphertext was too short to contain a nonce and a tag.
    #[error("truncated ciphertext")]
    TruncatedCiphertext,

    /// The ciphertext or its tag did not match the key.
    #[error("invalid ciphertext")]
    InvalidCiphertext,
}
