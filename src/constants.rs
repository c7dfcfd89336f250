//! Stable constants shared with the receiver and relay programs.
//!
//! The one-byte packet headers are part of the wire format and must never
//! change between releases; the receiver dispatches on them before any
//! decryption takes place.

/// The length of a symmetric key, X25519 key, or shared secret in bytes.
pub const KEY_LENGTH: usize = 32;

/// The length of a key fingerprint in bytes.
pub const FINGERPRINT_LENGTH: usize = 32;

/// The length of an XChaCha20-Poly1305 nonce in bytes.
pub const NONCE_LENGTH: usize = 24;

/// The length of a Poly1305 authentication tag in bytes.
pub const TAG_LENGTH: usize = 16;

/// The length of an Argon2 salt in bytes.
pub const SALT_LENGTH: usize = 32;

/// First byte of a local key delivery packet (TxM to RxM via the relay).
pub const LOCAL_KEY_PACKET_HEADER: u8 = b'L';

/// First byte of a public key packet (TxM to a contact via the relay).
pub const PUBLIC_KEY_PACKET_HEADER: u8 = b'P';

/// First byte of the command installing X25519 keys on the receiver.
pub const KEY_EX_X25519_HEADER: u8 = b'X';

/// First byte of the command installing a generated PSK on the receiver.
pub const KEY_EX_PSK_TX_HEADER: u8 = b'T';

/// First byte of the command asking the receiver to load a contact's PSK.
pub const KEY_EX_PSK_RX_HEADER: u8 = b'R';

/// First byte of the command confirming local key installation.
pub const LOCAL_KEY_INSTALLED_HEADER: u8 = b'I';

/// Field separator inside composite packets (ASCII Unit Separator).
pub const US_BYTE: u8 = 0x1f;

/// Reserved account identifier for the TxM-to-RxM pseudo-contact.
pub const LOCAL_ID: &str = "local";

/// Reserved prompt literal that retransmits the pending packet.
pub const RESEND: &str = "resend";

/// Base58-check version byte for local key decryption keys.
pub const B58_LOCAL_KEY_VERSION: u8 = 0x80;

/// Base58-check version byte for public keys.
pub const B58_PUBLIC_KEY_VERSION: u8 = 0x00;

/// Domain separation tag for message key derivation.
pub const MESSAGE_KEY_CONTEXT: &[u8] = b"message_key";

/// Domain separation tag for header key derivation.
pub const HEADER_KEY_CONTEXT: &[u8] = b"header_key";

/// Domain separation tag for fingerprint derivation.
pub const FINGERPRINT_CONTEXT: &[u8] = b"fingerprint";

/// Capacity of each outbound queue.
pub const QUEUE_BOUND: usize = 64;
