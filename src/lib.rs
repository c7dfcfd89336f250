#![warn(missing_docs)]

//! Transmitter-side key establishment for a split-endpoint messenger.
//!
//! A split-endpoint messenger separates the sending half (TxM) and the
//! receiving half (RxM) of a client onto two air-gapped machines, with an
//! untrusted network host relaying ciphertext between them and the
//! Internet. This crate implements the three protocols by which the
//! transmitter comes to share key material with its receiver and with
//! remote contacts:
//!
//! - [`new_local_key`] provisions the local key that encrypts every
//!   command TxM sends to RxM. The key crosses the relay as an
//!   authenticated ciphertext while its decryption key is transcribed by
//!   hand, and a one-byte confirmation code proves the honest receiver
//!   decrypted it.
//! - [`start_key_exchange`] runs an X25519 agreement with a remote
//!   contact, deriving per-direction message and header keys plus
//!   fingerprints that the users authenticate over an independent voice
//!   channel.
//! - [`create_pre_shared_key`] exports a password-wrapped key bundle to
//!   removable media for contacts who want no key agreement at all.
//!
//! Engines draw from the caller's CSPRNG, prompt through a [`UserIo`]
//! implementation, and commit through the contact list and the bounded
//! outbound queues. An engine that aborts, for any reason, has committed
//! nothing.
//!
//! ```
//! use airlock::constants::MESSAGE_KEY_CONTEXT;
//! use airlock::hash_chain;
//! use rand::rngs::OsRng;
//! use x25519_dalek::{PublicKey, StaticSecret};
//!
//! // Two peers agree on a shared secret...
//! let alice_sk = StaticSecret::random_from_rng(OsRng);
//! let alice_pk = PublicKey::from(&alice_sk);
//! let bea_sk = StaticSecret::random_from_rng(OsRng);
//! let bea_pk = PublicKey::from(&bea_sk);
//!
//! let alice_ssk = alice_sk.diffie_hellman(&bea_pk);
//! let bea_ssk = bea_sk.diffie_hellman(&alice_pk);
//!
//! // ...and derive mirrored message keys without negotiating: the key
//! // Alice sends with is the key Bea receives with.
//! let alice_tx = hash_chain(&[alice_ssk.as_bytes(), bea_pk.as_bytes(), MESSAGE_KEY_CONTEXT]);
//! let bea_rx = hash_chain(&[bea_ssk.as_bytes(), bea_pk.as_bytes(), MESSAGE_KEY_CONTEXT]);
//! assert_eq!(alice_tx, bea_rx);
//! ```

pub mod b58;
pub mod constants;
pub mod contacts;
pub mod crypto;
pub mod errors;
pub mod io;
pub mod keys;
pub mod queues;
pub mod settings;

mod exchange;
mod local_key;
mod psk;

pub use crate::crypto::hash_chain;
pub use crate::exchange::{start_key_exchange, verify_fingerprints};
pub use crate::io::UserIo;
pub use crate::local_key::new_local_key;
pub use crate::psk::{create_pre_shared_key, rxm_load_psk};

#[cfg(test)]
mod test_helpers {
    use std::collections::VecDeque;
    use std::path::PathBuf;

    use crate::io::{Bypass, Interrupted, UserIo};
    use crate::keys::Fingerprint;

    /// Scripted prompt answers, recording everything the engine shows the
    /// user. An exhausted script interrupts the engine, which doubles as
    /// the abort scenario.
    #[derive(Default)]
    pub struct ScriptedIo {
        pub lines: VecDeque<String>,
        pub yes_answers: VecDeque<bool>,
        pub dirs: VecDeque<PathBuf>,
        pub passwords: VecDeque<String>,
        pub printed_keys: Vec<String>,
        pub printed_fingerprints: Vec<(String, Fingerprint)>,
        pub notices: Vec<String>,
        pub bypasses: Vec<Bypass>,
    }

    impl ScriptedIo {
        pub fn new() -> ScriptedIo {
            ScriptedIo::default()
        }

        pub fn with_lines(lines: &[&str]) -> ScriptedIo {
            ScriptedIo {
                lines: lines.iter().map(|s| (*s).to_owned()).collect(),
                ..ScriptedIo::default()
            }
        }
    }

    impl UserIo for ScriptedIo {
        fn confirmation_code(&mut self) -> Result<String, Interrupted> {
            self.lines.pop_front().ok_or(Interrupted)
        }

        fn key_line(&mut self, _prompt: &str) -> Result<String, Interrupted> {
            self.lines.pop_front().ok_or(Interrupted)
        }

        fn yes(&mut self, _question: &str) -> Result<bool, Interrupted> {
            self.yes_answers.pop_front().ok_or(Interrupted)
        }

        fn psk_dir(&mut self, _nick: &str) -> Result<PathBuf, Interrupted> {
            self.dirs.pop_front().ok_or(Interrupted)
        }

        fn password(&mut self, _prompt: &str) -> Result<String, Interrupted> {
            self.passwords.pop_front().ok_or(Interrupted)
        }

        fn clear_screen(&mut self) {}

        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_owned());
        }

        fn print_key(&mut self, _label: &str, encoded: &str) {
            self.printed_keys.push(encoded.to_owned());
        }

        fn print_fingerprint(&mut self, label: &str, fingerprint: &Fingerprint) {
            self.printed_fingerprints.push((label.to_owned(), *fingerprint));
        }

        fn nh_bypass(&mut self, phase: Bypass) {
            self.bypasses.push(phase);
        }
    }
}
