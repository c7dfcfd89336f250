//! The X25519 contact exchange.
//!
//! Public keys travel through the untrusted network host and are confirmed
//! by reading them back over the Base58-check prompt, so a relay that
//! swaps keys must also defeat the out-of-band fingerprint comparison.
//!
//! Key derivation places the public keys so that the two peers compute the
//! mirrored pair without negotiation: keys that encrypt outgoing traffic
//! are derived with the recipient's public key, keys that decrypt incoming
//! traffic with the deriver's own. Fingerprints are salted with the shared
//! secret, so parties monitoring the verification call cannot correlate
//! the spoken values with public keys that transited a compromised relay.

use rand::{CryptoRng, Rng};
use x25519_dalek::{PublicKey, StaticSecret};

use crate::b58::{self, KeyKind};
use crate::constants::{
    FINGERPRINT_CONTEXT, HEADER_KEY_CONTEXT, KEY_EX_X25519_HEADER, KEY_LENGTH,
    MESSAGE_KEY_CONTEXT, PUBLIC_KEY_PACKET_HEADER, RESEND, US_BYTE,
};
use crate::contacts::{Contact, ContactList};
use crate::crypto::hash_chain;
use crate::errors::KexError;
use crate::io::{Interrupted, UserIo};
use crate::keys::{Fingerprint, KeyBundle, KeyDbEntry};
use crate::queues::Queues;
use crate::settings::Settings;

/// Reads the contact's Base58-check public key. Returns `None` when the
/// user asks for a retransmit. The resend sentinel is recognized before
/// any decoding; parse failures re-prompt with no other state change.
fn read_public_key(io: &mut dyn UserIo) -> Result<Option<PublicKey>, Interrupted> {
    loop {
        let line = io.key_line("Enter contact's public key (from RxM)")?;
        if line == RESEND {
            return Ok(None);
        }
        match b58::decode(&line, KeyKind::PublicKey) {
            Ok(bytes) => return Ok(Some(PublicKey::from(bytes))),
            Err(_) => io.notify("Error: Invalid public key. Try again."),
        }
    }
}

/// Asks the user to authenticate both fingerprints over an independent
/// end-to-end encrypted voice channel. Performs no cryptography; a `true`
/// return means the user asserted the values matched.
pub fn verify_fingerprints(
    io: &mut dyn UserIo,
    tx_fp: &Fingerprint,
    rx_fp: &Fingerprint,
) -> Result<bool, Interrupted> {
    io.clear_screen();
    io.notify(
        "To verify the received public key was not replaced by an attacker \
         in the network, call the contact over an end-to-end encrypted line \
         and verbally compare the key fingerprints below.",
    );
    io.print_fingerprint("Your fingerprint (you read)", tx_fp);
    io.print_fingerprint("Purported fingerprint for contact (they read)", rx_fp);
    io.yes("Is the contact's fingerprint correct?")
}

/// Runs an X25519 key exchange with a contact.
///
/// On success exactly one contact row, one key database entry, and one
/// key-installation command have been emitted, in that order. The rx-side
/// key slots of the database entry are filled with fresh random bytes:
/// receive keys are never used on the transmitter, and random values make
/// sure a misrouted use of them cannot decrypt anything.
pub fn start_key_exchange(
    account: &str,
    user: &str,
    nick: &str,
    contact_list: &mut ContactList,
    settings: &Settings,
    queues: &Queues,
    io: &mut dyn UserIo,
    mut rng: impl CryptoRng + Rng,
) -> Result<(), KexError> {
    log::info!("starting X25519 key exchange with {account}");

    let tx_sk = StaticSecret::random_from_rng(&mut rng);
    let tx_pk = PublicKey::from(&tx_sk);

    let rx_pk = loop {
        let mut packet = Vec::with_capacity(1 + KEY_LENGTH + user.len() + 1 + account.len());
        packet.push(PUBLIC_KEY_PACKET_HEADER);
        packet.extend_from_slice(tx_pk.as_bytes());
        packet.extend_from_slice(user.as_bytes());
        packet.push(US_BYTE);
        packet.extend_from_slice(account.as_bytes());
        queues.put_nh(packet)?;

        if let Some(pk) = read_public_key(io)? {
            break pk;
        }
    };

    if rx_pk.as_bytes() == &[0u8; KEY_LENGTH] {
        // A zero key either collapses the shared secret or makes the
        // scalar multiplication refuse outright; an honest peer produces
        // one with negligible probability.
        io.notify(
            "Warning! Received a malicious public key from network. \
             Aborting key exchange for your safety.",
        );
        return Err(KexError::ZeroPublicKey);
    }

    let dh_ssk = tx_sk.diffie_hellman(&rx_pk);

    let tx_key = hash_chain(&[dh_ssk.as_bytes(), rx_pk.as_bytes(), MESSAGE_KEY_CONTEXT]);
    let rx_key = hash_chain(&[dh_ssk.as_bytes(), tx_pk.as_bytes(), MESSAGE_KEY_CONTEXT]);
    let tx_hek = hash_chain(&[dh_ssk.as_bytes(), rx_pk.as_bytes(), HEADER_KEY_CONTEXT]);
    let rx_hek = hash_chain(&[dh_ssk.as_bytes(), tx_pk.as_bytes(), HEADER_KEY_CONTEXT]);
    let tx_fp = *hash_chain(&[dh_ssk.as_bytes(), tx_pk.as_bytes(), FINGERPRINT_CONTEXT]).as_bytes();
    let rx_fp = *hash_chain(&[dh_ssk.as_bytes(), rx_pk.as_bytes(), FINGERPRINT_CONTEXT]).as_bytes();

    if !verify_fingerprints(io, &tx_fp, &rx_fp)? {
        io.notify(
            "Warning! Possible man-in-the-middle attack detected. \
             Aborting key exchange for your safety.",
        );
        return Err(KexError::FingerprintMismatch);
    }

    let mut packet = Vec::with_capacity(1 + 4 * KEY_LENGTH + account.len() + 1 + nick.len());
    packet.push(KEY_EX_X25519_HEADER);
    packet.extend_from_slice(tx_key.as_bytes());
    packet.extend_from_slice(tx_hek.as_bytes());
    packet.extend_from_slice(rx_key.as_bytes());
    packet.extend_from_slice(rx_hek.as_bytes());
    packet.extend_from_slice(account.as_bytes());
    packet.push(US_BYTE);
    packet.extend_from_slice(nick.as_bytes());

    contact_list.add_contact(Contact::remote(account, user, nick, tx_fp, rx_fp, settings));
    queues.put_key_db(KeyDbEntry {
        peer_id: account.into(),
        tx: KeyBundle { message_key: tx_key, header_key: tx_hek },
        rx: KeyBundle::random(&mut rng),
    })?;
    queues.put_command(packet)?;

    log::info!("X25519 key exchange with {account} complete");
    io.notify(&format!("Successfully added {nick}."));
    Ok(())
}
