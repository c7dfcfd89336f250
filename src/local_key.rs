//! The local key exchange.
//!
//! The local key encrypts every command and packet the transmitter sends to
//! the receiver. It is delivered through the untrusted network host inside
//! an authenticated ciphertext, while the key decryption key crosses over
//! out of band: read off this screen and typed into the receiver by hand.
//! Interception of the ciphertext alone or visual eavesdropping of the
//! decryption key alone yields nothing. The one-byte confirmation code the
//! receiver displays after decrypting proves to the transmitter that the
//! honest receiver holds the key, which closes the replay window.

use rand::{CryptoRng, Rng};
use zeroize::Zeroize;

use crate::b58::{self, KeyKind};
use crate::constants::{
    KEY_LENGTH, LOCAL_ID, LOCAL_KEY_INSTALLED_HEADER, LOCAL_KEY_PACKET_HEADER, RESEND,
};
use crate::contacts::{Contact, ContactList};
use crate::crypto::encrypt_and_sign;
use crate::errors::KexError;
use crate::io::{Bypass, UserIo};
use crate::keys::{KeyBundle, KeyDbEntry, Secret};
use crate::queues::Queues;
use crate::settings::Settings;

/// Runs the Tx-side local key exchange protocol.
///
/// On success exactly one local contact row, one key database entry, and
/// one `LOCAL_KEY_INSTALLED` command have been emitted, in that order. On
/// any failure nothing has been written; a ciphertext already handed to
/// the network host is useless without the key decryption key.
pub fn new_local_key(
    contact_list: &mut ContactList,
    settings: &Settings,
    queues: &Queues,
    io: &mut dyn UserIo,
    mut rng: impl CryptoRng + Rng,
) -> Result<(), KexError> {
    if settings.session_traffic_masking {
        return Err(KexError::Disabled);
    }

    io.clear_screen();
    io.notify("Local key setup");

    let c_code: u8 = rng.gen();
    let key = Secret::random(&mut rng);
    let hek = Secret::random(&mut rng);
    let kek = Secret::random(&mut rng);

    let mut plaintext = [0u8; 2 * KEY_LENGTH + 1];
    plaintext[..KEY_LENGTH].copy_from_slice(key.as_bytes());
    plaintext[KEY_LENGTH..2 * KEY_LENGTH].copy_from_slice(hek.as_bytes());
    plaintext[2 * KEY_LENGTH] = c_code;

    let mut packet = vec![LOCAL_KEY_PACKET_HEADER];
    packet.extend_from_slice(&encrypt_and_sign(&plaintext, &kek, &mut rng));
    plaintext.zeroize();

    io.nh_bypass(Bypass::Start);
    queues.put_nh(packet.clone())?;

    let encoded_kek = b58::encode(kek.as_bytes(), KeyKind::LocalKey);
    loop {
        io.print_key("Local key decryption key (to RxM)", &encoded_kek);

        let entry = io.confirmation_code()?;
        if entry == format!("{c_code:02x}") {
            break;
        } else if entry == RESEND {
            log::info!("resending local key packet");
            queues.put_nh(packet.clone())?;
        } else {
            io.notify(
                "Incorrect confirmation code. If RxM did not receive the \
                 encrypted local key, resend it by typing 'resend'.",
            );
        }
    }

    io.nh_bypass(Bypass::Stop);

    contact_list.add_contact(Contact::local());
    queues.put_key_db(KeyDbEntry {
        peer_id: LOCAL_ID.into(),
        tx: KeyBundle { message_key: key, header_key: hek },
        rx: KeyBundle::random(&mut rng),
    })?;
    queues.put_command(vec![LOCAL_KEY_INSTALLED_HEADER])?;

    log::info!("local key installed");
    io.notify("Successfully added a new local key.");
    Ok(())
}
