//! Pre-shared keys on removable media.
//!
//! The fallback for contacts who want no key agreement at all: the
//! transmitter draws the keys itself, wraps them under a password-derived
//! key, and writes the bundle to removable media the user carries to the
//! contact by hand. The network host never sees any of it.
//!
//! A PSK file is `salt(32) || nonce(24) || ciphertext(64) || tag(16)`,
//! where the key encryption key is Argon2id of the password and salt.

use std::fs;

use rand::{CryptoRng, Rng};
use zeroize::Zeroize;

use crate::constants::{
    KEY_EX_PSK_RX_HEADER, KEY_EX_PSK_TX_HEADER, KEY_LENGTH, SALT_LENGTH, US_BYTE,
};
use crate::contacts::{Contact, ContactList, TxWindow, WindowKind};
use crate::crypto::{argon2_kdf, encrypt_and_sign};
use crate::errors::KexError;
#[cfg(test)]
use crate::crypto::auth_and_decrypt;
#[cfg(test)]
use crate::errors::DecryptError;
use crate::io::UserIo;
use crate::keys::{KeyBundle, KeyDbEntry, Secret, ZERO_FINGERPRINT};
use crate::queues::Queues;
use crate::settings::Settings;

/// Generates a pre-shared key bundle for a contact and exports it to
/// removable media.
///
/// The file is named `"{user}.psk - Give to {account}"` inside a directory
/// the user picks; a failed write notifies and asks for another directory.
/// On success exactly one contact row (zero fingerprints), one key
/// database entry, and one installation command have been emitted, in that
/// order.
pub fn create_pre_shared_key(
    account: &str,
    user: &str,
    nick: &str,
    contact_list: &mut ContactList,
    settings: &Settings,
    queues: &Queues,
    io: &mut dyn UserIo,
    mut rng: impl CryptoRng + Rng,
) -> Result<(), KexError> {
    let tx_key = Secret::random(&mut rng);
    let tx_hek = Secret::random(&mut rng);
    let salt: [u8; SALT_LENGTH] = rng.gen();
    let password = io.password("New password for PSK")?;

    io.notify("Deriving key encryption key. This takes a moment.");
    let kek = argon2_kdf(&password, &salt, settings);

    let mut plaintext = [0u8; 2 * KEY_LENGTH];
    plaintext[..KEY_LENGTH].copy_from_slice(tx_key.as_bytes());
    plaintext[KEY_LENGTH..].copy_from_slice(tx_hek.as_bytes());
    let ct_tag = encrypt_and_sign(&plaintext, &kek, &mut rng);
    plaintext.zeroize();

    let mut contents = Vec::with_capacity(SALT_LENGTH + ct_tag.len());
    contents.extend_from_slice(&salt);
    contents.extend_from_slice(&ct_tag);

    loop {
        let dir = io.psk_dir(nick)?;
        let path = dir.join(format!("{user}.psk - Give to {account}"));
        match fs::write(&path, &contents) {
            Ok(()) => {
                log::info!("wrote PSK file to {}", path.display());
                break;
            }
            Err(err) => {
                log::warn!("PSK export failed: {err}");
                io.notify("Error: Did not have permission to write to the directory.");
            }
        }
    }

    let mut packet = Vec::with_capacity(1 + 2 * KEY_LENGTH + account.len() + 1 + nick.len());
    packet.push(KEY_EX_PSK_TX_HEADER);
    packet.extend_from_slice(tx_key.as_bytes());
    packet.extend_from_slice(tx_hek.as_bytes());
    packet.extend_from_slice(account.as_bytes());
    packet.push(US_BYTE);
    packet.extend_from_slice(nick.as_bytes());

    contact_list.add_contact(Contact::remote(
        account,
        user,
        nick,
        ZERO_FINGERPRINT,
        ZERO_FINGERPRINT,
        settings,
    ));
    queues.put_key_db(KeyDbEntry {
        peer_id: account.into(),
        tx: KeyBundle { message_key: tx_key, header_key: tx_hek },
        rx: KeyBundle::random(&mut rng),
    })?;
    queues.put_command(packet)?;

    io.notify(&format!("Successfully added {nick}."));
    Ok(())
}

/// Commands the receiver to load the selected contact's PSK.
///
/// Guarded three ways: traffic masking must be off, the selected window
/// must be a single contact, and that contact's stored keys must not have
/// come from X25519 (their tx fingerprint must be the zero sentinel).
pub fn rxm_load_psk(
    window: &TxWindow,
    contact_list: &ContactList,
    settings: &Settings,
    queues: &Queues,
) -> Result<(), KexError> {
    if settings.session_traffic_masking {
        return Err(KexError::Disabled);
    }
    if window.kind == WindowKind::Group {
        return Err(KexError::GroupSelected);
    }
    let contact = contact_list.get_contact(&window.uid).ok_or(KexError::UnknownContact)?;
    if contact.tx_fingerprint != ZERO_FINGERPRINT {
        return Err(KexError::KeyedWithX25519);
    }

    let mut packet = Vec::with_capacity(1 + window.uid.len());
    packet.push(KEY_EX_PSK_RX_HEADER);
    packet.extend_from_slice(window.uid.as_bytes());
    queues.put_command(packet)
}

/// Opens the contents of a PSK file with the given password, returning the
/// transmit key bundle it carries. The receiving side of
/// [`create_pre_shared_key`], kept here so the tests can prove the export
/// round-trips; a wrong password fails authentication and surfaces no key
/// material.
#[cfg(test)]
fn open_psk(
    contents: &[u8],
    password: &str,
    settings: &Settings,
) -> Result<KeyBundle, DecryptError> {
    if contents.len() < SALT_LENGTH {
        return Err(DecryptError::TruncatedCiphertext);
    }
    let (salt, ct_tag) = contents.split_at(SALT_LENGTH);
    let salt = <[u8; SALT_LENGTH]>::try_from(salt).expect("split length");

    let kek = argon2_kdf(password, &salt, settings);
    let mut plaintext = auth_and_decrypt(ct_tag, &kek)?;
    if plaintext.len() != 2 * KEY_LENGTH {
        plaintext.zeroize();
        return Err(DecryptError::InvalidCiphertext);
    }

    let mut message_key = [0u8; KEY_LENGTH];
    let mut header_key = [0u8; KEY_LENGTH];
    message_key.copy_from_slice(&plaintext[..KEY_LENGTH]);
    header_key.copy_from_slice(&plaintext[KEY_LENGTH..]);
    plaintext.zeroize();

    let bundle = KeyBundle {
        message_key: Secret::from_bytes(message_key),
        header_key: Secret::from_bytes(header_key),
    };
    message_key.zeroize();
    header_key.zeroize();
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    use super::*;
    use crate::queues::queues;
    use crate::test_helpers::ScriptedIo;

    const ACCOUNT: &str = "alice@ex";
    const USER: &str = "bob@ex";
    const NICK: &str = "Alice";

    #[test]
    fn exported_file_round_trips_under_the_password() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::fast();
        let (q, receivers) = queues();
        let mut contact_list = ContactList::new();
        let mut io = ScriptedIo::new();
        io.passwords.push_back("hunter2".into());
        io.dirs.push_back(dir.path().to_path_buf());

        create_pre_shared_key(
            ACCOUNT,
            USER,
            NICK,
            &mut contact_list,
            &settings,
            &q,
            &mut io,
            ChaChaRng::seed_from_u64(21),
        )
        .unwrap();

        let path = dir.path().join(format!("{USER}.psk - Give to {ACCOUNT}"));
        let contents = std::fs::read(&path).expect("PSK file written");

        let entry = receivers.key_db.try_recv().unwrap();
        let bundle = open_psk(&contents, "hunter2", &settings).unwrap();
        assert_eq!(bundle, entry.tx);

        // Any other password fails authentication.
        assert_matches!(
            open_psk(&contents, "hunter3", &settings),
            Err(DecryptError::InvalidCiphertext)
        );

        // The installation command carries the same bundle.
        let cmd = receivers.command.try_recv().unwrap();
        assert_eq!(KEY_EX_PSK_TX_HEADER, cmd[0]);
        assert_eq!(entry.tx.message_key.as_bytes()[..], cmd[1..=KEY_LENGTH]);
        assert_eq!(entry.tx.header_key.as_bytes()[..], cmd[KEY_LENGTH + 1..=2 * KEY_LENGTH]);
        assert_eq!(b"alice@ex\x1fAlice".as_slice(), &cmd[2 * KEY_LENGTH + 1..]);

        // The contact row records that no X25519 fingerprints exist.
        let contact = contact_list.get_contact(ACCOUNT).unwrap();
        assert_eq!(ZERO_FINGERPRINT, contact.tx_fingerprint);
        assert_eq!(ZERO_FINGERPRINT, contact.rx_fingerprint);
    }

    #[test]
    fn unwritable_directory_reprompts() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::fast();
        let (q, receivers) = queues();
        let mut contact_list = ContactList::new();
        let mut io = ScriptedIo::new();
        io.passwords.push_back("hunter2".into());
        io.dirs.push_back(dir.path().join("does-not-exist"));
        io.dirs.push_back(dir.path().to_path_buf());

        create_pre_shared_key(
            ACCOUNT,
            USER,
            NICK,
            &mut contact_list,
            &settings,
            &q,
            &mut io,
            ChaChaRng::seed_from_u64(22),
        )
        .unwrap();

        assert!(io.notices.iter().any(|n| n.contains("write to the directory")));
        assert_eq!(1, receivers.key_db.try_iter().count());
    }

    #[test]
    fn interrupt_before_password_writes_nothing() {
        let settings = Settings::fast();
        let (q, receivers) = queues();
        let mut contact_list = ContactList::new();
        let mut io = ScriptedIo::new();

        assert_matches!(
            create_pre_shared_key(
                ACCOUNT,
                USER,
                NICK,
                &mut contact_list,
                &settings,
                &q,
                &mut io,
                ChaChaRng::seed_from_u64(23),
            ),
            Err(KexError::Aborted)
        );

        assert!(contact_list.get_contact(ACCOUNT).is_none());
        assert_eq!(0, receivers.key_db.try_iter().count());
        assert_eq!(0, receivers.command.try_iter().count());
    }

    #[test]
    fn truncated_psk_file_is_rejected() {
        let settings = Settings::fast();

        assert_matches!(
            open_psk(&[0u8; SALT_LENGTH - 1], "pw", &settings),
            Err(DecryptError::TruncatedCiphertext)
        );
    }

    #[test]
    fn load_psk_emits_the_trigger_command() {
        let (q, receivers) = queues();
        let mut contact_list = ContactList::new();
        contact_list.add_contact(Contact::remote(
            ACCOUNT,
            USER,
            NICK,
            ZERO_FINGERPRINT,
            ZERO_FINGERPRINT,
            &Settings::default(),
        ));
        let window = TxWindow { uid: ACCOUNT.into(), kind: WindowKind::Contact };

        rxm_load_psk(&window, &contact_list, &Settings::default(), &q).unwrap();

        let cmd = receivers.command.try_recv().unwrap();
        assert_eq!(KEY_EX_PSK_RX_HEADER, cmd[0]);
        assert_eq!(ACCOUNT.as_bytes(), &cmd[1..]);
    }

    #[test]
    fn load_psk_guards() {
        let (q, receivers) = queues();
        let mut contact_list = ContactList::new();
        let window = TxWindow { uid: ACCOUNT.into(), kind: WindowKind::Contact };

        let masking = Settings { session_traffic_masking: true, ..Settings::default() };
        assert_matches!(
            rxm_load_psk(&window, &contact_list, &masking, &q),
            Err(KexError::Disabled)
        );

        let group = TxWindow { uid: "friends".into(), kind: WindowKind::Group };
        assert_matches!(
            rxm_load_psk(&group, &contact_list, &Settings::default(), &q),
            Err(KexError::GroupSelected)
        );

        assert_matches!(
            rxm_load_psk(&window, &contact_list, &Settings::default(), &q),
            Err(KexError::UnknownContact)
        );

        // A contact keyed via X25519 has a real tx fingerprint.
        contact_list.add_contact(Contact::remote(
            ACCOUNT,
            USER,
            NICK,
            [1u8; 32],
            [2u8; 32],
            &Settings::default(),
        ));
        assert_matches!(
            rxm_load_psk(&window, &contact_list, &Settings::default(), &q),
            Err(KexError::KeyedWithX25519)
        );

        assert_eq!(0, receivers.command.try_iter().count());
    }
}
