//! The contact database interface the engines commit through.
//!
//! Only the narrow slice the engines need lives here; persistence and the
//! rest of contact management belong to the database process.

use crate::constants::LOCAL_ID;
use crate::keys::{Fingerprint, ZERO_FINGERPRINT};
use crate::settings::Settings;

/// One row of the contact database.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Contact {
    /// The contact's account identifier (e.g. `alice@example.com`).
    pub account: String,
    /// The user's own account identifier toward this contact.
    pub user: String,
    /// Display nickname.
    pub nick: String,
    /// Fingerprint of the user's public key; zero when the keys did not
    /// come from X25519.
    pub tx_fingerprint: Fingerprint,
    /// Fingerprint of the contact's public key; zero when the keys did not
    /// come from X25519.
    pub rx_fingerprint: Fingerprint,
    /// Whether messages to this contact are logged.
    pub log_messages: bool,
    /// Whether files from this contact are accepted.
    pub accept_files: bool,
    /// Whether notifications are shown for this contact.
    pub notifications: bool,
}

impl Contact {
    /// The TxM-to-RxM pseudo-contact created by local key setup.
    #[must_use]
    pub fn local() -> Contact {
        Contact {
            account: LOCAL_ID.into(),
            user: LOCAL_ID.into(),
            nick: LOCAL_ID.into(),
            tx_fingerprint: ZERO_FINGERPRINT,
            rx_fingerprint: ZERO_FINGERPRINT,
            log_messages: false,
            accept_files: false,
            notifications: false,
        }
    }

    /// A remote contact with the default flags from the settings.
    #[must_use]
    pub fn remote(
        account: &str,
        user: &str,
        nick: &str,
        tx_fingerprint: Fingerprint,
        rx_fingerprint: Fingerprint,
        settings: &Settings,
    ) -> Contact {
        Contact {
            account: account.into(),
            user: user.into(),
            nick: nick.into(),
            tx_fingerprint,
            rx_fingerprint,
            log_messages: settings.log_messages_by_default,
            accept_files: settings.accept_files_by_default,
            notifications: settings.show_notifications_by_default,
        }
    }
}

/// The in-memory contact list, applied synchronously during commit.
#[derive(Default)]
pub struct ContactList {
    contacts: Vec<Contact>,
}

impl ContactList {
    /// An empty contact list.
    #[must_use]
    pub fn new() -> ContactList {
        ContactList::default()
    }

    /// Adds a contact, replacing any existing entry for the same account.
    pub fn add_contact(&mut self, contact: Contact) {
        self.contacts.retain(|c| c.account != contact.account);
        self.contacts.push(contact);
    }

    /// Looks up a contact by account.
    #[must_use]
    pub fn get_contact(&self, account: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.account == account)
    }

    /// Whether local key setup has completed.
    #[must_use]
    pub fn has_local_contact(&self) -> bool {
        self.get_contact(LOCAL_ID).is_some()
    }

    /// Whether any remote contact exists.
    #[must_use]
    pub fn has_contacts(&self) -> bool {
        self.contacts.iter().any(|c| c.account != LOCAL_ID)
    }

    /// Iterates over all contacts, the local pseudo-contact included.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.iter()
    }
}

/// The window selected in the transmitter UI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TxWindow {
    /// Account of the selected contact, or the group name.
    pub uid: String,
    /// Whether a contact or a group is selected.
    pub kind: WindowKind,
}

/// The kind of window selected in the transmitter UI.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowKind {
    /// A single contact.
    Contact,
    /// A group of contacts.
    Group,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_contact_replaces_by_account() {
        let mut contacts = ContactList::new();
        let settings = Settings::default();

        contacts.add_contact(Contact::remote(
            "alice@ex",
            "bob@ex",
            "Alice",
            ZERO_FINGERPRINT,
            ZERO_FINGERPRINT,
            &settings,
        ));
        contacts.add_contact(Contact::remote(
            "alice@ex",
            "bob@ex",
            "Alicia",
            ZERO_FINGERPRINT,
            ZERO_FINGERPRINT,
            &settings,
        ));

        assert_eq!(1, contacts.contacts().count());
        assert_eq!("Alicia", contacts.get_contact("alice@ex").unwrap().nick);
    }

    #[test]
    fn local_contact_is_not_a_contact() {
        let mut contacts = ContactList::new();

        contacts.add_contact(Contact::local());

        assert!(contacts.has_local_contact());
        assert!(!contacts.has_contacts());
    }
}
