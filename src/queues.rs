//! The outbound queues between the engines and their consumer loops.
//!
//! Every queue is bounded: a put blocks cooperatively when the consumer has
//! fallen behind, and either delivers the whole record or delivers nothing.
//! The sender loop drains the NH and command queues concurrently while an
//! engine runs; the key database process consumes the key management queue.

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::constants::QUEUE_BOUND;
use crate::errors::KexError;
use crate::keys::KeyDbEntry;

/// The sender halves of the outbound queues, held by the input thread.
#[derive(Clone)]
pub struct Queues {
    nh: Sender<Vec<u8>>,
    command: Sender<Vec<u8>>,
    key_db: Sender<KeyDbEntry>,
}

/// The receiver halves of the outbound queues.
pub struct QueueReceivers {
    /// Packets for the network host.
    pub nh: Receiver<Vec<u8>>,
    /// Command packets for the receiver; the sender loop encrypts these
    /// under the local key before they leave the host.
    pub command: Receiver<Vec<u8>>,
    /// Key database records.
    pub key_db: Receiver<KeyDbEntry>,
}

/// Creates the bounded queue set.
#[must_use]
pub fn queues() -> (Queues, QueueReceivers) {
    let (nh_tx, nh_rx) = bounded(QUEUE_BOUND);
    let (command_tx, command_rx) = bounded(QUEUE_BOUND);
    let (key_db_tx, key_db_rx) = bounded(QUEUE_BOUND);

    (
        Queues { nh: nh_tx, command: command_tx, key_db: key_db_tx },
        QueueReceivers { nh: nh_rx, command: command_rx, key_db: key_db_rx },
    )
}

impl Queues {
    /// Enqueues a packet for the network host.
    pub fn put_nh(&self, packet: Vec<u8>) -> Result<(), KexError> {
        log::debug!("queueing {} byte packet to the network host", packet.len());
        self.nh.send(packet).map_err(|_| KexError::Disconnected)
    }

    /// Enqueues a command packet for the receiver.
    pub fn put_command(&self, packet: Vec<u8>) -> Result<(), KexError> {
        log::debug!("queueing {} byte command packet", packet.len());
        self.command.send(packet).map_err(|_| KexError::Disconnected)
    }

    /// Enqueues a key database record.
    pub fn put_key_db(&self, entry: KeyDbEntry) -> Result<(), KexError> {
        log::debug!("queueing key database entry for {}", entry.peer_id);
        self.key_db.send(entry).map_err(|_| KexError::Disconnected)
    }
}
