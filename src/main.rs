use std::thread;

use anyhow::Result;
use clap::Parser;
use crossbeam_channel::{never, select};
use rand::rngs::OsRng;

use airlock::contacts::{ContactList, TxWindow, WindowKind};
use airlock::errors::KexError;
use airlock::io::Terminal;
use airlock::queues::{queues, QueueReceivers, Queues};
use airlock::settings::Settings;
use airlock::{create_pre_shared_key, new_local_key, rxm_load_psk, start_key_exchange};

/// Transmitter-side key establishment for a split-endpoint messenger.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Opts {
    /// The user's own account identifier (e.g. bob@example.com).
    #[arg(long)]
    user: String,

    /// Run with session traffic masking active.
    #[arg(long)]
    traffic_masking: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let settings =
        Settings { session_traffic_masking: opts.traffic_masking, ..Settings::default() };
    let (queues, receivers) = queues();
    let sender = thread::spawn(move || sender_loop(receivers));

    let result = input_loop(&opts.user, &settings, &queues);

    drop(queues);
    sender.join().expect("sender loop panicked");
    result
}

/// Dispatches key-establishment commands until the user quits. Local key
/// setup runs first; no contact can be added before it completes.
fn input_loop(user: &str, settings: &Settings, queues: &Queues) -> Result<()> {
    let mut contact_list = ContactList::new();
    let mut io = Terminal::default();

    while !contact_list.has_local_contact() && !settings.session_traffic_masking {
        match new_local_key(&mut contact_list, settings, queues, &mut io, OsRng) {
            Ok(()) => {}
            Err(KexError::Aborted) => {
                println!("Local key setup aborted.");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        }
    }

    loop {
        let Some(line) = read_command()? else { return Ok(()) };
        let mut parts = line.split_whitespace();

        let result = match (parts.next(), parts.next(), parts.next()) {
            (Some("/add"), Some(account), Some(nick)) => start_key_exchange(
                account,
                user,
                nick,
                &mut contact_list,
                settings,
                queues,
                &mut io,
                OsRng,
            ),
            (Some("/psk"), Some(account), Some(nick)) => create_pre_shared_key(
                account,
                user,
                nick,
                &mut contact_list,
                settings,
                queues,
                &mut io,
                OsRng,
            ),
            (Some("/loadpsk"), Some(account), None) => {
                let window = TxWindow { uid: account.to_owned(), kind: WindowKind::Contact };
                rxm_load_psk(&window, &contact_list, settings, queues)
            }
            (Some("/localkey"), None, None) => {
                new_local_key(&mut contact_list, settings, queues, &mut io, OsRng)
            }
            (Some("/quit"), None, None) => return Ok(()),
            _ => {
                println!(
                    "Commands: /add <account> <nick>, /psk <account> <nick>, \
                     /loadpsk <account>, /localkey, /quit"
                );
                continue;
            }
        };

        if let Err(err) = result {
            // One short line per failed engine; an aborted engine wrote no state.
            println!("Error: {err}");
        }
    }
}

fn read_command() -> Result<Option<String>> {
    use std::io::{BufRead, Write};

    print!("> ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

/// Stand-in for the concurrent sender loop: drains every outbound queue
/// while the engines run and reports the traffic. Headers and lengths
/// only; payloads never reach the log.
fn sender_loop(receivers: QueueReceivers) {
    let QueueReceivers { mut nh, mut command, mut key_db } = receivers;
    let mut open = 3;

    while open > 0 {
        select! {
            recv(nh) -> packet => match packet {
                Ok(packet) => log::info!(
                    "to network host: {} bytes, header 0x{:02x}",
                    packet.len(),
                    packet[0],
                ),
                Err(_) => {
                    nh = never();
                    open -= 1;
                }
            },
            recv(command) -> packet => match packet {
                Ok(packet) => log::info!(
                    "command queued: {} bytes, header 0x{:02x}",
                    packet.len(),
                    packet[0],
                ),
                Err(_) => {
                    command = never();
                    open -= 1;
                }
            },
            recv(key_db) -> entry => match entry {
                Ok(entry) => log::info!("key database: added entry for {}", entry.peer_id),
                Err(_) => {
                    key_db = never();
                    open -= 1;
                }
            },
        }
    }
}
