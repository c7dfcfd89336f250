//! The user interaction boundary.
//!
//! Everything the engines ask of or show to the user goes through the
//! [`UserIo`] trait, so the exchange logic can be driven by scripted
//! answers under test. [`Terminal`] is the production implementation.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::errors::KexError;
use crate::keys::Fingerprint;

/// A user interrupt at a prompt. The engine unwinds without writing any
/// state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Interrupted;

impl From<Interrupted> for KexError {
    fn from(_: Interrupted) -> KexError {
        KexError::Aborted
    }
}

/// Phases of the network host bypass shown during local key setup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Bypass {
    /// Connect TxM directly to RxM before the local key packet is sent.
    Start,
    /// Restore the normal data diode configuration.
    Stop,
}

/// The prompts and screen output of the transmitter UI.
pub trait UserIo {
    /// Reads a confirmation code entry: two lowercase hex digits or the
    /// retransmit literal.
    fn confirmation_code(&mut self) -> Result<String, Interrupted>;

    /// Reads one line from the Base58-check key prompt.
    fn key_line(&mut self, prompt: &str) -> Result<String, Interrupted>;

    /// Asks a yes/no question.
    fn yes(&mut self, question: &str) -> Result<bool, Interrupted>;

    /// Asks which directory a PSK file should be written to.
    fn psk_dir(&mut self, nick: &str) -> Result<PathBuf, Interrupted>;

    /// Reads a password without echo.
    fn password(&mut self, prompt: &str) -> Result<String, Interrupted>;

    /// Clears the screen.
    fn clear_screen(&mut self);

    /// Shows a short notice.
    fn notify(&mut self, message: &str);

    /// Renders a Base58-check encoded key for manual transcription.
    fn print_key(&mut self, label: &str, encoded: &str);

    /// Renders a fingerprint for out-of-band comparison.
    fn print_fingerprint(&mut self, label: &str, fingerprint: &Fingerprint);

    /// Signals the start or end of the network host bypass.
    fn nh_bypass(&mut self, phase: Bypass);
}

/// [`UserIo`] over the controlling terminal.
#[derive(Default)]
pub struct Terminal;

impl Terminal {
    fn read_line(&self, prompt: &str) -> Result<String, Interrupted> {
        print!("{prompt}");
        io::stdout().flush().map_err(|_| Interrupted)?;

        let mut line = String::new();
        let n = io::stdin().lock().read_line(&mut line).map_err(|_| Interrupted)?;
        if n == 0 {
            // EOF on stdin means the operator is gone.
            return Err(Interrupted);
        }
        Ok(line.trim().to_owned())
    }
}

impl UserIo for Terminal {
    fn confirmation_code(&mut self) -> Result<String, Interrupted> {
        Ok(self.read_line("Enter confirmation code (from RxM): ")?.to_ascii_lowercase())
    }

    fn key_line(&mut self, prompt: &str) -> Result<String, Interrupted> {
        self.read_line(&format!("{prompt}: "))
    }

    fn yes(&mut self, question: &str) -> Result<bool, Interrupted> {
        loop {
            let answer = self.read_line(&format!("{question} (y/n): "))?;
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => {}
            }
        }
    }

    fn psk_dir(&mut self, nick: &str) -> Result<PathBuf, Interrupted> {
        Ok(PathBuf::from(self.read_line(&format!("Select removable media for {nick}: "))?))
    }

    fn password(&mut self, prompt: &str) -> Result<String, Interrupted> {
        rpassword::prompt_password(format!("{prompt}: ")).map_err(|_| Interrupted)
    }

    fn clear_screen(&mut self) {
        print!("\x1b[2J\x1b[H");
        let _ = io::stdout().flush();
    }

    fn notify(&mut self, message: &str) {
        println!("{message}");
    }

    fn print_key(&mut self, label: &str, encoded: &str) {
        println!("{label}:");
        println!("    {encoded}");
    }

    fn print_fingerprint(&mut self, label: &str, fingerprint: &Fingerprint) {
        // Five-digit decimal groups are easier to read over a call than hex.
        println!("{label}:");
        for row in fingerprint.chunks(8) {
            let groups = row
                .chunks(2)
                .map(|pair| format!("{:05}", u16::from_be_bytes([pair[0], pair[1]])))
                .collect::<Vec<String>>();
            println!("    {}", groups.join("  "));
        }
    }

    fn nh_bypass(&mut self, phase: Bypass) {
        match phase {
            Bypass::Start => println!("Bypass the network host computer now."),
            Bypass::Stop => println!("Bypass of the network host is now complete."),
        }
    }
}
