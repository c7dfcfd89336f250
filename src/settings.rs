/// Runtime settings consumed by the key-establishment engines.
///
/// Loaded by the transmitter from its settings database and passed by
/// reference; the engines only ever read them.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Whether session traffic masking is active. Commands that would
    /// disturb the constant packet schedule are disabled while it is.
    pub session_traffic_masking: bool,

    /// Default for a new contact's message logging flag.
    pub log_messages_by_default: bool,

    /// Default for a new contact's file reception flag.
    pub accept_files_by_default: bool,

    /// Default for a new contact's notification flag.
    pub show_notifications_by_default: bool,

    /// Argon2id time cost in passes.
    pub argon2_time_cost: u32,

    /// Argon2id memory cost in KiB.
    pub argon2_memory_cost: u32,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            session_traffic_masking: false,
            log_messages_by_default: false,
            accept_files_by_default: false,
            show_notifications_by_default: true,
            argon2_time_cost: 20,
            argon2_memory_cost: 131_072,
        }
    }
}

#[cfg(test)]
impl Settings {
    /// Settings with Argon2 costs small enough for unit tests.
    pub(crate) fn fast() -> Settings {
        Settings { argon2_time_cost: 1, argon2_memory_cost: 8, ..Settings::default() }
    }
}
