use derive_more::{Display, Error};

/// Failures surfaced by device access, remote commands and configuration.
///
/// Parse anomalies in log text are not represented here: they are logged
/// as warnings and the offending line is skipped.
#[derive(Debug, Display, Error)]
pub enum AtopError {
    #[display("required binary '{tool}' not found on PATH")]
    BridgeToolMissing { tool: String },

    #[display("no devices connected")]
    NoDevice,

    #[display("expected a single connected Android device, found {count}")]
    MultipleDevices { count: usize },

    #[display(
        "permission denied for device '{serial}', please allow adb access on the device (e.g. enable USB debugging)"
    )]
    Unauthorized { serial: String },

    #[display("failed to restart adb as root (shell user is '{user}')")]
    NotRoot { user: String },

    #[display("failed to spawn '{command}'")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[display("command '{command}' returned with error (code {code}): {output}")]
    CommandFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[display("path '{path}' doesn't exist on device")]
    MissingOnDevice { path: String },

    #[display("{what} is not implemented")]
    NotImplemented { what: String },

    #[display("model list '{path}' is empty")]
    EmptyModelList { path: String },

    #[display("invalid configuration: {message}")]
    Config { message: String },
}
