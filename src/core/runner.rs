//! Remote command execution over the adb bridge.
//!
//! Everything that talks to the device goes through [`CommandRunner`], so
//! the log fetchers, device checks and benchmark driver can be exercised
//! against a scripted runner without a device attached.

use std::process::{Command, Stdio};

use crate::core::error::AtopError;

#[cfg(any(test, feature = "testing"))]
pub use crate::core::scripted::ScriptedRunner;

pub trait CommandRunner {
    /// Run `args` inside the device shell, returning trimmed combined output.
    fn shell(&self, args: &[&str]) -> Result<String, AtopError>;

    /// Run a command on the host (adb itself, `which`).
    fn host(&self, program: &str, args: &[&str]) -> Result<String, AtopError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn shell(&self, args: &[&str]) -> Result<String, AtopError> {
        (**self).shell(args)
    }

    fn host(&self, program: &str, args: &[&str]) -> Result<String, AtopError> {
        (**self).host(program, args)
    }
}

/// Runs commands through the `adb` binary found on PATH (or configured).
#[derive(Debug, Clone)]
pub struct AdbRunner {
    adb: String,
}

impl AdbRunner {
    pub fn new(adb: impl Into<String>) -> Self {
        Self { adb: adb.into() }
    }

    pub fn adb(&self) -> &str {
        &self.adb
    }
}

impl Default for AdbRunner {
    fn default() -> Self {
        Self::new("adb")
    }
}

impl CommandRunner for AdbRunner {
    fn shell(&self, args: &[&str]) -> Result<String, AtopError> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push("shell");
        full.extend_from_slice(args);
        check_output(&self.adb, &full)
    }

    fn host(&self, program: &str, args: &[&str]) -> Result<String, AtopError> {
        check_output(program, args)
    }
}

pub(crate) fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}

/// Spawn `program` and capture stdout followed by stderr as one string.
pub fn check_output(program: &str, args: &[&str]) -> Result<String, AtopError> {
    let command = render_command(program, args);
    log::debug!("running: {command}");

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| AtopError::Spawn {
            command: command.clone(),
            source,
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    let text = text.trim().to_string();

    if output.status.success() {
        Ok(text)
    } else {
        // Killed by a signal leaves no code.
        let code = output.status.code().unwrap_or(-1);
        Err(AtopError::CommandFailed {
            command,
            code,
            output: text,
        })
    }
}
