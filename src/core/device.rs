//! Environment checks run before touching the device log.

use crate::core::{error::AtopError, runner::CommandRunner};

/// A single entry of `adb devices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub serial: String,
    pub state: String,
}

/// Parse `adb devices` output into the one attached device.
///
/// The output always starts with a `List of devices attached` header;
/// daemon start-up chatter (`* daemon ...`) is ignored.
pub fn parse_devices(output: &str) -> Result<Device, AtopError> {
    let devices: Vec<Device> = output
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.starts_with("List of devices") && !line.starts_with('*')
        })
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            let state = parts.next().unwrap_or("unknown");
            Some(Device {
                serial: serial.to_string(),
                state: state.to_string(),
            })
        })
        .collect();

    match devices.len() {
        0 => Err(AtopError::NoDevice),
        1 => {
            let device = devices.into_iter().next().ok_or(AtopError::NoDevice)?;
            if device.state == "unauthorized" {
                Err(AtopError::Unauthorized {
                    serial: device.serial,
                })
            } else {
                Ok(device)
            }
        }
        count => Err(AtopError::MultipleDevices { count }),
    }
}

/// Fail unless `tool` resolves on PATH.
pub fn check_bridge_tool<R: CommandRunner>(runner: &R, tool: &str) -> Result<(), AtopError> {
    runner
        .host("which", &[tool])
        .map(|_| ())
        .map_err(|err| {
            log::debug!("which {tool}: {err}");
            AtopError::BridgeToolMissing {
                tool: tool.to_string(),
            }
        })
}

pub fn shell_user<R: CommandRunner>(runner: &R) -> Result<String, AtopError> {
    runner.shell(&["whoami"])
}

/// Make sure the device shell runs as root, restarting adbd as root once.
pub fn ensure_root<R: CommandRunner>(runner: &R, adb: &str) -> Result<(), AtopError> {
    if shell_user(runner)? == "root" {
        return Ok(());
    }

    log::warn!("atop requires adb in root...restarting as root");
    runner.host(adb, &["root"])?;

    let user = shell_user(runner)?;
    if user == "root" {
        Ok(())
    } else {
        Err(AtopError::NotRoot { user })
    }
}

/// Run every precondition in order and return the attached device.
pub fn check_reqs<R: CommandRunner>(runner: &R, adb: &str) -> Result<Device, AtopError> {
    check_bridge_tool(runner, adb)?;
    let device = parse_devices(&runner.host(adb, &["devices"])?)?;
    ensure_root(runner, adb)?;
    log::info!("Found device: {} ({})", device.serial, device.state);
    Ok(device)
}
