use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::core::{error::AtopError, runner::CommandRunner};

/// Which device log to scrape.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogSource {
    /// Kernel ring buffer with human readable timestamps.
    #[default]
    Dmesg,
    /// Android system log, dumped once with a year-qualified timestamp.
    Logcat,
}

impl LogSource {
    pub fn shell_args(self) -> &'static [&'static str] {
        match self {
            LogSource::Dmesg => &["dmesg", "-T"],
            LogSource::Logcat => &["logcat", "-d", "-v", "year"],
        }
    }
}

/// Something that can produce the whole current log as one string.
pub trait LogFetcher {
    fn fetch(&self) -> Result<String, AtopError>;
}

impl<F> LogFetcher for F
where
    F: Fn() -> Result<String, AtopError>,
{
    fn fetch(&self) -> Result<String, AtopError> {
        self()
    }
}

/// Fetches a [`LogSource`] through a [`CommandRunner`].
#[derive(Debug, Clone)]
pub struct RemoteLog<R> {
    runner: R,
    source: LogSource,
}

impl<R: CommandRunner> RemoteLog<R> {
    pub fn new(runner: R, source: LogSource) -> Self {
        Self { runner, source }
    }

    pub fn source(&self) -> LogSource {
        self.source
    }
}

impl<R: CommandRunner> LogFetcher for RemoteLog<R> {
    fn fetch(&self) -> Result<String, AtopError> {
        self.runner.shell(self.source.shell_args())
    }
}

/// Kernel ring buffer (`dmesg -T`).
pub fn log_dmesg<R: CommandRunner>(runner: &R) -> Result<String, AtopError> {
    RemoteLog::new(runner, LogSource::Dmesg).fetch()
}

/// Android log (`logcat -d`).
pub fn log_logcat<R: CommandRunner>(runner: &R) -> Result<String, AtopError> {
    RemoteLog::new(runner, LogSource::Logcat).fetch()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::runner::ScriptedRunner;
    use std::str::FromStr;

    #[test]
    fn test_remote_log_uses_source_command() {
        let runner = ScriptedRunner::new();
        runner
            .on("adb shell dmesg -T", "[Wed May 13 23:23:08 2020] hello")
            .on("adb shell logcat -d -v year", "2020-05-13 23:23:08.000 hi");

        assert_eq!(
            log_dmesg(&runner).unwrap(),
            "[Wed May 13 23:23:08 2020] hello"
        );
        assert_eq!(log_logcat(&runner).unwrap(), "2020-05-13 23:23:08.000 hi");
    }

    #[test]
    fn test_log_source_names() {
        assert_eq!(LogSource::from_str("logcat").unwrap(), LogSource::Logcat);
        assert_eq!(LogSource::Dmesg.to_string(), "dmesg");
    }

    #[test]
    fn test_fetch_error_propagates() {
        let runner = ScriptedRunner::new();
        runner.fail("adb shell dmesg -T", 1, "permission denied");
        assert!(matches!(
            log_dmesg(&runner),
            Err(AtopError::CommandFailed { code: 1, .. })
        ));
    }
}
