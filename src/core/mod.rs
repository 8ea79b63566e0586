//! Device-facing plumbing for atop.
//!
//! Everything here talks to (or stands in for) the adb bridge:
//! - Remote command execution and its test double
//! - Device precondition checks
//! - Log fetching for dmesg / logcat
//! - The on-device benchmark driver
//!
//! Log text parsing lives in `crate::logs`; nothing in this module
//! interprets log lines.

pub mod benchmark;
pub mod device;
pub mod error;
pub mod fetch;
pub mod perf;
pub mod runner;
#[cfg(any(test, feature = "testing"))]
pub mod scripted;

pub use error::AtopError;
pub use fetch::{LogFetcher, LogSource, RemoteLog};
pub use runner::{AdbRunner, CommandRunner};
