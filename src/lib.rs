//! atop: accelerator activity monitor for Android devices.
//!
//! Scrapes the kernel ring buffer or logcat over `adb shell` and turns the
//! probe lines emitted by instrumented drivers into per-accelerator
//! interaction counts, cache maintenance counts and latency summaries. A
//! live terminal dashboard streams the interaction counts as a bar chart.
//!
//! The building blocks live in [`core`] (device access, log fetching,
//! benchmark driver) and [`logs`] (line grammar, classification, streaming,
//! statistics). The CLI and dashboard front-ends sit on top.

#[doc(hidden)]
pub mod boot;
#[doc(hidden)]
pub mod cli;
pub mod core;
pub mod logs;
pub mod tui;

pub use crate::cli::config::AtopConfig;
pub use crate::core::error::AtopError;
