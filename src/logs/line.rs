//! Device log line grammar.
//!
//! ```text
//! line      := stamp " " message
//! stamp     := "[" weekday month day HH:MM:SS year "]"     (dmesg -T)
//!            | "[" seconds "." micros "]"                   (plain dmesg)
//!            | YYYY-MM-DD " " HH:MM:SS.mmm                  (logcat -v year)
//! message   := text that may embed
//!              "(pid: N)"          owning process
//!              "IOCTL NAME:"       accelerator the driver talked to
//!              "(execution ...)"   execution timing sample
//!              "(ioctl ...)"       ioctl timing sample
//!              ... trailing decimal seconds on TIME lines
//! ```
//!
//! Lines are never turned into records; each query re-extracts the piece it
//! needs.

use chrono::{DateTime, NaiveDateTime, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static BRACKET_STAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\[([^\]]*)\]").expect("valid bracket regex"));
static BOOT_SECONDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\.(\d+)\s*$").expect("valid boot seconds regex"));
static LOGCAT_STAMP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3})").expect("valid logcat regex")
});
static PID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\(pid:\s*(\d+)\s*\)").expect("valid pid regex"));
static ACCELERATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)IOCTL ([A-Za-z0-9]+):").expect("valid accelerator regex"));

const WALL_FORMAT: &str = "%a %b %d %H:%M:%S %Y";
const LOGCAT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Point in device time a log line was emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Sorts before every real timestamp.
    pub const BEGINNING: Timestamp = Timestamp(NaiveDateTime::MIN);

    pub fn new(at: NaiveDateTime) -> Self {
        Self(at)
    }

    pub fn as_naive(&self) -> NaiveDateTime {
        self.0
    }

    /// `self - window`, saturating at [`Timestamp::BEGINNING`].
    pub fn saturating_sub(self, window: TimeDelta) -> Timestamp {
        self.0
            .checked_sub_signed(window)
            .map(Timestamp)
            .unwrap_or(Timestamp::BEGINNING)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Timestamp::BEGINNING {
            write!(f, "beginning of time")
        } else {
            write!(f, "{}", self.0.format("%a %b %e %H:%M:%S %Y"))
        }
    }
}

/// Timing sample kind carried by `TIME` probe lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimingKind {
    Execution,
    Ioctl,
}

/// Extract the leading timestamp of a line, if it has one.
pub fn extract_timestamp(line: &str) -> Option<Timestamp> {
    if let Some(caps) = BRACKET_STAMP.captures(line) {
        let inner = caps.get(1)?.as_str();
        return parse_bracket(inner);
    }

    let caps = LOGCAT_STAMP.captures(line)?;
    let stamp = caps.get(1)?.as_str().split_whitespace().collect::<Vec<_>>();
    NaiveDateTime::parse_from_str(&stamp.join(" "), LOGCAT_FORMAT)
        .ok()
        .map(Timestamp)
}

fn parse_bracket(inner: &str) -> Option<Timestamp> {
    if let Some(caps) = BOOT_SECONDS.captures(inner) {
        // Seconds since boot, anchored at the epoch so they stay comparable.
        let secs: i64 = caps.get(1)?.as_str().parse().ok()?;
        let frac = caps.get(2)?.as_str();
        let digits = frac.len().min(9);
        let nanos: u32 = frac[..digits].parse::<u32>().ok()? * 10u32.pow((9 - digits) as u32);
        return DateTime::from_timestamp(secs, nanos).map(|at| Timestamp(at.naive_utc()));
    }

    let normalized = inner.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&normalized, WALL_FORMAT)
        .ok()
        .map(Timestamp)
}

/// `(pid: 1234)` → `1234`.
pub fn extract_pid(line: &str) -> Option<u32> {
    PID.captures(line)?.get(1)?.as_str().parse().ok()
}

/// `IOCTL aDSP: ...` → `aDSP`.
pub fn extract_accelerator(line: &str) -> Option<&str> {
    ACCELERATOR
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn timing_kind(line: &str) -> Option<TimingKind> {
    if line.contains("(execution") {
        Some(TimingKind::Execution)
    } else if line.contains("(ioctl") {
        Some(TimingKind::Ioctl)
    } else {
        None
    }
}

/// Trailing decimal seconds of a `TIME` line.
pub fn extract_seconds(line: &str) -> Option<f64> {
    line.split_whitespace()
        .last()?
        .parse()
        .ok()
        .filter(|secs: &f64| secs.is_finite())
}
