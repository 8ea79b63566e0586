//! Aggregations over already-fetched log lines.

use chrono::TimeDelta;
use std::collections::BTreeMap;

use crate::logs::line::{
    extract_accelerator, extract_pid, extract_seconds, extract_timestamp, timing_kind, TimingKind,
};

/// Accelerator name → number of IOCTL events seen for it.
pub type AcceleratorCounts = BTreeMap<String, u64>;

/// Count `IOCTL <name>:` events per accelerator.
///
/// Accelerators without events are absent from the result; zero-filling
/// against a known accelerator list is the caller's business.
pub fn count_interactions<I, S>(lines: I) -> AcceleratorCounts
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts = AcceleratorCounts::new();
    for line in lines {
        if let Some(name) = extract_accelerator(line.as_ref()) {
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

/// Lines stamped no earlier than `window` before the most recent line.
///
/// The most recent line is the last line that carries a timestamp; lines
/// without one are left out.
pub fn in_window<S: AsRef<str>>(lines: &[S], window: TimeDelta) -> Vec<&str> {
    let Some(most_recent) = lines
        .iter()
        .rev()
        .find_map(|line| extract_timestamp(line.as_ref()))
    else {
        return Vec::new();
    };
    let start = most_recent.saturating_sub(window);

    lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| matches!(extract_timestamp(line), Some(ts) if ts >= start))
        .collect()
}

pub fn interactions_in_window<S: AsRef<str>>(lines: &[S], window: TimeDelta) -> AcceleratorCounts {
    count_interactions(in_window(lines, window))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushCounts {
    pub flush: u64,
    pub invalidate: u64,
}

/// Cache flushes and invalidations inside the window.
pub fn flush_counts<S: AsRef<str>>(lines: &[S], window: TimeDelta) -> FlushCounts {
    let mut counts = FlushCounts::default();
    for line in in_window(lines, window) {
        if line.contains("flushing cache") {
            counts.flush += 1;
        } else if line.contains("invalidate cache") {
            counts.invalidate += 1;
        }
    }
    log::debug!(
        "# of flushes: {}, # of invalidations: {}",
        counts.flush,
        counts.invalidate
    );
    counts
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PidTiming {
    pub execution: f64,
    pub ioctl: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingSummary {
    pub execution_total: f64,
    pub ioctl_total: f64,
    pub execution_samples: usize,
    pub ioctl_samples: usize,
    pub per_pid: BTreeMap<u32, PidTiming>,
}

fn total_without_largest(mut samples: Vec<f64>, discard_largest: usize) -> (f64, usize) {
    samples.sort_by(|a, b| b.total_cmp(a));
    let kept = samples.get(discard_largest..).unwrap_or(&[]);
    (kept.iter().sum(), kept.len())
}

/// Execution and ioctl latency totals from `TIME` lines in the window.
///
/// `discard_largest` drops that many of the biggest samples from each
/// series' total. Per-pid totals always include every sample.
pub fn timing_summary<S: AsRef<str>>(
    lines: &[S],
    window: TimeDelta,
    discard_largest: usize,
) -> TimingSummary {
    let mut execution = Vec::new();
    let mut ioctl = Vec::new();
    let mut per_pid: BTreeMap<u32, PidTiming> = BTreeMap::new();

    for line in in_window(lines, window) {
        let Some(kind) = timing_kind(line) else {
            continue;
        };
        let Some(seconds) = extract_seconds(line) else {
            log::warn!("timing line without a trailing value: {line}");
            continue;
        };

        let pid = extract_pid(line).map(|pid| per_pid.entry(pid).or_default());
        match kind {
            TimingKind::Execution => {
                execution.push(seconds);
                if let Some(entry) = pid {
                    entry.execution += seconds;
                }
            }
            TimingKind::Ioctl => {
                ioctl.push(seconds);
                if let Some(entry) = pid {
                    entry.ioctl += seconds;
                }
            }
        }
    }

    let (execution_total, execution_samples) = total_without_largest(execution, discard_largest);
    let (ioctl_total, ioctl_samples) = total_without_largest(ioctl, discard_largest);

    for (pid, timing) in &per_pid {
        log::debug!("{pid}, {}, {}", timing.execution, timing.ioctl);
    }

    TimingSummary {
        execution_total,
        ioctl_total,
        execution_samples,
        ioctl_samples,
        per_pid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_interactions() {
        let lines = [
            "... IOCTL aDSP: foo",
            "... IOCTL aDSP: bar",
            "... IOCTL IPA: baz",
            "... nothing to see",
        ];
        let counts = count_interactions(lines);
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["aDSP"], 2);
        assert_eq!(counts["IPA"], 1);
    }

    #[test]
    fn test_window_is_relative_to_latest_line() {
        let lines = vec![
            "[Wed May 13 23:22:00 2020] IOCTL aDSP: old",
            "[Wed May 13 23:23:00 2020] IOCTL kgsl: edge",
            "[Wed May 13 23:23:20 2020] IOCTL IPA: new",
        ];
        let counts = interactions_in_window(&lines, TimeDelta::seconds(20));
        assert_eq!(counts.get("aDSP"), None);
        assert_eq!(counts["kgsl"], 1);
        assert_eq!(counts["IPA"], 1);
        assert!(in_window::<&str>(&[], TimeDelta::seconds(5)).is_empty());
    }

    #[test]
    fn test_flush_counts() {
        let lines = vec![
            "[Wed May 13 23:00:00 2020] DEBUG flushing cache",
            "[Wed May 13 23:23:00 2020] DEBUG flushing cache",
            "[Wed May 13 23:23:01 2020] DEBUG invalidate cache",
            "[Wed May 13 23:23:02 2020] DEBUG flushing cache",
        ];
        let counts = flush_counts(&lines, TimeDelta::seconds(20));
        assert_eq!(
            counts,
            FlushCounts {
                flush: 2,
                invalidate: 1
            }
        );
        assert_eq!(
            flush_counts::<&str>(&[], TimeDelta::seconds(20)),
            FlushCounts::default()
        );
    }

    #[test]
    fn test_timing_summary_totals_and_pids() {
        let lines = vec![
            "[Wed May 13 23:23:00 2020] TIME (pid: 1) (execution) 0.5",
            "[Wed May 13 23:23:00 2020] TIME (pid: 1) (ioctl) 0.75",
            "[Wed May 13 23:23:01 2020] TIME (pid: 2) (execution) 2.0",
            "[Wed May 13 23:23:01 2020] TIME (pid: 2) (ioctl) 2.5",
        ];
        let summary = timing_summary(&lines, TimeDelta::seconds(5), 0);
        assert_eq!(summary.execution_total, 2.5);
        assert_eq!(summary.ioctl_total, 3.25);
        assert_eq!(summary.execution_samples, 2);
        assert_eq!(summary.per_pid[&1].execution, 0.5);
        assert_eq!(summary.per_pid[&2].ioctl, 2.5);
    }

    #[test]
    fn test_timing_summary_discards_largest() {
        let lines = vec![
            "[Wed May 13 23:23:00 2020] TIME (pid: 1) (execution) 0.5",
            "[Wed May 13 23:23:00 2020] TIME (pid: 1) (execution) 9.0",
            "[Wed May 13 23:23:01 2020] TIME (pid: 1) (ioctl) 1.0",
        ];
        let summary = timing_summary(&lines, TimeDelta::seconds(5), 1);
        assert_eq!(summary.execution_total, 0.5);
        assert_eq!(summary.execution_samples, 1);
        assert_eq!(summary.ioctl_total, 0.0);
        assert_eq!(summary.ioctl_samples, 0);
        assert_eq!(summary.per_pid[&1].execution, 9.5);
    }

    #[test]
    fn test_timing_summary_skips_non_finite_samples() {
        let lines = vec![
            "[Wed May 13 23:23:00 2020] TIME (pid: 1) (execution) inf",
            "[Wed May 13 23:23:00 2020] TIME (pid: 1) (execution) 0.5",
            "[Wed May 13 23:23:01 2020] TIME (pid: 1) (ioctl) NaN",
        ];
        let summary = timing_summary(&lines, TimeDelta::seconds(5), 0);
        assert_eq!(summary.execution_total, 0.5);
        assert_eq!(summary.execution_samples, 1);
        assert_eq!(summary.ioctl_samples, 0);
        assert_eq!(summary.per_pid[&1].execution, 0.5);
        assert_eq!(summary.per_pid[&1].ioctl, 0.0);
    }
}
