use anyhow::{Context, Result};
use rand::Rng;
use std::fmt::Write as _;

use crate::{
    cli::{config::AtopConfig, RunMode},
    core::{
        benchmark::{self, BenchmarkRun},
        device,
        fetch::{LogFetcher, RemoteLog},
        runner::{AdbRunner, CommandRunner},
    },
    logs::{
        classify::classify,
        stats::{flush_counts, interactions_in_window, timing_summary, FlushCounts, TimingSummary},
        AcceleratorCounts,
    },
    tui,
};

/// Verify the device, then carry out `mode` against it.
pub fn run(mode: RunMode, config: &AtopConfig) -> Result<()> {
    let runner = AdbRunner::new(config.adb.clone());
    let device = device::check_reqs(&runner, runner.adb())?;
    log::info!("using device {} for {mode:?}", device.serial);

    match mode {
        RunMode::Check => {
            println!("device {} is ready", device.serial);
        }
        RunMode::Dashboard => tui::start(config, runner)?,
        RunMode::Memory => {
            let (run, counts) = memory_report(&runner, config, &mut rand::rng())?;
            print!("{}", format_flush_report(&run, &counts));
        }
        RunMode::Benchmark => {
            let (run, counts) = benchmark_report(&runner, config, &mut rand::rng())?;
            print!("{}", format_interaction_report(&run, &counts));
        }
        RunMode::Timing => {
            let summary = timing_report(&runner, config)?;
            print!("{}", format_timing_report(&summary, config.windows.timing_secs));
        }
    }
    Ok(())
}

fn fetch_log<R: CommandRunner>(runner: &R, config: &AtopConfig) -> Result<String> {
    let fetcher = RemoteLog::new(runner, config.source);
    let log = fetcher
        .fetch()
        .with_context(|| format!("failed to read {} log", fetcher.source()))?;
    Ok(log)
}

/// Lines carrying `tag`, classified against every configured probe.
fn probe_lines(log: &str, config: &AtopConfig, tag: &str) -> Vec<String> {
    classify(log, &config.probes.all())
        .remove(tag)
        .unwrap_or_default()
}

fn bench<R, G>(runner: &R, config: &AtopConfig, rng: &mut G) -> Result<BenchmarkRun>
where
    R: CommandRunner,
    G: Rng + ?Sized,
{
    let pool = benchmark::parse_model_cfg(&config.models)?;
    let run = benchmark::run_random(runner, &config.benchmark, &pool, rng)?;
    log::info!(
        "benchmark took {:.3}s, looking at the last {}s of log",
        run.elapsed.as_secs_f64(),
        run.window_secs()
    );
    Ok(run)
}

/// Run one benchmark round, then count cache maintenance inside its window.
pub fn memory_report<R, G>(
    runner: &R,
    config: &AtopConfig,
    rng: &mut G,
) -> Result<(BenchmarkRun, FlushCounts)>
where
    R: CommandRunner,
    G: Rng + ?Sized,
{
    let run = bench(runner, config, rng)?;
    let log = fetch_log(runner, config)?;
    let window = config.flush_window(run.window());
    let counts = flush_counts(&probe_lines(&log, config, &config.probes.cache), window);
    Ok((run, counts))
}

/// Run one benchmark round, then count accelerator interactions inside its window.
pub fn benchmark_report<R, G>(
    runner: &R,
    config: &AtopConfig,
    rng: &mut G,
) -> Result<(BenchmarkRun, AcceleratorCounts)>
where
    R: CommandRunner,
    G: Rng + ?Sized,
{
    let run = bench(runner, config, rng)?;
    let log = fetch_log(runner, config)?;
    let lines = probe_lines(&log, config, &config.probes.ioctl);
    log::debug!("{} {} lines in log", lines.len(), config.probes.ioctl);
    let counts = interactions_in_window(&lines, config.interaction_window(run.window()));
    Ok((run, counts))
}

/// Summarise the timing probes of the configured window. No benchmark is run.
pub fn timing_report<R: CommandRunner>(runner: &R, config: &AtopConfig) -> Result<TimingSummary> {
    let log = fetch_log(runner, config)?;
    Ok(timing_summary(
        &probe_lines(&log, config, &config.probes.timing),
        config.timing_window(),
        config.windows.discard_largest,
    ))
}

pub fn format_flush_report(run: &BenchmarkRun, counts: &FlushCounts) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "window: {}s", run.window_secs());
    let _ = writeln!(out, "flushes: {}", counts.flush);
    let _ = writeln!(out, "invalidations: {}", counts.invalidate);
    out
}

pub fn format_interaction_report(run: &BenchmarkRun, counts: &AcceleratorCounts) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "window: {}s", run.window_secs());
    if counts.is_empty() {
        let _ = writeln!(out, "no accelerator interactions");
    }
    for (name, count) in counts {
        let _ = writeln!(out, "{name}: {count}");
    }
    out
}

pub fn format_timing_report(summary: &TimingSummary, window_secs: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "window: {window_secs}s");
    let _ = writeln!(
        out,
        "execution: {:.6}s over {} samples",
        summary.execution_total, summary.execution_samples
    );
    let _ = writeln!(
        out,
        "ioctl: {:.6}s over {} samples",
        summary.ioctl_total, summary.ioctl_samples
    );
    for (pid, timing) in &summary.per_pid {
        let _ = writeln!(
            out,
            "pid {pid}: execution {:.6}s, ioctl {:.6}s",
            timing.execution, timing.ioctl
        );
    }
    out
}
