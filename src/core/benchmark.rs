//! TFLite benchmark driver used to generate accelerator traffic.
//!
//! Runs `benchmark_model` on the device against randomly chosen models so
//! that the `--memory` and `--benchmark` reports have a known time window
//! to look at in the kernel log.

use anyhow::{Context, Result};
use chrono::TimeDelta;
use rand::{seq::IndexedRandom, Rng};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    path::Path,
    time::{Duration, Instant},
};

use crate::core::{error::AtopError, runner::CommandRunner};

pub const DEFAULT_BENCHMARK_BIN: &str = "/data/local/tmp/benchmark_model";

/// How to invoke the on-device benchmark binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkPlan {
    /// Absolute path of the benchmark binary on the device.
    pub binary: String,
    /// Flags passed to every process, already in `--name=value` form.
    pub options: Vec<String>,
    /// Number of concurrently scheduled benchmark processes.
    pub processes: usize,
}

impl Default for BenchmarkPlan {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BENCHMARK_BIN.to_string(),
            options: [
                "--num_threads=1",
                "--use_hexagon=true",
                "--warmup_runs=1",
                "--num_runs=1",
                "--hexagon_profiling=false",
                "--enable_op_profiling=false",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            processes: 1,
        }
    }
}

/// Outcome of one benchmark round.
#[derive(Debug, Clone)]
pub struct BenchmarkRun {
    pub models: Vec<String>,
    pub elapsed: Duration,
    pub output: String,
}

impl BenchmarkRun {
    /// Elapsed time rounded up to whole seconds, never below one.
    pub fn window_secs(&self) -> u64 {
        let secs = self.elapsed.as_secs_f64().ceil() as u64;
        secs.max(1)
    }

    /// The log window that covers this run.
    pub fn window(&self) -> TimeDelta {
        i64::try_from(self.window_secs())
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }
}

/// Parse a model list: one device path per line, `#` comments allowed.
pub fn parse_model_list(text: &str, origin: &str) -> Result<Vec<String>, AtopError> {
    let models: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if models.is_empty() {
        return Err(AtopError::EmptyModelList {
            path: origin.to_string(),
        });
    }
    Ok(models)
}

pub fn parse_model_cfg(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read model list {}", path.display()))?;
    Ok(parse_model_list(&text, &path.display().to_string())?)
}

/// Lay out the shell command that runs every model in the background and
/// waits for all of them.
pub fn build_command(plan: &BenchmarkPlan, models: &[String]) -> Vec<String> {
    let mut cmd = Vec::new();
    for model in models {
        cmd.push(plan.binary.clone());
        cmd.extend(plan.options.iter().cloned());
        cmd.push(format!("--graph={model}"));
        cmd.push("&".to_string());
    }
    cmd.push("wait".to_string());
    cmd
}

/// `ls <path>` on the device echoes the path back only when it exists.
pub fn exists_on_device<R: CommandRunner>(runner: &R, path: &str) -> bool {
    match runner.shell(&["ls", path]) {
        Ok(out) => out.lines().next().map(str::trim) == Some(path),
        Err(err) => {
            log::debug!("ls {path}: {err}");
            false
        }
    }
}

pub fn check_on_device<R: CommandRunner>(runner: &R, path: &str) -> Result<(), AtopError> {
    if exists_on_device(runner, path) {
        Ok(())
    } else {
        Err(AtopError::MissingOnDevice {
            path: path.to_string(),
        })
    }
}

/// Pick `count` models uniformly at random, with replacement.
pub fn pick_models<G: Rng + ?Sized>(pool: &[String], count: usize, rng: &mut G) -> Vec<String> {
    (0..count)
        .filter_map(|_| pool.choose(&mut *rng).cloned())
        .collect()
}

pub fn run_random<R, G>(
    runner: &R,
    plan: &BenchmarkPlan,
    pool: &[String],
    rng: &mut G,
) -> Result<BenchmarkRun>
where
    R: CommandRunner,
    G: Rng + ?Sized,
{
    if plan.processes == 0 {
        return Err(AtopError::Config {
            message: "benchmark needs at least one process".to_string(),
        }
        .into());
    }

    let models = pick_models(pool, plan.processes, rng);

    // The remote `wait` exits 0 even when every job failed to start.
    check_on_device(runner, &plan.binary)?;
    for model in models.iter().collect::<BTreeSet<_>>() {
        check_on_device(runner, model)?;
    }

    let cmd = build_command(plan, &models);
    log::info!("Running benchmark using: {}", cmd.join(" "));

    let args: Vec<&str> = cmd.iter().map(String::as_str).collect();
    let start = Instant::now();
    let output = runner.shell(&args).context("benchmark run failed")?;
    let elapsed = start.elapsed();
    log::debug!("benchmark finished in {:.3}s", elapsed.as_secs_f64());

    Ok(BenchmarkRun {
        models,
        elapsed,
        output,
    })
}
