pub mod actions;
pub mod config;

use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use crate::core::fetch::LogSource;
use config::AtopConfig;

const RUN_MODES: [&str; 4] = ["gui", "memory", "benchmark", "timing"];

/// What the process does after the device checks pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// No run flag given: verify the device and exit.
    Check,
    Dashboard,
    Memory,
    Benchmark,
    Timing,
}

impl RunMode {
    pub fn from_matches(matches: &ArgMatches) -> Self {
        if matches.get_flag("gui") {
            RunMode::Dashboard
        } else if matches.get_flag("memory") {
            RunMode::Memory
        } else if matches.get_flag("benchmark") {
            RunMode::Benchmark
        } else if matches.get_flag("timing") {
            RunMode::Timing
        } else {
            RunMode::Check
        }
    }
}

fn run_flag(id: &'static str, help: &'static str) -> Arg {
    let others: Vec<&str> = RUN_MODES.iter().copied().filter(|m| *m != id).collect();
    Arg::new(id)
        .long(id)
        .help(help)
        .action(ArgAction::SetTrue)
        .conflicts_with_all(others)
}

/// Command line definition, kept separate from parsing so tests can feed it.
pub fn command() -> Command {
    Command::new("atop")
        .about("Answers all your questions about OS-accelerator interactions")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(run_flag(
            "gui",
            "Show an htop-style live view of accelerator interactions",
        ))
        .arg(run_flag(
            "memory",
            "Run a benchmark and count cache flushes and invalidations",
        ))
        .arg(run_flag(
            "benchmark",
            "Run a benchmark and count accelerator interactions",
        ))
        .arg(run_flag(
            "timing",
            "Summarise execution and ioctl latency from TIME probes",
        ))
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("models")
                .long("models")
                .help("Model list for benchmark runs, one path per line [default: ./models.cfg]")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .help("Device log to read")
                .value_name("SOURCE")
                .value_parser(["dmesg", "logcat"]),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .help("Dashboard refresh interval, 100 to 500 ms")
                .value_name("MS")
                .value_parser(clap::value_parser!(u64).range(100..=500)),
        )
        .arg(
            Arg::new("processes")
                .long("processes")
                .help("Concurrent benchmark processes")
                .value_name("N")
                .value_parser(clap::value_parser!(usize)),
        )
}

/// Parse command line arguments and return ArgMatches.
pub fn parse_args() -> ArgMatches {
    command().get_matches()
}

/// Load the config file if one was given, then apply flag overrides.
pub fn load_config(matches: &ArgMatches) -> Result<AtopConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => AtopConfig::load(path)?,
        None => AtopConfig::default(),
    };

    if matches.get_flag("debug") {
        config.debug = true;
    }
    if matches.get_flag("verbose") {
        config.verbose = true;
    }
    if let Some(path) = matches.get_one::<PathBuf>("models") {
        config.models = path.clone();
    }
    if let Some(source) = matches.get_one::<String>("source") {
        config.source = source.parse::<LogSource>()?;
    }
    if let Some(ms) = matches.get_one::<u64>("interval-ms") {
        config.dashboard.tick_ms = *ms;
    }
    if let Some(n) = matches.get_one::<usize>("processes") {
        config.benchmark.processes = *n;
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(args: &[&str]) -> ArgMatches {
        command()
            .try_get_matches_from(std::iter::once("atop").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_run_mode_selection() {
        assert_eq!(RunMode::from_matches(&matches(&[])), RunMode::Check);
        assert_eq!(RunMode::from_matches(&matches(&["--gui"])), RunMode::Dashboard);
        assert_eq!(RunMode::from_matches(&matches(&["--memory"])), RunMode::Memory);
        assert_eq!(
            RunMode::from_matches(&matches(&["--benchmark", "--debug"])),
            RunMode::Benchmark
        );
        assert_eq!(RunMode::from_matches(&matches(&["--timing"])), RunMode::Timing);
    }

    #[test]
    fn test_run_modes_are_exclusive() {
        let res = command().try_get_matches_from(["atop", "--gui", "--memory"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = load_config(&matches(&[
            "--debug",
            "--source",
            "logcat",
            "--interval-ms",
            "400",
            "--processes",
            "3",
            "--models",
            "/tmp/models.cfg",
        ]))
        .unwrap();

        assert!(config.debug);
        assert!(!config.verbose);
        assert_eq!(config.source, LogSource::Logcat);
        assert_eq!(config.dashboard.tick_ms, 400);
        assert_eq!(config.benchmark.processes, 3);
        assert_eq!(config.models, PathBuf::from("/tmp/models.cfg"));
    }

    #[test]
    fn test_out_of_range_interval_is_rejected() {
        assert!(command()
            .try_get_matches_from(["atop", "--interval-ms", "50"])
            .is_err());
        assert!(command()
            .try_get_matches_from(["atop", "--source", "syslog"])
            .is_err());
    }

    #[test]
    fn test_zero_processes_fails_validation() {
        assert!(load_config(&matches(&["--processes", "0"])).is_err());
    }
}
