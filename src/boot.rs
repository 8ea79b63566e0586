use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::io::{self, Write};

use crate::cli::config::AtopConfig;

/// Level picked from the flags; `RUST_LOG` can still override it.
pub fn level_for(config: &AtopConfig) -> LevelFilter {
    if config.debug {
        LevelFilter::Debug
    } else if config.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

/// Where logs go while the dashboard owns the screen.
///
/// `ATOP_LOG_FILE` wins; debug builds fall back to a timestamped file in the
/// working directory. `None` means logging stays off.
pub fn dashboard_log_file() -> Option<String> {
    std::env::var("ATOP_LOG_FILE").ok().or_else(|| {
        #[cfg(debug_assertions)]
        {
            Some(format!("./atop_{}.log", Local::now().format("%Y%m%d%H%M%S")))
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Install the global logger.
///
/// One-shot reports log to stderr. The dashboard draws on the alternate
/// screen, so there logs go to a file or nowhere.
pub fn init_logger(config: &AtopConfig, dashboard: bool) {
    let level = level_for(config);

    if !dashboard {
        Builder::new()
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} [{}] {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.args()
                )
            })
            .target(Target::Stderr)
            .filter_level(level)
            .parse_default_env()
            .init();
        return;
    }

    match dashboard_log_file() {
        Some(path) => {
            if let Err(err) = init_file_logger(&path, level) {
                eprintln!("Failed to initialize file logger at '{path}': {err}");
                log::set_max_level(LevelFilter::Off);
            }
        }
        None => log::set_max_level(LevelFilter::Off),
    }
}

fn init_file_logger(path: &str, level: LevelFilter) -> io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{} {} [{}] - {}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.level(),
                record.args()
            )
        })
        .target(Target::Pipe(Box::new(file)))
        .filter_level(level)
        .parse_default_env()
        .init();

    log::info!("File logger initialized at {path}");

    Ok(())
}
