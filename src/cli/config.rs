use anyhow::{Context, Result};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use crate::core::{benchmark::BenchmarkPlan, error::AtopError, fetch::LogSource};

pub const MIN_TICK_MS: u64 = 100;
pub const MAX_TICK_MS: u64 = 500;
pub const MAX_CHART_WIDTH: u16 = 512;

fn default_accelerators() -> Vec<String> {
    [
        // Qualcomm GPU (KGSL driver)
        "ardeno",
        "kgsl",
        // Camera pipeline and video codec (V4L2)
        "vidioc",
        "v4l2",
        // IP accelerator
        "IPA",
        // Hexagon DSPs
        "aDSP",
        "cDSP",
        // Inline crypto engine
        "ICE",
        "Others",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Dashboard refresh and layout settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Frame cadence in milliseconds, clamped to 100..=500
    pub tick_ms: u64,
    /// Columns available to the longest bar, at most 512
    pub chart_width: u16,
    /// Tags whose lines are streamed into the interaction chart
    pub stream_tags: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_ms: 250,
            chart_width: 64,
            stream_tags: vec!["IOCTL".to_string()],
        }
    }
}

/// Probe tags emitted by the instrumented drivers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeTags {
    /// Cache flush and invalidate lines
    pub cache: String,
    /// Accelerator ioctl lines
    pub ioctl: String,
    /// Execution and ioctl latency lines
    pub timing: String,
}

impl Default for ProbeTags {
    fn default() -> Self {
        Self {
            cache: "DEBUG".to_string(),
            ioctl: "IOCTL".to_string(),
            timing: "TIME".to_string(),
        }
    }
}

impl ProbeTags {
    /// Every tag, for classifying a log in one pass.
    pub fn all(&self) -> [&str; 3] {
        [
            self.cache.as_str(),
            self.ioctl.as_str(),
            self.timing.as_str(),
        ]
    }
}

/// Time windows (seconds) for the one-shot reports
///
/// An unset interaction or flush window follows the benchmark run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flush_secs: Option<u64>,
    pub timing_secs: u64,
    /// Largest timing samples dropped from each series before summing
    pub discard_largest: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            interaction_secs: None,
            flush_secs: None,
            timing_secs: 5,
            discard_largest: 0,
        }
    }
}

/// Root configuration passed to every component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtopConfig {
    pub debug: bool,
    pub verbose: bool,
    /// Bridge tool used to reach the device
    pub adb: String,
    pub source: LogSource,
    /// Known accelerators, in the order the dashboard lists them
    pub accelerators: Vec<String>,
    /// Probe tags recognised by the log classifier
    pub probes: ProbeTags,
    /// Model list consumed by the benchmark driver
    pub models: PathBuf,
    pub dashboard: DashboardConfig,
    pub windows: WindowConfig,
    pub benchmark: BenchmarkPlan,
}

impl Default for AtopConfig {
    fn default() -> Self {
        Self {
            debug: false,
            verbose: false,
            adb: "adb".to_string(),
            source: LogSource::Dmesg,
            accelerators: default_accelerators(),
            probes: ProbeTags::default(),
            models: PathBuf::from("models.cfg"),
            dashboard: DashboardConfig::default(),
            windows: WindowConfig::default(),
            benchmark: BenchmarkPlan::default(),
        }
    }
}

fn seconds(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

impl AtopConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml(text: &str) -> Result<Self, AtopError> {
        let config: AtopConfig = toml::from_str(text).map_err(|err| AtopError::Config {
            message: err.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to a TOML string
    pub fn to_toml(&self) -> Result<String, AtopError> {
        toml::to_string_pretty(self).map_err(|err| AtopError::Config {
            message: err.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = Self::from_toml(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AtopError> {
        if self.accelerators.is_empty() {
            return Err(AtopError::Config {
                message: "accelerator list must not be empty".to_string(),
            });
        }
        if self.dashboard.stream_tags.is_empty() {
            return Err(AtopError::Config {
                message: "dashboard.stream_tags must not be empty".to_string(),
            });
        }
        if self.dashboard.chart_width == 0 || self.dashboard.chart_width > MAX_CHART_WIDTH {
            return Err(AtopError::Config {
                message: format!("dashboard.chart_width must be within 1..={MAX_CHART_WIDTH}"),
            });
        }
        let tags = self.probes.all();
        if tags.iter().any(|tag| tag.is_empty()) {
            return Err(AtopError::Config {
                message: "probe tags must not be empty".to_string(),
            });
        }
        if tags[0] == tags[1] || tags[0] == tags[2] || tags[1] == tags[2] {
            return Err(AtopError::Config {
                message: format!("probe tags must be distinct, got {tags:?}"),
            });
        }
        if self.benchmark.processes == 0 {
            return Err(AtopError::Config {
                message: "benchmark.processes must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Frame cadence, clamped to the supported range.
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.dashboard.tick_ms.clamp(MIN_TICK_MS, MAX_TICK_MS))
    }

    /// Interaction window, or `run` when none is configured.
    pub fn interaction_window(&self, run: TimeDelta) -> TimeDelta {
        self.windows.interaction_secs.map(seconds).unwrap_or(run)
    }

    /// Flush window, or `run` when none is configured.
    pub fn flush_window(&self, run: TimeDelta) -> TimeDelta {
        self.windows.flush_secs.map(seconds).unwrap_or(run)
    }

    pub fn timing_window(&self) -> TimeDelta {
        seconds(self.windows.timing_secs)
    }
}
