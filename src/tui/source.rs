use chrono::{DateTime, Local};

use crate::{
    core::{error::AtopError, fetch::LogFetcher, perf::perf},
    logs::{stats::count_interactions, stream::LogStreamer},
    tui::{chart::ChartData, mode::DisplayMode},
};

/// What a mode produced for the current frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Panel {
    Bars(ChartData),
    Notice(String),
}

/// Bookkeeping shown in the dashboard status line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceStatus {
    pub new_lines: usize,
    pub last_poll: Option<DateTime<Local>>,
}

/// Per-frame data callback of the dashboard.
pub trait DataSource {
    fn generate(&mut self, mode: DisplayMode) -> Result<Panel, AtopError>;

    fn status(&self) -> SourceStatus {
        SourceStatus::default()
    }
}

/// Streams new IOCTL lines and counts them per accelerator.
pub struct InteractionSource<F> {
    streamer: LogStreamer<F>,
    status: SourceStatus,
}

impl<F: LogFetcher> InteractionSource<F> {
    pub fn new(streamer: LogStreamer<F>) -> Self {
        Self {
            streamer,
            status: SourceStatus::default(),
        }
    }

    fn interactions(&mut self) -> Result<ChartData, AtopError> {
        let fresh = self.streamer.poll()?;
        self.status = SourceStatus {
            new_lines: fresh.len(),
            last_poll: Some(Local::now()),
        };
        Ok(ChartData::from_counts(&count_interactions(fresh)))
    }
}

impl<F: LogFetcher> DataSource for InteractionSource<F> {
    fn generate(&mut self, mode: DisplayMode) -> Result<Panel, AtopError> {
        match mode {
            DisplayMode::Interaction => self.interactions().map(Panel::Bars),
            DisplayMode::Timing => Ok(Panel::Notice(
                "Timing view is not wired to a data source yet".to_string(),
            )),
            DisplayMode::RawLog => Ok(Panel::Notice(
                "Raw log view is not wired to a data source yet".to_string(),
            )),
            DisplayMode::PerfCounters => match perf("all") {
                Ok(counts) => Ok(Panel::Bars(ChartData::from_counts(&counts))),
                Err(err) => Ok(Panel::Notice(err.to_string())),
            },
            DisplayMode::Exit => Ok(Panel::Notice(String::new())),
        }
    }

    fn status(&self) -> SourceStatus {
        self.status.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn test_interaction_counts_only_new_lines() {
        let log = Rc::new(RefCell::new(
            "[Wed May 13 23:23:08 2020] IOCTL aDSP: a".to_string(),
        ));
        let handle = Rc::clone(&log);
        let fetch = move || -> Result<String, AtopError> { Ok(handle.borrow().clone()) };
        let streamer = LogStreamer::new(fetch, vec!["IOCTL".to_string()]).unwrap();
        let mut source = InteractionSource::new(streamer);

        assert_eq!(
            source.generate(DisplayMode::Interaction).unwrap(),
            Panel::Bars(ChartData::default())
        );

        log.borrow_mut().push_str(
            "\n[Wed May 13 23:23:09 2020] IOCTL aDSP: b\n[Wed May 13 23:23:09 2020] IOCTL IPA: c",
        );
        match source.generate(DisplayMode::Interaction).unwrap() {
            Panel::Bars(data) => {
                assert_eq!(data.value_of("aDSP"), Some(1));
                assert_eq!(data.value_of("IPA"), Some(1));
            }
            other => panic!("unexpected panel: {other:?}"),
        }
        assert_eq!(source.status().new_lines, 2);
        assert!(source.status().last_poll.is_some());
    }

    #[test]
    fn test_placeholder_modes_do_not_poll() {
        let calls = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&calls);
        let fetch = move || -> Result<String, AtopError> {
            *counter.borrow_mut() += 1;
            Ok(String::new())
        };
        let streamer = LogStreamer::new(fetch, vec!["IOCTL".to_string()]).unwrap();
        let mut source = InteractionSource::new(streamer);

        assert!(matches!(
            source.generate(DisplayMode::Timing).unwrap(),
            Panel::Notice(_)
        ));
        match source.generate(DisplayMode::PerfCounters).unwrap() {
            Panel::Notice(text) => assert!(text.contains("not implemented")),
            other => panic!("unexpected panel: {other:?}"),
        }
        assert_eq!(*calls.borrow(), 1);
    }
}
