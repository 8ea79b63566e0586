use crate::{
    core::{error::AtopError, fetch::LogFetcher},
    logs::{
        classify::filter_lines,
        line::{extract_timestamp, Timestamp},
    },
};

/// High-water mark plus the lines returned by the latest poll.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StreamState {
    last_seen: Timestamp,
    pending: Vec<String>,
}

/// Turns repeated full-log fetches into a stream of only the new lines.
///
/// The device offers no incremental query, so every poll pulls the whole
/// buffer again and keeps the lines stamped after `last_seen`. If the ring
/// buffer is rotated and older stamps come back, polls stay empty until the
/// device clock passes the old mark again.
pub struct LogStreamer<F> {
    fetcher: F,
    tags: Vec<String>,
    state: StreamState,
}

impl<F: LogFetcher> LogStreamer<F> {
    pub fn new(fetcher: F, tags: Vec<String>) -> Result<Self, AtopError> {
        let pending = filter_lines(&fetcher.fetch()?, &tags);
        let last_seen = pending
            .iter()
            .rev()
            .find_map(|line| extract_timestamp(line))
            .unwrap_or(Timestamp::BEGINNING);
        log::debug!(
            "log streamer primed with {} lines, last seen {last_seen}",
            pending.len()
        );

        Ok(Self {
            fetcher,
            tags,
            state: StreamState { last_seen, pending },
        })
    }

    /// Fetch again and return the lines newer than the previous poll,
    /// newest first.
    pub fn poll(&mut self) -> Result<&[String], AtopError> {
        let lines = filter_lines(&self.fetcher.fetch()?, &self.tags);
        let last_seen = self.state.last_seen;

        let mut newest = last_seen;
        let mut fresh = Vec::new();
        for line in lines.into_iter().rev() {
            match extract_timestamp(&line) {
                Some(ts) if ts > last_seen => {
                    newest = newest.max(ts);
                    fresh.push(line);
                }
                Some(_) => {}
                None => log::debug!("skipping line without timestamp: {line}"),
            }
        }

        if !fresh.is_empty() {
            log::debug!("{} new lines, last seen {last_seen} -> {newest}", fresh.len());
        }
        self.state.last_seen = newest;
        self.state.pending = fresh;
        Ok(&self.state.pending)
    }

    pub fn last_seen(&self) -> Timestamp {
        self.state.last_seen
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}
