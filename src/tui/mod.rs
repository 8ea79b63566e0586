pub mod chart;
pub mod mode;
pub mod source;
pub mod terminal;
pub mod ui;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};
use std::time::Duration;

use crate::{
    cli::config::AtopConfig,
    core::{fetch::RemoteLog, runner::CommandRunner},
    logs::stream::LogStreamer,
    tui::{
        mode::DisplayMode,
        source::{DataSource, InteractionSource, Panel},
        terminal::TerminalGuard,
        ui::DashboardView,
    },
};

/// Open the live dashboard on the real terminal and block until the user quits.
pub fn start<R: CommandRunner>(config: &AtopConfig, runner: R) -> Result<()> {
    log::info!("dashboard starting on {} log", config.source);

    let fetcher = RemoteLog::new(runner, config.source);
    let streamer = LogStreamer::new(fetcher, config.dashboard.stream_tags.clone())
        .context("initial log fetch failed")?;
    log::info!(
        "streaming {:?} lines, last seen {}",
        streamer.tags(),
        streamer.last_seen()
    );
    let mut source = InteractionSource::new(streamer);

    let mut guard = TerminalGuard::acquire()?;
    let res = run_dashboard(guard.terminal_mut(), &mut source, config, poll_key);

    log::info!("dashboard stopped");
    res
}

/// Wait up to `timeout` for a key press. Repeat and release events are dropped.
pub fn poll_key(timeout: Duration) -> Result<Option<KeyEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}

/// Frame loop: draw, then wait one tick for input.
///
/// `next_key` doubles as the frame sleep. A mode switch redraws right away
/// instead of waiting for the next tick.
pub fn run_dashboard<B, S, K>(
    terminal: &mut Terminal<B>,
    source: &mut S,
    config: &AtopConfig,
    mut next_key: K,
) -> Result<()>
where
    B: Backend,
    S: DataSource,
    K: FnMut(Duration) -> Result<Option<KeyEvent>>,
{
    let tick = config.tick();
    let mut mode = DisplayMode::default();

    loop {
        let panel = match source
            .generate(mode)
            .with_context(|| format!("failed to refresh {mode} view"))?
        {
            Panel::Bars(data) if mode == DisplayMode::Interaction => {
                Panel::Bars(data.zero_filled(&config.accelerators))
            }
            other => other,
        };
        let status = source.status();

        let view = DashboardView {
            mode,
            panel: &panel,
            status: &status,
            source: config.source,
            chart_width: config.dashboard.chart_width,
        };
        terminal.draw(|frame| ui::render_dashboard(frame, &view))?;

        let Some(key) = next_key(tick)? else {
            continue;
        };
        match mode.transition(&key) {
            Some(next) if next.is_terminal() => break,
            Some(next) => {
                log::debug!("display mode {mode} -> {next}");
                mode = next;
            }
            None => {}
        }
    }

    Ok(())
}
