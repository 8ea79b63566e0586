use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    core::fetch::LogSource,
    tui::{
        chart::{bar_lengths, ChartData},
        mode::DisplayMode,
        source::{Panel, SourceStatus},
    },
};

const BAR_TICK: &str = "#";
const LABEL_SEPARATOR: &str = "| ";

/// Everything one frame needs; borrowed from the loop's state.
pub struct DashboardView<'a> {
    pub mode: DisplayMode,
    pub panel: &'a Panel,
    pub status: &'a SourceStatus,
    pub source: LogSource,
    /// Columns the longest bar may take.
    pub chart_width: u16,
}

pub fn render_dashboard(frame: &mut Frame, view: &DashboardView<'_>) {
    let area = frame.area();

    let body_rows = match view.panel {
        Panel::Bars(data) => u16::try_from(data.labels.len().max(1)).unwrap_or(u16::MAX),
        Panel::Notice(_) => 1,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),             // mode selector
            Constraint::Length(body_rows.saturating_add(2)), // chart window incl. borders
            Constraint::Length(1),             // status
            Constraint::Length(1),             // hints
            Constraint::Min(0),
        ])
        .split(area);

    render_mode_selector(frame, chunks[0], view.mode);

    let window = chart_window(chunks[1], view);
    frame.render_widget(Clear, window);
    match view.panel {
        Panel::Bars(data) => render_bars(frame, window, view.mode, data, view.chart_width),
        Panel::Notice(text) => render_notice(frame, window, view.mode, text),
    }

    render_status(frame, chunks[2], view);
    render_hints(frame, chunks[3]);
}

/// Fixed-size window: labels, separator, bar area and both borders.
fn chart_window(available: Rect, view: &DashboardView<'_>) -> Rect {
    let label_pad = match view.panel {
        Panel::Bars(data) => label_width(data).saturating_add(LABEL_SEPARATOR.len() as u16),
        Panel::Notice(_) => 0,
    };
    let width = label_pad
        .saturating_add(view.chart_width)
        .saturating_add(2)
        .min(available.width);
    Rect::new(available.x, available.y, width, available.height)
}

fn label_width(data: &ChartData) -> u16 {
    data.labels
        .iter()
        .map(|label| UnicodeWidthStr::width(label.as_str()))
        .max()
        .map_or(0, |width| u16::try_from(width).unwrap_or(u16::MAX))
}

/// Highlight the active mode, dim the rest.
pub fn render_mode_selector(frame: &mut Frame, area: Rect, active: DisplayMode) {
    let mut spans = Vec::new();
    for mode in DisplayMode::selectable() {
        let style = if mode == active {
            Style::default()
                .fg(Color::White)
                .bg(Color::LightBlue)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} {} ", mode.hotkey(), mode), style));
        spans.push(Span::raw(" "));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn window_block(mode: DisplayMode) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {mode} "),
            Style::default().fg(Color::White),
        ))
}

fn render_bars(frame: &mut Frame, area: Rect, mode: DisplayMode, data: &ChartData, width: u16) {
    let block = window_block(mode);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label_w = label_width(data);
    let bar_area = inner
        .width
        .saturating_sub(label_w.saturating_add(LABEL_SEPARATOR.len() as u16))
        .min(width);
    let lengths = bar_lengths(&data.values, bar_area);

    let lines: Vec<Line> = data
        .labels
        .iter()
        .zip(lengths)
        .map(|(label, ticks)| {
            let pad = (label_w as usize).saturating_sub(UnicodeWidthStr::width(label.as_str()));
            // Always paint the full bar area so a shrinking bar leaves no tail.
            let clear = bar_area.saturating_sub(ticks) as usize;
            Line::from(vec![
                Span::raw(format!("{label}{}{LABEL_SEPARATOR}", " ".repeat(pad))),
                Span::styled(
                    BAR_TICK.repeat(ticks as usize),
                    Style::default().fg(Color::LightGreen),
                ),
                Span::raw(" ".repeat(clear)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_notice(frame: &mut Frame, area: Rect, mode: DisplayMode, text: &str) {
    let block = window_block(mode);
    let para = Paragraph::new(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Yellow),
    ))
    .block(block)
    .wrap(Wrap { trim: true });
    frame.render_widget(para, area);
}

fn render_status(frame: &mut Frame, area: Rect, view: &DashboardView<'_>) {
    let last_poll = view
        .status
        .last_poll
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    let text = format!(
        "source: {}  new lines: {}  last poll: {last_poll}",
        view.source, view.status.new_lines
    );
    frame.render_widget(
        Paragraph::new(Span::styled(text, Style::default().fg(Color::Gray))),
        area,
    );
}

fn render_hints(frame: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled("1-4", Style::default().fg(Color::LightBlue)),
        Span::raw(" switch view  "),
        Span::styled("q/Esc", Style::default().fg(Color::LightBlue)),
        Span::raw(" quit"),
    ]);
    frame.render_widget(Paragraph::new(hints), area);
}
