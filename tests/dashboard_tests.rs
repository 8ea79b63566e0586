// Drives the dashboard loop on ratatui's TestBackend with a scripted device
// log and a scripted key sequence, then inspects the last drawn frame.

use atop::{
    core::{
        fetch::{LogSource, RemoteLog},
        runner::ScriptedRunner,
    },
    logs::LogStreamer,
    tui::{run_dashboard, source::InteractionSource},
    AtopConfig,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::collections::VecDeque;

const BOOT: &str = "[Wed May 13 23:23:08 2020] IOCTL kgsl: old";

const LATER: &str = "\
[Wed May 13 23:23:08 2020] IOCTL kgsl: old
[Wed May 13 23:23:09 2020] IOCTL aDSP: invoke
[Wed May 13 23:23:09 2020] IOCTL aDSP: invoke
[Wed May 13 23:23:10 2020] IOCTL IPA: map";

fn row(buffer: &Buffer, y: u16) -> String {
    (0..buffer.area().width)
        .map(|x| buffer[(x, y)].symbol())
        .collect()
}

fn run_with_keys(runner: &ScriptedRunner, keys: &[KeyCode]) -> Buffer {
    let config = AtopConfig::default();
    let fetcher = RemoteLog::new(runner, LogSource::Dmesg);
    let streamer = LogStreamer::new(fetcher, config.dashboard.stream_tags.clone()).unwrap();
    let mut source = InteractionSource::new(streamer);

    let mut queue: VecDeque<KeyEvent> = keys
        .iter()
        .map(|code| KeyEvent::new(*code, KeyModifiers::NONE))
        .collect();
    let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
    let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
    run_dashboard(&mut terminal, &mut source, &config, |_| {
        Ok(Some(queue.pop_front().unwrap_or(quit)))
    })
    .unwrap();
    terminal.backend().buffer().clone()
}

#[test]
fn test_first_frame_shows_new_interactions() {
    let runner = ScriptedRunner::new();
    runner
        .on("adb shell dmesg -T", BOOT)
        .on("adb shell dmesg -T", LATER);

    let buffer = run_with_keys(&runner, &[KeyCode::Char('q')]);

    // Selector on row 0, border on row 1, then one row per known accelerator.
    let labels: Vec<String> = (2..11).map(|y| row(&buffer, y)).collect();
    let adsp = labels.iter().find(|r| r.contains("aDSP")).unwrap();
    let ipa = labels.iter().find(|r| r.contains("IPA")).unwrap();
    let kgsl = labels.iter().find(|r| r.contains("kgsl")).unwrap();
    assert_eq!(adsp.matches('#').count(), 64);
    assert_eq!(ipa.matches('#').count(), 32);
    assert_eq!(kgsl.matches('#').count(), 0);
    assert!(labels[0].contains("ardeno"));
    assert!(labels[8].contains("Others"));

    assert!(row(&buffer, 12).contains("new lines: 3"));
}

#[test]
fn test_switching_to_perf_counters_shows_not_implemented() {
    let runner = ScriptedRunner::new();
    runner.on("adb shell dmesg -T", BOOT);

    let buffer = run_with_keys(&runner, &[KeyCode::Char('4'), KeyCode::Esc]);

    let screen: String = (0..buffer.area().height)
        .map(|y| row(&buffer, y))
        .collect::<Vec<_>>()
        .join("\n");
    assert!(screen.contains("Perf counters"));
    assert!(screen.contains("not implemented"));
    // Only the streamer start-up and the first Interaction frame hit the log.
    assert_eq!(runner.calls().len(), 2);
}
