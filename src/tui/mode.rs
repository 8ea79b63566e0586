use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use strum::{Display, EnumIter, IntoEnumIterator};

/// What the dashboard is currently showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum DisplayMode {
    Exit,
    #[default]
    Interaction,
    Timing,
    #[strum(to_string = "Raw log")]
    RawLog,
    #[strum(to_string = "Perf counters")]
    PerfCounters,
}

/// Key → target mode. Any mode other than Exit may move to any entry.
const TRANSITIONS: &[(KeyCode, DisplayMode)] = &[
    (KeyCode::Char('1'), DisplayMode::Interaction),
    (KeyCode::Char('i'), DisplayMode::Interaction),
    (KeyCode::Char('2'), DisplayMode::Timing),
    (KeyCode::Char('t'), DisplayMode::Timing),
    (KeyCode::Char('3'), DisplayMode::RawLog),
    (KeyCode::Char('r'), DisplayMode::RawLog),
    (KeyCode::Char('4'), DisplayMode::PerfCounters),
    (KeyCode::Char('p'), DisplayMode::PerfCounters),
    (KeyCode::Char('q'), DisplayMode::Exit),
    (KeyCode::Esc, DisplayMode::Exit),
];

impl DisplayMode {
    /// Modes shown in the selector bar, in order.
    pub fn selectable() -> impl Iterator<Item = DisplayMode> {
        DisplayMode::iter().filter(|mode| *mode != DisplayMode::Exit)
    }

    /// Key that selects this mode, as shown to the user.
    pub fn hotkey(self) -> char {
        match self {
            DisplayMode::Exit => 'q',
            DisplayMode::Interaction => '1',
            DisplayMode::Timing => '2',
            DisplayMode::RawLog => '3',
            DisplayMode::PerfCounters => '4',
        }
    }

    pub fn is_terminal(self) -> bool {
        self == DisplayMode::Exit
    }

    /// Mode the key leads to, or `None` when the key is not bound.
    pub fn transition(self, key: &KeyEvent) -> Option<DisplayMode> {
        if self.is_terminal() || key.kind != KeyEventKind::Press {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return matches!(key.code, KeyCode::Char('c')).then_some(DisplayMode::Exit);
        }
        TRANSITIONS
            .iter()
            .find(|(code, _)| *code == key.code)
            .map(|(_, mode)| *mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_initial_mode_is_interaction() {
        assert_eq!(DisplayMode::default(), DisplayMode::Interaction);
    }

    #[test]
    fn test_transition_table() {
        let from = DisplayMode::Interaction;
        assert_eq!(from.transition(&press(KeyCode::Char('2'))), Some(DisplayMode::Timing));
        assert_eq!(from.transition(&press(KeyCode::Char('r'))), Some(DisplayMode::RawLog));
        assert_eq!(
            DisplayMode::Timing.transition(&press(KeyCode::Char('4'))),
            Some(DisplayMode::PerfCounters)
        );
        assert_eq!(
            DisplayMode::PerfCounters.transition(&press(KeyCode::Char('1'))),
            Some(DisplayMode::Interaction)
        );
        assert_eq!(from.transition(&press(KeyCode::Esc)), Some(DisplayMode::Exit));
        assert_eq!(from.transition(&press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_ctrl_c_exits_and_other_ctrl_keys_do_not() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(DisplayMode::Timing.transition(&ctrl_c), Some(DisplayMode::Exit));
        assert_eq!(DisplayMode::Timing.transition(&ctrl_r), None);
    }

    #[test]
    fn test_exit_is_terminal() {
        assert_eq!(DisplayMode::Exit.transition(&press(KeyCode::Char('1'))), None);
    }

    #[test]
    fn test_selector_order_and_hotkeys() {
        let modes: Vec<_> = DisplayMode::selectable().collect();
        assert_eq!(
            modes,
            vec![
                DisplayMode::Interaction,
                DisplayMode::Timing,
                DisplayMode::RawLog,
                DisplayMode::PerfCounters
            ]
        );
        let keys: String = modes.iter().map(|m| m.hotkey()).collect();
        assert_eq!(keys, "1234");
        assert_eq!(DisplayMode::RawLog.to_string(), "Raw log");
    }
}
