//! Scripted stand-in for the adb bridge, built for tests only.

use std::{
    cell::RefCell,
    collections::{HashMap, VecDeque},
};

use crate::core::{
    error::AtopError,
    runner::{render_command, CommandRunner},
};

#[derive(Debug, Clone)]
enum Scripted {
    Output(String),
    Failure { code: i32, output: String },
}

/// Test double answering commands from a script instead of a device.
///
/// Commands are keyed by their rendered form (`adb shell dmesg -T`,
/// `which adb`, ...). Responses queued for a key are consumed in order and
/// the last one keeps answering once the queue is down to it.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    adb: String,
    responses: RefCell<HashMap<String, VecDeque<Scripted>>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            adb: "adb".to_string(),
            ..Default::default()
        }
    }

    /// Queue `output` as the next successful answer for `command`.
    pub fn on(&self, command: &str, output: &str) -> &Self {
        self.push(command, Scripted::Output(output.to_string()))
    }

    /// Queue a non-zero exit for `command`.
    pub fn fail(&self, command: &str, code: i32, output: &str) -> &Self {
        self.push(
            command,
            Scripted::Failure {
                code,
                output: output.to_string(),
            },
        )
    }

    /// Every command issued so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn push(&self, command: &str, response: Scripted) -> &Self {
        self.responses
            .borrow_mut()
            .entry(command.to_string())
            .or_default()
            .push_back(response);
        self
    }

    fn answer(&self, command: String) -> Result<String, AtopError> {
        self.calls.borrow_mut().push(command.clone());
        let mut responses = self.responses.borrow_mut();
        let scripted = match responses.get_mut(&command) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        match scripted {
            Some(Scripted::Output(text)) => Ok(text),
            Some(Scripted::Failure { code, output }) => Err(AtopError::CommandFailed {
                command,
                code,
                output,
            }),
            None => Err(AtopError::CommandFailed {
                command,
                code: 127,
                output: "not scripted".to_string(),
            }),
        }
    }
}

impl CommandRunner for ScriptedRunner {
    fn shell(&self, args: &[&str]) -> Result<String, AtopError> {
        let mut full = vec!["shell"];
        full.extend_from_slice(args);
        self.answer(render_command(&self.adb, &full))
    }

    fn host(&self, program: &str, args: &[&str]) -> Result<String, AtopError> {
        self.answer(render_command(program, args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_runner_replays_in_order_then_sticks() {
        let runner = ScriptedRunner::new();
        runner.on("adb shell whoami", "shell").on("adb shell whoami", "root");

        assert_eq!(runner.shell(&["whoami"]).unwrap(), "shell");
        assert_eq!(runner.shell(&["whoami"]).unwrap(), "root");
        assert_eq!(runner.shell(&["whoami"]).unwrap(), "root");
        assert_eq!(runner.calls().len(), 3);
    }

    #[test]
    fn test_scripted_runner_unknown_command_fails() {
        let runner = ScriptedRunner::new();
        let err = runner.host("which", &["adb"]).unwrap_err();
        match err {
            AtopError::CommandFailed { command, code, .. } => {
                assert_eq!(command, "which adb");
                assert_eq!(code, 127);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
