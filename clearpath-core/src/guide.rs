//! Step-guide navigation by voice.
//!
//! Commands understood on the guide screen:
//! - "read step N" (1-based)
//! - "next", "previous"
//! - "mark as done" / "complete step" (completes the first unfinished step)
//! - "go back"

use std::sync::LazyLock;

use regex::Regex;

use crate::capability::SpeechSynthesis;
use crate::progress::{ProgressStore, StepCompletion};
use crate::resolver::CommandHandler;

static READ_STEP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^read step (\d+)$").expect("static regex"));

const FIXED_COMMANDS: [&str; 5] = ["next", "previous", "mark as done", "complete step", "go back"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideCommand {
    /// 1-based step number as spoken.
    ReadStep(usize),
    Next,
    Previous,
    MarkDone,
    GoBack,
}

impl GuideCommand {
    pub fn parse(command: &str) -> Option<Self> {
        let c = command.trim().to_lowercase();
        if let Some(caps) = READ_STEP.captures(&c) {
            return caps[1].parse().ok().map(GuideCommand::ReadStep);
        }
        match c.as_str() {
            "next" => Some(GuideCommand::Next),
            "previous" => Some(GuideCommand::Previous),
            "mark as done" | "complete step" => Some(GuideCommand::MarkDone),
            "go back" => Some(GuideCommand::GoBack),
            _ => None,
        }
    }
}

/// What the guide did in response to a command. Indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideAction {
    Read { index: usize },
    Focus { index: usize },
    AtStart,
    Completed { index: usize, points: u32 },
    AllDone,
    GoBack,
    Ignored,
}

/// Guide screen state for one task, usable as a voice [`CommandHandler`].
pub struct GuideSession<'a> {
    task: String,
    progress: &'a mut ProgressStore,
    speech: &'a dyn SpeechSynthesis,
    messages: Vec<String>,
    last_action: Option<GuideAction>,
}

impl<'a> GuideSession<'a> {
    pub fn new(
        task: impl Into<String>,
        progress: &'a mut ProgressStore,
        speech: &'a dyn SpeechSynthesis,
    ) -> Self {
        Self {
            task: task.into(),
            progress,
            speech,
            messages: Vec::new(),
            last_action: None,
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn last_action(&self) -> Option<GuideAction> {
        self.last_action
    }

    /// Status messages produced since the last call.
    pub fn take_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.messages)
    }

    fn step_count(&self) -> usize {
        self.progress.get(&self.task).map_or(0, |p| p.steps.len())
    }

    pub fn commands(&self) -> Vec<String> {
        let mut out: Vec<String> = (1..=self.step_count())
            .map(|n| format!("read step {n}"))
            .collect();
        out.extend(FIXED_COMMANDS.iter().map(|c| c.to_string()));
        out
    }

    pub fn execute(&mut self, command: GuideCommand) -> GuideAction {
        let action = match command {
            GuideCommand::ReadStep(n) => self.read_step(n),
            GuideCommand::Next => self.next(),
            GuideCommand::Previous => self.previous(),
            GuideCommand::MarkDone => self.mark_done(),
            GuideCommand::GoBack => GuideAction::GoBack,
        };
        self.last_action = Some(action);
        action
    }

    fn say(&mut self, msg: impl Into<String>) {
        self.messages.push(msg.into());
    }

    fn read_step(&mut self, n: usize) -> GuideAction {
        let step = match self.progress.get(&self.task) {
            Some(p) if n >= 1 && n <= p.steps.len() => p.steps[n - 1].clone(),
            _ => return GuideAction::Ignored,
        };

        self.say(format!("Reading step {n}."));
        if !self.speech.is_supported() {
            self.say("Text-to-speech not supported.");
        } else if let Err(e) = self.speech.speak(&step.spoken_text()) {
            tracing::warn!(error = %e, "speech synthesis failed");
            self.say(format!("Could not read aloud: {e}"));
        }
        GuideAction::Read { index: n - 1 }
    }

    fn next(&mut self) -> GuideAction {
        let count = self.step_count();
        if count == 0 {
            return GuideAction::Ignored;
        }
        let index = self
            .progress
            .next_incomplete(&self.task)
            .unwrap_or(count - 1);
        self.say("Going to the next step.");
        GuideAction::Focus { index }
    }

    fn previous(&mut self) -> GuideAction {
        let last_completed = self
            .progress
            .get(&self.task)
            .and_then(|p| {
                p.completed_steps
                    .iter()
                    .filter(|i| **i < p.steps.len())
                    .max()
                    .copied()
            });
        match last_completed {
            Some(last) => {
                self.say("Going to previous step.");
                GuideAction::Focus {
                    index: last.saturating_sub(1),
                }
            }
            None => {
                self.say("You are at the start!");
                GuideAction::AtStart
            }
        }
    }

    fn mark_done(&mut self) -> GuideAction {
        let Some(index) = self.progress.next_incomplete(&self.task) else {
            if self.step_count() > 0 {
                self.say("All steps are completed!");
                return GuideAction::AllDone;
            }
            return GuideAction::Ignored;
        };

        match self.progress.complete_step(&self.task, index) {
            Ok(StepCompletion::Awarded { points, .. }) => {
                self.say(format!("+{points} points! Great job!"));
                GuideAction::Completed { index, points }
            }
            Ok(StepCompletion::AlreadyDone) => GuideAction::Ignored,
            Err(e) => {
                self.say(e.to_string());
                GuideAction::Ignored
            }
        }
    }
}

impl CommandHandler for GuideSession<'_> {
    fn available_commands(&self) -> Vec<String> {
        self.commands()
    }

    fn on_command_match(&mut self, command: &str) {
        match GuideCommand::parse(command) {
            Some(cmd) => {
                self.execute(cmd);
            }
            None => {
                tracing::debug!(command, "matched command has no guide action");
                self.last_action = Some(GuideAction::Ignored);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::NoSynthesis;
    use crate::progress::SharedStore;
    use crate::step::{ProgressPatch, TaskStep};
    use crate::storage::MemoryStore;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Spoken(Mutex<Vec<String>>);

    impl SpeechSynthesis for Spoken {
        fn is_supported(&self) -> bool {
            true
        }

        fn speak(&self, text: &str) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn stop(&self) {}
    }

    fn store_with_steps(n: usize) -> ProgressStore {
        let shared: SharedStore = Arc::new(MemoryStore::new());
        let mut p = ProgressStore::load(shared);
        let steps = (1..=n)
            .map(|i| TaskStep::new(format!("Step {i}"), format!("Do thing {i}"), "img"))
            .collect();
        p.update("Washing a car", ProgressPatch::steps(steps));
        p
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(GuideCommand::parse("Read Step 3"), Some(GuideCommand::ReadStep(3)));
        assert_eq!(GuideCommand::parse(" next "), Some(GuideCommand::Next));
        assert_eq!(GuideCommand::parse("complete step"), Some(GuideCommand::MarkDone));
        assert_eq!(GuideCommand::parse("read step"), None);
        assert_eq!(GuideCommand::parse("dance"), None);
    }

    #[test]
    fn test_commands_follow_step_count() {
        let mut p = store_with_steps(2);
        let s = GuideSession::new("Washing a car", &mut p, &NoSynthesis);
        assert_eq!(
            s.commands(),
            vec![
                "read step 1",
                "read step 2",
                "next",
                "previous",
                "mark as done",
                "complete step",
                "go back",
            ]
        );
    }

    #[test]
    fn test_read_step_speaks_title_and_description() {
        let mut p = store_with_steps(3);
        let voice = Spoken::default();
        let mut s = GuideSession::new("Washing a car", &mut p, &voice);
        assert_eq!(s.execute(GuideCommand::ReadStep(2)), GuideAction::Read { index: 1 });
        assert_eq!(s.execute(GuideCommand::ReadStep(9)), GuideAction::Ignored);
        assert_eq!(*voice.0.lock().unwrap(), vec!["Step 2. Do thing 2"]);
        assert_eq!(s.take_messages(), vec!["Reading step 2."]);
    }

    #[test]
    fn test_read_without_tts_degrades() {
        let mut p = store_with_steps(1);
        let mut s = GuideSession::new("Washing a car", &mut p, &NoSynthesis);
        s.execute(GuideCommand::ReadStep(1));
        assert_eq!(
            s.take_messages(),
            vec!["Reading step 1.", "Text-to-speech not supported."]
        );
    }

    #[test]
    fn test_next_and_previous() {
        let mut p = store_with_steps(4);
        p.update(
            "Washing a car",
            ProgressPatch::default().with_completed(HashSet::from([0, 2])),
        );
        let mut s = GuideSession::new("Washing a car", &mut p, &NoSynthesis);
        assert_eq!(s.execute(GuideCommand::Next), GuideAction::Focus { index: 1 });
        assert_eq!(s.execute(GuideCommand::Previous), GuideAction::Focus { index: 1 });
    }

    #[test]
    fn test_previous_at_start() {
        let mut p = store_with_steps(4);
        let mut s = GuideSession::new("Washing a car", &mut p, &NoSynthesis);
        assert_eq!(s.execute(GuideCommand::Previous), GuideAction::AtStart);
        assert_eq!(s.take_messages(), vec!["You are at the start!"]);
    }

    #[test]
    fn test_previous_ignores_completions_past_step_list() {
        let mut p = store_with_steps(4);
        p.update(
            "Washing a car",
            ProgressPatch::default().with_completed(HashSet::from([2, 9])),
        );
        let mut s = GuideSession::new("Washing a car", &mut p, &NoSynthesis);
        assert_eq!(s.execute(GuideCommand::Previous), GuideAction::Focus { index: 1 });
    }

    #[test]
    fn test_mark_done_walks_forward_then_all_done() {
        let mut p = store_with_steps(2);
        {
            let mut s = GuideSession::new("Washing a car", &mut p, &NoSynthesis);
            assert_eq!(
                s.execute(GuideCommand::MarkDone),
                GuideAction::Completed { index: 0, points: 10 }
            );
            assert_eq!(
                s.execute(GuideCommand::MarkDone),
                GuideAction::Completed { index: 1, points: 10 }
            );
            assert_eq!(s.execute(GuideCommand::MarkDone), GuideAction::AllDone);
            assert_eq!(s.execute(GuideCommand::Next), GuideAction::Focus { index: 1 });
        }
        assert_eq!(p.get("Washing a car").unwrap().total_points, 20);
    }

    #[test]
    fn test_handler_ignores_unknown_match() {
        let mut p = store_with_steps(1);
        let mut s = GuideSession::new("Washing a car", &mut p, &NoSynthesis);
        s.on_command_match("Generate Guide");
        assert_eq!(s.last_action(), Some(GuideAction::Ignored));
        s.on_command_match("go back");
        assert_eq!(s.last_action(), Some(GuideAction::GoBack));
    }
}
