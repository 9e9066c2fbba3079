use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clearpath_core::{
    CaptureError, CommandHandler, DeficiencyType, Dictation, GatewayError, GenerativeGateway,
    GuideAction, GuideSession, ListenOutcome, MemoryStore, NoSynthesis, ProgressPatch,
    ProgressStore, RecolorResult, SelectionVoice, SharedStore, SpeechCapture, TaskCatalog,
    TaskStep, VoiceCommandResolver,
};
use clearpath_media::ImageData;

/// Matches by returning a canned answer and recording what it was asked.
struct ScriptedMatcher {
    answer: Option<String>,
    asked: Mutex<Vec<Vec<String>>>,
}

impl ScriptedMatcher {
    fn new(answer: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.map(str::to_string),
            asked: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl GenerativeGateway for ScriptedMatcher {
    async fn generate_steps(&self, _task: &str) -> Result<Vec<TaskStep>, GatewayError> {
        Err(GatewayError::Request("not scripted".into()))
    }

    async fn generate_image(&self, _p: &str, _s: Option<&str>) -> Result<ImageData, GatewayError> {
        Err(GatewayError::Request("not scripted".into()))
    }

    async fn recolor_image(
        &self,
        _i: &ImageData,
        _d: DeficiencyType,
    ) -> Result<RecolorResult, GatewayError> {
        Err(GatewayError::Request("not scripted".into()))
    }

    async fn match_option(
        &self,
        _transcript: &str,
        options: &[String],
    ) -> Result<Option<String>, GatewayError> {
        self.asked.lock().unwrap().push(options.to_vec());
        Ok(self.answer.clone())
    }
}

struct Says(&'static str);

#[async_trait]
impl SpeechCapture for Says {
    fn is_supported(&self) -> bool {
        true
    }

    async fn capture(&self) -> Result<Option<String>, CaptureError> {
        Ok(Some(self.0.to_string()))
    }
}

#[derive(Default)]
struct Screen {
    commands: Vec<String>,
    matched: Vec<String>,
    fallback: Vec<String>,
}

impl CommandHandler for Screen {
    fn available_commands(&self) -> Vec<String> {
        self.commands.clone()
    }

    fn on_command_match(&mut self, command: &str) {
        self.matched.push(command.to_string());
    }

    fn on_no_match(&mut self, transcript: &str) -> bool {
        self.fallback.push(transcript.to_string());
        true
    }
}

fn screen() -> Screen {
    Screen {
        commands: vec!["Go Back".to_string(), "Generate Guide".to_string()],
        ..Screen::default()
    }
}

#[tokio::test]
async fn test_stub_answer_in_list_is_dispatched() {
    let resolver = VoiceCommandResolver::new(
        Arc::new(Says("uh, back please")),
        ScriptedMatcher::new(Some("Go Back")),
    );
    let mut s = screen();
    let mut status: Vec<String> = Vec::new();

    let out = resolver.listen(&mut s, &mut status).await;

    assert_eq!(out, ListenOutcome::Matched("Go Back".to_string()));
    assert_eq!(s.matched, vec!["Go Back"]);
    assert!(s.fallback.is_empty());
}

#[tokio::test]
async fn test_stub_answer_outside_list_falls_back() {
    let resolver = VoiceCommandResolver::new(
        Arc::new(Says("go home")),
        ScriptedMatcher::new(Some("Go Home")),
    );
    let mut s = screen();
    let mut status: Vec<String> = Vec::new();

    let out = resolver.listen(&mut s, &mut status).await;

    assert_eq!(out, ListenOutcome::NoMatch("go home".to_string()));
    assert!(s.matched.is_empty());
    assert_eq!(s.fallback, vec!["go home"]);
}

#[tokio::test]
async fn test_commands_are_read_fresh_each_attempt() {
    let matcher = ScriptedMatcher::new(Some("next"));
    let resolver = VoiceCommandResolver::new(Arc::new(Says("next")), matcher.clone());
    let mut s = screen();
    let mut status: Vec<String> = Vec::new();

    resolver.listen(&mut s, &mut status).await;
    s.commands.push("next".to_string());
    let out = resolver.listen(&mut s, &mut status).await;

    assert_eq!(out, ListenOutcome::Matched("next".to_string()));
    let asked = matcher.asked.lock().unwrap();
    assert_eq!(asked.len(), 2);
    assert_eq!(asked[0].len(), 2);
    assert_eq!(asked[1].len(), 3);
}

#[tokio::test]
async fn test_guide_voice_marks_step_done() {
    let shared: SharedStore = Arc::new(MemoryStore::new());
    let mut progress = ProgressStore::load(shared.clone());
    let steps = (1..=7)
        .map(|i| TaskStep::new(format!("Step {i}"), "Do it", "Image"))
        .collect();
    progress.update("Washing a car", ProgressPatch::steps(steps));

    let resolver = VoiceCommandResolver::new(
        Arc::new(Says("I finished that one")),
        ScriptedMatcher::new(Some("mark as done")),
    );
    let mut status: Vec<String> = Vec::new();
    {
        let mut session = GuideSession::new("Washing a car", &mut progress, &NoSynthesis);
        let out = resolver.listen(&mut session, &mut status).await;
        assert_eq!(out, ListenOutcome::Matched("mark as done".to_string()));
        assert_eq!(
            session.last_action(),
            Some(GuideAction::Completed { index: 0, points: 10 })
        );
        assert_eq!(session.take_messages(), vec!["+10 points! Great job!"]);
    }

    assert_eq!(ProgressStore::load(shared).aggregate_points(), 10);
}

#[tokio::test]
async fn test_selection_screen_dictates_unmatched_speech() {
    let shared: SharedStore = Arc::new(MemoryStore::new());
    let mut catalog = TaskCatalog::load(shared);
    let resolver = VoiceCommandResolver::new(
        Arc::new(Says("how to repot a cactus")),
        ScriptedMatcher::new(None),
    );
    let mut status: Vec<String> = Vec::new();

    let mut voice = SelectionVoice::new(&mut catalog, Dictation::default());
    let out = resolver.listen(&mut voice, &mut status).await;

    assert_eq!(out, ListenOutcome::NoMatch("how to repot a cactus".to_string()));
    assert_eq!(voice.selected(), None);
    assert_eq!(voice.description().text(), "how to repot a cactus");
}

#[tokio::test]
async fn test_dictation_never_calls_matcher() {
    let matcher = ScriptedMatcher::new(Some("anything"));
    let resolver =
        VoiceCommandResolver::new(Arc::new(Says("a person signing hello")), matcher.clone());
    let mut prompt = Dictation::new("Show");
    let mut status: Vec<String> = Vec::new();

    resolver.listen(&mut prompt, &mut status).await;

    assert_eq!(prompt.text(), "Show a person signing hello");
    assert!(matcher.asked.lock().unwrap().is_empty());
}
