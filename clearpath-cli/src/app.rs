//! Composition root: everything a command needs, built once at startup.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clearpath_core::{
    Capabilities, GenerativeGateway, MemoryStore, ProgressStore, SharedStore, SpeechCapture,
    StatusBoard, StatusSink, TaskCatalog, VoiceCommandResolver,
};
use clearpath_gemini::GeminiGateway;
use std::sync::Arc;

use crate::config::Config;
use crate::speech::{CommandSpeaker, capture_from_config};
use crate::state::{FileStore, store_dir};

const CREDENTIAL_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Read the AI service credential from the environment.
pub fn credential() -> Result<String> {
    for var in CREDENTIAL_VARS {
        if let Ok(v) = std::env::var(var) {
            let v = v.trim();
            if !v.is_empty() {
                return Ok(v.to_string());
            }
        }
    }
    bail!("GEMINI_API_KEY (or API_KEY) environment variable is not set.")
}

pub struct App {
    pub gateway: Arc<dyn GenerativeGateway>,
    pub capture: Arc<dyn SpeechCapture>,
    pub speaker: Arc<CommandSpeaker>,
    pub capabilities: Capabilities,
    pub store: SharedStore,
}

impl App {
    pub fn start(config: &Config, api_key: String) -> Result<Self> {
        let gateway: Arc<dyn GenerativeGateway> =
            Arc::new(GeminiGateway::new(config.gemini.settings(), api_key)?);
        let capture = capture_from_config(&config.voice);
        let speaker = Arc::new(CommandSpeaker::detect(&config.voice));
        let capabilities = Capabilities::probe(capture.as_ref(), speaker.as_ref());
        let store = open_store();
        tracing::debug!(?capabilities, "started");

        Ok(Self {
            gateway,
            capture,
            speaker,
            capabilities,
            store,
        })
    }

    pub fn catalog(&self) -> TaskCatalog {
        TaskCatalog::load(self.store.clone())
    }

    pub fn progress(&self) -> ProgressStore {
        ProgressStore::load(self.store.clone())
    }

    pub fn resolver(&self) -> VoiceCommandResolver {
        VoiceCommandResolver::new(self.capture.clone(), self.gateway.clone())
    }

    pub fn status(&self) -> ConsoleStatus {
        ConsoleStatus::default()
    }
}

/// File-backed store under the state home; memory only when that can't be created.
fn open_store() -> SharedStore {
    match store_dir().and_then(FileStore::open) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "state directory unavailable; progress will not be saved");
            Arc::new(MemoryStore::new())
        }
    }
}

/// Status sink for the terminal.
///
/// A message is printed when it is not already the visible status, so a
/// repeated "Listening..." stays a single line until it expires.
#[derive(Debug, Default)]
pub struct ConsoleStatus {
    board: StatusBoard,
}

impl ConsoleStatus {
    fn show_at(&mut self, message: &str, now: DateTime<Utc>) -> bool {
        if self.board.current_at(now) == Some(message) {
            return false;
        }
        self.board.report_at(message, now);
        true
    }

    /// Forget the visible message when the listening view ends.
    pub fn clear(&mut self) {
        self.board.clear();
    }
}

impl StatusSink for ConsoleStatus {
    fn report(&mut self, message: &str) {
        if self.show_at(message, Utc::now()) {
            println!("{message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_repeated_status_prints_once_until_expired() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let mut status = ConsoleStatus::default();

        assert!(status.show_at("Listening...", t0));
        assert!(!status.show_at("Listening...", t0 + Duration::seconds(1)));
        assert!(status.show_at("Heard: \"next\"", t0 + Duration::seconds(2)));
        assert!(status.show_at("Listening...", t0 + Duration::seconds(2)));
        assert!(status.show_at("Listening...", t0 + Duration::seconds(6)));

        status.clear();
        assert!(status.show_at("Listening...", t0 + Duration::seconds(7)));
    }
}
