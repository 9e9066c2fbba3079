//! Voice Command Resolver: one utterance in, at most one command out.
//!
//! Flow per attempt:
//! 1. capture a single utterance (cooperative; ends on silence or `stop`)
//! 2. read the handler's current command list
//! 3. ask the gateway to match the transcript against that list
//! 4. accept the answer only if it is exactly one of the offered commands
//! 5. dispatch `on_command_match` once, or fall back to `on_no_match`
//!
//! Failures never escape: they are reported through the status sink and the
//! resolver is ready for the next attempt.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::capability::SpeechCapture;
use crate::gateway::{GenerativeGateway, accept_option};
use crate::status::StatusSink;

/// Screen-specific reaction to a resolved utterance.
pub trait CommandHandler {
    /// Commands valid right now. Read fresh on every attempt.
    fn available_commands(&self) -> Vec<String>;

    fn on_command_match(&mut self, command: &str);

    /// Fallback for unmatched speech. Return `false` when the screen has none.
    fn on_no_match(&mut self, _transcript: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    Matched(String),
    NoMatch(String),
    /// Capture ended without any recognised speech.
    Silence,
    /// `stop` was called while listening.
    Cancelled,
    /// Another capture was already in flight; nothing happened.
    Busy,
    /// Capture or matching failed; already reported.
    Failed,
    Unsupported,
}

pub struct VoiceCommandResolver {
    capture: Arc<dyn SpeechCapture>,
    gateway: Arc<dyn GenerativeGateway>,
    listening: AtomicBool,
    stop_tx: Mutex<Option<oneshot::Sender<()>>>,
}

struct ListeningGuard<'a>(&'a AtomicBool);

impl Drop for ListeningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl VoiceCommandResolver {
    pub fn new(capture: Arc<dyn SpeechCapture>, gateway: Arc<dyn GenerativeGateway>) -> Self {
        Self {
            capture,
            gateway,
            listening: AtomicBool::new(false),
            stop_tx: Mutex::new(None),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.capture.is_supported()
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    /// Abort the in-flight capture. Returns `false` if nothing was listening.
    pub fn stop(&self) -> bool {
        let tx = match self.stop_tx.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        match tx {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Capture one utterance and resolve it against `handler`'s commands.
    pub async fn listen<H, S>(&self, handler: &mut H, status: &mut S) -> ListenOutcome
    where
        H: CommandHandler + ?Sized,
        S: StatusSink + ?Sized,
    {
        if !self.capture.is_supported() {
            status.report("Voice control not supported");
            return ListenOutcome::Unsupported;
        }
        if self
            .listening
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("capture already in flight; ignoring start");
            return ListenOutcome::Busy;
        }
        let _guard = ListeningGuard(&self.listening);

        let (tx, rx) = oneshot::channel();
        if let Ok(mut slot) = self.stop_tx.lock() {
            *slot = Some(tx);
        }
        status.report("Listening...");

        let captured = tokio::select! {
            res = self.capture.capture() => Some(res),
            _ = rx => None,
        };
        if let Ok(mut slot) = self.stop_tx.lock() {
            slot.take();
        }

        let transcript = match captured {
            None => {
                status.report("Stopped listening.");
                return ListenOutcome::Cancelled;
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "speech capture failed");
                status.report(&format!("Error: {e}"));
                return ListenOutcome::Failed;
            }
            Some(Ok(None)) => {
                status.report("Didn't catch that. Try again.");
                return ListenOutcome::Silence;
            }
            Some(Ok(Some(t))) => t,
        };

        self.resolve_transcript(&transcript, handler, status).await
    }

    /// Resolve an already captured (or typed) transcript.
    pub async fn resolve_transcript<H, S>(
        &self,
        transcript: &str,
        handler: &mut H,
        status: &mut S,
    ) -> ListenOutcome
    where
        H: CommandHandler + ?Sized,
        S: StatusSink + ?Sized,
    {
        let transcript = transcript.trim();
        if transcript.is_empty() {
            status.report("Didn't catch that. Try again.");
            return ListenOutcome::Silence;
        }
        status.report(&format!("Heard: \"{transcript}\""));

        let commands = handler.available_commands();
        if commands.is_empty() {
            if !handler.on_no_match(transcript) {
                status.report("No commands available.");
            }
            return ListenOutcome::NoMatch(transcript.to_string());
        }

        let answer = match self.gateway.match_option(transcript, &commands).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::warn!(error = %e, "command matching failed");
                status.report(&format!("Could not match that command: {e}"));
                return ListenOutcome::Failed;
            }
        };

        let matched = answer.as_deref().and_then(|a| {
            let accepted = accept_option(a, &commands);
            if accepted.is_none() {
                tracing::debug!(answer = a, "matcher answered outside the command list");
            }
            accepted
        });

        match matched {
            Some(command) => {
                tracing::info!(command = %command, "voice command matched");
                handler.on_command_match(&command);
                ListenOutcome::Matched(command)
            }
            None => {
                if !handler.on_no_match(transcript) {
                    status.report(&format!("Unknown command: \"{transcript}\""));
                }
                ListenOutcome::NoMatch(transcript.to_string())
            }
        }
    }
}
