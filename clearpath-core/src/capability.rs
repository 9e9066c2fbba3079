//! Optional speech capabilities.
//!
//! Both are probed once at startup and injected; an unsupported capability
//! hides or disables the related control instead of failing.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("speech recognition is not supported here")]
    Unsupported,

    #[error("microphone unavailable: {0}")]
    Device(String),

    #[error("recognition failed: {0}")]
    Recognition(String),
}

/// Single-utterance speech-to-text.
#[async_trait]
pub trait SpeechCapture: Send + Sync {
    fn is_supported(&self) -> bool;

    /// Capture one utterance. `Ok(None)` means silence / nothing recognised.
    async fn capture(&self) -> Result<Option<String>, CaptureError>;
}

/// Text-to-speech playback.
pub trait SpeechSynthesis: Send + Sync {
    fn is_supported(&self) -> bool;

    /// Speak `text`, interrupting anything already playing.
    fn speak(&self, text: &str) -> anyhow::Result<()>;

    fn stop(&self);
}

/// Result of probing the environment once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub speech_capture: bool,
    pub speech_synthesis: bool,
}

impl Capabilities {
    pub fn probe(capture: &dyn SpeechCapture, synthesis: &dyn SpeechSynthesis) -> Self {
        let caps = Self {
            speech_capture: capture.is_supported(),
            speech_synthesis: synthesis.is_supported(),
        };
        if !caps.speech_capture {
            tracing::warn!("speech recognition not supported; voice controls disabled");
        }
        if !caps.speech_synthesis {
            tracing::warn!("text-to-speech not supported; read-aloud disabled");
        }
        caps
    }
}

/// Capture that is never available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

#[async_trait]
impl SpeechCapture for NoCapture {
    fn is_supported(&self) -> bool {
        false
    }

    async fn capture(&self) -> Result<Option<String>, CaptureError> {
        Err(CaptureError::Unsupported)
    }
}

/// Synthesis that is never available.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSynthesis;

impl SpeechSynthesis for NoSynthesis {
    fn is_supported(&self) -> bool {
        false
    }

    fn speak(&self, _text: &str) -> anyhow::Result<()> {
        anyhow::bail!("Text-to-speech not supported.")
    }

    fn stop(&self) {}
}
