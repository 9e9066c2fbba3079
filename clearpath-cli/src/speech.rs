//! Terminal stand-ins for the browser speech APIs.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use clearpath_core::{CaptureError, SpeechCapture, SpeechSynthesis};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::process::Child;

use crate::config::VoiceSection;

const TTS_CANDIDATES: [&str; 4] = ["espeak-ng", "espeak", "say", "spd-say"];

/// Build the capture configured in `[voice]`.
pub fn capture_from_config(voice: &VoiceSection) -> Arc<dyn SpeechCapture> {
    match &voice.capture_command {
        Some(cmd) => Arc::new(CommandCapture {
            command: cmd.clone(),
            args: voice.capture_args.clone(),
            language: voice.language.clone(),
        }),
        None => Arc::new(TypedCapture::new()),
    }
}

/// One utterance typed on stdin. An empty line counts as silence.
pub struct TypedCapture {
    reader: tokio::sync::Mutex<BufReader<Stdin>>,
}

impl TypedCapture {
    pub fn new() -> Self {
        Self {
            reader: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }
}

#[async_trait]
impl SpeechCapture for TypedCapture {
    fn is_supported(&self) -> bool {
        true
    }

    async fn capture(&self) -> Result<Option<String>, CaptureError> {
        let mut err = tokio::io::stderr();
        let _ = err.write_all(b"say> ").await;
        let _ = err.flush().await;

        let mut line = String::new();
        let n = self
            .reader
            .lock()
            .await
            .read_line(&mut line)
            .await
            .map_err(|e| CaptureError::Device(e.to_string()))?;
        if n == 0 {
            return Err(CaptureError::Device("end of input".to_string()));
        }

        let t = line.trim();
        Ok((!t.is_empty()).then(|| t.to_string()))
    }
}

/// External speech-to-text program; its trimmed stdout is the transcript.
pub struct CommandCapture {
    command: String,
    args: Vec<String>,
    language: String,
}

#[async_trait]
impl SpeechCapture for CommandCapture {
    fn is_supported(&self) -> bool {
        which::which(&self.command).is_ok()
    }

    async fn capture(&self) -> Result<Option<String>, CaptureError> {
        let out = tokio::process::Command::new(&self.command)
            .args(&self.args)
            .env("CLEARPATH_LANGUAGE", &self.language)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CaptureError::Device(format!("{}: {e}", self.command)))?;

        if !out.status.success() {
            let stderr = String::from_utf8_lossy(&out.stderr);
            return Err(CaptureError::Recognition(format!(
                "{} exited with {}: {}",
                self.command,
                out.status,
                stderr.trim()
            )));
        }
        let t = String::from_utf8_lossy(&out.stdout).trim().to_string();
        Ok((!t.is_empty()).then_some(t))
    }
}

/// Text-to-speech through an external program.
pub struct CommandSpeaker {
    program: Option<PathBuf>,
    args: Vec<String>,
    child: Mutex<Option<Child>>,
}

impl CommandSpeaker {
    pub fn detect(voice: &VoiceSection) -> Self {
        let program = match &voice.tts_command {
            Some(cmd) => which::which(cmd).ok(),
            None => TTS_CANDIDATES.iter().find_map(|c| which::which(c).ok()),
        };
        tracing::debug!(program = ?program, "text-to-speech program");
        Self {
            program,
            args: voice.tts_args.clone(),
            child: Mutex::new(None),
        }
    }

    /// Wait for the current utterance to finish.
    pub async fn wait(&self) -> Result<()> {
        let child = match self.child.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(mut c) = child {
            let status = c.wait().await.context("waiting for text-to-speech")?;
            if !status.success() {
                bail!("text-to-speech exited with {status}");
            }
        }
        Ok(())
    }
}

impl SpeechSynthesis for CommandSpeaker {
    fn is_supported(&self) -> bool {
        self.program.is_some()
    }

    fn speak(&self, text: &str) -> Result<()> {
        let Some(program) = &self.program else {
            bail!("Text-to-speech not supported.");
        };
        self.stop();

        let child = tokio::process::Command::new(program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning {}", program.display()))?;
        if let Ok(mut slot) = self.child.lock() {
            *slot = Some(child);
        }
        Ok(())
    }

    fn stop(&self) {
        let Ok(mut slot) = self.child.lock() else {
            return;
        };
        // The runtime reaps the killed child.
        if let Some(mut c) = slot.take() {
            let _ = c.start_kill();
        }
    }
}
