use anyhow::{Context, Result};
use clearpath_gemini::{DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, GeminiSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::state::{clearpath_home, ensure_clearpath_home};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub gemini: GeminiSection,
    pub voice: VoiceSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSection {
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSection {
    /// Speech-to-text command printing one transcript on stdout.
    /// When unset, utterances are typed on stdin.
    pub capture_command: Option<String>,
    pub capture_args: Vec<String>,
    /// Text-to-speech command; the text is passed as the last argument.
    /// When unset, the first of espeak-ng, espeak, say, spd-say found on PATH.
    pub tts_command: Option<String>,
    pub tts_args: Vec<String>,
    /// BCP-47 tag handed to the capture command as CLEARPATH_LANGUAGE.
    pub language: String,
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for VoiceSection {
    fn default() -> Self {
        Self {
            capture_command: None,
            capture_args: Vec::new(),
            tts_command: None,
            tts_args: Vec::new(),
            language: "en-US".to_string(),
        }
    }
}

impl GeminiSection {
    pub fn settings(&self) -> GeminiSettings {
        GeminiSettings {
            base_url: self.base_url.clone(),
            text_model: self.text_model.clone(),
            image_model: self.image_model.clone(),
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_clearpath_home()?.join("config.toml"))
}

/// Read the config without creating anything; no readable home means defaults.
pub fn load_config() -> Result<Config> {
    let p = match clearpath_home() {
        Ok(home) => home.join("config.toml"),
        Err(e) => {
            tracing::warn!(error = %e, "no state home; using the default config");
            return Ok(Config::default());
        }
    };
    if !p.is_file() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    println!("# {}", config_path()?.display());
    print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
    Ok(())
}
