//! Gemini REST implementation of the generative content gateway.

pub mod client;
pub mod prompts;
pub mod wire;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, GeminiGateway, GeminiSettings,
};
pub use prompts::DEFAULT_STYLE_HINT;
