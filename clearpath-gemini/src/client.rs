use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clearpath_core::input::{require_image, require_prompt};
use clearpath_core::{
    DeficiencyType, GatewayError, GenerativeGateway, RecolorResult, TaskStep, accept_option,
    validate_steps,
};
use clearpath_media::ImageData;
use tracing::{debug, warn};

use crate::prompts;
use crate::wire::{
    GenerateRequest, GenerateResponse, GenerationConfig, InlineData, Part, ThinkingConfig,
};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// [`GenerativeGateway`] backed by the Gemini `generateContent` endpoint.
pub struct GeminiGateway {
    client: reqwest::Client,
    settings: GeminiSettings,
    api_key: String,
}

impl GeminiGateway {
    pub fn new(settings: GeminiSettings, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            settings,
            api_key: api_key.into(),
        })
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{model}:generateContent",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    async fn generate(
        &self,
        model: &str,
        body: &GenerateRequest,
    ) -> Result<GenerateResponse, GatewayError> {
        debug!(model, "gemini generateContent");
        let resp = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;

        let status = resp.status();
        let txt = resp
            .text()
            .await
            .map_err(|e| GatewayError::Request(e.to_string()))?;
        if !status.is_success() {
            warn!(model, status = status.as_u16(), "gemini request failed");
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: txt,
            });
        }

        serde_json::from_str(&txt).map_err(|e| GatewayError::Schema(e.to_string()))
    }

    fn image_config() -> GenerationConfig {
        GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
            ..GenerationConfig::default()
        }
    }
}

fn decode_inline(inline: &InlineData) -> Result<ImageData, GatewayError> {
    let bytes = STANDARD
        .decode(inline.data.trim())
        .map_err(|e| GatewayError::Schema(format!("image payload is not base64: {e}")))?;
    Ok(ImageData::new(inline.mime_type.clone(), bytes))
}

#[async_trait]
impl GenerativeGateway for GeminiGateway {
    async fn generate_steps(&self, task_name: &str) -> Result<Vec<TaskStep>, GatewayError> {
        let body = GenerateRequest::text(prompts::steps_prompt(task_name)).with_config(
            GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(prompts::steps_schema()),
                ..GenerationConfig::default()
            },
        );
        let resp = self.generate(&self.settings.text_model, &body).await?;

        let txt = resp.text();
        if txt.is_empty() {
            return Err(GatewayError::EmptyResponse(format!(
                "Failed to generate steps for \"{task_name}\" from AI."
            )));
        }
        let steps: Vec<TaskStep> =
            serde_json::from_str(&txt).map_err(|e| GatewayError::Schema(e.to_string()))?;
        validate_steps(task_name, steps)
    }

    async fn generate_image(
        &self,
        prompt: &str,
        style_hint: Option<&str>,
    ) -> Result<ImageData, GatewayError> {
        let prompt = require_prompt(prompt)?;
        let body = GenerateRequest::text(prompts::image_prompt(prompt, style_hint))
            .with_config(Self::image_config());
        let resp = self.generate(&self.settings.image_model, &body).await?;

        match resp.first_inline() {
            Some(inline) => decode_inline(inline),
            None => Err(GatewayError::EmptyResponse(
                "No image data was found in the API response.".to_string(),
            )),
        }
    }

    async fn recolor_image(
        &self,
        image: &ImageData,
        deficiency: DeficiencyType,
    ) -> Result<RecolorResult, GatewayError> {
        let image = require_image(Some(image))?;
        let body = GenerateRequest::parts(vec![
            Part::inline(image.mime_type.clone(), STANDARD.encode(&image.bytes)),
            Part::text(prompts::recolor_prompt(deficiency)),
        ])
        .with_config(Self::image_config());
        let resp = self.generate(&self.settings.image_model, &body).await?;

        let Some(inline) = resp.first_inline() else {
            return Err(GatewayError::EmptyResponse(
                "No corrected image was found in the AI response.".to_string(),
            ));
        };
        Ok(RecolorResult {
            image: decode_inline(inline)?,
            description: resp.text(),
        })
    }

    async fn match_option(
        &self,
        transcript: &str,
        options: &[String],
    ) -> Result<Option<String>, GatewayError> {
        if options.is_empty() {
            return Ok(None);
        }
        let body = GenerateRequest::text(prompts::match_prompt(transcript, options)).with_config(
            GenerationConfig {
                thinking_config: Some(ThinkingConfig { thinking_budget: 0 }),
                ..GenerationConfig::default()
            },
        );
        let resp = self.generate(&self.settings.text_model, &body).await?;

        let answer = resp.text();
        debug!(%answer, "gemini match answer");
        Ok(accept_option(&answer, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let gw = GeminiGateway::new(
            GeminiSettings {
                base_url: "http://localhost:9/".to_string(),
                ..GeminiSettings::default()
            },
            "k",
        )
        .unwrap();
        assert_eq!(
            gw.endpoint("gemini-2.5-flash"),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_decode_inline_rejects_garbage() {
        let bad = InlineData {
            mime_type: "image/png".to_string(),
            data: "%%%".to_string(),
        };
        assert!(matches!(decode_inline(&bad), Err(GatewayError::Schema(_))));
    }
}
