//! Generative Content Gateway: the only egress point to the AI service.
//!
//! The trait is object safe so the composition root can build one instance at
//! startup and hand `Arc<dyn GenerativeGateway>` to every consumer.

use async_trait::async_trait;
use clearpath_media::ImageData;
use thiserror::Error;

use crate::deficiency::DeficiencyType;
use crate::step::{STEPS_PER_GUIDE, TaskStep};

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    #[error("request to the AI service failed: {0}")]
    Request(String),

    #[error("AI service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    EmptyResponse(String),

    #[error("AI response did not match the expected format: {0}")]
    Schema(String),
}

/// Recolored image plus the model's note about what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecolorResult {
    pub image: ImageData,
    pub description: String,
}

#[async_trait]
pub trait GenerativeGateway: Send + Sync {
    /// Decompose a task into [`STEPS_PER_GUIDE`] illustrated steps.
    async fn generate_steps(&self, task_name: &str) -> Result<Vec<TaskStep>, GatewayError>;

    async fn generate_image(
        &self,
        prompt: &str,
        style_hint: Option<&str>,
    ) -> Result<ImageData, GatewayError>;

    async fn recolor_image(
        &self,
        image: &ImageData,
        deficiency: DeficiencyType,
    ) -> Result<RecolorResult, GatewayError>;

    /// Pick the option that best matches `transcript`; `None` means no confident match.
    async fn match_option(
        &self,
        transcript: &str,
        options: &[String],
    ) -> Result<Option<String>, GatewayError>;
}

/// Check a generated step list against the guide schema.
pub fn validate_steps(
    task_name: &str,
    steps: Vec<TaskStep>,
) -> Result<Vec<TaskStep>, GatewayError> {
    if steps.len() != STEPS_PER_GUIDE {
        return Err(GatewayError::Schema(format!(
            "expected {STEPS_PER_GUIDE} steps for \"{task_name}\", got {}",
            steps.len()
        )));
    }
    if let Some(pos) = steps.iter().position(|s| !s.is_well_formed()) {
        return Err(GatewayError::Schema(format!(
            "step {} for \"{task_name}\" is missing a title, description or image prompt",
            pos + 1
        )));
    }
    Ok(steps)
}

/// Accept a model answer only if it is exactly one of the offered options.
pub fn accept_option(answer: &str, options: &[String]) -> Option<String> {
    let answer = answer.trim();
    options.iter().find(|o| o.as_str() == answer).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step() -> TaskStep {
        TaskStep::new("Title", "Description", "Prompt")
    }

    #[test]
    fn test_validate_requires_seven() {
        assert!(validate_steps("t", vec![step(); 7]).is_ok());
        let err = validate_steps("t", vec![step(); 6]).unwrap_err();
        assert!(err.to_string().contains("expected 7 steps"));
    }

    #[test]
    fn test_validate_rejects_blank_fields() {
        let mut steps = vec![step(); 7];
        steps[3].image_prompt = "  ".to_string();
        let err = validate_steps("t", steps).unwrap_err();
        assert!(err.to_string().contains("step 4"));
    }

    #[test]
    fn test_accept_option_is_exact() {
        let opts = vec!["Go Back".to_string(), "next".to_string()];
        assert_eq!(accept_option(" Go Back\n", &opts), Some("Go Back".to_string()));
        assert_eq!(accept_option("go back", &opts), None);
        assert_eq!(accept_option("None", &opts), None);
    }
}
