//! Input validation done before any call to the AI service.

use clearpath_media::ImageData;

use crate::gateway::GatewayError;

pub fn require_prompt(prompt: &str) -> Result<&str, GatewayError> {
    let p = prompt.trim();
    if p.is_empty() {
        return Err(GatewayError::Validation(
            "Please enter a description for the image.".to_string(),
        ));
    }
    Ok(p)
}

pub fn require_image(image: Option<&ImageData>) -> Result<&ImageData, GatewayError> {
    match image {
        Some(img) if !img.is_empty() => Ok(img),
        _ => Err(GatewayError::Validation("Please upload an image first.".to_string())),
    }
}
