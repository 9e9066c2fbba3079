use clearpath_core::{DeficiencyType, STEPS_PER_GUIDE};
use serde_json::{Value, json};

/// Appended to step illustrations when the caller gives no hint of its own.
pub const DEFAULT_STYLE_HINT: &str = ", ultra realistic, high detail, 8k";

pub fn steps_prompt(task_name: &str) -> String {
    format!(
        "Generate a list of {STEPS_PER_GUIDE} detailed steps for the task: \"{task_name}\". \
         For each step, provide a title, a description, and a detailed image_prompt for an AI \
         image generator. Respond in JSON format."
    )
}

pub fn steps_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "title": {
                    "type": "STRING",
                    "description": "A short, clear title for the step."
                },
                "description": {
                    "type": "STRING",
                    "description": "A detailed explanation of how to perform this step."
                },
                "image_prompt": {
                    "type": "STRING",
                    "description": "A detailed, photorealistic prompt for an AI image generator to visualize this step."
                }
            },
            "required": ["title", "description", "image_prompt"]
        }
    })
}

pub fn image_prompt(prompt: &str, style_hint: Option<&str>) -> String {
    format!("{prompt}{}", style_hint.unwrap_or(DEFAULT_STYLE_HINT))
}

pub fn recolor_prompt(deficiency: DeficiencyType) -> String {
    let instruction = deficiency.instruction().trim_end_matches('.');
    format!(
        "You are an expert accessibility tool. {instruction}. Do not add, remove, or change any \
         objects in the image. Only perform color correction for accessibility. Briefly describe \
         the color changes you made."
    )
}

pub fn match_prompt(transcript: &str, options: &[String]) -> String {
    format!(
        "From the following list of options, which one is the best match for the user's request: \
         \"{transcript}\"?\n\nOptions:\n- {}\n\nRespond with ONLY the single, exact option from \
         the list. If no option is a good match, respond with the word \"None\".",
        options.join("\n- ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_prompt_hint() {
        assert_eq!(
            image_prompt("A red bucket", None),
            "A red bucket, ultra realistic, high detail, 8k"
        );
        assert_eq!(image_prompt("A red bucket", Some("")), "A red bucket");
    }

    #[test]
    fn test_recolor_prompt_single_period() {
        let p = recolor_prompt(DeficiencyType::Tritanopia);
        assert!(p.starts_with("You are an expert accessibility tool. The user has Tritanopia"));
        assert!(p.contains("yellows. Do not add"));
    }

    #[test]
    fn test_match_prompt_lists_every_option() {
        let opts = vec!["next".to_string(), "go back".to_string()];
        let p = match_prompt("back", &opts);
        assert!(p.contains("- next\n- go back"));
        assert!(p.contains("\"None\""));
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let s = steps_schema();
        assert_eq!(s["items"]["required"].as_array().unwrap().len(), 3);
    }
}
