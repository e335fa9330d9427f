//! Content generation domain: content types, intent analysis, image prompts

mod content_type;
mod intent;

pub use content_type::ContentType;
pub use intent::{Complexity, IntentAnalysis, PrimaryAction};

/// Illustration prompt for an intent, worded differently when text was generated alongside
pub fn image_prompt(intent: &str, has_content: bool) -> String {
    if has_content {
        format!(
            "Create professional illustration based on: {}. Style: high-quality digital art, detailed, professional composition.",
            intent
        )
    } else {
        format!(
            "Professional illustration: {}. High-quality digital art style, detailed composition, vibrant colors.",
            intent
        )
    }
}

/// Prefix a prompt with the caller's style preference
pub fn with_style_preference(prompt: &str, style: Option<&str>) -> String {
    match style.map(str::trim).filter(|s| !s.is_empty()) {
        Some(style) => format!("User preferences: {}\n\n{}", style, prompt),
        None => prompt.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_prompt_variants() {
        assert_eq!(
            image_prompt("a red fox", false),
            "Professional illustration: a red fox. High-quality digital art style, detailed composition, vibrant colors."
        );
        assert!(image_prompt("a red fox", true).starts_with("Create professional illustration based on: a red fox."));
    }

    #[test]
    fn test_style_preference() {
        assert_eq!(
            with_style_preference("Write a memo", Some("formal")),
            "User preferences: formal\n\nWrite a memo"
        );
        assert_eq!(with_style_preference("Write a memo", Some("  ")), "Write a memo");
        assert_eq!(with_style_preference("Write a memo", None), "Write a memo");
    }
}
