use serde::{Deserialize, Serialize};

/// Kind of text the content generator produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Story,
    Article,
    Business,
    Educational,
    Creative,
}

impl ContentType {
    /// Lenient parse: unknown types produce a story
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "article" => Self::Article,
            "business" => Self::Business,
            "educational" => Self::Educational,
            "creative" => Self::Creative,
            _ => Self::Story,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Story => "story",
            Self::Article => "article",
            Self::Business => "business",
            Self::Educational => "educational",
            Self::Creative => "creative",
        }
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            Self::Story => {
                "You are a professional storyteller specializing in engaging, well-structured narratives."
            }
            Self::Article => {
                "You are a professional content writer creating informative, well-researched articles."
            }
            Self::Business => {
                "You are a business consultant creating professional, actionable business content."
            }
            Self::Educational => {
                "You are an expert educator creating clear, informative educational materials."
            }
            Self::Creative => "You are a creative writer producing original, imaginative content.",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lenient() {
        assert_eq!(ContentType::parse_lenient("Article"), ContentType::Article);
        assert_eq!(ContentType::parse_lenient("poem"), ContentType::Story);
        assert_eq!(ContentType::parse_lenient(""), ContentType::Story);
    }

    #[test]
    fn test_system_prompts() {
        assert!(ContentType::Story.system_prompt().contains("storyteller"));
        assert!(ContentType::Business.system_prompt().contains("business consultant"));
    }
}
