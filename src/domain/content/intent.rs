//! Intent analysis of free-form operator requests

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ContentType;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").unwrap());

/// What the operator should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimaryAction {
    #[default]
    Content,
    Image,
    Both,
    Analysis,
}

impl PrimaryAction {
    fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "image" => Self::Image,
            "both" => Self::Both,
            "analysis" => Self::Analysis,
            _ => Self::Content,
        }
    }

    pub fn wants_content(&self) -> bool {
        !matches!(self, Self::Image)
    }

    pub fn wants_image(&self) -> bool {
        matches!(self, Self::Image | Self::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Moderate,
    Complex,
}

impl Complexity {
    fn parse_lenient(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "simple" => Self::Simple,
            "complex" => Self::Complex,
            _ => Self::Moderate,
        }
    }
}

const DEFAULT_ESTIMATED_TOKENS: u32 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub primary_action: PrimaryAction,
    pub content_type: ContentType,
    pub complexity: Complexity,
    pub estimated_tokens: u32,
}

impl Default for IntentAnalysis {
    fn default() -> Self {
        Self {
            primary_action: PrimaryAction::Content,
            content_type: ContentType::Story,
            complexity: Complexity::Moderate,
            estimated_tokens: DEFAULT_ESTIMATED_TOKENS,
        }
    }
}

/// Loose shape of a model reply
#[derive(Debug, Deserialize)]
struct RawAnalysis {
    primary_action: Option<String>,
    content_type: Option<String>,
    complexity: Option<String>,
    estimated_tokens: Option<serde_json::Value>,
}

impl IntentAnalysis {
    /// Prompt asking a model to classify the request
    pub fn prompt(intent: &str) -> String {
        format!(
            "Analyze this user request and determine the appropriate response strategy:\n\n\
             Request: \"{intent}\"\n\n\
             Determine:\n\
             1. Primary action needed (content, image, both, analysis)\n\
             2. Content type if applicable (story, article, business, educational, creative)\n\
             3. Complexity level (simple, moderate, complex)\n\n\
             Respond with valid JSON only:\n\
             {{\"primary_action\": \"content|image|both|analysis\", \
             \"content_type\": \"story|article|business|educational|creative\", \
             \"complexity\": \"simple|moderate|complex\", \"estimated_tokens\": 500}}"
        )
    }

    /// Parse a model reply, possibly wrapped in a Markdown code fence.
    ///
    /// Anything that is not a JSON object yields the default analysis.
    pub fn parse(reply: &str) -> Self {
        let body = CODE_FENCE
            .captures(reply)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(reply)
            .trim();

        let raw: RawAnalysis = match serde_json::from_str(body) {
            Ok(raw) => raw,
            Err(_) => match extract_object(body).and_then(|o| serde_json::from_str(o).ok()) {
                Some(raw) => raw,
                None => return Self::default(),
            },
        };

        let estimated_tokens = raw
            .estimated_tokens
            .and_then(|v| match v {
                serde_json::Value::Number(n) => n.as_u64(),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            })
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(DEFAULT_ESTIMATED_TOKENS);

        Self {
            primary_action: raw
                .primary_action
                .as_deref()
                .map(PrimaryAction::parse_lenient)
                .unwrap_or_default(),
            content_type: raw
                .content_type
                .as_deref()
                .map(ContentType::parse_lenient)
                .unwrap_or_default(),
            complexity: raw
                .complexity
                .as_deref()
                .map(Complexity::parse_lenient)
                .unwrap_or_default(),
            estimated_tokens,
        }
    }

    /// Content type to generate; analysis requests get business content
    pub fn effective_content_type(&self) -> ContentType {
        match self.primary_action {
            PrimaryAction::Analysis => ContentType::Business,
            _ => self.content_type,
        }
    }
}

fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
