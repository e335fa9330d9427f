//! Project records created by industry project managers

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::storage::{StorageEntity, StorageKey};
use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ProjectId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(|id| Self(id.to_string()))
            .map_err(|_| DomainError::validation(format!("Invalid project id: {}", s)))
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl StorageKey for ProjectId {
    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Industries with a dedicated project manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Industry {
    #[serde(rename = "software")]
    Software,
    #[serde(rename = "ai/ml")]
    AiMl,
    #[serde(rename = "media")]
    Media,
    #[serde(rename = "healthcare")]
    Healthcare,
    #[serde(rename = "finance")]
    Finance,
}

impl Industry {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Software => "software",
            Self::AiMl => "ai/ml",
            Self::Media => "media",
            Self::Healthcare => "healthcare",
            Self::Finance => "finance",
        }
    }

    pub fn manager_type(&self) -> &'static str {
        match self {
            Self::Software => "software_manager",
            Self::AiMl => "aiml_manager",
            Self::Media => "media_manager",
            Self::Healthcare => "healthcare_manager",
            Self::Finance => "finance_manager",
        }
    }

    pub fn initialization_prompt(&self, project_data: &serde_json::Value) -> String {
        format!(
            "Initialize a new {} project with data: {}",
            self.as_str(),
            project_data
        )
    }
}

impl FromStr for Industry {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "software" => Ok(Self::Software),
            "ai/ml" | "aiml" | "ai_ml" => Ok(Self::AiMl),
            "media" => Ok(Self::Media),
            "healthcare" => Ok(Self::Healthcare),
            "finance" => Ok(Self::Finance),
            _ => Err(DomainError::validation("Invalid industry")),
        }
    }
}

impl std::fmt::Display for Industry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Initialized,
    Active,
    Completed,
    Archived,
}

impl FromStr for ProjectStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "initialized" => Ok(Self::Initialized),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            other => Err(DomainError::validation(format!(
                "Invalid project status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub industry: Industry,
    pub manager_type: String,
    pub status: ProjectStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(industry: Industry, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::generate(),
            name: name.into(),
            description: None,
            industry,
            manager_type: industry.manager_type().to_string(),
            status: ProjectStatus::Initialized,
            created_by: None,
            metadata: serde_json::Value::Object(Default::default()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_created_by(mut self, created_by: Option<String>) -> Self {
        self.created_by = created_by;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

impl StorageEntity for Project {
    type Key = ProjectId;

    fn key(&self) -> &Self::Key {
        &self.id
    }
}
