//! Application services composed from providers, key management and storage

mod business_model_service;
mod content_service;
mod operator_service;
mod project_service;

pub use business_model_service::{BusinessModelService, ExecuteRequest, ExecuteResult};
pub use content_service::{illustration_prompt, ContentService};
pub use operator_service::{style_from_preferences, OperatorOutput, OperatorResult, OperatorService};
pub use project_service::{InitializeProject, InitializedProject, ProjectService};
