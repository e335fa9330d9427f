//! Project initialization by industry project managers

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use crate::domain::project::{Industry, Project, ProjectId, ProjectStatus};
use crate::domain::storage::Storage;
use crate::domain::DomainError;
use crate::infrastructure::llm::{GenerationParams, ProviderDispatcher};

#[derive(Debug, Clone, Default)]
pub struct InitializeProject {
    pub industry: String,
    pub project_data: Value,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InitializedProject {
    pub project: Project,
    pub raw_response: String,
}

#[derive(Debug, Clone)]
pub struct ProjectService {
    storage: Arc<dyn Storage<Project>>,
    dispatcher: Arc<ProviderDispatcher>,
}

fn project_name(industry: Industry, project_data: &Value, name: Option<String>) -> String {
    project_data
        .get("project_name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or(name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("{} project", industry))
}

impl ProjectService {
    pub fn new(storage: Arc<dyn Storage<Project>>, dispatcher: Arc<ProviderDispatcher>) -> Self {
        Self {
            storage,
            dispatcher,
        }
    }

    /// Ask the default provider for a plan and persist the project with it
    pub async fn initialize(
        &self,
        request: InitializeProject,
    ) -> Result<InitializedProject, DomainError> {
        let industry: Industry = request.industry.parse()?;
        let project_data = match request.project_data {
            Value::Null => json!({}),
            data => data,
        };

        let generation = self
            .dispatcher
            .generate(
                None,
                &industry.initialization_prompt(&project_data),
                GenerationParams::default(),
            )
            .await?;

        let name = project_name(industry, &project_data, request.name);
        let metadata = json!({
            "project_data": project_data,
            "plan": { "raw_response": generation.content },
        });

        let project = Project::new(industry, name)
            .with_description(request.description)
            .with_created_by(request.created_by)
            .with_metadata(metadata);

        let project = self.storage.create(project).await?;
        info!(project_id = %project.id, industry = %industry, "Project initialized");

        Ok(InitializedProject {
            project,
            raw_response: generation.content,
        })
    }

    pub async fn get(&self, id: &ProjectId) -> Result<Project, DomainError> {
        self.storage
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Project {} not found", id)))
    }

    /// Oldest first
    pub async fn list(&self) -> Result<Vec<Project>, DomainError> {
        let mut projects = self.storage.list().await?;
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(projects)
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.storage.count().await
    }

    pub async fn update_status(
        &self,
        id: &ProjectId,
        status: ProjectStatus,
    ) -> Result<Project, DomainError> {
        let mut project = self.get(id).await?;
        project.set_status(status);
        let project = self.storage.update(project).await?;
        info!(project_id = %id, status = ?status, "Project status updated");
        Ok(project)
    }

    pub async fn delete(&self, id: &ProjectId) -> Result<(), DomainError> {
        if !self.storage.delete(id).await? {
            return Err(DomainError::not_found(format!("Project {} not found", id)));
        }
        info!(project_id = %id, "Project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::ProviderKind;
    use crate::infrastructure::storage::InMemoryStorage;

    fn service(provider: Arc<MockLlmProvider>) -> ProjectService {
        let dispatcher = Arc::new(
            ProviderDispatcher::new(ProviderKind::Llama).with_provider(ProviderKind::Llama, provider),
        );
        ProjectService::new(Arc::new(InMemoryStorage::<Project>::new()), dispatcher)
    }

    fn request(industry: &str, data: Value) -> InitializeProject {
        InitializeProject {
            industry: industry.to_string(),
            project_data: data,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_initialize_persists_plan() {
        let provider = Arc::new(MockLlmProvider::new("llama").with_reply("1. Scope\n2. Build"));
        let service = service(provider.clone());

        let initialized = service
            .initialize(request("Software", json!({"project_name": "Gateway", "team": 4})))
            .await
            .unwrap();

        assert_eq!(initialized.raw_response, "1. Scope\n2. Build");
        let project = &initialized.project;
        assert_eq!(project.name, "Gateway");
        assert_eq!(project.industry, Industry::Software);
        assert_eq!(project.manager_type, "software_manager");
        assert_eq!(project.metadata["project_data"]["team"], 4);
        assert_eq!(project.metadata["plan"]["raw_response"], "1. Scope\n2. Build");

        let (_, llm_request) = provider.last_request().unwrap();
        assert!(llm_request.messages[0]
            .content
            .starts_with("Initialize a new software project with data:"));

        let stored = service.get(&project.id).await.unwrap();
        assert_eq!(stored.name, "Gateway");
    }

    #[tokio::test]
    async fn test_name_fallbacks() {
        let provider = Arc::new(MockLlmProvider::new("llama").with_reply("plan"));
        let service = service(provider);

        let mut named = request("finance", Value::Null);
        named.name = Some("Ledger".to_string());
        let project = service.initialize(named).await.unwrap().project;
        assert_eq!(project.name, "Ledger");
        assert_eq!(project.metadata["project_data"], json!({}));

        let project = service
            .initialize(request("media", Value::Null))
            .await
            .unwrap()
            .project;
        assert_eq!(project.name, "media project");
    }

    #[tokio::test]
    async fn test_invalid_industry_skips_provider() {
        let provider = Arc::new(MockLlmProvider::new("llama").with_reply("plan"));
        let service = service(provider.clone());

        let err = service
            .initialize(request("retail", json!({})))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Invalid industry");
        assert!(provider.requests().is_empty());
        assert_eq!(service.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_persists_nothing() {
        let provider = Arc::new(MockLlmProvider::new("llama").with_error("timeout"));
        let service = service(provider);

        let err = service
            .initialize(request("healthcare", json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Provider { .. }));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_and_delete() {
        let provider = Arc::new(MockLlmProvider::new("llama").with_reply("plan"));
        let service = service(provider);

        let id = service
            .initialize(request("ai/ml", json!({})))
            .await
            .unwrap()
            .project
            .id;

        let updated = service
            .update_status(&id, ProjectStatus::Active)
            .await
            .unwrap();
        assert_eq!(updated.status, ProjectStatus::Active);

        service.delete(&id).await.unwrap();
        assert!(matches!(
            service.get(&id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
        assert!(matches!(
            service.delete(&id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }
}
