use super::passport::{ClinicianId, Passport};
use super::workflow::{Workflow, WorkflowId};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for passports so the service and orchestrator can be
/// exercised against in-memory implementations.
pub trait PassportRepository: Send + Sync {
    fn insert(&self, passport: Passport) -> Result<Passport, RepositoryError>;
    fn update(&self, passport: Passport) -> Result<(), RepositoryError>;
    fn fetch(&self, clinician_id: &ClinicianId) -> Result<Option<Passport>, RepositoryError>;
    fn list(&self, skip: usize, limit: usize) -> Result<Vec<Passport>, RepositoryError>;
}

/// Storage abstraction for workflows. Listing returns newest first.
pub trait WorkflowRepository: Send + Sync {
    fn insert(&self, workflow: Workflow) -> Result<Workflow, RepositoryError>;
    fn update(&self, workflow: Workflow) -> Result<(), RepositoryError>;
    fn fetch(&self, workflow_id: &WorkflowId) -> Result<Option<Workflow>, RepositoryError>;
    fn list(&self, clinician_id: Option<&ClinicianId>) -> Result<Vec<Workflow>, RepositoryError>;
}
