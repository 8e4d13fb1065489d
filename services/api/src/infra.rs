use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use passport_ai::workflows::credentialing::audit::{AuditEvent, LedgerError, RunLedger, TaskRun};
use passport_ai::workflows::credentialing::sample::sample_registry_payload;
use passport_ai::workflows::credentialing::verification::{NpiRegistry, RegistryError};
use passport_ai::workflows::credentialing::{
    ClinicianId, Passport, PassportRepository, RepositoryError, Workflow, WorkflowId,
    WorkflowRepository,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPassportRepository {
    records: Arc<Mutex<BTreeMap<ClinicianId, Passport>>>,
}

impl PassportRepository for InMemoryPassportRepository {
    fn insert(&self, passport: Passport) -> Result<Passport, RepositoryError> {
        let mut guard = self.records.lock().expect("passport mutex poisoned");
        if guard.contains_key(&passport.clinician_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(passport.clinician_id.clone(), passport.clone());
        Ok(passport)
    }

    fn update(&self, passport: Passport) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("passport mutex poisoned");
        if guard.contains_key(&passport.clinician_id) {
            guard.insert(passport.clinician_id.clone(), passport);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, clinician_id: &ClinicianId) -> Result<Option<Passport>, RepositoryError> {
        let guard = self.records.lock().expect("passport mutex poisoned");
        Ok(guard.get(clinician_id).cloned())
    }

    fn list(&self, skip: usize, limit: usize) -> Result<Vec<Passport>, RepositoryError> {
        let guard = self.records.lock().expect("passport mutex poisoned");
        Ok(guard.values().skip(skip).take(limit).cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryWorkflowRepository {
    records: Arc<Mutex<BTreeMap<WorkflowId, Workflow>>>,
}

impl WorkflowRepository for InMemoryWorkflowRepository {
    fn insert(&self, workflow: Workflow) -> Result<Workflow, RepositoryError> {
        let mut guard = self.records.lock().expect("workflow mutex poisoned");
        if guard.contains_key(&workflow.workflow_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(workflow.workflow_id.clone(), workflow.clone());
        Ok(workflow)
    }

    fn update(&self, workflow: Workflow) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("workflow mutex poisoned");
        if guard.contains_key(&workflow.workflow_id) {
            guard.insert(workflow.workflow_id.clone(), workflow);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, workflow_id: &WorkflowId) -> Result<Option<Workflow>, RepositoryError> {
        let guard = self.records.lock().expect("workflow mutex poisoned");
        Ok(guard.get(workflow_id).cloned())
    }

    fn list(&self, clinician_id: Option<&ClinicianId>) -> Result<Vec<Workflow>, RepositoryError> {
        let guard = self.records.lock().expect("workflow mutex poisoned");
        let mut workflows: Vec<Workflow> = guard
            .values()
            .filter(|workflow| {
                clinician_id.is_none() || clinician_id == Some(&workflow.clinician_id)
            })
            .cloned()
            .collect();
        workflows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(workflows)
    }
}

/// Append-only ledger for task runs and audit events. Updates replace the
/// newest row with the same task id so accumulated history stays intact.
#[derive(Default, Clone)]
pub(crate) struct InMemoryRunLedger {
    runs: Arc<Mutex<Vec<TaskRun>>>,
    events: Arc<Mutex<Vec<AuditEvent>>>,
}

impl RunLedger for InMemoryRunLedger {
    fn record_task_run(&self, run: TaskRun) -> Result<(), LedgerError> {
        self.runs.lock().expect("run mutex poisoned").push(run);
        Ok(())
    }

    fn update_task_run(&self, run: TaskRun) -> Result<(), LedgerError> {
        let mut guard = self.runs.lock().expect("run mutex poisoned");
        match guard
            .iter_mut()
            .rev()
            .find(|stored| stored.task_id == run.task_id)
        {
            Some(stored) => {
                *stored = run;
                Ok(())
            }
            None => Err(LedgerError::UnknownTaskRun(run.task_id)),
        }
    }

    fn task_runs(&self, workflow_id: &WorkflowId) -> Result<Vec<TaskRun>, LedgerError> {
        let guard = self.runs.lock().expect("run mutex poisoned");
        Ok(guard
            .iter()
            .filter(|run| &run.workflow_id == workflow_id)
            .cloned()
            .collect())
    }

    fn append_event(&self, event: AuditEvent) -> Result<(), LedgerError> {
        self.events.lock().expect("event mutex poisoned").push(event);
        Ok(())
    }

    fn events(&self, workflow_id: &WorkflowId) -> Result<Vec<AuditEvent>, LedgerError> {
        let guard = self.events.lock().expect("event mutex poisoned");
        Ok(guard
            .iter()
            .filter(|event| &event.workflow_id == workflow_id)
            .cloned()
            .collect())
    }
}

/// Registry double returning the bundled NPPES payload, used by the CLI demo
/// so runs stay offline.
pub(crate) struct CannedNpiRegistry;

#[async_trait::async_trait]
impl NpiRegistry for CannedNpiRegistry {
    async fn lookup(&self, _npi: &str) -> Result<serde_json::Value, RegistryError> {
        Ok(sample_registry_payload())
    }
}

pub(crate) type InMemoryService<N> = passport_ai::workflows::credentialing::CredentialingService<
    InMemoryPassportRepository,
    InMemoryWorkflowRepository,
    InMemoryRunLedger,
    N,
>;

/// Wire a service over the in-memory stores with the given registry.
pub(crate) fn build_service<N: NpiRegistry + 'static>(registry: Arc<N>) -> Arc<InMemoryService<N>> {
    Arc::new(passport_ai::workflows::credentialing::CredentialingService::new(
        Arc::new(InMemoryPassportRepository::default()),
        Arc::new(InMemoryWorkflowRepository::default()),
        Arc::new(InMemoryRunLedger::default()),
        registry,
    ))
}

/// Guess a MIME type for an uploaded file name, e.g. `license.pdf` ->
/// `application/pdf`.
pub(crate) fn guess_content_type(file_name: &str) -> Option<String> {
    mime_guess::from_path(file_name)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

pub(crate) fn parse_date(raw: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_destination(
    raw: &str,
) -> Result<passport_ai::workflows::credentialing::DestinationType, String> {
    raw.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_is_guessed_from_the_extension() {
        assert_eq!(
            guess_content_type("ma-license.pdf").as_deref(),
            Some("application/pdf")
        );
        assert_eq!(guess_content_type("notes"), None);
    }
}
