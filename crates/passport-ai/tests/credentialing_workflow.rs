//! Integration specifications for the credentialing run: fan-out, task-run
//! bookkeeping, exception aggregation, audit cadence, and the evidence
//! bundle, all driven through the public orchestrator and ledger seams.

mod common {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::Value;

    use passport_ai::workflows::credentialing::audit::{AuditEvent, LedgerError, RunLedger, TaskRun};
    use passport_ai::workflows::credentialing::sample::{sample_passport, sample_registry_payload};
    use passport_ai::workflows::credentialing::verification::{NpiRegistry, RegistryError};
    use passport_ai::workflows::credentialing::workflow::{DestinationType, Workflow, WorkflowId};
    use passport_ai::workflows::credentialing::Passport;

    #[derive(Default, Clone)]
    pub(super) struct MemoryLedger {
        runs: Arc<Mutex<Vec<TaskRun>>>,
        events: Arc<Mutex<Vec<AuditEvent>>>,
    }

    impl RunLedger for MemoryLedger {
        fn record_task_run(&self, run: TaskRun) -> Result<(), LedgerError> {
            self.runs.lock().expect("runs mutex").push(run);
            Ok(())
        }

        fn update_task_run(&self, run: TaskRun) -> Result<(), LedgerError> {
            let mut guard = self.runs.lock().expect("runs mutex");
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
            Ok(self
                .runs
                .lock()
                .expect("runs mutex")
                .iter()
                .filter(|run| &run.workflow_id == workflow_id)
                .cloned()
                .collect())
        }

        fn append_event(&self, event: AuditEvent) -> Result<(), LedgerError> {
            self.events.lock().expect("events mutex").push(event);
            Ok(())
        }

        fn events(&self, workflow_id: &WorkflowId) -> Result<Vec<AuditEvent>, LedgerError> {
            Ok(self
                .events
                .lock()
                .expect("events mutex")
                .iter()
                .filter(|event| &event.workflow_id == workflow_id)
                .cloned()
                .collect())
        }
    }

    pub(super) struct CannedRegistry {
        payload: Value,
    }

    impl Default for CannedRegistry {
        fn default() -> Self {
            Self {
                payload: sample_registry_payload(),
            }
        }
    }

    #[async_trait]
    impl NpiRegistry for CannedRegistry {
        async fn lookup(&self, _npi: &str) -> Result<Value, RegistryError> {
            Ok(self.payload.clone())
        }
    }

    pub(super) struct UnreachableRegistry;

    #[async_trait]
    impl NpiRegistry for UnreachableRegistry {
        async fn lookup(&self, _npi: &str) -> Result<Value, RegistryError> {
            Err(RegistryError::Configuration(
                "NPPES registry unreachable".to_string(),
            ))
        }
    }

    pub(super) fn passport() -> Passport {
        sample_passport()
    }

    pub(super) fn passport_without_npi() -> Passport {
        let mut passport = sample_passport();
        for location in &mut passport.enrollment.practice_locations {
            location.npi = None;
        }
        passport
    }

    pub(super) fn group_workflow(clinician: &Passport) -> Workflow {
        Workflow::authorize(
            WorkflowId(format!("wf-test-{}", clinician.clinician_id)),
            clinician.clinician_id.clone(),
            "dest-group-001".to_string(),
            DestinationType::Group,
            Utc::now(),
        )
    }

    use passport_ai::workflows::credentialing::{
        ClinicianId, CredentialingService, PassportRepository, RepositoryError, WorkflowRepository,
    };
    use std::collections::BTreeMap;

    #[derive(Default, Clone)]
    pub(super) struct MemoryPassports {
        records: Arc<Mutex<BTreeMap<ClinicianId, Passport>>>,
    }

    impl PassportRepository for MemoryPassports {
        fn insert(&self, passport: Passport) -> Result<Passport, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&passport.clinician_id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(passport.clinician_id.clone(), passport.clone());
            Ok(passport)
        }

        fn update(&self, passport: Passport) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            guard.insert(passport.clinician_id.clone(), passport);
            Ok(())
        }

        fn fetch(&self, clinician_id: &ClinicianId) -> Result<Option<Passport>, RepositoryError> {
            Ok(self.records.lock().expect("lock").get(clinician_id).cloned())
        }

        fn list(&self, skip: usize, limit: usize) -> Result<Vec<Passport>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("lock")
                .values()
                .skip(skip)
                .take(limit)
                .cloned()
                .collect())
        }
    }

    #[derive(Default, Clone)]
    pub(super) struct MemoryWorkflows {
        records: Arc<Mutex<BTreeMap<WorkflowId, Workflow>>>,
    }

    impl WorkflowRepository for MemoryWorkflows {
        fn insert(&self, workflow: Workflow) -> Result<Workflow, RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            if guard.contains_key(&workflow.workflow_id) {
                return Err(RepositoryError::Conflict);
            }
            guard.insert(workflow.workflow_id.clone(), workflow.clone());
            Ok(workflow)
        }

        fn update(&self, workflow: Workflow) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("lock");
            guard.insert(workflow.workflow_id.clone(), workflow);
            Ok(())
        }

        fn fetch(&self, workflow_id: &WorkflowId) -> Result<Option<Workflow>, RepositoryError> {
            Ok(self.records.lock().expect("lock").get(workflow_id).cloned())
        }

        fn list(
            &self,
            clinician_id: Option<&ClinicianId>,
        ) -> Result<Vec<Workflow>, RepositoryError> {
            Ok(self
                .records
                .lock()
                .expect("lock")
                .values()
                .filter(|workflow| {
                    clinician_id.is_none() || clinician_id == Some(&workflow.clinician_id)
                })
                .cloned()
                .collect())
        }
    }

    pub(super) fn build_service(
    ) -> Arc<CredentialingService<MemoryPassports, MemoryWorkflows, MemoryLedger, CannedRegistry>>
    {
        Arc::new(CredentialingService::new(
            Arc::new(MemoryPassports::default()),
            Arc::new(MemoryWorkflows::default()),
            Arc::new(MemoryLedger::default()),
            Arc::new(CannedRegistry::default()),
        ))
    }
}

mod orchestration {
    use std::sync::Arc;

    use super::common::*;
    use passport_ai::workflows::credentialing::audit::{RunLedger, TaskRunStatus};
    use passport_ai::workflows::credentialing::tasks::{TaskOutcome, TaskOutput};
    use passport_ai::workflows::credentialing::{AgentKind, WorkflowOrchestrator, WorkflowStatus};

    #[tokio::test]
    async fn clean_run_completes_with_full_bookkeeping() {
        let ledger = Arc::new(MemoryLedger::default());
        let orchestrator =
            WorkflowOrchestrator::new(ledger.clone(), Arc::new(CannedRegistry::default()));
        let passport = passport();
        let workflow = group_workflow(&passport);
        let workflow_id = workflow.workflow_id.clone();

        let finished = orchestrator
            .run(workflow, &passport, Some("Acme Health"))
            .await
            .expect("run succeeds");

        assert_eq!(finished.status, WorkflowStatus::Completed);
        assert!(finished.exceptions.is_empty());

        let runs = ledger.task_runs(&workflow_id).expect("runs readable");
        assert_eq!(runs.len(), 5);
        assert!(runs.iter().all(|run| run.status.is_terminal()));
        assert!(runs
            .iter()
            .all(|run| run.started_at.is_some() && run.completed_at.is_some()));

        let events = ledger.events(&workflow_id).expect("events readable");
        assert_eq!(events.len(), 13);
        let count = |action: &str| events.iter().filter(|event| event.action == action).count();
        assert_eq!(count("workflow.started"), 1);
        assert_eq!(count("agent.started"), 5);
        assert_eq!(count("agent.completed"), 5);
        assert_eq!(count("evidence_bundle.created"), 1);
        assert_eq!(count("workflow.completed"), 1);

        let evidence = finished.evidence_bundle.expect("evidence bundle attached");
        assert_eq!(evidence.verifications.len(), 1);
        assert_eq!(evidence.submissions.len(), 1);
        assert_eq!(evidence.submissions[0].payer_name, "Acme Health");
        assert_eq!(evidence.citations.len(), 3);
    }

    #[tokio::test]
    async fn missing_npi_lands_in_pending_review_with_an_exception() {
        let ledger = Arc::new(MemoryLedger::default());
        let orchestrator =
            WorkflowOrchestrator::new(ledger.clone(), Arc::new(CannedRegistry::default()));
        let passport = passport_without_npi();
        let workflow = group_workflow(&passport);
        let workflow_id = workflow.workflow_id.clone();

        let finished = orchestrator
            .run(workflow, &passport, None)
            .await
            .expect("run succeeds");

        assert_eq!(finished.status, WorkflowStatus::PendingReview);
        assert_eq!(finished.exceptions.len(), 1);
        assert!(finished.exceptions[0].contains("No NPI"));
        assert!(finished.exceptions[0].contains("Primary Source Verification Agent"));

        let runs = ledger.task_runs(&workflow_id).expect("runs readable");
        let verification = runs
            .iter()
            .find(|run| run.agent == AgentKind::PrimarySourceVerification)
            .expect("verification run present");
        assert_eq!(verification.status, TaskRunStatus::Exception);
        assert_eq!(
            runs.iter()
                .filter(|run| run.status == TaskRunStatus::Completed)
                .count(),
            4
        );
    }

    #[tokio::test]
    async fn registry_failure_is_isolated_to_the_verification_task() {
        let ledger = Arc::new(MemoryLedger::default());
        let orchestrator = WorkflowOrchestrator::new(ledger.clone(), Arc::new(UnreachableRegistry));
        let passport = passport();
        let workflow = group_workflow(&passport);
        let workflow_id = workflow.workflow_id.clone();

        let finished = orchestrator
            .run(workflow, &passport, Some("Acme Health"))
            .await
            .expect("run succeeds despite the lookup failure");

        assert_eq!(finished.status, WorkflowStatus::PendingReview);
        assert_eq!(finished.exceptions.len(), 1);
        assert!(finished.exceptions[0].contains("unreachable"));

        let runs = ledger.task_runs(&workflow_id).expect("runs readable");
        let verification = runs
            .iter()
            .find(|run| run.agent == AgentKind::PrimarySourceVerification)
            .expect("verification run present");
        assert_eq!(verification.status, TaskRunStatus::Failed);
        assert!(verification
            .exception
            .as_deref()
            .is_some_and(|message| message.contains("unreachable")));

        let evidence = finished.evidence_bundle.expect("evidence bundle attached");
        assert_eq!(evidence.submissions.len(), 1, "payer task is unaffected");
    }

    #[tokio::test]
    async fn skipped_payer_submission_still_completes_the_run() {
        let ledger = Arc::new(MemoryLedger::default());
        let orchestrator =
            WorkflowOrchestrator::new(ledger.clone(), Arc::new(CannedRegistry::default()));
        let passport = passport();
        let workflow = group_workflow(&passport);
        let workflow_id = workflow.workflow_id.clone();

        let finished = orchestrator
            .run(workflow, &passport, None)
            .await
            .expect("run succeeds");

        assert_eq!(finished.status, WorkflowStatus::Completed);

        let runs = ledger.task_runs(&workflow_id).expect("runs readable");
        let payer = runs
            .iter()
            .find(|run| run.agent == AgentKind::PayerEnrollment)
            .expect("payer run present");
        assert_eq!(payer.status, TaskRunStatus::Completed);
        assert!(matches!(payer.outcome, Some(TaskOutcome::Skipped)));

        let evidence = finished.evidence_bundle.expect("evidence bundle attached");
        assert!(evidence.submissions.is_empty());
    }

    #[tokio::test]
    async fn repeated_runs_accumulate_task_and_audit_rows() {
        let ledger = Arc::new(MemoryLedger::default());
        let orchestrator =
            WorkflowOrchestrator::new(ledger.clone(), Arc::new(CannedRegistry::default()));
        let passport = passport();
        let workflow = group_workflow(&passport);
        let workflow_id = workflow.workflow_id.clone();

        let first = orchestrator
            .run(workflow, &passport, None)
            .await
            .expect("first run succeeds");
        let _second = orchestrator
            .run(first, &passport, None)
            .await
            .expect("second run succeeds");

        let runs = ledger.task_runs(&workflow_id).expect("runs readable");
        assert_eq!(runs.len(), 10, "rows accumulate instead of superseding");
        assert!(runs.iter().all(|run| run.status.is_terminal()));

        let events = ledger.events(&workflow_id).expect("events readable");
        assert_eq!(events.len(), 26);
    }

    #[tokio::test]
    async fn verification_evidence_embeds_the_raw_registry_payload() {
        let ledger = Arc::new(MemoryLedger::default());
        let orchestrator = WorkflowOrchestrator::new(ledger, Arc::new(CannedRegistry::default()));
        let passport = passport();
        let workflow = group_workflow(&passport);

        let finished = orchestrator
            .run(workflow, &passport, None)
            .await
            .expect("run succeeds");

        let evidence = finished.evidence_bundle.expect("evidence bundle attached");
        match &evidence.verifications[0] {
            TaskOutcome::Ok {
                output: TaskOutput::Verification(proof),
            } => {
                assert_eq!(proof.npi, "1234567890");
                assert_eq!(proof.registry["result_count"], 1);
                assert!(proof.citation_url.contains("npiregistry"));
            }
            other => panic!("expected verification evidence, got {other:?}"),
        }
    }
}

mod routing {
    use super::common::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use passport_ai::workflows::credentialing::credentialing_router;

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn read_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 2 * 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json body")
    }

    #[tokio::test]
    async fn seed_authorize_and_run_through_the_router() {
        let router = credentialing_router(build_service());

        let response = router
            .clone()
            .oneshot(post_json("/api/v1/demo/seed", json!({})))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);
        let seeded = read_json(response).await;
        let clinician_id = seeded["clinician_id"].as_str().expect("clinician id");

        let response = router
            .clone()
            .oneshot(post_json(
                &format!("/api/v1/passports/{clinician_id}/authorize"),
                json!({ "destination_id": "dest-001", "destination_type": "telehealth" }),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);
        let workflow = read_json(response).await;
        let workflow_id = workflow["workflow_id"].as_str().expect("workflow id");
        assert!(workflow["steps"]
            .as_array()
            .is_some_and(|steps| steps.iter().any(|step| step["step_id"] == "payer-enrollment")));

        let response = router
            .clone()
            .oneshot(post_json(
                &format!("/api/v1/workflows/{workflow_id}/run"),
                json!({}),
            ))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let finished = read_json(response).await;
        assert_eq!(finished["status"], "completed");
        assert_eq!(finished["exceptions"], json!([]));
    }

    #[tokio::test]
    async fn unknown_workflow_run_returns_not_found() {
        let router = credentialing_router(build_service());

        let response = router
            .clone()
            .oneshot(post_json("/api/v1/workflows/wf-missing/run", json!({})))
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn seeding_twice_keeps_a_single_passport() {
        let router = credentialing_router(build_service());

        for _ in 0..2 {
            router
                .clone()
                .oneshot(post_json("/api/v1/demo/seed", json!({})))
                .await
                .expect("router dispatch");
        }

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/v1/passports")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let listing = read_json(response).await;
        assert_eq!(listing.as_array().map(Vec::len), Some(1), "seed is idempotent");
    }
}
