//! Integration tests for the case repository using in-memory SurrealDB.

use caseflow_core::error::CaseflowError;
use caseflow_core::models::case::{CasePriority, CaseStatus, CreateCase};
use caseflow_core::models::employee::{CreateEmployee, StaffRole};
use caseflow_core::models::firm::CreateFirm;
use caseflow_core::models::vault::verify_pin;
use caseflow_core::repository::{
    ApplyTransfer, ApplyTransition, AuditLogFilter, AuditLogRepository, CaseRepository,
    EmployeeRepository, FirmRepository, Pagination,
};
use caseflow_db::repository::{
    SurrealAuditLogRepository, SurrealCaseRepository, SurrealEmployeeRepository,
    SurrealFirmRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB, run migrations, create a firm and an
/// agent working for it.
async fn setup() -> (
    Surreal<surrealdb::engine::local::Db>,
    uuid::Uuid, // firm_id
    uuid::Uuid, // employee_id
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    caseflow_db::run_migrations(&db).await.unwrap();

    let firm_repo = SurrealFirmRepository::new(db.clone());
    let firm = firm_repo
        .create(CreateFirm {
            name: "Test Firm".into(),
            slug: "test-firm".into(),
            metadata: None,
        })
        .await
        .unwrap();

    let employee_repo = SurrealEmployeeRepository::new(db.clone());
    let employee = employee_repo
        .create(CreateEmployee {
            firm_id: firm.id,
            display_name: "Alice".into(),
            email: "alice@example.com".into(),
            role: StaffRole::Agent,
        })
        .await
        .unwrap();

    (db, firm.id, employee.id)
}

fn new_case(firm_id: Uuid, case_number: &str) -> CreateCase {
    CreateCase {
        firm_id,
        organization_id: Uuid::new_v4(),
        service_id: Uuid::new_v4(),
        case_number: case_number.into(),
        priority: CasePriority::Normal,
        assignee_id: None,
        flags: vec![],
        vault_pin: "4242".into(),
    }
}

#[tokio::test]
async fn create_and_get_case() {
    let (db, firm_id, _) = setup().await;
    let repo = SurrealCaseRepository::new(db);

    let case = repo.create(new_case(firm_id, "CASE-0001")).await.unwrap();

    assert_eq!(case.firm_id, firm_id);
    assert_eq!(case.case_number, "CASE-0001");
    assert_eq!(case.status, CaseStatus::Draft);
    assert_eq!(case.version, 1);
    assert!(case.assignee_id.is_none());

    // The PIN is stored hashed, never in plaintext.
    assert_ne!(case.vault_pin_hash, "4242");
    assert!(verify_pin("4242", &case.vault_pin_hash));

    let fetched = repo.get_by_id(firm_id, case.id).await.unwrap();
    assert_eq!(fetched.id, case.id);
    assert_eq!(fetched.case_number, "CASE-0001");
}

#[tokio::test]
async fn transition_bumps_version_and_records_history() {
    let (db, firm_id, employee_id) = setup().await;
    let repo = SurrealCaseRepository::new(db.clone());

    let case = repo.create(new_case(firm_id, "CASE-0002")).await.unwrap();

    let updated = repo
        .apply_transition(
            firm_id,
            case.id,
            ApplyTransition {
                from: CaseStatus::Draft,
                to: CaseStatus::Submitted,
                actor_id: employee_id,
                actor_role: "Agent".into(),
                reason: Some("initial submission".into()),
                expected_version: 1,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, CaseStatus::Submitted);
    assert_eq!(updated.version, 2);

    let transitions = repo.list_transitions(firm_id, case.id).await.unwrap();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].from_status, CaseStatus::Draft);
    assert_eq!(transitions[0].to_status, CaseStatus::Submitted);
    assert_eq!(transitions[0].actor_id, employee_id);
    assert_eq!(transitions[0].reason.as_deref(), Some("initial submission"));

    // The audit entry lands in the same commit as the transition.
    let audit_repo = SurrealAuditLogRepository::new(db);
    let entries = audit_repo
        .list(firm_id, AuditLogFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(entries.items.len(), 1);
    assert_eq!(
        entries.items[0].action,
        caseflow_core::models::audit::AuditAction::StatusChange
    );
    assert_eq!(entries.items[0].entity_id, case.id);
}

#[tokio::test]
async fn stale_version_rejected_without_side_effects() {
    let (db, firm_id, employee_id) = setup().await;
    let repo = SurrealCaseRepository::new(db.clone());

    let case = repo.create(new_case(firm_id, "CASE-0003")).await.unwrap();

    repo.apply_transition(
        firm_id,
        case.id,
        ApplyTransition {
            from: CaseStatus::Draft,
            to: CaseStatus::Submitted,
            actor_id: employee_id,
            actor_role: "Agent".into(),
            reason: None,
            expected_version: 1,
        },
    )
    .await
    .unwrap();

    // Replay against the old version must lose the CAS.
    let result = repo
        .apply_transition(
            firm_id,
            case.id,
            ApplyTransition {
                from: CaseStatus::Draft,
                to: CaseStatus::Submitted,
                actor_id: employee_id,
                actor_role: "Agent".into(),
                reason: None,
                expected_version: 1,
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(CaseflowError::ConcurrentModification { .. })
    ));

    // The failed attempt left no history or audit entries behind.
    let transitions = repo.list_transitions(firm_id, case.id).await.unwrap();
    assert_eq!(transitions.len(), 1);

    let audit_repo = SurrealAuditLogRepository::new(db);
    let entries = audit_repo
        .list(firm_id, AuditLogFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(entries.items.len(), 1);

    let fetched = repo.get_by_id(firm_id, case.id).await.unwrap();
    assert_eq!(fetched.version, 2);
}

#[tokio::test]
async fn transfer_reassigns_without_touching_status() {
    let (db, firm_id, employee_id) = setup().await;
    let repo = SurrealCaseRepository::new(db.clone());

    let case = repo.create(new_case(firm_id, "CASE-0004")).await.unwrap();

    let updated = repo
        .apply_transfer(
            firm_id,
            case.id,
            ApplyTransfer {
                from_employee_id: None,
                to_employee_id: employee_id,
                actor_id: employee_id,
                actor_role: "Agent".into(),
                reason: "workload balancing".into(),
                expected_version: 1,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.assignee_id, Some(employee_id));
    assert_eq!(updated.status, CaseStatus::Draft);
    assert_eq!(updated.version, 2);

    let transfers = repo.list_transfers(firm_id, case.id).await.unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].to_employee_id, employee_id);
    assert_eq!(transfers[0].reason, "workload balancing");
    assert!(transfers[0].from_employee_id.is_none());

    let audit_repo = SurrealAuditLogRepository::new(db);
    let entries = audit_repo
        .list(firm_id, AuditLogFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(entries.items.len(), 1);
    assert_eq!(
        entries.items[0].action,
        caseflow_core::models::audit::AuditAction::Transfer
    );
}

#[tokio::test]
async fn firm_isolation() {
    let (db, firm_a, _) = setup().await;

    let firm_repo = SurrealFirmRepository::new(db.clone());
    let firm_b = firm_repo
        .create(CreateFirm {
            name: "Other Firm".into(),
            slug: "other-firm".into(),
            metadata: None,
        })
        .await
        .unwrap();

    let repo = SurrealCaseRepository::new(db);
    let case = repo.create(new_case(firm_a, "CASE-0005")).await.unwrap();

    // Visible inside the owning firm.
    assert!(repo.get_by_id(firm_a, case.id).await.is_ok());

    // Invisible from another firm, indistinguishable from absence.
    let cross = repo.get_by_id(firm_b.id, case.id).await;
    assert!(matches!(cross, Err(CaseflowError::NotFound { .. })));
}

#[tokio::test]
async fn employee_directory_listing() {
    let (db, firm_id, _) = setup().await;
    let repo = SurrealEmployeeRepository::new(db);

    for i in 0..4 {
        repo.create(CreateEmployee {
            firm_id,
            display_name: format!("Employee {i}"),
            email: format!("employee-{i}@example.com"),
            role: StaffRole::Agent,
        })
        .await
        .unwrap();
    }

    let page = repo
        .list(
            firm_id,
            Pagination {
                offset: 0,
                limit: 3,
            },
        )
        .await
        .unwrap();

    // 4 created here plus the one from setup().
    assert_eq!(page.items.len(), 3);
    assert_eq!(page.total, 5);
}
