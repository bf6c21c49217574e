//! Integration tests for the audit trail service over in-memory
//! SurrealDB.

use caseflow_core::context::{RequestIdentity, TenantContext, UserType};
use caseflow_core::error::CaseflowError;
use caseflow_core::models::audit::{AuditAction, AuditOutcome, CreateAuditLogEntry};
use caseflow_core::models::employee::StaffRole;
use caseflow_core::repository::{AuditLogFilter, AuditLogRepository, Pagination};
use caseflow_db::repository::SurrealAuditLogRepository;
use caseflow_engine::{AuditTrailService, EngineConfig};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

fn staff_ctx(firm_id: Uuid) -> TenantContext {
    TenantContext::resolve(&RequestIdentity {
        user_id: Uuid::new_v4(),
        firm_id: Some(firm_id),
        user_type: UserType::Staff,
        staff_role: Some(StaffRole::Admin),
    })
    .unwrap()
}

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    caseflow_db::run_migrations(&db).await.unwrap();
    db
}

fn entry(firm_id: Uuid, action: AuditAction) -> CreateAuditLogEntry {
    CreateAuditLogEntry {
        firm_id,
        entity_type: "case".into(),
        entity_id: Uuid::new_v4(),
        action,
        actor_id: Uuid::new_v4(),
        actor_role: "Agent".into(),
        outcome: AuditOutcome::Success,
        metadata: serde_json::json!({}),
    }
}

#[tokio::test]
async fn query_is_scoped_to_callers_firm() {
    let db = setup().await;
    let repo = SurrealAuditLogRepository::new(db.clone());
    let firm_a = Uuid::new_v4();
    let firm_b = Uuid::new_v4();

    repo.append(entry(firm_a, AuditAction::StatusChange))
        .await
        .unwrap();
    repo.append(entry(firm_b, AuditAction::StatusChange))
        .await
        .unwrap();

    let service = AuditTrailService::new(
        SurrealAuditLogRepository::new(db),
        EngineConfig::default(),
    );
    let ctx = staff_ctx(firm_a);

    let page = service
        .query(&ctx, AuditLogFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert!(page.items.iter().all(|e| e.firm_id == firm_a));
}

#[tokio::test]
async fn client_callers_cannot_query_audit() {
    let db = setup().await;
    let service = AuditTrailService::new(
        SurrealAuditLogRepository::new(db),
        EngineConfig::default(),
    );

    let ctx = TenantContext::resolve(&RequestIdentity {
        user_id: Uuid::new_v4(),
        firm_id: Some(Uuid::new_v4()),
        user_type: UserType::Client,
        staff_role: None,
    })
    .unwrap();

    let result = service
        .query(&ctx, AuditLogFilter::default(), Pagination::default())
        .await;
    assert!(matches!(result, Err(CaseflowError::UnauthorizedRole { .. })));
}

#[tokio::test]
async fn page_limit_is_clamped() {
    let db = setup().await;
    let repo = SurrealAuditLogRepository::new(db.clone());
    let firm_id = Uuid::new_v4();

    for _ in 0..6 {
        repo.append(entry(firm_id, AuditAction::Access)).await.unwrap();
    }

    let service = AuditTrailService::new(
        SurrealAuditLogRepository::new(db),
        EngineConfig {
            audit_page_limit: 5,
            ..Default::default()
        },
    );
    let ctx = staff_ctx(firm_id);

    let page = service
        .query(
            &ctx,
            AuditLogFilter::default(),
            Pagination {
                offset: 0,
                limit: 500,
            },
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total, 6);
}
