//! Integration tests for the audit log repository using in-memory
//! SurrealDB.

use caseflow_core::models::audit::{AuditAction, AuditOutcome, CreateAuditLogEntry};
use caseflow_core::repository::{AuditLogFilter, AuditLogRepository, Pagination};
use caseflow_db::repository::SurrealAuditLogRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    caseflow_db::run_migrations(&db).await.unwrap();
    db
}

fn entry(firm_id: Uuid, actor_id: Uuid, action: AuditAction) -> CreateAuditLogEntry {
    CreateAuditLogEntry {
        firm_id,
        entity_type: "case".into(),
        entity_id: Uuid::new_v4(),
        action,
        actor_id,
        actor_role: "Agent".into(),
        outcome: AuditOutcome::Success,
        metadata: serde_json::json!({"source": "test"}),
    }
}

#[tokio::test]
async fn append_and_list() {
    let db = setup().await;
    let repo = SurrealAuditLogRepository::new(db);
    let firm_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();

    let appended = repo
        .append(entry(firm_id, actor_id, AuditAction::Create))
        .await
        .unwrap();
    assert_eq!(appended.firm_id, firm_id);
    assert_eq!(appended.action, AuditAction::Create);
    assert_eq!(appended.outcome, AuditOutcome::Success);

    let page = repo
        .list(firm_id, AuditLogFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, appended.id);
}

#[tokio::test]
async fn list_is_firm_scoped() {
    let db = setup().await;
    let repo = SurrealAuditLogRepository::new(db);
    let firm_a = Uuid::new_v4();
    let firm_b = Uuid::new_v4();
    let actor_id = Uuid::new_v4();

    repo.append(entry(firm_a, actor_id, AuditAction::Create))
        .await
        .unwrap();
    repo.append(entry(firm_b, actor_id, AuditAction::Create))
        .await
        .unwrap();

    let page = repo
        .list(firm_a, AuditLogFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert!(page.items.iter().all(|e| e.firm_id == firm_a));
}

#[tokio::test]
async fn filter_by_action_and_actor() {
    let db = setup().await;
    let repo = SurrealAuditLogRepository::new(db);
    let firm_id = Uuid::new_v4();
    let actor_a = Uuid::new_v4();
    let actor_b = Uuid::new_v4();

    repo.append(entry(firm_id, actor_a, AuditAction::Unlock))
        .await
        .unwrap();
    repo.append(entry(firm_id, actor_a, AuditAction::Lock))
        .await
        .unwrap();
    repo.append(entry(firm_id, actor_b, AuditAction::Unlock))
        .await
        .unwrap();

    let by_action = repo
        .list(
            firm_id,
            AuditLogFilter {
                action: Some(AuditAction::Unlock),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_action.total, 2);
    assert!(
        by_action
            .items
            .iter()
            .all(|e| e.action == AuditAction::Unlock)
    );

    let by_actor = repo
        .list(
            firm_id,
            AuditLogFilter {
                actor_id: Some(actor_b),
                ..Default::default()
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_actor.total, 1);
    assert_eq!(by_actor.items[0].actor_id, actor_b);
}

#[tokio::test]
async fn list_orders_newest_first_with_pagination() {
    let db = setup().await;
    let repo = SurrealAuditLogRepository::new(db);
    let firm_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();

    for _ in 0..5 {
        repo.append(entry(firm_id, actor_id, AuditAction::Access))
            .await
            .unwrap();
    }

    let page1 = repo
        .list(
            firm_id,
            AuditLogFilter::default(),
            Pagination {
                offset: 0,
                limit: 3,
            },
        )
        .await
        .unwrap();
    assert_eq!(page1.items.len(), 3);
    assert_eq!(page1.total, 5);
    for pair in page1.items.windows(2) {
        assert!(pair[0].timestamp >= pair[1].timestamp);
    }

    let page2 = repo
        .list(
            firm_id,
            AuditLogFilter::default(),
            Pagination {
                offset: 3,
                limit: 3,
            },
        )
        .await
        .unwrap();
    assert_eq!(page2.items.len(), 2);
}

#[tokio::test]
async fn denied_outcomes_are_recorded() {
    let db = setup().await;
    let repo = SurrealAuditLogRepository::new(db);
    let firm_id = Uuid::new_v4();
    let actor_id = Uuid::new_v4();

    let mut denied = entry(firm_id, actor_id, AuditAction::Access);
    denied.outcome = AuditOutcome::Denied;
    repo.append(denied).await.unwrap();

    let page = repo
        .list(firm_id, AuditLogFilter::default(), Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.items[0].outcome, AuditOutcome::Denied);
}
