//! HTTP API tests over the in-memory engine.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use caseflow_core::models::case::{Case, CasePriority, CreateCase};
use caseflow_core::models::employee::{CreateEmployee, StaffRole};
use caseflow_core::models::firm::CreateFirm;
use caseflow_core::repository::{CaseRepository, EmployeeRepository, FirmRepository};
use caseflow_db::repository::{
    SurrealCaseRepository, SurrealEmployeeRepository, SurrealFirmRepository,
};
use caseflow_engine::EngineConfig;
use caseflow_server::{AppState, app};
use http_body_util::BodyExt;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tower::ServiceExt;
use uuid::Uuid;

struct Fixture {
    router: Router,
    firm_id: Uuid,
    employee_id: Uuid,
    case: Case,
}

async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    caseflow_db::run_migrations(&db).await.unwrap();

    let firm = SurrealFirmRepository::new(db.clone())
        .create(CreateFirm {
            name: "API Firm".into(),
            slug: "api-firm".into(),
            metadata: None,
        })
        .await
        .unwrap();

    let employee = SurrealEmployeeRepository::new(db.clone())
        .create(CreateEmployee {
            firm_id: firm.id,
            display_name: "Carol".into(),
            email: "carol@example.com".into(),
            role: StaffRole::Agent,
        })
        .await
        .unwrap();

    let case = SurrealCaseRepository::new(db.clone())
        .create(CreateCase {
            firm_id: firm.id,
            organization_id: Uuid::new_v4(),
            service_id: Uuid::new_v4(),
            case_number: "CASE-API-1".into(),
            priority: CasePriority::Normal,
            assignee_id: None,
            flags: vec![],
            vault_pin: "4242".into(),
        })
        .await
        .unwrap();

    let router = app(AppState::new(db, EngineConfig::default()));

    Fixture {
        router,
        firm_id: firm.id,
        employee_id: employee.id,
        case,
    }
}

fn staff_request(fx: &Fixture, method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", Uuid::new_v4().to_string())
        .header("x-firm-id", fx.firm_id.to_string())
        .header("x-user-type", "staff")
        .header("x-staff-role", "Manager");
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

fn client_request(fx: &Fixture, method: &str, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", Uuid::new_v4().to_string())
        .header("x-firm-id", fx.firm_id.to_string())
        .header("x-user-type", "client");
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_returns_envelope() {
    let fx = setup().await;

    let response = fx
        .router
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let fx = setup().await;
    let uri = format!("/cases/{}/history", fx.case.id);

    let response = fx
        .router
        .oneshot(Request::get(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "UNAUTHORIZED");
}

#[tokio::test]
async fn status_transition_round_trip() {
    let fx = setup().await;
    let uri = format!("/cases/{}/status", fx.case.id);

    let request = staff_request(
        &fx,
        "PATCH",
        &uri,
        Some(serde_json::json!({
            "status": "Submitted",
            "reason": "ready for intake",
            "expectedVersion": 1,
        })),
    );
    let response = fx.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], "Submitted");
    assert_eq!(json["data"]["version"], 2);
    // The PIN hash never leaves the server.
    assert!(json["data"].get("vault_pin_hash").is_none());

    // Off-table edge from the new status.
    let request = staff_request(
        &fx,
        "PATCH",
        &uri,
        Some(serde_json::json!({
            "status": "Completed",
            "expectedVersion": 2,
        })),
    );
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn client_cannot_transition() {
    let fx = setup().await;
    let uri = format!("/cases/{}/status", fx.case.id);

    let request = client_request(
        &fx,
        "PATCH",
        &uri,
        Some(serde_json::json!({
            "status": "Submitted",
            "expectedVersion": 1,
        })),
    );
    let response = fx.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "UNAUTHORIZED_ROLE");
}

#[tokio::test]
async fn transfer_and_history() {
    let fx = setup().await;

    let uri = format!("/cases/{}/transfer", fx.case.id);
    let request = staff_request(
        &fx,
        "POST",
        &uri,
        Some(serde_json::json!({
            "toEmployeeId": fx.employee_id,
            "reason": "workload balancing",
            "expectedVersion": 1,
        })),
    );
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["assignee_id"], fx.employee_id.to_string());

    // Missing reason is a validation failure.
    let request = staff_request(
        &fx,
        "POST",
        &uri,
        Some(serde_json::json!({
            "toEmployeeId": fx.employee_id,
            "reason": "  ",
            "expectedVersion": 2,
        })),
    );
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // History shows the transfer, readable by clients.
    let uri = format!("/cases/{}/history", fx.case.id);
    let request = client_request(&fx, "GET", &uri, None);
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let entries = json["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["kind"], "transfer");
}

#[tokio::test]
async fn vault_flow_over_http() {
    let fx = setup().await;
    let unlock_uri = format!("/vault/{}/unlock", fx.case.id);

    // Wrong PIN.
    let request = client_request(&fx, "POST", &unlock_uri, Some(serde_json::json!({"pin": "0000"})));
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "VAULT_INVALID_PIN");

    // Correct PIN.
    let request = client_request(&fx, "POST", &unlock_uri, Some(serde_json::json!({"pin": "4242"})));
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let session_id = json["data"]["sessionId"].as_str().unwrap().to_string();

    // Exclusive while live.
    let request = client_request(&fx, "POST", &unlock_uri, Some(serde_json::json!({"pin": "4242"})));
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["error"], "VAULT_SESSION_ACTIVE");

    // Heartbeat.
    let beat_uri = format!("/vault/{}/heartbeat", fx.case.id);
    let request = Request::post(&beat_uri)
        .header("x-user-id", Uuid::new_v4().to_string())
        .header("x-firm-id", fx.firm_id.to_string())
        .header("x-user-type", "client")
        .header("x-vault-session", &session_id)
        .body(Body::empty())
        .unwrap();
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Heartbeat without the session header.
    let request = client_request(&fx, "POST", &beat_uri, None);
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Lock, twice: idempotent.
    let lock_uri = format!("/vault/{}/lock", fx.case.id);
    for _ in 0..2 {
        let request = Request::post(&lock_uri)
            .header("x-user-id", Uuid::new_v4().to_string())
            .header("x-firm-id", fx.firm_id.to_string())
            .header("x-user-type", "client")
            .header("x-vault-session", &session_id)
            .body(Body::empty())
            .unwrap();
        let response = fx.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // The case unlocks again after the lock.
    let request = client_request(&fx, "POST", &unlock_uri, Some(serde_json::json!({"pin": "4242"})));
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn audit_endpoint_is_staff_only_and_scoped() {
    let fx = setup().await;

    // Produce one audit entry through a transition.
    let uri = format!("/cases/{}/status", fx.case.id);
    let request = staff_request(
        &fx,
        "PATCH",
        &uri,
        Some(serde_json::json!({
            "status": "Submitted",
            "expectedVersion": 1,
        })),
    );
    fx.router.clone().oneshot(request).await.unwrap();

    let request = staff_request(&fx, "GET", "/audit?limit=10", None);
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["action"], "StatusChange");

    let request = client_request(&fx, "GET", "/audit", None);
    let response = fx.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
