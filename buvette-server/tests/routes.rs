//! Routing, authentication and role gates. Every request here is answered
//! before any query reaches the database.

mod support;

use axum::http::StatusCode;
use buvette_core::{api::routes::v1, domain::Role};
use serde_json::{Value, json};
use support::{access_token, offline_state, path, refresh_token, server};

#[tokio::test]
async fn ping_reports_ok() {
    let server = server(offline_state());
    let response = server.get("/ping").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn health_is_unavailable_without_database() {
    let server = server(offline_state());
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["checks"]["database"]["status"], "unhealthy");
}

#[tokio::test]
async fn root_redirects_to_front_end() {
    let server = server(offline_state());
    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.header("location"), "/index.html");
}

#[tokio::test]
async fn protected_route_requires_token() {
    let server = server(offline_state());
    let response = server.get(v1::users::CURRENT).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["error"]["status"], 401);
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn refresh_token_is_not_accepted_as_bearer() {
    let state = offline_state();
    let token = refresh_token(&state, 1, &[Role::Admin]);
    let server = server(state);
    let response = server
        .get(v1::users::CURRENT)
        .authorization_bearer(token)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn responsable_cannot_create_events() {
    let state = offline_state();
    let token = access_token(&state, 1, &[Role::Rb]);
    let server = server(state);
    let response = server
        .post(v1::events::COLLECTION)
        .authorization_bearer(token)
        .json(&json!({"name": "Match", "date": "2026-03-01T18:00:00Z"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn ops_lead_cannot_manage_staff_members() {
    let state = offline_state();
    let token = access_token(&state, 2, &[Role::ChefOps]);
    let server = server(state);
    let response = server
        .post(v1::staff::MEMBERS)
        .authorization_bearer(token)
        .json(&json!({"first_name": "Jean", "last_name": "Dupont"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn restock_is_closed_to_responsables() {
    let state = offline_state();
    let token = access_token(&state, 1, &[Role::Rb]);
    let server = server(state);
    let response = server
        .get(&path(v1::events::inventory::RESTOCK, &[("id", 1)]))
        .authorization_bearer(token)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_is_stateless() {
    let server = server(offline_state());
    let response = server.post(v1::auth::LOGOUT).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], "Logged out");
}

#[tokio::test]
async fn refresh_issues_a_new_pair() {
    let state = offline_state();
    let token = refresh_token(&state, 9, &[Role::Log]);
    let server = server(state.clone());

    let missing = server.post(v1::auth::REFRESH).json(&json!({})).await;
    assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);

    let garbage = server
        .post(v1::auth::REFRESH)
        .json(&json!({"refresh_token": "nope"}))
        .await;
    assert_eq!(garbage.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .post(v1::auth::REFRESH)
        .json(&json!({"refresh_token": token}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    let access = body["data"]["access_token"].as_str().unwrap();
    let claims = state.tokens().verify_access(access).unwrap();
    assert_eq!(claims.user_id(), Some(9));
    assert_eq!(claims.roles, vec![Role::Log]);
}

#[tokio::test]
async fn login_rejects_malformed_email_before_lookup() {
    let server = server(offline_state());
    let response = server
        .post(v1::auth::LOGIN)
        .json(&json!({"email": "chef@", "password": "password123"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn kiosk_lookup_requires_buvette_id() {
    let server = server(offline_state());
    let response = server
        .get(&path(v1::events::timesheets::BY_BUVETTE, &[("id", 1)]))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_arrival_time_is_rejected() {
    let state = offline_state();
    let token = access_token(&state, 2, &[Role::ChefOps]);
    let server = server(state);
    let response = server
        .patch(&path(
            v1::events::STAFF_ITEM,
            &[("id", 1), ("buvette_id", 2), ("staff_id", 3)],
        ))
        .authorization_bearer(token)
        .json(&json!({"arrival_time": "25:99"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_snapshot_is_rejected() {
    let state = offline_state();
    let token = access_token(&state, 1, &[Role::Rb]);
    let server = server(state);
    let response = server
        .post(&path(
            v1::events::inventory::SNAPSHOTS,
            &[("id", 1), ("buvette_id", 2)],
        ))
        .authorization_bearer(token)
        .json(&json!({"type": "INITIAL", "items": []}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assignment_without_staff_id_is_rejected() {
    let state = offline_state();
    let token = access_token(&state, 2, &[Role::Admin]);
    let server = server(state);
    let response = server
        .post(&path(v1::events::STAFF, &[("id", 1), ("buvette_id", 2)]))
        .authorization_bearer(token)
        .json(&json!({}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn back_office_shift_must_not_end_before_it_starts() {
    let state = offline_state();
    let token = access_token(&state, 1, &[Role::Rb]);
    let server = server(state);
    let response = server
        .put(&path(v1::timesheets::ITEM, &[("id", 5)]))
        .authorization_bearer(token)
        .json(&json!({"shifts": [{
            "staff_id": 3,
            "position": "Bar",
            "start_time": "2026-03-01T22:00:00Z",
            "end_time": "2026-03-01T18:00:00Z"
        }]}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body["error"]["message"],
        "end_time must not be before start_time"
    );
}
