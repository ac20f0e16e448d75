//! End-to-end flows over a migrated scratch database.
#![cfg(feature = "db-tests")]

mod support;

use axum::http::StatusCode;
use axum_test::TestServer;
use buvette_core::{
    api::routes::{utils, v1},
    seed::{self, SeedPasswords},
};
use buvette_server::AppState;
use serde_json::{Value, json};
use sqlx::PgPool;
use support::{path, server, state_for_pool};

async fn seeded(pool: PgPool) -> (AppState, TestServer) {
    let state = state_for_pool(pool);
    let passwords = SeedPasswords {
        demo_hash: state.passwords().hash_password(seed::DEMO_PASSWORD).unwrap(),
        admin_hash: state.passwords().hash_password(seed::ADMIN_PASSWORD).unwrap(),
    };
    seed::seed_demo(state.unit_of_work(), &passwords, state.schedules())
        .await
        .unwrap();
    let server = server(state.clone());
    (state, server)
}

async fn login(server: &TestServer, email: &str, password: &str) -> String {
    let response = server
        .post(v1::auth::LOGIN)
        .json(&json!({"email": email, "password": password}))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK, "login {email}");
    let body: Value = response.json();
    body["data"]["access_token"].as_str().unwrap().to_string()
}

#[sqlx::test(migrator = "buvette_core::MIGRATOR")]
async fn login_and_profile(pool: PgPool) {
    let (_, server) = seeded(pool).await;

    let wrong = server
        .post(v1::auth::LOGIN)
        .json(&json!({"email": "chef@example.com", "password": "not-the-one"}))
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let token = login(&server, "chef@example.com", seed::DEMO_PASSWORD).await;
    let me = server
        .get(v1::users::CURRENT)
        .authorization_bearer(&token)
        .await;
    assert_eq!(me.status_code(), StatusCode::OK);
    let body: Value = me.json();
    assert_eq!(body["data"]["email"], "chef@example.com");
    assert_eq!(body["data"]["roles"], json!(["CHEF_OPS"]));

    login(&server, seed::ADMIN_LOGIN, seed::ADMIN_PASSWORD).await;
}

#[sqlx::test(migrator = "buvette_core::MIGRATOR")]
async fn staffing_and_timesheet_workflow(pool: PgPool) {
    let (_, server) = seeded(pool).await;
    let admin = login(&server, seed::ADMIN_LOGIN, seed::ADMIN_PASSWORD).await;
    let chef = login(&server, "chef@example.com", seed::DEMO_PASSWORD).await;
    let rb = login(&server, "rb@example.com", seed::DEMO_PASSWORD).await;

    let events: Value = server.get(v1::events::COLLECTION).await.json();
    let event_id = events["data"][0]["id"].as_i64().unwrap();

    let assignments: Value = server
        .get(&path(v1::events::ASSIGNMENTS, &[("id", event_id)]))
        .await
        .json();
    let busy: Vec<i64> = assignments["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["buvette_id"].as_i64().unwrap())
        .collect();
    let links: Value = server
        .get(&path(v1::events::BUVETTES, &[("id", event_id)]))
        .await
        .json();
    let free: Vec<i64> = links["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["buvette_id"].as_i64().unwrap())
        .filter(|id| !busy.contains(id))
        .take(2)
        .collect();
    let (buvette_id, other_buvette_id) = (free[0], free[1]);

    let created = server
        .post(v1::staff::MEMBERS)
        .authorization_bearer(&admin)
        .json(&json!({"first_name": "Nina", "last_name": "Favre", "email": "nina@example.com"}))
        .await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    let staff: Value = created.json();
    let staff_id = staff["data"]["id"].as_i64().unwrap();
    assert_eq!(staff["data"]["staff_type"], "EXTRA");

    let assigned = server
        .post(&path(
            v1::events::STAFF,
            &[("id", event_id), ("buvette_id", buvette_id)],
        ))
        .authorization_bearer(&chef)
        .json(&json!({"staff_id": staff_id}))
        .await;
    assert_eq!(assigned.status_code(), StatusCode::CREATED);
    let assignment: Value = assigned.json();
    assert_eq!(assignment["data"]["slot_index"], 1);

    let again = server
        .post(&path(
            v1::events::STAFF,
            &[("id", event_id), ("buvette_id", other_buvette_id)],
        ))
        .authorization_bearer(&chef)
        .json(&json!({"staff_id": staff_id}))
        .await;
    assert_eq!(again.status_code(), StatusCode::CONFLICT);

    let submitted = server
        .post(&path(v1::events::timesheets::COLLECTION, &[("id", event_id)]))
        .json(&json!({
            "buvette_id": buvette_id,
            "shifts": [{
                "staff_id": staff_id,
                "position": "Caisse",
                "start_time": "22:00",
                "end_time": "01:00",
                "break_minutes": 30
            }]
        }))
        .await;
    assert_eq!(submitted.status_code(), StatusCode::CREATED);
    let timesheet: Value = submitted.json();
    assert_eq!(timesheet["data"]["status"], "SUBMITTED");
    assert_eq!(timesheet["data"]["shifts"][0]["hours_worked"], 2.5);
    let timesheet_id = timesheet["data"]["id"].as_i64().unwrap();

    let validated = server
        .post(&utils::replace_param(
            v1::timesheets::VALIDATE,
            "{id}",
            timesheet_id.to_string(),
        ))
        .authorization_bearer(&chef)
        .await;
    assert_eq!(validated.status_code(), StatusCode::OK);
    let validated: Value = validated.json();
    assert_eq!(validated["data"]["status"], "VALIDATED");

    let locked = server
        .put(&path(v1::timesheets::ITEM, &[("id", timesheet_id)]))
        .authorization_bearer(&rb)
        .json(&json!({"shifts": []}))
        .await;
    assert_eq!(locked.status_code(), StatusCode::BAD_REQUEST);

    let csv = server
        .get(&utils::with_query(
            &path(v1::events::HOURS_EXPORT, &[("id", event_id)]),
            &[("format", "csv")],
        ))
        .authorization_bearer(&chef)
        .await;
    assert_eq!(csv.status_code(), StatusCode::OK);
    assert!(
        csv.header("content-type")
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    assert!(csv.text().contains("Nina Favre"));
}

#[sqlx::test(migrator = "buvette_core::MIGRATOR")]
async fn inventory_sheet_and_final_count(pool: PgPool) {
    let (_, server) = seeded(pool).await;
    let chef = login(&server, "chef@example.com", seed::DEMO_PASSWORD).await;
    let rb = login(&server, "rb@example.com", seed::DEMO_PASSWORD).await;

    let events: Value = server.get(v1::events::COLLECTION).await.json();
    let event_id = events["data"][0]["id"].as_i64().unwrap();
    let buvette_id = events["data"][0]["buvettes"][0]["buvette_id"]
        .as_i64()
        .unwrap();
    let products: Value = server
        .get(v1::products::COLLECTION)
        .authorization_bearer(&chef)
        .await
        .json();
    let product_id = products["data"][0]["id"].as_i64().unwrap();

    let linked = server
        .post(&path(v1::buvettes::PRODUCTS, &[("id", buvette_id)]))
        .authorization_bearer(&chef)
        .json(&json!({"product_id": product_id, "display_order": 1}))
        .await;
    assert_eq!(linked.status_code(), StatusCode::CREATED);

    let sheet_path = path(
        v1::events::inventory::SHEET,
        &[("id", event_id), ("buvette_id", buvette_id)],
    );
    let saved = server
        .post(&sheet_path)
        .json(&json!({"items": [{"product_id": product_id, "initial_qty": 40}]}))
        .await;
    assert_eq!(saved.status_code(), StatusCode::OK);
    let saved: Value = saved.json();
    assert_eq!(saved["data"], json!({"success": true, "count": 1}));

    let snapshots = path(
        v1::events::inventory::SNAPSHOTS,
        &[("id", event_id), ("buvette_id", buvette_id)],
    );
    for (kind, quantity) in [("INITIAL", 40), ("FINAL", 12)] {
        let response = server
            .post(&snapshots)
            .authorization_bearer(&rb)
            .json(&json!({"type": kind, "items": [{"product_id": product_id, "quantity": quantity, "loss": 3}]}))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED, "{kind} count");
    }

    let sheet: Value = server.get(&sheet_path).await.json();
    let line = &sheet["data"]["products"][0];
    assert_eq!(line["product_id"], product_id);
    assert_eq!(line["initial_qty"], 40);
    assert_eq!(line["final_qty"], 12);
}

async fn first_event_buvette(server: &TestServer) -> (i64, i64) {
    let events: Value = server.get(v1::events::COLLECTION).await.json();
    let event = &events["data"][0];
    (
        event["id"].as_i64().unwrap(),
        event["buvettes"][0]["buvette_id"].as_i64().unwrap(),
    )
}

#[sqlx::test(migrator = "buvette_core::MIGRATOR")]
async fn unknown_product_is_a_bad_request(pool: PgPool) {
    let (_, server) = seeded(pool).await;
    let rb = login(&server, "rb@example.com", seed::DEMO_PASSWORD).await;
    let (event_id, buvette_id) = first_event_buvette(&server).await;
    let params = [("id", event_id), ("buvette_id", buvette_id)];

    let sheet = server
        .post(&path(v1::events::inventory::SHEET, &params))
        .json(&json!({"items": [{"product_id": 999999, "initial_qty": 3}]}))
        .await;
    assert_eq!(sheet.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = sheet.json();
    assert_eq!(body["error"]["message"], "Unknown product 999999");

    let snapshot = server
        .post(&path(v1::events::inventory::SNAPSHOTS, &params))
        .authorization_bearer(&rb)
        .json(&json!({"type": "INITIAL", "items": [{"product_id": 999999, "quantity": 4}]}))
        .await;
    assert_eq!(snapshot.status_code(), StatusCode::BAD_REQUEST);

    let listed: Value = server
        .get(&path(v1::events::inventory::SNAPSHOTS, &params))
        .authorization_bearer(&rb)
        .await
        .json();
    assert_eq!(listed["data"], json!([]));
}

#[sqlx::test(migrator = "buvette_core::MIGRATOR")]
async fn product_links_are_reordered_and_removed(pool: PgPool) {
    let (_, server) = seeded(pool).await;
    let chef = login(&server, "chef@example.com", seed::DEMO_PASSWORD).await;
    let (_, buvette_id) = first_event_buvette(&server).await;
    let products_path = path(v1::buvettes::PRODUCTS, &[("id", buvette_id)]);
    let reorder_path = path(v1::buvettes::PRODUCTS_REORDER, &[("id", buvette_id)]);

    let products: Value = server
        .get(v1::products::COLLECTION)
        .authorization_bearer(&chef)
        .await
        .json();
    let ids: Vec<i64> = products["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    let (first, second, unstocked) = (ids[0], ids[1], ids[2]);

    for (product_id, order) in [(first, 1), (second, 2)] {
        let linked = server
            .post(&products_path)
            .authorization_bearer(&chef)
            .json(&json!({"product_id": product_id, "display_order": order}))
            .await;
        assert_eq!(linked.status_code(), StatusCode::CREATED);
    }

    let reordered = server
        .put(&reorder_path)
        .authorization_bearer(&chef)
        .json(&json!({"items": [
            {"product_id": first, "display_order": 2},
            {"product_id": second, "display_order": 1}
        ]}))
        .await;
    assert_eq!(reordered.status_code(), StatusCode::OK);
    let links: Value = reordered.json();
    assert_eq!(links["data"][0]["product_id"], second);
    assert_eq!(links["data"][1]["product_id"], first);

    let partial = server
        .put(&reorder_path)
        .authorization_bearer(&chef)
        .json(&json!({"items": [
            {"product_id": first, "display_order": 7},
            {"product_id": unstocked, "display_order": 8}
        ]}))
        .await;
    assert_eq!(partial.status_code(), StatusCode::NOT_FOUND);
    let links: Value = server
        .get(&products_path)
        .authorization_bearer(&chef)
        .await
        .json();
    assert_eq!(links["data"][1]["product_id"], first);
    assert_eq!(links["data"][1]["display_order"], 2);

    let untouched = server
        .put(&reorder_path)
        .authorization_bearer(&chef)
        .json(&json!({"items": []}))
        .await;
    assert_eq!(untouched.status_code(), StatusCode::OK);

    let item_path = path(
        v1::buvettes::PRODUCT_ITEM,
        &[("id", buvette_id), ("product_id", second)],
    );
    let removed = server.delete(&item_path).authorization_bearer(&chef).await;
    assert_eq!(removed.status_code(), StatusCode::NO_CONTENT);
    let again = server.delete(&item_path).authorization_bearer(&chef).await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);

    let links: Value = server
        .get(&products_path)
        .authorization_bearer(&chef)
        .await
        .json();
    assert_eq!(links["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrator = "buvette_core::MIGRATOR")]
async fn checklist_moves_from_draft_to_validated(pool: PgPool) {
    let (_, server) = seeded(pool).await;
    let rb = login(&server, "rb@example.com", seed::DEMO_PASSWORD).await;
    let chef = login(&server, "chef@example.com", seed::DEMO_PASSWORD).await;
    let (event_id, buvette_id) = first_event_buvette(&server).await;

    let templates: Value = server
        .get(v1::checklists::TEMPLATES)
        .authorization_bearer(&rb)
        .await
        .json();
    let template = &templates["data"][0];
    assert_eq!(template["name"], "Ouverture Buvette");
    let template_id = template["id"].as_i64().unwrap();
    let answers: Vec<Value> = template["items"]
        .as_array()
        .unwrap()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let comment = if index == 0 { "Frigo en panne" } else { "" };
            json!({"item_id": item["id"], "value": index != 0, "comment": comment})
        })
        .collect();
    let fill_path = path(
        v1::events::checklists::FILL,
        &[("id", event_id), ("buvette_id", buvette_id), ("template_id", template_id)],
    );

    let filled = server
        .post(&fill_path)
        .authorization_bearer(&rb)
        .json(&json!({"items": answers}))
        .await;
    assert_eq!(filled.status_code(), StatusCode::CREATED);
    let filled: Value = filled.json();
    assert_eq!(filled["data"]["status"], "DRAFT");
    assert_eq!(
        filled["data"]["items"].as_array().unwrap().len(),
        answers.len()
    );
    let response_id = filled["data"]["id"].as_i64().unwrap();

    let blank = server
        .post(&fill_path)
        .authorization_bearer(&rb)
        .json(&json!({"items": []}))
        .await;
    assert_eq!(blank.status_code(), StatusCode::CREATED);

    let submitted: Value = server
        .post(&path(v1::checklists::RESPONSE_SUBMIT, &[("id", response_id)]))
        .authorization_bearer(&rb)
        .await
        .json();
    assert_eq!(submitted["data"]["status"], "SUBMITTED");

    let refused = server
        .post(&path(v1::checklists::RESPONSE_VALIDATE, &[("id", response_id)]))
        .authorization_bearer(&rb)
        .await;
    assert_eq!(refused.status_code(), StatusCode::FORBIDDEN);

    let validated: Value = server
        .post(&path(v1::checklists::RESPONSE_VALIDATE, &[("id", response_id)]))
        .authorization_bearer(&chef)
        .await
        .json();
    assert_eq!(validated["data"]["status"], "VALIDATED");
    assert!(validated["data"]["validated_at"].is_string());

    let stored: Value = server
        .get(&path(v1::checklists::RESPONSE_ITEM, &[("id", response_id)]))
        .authorization_bearer(&chef)
        .await
        .json();
    assert_eq!(stored["data"]["status"], "VALIDATED");

    let summary: Value = server
        .get(&path(v1::events::checklists::SUMMARY, &[("id", event_id)]))
        .authorization_bearer(&chef)
        .await
        .json();
    assert!(summary["data"].is_array());
}

#[sqlx::test(migrator = "buvette_core::MIGRATOR")]
async fn deleting_staff_member_drops_assignments(pool: PgPool) {
    let (_, server) = seeded(pool).await;
    let admin = login(&server, seed::ADMIN_LOGIN, seed::ADMIN_PASSWORD).await;
    let (event_id, _) = first_event_buvette(&server).await;
    let assignments_path = path(v1::events::ASSIGNMENTS, &[("id", event_id)]);

    let before: Value = server.get(&assignments_path).await.json();
    let before = before["data"].as_array().unwrap().clone();
    let staff_id = before[0]["staff_id"].as_i64().unwrap();
    let member_path = path(v1::staff::MEMBER_ITEM, &[("id", staff_id)]);

    let deleted = server.delete(&member_path).authorization_bearer(&admin).await;
    assert_eq!(deleted.status_code(), StatusCode::OK);
    let body: Value = deleted.json();
    assert_eq!(body["message"], "Staff member deleted");

    let after: Value = server.get(&assignments_path).await.json();
    let after = after["data"].as_array().unwrap();
    assert_eq!(after.len(), before.len() - 1);
    assert!(after.iter().all(|a| a["staff_id"] != staff_id));

    let again = server.delete(&member_path).authorization_bearer(&admin).await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);
}
