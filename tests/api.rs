use actix_web::{http::StatusCode, test, web, App};
use groupsplit::repository::{GroupRepository, InMemoryRepository};
use groupsplit::routes;
use serde_json::{json, Value};
use std::sync::Arc;

macro_rules! app {
    () => {{
        let repository: Arc<dyn GroupRepository> = Arc::new(InMemoryRepository::new());
        test::init_service(
            App::new()
                .app_data(web::Data::from(repository))
                .configure(routes::configure),
        )
        .await
    }};
}

fn trip() -> Value {
    json!({
        "name": "Trip",
        "description": "Coast road trip",
        "creator": { "id": "a", "name": "Ana", "email": "ana@example.com" },
        "members": [
            { "id": "b", "name": "Ben" },
            { "id": "c", "name": "Cleo" }
        ]
    })
}

#[actix_web::test]
async fn test_equal_expense_settles_to_payer() {
    let app = app!();

    let req = test::TestRequest::put().uri("/groups/g1").set_json(trip()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/groups/g1/expenses")
        .set_json(json!({
            "description": "Hotel",
            "amount": 300,
            "paidBy": "a",
            "category": "Accommodation",
            "splitType": "equal"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/groups/g1/balance").to_request();
    let balances: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(balances[0]["memberId"], "a");
    assert_eq!(balances[0]["net"], "200.00");
    assert_eq!(balances[1]["net"], "-100.00");
    assert_eq!(balances[2]["owed"], "100.00");

    let req = test::TestRequest::get().uri("/groups/g1/settlements").to_request();
    let settlements: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        settlements["suggestions"],
        json!([
            { "fromMemberId": "b", "toMemberId": "a", "amount": "100.00" },
            { "fromMemberId": "c", "toMemberId": "a", "amount": "100.00" }
        ])
    );
    assert_eq!(settlements["warnings"], json!([]));
}

#[actix_web::test]
async fn test_categories_listed() {
    let app = app!();
    let req = test::TestRequest::get().uri("/categories").to_request();
    let categories: Vec<String> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(categories.len(), 9);
    assert_eq!(categories[0], "Food & Dining");
    assert_eq!(categories.last().map(String::as_str), Some("Other"));
}

#[actix_web::test]
async fn test_oversized_amount_is_bad_request() {
    let app = app!();
    let req = test::TestRequest::put().uri("/groups/g1").set_json(trip()).to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/groups/g1/expenses")
        .set_json(json!({
            "description": "Island",
            "amount": "46116860184273879.04",
            "paidBy": "a",
            "splitType": "equal"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "validation_error");

    let req = test::TestRequest::get().uri("/groups/g1/expenses").to_request();
    let expenses: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(expenses, json!([]));
}

#[actix_web::test]
async fn test_zero_shares_is_bad_request() {
    let app = app!();
    let req = test::TestRequest::put().uri("/groups/g1").set_json(trip()).to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/groups/g1/expenses")
        .set_json(json!({
            "description": "Snacks",
            "amount": 12,
            "paidBy": "b",
            "splitType": "shares",
            "customSplits": { "a": 0, "b": 0 }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["type"], "validation_error");
    assert_eq!(body["error"]["message"], "Validation error: zero total shares");
}

#[actix_web::test]
async fn test_unknown_split_type_rejected() {
    let app = app!();
    let req = test::TestRequest::put().uri("/groups/g1").set_json(trip()).to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/groups/g1/expenses")
        .set_json(json!({
            "description": "Gift",
            "amount": 30,
            "paidBy": "a",
            "splitType": "thirds"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_missing_group_is_not_found() {
    let app = app!();
    let req = test::TestRequest::get().uri("/groups/nope/summary").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_duplicate_group_conflicts() {
    let app = app!();
    let req = test::TestRequest::put().uri("/groups/g1").set_json(trip()).to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::put().uri("/groups/g1").set_json(trip()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_preview_flags_mismatched_exact_total() {
    let app = app!();
    let req = test::TestRequest::put().uri("/groups/g1").set_json(trip()).to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/groups/g1/splits/preview")
        .set_json(json!({
            "amount": 50,
            "splitType": "exact",
            "customSplits": { "a": 20, "b": 20 }
        }))
        .to_request();
    let preview: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(preview["totalMatches"], false);
    assert_eq!(preview["splits"], Value::Null);
    assert!(preview["error"].as_str().unwrap().contains("does not match"));
}

#[actix_web::test]
async fn test_referenced_member_cannot_leave() {
    let app = app!();
    let req = test::TestRequest::put().uri("/groups/g1").set_json(trip()).to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::post()
        .uri("/groups/g1/members")
        .set_json(json!({ "id": "d", "name": "Dev" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
        .uri("/groups/g1/expenses")
        .set_json(json!({
            "description": "Fuel",
            "amount": 40,
            "paidBy": "b",
            "category": "Transportation",
            "splitType": "exact",
            "customSplits": { "b": 20, "c": 20 }
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::delete().uri("/groups/g1/members/c").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::delete().uri("/groups/g1/members/d").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri("/groups/g1").to_request();
    let group: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(group["members"].as_array().unwrap().len(), 3);
    assert_eq!(group["createdBy"], "a");
}

#[actix_web::test]
async fn test_delete_group_removes_expenses() {
    let app = app!();
    let req = test::TestRequest::put().uri("/groups/g1").set_json(trip()).to_request();
    test::call_service(&app, req).await;
    let req = test::TestRequest::post()
        .uri("/groups/g1/expenses")
        .set_json(json!({
            "description": "Museum",
            "amount": 45,
            "paidBy": "c",
            "category": "Entertainment",
            "splitType": "percentage",
            "customSplits": { "a": 40, "b": 40, "c": 20 }
        }))
        .to_request();
    let expense: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(expense["splits"]["a"], "18.00");
    assert_eq!(expense["splits"]["c"], "9.00");

    let req = test::TestRequest::get().uri("/groups/g1/summary").to_request();
    let summary: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary["totalSpent"], "45.00");
    assert_eq!(summary["byCategory"]["Entertainment"], "45.00");

    let req = test::TestRequest::delete().uri("/groups/g1").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::get().uri("/groups/g1/expenses").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}
