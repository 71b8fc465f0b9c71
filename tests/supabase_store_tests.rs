use chrono::NaiveDate;
use reqwest::Client;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use recipe_planner::config::SupabaseSettings;
use recipe_planner::models::MealSlot;
use recipe_planner::store::{AuthUser, Identity, NewPlannedMeal, PlanStore, StoreError, SupabaseStore};

fn may_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn store_for(server: &MockServer, access_token: Option<&str>) -> SupabaseStore {
    SupabaseStore::new(
        Client::new(),
        SupabaseSettings {
            url: server.uri(),
            anon_key: "anon".to_string(),
            access_token: access_token.map(str::to_string),
        },
    )
}

/// Compares the raw `Prefer` header, commas included.
fn prefer(expected: &'static str) -> impl Fn(&Request) -> bool + Send + Sync + 'static {
    move |request: &Request| {
        request.headers.get("prefer").and_then(|value| value.to_str().ok()) == Some(expected)
    }
}

fn plan_row(planned_meals: serde_json::Value) -> serde_json::Value {
    json!([{ "id": "p1", "user_id": "u1", "date": "2024-05-01", "planned_meals": planned_meals }])
}

fn breakfast(recipe_id: &str) -> NewPlannedMeal {
    NewPlannedMeal {
        recipe_id: recipe_id.to_string(),
        meal_type: MealSlot::Breakfast,
        servings: 2,
        notes: None,
    }
}

#[tokio::test]
async fn test_plan_upsert_merges_on_user_and_date() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/meal_plans"))
        .and(query_param("on_conflict", "user_id,date"))
        .and(prefer("resolution=merge-duplicates,return=representation"))
        .and(header("apikey", "anon"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({ "user_id": "u1", "date": "2024-05-01" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": "p1", "user_id": "u1", "date": "2024-05-01" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let row = store_for(&server, Some("tok"))
        .upsert_meal_plan("u1", may_first())
        .await
        .unwrap();

    assert_eq!(row.id, "p1");
    assert_eq!(row.date, may_first());
    assert!(row.planned_meals.is_empty());
}

#[tokio::test]
async fn test_plan_select_embeds_planned_meals() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/meal_plans"))
        .and(query_param("select", "*,planned_meals(*)"))
        .and(query_param("user_id", "eq.u1"))
        .and(query_param("date", "eq.2024-05-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(plan_row(json!([
            { "id": "m1", "meal_plan_id": "p1", "recipe_id": "52772", "meal_type": "breakfast", "servings": 1 },
            { "id": "m2", "meal_plan_id": "p1", "recipe_id": "52795", "meal_type": "snack", "servings": 2, "notes": "after gym" }
        ]))))
        .mount(&server)
        .await;

    let row = store_for(&server, Some("tok"))
        .select_meal_plan("u1", may_first())
        .await
        .unwrap()
        .expect("plan row");

    assert_eq!(row.planned_meals.len(), 2);
    assert_eq!(row.planned_meals[0].meal_type, MealSlot::Breakfast);
    assert_eq!(row.planned_meals[1].servings, 2);
    assert_eq!(row.planned_meals[1].notes.as_deref(), Some("after gym"));
    assert!(row.slot_taken(MealSlot::Breakfast));
    assert!(!row.slot_taken(MealSlot::Snack));
}

#[tokio::test]
async fn test_plan_select_with_no_rows_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/meal_plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let row = store_for(&server, Some("tok"))
        .select_meal_plan("u1", may_first())
        .await
        .unwrap();

    assert_eq!(row, None);
}

#[tokio::test]
async fn test_delete_targets_meal_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/planned_meals"))
        .and(query_param("id", "eq.m1"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server, Some("tok"))
        .delete_planned_meal("m1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_add_to_free_slot_upserts_then_inserts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/meal_plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/meal_plans"))
        .respond_with(ResponseTemplate::new(201).set_body_json(plan_row(json!([]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/planned_meals"))
        .and(prefer("return=representation"))
        .and(body_json(json!({
            "meal_plan_id": "p1",
            "recipe_id": "52772",
            "meal_type": "breakfast",
            "servings": 2
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "id": "m1", "meal_plan_id": "p1", "recipe_id": "52772", "meal_type": "breakfast", "servings": 2 }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let meal = store_for(&server, Some("tok"))
        .add_planned_meal("u1", may_first(), &breakfast("52772"))
        .await
        .unwrap();

    assert_eq!(meal.id, "m1");
    assert_eq!(meal.meal_plan_id, "p1");
}

#[tokio::test]
async fn test_add_to_filled_slot_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/meal_plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(plan_row(json!([
            { "id": "m1", "meal_plan_id": "p1", "recipe_id": "52772", "meal_type": "breakfast", "servings": 1 }
        ]))))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let result = store_for(&server, Some("tok"))
        .add_planned_meal("u1", may_first(), &breakfast("52795"))
        .await;

    assert!(matches!(result, Err(StoreError::SlotOccupied(MealSlot::Breakfast))));
}

#[tokio::test]
async fn test_expired_token_means_no_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "msg": "JWT expired" })))
        .expect(1)
        .mount(&server)
        .await;

    let user = store_for(&server, Some("stale")).current_user().await.unwrap();

    assert_eq!(user, None);
}

#[tokio::test]
async fn test_valid_token_resolves_current_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("apikey", "anon"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "email": "asha@example.com",
            "aud": "authenticated",
            "role": "authenticated"
        })))
        .mount(&server)
        .await;

    let user = store_for(&server, Some("tok")).current_user().await.unwrap();

    assert_eq!(
        user,
        Some(AuthUser {
            id: "u1".to_string(),
            email: Some("asha@example.com".to_string()),
        })
    );
}

#[tokio::test]
async fn test_sign_in_uses_password_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", "anon"))
        .and(body_json(json!({ "email": "asha@example.com", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "ref",
            "user": { "id": "u1", "email": "asha@example.com" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = store_for(&server, None)
        .sign_in("asha@example.com", "secret")
        .await
        .unwrap();

    assert_eq!(session.access_token, "tok");
    assert_eq!(session.refresh_token.as_deref(), Some("ref"));
    assert_eq!(session.user.id, "u1");
}

#[tokio::test]
async fn test_sign_in_with_wrong_password_is_invalid_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let result = store_for(&server, None).sign_in("asha@example.com", "wrong").await;

    assert!(matches!(result, Err(StoreError::InvalidCredentials)));
}

#[tokio::test]
async fn test_session_from_sign_in_authorizes_later_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/v1/user"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1" })))
        .expect(1)
        .mount(&server)
        .await;

    let signed_out = store_for(&server, None);
    assert_eq!(signed_out.current_user().await.unwrap(), None);

    let user = signed_out.with_access_token("fresh").current_user().await.unwrap();

    assert_eq!(user.map(|u| u.id), Some("u1".to_string()));
}
