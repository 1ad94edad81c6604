//! Authoring endpoints: CRUD, ownership, sharing, the dashboard and the theme catalog.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    body_json, create_surprise, delete, get, send_json, signup, surprise_body, test_app,
};
use lovecraft_core::ports::SurpriseStore;
use serde_json::json;

#[tokio::test]
async fn create_then_read_back() {
    let app = test_app();
    let cookie = signup(&app, "max@example.com").await;
    let id = create_surprise(&app, &cookie).await;

    let response = get(&app, &format!("/surprises/{id}"), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let surprise = body_json(response).await;
    assert_eq!(surprise["recipient"], "Eve");
    assert_eq!(surprise["sender"], "Max");
    assert_eq!(surprise["theme"], "romantique");
    assert_eq!(surprise["views"], 0);
    assert_eq!(surprise["completed_views"], 0);
}

#[tokio::test]
async fn unknown_theme_falls_back_to_classique() {
    let app = test_app();
    let cookie = signup(&app, "max@example.com").await;

    let mut body = surprise_body();
    body["theme"] = json!("disco");
    let response = send_json(&app, Method::POST, "/surprises", Some(&cookie), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["theme"], "classique");
}

#[tokio::test]
async fn invalid_content_is_rejected() {
    let app = test_app();
    let cookie = signup(&app, "max@example.com").await;

    let mut missing_recipient = surprise_body();
    missing_recipient["recipient"] = json!("   ");
    let response =
        send_json(&app, Method::POST, "/surprises", Some(&cookie), missing_recipient).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut too_long = surprise_body();
    too_long["final_message"] = json!("a".repeat(501));
    let response = send_json(&app, Method::POST, "/surprises", Some(&cookie), too_long).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut at_limit = surprise_body();
    at_limit["final_message"] = json!("é".repeat(500));
    let response = send_json(&app, Method::POST, "/surprises", Some(&cookie), at_limit).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn update_keeps_the_counters() {
    let app = test_app();
    let cookie = signup(&app, "max@example.com").await;
    let id = create_surprise(&app, &cookie).await;
    app.store.increment_views(&id).await.unwrap();

    let mut body = surprise_body();
    body["final_message"] = json!("Toujours toi");
    body["question"] = json!(null);
    body["answer"] = json!(null);
    let response = send_json(&app, Method::PUT, &format!("/surprises/{id}"), Some(&cookie), body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["final_message"], "Toujours toi");
    assert_eq!(updated["question"], serde_json::Value::Null);
    assert_eq!(updated["views"], 1);
}

#[tokio::test]
async fn other_users_cannot_see_or_change_a_surprise() {
    let app = test_app();
    let owner = signup(&app, "max@example.com").await;
    let stranger = signup(&app, "bob@example.com").await;
    let id = create_surprise(&app, &owner).await;
    let uri = format!("/surprises/{id}");

    assert_eq!(get(&app, &uri, Some(&stranger)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        send_json(&app, Method::PUT, &uri, Some(&stranger), surprise_body())
            .await
            .status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(delete(&app, &uri, Some(&stranger)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        get(&app, &format!("{uri}/share"), Some(&stranger)).await.status(),
        StatusCode::NOT_FOUND
    );

    let listed = body_json(get(&app, "/surprises", Some(&stranger)).await).await;
    assert_eq!(listed, json!([]));
    assert_eq!(get(&app, &uri, Some(&owner)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn delete_removes_the_surprise() {
    let app = test_app();
    let cookie = signup(&app, "max@example.com").await;
    let id = create_surprise(&app, &cookie).await;
    let uri = format!("/surprises/{id}");

    assert_eq!(delete(&app, &uri, Some(&cookie)).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(&app, &uri, Some(&cookie)).await.status(), StatusCode::NOT_FOUND);
    assert!(app.store.get_surprise(&id).await.is_err());
}

#[tokio::test]
async fn share_link_points_at_the_reveal_page() {
    let app = test_app();
    let cookie = signup(&app, "max@example.com").await;
    let id = create_surprise(&app, &cookie).await;

    let response = get(&app, &format!("/surprises/{id}/share"), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let share = body_json(response).await;
    assert_eq!(share["id"], id.as_str());
    assert_eq!(share["url"], format!("https://love.test/reveal?id={id}"));
}

#[tokio::test]
async fn list_is_newest_first() {
    let app = test_app();
    let cookie = signup(&app, "max@example.com").await;
    let first = create_surprise(&app, &cookie).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = create_surprise(&app, &cookie).await;

    let listed = body_json(get(&app, "/surprises", Some(&cookie)).await).await;
    let ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![second.as_str(), first.as_str()]);
}

#[tokio::test]
async fn dashboard_reports_stats_and_badges() {
    let app = test_app();
    let cookie = signup(&app, "max@example.com").await;

    let empty = body_json(get(&app, "/dashboard", Some(&cookie)).await).await;
    assert_eq!(empty["stats"]["total_surprises"], 0);
    assert_eq!(empty["badges"], json!([]));

    let id = create_surprise(&app, &cookie).await;
    for _ in 0..10 {
        app.store.increment_views(&id).await.unwrap();
    }

    let dashboard = body_json(get(&app, "/dashboard", Some(&cookie)).await).await;
    assert_eq!(dashboard["stats"]["total_surprises"], 1);
    assert_eq!(dashboard["stats"]["total_views"], 10);
    assert_eq!(dashboard["stats"]["completion_rate_percent"], 0);
    let codes: Vec<&str> = dashboard["badges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["first_surprise", "popular"]);
    assert_eq!(dashboard["surprises"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn theme_catalog_is_public() {
    let app = test_app();
    let response = get(&app, "/themes", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let themes = body_json(response).await;
    let names: Vec<&str> = themes
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["romantique", "geek", "fun", "classique"]);
}
