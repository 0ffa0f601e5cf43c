use uuid::Uuid;

use crate::helpers::spawn_app;
use crate::helpers::valid_submission;

#[tokio::test]
async fn registering_a_valid_team_succeeds() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    let body = valid_submission("Warriors", "Grace Church", 11);
    let resp = app.post_register(&body, None).await;

    assert_eq!(resp.status().as_u16(), 201);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["team_name"], "Warriors");
    assert_eq!(json["player_count"], 11);
    assert_eq!(json["registration_status"], "pending");

    let row = sqlx::query!("SELECT team_name, church_name FROM teams")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(row.team_name, "Warriors");
    assert_eq!(row.church_name, "Grace Church");
}

#[tokio::test]
async fn too_few_players_is_rejected() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    let body = valid_submission("Warriors", "Grace Church", 5);
    let resp = app.post_register(&body, None).await;

    assert_eq!(resp.status().as_u16(), 422);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn invalid_captain_email_is_rejected_with_field() {
    let app = spawn_app().await;

    let mut body = valid_submission("Warriors", "Grace Church", 11);
    body["captain"]["email"] = serde_json::json!("not-an-email");
    let resp = app.post_register(&body, None).await;

    assert_eq!(resp.status().as_u16(), 422);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["field"], "captain.email");
}

#[tokio::test]
async fn duplicate_team_name_and_captain_phone_is_rejected() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    let body = valid_submission("Warriors", "Grace Church", 11);
    let first = app.post_register(&body, None).await;
    assert_eq!(first.status().as_u16(), 201);

    let second = app.post_register(&body, None).await;
    assert_eq!(second.status().as_u16(), 409);
    let json: serde_json::Value = second.json().await.unwrap();
    assert_eq!(json["code"], "DUPLICATE_TEAM");
}

#[tokio::test]
async fn replaying_the_same_idempotency_key_returns_the_cached_response() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    let key = Uuid::new_v4().to_string();
    let body = valid_submission("Warriors", "Grace Church", 11);

    let first = app.post_register(&body, Some(&key)).await;
    assert_eq!(first.status().as_u16(), 201);
    let first_json: serde_json::Value = first.json().await.unwrap();

    let second = app.post_register(&body, Some(&key)).await;
    assert_eq!(second.status().as_u16(), 201);
    let second_json: serde_json::Value = second.json().await.unwrap();

    assert_eq!(first_json, second_json);

    let count = sqlx::query!("SELECT count(*) as \"count!\" FROM teams")
        .fetch_one(&app.pool)
        .await
        .unwrap()
        .count;
    assert_eq!(count, 1);
}

#[tokio::test]
async fn reusing_idempotency_key_with_a_different_body_is_a_conflict() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    let key = Uuid::new_v4().to_string();
    let first = valid_submission("Warriors", "Grace Church", 11);
    let resp = app.post_register(&first, Some(&key)).await;
    assert_eq!(resp.status().as_u16(), 201);

    let second = valid_submission("Titans", "Grace Church", 11);
    let resp = app.post_register(&second, Some(&key)).await;
    assert_eq!(resp.status().as_u16(), 409);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "IDEMPOTENCY_CONFLICT");
}
