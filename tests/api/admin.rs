use crate::helpers::spawn_app;
use crate::helpers::valid_submission;

async fn register_team(
    app: &crate::helpers::TestApp,
    team_name: &str,
    church_name: &str,
) -> String {
    let body = valid_submission(team_name, church_name, 11);
    let resp = app.post_register(&body, None).await;
    assert_eq!(resp.status().as_u16(), 201);

    let row = sqlx::query!(
        "SELECT team_id FROM teams WHERE team_name = $1",
        team_name,
    )
    .fetch_one(&app.pool)
    .await
    .unwrap();
    row.team_id
}

#[tokio::test]
async fn list_teams_returns_submitted_team() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    register_team(&app, "Warriors", "Grace Church").await;

    let resp = app.list_teams("").await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["total"], 1);
    assert_eq!(json["teams"][0]["team_name"], "Warriors");
    assert_eq!(json["teams"][0]["registration_status"], "pending");
}

#[tokio::test]
async fn list_teams_filters_by_status() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    register_team(&app, "Warriors", "Grace Church").await;

    let resp = app.list_teams("status=confirmed").await;
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["total"], 0);
}

#[tokio::test]
async fn get_team_returns_full_detail_with_players() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    let team_id = register_team(&app, "Warriors", "Grace Church").await;

    let resp = app.get_team(&team_id).await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["team_name"], "Warriors");
    assert_eq!(json["players"].as_array().unwrap().len(), 11);
}

#[tokio::test]
async fn get_team_for_unknown_id_is_not_found() {
    let app = spawn_app().await;
    let resp = app.get_team("ICCT-999").await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn confirming_a_pending_team_moves_it_to_confirmed() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    let team_id = register_team(&app, "Warriors", "Grace Church").await;

    let resp = app.confirm_team(&team_id).await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "confirmed");
    assert!(json["already_confirmed"].is_null());

    let row = sqlx::query!(
        r#"SELECT registration_status as "registration_status: String" FROM teams WHERE team_id = $1"#,
        team_id,
    )
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(row.registration_status.unwrap(), "confirmed");
}

#[tokio::test]
async fn reconfirming_an_already_confirmed_team_is_idempotent() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    let team_id = register_team(&app, "Warriors", "Grace Church").await;
    let first = app.confirm_team(&team_id).await;
    assert_eq!(first.status().as_u16(), 200);

    let second = app.confirm_team(&team_id).await;
    assert_eq!(second.status().as_u16(), 200);
    let json: serde_json::Value = second.json().await.unwrap();
    assert_eq!(json["already_confirmed"], true);
}

#[tokio::test]
async fn rejecting_an_already_confirmed_team_is_an_invalid_transition() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    let team_id = register_team(&app, "Warriors", "Grace Church").await;
    let confirm_resp = app.confirm_team(&team_id).await;
    assert_eq!(confirm_resp.status().as_u16(), 200);

    let reject_resp = app.reject_team(&team_id).await;
    assert_eq!(reject_resp.status().as_u16(), 409);
    let json: serde_json::Value = reject_resp.json().await.unwrap();
    assert_eq!(json["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn churches_availability_reports_lock_state() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    register_team(&app, "Warriors", "Grace Church").await;
    register_team(&app, "Titans", "Grace Church").await;

    let resp = app.churches_availability().await;
    assert_eq!(resp.status().as_u16(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    let entry = json.as_array().unwrap().iter().find(|e| e["church_name"] == "Grace Church").unwrap();
    assert_eq!(entry["team_count"], 2);
    assert_eq!(entry["locked"], true);
}
