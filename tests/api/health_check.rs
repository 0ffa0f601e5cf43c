use crate::helpers::spawn_app;

#[tokio::test]
async fn health_check_reports_healthy() {
    let app = spawn_app().await;
    let resp = reqwest::Client::new()
        .get(format!("{}/health", app.addr))
        .send()
        .await
        .expect("execute request");

    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn status_reports_database_reachable() {
    let app = spawn_app().await;
    let resp = reqwest::Client::new()
        .get(format!("{}/status", app.addr))
        .send()
        .await
        .expect("execute request");

    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["database"], "reachable");
}
