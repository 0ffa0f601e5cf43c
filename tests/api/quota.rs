use crate::helpers::spawn_app;
use crate::helpers::valid_submission;

/// `base.yaml` caps `max_teams_per_church` at 2. Fire 5 concurrent
/// submissions for the same church and expect exactly 2 to succeed — the
/// row lock in `check_church_quota` must serialize the race rather than let
/// every request observe a stale count.
#[tokio::test]
async fn concurrent_submissions_for_the_same_church_respect_the_quota() {
    let app = spawn_app().await;
    app.mock_object_store_success().await;
    app.mock_mail_success().await;

    let submissions: Vec<_> = (0..5)
        .map(|i| {
            let mut body = valid_submission(&format!("Team {i}"), "Grace Church", 11);
            body["captain"]["phone"] = serde_json::json!(format!("900000000{i}"));
            body
        })
        .collect();

    let addr = app.addr.clone();
    let handles: Vec<_> = submissions
        .into_iter()
        .map(|body| {
            let addr = addr.clone();
            tokio::spawn(async move {
                reqwest::Client::new()
                    .post(format!("{addr}/api/register/team"))
                    .json(&body)
                    .send()
                    .await
                    .expect("execute request")
                    .status()
                    .as_u16()
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for handle in handles {
        statuses.push(handle.await.unwrap());
    }

    let succeeded = statuses.iter().filter(|s| **s == 201).count();
    let quota_rejected = statuses.iter().filter(|s| **s == 409).count();
    assert_eq!(succeeded, 2);
    assert_eq!(quota_rejected, 3);

    let count = sqlx::query!("SELECT count(*) as \"count!\" FROM teams")
        .fetch_one(&app.pool)
        .await
        .unwrap()
        .count;
    assert_eq!(count, 2);
}
