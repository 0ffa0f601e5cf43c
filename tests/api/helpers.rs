use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use sqlx::Connection;
use sqlx::Executor;
use sqlx::PgConnection;
use sqlx::PgPool;
use uuid::Uuid;
use wiremock::matchers::any;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

use tournament_registry::configuration::get_configuration;
use tournament_registry::configuration::DatabaseSettings;
use tournament_registry::startup::get_connection_pool;
use tournament_registry::startup::Application;
use tournament_registry::telemetry::get_subscriber;
use tournament_registry::telemetry::init_subscriber;

static TRACING: Lazy<()> = Lazy::new(|| match std::env::var("TEST_LOG") {
    Ok(_) => {
        let subscriber = get_subscriber("test", "debug", std::io::stdout);
        init_subscriber(subscriber);
    }
    Err(_) => {
        let subscriber = get_subscriber("test", "debug", std::io::sink);
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub addr: String,
    pub pool: PgPool,
    pub object_store_server: MockServer,
    pub mail_server: MockServer,
}

impl TestApp {
    pub async fn post_register(
        &self,
        body: &serde_json::Value,
        idempotency_key: Option<&str>,
    ) -> reqwest::Response {
        let mut req =
            reqwest::Client::new().post(format!("{}/api/register/team", self.addr)).json(body);
        if let Some(key) = idempotency_key {
            req = req.header("X-Idempotency-Key", key);
        }
        req.send().await.expect("execute request")
    }

    pub async fn get_team(
        &self,
        team_id: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/api/admin/teams/{team_id}", self.addr))
            .send()
            .await
            .expect("execute request")
    }

    pub async fn list_teams(
        &self,
        query: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/api/admin/teams?{query}", self.addr))
            .send()
            .await
            .expect("execute request")
    }

    pub async fn confirm_team(
        &self,
        team_id: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .put(format!("{}/api/admin/teams/{team_id}/confirm", self.addr))
            .send()
            .await
            .expect("execute request")
    }

    pub async fn reject_team(
        &self,
        team_id: &str,
    ) -> reqwest::Response {
        reqwest::Client::new()
            .put(format!("{}/api/admin/teams/{team_id}/reject", self.addr))
            .send()
            .await
            .expect("execute request")
    }

    pub async fn churches_availability(&self) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/api/admin/churches/availability", self.addr))
            .send()
            .await
            .expect("execute request")
    }

    /// Mock the object store to accept every PUT/POST/DELETE with 200.
    pub async fn mock_object_store_success(&self) {
        Mock::given(any()).respond_with(ResponseTemplate::new(200)).mount(&self.object_store_server).await;
    }

    pub async fn mock_mail_success(&self) {
        Mock::given(any()).respond_with(ResponseTemplate::new(200)).mount(&self.mail_server).await;
    }
}

async fn configure_database(cfg: &DatabaseSettings) -> PgPool {
    let mut conn = PgConnection::connect_with(&cfg.connection_without_db())
        .await
        .expect("postgres must be running");

    conn.execute(format!(r#"CREATE DATABASE "{}";"#, cfg.database_name).as_str()).await.unwrap();

    let pool = PgPool::connect_with(cfg.connection()).await.unwrap();
    sqlx::migrate!().run(&pool).await.expect("failed to migrate");
    pool
}

pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let object_store_server = MockServer::start().await;
    let mail_server = MockServer::start().await;

    let cfg = {
        let mut rand_cfg = get_configuration().unwrap();
        rand_cfg.database.database_name = Uuid::new_v4().to_string();
        rand_cfg.application.port = 0;
        rand_cfg.object_store.base_url = object_store_server.uri();
        rand_cfg.email_client.base_url = mail_server.uri();
        rand_cfg
    };

    configure_database(&cfg.database).await;

    let app = Application::build(cfg.clone()).await.unwrap();
    let addr = format!("http://localhost:{}", app.port());
    let pool = get_connection_pool(&cfg.database);
    tokio::spawn(app.run_until_stopped());

    TestApp { addr, pool, object_store_server, mail_server }
}

pub fn data_uri(
    mime: &str,
    bytes: &[u8],
) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

pub const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
pub const PDF_HEADER: &[u8] = b"%PDF-1.4";

pub fn valid_player(name: &str) -> serde_json::Value {
    serde_json::json!({ "name": name })
}

/// A minimal valid registration body with `player_count` players and no
/// artifacts attached.
pub fn valid_submission(
    team_name: &str,
    church_name: &str,
    player_count: usize,
) -> serde_json::Value {
    let players: Vec<_> =
        (0..player_count).map(|i| valid_player(&format!("Player {i}"))).collect();
    serde_json::json!({
        "teamName": team_name,
        "churchName": church_name,
        "captain": {
            "name": "John Doe",
            "phone": "9876543210",
            "whatsapp": "9876543210",
            "email": "john@example.com",
        },
        "viceCaptain": {
            "name": "Jane Doe",
            "phone": "9876543211",
            "whatsapp": "9876543211",
            "email": "jane@example.com",
        },
        "players": players,
        "pastorLetter": data_uri("application/pdf", PDF_HEADER),
        "paymentReceipt": data_uri("application/pdf", PDF_HEADER),
        "groupPhoto": data_uri("image/png", &PNG_HEADER),
    })
}
