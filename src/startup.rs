use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_actix_web::TracingLogger;

use crate::configuration::DatabaseSettings;
use crate::configuration::RegistrationSettings;
use crate::configuration::Settings;
use crate::coordinator::Coordinator;
use crate::notifications;
use crate::notifications::MailClient;
use crate::resilience::CircuitBreaker;
use crate::routes::churches_availability;
use crate::routes::confirm_team;
use crate::routes::get_player;
use crate::routes::get_team;
use crate::routes::health_check;
use crate::routes::list_teams;
use crate::routes::register_team;
use crate::routes::reject_team;
use crate::routes::status;
use crate::sequence::reconcile_on_startup;
use crate::storage::ObjectStore;
use crate::storage::ObjectStoreClient;

/// Wrapper around actix's `Server` exposing the bound port, mainly so tests
/// can spin up an instance on a random port and know where to reach it.
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", settings.application.host, settings.application.port);
        let listener = TcpListener::bind(addr)?;
        let port = listener.local_addr()?.port();

        let pool = get_connection_pool(&settings.database);
        reconcile_on_startup(&pool, &settings.registration.team_id_prefix).await?;

        let object_store: Arc<dyn ObjectStore> = Arc::new(ObjectStoreClient::new(
            settings.object_store.base_url.clone(),
            settings.object_store.bucket.clone(),
            settings.object_store.authorization_token.clone(),
            settings.object_store.timeout(),
        ));

        let mail_sender = settings
            .email_client
            .sender()
            .map_err(|e| anyhow::anyhow!("invalid configured sender email: {e}"))?;
        let mail_client = Arc::new(MailClient::new(
            settings.email_client.base_url.clone(),
            mail_sender,
            settings.email_client.authorization_token.clone(),
            settings.email_client.timeout(),
        ));

        let upload_breaker =
            CircuitBreaker::new(settings.circuit.threshold_failures, Duration::from_secs(settings.circuit.cool_off_secs));
        let mail_breaker =
            CircuitBreaker::new(settings.circuit.threshold_failures, Duration::from_secs(settings.circuit.cool_off_secs));

        let notification_queue = notifications::spawn(
            settings.notification.queue_capacity,
            settings.notification.worker_count,
            mail_client,
            mail_breaker,
            Duration::from_millis(settings.retry.max_backoff_millis * settings.retry.mail_max_attempts as u64),
            Duration::from_millis(settings.retry.initial_backoff_millis),
        );

        let coordinator = Coordinator {
            pool: pool.clone(),
            object_store: Arc::clone(&object_store),
            notifications: notification_queue,
            upload_breaker,
            registration: settings.registration.clone(),
            retry: settings.retry.clone(),
            end_to_end_deadline: Duration::from_secs(settings.application.end_to_end_deadline_secs),
        };

        let server = run(listener, pool, object_store, coordinator, settings.registration).await?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 { self.port }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

pub fn get_connection_pool(db_settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(db_settings.connection())
}

async fn run(
    listener: TcpListener,
    pool: PgPool,
    object_store: Arc<dyn ObjectStore>,
    coordinator: Coordinator,
    registration: RegistrationSettings,
) -> Result<Server, anyhow::Error> {
    let pool = web::Data::new(pool);
    let object_store = web::Data::new(object_store);
    let coordinator = web::Data::new(coordinator);
    let registration = web::Data::new(registration);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .route("/health", web::get().to(health_check))
            .route("/status", web::get().to(status))
            .service(
                web::scope("/api")
                    .route("/register/team", web::post().to(register_team))
                    .service(
                        web::scope("/admin")
                            .route("/teams", web::get().to(list_teams))
                            .route("/teams/{team_id}", web::get().to(get_team))
                            .route("/teams/{team_id}/confirm", web::put().to(confirm_team))
                            .route("/teams/{team_id}/reject", web::put().to(reject_team))
                            .route("/players/{player_id}", web::get().to(get_player))
                            .route("/churches/availability", web::get().to(churches_availability)),
                    ),
            )
            .app_data(pool.clone())
            .app_data(object_store.clone())
            .app_data(coordinator.clone())
            .app_data(registration.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
