use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

/// Top-level server configuration, deserialized from layered `config` crate
/// sources: `configuration/base.yaml` + environment overlay + env-var
/// overrides.
#[derive(Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub object_store: ObjectStoreSettings,
    pub email_client: EmailClientSettings,
    pub registration: RegistrationSettings,
    pub retry: RetrySettings,
    pub circuit: CircuitSettings,
    pub idempotency: IdempotencySettings,
    pub notification: NotificationSettings,
}

#[derive(Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub base_url: String,
    /// Upper bound on the whole registration protocol, in seconds.
    pub end_to_end_deadline_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    /// Connection options excluding a specific database name, used to create
    /// per-test-run databases.
    pub fn connection_without_db(&self) -> sqlx::postgres::PgConnectOptions {
        use secrecy::ExposeSecret;
        let ssl_mode = if self.require_ssl {
            sqlx::postgres::PgSslMode::Require
        } else {
            sqlx::postgres::PgSslMode::Prefer
        };
        sqlx::postgres::PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn connection(&self) -> sqlx::postgres::PgConnectOptions {
        self.connection_without_db().database(&self.database_name)
    }
}

#[derive(Deserialize, Clone)]
pub struct ObjectStoreSettings {
    pub base_url: String,
    pub bucket: String,
    pub authorization_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_millis: u64,
}

impl ObjectStoreSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }
}

#[derive(Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    pub authorization_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_millis: u64,
}

impl EmailClientSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_millis)
    }

    pub fn sender(&self) -> Result<crate::domain::ContactEmail, String> {
        crate::domain::ContactEmail::parse(self.sender_email.clone())
    }
}

#[derive(Deserialize, Clone)]
pub struct RegistrationSettings {
    pub team_id_prefix: String,
    pub max_teams_per_church: i64,
    pub min_players: usize,
    pub max_players: usize,
    pub max_file_bytes: usize,
    pub upload_concurrency: usize,
}

#[derive(Deserialize, Clone)]
pub struct RetrySettings {
    pub upload_max_attempts: u32,
    pub mail_max_attempts: u32,
    pub db_insert_max_attempts: u32,
    pub initial_backoff_millis: u64,
    pub max_backoff_millis: u64,
}

#[derive(Deserialize, Clone)]
pub struct CircuitSettings {
    pub threshold_failures: u32,
    pub cool_off_secs: u64,
}

#[derive(Deserialize, Clone)]
pub struct IdempotencySettings {
    pub ttl_hours: i64,
}

#[derive(Deserialize, Clone)]
pub struct NotificationSettings {
    pub worker_count: usize,
    pub queue_capacity: usize,
}

pub enum AppEnvironment {
    Local,
    Production,
}

impl AppEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Production => "production",
        }
    }
}

impl TryFrom<String> for AppEnvironment {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment; use `local` or `production`"
            )),
        }
    }
}

/// Loads `configuration/base.yaml`, then overlays
/// `configuration/{local,production}.yaml` (selected by `APP_ENVIRONMENT`,
/// default `local`), then `APP_` prefixed environment variables (`__` as the
/// nesting separator) on top.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir().expect("failed to determine current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: AppEnvironment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("failed to parse APP_ENVIRONMENT");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = Config::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")))
        .add_source(File::from(configuration_directory.join(environment_filename)))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}
