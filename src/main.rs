use std::fmt::Debug;
use std::fmt::Display;

use tokio::task::JoinError;
use tournament_registry::configuration::get_configuration;
use tournament_registry::idempotency::init_expiry_worker;
use tournament_registry::startup::Application;
use tournament_registry::telemetry::get_subscriber;
use tournament_registry::telemetry::init_subscriber;

fn report_exit(
    name: &str,
    outcome: Result<Result<(), impl Debug + Display>, JoinError>,
) {
    match outcome {
        Ok(Ok(())) => tracing::info!("{name} exited gracefully"),
        Ok(Err(e)) => tracing::error!(error.cause_chain = ?e, error.message = %e, "{name} failed"),
        Err(e) => tracing::error!(error.cause_chain = ?e, error.message = %e, "{name} panicked"),
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("tournament-registry", "info", std::io::stdout);
    init_subscriber(subscriber);

    let settings = get_configuration()?;

    let server = Application::build(settings.clone()).await?.run_until_stopped();
    let expiry_worker = init_expiry_worker(settings);

    let server_task = tokio::spawn(server);
    let expiry_task = tokio::spawn(expiry_worker);

    tokio::select! {
        o = server_task => report_exit("API server", o),
        o = expiry_task => report_exit("idempotency expiry worker", o),
    }

    Ok(())
}
