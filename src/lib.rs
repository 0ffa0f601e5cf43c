pub mod artifacts;
pub mod configuration;
pub mod coordinator;
pub mod domain;
pub mod errors;
pub mod idempotency;
pub mod notifications;
pub mod payload;
pub mod quota;
pub mod repository;
pub mod resilience;
pub mod routes;
pub mod sequence;
pub mod startup;
pub mod storage;
pub mod telemetry;
pub mod utils;
