use actix_web::web;
use actix_web::HttpResponse;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthBody { status: "healthy" })
}

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
    database: &'static str,
}

/// `GET /status` additionally probes the database so deploy tooling can
/// distinguish "process is up" from "process can serve traffic".
pub async fn status(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(StatusBody { status: "healthy", database: "reachable" }),
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, "database probe failed");
            HttpResponse::ServiceUnavailable()
                .json(StatusBody { status: "degraded", database: "unreachable" })
        }
    }
}
