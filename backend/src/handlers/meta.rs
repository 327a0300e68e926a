//! Utility JSON endpoints: smoke test, health, metrics, client info

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use super::client_key;
use crate::error::AppError;
use crate::services::rate_limiter::actions;
use crate::AppState;

#[derive(Serialize)]
struct TestResponse {
    result: &'static str,
}

/// Response body of `GET /client_ip`
#[derive(Debug, Serialize)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: Option<String>,
    pub x_forwarded_for: Option<String>,
    pub x_real_ip: Option<String>,
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// GET /test
pub async fn smoke_test() -> HttpResponse {
    HttpResponse::Ok().json(TestResponse {
        result: "It works!",
    })
}

/// GET /health
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.health.check())
}

/// GET /metrics
pub async fn metrics(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state
        .rate_limiter
        .check_and_record(&client_key(&req), actions::METRICS)
        .await?;

    let cache_metrics = state.showcase.metrics();
    let report = state
        .health
        .metrics(&cache_metrics, state.showcase.cache_backend());
    Ok(HttpResponse::Ok().json(report))
}

/// GET /client_ip
///
/// Echoes what the server sees of the caller. Forwarding headers are reported
/// as sent, never trusted.
pub async fn client_ip(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let ip = client_key(&req);
    state
        .rate_limiter
        .check_and_record(&ip, actions::CLIENT_IP)
        .await?;

    Ok(HttpResponse::Ok().json(ClientInfo {
        ip,
        user_agent: header_value(&req, header::USER_AGENT.as_str()),
        x_forwarded_for: header_value(&req, "X-Forwarded-For"),
        x_real_ip: header_value(&req, "X-Real-IP"),
    }))
}

/// Configure utility routes
pub fn configure_meta_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/test").route(web::get().to(smoke_test)))
        .service(web::resource("/health").route(web::get().to(health)))
        .service(web::resource("/metrics").route(web::get().to(metrics)))
        .service(web::resource("/client_ip").route(web::get().to(client_ip)));
}
