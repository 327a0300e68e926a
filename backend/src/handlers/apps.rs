//! Apps handlers
//!
//! The repository showcase page. Listings come from [`RepositoryShowcase`],
//! which consults the cache before GitHub.
//!
//! [`RepositoryShowcase`]: crate::services::RepositoryShowcase

use actix_web::http::header::ContentType;
use actix_web::{web, HttpRequest, HttpResponse};
use tracing::debug;

use super::client_key;
use crate::error::AppError;
use crate::services::rate_limiter::actions;
use crate::views;
use crate::AppState;

/// Response header reporting whether the listing came from the cache
pub const CACHE_STATUS_HEADER: &str = "X-Cache";

/// GET /app, GET /apps
///
/// Up to six of the owner's most-starred repositories. A failed GitHub fetch
/// yields a 503 page.
pub async fn apps_page(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state
        .rate_limiter
        .check_and_record(&client_key(&req), actions::APPS)
        .await?;

    let outcome = state.showcase.top_repositories().await?;
    debug!(
        count = outcome.repos.len(),
        cache = outcome.cache_status.as_str(),
        "Rendering apps page"
    );

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .insert_header((CACHE_STATUS_HEADER, outcome.cache_status.as_str()))
        .body(views::render_apps(&state.config.app_name, &outcome.repos)))
}

/// Configure apps routes
pub fn configure_apps_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(["/app", "/apps"]).route(web::get().to(apps_page)));
}
