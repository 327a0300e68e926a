//! Content page handlers

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};

use super::{client_key, html};
use crate::error::AppError;
use crate::services::rate_limiter::actions;
use crate::views;
use crate::AppState;

const INSTAGRAM_USERNAME: &str = "tonybenoy";

/// GET /, GET /index
pub async fn home(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    state
        .rate_limiter
        .check_and_record(&client_key(&req), actions::HOME)
        .await?;

    Ok(html(views::render_home(&state.config.app_name)))
}

/// GET /timeline
pub async fn timeline(state: web::Data<AppState>) -> HttpResponse {
    html(views::render_timeline(&state.config.app_name))
}

/// GET /terminal
pub async fn terminal(state: web::Data<AppState>) -> HttpResponse {
    html(views::render_terminal(&state.config.app_name))
}

/// GET /photography
pub async fn photography(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state
        .rate_limiter
        .check_and_record(&client_key(&req), actions::PHOTOGRAPHY)
        .await?;

    Ok(html(views::render_photography(
        &state.config.app_name,
        INSTAGRAM_USERNAME,
    )))
}

fn redirect(location: &'static str) -> HttpResponse {
    HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// GET /favicon.ico
pub async fn favicon() -> HttpResponse {
    redirect("/static/img/favicon.ico")
}

/// GET /myssh
pub async fn myssh() -> HttpResponse {
    redirect("/static/files/tony.sh")
}

/// Configure content page routes
pub fn configure_page_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(["/", "/index"]).route(web::get().to(home)))
        .service(web::resource("/timeline").route(web::get().to(timeline)))
        .service(web::resource("/terminal").route(web::get().to(terminal)))
        .service(web::resource("/photography").route(web::get().to(photography)))
        .service(web::resource("/favicon.ico").route(web::get().to(favicon)))
        .service(web::resource("/myssh").route(web::get().to(myssh)));
}
