use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse};

use crate::error::AppError;

pub mod apps;
pub mod contact;
pub mod meta;
pub mod pages;

#[cfg(test)]
mod test_support;





pub use apps::configure_apps_routes;
pub use contact::configure_contact_routes;
pub use meta::configure_meta_routes;
pub use pages::configure_page_routes;

/// Rate limiting key for a request: the peer IP address
pub(crate) fn client_key(req: &HttpRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub(crate) fn html(body: String) -> HttpResponse {
    HttpResponse::Ok().content_type(ContentType::html()).body(body)
}

/// Default service: HTML 404 for any unmatched route
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound(format!(
        "The page {} does not exist",
        req.path()
    )))
}
