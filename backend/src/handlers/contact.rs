//! Contact handlers
//!
//! Renders the contact form and forwards valid submissions to the configured
//! [`Mailer`](crate::services::Mailer).

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

use super::{client_key, html};
use crate::error::AppError;
use crate::models::ContactForm;
use crate::services::mailer::{self, ContactError};
use crate::services::rate_limiter::actions;
use crate::views::{self, ContactView};
use crate::AppState;

/// GET /contact
pub async fn contact_form(state: web::Data<AppState>) -> HttpResponse {
    html(views::render_contact(
        &state.config.app_name,
        &ContactView::default(),
    ))
}

/// POST /contact
///
/// Invalid submissions re-render the form with a 400 status and the
/// problems listed; nothing is sent.
pub async fn submit_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Form<ContactForm>,
) -> Result<HttpResponse, AppError> {
    state
        .rate_limiter
        .check_and_record(&client_key(&req), actions::CONTACT)
        .await?;

    let submitted = form.into_inner();
    let valid = match mailer::validate(&submitted) {
        Ok(valid) => valid,
        Err(ContactError::Validation(problems)) => {
            info!(problems = problems.len(), "Rejected contact submission");
            let page = views::render_contact(
                &state.config.app_name,
                &ContactView {
                    form: Some(&submitted),
                    errors: &problems,
                    sent: false,
                },
            );
            return Ok(HttpResponse::build(StatusCode::BAD_REQUEST)
                .content_type(ContentType::html())
                .body(page));
        }
        Err(e) => return Err(e.into()),
    };

    state.mailer.send(&valid).await?;
    info!(transport = state.mailer.transport_name(), "Contact submission accepted");

    Ok(html(views::render_contact(
        &state.config.app_name,
        &ContactView {
            sent: true,
            ..Default::default()
        },
    )))
}

/// Configure contact routes
pub fn configure_contact_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/contact")
            .route(web::get().to(contact_form))
            .route(web::post().to(submit_contact)),
    );
}
