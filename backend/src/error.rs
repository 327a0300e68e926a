use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use std::fmt;
use tracing::{error, warn};

use crate::services::{ContactError, FetchError, RateLimitError};
use crate::views;

/// Message shown when the repository listing cannot be produced
pub const FETCH_UNAVAILABLE_MESSAGE: &str = "Unable to fetch repository data at this time";

/// Header carrying the per-error request identifier
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Application-level error type
#[derive(Debug)]
pub enum AppError {
    /// Validation error
    Validation(String),
    /// Not found error
    NotFound(String),
    /// Rate limit exceeded
    RateLimited { retry_after: u64 },
    /// An upstream dependency failed
    ServiceUnavailable(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Text safe to show to the visitor
    fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::NotFound(msg) | Self::ServiceUnavailable(msg) => msg.clone(),
            Self::RateLimited { retry_after } => {
                format!("Too many requests. Please try again in {retry_after} seconds.")
            }
            Self::Internal(_) => "Something went wrong on our side.".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::RateLimited { retry_after } => {
                write!(f, "Rate limited, retry after {retry_after} seconds")
            }
            Self::ServiceUnavailable(msg) => write!(f, "Service unavailable: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        match self {
            Self::Internal(_) => error!(request_id = %request_id, error = %self, "Request failed"),
            Self::ServiceUnavailable(_) => warn!(request_id = %request_id, error = %self, "Request failed"),
            _ => {}
        }

        let body = views::error_page(
            status.as_u16(),
            status.canonical_reason().unwrap_or("Error"),
            &self.public_message(),
            &request_id,
        );

        let mut response = HttpResponse::build(status);
        response
            .content_type(ContentType::html())
            .insert_header((REQUEST_ID_HEADER, request_id));
        if let Self::RateLimited { retry_after } = self {
            response.insert_header(("Retry-After", retry_after.to_string()));
        }
        response.body(body)
    }
}

impl From<RateLimitError> for AppError {
    fn from(err: RateLimitError) -> Self {
        match err {
            RateLimitError::RateLimited { retry_after, .. } => Self::RateLimited { retry_after },
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        error!(error = %err, "Failed to fetch GitHub data");
        Self::ServiceUnavailable(FETCH_UNAVAILABLE_MESSAGE.to_string())
    }
}

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::Validation(problems) => Self::Validation(problems.join("; ")),
            other => Self::Internal(other.to_string()),
        }
    }
}
