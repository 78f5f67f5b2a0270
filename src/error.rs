use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

/// Errors raised while answering an inbound email.
#[derive(Debug, thiserror::Error)]
pub enum MealbotError {
    #[error("could not resolve location")]
    LocationLookup,

    #[error("business search failed with status {status}: {message}")]
    Search { status: u16, message: String },

    #[error("error sending email")]
    Send,

    #[error("missing credential {0}")]
    MissingCredential(&'static str),

    #[error("invalid inbound payload: {0}")]
    InvalidPayload(String),

    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ResponseError for MealbotError {
    fn status_code(&self) -> StatusCode {
        match self {
            MealbotError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            MealbotError::MissingCredential(_) => StatusCode::INTERNAL_SERVER_ERROR,
            MealbotError::LocationLookup
            | MealbotError::Search { .. }
            | MealbotError::Send
            | MealbotError::Http(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
