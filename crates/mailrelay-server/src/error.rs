//! Mapping relay errors to HTTP responses

use crate::routes::SendEmailResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mailrelay_core::RelayError;
use tracing::{error, warn};

/// A relay error on its way out of a handler
#[derive(Debug)]
pub struct ApiError(pub RelayError);

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::Configuration(_)
            | RelayError::ProviderAuth(_)
            | RelayError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            RelayError::Validation(message) => message.clone(),
            RelayError::Unauthorized => "Unauthorized access to email API.".to_string(),
            other => format!("Failed to send email: {}", other),
        };

        if status.is_server_error() {
            error!("Email send failed: {}", self.0);
        } else {
            warn!("Rejected send request ({}): {}", status.as_u16(), message);
        }

        (status, Json(SendEmailResponse::failed(message))).into_response()
    }
}
