//! HTTP routes

use crate::error::ApiError;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use mailrelay_core::{EmailRequest, MailRelay, RelayError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Shared handler state, built once at startup
#[derive(Clone)]
pub struct AppState {
    relay: Arc<dyn MailRelay>,
    api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(relay: Arc<dyn MailRelay>, api_key: Option<&str>) -> Self {
        Self {
            relay,
            api_key: api_key.map(Arc::from),
        }
    }

    /// Require `Authorization: Bearer <key>` when a key is configured
    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let Some(key) = self.api_key.as_deref() else {
            return Ok(());
        };

        let presented = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match presented {
            Some(token) if token == key => Ok(()),
            _ => Err(RelayError::Unauthorized.into()),
        }
    }
}

/// One address or a list of addresses
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    /// Flatten to individual addresses; a single string may be comma separated
    fn into_addresses(self) -> Vec<String> {
        let raw = match self {
            Recipients::One(list) => vec![list],
            Recipients::Many(list) => list,
        };
        raw.iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Body of `POST /send-email`
///
/// Accepts both `{ to, subject, html, text }` and `{ recipient, subject, message }`.
#[derive(Debug, Default, Deserialize)]
pub struct SendEmailBody {
    #[serde(alias = "recipient")]
    pub to: Option<Recipients>,
    pub subject: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
    /// Used for the HTML and text parts when those are absent
    pub message: Option<String>,
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl SendEmailBody {
    /// Check the required fields and turn the body into a relay request
    pub fn into_request(self) -> Result<EmailRequest, RelayError> {
        let to = self.to.map(Recipients::into_addresses).unwrap_or_default();
        let subject = filled(self.subject);
        let message = filled(self.message);
        let html = filled(self.html).or_else(|| message.clone());
        let text = filled(self.text).or(message);

        let mut missing = Vec::new();
        if to.is_empty() {
            missing.push("to");
        }
        if subject.is_none() {
            missing.push("subject");
        }
        if html.is_none() && text.is_none() {
            missing.push("html/message");
        }
        if !missing.is_empty() {
            return Err(RelayError::Validation(format!(
                "Missing required email fields: {}",
                missing.join(", ")
            )));
        }

        Ok(EmailRequest {
            to,
            subject: subject.unwrap_or_default(),
            html,
            text,
        })
    }
}

/// JSON answer for every outcome
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl SendEmailResponse {
    pub fn sent(message_id: String) -> Self {
        Self {
            success: true,
            message: "Email sent successfully.".to_string(),
            message_id: Some(message_id),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            message_id: None,
        }
    }
}

/// Build the router with both endpoint paths
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/send-email", post(send_email))
        .route("/api/send-email", post(send_email))
        .with_state(state)
}

async fn send_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SendEmailBody>, JsonRejection>,
) -> Result<Json<SendEmailResponse>, ApiError> {
    // Authorization is checked before the body is even looked at
    state.authorize(&headers)?;

    let Json(body) = body.map_err(|e| RelayError::Validation(e.body_text()))?;
    let request = body.into_request()?;
    debug!("Send request for {:?}", request.to);

    let sent = state.relay.relay(request).await?;
    Ok(Json(SendEmailResponse::sent(sent.message_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: serde_json::Value) -> SendEmailBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_vercel_style_body() {
        let request = body(serde_json::json!({
            "to": "a@b.com",
            "subject": "Hi",
            "html": "<p>hi</p>"
        }))
        .into_request()
        .unwrap();

        assert_eq!(request.to, vec!["a@b.com".to_string()]);
        assert_eq!(request.subject, "Hi");
        assert_eq!(request.html.as_deref(), Some("<p>hi</p>"));
        assert_eq!(request.text, None);
    }

    #[test]
    fn test_form_style_body_uses_message_for_both_parts() {
        let request = body(serde_json::json!({
            "recipient": "a@b.com, c@d.com",
            "subject": "Hi",
            "message": "hello there"
        }))
        .into_request()
        .unwrap();

        assert_eq!(request.to, vec!["a@b.com".to_string(), "c@d.com".to_string()]);
        assert_eq!(request.html.as_deref(), Some("hello there"));
        assert_eq!(request.text.as_deref(), Some("hello there"));
    }

    #[test]
    fn test_recipient_list() {
        let request = body(serde_json::json!({
            "to": ["a@b.com", " "],
            "subject": "Hi",
            "text": "plain"
        }))
        .into_request()
        .unwrap();

        assert_eq!(request.to, vec!["a@b.com".to_string()]);
        assert_eq!(request.html, None);
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let err = body(serde_json::json!({ "subject": "  " }))
            .into_request()
            .unwrap_err();

        match err {
            RelayError::Validation(message) => {
                assert_eq!(message, "Missing required email fields: to, subject, html/message")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_response_shape() {
        let sent = serde_json::to_value(SendEmailResponse::sent("<id@gmail.com>".into())).unwrap();
        assert_eq!(sent["success"], true);
        assert_eq!(sent["messageId"], "<id@gmail.com>");

        let failed = serde_json::to_value(SendEmailResponse::failed("nope")).unwrap();
        assert_eq!(failed["success"], false);
        assert!(failed.get("messageId").is_none());
    }
}
