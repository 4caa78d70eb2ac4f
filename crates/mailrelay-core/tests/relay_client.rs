//! Integration tests for MailRelayClient.
//!
//! The OAuth2 token endpoint is a wiremock server; the SMTP relay is lettre's
//! stub transport, so nothing leaves the machine.

use lettre::transport::stub::AsyncStubTransport;
use mailrelay_core::{EmailRequest, MailRelay, MailRelayClient, RelayConfig, RelayError};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn oauth2_client(server: &MockServer, refresh_token: &str) -> MailRelayClient {
    let vars = [
        ("EMAIL_USER", "sender@gmail.com"),
        ("CLIENT_ID", "client-id"),
        ("CLIENT_SECRET", "client-secret"),
        ("REFRESH_TOKEN", refresh_token),
        ("MAIL_AUTH", "oauth2"),
        ("EMAIL_FROM_NAME", "Relay Bot"),
        ("SMTP_TIMEOUT_SECS", "2"),
    ];
    let mut source: config::Map<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    source.insert("TOKEN_URL".to_string(), format!("{}/token", server.uri()));
    source.insert("AUTH_URL".to_string(), format!("{}/auth", server.uri()));

    let config =
        RelayConfig::from_environment(config::Environment::default().source(Some(source))).unwrap();
    MailRelayClient::from_config(&config).unwrap()
}

fn password_client(vars: &[(&str, &str)]) -> MailRelayClient {
    let source: config::Map<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let config =
        RelayConfig::from_environment(config::Environment::default().source(Some(source))).unwrap();
    MailRelayClient::from_config(&config).unwrap()
}

fn token_ok(access_token: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3599
    }))
}

fn revoked() -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(serde_json::json!({
        "error": "invalid_grant",
        "error_description": "Token has been expired or revoked."
    }))
}

fn request() -> EmailRequest {
    EmailRequest {
        to: vec!["a@b.com".to_string()],
        subject: "Hi".to_string(),
        html: Some("<p>hi</p>".to_string()),
        text: None,
    }
}

#[tokio::test]
async fn test_acquire_transport_exchanges_token_every_time() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("refresh_token=good"))
        .respond_with(token_ok("ya29.session"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = oauth2_client(&mock_server, "good");
    assert_eq!(client.account(), "sender@gmail.com");

    assert!(client.acquire_transport().await.is_ok());
    assert!(client.acquire_transport().await.is_ok());
}

#[tokio::test]
async fn test_missing_refresh_token_fails_before_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(token_ok("ya29.never"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = oauth2_client(&mock_server, "");
    let err = client.acquire_transport().await.unwrap_err();

    match err {
        RelayError::Configuration(message) => assert!(message.contains("refresh token")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_relay_without_sender_is_configuration_error() {
    let client = password_client(&[("EMAIL_PASS", "app-pass")]);
    let err = client.relay(request()).await.unwrap_err();

    match err {
        RelayError::Configuration(message) => assert!(message.contains("account")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_relay_without_password_is_configuration_error() {
    let client = password_client(&[("EMAIL_USER", "sender@gmail.com")]);
    let err = client.relay(request()).await.unwrap_err();

    match err {
        RelayError::Configuration(message) => assert!(message.contains("password")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_relay_with_malformed_sender_is_configuration_error() {
    let client = password_client(&[("EMAIL_USER", "not-an-address"), ("EMAIL_PASS", "app-pass")]);
    let err = client.relay(request()).await.unwrap_err();
    assert!(matches!(err, RelayError::Configuration(_)));
}

#[tokio::test]
async fn test_relay_without_oauth2_credentials_makes_no_token_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(token_ok("ya29.never"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = oauth2_client(&mock_server, "");
    let err = client.relay(request()).await.unwrap_err();
    assert!(matches!(err, RelayError::Configuration(_)));
}

#[tokio::test]
async fn test_revoked_refresh_token_is_provider_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(revoked())
        .mount(&mock_server)
        .await;

    let client = oauth2_client(&mock_server, "revoked");
    let err = client.acquire_transport().await.unwrap_err();

    match err {
        RelayError::ProviderAuth(message) => assert!(message.contains("invalid_grant")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_revoked_token_fails_relay_without_sending() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(revoked())
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = oauth2_client(&mock_server, "revoked");
    let err = client.relay(request()).await.unwrap_err();
    assert!(matches!(err, RelayError::ProviderAuth(_)));
}

#[tokio::test]
async fn test_invalid_request_makes_no_token_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(token_ok("ya29.never"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = oauth2_client(&mock_server, "good");

    let mut missing_subject = request();
    missing_subject.subject = String::new();
    let err = client.relay(missing_subject).await.unwrap_err();
    assert!(matches!(err, RelayError::Validation(_)));

    let mut bad_recipient = request();
    bad_recipient.to = vec!["not an address".to_string()];
    let err = client.relay(bad_recipient).await.unwrap_err();
    assert!(matches!(err, RelayError::Validation(_)));
}

#[tokio::test]
async fn test_send_returns_distinct_message_ids() {
    let mock_server = MockServer::start().await;
    let client = oauth2_client(&mock_server, "good");
    let stub = AsyncStubTransport::new_ok();

    let first = client.send(&stub, client.compose(request())).await.unwrap();
    let second = client.send(&stub, client.compose(request())).await.unwrap();

    assert!(!first.message_id.is_empty());
    assert_ne!(first.message_id, second.message_id);

    let sent = stub.messages().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].1.contains("Relay Bot"));
    assert!(sent[0].1.contains("sender@gmail.com"));
}

#[tokio::test]
async fn test_relay_rejection_is_delivery_error() {
    let mock_server = MockServer::start().await;
    let client = oauth2_client(&mock_server, "good");
    let stub = AsyncStubTransport::new_error();

    let err = client
        .send(&stub, client.compose(request()))
        .await
        .unwrap_err();
    assert!(matches!(err, RelayError::Delivery(_)));
}

#[tokio::test]
async fn test_concurrent_sends_are_independent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("refresh_token=good"))
        .respond_with(token_ok("ya29.session"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("refresh_token=revoked"))
        .respond_with(revoked())
        .mount(&mock_server)
        .await;

    let good = oauth2_client(&mock_server, "good");
    let bad = oauth2_client(&mock_server, "revoked");
    let stub = AsyncStubTransport::new_ok();

    let good_send = async {
        match good.acquire_transport().await {
            Ok(_transport) => good.send(&stub, good.compose(request())).await,
            Err(e) => Err(e),
        }
    };
    let (bad_result, good_result) = tokio::join!(bad.acquire_transport(), good_send);

    assert!(matches!(bad_result, Err(RelayError::ProviderAuth(_))));
    let sent = good_result.unwrap();
    assert!(!sent.message_id.is_empty());
}
