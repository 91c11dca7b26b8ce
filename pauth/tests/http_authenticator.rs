use std::time::Duration;

use pauth::prelude::*;
use pauth::{HttpRemoteAuthenticator, RemoteAuthRequest, RemoteAuthenticator};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> AuthConfig {
    AuthConfig::default()
        .with_endpoint(format!("{}/api/authenticate", server.uri()))
        .with_device_id("kiosk-7")
        .with_signing_keys(SigningKeys::new("APIabc", "s3cret"))
}

#[tokio::test]
async fn posts_device_request_with_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/authenticate/kiosk-7"))
        .and(header("x-api-key", "device-secret"))
        .and(body_json(json!({
            "username": "sdk-user-kiosk-7",
            "x-device-api-key": "sdk-user-kiosk-7",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "livekit_token": "remote-token",
            "room_name": "room-42",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let authenticator = HttpRemoteAuthenticator::from_config(
        &config_for(&server).with_api_key("device-secret"),
    )
    .expect("client builds")
    .expect("endpoint configured");

    let response = authenticator
        .authenticate(&RemoteAuthRequest::new("kiosk-7", "sdk-user-kiosk-7"))
        .await
        .expect("remote response");

    assert!(response.success);
    assert_eq!(response.livekit_token.as_deref(), Some("remote-token"));
    assert_eq!(response.room_name.as_deref(), Some("room-42"));
}

#[tokio::test]
async fn server_error_falls_back_to_local_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let resolver = CredentialResolver::from_config(config_for(&server)).expect("resolver builds");
    let credential = resolver
        .resolve("sdk-user-kiosk-7", "default-room", &ResolveOptions::default())
        .await
        .expect("local credential");

    assert_eq!(credential.source, CredentialSource::Local);
    assert_eq!(credential.room.as_str(), "default-room");
    assert!(!credential.token().is_empty());
}

#[tokio::test]
async fn quota_rejection_body_falls_back_to_local() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Quota exceeded",
        })))
        .mount(&server)
        .await;

    let resolver = CredentialResolver::from_config(config_for(&server)).expect("resolver builds");
    let credential = resolver
        .resolve("sdk-user-kiosk-7", "default-room", &ResolveOptions::default())
        .await
        .expect("local credential");

    assert_eq!(credential.source, CredentialSource::Local);
    assert_eq!(credential.room.as_str(), "default-room");
}

#[tokio::test]
async fn rate_limited_status_falls_back_to_local() {
    for status in [429, 402, 403] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "success": false,
                "error": "Quota exceeded for this device",
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resolver =
            CredentialResolver::from_config(config_for(&server)).expect("resolver builds");
        let credential = resolver
            .resolve("sdk-user-kiosk-7", "default-room", &ResolveOptions::default())
            .await
            .expect("local credential");

        assert_eq!(credential.source, CredentialSource::Local, "status {status}");
        assert_eq!(credential.room.as_str(), "default-room");
    }
}

#[tokio::test]
async fn slow_service_times_out_into_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(json!({"success": true, "livekit_token": "late", "room_name": "late"})),
        )
        .mount(&server)
        .await;

    let config = config_for(&server).with_remote_timeout(Duration::from_millis(200));
    let resolver = CredentialResolver::from_config(config).expect("resolver builds");
    let credential = resolver
        .resolve("sdk-user-kiosk-7", "default-room", &ResolveOptions::default())
        .await
        .expect("fallback credential");

    assert_eq!(credential.room.as_str(), "default-room");
    assert!(credential.is_local());
}
