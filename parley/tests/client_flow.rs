use std::sync::Arc;
use std::time::Duration;

use parley::prelude::*;
use parley::serde_json::{Value, json};
use parley::{OutboundPacket, SecretString, TokenGrant, TokenSigner};
use tokio::sync::mpsc;

fn local_config() -> ClientConfig {
    ClientConfig::default()
        .with_auth(AuthConfig::default().with_signing_keys(SigningKeys::new("APIabc", "s3cret")))
        .with_device_id("kiosk-7")
        .with_local_mode(true)
        .with_farewell(FarewellDelay::none())
}

fn registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register_sync_fn(
        parley_tool!(
            "add_to_order",
            "Add a drink to the current order",
            coffee_type: string,
            size: string = "medium",
        ),
        |args, _| {
            Ok(json!({
                "coffee_type": args.required_str("coffee_type")?,
                "size": args.string_or("size", "medium"),
            }))
        },
    );
    registry
}

fn reply(packet: &OutboundPacket) -> Value {
    parley::serde_json::from_slice(&packet.payload).expect("reply is JSON")
}

#[tokio::test]
async fn client_answers_calls_until_end_session() {
    let mut client =
        build_client_with(local_config(), registry(), ClientHooks::noop()).expect("client builds");

    let credential = client.connect().await.expect("connects");
    assert_eq!(credential.source, CredentialSource::Local);
    assert_eq!(credential.room.as_str(), "default-room");
    assert_eq!(credential.transport_url, "ws://localhost:7880");

    let (transport, mut published) = LoopbackTransport::new();
    let transport = Arc::new(transport);
    let (sender, inbound) = mpsc::channel(8);

    let order = tool_call("add_to_order", json!({"coffee_type": "latte"})).with_call_id("c-1");
    sender
        .send(tool_call_packet(&order).expect("encodes"))
        .await
        .expect("send");
    let farewell = tool_call("end_session", json!({"farewell_message": "Enjoy your latte!"}));
    sender
        .send(tool_call_packet(&farewell).expect("encodes"))
        .await
        .expect("send");

    let summary = client
        .serve(transport.clone(), inbound)
        .await
        .expect("serves");

    assert_eq!(summary.dispatched, 2);
    assert!(!client.is_connected());
    assert!(transport.is_closed());

    let first = reply(&published.recv().await.expect("order reply"));
    assert_eq!(first["tool"], json!("add_to_order"));
    assert_eq!(first["call_id"], json!("c-1"));
    assert_eq!(first["coffee_type"], json!("latte"));
    assert_eq!(first["success"], json!(true));

    let second = reply(&published.recv().await.expect("farewell reply"));
    assert_eq!(second["tool"], json!("end_session"));
    assert_eq!(second["farewell_message"], json!("Enjoy your latte!"));
    assert_eq!(
        second["message"],
        json!("Session ending, disconnecting from room")
    );
    drop(sender);
}

#[tokio::test]
async fn missing_required_argument_is_reported_not_raised() {
    let mut client =
        build_client_with(local_config(), registry(), ClientHooks::noop()).expect("client builds");
    client.connect().await.expect("connects");

    let (transport, mut published) = LoopbackTransport::new();
    let (sender, inbound) = mpsc::channel(8);
    let request = tool_call("add_to_order", json!({"size": "large"})).with_call_id("c-2");
    sender
        .send(tool_call_packet(&request).expect("encodes"))
        .await
        .expect("send");
    drop(sender);

    let summary = client
        .serve(Arc::new(transport), inbound)
        .await
        .expect("serves");
    assert_eq!(summary.dispatched, 1);

    let body = reply(&published.recv().await.expect("error reply"));
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("bad_arguments"));
    assert_eq!(body["call_id"], json!("c-2"));
}

#[tokio::test]
async fn handle_ends_an_idle_session() {
    let mut client =
        build_client_with(local_config(), registry(), ClientHooks::noop()).expect("client builds");
    client.connect().await.expect("connects");

    let handle = client.handle();
    let (transport, _published) = LoopbackTransport::new();
    let (_sender, inbound) = mpsc::channel(8);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.request_disconnect();
    });

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        client.serve(Arc::new(transport), inbound),
    )
    .await
    .expect("serve returns after disconnect")
    .expect("serves");

    assert_eq!(summary.received, 0);
    assert!(!client.is_connected());
}

#[tokio::test]
async fn missing_signing_keys_fail_to_connect() {
    let config = ClientConfig::default().with_local_mode(true);
    let mut client =
        build_client_with(config, registry(), ClientHooks::noop()).expect("client builds");

    let err = client.connect().await.expect_err("no signing keys");

    assert_eq!(err.kind, SessionErrorKind::Authentication);
    assert!(!client.is_connected());
}

struct QuotaSigner;

impl TokenSigner for QuotaSigner {
    fn sign(&self, _grant: &TokenGrant) -> Result<SecretString, AuthError> {
        Err(AuthError::quota_exceeded("monthly quota used"))
    }
}

#[tokio::test]
async fn quota_exhaustion_surfaces_as_quota_reached() {
    let resolver = CredentialResolver::new(AuthConfig::default(), None, Arc::new(QuotaSigner));
    let mut client = build_client_with(local_config(), registry(), ClientHooks::noop())
        .expect("client builds")
        .with_resolver(resolver);

    let err = client.connect().await.expect_err("quota");

    assert_eq!(err.kind, SessionErrorKind::QuotaReached);
    assert_eq!(err.message, "Quota reached.");
}
