use pairlink_server::SupersedePolicy;

use crate::integration::init_tracing;
use crate::utils::{DELIVERY_TIMEOUT_MS, Received, TestClient, start_relay, wait_for_room_count};

#[tokio::test]
async fn test_missing_room_is_rejected() {
    init_tracing();

    let relay = start_relay(SupersedePolicy::Keep)
        .await
        .expect("Failed to start relay");

    let mut client = TestClient::connect(&relay.url(), "type=initiator")
        .await
        .expect("Upgrade should succeed before rejection");

    let received = client.recv(DELIVERY_TIMEOUT_MS).await.expect("Read failed");
    assert_eq!(
        received,
        Received::Closed {
            code: Some(1008),
            reason: "Room ID required".to_owned()
        }
    );
    assert!(wait_for_room_count(&relay, 0).await, "No room should exist");

    relay.shutdown().await.expect("Relay shutdown failed");
}

#[tokio::test]
async fn test_unknown_role_is_rejected() {
    init_tracing();

    let relay = start_relay(SupersedePolicy::Keep)
        .await
        .expect("Failed to start relay");

    let mut client = TestClient::connect(&relay.url(), "room=42&type=observer")
        .await
        .expect("Upgrade should succeed before rejection");

    match client.recv(DELIVERY_TIMEOUT_MS).await.expect("Read failed") {
        Received::Closed { code, .. } => assert_eq!(code, Some(1008)),
        other => panic!("Expected close frame, got {:?}", other),
    }

    relay.shutdown().await.expect("Relay shutdown failed");
}
