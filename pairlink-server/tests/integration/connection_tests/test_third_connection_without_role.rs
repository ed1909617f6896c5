use pairlink_server::SupersedePolicy;

use crate::integration::init_tracing;
use crate::utils::{
    DELIVERY_TIMEOUT_MS, Received, TestClient, start_relay, wait_for_occupancy,
};

#[tokio::test]
async fn test_roles_inferred_by_arrival_order() {
    init_tracing();

    let relay = start_relay(SupersedePolicy::Keep)
        .await
        .expect("Failed to start relay");

    let mut first = TestClient::connect(&relay.url(), "room=auto")
        .await
        .expect("First connect failed");
    assert!(wait_for_occupancy(&relay, "auto", 1).await);

    let mut second = TestClient::connect(&relay.url(), "room=auto")
        .await
        .expect("Second connect failed");
    assert!(wait_for_occupancy(&relay, "auto", 2).await);

    first.send_text("ping").await.expect("Send failed");
    assert_eq!(second.expect_text(DELIVERY_TIMEOUT_MS).await.unwrap(), "ping");

    second.send_text("pong").await.expect("Send failed");
    assert_eq!(first.expect_text(DELIVERY_TIMEOUT_MS).await.unwrap(), "pong");

    // both slots taken and no explicit role: nothing to supersede
    let mut third = TestClient::connect(&relay.url(), "room=auto")
        .await
        .expect("Upgrade should succeed before rejection");
    assert_eq!(
        third.recv(DELIVERY_TIMEOUT_MS).await.unwrap(),
        Received::Closed {
            code: Some(1008),
            reason: "Room is full".to_owned()
        }
    );
    assert!(wait_for_occupancy(&relay, "auto", 2).await);

    first.close().await.unwrap();
    second.close().await.unwrap();
    relay.shutdown().await.expect("Relay shutdown failed");
}
