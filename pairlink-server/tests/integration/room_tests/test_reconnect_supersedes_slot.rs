use pairlink_server::SupersedePolicy;

use crate::integration::init_tracing;
use crate::utils::{
    DELIVERY_TIMEOUT_MS, Received, SILENCE_TIMEOUT_MS, TestClient, start_relay,
    wait_for_occupancy,
};

#[tokio::test]
async fn test_reconnect_supersedes_slot_keep_policy() {
    init_tracing();

    let relay = start_relay(SupersedePolicy::Keep)
        .await
        .expect("Failed to start relay");

    let mut stale = TestClient::join(&relay.url(), "r1", "initiator").await.unwrap();
    let mut responder = TestClient::join(&relay.url(), "r1", "responder").await.unwrap();
    assert!(wait_for_occupancy(&relay, "r1", 2).await);

    let mut fresh = TestClient::join(&relay.url(), "r1", "initiator").await.unwrap();
    // the slot is replaced in place, the responder slot is untouched
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(wait_for_occupancy(&relay, "r1", 2).await);

    responder.send_text("answer").await.unwrap();
    assert_eq!(fresh.expect_text(DELIVERY_TIMEOUT_MS).await.unwrap(), "answer");
    assert_eq!(stale.recv(SILENCE_TIMEOUT_MS).await.unwrap(), Received::Nothing);

    // the stale socket is still open and its messages are still routed by role
    stale.send_text("late candidate").await.unwrap();
    assert_eq!(
        responder.expect_text(DELIVERY_TIMEOUT_MS).await.unwrap(),
        "late candidate"
    );

    // closing the stale socket must not evict the fresh one
    stale.close().await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    responder.send_text("after stale close").await.unwrap();
    assert_eq!(
        fresh.expect_text(DELIVERY_TIMEOUT_MS).await.unwrap(),
        "after stale close"
    );

    fresh.close().await.unwrap();
    responder.close().await.unwrap();
    relay.shutdown().await.expect("Relay shutdown failed");
}

#[tokio::test]
async fn test_reconnect_supersedes_slot_close_policy() {
    init_tracing();

    let relay = start_relay(SupersedePolicy::Close)
        .await
        .expect("Failed to start relay");

    let mut stale = TestClient::join(&relay.url(), "r2", "initiator").await.unwrap();
    let mut responder = TestClient::join(&relay.url(), "r2", "responder").await.unwrap();
    assert!(wait_for_occupancy(&relay, "r2", 2).await);

    let mut fresh = TestClient::join(&relay.url(), "r2", "initiator").await.unwrap();

    assert_eq!(
        stale.recv(DELIVERY_TIMEOUT_MS).await.unwrap(),
        Received::Closed {
            code: Some(1008),
            reason: "Superseded".to_owned()
        }
    );
    assert!(wait_for_occupancy(&relay, "r2", 2).await);

    responder.send_text("answer").await.unwrap();
    assert_eq!(fresh.expect_text(DELIVERY_TIMEOUT_MS).await.unwrap(), "answer");

    fresh.send_text("candidate").await.unwrap();
    assert_eq!(
        responder.expect_text(DELIVERY_TIMEOUT_MS).await.unwrap(),
        "candidate"
    );
    assert_eq!(
        responder.recv(SILENCE_TIMEOUT_MS).await.unwrap(),
        Received::Nothing
    );

    fresh.close().await.unwrap();
    responder.close().await.unwrap();
    relay.shutdown().await.expect("Relay shutdown failed");
}
