use pairlink_server::SupersedePolicy;

use crate::integration::init_tracing;
use crate::utils::{TestClient, start_relay, wait_for_occupancy, wait_for_room_count};

#[tokio::test]
async fn test_room_collected_when_empty() {
    init_tracing();

    let relay = start_relay(SupersedePolicy::Keep)
        .await
        .expect("Failed to start relay");

    let a = TestClient::join(&relay.url(), "gc", "initiator").await.unwrap();
    let b = TestClient::join(&relay.url(), "gc", "responder").await.unwrap();
    let c = TestClient::join(&relay.url(), "other", "initiator").await.unwrap();
    assert!(wait_for_occupancy(&relay, "gc", 2).await);
    assert!(wait_for_room_count(&relay, 2).await);

    a.close().await.unwrap();
    assert!(wait_for_occupancy(&relay, "gc", 1).await);
    assert_eq!(relay.rooms.room_count(), 2);

    b.close().await.unwrap();
    assert!(wait_for_room_count(&relay, 1).await, "Empty room should be removed");

    // a fresh join recreates the room from scratch
    let d = TestClient::join(&relay.url(), "gc", "responder").await.unwrap();
    assert!(wait_for_occupancy(&relay, "gc", 1).await);
    assert!(wait_for_room_count(&relay, 2).await);

    c.close().await.unwrap();
    d.close().await.unwrap();
    assert!(wait_for_room_count(&relay, 0).await);

    relay.shutdown().await.expect("Relay shutdown failed");
}
