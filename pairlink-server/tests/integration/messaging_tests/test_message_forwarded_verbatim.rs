use pairlink_server::SupersedePolicy;

use crate::integration::init_tracing;
use crate::utils::{
    DELIVERY_TIMEOUT_MS, Received, SILENCE_TIMEOUT_MS, TestClient, start_relay,
    wait_for_occupancy,
};

#[tokio::test]
async fn test_message_forwarded_verbatim() {
    init_tracing();

    let relay = start_relay(SupersedePolicy::Keep)
        .await
        .expect("Failed to start relay");

    let mut initiator = TestClient::join(&relay.url(), "42", "initiator")
        .await
        .expect("Initiator connect failed");
    let mut responder = TestClient::join(&relay.url(), "42", "responder")
        .await
        .expect("Responder connect failed");
    assert!(wait_for_occupancy(&relay, "42", 2).await);

    // the relay must not parse or reformat payloads, even malformed ones
    let offer = r#"{"type":"offer",  "sdp":"v=0\r\no=- 1 2 IN IP4 127.0.0.1\r\n"}"#;
    let junk = "not json at all";

    initiator.send_text(offer).await.unwrap();
    initiator.send_text(junk).await.unwrap();
    initiator.send_binary(&[0, 159, 146, 150]).await.unwrap();

    assert_eq!(responder.expect_text(DELIVERY_TIMEOUT_MS).await.unwrap(), offer);
    assert_eq!(responder.expect_text(DELIVERY_TIMEOUT_MS).await.unwrap(), junk);
    assert_eq!(
        responder.recv(DELIVERY_TIMEOUT_MS).await.unwrap(),
        Received::Binary(vec![0, 159, 146, 150])
    );

    // nothing is echoed back to the sender
    assert_eq!(
        initiator.recv(SILENCE_TIMEOUT_MS).await.unwrap(),
        Received::Nothing
    );

    initiator.close().await.unwrap();
    responder.close().await.unwrap();
    relay.shutdown().await.expect("Relay shutdown failed");
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    init_tracing();

    let relay = start_relay(SupersedePolicy::Keep)
        .await
        .expect("Failed to start relay");

    let mut a = TestClient::join(&relay.url(), "red", "initiator").await.unwrap();
    let mut b = TestClient::join(&relay.url(), "red", "responder").await.unwrap();
    let mut other = TestClient::join(&relay.url(), "blue", "responder").await.unwrap();
    assert!(wait_for_occupancy(&relay, "red", 2).await);
    assert!(wait_for_occupancy(&relay, "blue", 1).await);

    for i in 0..20 {
        a.send_text(&format!("msg-{}", i)).await.unwrap();
    }
    for i in 0..20 {
        assert_eq!(
            b.expect_text(DELIVERY_TIMEOUT_MS).await.unwrap(),
            format!("msg-{}", i)
        );
    }

    assert_eq!(other.recv(SILENCE_TIMEOUT_MS).await.unwrap(), Received::Nothing);

    a.close().await.unwrap();
    b.close().await.unwrap();
    other.close().await.unwrap();
    relay.shutdown().await.expect("Relay shutdown failed");
}
