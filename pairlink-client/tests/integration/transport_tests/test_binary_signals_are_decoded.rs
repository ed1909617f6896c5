use crate::integration::init_tracing;
use crate::utils::{next_event, start_relay, start_transport, wait_for_occupancy};
use anyhow::Result;
use futures::SinkExt;
use pairlink_client::{SignalingEvent, SignalingOutput};
use pairlink_core::{Role, SignalMessage};
use pairlink_server::SupersedePolicy;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
async fn test_binary_signals_are_decoded() -> Result<()> {
    init_tracing();
    let relay = start_relay(SupersedePolicy::Keep).await?;

    let (responder, mut responder_events) = start_transport(&relay, "5", Role::Responder)?;
    responder.connect().await;
    assert_eq!(next_event(&mut responder_events).await, Some(SignalingEvent::Connected));

    // a legacy peer that writes its signaling as binary frames
    let (mut legacy, _) = connect_async(format!("{}?room=5&type=initiator", relay.url())).await?;
    assert!(wait_for_occupancy(&relay, "5", 2).await);

    legacy
        .send(Message::Binary(vec![0xff, 0x00].into()))
        .await?;
    legacy
        .send(Message::Binary(
            br#"{"type":"offer","sdp":"v=0 binary"}"#.to_vec().into(),
        ))
        .await?;

    assert_eq!(
        next_event(&mut responder_events).await,
        Some(SignalingEvent::Message(SignalMessage::Offer {
            sdp: "v=0 binary".to_owned()
        }))
    );
    assert!(responder.is_open().await);

    legacy.close(None).await?;
    responder.disconnect().await;
    relay.shutdown().await
}
