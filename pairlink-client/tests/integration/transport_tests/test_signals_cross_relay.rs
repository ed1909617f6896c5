use crate::integration::init_tracing;
use crate::utils::{next_event, start_relay, start_transport, wait_for_occupancy, wait_for_room_count};
use anyhow::Result;
use pairlink_client::{SignalingEvent, SignalingOutput};
use pairlink_core::{IceCandidate, Role, SignalMessage};
use pairlink_server::SupersedePolicy;

#[tokio::test]
async fn test_signals_cross_relay() -> Result<()> {
    init_tracing();
    let relay = start_relay(SupersedePolicy::Keep).await?;

    let (initiator, mut initiator_events) = start_transport(&relay, "42", Role::Initiator)?;
    let (responder, mut responder_events) = start_transport(&relay, "42", Role::Responder)?;

    initiator.connect().await;
    responder.connect().await;
    assert_eq!(next_event(&mut initiator_events).await, Some(SignalingEvent::Connected));
    assert_eq!(next_event(&mut responder_events).await, Some(SignalingEvent::Connected));

    // both slots must be registered before anything is sent
    assert!(wait_for_occupancy(&relay, "42", 2).await);

    initiator.send_offer("v=0 offer".to_owned()).await;
    assert_eq!(
        next_event(&mut responder_events).await,
        Some(SignalingEvent::Message(SignalMessage::Offer {
            sdp: "v=0 offer".to_owned()
        }))
    );

    let candidate = IceCandidate {
        sdp_mid: "0".to_owned(),
        sdp_m_line_index: 0,
        candidate: "candidate:1 1 udp 1 127.0.0.1 5000 typ host".to_owned(),
    };
    responder.send_answer("v=0 answer".to_owned()).await;
    responder.send_ice(candidate.clone()).await;

    assert_eq!(
        next_event(&mut initiator_events).await,
        Some(SignalingEvent::Message(SignalMessage::Answer {
            sdp: "v=0 answer".to_owned()
        }))
    );
    assert_eq!(
        next_event(&mut initiator_events).await,
        Some(SignalingEvent::Message(SignalMessage::Candidate(candidate)))
    );

    initiator.disconnect().await;
    responder.disconnect().await;
    assert!(wait_for_room_count(&relay, 0).await);

    relay.shutdown().await
}
