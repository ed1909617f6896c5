use anyhow::Result;
use pairlink_core::RoomId;
use pairlink_server::{RelayConfig, RelayHandle, RelayServer, SupersedePolicy};
use std::time::Duration;

/// Timeout for a frame that is expected to arrive (ms).
pub const DELIVERY_TIMEOUT_MS: u64 = 2000;

/// How long to wait before deciding a frame was not delivered (ms).
pub const SILENCE_TIMEOUT_MS: u64 = 300;

pub async fn start_relay(policy: SupersedePolicy) -> Result<RelayHandle> {
    let server = RelayServer::bind(&RelayConfig::local().with_supersede(policy)).await?;
    server.spawn()
}

/// Polls the room map until `room` holds `expected` connections.
pub async fn wait_for_occupancy(relay: &RelayHandle, room: &str, expected: usize) -> bool {
    let Ok(room_id) = RoomId::new(room) else {
        return false;
    };

    for _ in 0..100 {
        if relay.rooms.occupancy(&room_id) == expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

pub async fn wait_for_room_count(relay: &RelayHandle, expected: usize) -> bool {
    for _ in 0..100 {
        if relay.rooms.room_count() == expected {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}
