use crate::config::SupersedePolicy;
use crate::room::{ConnId, RelayPeer, Room};
use axum::extract::ws::Message;
use dashmap::DashMap;
use pairlink_core::{Role, RoomId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JoinError {
    #[error("Room is full")]
    RoomFull,
}

#[derive(Debug)]
pub struct Joined {
    pub role: Role,
    pub superseded: Option<RelayPeer>,
}

/// Итог пересылки одного сообщения.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// Во втором слоте никого нет (или соединение уже закрыто).
    NoPeer,
    /// Комнаты нет: отправитель уже покинул её.
    NoRoom,
    /// Отправитель был вытеснен переподключением, а политика `close` запрещает его сообщения.
    Stale,
}

/// Карта комнат. DashMap блокирует только шард с нужной комнатой,
/// поэтому операции над разными комнатами друг друга не ждут.
#[derive(Clone)]
pub struct RoomManager {
    rooms: Arc<DashMap<RoomId, Room>>,
    policy: SupersedePolicy,
}

impl RoomManager {
    pub fn new(policy: SupersedePolicy) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> SupersedePolicy {
        self.policy
    }

    pub fn join(
        &self,
        room_id: &RoomId,
        role: Option<Role>,
        peer: RelayPeer,
    ) -> Result<Joined, JoinError> {
        let mut room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            info!("Creating new room: {}", room_id);
            Room::default()
        });

        let role = match role.or_else(|| room.free_role()) {
            Some(role) => role,
            None => return Err(JoinError::RoomFull),
        };

        let superseded = room.occupy(role, peer);
        Ok(Joined { role, superseded })
    }

    pub fn forward(&self, room_id: &RoomId, from: Role, conn_id: ConnId, msg: Message) -> Delivery {
        let target = {
            let Some(room) = self.rooms.get(room_id) else {
                return Delivery::NoRoom;
            };
            if self.policy == SupersedePolicy::Close && !room.is_holder(from, conn_id) {
                return Delivery::Stale;
            }
            room.holder(from.other()).cloned()
        };

        match target {
            Some(peer) if peer.send(msg) => Delivery::Delivered,
            _ => Delivery::NoPeer,
        }
    }

    /// Освобождает слот и удаляет комнату, если она опустела.
    pub fn leave(&self, room_id: &RoomId, role: Role, conn_id: ConnId) -> bool {
        let vacated = match self.rooms.get_mut(room_id) {
            Some(mut room) => room.vacate(role, conn_id),
            None => false,
        };

        if self
            .rooms
            .remove_if(room_id, |_, room| room.is_empty())
            .is_some()
        {
            info!("Room {} is empty, removing", room_id);
        } else if !vacated {
            debug!(
                "Connection {} no longer holds {} slot in room {}",
                conn_id, role, room_id
            );
        }

        vacated
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn occupancy(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map(|room| room.len()).unwrap_or(0)
    }
}
