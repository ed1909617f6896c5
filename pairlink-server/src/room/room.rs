use crate::room::{ConnId, RelayPeer};
use pairlink_core::Role;

/// Два слота комнаты: по одному на роль.
#[derive(Debug, Default)]
pub struct Room {
    initiator: Option<RelayPeer>,
    responder: Option<RelayPeer>,
}

impl Room {
    fn slot(&self, role: Role) -> &Option<RelayPeer> {
        match role {
            Role::Initiator => &self.initiator,
            Role::Responder => &self.responder,
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<RelayPeer> {
        match role {
            Role::Initiator => &mut self.initiator,
            Role::Responder => &mut self.responder,
        }
    }

    /// Puts `peer` into the slot and hands back whoever held it before.
    pub fn occupy(&mut self, role: Role, peer: RelayPeer) -> Option<RelayPeer> {
        self.slot_mut(role).replace(peer)
    }

    /// Clears the slot only if `conn_id` is its current holder.
    pub fn vacate(&mut self, role: Role, conn_id: ConnId) -> bool {
        let slot = self.slot_mut(role);
        if slot.as_ref().is_some_and(|peer| peer.conn_id == conn_id) {
            *slot = None;
            return true;
        }
        false
    }

    pub fn holder(&self, role: Role) -> Option<&RelayPeer> {
        self.slot(role).as_ref()
    }

    pub fn is_holder(&self, role: Role, conn_id: ConnId) -> bool {
        self.holder(role).is_some_and(|peer| peer.conn_id == conn_id)
    }

    pub fn free_role(&self) -> Option<Role> {
        Role::ALL.into_iter().find(|role| self.slot(*role).is_none())
    }

    pub fn len(&self) -> usize {
        Role::ALL
            .into_iter()
            .filter(|role| self.slot(*role).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
