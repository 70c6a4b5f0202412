use std::collections::VecDeque;

use crate::{AreaId, ShopId, SocketId};

/// Where the shop sequence stands on this connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Connected, no area joined yet.
    #[default]
    AwaitingArea,
    /// `LoadPlayerInventory` sent, waiting for the inventory.
    AwaitingInventory,
    /// `LoadShop` sent, waiting for the shop.
    AwaitingShop,
    /// Every target was requested and the last shop arrived.
    Exhausted,
}

/// Per-connection sequencing state.
///
/// Owned by the session driver; listeners only ever see it by shared
/// reference and the sequencer `update` is the only writer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    area_id: Option<AreaId>,
    socket_id: Option<SocketId>,
    targets: VecDeque<ShopId>,
    phase: Phase,
    requested: Vec<ShopId>,
}

impl SessionState {
    pub fn new(targets: impl IntoIterator<Item = ShopId>) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn area_id(&self) -> Option<AreaId> {
        self.area_id
    }

    pub fn socket_id(&self) -> Option<SocketId> {
        self.socket_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Targets not yet requested, front first.
    pub fn remaining(&self) -> impl ExactSizeIterator<Item = &ShopId> + '_ {
        self.targets.iter()
    }

    /// Shop ids already requested, in request order.
    pub fn requested(&self) -> &[ShopId] {
        &self.requested
    }

    pub fn is_exhausted(&self) -> bool {
        self.phase == Phase::Exhausted
    }

    /// The socket id is fixed for the connection; later assignments are ignored.
    pub(crate) fn assign_socket(&mut self, socket_id: SocketId) {
        if self.socket_id.is_none() {
            self.socket_id = Some(socket_id);
        }
    }

    pub(crate) fn enter_area(&mut self, area_id: AreaId) {
        self.area_id = Some(area_id);
        self.phase = Phase::AwaitingInventory;
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn next_target(&mut self) -> Option<ShopId> {
        let shop_id = self.targets.pop_front()?;
        self.requested.push(shop_id);
        Some(shop_id)
    }
}
