use serde::{Deserialize, Serialize};

use crate::{AreaId, ShopId, SocketId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ClientCommand {
    LoadPlayerInventory { area_id: AreaId, socket_id: SocketId },
    LoadShop { area_id: AreaId, shop_id: ShopId },
}

impl ClientCommand {
    pub fn shop_id(&self) -> Option<ShopId> {
        match self {
            ClientCommand::LoadShop { shop_id, .. } => Some(*shop_id),
            ClientCommand::LoadPlayerInventory { .. } => None,
        }
    }
}
