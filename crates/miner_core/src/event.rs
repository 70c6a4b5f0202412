use serde::{Deserialize, Serialize};

pub type AreaId = u32;
pub type SocketId = u32;
pub type ShopId = u32;

/// Decoded server event, as delivered by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Login accepted; the server assigned this connection its socket id.
    LoggedIn { socket_id: SocketId },
    /// The player entered an area (map room).
    AreaJoined {
        area_id: AreaId,
        #[serde(default)]
        area_name: String,
    },
    /// Response to `LoadPlayerInventory`.
    PlayerInventoryLoaded,
    /// Response to `LoadShop`.
    ShopLoaded(Shop),
    /// Any event the miner has no interest in.
    Unrecognized { kind: String },
}

impl ServerEvent {
    /// Short variant label for log lines.
    pub fn label(&self) -> &str {
        match self {
            ServerEvent::LoggedIn { .. } => "logged_in",
            ServerEvent::AreaJoined { .. } => "area_joined",
            ServerEvent::PlayerInventoryLoaded => "player_inventory_loaded",
            ServerEvent::ShopLoaded(_) => "shop_loaded",
            ServerEvent::Unrecognized { kind } => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub member_only: bool,
    #[serde(default)]
    pub items: Vec<ShopItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: u32,
    pub name: String,
    pub description: String,
    /// Path relative to the game files root, if the item has an asset.
    pub asset_path: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub member_only: bool,
    pub currency: Currency,
    pub cost: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Coins,
    AdventureCoins,
}
