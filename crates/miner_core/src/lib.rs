//! Miner core: pure session model and the shop sequencer state machine.
mod command;
mod effect;
mod event;
mod state;
mod targets;
mod update;

pub use command::ClientCommand;
pub use effect::Effect;
pub use event::{AreaId, Currency, ServerEvent, Shop, ShopId, ShopItem, SocketId};
pub use state::{Phase, SessionState};
pub use targets::{parse_shop_ids, TargetParseError};
pub use update::update;
