use crate::{ClientCommand, Effect, Phase, ServerEvent, SessionState};

/// Pure update function: applies a server event to the session and returns the
/// effects to perform. At most one `Send` is produced per event, and a `Send`
/// is only produced in answer to the response of the previous one.
pub fn update(mut state: SessionState, event: &ServerEvent) -> (SessionState, Vec<Effect>) {
    let effects = match event {
        ServerEvent::LoggedIn { socket_id } => {
            state.assign_socket(*socket_id);
            Vec::new()
        }
        ServerEvent::AreaJoined { area_id, .. } => {
            state.enter_area(*area_id);
            // Without a socket id the inventory request cannot be addressed; the
            // session stays in AwaitingInventory until the server closes it.
            match state.socket_id() {
                Some(socket_id) => vec![Effect::Send(ClientCommand::LoadPlayerInventory {
                    area_id: *area_id,
                    socket_id,
                })],
                None => Vec::new(),
            }
        }
        ServerEvent::PlayerInventoryLoaded => {
            if state.phase() == Phase::AwaitingInventory {
                match request_next_shop(&mut state) {
                    Some(command) => vec![Effect::Send(command)],
                    None => Vec::new(),
                }
            } else {
                Vec::new()
            }
        }
        ServerEvent::ShopLoaded(_) => {
            if state.phase() == Phase::AwaitingShop {
                match request_next_shop(&mut state) {
                    Some(command) => vec![Effect::Pace, Effect::Send(command)],
                    None => Vec::new(),
                }
            } else {
                Vec::new()
            }
        }
        ServerEvent::Unrecognized { .. } => Vec::new(),
    };

    (state, effects)
}

fn request_next_shop(state: &mut SessionState) -> Option<ClientCommand> {
    let area_id = state.area_id()?;
    match state.next_target() {
        Some(shop_id) => {
            state.set_phase(Phase::AwaitingShop);
            Some(ClientCommand::LoadShop { area_id, shop_id })
        }
        None => {
            state.set_phase(Phase::Exhausted);
            None
        }
    }
}
