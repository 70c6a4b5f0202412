use std::sync::Once;

use miner_core::{
    update, ClientCommand, Currency, Effect, Phase, ServerEvent, SessionState, Shop, ShopItem,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(miner_logging::initialize_for_tests);
}

fn shop(id: u32) -> ServerEvent {
    ServerEvent::ShopLoaded(Shop {
        id,
        name: format!("Shop {id}"),
        kind: "Shop".to_string(),
        member_only: false,
        items: vec![ShopItem {
            id: 9000 + id,
            name: "Sword".to_string(),
            description: "Sharp".to_string(),
            asset_path: None,
            kind: "Sword".to_string(),
            member_only: false,
            currency: Currency::Coins,
            cost: 10,
        }],
    })
}

fn joined(area_id: u32) -> ServerEvent {
    ServerEvent::AreaJoined {
        area_id,
        area_name: "battleon".to_string(),
    }
}

fn apply(state: SessionState, events: &[ServerEvent]) -> (SessionState, Vec<Effect>) {
    let mut state = state;
    let mut all = Vec::new();
    for event in events {
        let (next, effects) = update(state, event);
        state = next;
        all.extend(effects);
    }
    (state, all)
}

#[test]
fn two_target_scenario_walks_all_phases() {
    init_logging();
    let state = SessionState::new([101, 102]);
    let (state, effects) = update(state, &ServerEvent::LoggedIn { socket_id: 55 });
    assert!(effects.is_empty());
    assert_eq!(state.socket_id(), Some(55));

    let (state, effects) = update(state, &joined(7));
    assert_eq!(state.phase(), Phase::AwaitingInventory);
    assert_eq!(state.area_id(), Some(7));
    assert_eq!(
        effects,
        vec![Effect::Send(ClientCommand::LoadPlayerInventory {
            area_id: 7,
            socket_id: 55
        })]
    );

    let (state, effects) = update(state, &ServerEvent::PlayerInventoryLoaded);
    assert_eq!(state.phase(), Phase::AwaitingShop);
    assert_eq!(
        effects,
        vec![Effect::Send(ClientCommand::LoadShop {
            area_id: 7,
            shop_id: 101
        })]
    );

    let (state, effects) = update(state, &shop(101));
    assert_eq!(state.phase(), Phase::AwaitingShop);
    assert_eq!(
        effects,
        vec![
            Effect::Pace,
            Effect::Send(ClientCommand::LoadShop {
                area_id: 7,
                shop_id: 102
            })
        ]
    );

    let (state, effects) = update(state, &shop(102));
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Exhausted);
    assert!(state.is_exhausted());
    assert_eq!(state.requested(), &[101, 102]);
    assert_eq!(state.remaining().len(), 0);
}

#[test]
fn every_target_is_requested_once_in_queue_order_with_pacing_between() {
    init_logging();
    let targets: Vec<u32> = (1..=6).map(|n| n * 11).collect();
    let mut events = vec![ServerEvent::LoggedIn { socket_id: 3 }, joined(1)];
    events.push(ServerEvent::PlayerInventoryLoaded);
    for id in &targets {
        events.push(shop(*id));
    }

    let (state, effects) = apply(SessionState::new(targets.clone()), &events);

    let shops: Vec<u32> = effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Send(command) => command.shop_id(),
            Effect::Pace => None,
        })
        .collect();
    assert_eq!(shops, targets);

    // Every LoadShop except the first is immediately preceded by exactly one pace.
    let mut paces_before = Vec::new();
    let mut pending_paces = 0;
    for effect in &effects {
        match effect {
            Effect::Pace => pending_paces += 1,
            Effect::Send(ClientCommand::LoadShop { .. }) => {
                paces_before.push(pending_paces);
                pending_paces = 0;
            }
            Effect::Send(_) => {}
        }
    }
    let mut expected = vec![1; targets.len()];
    expected[0] = 0;
    assert_eq!(paces_before, expected);
    assert_eq!(state.phase(), Phase::Exhausted);
}

#[test]
fn empty_queue_exhausts_after_inventory() {
    init_logging();
    let (state, effects) = apply(
        SessionState::new([]),
        &[
            ServerEvent::LoggedIn { socket_id: 1 },
            joined(4),
            ServerEvent::PlayerInventoryLoaded,
        ],
    );

    assert_eq!(
        effects,
        vec![Effect::Send(ClientCommand::LoadPlayerInventory {
            area_id: 4,
            socket_id: 1
        })]
    );
    assert_eq!(state.phase(), Phase::Exhausted);
}

#[test]
fn unsolicited_responses_do_not_issue_commands() {
    init_logging();
    let state = SessionState::new([5, 6]);

    // Nothing requested yet: neither response may trigger a shop load.
    let (state, effects) = apply(state, &[ServerEvent::PlayerInventoryLoaded, shop(5)]);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::AwaitingArea);

    // A second inventory response while a shop is outstanding is ignored.
    let (state, _) = apply(
        state,
        &[
            ServerEvent::LoggedIn { socket_id: 2 },
            joined(8),
            ServerEvent::PlayerInventoryLoaded,
        ],
    );
    let (state, effects) = update(state, &ServerEvent::PlayerInventoryLoaded);
    assert!(effects.is_empty());
    assert_eq!(state.requested(), &[5]);
}

#[test]
fn socket_id_is_fixed_by_first_login() {
    init_logging();
    let (state, _) = apply(
        SessionState::new([1]),
        &[
            ServerEvent::LoggedIn { socket_id: 10 },
            ServerEvent::LoggedIn { socket_id: 20 },
            joined(3),
        ],
    );
    assert_eq!(state.socket_id(), Some(10));
}

#[test]
fn area_join_without_socket_stalls() {
    init_logging();
    let (state, effects) = update(SessionState::new([1]), &joined(3));
    assert!(effects.is_empty());
    assert_eq!(state.area_id(), Some(3));
    assert_eq!(state.phase(), Phase::AwaitingInventory);

    // The missing inventory response keeps the session where it is.
    let (state, effects) = update(state, &shop(1));
    assert!(effects.is_empty());
    assert_eq!(state.requested(), &[] as &[u32]);
}

#[test]
fn rejoining_an_area_requests_inventory_again() {
    init_logging();
    let (state, effects) = apply(
        SessionState::new([1, 2, 3]),
        &[
            ServerEvent::LoggedIn { socket_id: 9 },
            joined(3),
            ServerEvent::PlayerInventoryLoaded,
            shop(1),
            joined(4),
        ],
    );
    assert_eq!(
        effects.last(),
        Some(&Effect::Send(ClientCommand::LoadPlayerInventory {
            area_id: 4,
            socket_id: 9
        }))
    );
    assert_eq!(state.phase(), Phase::AwaitingInventory);

    let (_state, effects) = update(state, &ServerEvent::PlayerInventoryLoaded);
    assert_eq!(
        effects,
        vec![Effect::Send(ClientCommand::LoadShop {
            area_id: 4,
            shop_id: 3
        })]
    );
}
