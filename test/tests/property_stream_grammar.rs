/// PROPERTY-BASED TESTS: per-viewer message streams
///
/// Random interleavings of viewer sessions and movement, entity edits,
/// removals, skin fetches and ticks must leave every viewer with a well
/// formed stream:
/// 1. Per entity, Spawn Update* Destroy lifetimes and nothing outside them,
///    within every session of a viewer
/// 2. What the stream leaves spawned is what the server thinks is spawned
/// 3. A tick with no new changes sends nothing
use std::{
    collections::BTreeSet,
    time::Duration,
};

use proptest::prelude::*;

use phantom_server::{EntityDefinition, EntityUpdate, SessionEvent, SkinSource, ViewerId};
use phantom_shared::{
    EntityId, EntityKind, EntityMessage, EquipmentSlot, ItemStack, Location,
};
use phantom_test::{check_stream_grammar, TestServer, PROTOCOL_1_21_4};

const VIEWERS: usize = 2;
const ENTITIES: usize = 3;
/// This slot holds a humanoid whose skin is fetched
const PLAYER_SLOT: usize = 0;
const SKIN_OWNER: &str = "Alice";

#[derive(Clone, Debug)]
enum Op {
    Join(usize),
    Quit(usize),
    CloseChannel(usize),
    ViewerTeleport(usize, f64),
    ToggleSneak(usize, bool),
    EntityMove(usize, f64),
    Glow(usize, bool),
    Equip(usize, Option<i32>),
    Recreate(usize),
    RefreshSkin,
    Tick,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..VIEWERS).prop_map(Op::Join),
        (0..VIEWERS).prop_map(Op::Quit),
        (0..VIEWERS).prop_map(Op::CloseChannel),
        (0..VIEWERS, -100.0f64..100.0).prop_map(|(v, x)| Op::ViewerTeleport(v, x)),
        (0..VIEWERS, any::<bool>()).prop_map(|(v, on)| Op::ToggleSneak(v, on)),
        (0..ENTITIES, -100.0f64..100.0).prop_map(|(e, x)| Op::EntityMove(e, x)),
        (0..ENTITIES, any::<bool>()).prop_map(|(e, on)| Op::Glow(e, on)),
        (0..ENTITIES, prop::option::of(1i32..900)).prop_map(|(e, item)| Op::Equip(e, item)),
        (0..ENTITIES).prop_map(Op::Recreate),
        Just(Op::RefreshSkin),
        Just(Op::Tick),
    ]
}

fn at(x: f64) -> Location {
    Location::new("world", x, 64.0, 0.0)
}

fn definition(slot: usize) -> EntityDefinition {
    let location = at(slot as f64 * 30.0);
    if slot == PLAYER_SLOT {
        EntityDefinition::new(format!("npc-{}", slot), EntityKind::Player, location)
            .with_skin(SkinSource::owner(SKIN_OWNER))
    } else {
        EntityDefinition::new(format!("npc-{}", slot), EntityKind::Zombie, location)
    }
}

/// What a client holding exactly this stream would have spawned
fn spawned_by(messages: &[EntityMessage]) -> BTreeSet<EntityId> {
    let mut spawned = BTreeSet::new();
    for message in messages {
        match message {
            EntityMessage::Spawn(spawn) => {
                spawned.insert(spawn.entity_id);
            }
            EntityMessage::Destroy(destroy) => {
                for id in &destroy.entity_ids {
                    spawned.remove(id);
                }
            }
            _ => {}
        }
    }
    spawned
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Session {
    Online,
    /// The connection dropped; the server finds out on its next send
    Closed,
    Quit,
}

/// One viewer as the client side sees it. Every join starts a new client
/// with an empty stream.
struct Client {
    id: ViewerId,
    session: Session,
    stream: Vec<EntityMessage>,
    ended: Vec<Vec<EntityMessage>>,
}

impl Client {
    fn end_session(&mut self, session: Session) {
        self.session = session;
        self.ended.push(std::mem::take(&mut self.stream));
    }
}

fn join(test: &mut TestServer, index: usize, viewer: ViewerId) {
    test.event(
        viewer,
        SessionEvent::Join {
            location: at(index as f64 * -40.0),
            protocol_id: PROTOCOL_1_21_4,
            view_distance: 10,
        },
    );
}

fn run(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut test = TestServer::new();
    test.fetcher.knows(SKIN_OWNER);
    test.fetcher.set_delay(Duration::from_millis(2));

    let mut clients: Vec<Client> = (0..VIEWERS)
        .map(|index| Client {
            id: test.join(at(index as f64 * -40.0)),
            session: Session::Online,
            stream: Vec::new(),
            ended: Vec::new(),
        })
        .collect();
    let mut ids: Vec<EntityId> = (0..ENTITIES)
        .map(|slot| test.server.create(definition(slot)).unwrap())
        .collect();

    for op in ops {
        match op {
            Op::Join(viewer) => {
                let client = &mut clients[viewer];
                if client.session != Session::Online {
                    if client.session == Session::Closed {
                        client.end_session(Session::Closed);
                    }
                    test.transport.reopen(&client.id);
                    client.session = Session::Online;
                    join(&mut test, viewer, client.id);
                }
            }
            Op::Quit(viewer) => {
                let client = &mut clients[viewer];
                if client.session != Session::Quit {
                    test.event(client.id, SessionEvent::Quit);
                    client.end_session(Session::Quit);
                }
            }
            Op::CloseChannel(viewer) => {
                let client = &mut clients[viewer];
                if client.session == Session::Online {
                    test.transport.close(&client.id);
                    client.session = Session::Closed;
                }
            }
            Op::ViewerTeleport(viewer, x) => {
                let client = &clients[viewer];
                if client.session != Session::Quit {
                    test.teleport(client.id, at(x));
                }
            }
            Op::ToggleSneak(viewer, on) => {
                let client = &clients[viewer];
                if client.session != Session::Quit {
                    test.event(client.id, SessionEvent::ToggleSneak(on));
                }
            }
            Op::EntityMove(entity, x) => {
                test.server
                    .update(ids[entity], EntityUpdate::new().location(at(x)))
                    .unwrap();
            }
            Op::Glow(entity, on) => {
                test.server
                    .update(ids[entity], EntityUpdate::new().glowing(on))
                    .unwrap();
            }
            Op::Equip(entity, item) => {
                let update = match item {
                    Some(item_id) => EntityUpdate::new()
                        .equipment(EquipmentSlot::MainHand, ItemStack::new(item_id, 1)),
                    None => EntityUpdate::new().clear_equipment(EquipmentSlot::MainHand),
                };
                test.server.update(ids[entity], update).unwrap();
            }
            Op::Recreate(entity) => {
                test.server.remove(ids[entity]).unwrap();
                ids[entity] = test.server.create(definition(entity)).unwrap();
            }
            Op::RefreshSkin => {
                test.server
                    .update(ids[PLAYER_SLOT], EntityUpdate::new().refresh_skin())
                    .unwrap();
            }
            Op::Tick => {
                test.tick();
            }
        }
        for client in &mut clients {
            let received = test.take_messages(&client.id);
            client.stream.extend(received);
        }
    }

    // lands every skin fetch, ticking at least once
    test.settle_skins();
    for client in &mut clients {
        let received = test.take_messages(&client.id);
        client.stream.extend(received);

        for stream in client.ended.iter().chain([&client.stream]) {
            if let Err(reason) = check_stream_grammar(stream) {
                return Err(TestCaseError::fail(reason));
            }
        }
        let scope: BTreeSet<EntityId> =
            test.server.viewer_scope(&client.id).entities().into_iter().collect();
        match client.session {
            Session::Online => {
                prop_assert_eq!(spawned_by(&client.stream), scope);
            }
            Session::Quit => {
                prop_assert!(client.stream.is_empty());
                prop_assert!(scope.is_empty());
                prop_assert!(test.server.viewer(&client.id).is_none());
            }
            // the server may not have tried to send since the drop
            Session::Closed => {}
        }
    }

    // nothing left to say
    test.tick();
    for client in &clients {
        prop_assert!(test.take_messages(&client.id).is_empty());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_streams_stay_well_formed(ops in prop::collection::vec(op_strategy(), 1..40)) {
        run(ops)?;
    }
}

#[test]
fn recreating_in_one_tick_keeps_the_stream_valid() {
    run(vec![
        Op::Tick,
        Op::Recreate(0),
        Op::Glow(0, true),
        Op::Recreate(0),
        Op::Tick,
        Op::ViewerTeleport(0, 90.0),
        Op::ViewerTeleport(0, 0.0),
    ])
    .unwrap();
}

#[test]
fn rejoining_after_a_dropped_channel_starts_a_fresh_stream() {
    run(vec![
        Op::Tick,
        Op::CloseChannel(0),
        Op::Glow(1, true),
        Op::Tick,
        Op::Join(0),
        Op::Tick,
        Op::Quit(1),
        Op::Join(1),
        Op::RefreshSkin,
        Op::Tick,
    ])
    .unwrap();
}
