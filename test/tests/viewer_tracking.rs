use std::{collections::HashSet, time::Duration};

use phantom_server::{
    EntityDefinition, EntityUpdate, ServerConfig, SessionEvent, Visibility,
};
use phantom_shared::{ChunkPos, EntityKind, EntityMessage, Location, PacketKind};
use phantom_test::{count_kind, spawned_ids, test_config, TestServer, PROTOCOL_1_21_4};

fn at(x: f64) -> Location {
    Location::new("world", x, 64.0, 0.0)
}

fn zombie() -> EntityDefinition {
    EntityDefinition::new("guard", EntityKind::Zombie, at(0.0))
}

// ========== Quit Tests ==========

#[test]
fn quit_with_pending_changes_sends_nothing() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    let id = test.server.create(zombie()).unwrap();
    test.tick();
    test.clear_messages();

    test.server
        .update(id, EntityUpdate::new().glowing(true))
        .unwrap();
    test.event(viewer, SessionEvent::Quit);
    test.tick();

    assert!(test.take_messages(&viewer).is_empty());
    assert!(test.server.viewer(&viewer).is_none());
    assert!(!test.server.viewer_scope(&viewer).has(&id));
}

#[test]
fn rejoin_starts_from_scratch() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    let id = test.server.create(zombie()).unwrap();
    test.tick();
    test.clear_messages();

    // a second join without quit replaces the old session
    test.event(
        viewer,
        SessionEvent::Join {
            location: at(3.0),
            protocol_id: PROTOCOL_1_21_4,
            view_distance: 10,
        },
    );
    let messages = test.take_messages(&viewer);
    assert_eq!(spawned_ids(&messages), vec![id]);
    assert_eq!(count_kind(&messages, PacketKind::RemoveEntities), 0);
}

// ========== Channel Tests ==========

#[test]
fn closed_channel_is_treated_as_quit() {
    let mut test = TestServer::new();
    let gone = test.join(at(3.0));
    let present = test.join(at(-3.0));
    let id = test.server.create(zombie()).unwrap();
    test.tick();
    test.clear_messages();

    test.transport.close(&gone);
    test.server
        .update(id, EntityUpdate::new().glowing(true))
        .unwrap();
    let report = test.tick();

    assert_eq!(report.closed_viewers, vec![gone]);
    assert!(test.server.viewer(&gone).is_none());
    assert!(test.take_messages(&gone).is_empty());
    assert_eq!(
        count_kind(&test.take_messages(&present), PacketKind::SetEntityMetadata),
        1
    );

    // no retry on later ticks
    test.transport.reopen(&gone);
    test.server
        .update(id, EntityUpdate::new().glowing(false))
        .unwrap();
    test.tick();
    assert!(test.take_messages(&gone).is_empty());
}

#[test]
fn unsupported_protocol_sees_nothing_and_disturbs_nobody() {
    let mut test = TestServer::new();
    let old_client = test.join_with_protocol(at(3.0), 765);
    let viewer = test.join(at(-3.0));
    let id = test.server.create(zombie()).unwrap();
    test.tick();

    assert_eq!(test.server.viewer(&old_client).map(|v| v.protocol()), Some(None));
    assert!(!test.server.viewer_scope(&old_client).has(&id));
    assert!(test.server.viewer_scope(&viewer).has(&id));
    assert_eq!(spawned_ids(&test.take_messages(&viewer)), vec![id]);
    assert!(test.take_messages(&old_client).is_empty());
}

// ========== Eligibility Tests ==========

#[test]
fn chunk_must_be_loaded_when_required() {
    let mut test = TestServer::with_config(ServerConfig {
        require_loaded_chunk: true,
        ..test_config()
    });
    let viewer = test.join(at(3.0));
    let id = test.server.create(zombie()).unwrap();
    test.tick();
    assert!(test.take_messages(&viewer).is_empty());

    test.event(viewer, SessionEvent::ChunkLoad(ChunkPos::containing(0.0, 0.0)));
    assert_eq!(spawned_ids(&test.take_messages(&viewer)), vec![id]);

    test.event(viewer, SessionEvent::ChunkUnload(ChunkPos::new(0, 0)));
    let messages = test.take_messages(&viewer);
    assert!(matches!(messages.as_slice(), [EntityMessage::Destroy(_)]));
}

#[test]
fn changing_world_despawns() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    test.server.create(zombie()).unwrap();
    test.tick();
    test.clear_messages();

    test.event(
        viewer,
        SessionEvent::ChangeWorld(Location::new("world_nether", 0.0, 64.0, 0.0)),
    );
    let messages = test.take_messages(&viewer);
    assert_eq!(count_kind(&messages, PacketKind::RemoveEntities), 1);
}

#[test]
fn view_distance_limits_range() {
    let mut test = TestServer::new();
    let viewer = test.join(at(40.0));
    let id = test.server.create(zombie()).unwrap();
    test.tick();
    assert!(test.server.viewer_scope(&viewer).has(&id));

    // two chunks is 32 blocks
    test.event(viewer, SessionEvent::ViewDistance(2));
    assert!(!test.server.viewer_scope(&viewer).has(&id));
    assert_eq!(
        count_kind(&test.take_messages(&viewer), PacketKind::RemoveEntities),
        1
    );
}

#[test]
fn entity_max_distance_is_respected() {
    let mut test = TestServer::new();
    let viewer = test.join(at(20.0));
    let id = test
        .server
        .create(zombie().with_visibility(Visibility::within(10.0)))
        .unwrap();
    test.tick();
    assert!(!test.server.viewer_scope(&viewer).has(&id));

    test.teleport(viewer, at(10.0));
    assert!(test.server.viewer_scope(&viewer).has(&id));
}

#[test]
fn whitelist_and_blacklist() {
    let mut test = TestServer::new();
    let friend = test.join(at(3.0));
    let stranger = test.join(at(-3.0));
    let id = test
        .server
        .create(zombie().with_visibility(Visibility {
            whitelist: Some(HashSet::from([friend])),
            ..Visibility::default()
        }))
        .unwrap();
    test.tick();
    assert!(test.server.viewer_scope(&friend).has(&id));
    assert!(!test.server.viewer_scope(&stranger).has(&id));

    test.server
        .update(
            id,
            EntityUpdate::new().visibility(Visibility {
                blacklist: HashSet::from([friend]),
                ..Visibility::default()
            }),
        )
        .unwrap();
    test.tick();
    assert!(!test.server.viewer_scope(&friend).has(&id));
    assert!(test.server.viewer_scope(&stranger).has(&id));
}

#[test]
fn moving_entity_out_of_range_despawns_it() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    let id = test.server.create(zombie()).unwrap();
    test.tick();
    test.clear_messages();

    test.server
        .update(id, EntityUpdate::new().location(at(200.0)))
        .unwrap();
    test.tick();

    let messages = test.take_messages(&viewer);
    assert_eq!(messages.len(), 1);
    assert!(matches!(&messages[0], EntityMessage::Destroy(destroy) if destroy.entity_ids == vec![id]));
}

// ========== Rate Limiting Tests ==========

#[test]
fn walking_is_checked_at_most_once_per_interval() {
    let mut test = TestServer::new();
    let viewer = test.join(at(100.0));
    let id = test.server.create(zombie()).unwrap();
    test.tick();

    test.advance(Duration::from_millis(10));
    test.event(viewer, SessionEvent::Move(at(60.0)));
    test.advance(Duration::from_millis(10));
    test.event(viewer, SessionEvent::Move(at(20.0)));
    assert!(!test.server.viewer_scope(&viewer).has(&id));

    test.advance(Duration::from_millis(40));
    test.tick();
    assert!(test.server.viewer_scope(&viewer).has(&id));
    assert_eq!(test.server.viewer(&viewer).map(|v| v.location().x), Some(20.0));
}
