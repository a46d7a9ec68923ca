use std::time::Duration;

use phantom_server::{EntityDefinition, EntityUpdate, ServerConfig, SkinError, SkinSource, SkinTexture};
use phantom_shared::{EntityKind, EntityMessage, Location, PacketKind, ProfileProperty};
use phantom_test::{assert_stream_valid, count_kind, test_config, texture_of, TestServer};

fn at(x: f64) -> Location {
    Location::new("world", x, 64.0, 0.0)
}

fn npc(name: &str, owner: &str) -> EntityDefinition {
    EntityDefinition::new(name, EntityKind::Player, at(0.0)).with_skin(SkinSource::owner(owner))
}

/// Profile properties of every tab-list add in the stream, in order
fn announced_skins(messages: &[EntityMessage]) -> Vec<Vec<ProfileProperty>> {
    messages
        .iter()
        .filter_map(|message| match message {
            EntityMessage::PlayerInfoUpdate(update) => {
                Some(update.entries[0].properties.clone())
            }
            _ => None,
        })
        .collect()
}

// ========== Fetch Tests ==========

#[test]
fn placeholder_until_the_skin_lands() {
    let mut test = TestServer::new();
    test.fetcher.knows("Alice");
    test.fetcher.set_delay(Duration::from_millis(100));
    let viewer = test.join(at(3.0));

    let id = test.server.create(npc("guide", "Alice")).unwrap();
    test.tick();
    assert!(test.server.entity(id).unwrap().skin_pending);
    let mut messages = test.take_messages(&viewer);
    assert_eq!(announced_skins(&messages), vec![Vec::new()]);

    test.settle_skins();
    let snapshot = test.server.entity(id).unwrap();
    assert!(!snapshot.skin_pending);
    assert_eq!(snapshot.texture, Some(texture_of("Alice")));

    // the client only reads a skin when the profile is added, so it respawns
    let respawn = test.take_messages(&viewer);
    assert!(matches!(respawn[0], EntityMessage::Destroy(_)));
    assert!(matches!(respawn[1], EntityMessage::PlayerInfoRemove(_)));
    assert_eq!(
        announced_skins(&respawn),
        vec![vec![texture_of("Alice").to_property()]]
    );
    messages.extend(respawn);
    assert_stream_valid!(messages);
}

#[test]
fn owner_is_fetched_once() {
    let mut test = TestServer::new();
    test.fetcher.knows("Alice");
    test.fetcher.set_delay(Duration::from_millis(20));

    let first = test.server.create(npc("first", "Alice")).unwrap();
    let second = test.server.create(npc("second", "Alice")).unwrap();
    test.settle_skins();
    assert_eq!(test.fetcher.calls(), 1);
    for id in [first, second] {
        assert_eq!(test.server.entity(id).unwrap().texture, Some(texture_of("Alice")));
    }

    // served from cache without waiting
    let third = test.server.create(npc("third", "Alice")).unwrap();
    let snapshot = test.server.entity(third).unwrap();
    assert!(!snapshot.skin_pending);
    assert_eq!(snapshot.texture, Some(texture_of("Alice")));
    assert_eq!(test.fetcher.calls(), 1);
}

#[test]
fn inline_texture_needs_no_fetch() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    let id = test
        .server
        .create(
            EntityDefinition::new("inline", EntityKind::Player, at(0.0)).with_skin(
                SkinSource::Texture {
                    value: "value".to_string(),
                    signature: None,
                },
            ),
        )
        .unwrap();
    test.tick();

    assert_eq!(test.fetcher.calls(), 0);
    assert_eq!(
        test.server.entity(id).unwrap().texture,
        Some(SkinTexture::new("value", None))
    );
    assert_eq!(
        announced_skins(&test.take_messages(&viewer)),
        vec![vec![SkinTexture::new("value", None).to_property()]]
    );
}

#[test]
fn refresh_fetches_again() {
    let mut test = TestServer::new();
    test.fetcher.knows("Alice");
    let id = test.server.create(npc("guide", "Alice")).unwrap();
    test.settle_skins();
    assert_eq!(test.fetcher.calls(), 1);

    test.server
        .update(id, EntityUpdate::new().refresh_skin())
        .unwrap();
    assert!(test.server.entity(id).unwrap().skin_pending);
    test.settle_skins();
    assert_eq!(test.fetcher.calls(), 2);
}

#[test]
fn switching_owner_keeps_the_old_skin_until_resolved() {
    let mut test = TestServer::new();
    test.fetcher.knows("Alice");
    test.fetcher.knows("Bob");
    let viewer = test.join(at(3.0));
    let id = test.server.create(npc("guide", "Alice")).unwrap();
    test.settle_skins();
    test.clear_messages();

    test.fetcher.set_delay(Duration::from_millis(50));
    test.server
        .update(id, EntityUpdate::new().skin(Some(SkinSource::owner("Bob"))))
        .unwrap();
    test.tick();
    assert_eq!(test.server.entity(id).unwrap().texture, Some(texture_of("Alice")));
    assert!(test.take_messages(&viewer).is_empty());

    test.settle_skins();
    assert_eq!(
        announced_skins(&test.take_messages(&viewer)),
        vec![vec![texture_of("Bob").to_property()]]
    );
}

#[test]
fn late_completion_for_an_abandoned_owner_is_ignored() {
    let mut test = TestServer::new();
    test.fetcher.knows("Alice");
    test.fetcher.set_delay(Duration::from_millis(50));
    let id = test.server.create(npc("guide", "Alice")).unwrap();

    test.server
        .update(
            id,
            EntityUpdate::new().skin(Some(SkinSource::Texture {
                value: "inline".to_string(),
                signature: None,
            })),
        )
        .unwrap();
    test.settle_skins();
    assert_eq!(
        test.server.entity(id).unwrap().texture,
        Some(SkinTexture::new("inline", None))
    );
}

// ========== Failure Tests ==========

fn fallback() -> SkinTexture {
    SkinTexture::new("fallback", Some("fallback-signature".to_string()))
}

#[test]
fn unknown_owner_falls_back_to_default_skin() {
    let mut test = TestServer::with_config(ServerConfig {
        default_skin: Some(fallback()),
        ..test_config()
    });
    let viewer = test.join(at(3.0));
    let id = test.server.create(npc("guide", "Nobody")).unwrap();
    test.tick();
    test.settle_skins();

    let snapshot = test.server.entity(id).unwrap();
    assert!(!snapshot.skin_pending);
    assert_eq!(snapshot.texture, Some(fallback()));

    // the placeholder already was the default, so there is no respawn
    let messages = test.take_messages(&viewer);
    assert_eq!(count_kind(&messages, PacketKind::SpawnEntity), 1);
    assert_eq!(count_kind(&messages, PacketKind::RemoveEntities), 0);
    assert_eq!(
        announced_skins(&messages),
        vec![vec![fallback().to_property()]]
    );
}

#[test]
fn service_error_without_default_leaves_no_skin() {
    let mut test = TestServer::new();
    test.fetcher.fails(
        "Alice",
        SkinError::Http {
            reason: "503".to_string(),
        },
    );
    let id = test.server.create(npc("guide", "Alice")).unwrap();
    test.settle_skins();

    let snapshot = test.server.entity(id).unwrap();
    assert!(!snapshot.skin_pending);
    assert_eq!(snapshot.texture, None);

    // failures are not cached
    test.server
        .update(id, EntityUpdate::new().refresh_skin())
        .unwrap();
    test.settle_skins();
    assert_eq!(test.fetcher.calls(), 2);
}

#[test]
fn slow_service_times_out() {
    let mut test = TestServer::with_config(ServerConfig {
        default_skin: Some(fallback()),
        skin_fetch_timeout: Duration::from_millis(50),
        ..test_config()
    });
    test.fetcher.knows("Alice");
    test.fetcher.set_delay(Duration::from_millis(1000));
    let id = test.server.create(npc("guide", "Alice")).unwrap();
    test.settle_skins();

    assert_eq!(test.server.entity(id).unwrap().texture, Some(fallback()));
}
