use phantom_server::{EntityDefinition, JsonDefinitions, PhantomServerError, SkinSource};
use phantom_shared::{
    EntityKind, EntityMessage, EquipmentSlot, ItemStack, Location, NametagVisibility, PacketKind,
    PlayerInfoActions, TeamMode,
};
use phantom_test::{assert_stream_valid, count_kind, spawned_ids, texture_of, TestServer};

fn at(x: f64) -> Location {
    Location::new("world", x, 64.0, 0.0)
}

fn guide() -> EntityDefinition {
    EntityDefinition::new("guide", EntityKind::Player, at(0.0))
        .with_display_name("Guide")
        .with_skin(SkinSource::owner("Alice"))
}

// ========== Spawn / Despawn Tests ==========

#[test]
fn viewer_entering_and_leaving_range() {
    let mut test = TestServer::new();
    test.fetcher.knows("Alice");
    let id = test.server.create(guide()).unwrap();
    test.settle_skins();

    let viewer = test.join(at(100.0));
    test.tick();
    assert!(test.take_messages(&viewer).is_empty());

    // enters range
    test.teleport(viewer, at(10.0));
    let messages = test.take_messages(&viewer);
    assert_stream_valid!(messages);
    assert_eq!(spawned_ids(&messages), vec![id]);
    assert!(matches!(messages[0], EntityMessage::PlayerInfoUpdate(_)));
    match &messages[0] {
        EntityMessage::PlayerInfoUpdate(update) => {
            assert_eq!(
                update.actions,
                PlayerInfoActions(PlayerInfoActions::ADD_PLAYER | PlayerInfoActions::UPDATE_LISTED)
            );
            let entry = &update.entries[0];
            assert_eq!(entry.name, "Guide");
            assert!(!entry.listed);
            assert_eq!(entry.properties, vec![texture_of("Alice").to_property()]);
        }
        other => panic!("expected the profile first, got {:?}", other),
    }
    match &messages[1] {
        EntityMessage::Spawn(spawn) => {
            assert_eq!((spawn.x, spawn.y, spawn.z), (0.0, 64.0, 0.0));
            assert_eq!(spawn.kind, EntityKind::Player);
        }
        other => panic!("expected a spawn, got {:?}", other),
    }
    assert!(test.server.viewer_scope(&viewer).has(&id));

    // leaves range
    test.teleport(viewer, at(100.0));
    let messages = test.take_messages(&viewer);
    assert_eq!(count_kind(&messages, PacketKind::RemoveEntities), 1);
    assert_eq!(count_kind(&messages, PacketKind::PlayerInfoRemove), 1);
    assert!(!test.server.viewer_scope(&viewer).has(&id));

    // comes back
    test.teleport(viewer, at(5.0));
    let messages = test.take_messages(&viewer);
    assert_eq!(spawned_ids(&messages), vec![id]);
}

#[test]
fn humanoid_name_tag_is_hidden_by_a_team() {
    let mut test = TestServer::new();
    test.fetcher.knows("Alice");
    let viewer = test.join(at(3.0));
    let id = test.server.create(guide()).unwrap();
    test.settle_skins();

    let messages = test.take_messages(&viewer);
    assert_stream_valid!(messages);
    match messages.last() {
        Some(EntityMessage::Team(team)) => {
            assert_eq!(team.team, format!("hidden_{}", id.0));
            match &team.mode {
                TeamMode::Create {
                    properties,
                    members,
                } => {
                    assert_eq!(properties.nametag, NametagVisibility::Never);
                    assert_eq!(members, &vec!["Guide".to_string()]);
                }
                other => panic!("expected a new team, got {:?}", other),
            }
        }
        other => panic!("expected the team last, got {:?}", other),
    }

    test.server.remove(id).unwrap();
    let messages = test.take_messages(&viewer);
    let kinds: Vec<PacketKind> = messages.iter().map(EntityMessage::packet_kind).collect();
    assert_eq!(
        kinds,
        vec![
            PacketKind::RemoveEntities,
            PacketKind::PlayerInfoRemove,
            PacketKind::SetPlayerTeam
        ]
    );
    assert!(matches!(&messages[2], EntityMessage::Team(team) if team.mode == TeamMode::Remove));
}

#[test]
fn mobs_get_no_team() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    test.server
        .create(EntityDefinition::new("guard", EntityKind::Zombie, at(0.0)).with_display_name("Guard"))
        .unwrap();
    test.tick();
    assert_eq!(
        count_kind(&test.take_messages(&viewer), PacketKind::SetPlayerTeam),
        0
    );
}

#[test]
fn created_entity_spawns_on_next_tick() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));

    let id = test
        .server
        .create(EntityDefinition::new("guard", EntityKind::Zombie, at(0.0)))
        .unwrap();
    assert!(test.take_messages(&viewer).is_empty());

    test.tick();
    let messages = test.take_messages(&viewer);
    assert_eq!(spawned_ids(&messages), vec![id]);
    // mobs need no profile
    assert_eq!(count_kind(&messages, PacketKind::PlayerInfoUpdate), 0);
    assert_eq!(count_kind(&messages, PacketKind::SetEntityMetadata), 1);
}

#[test]
fn spawn_batch_carries_equipment() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    test.server
        .create(
            EntityDefinition::new("knight", EntityKind::Skeleton, at(0.0))
                .with_equipment(EquipmentSlot::MainHand, ItemStack::new(840, 1))
                .with_equipment(EquipmentSlot::Helmet, ItemStack::new(900, 1)),
        )
        .unwrap();
    test.tick();

    let messages = test.take_messages(&viewer);
    let kinds: Vec<PacketKind> = messages.iter().map(EntityMessage::packet_kind).collect();
    assert_eq!(
        kinds,
        vec![
            PacketKind::SpawnEntity,
            PacketKind::SetEntityMetadata,
            PacketKind::SetEquipment
        ]
    );
    match &messages[2] {
        EntityMessage::Equipment(equipment) => assert_eq!(
            equipment.slots,
            vec![
                (EquipmentSlot::MainHand, ItemStack::new(840, 1)),
                (EquipmentSlot::Helmet, ItemStack::new(900, 1)),
            ]
        ),
        other => panic!("expected equipment, got {:?}", other),
    }
}

#[test]
fn remove_destroys_immediately_and_frees_the_name() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    let id = test
        .server
        .create(EntityDefinition::new("guard", EntityKind::Zombie, at(0.0)))
        .unwrap();
    test.tick();
    test.clear_messages();

    test.server.remove(id).unwrap();
    let messages = test.take_messages(&viewer);
    assert_eq!(messages.len(), 1);
    assert!(matches!(&messages[0], EntityMessage::Destroy(destroy) if destroy.entity_ids == vec![id]));

    assert_eq!(
        test.server.entity(id).unwrap_err(),
        PhantomServerError::EntityNotFound { entity_id: id }
    );
    assert_eq!(test.server.entity_id("guard"), None);
    assert!(test
        .server
        .create(EntityDefinition::new("guard", EntityKind::Zombie, at(0.0)))
        .is_ok());
}

#[test]
fn removing_a_never_spawned_entity_sends_nothing() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    let id = test
        .server
        .create(EntityDefinition::new("guard", EntityKind::Zombie, at(0.0)))
        .unwrap();

    test.server.remove(id).unwrap();
    test.tick();
    assert!(test.take_messages(&viewer).is_empty());
}

// ========== Lifecycle Tests ==========

#[test]
fn disable_destroys_everything_for_every_viewer() {
    let mut test = TestServer::new();
    let first = test.join(at(3.0));
    let second = test.join(at(-3.0));
    let zombie = test
        .server
        .create(EntityDefinition::new("guard", EntityKind::Zombie, at(0.0)))
        .unwrap();
    let villager = test
        .server
        .create(EntityDefinition::new("trader", EntityKind::Villager, at(1.0)))
        .unwrap();
    test.tick();
    test.clear_messages();

    test.server.on_disable();

    for viewer in [first, second] {
        let messages = test.take_messages(&viewer);
        let mut destroyed: Vec<_> = messages
            .iter()
            .flat_map(|message| match message {
                EntityMessage::Destroy(destroy) => destroy.entity_ids.clone(),
                _ => Vec::new(),
            })
            .collect();
        destroyed.sort();
        assert_eq!(destroyed, vec![zombie, villager]);
    }
    assert!(test.server.entity_ids().is_empty());
    assert!(!test.server.is_enabled());
    assert_eq!(
        test.server
            .create(EntityDefinition::new("guard", EntityKind::Zombie, at(0.0)))
            .unwrap_err(),
        PhantomServerError::NotEnabled
    );
}

#[test]
fn reload_replaces_every_entity() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    let old = test
        .server
        .create(EntityDefinition::new("guard", EntityKind::Zombie, at(0.0)))
        .unwrap();
    test.tick();
    test.clear_messages();

    let json = r#"[
        { "name": "archer", "kind": "skeleton",
          "location": { "world": "world", "x": 2.0, "y": 64.0, "z": 0.0 } },
        { "name": "statue", "kind": "armor_stand",
          "location": { "world": "world", "x": -2.0, "y": 64.0, "z": 0.0 } }
    ]"#;
    let ids = test.server.reload_all(&JsonDefinitions::new(json)).unwrap();
    assert_eq!(ids.len(), 2);
    assert_eq!(test.server.entity_id("guard"), None);
    assert!(test.server.entity_id("archer").is_some());

    test.tick();
    let messages = test.take_messages(&viewer);
    assert!(matches!(&messages[0], EntityMessage::Destroy(destroy) if destroy.entity_ids == vec![old]));
    assert_eq!(spawned_ids(&messages).len(), 2);
}

#[test]
fn reload_with_bad_source_keeps_current_entities() {
    let mut test = TestServer::new();
    test.server
        .create(EntityDefinition::new("guard", EntityKind::Zombie, at(0.0)))
        .unwrap();

    let duplicate = vec![
        EntityDefinition::new("twin", EntityKind::Zombie, at(0.0)),
        EntityDefinition::new("twin", EntityKind::Zombie, at(1.0)),
    ];
    assert!(matches!(
        test.server.reload_all(&duplicate),
        Err(PhantomServerError::DuplicateEntityName { .. })
    ));
    assert!(matches!(
        test.server.reload_all(&JsonDefinitions::new("[{]")),
        Err(PhantomServerError::DefinitionSource { .. })
    ));
    assert!(test.server.entity_id("guard").is_some());
}
