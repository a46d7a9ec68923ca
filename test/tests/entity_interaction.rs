use phantom_server::{EntityDefinition, PhantomServerError, ViewerId};
use phantom_shared::{
    Codec, CodecError, EntityId, EntityKind, InteractAction, InteractEntity, InteractHand,
    Location, ProtocolVersion, ServerboundMessage,
};
use phantom_test::TestServer;
use uuid::Uuid;

fn at(x: f64) -> Location {
    Location::new("world", x, 64.0, 0.0)
}

/// What the client of `version` sends when it clicks `entity`
fn click(version: ProtocolVersion, entity: EntityId, action: InteractAction) -> Vec<u8> {
    Codec::new(version)
        .encode_serverbound(&ServerboundMessage::Interact(InteractEntity {
            entity_id: entity,
            action,
            sneaking: false,
        }))
        .unwrap()
}

#[test]
fn click_on_a_known_entity_is_reported() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    let id = test
        .server
        .create(EntityDefinition::new("merchant", EntityKind::Villager, at(0.0)))
        .unwrap();
    test.tick();

    let action = InteractAction::InteractAt {
        target: [0.1, 1.2, -0.3],
        hand: InteractHand::OffHand,
    };
    let interaction = test
        .server
        .handle_serverbound(viewer, &click(ProtocolVersion::V1_21_4, id, action))
        .unwrap()
        .expect("interaction with a known entity");

    assert_eq!(interaction.viewer, viewer);
    assert_eq!(interaction.entity, id);
    assert_eq!(interaction.name, "merchant");
    assert_eq!(interaction.action, action);
    assert!(!interaction.is_attack());
}

#[test]
fn packet_is_read_with_the_viewers_protocol() {
    let mut test = TestServer::new();
    let viewer = test.join_with_protocol(at(3.0), ProtocolVersion::V1_21_6.protocol_id());
    let id = test
        .server
        .create(EntityDefinition::new("guard", EntityKind::Zombie, at(0.0)))
        .unwrap();

    let attack = click(ProtocolVersion::V1_21_6, id, InteractAction::Attack);
    let interaction = test.server.handle_serverbound(viewer, &attack).unwrap();
    assert!(interaction.unwrap().is_attack());

    // 1.21.5 numbers interact one lower, which 1.21.6 uses for another packet
    let old_attack = click(ProtocolVersion::V1_21_5, id, InteractAction::Attack);
    assert_eq!(test.server.handle_serverbound(viewer, &old_attack), Ok(None));
}

#[test]
fn click_on_an_unknown_entity_is_ignored() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));
    let id = test
        .server
        .create(EntityDefinition::new("guard", EntityKind::Zombie, at(0.0)))
        .unwrap();

    let stranger = EntityId(id.0 + 1000);
    let packet = click(
        ProtocolVersion::V1_21_4,
        stranger,
        InteractAction::Interact {
            hand: InteractHand::MainHand,
        },
    );
    assert_eq!(test.server.handle_serverbound(viewer, &packet), Ok(None));

    // removed entities are unknown too
    test.server.remove(id).unwrap();
    let packet = click(ProtocolVersion::V1_21_4, id, InteractAction::Attack);
    assert_eq!(test.server.handle_serverbound(viewer, &packet), Ok(None));
}

#[test]
fn malformed_interaction_is_an_error() {
    let mut test = TestServer::new();
    let viewer = test.join(at(3.0));

    // interact with hand 5
    let packet = [0x18, 0x01, 0x00, 0x05, 0x00];
    assert_eq!(
        test.server.handle_serverbound(viewer, &packet),
        Err(PhantomServerError::Codec(CodecError::UnknownHand { hand: 5 }))
    );
}

#[test]
fn unknown_viewer_is_an_error() {
    let mut test = TestServer::new();
    let stranger = ViewerId(Uuid::new_v4());
    let packet = click(ProtocolVersion::V1_21_4, EntityId(1), InteractAction::Attack);
    assert_eq!(
        test.server.handle_serverbound(stranger, &packet),
        Err(PhantomServerError::ViewerNotFound { viewer: stranger })
    );
}
