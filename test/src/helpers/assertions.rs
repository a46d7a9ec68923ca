use std::collections::HashMap;

use phantom_shared::{EntityId, EntityMessage, PacketKind};

/// Checks that, per entity, the stream is a run of lifetimes
/// `Spawn Update* Destroy`, optionally ending in an open `Spawn Update*`.
pub fn check_stream_grammar(messages: &[EntityMessage]) -> Result<(), String> {
    let mut spawned: HashMap<EntityId, bool> = HashMap::new();
    for (position, message) in messages.iter().enumerate() {
        match message {
            EntityMessage::Spawn(spawn) => {
                let alive = spawned.entry(spawn.entity_id).or_insert(false);
                if *alive {
                    return Err(format!(
                        "message {}: entity {} spawned twice",
                        position, spawn.entity_id
                    ));
                }
                *alive = true;
            }
            EntityMessage::Destroy(destroy) => {
                for id in &destroy.entity_ids {
                    let alive = spawned.entry(*id).or_insert(false);
                    if !*alive {
                        return Err(format!(
                            "message {}: entity {} destroyed while not spawned",
                            position, id
                        ));
                    }
                    *alive = false;
                }
            }
            update if update.is_update() => {
                for id in update.entity_ids() {
                    if !spawned.get(&id).copied().unwrap_or(false) {
                        return Err(format!(
                            "message {}: {} for entity {} while not spawned",
                            position,
                            update.packet_kind().name(),
                            id
                        ));
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

pub fn count_kind(messages: &[EntityMessage], kind: PacketKind) -> usize {
    messages
        .iter()
        .filter(|message| message.packet_kind() == kind)
        .count()
}

/// Entity ids of every Spawn in the stream, in order
pub fn spawned_ids(messages: &[EntityMessage]) -> Vec<EntityId> {
    messages
        .iter()
        .filter_map(|message| match message {
            EntityMessage::Spawn(spawn) => Some(spawn.entity_id),
            _ => None,
        })
        .collect()
}
