use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use log::trace;

use phantom_shared::Location;

use super::SessionEvent;
use crate::viewer::{ViewerEvent, ViewerId};

/// Translates host session events into tracker events. Ordinary moves are
/// rate limited per viewer: a move arriving sooner than the check interval
/// after the last one is held, and only the newest held location is released
/// once the interval has passed.
pub struct SessionEventBridge {
    move_check_interval: Duration,
    last_check: HashMap<ViewerId, Instant>,
    held_moves: HashMap<ViewerId, Location>,
}

impl SessionEventBridge {
    pub fn new(move_check_interval: Duration) -> Self {
        Self {
            move_check_interval,
            last_check: HashMap::new(),
            held_moves: HashMap::new(),
        }
    }

    /// Returns the tracker event to apply now, or None when the event was
    /// held back.
    pub fn translate(
        &mut self,
        viewer: ViewerId,
        event: SessionEvent,
        now: Instant,
    ) -> Option<ViewerEvent> {
        match event {
            SessionEvent::Join {
                location,
                protocol_id,
                view_distance,
            } => {
                self.forget(&viewer);
                self.last_check.insert(viewer, now);
                Some(ViewerEvent::Joined {
                    location,
                    protocol_id,
                    view_distance,
                })
            }
            SessionEvent::Quit => {
                self.forget(&viewer);
                Some(ViewerEvent::Quit)
            }
            SessionEvent::Move(location) => {
                let due = self
                    .last_check
                    .get(&viewer)
                    .map(|last| now.saturating_duration_since(*last) >= self.move_check_interval)
                    .unwrap_or(true);
                if due {
                    self.held_moves.remove(&viewer);
                    self.last_check.insert(viewer, now);
                    Some(ViewerEvent::Moved(location))
                } else {
                    trace!("holding move of viewer {}", viewer);
                    self.held_moves.insert(viewer, location);
                    None
                }
            }
            // discontinuous jumps are never rate limited, and supersede any
            // held walk
            SessionEvent::Teleport(location) | SessionEvent::ChangeWorld(location) => {
                self.held_moves.remove(&viewer);
                self.last_check.insert(viewer, now);
                Some(ViewerEvent::Moved(location))
            }
            SessionEvent::ChunkLoad(chunk) => Some(ViewerEvent::ChunkLoaded(chunk)),
            SessionEvent::ChunkUnload(chunk) => Some(ViewerEvent::ChunkUnloaded(chunk)),
            SessionEvent::ViewDistance(view_distance) => {
                Some(ViewerEvent::ViewDistanceChanged(view_distance))
            }
            SessionEvent::ToggleSneak(sneaking) => Some(ViewerEvent::SneakChanged(sneaking)),
        }
    }

    /// Releases held moves whose interval has passed, in viewer id order
    pub fn take_due(&mut self, now: Instant) -> Vec<(ViewerId, ViewerEvent)> {
        let mut due: Vec<ViewerId> = self
            .held_moves
            .keys()
            .filter(|viewer| {
                self.last_check
                    .get(*viewer)
                    .map(|last| now.saturating_duration_since(*last) >= self.move_check_interval)
                    .unwrap_or(true)
            })
            .copied()
            .collect();
        due.sort();

        due.into_iter()
            .filter_map(|viewer| {
                let location = self.held_moves.remove(&viewer)?;
                self.last_check.insert(viewer, now);
                Some((viewer, ViewerEvent::Moved(location)))
            })
            .collect()
    }

    pub fn has_held_moves(&self) -> bool {
        !self.held_moves.is_empty()
    }

    pub fn forget(&mut self, viewer: &ViewerId) {
        self.last_check.remove(viewer);
        self.held_moves.remove(viewer);
    }

    pub fn clear(&mut self) {
        self.last_check.clear();
        self.held_moves.clear();
    }
}
