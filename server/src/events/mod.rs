mod entity_interaction;
mod event_bridge;
mod session_event;

pub use entity_interaction::EntityInteraction;
pub use event_bridge::SessionEventBridge;
pub use session_event::SessionEvent;
