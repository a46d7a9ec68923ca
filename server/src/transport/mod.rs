//! Outbound port the entity server writes encoded packets into. The host
//! owns the actual connections, framing and compression.

use crate::viewer::ViewerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendError;

/// A per-viewer outbound channel. Called only from the primary thread.
pub trait Transport {
    /// Queues one packet, already encoded as packet id + body, for the
    /// viewer. Must not block on delivery.
    fn send(&mut self, viewer: &ViewerId, payload: &[u8]) -> Result<(), SendError>;

    /// Returns false once the viewer's connection is gone
    fn is_open(&self, viewer: &ViewerId) -> bool;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, viewer: &ViewerId, payload: &[u8]) -> Result<(), SendError> {
        (**self).send(viewer, payload)
    }

    fn is_open(&self, viewer: &ViewerId) -> bool {
        (**self).is_open(viewer)
    }
}
