use crate::{reconcile::ViewState, world::DirtyFlags};

/// Lifecycle of one entity on one viewer's client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordState {
    /// Eligible, nothing sent yet
    PendingSpawn,
    /// The client holds the entity
    Spawned,
    /// No longer eligible, Destroy not sent yet
    PendingDespawn,
}

/// What one viewer has been told about one entity.
#[derive(Clone, Debug)]
pub struct ViewerRecord {
    state: RecordState,
    /// The view this viewer last received, set once Spawned
    sent: Option<ViewState>,
    /// Categories that changed for this viewer alone, such as facing a
    /// viewer that moved
    pending: DirtyFlags,
    last_distance: f64,
}

impl ViewerRecord {
    pub(crate) fn new(distance: f64) -> Self {
        Self {
            state: RecordState::PendingSpawn,
            sent: None,
            pending: DirtyFlags::NONE,
            last_distance: distance,
        }
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn is_spawned(&self) -> bool {
        self.state == RecordState::Spawned
    }

    pub fn sent(&self) -> Option<&ViewState> {
        self.sent.as_ref()
    }

    pub fn pending(&self) -> DirtyFlags {
        self.pending
    }

    pub fn last_distance(&self) -> f64 {
        self.last_distance
    }

    pub(crate) fn set_distance(&mut self, distance: f64) {
        self.last_distance = distance;
    }

    pub(crate) fn mark(&mut self, flags: DirtyFlags) {
        self.pending.insert(flags);
    }

    pub(crate) fn mark_spawned(&mut self, view: ViewState) {
        self.state = RecordState::Spawned;
        self.sent = Some(view);
        self.pending.clear();
    }

    pub(crate) fn mark_sent(&mut self, view: ViewState) {
        self.sent = Some(view);
        self.pending.clear();
    }

    /// Returns false when the record was never spawned and can simply be
    /// dropped
    pub(crate) fn begin_despawn(&mut self) -> bool {
        match self.state {
            RecordState::PendingSpawn => false,
            RecordState::Spawned | RecordState::PendingDespawn => {
                self.state = RecordState::PendingDespawn;
                true
            }
        }
    }

    /// Undoes a despawn that was not dispatched before the viewer became
    /// eligible again
    pub(crate) fn cancel_despawn(&mut self) {
        if self.state == RecordState::PendingDespawn {
            self.state = RecordState::Spawned;
        }
    }
}
