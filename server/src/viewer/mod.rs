mod viewer;
mod viewer_record;
mod viewer_tracker;

pub use viewer::{Viewer, ViewerId, EYE_HEIGHT};
pub use viewer_record::{RecordState, ViewerRecord};
pub use viewer_tracker::{Transition, TransitionKind, ViewerEvent, ViewerTracker};
