mod reconciliation_engine;
mod view_state;

pub use reconciliation_engine::{ReconcileReport, ReconciliationEngine};
pub use view_state::ViewState;
