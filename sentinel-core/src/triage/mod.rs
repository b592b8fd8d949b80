//! Human validation of low-confidence detections.

mod keys;
mod queue;
mod session;
mod state;

pub use keys::{KeyMap, TriageAction};
pub use queue::{HttpTriageQueue, TriageQueue};
pub use session::{DEFAULT_CONFIRM_DELAY, TriageSession};
pub use state::{FailureKind, TriageState, TriageView};
