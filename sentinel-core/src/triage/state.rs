use sentinel_model::{TriageTask, Verdict};
use std::fmt;

/// Which request put the session into [`TriageState::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Fetch,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriageState {
    /// Initial state, and while a fetch is in flight.
    #[default]
    Loading,
    Ready,
    Submitting,
    /// Queue answered with no pending items.
    Empty,
    Failed(FailureKind),
}

impl TriageState {
    pub fn accepts_decisions(self) -> bool {
        self == TriageState::Ready
    }
}

impl fmt::Display for TriageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriageState::Loading => f.write_str("loading"),
            TriageState::Ready => f.write_str("ready"),
            TriageState::Submitting => f.write_str("submitting"),
            TriageState::Empty => f.write_str("no tasks"),
            TriageState::Failed(FailureKind::Fetch) => f.write_str("failed to load"),
            TriageState::Failed(FailureKind::Submit) => f.write_str("failed to submit"),
        }
    }
}

/// Snapshot rendered by a triage UI.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriageView {
    pub state: TriageState,
    pub task: Option<TriageTask>,
    /// Accept/reject styling shown while a decision is being submitted.
    pub flash: Option<Verdict>,
    pub last_error: Option<String>,
    pub submitted: u64,
    pub skipped: u64,
}
