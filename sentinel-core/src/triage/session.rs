use super::queue::TriageQueue;
use super::state::{FailureKind, TriageState, TriageView};

use parking_lot::Mutex;
use sentinel_model::{TriageTask, ValidationSubmission, Verdict};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_CONFIRM_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Default)]
struct Inner {
    state: TriageState,
    task: Option<TriageTask>,
    flash: Option<Verdict>,
    last_error: Option<String>,
    submitted: u64,
    skipped: u64,
    fetching: bool,
}

impl Inner {
    fn view(&self) -> TriageView {
        TriageView {
            state: self.state,
            task: self.task.clone(),
            flash: self.flash,
            last_error: self.last_error.clone(),
            submitted: self.submitted,
            skipped: self.skipped,
        }
    }

    /// Move to `loading` and claim the single fetch slot.
    fn begin_fetch(&mut self) -> bool {
        let allowed = match self.state {
            TriageState::Loading | TriageState::Empty | TriageState::Failed(_) => {
                !self.fetching
            }
            TriageState::Ready | TriageState::Submitting => false,
        };
        if allowed {
            self.state = TriageState::Loading;
            self.task = None;
            self.fetching = true;
        }
        allowed
    }
}

struct Shared {
    inner: Mutex<Inner>,
    view: watch::Sender<TriageView>,
    queue: Arc<dyn TriageQueue>,
    confirm_delay: Duration,
    cancel: CancellationToken,
}

impl Shared {
    fn update<R>(&self, apply: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.inner.lock();
        let result = apply(&mut inner);
        self.view.send_replace(inner.view());
        result
    }
}

/// Single-flight validation of triage tasks.
///
/// ```text
/// loading -> ready | empty | failed(fetch)
/// ready -> submitting -> loading        (decide)
/// ready -> loading                      (skip)
/// submitting -> failed(submit)
/// failed | empty -> loading             (retry)
/// ```
///
/// Every input is a synchronous call that either starts the background work
/// it implies and returns its handle, or returns `None` because the current
/// state does not accept it. The state guard alone enforces that at most one
/// submission exists per task.
#[derive(Clone)]
pub struct TriageSession {
    shared: Arc<Shared>,
}

impl fmt::Debug for TriageSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriageSession")
            .field("state", &self.shared.inner.lock().state)
            .field("confirm_delay", &self.shared.confirm_delay)
            .field("disposed", &self.shared.cancel.is_cancelled())
            .finish()
    }
}

impl TriageSession {
    /// The session starts in `loading` with nothing in flight; call
    /// [`fetch_next`](Self::fetch_next) once to load the first task.
    pub fn new(queue: Arc<dyn TriageQueue>, confirm_delay: Duration) -> Self {
        let (view, _) = watch::channel(TriageView::default());
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner::default()),
                view,
                queue,
                confirm_delay,
                cancel: CancellationToken::new(),
            }),
        }
    }

    pub fn view(&self) -> TriageView {
        self.shared.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TriageView> {
        self.shared.view.subscribe()
    }

    pub fn state(&self) -> TriageState {
        self.shared.inner.lock().state
    }

    /// Load the next pending task.
    pub fn fetch_next(&self) -> Option<JoinHandle<()>> {
        if self.is_disposed() || !self.shared.update(Inner::begin_fetch) {
            return None;
        }
        let shared = Arc::clone(&self.shared);
        Some(tokio::spawn(run_fetch(shared)))
    }

    /// Accept or reject the current task under its predicted label.
    pub fn decide(&self, verified: bool) -> Option<JoinHandle<()>> {
        self.start_decision(verified, None)
    }

    /// Decide with a corrected label.
    pub fn decide_with_label(
        &self,
        verified: bool,
        label: impl Into<String>,
    ) -> Option<JoinHandle<()>> {
        self.start_decision(verified, Some(label.into()))
    }

    /// Drop the current task without submitting anything.
    pub fn skip(&self) -> Option<JoinHandle<()>> {
        if self.is_disposed() {
            return None;
        }
        let skipped = self.shared.update(|inner| {
            if !inner.state.accepts_decisions() {
                return None;
            }
            let task = inner.task.take();
            inner.skipped += 1;
            inner.state = TriageState::Empty;
            inner.begin_fetch();
            Some(task)
        })?;

        tracing::info!(task_id = ?skipped.as_ref().map(|t| t.id.as_str()), "task skipped");
        let shared = Arc::clone(&self.shared);
        Some(tokio::spawn(run_fetch(shared)))
    }

    /// Fetch again after a failure or an empty queue.
    pub fn retry(&self) -> Option<JoinHandle<()>> {
        if !matches!(self.state(), TriageState::Failed(_) | TriageState::Empty) {
            return None;
        }
        self.fetch_next()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.cancel.is_cancelled()
    }

    /// Cancel pending fetch, confirmation and submission work. Further input
    /// is ignored.
    pub fn dispose(&self) {
        self.shared.cancel.cancel();
    }

    fn start_decision(
        &self,
        verified: bool,
        label: Option<String>,
    ) -> Option<JoinHandle<()>> {
        if self.is_disposed() {
            return None;
        }
        let submission = self.shared.update(|inner| {
            if !inner.state.accepts_decisions() {
                return None;
            }
            let task = inner.task.as_ref()?;
            let submission = match label {
                Some(label) => task.submission_with_label(verified, label),
                None => task.submission(verified),
            };
            inner.state = TriageState::Submitting;
            inner.flash = Some(submission.verdict());
            Some(submission)
        });

        let Some(submission) = submission else {
            tracing::trace!(verified, "decision ignored outside ready state");
            return None;
        };
        let shared = Arc::clone(&self.shared);
        Some(tokio::spawn(run_submission(shared, submission)))
    }
}

async fn run_fetch(shared: Arc<Shared>) {
    let fetched = tokio::select! {
        _ = shared.cancel.cancelled() => return,
        fetched = shared.queue.fetch_pending() => fetched,
    };

    shared.update(|inner| {
        inner.fetching = false;
        match fetched {
            Ok(tasks) => match tasks.into_iter().next() {
                Some(task) => {
                    tracing::debug!(task_id = %task.id, label = %task.label, "task ready");
                    inner.task = Some(task);
                    inner.state = TriageState::Ready;
                    inner.last_error = None;
                }
                None => {
                    tracing::debug!("triage queue is empty");
                    inner.state = TriageState::Empty;
                    inner.last_error = None;
                }
            },
            Err(err) => {
                tracing::warn!(error = %err, "failed to load triage queue");
                inner.state = TriageState::Failed(FailureKind::Fetch);
                inner.last_error = Some(err.to_string());
            }
        }
    });
}

async fn run_submission(shared: Arc<Shared>, submission: ValidationSubmission) {
    tokio::select! {
        _ = shared.cancel.cancelled() => return,
        _ = tokio::time::sleep(shared.confirm_delay) => {}
    }

    let result = tokio::select! {
        _ = shared.cancel.cancelled() => return,
        result = shared.queue.submit(&submission) => result,
    };

    let fetch = shared.update(|inner| {
        inner.flash = None;
        match result {
            Ok(()) => {
                inner.submitted += 1;
                inner.state = TriageState::Empty;
                inner.begin_fetch()
            }
            Err(err) => {
                tracing::warn!(
                    task_id = %submission.task_id,
                    error = %err,
                    "validation submission failed"
                );
                inner.state = TriageState::Failed(FailureKind::Submit);
                inner.last_error = Some(err.to_string());
                false
            }
        }
    });

    if fetch {
        run_fetch(shared).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MonitorError, Result};
    use async_trait::async_trait;

    #[derive(Default)]
    struct StaticQueue {
        tasks: Vec<TriageTask>,
    }

    #[async_trait]
    impl TriageQueue for StaticQueue {
        async fn fetch_pending(&self) -> Result<Vec<TriageTask>> {
            Ok(self.tasks.clone())
        }

        async fn submit(&self, _submission: &ValidationSubmission) -> Result<()> {
            Err(MonitorError::Internal("read-only".into()))
        }
    }

    fn session(tasks: Vec<TriageTask>) -> TriageSession {
        TriageSession::new(Arc::new(StaticQueue { tasks }), DEFAULT_CONFIRM_DELAY)
    }

    #[tokio::test]
    async fn decisions_before_first_task_are_ignored() {
        let session = session(vec![TriageTask::new("t1", "img.jpg", "car")]);
        assert!(session.decide(true).is_none());
        assert!(session.skip().is_none());
        assert!(session.retry().is_none());
    }

    #[tokio::test]
    async fn only_one_fetch_at_a_time() {
        let session = session(vec![TriageTask::new("t1", "img.jpg", "car")]);
        let first = session.fetch_next().unwrap();
        assert!(session.fetch_next().is_none());
        first.await.unwrap();
        assert_eq!(session.state(), TriageState::Ready);
        // a loaded task is not thrown away by another fetch
        assert!(session.fetch_next().is_none());
    }

    #[tokio::test]
    async fn nothing_is_fetched_until_asked() {
        let session = session(vec![TriageTask::new("t1", "img.jpg", "car")]);
        tokio::task::yield_now().await;
        assert_eq!(session.state(), TriageState::Loading);
        assert!(session.view().task.is_none());

        session.fetch_next().unwrap().await.unwrap();
        assert_eq!(session.state(), TriageState::Ready);
    }

    #[tokio::test]
    async fn empty_queue_can_be_checked_again() {
        let session = session(vec![]);
        session.fetch_next().unwrap().await.unwrap();
        assert_eq!(session.state(), TriageState::Empty);

        let again = session.retry().expect("retry from empty");
        assert_eq!(session.state(), TriageState::Loading);
        again.await.unwrap();
        assert_eq!(session.state(), TriageState::Empty);
    }

    #[tokio::test]
    async fn disposed_session_ignores_input() {
        let session = session(vec![]);
        session.dispose();
        assert!(session.fetch_next().is_none());
        assert!(session.is_disposed());
    }
}
