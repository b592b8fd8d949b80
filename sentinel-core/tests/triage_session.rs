use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use parking_lot::Mutex;
use sentinel_core::error::{MonitorError, Result};
use sentinel_core::triage::{
    FailureKind, KeyMap, TriageQueue, TriageSession, TriageState,
};
use sentinel_model::{TriageTask, ValidationSubmission, Verdict};
use mockall::mock;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

const CONFIRM: Duration = Duration::from_millis(300);

#[derive(Default)]
struct FakeQueue {
    fetches: Mutex<VecDeque<Result<Vec<TriageTask>>>>,
    submit_results: Mutex<VecDeque<Result<()>>>,
    submissions: Mutex<Vec<(ValidationSubmission, Instant)>>,
    fetch_count: Mutex<usize>,
}

impl FakeQueue {
    fn new(fetches: Vec<Result<Vec<TriageTask>>>) -> Arc<Self> {
        Arc::new(Self {
            fetches: Mutex::new(fetches.into()),
            ..Self::default()
        })
    }

    fn failing_submit(self: Arc<Self>) -> Arc<Self> {
        self.submit_results
            .lock()
            .push_back(Err(MonitorError::Transport("gateway timeout".into())));
        self
    }

    fn submitted(&self) -> Vec<(String, bool, String)> {
        self.submissions
            .lock()
            .iter()
            .map(|(s, _)| (s.task_id.as_str().to_string(), s.verified, s.correct_label.clone()))
            .collect()
    }
}

#[async_trait]
impl TriageQueue for FakeQueue {
    async fn fetch_pending(&self) -> Result<Vec<TriageTask>> {
        *self.fetch_count.lock() += 1;
        self.fetches.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn submit(&self, submission: &ValidationSubmission) -> Result<()> {
        self.submissions
            .lock()
            .push((submission.clone(), Instant::now()));
        self.submit_results.lock().pop_front().unwrap_or(Ok(()))
    }
}

fn task(id: &str, label: &str) -> TriageTask {
    TriageTask::new(id, format!("/images/{}.jpg", id), label).with_confidence(0.42)
}

async fn ready_session(queue: &Arc<FakeQueue>) -> TriageSession {
    let session = TriageSession::new(Arc::clone(queue) as Arc<dyn TriageQueue>, CONFIRM);
    session.fetch_next().expect("initial fetch").await.unwrap();
    session
}

#[tokio::test(start_paused = true)]
async fn confirm_submits_exactly_once_after_the_flash() {
    let queue = FakeQueue::new(vec![Ok(vec![task("task_123", "car")])]);
    let session = ready_session(&queue).await;
    assert_eq!(session.state(), TriageState::Ready);

    let started = Instant::now();
    let handle = session.decide(true).expect("decision accepted");

    let view = session.view();
    assert_eq!(view.state, TriageState::Submitting);
    assert_eq!(view.flash, Some(Verdict::Accepted));

    assert!(session.decide(true).is_none());
    assert!(session.decide(false).is_none());
    assert!(session.skip().is_none());
    assert!(session.fetch_next().is_none());

    handle.await.unwrap();

    assert_eq!(
        queue.submitted(),
        vec![("task_123".to_string(), true, "car".to_string())]
    );
    let sent_at = queue.submissions.lock()[0].1;
    assert!(sent_at - started >= CONFIRM);

    let view = session.view();
    assert_eq!(view.state, TriageState::Empty);
    assert_eq!(view.flash, None);
    assert_eq!(view.submitted, 1);
}

#[tokio::test(start_paused = true)]
async fn reject_keeps_predicted_label_and_corrections_override_it() {
    let queue = FakeQueue::new(vec![
        Ok(vec![task("t1", "truck")]),
        Ok(vec![task("t2", "car")]),
    ]);
    let session = ready_session(&queue).await;

    session.decide(false).unwrap().await.unwrap();
    assert_eq!(session.view().task.map(|t| t.id.as_str().to_string()), Some("t2".into()));

    session.decide_with_label(false, "bus").unwrap().await.unwrap();

    assert_eq!(
        queue.submitted(),
        vec![
            ("t1".to_string(), false, "truck".to_string()),
            ("t2".to_string(), false, "bus".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn skip_advances_without_submitting() {
    let queue = FakeQueue::new(vec![
        Ok(vec![task("t1", "car"), task("t2", "person")]),
        Ok(vec![task("t2", "person")]),
    ]);
    let session = ready_session(&queue).await;

    session.skip().expect("skip accepted").await.unwrap();

    let view = session.view();
    assert_eq!(view.state, TriageState::Ready);
    assert_eq!(view.task.map(|t| t.label), Some("person".to_string()));
    assert_eq!(view.skipped, 1);
    assert!(queue.submitted().is_empty());
}

#[tokio::test]
async fn empty_queue_is_not_a_failure() {
    let queue = FakeQueue::new(vec![Ok(vec![])]);
    let session = ready_session(&queue).await;

    let view = session.view();
    assert_eq!(view.state, TriageState::Empty);
    assert_eq!(view.state.to_string(), "no tasks");
    assert_eq!(view.last_error, None);
}

#[tokio::test]
async fn retry_key_rechecks_an_empty_queue() {
    let queue = FakeQueue::new(vec![Ok(vec![]), Ok(vec![task("t5", "bus")])]);
    let session = ready_session(&queue).await;
    assert_eq!(session.state(), TriageState::Empty);

    let retry = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
    let handle = KeyMap
        .translate(&retry)
        .and_then(|action| action.apply(&session))
        .expect("retry starts a fetch");
    handle.await.unwrap();

    assert_eq!(*queue.fetch_count.lock(), 2);
    assert_eq!(session.state(), TriageState::Ready);
    assert_eq!(session.view().task.map(|t| t.label), Some("bus".to_string()));
}

#[tokio::test]
async fn fetch_failure_is_retryable() {
    let queue = FakeQueue::new(vec![
        Err(MonitorError::Transport("connection reset".into())),
        Ok(vec![task("t9", "bicycle")]),
    ]);
    let session = ready_session(&queue).await;

    let view = session.view();
    assert_eq!(view.state, TriageState::Failed(FailureKind::Fetch));
    assert!(view.last_error.unwrap().contains("connection reset"));

    session.retry().expect("retry accepted").await.unwrap();
    assert_eq!(session.state(), TriageState::Ready);
    assert_eq!(session.view().last_error, None);
}

#[tokio::test(start_paused = true)]
async fn failed_submission_is_never_resent_automatically() {
    let queue = FakeQueue::new(vec![
        Ok(vec![task("t1", "car")]),
        Ok(vec![task("t1", "car")]),
    ])
    .failing_submit();
    let session = ready_session(&queue).await;

    session.decide(true).unwrap().await.unwrap();
    assert_eq!(session.state(), TriageState::Failed(FailureKind::Submit));

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(queue.submitted().len(), 1);
    assert_eq!(*queue.fetch_count.lock(), 1);

    session.retry().unwrap().await.unwrap();
    assert_eq!(session.state(), TriageState::Ready);
    assert_eq!(queue.submitted().len(), 1);

    session.decide(true).unwrap().await.unwrap();
    assert_eq!(queue.submitted().len(), 2);
    assert_eq!(session.view().submitted, 1);
}

#[tokio::test(start_paused = true)]
async fn dispose_during_confirmation_cancels_submission() {
    let queue = FakeQueue::new(vec![Ok(vec![task("t1", "car")])]);
    let session = ready_session(&queue).await;

    let handle = session.decide(true).unwrap();
    session.dispose();
    handle.await.unwrap();

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(queue.submitted().is_empty());
    assert!(session.skip().is_none());
}

#[tokio::test(start_paused = true)]
async fn repeated_confirm_keys_submit_once() {
    let queue = FakeQueue::new(vec![Ok(vec![task("t1", "car")])]);
    let session = ready_session(&queue).await;
    let keys = KeyMap;
    let confirm = KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE);

    let handles: Vec<_> = (0..5)
        .filter_map(|_| keys.translate(&confirm).and_then(|action| action.apply(&session)))
        .collect();
    assert_eq!(handles.len(), 1);

    for handle in handles {
        handle.await.unwrap();
    }
    assert_eq!(queue.submitted().len(), 1);
}

mock! {
    Queue {}

    #[async_trait]
    impl TriageQueue for Queue {
        async fn fetch_pending(&self) -> Result<Vec<TriageTask>>;
        async fn submit(&self, submission: &ValidationSubmission) -> Result<()>;
    }
}

#[tokio::test(start_paused = true)]
async fn accepted_task_is_submitted_with_its_label() {
    let mut queue = MockQueue::new();
    let mut served = 0;
    queue.expect_fetch_pending().times(2).returning(move || {
        served += 1;
        if served == 1 {
            Ok(vec![task("task_7", "motorcycle")])
        } else {
            Ok(Vec::new())
        }
    });
    queue
        .expect_submit()
        .withf(|s| s.task_id.as_str() == "task_7" && s.verified && s.correct_label == "motorcycle")
        .times(1)
        .returning(|_| Ok(()));

    let session = TriageSession::new(Arc::new(queue), CONFIRM);
    session.fetch_next().unwrap().await.unwrap();
    session.decide(true).unwrap().await.unwrap();

    assert_eq!(session.state(), TriageState::Empty);
    assert_eq!(session.view().submitted, 1);
}
