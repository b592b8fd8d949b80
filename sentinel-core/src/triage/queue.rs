use crate::api::{ApiClient, routes};
use crate::error::{MonitorError, Result};

use async_trait::async_trait;
use sentinel_model::{TriageItem, TriageTask, ValidationSubmission};
use url::Url;

/// Backend holding detections that need a human decision.
#[async_trait]
pub trait TriageQueue: Send + Sync {
    /// Pending items, next task first.
    async fn fetch_pending(&self) -> Result<Vec<TriageTask>>;

    async fn submit(&self, submission: &ValidationSubmission) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct HttpTriageQueue {
    api: ApiClient,
}

impl HttpTriageQueue {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn validate_url(&self, task_id: &str) -> Result<Url> {
        let base = self.api.build_url(routes::triage::ROOT);
        routes::utils::push_segments(&base, &[task_id, routes::triage::VALIDATE_SUFFIX])
            .ok_or_else(|| {
                MonitorError::Internal(format!("cannot build validation URL from {base}"))
            })
    }
}

#[async_trait]
impl TriageQueue for HttpTriageQueue {
    async fn fetch_pending(&self) -> Result<Vec<TriageTask>> {
        let items: Vec<TriageItem> = self.api.get_json(routes::triage::QUEUE).await?;
        tracing::debug!(pending = items.len(), "fetched triage queue");
        Ok(items.into_iter().map(TriageTask::from).collect())
    }

    async fn submit(&self, submission: &ValidationSubmission) -> Result<()> {
        let url = self.validate_url(submission.task_id.as_str())?;
        self.api.post_json(url.as_str(), &submission.request_body()).await?;
        tracing::info!(
            task_id = %submission.task_id,
            verified = submission.verified,
            label = %submission.correct_label,
            "validation submitted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn task_ids_are_encoded_into_the_validation_url() {
        let api = ApiClient::new("http://gateway.local:8000/", Duration::from_secs(1)).unwrap();
        let queue = HttpTriageQueue::new(api);

        assert_eq!(
            queue.validate_url("task_123").unwrap().as_str(),
            "http://gateway.local:8000/api/triage/task_123/validate"
        );
        assert_eq!(
            queue.validate_url("../queue?x=1#y").unwrap().path(),
            "/api/triage/..%2Fqueue%3Fx=1%23y/validate"
        );
    }
}
