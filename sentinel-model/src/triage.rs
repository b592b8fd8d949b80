use crate::detection::BoundingBox;
use crate::ids::{CameraId, TaskId};
use crate::timestamp::Timestamp;

/// Label used when the queue item has no prediction attached.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Pending item as returned by `GET /api/triage/queue`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriageItem {
    pub id: TaskId,
    pub image_path: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub current_label: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub confidence: Option<f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub created_at: Option<Timestamp>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub camera_id: Option<CameraId>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub bbox: Option<BoundingBox>,
}

/// The single low-confidence detection an operator is looking at.
#[derive(Debug, Clone, PartialEq)]
pub struct TriageTask {
    pub id: TaskId,
    pub image: String,
    pub label: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
    pub camera_id: Option<CameraId>,
    pub created_at: Option<Timestamp>,
}

impl TriageTask {
    pub fn new(
        id: impl Into<TaskId>,
        image: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            image: image.into(),
            label: label.into(),
            confidence: 0.0,
            bbox: BoundingBox::FULL_FRAME,
            camera_id: None,
            created_at: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = bbox;
        self
    }

    /// Submission that keeps the predicted label.
    pub fn submission(&self, verified: bool) -> ValidationSubmission {
        self.submission_with_label(verified, self.label.clone())
    }

    pub fn submission_with_label(
        &self,
        verified: bool,
        correct_label: impl Into<String>,
    ) -> ValidationSubmission {
        ValidationSubmission {
            task_id: self.id.clone(),
            verified,
            correct_label: correct_label.into(),
        }
    }
}

impl From<TriageItem> for TriageTask {
    fn from(item: TriageItem) -> Self {
        Self {
            id: item.id,
            image: item.image_path,
            label: item
                .current_label
                .filter(|label| !label.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_LABEL.to_owned()),
            confidence: item.confidence.unwrap_or(0.0),
            bbox: item.bbox.unwrap_or(BoundingBox::FULL_FRAME),
            camera_id: item.camera_id,
            created_at: item.created_at,
        }
    }
}

/// Operator decision on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl Verdict {
    pub fn from_verified(verified: bool) -> Self {
        if verified {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        }
    }

    pub fn is_verified(self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}

/// One human decision, sent exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSubmission {
    pub task_id: TaskId,
    pub verified: bool,
    pub correct_label: String,
}

impl ValidationSubmission {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_verified(self.verified)
    }

    /// Body for `POST /api/triage/{id}/validate`.
    pub fn request_body(&self) -> ValidationRequest {
        ValidationRequest {
            verified: self.verified,
            correct_label: self.correct_label.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationRequest {
    pub verified: bool,
    pub correct_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_prediction_falls_back_to_unknown() {
        let item = TriageItem {
            id: "t1".into(),
            image_path: "https://img/1.jpg".into(),
            current_label: Some("  ".into()),
            confidence: None,
            created_at: None,
            camera_id: None,
            bbox: None,
        };
        let task = TriageTask::from(item);
        assert_eq!(task.label, UNKNOWN_LABEL);
        assert_eq!(task.confidence, 0.0);
        assert_eq!(task.bbox, BoundingBox::FULL_FRAME);
    }

    #[test]
    fn submission_keeps_predicted_label() {
        let task = TriageTask::new("task_123", "img.jpg", "car");
        let submission = task.submission(true);
        assert_eq!(submission.task_id.as_str(), "task_123");
        assert!(submission.verified);
        assert_eq!(submission.correct_label, "car");
        assert_eq!(submission.verdict(), Verdict::Accepted);
    }
}
