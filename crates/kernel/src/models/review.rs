//! Review requests for the draft → review → publish workflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::Collection;

/// State of a review request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewState {
    Pending,
    Approved,
    Rejected,
}

/// A request to have a draft reviewed and published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub id: Uuid,
    pub collection: Collection,
    pub content_id: Uuid,
    pub submitted_by: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub state: ReviewState,
    #[serde(default)]
    pub reviewer: Option<Uuid>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// Reviewer note, e.g. the reason for a rejection.
    #[serde(default)]
    pub note: Option<String>,
}

impl ReviewRequest {
    /// Create a pending review for a record.
    pub fn pending(collection: Collection, content_id: Uuid, submitted_by: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            collection,
            content_id,
            submitted_by,
            submitted_at: Utc::now(),
            state: ReviewState::Pending,
            reviewer: None,
            reviewed_at: None,
            note: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == ReviewState::Pending
    }

    /// Close the review with a decision.
    pub fn close(&mut self, state: ReviewState, reviewer: Uuid, note: Option<String>) {
        self.state = state;
        self.reviewer = Some(reviewer);
        self.reviewed_at = Some(Utc::now());
        self.note = note;
    }
}
