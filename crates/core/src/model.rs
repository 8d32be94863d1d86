//! Distribution, activity and delivery-tracking records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::util::iso8601_millis;

/// Scope value addressing every state.
pub const SCOPE_ALL_STATES: &str = "All States";
/// Scope value addressing a hand-picked recipient list.
pub const SCOPE_SELECTED: &str = "Selected";

/// Fixed title of a freshly created distribution.
pub const DISTRIBUTION_TITLE: &str = "New distribution";
/// Fixed title of the activity entry emitted on creation.
pub const ACTIVITY_TITLE: &str = "Distribution created";
/// Icon tag shown next to distribution activity.
pub const ACTIVITY_ICON: &str = "Send";

/// Audience tier derived from a request scope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecipientTier {
    /// `"All States"`.
    AllStates,
    /// `"Selected"`.
    Selected,
    /// Any other scope, including a missing one.
    Default,
}

impl RecipientTier {
    /// Maps a raw scope to its tier. Unrecognized or missing scopes land in
    /// [`RecipientTier::Default`].
    pub fn from_scope(scope: Option<&str>) -> Self {
        match scope {
            Some(SCOPE_ALL_STATES) => Self::AllStates,
            Some(SCOPE_SELECTED) => Self::Selected,
            _ => Self::Default,
        }
    }

    /// Number of recipients addressed by this tier.
    pub fn recipient_count(self) -> u32 {
        match self {
            Self::AllStates => 191,
            Self::Selected => 25,
            Self::Default => 15,
        }
    }

    /// True for scopes that map to a named tier.
    pub fn is_known(self) -> bool {
        !matches!(self, Self::Default)
    }
}

/// Request to distribute a case's documents.
///
/// `scope` and `attachments` hold the raw JSON they arrived with so the
/// created distribution can echo them untouched. `None` means the key was
/// absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributionRequest {
    /// Opaque case identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_id: Option<String>,
    /// Audience selector; only a string value names a tier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Value>,
    /// Attachment references, usually an array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Value>,
}

impl DistributionRequest {
    /// Builds a request from a string scope and attachment list.
    pub fn new(case_id: impl Into<String>, scope: Option<&str>, attachments: Vec<Value>) -> Self {
        Self {
            case_id: Some(case_id.into()),
            scope: scope.map(|s| Value::String(s.to_string())),
            attachments: Some(Value::Array(attachments)),
        }
    }

    /// Scope as a string, if it is one.
    pub fn scope_str(&self) -> Option<&str> {
        self.scope.as_ref().and_then(Value::as_str)
    }

    /// Tier addressed by this request.
    pub fn tier(&self) -> RecipientTier {
        RecipientTier::from_scope(self.scope_str())
    }
}

/// Delivery counters of a distribution.
///
/// `delivered + pending + failed` always equals the recipient count the
/// tracker was created with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryTracking {
    /// Recipients that received the documents.
    pub delivered: u32,
    /// Recipients still waiting.
    pub pending: u32,
    /// Recipients whose delivery failed.
    pub failed: u32,
}

/// Outcome of a single delivery attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryOutcome {
    /// The recipient received the documents.
    Delivered,
    /// Delivery to the recipient failed.
    Failed,
}

/// Errors raised when updating [`DeliveryTracking`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// Every recipient already has a final outcome.
    #[error("no pending deliveries left to record {0:?}")]
    NothingPending(DeliveryOutcome),
}

impl DeliveryTracking {
    /// Initial state: everything pending.
    pub fn new(recipient_count: u32) -> Self {
        Self {
            delivered: 0,
            pending: recipient_count,
            failed: 0,
        }
    }

    /// Sum of all counters.
    pub fn total(&self) -> u32 {
        self.delivered + self.pending + self.failed
    }

    /// Moves one recipient out of `pending`.
    pub fn record(&mut self, outcome: DeliveryOutcome) -> Result<(), DeliveryError> {
        if self.pending == 0 {
            return Err(DeliveryError::NothingPending(outcome));
        }
        self.pending -= 1;
        match outcome {
            DeliveryOutcome::Delivered => self.delivered += 1,
            DeliveryOutcome::Failed => self.failed += 1,
        }
        Ok(())
    }

    /// True once no delivery is pending.
    pub fn is_settled(&self) -> bool {
        self.pending == 0
    }
}

/// A batch send of case materials to a set of recipients.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    /// `dist-` prefixed identifier.
    pub id: String,
    /// Always [`DISTRIBUTION_TITLE`].
    pub title: String,
    /// Creation instant.
    #[serde(with = "iso8601_millis")]
    pub date: DateTime<Utc>,
    /// Recipients addressed by the scope.
    pub recipient_count: u32,
    /// Scope echoed from the request; omitted when the request had none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Value>,
    /// Attachments echoed from the request; omitted when the request had none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Value>,
    /// Delivery counters.
    pub delivery_tracking: DeliveryTracking,
}

/// Kind of an activity timeline entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A distribution was created.
    Distribution,
}

/// Timeline record summarizing a user-facing action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityEntry {
    /// `act-` prefixed identifier.
    pub id: String,
    /// Serialized as `type`.
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Always [`ACTIVITY_TITLE`].
    pub title: String,
    /// `"<n> recipients"`.
    pub subtitle: String,
    /// Creation instant, shared with the distribution.
    #[serde(with = "iso8601_millis")]
    pub timestamp: DateTime<Utc>,
    /// Always [`ACTIVITY_ICON`].
    pub icon: String,
}

/// Subtitle shown for a distribution addressing `count` recipients.
pub fn recipients_subtitle(count: u32) -> String {
    format!("{count} recipients")
}
