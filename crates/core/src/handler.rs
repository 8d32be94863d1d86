//! Distribution creation.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::api::CreateDistributionResponse;
use crate::clock::Clock;
use crate::ids::{IdGenerator, IdKind};
use crate::model::{
    recipients_subtitle, ActivityEntry, ActivityKind, DeliveryTracking, Distribution, DistributionRequest,
    ACTIVITY_ICON, ACTIVITY_TITLE, DISTRIBUTION_TITLE,
};
use crate::validation::{check_scope, parse_request, RequestError, ValidationPolicy};

/// Builds distribution records and their activity entries.
///
/// Holds no per-request state; the id generator and clock are injected so
/// tests can pin both.
#[derive(Clone)]
pub struct DistributionHandler {
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    policy: ValidationPolicy,
}

impl DistributionHandler {
    /// Wires the handler to its id generator, clock and validation policy.
    pub fn new(ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>, policy: ValidationPolicy) -> Self {
        Self { ids, clock, policy }
    }

    /// Active validation policy.
    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    /// Parses a raw JSON body under the handler's field rules, then creates.
    pub fn create_from_json(&self, body: &Value) -> Result<CreateDistributionResponse, RequestError> {
        let req = parse_request(body, &self.policy)?;
        self.create(req)
    }

    /// Creates a distribution and the matching activity entry.
    ///
    /// The unknown-scope policy is applied here and nowhere else; field
    /// shapes are the caller's concern once the request is typed.
    pub fn create(&self, req: DistributionRequest) -> Result<CreateDistributionResponse, RequestError> {
        check_scope(&req, &self.policy)?;

        let tier = req.tier();
        let recipient_count = tier.recipient_count();
        let now = self.clock.now();

        let distribution = Distribution {
            id: self.ids.next_id(IdKind::Distribution),
            title: DISTRIBUTION_TITLE.to_string(),
            date: now,
            recipient_count,
            scope: req.scope,
            attachments: req.attachments,
            delivery_tracking: DeliveryTracking::new(recipient_count),
        };

        let activity = ActivityEntry {
            id: self.ids.next_id(IdKind::Activity),
            kind: ActivityKind::Distribution,
            title: ACTIVITY_TITLE.to_string(),
            subtitle: recipients_subtitle(recipient_count),
            timestamp: now,
            icon: ACTIVITY_ICON.to_string(),
        };

        info!(
            distribution_id = %distribution.id,
            case_id = req.case_id.as_deref().unwrap_or("-"),
            tier = ?tier,
            recipient_count,
            attachments = distribution
                .attachments
                .as_ref()
                .and_then(serde_json::Value::as_array)
                .map_or(0, Vec::len),
            "distribution created"
        );

        Ok(CreateDistributionResponse { distribution, activity })
    }
}

impl std::fmt::Debug for DistributionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributionHandler")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
