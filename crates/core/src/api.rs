//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

use crate::model::{ActivityEntry, Distribution};
use crate::validation::RequestError;

/// Route that creates distributions.
pub const DISTRIBUTIONS_PATH: &str = "/api/distributions";

/// Create-distribution response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateDistributionResponse {
    /// The new distribution.
    pub distribution: Distribution,
    /// Timeline entry announcing it.
    pub activity: ActivityEntry,
}

/// Error body returned for rejected requests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable kind, e.g. `malformed_request`.
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

impl From<&RequestError> for ErrorResponse {
    fn from(err: &RequestError) -> Self {
        Self {
            error: err.kind().to_string(),
            message: err.to_string(),
        }
    }
}
