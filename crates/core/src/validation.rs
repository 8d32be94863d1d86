//! Request parsing and validation policy.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::{DistributionRequest, RecipientTier};

/// How strictly request fields are checked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Accept any field shape; echo `scope` and `attachments` as sent.
    #[default]
    Relaxed,
    /// Require `caseId`, `scope` and `attachments` with the right types.
    Strict,
}

/// What to do with a scope that names no known tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownScopePolicy {
    /// Map it to [`RecipientTier::Default`].
    #[default]
    Default,
    /// Reject the request with [`RequestError::UnknownScope`].
    Reject,
}

/// Request validation settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ValidationPolicy {
    /// Field shape checks.
    #[serde(default)]
    pub mode: ValidationMode,
    /// Handling of scopes outside the known tiers.
    #[serde(default)]
    pub unknown_scope: UnknownScopePolicy,
}

impl ValidationPolicy {
    /// Strict field checks with unknown scopes still defaulted.
    pub fn strict() -> Self {
        Self {
            mode: ValidationMode::Strict,
            unknown_scope: UnknownScopePolicy::Default,
        }
    }
}

/// Reasons a creation request is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    /// Body is not a JSON object, or a field has the wrong shape.
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    /// Scope names no known tier and the policy rejects those.
    #[error("unknown scope: {0:?}")]
    UnknownScope(String),
}

impl RequestError {
    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRequest(_) => "malformed_request",
            Self::UnknownScope(_) => "unknown_scope",
        }
    }
}

/// Interprets a raw JSON body as a [`DistributionRequest`].
///
/// The body must be a JSON object in every mode. In relaxed mode `scope` and
/// `attachments` are kept exactly as sent, whatever their type. The
/// unknown-scope policy is not applied here; see [`check_scope`].
pub fn parse_request(body: &Value, policy: &ValidationPolicy) -> Result<DistributionRequest, RequestError> {
    let Value::Object(fields) = body else {
        return Err(RequestError::MalformedRequest(format!(
            "expected a JSON object, found {}",
            type_name(body)
        )));
    };

    match policy.mode {
        ValidationMode::Relaxed => Ok(parse_relaxed(fields)),
        ValidationMode::Strict => parse_strict(fields),
    }
}

/// Applies the unknown-scope policy to a parsed request.
///
/// Only string scopes are judged; a missing or non-string scope falls into
/// the default tier.
pub fn check_scope(req: &DistributionRequest, policy: &ValidationPolicy) -> Result<(), RequestError> {
    if policy.unknown_scope == UnknownScopePolicy::Reject {
        if let Some(scope) = req.scope_str() {
            if !RecipientTier::from_scope(Some(scope)).is_known() {
                return Err(RequestError::UnknownScope(scope.to_string()));
            }
        }
    }
    Ok(())
}

fn parse_relaxed(fields: &Map<String, Value>) -> DistributionRequest {
    DistributionRequest {
        case_id: fields.get("caseId").and_then(Value::as_str).map(str::to_owned),
        scope: fields.get("scope").cloned(),
        attachments: fields.get("attachments").cloned(),
    }
}

fn parse_strict(fields: &Map<String, Value>) -> Result<DistributionRequest, RequestError> {
    let case_id = match fields.get("caseId") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::String(_)) => return Err(malformed("caseId must not be empty")),
        Some(other) => return Err(malformed(format!("caseId must be a string, found {}", type_name(other)))),
        None => return Err(malformed("missing field caseId")),
    };

    let scope = match fields.get("scope") {
        Some(scope @ Value::String(_)) => scope.clone(),
        Some(other) => return Err(malformed(format!("scope must be a string, found {}", type_name(other)))),
        None => return Err(malformed("missing field scope")),
    };

    let attachments = match fields.get("attachments") {
        Some(items @ Value::Array(_)) => items.clone(),
        Some(other) => {
            return Err(malformed(format!(
                "attachments must be an array, found {}",
                type_name(other)
            )))
        }
        None => return Err(malformed("missing field attachments")),
    };

    Ok(DistributionRequest {
        case_id: Some(case_id),
        scope: Some(scope),
        attachments: Some(attachments),
    })
}

fn malformed(msg: impl Into<String>) -> RequestError {
    RequestError::MalformedRequest(msg.into())
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
