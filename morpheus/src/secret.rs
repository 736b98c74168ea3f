//! Write-only secret attributes
//!
//! The API never returns secrets in plaintext, only a SHA-256 digest at best.
//! State therefore holds the hex digest of the secret, and planning compares
//! the configured plaintext against that digest.

use sha2::{Digest, Sha256};
use tfplug::plan_modifier::{PlanModifier, PlanModifyRequest, PlanModifyResponse};
use tfplug::types::Dynamic;

/// Lowercase hex SHA-256 of `plaintext`
pub fn hash_secret(plaintext: &str) -> String {
    hex::encode(Sha256::digest(plaintext.as_bytes()))
}

/// True when `candidate` hashes to `stored_hash`, ignoring hex case
pub fn is_unchanged(candidate: &str, stored_hash: &str) -> bool {
    hash_secret(candidate).eq_ignore_ascii_case(stored_hash)
}

/// How a secret field treats an empty stored hash on an existing resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretPolicy {
    /// Always compare digests; an empty stored value never matches
    CompareHash,
    /// An empty stored value means the secret was never read back; plan no change
    EmptyStoredIsUnchanged,
}

impl SecretPolicy {
    pub fn is_unchanged(&self, candidate: &str, stored_hash: &str) -> bool {
        match self {
            SecretPolicy::EmptyStoredIsUnchanged if stored_hash.is_empty() => true,
            _ => is_unchanged(candidate, stored_hash),
        }
    }
}

/// Pick the digest to keep in state after reading a resource back.
///
/// A digest reported by the server wins unless it is the planned digest in a
/// different case. When the server reports nothing the planned digest stays.
pub fn stored_hash(planned: Option<&str>, server: Option<&str>) -> Option<String> {
    match (planned, server.filter(|s| !s.is_empty())) {
        (Some(planned), Some(server)) if planned.eq_ignore_ascii_case(server) => {
            Some(planned.to_string())
        }
        (_, Some(server)) => Some(server.to_string()),
        (planned, None) => planned.map(str::to_string),
    }
}

/// Plan modifier for secret attributes.
///
/// The configured plaintext never reaches the plan: an unchanged secret plans
/// the stored digest, a changed one plans the digest of the new plaintext.
pub struct SuppressSecretDiff {
    policy: SecretPolicy,
}

impl SuppressSecretDiff {
    pub fn new(policy: SecretPolicy) -> Self {
        Self { policy }
    }
}

impl PlanModifier for SuppressSecretDiff {
    fn description(&self) -> String {
        match self.policy {
            SecretPolicy::CompareHash => "Stored as a SHA-256 digest".to_string(),
            SecretPolicy::EmptyStoredIsUnchanged => {
                "Stored as a SHA-256 digest; an unset stored digest is not a change".to_string()
            }
        }
    }

    fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
        let plaintext = match &request.config {
            Dynamic::String(s) => s.clone(),
            Dynamic::Unknown => {
                return PlanModifyResponse {
                    plan_value: Dynamic::Unknown,
                    requires_replace: false,
                    diagnostics: vec![],
                }
            }
            _ => {
                return PlanModifyResponse {
                    plan_value: Dynamic::Null,
                    requires_replace: false,
                    diagnostics: vec![],
                }
            }
        };

        let plan_value = if !request.resource_exists {
            Dynamic::String(hash_secret(&plaintext))
        } else {
            let stored = request.state.as_string().unwrap_or("");
            if self.policy.is_unchanged(&plaintext, stored) {
                request.state.clone()
            } else {
                Dynamic::String(hash_secret(&plaintext))
            }
        };

        PlanModifyResponse {
            plan_value,
            requires_replace: false,
            diagnostics: vec![],
        }
    }
}
