#[cfg(test)]
#[path = "send_test.rs"]
mod tests;

use std::collections::HashMap;

use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Body for the send-message endpoint. Per-recipient personalization is
/// resolved server-side, so `variables` is an empty mapping on campaign sends.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendRequest {
    pub campaign_id: u64,
    pub template_id: u64,
    pub variables: HashMap<String, String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientResult {
    pub recipient: String,
    pub success: bool,
    #[serde(default)]
    pub result: String,
}

/// Aggregated outcome of a single send invocation. One-shot: a new send
/// replaces the previous outcome entirely, the two are never merged.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub campaign: String,
    #[serde(default)]
    pub template: String,
    pub contacts_processed: u64,
    pub successful_sends: u64,
    pub failed_sends: u64,
    #[serde(default)]
    pub results: Vec<RecipientResult>,
}

impl SendOutcome {
    /// The tallies must agree with each other and with the per-recipient
    /// list. A response violating this is a backend handling bug and must not
    /// be trusted by callers.
    pub fn is_consistent(&self) -> bool {
        return self.successful_sends + self.failed_sends == self.contacts_processed
            && self.contacts_processed as usize == self.results.len();
    }
}
