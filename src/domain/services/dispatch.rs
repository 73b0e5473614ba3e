#[cfg(test)]
#[path = "dispatch_test.rs"]
mod tests;

use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::domain::models::Campaign;
use crate::domain::models::Event;
use crate::domain::models::GatewayBox;
use crate::domain::models::Notice;
use crate::domain::models::SendOutcome;
use crate::domain::models::SendRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Confirming,
    Sending,
    Completed(SendOutcome),
}

/// Drives one campaign-send dialog: idle → confirming → sending → completed.
/// The tagged state makes "sending and completed at once" unrepresentable,
/// and the sending state guarantees at most one in-flight request per
/// orchestrator instance.
pub struct SendOrchestrator {
    state: SendState,
    tx: mpsc::UnboundedSender<Event>,
}

impl SendOrchestrator {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> SendOrchestrator {
        return SendOrchestrator {
            state: SendState::Idle,
            tx,
        };
    }

    pub fn state(&self) -> &SendState {
        return &self.state;
    }

    /// The user asked to send. No side effects, no network.
    pub fn begin(&mut self) {
        if self.state == SendState::Idle {
            self.state = SendState::Confirming;
        }
    }

    /// Explicit confirmation. Preconditions are checked before any network
    /// call: an unsendable campaign is rejected with a notice and the state
    /// stays at confirming so the user can fix the campaign and retry.
    pub async fn confirm(&mut self, gateway: &GatewayBox, campaign: &Campaign) {
        if self.state != SendState::Confirming {
            return;
        }

        let Some(template) = campaign.first_template() else {
            self.notify(Notice::error("Campaign details incomplete"));
            return;
        };
        if !campaign.is_sendable() {
            self.notify(Notice::error("Campaign details incomplete"));
            return;
        }

        let request = SendRequest {
            campaign_id: campaign.id,
            template_id: template.id,
            variables: HashMap::new(),
        };

        self.state = SendState::Sending;
        match gateway.send_message(&request).await {
            Ok(outcome) => {
                if !outcome.is_consistent() {
                    tracing::error!(
                        contacts_processed = outcome.contacts_processed,
                        successful_sends = outcome.successful_sends,
                        failed_sends = outcome.failed_sends,
                        results = outcome.results.len(),
                        "send result tallies do not add up"
                    );
                    self.notify(Notice::error(
                        "The backend returned an inconsistent send result",
                    ));
                    self.state = SendState::Idle;
                    return;
                }

                self.notify(Notice::success("Campaign sent successfully"));
                self.state = SendState::Completed(outcome);
            }
            Err(_) => {
                // The gateway already surfaced the failure. Back to idle so
                // the user can retry manually.
                self.state = SendState::Idle;
            }
        }
    }

    /// Closing the dialog discards all orchestrator state, stored result
    /// included, so the next open always starts from idle.
    pub fn dismiss(&mut self) {
        self.state = SendState::Idle;
    }

    fn notify(&self, notice: Notice) {
        let _ = self.tx.send(Event::Notice(notice));
    }
}
