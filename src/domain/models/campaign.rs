#[cfg(test)]
#[path = "campaign_test.rs"]
mod tests;

use std::path;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum::EnumIter;
use strum::EnumString;

use super::MessageTemplate;

#[derive(
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    strum::Display,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    #[default]
    Email,
    Sms,
    Whatsapp,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub organization_id: u64,
    #[serde(default)]
    pub created_by_id: u64,
    pub channel: Channel,
    #[serde(rename = "contactsCSV", default)]
    pub contacts_csv: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub message_templates: Vec<MessageTemplate>,
}

impl Campaign {
    /// A campaign can only be sent when it has a template to render and a
    /// contacts file to address.
    pub fn is_sendable(&self) -> bool {
        return !self.message_templates.is_empty() && !self.contacts_csv.is_empty();
    }

    /// The template submitted on send. The first template in the sequence is
    /// the one the campaign was created with.
    pub fn first_template(&self) -> Option<&MessageTemplate> {
        return self.message_templates.first();
    }
}

/// Local form data for the campaign creation endpoint. The contacts file is
/// read and attached by the gateway at submission time.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct NewCampaign {
    pub name: String,
    pub description: String,
    pub channel: Channel,
    pub message_template_id: u64,
    pub contacts_csv: path::PathBuf,
}
