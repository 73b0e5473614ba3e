#[cfg(test)]
#[path = "template_test.rs"]
mod tests;

use std::collections::HashMap;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Channel;

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub action_url: String,
    #[serde(default)]
    pub hero_image_alt: String,
    #[serde(default)]
    pub button_text: String,
}

impl TemplateContent {
    /// Substitutes `{{name}}` style placeholder tokens in the body. This is a
    /// preview projection only; the stored template is never mutated and
    /// per-recipient personalization is resolved server-side at send time.
    pub fn render_body(&self, variables: &HashMap<String, String>) -> String {
        let mut body = self.body.to_string();
        for (key, value) in variables {
            body = body.replace(&format!("{{{{{key}}}}}"), value);
        }

        return body;
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub organization: u64,
    pub channel: Channel,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: TemplateContent,
    #[serde(default)]
    pub is_html: bool,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_asset_url: Option<String>,
}

/// Payload for the template creation endpoint. Identical to
/// [`MessageTemplate`] minus the server-assigned fields.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub channel: Channel,
    pub subject: String,
    pub content: TemplateContent,
    pub is_html: bool,
    #[serde(default)]
    pub static_asset_url: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDetails {
    #[serde(default)]
    pub secure_url: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetUpload {
    pub uploaded_at: String,
    #[serde(default)]
    pub response: AssetDetails,
}
