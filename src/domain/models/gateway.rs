use std::path;

use anyhow::Result;
use async_trait::async_trait;

use super::AssetUpload;
use super::AuthResponse;
use super::Campaign;
use super::LoginData;
use super::MessageTemplate;
use super::NewCampaign;
use super::NewTemplate;
use super::RegisterData;
use super::SendOutcome;
use super::SendRequest;

pub type GatewayBox = Box<dyn Gateway + Send + Sync>;

/// The typed request layer in front of the remote messaging service. Every
/// implementation must attach the bearer token where the endpoint requires
/// it, decode JSON bodies uniformly, and surface exactly one user-facing
/// notice per failed call so callers never need to notify on their own.
#[async_trait]
pub trait Gateway {
    /// Creates an organization and its admin account. Anonymous endpoint.
    async fn register(&self, data: &RegisterData) -> Result<AuthResponse>;

    /// Exchanges credentials for a token pair and user profile. Anonymous
    /// endpoint; persisting the session is the caller's job.
    async fn login(&self, data: &LoginData) -> Result<AuthResponse>;

    async fn list_campaigns(&self) -> Result<Vec<Campaign>>;

    /// Submits the campaign form along with the contacts CSV as multipart
    /// form data.
    async fn create_campaign(&self, draft: &NewCampaign) -> Result<Campaign>;

    async fn delete_campaign(&self, id: u64) -> Result<()>;

    async fn create_template(&self, draft: &NewTemplate) -> Result<MessageTemplate>;

    /// Triggers one send of a campaign with a template. The response
    /// aggregates per-recipient outcomes.
    async fn send_message(&self, request: &SendRequest) -> Result<SendOutcome>;

    /// Uploads a static image asset and returns its hosted URL.
    async fn upload_asset(&self, image: &path::Path) -> Result<AssetUpload>;
}
