#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use std::path;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde_derive::Deserialize;
use tokio::fs;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AssetUpload;
use crate::domain::models::AuthResponse;
use crate::domain::models::Campaign;
use crate::domain::models::Event;
use crate::domain::models::Gateway;
use crate::domain::models::LoginData;
use crate::domain::models::MessageTemplate;
use crate::domain::models::NewCampaign;
use crate::domain::models::NewTemplate;
use crate::domain::models::Notice;
use crate::domain::models::RegisterData;
use crate::domain::models::SendOutcome;
use crate::domain::models::SendRequest;
use crate::domain::services::SessionHandle;

#[derive(Default, Debug, Clone, PartialEq, Eq, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Reqwest-backed implementation of the gateway contract. All requests share
/// the same treatment: bearer token attachment from the session handle,
/// uniform JSON decoding, and a single error notice per failed call.
pub struct HttpGateway {
    url: String,
    session: SessionHandle,
    tx: mpsc::UnboundedSender<Event>,
}

impl HttpGateway {
    pub fn new(session: SessionHandle, tx: mpsc::UnboundedSender<Event>) -> HttpGateway {
        return HttpGateway {
            url: Config::get(ConfigKey::ApiUrl),
            session,
            tx,
        };
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = self.session.access_token() {
            return builder.header("Authorization", format!("Bearer {token}"));
        }

        return builder;
    }

    fn notify_error(&self, message: &str) {
        let _ = self.tx.send(Event::Notice(Notice::error(message)));
    }

    async fn execute(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        match builder.send().await {
            Ok(res) => return Ok(res),
            Err(err) => {
                tracing::error!(error = ?err, "request to the backend failed");
                self.notify_error("Could not reach the backend service");
                return Err(err.into());
            }
        }
    }

    /// Converts a non-success status into the uniform error: the JSON body's
    /// `message` when one is present, a status-derived fallback otherwise.
    /// The notice fired here is the only one callers get.
    async fn decode<T: DeserializeOwned>(&self, res: reqwest::Response) -> Result<T> {
        let status = res.status();
        if !status.is_success() {
            let fallback = format!(
                "Error: {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            );
            let message = res
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| return body.message)
                .unwrap_or(fallback);

            tracing::error!(
                status = status.as_u16(),
                message = message.as_str(),
                "backend returned an error"
            );
            self.notify_error(&message);
            bail!(message);
        }

        return Ok(res.json::<T>().await?);
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn register(&self, data: &RegisterData) -> Result<AuthResponse> {
        let res = self
            .execute(
                reqwest::Client::new()
                    .post(format!("{url}/api/accounts/register/", url = self.url))
                    .json(data),
            )
            .await?;

        return self.decode(res).await;
    }

    async fn login(&self, data: &LoginData) -> Result<AuthResponse> {
        let res = self
            .execute(
                reqwest::Client::new()
                    .post(format!("{url}/api/accounts/login/", url = self.url))
                    .json(data),
            )
            .await?;

        return self.decode(res).await;
    }

    async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        let res = self
            .execute(self.authorized(
                reqwest::Client::new().get(format!("{url}/campaigns/get-campaign/", url = self.url)),
            ))
            .await?;

        return self.decode(res).await;
    }

    async fn create_campaign(&self, draft: &NewCampaign) -> Result<Campaign> {
        let contents = fs::read(&draft.contacts_csv).await?;
        let file_name = draft
            .contacts_csv
            .file_name()
            .map(|name| return name.to_string_lossy().to_string())
            .unwrap_or_else(|| return "contacts.csv".to_string());

        let form = multipart::Form::new()
            .text("name", draft.name.to_string())
            .text("description", draft.description.to_string())
            .text("channel", draft.channel.to_string())
            .text("message_templates", draft.message_template_id.to_string())
            .part(
                "contactsCSV",
                multipart::Part::bytes(contents)
                    .file_name(file_name)
                    .mime_str("text/csv")?,
            );

        let res = self
            .execute(
                self.authorized(
                    reqwest::Client::new()
                        .post(format!("{url}/campaigns/create-campaign/", url = self.url)),
                )
                .multipart(form),
            )
            .await?;

        return self.decode(res).await;
    }

    async fn delete_campaign(&self, id: u64) -> Result<()> {
        let res = self
            .execute(
                self.authorized(
                    reqwest::Client::new()
                        .delete(format!("{url}/campaigns/delete-campaign/", url = self.url)),
                )
                .query(&[("id", id)]),
            )
            .await?;

        let _ack: serde_json::Value = self.decode(res).await?;
        return Ok(());
    }

    async fn create_template(&self, draft: &NewTemplate) -> Result<MessageTemplate> {
        let res = self
            .execute(
                self.authorized(reqwest::Client::new().post(format!(
                    "{url}/campaigns/create-message-template/",
                    url = self.url
                )))
                .json(draft),
            )
            .await?;

        return self.decode(res).await;
    }

    async fn send_message(&self, request: &SendRequest) -> Result<SendOutcome> {
        let res = self
            .execute(
                self.authorized(
                    reqwest::Client::new()
                        .post(format!("{url}/messaging/send-message/", url = self.url)),
                )
                .json(request),
            )
            .await?;

        return self.decode(res).await;
    }

    async fn upload_asset(&self, image: &path::Path) -> Result<AssetUpload> {
        let contents = fs::read(image).await?;
        let file_name = image
            .file_name()
            .map(|name| return name.to_string_lossy().to_string())
            .unwrap_or_else(|| return "image".to_string());

        let form = multipart::Form::new().part(
            "image",
            multipart::Part::bytes(contents).file_name(file_name),
        );

        let res = self
            .execute(
                self.authorized(reqwest::Client::new().post(format!(
                    "{url}/messaging/create-static-asset/",
                    url = self.url
                )))
                .multipart(form),
            )
            .await?;

        return self.decode(res).await;
    }
}
