extern crate tempdir;

use std::collections::HashMap;

use anyhow::Result;
use mockito::Matcher;
use tempdir::TempDir;
use tokio::sync::mpsc;

use super::HttpGateway;
use crate::domain::models::AuthResponse;
use crate::domain::models::Channel;
use crate::domain::models::Event;
use crate::domain::models::Gateway;
use crate::domain::models::LoginData;
use crate::domain::models::NewCampaign;
use crate::domain::models::NewTemplate;
use crate::domain::models::Notice;
use crate::domain::models::NoticeLevel;
use crate::domain::models::Organization;
use crate::domain::models::RegisterData;
use crate::domain::models::SendRequest;
use crate::domain::models::Session;
use crate::domain::models::TemplateContent;
use crate::domain::models::User;
use crate::domain::services::SessionHandle;

impl HttpGateway {
    fn with_url(
        url: String,
        session: SessionHandle,
        tx: mpsc::UnboundedSender<Event>,
    ) -> HttpGateway {
        return HttpGateway { url, session, tx };
    }
}

fn authenticated_handle() -> SessionHandle {
    return SessionHandle::stub(Some(Session {
        access_token: "abc".to_string(),
        refresh_token: "ref".to_string(),
        user: User {
            id: 1,
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            role: "admin".to_string(),
            organization: Organization {
                id: 2,
                name: "Org".to_string(),
            },
        },
        saved_at: "".to_string(),
    }));
}

fn gateway_for(
    url: String,
    session: SessionHandle,
) -> (HttpGateway, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    return (HttpGateway::with_url(url, session, tx), rx);
}

fn next_notice(rx: &mut mpsc::UnboundedReceiver<Event>) -> Notice {
    let Ok(Event::Notice(notice)) = rx.try_recv() else {
        panic!("expected a notice on the event channel");
    };
    return notice;
}

#[tokio::test]
async fn it_logs_in_without_an_authorization_header() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/accounts/login/")
        .match_header("Authorization", Matcher::Missing)
        .match_body(Matcher::Json(serde_json::json!({
            "email": "a@b.com",
            "password": "x"
        })))
        .with_status(200)
        .with_body(
            r#"{
                "success": true,
                "access": "tok1",
                "refresh": "ref1",
                "user": {"id": 1, "name": "A", "organization": {"id": 2, "name": "Org"}}
            }"#,
        )
        .create_async().await;

    let (gateway, mut rx) = gateway_for(server.url(), SessionHandle::default());
    let res = gateway
        .login(&LoginData {
            email: "a@b.com".to_string(),
            password: "x".to_string(),
        })
        .await?;
    mock.assert_async().await;

    assert!(res.success);
    assert_eq!(res.access, Some("tok1".to_string()));
    assert_eq!(res.refresh, Some("ref1".to_string()));
    assert_eq!(res.user.unwrap().organization.name, "Org");
    assert!(rx.try_recv().is_err());

    return Ok(());
}

#[tokio::test]
async fn it_registers_without_an_authorization_header() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/accounts/register/")
        .match_header("Authorization", Matcher::Missing)
        .match_body(Matcher::Json(serde_json::json!({
            "name": "Acme",
            "industry": "Retail",
            "admin_email": "a@b.com",
            "admin_password": "x",
            "admin_name": "A"
        })))
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create_async().await;

    let (gateway, _rx) = gateway_for(server.url(), SessionHandle::default());
    let res = gateway
        .register(&RegisterData {
            name: "Acme".to_string(),
            industry: "Retail".to_string(),
            admin_email: "a@b.com".to_string(),
            admin_password: "x".to_string(),
            admin_name: "A".to_string(),
        })
        .await?;
    mock.assert_async().await;

    assert_eq!(
        res,
        AuthResponse {
            success: true,
            ..AuthResponse::default()
        }
    );

    return Ok(());
}

#[tokio::test]
async fn it_lists_campaigns_with_the_bearer_token() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/campaigns/get-campaign/")
        .match_header("Authorization", "Bearer abc")
        .with_status(200)
        .with_body(
            r#"[{
                "id": 7,
                "name": "Spring Sale",
                "channel": "EMAIL",
                "contactsCSV": "uploads/contacts.csv"
            }]"#,
        )
        .create_async().await;

    let (gateway, _rx) = gateway_for(server.url(), authenticated_handle());
    let campaigns = gateway.list_campaigns().await?;
    mock.assert_async().await;

    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0].id, 7);
    assert_eq!(campaigns[0].channel, Channel::Email);

    return Ok(());
}

#[tokio::test]
async fn it_surfaces_the_backend_error_message() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/campaigns/get-campaign/")
        .with_status(403)
        .with_body(r#"{"message": "Token is invalid or expired"}"#)
        .create_async().await;

    let (gateway, mut rx) = gateway_for(server.url(), authenticated_handle());
    let res = gateway.list_campaigns().await;
    mock.assert_async().await;

    assert!(res.is_err());
    assert_eq!(res.unwrap_err().to_string(), "Token is invalid or expired");

    let notice = next_notice(&mut rx);
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Token is invalid or expired");
    assert!(rx.try_recv().is_err());

    return Ok(());
}

#[tokio::test]
async fn it_falls_back_to_a_status_derived_message() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/campaigns/get-campaign/")
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create_async().await;

    let (gateway, mut rx) = gateway_for(server.url(), authenticated_handle());
    let res = gateway.list_campaigns().await;
    mock.assert_async().await;

    assert!(res.is_err());
    assert_eq!(res.unwrap_err().to_string(), "Error: 502 Bad Gateway");
    assert_eq!(next_notice(&mut rx).message, "Error: 502 Bad Gateway");

    return Ok(());
}

#[tokio::test]
async fn it_notifies_once_on_a_network_failure() {
    // Port 1 is never listening; the request fails at the transport layer.
    let (gateway, mut rx) = gateway_for("http://127.0.0.1:1".to_string(), authenticated_handle());
    let res = gateway.list_campaigns().await;

    assert!(res.is_err());
    let notice = next_notice(&mut rx);
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Could not reach the backend service");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn it_creates_a_campaign_from_multipart_form_data() -> Result<()> {
    let tmp_dir = TempDir::new("courier")?;
    let csv_path = tmp_dir.path().join("contacts.csv");
    tokio::fs::write(&csv_path, "email\nx@x.com\ny@y.com\n").await?;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/campaigns/create-campaign/")
        .match_header("Authorization", "Bearer abc")
        .match_header(
            "Content-Type",
            Matcher::Regex("multipart/form-data.*".to_string()),
        )
        .with_status(200)
        .with_body(
            r#"{
                "id": 8,
                "name": "Spring Sale",
                "channel": "EMAIL",
                "contactsCSV": "uploads/contacts.csv"
            }"#,
        )
        .create_async().await;

    let (gateway, _rx) = gateway_for(server.url(), authenticated_handle());
    let campaign = gateway
        .create_campaign(&NewCampaign {
            name: "Spring Sale".to_string(),
            description: "Announcement".to_string(),
            channel: Channel::Email,
            message_template_id: 4,
            contacts_csv: csv_path,
        })
        .await?;
    mock.assert_async().await;

    assert_eq!(campaign.id, 8);
    return Ok(());
}

#[tokio::test]
async fn it_deletes_a_campaign_by_id() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("DELETE", "/campaigns/delete-campaign/")
        .match_query(Matcher::UrlEncoded("id".to_string(), "7".to_string()))
        .match_header("Authorization", "Bearer abc")
        .with_status(200)
        .with_body(r#"{"success": true}"#)
        .create_async().await;

    let (gateway, _rx) = gateway_for(server.url(), authenticated_handle());
    gateway.delete_campaign(7).await?;
    mock.assert_async().await;

    return Ok(());
}

#[tokio::test]
async fn it_creates_a_template() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/campaigns/create-message-template/")
        .match_header("Authorization", "Bearer abc")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "name": "Welcome Email Template",
            "channel": "EMAIL",
            "content": {"title": "Welcome", "body": "Hello {{name}}"}
        })))
        .with_status(200)
        .with_body(
            r#"{
                "id": 4,
                "name": "Welcome Email Template",
                "organization": 2,
                "channel": "EMAIL",
                "subject": "Welcome!",
                "content": {"title": "Welcome", "body": "Hello {{name}}"},
                "is_html": true
            }"#,
        )
        .create_async().await;

    let (gateway, _rx) = gateway_for(server.url(), authenticated_handle());
    let template = gateway
        .create_template(&NewTemplate {
            name: "Welcome Email Template".to_string(),
            channel: Channel::Email,
            subject: "Welcome!".to_string(),
            content: TemplateContent {
                title: "Welcome".to_string(),
                body: "Hello {{name}}".to_string(),
                ..TemplateContent::default()
            },
            is_html: true,
            static_asset_url: "".to_string(),
        })
        .await?;
    mock.assert_async().await;

    assert_eq!(template.id, 4);
    assert_eq!(template.content.body, "Hello {{name}}");
    return Ok(());
}

#[tokio::test]
async fn it_sends_a_message_and_decodes_per_recipient_results() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/messaging/send-message/")
        .match_header("Authorization", "Bearer abc")
        .match_body(Matcher::Json(serde_json::json!({
            "campaign_id": 7,
            "template_id": 4,
            "variables": {}
        })))
        .with_status(200)
        .with_body(
            r#"{
                "contacts_processed": 3,
                "successful_sends": 2,
                "failed_sends": 1,
                "results": [
                    {"recipient": "x@x.com", "success": true},
                    {"recipient": "y@y.com", "success": true},
                    {"recipient": "z@z.com", "success": false}
                ]
            }"#,
        )
        .create_async().await;

    let (gateway, _rx) = gateway_for(server.url(), authenticated_handle());
    let outcome = gateway
        .send_message(&SendRequest {
            campaign_id: 7,
            template_id: 4,
            variables: HashMap::new(),
        })
        .await?;
    mock.assert_async().await;

    assert!(outcome.is_consistent());
    assert_eq!(outcome.contacts_processed, 3);
    assert_eq!(outcome.results[2].recipient, "z@z.com");
    return Ok(());
}

#[tokio::test]
async fn it_uploads_an_asset() -> Result<()> {
    let tmp_dir = TempDir::new("courier")?;
    let image_path = tmp_dir.path().join("hero.png");
    tokio::fs::write(&image_path, [0x89, 0x50, 0x4e, 0x47]).await?;

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/messaging/create-static-asset/")
        .match_header("Authorization", "Bearer abc")
        .match_header(
            "Content-Type",
            Matcher::Regex("multipart/form-data.*".to_string()),
        )
        .with_status(200)
        .with_body(
            r#"{
                "uploaded_at": "https://cdn.example.com/hero.png",
                "response": {"secure_url": "https://cdn.example.com/hero.png"}
            }"#,
        )
        .create_async().await;

    let (gateway, _rx) = gateway_for(server.url(), authenticated_handle());
    let upload = gateway.upload_asset(&image_path).await?;
    mock.assert_async().await;

    assert_eq!(upload.uploaded_at, "https://cdn.example.com/hero.png");
    assert_eq!(upload.response.secure_url, "https://cdn.example.com/hero.png");
    return Ok(());
}
