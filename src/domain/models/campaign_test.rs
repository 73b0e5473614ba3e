use anyhow::Result;

use super::Campaign;
use super::Channel;
use crate::domain::models::MessageTemplate;

#[test]
fn it_is_sendable_with_template_and_contacts() {
    let campaign = Campaign {
        id: 1,
        name: "Spring Sale".to_string(),
        contacts_csv: "uploads/contacts.csv".to_string(),
        message_templates: vec![MessageTemplate::default()],
        ..Campaign::default()
    };

    assert!(campaign.is_sendable());
}

#[test]
fn it_is_not_sendable_without_templates() {
    let campaign = Campaign {
        id: 1,
        name: "Spring Sale".to_string(),
        contacts_csv: "uploads/contacts.csv".to_string(),
        message_templates: vec![],
        ..Campaign::default()
    };

    assert!(!campaign.is_sendable());
    assert!(campaign.first_template().is_none());
}

#[test]
fn it_is_not_sendable_without_contacts() {
    let campaign = Campaign {
        id: 1,
        name: "Spring Sale".to_string(),
        contacts_csv: "".to_string(),
        message_templates: vec![MessageTemplate::default()],
        ..Campaign::default()
    };

    assert!(!campaign.is_sendable());
}

#[test]
fn it_deserializes_the_backend_shape() -> Result<()> {
    let campaign: Campaign = serde_json::from_str(
        r#"{
            "id": 7,
            "name": "Spring Sale",
            "description": "Announcement",
            "organization_id": 2,
            "created_by_id": 1,
            "channel": "EMAIL",
            "contactsCSV": "uploads/contacts.csv",
            "created_at": "2025-05-11T19:00:58.864325Z",
            "updated_at": "2025-05-11T19:00:58.864343Z"
        }"#,
    )?;

    assert_eq!(campaign.id, 7);
    assert_eq!(campaign.channel, Channel::Email);
    assert_eq!(campaign.contacts_csv, "uploads/contacts.csv");
    assert!(campaign.message_templates.is_empty());

    return Ok(());
}

#[test]
fn it_formats_channels_for_the_wire() {
    assert_eq!(Channel::Email.to_string(), "EMAIL");
    assert_eq!(Channel::Sms.to_string(), "SMS");
    assert_eq!(Channel::Whatsapp.to_string(), "WHATSAPP");
}
