use std::collections::HashMap;

use anyhow::Result;

use super::MessageTemplate;
use super::TemplateContent;
use crate::domain::models::Channel;

#[test]
fn it_renders_placeholder_tokens() {
    let content = TemplateContent {
        body: "Hello {{name}},\n\nWelcome to {{org}}!".to_string(),
        ..TemplateContent::default()
    };

    let mut variables = HashMap::new();
    variables.insert("name".to_string(), "John".to_string());
    variables.insert("org".to_string(), "Acme".to_string());

    assert_eq!(
        content.render_body(&variables),
        "Hello John,\n\nWelcome to Acme!"
    );
}

#[test]
fn it_leaves_unknown_tokens_untouched() {
    let content = TemplateContent {
        body: "Hello {{name}}, your code is {{code}}".to_string(),
        ..TemplateContent::default()
    };

    let mut variables = HashMap::new();
    variables.insert("name".to_string(), "John".to_string());

    assert_eq!(
        content.render_body(&variables),
        "Hello John, your code is {{code}}"
    );
}

#[test]
fn it_does_not_mutate_the_template() {
    let content = TemplateContent {
        body: "Hello {{name}}".to_string(),
        ..TemplateContent::default()
    };

    let mut variables = HashMap::new();
    variables.insert("name".to_string(), "John".to_string());
    let _ = content.render_body(&variables);

    assert_eq!(content.body, "Hello {{name}}");
}

#[test]
fn it_deserializes_the_backend_shape() -> Result<()> {
    let template: MessageTemplate = serde_json::from_str(
        r#"{
            "id": 4,
            "name": "Welcome Email Template",
            "organization": 2,
            "channel": "EMAIL",
            "subject": "Welcome to Our Platform!",
            "content": {
                "title": "Welcome to Your New Journey",
                "body": "Hello {{name}},\n\nWe're excited to have you join our community!",
                "action_url": "https://example.com/get-started",
                "hero_image_alt": "Welcome celebration image",
                "button_text": "Get Started"
            },
            "is_html": true,
            "created_at": "2025-05-11T19:00:58.864325Z",
            "updated_at": "2025-05-11T19:00:58.864343Z",
            "static_asset_url": "https://example.com/image.png"
        }"#,
    )?;

    assert_eq!(template.id, 4);
    assert_eq!(template.channel, Channel::Email);
    assert_eq!(template.content.button_text, "Get Started");
    assert_eq!(
        template.static_asset_url,
        Some("https://example.com/image.png".to_string())
    );

    return Ok(());
}
