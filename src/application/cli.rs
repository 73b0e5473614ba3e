use std::collections::HashMap;
use std::path;
use std::str::FromStr;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Campaign;
use crate::domain::models::Channel;
use crate::domain::models::Event;
use crate::domain::models::GatewayBox;
use crate::domain::models::LoginData;
use crate::domain::models::NewCampaign;
use crate::domain::models::NewTemplate;
use crate::domain::models::NoticeLevel;
use crate::domain::models::RegisterData;
use crate::domain::models::SendOutcome;
use crate::domain::models::TemplateContent;
use crate::domain::services::CredentialStore;
use crate::domain::services::SendOrchestrator;
use crate::domain::services::SendState;
use crate::domain::services::SessionHandle;
use crate::domain::services::SessionManager;
use crate::infrastructure::gateway::HttpGateway;

struct Console {
    manager: SessionManager,
    gateway: GatewayBox,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl Console {
    fn wire() -> Console {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();
        let handle = SessionHandle::default();

        let gateway: GatewayBox = Box::new(HttpGateway::new(handle.clone(), tx.clone()));
        let manager_gateway: GatewayBox = Box::new(HttpGateway::new(handle.clone(), tx.clone()));
        let manager = SessionManager::new(
            CredentialStore::default(),
            manager_gateway,
            handle,
            tx.clone(),
        );

        return Console {
            manager,
            gateway,
            tx,
            rx,
        };
    }

    fn require_authenticated(&self) -> Result<()> {
        if !self.manager.is_authenticated() {
            bail!("You are not logged in. Run `courier login` first.");
        }

        return Ok(());
    }

    fn drain_notices(&mut self) {
        while let Ok(Event::Notice(notice)) = self.rx.try_recv() {
            match notice.level {
                NoticeLevel::Success => println!("{}", Paint::green(&notice.message)),
                NoticeLevel::Error => eprintln!("{}", Paint::red(&notice.message)),
            }
        }
    }
}

fn subcommand_register() -> Command {
    return Command::new("register")
        .about("Creates an organization and its admin account.")
        .arg(
            Arg::new("name")
                .long("name")
                .help("Organization name.")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("industry")
                .long("industry")
                .help("Organization industry.")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("admin-email")
                .long("admin-email")
                .help("Email address for the admin account.")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("admin-password")
                .long("admin-password")
                .help("Password for the admin account.")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("admin-name")
                .long("admin-name")
                .help("Display name for the admin account.")
                .num_args(1)
                .required(true),
        );
}

fn subcommand_login() -> Command {
    return Command::new("login")
        .about("Signs in and persists the session for later commands.")
        .arg(
            Arg::new("email")
                .long("email")
                .help("Account email address.")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new("password")
                .long("password")
                .help("Account password.")
                .num_args(1)
                .required(true),
        );
}

fn subcommand_campaigns() -> Command {
    return Command::new("campaigns")
        .about("Manages campaigns and triggers sends.")
        .subcommand_required(true)
        .subcommand(Command::new("list").about("Lists all campaigns for your organization."))
        .subcommand(
            Command::new("create")
                .about("Creates a campaign from a template and a contacts CSV file.")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .help("Campaign name.")
                        .num_args(1)
                        .required(true),
                )
                .arg(
                    Arg::new("description")
                        .long("description")
                        .help("Campaign description.")
                        .num_args(1)
                        .required(true),
                )
                .arg(
                    Arg::new("channel")
                        .long("channel")
                        .help("Delivery channel.")
                        .num_args(1)
                        .default_value("EMAIL")
                        .value_parser(PossibleValuesParser::new(["EMAIL", "SMS", "WHATSAPP"])),
                )
                .arg(
                    Arg::new("template-id")
                        .long("template-id")
                        .help("ID of the message template to attach.")
                        .num_args(1)
                        .required(true)
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("contacts")
                        .long("contacts")
                        .help("Path to the contacts CSV file.")
                        .num_args(1)
                        .required(true),
                ),
        )
        .subcommand(
            Command::new("delete")
                .about("Deletes a campaign.")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .help("Campaign ID.")
                        .num_args(1)
                        .required(true)
                        .value_parser(value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("send")
                .about("Sends a campaign to all contacts in its CSV file.")
                .arg(
                    Arg::new("id")
                        .long("id")
                        .help("Campaign ID.")
                        .num_args(1)
                        .required(true)
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .short('y')
                        .help("Skips the confirmation prompt.")
                        .action(ArgAction::SetTrue),
                ),
        );
}

fn subcommand_templates() -> Command {
    return Command::new("templates")
        .about("Manages reusable message templates.")
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .about("Creates a message template, uploading a hero image first when given one.")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .help("Template name.")
                        .num_args(1)
                        .required(true),
                )
                .arg(
                    Arg::new("channel")
                        .long("channel")
                        .help("Delivery channel.")
                        .num_args(1)
                        .default_value("EMAIL")
                        .value_parser(PossibleValuesParser::new(["EMAIL", "SMS", "WHATSAPP"])),
                )
                .arg(
                    Arg::new("subject")
                        .long("subject")
                        .help("Message subject line.")
                        .num_args(1)
                        .required(true),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .help("Content title.")
                        .num_args(1)
                        .required(true),
                )
                .arg(
                    Arg::new("body")
                        .long("body")
                        .help("Content body. Placeholder tokens like {{name}} are allowed.")
                        .num_args(1)
                        .required(true),
                )
                .arg(
                    Arg::new("button-text")
                        .long("button-text")
                        .help("Call-to-action button text.")
                        .num_args(1)
                        .default_value(""),
                )
                .arg(
                    Arg::new("action-url")
                        .long("action-url")
                        .help("Call-to-action URL.")
                        .num_args(1)
                        .default_value(""),
                )
                .arg(
                    Arg::new("hero-image-alt")
                        .long("hero-image-alt")
                        .help("Alt text for the hero image.")
                        .num_args(1)
                        .default_value(""),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help("Marks the template content as HTML.")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("image")
                        .long("image")
                        .help("Path to a hero image to upload as a static asset.")
                        .num_args(1),
                ),
        )
        .subcommand(
            Command::new("preview")
                .about("Renders a template body with placeholder substitutions.")
                .arg(
                    Arg::new("body")
                        .long("body")
                        .help("Body text containing {{name}} style tokens.")
                        .num_args(1)
                        .required(true),
                )
                .arg(
                    Arg::new("var")
                        .long("var")
                        .help("Substitution in key=value form. May be repeated.")
                        .num_args(1)
                        .action(ArgAction::Append),
                ),
        );
}

fn subcommand_assets() -> Command {
    return Command::new("assets")
        .about("Manages static assets.")
        .subcommand_required(true)
        .subcommand(
            Command::new("upload")
                .about("Uploads an image and prints its hosted URL.")
                .arg(
                    Arg::new("file")
                        .long("file")
                        .help("Path to the image file.")
                        .num_args(1)
                        .required(true),
                ),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Manages the configuration file.")
        .subcommand_required(true)
        .subcommand(Command::new("create").about("Creates a default configuration file."));
}

pub fn build() -> Command {
    return Command::new("courier")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal console for an outbound-messaging marketing platform.")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config-file")
                .short('c')
                .long("config-file")
                .env("COURIER_CONFIG_FILE")
                .help("Path to the configuration file.")
                .num_args(1)
                .global(true),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .env("COURIER_API_URL")
                .help("Base URL of the messaging platform backend.")
                .num_args(1)
                .global(true),
        )
        .arg(
            Arg::new("state-dir")
                .long("state-dir")
                .env("COURIER_STATE_DIR")
                .help("Directory holding the persisted session.")
                .num_args(1)
                .global(true),
        )
        .subcommand(subcommand_register())
        .subcommand(subcommand_login())
        .subcommand(Command::new("logout").about("Signs out and clears the persisted session."))
        .subcommand(Command::new("whoami").about("Prints the signed-in identity."))
        .subcommand(subcommand_campaigns())
        .subcommand(subcommand_templates())
        .subcommand(subcommand_assets())
        .subcommand(subcommand_config());
}

fn arg(matches: &ArgMatches, name: &str) -> String {
    return matches
        .get_one::<String>(name)
        .map(|val| return val.to_string())
        .unwrap_or_default();
}

fn channel_arg(matches: &ArgMatches) -> Result<Channel> {
    let raw = arg(matches, "channel");
    return match Channel::from_str(&raw) {
        Ok(channel) => Ok(channel),
        Err(_) => bail!(format!("{raw} is not a valid channel")),
    };
}

async fn register_command(console: &mut Console, matches: &ArgMatches) -> Result<()> {
    let data = RegisterData {
        name: arg(matches, "name"),
        industry: arg(matches, "industry"),
        admin_email: arg(matches, "admin-email"),
        admin_password: arg(matches, "admin-password"),
        admin_name: arg(matches, "admin-name"),
    };

    if console.manager.register(&data).await {
        println!("You can now sign in with `courier login`.");
    }

    return Ok(());
}

async fn login_command(console: &mut Console, matches: &ArgMatches) -> Result<()> {
    let data = LoginData {
        email: arg(matches, "email"),
        password: arg(matches, "password"),
    };

    if console.manager.login(&data).await {
        if let Some(session) = console.manager.handle().current() {
            println!(
                "Signed in as {name} ({organization})",
                name = session.user.name,
                organization = session.user.organization.name
            );
        }
    }

    return Ok(());
}

async fn whoami_command(console: &mut Console) -> Result<()> {
    console.require_authenticated()?;

    if let Some(session) = console.manager.handle().current() {
        let user = session.user;
        println!("{name} <{email}>", name = user.name, email = user.email);
        println!(
            "Role: {role}, Organization: {organization} (ID: {id})",
            role = user.role,
            organization = user.organization.name,
            id = user.organization.id
        );
    }

    return Ok(());
}

fn format_campaign(campaign: &Campaign) -> String {
    let mut res = format!(
        "- (ID: {id}) {name} [{channel}], {templates} template(s)",
        id = campaign.id,
        name = campaign.name,
        channel = campaign.channel,
        templates = campaign.message_templates.len(),
    );

    if !campaign.contacts_csv.is_empty() {
        let file_name = campaign
            .contacts_csv
            .split('/')
            .last()
            .unwrap_or(&campaign.contacts_csv);
        res = format!("{res}, contacts: {file_name}");
    }

    return res;
}

async fn campaigns_list_command(console: &mut Console) -> Result<()> {
    console.require_authenticated()?;

    let campaigns = console.gateway.list_campaigns().await?;
    if campaigns.is_empty() {
        println!("There are no campaigns yet. Create one with `courier campaigns create`.");
        return Ok(());
    }

    let lines = campaigns
        .iter()
        .map(|campaign| {
            return format_campaign(campaign);
        })
        .collect::<Vec<String>>();
    println!("{}", lines.join("\n"));

    return Ok(());
}

async fn campaigns_create_command(console: &mut Console, matches: &ArgMatches) -> Result<()> {
    console.require_authenticated()?;

    let draft = NewCampaign {
        name: arg(matches, "name"),
        description: arg(matches, "description"),
        channel: channel_arg(matches)?,
        message_template_id: *matches.get_one::<u64>("template-id").unwrap(),
        contacts_csv: path::PathBuf::from(arg(matches, "contacts")),
    };

    if !draft.contacts_csv.exists() {
        bail!(format!(
            "Contacts file {path} does not exist",
            path = draft.contacts_csv.display()
        ));
    }

    let campaign = console.gateway.create_campaign(&draft).await?;
    println!(
        "{}",
        Paint::green(format!("Campaign created with ID {id}", id = campaign.id))
    );

    return Ok(());
}

async fn campaigns_delete_command(console: &mut Console, matches: &ArgMatches) -> Result<()> {
    console.require_authenticated()?;

    let id = *matches.get_one::<u64>("id").unwrap();
    console.gateway.delete_campaign(id).await?;
    println!("Campaign {id} deleted");

    return Ok(());
}

fn print_send_outcome(outcome: &SendOutcome) {
    if !outcome.message.is_empty() {
        println!("{}", outcome.message);
    }
    println!(
        "Processed: {processed}, Successful: {successful}, Failed: {failed}",
        processed = outcome.contacts_processed,
        successful = outcome.successful_sends,
        failed = outcome.failed_sends,
    );

    for result in &outcome.results {
        let status = if result.success {
            Paint::green("Sent")
        } else {
            Paint::red("Failed")
        };
        println!("- {recipient}: {status}", recipient = result.recipient);
    }
}

async fn campaigns_send_command(console: &mut Console, matches: &ArgMatches) -> Result<()> {
    console.require_authenticated()?;

    let id = *matches.get_one::<u64>("id").unwrap();
    let campaigns = console.gateway.list_campaigns().await?;
    let Some(campaign) = campaigns.into_iter().find(|campaign| return campaign.id == id) else {
        bail!(format!("Campaign {id} not found"));
    };

    let mut orchestrator = SendOrchestrator::new(console.tx.clone());
    orchestrator.begin();

    println!(
        "Campaign: {name} [{channel}]",
        name = campaign.name,
        channel = campaign.channel
    );
    if let Some(template) = campaign.first_template() {
        println!(
            "Template: {name} ({subject})",
            name = template.name,
            subject = template.subject
        );
    }

    if !matches.get_flag("yes") {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(
                "You are about to send this campaign to all contacts in the CSV file. Continue?",
            )
            .interact()?;
        if !confirmed {
            orchestrator.dismiss();
            return Ok(());
        }
    }

    orchestrator.confirm(&console.gateway, &campaign).await;
    console.drain_notices();

    if let SendState::Completed(outcome) = orchestrator.state() {
        print_send_outcome(outcome);
    }
    orchestrator.dismiss();

    return Ok(());
}

async fn templates_create_command(console: &mut Console, matches: &ArgMatches) -> Result<()> {
    console.require_authenticated()?;

    let mut static_asset_url = "".to_string();
    if let Some(image) = matches.get_one::<String>("image") {
        let upload = console
            .gateway
            .upload_asset(path::Path::new(image))
            .await?;
        static_asset_url = upload.uploaded_at;
    }

    let draft = NewTemplate {
        name: arg(matches, "name"),
        channel: channel_arg(matches)?,
        subject: arg(matches, "subject"),
        content: TemplateContent {
            title: arg(matches, "title"),
            body: arg(matches, "body"),
            action_url: arg(matches, "action-url"),
            hero_image_alt: arg(matches, "hero-image-alt"),
            button_text: arg(matches, "button-text"),
        },
        is_html: matches.get_flag("html"),
        static_asset_url,
    };

    let template = console.gateway.create_template(&draft).await?;
    println!(
        "{}",
        Paint::green(format!("Template created with ID {id}", id = template.id))
    );

    return Ok(());
}

fn templates_preview_command(matches: &ArgMatches) -> Result<()> {
    let mut variables: HashMap<String, String> = HashMap::new();
    if let Some(pairs) = matches.get_many::<String>("var") {
        for pair in pairs {
            let Some((key, value)) = pair.split_once('=') else {
                bail!(format!("{pair} is not a valid key=value substitution"));
            };
            variables.insert(key.to_string(), value.to_string());
        }
    }

    let content = TemplateContent {
        body: arg(matches, "body"),
        ..TemplateContent::default()
    };
    println!("{}", content.render_body(&variables));

    return Ok(());
}

async fn assets_upload_command(console: &mut Console, matches: &ArgMatches) -> Result<()> {
    console.require_authenticated()?;

    let file = arg(matches, "file");
    let upload = console.gateway.upload_asset(path::Path::new(&file)).await?;
    println!("{}", upload.uploaded_at);

    return Ok(());
}

async fn config_create_command() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default().as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

pub async fn parse() -> Result<()> {
    let matches = build().get_matches();
    Config::load(&matches).await?;

    let mut console = Console::wire();
    console.manager.restore().await;

    let res = match matches.subcommand() {
        Some(("register", sub)) => register_command(&mut console, sub).await,
        Some(("login", sub)) => login_command(&mut console, sub).await,
        Some(("logout", _)) => {
            console.manager.logout().await;
            Ok(())
        }
        Some(("whoami", _)) => whoami_command(&mut console).await,
        Some(("campaigns", sub)) => match sub.subcommand() {
            Some(("list", _)) => campaigns_list_command(&mut console).await,
            Some(("create", sub)) => campaigns_create_command(&mut console, sub).await,
            Some(("delete", sub)) => campaigns_delete_command(&mut console, sub).await,
            Some(("send", sub)) => campaigns_send_command(&mut console, sub).await,
            _ => Ok(()),
        },
        Some(("templates", sub)) => match sub.subcommand() {
            Some(("create", sub)) => templates_create_command(&mut console, sub).await,
            Some(("preview", sub)) => templates_preview_command(sub),
            _ => Ok(()),
        },
        Some(("assets", sub)) => match sub.subcommand() {
            Some(("upload", sub)) => assets_upload_command(&mut console, sub).await,
            _ => Ok(()),
        },
        Some(("config", sub)) => match sub.subcommand() {
            Some(("create", _)) => config_create_command().await,
            _ => Ok(()),
        },
        _ => Ok(()),
    };

    console.drain_notices();
    return res;
}
