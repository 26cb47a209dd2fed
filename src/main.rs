//! Bot Promoter - Main Entry Point
//!
//! Promotes a list of bots to administrators of a channel or supergroup
//! using the operator's own Telegram account.

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Input, Password};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use bot_promoter::bot_api::BotResolver;
use bot_promoter::config::{PromotionConfig, TelegramConfig};
use bot_promoter::promoter::Promoter;
use bot_promoter::telegram::{AdminSession, TelegramError, TelegramSession};

/// Promote bots to channel administrators using a user session.
#[derive(Parser, Debug)]
#[command(name = "bot_promoter")]
#[command(about = "Grant admin rights in a Telegram channel to a list of bots")]
#[command(version)]
struct Args {
    /// Path to the promotion JSON configuration file.
    #[arg(short, long, default_value = "promote.json")]
    config: String,

    /// Path to the .env file for environment variables.
    #[arg(long, default_value = ".env")]
    env_file: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Target channel id, overriding the configuration file.
    #[arg(long, allow_hyphen_values = true)]
    channel_id: Option<i64>,

    /// Generate an example configuration file and exit.
    #[arg(long)]
    generate_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    if args.generate_config {
        return generate_example_config();
    }

    if let Err(e) = dotenvy::from_filename(&args.env_file) {
        debug!("Could not load .env file ({}): {}", args.env_file, e);
    }

    let tg_config = TelegramConfig::from_env()
        .context("Failed to load Telegram configuration from environment")?;

    let mut promotion = PromotionConfig::load_from_file(&args.config)
        .context("Failed to load promotion configuration")?;

    if let Some(channel_id) = args.channel_id {
        promotion.channel_id = channel_id;
    }

    promotion
        .validate_target()
        .context("Promotion configuration validation failed")?;

    let channel_id = promotion
        .bare_channel_id()
        .context("Channel id has no MTProto form")?;

    // Bad tokens still go through the run and are counted as failures there.
    for problem in promotion.token_problems() {
        warn!("{}", problem);
    }

    info!(
        "Loaded {} bot token(s) for channel {}",
        promotion.len(),
        promotion.channel_id
    );

    let resolver =
        BotResolver::from_config(&promotion).context("Failed to create Bot API client")?;

    println!("Promoting bots to admin using user session...\n");

    let session = TelegramSession::connect(&tg_config)
        .await
        .context("Failed to connect to Telegram")?;

    // From here on the session must be torn down on every path.
    if let Err(e) = ensure_signed_in(&session, &tg_config).await {
        session.disconnect();
        return Err(e);
    }

    let tally = Promoter::from_config(resolver, session, &promotion)
        .run(channel_id, &promotion.bot_tokens)
        .await
        .context("Promotion run aborted")?;

    debug!("Final tally: {:?}", tally);
    println!("\nDone!");

    Ok(())
}

/// Initializes the logging subsystem.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Generates an example configuration file.
fn generate_example_config() -> Result<()> {
    let example = PromotionConfig::example();
    example.save_to_file("promote.example.json")?;

    println!("✓ Example configuration written to: promote.example.json");
    println!("\nTo use this tool:");
    println!("1. Copy promote.example.json to promote.json");
    println!("2. Set channel_id and list your bot tokens");
    println!("3. Create a .env file with TG_API_ID, TG_API_HASH and optionally TG_PHONE");
    println!("4. Run: bot_promoter");

    Ok(())
}

/// Signs in interactively unless the session file already holds a login.
async fn ensure_signed_in(session: &TelegramSession, config: &TelegramConfig) -> Result<()> {
    if session
        .is_authorized()
        .await
        .context("Failed to check authorization")?
    {
        return Ok(());
    }

    authenticate(session, config).await
}

/// Handles Telegram authentication.
async fn authenticate(session: &TelegramSession, config: &TelegramConfig) -> Result<()> {
    info!("Authentication required");

    let phone: String = match &config.phone {
        Some(phone) => phone.clone(),
        None => Input::new()
            .with_prompt("Enter your phone number (with country code)")
            .interact_text()?,
    };

    let token = session
        .request_login_code(&phone, &config.api_hash)
        .await
        .context("Failed to request login code")?;

    info!("Login code sent to your Telegram app");

    let code: String = Input::new()
        .with_prompt("Enter the login code")
        .interact_text()?;

    match session.sign_in(&token, &code).await {
        Ok(()) => {
            info!("Successfully signed in!");
            Ok(())
        }
        Err(TelegramError::PasswordRequired(password_token)) => {
            info!("Two-factor authentication is enabled");

            let hint = password_token.hint().unwrap_or("no hint");
            info!("Password hint: {}", hint);

            let password: String = Password::new()
                .with_prompt("Enter your 2FA password")
                .interact()?;

            session
                .check_password(password_token, &password)
                .await
                .context("2FA authentication failed")?;

            info!("Successfully signed in with 2FA!");
            Ok(())
        }
        Err(e) => Err(e).context("Authentication failed"),
    }
}
