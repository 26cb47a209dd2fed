//! Standalone validator for promotion configuration files.
//!
//! Checks the channel id, admin title and every bot token, and can
//! optionally look each token up through the Bot API without promoting.

use std::process::ExitCode;

use clap::Parser;

use bot_promoter::bot_api::{BotDirectory, BotResolver};
use bot_promoter::config::{MAX_RANK_LENGTH, PromotionConfig, mask_token};

/// Promotion configuration validator.
#[derive(Parser, Debug)]
#[command(name = "validate_tokens")]
#[command(about = "Validates bot promoter configuration files")]
#[command(version)]
struct Args {
    /// Path to the JSON configuration file to validate.
    #[arg(short, long, default_value = "promote.json")]
    file: String,

    /// Look every valid token up with getMe and report its username.
    #[arg(short, long)]
    resolve: bool,

    /// Generate an example configuration file at the specified path.
    #[arg(long)]
    generate_example: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(output_path) = args.generate_example {
        return generate_example(&output_path);
    }

    validate_config(&args.file, args.resolve).await
}

fn generate_example(output_path: &str) -> ExitCode {
    let example = PromotionConfig::example();

    match example.save_to_file(output_path) {
        Ok(()) => {
            println!("✓ Example configuration written to: {output_path}");
            println!("\nThe file lists {} example bot tokens.", example.len());
            println!("Replace channel_id and bot_tokens with your own values.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Failed to write example file: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn validate_config(path: &str, resolve: bool) -> ExitCode {
    println!("Validating: {path}\n");

    let config = match PromotionConfig::load_from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("✗ Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut errors = 0;

    match config.validate_target() {
        Ok(()) => {
            println!(
                "Channel: {} (MTProto id {})",
                config.channel_id,
                config.bare_channel_id().unwrap_or_default()
            );
            println!("Admin title: \"{}\" (max {MAX_RANK_LENGTH} chars)\n", config.rank);
        }
        Err(e) => {
            errors += 1;
            println!("✗ Error: {e}\n");
        }
    }

    if config.is_empty() {
        println!("✗ No bot tokens configured");
        return ExitCode::FAILURE;
    }

    let resolver = if resolve {
        match BotResolver::from_config(&config) {
            Ok(resolver) => Some(resolver),
            Err(e) => {
                eprintln!("✗ Failed to create Bot API client: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        None
    };

    let total = config.len();
    let mut unresolved = 0;

    for (i, (token, result)) in config
        .bot_tokens
        .iter()
        .zip(config.validate_all())
        .enumerate()
    {
        println!("[{}/{total}] {}", i + 1, mask_token(token.trim()));

        if let Err(e) = result {
            errors += 1;
            println!("  ✗ Error: {e}");
            continue;
        }

        match &resolver {
            Some(resolver) => match resolver.username(token.trim()).await {
                Ok(username) => println!("  ✓ @{username}"),
                Err(e) => {
                    unresolved += 1;
                    println!("  ✗ Lookup failed: {e}");
                }
            },
            None => println!("  ✓ OK"),
        }
    }

    println!();

    if errors == 0 && unresolved == 0 {
        println!("✓ All {total} bot tokens are valid!");
        ExitCode::SUCCESS
    } else {
        if errors > 0 {
            println!("✗ Validation failed: {errors} error(s)");
        }
        if unresolved > 0 {
            println!("✗ {unresolved} of {total} token(s) could not be resolved");
        }
        ExitCode::FAILURE
    }
}
