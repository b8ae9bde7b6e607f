//! Endermite CLI - Command-line interface for the Endermite community bot

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::Style;
use endermite_core::{
    BotConfig, Channel, DiscordChannel, EventBus, format, get_config_path, load_config,
    render_report, save_config, validate,
};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

const ENDERMITE_LOGO: &str = "⬛🟪⬛";

/// Endermite - community bot for modding servers
#[derive(Parser, Debug)]
#[command(name = "endermite")]
#[command(version)]
#[command(about = "Endermite - community Discord bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file
    Onboard {
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Start the bot
    Run {
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show endermite status
    Status {
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate a local JSON or JSON5 file
    Validate {
        /// File to validate
        file: PathBuf,
    },

    /// Print a local file the way it would be pasted
    Format {
        /// File to format
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Onboard { config } => {
            command_onboard(config).await?;
        }
        Commands::Run { config, verbose } => {
            command_run(config, verbose).await?;
        }
        Commands::Status { config } => {
            command_status(config).await?;
        }
        Commands::Validate { file } => {
            if !command_validate(&file).await? {
                std::process::exit(1);
            }
        }
        Commands::Format { file } => {
            command_format(&file).await?;
        }
    }

    Ok(())
}

fn config_path(config: Option<PathBuf>) -> PathBuf {
    config.unwrap_or_else(get_config_path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Initialize endermite configuration
async fn command_onboard(config: Option<PathBuf>) -> Result<()> {
    let green = Style::new().green();

    println!("{} {} ENDERMITE SETUP", ENDERMITE_LOGO, green.apply_to(">>>"));

    let config_path = config_path(config);

    if config_path.exists() {
        println!("\n⚠️  Config already exists at {}", config_path.display());
        println!("Leaving it untouched.");
        return Ok(());
    }

    save_config(&config_path, &BotConfig::default())
        .await
        .with_context(|| format!("failed to write {}", config_path.display()))?;

    println!("\n✅ Created config at {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Set DISCORD_TOKEN and DISCORD_CLIENT_ID, or fill in the discord section");
    println!("  2. Fill in guild, role_channel, github_channel and support_forum");
    println!("  3. Run: endermite run");

    Ok(())
}

/// Start the bot
async fn command_run(config: Option<PathBuf>, verbose: bool) -> Result<()> {
    // Setup logging
    let filter = if verbose {
        EnvFilter::builder().parse("debug")?
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config_path = config_path(config);
    let config = load_config(&config_path)
        .await
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    println!("{} Starting endermite for guild {}...", ENDERMITE_LOGO, config.guild);

    let bus = EventBus::new();
    let discord = DiscordChannel::new(config, config_path, bus)
        .context("invalid configuration")?;
    if !discord.is_enabled() {
        anyhow::bail!("{} channel has no token configured", discord.name());
    }

    tokio::select! {
        result = discord.start() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
            discord.stop().await?;
        }
    }

    Ok(())
}

/// Show configuration status
async fn command_status(config: Option<PathBuf>) -> Result<()> {
    let green = Style::new().green();

    println!("{}\nendermite Status\n", ENDERMITE_LOGO);

    let config_path = config_path(config);

    println!(
        "Config: {} {}",
        config_path.display(),
        if config_path.exists() {
            green.apply_to("✅")
        } else {
            console::style("❌").red()
        }
    );

    if !config_path.exists() {
        return Ok(());
    }

    let config = load_config(&config_path).await?;
    let id = |value: u64| {
        if value == 0 {
            console::style("not set".to_string()).dim()
        } else {
            console::style(value.to_string())
        }
    };

    println!(
        "Discord token: {}",
        if config.discord.token.is_empty() {
            console::style("not set").dim()
        } else {
            green.apply_to("✅")
        }
    );
    println!("Guild: {}", id(config.guild));
    println!("Role channel: {}", id(config.role_channel));
    println!("Role message: {}", id(config.role_message.unwrap_or(0)));
    println!("GitHub channel: {}", id(config.github_channel));
    println!("Support forum: {}", id(config.support_forum));
    println!("Reaction roles: {}", config.emote_configs.len());
    println!("Paste service: {}", config.paste.base_url);

    if let Err(e) = config.validate() {
        println!("\n{} {}", console::style("❌").red(), e);
    }

    Ok(())
}

/// Validate a local file; returns whether it is valid
async fn command_validate(file: &Path) -> Result<bool> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let name = file_name(file);

    let result = validate(&name, &content);
    println!("{}", render_report(&name, &result));

    Ok(result.is_valid())
}

/// Print the formatted file
async fn command_format(file: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    println!("{}", format(&file_name(file), &content));

    Ok(())
}
