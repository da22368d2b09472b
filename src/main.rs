//! messaging-demo CLI entry point.
//!
//! `run` opens the conversation screen against the simulated provider and
//! reads console commands; `check-config` validates configuration.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use messaging_demo::config::Config;
use messaging_demo::demo::{help_text, DemoCommand};
use messaging_demo::logging;
use messaging_demo::messaging::Messaging;
use messaging_demo::provider::simulated::SimulatedProvider;
use messaging_demo::provider::MessagingProvider;
use messaging_demo::screen::console::ConsoleView;
use messaging_demo::screen::ConversationScreen;

/// Console level used until the configured logging is in place.
const BOOTSTRAP_LOG_LEVEL: &str = "info";

/// Single-screen customer-messaging demo.
#[derive(Parser)]
#[command(name = "messaging-demo", version, about)]
struct Cli {
    /// Path to config.toml (defaults to ~/.messaging-demo/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Command {
    /// Open the conversation screen and read commands from stdin.
    Run {
        /// Override the brand identifier.
        #[arg(long)]
        brand_id: Option<String>,
        /// Start with a conversation already open.
        #[arg(long)]
        already_active: bool,
        /// Make provider initialisation fail.
        #[arg(long)]
        fail_init: bool,
    },
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            brand_id,
            already_active,
            fail_init,
        } => {
            // The configured subscriber depends on the config being loaded.
            let config = logging::with_console_logging(BOOTSTRAP_LOG_LEVEL, || {
                Config::load(cli.config.as_deref())
            })
            .context("failed to load configuration")?;
            handle_run(config, brand_id, already_active, fail_init).await
        }
        Command::CheckConfig => {
            logging::init_cli(BOOTSTRAP_LOG_LEVEL);
            let config =
                Config::load(cli.config.as_deref()).context("failed to load configuration")?;
            handle_check_config(&config)
        }
    }
}

/// Open the screen and pump stdin commands into it until it closes.
async fn handle_run(
    mut config: Config,
    brand_id: Option<String>,
    already_active: bool,
    fail_init: bool,
) -> anyhow::Result<()> {
    let _logging_guard = match &config.logging.logs_dir {
        Some(dir) => Some(logging::init_production(dir, &config.logging.level)?),
        None => {
            logging::init_cli(&config.logging.level);
            None
        }
    };

    if let Some(brand_id) = brand_id {
        config.messaging.brand_id = brand_id;
    }
    config.simulation.already_active |= already_active;
    config.simulation.fail_initialization |= fail_init;
    config.validate()?;

    let provider = Arc::new(build_provider(&config)?);
    let messaging = Arc::new(Messaging::new(
        Arc::clone(&provider) as Arc<dyn MessagingProvider>,
        config.messaging.settings(),
    ));

    let mut screen = ConversationScreen::new(
        messaging,
        ConsoleView::new(std::io::stdout()),
        config.messaging.brand_id.clone(),
        config.messaging.application_id.clone(),
    );
    screen.on_create();
    println!("{}", help_text());

    // Dedicated thread: a blocking stdin read must not hold up runtime shutdown.
    let input = screen.input();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    break;
                }
            };
            let Some(command) = DemoCommand::parse(&line) else {
                continue;
            };
            match &command {
                DemoCommand::Help => println!("{}", help_text()),
                DemoCommand::Unknown(text) => println!("unknown command: {text}"),
                _ => {}
            }
            if !command.apply(&provider, &input) {
                return;
            }
        }
        input.back();
    });

    let exit = screen.run().await;
    screen.on_destroy();
    info!(?exit, "screen closed");
    Ok(())
}

/// Print the effective configuration.
fn handle_check_config(config: &Config) -> anyhow::Result<()> {
    let settings = config.messaging.settings();
    println!("brand_id: {}", config.messaging.brand_id);
    println!("application_id: {}", config.messaging.application_id);
    println!("installation_id: {}", settings.installation_id);
    println!("sdk_log_level: {:?}", settings.sdk_log_level());
    println!("close_reason: {:?}", config.simulation.close_reason()?);
    println!("config OK");
    Ok(())
}

fn build_provider(config: &Config) -> anyhow::Result<SimulatedProvider> {
    let mut provider = SimulatedProvider::new();
    if config.simulation.already_active {
        provider = provider.with_active_conversation();
    }
    if config.simulation.fail_initialization {
        provider = provider.with_init_failure("simulated initialization failure");
    }
    if let Some(reason) = config.simulation.close_reason()? {
        provider = provider.with_close_reason(reason);
    }
    Ok(provider)
}
