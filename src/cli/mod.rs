//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod assistant_list;
pub mod chat;
pub mod conversation;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::api::client::{Credentials, DustClient};
use crate::core::config::data::path_display;
use crate::core::config::{Config, ConfigKey, Overrides, Settings};
use crate::logging::init_logging;

#[derive(Parser)]
#[command(name = "dust-cli")]
#[command(about = "Talk to Dust assistants from the terminal")]
#[command(
    long_about = "dust-cli talks to the Dust assistant API: list the assistants of a workspace, \
create conversations, post messages, and chat interactively with streamed replies.\n\n\
Credentials (first match wins):\n\
  --api-key / --workspace-id flags\n\
  DUST_API_KEY / DUST_WORKSPACE_ID environment variables\n\
  'dust-cli config set api-key <key>' and 'dust-cli config set workspace-id <id>'\n\n\
Environment Variables:\n\
  DUST_CLI_DEV          Talk to a local server at http://localhost:3000\n\
  DUST_CLI_CONFIG_DIR   Directory holding config.toml\n\
  RUST_LOG              Override diagnostic log filtering"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace API key
    #[arg(short = 'k', long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Workspace sId
    #[arg(short = 'w', long, global = true, value_name = "WORKSPACE")]
    pub workspace_id: Option<String>,

    /// Log request and stream diagnostics to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Use the local development server
    #[arg(long, global = true)]
    pub dev: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chat with an assistant interactively
    Chat {
        /// Assistant sId; chosen from a list when omitted
        #[arg(short = 'a', long)]
        assistant: Option<String>,
        /// Append the conversation to a transcript file
        #[arg(short = 'l', long, value_name = "FILE")]
        log: Option<PathBuf>,
    },
    /// Create a conversation whose first message mentions an assistant
    CreateConversation {
        #[arg(short = 'm', long)]
        message: String,
        #[arg(short = 'u', long)]
        user: String,
        #[arg(short = 'a', long)]
        assistant: Option<String>,
    },
    /// Post a message to an existing conversation
    CreateMessage {
        #[arg(short = 'm', long)]
        message: String,
        #[arg(short = 'u', long)]
        user: String,
        #[arg(short = 'c', long)]
        conversation: String,
        #[arg(short = 'a', long)]
        assistant: Option<String>,
    },
    /// Fetch a conversation by sId
    GetConversation {
        #[arg(short = 'c', long)]
        conversation: String,
    },
    /// List the assistants available in the workspace
    ListAssistants,
    /// Print version information
    Version,
    /// Show or edit the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the stored configuration
    Show,
    /// Set a configuration value
    Set {
        /// One of: api-key, workspace-id, default-assistant, dev, request-timeout, stream-timeout
        key: String,
        value: String,
    },
    /// Remove a configuration value
    Unset { key: String },
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_key: self.api_key.clone(),
            workspace_id: self.workspace_id.clone(),
            dev: self.dev,
        }
    }
}

/// Everything an API command needs, resolved once per invocation.
pub struct Session {
    pub client: DustClient,
    pub credentials: Credentials,
    pub default_assistant: Option<String>,
}

impl Session {
    pub fn from_settings(settings: &Settings) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            client: settings.client()?,
            credentials: settings.credentials()?,
            default_assistant: settings.default_assistant.clone(),
        })
    }

    /// The explicit choice, else the configured default, else `fallback`.
    pub fn assistant_or(&self, explicit: Option<String>, fallback: &str) -> String {
        explicit
            .or_else(|| self.default_assistant.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

pub fn version_string() -> String {
    format!(
        "dust-cli {} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE"),
        env!("VERGEN_BUILD_DATE")
    )
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async_main(args));
    // A pending stdin read must not keep the process alive.
    runtime.shutdown_background();
    result
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let overrides = args.overrides();

    match args.command {
        Commands::Version => {
            println!("{}", version_string());
            Ok(())
        }
        Commands::Config { command } => run_config_command(command),
        command => {
            let config = Config::load()?;
            let settings = Settings::resolve(&config, &overrides);
            let session = Session::from_settings(&settings)?;
            run_api_command(command, &session).await
        }
    }
}

async fn run_api_command(command: Commands, session: &Session) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Chat { assistant, log } => chat::run_chat(session, assistant, log).await,
        Commands::CreateConversation {
            message,
            user,
            assistant,
        } => conversation::create_conversation(session, &message, &user, assistant).await,
        Commands::CreateMessage {
            message,
            user,
            conversation,
            assistant,
        } => {
            conversation::create_message(session, &message, &user, &conversation, assistant).await
        }
        Commands::GetConversation { conversation } => {
            conversation::get_conversation(session, &conversation).await
        }
        Commands::ListAssistants => assistant_list::list_assistants(session).await,
        Commands::Version | Commands::Config { .. } => Ok(()),
    }
}

fn run_config_command(command: ConfigCommands) -> Result<(), Box<dyn Error>> {
    let path = Config::config_path()?;
    let mut config = Config::load_from_path(&path)?;

    match command {
        ConfigCommands::Show => {
            config.print_all();
            println!("  (from {})", path_display(&path));
        }
        ConfigCommands::Set { key, value } => {
            let key: ConfigKey = key.parse()?;
            config.set(key, &value)?;
            config.save_to_path(&path)?;
            println!("✅ Set {key}");
        }
        ConfigCommands::Unset { key } => {
            let key: ConfigKey = key.parse()?;
            config.unset(key);
            config.save_to_path(&path)?;
            println!("✅ Unset {key}");
        }
    }
    Ok(())
}
