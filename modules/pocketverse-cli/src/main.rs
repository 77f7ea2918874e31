//! `pocketverse`: drive the simulated phone world from a terminal.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pocketverse_common::file_config::{load_config, FileConfig};
use pocketverse_common::persist::FileStore;
use pocketverse_common::AppConfig;

mod args;
mod cmd;
mod session;

use args::{PlatformArg, ShowArg, StageArg};
use session::{build_pacer, build_registry, Session};

#[derive(Parser)]
#[command(name = "pocketverse")]
#[command(about = "A pocket-sized world of AI characters: chats, feeds and events")]
#[command(version)]
struct Cli {
    /// Directory holding the saved state (overrides POCKETVERSE_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// TOML config file (overrides POCKETVERSE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a message to a character and print the reply
    Chat {
        /// Character id or name
        character: String,
        message: String,
    },

    /// Print a chat transcript
    History {
        character: String,
        /// Only the last N messages
        #[arg(short = 'n', long, default_value_t = 20)]
        last: usize,
    },

    /// Send money to a character
    Transfer { character: String, amount: f64 },

    /// Accept a transfer a character sent you
    Accept { character: String, message_id: String },

    /// Re-summarize a character's storyline now
    Storyline { character: String },

    /// Generate fresh news
    News {
        #[arg(long)]
        category: Option<String>,
    },

    /// Replace the hot-search list
    Hot,

    /// List new events you can buy tickets for
    Tickets {
        /// Preferred category (concert, movie, theater, sports, exhibition)
        #[arg(long, value_parser = args::parse_category)]
        category: Option<pocketverse_common::TicketCategory>,
    },

    /// New moments posts from the characters
    Moments,

    /// Recommended feed, character posts, then hot searches
    Weibo,

    /// Update the whole world: news, tickets, weibo, moments
    Refresh {
        /// Stop after this stage
        #[arg(long, value_enum)]
        stop_after: Option<StageArg>,
    },

    /// Publish a post as yourself
    Post {
        content: String,
        #[arg(long, value_enum, default_value_t = PlatformArg::Moments)]
        platform: PlatformArg,
    },

    /// Comment on a post; characters may reply
    Comment { post_id: String, content: String },

    /// Like or unlike a post
    Like { post_id: String },

    /// Buy a ticket from your balance
    Buy { ticket_id: String },

    /// Change world and model settings
    Set {
        #[arg(long)]
        world_description: Option<String>,
        /// In-world date, YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// Generate comments on new posts automatically
        #[arg(long)]
        interactions: Option<bool>,
        #[arg(long)]
        max_replies: Option<u32>,
        #[arg(long)]
        chat_model: Option<String>,
        #[arg(long)]
        world_model: Option<String>,
    },

    /// Print part of the saved state
    Show {
        #[arg(value_enum)]
        what: ShowArg,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("pocketverse=info".parse()?))
        .init();

    let cli = Cli::parse();

    // Load config
    let mut config = AppConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if cli.config.is_some() {
        config.config_path = cli.config;
    }
    config.log_redacted();

    let file = match &config.config_path {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };

    let store = FileStore::open(&config.data_dir)?;
    let mut session = Session::open(
        Box::new(store),
        &config,
        &file,
        Arc::new(build_registry(&file)),
        build_pacer(&file),
    )?;
    info!(data_dir = %config.data_dir.display(), "Session opened");

    match cli.command {
        Commands::Chat { character, message } => cmd::chat::send(&mut session, &character, &message).await?,
        Commands::History { character, last } => cmd::chat::history(&session, &character, last)?,
        Commands::Transfer { character, amount } => cmd::chat::transfer(&mut session, &character, amount)?,
        Commands::Accept { character, message_id } => {
            cmd::chat::accept(&mut session, &character, &message_id)?
        }
        Commands::Storyline { character } => cmd::chat::storyline(&mut session, &character).await?,
        Commands::News { category } => cmd::world::news(&mut session, category.as_deref()).await?,
        Commands::Hot => cmd::world::hot(&mut session).await?,
        Commands::Tickets { category } => cmd::world::tickets(&mut session, category).await?,
        Commands::Moments => cmd::social::moments(&mut session).await?,
        Commands::Weibo => cmd::social::weibo(&mut session).await?,
        Commands::Refresh { stop_after } => {
            cmd::world::refresh(&mut session, stop_after.map(StageArg::stage)).await?
        }
        Commands::Post { content, platform } => {
            cmd::social::post(&mut session, &content, platform.into()).await?
        }
        Commands::Comment { post_id, content } => {
            cmd::social::comment(&mut session, &post_id, &content).await?
        }
        Commands::Like { post_id } => cmd::social::like(&mut session, &post_id)?,
        Commands::Buy { ticket_id } => cmd::world::buy(&mut session, &ticket_id)?,
        Commands::Set {
            world_description,
            date,
            interactions,
            max_replies,
            chat_model,
            world_model,
        } => cmd::world::set(
            &mut session,
            cmd::world::Settings {
                world_description,
                date,
                interactions,
                max_replies,
                chat_model,
                world_model,
            },
        )?,
        Commands::Show { what } => {
            cmd::show::print(&session, what);
            return Ok(());
        }
    }

    session.save()?;
    Ok(())
}
