use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use access_core::domain::{AccessSubmission, CreateFeatureInput, CreateMenuInput};
use access_infrastructure::{create_pool, run_migrations};
use access_shared::config::AppConfig;

mod state;

use state::AppState;

#[derive(Parser, Debug)]
#[command(
    name = "access-cli",
    version,
    about = "Menu and feature access control administration"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending database migrations
    Migrate,

    /// Paginated menu tree with every feature
    Menus {
        /// 1-based page number
        #[arg(long)]
        page: Option<u32>,

        /// Menus per page, counted over the flat listing before the tree is built
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Single menu by id
    Menu { id: Uuid },

    /// Create a menu from a JSON file
    CreateMenu {
        #[arg(long)]
        actor: Uuid,

        #[arg(long)]
        file: PathBuf,
    },

    /// Create a feature from a JSON file
    CreateFeature {
        #[arg(long)]
        actor: Uuid,

        #[arg(long)]
        file: PathBuf,
    },

    /// Full menu tree annotated with a role's grants
    AccessTree {
        #[arg(long)]
        role: Uuid,
    },

    /// Only the menus and features a role may reach
    Navigation {
        #[arg(long)]
        role: Uuid,
    },

    /// Replace a role's grants with a submitted access tree
    Assign {
        #[arg(long)]
        role: Uuid,

        #[arg(long)]
        actor: Uuid,

        /// JSON access submission
        #[arg(long)]
        file: PathBuf,
    },

    /// Delete a menu together with its whole subtree
    DeleteMenu {
        id: Uuid,

        #[arg(long)]
        actor: Uuid,
    },

    /// Drop every grant a role holds
    Revoke {
        #[arg(long)]
        role: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize telemetry; keep the guard alive until exit
    let _guard = access_shared::telemetry::init_telemetry(&config.log)?;

    info!("Connecting to database...");
    let pool = create_pool(&config.database).await?;
    let state = AppState::new(pool, &config);

    if let Err(e) = run(&state, args.command).await {
        error!("Command failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Migrate => {
            run_migrations(&state.db).await?;
            print_json(&serde_json::json!({ "migrated": true }))
        }
        Command::Menus { page, limit } => print_json(&state.menus.get_menus(page, limit).await?),
        Command::Menu { id } => print_json(&state.menus.get_menu_by_id(&id).await?),
        Command::CreateMenu { actor, file } => {
            let input: CreateMenuInput = read_json(&file)?;
            let id = state.menus.create_menu(input, actor).await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        Command::CreateFeature { actor, file } => {
            let input: CreateFeatureInput = read_json(&file)?;
            let id = state.features.create_feature(input, actor).await?;
            print_json(&serde_json::json!({ "id": id }))
        }
        Command::AccessTree { role } => print_json(&state.access.get_access_tree_for_role(&role).await?),
        Command::Navigation { role } => print_json(&state.access.get_accessible_menus(&role).await?),
        Command::Assign { role, actor, file } => {
            let submission: AccessSubmission = read_json(&file)?;
            print_json(&state.access.assign_bulk_access(&role, &submission, actor).await?)
        }
        Command::DeleteMenu { id, actor } => print_json(&state.menus.delete_menu(&id, actor).await?),
        Command::Revoke { role } => print_json(&state.access.revoke_role_access(&role).await?),
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
