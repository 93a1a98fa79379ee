use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;

use stockroom::app::App;
use stockroom::config::Config;
use stockroom::logging::init_tracing;
use stockroom::persist::FileStorage;
use stockroom::slices::{User, UserIntent, UserReducer};

#[derive(Debug, Parser)]
#[command(
    name = "stockroom",
    version,
    about = "Inspect and update the persisted dashboard session"
)]
struct Cli {
    /// Config file (default: ~/.config/stockroom/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign a user in and persist the session
    Login {
        #[arg(long)]
        id: String,
        #[arg(long)]
        role: String,
        #[arg(long)]
        token: Option<String>,
    },
    /// Update fields of the signed-in user
    Update {
        #[arg(long = "field", value_name = "KEY=VALUE", value_parser = parse_field, required = true)]
        fields: Vec<(String, Value)>,
    },
    /// Sign out
    Logout,
    /// Print the persisted user
    Show,
    /// Delete the stored snapshot
    Purge,
}

/// `KEY=VALUE`; the value is JSON if it parses as JSON, a string otherwise.
fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    if key.is_empty() {
        return Err("field name must not be empty".to_string());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load configuration")?;

    let storage = FileStorage::new(config.persist.storage_dir());
    let app = App::start(&config.persist, Arc::new(storage)).await?;
    let errors = app
        .persistor
        .take_errors()
        .context("Persistence error channel already taken")?;
    app.drain_startup_errors(&errors);

    match cli.command {
        Command::Login { id, role, token } => {
            let mut user = User::new(id, role);
            user.token = token;
            app.store.dispatch(UserIntent::Login(user))?;
        }
        Command::Update { fields } => {
            app.store
                .dispatch(UserIntent::Update(fields.into_iter().collect()))?;
        }
        Command::Logout => app.store.dispatch(UserIntent::Logout)?,
        Command::Show => {}
        Command::Purge => app.persistor.purge()?,
    }

    app.commit(&errors).context("Failed to persist session")?;

    let user = app.store.select::<UserReducer>();
    println!("{}", serde_json::to_string_pretty(&*user)?);
    Ok(())
}
