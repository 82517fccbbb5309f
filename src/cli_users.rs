//! Account and token administration for the wrapped database.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::UNIX_EPOCH;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wrapped_server::store::{AuthToken, AuthTokenStore, SqliteWrapStore, UserStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the wrapped.db SQLite database.
    #[clap(value_parser = parse_path)]
    pub db_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Creates a user with the given handle and first name.
    AddUser { handle: String, first_name: String },

    /// Issues a new session token for the given user and prints it.
    IssueToken { handle: String },

    /// Shows all users.
    ListUsers,

    /// Deletes a user together with their wraps and invitations.
    DeleteUser { handle: String },
}

fn find_user_id(store: &SqliteWrapStore, handle: &str) -> Result<usize> {
    store
        .get_user_id(handle)?
        .with_context(|| format!("User {} not found", handle))
}

fn execute(store: &SqliteWrapStore, command: Command) -> Result<()> {
    match command {
        Command::AddUser { handle, first_name } => {
            if handle.trim().is_empty() {
                bail!("The handle cannot be empty");
            }
            let id = store.create_user(&handle, &first_name)?;
            println!("Created user {} with id {}", handle, id);
        }
        Command::IssueToken { handle } => {
            let user_id = find_user_id(store, &handle)?;
            let token = AuthToken::new(user_id);
            store.add_auth_token(&token)?;
            println!("{}", token.value.0);
        }
        Command::ListUsers => {
            let users = store.get_all_users()?;
            if users.is_empty() {
                println!("No users.");
            }
            for user in users {
                let created = user
                    .created
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default();
                println!(
                    "{:>5}  {:<24} {:<24} {}",
                    user.id, user.handle, user.first_name, created
                );
            }
        }
        Command::DeleteUser { handle } => {
            let user_id = find_user_id(store, &handle)?;
            if !store.delete_user(user_id)? {
                bail!("User {} not found", handle);
            }
            println!("Deleted user {}", handle);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;
    if !cli_args.db_dir.is_dir() {
        bail!("Database directory does not exist: {:?}", cli_args.db_dir);
    }
    let store = SqliteWrapStore::new(cli_args.db_dir.join("wrapped.db"))?;
    execute(&store, cli_args.command)
}
