use std::path::PathBuf;

use anyhow::Context;
use bytes::Bytes;
use clap::{Parser, Subcommand};

use profiles::{
    accounts::{
        create_superuser, create_user, email::normalize_email, AccountStore, ExtraFields,
    },
    avatar::{avatar_url, remove_avatar, upload_avatar},
    config::AppConfig,
    state::AppState,
};

#[derive(Parser)]
#[command(name = "profiles", about = "Manage email-keyed user accounts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a regular account
    CreateUser {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        staff: bool,
    },
    /// Create an account with staff and superuser rights
    CreateSuperuser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Upload a file as the account's avatar
    SetAvatar {
        #[arg(long)]
        email: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete the account's avatar
    ClearAvatar {
        #[arg(long)]
        email: String,
    },
}

fn init_tracing() {
    let env_filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "profiles=info,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let state = AppState::init(AppConfig::from_env()?).await?;

    match cli.command {
        Command::CreateUser {
            email,
            password,
            first_name,
            last_name,
            staff,
        } => {
            let extra = ExtraFields {
                is_staff: staff.then_some(true),
                first_name,
                last_name,
                ..Default::default()
            };
            let account = create_user(&state.accounts, &email, &password, extra).await?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
        Command::CreateSuperuser { email, password } => {
            let account =
                create_superuser(&state.accounts, &email, &password, ExtraFields::default())
                    .await?;
            println!("{}", serde_json::to_string_pretty(&account)?);
        }
        Command::SetAvatar { email, file } => {
            let account = state
                .accounts
                .find_by_email(&normalize_email(&email))
                .await?
                .with_context(|| format!("no account with email {}", email))?;
            let filename = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("avatar file needs a UTF-8 file name")?
                .to_string();
            let body = tokio::fs::read(&file)
                .await
                .with_context(|| format!("read {}", file.display()))?;

            let storage = state.storage()?;
            let account =
                upload_avatar(storage, &state.accounts, account, &filename, Bytes::from(body))
                    .await?;
            if let Some(url) =
                avatar_url(storage, &account, state.config.avatar_url_ttl_secs).await?
            {
                println!("{}", url);
            }
        }
        Command::ClearAvatar { email } => {
            let account = state
                .accounts
                .find_by_email(&normalize_email(&email))
                .await?
                .with_context(|| format!("no account with email {}", email))?;
            remove_avatar(state.storage()?, &state.accounts, account).await?;
        }
    }

    Ok(())
}
