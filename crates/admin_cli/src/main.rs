use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::Engine;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "pocketbook_admin")]
#[command(about = "Admin utilities for Pocketbook (bootstrap users, repair balances)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./pocketbook.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Wallet(Wallet),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
    /// Also read from `POCKETBOOK_PASSWORD`.
    #[arg(long, env = "POCKETBOOK_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct Wallet {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    /// Rebuilds the stored balance from the wallet's transactions.
    Recalculate(WalletRecalculateArgs),
}

#[derive(Args, Debug)]
struct WalletRecalculateArgs {
    #[arg(long)]
    user: String,
    /// Wallet id. Every wallet of the user when omitted.
    #[arg(long)]
    wallet: Option<Uuid>,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter("pocketbook_admin=info,engine=warn")
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            engine.create_user(&args.username, &args.password).await?;
            println!("created user: {}", args.username);
        }
        Command::Wallet(Wallet {
            command: WalletCommand::Recalculate(args),
        }) => {
            let wallet_ids = match args.wallet {
                Some(id) => vec![id],
                None => engine
                    .list_wallets(&args.user)
                    .await?
                    .into_iter()
                    .map(|wallet| wallet.id)
                    .collect(),
            };

            for wallet_id in wallet_ids {
                let outcome = engine.recompute_wallet_balance(&args.user, wallet_id).await?;
                if outcome.corrected() {
                    println!(
                        "{wallet_id}: corrected {} -> {}",
                        outcome.old_balance, outcome.new_balance
                    );
                } else {
                    println!("{wallet_id}: balance {} is consistent", outcome.new_balance);
                }
            }
        }
    }

    Ok(())
}
