use std::error::Error;

use clap::{Args, Parser, Subcommand};
use engine::{Engine, Page};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tally_admin")]
#[command(about = "Admin utilities for Tally (bootstrap groups, inspect ledgers)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./tally.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply pending migrations and exit.
    Migrate,
    Group(Group),
    Member(Member),
    /// Print the net balance of every member of a group.
    Balances(GroupArgs),
    /// Print the most recent expenses of a group.
    Expenses(GroupArgs),
}

#[derive(Args, Debug)]
struct Group {
    #[command(subcommand)]
    command: GroupCommand,
}

#[derive(Subcommand, Debug)]
enum GroupCommand {
    Create(GroupCreateArgs),
}

#[derive(Args, Debug)]
struct GroupCreateArgs {
    #[arg(long)]
    owner: Uuid,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct Member {
    #[command(subcommand)]
    command: MemberCommand,
}

#[derive(Subcommand, Debug)]
enum MemberCommand {
    Add(MemberAddArgs),
}

#[derive(Args, Debug)]
struct MemberAddArgs {
    #[arg(long)]
    group: Uuid,
    /// Existing member performing the operation.
    #[arg(long)]
    actor: Uuid,
    #[arg(long)]
    user: Uuid,
}

#[derive(Args, Debug)]
struct GroupArgs {
    #[arg(long)]
    group: Uuid,
    /// Member on whose behalf the ledger is read.
    #[arg(long)]
    actor: Uuid,
}

async fn connect_db(database_url: &str) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::Migrate => println!("database is up to date"),
        Command::Group(Group {
            command: GroupCommand::Create(args),
        }) => {
            let group = engine.create_group(&args.name, args.owner).await?;
            println!("created group: {} ({})", group.name, group.id);
        }
        Command::Member(Member {
            command: MemberCommand::Add(args),
        }) => {
            let member = engine.add_member(args.group, args.actor, args.user).await?;
            println!("added member: {} to {}", member.user_id, args.group);
        }
        Command::Balances(args) => {
            for balance in engine.balances(args.group, args.actor).await? {
                println!("{}\t{:>12}", balance.user_id, balance.amount.to_string());
            }
        }
        Command::Expenses(args) => {
            let listed = engine
                .list_expenses(args.group, args.actor, Page::default())
                .await?;
            for expense in &listed.items {
                println!(
                    "{}\t{}\t{:>12}\tpaid by {}\t{}",
                    expense.created_at.format("%Y-%m-%d %H:%M"),
                    expense.id,
                    expense.total_amount.to_string(),
                    expense.paid_by,
                    expense.description
                );
            }
            println!("{} of {} expenses", listed.items.len(), listed.total);
        }
    }

    Ok(())
}
