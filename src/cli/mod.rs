pub mod api_client;
mod commands;
pub mod error;
mod utils;


use clap::{Parser, Subcommand};

use crate::cli::error::CliResult;

#[derive(Parser)]
#[command(name = "famille")]
#[command(author, version, about = "Family organizer CLI", long_about = None)]
pub struct Cli {
    /// Override the API URL (default: FAMILLE_API_URL env or http://localhost:3737)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Family schedule
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
    /// Calendar subscriptions
    Calendar {
        #[command(subcommand)]
        command: CalendarCommands,
    },
    /// Household tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Shared checklists
    List {
        #[command(subcommand)]
        command: ListCommands,
    },
}

#[derive(Subcommand)]
enum ScheduleCommands {
    /// Show a day or week with overlap and back-to-back warnings
    List {
        /// Family ID
        family_id: String,
        /// Anchor date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
        /// day or week
        #[arg(long, default_value = "day")]
        view: String,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
enum CalendarCommands {
    /// List a family's calendar subscriptions
    List {
        /// Family ID
        family_id: String,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Pull a subscription's feed now
    Sync {
        /// Subscription ID
        subscription_id: String,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List a family's tasks
    List {
        /// Family ID
        family_id: String,
        /// pending, in_progress or completed
        #[arg(long)]
        status: Option<String>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Mark a task as complete
    Complete {
        /// Task ID to complete
        id: String,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// Show a checklist
    Items {
        /// Shared list ID
        list_id: String,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check or uncheck an item
    Check {
        /// Item ID
        item_id: String,
        /// Member ticking the item
        #[arg(long)]
        member: Option<String>,
    },
}

async fn dispatch(api_client: &api_client::ApiClient, command: Commands) -> CliResult<String> {
    match command {
        Commands::Schedule { command } => match command {
            ScheduleCommands::List {
                family_id,
                date,
                view,
                format,
            } => {
                commands::schedule::list_schedule(
                    api_client,
                    &family_id,
                    date.as_deref(),
                    &view,
                    &format,
                )
                .await
            }
        },
        Commands::Calendar { command } => match command {
            CalendarCommands::List { family_id, format } => {
                commands::calendar::list_subscriptions(api_client, &family_id, &format).await
            }
            CalendarCommands::Sync { subscription_id } => {
                commands::calendar::sync_subscription(api_client, &subscription_id).await
            }
        },
        Commands::Task { command } => match command {
            TaskCommands::List {
                family_id,
                status,
                format,
            } => {
                commands::task::list_tasks(api_client, &family_id, status.as_deref(), &format)
                    .await
            }
            TaskCommands::Complete { id } => commands::task::complete_task(api_client, &id).await,
        },
        Commands::List { command } => match command {
            ListCommands::Items { list_id, format } => {
                commands::list::list_items(api_client, &list_id, &format).await
            }
            ListCommands::Check { item_id, member } => {
                commands::list::check_item(api_client, &item_id, member.as_deref()).await
            }
        },
    }
}

pub async fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    let _ = rustls::crypto::ring::default_provider().install_default();
    let api_client = api_client::ApiClient::new(cli.api_url);

    match cli.command {
        Some(command) => {
            let output = dispatch(&api_client, command).await?;
            println!("{}", output);
        }
        None => {
            // Show help when no command provided
            let _ = Cli::parse_from(["famille", "--help"]);
        }
    }

    Ok(())
}
