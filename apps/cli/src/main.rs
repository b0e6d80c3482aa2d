use std::{path::PathBuf, process::ExitCode};

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use client_core::{ClientError, FormField, HttpControlsApi, Outcome, TableSyncClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod prompt;
mod shell;
mod view;

use prompt::TerminalPrompt;
use view::render_table;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8443";

#[derive(Parser, Debug)]
#[command(name = "controls", about = "Security control inventory client")]
struct Cli {
    /// API root; `/items` is appended.
    #[arg(long, env = "CONTROLS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// Directory receiving CSV exports.
    #[arg(long, default_value = ".")]
    download_dir: PathBuf,
    /// Answer yes to every confirmation.
    #[arg(short, long)]
    yes: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the table.
    List,
    Show {
        main_id: String,
    },
    Add {
        main_id: String,
        description: String,
        domain: String,
        scope: String,
    },
    /// Edit an existing control; omitted fields keep their value.
    Update {
        main_id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        scope: Option<String>,
    },
    Delete {
        main_id: String,
    },
    /// Fetch the table and write it as CSV.
    Export,
    /// Interactive session (default).
    Shell,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if needs_report(&error) {
                eprintln!("error: {error:#}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Client errors already shown through the prompt are not printed again.
fn needs_report(error: &anyhow::Error) -> bool {
    !error
        .downcast_ref::<ClientError>()
        .is_some_and(shell::is_alerted)
}

async fn run(cli: Cli) -> Result<()> {
    let api = HttpControlsApi::new(&cli.api_url)?;
    info!(api_url = %api.base_url(), "using controls API");
    let mut client =
        TableSyncClient::new(api, TerminalPrompt::new(cli.yes)).with_download_dir(cli.download_dir);

    match cli.command.unwrap_or(Command::Shell) {
        Command::List => {
            client.fetch_and_render().await?;
            print!("{}", render_table(&client.table()));
        }
        Command::Show { main_id } => match client.fetch_control(&main_id).await? {
            Some(control) => println!(
                "{}\t{}\t{}\t{}",
                control.main_id, control.main_description, control.domain, control.scope
            ),
            None => bail!("no control with mainID {main_id}"),
        },
        Command::Add {
            main_id,
            description,
            domain,
            scope,
        } => {
            let values = [main_id, description, domain, scope];
            for (field, value) in FormField::ALL.into_iter().zip(values) {
                client.form_mut().set(field, value)?;
            }
            client.create().await?;
        }
        Command::Update {
            main_id,
            description,
            domain,
            scope,
        } => {
            if client.enter_edit(&main_id).await? == Outcome::Declined {
                println!("update cancelled");
                return Ok(());
            }
            let changes = [
                (FormField::MainDescription, description),
                (FormField::Domain, domain),
                (FormField::Scope, scope),
            ];
            for (field, value) in changes {
                if let Some(value) = value {
                    client.form_mut().set(field, value)?;
                }
            }
            client.submit_edit().await?;
        }
        Command::Delete { main_id } => {
            if client.delete(&main_id).await? == Outcome::Declined {
                println!("delete cancelled");
            }
        }
        Command::Export => {
            client.fetch_and_render().await?;
            let path = client.export_csv()?;
            println!("exported {}", path.display());
        }
        Command::Shell => shell::run(&mut client).await?,
    }

    Ok(())
}
