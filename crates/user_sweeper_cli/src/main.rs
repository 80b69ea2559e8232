use std::{io, path::PathBuf};

use clap::Parser;
use colored::Colorize;
use jira_client::JiraClient;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use user_sweeper_cli::{
    config::{AppConfig, CliOverrides, Settings},
    credentials::{offer_to_store_token, resolve_credentials, KeyringTokenStore},
    errors::Error,
    terminal::{read_menu_choice, TerminalOperator},
    workflow::{Session, SessionEnd, Workflow},
};

/// Environment variable holding the log filter, e.g. `user_sweeper_cli=debug`.
const LOG_FILTER_ENV: &str = "USER_SWEEPER_LOG";

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// User sweeper: find non-active Jira Cloud users, review them and delete them
#[derive(Parser, Debug)]
#[command(name = "user-sweeper")]
#[command(about = "Find, review and delete non-active Jira Cloud users", long_about = None)]
struct Cli {
    /// Configuration file (default: user-sweeper.toml in the working directory, if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Jira site name, e.g. `mycompany` for https://mycompany.atlassian.net
    #[arg(long, value_name = "NAME")]
    domain: Option<String>,

    /// Where the review snapshot is written
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Number of users requested per page (1-1000)
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,

    /// Keep accounts the service already reports as deleted
    #[arg(long)]
    include_former: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            domain: self.domain.clone(),
            snapshot_path: self.snapshot.clone(),
            page_size: self.page_size,
            include_former_accounts: self.include_former,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli).await {
        error!("{}", e);
        eprintln!("{} {}", "✗".red(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), Error> {
    let file = AppConfig::load_optional(cli.config.as_deref())?;
    let settings = Settings::from_process_env(file, cli.overrides())?;

    let terminal = TerminalOperator;
    let token_store = KeyringTokenStore;
    let mut force_prompt = false;

    loop {
        let resolved = resolve_credentials(&settings, &terminal, &token_store, force_prompt)?;
        let client = JiraClient::new(settings.base_url.clone(), resolved.credentials.clone())?;
        let session = Session::connect(client, settings.clone()).await?;

        println!(
            "{} Connected to {} as {}",
            "✓".green(),
            settings.base_url,
            session.current_user().display_name.bold()
        );
        offer_to_store_token(&resolved, &terminal, &token_store)?;

        let workflow = Workflow::new(session, terminal);
        let mut read_choice = read_menu_choice;
        match workflow.run(&mut read_choice, &mut io::stdout()).await? {
            SessionEnd::Exit => {
                info!("Session ended");
                return Ok(());
            }
            SessionEnd::Reauthenticate => {
                info!("Re-entering credentials");
                force_prompt = true;
            }
        }
    }
}
