// src/main.rs
use clap::{CommandFactory, Parser};
use crtx::cli::Cli;
use crtx::config::Config;
use crtx::crtsh::CrtShClient;
use crtx::input;
use crtx::output::HostnameWriter;
use crtx::progress::ProgressIndicator;
use crtx::search::{self, Dispatcher, PlanError, RecursiveSearch, SearchPlan};
use std::path::Path;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Validate arguments
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    // Load config file
    let config = Config::load(cli.config.as_deref().map(Path::new))?;

    // Initialize logging; stdout is reserved for hostnames
    let log_level = cli.log_level().unwrap_or(config.logging.level.as_str());
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let stderr_is_terminal = is_terminal::is_terminal(std::io::stderr());
    if !stderr_is_terminal {
        colored::control::set_override(false);
    }

    let blocklist = Arc::new(
        config
            .blocklist
            .build(cli.blocklist_file.as_deref().map(Path::new)),
    );
    tracing::debug!("Blocklist has {} suffixes", blocklist.len());

    tracing::debug!("Gathering input domains...");
    let domains = input::gather_domains(cli.domains.clone())?;
    tracing::debug!("Found {} input domains", domains.len());

    let plan = match SearchPlan::resolve(domains, cli.org.clone(), cli.recursive) {
        Ok(plan) => plan,
        Err(PlanError::NoInput) => {
            eprintln!("{}", Cli::command().render_help());
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let client = CrtShClient::new(config.search.fetch_settings())?;
    let concurrency = cli.concurrency.unwrap_or(config.search.concurrency);

    let progress = ProgressIndicator::new(!cli.no_progress && stderr_is_terminal);
    let dispatcher = Dispatcher::new(Arc::new(client), concurrency).with_progress(progress.clone());
    let mut output = HostnameWriter::stdout(progress.clone());

    let found = match plan {
        SearchPlan::Recursive(ref domains) => {
            RecursiveSearch::new(dispatcher, blocklist)
                .run(domains, &mut output)
                .await?
        }
        SearchPlan::Organization(ref org) => {
            tracing::info!("Searching for organization: {}", org);
            search::run_simple(&dispatcher, plan.initial_queries(), blocklist, &mut output).await?
        }
        SearchPlan::Domains(ref domains) => {
            tracing::info!("Searching for domains: {:?}", domains);
            search::run_simple(&dispatcher, plan.initial_queries(), blocklist, &mut output).await?
        }
    };

    progress.finish();
    output.flush()?;
    tracing::info!(
        "Search completed: {} hostnames found, {} lines written",
        found,
        output.written()
    );

    Ok(())
}
