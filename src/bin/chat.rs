use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use vehicle_rag::cli::{self, Command};
use vehicle_rag::core::config::{AppConfig, AppPaths, ConfigService};
use vehicle_rag::core::logging;
use vehicle_rag::llm::build_providers;
use vehicle_rag::rag::RawTable;
use vehicle_rag::state::RagSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init_file_only(&paths, "chat.log");

    let config = ConfigService::new(paths.clone())
        .load()
        .context("Failed to load configuration")?;
    let csv_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| config.cli.default_csv_path.clone());
    let csv_path = paths.resolve(&csv_path);

    println!("Initializing Vehicle Mapping RAG system...");
    let session = match initialize(&csv_path, &config).await {
        Ok(session) => session,
        Err(err) => {
            println!("Failed to initialize RAG system: {:#}", err);
            println!("{}", cli::startup_hint(&config.llm, &csv_path));
            return Err(err);
        }
    };
    println!(
        "Loaded {} vehicles from {}\n",
        session.vehicle_count(),
        session.source_name()
    );
    println!("{}", cli::WELCOME);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("\n{}", cli::PROMPT);
        let _ = std::io::stdout().flush();

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        // EOF and Ctrl+C both end the session.
        let Some(line) = line else {
            break;
        };

        match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => println!("{}", cli::HELP),
            Command::Clear => {
                print!("{}", cli::CLEAR_SCREEN);
                let _ = std::io::stdout().flush();
            }
            Command::Ask(question) => {
                println!("\nThinking...");
                let outcome = tokio::select! {
                    outcome = session.answer(&question) => outcome,
                    _ = tokio::signal::ctrl_c() => break,
                };
                println!("{}", cli::format_answer(&outcome.response));
            }
        }
    }

    println!("\nGoodbye! Thanks for using Vehicle Mapping RAG Chat!");
    session.close();
    Ok(())
}

async fn initialize(csv_path: &Path, config: &AppConfig) -> anyhow::Result<RagSession> {
    let providers = build_providers(&config.llm).context("Failed to build model providers")?;
    let table = RawTable::from_path(csv_path)?;
    let source_name = csv_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| csv_path.display().to_string());

    let session = RagSession::initialize(&table, source_name, config, &providers).await?;
    Ok(session)
}
