mod interactive;
mod render;
mod settings;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use homeval_client::{HttpPredictionClient, PredictionClient};
use homeval_session::{HistoryStatus, Session, SessionOptions, SubmitOutcome};
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// House price estimates from the terminal.
#[derive(Parser)]
#[command(
    name = "homeval",
    version,
    about = "House price estimates from the terminal"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Log requests and state changes to stderr
    #[arg(long, global = true)]
    verbose: bool,

    /// TOML file with a [service] table
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the estimation service
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Sort fetched history by creation time, newest first
    #[arg(long, global = true)]
    sort_history: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request one estimate and show the updated history
    Predict {
        /// Living area in square feet (100 to 100000)
        #[arg(long)]
        square_footage: f64,
        /// Number of bedrooms (1 to 20)
        #[arg(long)]
        bedrooms: u32,
    },

    /// Show past predictions
    History,

    /// Fill in the form line by line on stdin
    Interactive,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let overrides = settings::Overrides {
        config: cli.config.clone(),
        base_url: cli.base_url.clone(),
        timeout_secs: cli.timeout_secs,
        sort_history: cli.sort_history,
    };
    let config = match settings::resolve(&overrides, |key| std::env::var(key).ok()) {
        Ok(c) => c,
        Err(e) => {
            report_error(&format!("configuration error: {}", e), cli.output);
            process::exit(1);
        }
    };
    tracing::debug!(base_url = config.base_url(), timeout = ?config.timeout, "client configured");

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            report_error(&format!("failed to start async runtime: {}", e), cli.output);
            process::exit(1);
        }
    };
    let client: Arc<dyn PredictionClient> = Arc::new(HttpPredictionClient::new(config));

    let result = match cli.command {
        Commands::Predict {
            square_footage,
            bedrooms,
        } => rt.block_on(cmd_predict(client, square_footage, bedrooms, cli.output)),
        Commands::History => rt.block_on(cmd_history(client, cli.output)),
        Commands::Interactive => rt.block_on(cmd_interactive(client, cli.output)),
    };

    if let Err(msg) = result {
        report_error(&msg, cli.output);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

async fn cmd_predict(
    client: Arc<dyn PredictionClient>,
    square_footage: f64,
    bedrooms: u32,
    output: OutputFormat,
) -> Result<(), String> {
    let session = Session::open(client, SessionOptions::default()).await;
    session.set_square_footage(square_footage);
    session.set_bedrooms(bedrooms);
    let outcome = session.submit().await;
    let view = session.snapshot();
    session.close();

    match output {
        OutputFormat::Json => {
            println!("{}", pretty(&render::outcome_json(&outcome, &view)));
        }
        OutputFormat::Text => {
            if let SubmitOutcome::Succeeded(_) = outcome {
                println!("{}", render::outcome(&outcome));
                println!();
                println!("{}", render::history(&view, OffsetDateTime::now_utc()));
            }
        }
    }

    match outcome {
        SubmitOutcome::Succeeded(_) => Ok(()),
        SubmitOutcome::Rejected(_) if output == OutputFormat::Json => {
            Err("invalid input".to_string())
        }
        SubmitOutcome::Rejected(errors) => Err(render::field_errors(&errors)),
        other => Err(render::outcome(&other)),
    }
}

async fn cmd_history(client: Arc<dyn PredictionClient>, output: OutputFormat) -> Result<(), String> {
    let session = Session::open(client, SessionOptions::default()).await;
    let view = session.snapshot();
    session.close();

    if let HistoryStatus::Failed(message) = &view.history_status {
        return Err(message.clone());
    }
    match output {
        OutputFormat::Json => println!("{}", pretty(&view.history)),
        OutputFormat::Text => println!("{}", render::history(&view, OffsetDateTime::now_utc())),
    }
    Ok(())
}

async fn cmd_interactive(
    client: Arc<dyn PredictionClient>,
    output: OutputFormat,
) -> Result<(), String> {
    let session = Session::open(client, SessionOptions::default()).await;
    if let (OutputFormat::Text, HistoryStatus::Failed(message)) = (output, session.history_status()) {
        eprintln!("{}", message);
    }
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    interactive::drive(&session, stdin.lock(), stdout.lock(), output).await
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("serialization error: {}", e))
}

pub(crate) fn report_error(msg: &str, output: OutputFormat) {
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
