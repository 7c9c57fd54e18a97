use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use triage_cli::api::AnalysisService;
use triage_cli::config::{self, Config};
use triage_cli::http;
use triage_cli::remote::RemoteClient;
use triage_cli::validate::validate_analyze_request;
use triage_core::{AnalysisResult, ScoredTask, Summary, parse_tasks, score_records};

#[derive(Parser, Debug)]
#[command(
    name = "triage",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TRIAGE_BUILD_SHA"), ")"),
    about = "Score and rank a batch of tasks"
)]
struct Cli {
    /// Config file (default: ~/.triage/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,
    },

    /// Score a JSON or CSV batch and print the ranking
    Analyze {
        /// Path to a .json or .csv batch
        file: PathBuf,

        /// fastest_wins, high_impact, deadline_driven or smart_balance
        #[arg(long)]
        strategy: Option<String>,

        /// Evaluate deadlines as of this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Submit to a running server instead of scoring locally
        #[arg(long)]
        url: Option<String>,
    },

    /// Fetch top suggestions from a running server's latest batch
    Suggest {
        /// Server base URL (default: from config)
        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        limit: Option<i64>,

        #[arg(long)]
        strategy: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Write the default config file
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Command::InitConfig => config::init_config(config_path.as_deref())?,

        Command::Serve { host, port } => {
            let cfg = config::load_config(config_path.as_deref())?;
            serve(cfg, host, port).await?;
        }

        Command::Analyze {
            file,
            strategy,
            date,
            json,
            url,
        } => {
            let cfg = config::load_config(config_path.as_deref())?;
            let mut batch = triage_ingest::load_batch(&file)?;
            if strategy.is_some() {
                batch.strategy = strategy;
            }

            if let Some(url) = url {
                let resp = RemoteClient::new(url).analyze(&batch.to_request()).await?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&resp)?);
                } else {
                    println!("Generated at {}\n", resp.generated_at.to_rfc3339());
                    print_ranking(&resp.analysis.tasks, &resp.analysis.summary);
                }
                return Ok(());
            }

            let request =
                validate_analyze_request(&batch.to_request(), cfg.scoring.default_strategy)
                    .with_context(|| format!("invalid batch in {}", file.display()))?;
            let tasks = parse_tasks(&request.tasks)?;
            let today = match date {
                Some(d) => d,
                None => cfg.scoring.today()?,
            };
            let analysis = score_records(&tasks, request.strategy, Some(today));
            print_analysis(&analysis, json)?;
        }

        Command::Suggest {
            url,
            limit,
            strategy,
            json,
        } => {
            let url = match url {
                Some(url) => url,
                None => config::load_config(config_path.as_deref())?.server.base_url(),
            };
            let resp = RemoteClient::new(url).suggest(limit, strategy.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
            } else {
                println!(
                    "Top {} by {} (batch from {})\n",
                    resp.limit,
                    resp.strategy,
                    resp.generated_at.to_rfc3339()
                );
                print_ranking(&resp.tasks, &resp.summary);
            }
        }
    }

    Ok(())
}

async fn serve(mut cfg: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        cfg.server.host = host;
    }
    if let Some(port) = port {
        cfg.server.port = port;
    }
    let addr = cfg.server.addr()?;

    let service = Arc::new(AnalysisService::new(cfg.scoring.clone()));
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "ctrl-c handler failed");
        }
    };

    let (bound, server) = http::bind(addr, service, shutdown)?;
    tracing::info!(
        %bound,
        default_strategy = %cfg.scoring.default_strategy,
        timezone = %cfg.scoring.timezone,
        "serving"
    );
    server.await?;
    tracing::info!("server stopped");
    Ok(())
}

fn print_analysis(analysis: &AnalysisResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(analysis)?);
        return Ok(());
    }
    println!("Strategy: {}\n", analysis.strategy);
    print_ranking(&analysis.tasks, &analysis.summary);
    Ok(())
}

fn print_ranking(tasks: &[ScoredTask], summary: &Summary) {
    if tasks.is_empty() {
        println!("(no tasks)");
        return;
    }
    for t in tasks {
        let flag = if t.cycle_issue { " [cycle]" } else { "" };
        println!("#{:<3} {:>6.2}  {}{}", t.rank, t.score, t.task.title, flag);
        println!("      {}", t.explanation);
    }
    println!(
        "\n{} task(s), average score {:.2}, strategy {}",
        summary.total_tasks,
        summary.average_score,
        summary.strategy
    );
}
