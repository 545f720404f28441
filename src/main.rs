use clap::{Parser, Subcommand};
use transaction_lens::{
    cache::HistoryCache,
    client::{get_client, AnalysisApi},
    config::Config,
    history::{HistoryService, HistorySource},
    report::{render_analysis, render_history},
    utils::load_upload,
    TransactionLensError,
};

use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short, long, default_value = "transaction-lens.toml")]
    config: PathBuf,

    /// Base URL of the analysis service
    #[clap(long)]
    api_url: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a description and/or a file for analysis
    Analyze {
        #[clap(short, long, default_value = "")]
        description: String,

        #[clap(short, long)]
        file: Option<PathBuf>,
    },
    /// List previously analyzed transactions
    History {
        /// Also download every listed analysis into the local cache
        #[clap(long)]
        prefetch: bool,
    },
    /// Show the analysis stored for a transaction
    Show { id: String },
    /// Refresh the history periodically until interrupted
    Watch {
        #[clap(short, long)]
        interval: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    env_logger::init();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.message());
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), TransactionLensError> {
    let mut config = Config::load_or_default(&args.config)?;
    config.apply_env()?;
    if let Some(api_url) = args.api_url {
        config.api_url = Some(api_url);
    }

    let api = get_client(&config)?;
    let mut cache = HistoryCache::new(&config.get_history_cache_path()?)?;
    info!("Using analysis service: {}", api.endpoint());

    match args.command {
        Command::Analyze { description, file } => {
            analyze(api.as_ref(), &mut cache, &description, file).await
        }
        Command::History { prefetch } => {
            let mut service = HistoryService::new(api.as_ref(), &mut cache);
            let snapshot = service.refresh().await?;
            if let Some(error) = &snapshot.error {
                println!("Service unavailable ({}), showing cached history.", error);
            }
            print!("{}", render_history(&snapshot.transactions));
            if prefetch && snapshot.source == HistorySource::Remote {
                let count = service.prefetch(&snapshot.transactions).await;
                println!("Cached {} analyses for offline use.", count);
            }
            Ok(())
        }
        Command::Show { id } => {
            let description = cache
                .history()
                .iter()
                .find(|t| t.id == id)
                .map(|t| t.description.clone())
                .unwrap_or_default();
            let mut service = HistoryService::new(api.as_ref(), &mut cache);
            match service.open_id(&id).await? {
                Some(analysis) => print!("{}", render_analysis(&description, &analysis)),
                None => println!("Could not load analysis for this transaction"),
            }
            Ok(())
        }
        Command::Watch { interval } => {
            let period = interval
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or_else(|| config.get_history_refresh_interval());
            watch(api.as_ref(), &mut cache, period).await
        }
    }
}

async fn analyze(
    api: &dyn AnalysisApi,
    cache: &mut HistoryCache,
    description: &str,
    file: Option<PathBuf>,
) -> Result<(), TransactionLensError> {
    let upload = match file {
        Some(path) => Some(load_upload(&path).await?),
        None => None,
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .map_err(|e| TransactionLensError::ConfigError(e.to_string()))?,
    );
    spinner.set_message("Analyzing transaction...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = HistoryService::new(api, cache)
        .analyze(description, upload.as_ref())
        .await;
    spinner.finish_and_clear();

    let analysis = result?;
    let shown = if description.is_empty() {
        upload.map(|u| u.name).unwrap_or_default()
    } else {
        description.to_string()
    };
    print!("{}", render_analysis(&shown, &analysis));
    Ok(())
}

async fn watch(
    api: &dyn AnalysisApi,
    cache: &mut HistoryCache,
    period: Duration,
) -> Result<(), TransactionLensError> {
    let mut ticker = tokio::time::interval(period);
    let mut service = HistoryService::new(api, cache);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = service.refresh().await?;
                if let Some(error) = &snapshot.error {
                    warn!("History refresh failed: {}", error);
                    println!("Service unavailable ({}), showing cached history.", error);
                }
                print!("{}", render_history(&snapshot.transactions));
                println!("---");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping history refresh");
                return Ok(());
            }
        }
    }
}
