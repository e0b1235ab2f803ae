mod api;
mod config;
mod output;
mod parse;

use carrot_core::{
    calc_deltas, plan_deltas, predict_rows, ContestSnapshot, DeltaPlan, DeltasOutcome, PredictResponse,
    Preferences, StandingsRow,
};
use clap::Parser;
use std::collections::HashMap;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::api::{ApiConfig, ContestApi, DEFAULT_API_BASE};

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "carrot", version, about = "Predict contest rating changes and performances")]
struct Cli {
    /// Log progress and API calls to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (default: ~/.config/carrot/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Predict deltas for standings read from a file or stdin
    Predict(PredictArgs),
    /// Fetch a contest and show predicted or final deltas
    Contest(ContestArgs),
    /// Create a default config file at ~/.config/carrot/config.toml
    Init,
}

#[derive(Parser)]
struct PredictArgs {
    /// Standings file: JSON array or lines of "handle points penalty [rating]".
    /// Read from stdin when omitted.
    #[arg(long)]
    standings: Option<PathBuf>,

    /// Ratings file: JSON map/array or lines of "handle rating". Overrides inline ratings.
    #[arg(long)]
    ratings: Option<PathBuf>,

    /// Response mode: "predicted" or "final"
    #[arg(long, default_value = "predicted")]
    mode: String,

    /// Skip performance computation
    #[arg(long)]
    no_perf: bool,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,
}

#[derive(Parser)]
struct ContestArgs {
    /// Contest id
    id: i64,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,

    /// Base URL of the contest API
    #[arg(long)]
    api_base: Option<String>,

    /// HTTP timeout in seconds. Default: 30.
    #[arg(long)]
    timeout: Option<u64>,
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_else(|e| bail(format!("System clock is before the Unix epoch: {e}")))
}

fn read_file(path: &Path, what: &str) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| bail(format!("Failed to read {what} file {}: {e}", path.display())))
}

/// Standings from --standings, or stdin if it is piped.
fn load_standings(args: &PredictArgs) -> Vec<StandingsRow> {
    let content = match args.standings {
        Some(ref path) => read_file(path, "standings"),
        None => {
            let mut stdin = io::stdin();
            if stdin.is_terminal() {
                bail("No standings provided. Use --standings <file> or pipe standings via stdin.");
            }
            let mut content = String::new();
            stdin
                .read_to_string(&mut content)
                .unwrap_or_else(|e| bail(format!("Failed to read from stdin: {e}")));
            content
        }
    };
    parse::parse_standings(&content).unwrap_or_else(|e| bail(e))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);

    match cli.command {
        Commands::Predict(args) => {
            let cfg = config::load_config(&config_path);
            run_predict(args, &cfg.preferences);
        }
        Commands::Contest(args) => {
            let cfg = config::load_config(&config_path);
            run_contest(args, cfg).await;
        }
        Commands::Init => {
            config::create_default_config(&config_path);
            println!("Created config at {}", config_path.display());
            println!("Edit it to set the API base, timeout and displayed columns.");
        }
    }
}

fn run_predict(args: PredictArgs, prefs: &Preferences) {
    let mut rows = load_standings(&args);
    if let Some(ref path) = args.ratings {
        let ratings = parse::parse_ratings(&read_file(path, "ratings")).unwrap_or_else(|e| bail(e));
        tracing::debug!("Loaded {} ratings from {}", ratings.len(), path.display());
        parse::apply_ratings(&mut rows, &ratings);
    }

    // Display in standings order.
    let mut sorted: Vec<&StandingsRow> = rows.iter().collect();
    sorted.sort_by(|a, b| b.points.total_cmp(&a.points).then(a.penalty.cmp(&b.penalty)));
    let order: Vec<String> = sorted.into_iter().map(|r| r.handle.clone()).collect();

    tracing::debug!("Predicting {} contestants", rows.len());
    let results = predict_rows(rows, !args.no_perf).unwrap_or_else(|e| bail(e));
    let resp = PredictResponse::from_tag(&results, &args.mode, now_millis()).unwrap_or_else(|e| bail(e));

    if args.json {
        output::print_json(&resp, &order);
    } else {
        output::print_table(&resp, &order, prefs);
    }
}

async fn run_contest(args: ContestArgs, cfg: config::CarrotConfig) {
    let api_config = ApiConfig {
        base_url: args
            .api_base
            .clone()
            .or(cfg.api_base)
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        timeout: Duration::from_secs(args.timeout.or(cfg.timeout_secs).unwrap_or(30)),
    };
    let api = ContestApi::new(&api_config).unwrap_or_else(|e| bail(e));
    let prefs = cfg.preferences;

    let standings = api.contest_standings(args.id).await.unwrap_or_else(|e| bail(e));
    tracing::debug!(
        "Contest {} \"{}\": {} rows, phase {:?}",
        standings.contest.id,
        standings.contest.name,
        standings.rows.len(),
        standings.contest.phase,
    );

    let lookup = api.lookup_rating_changes(&standings.contest).await;
    let mut snapshot = ContestSnapshot::new(standings, lookup, now_millis());
    tracing::debug!("Rated: {:?}", snapshot.is_rated);

    let current_ratings: HashMap<String, i32> = match plan_deltas(&snapshot, &prefs, None) {
        DeltaPlan::Predicted => {
            let users = api.user_rated_list(false).await.unwrap_or_else(|e| bail(e));
            tracing::debug!("Fetched {} current ratings", users.len());
            users.into_iter().map(|u| (u.handle, u.rating)).collect()
        }
        _ => HashMap::new(),
    };

    let order: Vec<String> = snapshot
        .rows
        .iter()
        .filter_map(|row| row.party.handle().map(str::to_string))
        .collect();

    match calc_deltas(&mut snapshot, &prefs, None, &current_ratings).unwrap_or_else(|e| bail(e)) {
        DeltasOutcome::Disabled => println!("Deltas are disabled in the preferences."),
        DeltasOutcome::UnratedContest => println!("Contest {} is unrated.", args.id),
        DeltasOutcome::Ok(resp) if args.json => output::print_json(&resp, &order),
        DeltasOutcome::Ok(resp) => output::print_table(&resp, &order, &prefs),
    }
}
