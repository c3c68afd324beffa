mod apple_music;
mod config;
mod conversion;
mod matching;
mod normalize;
mod queries;
mod record;
mod request;
mod scoring;
mod search;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, ensure};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use tokio::io::AsyncReadExt;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::config::MatchConfig;
use crate::conversion::SourceTrack;
use crate::record::JsonlRecordStore;
use crate::request::ErrorResponse;
use crate::search::{Candidate, CandidateKind};

#[derive(Parser)]
#[command(version, author, about, long_about = None)]
struct Cli {
    /// Log debug output (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Finds Apple Music catalog matches for a playlist's tracks
    Convert {
        /// Apple Music developer token JWT
        #[arg(short = 'D', long)]
        developer_token: String,

        /// Origin header value
        #[arg(short = 'O', long = "origin")]
        origin_header: Option<String>,

        /// Apple Music catalog storefront (e.g. `us`)
        #[arg(short = 'S', long)]
        storefront: String,

        /// TOML file with scoring weights and thresholds
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Minimum score for a candidate to be accepted
        #[arg(long)]
        threshold: Option<f64>,

        /// Stop searching for a track once a candidate scores above this
        #[arg(long)]
        strong_match_cutoff: Option<f64>,

        /// Search for every query even after a strong match
        #[arg(long, conflicts_with = "strong_match_cutoff")]
        no_short_circuit: bool,

        /// Number of tracks resolved at the same time
        #[arg(short = 'j', long, default_value_t = 1)]
        concurrency: usize,

        /// Maximum results per search type
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(1..=25))]
        limit: u8,

        /// Append a summary line for each conversion to this file
        #[arg(long)]
        record_log: Option<PathBuf>,

        /// Write the results here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON request with a `tracks` array; reads stdin when omitted or `-`
        input: Option<PathBuf>,
    },

    /// Prints the score of one candidate against one track
    Score {
        /// TOML file with scoring weights and thresholds
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Source track title
        #[arg(long)]
        title: String,

        /// Source track artists, primary first
        #[arg(long = "artist")]
        artists: Vec<String>,

        /// Candidate title
        #[arg(long)]
        candidate_title: String,

        /// Candidate contributors
        #[arg(long = "candidate-artist")]
        candidate_artists: Vec<String>,

        #[arg(long, value_enum, default_value_t = Kind::Song)]
        kind: Kind,

        /// Whether the candidate is an official release
        #[arg(long)]
        official: bool,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate the completions for
        #[arg(value_enum)]
        shell: clap_complete_command::Shell,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum Kind {
    Song,
    Video,
    Other,
}

impl From<Kind> for CandidateKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Song => CandidateKind::Song,
            Kind::Video => CandidateKind::Video,
            Kind::Other => CandidateKind::Other,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Result<MatchConfig> {
    match path {
        Some(path) => MatchConfig::load(path),
        None => Ok(MatchConfig::default()),
    }
}

async fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut body = String::new();
            tokio::io::stdin()
                .read_to_string(&mut body)
                .await
                .context("failed to read stdin")?;
            Ok(body)
        }
    }
}

async fn write_output(output: Option<&Path>, json: &str) -> Result<()> {
    match output {
        Some(path) => tokio::fs::write(path, format!("{json}\n"))
            .await
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Convert {
            developer_token,
            origin_header,
            storefront,
            config,
            threshold,
            strong_match_cutoff,
            no_short_circuit,
            concurrency,
            limit,
            record_log,
            output,
            input,
        } => {
            ensure!(
                apple_music::validate_developer_token(&developer_token),
                "invalid developer token",
            );
            ensure!(
                apple_music::validate_storefront(&storefront),
                "invalid storefront",
            );
            ensure!(concurrency > 0, "concurrency must be at least 1");

            let mut config = load_config(config.as_deref())?;
            if let Some(threshold) = threshold {
                config.acceptance_threshold = threshold;
            }
            if strong_match_cutoff.is_some() {
                config.strong_match_cutoff = strong_match_cutoff;
            }
            if no_short_circuit {
                config.strong_match_cutoff = None;
            }
            config.validate()?;

            let search = apple_music::LazySearchClient::new(apple_music::ClientSettings {
                developer_token,
                origin_header,
                storefront,
                limit,
            });
            let store = record_log.map(JsonlRecordStore::new);
            let body = read_input(input.as_deref()).await?;

            match request::handle_request(&body, &search, store.as_ref(), &config, concurrency)
                .await
            {
                Ok(conversion) => {
                    let json = serde_json::to_string_pretty(&conversion)?;
                    write_output(output.as_deref(), &json).await?;
                }
                Err(request_error) => {
                    error!(error = %request_error, "Conversion request failed");
                    let json = serde_json::to_string_pretty(&ErrorResponse::from(&request_error))?;
                    write_output(output.as_deref(), &json).await?;
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Score {
            config,
            title,
            artists,
            candidate_title,
            candidate_artists,
            kind,
            official,
        } => {
            let config = load_config(config.as_deref())?;
            let cleaned = normalize::clean(&title);
            let track = SourceTrack {
                name: if cleaned.is_empty() { title } else { cleaned },
                artists,
            };
            let candidate = Candidate {
                id: String::new(),
                title: candidate_title,
                contributors: candidate_artists,
                kind: kind.into(),
                is_official: official,
            };
            let score = scoring::score(&track, &candidate, &config);
            let verdict = if score >= config.acceptance_threshold {
                "accepted"
            } else {
                "rejected"
            };
            println!(
                "{score:.3} ({verdict}, threshold {})",
                config.acceptance_threshold,
            );
        }
        Commands::Completions { shell } => {
            shell.generate(&mut Cli::command(), &mut std::io::stdout());
        }
    }
    Ok(ExitCode::SUCCESS)
}
