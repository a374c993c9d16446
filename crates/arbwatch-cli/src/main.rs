//! arbwatch — firmware locator and anti-rollback history tracker.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use arbwatch::matrix::{backfill_matrix, live_matrix, BACKFILL_DEPTH, DEFAULT_EXCLUSIONS};
use arbwatch::{normalize_device_id, FallbackLocator, Reconciler, ScrapeSource};
use arbwatch_cli::commands::fetch::{FetchArgs, OutputFormat};
use arbwatch_cli::commands::matrix::ENV_GITHUB_OUTPUT;
use arbwatch_cli::commands::update::UpdateArgs;
use arbwatch_cli::commands::{fetch, matrix, parse_ini, update, verify};
use arbwatch_cli::config::{
    resolve_device_catalog, resolve_history_dir, resolve_locator_config, NetworkOverrides,
};

#[derive(Parser)]
#[command(
    name = "arbwatch",
    about = "Track firmware releases and their anti-rollback index per device and region",
    version
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Directory holding ledger files.
    #[arg(long, global = true)]
    history_dir: Option<String>,

    /// JSON file replacing the built-in device catalog.
    #[arg(long, global = true)]
    devices: Option<String>,

    /// Base URL of the firmware API.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Landing page URL of the scrape source.
    #[arg(long, global = true)]
    scrape_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a firmware download URL for a device/region.
    Fetch {
        /// Device short id (e.g. "15", "oneplus_15").
        device: String,
        /// Region code (GLO, EU, IN, CN, ...).
        region: String,
        /// Exact version to fetch; skips the API source.
        version: Option<String>,
        /// Print the descriptor as JSON.
        #[arg(long, conflicts_with_all = ["url_only", "version_only"])]
        json: bool,
        /// Print only the URL (default).
        #[arg(long, conflicts_with = "version_only")]
        url_only: bool,
        /// Print only the version.
        #[arg(long)]
        version_only: bool,
        /// Write the descriptor as JSON to this file instead of printing.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Record an analysis result in the device/region ledger.
    Update {
        /// Device short id.
        device: Option<String>,
        /// Region code.
        region: Option<String>,
        /// Firmware version string.
        version: Option<String>,
        /// Anti-rollback index.
        arb: Option<u32>,
        /// Security patch major component.
        major: Option<u32>,
        /// Security patch minor component.
        minor: Option<u32>,
        /// Analysis result JSON; its values override positionals.
        #[arg(long)]
        json_file: Option<PathBuf>,
        /// Backfill a past version without changing the current one.
        #[arg(long)]
        historical: bool,
    },

    /// Resolve every catalog target and report which ones work.
    Verify,

    /// Emit the live-check job matrix.
    Matrix,

    /// Emit the backfill job matrix from the scrape source's version lists.
    BackfillMatrix {
        /// Versions per device/region.
        #[arg(long, default_value_t = BACKFILL_DEPTH)]
        depth: usize,
    },

    /// List recent builds for a device/region from an INI history dump.
    ParseIni {
        /// INI file.
        ini_file: PathBuf,
        /// Device short id.
        device: String,
        /// Region code.
        region: String,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let catalog = Arc::new(resolve_device_catalog(cli.devices.as_deref())?);
    let network = NetworkOverrides {
        api_url: cli.api_url,
        scrape_url: cli.scrape_url,
        timeout_secs: cli.timeout,
    };
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Commands::Fetch {
            device,
            region,
            version,
            json,
            url_only: _,
            version_only,
            output,
        } => {
            let config = resolve_locator_config(&network)?;
            let locator = FallbackLocator::standard(&config, Arc::clone(&catalog));
            let format = if json {
                OutputFormat::Json
            } else if version_only {
                OutputFormat::Version
            } else {
                OutputFormat::Url
            };
            let args = FetchArgs {
                device_id: normalize_device_id(&device).to_string(),
                region,
                version,
                format,
                output,
            };
            fetch::run(&locator, &args, &mut stdout).await?;
        }

        Commands::Update {
            device,
            region,
            version,
            arb,
            major,
            minor,
            json_file,
            historical,
        } => {
            let reconciler = Reconciler::new(
                resolve_history_dir(cli.history_dir.as_deref()),
                Arc::clone(&catalog),
            );
            let args = UpdateArgs {
                device_id: device,
                region,
                version,
                arb,
                major,
                minor,
                json_file,
                historical,
            };
            update::run(&reconciler, &args, &mut stdout)?;
        }

        Commands::Verify => {
            let config = resolve_locator_config(&network)?;
            let locator = FallbackLocator::standard(&config, Arc::clone(&catalog));
            verify::run(&catalog, &locator, &mut stdout).await?;
        }

        Commands::Matrix => {
            let github_output = std::env::var_os(ENV_GITHUB_OUTPUT).map(PathBuf::from);
            let jobs = live_matrix(&catalog, DEFAULT_EXCLUSIONS);
            matrix::emit(&jobs, github_output.as_deref(), &mut stdout)?;
        }

        Commands::BackfillMatrix { depth } => {
            let config = resolve_locator_config(&network)?;
            let scrape = ScrapeSource::new(config, Arc::clone(&catalog));
            let github_output = std::env::var_os(ENV_GITHUB_OUTPUT).map(PathBuf::from);
            let jobs = backfill_matrix(&catalog, &scrape, depth).await;
            matrix::emit(&jobs, github_output.as_deref(), &mut stdout)?;
        }

        Commands::ParseIni {
            ini_file,
            device,
            region,
        } => {
            parse_ini::run(
                &catalog,
                &ini_file,
                normalize_device_id(&device),
                &region,
                &mut stdout,
            )?;
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "arbwatch", &mut stdout);
        }
    }

    Ok(())
}
