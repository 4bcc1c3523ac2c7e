//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use mushaf_core::{BuildConfig, BuildResult, ProgressReporter};
use mushaf_shared::{AppConfig, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Mushaf — build a scripture corpus from local sources and the web.
#[derive(Parser)]
#[command(
    name = "mushaf",
    version,
    about = "Assemble translations, commentary, pronunciations, and audio into one corpus.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run the full corpus build: sources, scrape, audio, artifact.
    Build {
        /// Input root containing quran.sqlite and surah/<folder>/ trees.
        #[arg(long)]
        data_dir: Option<String>,

        /// Output root for surahs.json and the audios/ tree.
        #[arg(short, long)]
        out: Option<String>,

        /// Delay between surah page fetches, in milliseconds.
        #[arg(long)]
        rate_limit_ms: Option<u64>,

        /// Maximum concurrent audio downloads.
        #[arg(long)]
        concurrency: Option<u32>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "mushaf=info",
        1 => "mushaf=debug",
        _ => "mushaf=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Build {
            data_dir,
            out,
            rate_limit_ms,
            concurrency,
        } => cmd_build(data_dir.as_deref(), out.as_deref(), rate_limit_ms, concurrency).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

async fn cmd_build(
    data_dir: Option<&str>,
    out: Option<&str>,
    rate_limit_ms: Option<u64>,
    concurrency: Option<u32>,
) -> Result<()> {
    let config = load_config()?;
    let mut build_config = BuildConfig::from(&config);

    // CLI flags override the config file.
    if let Some(dir) = data_dir {
        build_config.data_dir = PathBuf::from(dir);
    }
    if let Some(dir) = out {
        build_config.output_dir = PathBuf::from(dir);
    }
    if let Some(ms) = rate_limit_ms {
        build_config.scrape.rate_limit_ms = ms;
    }
    if let Some(n) = concurrency {
        build_config.download.concurrency = n;
    }

    info!(
        data_dir = %build_config.data_dir.display(),
        output_dir = %build_config.output_dir.display(),
        "starting corpus build"
    );

    let reporter = CliProgress::new();
    let result = mushaf_core::build_corpus(&build_config, &reporter).await?;

    println!();
    println!("  Corpus build complete!");
    println!("  Surahs:     {}", result.surah_count);
    println!("  Discovered: {}", result.stats.discovered);
    println!("  Downloaded: {}", result.stats.downloaded);
    println!("  Skipped:    {}", result.stats.skipped);
    println!("  Failed:     {}", result.stats.failed);
    println!("  Artifact:   {}", result.corpus_path.display());
    println!("  Audio:      {}", result.audio_root.display());
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn surah_scanned(&self, number: u32, scanned: usize, total: usize) {
        self.spinner
            .set_message(format!("Scanning surah {number} [{scanned}/{total}]"));
    }

    fn done(&self, _result: &BuildResult) {
        self.spinner.finish_and_clear();
    }
}
