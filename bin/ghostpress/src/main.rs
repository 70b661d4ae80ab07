//! ghostpress CLI
//!
//! Static site generator for blogs backed by a headless Ghost CMS.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use ghostpress_core::BuildMode;

/// Command-line interface for ghostpress.
#[derive(Parser)]
#[command(
    name = "ghostpress",
    version,
    about = "A static site generator for Ghost-powered blogs"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: std::path::PathBuf,

    /// Credential override file with [development] and [production] tables
    /// (defaults to .ghost.toml next to the config file)
    #[arg(long)]
    credentials: Option<std::path::PathBuf>,

    /// Credential record to use (development or production)
    #[arg(short, long, env = "GHOSTPRESS_MODE", default_value = "production")]
    mode: BuildMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Build the static site
    Build {
        /// Output directory (defaults to build.output_dir)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
        /// Build from the cached content snapshot instead of the CMS
        #[arg(long)]
        offline: bool,
        /// Build from this content snapshot instead of the CMS
        #[arg(long, conflicts_with = "offline")]
        snapshot: Option<std::path::PathBuf>,
    },
    /// Validate configuration, credentials and content
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
        /// Content snapshot to validate (defaults to the cached snapshot)
        #[arg(long)]
        snapshot: Option<std::path::PathBuf>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    ghostpress::init_tracing(cli.verbose);

    let credentials = ghostpress::cmd::credentials_path(&cli.config, cli.credentials.as_deref());

    match cli.command {
        Commands::Build {
            output,
            offline,
            snapshot,
        } => {
            let opts = ghostpress::cmd::BuildOptions {
                output,
                offline,
                snapshot,
            };
            ghostpress::cmd::build::run(&cli.config, &credentials, cli.mode, &opts)?;
        }
        Commands::Check { strict, snapshot } => {
            ghostpress::cmd::check::run(
                &cli.config,
                &credentials,
                cli.mode,
                snapshot.as_deref(),
                strict,
            )?;
        }
    }

    Ok(())
}
