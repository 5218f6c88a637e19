//! Juicy CLI
//!
//! Content checks, scaffolding and CMS schema output for the Juicy blog.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use juicy::cmd::new::NewDocument;

/// Command-line interface for Juicy.
#[derive(Parser)]
#[command(
    name = "juicy",
    version,
    about = "Content schema checks for the Juicy blog"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "juicy.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Validate configuration and every content document
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new document that passes validation
    New {
        /// Collection to add to (posts, pages)
        collection: String,
        /// File slug (e.g., my-first-post)
        slug: String,
        /// Title; derived from the slug when omitted
        #[arg(short, long)]
        title: Option<String>,
        /// Locale tag; the default locale when omitted
        #[arg(short, long)]
        lang: Option<String>,
    },
    /// Print, write or verify the CMS editing schema
    Cms {
        /// Write the schema to this file instead of stdout
        #[arg(short, long, conflicts_with = "verify")]
        output: Option<std::path::PathBuf>,
        /// Compare a committed schema file with the derived one
        #[arg(long)]
        verify: Option<std::path::PathBuf>,
    },
    /// Show the build environment, base path and locales
    Env,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    juicy::init_tracing(cli.verbose);

    match cli.command {
        Commands::Check { strict, json } => {
            juicy::cmd::check::run(&cli.config, strict, json)?;
        }
        Commands::New {
            collection,
            slug,
            title,
            lang,
        } => {
            let doc = NewDocument {
                collection: &collection,
                slug: &slug,
                title: title.as_deref(),
                lang: lang.as_deref(),
            };
            juicy::cmd::new::run(&cli.config, &doc)?;
        }
        Commands::Cms { output, verify } => {
            juicy::cmd::cms::run(&cli.config, output.as_deref(), verify.as_deref())?;
        }
        Commands::Env => {
            juicy::cmd::env::run(&cli.config)?;
        }
    }

    Ok(())
}
