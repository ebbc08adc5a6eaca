//! Yivic CLI - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::ThemeArgs;

#[derive(Parser)]
#[command(name = "yivic")]
#[command(version)]
#[command(about = "Inspect child/parent theme resolution", long_about = None)]
struct Cli {
    #[command(flatten)]
    theme: ThemeArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a static asset to a URL (child first, then parent)
    Asset {
        /// Path relative to the theme root
        relative: String,
    },

    /// Resolve a build asset through the hashed manifest
    Mix {
        /// Path relative to the dist directory
        relative: String,

        /// Manifest location relative to the theme root (repeatable, first hit wins)
        #[arg(long = "manifest")]
        manifests: Vec<String>,
    },

    /// List the view search paths in lookup order
    Views,

    /// Locate the file a view name resolves to
    FindView {
        /// Dot-notation view name
        name: String,
    },

    /// Print the compiled view directory
    CompiledPath,

    /// Create the compiled view directory if it is missing
    EnsureCompiled,

    /// Print the merged configuration (or one key) as JSON
    Config {
        /// Dotted key to print
        key: Option<String>,
    },

    /// Print the theme context as JSON
    Context,

    /// Print a view's raw source after resolving it
    Render {
        /// Dot-notation view name
        name: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yivic=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let app = commands::load_app(&cli.theme)?;

    match cli.command {
        Commands::Asset { relative } => commands::asset::execute(&app, &relative),
        Commands::Mix {
            relative,
            manifests,
        } => commands::asset::execute_mix(&app, &relative, &manifests),
        Commands::Views => commands::views::execute_list(&app),
        Commands::FindView { name } => commands::views::execute_find(&app, &name),
        Commands::CompiledPath => commands::compiled::execute_path(&app),
        Commands::EnsureCompiled => commands::compiled::execute_ensure(&app),
        Commands::Config { key } => commands::config::execute(&app, key.as_deref()),
        Commands::Context => commands::config::execute_context(&app),
        Commands::Render { name } => commands::views::execute_render(&app, &name),
    }
}
