//! # ldb CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// LDraw part bundle tool.
///
/// Prints manifests, writes archives, and warms the bundle cache shared
/// with the HTTP service.
#[derive(Parser, Debug)]
#[command(name = "ldb", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the manifest of a part's closure.
    Manifest(ldb_cli::manifest::ManifestArgs),
    /// Write the zip archive of a part's closure.
    Archive(ldb_cli::archive::ArchiveArgs),
    /// Build and persist cache entries ahead of requests.
    Warm(ldb_cli::warm::WarmArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so manifests can be piped.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Manifest(args) => {
            ldb_cli::manifest::run(&args, &mut std::io::stdout().lock())?;
        }
        Commands::Archive(args) => {
            let out = ldb_cli::archive::run(&args)?;
            println!("{}", out.display());
        }
        Commands::Warm(args) => {
            let report = ldb_cli::warm::run(&args).await?;
            println!(
                "built {}, already cached {}, unknown {}",
                report.built,
                report.cached,
                report.unknown.len()
            );
            if !report.unknown.is_empty() {
                let ids: Vec<String> = report.unknown.iter().map(ToString::to_string).collect();
                anyhow::bail!("no part file for: {}", ids.join(", "));
            }
        }
    }

    Ok(())
}
