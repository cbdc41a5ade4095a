#![deny(missing_docs)]

//! # Apigraph CLI
//!
//! Command Line Interface for the API surface extractor.
//!
//! Supported Commands:
//! - `generate`: Source manifests -> Swagger 2.0 + OpenAPI 3.0.0 per project.
//! - `convert`: Swagger 2.0 document -> OpenAPI 3.0.0.
//! - `serve`: Mock, proxy and document endpoints (feature `server`).
//! - `upload`: Publish a definition to a remote catalog (feature `client`).

use apigraph_core::AppResult;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod convert;
mod error;
mod generate;
#[cfg(feature = "server")]
mod serve;
#[cfg(feature = "client")]
mod upload;

#[derive(Parser, Debug)]
#[clap(author, version, about = "API surface extractor")]
struct Cli {
    /// Raise the log level (`-v` debug, `-vv` trace). `RUST_LOG` wins.
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract documents from source manifests.
    Generate(generate::GenerateArgs),
    /// Convert a Swagger 2.0 document to OpenAPI 3.0.0.
    Convert(convert::ConvertArgs),
    /// Serve mock, proxy and document endpoints.
    #[cfg(feature = "server")]
    Serve(serve::ServeArgs),
    /// Publish a definition file to a remote catalog.
    #[cfg(feature = "client")]
    Upload(upload::UploadArgs),
}

fn default_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> AppResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Generate(args) => {
            generate::execute(args)?;
        }
        Commands::Convert(args) => {
            convert::execute(args)?;
        }
        #[cfg(feature = "server")]
        Commands::Serve(args) => serve::execute(args)?,
        #[cfg(feature = "client")]
        Commands::Upload(args) => upload::execute(args)?,
    }

    Ok(())
}
