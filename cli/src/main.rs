#![deny(missing_docs)]

//! # OAS Deref CLI
//!
//! Command Line Interface for the OpenAPI reference resolver.
//!
//! Supported Commands:
//! - `resolve`: Splices referenced path items into a single document.

use clap::{Parser, Subcommand};

use crate::error::CliResult;

mod error;
mod resolve;

#[derive(Parser, Debug)]
#[clap(author, version, about = "OpenAPI $ref resolver")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve path `$ref`s into a single document.
    Resolve(resolve::ResolveArgs),
}

fn install_logger() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    install_logger();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Resolve(args) => resolve::execute(args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve_flags() {
        let cli = Cli::try_parse_from([
            "oas-deref",
            "resolve",
            "api.yaml",
            "--format",
            "json",
            "--keep-path-parameters",
        ])
        .unwrap();
        let Commands::Resolve(args) = cli.command;
        assert_eq!(args.format, resolve::OutputFormat::Json);
        assert!(args.keep_path_parameters);
        assert!(!args.skip_unresolved);
    }
}
