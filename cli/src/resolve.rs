#![deny(missing_docs)]

//! # Resolve Command
//!
//! Reads an OpenAPI document, resolves the `$ref`s of its paths and writes the
//! single resulting document.

use crate::error::{CliError, CliResult};
use oas_deref_core::oas::resolver::base_dir_of;
use oas_deref_core::{Document, FileSource, OpenApiResolver, ResolverSettings};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Serialization format of the resolved document.
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// YAML output.
    Yaml,
    /// Pretty-printed JSON output.
    Json,
}

/// Arguments for the resolve command.
#[derive(clap::Args, Debug, Clone)]
pub struct ResolveArgs {
    /// Path to the OpenAPI document (YAML or JSON).
    pub input: PathBuf,

    /// Where to write the resolved document. Defaults to stdout.
    #[clap(long, short)]
    pub output: Option<PathBuf>,

    /// Output format.
    #[clap(long, value_enum, default_value = "yaml")]
    pub format: OutputFormat,

    /// Resolver settings file (YAML or JSON).
    #[clap(long, env = "OAS_DEREF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Keep path-level parameters on the path instead of copying them into each operation.
    #[clap(long)]
    pub keep_path_parameters: bool,

    /// Leave paths whose references fail to resolve as they are instead of aborting.
    #[clap(long)]
    pub skip_unresolved: bool,
}

impl ResolveArgs {
    fn settings(&self) -> CliResult<ResolverSettings> {
        let settings = match &self.config {
            Some(path) => ResolverSettings::from_file(path)?,
            None => ResolverSettings::default(),
        };
        if self.keep_path_parameters {
            return Ok(settings.with_parameter_propagation(false));
        }
        Ok(settings)
    }
}

/// Executes the resolve command.
pub fn execute(args: &ResolveArgs) -> CliResult<()> {
    let content = fs::read_to_string(&args.input).map_err(|e| {
        CliError::General(format!("Failed to read {}: {}", args.input.display(), e))
    })?;
    let resolver = OpenApiResolver::new(args.settings()?);
    let source = FileSource::new(base_dir_of(&args.input));

    let document = if args.skip_unresolved {
        let resolution = resolver.resolve_str_lenient(&content, source)?;
        for skipped in &resolution.skipped {
            warn!(path = %skipped.path, error = %skipped.error, "path left unresolved");
        }
        resolution.document
    } else {
        resolver.resolve_str(&content, source)?
    };

    let rendered = render(&document, args.format)?;
    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, rendered)?;
            info!(output = %path.display(), "wrote resolved document");
        }
        None => print!("{}", rendered),
    }
    Ok(())
}

fn render(document: &Document, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(document)
            .map_err(|e| CliError::General(format!("Failed to render YAML: {}", e))),
        OutputFormat::Json => serde_json::to_string_pretty(document)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| CliError::General(format!("Failed to render JSON: {}", e))),
    }
}
