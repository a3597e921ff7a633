use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fhir::config::{CHECK_REFERENCE_TYPES_ENV, VALIDATING_ENV};
use fhir::registry;
use fhir::visitor::collect_paths;
use fhir::{yaml, ModelConfig, RecordDescriptor};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fhir-model")]
#[command(about = "Inspect and validate FHIR resource YAML files")]
struct Cli {
    /// Build records without running validation
    #[arg(long, global = true)]
    no_validate: bool,
    /// Skip reference target type checks
    #[arg(long, global = true)]
    no_reference_checks: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a resource file and list every error
    Validate {
        /// Path to a YAML resource
        file: PathBuf,
    },
    /// Print a resource file in canonical field order
    Render {
        /// Path to a YAML resource
        file: PathBuf,
    },
    /// Print the traversal path of every element in a resource file
    Paths {
        /// Path to a YAML resource
        file: PathBuf,
    },
    /// Print the field table of a modelled type
    Describe {
        /// Type name, e.g. `Account` or `Account.coverage`
        type_name: String,
    },
    /// List modelled types
    Types,
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("fhir=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    tracing::debug!(
        validating = config.validating(),
        check_reference_types = config.check_reference_types(),
        "resolved model configuration"
    );

    match cli.command {
        Some(Commands::Validate { file }) => return validate(&file, config),
        Some(Commands::Render { file }) => {
            let resource = yaml::parse_file(&file, config)
                .with_context(|| format!("reading {}", file.display()))?;
            print!("{}", yaml::render(&resource)?);
        }
        Some(Commands::Paths { file }) => {
            let resource = yaml::parse_file(&file, config)
                .with_context(|| format!("reading {}", file.display()))?;
            for path in collect_paths(&resource) {
                println!("{path}");
            }
        }
        Some(Commands::Describe { type_name }) => {
            let descriptor = registry::descriptor(&type_name).with_context(|| {
                if registry::is_resource_type(&type_name) {
                    format!("{type_name} is a FHIR resource type but is not modelled")
                } else {
                    format!("unknown type {type_name}")
                }
            })?;
            describe(descriptor);
        }
        Some(Commands::Types) => {
            for descriptor in registry::modelled_descriptors() {
                println!("{}", descriptor.type_name);
            }
        }
        None => {
            println!("Use 'fhir-model --help' for commands");
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Environment first, then command line flags.
fn resolve_config(cli: &Cli) -> anyhow::Result<ModelConfig> {
    let mut config = ModelConfig::from_env_values(
        std::env::var(VALIDATING_ENV).ok(),
        std::env::var(CHECK_REFERENCE_TYPES_ENV).ok(),
    )?;
    if cli.no_validate {
        config = config.with_validating(false);
    }
    if cli.no_reference_checks {
        config = config.with_check_reference_types(false);
    }
    Ok(config)
}

fn validate(file: &Path, config: ModelConfig) -> anyhow::Result<ExitCode> {
    let resource = yaml::parse_file(file, config.with_validating(false))
        .with_context(|| format!("reading {}", file.display()))?;

    if !config.validating() {
        println!("{}: parsed {} (validation disabled)", file.display(), resource.type_name());
        return Ok(ExitCode::SUCCESS);
    }

    match resource.validate(config) {
        Ok(()) => {
            println!("{}: {} is valid", file.display(), resource.type_name());
            Ok(ExitCode::SUCCESS)
        }
        Err(errors) => {
            println!(
                "{}: {} has {} error(s)",
                file.display(),
                errors.type_name(),
                errors.len()
            );
            for error in &errors {
                println!("  {}: {error}", error.field());
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn describe(descriptor: &RecordDescriptor) {
    println!("{}", descriptor.type_name);
    for field in descriptor.all_fields() {
        let mut line = format!(
            "  {:<20} {:<16} {}",
            field.name, field.type_name, field.cardinality
        );
        if field.summary {
            line.push_str(" summary");
        }
        if field.is_reference() {
            line.push_str(&format!(" -> {}", field.reference_targets.join(" | ")));
        }
        if let Some(binding) = field.binding {
            line.push_str(&format!(
                " [{} {}]",
                binding.strength, binding.value_set
            ));
        }
        println!("{line}");
    }
}
