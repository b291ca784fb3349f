//! cordova-access CLI
//!
//! Entry point for the `cordova-access` command-line tool.

use clap::{Args, Parser, Subcommand};
use cordova_access::config::{EffectiveSettings, SettingsLayer, DEFAULT_MANIFEST_FILE};
use cordova_access::request::parse_attribute;
use cordova_access::{
    AccessStage, ApplyReport, ConfigXml, LineEnding, OriginAction, OriginRequest, OriginValue,
    ProjectItem,
};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Exit code for configuration load/parse/persist failures
const EXIT_CONFIG: i32 = 1;

/// Exit code for invalid requests
const EXIT_USAGE: i32 = 2;

#[derive(Parser)]
#[command(name = "cordova-access")]
#[command(about = "Manage <access> origins in a Cordova config.xml", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Cordova project directory (default: current directory)
    #[arg(long, short = 'p', global = true, default_value = ".")]
    project: PathBuf,

    /// Path to access manifest (default: <project>/access.toml)
    #[arg(long, short = 'm', global = true)]
    manifest: Option<PathBuf>,

    /// Descriptor path relative to the project (default: config.xml)
    #[arg(long, global = true)]
    config_file: Option<String>,

    /// Spaces per nesting level when writing
    #[arg(long, global = true)]
    indent: Option<usize>,

    /// Line terminator when writing (native, lf, crlf)
    #[arg(long, global = true)]
    line_ending: Option<LineEnding>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List declared access origins
    List,

    /// Declare an origin, replacing its extra attributes
    Set {
        /// Origin pattern (e.g. "*", "https://example.com", "tel:*")
        origin: String,

        /// Extra attribute (repeatable), e.g. --attr launch-external=yes
        #[arg(long = "attr", short = 'a', value_name = "KEY=VALUE")]
        attrs: Vec<String>,
    },

    /// Remove one or more origins
    Remove {
        /// Origin patterns to remove
        #[arg(required = true)]
        origins: Vec<String>,
    },

    /// Apply the [origins] table of the access manifest
    Apply,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match cli.command {
        Commands::List => run_list(&cli.global),
        Commands::Set { origin, attrs } => {
            let request = build_set_request(&origin, &attrs);
            run_stage(&cli.global, request, false).await;
        }
        Commands::Remove { origins } => {
            let request = OriginRequest::from_entries(
                origins.into_iter().map(|o| (o, OriginValue::Remove)),
            )
            .unwrap_or_else(|e| exit_usage(&e));
            run_stage(&cli.global, request, false).await;
        }
        Commands::Apply => run_stage(&cli.global, OriginRequest::new(), true).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_usage(error: &dyn std::fmt::Display) -> ! {
    eprintln!("Invalid request: {}", error);
    process::exit(EXIT_USAGE);
}

fn build_set_request(origin: &str, attrs: &[String]) -> OriginRequest {
    let mut attributes = BTreeMap::new();
    for arg in attrs {
        let (key, value) = parse_attribute(arg).unwrap_or_else(|e| exit_usage(&e));
        attributes.insert(key, value);
    }
    OriginRequest::single(origin, attributes).unwrap_or_else(|e| exit_usage(&e))
}

fn load_settings(global: &GlobalArgs, manifest_required: bool) -> EffectiveSettings {
    let explicit = global.manifest.is_some();
    let manifest_path = global
        .manifest
        .clone()
        .unwrap_or_else(|| global.project.join(DEFAULT_MANIFEST_FILE));

    let cli_overrides = SettingsLayer {
        config_file: global.config_file.clone(),
        indent: global.indent,
        line_ending: global.line_ending,
    };

    match EffectiveSettings::build(
        Some(&manifest_path),
        explicit || manifest_required,
        cli_overrides,
    ) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading manifest {}: {}", manifest_path.display(), e);
            process::exit(EXIT_CONFIG);
        }
    }
}

fn run_list(global: &GlobalArgs) {
    let effective = load_settings(global, false);
    let path = global.project.join(&effective.settings.config_file);

    let document = match ConfigXml::load(&path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Configuration error in {}: {}", path.display(), e);
            process::exit(EXIT_CONFIG);
        }
    };
    let entries = document.access_entries();

    if global.json {
        match serde_json::to_string_pretty(&entries) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_CONFIG);
            }
        }
        return;
    }

    if entries.is_empty() {
        println!("No access origins declared in {}.", path.display());
        return;
    }

    println!("Access origins in {} ({} total):\n", path.display(), entries.len());
    for entry in entries {
        if entry.attributes.is_empty() {
            println!("  {}", entry.origin);
        } else {
            let attrs: Vec<String> = entry
                .attributes
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            println!("  {} ({})", entry.origin, attrs.join(", "));
        }
    }
}

async fn run_stage(global: &GlobalArgs, request: OriginRequest, from_manifest: bool) {
    let effective = load_settings(global, from_manifest);

    let request = if from_manifest {
        effective.origins.clone()
    } else {
        request
    };

    if from_manifest && request.is_empty() {
        eprintln!("Manifest declares no [origins]; nothing to apply.");
    }

    let stage = AccessStage::new(request).with_settings(effective.settings.clone());
    let item = ProjectItem::new(&global.project);

    match stage.process(item).await {
        Ok(processed) => print_report(&processed.report, global.json),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(e.exit_code());
        }
    }
}

fn print_report(report: &ApplyReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(EXIT_CONFIG);
            }
        }
        return;
    }

    for outcome in &report.reconcile.outcomes {
        let verb = match outcome.action {
            OriginAction::Added => "added",
            OriginAction::Updated => "updated",
            OriginAction::Unchanged => "unchanged",
            OriginAction::Removed => "removed",
            OriginAction::Absent => "not present",
        };
        println!("  {:<12} {}", verb, outcome.origin);
    }

    if report.written {
        println!("Wrote {}", report.config_path.display());
    } else {
        println!("No changes to {}", report.config_path.display());
    }
}
