//! cliform CLI - run, check and inspect console wizards

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cliform::{ConsoleTerminal, ElementSpec, FixSuggestion, FormError, Template, TemplateSource, WizardFile};

#[derive(Parser)]
#[command(name = "cliform")]
#[command(about = "cliform - template-driven console forms and wizards")]
#[command(version)]
struct Cli {
    /// Log engine transitions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a wizard file
    Run {
        /// Path to the wizard YAML file
        file: PathBuf,

        /// Start at this form instead of the file's `start`
        #[arg(short, long)]
        start: Option<String>,

        /// Seed a context value (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,

        /// Do not clear the screen before each form
        #[arg(long)]
        no_clear: bool,
    },

    /// Validate a wizard file without running it
    Check {
        /// Path to the wizard YAML file
        file: PathBuf,
    },

    /// Show how each line of a template parses
    Inspect {
        /// Path to a template file
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = InspectFormat::Text)]
        format: InspectFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();

    // stdout belongs to the wizard; logs go to stderr
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let result = match cli.command {
        Commands::Run {
            file,
            start,
            set,
            no_clear,
        } => run_wizard(&file, start, set, no_clear),
        Commands::Check { file } => check_wizard(&file),
        Commands::Inspect { file, format } => inspect_template(&file, format),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        if let Some(suggestion) = e.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
        std::process::exit(1);
    }
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn run_wizard(
    file: &Path,
    start: Option<String>,
    overrides: Vec<(String, String)>,
    no_clear: bool,
) -> Result<(), FormError> {
    let wizard = WizardFile::load(file)?;
    let report = wizard.validate()?;
    print_warnings(&report.warnings);

    let start = start.unwrap_or_else(|| wizard.start.clone());
    let mut engine = wizard
        .engine_builder()?
        .context_values(overrides)
        .terminal(ConsoleTerminal::stdio())
        .clear_screen(!no_clear)
        .build()?;

    engine.start(&start)
}

fn check_wizard(file: &Path) -> Result<(), FormError> {
    let wizard = WizardFile::load(file)?;
    let report = wizard.validate()?;
    print_warnings(&report.warnings);

    println!(
        "{} {} ({} forms, {} handlers, start: {})",
        "✓".green(),
        file.display(),
        report.forms,
        report.handlers,
        wizard.start.cyan()
    );
    Ok(())
}

fn inspect_template(file: &Path, format: InspectFormat) -> Result<(), FormError> {
    let source_id = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());
    let specs = Template::load(source_id, &TemplateSource::file(file))?.parse()?;

    match format {
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&specs)?;
            println!("{}", json);
        }
        InspectFormat::Text => {
            for (index, spec) in specs.iter().enumerate() {
                println!("{:>4}  {}", index + 1, describe(spec));
            }
        }
    }
    Ok(())
}

fn describe(spec: &ElementSpec) -> String {
    let mut line = match spec {
        ElementSpec::Text(_) => format!("{}   {:?}", "text".dimmed(), spec.format()),
        ElementSpec::Input(input) => format!(
            "{}  {:?} -> [{}{}]",
            "input".cyan(),
            spec.format(),
            if input.obscured { "!" } else { "" },
            input.handler_ref.as_deref().unwrap_or("")
        ),
    };
    if !spec.arg_refs().is_empty() {
        line.push_str(&format!("  args: {}", spec.arg_refs().join(", ")));
    }
    line
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {}", "Warning:".yellow().bold(), warning);
    }
}
