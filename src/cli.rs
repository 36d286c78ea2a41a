//! The command line interface for the program.
use crate::coverage::{ReferenceTable, barcelona_reference_table, read_reference_table};
use crate::log;
use crate::output::metadata::write_metadata;
use crate::output::{create_output_directory, get_output_dir, write_analysis};
use crate::pipeline::{PipelineOptions, run_pipeline_from_path};
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the program.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Whether to keep only the last row for each bar name
    #[arg(long)]
    pub deduplicate: bool,
    /// CSV file of official bar counts by district (defaults to the Barcelona table)
    #[arg(long)]
    pub reference: Option<PathBuf>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Analyse a price file.
    Run {
        /// Path to the price CSV file.
        price_file: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Manage example datasets.
    Example {
        /// The available subcommands for managing example datasets.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Check that a price file can be analysed, without writing any output.
    Validate {
        /// Path to the price CSV file.
        price_file: PathBuf,
        /// CSV file of official bar counts by district (defaults to the Barcelona table)
        #[arg(long)]
        reference: Option<PathBuf>,
    },
    /// Manage the program settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { price_file, opts } => handle_run_command(&price_file, &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate {
                price_file,
                reference,
            } => handle_validate_command(&price_file, reference.as_deref(), None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start the program
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ birres --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load the reference table from file, or use the built-in one
fn load_reference_table(reference: Option<&Path>) -> Result<ReferenceTable> {
    match reference {
        Some(file_path) => read_reference_table(file_path),
        None => Ok(barcelona_reference_table()),
    }
}

/// Handle the `run` command.
pub fn handle_run_command(
    price_file: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let mut settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // These settings can be overridden by command-line arguments
    if opts.overwrite {
        settings.overwrite = true;
    }
    if opts.deduplicate {
        settings.deduplicate = true;
    }

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(price_file)?;
        &pathbuf
    };

    let overwrite =
        create_output_directory(output_path, settings.overwrite).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(Some(settings.log_level.as_str()), Some(output_path))
        .context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let reference = load_reference_table(opts.reference.as_deref())
        .context("Failed to load reference table.")?;
    let options = PipelineOptions {
        deduplicate: settings.deduplicate,
        top_n: settings.top_n,
    };
    let analysis = run_pipeline_from_path(price_file, &reference, &options)
        .context("Failed to load price data.")?;
    info!("Loaded price data from {}", price_file.display());
    info!("Output folder: {}", output_path.display());

    write_analysis(output_path, &analysis).context("Failed to write results.")?;
    write_metadata(output_path, price_file, opts.reference.as_deref(), &options)?;
    info!("Analysis complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(
    price_file: &Path,
    reference: Option<&Path>,
    settings: Option<Settings>,
) -> Result<()> {
    // Load program settings, if not provided
    let settings = if let Some(settings) = settings {
        settings
    } else {
        Settings::load().context("Failed to load settings.")?
    };

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(Some(settings.log_level.as_str()), None)
        .context("Failed to initialise logging.")?;

    let reference = load_reference_table(reference).context("Failed to load reference table.")?;
    let options = PipelineOptions {
        deduplicate: settings.deduplicate,
        top_n: settings.top_n,
    };
    let analysis = run_pipeline_from_path(price_file, &reference, &options)
        .context("Failed to validate price data.")?;
    info!(
        "Validation successful: {} valid rows, {} skipped",
        analysis.records.len(),
        analysis.skipped.len()
    );

    Ok(())
}
