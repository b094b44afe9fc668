//! Command-line interface for the tunnel section reorderer.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::ExportFormat;
use crate::processors::reorder::{FieldSelection, ReorderOutcome};
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "tunnel-reorder")]
#[command(about = "Reorder tunnel cross-section points clockwise from the third quadrant", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Which export files to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Csv,
    Txt,
    Both,
    /// Skip export
    #[value(name = "none")]
    Skip,
}

impl FormatArg {
    fn formats(self) -> Vec<ExportFormat> {
        match self {
            FormatArg::Csv => vec![ExportFormat::Csv],
            FormatArg::Txt => vec![ExportFormat::Txt],
            FormatArg::Both => vec![ExportFormat::Csv, ExportFormat::Txt],
            FormatArg::Skip => Vec::new(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Reorder one CSV/TXT point file
    Reorder {
        /// Input CSV or TXT file
        input: PathBuf,
        /// Column used as x (guessed from the header if omitted)
        #[arg(short = 'x', long)]
        x_field: Option<String>,
        /// Column used as y (guessed from the header if omitted)
        #[arg(short = 'y', long)]
        y_field: Option<String>,
        /// Directory for the exported files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Export formats (defaults to the config, CSV and TXT)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
        /// Write a PNG shape preview to this path
        #[arg(long)]
        plot: Option<PathBuf>,
        /// Number of reordered rows to print
        #[arg(long, default_value_t = 10)]
        preview: usize,
    },

    /// List columns and the guessed coordinate pair
    Columns {
        /// Input CSV or TXT file
        input: PathBuf,
    },

    /// Reorder every CSV/TXT file of a directory
    Batch {
        /// Directory containing point files
        input_dir: PathBuf,
        /// Output directory for reordered files
        output_dir: PathBuf,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 39 {
            format!("{}...", value.chars().take(36).collect::<String>())
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    // Dispatch to subcommands
    match cli.command {
        Commands::Reorder {
            input,
            x_field,
            y_field,
            output_dir,
            format,
            plot,
            preview,
        } => {
            let formats = format
                .map(FormatArg::formats)
                .unwrap_or_else(|| config.export.formats.clone());
            cmd_reorder(
                &input,
                x_field.as_deref(),
                y_field.as_deref(),
                &output_dir,
                &formats,
                plot.as_deref(),
                preview,
                &config,
            );
        }
        Commands::Columns { input } => {
            cmd_columns(&input, &config);
        }
        Commands::Batch { input_dir, output_dir } => {
            cmd_batch(&input_dir, &output_dir, &config);
        }
    }
}

/// Print the first `limit` output rows with their display role.
fn print_preview(outcome: &ReorderOutcome, limit: usize) {
    if limit == 0 {
        return;
    }

    let mut header = outcome.table.columns.join("\t");
    header.push_str("\tType");
    println!("{}", header);

    for (i, record) in outcome.table.records.iter().take(limit).enumerate() {
        let cells: Vec<&str> = record.texts().collect();
        println!("{}\t{}", cells.join("\t"), outcome.role(i).label());
    }

    let remaining = outcome.table.len().saturating_sub(limit);
    if remaining > 0 {
        println!("... {} more rows", remaining);
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_reorder(
    input: &Path,
    x_field: Option<&str>,
    y_field: Option<&str>,
    output_dir: &Path,
    formats: &[ExportFormat],
    plot: Option<&Path>,
    preview: usize,
    config: &PipelineConfig,
) {
    use crate::processors::pipeline;
    use crate::visualization;

    let start = Instant::now();

    let spinner = create_spinner("Reordering points...");

    let (fields, outcome) = match pipeline::reorder_file(input, x_field, y_field, config) {
        Ok(result) => result,
        Err(e) => {
            spinner.finish_and_clear();
            error!("Reorder failed: {:#}", e);
            std::process::exit(1);
        }
    };

    let targets: Vec<(ExportFormat, PathBuf)> = formats
        .iter()
        .map(|&f| (f, output_dir.join(config.export.file_name(f))))
        .collect();

    spinner.set_message("Writing output files...");
    if let Err(e) = pipeline::export_outcome(&outcome, &targets) {
        spinner.finish_and_clear();
        error!("Export failed: {:#}", e);
        std::process::exit(1);
    }

    let mut plot_failed = false;
    if let Some(plot_path) = plot {
        spinner.set_message("Generating plot...");
        if let Err(e) = visualization::plot_section(plot_path, &outcome, &fields, &config.plot) {
            // exported files stay in place; the exit status reports the failure
            error!("Plot failed: {}", e);
            plot_failed = true;
        }
    }

    spinner.finish_and_clear();

    print_preview(&outcome, preview);

    let outputs: Vec<String> = targets.iter().map(|(_, p)| p.display().to_string()).collect();
    print_summary(
        "Reorder Complete",
        &[
            ("Input file", input.display().to_string()),
            ("X / Y fields", format!("{} / {}", fields.x, fields.y)),
            ("Points", outcome.table.len().to_string()),
            ("Start (sorted pos)", outcome.start_index.to_string()),
            ("Start (input row)", outcome.start_source_row.to_string()),
            (
                "Warning",
                outcome
                    .warning
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "none".to_string()),
            ),
            ("Output files", outputs.join(", ")),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    if plot_failed {
        std::process::exit(1);
    }
}

fn cmd_columns(input: &Path, config: &PipelineConfig) {
    use crate::core::loaders;
    use crate::processors::columns;

    let table = match loaders::load_table(input, &config.loader) {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to load {}: {}", input.display(), e);
            std::process::exit(1);
        }
    };

    for (i, name) in table.columns.iter().enumerate() {
        println!("{:>3}  {}", i, name);
    }

    let guess = columns::guess_coordinate_fields(&table.columns);
    let resolved = columns::resolve_fields(&table.columns, None, None, &config.reorder);

    let show = |f: Option<FieldSelection>| {
        f.map(|f| format!("{} / {}", f.x, f.y))
            .unwrap_or_else(|| "n/a".to_string())
    };

    print_summary(
        "Columns",
        &[
            ("Input file", input.display().to_string()),
            ("Rows", table.len().to_string()),
            ("Columns", table.columns.len().to_string()),
            ("Guessed X / Y", show(guess)),
            ("Effective X / Y", show(resolved)),
        ],
    );
}

fn cmd_batch(input_dir: &Path, output_dir: &Path, config: &PipelineConfig) {
    use crate::processors::pipeline;

    let start = Instant::now();

    println!("Reordering point files in batch mode...");
    println!("Input directory: {}", input_dir.display());
    println!("Output directory: {}", output_dir.display());

    let spinner = create_spinner("Reordering files...");

    let entries = match pipeline::reorder_directory(input_dir, output_dir, config) {
        Ok(entries) => entries,
        Err(e) => {
            spinner.finish_and_clear();
            error!("Batch failed: {:#}", e);
            std::process::exit(1);
        }
    };

    spinner.finish_and_clear();

    let mut failed = 0usize;
    let mut warned = 0usize;
    for entry in &entries {
        let name = entry
            .input
            .file_name()
            .unwrap_or_default()
            .to_string_lossy();
        match &entry.result {
            Ok(report) => {
                if let Some(w) = report.warning {
                    warned += 1;
                    println!("{}: {} points, start row {} ({})", name, report.rows, report.start_source_row, w);
                } else {
                    println!("{}: {} points, start row {}", name, report.rows, report.start_source_row);
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: FAILED: {}", name, e);
            }
        }
    }

    print_summary(
        "Batch Reorder Complete",
        &[
            ("Input directory", input_dir.display().to_string()),
            ("Output directory", output_dir.display().to_string()),
            ("Files", entries.len().to_string()),
            ("Failed", failed.to_string()),
            ("Without Q3 start", warned.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    if failed > 0 {
        std::process::exit(1);
    }
}
