//! Turnover CLI
//!
//! Offline command-line access to the same pipeline the dashboard serves:
//! - Summarise a spreadsheet
//! - Print the formatted pivot table
//! - Print chart specs for a grouping
//! - Export the pivot table as XLSX or CSV

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use turnover_dashboard::config::{generate_default_config, Config};
use turnover_dashboard::pivot::{load_pivot, Dimension, Language, PivotTable};
use turnover_dashboard::report::{ChartBuilder, FormattedTable};

#[derive(Parser)]
#[command(name = "turnover-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "HR turnover pivot and chart builder")]
#[command(long_about = "Loads an employee-level turnover spreadsheet, aggregates it by\norganization, department group, position group and sex, and prints\nor exports the results.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Turnover spreadsheet (overrides data.path)
    #[arg(short, long, global = true)]
    pub input: Option<PathBuf>,

    /// Worksheet name (overrides data.sheet)
    #[arg(long, global = true)]
    pub sheet: Option<String>,

    /// Header language (en, ru)
    #[arg(short, long, global = true)]
    pub lang: Option<String>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show record, group and distinct value counts
    Summary,

    /// Print the formatted pivot table
    Table,

    /// Print the four chart specs as JSON
    Charts {
        /// Grouping dimension; omit for empty charts
        #[arg(short, long)]
        dimension: Option<String>,
    },

    /// Export the formatted pivot table (.xlsx or .csv, by extension)
    Export {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List grouping dimensions
    Dimensions,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turnover_dashboard=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Config { output } => write_default_config(output.as_deref()),

        Commands::Dimensions => {
            let session = Session::open(&cli)?;
            for dimension in Dimension::all() {
                let marker = if *dimension == session.config.dashboard.default_dimension {
                    " (default)"
                } else {
                    ""
                };
                println!(
                    "{:<18} {}{}",
                    dimension.key(),
                    dimension.display_name(session.language),
                    marker
                );
            }
            Ok(())
        }

        Commands::Summary => {
            let table = Session::open(&cli)?.load_table()?;
            print_summary(&table, &cli.format)
        }

        Commands::Table => {
            let session = Session::open(&cli)?;
            let formatted = FormattedTable::from_pivot(&session.load_table()?, session.language);
            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&formatted)?),
                "csv" => print!("{}", formatted.to_csv_string()?),
                _ => print_table(&formatted),
            }
            Ok(())
        }

        Commands::Charts { dimension } => {
            let selected = match dimension.as_deref().map(str::trim) {
                None | Some("") => None,
                Some(d) => Some(d.parse::<Dimension>().map_err(anyhow::Error::msg)?),
            };
            let session = Session::open(&cli)?;
            let table = session.load_table()?;
            let charts = ChartBuilder::new(&table, session.language).build_charts(selected);
            println!("{}", serde_json::to_string_pretty(&charts)?);
            Ok(())
        }

        Commands::Export { output } => {
            let session = Session::open(&cli)?;
            let formatted = FormattedTable::from_pivot(&session.load_table()?, session.language);
            formatted
                .export(output)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Exported {} rows to {:?}", formatted.len(), output);
            Ok(())
        }
    }
}

/// Resolved config plus command-line overrides
struct Session {
    config: Config,
    language: Language,
    input: PathBuf,
    sheet: Option<String>,
}

impl Session {
    fn open(cli: &Cli) -> anyhow::Result<Self> {
        let config = match &cli.config {
            Some(path) => Config::load_with_env(path)?,
            None => Config::load_default()?,
        };

        let language = match cli.lang.as_deref() {
            Some(lang) => lang.parse::<Language>().map_err(anyhow::Error::msg)?,
            None => config.dashboard.language,
        };

        let input = cli.input.clone().unwrap_or_else(|| config.data.path.clone());
        let sheet = cli.sheet.clone().or_else(|| config.data.sheet.clone());

        Ok(Self {
            config,
            language,
            input,
            sheet,
        })
    }

    fn load_table(&self) -> anyhow::Result<PivotTable> {
        load_pivot(&self.input, self.sheet.clone())
            .with_context(|| format!("failed to load {}", self.input.display()))
    }
}

fn write_default_config(output: Option<&Path>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &config)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Config written to {:?}", path);
        }
        None => print!("{}", config),
    }

    Ok(())
}

fn print_summary(table: &PivotTable, format: &str) -> anyhow::Result<()> {
    let summary = table.summary();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        "table" => {
            println!("Records: {}", summary.raw_records);
            println!("Groups:  {}", summary.groups);
            println!();
            println!("{:<18} {}", "Dimension", "Distinct values");
            println!("{}", "-".repeat(34));
            for count in &summary.distinct_values {
                println!("{:<18} {}", count.dimension.key(), count.values);
            }
        }
        other => bail!("unsupported format for summary: {}", other),
    }

    Ok(())
}

fn print_table(table: &FormattedTable) {
    if table.is_empty() {
        println!("No data");
        return;
    }

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect::<Vec<_>>()
            .join(" | ")
    };

    println!("{}", render(&table.headers));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 3 * (widths.len() - 1)));
    for row in &table.rows {
        println!("{}", render(row));
    }
}

/// Left-align by character count so Cyrillic text lines up
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}
