//! sprecon CLI binary.
//!
//! Reconstructs the S&P 500 from CRSP tables in a data directory.

mod integration;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use integration::config::{FileNames, data_config};
use integration::data_pipeline::{load_membership_table, load_reconstruction, window};
use sprecon::pipeline::Reconstruction;
use sprecon::{MembershipSummary, MembershipTable};
use sprecon_data::dates::parse_date;
use sprecon_data::loader::{DEFAULT_CONSTITUENTS_FILE, DEFAULT_INDEX_FILE, DEFAULT_STOCK_FILE};
use sprecon_index::{DateWindow, RebalanceConfig, RebalanceFrequency};
use sprecon_output::{
    ComparisonSummary, ExportFormat, Exporter, ReportBuilder, SeriesExport, WeightsExport,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sprecon")]
#[command(about = "Reconstruct the S&P 500 from CRSP security data", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the input CSV files
    #[arg(long, env = "DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Membership table file name
    #[arg(long, global = true, default_value = DEFAULT_CONSTITUENTS_FILE)]
    constituents_file: String,

    /// Monthly security file name
    #[arg(long, global = true, default_value = DEFAULT_STOCK_FILE)]
    stock_file: String,

    /// Monthly index file name
    #[arg(long, global = true, default_value = DEFAULT_INDEX_FILE)]
    index_file: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Output format of the membership commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum TextFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the index members on a date
    Constituents {
        /// As-of date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,

        /// Output format
        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,
    },

    /// Show additions and removals between two dates
    Changes {
        /// Earlier date
        #[arg(long, value_parser = parse_date_arg)]
        from: NaiveDate,

        /// Later date
        #[arg(long, value_parser = parse_date_arg)]
        to: NaiveDate,

        /// Output format
        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,
    },

    /// Summarize the membership table
    Describe {
        /// Output format
        #[arg(long, value_enum, default_value_t = TextFormat::Text)]
        format: TextFormat,
    },

    /// Method A: chain the total market cap of the members
    MethodA {
        /// First date
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,

        /// Last date
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,

        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Output format (csv, json, pretty-json)
        #[arg(long, value_parser = parse_format_arg)]
        format: Option<ExportFormat>,
    },

    /// Method B: compound a market-cap-weighted portfolio rebalanced on a schedule
    MethodB {
        /// First date
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,

        /// Last date
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,

        /// Rebalancing frequency (monthly, quarterly, annual)
        #[arg(long, value_parser = parse_frequency_arg, default_value = "quarterly")]
        frequency: RebalanceFrequency,

        /// Output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Write the weights set on each rebalancing date to this file
        #[arg(long)]
        weights: Option<PathBuf>,

        /// Output format (csv, json, pretty-json)
        #[arg(long, value_parser = parse_format_arg)]
        format: Option<ExportFormat>,
    },

    /// Run both methods and compare them with the official index
    Compare {
        /// First date
        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,

        /// Last date
        #[arg(long, value_parser = parse_date_arg)]
        end: Option<NaiveDate>,

        /// Rebalancing frequency of Method B
        #[arg(long, value_parser = parse_frequency_arg, default_value = "quarterly")]
        frequency: RebalanceFrequency,

        /// Write the merged table to this file
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print the summary as Markdown
        #[arg(long)]
        markdown: bool,

        /// Write a JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).map_err(|e| e.to_string())
}

fn parse_format_arg(raw: &str) -> Result<ExportFormat, String> {
    raw.parse().map_err(|e: sprecon_output::ExportError| e.to_string())
}

fn parse_frequency_arg(raw: &str) -> Result<RebalanceFrequency, String> {
    raw.parse()
        .map_err(|e: sprecon_index::IndexError| e.to_string())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = data_config(
        cli.data_dir.as_deref(),
        FileNames {
            constituents: cli.constituents_file,
            stocks: cli.stock_file,
            index: cli.index_file,
        },
    );
    match cli.command {
        Commands::Constituents { date, format } => {
            list_constituents(&load_membership_table(&config)?, date, format)?;
        }
        Commands::Changes { from, to, format } => {
            show_changes(&load_membership_table(&config)?, from, to, format)?;
        }
        Commands::Describe { format } => describe(&load_membership_table(&config)?, format)?,
        Commands::MethodA {
            start,
            end,
            output,
            format,
        } => {
            let window = window(start, end)?;
            let frame = load_reconstruction(&config)?.method_a(window)?;
            emit(
                &SeriesExport::new("method_a", frame),
                output.as_deref(),
                format,
            )?;
        }
        Commands::MethodB {
            start,
            end,
            frequency,
            output,
            weights,
            format,
        } => {
            let rebalance = RebalanceConfig::new(window(start, end)?).with_frequency(frequency);
            let (frame, portfolio) = load_reconstruction(&config)?.method_b(&rebalance)?;
            if let Some(path) = weights {
                WeightsExport::from_portfolio("method_b", &portfolio)
                    .export_to_file(&path, ExportFormat::from_path(&path))?;
                eprintln!(
                    "Wrote {} rebalancing snapshots to {}",
                    portfolio.snapshots().len(),
                    path.display()
                );
            }
            emit(
                &SeriesExport::new("method_b", frame),
                output.as_deref(),
                format,
            )?;
        }
        Commands::Compare {
            start,
            end,
            frequency,
            output,
            markdown,
            report,
        } => {
            let window = window(start, end)?;
            let recon = load_reconstruction(&config)?;
            compare(&recon, window, frequency, output, markdown, report)?;
        }
    }

    Ok(())
}

/// Write to a file, or to stdout when no path is given.
fn emit(
    export: &impl Exporter,
    output: Option<&Path>,
    format: Option<ExportFormat>,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            let format = format.unwrap_or_else(|| ExportFormat::from_path(path));
            export.export_to_file(path, format)?;
            eprintln!("Wrote {}", path.display());
        }
        None => {
            let content = export.export_to_string(format.unwrap_or_default())?;
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}

fn list_constituents(
    membership: &MembershipTable,
    date: NaiveDate,
    format: TextFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let members = membership.constituents_at(date);

    match format {
        TextFormat::Json => println!("{}", serde_json::to_string_pretty(&members)?),
        TextFormat::Text => {
            println!("\nS&P 500 constituents on {}: {}\n", date, members.len());
            println!(
                "{:>8} {:>10} {:>12} {:>12} {:>5}",
                "permno", "indno", "start", "end", "flag"
            );
            println!("{}", "-".repeat(51));
            for record in members {
                println!(
                    "{:>8} {:>10} {:>12} {:>12} {:>5}",
                    record.permno,
                    record.indno,
                    record.mbrstartdt,
                    record
                        .mbrenddt
                        .map_or_else(|| "-".to_string(), |d| d.to_string()),
                    record.mbrflg
                );
            }
        }
    }
    Ok(())
}

fn show_changes(
    membership: &MembershipTable,
    from: NaiveDate,
    to: NaiveDate,
    format: TextFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let changes = membership.changes_between(from, to);

    match format {
        TextFormat::Json => println!("{}", serde_json::to_string_pretty(&changes)?),
        TextFormat::Text => {
            println!("\nMembership changes from {} to {}\n", from, to);
            let list = |ids: &std::collections::BTreeSet<i64>| {
                ids.iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            println!("  Added   ({}): {}", changes.added.len(), list(&changes.added));
            println!("  Removed ({}): {}", changes.removed.len(), list(&changes.removed));
        }
    }
    Ok(())
}

fn describe(
    membership: &MembershipTable,
    format: TextFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = MembershipSummary::from_records(membership.records());
    match format {
        TextFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        TextFormat::Text => print!("{}", summary),
    }
    Ok(())
}

fn compare(
    recon: &Reconstruction,
    window: DateWindow,
    frequency: RebalanceFrequency,
    output: Option<PathBuf>,
    markdown: bool,
    report: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = recon.compare(window, frequency)?;
    let summary = ComparisonSummary::new("S&P 500", frequency, &result);

    if markdown {
        println!("{}", summary.to_markdown());
    } else {
        println!("{}", summary.to_ascii_table());
    }

    if let Some(path) = output {
        SeriesExport::new("comparison", result.frame.clone())
            .export_to_file(&path, ExportFormat::from_path(&path))?;
        eprintln!("Wrote {}", path.display());
    }

    if let Some(path) = report {
        ReportBuilder::new()
            .title("compare")
            .window(window.start, window.end)
            .contents(&summary)?
            .build()
            .write(&path)?;
        eprintln!("Wrote {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_method_b() {
        let cli = Cli::try_parse_from([
            "sprecon",
            "--data-dir",
            "/tmp/crsp",
            "method-b",
            "--start",
            "2019-01-01",
            "--frequency",
            "monthly",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/crsp")));
        match cli.command {
            Commands::MethodB {
                start,
                frequency,
                format,
                ..
            } => {
                assert_eq!(start, NaiveDate::from_ymd_opt(2019, 1, 1));
                assert_eq!(frequency, RebalanceFrequency::Monthly);
                assert_eq!(format, Some(ExportFormat::Json));
            }
            _ => panic!("expected method-b"),
        }
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Cli::try_parse_from(["sprecon", "constituents", "--date", "not-a-date"]).is_err());
    }

    #[test]
    fn test_default_file_names() {
        let cli = Cli::try_parse_from(["sprecon", "describe"]).unwrap();
        assert_eq!(cli.constituents_file, DEFAULT_CONSTITUENTS_FILE);
        assert_eq!(cli.verbose, 0);
    }
}
