//! recsort CLI: sort large record files by typed columns using the system `sort`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use recsort_core::config::{SortColumns, SortConfig};
use recsort_core::schema::Schema;
use recsort_io::{Compression, Driver};
use recsort_sort::pipeline::{sort_file, StreamSpec};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "recsort", version, propagate_version = true)]
#[command(about = "External, disk-backed sort of record files by one or more columns", long_about = None)]
struct Cli {
    /// Input driver (jsonl, csv); defaults to the input file extension
    #[arg(long = "i-drv", global = true)]
    input_driver: Option<Driver>,

    /// Input compression (none, gzip, zstd); defaults to the input file extension
    #[arg(long = "i-cmp", global = true)]
    input_compression: Option<Compression>,

    /// Output driver (jsonl, csv); defaults to the output file extension
    #[arg(long = "o-drv", global = true)]
    output_driver: Option<Driver>,

    /// Output compression (none, gzip, zstd); defaults to the output file extension
    #[arg(long = "o-cmp", global = true)]
    output_compression: Option<Compression>,

    /// Field type hints, e.g. "timestamp:timestamp,mmsi:integer"
    #[arg(long, global = true)]
    schema: Option<String>,

    /// Log phase transitions (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sort INFILE into OUTFILE by the given columns
    Sort(SortArgs),
}

#[derive(Args, Debug, Clone)]
struct SortArgs {
    /// Comma-separated sort columns, highest priority first
    #[arg(short = 'c', long = "cols", default_value = "timestamp")]
    columns: SortColumns,

    /// Sort utility name or path (overrides RECSORT_SORT_PROGRAM)
    #[arg(long)]
    sort_program: Option<String>,

    /// Memory buffer handed to the sort utility, e.g. 1G
    #[arg(long)]
    buffer_size: Option<String>,

    /// Directory for the sort utility's own temporary files
    #[arg(long)]
    temp_dir: Option<String>,

    /// Compare whole lines instead of keys only; equal keys may reorder
    #[arg(long)]
    unstable: bool,

    infile: PathBuf,
    outfile: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = std::env::var("RECSORT_LOG")
        .ok()
        .and_then(|s| EnvFilter::try_new(s).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let schema = match &cli.schema {
        Some(s) => Schema::parse(s)?,
        None => Schema::default(),
    };

    match cli.command {
        Commands::Sort(args) => {
            let config = apply_sort_args(SortConfig::from_env(), &args);
            let input = StreamSpec::new(&args.infile)
                .with_driver(cli.input_driver)
                .with_compression(cli.input_compression);
            let output = StreamSpec::new(&args.outfile)
                .with_driver(cli.output_driver)
                .with_compression(cli.output_compression);

            let report = sort_file(config, &input, &output, schema)?;
            tracing::debug!(
                duration_ms = report.finished_ms - report.started_ms,
                "done"
            );
        }
    }
    Ok(())
}

fn apply_sort_args(mut config: SortConfig, args: &SortArgs) -> SortConfig {
    config.columns = args.columns.clone();
    if let Some(program) = &args.sort_program {
        config.sort_program = program.clone();
    }
    if let Some(size) = &args.buffer_size {
        config.sort_buffer_size = Some(size.clone());
    }
    if let Some(dir) = &args.temp_dir {
        config.sort_temp_dir = Some(dir.clone());
    }
    if args.unstable {
        config.stable = false;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn sort_args(argv: &[&str]) -> (Cli, SortArgs) {
        let cli = Cli::try_parse_from(argv).unwrap();
        let Commands::Sort(args) = &cli.command;
        let args = args.clone();
        (cli, args)
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn subcommand_reports_version() {
        let err = Cli::try_parse_from(["recsort", "sort", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn defaults_sort_by_timestamp() {
        let (cli, args) = sort_args(&["recsort", "sort", "in.jsonl", "out.jsonl"]);
        assert_eq!(args.columns.as_slice(), ["timestamp"]);
        assert!(!args.unstable);
        assert!(!cli.verbose);
        assert_eq!(cli.input_driver, None);
        assert_eq!(args.infile, PathBuf::from("in.jsonl"));
    }

    #[test]
    fn parses_drivers_and_columns() {
        let (cli, args) = sort_args(&[
            "recsort", "--i-drv", "csv", "--o-cmp", "gzip", "-v", "sort", "-c", "timestamp, lat", "in", "out",
        ]);
        assert_eq!(cli.input_driver, Some(Driver::Csv));
        assert_eq!(cli.output_compression, Some(Compression::Gzip));
        assert!(cli.verbose);
        assert_eq!(args.columns.as_slice(), ["timestamp", "lat"]);
    }

    #[test]
    fn rejects_bad_driver_and_empty_columns() {
        assert!(Cli::try_parse_from(["recsort", "--i-drv", "parquet", "sort", "a", "b"]).is_err());
        assert!(Cli::try_parse_from(["recsort", "sort", "-c", "", "a", "b"]).is_err());
        assert!(Cli::try_parse_from(["recsort", "sort", "a"]).is_err());
    }

    #[test]
    fn flags_override_config() {
        let (_, args) = sort_args(&[
            "recsort",
            "sort",
            "--sort-program",
            "/usr/bin/gsort",
            "--buffer-size",
            "2G",
            "--temp-dir",
            "/scratch",
            "--unstable",
            "a",
            "b",
        ]);
        let base = SortConfig {
            sort_buffer_size: Some("1G".into()),
            ..SortConfig::default()
        };
        let cfg = apply_sort_args(base, &args);
        assert_eq!(cfg.sort_program, "/usr/bin/gsort");
        assert_eq!(cfg.sort_buffer_size.as_deref(), Some("2G"));
        assert_eq!(cfg.sort_temp_dir.as_deref(), Some("/scratch"));
        assert!(!cfg.stable);
    }

    #[test]
    fn unset_flags_keep_config() {
        let (_, args) = sort_args(&["recsort", "sort", "a", "b"]);
        let base = SortConfig {
            sort_program: "gsort".into(),
            ..SortConfig::default()
        };
        let cfg = apply_sort_args(base, &args);
        assert_eq!(cfg.sort_program, "gsort");
        assert!(cfg.stable);
    }
}
