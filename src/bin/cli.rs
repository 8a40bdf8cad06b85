use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ccns::config::CcnConfig;
use ccns::prelude::*;
use ccns::tables;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ccncli")]
#[command(about = "CCN CLI - Canonicalize, classify, and decode CMS Certification Numbers", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to the user config directory)
    #[arg(long, global = true, env = "CCNS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of each CCN
    Clean(CleanArgs),
    /// Print the inferred type of each CCN
    Infer(InferArgs),
    /// Decode the state, facility type, and sequence number of each CCN
    Decode(DecodeArgs),
    /// Decode a column of a CSV file
    Batch(BatchArgs),
    /// List lookup table entries
    Tables(TablesArgs),
}

#[derive(Args)]
struct CleanArgs {
    /// Values to canonicalize
    #[arg(required = true)]
    inputs: Vec<String>,
    /// Canonicalize as 10-character supplier CCNs
    #[arg(long)]
    supplier: bool,
}

#[derive(Args)]
struct InferArgs {
    /// Values to classify
    #[arg(required = true)]
    inputs: Vec<String>,
}

#[derive(Args)]
struct DecodeArgs {
    /// Values to decode
    #[arg(required = true)]
    inputs: Vec<String>,
    /// Parse as this type instead of inferring it
    #[arg(long = "type", value_enum)]
    kind: Option<CcnTypeOpt>,
    /// Print JSON instead of a text summary
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// CSV file with a header row
    #[arg(short, long)]
    input: PathBuf,
    /// Column holding CCNs (defaults to the configured column)
    #[arg(short, long)]
    column: Option<String>,
    /// Parse every value as this type instead of inferring it
    #[arg(long = "type", value_enum)]
    kind: Option<CcnTypeOpt>,
    /// Output file for decoded records
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Output format (defaults to the configured format)
    #[arg(long, value_enum)]
    format: Option<OutputFormatOpt>,
    /// Record invalid CCNs instead of stopping at the first one
    #[arg(long, conflicts_with = "fail_fast")]
    skip_invalid: bool,
    /// Stop at the first invalid CCN, even if the config enables skipping
    #[arg(long)]
    fail_fast: bool,
    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args)]
struct TablesArgs {
    /// Only list the facility codes of this type
    #[arg(long = "type", value_enum)]
    kind: Option<CcnTypeOpt>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum CcnTypeOpt {
    Medicare,
    MedicaidOnly,
    IppsExcluded,
    EmergencyHospital,
    Supplier,
}

impl From<CcnTypeOpt> for CcnType {
    fn from(opt: CcnTypeOpt) -> Self {
        match opt {
            CcnTypeOpt::Medicare => CcnType::MedicareProvider,
            CcnTypeOpt::MedicaidOnly => CcnType::MedicaidOnlyProvider,
            CcnTypeOpt::IppsExcluded => CcnType::IppsExcludedProvider,
            CcnTypeOpt::EmergencyHospital => CcnType::EmergencyHospital,
            CcnTypeOpt::Supplier => CcnType::Supplier,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormatOpt {
    Json,
    Jsonl,
    Csv,
}

impl From<OutputFormatOpt> for OutputFormat {
    fn from(opt: OutputFormatOpt) -> Self {
        match opt {
            OutputFormatOpt::Json => OutputFormat::Json,
            OutputFormatOpt::Jsonl => OutputFormat::JsonLines,
            OutputFormatOpt::Csv => OutputFormat::Csv,
        }
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let result = load_config(cli.config.as_ref()).and_then(|config| match cli.command {
        Commands::Clean(args) => cmd_clean(args),
        Commands::Infer(args) => cmd_infer(args),
        Commands::Decode(args) => cmd_decode(args),
        Commands::Batch(args) => cmd_batch(args, &config),
        Commands::Tables(args) => cmd_tables(args),
    });

    if let Err(e) = result {
        match e.downcast_ref::<CcnError>() {
            Some(ccn_error) => eprintln!("Error: {}", ccn_error.user_message()),
            None => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<CcnConfig> {
    match path {
        Some(path) => CcnConfig::from_sources(Some(path.as_path()))
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(CcnConfig::load()),
    }
}

/// Run `f` on each input, reporting failures without stopping; fails if any input failed
fn for_each_input<F>(inputs: &[String], mut f: F) -> Result<()>
where
    F: FnMut(&str) -> ccns::Result<()>,
{
    let mut failures = 0;
    for input in inputs {
        if let Err(e) = f(input) {
            eprintln!("{}: {}", input, e);
            failures += 1;
        }
    }
    if failures > 0 {
        anyhow::bail!("{} of {} inputs failed", failures, inputs.len());
    }
    Ok(())
}

fn cmd_clean(args: CleanArgs) -> Result<()> {
    let length = if args.supplier { CcnLength::Supplier } else { CcnLength::Provider };
    for_each_input(&args.inputs, |input| {
        println!("{}", canonicalize(input, length)?);
        Ok(())
    })
}

fn cmd_infer(args: InferArgs) -> Result<()> {
    for_each_input(&args.inputs, |input| {
        let c = ccn(input)?;
        println!("{}\t{}", c, c.kind());
        Ok(())
    })
}

fn cmd_decode(args: DecodeArgs) -> Result<()> {
    let kind = args.kind.map(CcnType::from);
    for_each_input(&args.inputs, |input| {
        let c = match kind {
            Some(kind) => Ccn::parse_as(kind, input)?,
            None => ccn(input)?,
        };
        let decoded = c.decode();
        if args.json {
            println!("{}", serde_json::to_string(&decoded)?);
        } else {
            println!("{}", decoded);
        }
        Ok(())
    })
}

fn cmd_batch(args: BatchArgs, config: &CcnConfig) -> Result<()> {
    let column = args.column.as_deref().unwrap_or(&config.ccn_column);
    let processor = BatchProcessor::with_config(config)
        .expected_type(args.kind.map(CcnType::from))
        .skip_invalid_records(skip_invalid(&args, config))
        .show_progress(config.enable_progress_bar && !args.no_progress);

    let results = processor
        .process_csv(&args.input, column)
        .with_context(|| format!("Failed to process {}", args.input.display()))?;
    results.statistics().print_summary();

    if let Some(output) = &args.output {
        let format = args.format.map(OutputFormat::from).unwrap_or(config.default_output_format);
        results.export(output, format)?;
        println!("Exported {} records to {}", results.len(), output.display());
    }
    Ok(())
}

/// Command-line flags win over the configured default
fn skip_invalid(args: &BatchArgs, config: &CcnConfig) -> bool {
    if args.fail_fast {
        false
    } else {
        args.skip_invalid || config.skip_invalid_records
    }
}

fn cmd_tables(args: TablesArgs) -> Result<()> {
    match args.kind.map(CcnType::from) {
        Some(kind) => print_categories(kind),
        None => {
            println!("=== States ===");
            for (code, name) in tables::REGIONS {
                println!("{}\t{}", code, name);
            }
            for kind in CcnType::ALL {
                println!();
                print_categories(kind);
            }
        }
    }
    Ok(())
}

fn print_categories(kind: CcnType) {
    println!("=== {} Facility Types ===", kind);
    for (code, desc) in tables::categories(kind) {
        println!("{}\t{}", *code as char, desc);
    }
    match kind {
        CcnType::MedicareProvider => {
            for (lo, hi, desc) in tables::MEDICARE_RANGES {
                println!("{:04}-{:04}\t{}", lo, hi, desc);
            }
        }
        CcnType::IppsExcludedProvider => {
            println!("--- Parent Facility Types ---");
            for (code, desc) in tables::IPPS_PARENT_CODES {
                println!("{}\t{}", *code as char, desc);
            }
        }
        _ => {}
    }
}
