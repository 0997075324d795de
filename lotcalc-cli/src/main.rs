//! lotcalc CLI: position sizing and range highlighting commands.
//!
//! Commands:
//! - `size`: lot size, bracket prices and money amounts for one trade
//! - `highlight`: flag the top percent of range columns in a CSV file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lotcalc_core::config::{LotcalcConfig, SizingDefaults};
use lotcalc_core::domain::{Commission, Instrument, RiskMode, Side, StopUnit};
use lotcalc_core::highlight::{default_output_path, highlight_csv, HighlightReport, HighlightRule};
use lotcalc_core::sizing::{calculate_position_size_with, PositionSizeInput, PositionSizeResult};

#[derive(Parser)]
#[command(
    name = "lotcalc",
    about = "lotcalc: position size calculator and range highlighter",
    version
)]
struct Cli {
    /// TOML file with defaults for optional parameters.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log sizing internals to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute position size, stop/target prices, commission and net risk/profit.
    #[command(allow_negative_numbers = true)]
    Size(SizeArgs),
    /// Flag the top percent of values in range columns of a CSV file.
    Highlight {
        /// Range CSV with a header row.
        input: PathBuf,

        /// Column to highlight (repeatable). Defaults to PERIOD_M1/M5/M15/M30.
        #[arg(long = "column")]
        columns: Vec<String>,

        /// Size of the highlighted slice, in percent. Defaults to 10.
        #[arg(long)]
        top_percent: Option<f64>,

        /// Output file. Defaults to Range_highlighted.csv next to the input.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum RiskModeArg {
    /// risk_value is a percent of balance
    Pct,
    /// risk_value is a fixed amount in account currency
    #[value(alias = "fixed")]
    Aud,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StopUnitArg {
    Pips,
    Points,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum SideArg {
    Buy,
    Sell,
}

#[derive(clap::Args, Debug)]
struct SizeArgs {
    /// Current price.
    price: f64,
    /// Symbol digits.
    digits: u32,
    /// Point size.
    point: f64,
    /// Tick value.
    tick_value: f64,
    /// Tick size.
    tick_size: f64,
    /// Contract size.
    contract_size: f64,
    /// Account balance.
    balance: f64,
    /// Risk mode.
    #[arg(value_enum)]
    risk_mode: RiskModeArg,
    /// Risk percent or fixed amount.
    risk_value: f64,
    /// Stop loss unit.
    #[arg(value_enum)]
    sl_unit: StopUnitArg,
    /// Stop loss value.
    sl_value: f64,
    /// Trade side.
    #[arg(value_enum)]
    side: SideArg,

    /// Commission per lot. A value of 7 means none unless --literal-commission is set.
    #[arg(long)]
    commission: Option<f64>,

    /// Charge --commission as given, including 7.
    #[arg(long, default_value_t = false)]
    literal_commission: bool,

    /// Volume step (default 1).
    #[arg(long)]
    volume_step: Option<f64>,

    /// Risk reward ratio (default 2).
    #[arg(long)]
    rr_ratio: Option<f64>,

    /// Minimum net profit (default 20).
    #[arg(long)]
    min_net: Option<f64>,

    /// Print the full result, including intermediate quantities, as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = LotcalcConfig::load_or_default(cli.config.as_deref())
        .context("failed to load lotcalc config")?;

    match cli.command {
        Commands::Size(args) => run_size(&args, &config.sizing),
        Commands::Highlight {
            input,
            columns,
            top_percent,
            output,
        } => run_highlight(input, columns, top_percent, output, &config),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_size(args: &SizeArgs, defaults: &SizingDefaults) -> Result<()> {
    let input = build_input(args, defaults);
    debug!(?input, policy = ?defaults.policy(), "sizing request");
    let result = calculate_position_size_with(&input, &defaults.policy())
        .context("position size calculation failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
        println!("{json}");
    } else {
        print_result(&result, input.instrument.digits);
    }
    Ok(())
}

/// Merge positional arguments with flag values, falling back to the config file.
fn build_input(args: &SizeArgs, defaults: &SizingDefaults) -> PositionSizeInput {
    let volume_step = args.volume_step.unwrap_or(defaults.volume_step);

    PositionSizeInput {
        instrument: Instrument::new(
            args.digits,
            args.point,
            args.tick_value,
            args.tick_size,
            args.contract_size,
            volume_step,
        ),
        price: args.price,
        balance: args.balance,
        risk: match args.risk_mode {
            RiskModeArg::Pct => RiskMode::Percentage(args.risk_value),
            RiskModeArg::Aud => RiskMode::FixedAmount(args.risk_value),
        },
        sl_unit: match args.sl_unit {
            StopUnitArg::Pips => StopUnit::Pips,
            StopUnitArg::Points => StopUnit::Points,
        },
        sl_value: args.sl_value,
        commission: resolve_commission(args.commission, args.literal_commission, defaults),
        rr_ratio: args.rr_ratio.unwrap_or(defaults.rr_ratio),
        min_net: args.min_net.unwrap_or(defaults.min_net),
        side: match args.side {
            SideArg::Buy => Side::Buy,
            SideArg::Sell => Side::Sell,
        },
    }
}

fn resolve_commission(flag: Option<f64>, literal: bool, defaults: &SizingDefaults) -> Commission {
    let literal = literal || defaults.literal_commission;
    match flag.or(defaults.commission) {
        None => Commission::none(),
        Some(value) if literal => Commission::per_lot(value),
        Some(value) => Commission::from_legacy(value),
    }
}

fn print_result(result: &PositionSizeResult, digits: u32) {
    for (label, value) in result.labeled_fields(digits) {
        println!("{label}: {value}");
    }
}

fn run_highlight(
    input: PathBuf,
    columns: Vec<String>,
    top_percent: Option<f64>,
    output: Option<PathBuf>,
    config: &LotcalcConfig,
) -> Result<()> {
    if !input.exists() {
        bail!("input file does not exist: {}", input.display());
    }

    let mut rule: HighlightRule = config.highlight.rule();
    if !columns.is_empty() {
        rule.columns = columns;
    }
    if let Some(pct) = top_percent {
        rule.top_percent = pct;
    }

    let output = output.unwrap_or_else(|| default_output_path(&input));
    debug!(
        input = %input.display(),
        output = %output.display(),
        columns = ?rule.columns,
        top_percent = rule.top_percent,
        "highlight request"
    );
    let report = highlight_csv(&input, &output, &rule)
        .with_context(|| format!("failed to highlight {}", input.display()))?;

    println!("Saved highlighted file to {}", output.display());
    print_highlight_summary(&report);
    Ok(())
}

fn print_highlight_summary(report: &HighlightReport) {
    for col in &report.columns {
        match col.threshold {
            Some(threshold) => println!(
                "  {}: {} of {} values >= {}",
                col.column,
                col.rows.len(),
                col.numeric_cells,
                threshold
            ),
            None => println!("  {}: no numeric values", col.column),
        }
    }
    for name in &report.missing_columns {
        println!("  {name}: not in file, skipped");
    }
}
