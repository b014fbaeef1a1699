//! PriceLens CLI: render the close-price dashboard once and print it.
//!
//! Commands:
//! - `show` resolves tickers, fetches closes and prints the table, optionally
//!   as CSV, and can write the chart as a Vega-Lite document.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pricelens_core::chart::YDomain;
use pricelens_core::config::DashboardConfig;
use pricelens_core::dashboard::{render, DashboardInput, DashboardOutput, RenderContext};
use pricelens_core::data::{
    CircuitBreaker, DataProvider, FetchCache, SyntheticProvider, YahooProvider, DATE_COLUMN,
};
use pricelens_core::range::RangeInput;
use pricelens_core::shape::WideTable;
use pricelens_core::ticker::NameTable;

#[derive(Parser, Debug)]
#[command(
    name = "pricelens",
    about = "PriceLens CLI: daily close prices for a handful of tickers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch closes and print the dashboard table.
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
struct ShowArgs {
    /// Comma-separated ticker symbols. Defaults to the configured list.
    #[arg(long)]
    tickers: Option<String>,

    /// Start date (YYYY-MM-DD). Requires --end.
    #[arg(long, requires = "end", conflicts_with = "days")]
    start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD). Requires --start.
    #[arg(long, requires = "start", conflicts_with = "days")]
    end: Option<NaiveDate>,

    /// Look back this many days from today (1-50).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=50))]
    days: Option<u32>,

    /// Company name to include; repeat for several. Defaults to all fetched.
    #[arg(long = "select", value_name = "NAME")]
    select: Vec<String>,

    /// Add a day-over-day change column per company.
    #[arg(long, default_value_t = false)]
    changes: bool,

    /// Lower bound of the chart's y axis.
    #[arg(long)]
    ymin: Option<f64>,

    /// Upper bound of the chart's y axis.
    #[arg(long)]
    ymax: Option<f64>,

    /// Use the synthetic provider: no network access.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Print the table as CSV instead of aligned columns.
    #[arg(long, default_value_t = false)]
    csv: bool,

    /// Also print the merged closes before selection and forward-fill.
    #[arg(long, default_value_t = false)]
    raw: bool,

    /// Write the chart as a Vega-Lite JSON document to this path.
    #[arg(long, value_name = "PATH")]
    vega_lite: Option<PathBuf>,

    /// Path to a TOML config file. Missing file means defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Show(args) => {
            let ok = run_show(&args)?;
            if !ok {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

/// Returns `false` when the dashboard came back with a blocking error.
fn run_show(args: &ShowArgs) -> Result<bool> {
    let config = match &args.config {
        Some(path) => DashboardConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    let today = Local::now().date_naive();
    let input = build_input(args, &config, today)?;
    let provider = build_provider(&config, args.offline)?;
    let names = config.name_table();
    let mut cache = FetchCache::new();

    let mut ctx = RenderContext {
        provider: provider.as_ref(),
        cache: &mut cache,
        names: &names,
        today,
    };
    let output = render(&input, &mut ctx);
    info!(
        selected = output.selected.len(),
        warnings = output.warnings.len(),
        "dashboard rendered"
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_output(&mut out, &output, args.csv)?;

    if args.raw {
        print_raw(&mut out, &input, provider.as_ref(), &mut cache, &names, today)?;
    }

    if let (Some(path), Some(chart)) = (&args.vega_lite, &output.chart) {
        write_vega_lite(path, &chart.to_vega_lite())?;
        println!("Chart written to: {}", path.display());
    }

    if let Some(err) = &output.error {
        eprintln!("Error: {err}");
        return Ok(false);
    }
    Ok(true)
}

fn build_input(args: &ShowArgs, config: &DashboardConfig, today: NaiveDate) -> Result<DashboardInput> {
    let mut input = DashboardInput::from_config(config, today);

    if let Some(tickers) = &args.tickers {
        input.tickers_text = tickers.clone();
    }
    match (args.start, args.end, args.days) {
        (Some(start), Some(end), _) => input.range = RangeInput::Dates { start, end },
        (_, _, Some(days)) => input.range = RangeInput::LookbackDays(days),
        _ => {}
    }
    if !args.select.is_empty() {
        input.selection = Some(args.select.clone());
    }
    input.show_changes = args.changes;

    if args.ymin.is_some() || args.ymax.is_some() {
        let min = args.ymin.unwrap_or(input.y_domain.min());
        let max = args.ymax.unwrap_or(input.y_domain.max());
        if min < 0.0 || max > config.slider_max {
            bail!(
                "y range [{min}, {max}] is outside [0, {}]",
                config.slider_max
            );
        }
        input.y_domain = YDomain::new(min, max)?;
    }
    Ok(input)
}

fn build_provider(config: &DashboardConfig, offline: bool) -> Result<Box<dyn DataProvider>> {
    if offline {
        info!("using synthetic provider");
        return Ok(Box::new(SyntheticProvider::new()));
    }
    let breaker = Arc::new(CircuitBreaker::new(config.provider.breaker_cooldown()));
    let yahoo = YahooProvider::new(&config.provider, breaker).context("building Yahoo provider")?;
    Ok(Box::new(yahoo))
}

fn print_output(out: &mut impl Write, output: &DashboardOutput, csv: bool) -> Result<()> {
    for warning in &output.warnings {
        eprintln!("Warning: {warning}");
    }

    let Some(table) = &output.table else {
        return Ok(());
    };

    if csv {
        write_csv(out, table)?;
    } else {
        if let Some(heading) = &output.heading {
            writeln!(out, "=== {heading} ===")?;
            writeln!(out)?;
        }
        write_aligned(out, table)?;
    }
    Ok(())
}

/// The merged table as a polars frame. Served from the cache filled by
/// `render`, so nothing is fetched twice.
fn print_raw(
    out: &mut impl Write,
    input: &DashboardInput,
    provider: &dyn DataProvider,
    cache: &mut FetchCache,
    names: &NameTable,
    today: NaiveDate,
) -> Result<()> {
    let Ok(range) = input.range.resolve(today) else {
        return Ok(());
    };
    let tickers = names.resolve_input(&input.tickers_text);
    if tickers.is_empty() {
        return Ok(());
    }
    let fetched = cache.get_or_fetch(provider, range, &tickers);
    if fetched.table.is_empty() {
        return Ok(());
    }
    let frame = fetched.table.to_dataframe().context("building merged frame")?;
    writeln!(out)?;
    writeln!(out, "{frame}")?;
    Ok(())
}

/// Raw values, empty cells for missing ones.
fn write_csv(out: &mut impl Write, table: &WideTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(
        std::iter::once(DATE_COLUMN).chain(table.columns.iter().map(|c| c.name.as_str())),
    )?;
    for (i, date) in table.dates.iter().enumerate() {
        let record = std::iter::once(date.to_string()).chain(
            table
                .columns
                .iter()
                .map(|c| c.values[i].map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_aligned(out: &mut impl Write, table: &WideTable) -> Result<()> {
    let header: Vec<String> = std::iter::once(DATE_COLUMN.to_string())
        .chain(table.columns.iter().map(|c| c.name.clone()))
        .collect();
    let rows = table.display_rows();

    let widths: Vec<usize> = (0..header.len())
        .map(|col| {
            rows.iter()
                .map(|r| r[col].chars().count())
                .chain(std::iter::once(header[col].chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(col, (cell, width))| {
                if col == 0 {
                    format!("{cell:<width$}")
                } else {
                    format!("{cell:>width$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    };

    writeln!(out, "{}", line(&header))?;
    writeln!(out, "{}", "-".repeat(widths.iter().sum::<usize>() + 2 * (widths.len() - 1)))?;
    for row in &rows {
        writeln!(out, "{}", line(row))?;
    }
    Ok(())
}

fn write_vega_lite(path: &Path, doc: &serde_json::Value) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, doc)?;
    writer.flush()?;
    Ok(())
}
