use std::io::Write;

use anyhow::Context;
use zort::*;

/// Packs previously run benchmarks into scheduler tasks and plans their execution
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Benchmarks list (`<order> [<path>] <name>` per line)
    #[arg(value_parser = clap::value_parser!(PathBuf))]
    benchmarks:             PathBuf,

    /// Directory holding the `zummary` file of a previous run
    #[arg(value_parser = clap::value_parser!(PathBuf))]
    dir:                    PathBuf,

    /// Bucket size, i.e., jobs (and cores) per scheduler task
    #[arg(short, long, default_value_t = DEFAULT_BUCKET_SIZE)]
    #[arg(value_parser = clap::value_parser!(usize))]
    bucket_size:            usize,

    /// Percentage of buckets reserved for fast jobs
    #[arg(short, long, default_value_t = DEFAULT_FAST_BUCKET_FRACTION)]
    #[arg(value_parser = clap::value_parser!(u32).range(0..=100))]
    fast_bucket_fraction:   u32,

    /// Maximum memory (MB) of a job in a fast bucket
    #[arg(short = 'm', long, default_value_t = DEFAULT_FAST_BUCKET_MEMORY)]
    #[arg(value_parser = clap::value_parser!(f64))]
    fast_bucket_memory:     f64,

    /// Number of available nodes
    #[arg(short, long, default_value_t = DEFAULT_NODES)]
    #[arg(value_parser = clap::value_parser!(usize))]
    nodes:                  usize,

    /// Memory (MB) available on each node
    #[arg(short, long, default_value_t = DEFAULT_AVAILABLE_MEMORY)]
    #[arg(value_parser = clap::value_parser!(f64))]
    available_memory:       f64,

    /// Power drawn by one busy core (W)
    #[arg(short, long, default_value_t = DEFAULT_WATT_PER_CORE)]
    #[arg(value_parser = clap::value_parser!(f64))]
    watt_per_core:          f64,

    /// Price of energy (cents per kWh)
    #[arg(short, long, default_value_t = DEFAULT_CENTS_PER_KWH)]
    #[arg(value_parser = clap::value_parser!(f64))]
    cents_per_kwh:          f64,

    /// Currency the cost is reported in
    #[arg(long, value_enum, default_value_t = Currency::Euro)]
    currency:               Currency,

    /// Keep the benchmarks' original order (only report statistics)
    #[arg(short, long, default_value_t = false)]
    keep_order:             bool,

    /// Print the reordered benchmarks list instead of statistics
    #[arg(short, long, default_value_t = false)]
    generate:               bool,

    /// Also list the members of each bucket
    #[arg(short, long, default_value_t = false)]
    list:                   bool,

    /// Increase verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose:                u8,
}

fn main() {
    let cli = Args::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("zort: error: {e:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0   => "warn",
        1   => "info",
        2   => "debug",
        _   => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Args) -> anyhow::Result<()> {
    if !cli.benchmarks.is_file() {
        return Err(ZortError::MissingFile { what: "benchmarks", path: cli.benchmarks }.into());
    }
    if !cli.dir.is_dir() {
        return Err(ZortError::MissingDirectory { path: cli.dir }.into());
    }
    let zummary_path = cli.dir.join("zummary");
    if !zummary_path.is_file() {
        return Err(ZortError::MissingFile { what: "zummary", path: zummary_path }.into());
    }

    let cfg = Config {
        bucket_size:            cli.bucket_size,
        fast_bucket_fraction:   cli.fast_bucket_fraction,
        fast_bucket_memory:     cli.fast_bucket_memory,
        nodes:                  cli.nodes,
        available_memory:       cli.available_memory,
        watt_per_core:          cli.watt_per_core,
        cents_per_kwh:          cli.cents_per_kwh,
        currency:               cli.currency,
        keep_order:             cli.keep_order,
        generate:               cli.generate,
    };
    cfg.validate()?;

    let benchmarks = BenchmarksReader::new(cli.benchmarks.clone())
        .read()?;
    info!("read {} benchmarks from '{}'", benchmarks.len(), cli.benchmarks.display());
    let zummaries = ZummaryReader::new(zummary_path.clone())
        .read()?;
    info!("read {} zummary entries from '{}'", zummaries.len(), zummary_path.display());

    let report = zort::algo::zort(benchmarks, zummaries, &cfg)?;

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    if cfg.generate {
        for b in report.reordered_benchmarks() {
            writeln!(out, "{b}")?;
        }
    } else if cli.list {
        writeln!(out, "{report:#}")?;
    } else {
        writeln!(out, "{report}")?;
    }
    out.flush()
        .context("could not write to stdout")?;

    Ok(())
}
