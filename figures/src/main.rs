use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use figures::analysis::bland_altman::SdEstimator;
use figures::config::{ExportFormat, FigureConfig};
use figures::data_handling::paired_table::PairedTable;
use figures::data_handling::rank_table::{RankInput, RankTable};
use figures::data_handling::synthetic::{demo_log2_ratios, demo_paired, PairedDemo};
use figures::models::Dataset;
use figures::pipeline::{compute_comparison, compute_rank, export_comparison, export_rank};
use figures::report::{
    render_bland_altman_summary, render_histogram_summary, render_rank_summary,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Rank-log2 and method comparison figures")]
struct Cli {
    /// JSON file overriding the default figure configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ranked log2 ratios coloured by regulation category
    RankPlot(RankArgs),
    /// Mirrored histogram and Bland-Altman plot for two paired methods
    Compare(CompareArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output path without extension
    #[arg(long)]
    out: Option<PathBuf>,

    /// Export formats, repeatable or comma separated
    #[arg(long = "format", value_delimiter = ',')]
    formats: Vec<ExportFormat>,

    #[arg(long)]
    dpi: Option<u32>,
}

#[derive(Args, Debug)]
struct RankArgs {
    /// CSV table; a seeded demo vector is used when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long, default_value = "log2_ratio")]
    value_column: String,

    /// Column with explicit category labels
    #[arg(long)]
    label_column: Option<String>,

    /// Column with per-protein significance values (e.g. adjusted p)
    #[arg(long)]
    significance_column: Option<String>,

    /// Absolute log2 ratio for a regulated call
    #[arg(long)]
    threshold: Option<f64>,

    /// Significance cutoff
    #[arg(long)]
    alpha: Option<f64>,

    #[arg(long)]
    demo_size: Option<usize>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// CSV table; seeded demo pairs are used when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    /// Column holding method A, also its display name (defaults to the
    /// configured method name)
    #[arg(long)]
    method_a: Option<String>,

    /// Column holding method B, also its display name (defaults to the
    /// configured method name)
    #[arg(long)]
    method_b: Option<String>,

    #[arg(long)]
    bin_width: Option<f64>,

    #[arg(long)]
    sd_estimator: Option<SdEstimator>,

    #[arg(long)]
    demo_size: Option<usize>,

    #[command(flatten)]
    output: OutputArgs,
}

impl OutputArgs {
    fn apply(&self, config: &mut FigureConfig) {
        if !self.formats.is_empty() {
            config.export.formats = self.formats.clone();
        }
        if let Some(dpi) = self.dpi {
            config.export.dpi = dpi;
        }
    }

    fn stem(&self, default: &str) -> PathBuf {
        self.out.clone().unwrap_or_else(|| PathBuf::from(default))
    }
}

impl RankArgs {
    fn apply(&self, config: &mut FigureConfig) {
        if let Some(t) = self.threshold {
            config.rank.threshold = t;
        }
        if let Some(alpha) = self.alpha {
            config.rank.significance_cutoff = alpha;
        }
        if let Some(n) = self.demo_size {
            config.rank.demo_size = n;
        }
        self.output.apply(config);
    }
}

impl CompareArgs {
    fn apply(&self, config: &mut FigureConfig) {
        if let Some(a) = &self.method_a {
            config.comparison.method_a = a.clone();
        }
        if let Some(b) = &self.method_b {
            config.comparison.method_b = b.clone();
        }
        if let Some(w) = self.bin_width {
            config.comparison.bin_width = w;
        }
        if let Some(estimator) = self.sd_estimator {
            config.comparison.agreement.estimator = estimator;
        }
        if let Some(n) = self.demo_size {
            config.comparison.demo_size = n;
        }
        self.output.apply(config);
    }
}

fn load_config(path: Option<&Path>) -> Result<FigureConfig> {
    match path {
        Some(p) => FigureConfig::from_json_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(FigureConfig::default()),
    }
}

fn run_rank_plot(args: &RankArgs, mut config: FigureConfig) -> Result<()> {
    args.apply(&mut config);

    let input = match &args.input {
        Some(path) => RankTable {
            path: path.clone(),
            value_column: args.value_column.clone(),
            label_column: args.label_column.clone(),
            significance_column: args.significance_column.clone(),
        }
        .load()
        .with_context(|| format!("Failed to load rank table {}", path.display()))?,
        None => RankInput {
            values: demo_log2_ratios(config.rank.demo_size, config.seed)?,
            labels: None,
            significance: None,
        },
    };

    let result = compute_rank(&input, &config.rank).context("Rank plot computation failed")?;
    let stem = args.output.stem("figures/rank_log2");
    let written = export_rank(&result, &config, &stem).context("Failed to write rank plot")?;

    print!("{}", render_rank_summary(&result.summary));
    for path in written {
        println!("  wrote {}", path.display());
    }
    Ok(())
}

/// Method names double as column names once flags are applied.
fn paired_table(path: &Path, config: &FigureConfig) -> PairedTable {
    PairedTable {
        path: path.to_path_buf(),
        column_a: config.comparison.method_a.clone(),
        column_b: config.comparison.method_b.clone(),
    }
}

fn run_compare(args: &CompareArgs, mut config: FigureConfig) -> Result<()> {
    args.apply(&mut config);

    let input = match &args.input {
        Some(path) => paired_table(path, &config)
            .load()
            .with_context(|| format!("Failed to load paired table {}", path.display()))?,
        None => demo_paired(config.comparison.demo_size, config.seed, &PairedDemo::default())?,
    };

    let result = compute_comparison(&input, &config.comparison)
        .context("Method comparison computation failed")?;
    let stem = args.output.stem("figures/method_comparison");
    let written =
        export_comparison(&result, &config, &stem).context("Failed to write comparison")?;

    print!(
        "{}",
        render_histogram_summary(&result.histogram, &config.comparison)
    );
    print!("{}", render_bland_altman_summary(&result.agreement));
    for path in written {
        println!("  wrote {}", path.display());
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let outcome = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Command::RankPlot(args) => {
            info!("Starting rank plot");
            run_rank_plot(args, config)
        }
        Command::Compare(args) => {
            info!("Starting method comparison");
            run_compare(args, config)
        }
    });

    if let Err(err) = outcome {
        error!("{err:#}");
        std::process::exit(1);
    }
}
