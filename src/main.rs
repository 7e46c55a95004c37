use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use voltscope::data::datetime::format_timestamp;
use voltscope::{AnalysisConfig, AnalysisReport, DataSource, DirectorySink};

#[derive(Parser)]
#[command(version, about = "Analyse a Timestamp,Values CSV and render charts")]
struct Cli {
    /// Input CSV with `Timestamp` (DD/MM/YY HH:MM) and `Values` columns
    #[arg(value_name = "CSV")]
    input: PathBuf,

    /// JSON file with analysis settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output directory for charts and the CSV export
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Moving-average window in samples
    #[arg(long)]
    window: Option<usize>,

    /// Report samples strictly below this value
    #[arg(long)]
    threshold: Option<f64>,

    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn analysis_config(&self) -> voltscope::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(out) = &self.out {
            config.output_dir = out.clone();
        }
        if let Some(window) = self.window {
            config.window = window;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        config.validate()?;
        Ok(config)
    }
}

fn print_summary(report: &AnalysisReport, config: &AnalysisConfig) {
    println!(
        "{} samples ({} rows read, {} dropped for bad timestamps, {} non-numeric values)",
        report.series.len(),
        report.load.rows_read,
        report.load.dropped_timestamps,
        report.load.non_numeric_values
    );
    print!("{}", report.summary);
    println!("Peaks: {}", report.peaks.len());
    println!("Troughs: {}", report.troughs.len());
    println!("Below {}: {}", config.threshold, report.below_threshold.len());
    println!("Downward acceleration points: {}", report.acceleration.len());
    for p in &report.acceleration {
        println!("  {:>6}  {}  {}", p.index, format_timestamp(p.timestamp), p.value);
    }
    println!("Artifacts:");
    for location in &report.artifacts {
        println!("  {location}");
    }
}

fn run(cli: &Cli) -> voltscope::Result<()> {
    let config = cli.analysis_config()?;
    let source = DataSource::resolve(Some(cli.input.as_path()), None)?;
    let mut sink = DirectorySink::new(&config.output_dir);
    let report = voltscope::run_analysis(&source, &config, &mut sink)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, &config);
    }
    Ok(())
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Analysis failed: {e}");
            ExitCode::FAILURE
        }
    }
}
