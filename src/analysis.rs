use std::path::Path;

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::data::loader::{self, DataSource, LoadReport};
use crate::error::Result;
use crate::processing::descent::find_downward_acceleration;
use crate::processing::extrema::find_extrema;
use crate::processing::summary::SignalSummary;
use crate::processing::threshold::below_threshold;
use crate::render::artifacts::{acceleration_csv, Artifact, ArtifactSink, DirectorySink};
use crate::render::chart::{chart_specs, render_chart};
use crate::state::series::{AccelerationPoint, Extrema, IndexedSample, Series};
use crate::state::theme::Theme;

/// Output of the analytical core, before anything is rendered.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub series: Series,
    pub load: LoadReport,
    pub summary: SignalSummary,
    pub extrema: Extrema,
    pub below_threshold: Vec<IndexedSample>,
    pub acceleration: Vec<AccelerationPoint>,
}

impl Analysis {
    /// Run every analyser over an already loaded series.
    pub fn from_series(series: Series, load: LoadReport, config: &AnalysisConfig) -> Self {
        let extrema = find_extrema(&series);
        let below = below_threshold(&series, config.threshold);
        let acceleration = find_downward_acceleration(&series);
        let summary = SignalSummary::compute(&series, below.len(), &acceleration);

        tracing::debug!(
            below = below.len(),
            acceleration = acceleration.len(),
            "Analysed {} samples",
            series.len()
        );

        Self {
            series,
            load,
            summary,
            extrema,
            below_threshold: below,
            acceleration,
        }
    }
}

/// Tables and artifact locations handed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub series: Series,
    pub load: LoadReport,
    pub summary: SignalSummary,
    pub peaks: Vec<IndexedSample>,
    pub troughs: Vec<IndexedSample>,
    pub below_threshold: Vec<IndexedSample>,
    pub acceleration: Vec<AccelerationPoint>,
    /// Where each artifact was stored, charts first, CSV last.
    pub artifacts: Vec<String>,
}

/// Load `source` and run the analysers. Reads the input but writes nothing.
pub fn analyze(source: &DataSource, config: &AnalysisConfig) -> Result<Analysis> {
    config.validate()?;
    let (series, load) = loader::load_series(source, config.window)?;
    Ok(Analysis::from_series(series, load, config))
}

/// The five charts followed by the acceleration CSV, all in memory.
pub fn render_artifacts(analysis: &Analysis, config: &AnalysisConfig) -> Result<Vec<Artifact>> {
    let theme = Theme::default();
    let specs = chart_specs(
        &analysis.series,
        &analysis.extrema,
        &analysis.below_threshold,
        &analysis.acceleration,
        config,
    );

    let mut artifacts = Vec::with_capacity(specs.len() + 1);
    for spec in &specs {
        let png = render_chart(
            spec,
            &analysis.series,
            config.chart_width,
            config.chart_height,
            &theme,
        )?;
        artifacts.push(Artifact::new(spec.file_name, png));
    }
    artifacts.push(acceleration_csv(&analysis.acceleration)?);
    Ok(artifacts)
}

/// Full pipeline: analyse, render, then hand every artifact to `sink`.
/// Nothing reaches the sink unless loading and rendering both succeed.
pub fn run_analysis(
    source: &DataSource,
    config: &AnalysisConfig,
    sink: &mut dyn ArtifactSink,
) -> Result<AnalysisReport> {
    let analysis = analyze(source, config)?;
    let artifacts = render_artifacts(&analysis, config)?;

    let mut locations = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        locations.push(sink.put(artifact)?);
    }

    let Analysis {
        series,
        load,
        summary,
        extrema,
        below_threshold,
        acceleration,
    } = analysis;

    Ok(AnalysisReport {
        series,
        load,
        summary,
        peaks: extrema.peaks,
        troughs: extrema.troughs,
        below_threshold,
        acceleration,
        artifacts: locations,
    })
}

/// Convenience entry for callers holding either an upload or a file path:
/// uploaded bytes win, and artifacts go to `config.output_dir`.
pub fn run_to_directory(
    csv_path: Option<&Path>,
    uploaded: Option<Vec<u8>>,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let source = DataSource::resolve(csv_path, uploaded)?;
    let mut sink = DirectorySink::new(&config.output_dir);
    run_analysis(&source, config, &mut sink)
}
