//! Batch analytics for a timestamped numeric signal: load a `Timestamp,Values`
//! table, find extrema, threshold crossings and the steepest drop of every
//! downward run, then render charts and a CSV export as named artifacts.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod processing;
pub mod render;
pub mod state;

pub use analysis::{analyze, render_artifacts, run_analysis, run_to_directory, Analysis, AnalysisReport};
pub use config::AnalysisConfig;
pub use data::loader::{DataSource, LoadReport};
pub use error::{AnalysisError, Result};
pub use render::artifacts::{Artifact, ArtifactSink, DirectorySink, MemorySink};
