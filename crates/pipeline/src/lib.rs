//! # Thiessen Pipeline
//!
//! Batch pipeline producing yearly territory layers:
//!
//! 1. **normalize**: point table and boundary into typed, canonical-CRS inputs
//! 2. **runner**: per group, tessellate, measure, render a PNG, write a layer
//! 3. **aggregate**: concatenate all groups into one combined layer
//!
//! Groups run one after another, in ascending order, against a shared boundary.

pub mod aggregate;
pub mod config;
pub mod normalize;
pub mod runner;

pub use aggregate::{combine, write_combined};
pub use config::{ColumnConfig, OutputConfig, OutputLayout, PipelineConfig, RenderConfig};
pub use normalize::{normalize_boundary, normalize_points, parse_group_key, NormalizeReport, NormalizedPoints};
pub use runner::{cell_feature, run_pipeline, GroupOutput, GroupSummary, MeasuredCell, RunSummary, Runner};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::normalize::{normalize_boundary, normalize_points};
    pub use crate::runner::{run_pipeline, RunSummary, Runner};
    pub use thiessen_algorithms::prelude::*;
}
