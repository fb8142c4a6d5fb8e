//! Per-group runner
//!
//! Each group is processed to completion before the next: tessellate, measure,
//! render the map, write the layer. Results come back as [`GroupOutput`]s so
//! the aggregator can build the combined layer without re-reading anything.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use geo::{Coord, Geometry, MultiPolygon};
use thiessen_algorithms::territory::{tessellate_group, CellMetrics, TerritoryCell};
use thiessen_colormap::{render_map, save_png, MapCell, MapLayers};
use thiessen_core::io::{GeoJsonLayerStore, LayerStore};
use thiessen_core::{Feature, FeatureCollection, PointRecord, Result};

use crate::aggregate::write_combined;
use crate::config::{ColumnConfig, OutputLayout, PipelineConfig};
use crate::normalize::NormalizeReport;

/// Property names appended after the point attributes
pub const AREA_M2: &str = "area_m2";
pub const AREA_HA: &str = "area_ha";
pub const AREA_HA_CAPPED: &str = "area_ha_capped";

/// A territory cell with its metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredCell {
    pub cell: TerritoryCell,
    pub metrics: CellMetrics,
}

/// Everything produced for one group.
#[derive(Debug, Clone)]
pub struct GroupOutput {
    pub group: i32,
    /// Cells in input point order
    pub cells: Vec<MeasuredCell>,
    pub anomalies: Vec<String>,
    pub layer_path: PathBuf,
    pub image_path: Option<PathBuf>,
}

impl GroupOutput {
    pub fn total_area_ha(&self) -> f64 {
        self.cells.iter().map(|c| c.metrics.area_ha).sum()
    }
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub points: NormalizeReport,
    /// Groups with output, ascending
    pub groups: Vec<GroupSummary>,
    /// Groups that produced no cell
    pub skipped: Vec<i32>,
    pub combined_path: Option<PathBuf>,
}

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub group: i32,
    pub cells: usize,
    pub anomalies: usize,
    pub total_area_ha: f64,
}

impl From<&GroupOutput> for GroupSummary {
    fn from(output: &GroupOutput) -> Self {
        Self {
            group: output.group,
            cells: output.cells.len(),
            anomalies: output.anomalies.len(),
            total_area_ha: output.total_area_ha(),
        }
    }
}

impl RunSummary {
    pub fn total_cells(&self) -> usize {
        self.groups.iter().map(|g| g.cells).sum()
    }

    pub fn total_anomalies(&self) -> usize {
        self.groups.iter().map(|g| g.anomalies).sum()
    }

    pub fn total_area_ha(&self) -> f64 {
        self.groups.iter().map(|g| g.total_area_ha).sum()
    }
}

/// Feature for one measured cell.
///
/// Properties, in order: group, location, generator x and y, the point's own
/// attributes, then the three area fields.
pub fn cell_feature(measured: &MeasuredCell, columns: &ColumnConfig) -> Feature {
    let MeasuredCell { cell, metrics } = measured;
    let geometry = match cell.geometry.0.as_slice() {
        [single] => Geometry::Polygon(single.clone()),
        _ => Geometry::MultiPolygon(cell.geometry.clone()),
    };

    let mut feature = Feature::new(geometry);
    feature.set_property(columns.group.as_str(), cell.group);
    feature.set_property(columns.location.as_str(), cell.location_id.as_str());
    feature.set_property(columns.x.as_str(), cell.generator.x);
    feature.set_property(columns.y.as_str(), cell.generator.y);
    for (key, value) in &cell.attributes {
        feature.set_property(key.as_str(), value.clone());
    }
    feature.set_property(AREA_M2, metrics.area_m2);
    feature.set_property(AREA_HA, metrics.area_ha);
    feature.set_property(AREA_HA_CAPPED, metrics.area_ha_capped);
    feature
}

/// Runs groups against one boundary and output root.
pub struct Runner<'a> {
    config: &'a PipelineConfig,
    boundary: &'a MultiPolygon<f64>,
    layout: OutputLayout,
    store: GeoJsonLayerStore,
}

impl<'a> Runner<'a> {
    /// Prepare the output directories below `root`.
    pub fn new(config: &'a PipelineConfig, boundary: &'a MultiPolygon<f64>, root: impl AsRef<Path>) -> Result<Self> {
        let layout = config.output.layout(root);
        let store = GeoJsonLayerStore::open(&layout.by_group)?;
        if config.render.enabled {
            std::fs::create_dir_all(&layout.images)?;
        }
        Ok(Self { config, boundary, layout, store })
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Process one group. `Ok(None)` means the group was skipped.
    pub fn run_group(&mut self, group: i32, points: &[PointRecord]) -> Result<Option<GroupOutput>> {
        let Some(tessellation) =
            tessellate_group(group, points, self.boundary, &self.config.tessellation_params())?
        else {
            return Ok(None);
        };
        if tessellation.cells.is_empty() {
            tracing::warn!(
                "Group {}: all {} cells fall outside the boundary, skipped",
                group,
                tessellation.sites
            );
            return Ok(None);
        }

        let params = self.config.metrics_params();
        let cells: Vec<MeasuredCell> = tessellation
            .cells
            .into_iter()
            .map(|cell| {
                let metrics = cell.metrics(&params);
                MeasuredCell { cell, metrics }
            })
            .collect();

        let image_path = if self.config.render.enabled {
            let path = self.layout.images.join(self.config.output.image_name(group));
            self.render(&cells, points, &path)?;
            Some(path)
        } else {
            None
        };

        let mut layer = FeatureCollection::with_crs(self.config.canonical_crs());
        for measured in &cells {
            layer.push(cell_feature(measured, &self.config.columns));
        }
        let layer_path = self.store.write_layer(&self.config.output.layer_name(group), &layer)?;

        let output = GroupOutput {
            group,
            cells,
            anomalies: tessellation.anomalies,
            layer_path,
            image_path,
        };
        tracing::info!(
            "Group {}: {} cells, {:.2} ha, {} anomalies",
            group,
            output.cells.len(),
            output.total_area_ha(),
            output.anomalies.len()
        );
        Ok(Some(output))
    }

    fn render(&self, cells: &[MeasuredCell], points: &[PointRecord], path: &Path) -> Result<()> {
        let sites: Vec<Coord<f64>> = points.iter().map(PointRecord::coord).collect();
        let layers = MapLayers {
            boundary: self.boundary,
            cells: cells
                .iter()
                .map(|m| MapCell {
                    geometry: &m.cell.geometry,
                    value: m.metrics.area_ha,
                })
                .collect(),
            points: &sites,
        };
        let image = render_map(&layers, &self.config.map_style(), self.value_range(cells))?;
        save_png(&image, path)
    }

    /// Color range: `[0, cap]` while a cap is active, else the group's own range.
    fn value_range(&self, cells: &[MeasuredCell]) -> (f64, f64) {
        let params = self.config.metrics_params();
        if params.cap_active() {
            return (0.0, params.cap_ha);
        }
        let (lo, hi) = cells.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), m| {
            (lo.min(m.metrics.area_ha), hi.max(m.metrics.area_ha))
        });
        if !(lo.is_finite() && hi.is_finite()) {
            (0.0, 1.0)
        } else if hi - lo < f64::EPSILON {
            (lo, lo + 1.0)
        } else {
            (lo, hi)
        }
    }
}

/// Run every group in ascending order, then write the combined layer.
///
/// `on_group` is called with each group once it has been processed or skipped.
pub fn run_pipeline(
    config: &PipelineConfig,
    groups: &BTreeMap<i32, Vec<PointRecord>>,
    boundary: &MultiPolygon<f64>,
    root: impl AsRef<Path>,
    mut on_group: impl FnMut(i32),
) -> Result<RunSummary> {
    let mut runner = Runner::new(config, boundary, root)?;
    let mut outputs = Vec::with_capacity(groups.len());
    let mut summary = RunSummary::default();

    for (&group, points) in groups {
        let output = runner
            .run_group(group, points)
            .inspect_err(|e| tracing::error!("Group {}: {}", group, e))?;
        match output {
            Some(output) => outputs.push(output),
            None => summary.skipped.push(group),
        }
        on_group(group);
    }

    summary.combined_path = Some(write_combined(&outputs, config, &runner.layout().combined)?);
    summary.groups = outputs.iter().map(GroupSummary::from).collect();
    finish(&summary);
    Ok(summary)
}

/// Log the end-of-run totals.
fn finish(summary: &RunSummary) {
    if summary.total_cells() == 0 {
        tracing::warn!("No group produced any cell");
        return;
    }
    tracing::info!(
        "{} groups, {} cells, {:.2} ha total, {} skipped, {} anomalies",
        summary.groups.len(),
        summary.total_cells(),
        summary.total_area_ha(),
        summary.skipped.len(),
        summary.total_anomalies()
    );
}
