//! Pipeline configuration
//!
//! Every field has a default, so an empty TOML file (or none at all) gives the
//! standard run: EPSG:27700, 800 m envelope margin, 1000 m boundary buffer,
//! a 2 ha cap applied after clipping, 1200 px wide maps.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiessen_algorithms::territory::{
    CapPolicy, MetricsParams, TessellationParams, DEFAULT_BOUNDARY_BUFFER, DEFAULT_CAP_HA,
};
use thiessen_algorithms::voronoi::DEFAULT_ENVELOPE_MARGIN;
use thiessen_colormap::{ColorScheme, MapStyle};
use thiessen_core::crs::{EPSG_BRITISH_NATIONAL_GRID, EPSG_WGS84};
use thiessen_core::{Error, Result, CRS};

/// Names of the required point-table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    /// Grouping key (year)
    pub group: String,
    /// Location identifier (nest box)
    pub location: String,
    pub x: String,
    pub y: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            group: "year".into(),
            location: "box".into(),
            x: "x".into(),
            y: "y".into(),
        }
    }
}

impl ColumnConfig {
    pub fn required(&self) -> [&str; 4] {
        [&self.group, &self.location, &self.x, &self.y]
    }
}

/// Map image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub enabled: bool,
    /// Image width in pixels
    pub width: u32,
    pub scheme: ColorScheme,
    pub point_radius: i32,
    /// Margin around the boundary, as a fraction of its larger side
    pub padding: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let style = MapStyle::default();
        Self {
            enabled: true,
            width: style.width,
            scheme: style.scheme,
            point_radius: style.point_radius,
            padding: style.padding,
        }
    }
}

/// Output layout below the output root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub images_dir: String,
    pub by_group_dir: String,
    pub combined_dir: String,
    /// Per-group layer name is `<prefix><group>`
    pub layer_prefix: String,
    pub combined_layer: String,
    /// Per-group image name is `<prefix><group>.png`
    pub image_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            images_dir: "images".into(),
            by_group_dir: "voronoi_by_year".into(),
            combined_dir: "voronoi_all_years".into(),
            layer_prefix: "year_".into(),
            combined_layer: "all_years".into(),
            image_prefix: "voronoi_".into(),
        }
    }
}

/// Resolved output locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub images: PathBuf,
    pub by_group: PathBuf,
    pub combined: PathBuf,
}

impl OutputConfig {
    pub fn layout(&self, root: impl AsRef<Path>) -> OutputLayout {
        let root = root.as_ref();
        OutputLayout {
            images: root.join(&self.images_dir),
            by_group: root.join(&self.by_group_dir),
            combined: root.join(&self.combined_dir),
        }
    }

    pub fn layer_name(&self, group: i32) -> String {
        format!("{}{}", self.layer_prefix, group)
    }

    pub fn image_name(&self, group: i32) -> String {
        format!("{}{}.png", self.image_prefix, group)
    }
}

/// All run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub columns: ColumnConfig,
    /// EPSG code of the planar CRS everything is computed in
    pub canonical_epsg: u32,
    /// EPSG code assumed for a boundary that does not declare one
    pub boundary_epsg: u32,
    pub envelope_margin: f64,
    pub boundary_buffer: f64,
    pub strict_assignment: bool,
    /// Area ceiling in hectares
    pub cap_ha: f64,
    pub cap_policy: CapPolicy,
    /// Whether the combined layer carries capped values
    pub cap_in_combined: bool,
    pub render: RenderConfig,
    pub output: OutputConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            columns: ColumnConfig::default(),
            canonical_epsg: EPSG_BRITISH_NATIONAL_GRID,
            boundary_epsg: EPSG_WGS84,
            envelope_margin: DEFAULT_ENVELOPE_MARGIN,
            boundary_buffer: DEFAULT_BOUNDARY_BUFFER,
            strict_assignment: false,
            cap_ha: DEFAULT_CAP_HA,
            cap_policy: CapPolicy::AfterClip,
            cap_in_combined: true,
            render: RenderConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|e| match e {
            Error::Config(msg) => Error::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Reject parameter values no run can use.
    pub fn validate(&self) -> Result<()> {
        non_negative("envelope_margin", self.envelope_margin)?;
        non_negative("boundary_buffer", self.boundary_buffer)?;
        if !(self.cap_ha.is_finite() && self.cap_ha > 0.0) {
            return Err(invalid("cap_ha", self.cap_ha, "must be a positive number of hectares"));
        }
        if self.render.width == 0 {
            return Err(invalid("render.width", 0, "must be at least one pixel"));
        }
        if self.render.point_radius < 0 {
            return Err(invalid("render.point_radius", self.render.point_radius, "must not be negative"));
        }
        non_negative("render.padding", self.render.padding)?;
        for (name, value) in [
            ("columns.group", &self.columns.group),
            ("columns.location", &self.columns.location),
            ("columns.x", &self.columns.x),
            ("columns.y", &self.columns.y),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(name, "\"\"", "column name must not be empty"));
            }
        }
        if self.output.combined_layer.trim().is_empty() {
            return Err(invalid("output.combined_layer", "\"\"", "layer name must not be empty"));
        }
        Ok(())
    }

    pub fn canonical_crs(&self) -> CRS {
        CRS::from_epsg(self.canonical_epsg)
    }

    pub fn boundary_crs(&self) -> CRS {
        CRS::from_epsg(self.boundary_epsg)
    }

    pub fn tessellation_params(&self) -> TessellationParams {
        TessellationParams {
            envelope_margin: self.envelope_margin,
            boundary_buffer: self.boundary_buffer,
            strict_assignment: self.strict_assignment,
        }
    }

    pub fn metrics_params(&self) -> MetricsParams {
        MetricsParams {
            cap_ha: self.cap_ha,
            policy: self.cap_policy,
        }
    }

    pub fn map_style(&self) -> MapStyle {
        MapStyle {
            width: self.render.width,
            scheme: self.render.scheme,
            point_radius: self.render.point_radius,
            padding: self.render.padding,
            ..MapStyle::default()
        }
    }
}

fn invalid(name: &'static str, value: impl ToString, reason: &str) -> Error {
    Error::InvalidParameter {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value, "must be a finite, non-negative number"))
    }
}
