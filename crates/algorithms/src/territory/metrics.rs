//! Area metrics and capping

use serde::{Deserialize, Serialize};

use crate::vector::hectares;

/// Default area ceiling in hectares
pub const DEFAULT_CAP_HA: f64 = 2.0;

/// Where the area cap is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapPolicy {
    /// `min(area_ha, cap)` on the clipped territory
    #[default]
    AfterClip,
    /// The envelope-bounded face is shrunk to the cap before clipping, so the
    /// clipped share of a face is preserved: `area_ha * min(1, cap / face_ha)`
    BeforeClip,
    /// No cap: `area_ha_capped == area_ha`
    Disabled,
}

impl CapPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapPolicy::AfterClip => "after_clip",
            CapPolicy::BeforeClip => "before_clip",
            CapPolicy::Disabled => "disabled",
        }
    }
}

impl std::str::FromStr for CapPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "after_clip" | "after" => Ok(CapPolicy::AfterClip),
            "before_clip" | "before" => Ok(CapPolicy::BeforeClip),
            "disabled" | "none" | "off" => Ok(CapPolicy::Disabled),
            other => Err(format!(
                "unknown cap policy '{}' (expected after_clip, before_clip or disabled)",
                other
            )),
        }
    }
}

impl std::fmt::Display for CapPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for territory metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricsParams {
    /// Ceiling in hectares
    pub cap_ha: f64,
    pub policy: CapPolicy,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            cap_ha: DEFAULT_CAP_HA,
            policy: CapPolicy::AfterClip,
        }
    }
}

impl MetricsParams {
    /// Whether capped values can differ from `area_ha`.
    pub fn cap_active(&self) -> bool {
        self.policy != CapPolicy::Disabled
    }
}

/// Area metrics of one territory cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellMetrics {
    pub area_m2: f64,
    pub area_ha: f64,
    pub area_ha_capped: f64,
}

impl CellMetrics {
    /// Metrics from the clipped area and the unclipped (envelope-bounded)
    /// face area, both in square metres.
    pub fn compute(clipped_m2: f64, face_m2: f64, params: &MetricsParams) -> Self {
        let area_m2 = clipped_m2;
        let area_ha = hectares(area_m2);
        let area_ha_capped = match params.policy {
            CapPolicy::AfterClip => area_ha.min(params.cap_ha),
            CapPolicy::BeforeClip => {
                let face_ha = hectares(face_m2);
                if face_ha > params.cap_ha && face_ha > 0.0 {
                    (area_ha * (params.cap_ha / face_ha)).min(params.cap_ha)
                } else {
                    area_ha.min(params.cap_ha)
                }
            }
            CapPolicy::Disabled => area_ha,
        };
        Self { area_m2, area_ha, area_ha_capped }
    }

    /// The same metrics with the cap removed.
    pub fn uncapped(self) -> Self {
        Self {
            area_ha_capped: self.area_ha,
            ..self
        }
    }
}
