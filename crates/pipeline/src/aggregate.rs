//! Combined layer across all groups

use std::path::{Path, PathBuf};

use thiessen_core::io::{GeoJsonLayerStore, LayerStore};
use thiessen_core::{FeatureCollection, Result};

use crate::config::PipelineConfig;
use crate::runner::{cell_feature, GroupOutput, MeasuredCell};

/// Concatenate group outputs in ascending group order.
///
/// Without `cap_in_combined` every `area_ha_capped` equals `area_ha`.
pub fn combine(outputs: &[GroupOutput], config: &PipelineConfig) -> FeatureCollection {
    let mut ordered: Vec<&GroupOutput> = outputs.iter().collect();
    ordered.sort_by_key(|o| o.group);

    let mut combined = FeatureCollection::with_crs(config.canonical_crs());
    for output in ordered {
        for measured in &output.cells {
            let feature = if config.cap_in_combined {
                cell_feature(measured, &config.columns)
            } else {
                let uncapped = MeasuredCell {
                    cell: measured.cell.clone(),
                    metrics: measured.metrics.uncapped(),
                };
                cell_feature(&uncapped, &config.columns)
            };
            combined.push(feature);
        }
    }
    combined
}

/// Write the combined layer into its own store, replacing the previous one.
pub fn write_combined(outputs: &[GroupOutput], config: &PipelineConfig, dir: &Path) -> Result<PathBuf> {
    let combined = combine(outputs, config);
    let mut store = GeoJsonLayerStore::open(dir)?;
    let path = store.write_layer(&config.output.combined_layer, &combined)?;
    tracing::info!(
        "Combined layer '{}': {} features from {} groups",
        config.output.combined_layer,
        combined.len(),
        outputs.len()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Coord, MultiPolygon};
    use indexmap::IndexMap;
    use thiessen_algorithms::territory::{MetricsParams, TerritoryCell};
    use thiessen_core::AttributeValue;

    fn output(group: i32, ids: &[&str]) -> GroupOutput {
        let params = MetricsParams::default();
        let cells = ids
            .iter()
            .map(|id| {
                let cell = TerritoryCell {
                    group,
                    location_id: id.to_string(),
                    generator: Coord { x: 50.0, y: 50.0 },
                    geometry: MultiPolygon::new(vec![polygon![
                        (x: 0.0, y: 0.0), (x: 300.0, y: 0.0), (x: 300.0, y: 100.0), (x: 0.0, y: 100.0)
                    ]]),
                    face_area_m2: 30_000.0,
                    attributes: IndexMap::new(),
                };
                let metrics = cell.metrics(&params);
                MeasuredCell { cell, metrics }
            })
            .collect();
        GroupOutput {
            group,
            cells,
            anomalies: vec![],
            layer_path: PathBuf::new(),
            image_path: None,
        }
    }

    fn groups_and_ids(fc: &FeatureCollection) -> Vec<(AttributeValue, AttributeValue)> {
        fc.iter()
            .map(|f| (f.properties["year"].clone(), f.properties["box"].clone()))
            .collect()
    }

    #[test]
    fn test_combine_orders_groups() {
        let config = PipelineConfig::default();
        let fc = combine(&[output(2022, &["C"]), output(2021, &["B", "A"])], &config);

        assert_eq!(fc.len(), 3);
        assert_eq!(fc.crs, Some(config.canonical_crs()));
        assert_eq!(
            groups_and_ids(&fc),
            vec![
                (AttributeValue::Int(2021), AttributeValue::from("B")),
                (AttributeValue::Int(2021), AttributeValue::from("A")),
                (AttributeValue::Int(2022), AttributeValue::from("C")),
            ]
        );
        // 3 ha cells stay capped
        assert_eq!(fc.features[0].properties["area_ha_capped"], AttributeValue::Float(2.0));
    }

    #[test]
    fn test_combine_without_cap() {
        let config = PipelineConfig {
            cap_in_combined: false,
            ..PipelineConfig::default()
        };
        let fc = combine(&[output(2021, &["A"])], &config);
        let props = &fc.features[0].properties;
        assert_eq!(props["area_ha_capped"], props["area_ha"]);
    }

    #[test]
    fn test_write_combined_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default();

        write_combined(&[output(2021, &["A", "B"])], &config, dir.path()).unwrap();
        let path = write_combined(&[output(2021, &["A"])], &config, dir.path()).unwrap();

        assert_eq!(path, dir.path().join("all_years.geojson"));
        let store = GeoJsonLayerStore::open(dir.path()).unwrap();
        assert_eq!(store.layer_names().unwrap(), vec!["all_years"]);
        assert_eq!(store.read_layer("all_years").unwrap().len(), 1);
    }
}
