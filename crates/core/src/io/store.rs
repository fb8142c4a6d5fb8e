//! Multi-layer geospatial stores
//!
//! A store holds named layers; writing a layer that already exists replaces
//! it, so re-running a group is idempotent.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::vector::FeatureCollection;

use super::geojson_io::{read_features, to_geojson_string};

const MAX_LAYER_NAME: usize = 200;

/// Persistent store of named feature layers.
pub trait LayerStore {
    /// Write (or overwrite) a layer. Returns where it was written.
    fn write_layer(&mut self, name: &str, layer: &FeatureCollection) -> Result<PathBuf>;

    /// Read a layer back.
    fn read_layer(&self, name: &str) -> Result<FeatureCollection>;

    /// Names of all layers, sorted.
    fn layer_names(&self) -> Result<Vec<String>>;
}

/// Make a value safe to use as a layer (and file) name.
///
/// Keeps alphanumerics, `-` and `_`; spaces become `_`; anything else becomes
/// `_`. Names are trimmed, capped at 200 characters, and never empty.
pub fn sanitize_layer_name(value: &str) -> String {
    let mapped: String = value
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .take(MAX_LAYER_NAME)
        .collect();
    if mapped.is_empty() {
        "layer".to_string()
    } else {
        mapped
    }
}

/// A directory of GeoJSON files, one `<layer>.geojson` per layer.
#[derive(Debug, Clone)]
pub struct GeoJsonLayerStore {
    root: PathBuf,
}

impl GeoJsonLayerStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layer_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.geojson", sanitize_layer_name(name)))
    }
}

impl LayerStore for GeoJsonLayerStore {
    fn write_layer(&mut self, name: &str, layer: &FeatureCollection) -> Result<PathBuf> {
        let path = self.layer_path(name);
        let text = to_geojson_string(layer)?;
        // Write beside the target, then rename over it
        let tmp = path.with_extension("geojson.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &path)?;
        tracing::debug!("Wrote layer '{}' ({} features) -> {}", name, layer.len(), path.display());
        Ok(path)
    }

    fn read_layer(&self, name: &str) -> Result<FeatureCollection> {
        let path = self.layer_path(name);
        if !path.exists() {
            return Err(Error::Other(format!("layer '{}' not found in {}", name, self.root.display())));
        }
        read_features(path)
    }

    fn layer_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("geojson") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
