//! I/O for point tables, boundaries and layer stores

mod geojson_io;
mod store;
mod table;

pub use geojson_io::{read_features, read_features_from_str, to_geojson_string};
pub use store::{sanitize_layer_name, GeoJsonLayerStore, LayerStore};
pub use table::RawTable;
