//! Georeferenced grid

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use ndarray::Array2;

/// A 2D grid of values placed on the map by a [`GeoTransform`].
///
/// Maps are drawn through two of these: a `Raster<i32>` of cell labels, then
/// a `Raster<f64>` of the values those cells are colored by.
///
/// ```ignore
/// use thiessen_core::Raster;
///
/// let mut labels: Raster<i32> = Raster::filled(100, 100, -1);
/// labels.set(10, 20, 3)?;
/// assert_eq!(labels.get(10, 20)?, 3);
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Values indexed (row, col), row 0 at the top
    data: Array2<T>,
    transform: GeoTransform,
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// A zero-filled grid
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::zero())
    }

    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
            transform: GeoTransform::default(),
            nodata: None,
        }
    }

    /// A grid of another element type on the same transform, without nodata.
    pub fn like<U: RasterElement>(&self, fill_value: U) -> Raster<U> {
        Raster {
            data: Array2::from_elem(self.data.dim(), fill_value),
            transform: self.transform,
            nodata: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> Error {
        Error::IndexOutOfBounds {
            row,
            col,
            rows: self.rows(),
            cols: self.cols(),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or_else(|| self.out_of_bounds(row, col))
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let err = self.out_of_bounds(row, col);
        let cell = self.data.get_mut((row, col)).ok_or(err)?;
        *cell = value;
        Ok(())
    }

    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape() {
        let raster: Raster<f64> = Raster::new(100, 200);
        assert_eq!((raster.rows(), raster.cols()), (100, 200));
        assert_eq!(raster.shape(), (100, 200));
        assert_eq!(raster.len(), 20_000);
        assert_eq!(raster.get(99, 199).unwrap(), 0.0);
    }

    #[test]
    fn test_access_bounds() {
        let mut raster: Raster<i32> = Raster::filled(10, 10, -1);
        raster.set(5, 5, 42).unwrap();
        assert_eq!(raster.get(5, 5).unwrap(), 42);
        assert!(raster.set(10, 0, 1).is_err());
        assert!(matches!(raster.get(0, 10), Err(Error::IndexOutOfBounds { .. })));
    }

    #[test]
    fn test_like_keeps_transform() {
        let mut labels: Raster<i32> = Raster::filled(4, 6, -1);
        labels.set_transform(GeoTransform::new(10.0, 20.0, 2.0, -2.0));
        let values: Raster<f64> = labels.like(f64::NAN);
        assert_eq!(values.shape(), (4, 6));
        assert_eq!(values.transform(), labels.transform());
        assert_eq!(values.nodata(), None);
    }
}
