//! Values a raster cell can hold

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// A cell value: cell labels (`i32`) or the values cells are colored by
/// (`f64`).
pub trait RasterElement: Copy + Debug + PartialEq + NumCast + Zero + Send + Sync + 'static {
    /// Whether this value stands for "no data". NaN always does.
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

impl RasterElement for i32 {
    fn is_nodata(&self, nodata: Option<Self>) -> bool {
        nodata == Some(*self)
    }
}

impl RasterElement for f64 {
    fn is_nodata(&self, nodata: Option<Self>) -> bool {
        if self.is_nan() {
            return true;
        }
        match nodata {
            Some(nd) => (self - nd).abs() < f64::EPSILON * 100.0,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_nodata_nan() {
        assert!(f64::NAN.is_nodata(None));
        assert!(1.0f64.is_nodata(Some(1.0)));
        assert!(!1.0f64.is_nodata(Some(2.0)));
        assert!(!1.0f64.is_nodata(Some(f64::NAN)));
    }

    #[test]
    fn test_label_nodata() {
        assert!((-1i32).is_nodata(Some(-1)));
        assert!(!0i32.is_nodata(Some(-1)));
        assert!(!0i32.is_nodata(None));
        assert_eq!(7i32.to_f64(), Some(7.0));
    }
}
