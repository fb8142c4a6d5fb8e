//! Area units

/// Square metres per hectare.
pub const M2_PER_HECTARE: f64 = 10_000.0;

/// Convert square metres to hectares.
#[inline]
pub fn hectares(area_m2: f64) -> f64 {
    area_m2 / M2_PER_HECTARE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hectares() {
        assert_eq!(hectares(10_000.0), 1.0);
        assert_eq!(hectares(25_000.0), 2.5);
        assert_eq!(hectares(0.0), 0.0);
    }
}
