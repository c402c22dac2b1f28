use core::f32::consts::PI;

/// Attitude in centidegrees, as reported by the estimator
pub type CentiDegrees = i32;

#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * (PI / 180.0)
}

#[inline]
pub fn degrees(radians: f32) -> f32 {
    radians * (180.0 / PI)
}

#[inline]
pub fn centi_to_degrees(centi: CentiDegrees) -> f32 {
    centi as f32 * 0.01
}

mod test {
    #[test]
    fn test_angle_conversion() {
        use super::{centi_to_degrees, degrees, radians};

        assert!((radians(180.0) - core::f32::consts::PI).abs() < 1e-6);
        assert!((degrees(radians(42.0)) - 42.0).abs() < 1e-4);
        assert!((centi_to_degrees(-4500) + 45.0).abs() < 1e-6);
    }
}
