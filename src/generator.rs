use crate::curve::{Curve, Keyframe};
use crate::error::{CurveError, CurveResult};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Recipe for a synthetic curve: `number_of_keys` evenly spaced keys over
/// `[0, duration]` with values drawn uniformly between the two bounds.
///
/// `min_value` and `max_value` are treated as an unordered pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveGenerationInfo {
    pub duration: f32,
    pub number_of_keys: usize,
    pub min_value: f32,
    pub max_value: f32,
}

impl CurveGenerationInfo {
    pub fn validate(&self) -> CurveResult<()> {
        if self.number_of_keys < 2 {
            return Err(CurveError::invalid_configuration(format!(
                "number_of_keys must be at least 2 (got {})",
                self.number_of_keys
            )));
        }
        if !self.duration.is_finite() || self.duration < 0.0 {
            return Err(CurveError::invalid_configuration(format!(
                "duration must be finite and non-negative (got {})",
                self.duration
            )));
        }
        if self.duration == 0.0 {
            return Err(CurveError::invalid_configuration("duration of 0 places every key at the same time"));
        }
        if !self.min_value.is_finite() || !self.max_value.is_finite() {
            return Err(CurveError::invalid_configuration(format!(
                "value bounds must be finite (got {} and {})",
                self.min_value, self.max_value
            )));
        }
        if !(self.max_value - self.min_value).is_finite() {
            return Err(CurveError::invalid_configuration(format!(
                "value bounds {} and {} are too far apart to sample",
                self.min_value, self.max_value
            )));
        }
        Ok(())
    }

    pub fn value_range(&self) -> (f32, f32) {
        (self.min_value.min(self.max_value), self.min_value.max(self.max_value))
    }
}

pub fn generate_random_curve<R: Rng + ?Sized>(info: &CurveGenerationInfo, rng: &mut R) -> CurveResult<Curve> {
    info.validate()?;
    let (low, high) = info.value_range();
    let last = (info.number_of_keys - 1) as f32;
    let mut keys = Vec::with_capacity(info.number_of_keys);
    for index in 0..info.number_of_keys {
        let time = index as f32 / last * info.duration;
        let value = if low == high { low } else { rng.gen_range(low..=high) };
        keys.push(Keyframe::new(time, value));
    }
    Curve::new(keys)
}

pub fn generate_random_curves<R: Rng + ?Sized>(
    count: usize,
    info: &CurveGenerationInfo,
    rng: &mut R,
) -> CurveResult<Vec<Curve>> {
    info.validate()?;
    let mut curves = Vec::new();
    curves
        .try_reserve_exact(count)
        .map_err(|_| CurveError::AllocationFailure { label: "curves", elements: count })?;
    for _ in 0..count {
        curves.push(generate_random_curve(info, rng)?);
    }
    Ok(curves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn info(number_of_keys: usize) -> CurveGenerationInfo {
        CurveGenerationInfo { duration: 10.0, number_of_keys, min_value: -180.0, max_value: 180.0 }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_random_curve(&info(8), &mut StdRng::seed_from_u64(7)).unwrap();
        let b = generate_random_curve(&info(8), &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a.keyframes(), b.keyframes());
    }

    #[test]
    fn equal_bounds_produce_a_flat_curve() {
        let flat = CurveGenerationInfo { duration: 1.0, number_of_keys: 3, min_value: 4.0, max_value: 4.0 };
        let curve = generate_random_curve(&flat, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(curve.keyframes().iter().all(|key| key.value == 4.0));
    }

    #[test]
    fn rejects_degenerate_durations() {
        let mut rng = StdRng::seed_from_u64(1);
        let negative = CurveGenerationInfo { duration: -1.0, ..info(4) };
        assert!(matches!(
            generate_random_curve(&negative, &mut rng),
            Err(CurveError::InvalidConfiguration(_))
        ));
        let zero = CurveGenerationInfo { duration: 0.0, ..info(4) };
        assert!(matches!(generate_random_curve(&zero, &mut rng), Err(CurveError::InvalidConfiguration(_))));
    }

    #[test]
    fn rejects_bounds_whose_span_overflows() {
        let spread =
            CurveGenerationInfo { duration: 10.0, number_of_keys: 5, min_value: -3e38, max_value: 3e38 };
        let err = generate_random_curve(&spread, &mut StdRng::seed_from_u64(1)).unwrap_err();
        assert!(matches!(err, CurveError::InvalidConfiguration(_)), "unexpected error: {err:?}");
        let extreme = CurveGenerationInfo { min_value: f32::MAX, max_value: -f32::MAX, ..spread };
        assert!(extreme.validate().is_err());

        let near_limit = CurveGenerationInfo { min_value: -1.5e38, max_value: 1.5e38, ..spread };
        let curve = generate_random_curve(&near_limit, &mut StdRng::seed_from_u64(2)).unwrap();
        assert!(curve.keyframes().iter().all(|key| key.value.abs() <= 1.5e38));
    }

    #[test]
    fn bulk_generation_returns_requested_count() {
        let curves = generate_random_curves(5, &info(3), &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(curves.len(), 5);
        assert!(curves.iter().all(|curve| curve.len() == 3));
    }
}
