use crate::error::{CurveError, CurveResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: f32,
    pub value: f32,
}

impl Keyframe {
    pub const fn new(time: f32, value: f32) -> Self {
        Self { time, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveInterpolation {
    Step,
    Linear,
    /// Cubic Hermite with flat tangents at every key.
    #[default]
    Smooth,
}

#[derive(Debug, Clone, Copy)]
struct CurveSegment {
    delta: f32,
    inv_span: f32,
}

/// Piecewise scalar curve over strictly increasing keyframe times.
///
/// Evaluation clamps to the boundary values outside the keyed range.
#[derive(Debug, Clone)]
pub struct Curve {
    interpolation: CurveInterpolation,
    keyframes: Arc<[Keyframe]>,
    segments: Arc<[CurveSegment]>,
}

impl Curve {
    pub fn new(keyframes: Vec<Keyframe>) -> CurveResult<Self> {
        Self::with_interpolation(keyframes, CurveInterpolation::Smooth)
    }

    pub fn from_slice(keyframes: &[Keyframe]) -> CurveResult<Self> {
        Self::with_interpolation(keyframes.to_vec(), CurveInterpolation::Smooth)
    }

    pub fn with_interpolation(
        keyframes: Vec<Keyframe>,
        interpolation: CurveInterpolation,
    ) -> CurveResult<Self> {
        if keyframes.is_empty() {
            return Err(CurveError::invalid_curve("curve must contain at least one keyframe"));
        }
        for (index, key) in keyframes.iter().enumerate() {
            if !key.time.is_finite() {
                return Err(CurveError::invalid_curve(format!("keyframe {index} has non-finite time")));
            }
            if !key.value.is_finite() {
                return Err(CurveError::invalid_curve(format!("keyframe {index} has non-finite value")));
            }
        }
        let mut segments = Vec::with_capacity(keyframes.len().saturating_sub(1));
        for (index, window) in keyframes.windows(2).enumerate() {
            let (start, end) = (window[0], window[1]);
            if end.time <= start.time {
                return Err(CurveError::invalid_curve(format!(
                    "keyframe times must be strictly increasing (key {} at {} follows {})",
                    index + 1,
                    end.time,
                    start.time
                )));
            }
            segments.push(CurveSegment {
                delta: end.value - start.value,
                inv_span: 1.0 / (end.time - start.time),
            });
        }
        Ok(Self {
            interpolation,
            keyframes: Arc::from(keyframes.into_boxed_slice()),
            segments: Arc::from(segments.into_boxed_slice()),
        })
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn interpolation(&self) -> CurveInterpolation {
        self.interpolation
    }

    pub fn start_time(&self) -> f32 {
        self.keyframes[0].time
    }

    pub fn end_time(&self) -> f32 {
        self.keyframes[self.keyframes.len() - 1].time
    }

    pub fn evaluate(&self, time: f32) -> f32 {
        let keys = &*self.keyframes;
        let first = keys[0];
        if time.is_nan() || time <= first.time {
            return first.value;
        }
        let last = keys[keys.len() - 1];
        if time >= last.time {
            return last.value;
        }

        // keys[0].time < time < last.time, so the index is in 1..len.
        let index = keys.partition_point(|key| key.time <= time) - 1;
        let start = keys[index];
        let segment = self.segments[index];
        let t = (time - start.time) * segment.inv_span;
        match self.interpolation {
            CurveInterpolation::Step => start.value,
            CurveInterpolation::Linear => start.value + segment.delta * t,
            CurveInterpolation::Smooth => start.value + segment.delta * (t * t * (3.0 - 2.0 * t)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Curve {
        Curve::new(vec![Keyframe::new(0.0, 0.0), Keyframe::new(1.0, 10.0), Keyframe::new(3.0, -10.0)])
            .expect("valid curve")
    }

    #[test]
    fn rejects_empty_and_unordered_keys() {
        assert!(matches!(Curve::new(Vec::new()), Err(CurveError::InvalidCurve(_))));
        let err = Curve::new(vec![Keyframe::new(1.0, 0.0), Keyframe::new(1.0, 2.0)]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
        let err = Curve::new(vec![Keyframe::new(0.0, f32::NAN)]).unwrap_err();
        assert!(err.to_string().contains("non-finite value"));
    }

    #[test]
    fn hits_keys_exactly() {
        let curve = ramp();
        assert_eq!(curve.evaluate(0.0), 0.0);
        assert_eq!(curve.evaluate(1.0), 10.0);
        assert_eq!(curve.evaluate(3.0), -10.0);
    }

    #[test]
    fn smooth_midpoint_is_halfway() {
        let curve = ramp();
        assert!((curve.evaluate(0.5) - 5.0).abs() < 1e-5);
        assert!((curve.evaluate(2.0) - 0.0).abs() < 1e-5);
    }

    #[test]
    fn smooth_stays_between_neighbours() {
        let curve = ramp();
        for step in 0..=100 {
            let t = step as f32 * 0.01;
            let value = curve.evaluate(t);
            assert!((0.0..=10.0).contains(&value), "value {value} at {t} left the segment range");
        }
    }

    #[test]
    fn linear_and_step_modes() {
        let keys = vec![Keyframe::new(0.0, 0.0), Keyframe::new(2.0, 4.0)];
        let linear = Curve::with_interpolation(keys.clone(), CurveInterpolation::Linear).unwrap();
        assert!((linear.evaluate(0.5) - 1.0).abs() < 1e-6);
        let step = Curve::with_interpolation(keys, CurveInterpolation::Step).unwrap();
        assert_eq!(step.evaluate(1.999), 0.0);
        assert_eq!(step.evaluate(2.0), 4.0);
    }

    #[test]
    fn single_key_is_constant() {
        let curve = Curve::new(vec![Keyframe::new(5.0, 42.0)]).unwrap();
        assert_eq!(curve.evaluate(-100.0), 42.0);
        assert_eq!(curve.evaluate(5.0), 42.0);
        assert_eq!(curve.evaluate(1e9), 42.0);
        assert_eq!(curve.evaluate(f32::NAN), 42.0);
    }
}
