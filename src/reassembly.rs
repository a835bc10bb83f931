use crate::buffers::{BatchShape, KeyframeBuffers};
use crate::curve::{Curve, Keyframe};
use crate::error::{CurveError, CurveResult};
use glam::Quat;

/// Splits a flat keyframe buffer back into one curve per curve index.
///
/// Curve `i` is built from `[i * step_count, (i + 1) * step_count)`.
pub fn reassemble(flat: &[Keyframe], curve_count: usize, step_count: usize) -> CurveResult<Vec<Curve>> {
    let shape = BatchShape::new(curve_count, step_count);
    let expected = shape.len()?;
    if flat.len() != expected {
        return Err(CurveError::invalid_curve(format!(
            "flat keyframe buffer holds {} entries, expected {curve_count} x {step_count}",
            flat.len()
        )));
    }
    let mut curves = Vec::with_capacity(curve_count);
    for curve_index in 0..curve_count {
        let curve = Curve::from_slice(&flat[shape.curve_range(curve_index)]).map_err(|err| match err {
            CurveError::InvalidCurve(detail) => {
                CurveError::invalid_curve(format!("slice for curve {curve_index}: {detail}"))
            }
            other => other,
        })?;
        curves.push(curve);
    }
    Ok(curves)
}

/// Quaternion component curves rebuilt for one input curve index.
#[derive(Debug, Clone)]
pub struct RotationCurves {
    pub x: Curve,
    pub y: Curve,
    pub z: Curve,
    pub w: Curve,
}

impl RotationCurves {
    /// Samples all four components; the result is renormalized since
    /// interpolating components independently leaves the unit sphere.
    pub fn evaluate(&self, time: f32) -> Quat {
        Quat::from_xyzw(
            self.x.evaluate(time),
            self.y.evaluate(time),
            self.z.evaluate(time),
            self.w.evaluate(time),
        )
        .normalize()
    }
}

pub fn reassemble_rotation_curves(buffers: &KeyframeBuffers) -> CurveResult<Vec<RotationCurves>> {
    let BatchShape { curve_count, step_count } = buffers.shape();
    let xs = reassemble(&buffers.qx, curve_count, step_count)?;
    let ys = reassemble(&buffers.qy, curve_count, step_count)?;
    let zs = reassemble(&buffers.qz, curve_count, step_count)?;
    let ws = reassemble(&buffers.qw, curve_count, step_count)?;
    Ok(xs
        .into_iter()
        .zip(ys)
        .zip(zs)
        .zip(ws)
        .map(|(((x, y), z), w)| RotationCurves { x, y, z, w })
        .collect())
}
