//! Euler-degree to quaternion batch kernels.
//!
//! All three strategies share one convention (`q = Ry * Rx * Rz`, so Z is
//! applied first) and one angle wrapping step; they differ only in how the
//! flat index range is dispatched and in the per-chunk arithmetic.

mod scalar;
mod simd;

pub use scalar::{euler_degrees_to_quat, wrap_degrees};
pub use simd::{euler_degrees_to_quat_x4, wrap_degrees_x4, LANES};

use crate::buffers::{AngleBatch, KeyframeBuffers};
use crate::curve::Keyframe;
use crate::error::{CurveError, CurveResult};
use glam::{Quat, Vec4};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_KEYFRAME_CHUNK_SIZE: usize = 32;
pub const NORM_TOLERANCE: f32 = 1e-4;
pub const EQUIVALENCE_TOLERANCE: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformStrategy {
    /// One thread, scalar math.
    Sequential,
    /// Rayon chunks, scalar math.
    Parallel,
    /// Rayon chunks, `f32x4` math.
    Vectorized,
}

impl TransformStrategy {
    pub const ALL: [TransformStrategy; 3] =
        [TransformStrategy::Sequential, TransformStrategy::Parallel, TransformStrategy::Vectorized];

    pub fn label(self) -> &'static str {
        match self {
            TransformStrategy::Sequential => "sequential",
            TransformStrategy::Parallel => "parallel",
            TransformStrategy::Vectorized => "vectorized",
        }
    }

    pub fn stage_label(self) -> &'static str {
        match self {
            TransformStrategy::Sequential => "transform_sequential",
            TransformStrategy::Parallel => "transform_parallel",
            TransformStrategy::Vectorized => "transform_vectorized",
        }
    }

    pub fn is_parallel(self) -> bool {
        !matches!(self, TransformStrategy::Sequential)
    }
}

impl fmt::Display for TransformStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransformStrategy {
    type Err = CurveError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" | "simple" => Ok(TransformStrategy::Sequential),
            "parallel" | "par" | "job" => Ok(TransformStrategy::Parallel),
            "vectorized" | "simd" | "burst" => Ok(TransformStrategy::Vectorized),
            other => Err(CurveError::invalid_configuration(format!(
                "unknown strategy '{other}'. Use sequential, parallel or vectorized."
            ))),
        }
    }
}

fn check_dispatch(len: usize, inputs: &[(&str, usize)], chunk_size: usize) -> CurveResult<()> {
    if chunk_size == 0 {
        return Err(CurveError::invalid_configuration("chunk_size must be at least 1"));
    }
    for &(name, input_len) in inputs {
        if input_len != len {
            return Err(CurveError::invalid_configuration(format!(
                "{name} buffer holds {input_len} elements but the output holds {len}"
            )));
        }
    }
    Ok(())
}

fn scalar_chunk(x: &[f32], y: &[f32], z: &[f32], out: &mut [Quat]) {
    for (index, rotation) in out.iter_mut().enumerate() {
        *rotation = euler_degrees_to_quat(x[index], y[index], z[index]);
    }
}

#[allow(clippy::too_many_arguments)]
fn scalar_keyframe_chunk(
    x: &[f32],
    y: &[f32],
    z: &[f32],
    time: &[f32],
    out_x: &mut [Keyframe],
    out_y: &mut [Keyframe],
    out_z: &mut [Keyframe],
    out_w: &mut [Keyframe],
) {
    for index in 0..out_x.len() {
        let rotation = euler_degrees_to_quat(x[index], y[index], z[index]);
        let t = time[index];
        out_x[index] = Keyframe::new(t, rotation.x);
        out_y[index] = Keyframe::new(t, rotation.y);
        out_z[index] = Keyframe::new(t, rotation.z);
        out_w[index] = Keyframe::new(t, rotation.w);
    }
}

#[inline]
fn is_unit_rotation(rotation: Quat) -> bool {
    rotation.is_finite() && (rotation.length() - 1.0).abs() < NORM_TOLERANCE
}

fn degeneracy(index: usize, rotation: Quat) -> CurveError {
    CurveError::NumericDegeneracy {
        index,
        detail: format!("quaternion {rotation:?} has norm {}", rotation.length()),
    }
}

/// Fails with [`CurveError::NumericDegeneracy`] at the first non-unit rotation.
pub fn validate_rotations(rotations: &[Quat], parallel: bool) -> CurveResult<()> {
    let bad = if parallel {
        rotations.par_iter().position_first(|rotation| !is_unit_rotation(*rotation))
    } else {
        rotations.iter().position(|rotation| !is_unit_rotation(*rotation))
    };
    match bad {
        Some(index) => Err(degeneracy(index, rotations[index])),
        None => Ok(()),
    }
}

fn validate_keyframes(buffers: &KeyframeBuffers, parallel: bool) -> CurveResult<()> {
    let rotation_at = |index: usize| {
        Quat::from_xyzw(
            buffers.qx[index].value,
            buffers.qy[index].value,
            buffers.qz[index].value,
            buffers.qw[index].value,
        )
    };
    let len = buffers.len();
    let bad = if parallel {
        (0..len).into_par_iter().position_first(|index| !is_unit_rotation(rotation_at(index)))
    } else {
        (0..len).position(|index| !is_unit_rotation(rotation_at(index)))
    };
    match bad {
        Some(index) => Err(degeneracy(index, rotation_at(index))),
        None => Ok(()),
    }
}

/// Converts `(x[i], y[i], z[i])` degrees into `out[i]` for every flat index.
///
/// Parallel strategies split `out` into `chunk_size` pieces and return only
/// once every piece is written. The whole batch is then checked for unit norm.
pub fn run_strategy(
    strategy: TransformStrategy,
    x: &[f32],
    y: &[f32],
    z: &[f32],
    out: &mut [Quat],
    chunk_size: usize,
) -> CurveResult<()> {
    check_dispatch(
        out.len(),
        &[("angle_x", x.len()), ("angle_y", y.len()), ("angle_z", z.len())],
        chunk_size,
    )?;
    log::debug!("converting {} rotations ({strategy}, chunk_size={chunk_size})", out.len());

    match strategy {
        TransformStrategy::Sequential => scalar_chunk(x, y, z, out),
        TransformStrategy::Parallel => {
            out.par_chunks_mut(chunk_size).enumerate().for_each(|(chunk, rotations)| {
                let range = chunk * chunk_size..chunk * chunk_size + rotations.len();
                scalar_chunk(&x[range.clone()], &y[range.clone()], &z[range], rotations);
            });
        }
        TransformStrategy::Vectorized => {
            out.par_chunks_mut(chunk_size).enumerate().for_each(|(chunk, rotations)| {
                let range = chunk * chunk_size..chunk * chunk_size + rotations.len();
                simd::convert_chunk(&x[range.clone()], &y[range.clone()], &z[range], rotations);
            });
        }
    }

    validate_rotations(out, strategy.is_parallel())
}

/// Convenience wrapper running a strategy over a sampled batch.
pub fn transform_batch(
    strategy: TransformStrategy,
    batch: &AngleBatch,
    out: &mut [Quat],
    chunk_size: usize,
) -> CurveResult<()> {
    run_strategy(strategy, &batch.x, &batch.y, &batch.z, out, chunk_size)
}

/// Extended kernel: writes `(time[i], component)` for each quaternion
/// component into its own flat keyframe buffer.
pub fn generate_keyframes(
    strategy: TransformStrategy,
    batch: &AngleBatch,
    out: &mut KeyframeBuffers,
    chunk_size: usize,
) -> CurveResult<()> {
    if out.shape() != batch.shape() {
        return Err(CurveError::invalid_configuration(format!(
            "keyframe buffers shaped {:?} cannot receive a batch shaped {:?}",
            out.shape(),
            batch.shape()
        )));
    }
    check_dispatch(
        out.len(),
        &[
            ("angle_x", batch.x.len()),
            ("angle_y", batch.y.len()),
            ("angle_z", batch.z.len()),
            ("time", batch.time.len()),
        ],
        chunk_size,
    )?;
    log::debug!("generating {} keyframe quads ({strategy}, chunk_size={chunk_size})", out.len());

    let (x, y, z, time) = (&batch.x[..], &batch.y[..], &batch.z[..], &batch.time[..]);
    let KeyframeBuffers { qx, qy, qz, qw, .. } = &mut *out;
    match strategy {
        TransformStrategy::Sequential => scalar_keyframe_chunk(x, y, z, time, qx, qy, qz, qw),
        TransformStrategy::Parallel | TransformStrategy::Vectorized => {
            let vectorized = strategy == TransformStrategy::Vectorized;
            qx.par_chunks_mut(chunk_size)
                .zip(qy.par_chunks_mut(chunk_size))
                .zip(qz.par_chunks_mut(chunk_size))
                .zip(qw.par_chunks_mut(chunk_size))
                .enumerate()
                .for_each(|(chunk, (((out_x, out_y), out_z), out_w))| {
                    let range = chunk * chunk_size..chunk * chunk_size + out_x.len();
                    let (x, y, z, time) =
                        (&x[range.clone()], &y[range.clone()], &z[range.clone()], &time[range]);
                    if vectorized {
                        simd::keyframe_chunk(x, y, z, time, out_x, out_y, out_z, out_w);
                    } else {
                        scalar_keyframe_chunk(x, y, z, time, out_x, out_y, out_z, out_w);
                    }
                });
        }
    }

    validate_keyframes(out, strategy.is_parallel())
}

/// Largest per-component difference between two rotation buffers.
///
/// Buffers of different lengths are infinitely far apart.
pub fn max_component_deviation(a: &[Quat], b: &[Quat]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    a.par_iter()
        .zip(b.par_iter())
        .map(|(lhs, rhs)| (Vec4::from(*lhs) - Vec4::from(*rhs)).abs().max_element())
        .reduce(|| 0.0, f32::max)
}
