//! Flat batch buffers shared by the sampler and the rotation kernels.
//!
//! Every buffer is addressed by `curve_index * step_count + step_index`.
//! Buffers are plain owned `Vec`s, released when the owning batch drops.

use crate::curve::Keyframe;
use crate::error::{CurveError, CurveResult};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchShape {
    pub curve_count: usize,
    pub step_count: usize,
}

impl BatchShape {
    pub const fn new(curve_count: usize, step_count: usize) -> Self {
        Self { curve_count, step_count }
    }

    pub fn len(&self) -> CurveResult<usize> {
        self.curve_count
            .checked_mul(self.step_count)
            .ok_or(CurveError::AllocationFailure { label: "batch", elements: usize::MAX })
    }

    #[inline(always)]
    pub fn index(&self, curve_index: usize, step_index: usize) -> usize {
        curve_index * self.step_count + step_index
    }

    pub fn curve_range(&self, curve_index: usize) -> Range<usize> {
        let start = curve_index * self.step_count;
        start..start + self.step_count
    }
}

/// Allocates `len` copies of `fill`, reporting allocator refusal instead of aborting.
pub fn allocate_buffer<T: Clone>(label: &'static str, len: usize, fill: T) -> CurveResult<Vec<T>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| CurveError::AllocationFailure { label, elements: len })?;
    buffer.resize(len, fill);
    Ok(buffer)
}

/// Degree-valued Euler samples for every curve and step, plus the sample times.
#[derive(Debug, Clone)]
pub struct AngleBatch {
    shape: BatchShape,
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub time: Vec<f32>,
}

impl AngleBatch {
    pub fn allocate(shape: BatchShape) -> CurveResult<Self> {
        let len = shape.len()?;
        Ok(Self {
            shape,
            x: allocate_buffer("angle_x", len, 0.0)?,
            y: allocate_buffer("angle_y", len, 0.0)?,
            z: allocate_buffer("angle_z", len, 0.0)?,
            time: allocate_buffer("time", len, 0.0)?,
        })
    }

    pub fn shape(&self) -> BatchShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// `(x, y, z, time)` at a flat index.
    pub fn sample(&self, index: usize) -> (f32, f32, f32, f32) {
        (self.x[index], self.y[index], self.z[index], self.time[index])
    }
}

/// Per-component quaternion keyframes, one buffer each for x, y, z and w.
#[derive(Debug, Clone)]
pub struct KeyframeBuffers {
    shape: BatchShape,
    pub qx: Vec<Keyframe>,
    pub qy: Vec<Keyframe>,
    pub qz: Vec<Keyframe>,
    pub qw: Vec<Keyframe>,
}

impl KeyframeBuffers {
    pub fn allocate(shape: BatchShape) -> CurveResult<Self> {
        let len = shape.len()?;
        Ok(Self {
            shape,
            qx: allocate_buffer("keyframes_qx", len, Keyframe::default())?,
            qy: allocate_buffer("keyframes_qy", len, Keyframe::default())?,
            qz: allocate_buffer("keyframes_qz", len, Keyframe::default())?,
            qw: allocate_buffer("keyframes_qw", len, Keyframe::default())?,
        })
    }

    pub fn shape(&self) -> BatchShape {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.qx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.qx.is_empty()
    }
}
