//! Four-lane Euler-to-quaternion kernel on `wide::f32x4`.
//!
//! Produces the same rotation as [`super::euler_degrees_to_quat`] using the
//! expanded product of the three half-angle quaternions, so a lane group is
//! straight-line arithmetic with no allocation.

use super::scalar::{TURNS_PER_DEGREE, TURN_DEGREES};
use crate::curve::Keyframe;
use glam::Quat;
use wide::f32x4;

pub const LANES: usize = 4;

const HALF_RADIANS_PER_DEGREE: f32 = std::f32::consts::PI / 180.0 * 0.5;

/// Loads up to four lanes, zero padding the rest, and wraps them into
/// `[-180, 180)` with the same arithmetic as [`super::wrap_degrees`].
#[inline(always)]
fn load_wrapped(lanes: &[f32]) -> f32x4 {
    let mut raw = [0.0_f32; LANES];
    raw[..lanes.len()].copy_from_slice(lanes);
    wrap_degrees_x4(f32x4::from(raw))
}

#[inline(always)]
pub fn wrap_degrees_x4(degrees: f32x4) -> f32x4 {
    let turns = (degrees * f32x4::splat(TURNS_PER_DEGREE) + f32x4::splat(0.5)).floor();
    degrees - f32x4::splat(TURN_DEGREES) * turns
}

/// Converts four wrapped degree triples at once, returning `[x, y, z, w]` lanes.
#[inline(always)]
pub fn euler_degrees_to_quat_x4(x: f32x4, y: f32x4, z: f32x4) -> [f32x4; 4] {
    let half = f32x4::splat(HALF_RADIANS_PER_DEGREE);
    let (sx, cx) = (x * half).sin_cos();
    let (sy, cy) = (y * half).sin_cos();
    let (sz, cz) = (z * half).sin_cos();

    let cx_cy = cx * cy;
    let sx_sy = sx * sy;
    let sx_cy = sx * cy;
    let cx_sy = cx * sy;

    [
        sx_cy * cz + cx_sy * sz,
        cx_sy * cz - sx_cy * sz,
        cx_cy * sz - sx_sy * cz,
        cx_cy * cz + sx_sy * sz,
    ]
}

/// Walks the inputs four lanes at a time; the final group is zero padded and
/// `emit` receives only the live lane count for it.
#[inline(always)]
fn for_each_lane_group<F>(x: &[f32], y: &[f32], z: &[f32], mut emit: F)
where
    F: FnMut(usize, usize, [[f32; LANES]; 4]),
{
    for (group, ((xs, ys), zs)) in x.chunks(LANES).zip(y.chunks(LANES)).zip(z.chunks(LANES)).enumerate() {
        let [qx, qy, qz, qw] = euler_degrees_to_quat_x4(load_wrapped(xs), load_wrapped(ys), load_wrapped(zs));
        emit(group * LANES, xs.len(), [qx.to_array(), qy.to_array(), qz.to_array(), qw.to_array()]);
    }
}

pub fn convert_chunk(x: &[f32], y: &[f32], z: &[f32], out: &mut [Quat]) {
    for_each_lane_group(x, y, z, |base, live, [qx, qy, qz, qw]| {
        for lane in 0..live {
            out[base + lane] = Quat::from_xyzw(qx[lane], qy[lane], qz[lane], qw[lane]);
        }
    });
}

#[allow(clippy::too_many_arguments)]
pub fn keyframe_chunk(
    x: &[f32],
    y: &[f32],
    z: &[f32],
    time: &[f32],
    out_x: &mut [Keyframe],
    out_y: &mut [Keyframe],
    out_z: &mut [Keyframe],
    out_w: &mut [Keyframe],
) {
    for_each_lane_group(x, y, z, |base, live, [qx, qy, qz, qw]| {
        for lane in 0..live {
            let index = base + lane;
            let t = time[index];
            out_x[index] = Keyframe::new(t, qx[lane]);
            out_y[index] = Keyframe::new(t, qy[lane]);
            out_z[index] = Keyframe::new(t, qz[lane]);
            out_w[index] = Keyframe::new(t, qw[lane]);
        }
    });
}
