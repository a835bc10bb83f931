use glam::Quat;

pub(crate) const TURN_DEGREES: f32 = 360.0;
pub(crate) const TURNS_PER_DEGREE: f32 = 1.0 / 360.0;

/// Folds a degree value into `[-180, 180)`, up to rounding, by subtracting
/// the nearest whole number of turns.
///
/// The vectorized kernel runs the same multiply, add, floor and subtract on
/// `f32x4` lanes, so every strategy reduces large angles identically.
#[inline(always)]
pub fn wrap_degrees(degrees: f32) -> f32 {
    degrees - TURN_DEGREES * (degrees * TURNS_PER_DEGREE + 0.5).floor()
}

/// Euler angles in degrees to a rotation that applies Z, then X, then Y.
#[inline]
pub fn euler_degrees_to_quat(x_deg: f32, y_deg: f32, z_deg: f32) -> Quat {
    let x = wrap_degrees(x_deg).to_radians();
    let y = wrap_degrees(y_deg).to_radians();
    let z = wrap_degrees(z_deg).to_radians();
    Quat::from_rotation_y(y) * Quat::from_rotation_x(x) * Quat::from_rotation_z(z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn wraps_into_half_open_turn() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
        assert_eq!(wrap_degrees(180.0), -180.0);
        assert_eq!(wrap_degrees(-180.0), -180.0);
        assert_eq!(wrap_degrees(-540.0), -180.0);
    }

    #[test]
    fn single_axis_rotations_match_glam() {
        let q = euler_degrees_to_quat(90.0, 0.0, 0.0);
        assert!(q.abs_diff_eq(Quat::from_rotation_x(std::f32::consts::FRAC_PI_2), 1e-6));
        let q = euler_degrees_to_quat(0.0, 0.0, -45.0);
        assert!(q.abs_diff_eq(Quat::from_rotation_z(-std::f32::consts::FRAC_PI_4), 1e-6));
    }

    #[test]
    fn z_is_applied_before_x() {
        // Z by 90 sends +X to +Y, then X by 90 sends +Y to +Z.
        let q = euler_degrees_to_quat(90.0, 0.0, 90.0);
        let moved = q * Vec3::X;
        assert!(moved.abs_diff_eq(Vec3::Z, 1e-5), "got {moved:?}");
    }
}
