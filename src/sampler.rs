use crate::buffers::{AngleBatch, BatchShape};
use crate::curve::Curve;
use crate::error::{CurveError, CurveResult};
use rayon::prelude::*;

fn check_inputs(
    curves_x: &[Curve],
    curves_y: &[Curve],
    curves_z: &[Curve],
    step_count: usize,
    duration: f32,
) -> CurveResult<()> {
    if curves_x.len() != curves_y.len() || curves_x.len() != curves_z.len() {
        return Err(CurveError::invalid_configuration(format!(
            "axis curve arrays differ in length (x={}, y={}, z={})",
            curves_x.len(),
            curves_y.len(),
            curves_z.len()
        )));
    }
    if step_count == 0 {
        return Err(CurveError::invalid_configuration("step_count must be at least 1"));
    }
    if !duration.is_finite() || duration <= 0.0 {
        return Err(CurveError::invalid_configuration(format!(
            "duration must be finite and positive (got {duration})"
        )));
    }
    Ok(())
}

#[inline(always)]
fn step_time(duration: f32, step_count: usize, step_index: usize) -> f32 {
    (duration / step_count as f32) * step_index as f32
}

#[allow(clippy::too_many_arguments)]
fn fill_row(
    curve_x: &Curve,
    curve_y: &Curve,
    curve_z: &Curve,
    duration: f32,
    x: &mut [f32],
    y: &mut [f32],
    z: &mut [f32],
    time: &mut [f32],
) {
    let step_count = time.len();
    for step in 0..step_count {
        let t = step_time(duration, step_count, step);
        x[step] = curve_x.evaluate(t);
        y[step] = curve_y.evaluate(t);
        z[step] = curve_z.evaluate(t);
        time[step] = t;
    }
}

/// Evaluates every curve triple at `step_count` evenly spaced times starting at 0.
///
/// Sample `j` of curve `i` lands at flat index `i * step_count + j`.
pub fn sample_batch(
    curves_x: &[Curve],
    curves_y: &[Curve],
    curves_z: &[Curve],
    step_count: usize,
    duration: f32,
) -> CurveResult<AngleBatch> {
    check_inputs(curves_x, curves_y, curves_z, step_count, duration)?;
    let shape = BatchShape::new(curves_x.len(), step_count);
    let mut batch = AngleBatch::allocate(shape)?;
    for curve_index in 0..shape.curve_count {
        let row = shape.curve_range(curve_index);
        fill_row(
            &curves_x[curve_index],
            &curves_y[curve_index],
            &curves_z[curve_index],
            duration,
            &mut batch.x[row.clone()],
            &mut batch.y[row.clone()],
            &mut batch.z[row.clone()],
            &mut batch.time[row],
        );
    }
    Ok(batch)
}

/// Same output as [`sample_batch`], with one rayon task per curve row.
pub fn sample_batch_parallel(
    curves_x: &[Curve],
    curves_y: &[Curve],
    curves_z: &[Curve],
    step_count: usize,
    duration: f32,
) -> CurveResult<AngleBatch> {
    check_inputs(curves_x, curves_y, curves_z, step_count, duration)?;
    let shape = BatchShape::new(curves_x.len(), step_count);
    let mut batch = AngleBatch::allocate(shape)?;
    let AngleBatch { x, y, z, time, .. } = &mut batch;
    x.par_chunks_mut(step_count)
        .zip(y.par_chunks_mut(step_count))
        .zip(z.par_chunks_mut(step_count))
        .zip(time.par_chunks_mut(step_count))
        .enumerate()
        .for_each(|(curve_index, (((x, y), z), time))| {
            fill_row(
                &curves_x[curve_index],
                &curves_y[curve_index],
                &curves_z[curve_index],
                duration,
                x,
                y,
                z,
                time,
            );
        });
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::Keyframe;

    fn constant(value: f32) -> Curve {
        Curve::new(vec![Keyframe::new(0.0, value)]).unwrap()
    }

    #[test]
    fn rejects_mismatched_axes() {
        let xs = vec![constant(1.0), constant(2.0)];
        let ys = vec![constant(1.0)];
        let err = sample_batch(&xs, &ys, &xs, 4, 1.0).unwrap_err();
        assert!(matches!(err, CurveError::InvalidConfiguration(_)));
    }

    #[test]
    fn rejects_zero_steps() {
        let xs = vec![constant(1.0)];
        assert!(sample_batch(&xs, &xs, &xs, 0, 1.0).is_err());
        assert!(sample_batch_parallel(&xs, &xs, &xs, 0, 1.0).is_err());
    }

    #[test]
    fn rejects_non_positive_or_non_finite_duration() {
        let xs = vec![constant(1.0)];
        for duration in [0.0, -2.0, f32::NAN, f32::INFINITY] {
            let err = sample_batch(&xs, &xs, &xs, 4, duration).unwrap_err();
            assert!(matches!(err, CurveError::InvalidConfiguration(_)), "duration {duration}: {err:?}");
            let err = sample_batch_parallel(&xs, &xs, &xs, 4, duration).unwrap_err();
            assert!(matches!(err, CurveError::InvalidConfiguration(_)), "duration {duration}: {err:?}");
        }
    }

    #[test]
    fn empty_curve_set_yields_empty_batch() {
        let batch = sample_batch(&[], &[], &[], 8, 1.0).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn time_grid_excludes_duration_endpoint() {
        let xs = vec![constant(0.0)];
        let batch = sample_batch(&xs, &xs, &xs, 4, 2.0).unwrap();
        assert_eq!(batch.time, vec![0.0, 0.5, 1.0, 1.5]);
    }
}
