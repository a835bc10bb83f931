//! Drives one full benchmark pass: curve generation, sampling, every selected
//! rotation strategy, a cross-strategy check, then optionally keyframe
//! generation and curve reassembly.
//!
//! Each stage reports its wall time to the injected [`TimingSink`]. Buffers
//! are owned by the stage that allocates them and are dropped on every exit
//! path, including early failures.

use crate::buffers::{allocate_buffer, AngleBatch, KeyframeBuffers};
use crate::config::BenchConfig;
use crate::curve::Curve;
use crate::error::{CurveError, CurveResult};
use crate::generator::generate_random_curves;
use crate::profiler::{time_stage, StageProfiler, StageTimingSummary, TimingSink};
use crate::reassembly::reassemble_rotation_curves;
use crate::rotation::{
    generate_keyframes, max_component_deviation, transform_batch, TransformStrategy, EQUIVALENCE_TOLERANCE,
};
use crate::sampler::{sample_batch, sample_batch_parallel};
use glam::Quat;
use rand::Rng;
use serde::Serialize;

/// Three independent curve arrays, one per Euler axis.
#[derive(Debug, Clone)]
pub struct AxisCurves {
    pub x: Vec<Curve>,
    pub y: Vec<Curve>,
    pub z: Vec<Curve>,
}

impl AxisCurves {
    pub fn generate<R: Rng + ?Sized>(config: &BenchConfig, rng: &mut R) -> CurveResult<Self> {
        let info = config.generation_info();
        let count = config.batch.curve_count;
        Ok(Self {
            x: generate_random_curves(count, &info, rng)?,
            y: generate_random_curves(count, &info, rng)?,
            z: generate_random_curves(count, &info, rng)?,
        })
    }

    pub fn sample(&self, step_count: usize, duration: f32, parallel: bool) -> CurveResult<AngleBatch> {
        if parallel {
            sample_batch_parallel(&self.x, &self.y, &self.z, step_count, duration)
        } else {
            sample_batch(&self.x, &self.y, &self.z, step_count, duration)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyOutcome {
    pub strategy: TransformStrategy,
    pub rotations: usize,
    /// Largest component gap against the first strategy that ran.
    pub max_deviation: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchOutcome {
    pub curve_count: usize,
    pub step_count: usize,
    pub samples: usize,
    pub strategies: Vec<StrategyOutcome>,
    pub reassembled_curves: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub config: BenchConfig,
    pub outcome: BenchOutcome,
    pub stages: Vec<StageTimingSummary>,
}

impl BenchReport {
    pub fn new(config: &BenchConfig, outcome: BenchOutcome, profiler: &StageProfiler) -> Self {
        Self { config: config.clone(), outcome, stages: profiler.summaries() }
    }
}

/// Returns the largest component gap between `reference` and `candidate`,
/// failing with [`CurveError::StrategyMismatch`] when it exceeds `tolerance`.
pub fn check_equivalence(
    strategy: TransformStrategy,
    reference: &[Quat],
    candidate: &[Quat],
    tolerance: f32,
) -> CurveResult<f32> {
    let deviation = max_component_deviation(reference, candidate);
    if deviation > tolerance {
        log::error!("{strategy} deviates from the reference by {deviation:e}");
        return Err(CurveError::StrategyMismatch { strategy: strategy.label(), deviation });
    }
    Ok(deviation)
}

/// Runs every configured strategy over `batch`, checking each against the
/// first strategy's output.
pub fn compare_strategies(
    config: &BenchConfig,
    batch: &AngleBatch,
    sink: &mut dyn TimingSink,
) -> CurveResult<Vec<StrategyOutcome>> {
    let mut reference: Option<Vec<Quat>> = None;
    let mut outcomes = Vec::with_capacity(config.dispatch.strategies.len());
    for &strategy in &config.dispatch.strategies {
        let mut rotations = allocate_buffer("rotations", batch.len(), Quat::IDENTITY)?;
        time_stage(sink, strategy.stage_label(), || {
            transform_batch(strategy, batch, &mut rotations, config.dispatch.chunk_size)
        })?;

        let max_deviation = match &reference {
            Some(expected) => check_equivalence(strategy, expected, &rotations, EQUIVALENCE_TOLERANCE)?,
            None => 0.0,
        };
        log::debug!("{strategy}: {} rotations, max deviation {max_deviation:e}", rotations.len());
        outcomes.push(StrategyOutcome { strategy, rotations: rotations.len(), max_deviation });
        if reference.is_none() {
            reference = Some(rotations);
        }
    }
    Ok(outcomes)
}

/// Extended pass: builds per-component keyframe buffers and reassembles them
/// into one quaternion curve quadruple per input curve.
pub fn build_rotation_curves(
    config: &BenchConfig,
    batch: &AngleBatch,
    sink: &mut dyn TimingSink,
) -> CurveResult<usize> {
    let mut keyframes = KeyframeBuffers::allocate(batch.shape())?;
    time_stage(sink, "generate_keyframes", || {
        generate_keyframes(
            config.dispatch.keyframe_strategy,
            batch,
            &mut keyframes,
            config.dispatch.keyframe_chunk_size,
        )
    })?;
    let curves = time_stage(sink, "reassemble_curves", || reassemble_rotation_curves(&keyframes))?;
    Ok(curves.len())
}

pub fn run_benchmark<R: Rng + ?Sized>(
    config: &BenchConfig,
    rng: &mut R,
    sink: &mut dyn TimingSink,
) -> CurveResult<BenchOutcome> {
    config.validate()?;
    log::info!(
        "benchmark: {} curves x {} steps, {} keys per curve, chunk_size={}",
        config.batch.curve_count,
        config.batch.step_count,
        config.generation.keys_per_curve,
        config.dispatch.chunk_size
    );

    let curves = time_stage(sink, "generate_curves", || AxisCurves::generate(config, rng))?;
    let batch = time_stage(sink, "sample_curves", || {
        curves.sample(config.batch.step_count, config.batch.duration, config.batch.parallel_sampling)
    })?;
    drop(curves);

    let strategies = compare_strategies(config, &batch, sink)?;
    let reassembled_curves = if config.dispatch.build_keyframes {
        Some(build_rotation_curves(config, &batch, sink)?)
    } else {
        None
    };

    Ok(BenchOutcome {
        curve_count: config.batch.curve_count,
        step_count: config.batch.step_count,
        samples: batch.len(),
        strategies,
        reassembled_curves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equivalence_within_tolerance_reports_the_gap() {
        let reference = [Quat::IDENTITY, Quat::from_xyzw(0.0, 1.0, 0.0, 0.0)];
        let candidate = [Quat::IDENTITY, Quat::from_xyzw(0.0, 1.0, 0.0, 0.00005)];
        let deviation =
            check_equivalence(TransformStrategy::Vectorized, &reference, &candidate, EQUIVALENCE_TOLERANCE)
                .expect("within tolerance");
        assert!((deviation - 0.00005).abs() < 1e-7);
    }

    #[test]
    fn deviation_above_tolerance_is_a_strategy_mismatch() {
        let reference = [Quat::IDENTITY; 3];
        let mut candidate = [Quat::IDENTITY; 3];
        candidate[2] = Quat::from_xyzw(0.0, 0.0, 0.001, 1.0);
        let err =
            check_equivalence(TransformStrategy::Parallel, &reference, &candidate, EQUIVALENCE_TOLERANCE)
                .unwrap_err();
        match err {
            CurveError::StrategyMismatch { strategy, deviation } => {
                assert_eq!(strategy, "parallel");
                assert!((deviation - 0.001).abs() < 1e-6, "deviation {deviation}");
            }
            other => panic!("expected a strategy mismatch, got {other:?}"),
        }
    }

    #[test]
    fn length_mismatch_is_a_strategy_mismatch() {
        let err =
            check_equivalence(TransformStrategy::Vectorized, &[Quat::IDENTITY; 2], &[Quat::IDENTITY], 1.0)
                .unwrap_err();
        assert!(matches!(err, CurveError::StrategyMismatch { strategy: "vectorized", .. }));
    }
}
