pub mod buffers;
pub mod cli;
pub mod config;
pub mod curve;
pub mod error;
pub mod generator;
pub mod harness;
pub mod profiler;
pub mod reassembly;
pub mod rotation;
pub mod sampler;

pub use curve::{Curve, CurveInterpolation, Keyframe};
pub use error::{CurveError, CurveResult};
pub use generator::{generate_random_curve, generate_random_curves, CurveGenerationInfo};
pub use harness::{run_benchmark, BenchOutcome, BenchReport};
pub use reassembly::{reassemble, reassemble_rotation_curves, RotationCurves};
pub use rotation::{euler_degrees_to_quat, generate_keyframes, run_strategy, TransformStrategy};
pub use sampler::{sample_batch, sample_batch_parallel};
