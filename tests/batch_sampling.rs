use kestrel_curves::buffers::BatchShape;
use kestrel_curves::{
    generate_random_curves, sample_batch, sample_batch_parallel, Curve, CurveGenerationInfo, Keyframe,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const CURVE_COUNT: usize = 3;
const STEP_COUNT: usize = 4;
const DURATION: f32 = 2.0;

/// A curve keyed at every sample time with `value = time + offset`, so it
/// reproduces the identity (shifted per curve) exactly on the sampling grid.
fn grid_identity(offset: f32) -> Curve {
    let keys = (0..STEP_COUNT)
        .map(|step| {
            let time = (DURATION / STEP_COUNT as f32) * step as f32;
            Keyframe::new(time, time + offset)
        })
        .collect();
    Curve::new(keys).expect("grid curve")
}

#[test]
fn flat_index_addresses_curve_then_step() {
    let xs: Vec<Curve> = (0..CURVE_COUNT).map(|i| grid_identity(i as f32 * 100.0)).collect();
    let ys: Vec<Curve> = (0..CURVE_COUNT).map(|i| grid_identity(i as f32 * 100.0 + 10.0)).collect();
    let zs: Vec<Curve> = (0..CURVE_COUNT).map(|i| grid_identity(i as f32 * 100.0 + 20.0)).collect();

    let batch = sample_batch(&xs, &ys, &zs, STEP_COUNT, DURATION).expect("sample batch");
    assert_eq!(batch.len(), CURVE_COUNT * STEP_COUNT);
    assert_eq!(batch.x.len(), 12);
    assert_eq!(batch.y.len(), 12);
    assert_eq!(batch.z.len(), 12);
    assert_eq!(batch.time.len(), 12);

    let shape = batch.shape();
    assert_eq!(shape, BatchShape::new(CURVE_COUNT, STEP_COUNT));
    for curve in 0..CURVE_COUNT {
        for step in 0..STEP_COUNT {
            let index = curve * STEP_COUNT + step;
            assert_eq!(shape.index(curve, step), index);
            let time = (DURATION / STEP_COUNT as f32) * step as f32;
            let (x, y, z, t) = batch.sample(index);
            assert_eq!(t, time, "time at curve {curve} step {step}");
            assert_eq!(x, time + curve as f32 * 100.0, "x at curve {curve} step {step}");
            assert_eq!(y, time + curve as f32 * 100.0 + 10.0, "y at curve {curve} step {step}");
            assert_eq!(z, time + curve as f32 * 100.0 + 20.0, "z at curve {curve} step {step}");
        }
    }
}

#[test]
fn parallel_sampling_is_bit_identical() {
    let info =
        CurveGenerationInfo { duration: 30.0, number_of_keys: 20, min_value: 180.0, max_value: -180.0 };
    let mut rng = StdRng::seed_from_u64(11);
    let xs = generate_random_curves(17, &info, &mut rng).expect("x curves");
    let ys = generate_random_curves(17, &info, &mut rng).expect("y curves");
    let zs = generate_random_curves(17, &info, &mut rng).expect("z curves");

    let sequential = sample_batch(&xs, &ys, &zs, 250, 30.0).expect("sequential sampling");
    let parallel = sample_batch_parallel(&xs, &ys, &zs, 250, 30.0).expect("parallel sampling");
    assert_eq!(sequential.x, parallel.x);
    assert_eq!(sequential.y, parallel.y);
    assert_eq!(sequential.z, parallel.z);
    assert_eq!(sequential.time, parallel.time);
}

#[test]
fn sampling_is_deterministic() {
    let info = CurveGenerationInfo { duration: 5.0, number_of_keys: 6, min_value: -90.0, max_value: 90.0 };
    let curves = generate_random_curves(4, &info, &mut StdRng::seed_from_u64(5)).expect("curves");
    let first = sample_batch(&curves, &curves, &curves, 32, 5.0).expect("first pass");
    let second = sample_batch(&curves, &curves, &curves, 32, 5.0).expect("second pass");
    assert_eq!(first.x, second.x);
    assert_eq!(first.time, second.time);
}
