//! Equivalence tests for the averaging engines.
//!
//! The sequential engine is the reference. Both parallel engines must leave
//! the buffers in exactly the state it does, for every worker count that
//! splits the domain, and must never write the sentinels. Configuration
//! errors must be reported before any worker starts.
//!
//! Inputs are drawn from a seeded `rand` generator; comparisons use `approx`.

use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stencil1d::{
    BarrierEngine, FinalBuffer, FuzzyEngine, RemainderPolicy, StencilError, run_parallel_barrier,
    run_parallel_fuzzy_barrier, run_sequential,
};
use stencil1d::core::traits::AveragingEngine;

/// Random interior in [-1, 1) with fixed sentinels 2.0 (left) and -3.0 (right).
fn seeded(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut v: Vec<f64> = (0..n + 2).map(|_| rng.gen_range(-1.0..1.0)).collect();
    v[0] = 2.0;
    v[n + 1] = -3.0;
    v
}

type Runner = fn(usize, &mut [f64], &mut [f64], usize, usize) -> Result<FinalBuffer, StencilError>;

const PARALLEL: [(&str, Runner); 2] = [
    ("barrier", run_parallel_barrier),
    ("fuzzy", run_parallel_fuzzy_barrier),
];

/// Runs the reference and returns `(next, current, final)`.
fn reference(iterations: usize, init: &[f64], n: usize) -> (Vec<f64>, Vec<f64>, FinalBuffer) {
    let mut next = init.to_vec();
    let mut current = init.to_vec();
    let fin = run_sequential(iterations, &mut next, &mut current, n).unwrap();
    (next, current, fin)
}

/// Scenario A: one sweep of a single worker over [0, 1, 2, 3, 0].
#[test]
fn scenario_a_single_sweep() {
    let expected = [0.0, (0.0 + 2.0) / 2.0, (1.0 + 3.0) / 2.0, (2.0 + 0.0) / 2.0, 0.0];

    let mut current = vec![0.0, 1.0, 2.0, 3.0, 0.0];
    let mut next = vec![0.0; 5];
    assert_eq!(run_sequential(1, &mut next, &mut current, 3).unwrap(), FinalBuffer::Next);
    assert_eq!(next, expected);

    for (name, run) in PARALLEL {
        let mut current = vec![0.0, 1.0, 2.0, 3.0, 0.0];
        let mut next = vec![0.0; 5];
        let fin = run(1, &mut next, &mut current, 3, 1).unwrap();
        assert_eq!(fin, FinalBuffer::Next, "{name}");
        assert_eq!(next, expected, "{name}");
        assert_eq!(current, [0.0, 1.0, 2.0, 3.0, 0.0], "{name}");
    }
}

/// Scenario B: n = 8, two workers, three sweeps from a seeded array.
#[test]
fn scenario_b_all_engines_agree() {
    let n = 8;
    let init = seeded(n, 0xB);
    let (ref_next, ref_current, ref_fin) = reference(3, &init, n);
    assert_eq!(ref_fin, FinalBuffer::Next);

    for (name, run) in PARALLEL {
        let mut next = init.clone();
        let mut current = init.clone();
        let fin = run(3, &mut next, &mut current, n, 2).unwrap();
        assert_eq!(fin, ref_fin, "{name}");
        assert_eq!(next, ref_next, "{name}: final buffer differs");
        assert_eq!(current, ref_current, "{name}: previous buffer differs");
    }
}

/// Scenario C: bad shapes fail before any buffer is touched.
#[test]
fn scenario_c_configuration_errors() {
    for (name, run) in PARALLEL {
        let init = seeded(10, 7);
        let mut next = init.clone();
        let mut current = init.clone();

        let err = run(4, &mut next, &mut current, 10, 0).unwrap_err();
        assert!(matches!(err, StencilError::NoTasks), "{name}: {err}");
        assert!(err.is_config());

        let err = run(4, &mut next, &mut current, 10, 3).unwrap_err();
        assert!(matches!(err, StencilError::UnevenPartition { n: 10, tasks: 3 }), "{name}: {err}");

        let err = run(4, &mut next, &mut current, 9, 3).unwrap_err();
        assert!(matches!(err, StencilError::BufferLength { .. }), "{name}: {err}");

        assert_eq!(next, init);
        assert_eq!(current, init);
    }
}

#[test]
fn parallel_engines_match_sequential_on_random_inputs() {
    let mut rng = StdRng::seed_from_u64(42);
    for case in 0..24 {
        let tasks = rng.gen_range(1..=8);
        let n = tasks * rng.gen_range(1..=20);
        let iterations = rng.gen_range(0..=40);
        let init = seeded(n, case);
        let (ref_next, ref_current, ref_fin) = reference(iterations, &init, n);

        for (name, run) in PARALLEL {
            let mut next = init.clone();
            let mut current = init.clone();
            let fin = run(iterations, &mut next, &mut current, n, tasks).unwrap();
            assert_eq!(fin, ref_fin);
            let got = fin.select(&next, &current);
            let want = ref_fin.select(&ref_next, &ref_current);
            for j in 0..n + 2 {
                assert_abs_diff_eq!(got[j], want[j], epsilon = 1e-9);
            }
            assert_eq!(next, ref_next, "{name}: n={n} tasks={tasks} iterations={iterations}");
        }
    }
}

#[test]
fn sentinels_are_never_written() {
    let n = 48;
    let init = seeded(n, 99);
    for (name, run) in PARALLEL {
        for tasks in [1, 2, 3, 4, 6, 8, 12, 16, 24, 48] {
            let mut next = init.clone();
            let mut current = init.clone();
            run(25, &mut next, &mut current, n, tasks).unwrap();
            for buf in [&next, &current] {
                assert_eq!(buf[0], 2.0, "{name} tasks={tasks}");
                assert_eq!(buf[n + 1], -3.0, "{name} tasks={tasks}");
            }
        }
    }
}

#[test]
fn zero_iterations_leave_buffers_alone() {
    let init = seeded(6, 3);
    for (_, run) in PARALLEL {
        let mut next = vec![5.0; 8];
        let mut current = init.clone();
        assert_eq!(run(0, &mut next, &mut current, 6, 3).unwrap(), FinalBuffer::Current);
        assert_eq!(current, init);
        assert_eq!(next, vec![5.0; 8]);
    }
}

#[test]
fn non_finite_values_propagate() {
    let n = 4;
    let mut init = vec![0.0; n + 2];
    init[2] = f64::NAN;
    let (_, ref_current, _) = reference(2, &init, n);
    let mut next = init.clone();
    let mut current = init.clone();
    run_parallel_fuzzy_barrier(2, &mut next, &mut current, n, 2).unwrap();
    for j in 0..n + 2 {
        assert_eq!(current[j].is_nan(), ref_current[j].is_nan(), "index {j}");
    }
    assert!(current[2].is_nan());
}

#[test]
fn spread_remainder_matches_sequential() {
    for (n, tasks) in [(10, 4), (17, 5), (31, 8), (9, 9)] {
        let init = seeded(n, n as u64);
        let (ref_next, ref_current, _) = reference(13, &init, n);

        let mut next = init.clone();
        let mut current = init.clone();
        BarrierEngine::new(13, tasks)
            .with_remainder(RemainderPolicy::Spread)
            .run(&mut next, &mut current, n)
            .unwrap();
        assert_eq!((next, current), (ref_next.clone(), ref_current.clone()), "barrier n={n} tasks={tasks}");

        let mut next = init.clone();
        let mut current = init.clone();
        let stats = FuzzyEngine::new(13, tasks)
            .with_remainder(RemainderPolicy::Spread)
            .run(&mut next, &mut current, n)
            .unwrap();
        assert_eq!((next, current), (ref_next, ref_current), "fuzzy n={n} tasks={tasks}");
        assert!(stats.max_neighbor_skew <= 1);
    }
}
