//! Alignment regression tests for maestro-dtw.
//!
//! These tests pin down the solver contract: endpoint placement per
//! boundary mode, deterministic tie-breaking, hand-computed DP values,
//! and the composition round trip. Reference values were computed by
//! hand from the recurrence and are hardcoded to catch regressions.

use maestro_dtw::{
    compose, cost_matrix, BoundaryMode2, BoundaryMode3, CostMatrix, CostTensor, FeatureMatrix,
    PairwiseDtw, PathPoint, PathPoint3, StepPattern2, TripleDtw, Unit,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn chroma_like(n: usize, phase: f64) -> FeatureMatrix {
    // 12-dim rows tracing a slow rotation, loosely shaped like chroma.
    let rows: Vec<Vec<f64>> = (0..n)
        .map(|i| {
            (0..12)
                .map(|d| ((i as f64 * 0.3 + phase) + d as f64 * 0.52).sin().abs() + 0.01)
                .collect()
        })
        .collect();
    FeatureMatrix::from_rows(rows).expect("valid synthetic features")
}

fn cost(rows: Vec<Vec<f64>>) -> CostMatrix {
    CostMatrix::from_rows(rows).expect("valid cost rows")
}

// ---------------------------------------------------------------------------
// a) pairwise endpoint contracts
// ---------------------------------------------------------------------------

/// Standard mode always spans corner to corner, whatever the costs.
#[test]
fn standard_mode_spans_corners() {
    let a = chroma_like(20, 0.0);
    let b = chroma_like(14, 0.8);
    let result = PairwiseDtw::standard()
        .align(a.as_view(), b.as_view())
        .unwrap();
    assert_eq!(result.path.first().unwrap(), PathPoint { a: 0, b: 0 });
    assert_eq!(result.path.last().unwrap(), PathPoint { a: 19, b: 13 });
}

/// Subsequence mode spans every query row and a free reference window.
#[test]
fn subsequence_mode_spans_query_rows() {
    let query = chroma_like(8, 1.5);
    let reference = chroma_like(40, 0.0);
    let result = PairwiseDtw::new(StepPattern2::unit())
        .with_mode(BoundaryMode2::Subsequence)
        .align(query.as_view(), reference.as_view())
        .unwrap();
    assert_eq!(result.path.first().unwrap().a, 0);
    assert_eq!(result.path.last().unwrap().a, 7);
}

/// The subsequence endpoint column equals the argmin of the final DP row,
/// which for a query copied out of the reference is the copy's end.
#[test]
fn subsequence_locates_embedded_window() {
    let reference = chroma_like(30, 0.0);
    let query = FeatureMatrix::from_rows(
        (10..18).map(|i| reference.frame(i).to_vec()).collect(),
    )
    .unwrap();
    let result = PairwiseDtw::new(StepPattern2::unit())
        .with_mode(BoundaryMode2::Subsequence)
        .align(query.as_view(), reference.as_view())
        .unwrap();
    assert!(result.cost < 1e-6, "embedded window should align freely");
    assert_eq!(result.path.first().unwrap(), PathPoint { a: 0, b: 10 });
    assert_eq!(result.path.last().unwrap(), PathPoint { a: 7, b: 17 });
}

// ---------------------------------------------------------------------------
// b) hand-computed accumulated costs
// ---------------------------------------------------------------------------

/// 3x2 matrix under the standard weighted pattern.
///
/// acc[0][0] = 0; the only route to the last row's reachable cells is the
/// (2,1) double step: acc[2][1] = 0 + C[2][1]*3 = 6.
#[test]
fn weighted_double_step_hand_computed() {
    let c = cost(vec![vec![0.0, 2.0], vec![2.0, 0.0], vec![2.0, 2.0]]);
    let result = PairwiseDtw::standard().solve(&c).unwrap();
    assert!((result.cost - 6.0).abs() < 1e-12);
    assert_eq!(
        result.path.points(),
        &[PathPoint { a: 0, b: 0 }, PathPoint { a: 2, b: 1 }]
    );
}

/// Full 4x4 DP trace under the unit pattern.
///
///   C = [[0,1,1,1],
///        [1,0,1,1],
///        [1,1,0,1],
///        [1,1,1,0]]
///
/// The zero diagonal is free; every detour pays. acc[3][3] = 0.
#[test]
fn unit_pattern_zero_diagonal() {
    let c = cost(vec![
        vec![0.0, 1.0, 1.0, 1.0],
        vec![1.0, 0.0, 1.0, 1.0],
        vec![1.0, 1.0, 0.0, 1.0],
        vec![1.0, 1.0, 1.0, 0.0],
    ]);
    let result = PairwiseDtw::new(StepPattern2::unit()).solve(&c).unwrap();
    assert!(result.cost.abs() < 1e-12);
    let expected: Vec<PathPoint> = (0..4).map(|t| PathPoint { a: t, b: t }).collect();
    assert_eq!(result.path.points(), expected.as_slice());
}

/// Identical inputs twice: byte-identical costs and identical paths.
#[test]
fn determinism_across_invocations() {
    let a = chroma_like(25, 0.2);
    let b = chroma_like(25, 0.9);
    let solver = PairwiseDtw::standard();
    let r1 = solver.align(a.as_view(), b.as_view()).unwrap();
    let r2 = solver.align(a.as_view(), b.as_view()).unwrap();
    assert_eq!(r1.cost.to_bits(), r2.cost.to_bits());
    assert_eq!(r1.path, r2.path);
}

// ---------------------------------------------------------------------------
// c) three-way solver
// ---------------------------------------------------------------------------

/// Fixed 3D mode spans corner to corner on a crafted tensor.
#[test]
fn triple_fixed_spans_corners() {
    let t = CostTensor::from_fn(5, 4, 6, |i, j, k| ((i + j + k) % 3) as f64 * 0.3 + 0.1);
    let result = TripleDtw::standard().solve(&t).unwrap();
    assert_eq!(result.path.first().unwrap(), PathPoint3 { a: 0, b: 0, c: 0 });
    assert_eq!(result.path.last().unwrap(), PathPoint3 { a: 4, b: 3, c: 5 });
}

/// Flex mode with a cheap corridor entering and leaving away from the
/// corners: the path must start and end on faces, not corners.
#[test]
fn triple_flex_uses_faces() {
    // Corridor (t+2, t, t): starts on the j/k faces at i=2, exits on the
    // i face at (6, 4, 4) before the j/k corner.
    let t = CostTensor::from_fn(7, 6, 6, |i, j, k| {
        if i == j + 2 && j == k { 0.01 } else { 1.0 }
    });
    let result = TripleDtw::standard()
        .with_mode(BoundaryMode3::Flex { buffer: 1 })
        .solve(&t)
        .unwrap();
    assert_eq!(result.start, PathPoint3 { a: 2, b: 0, c: 0 });
    assert_eq!(result.path.last().unwrap(), PathPoint3 { a: 6, b: 4, c: 4 });
}

/// The flex buffer excludes near-face endpoints; reference scenario from
/// the solver's contract.
#[test]
fn triple_flex_buffer_exclusion() {
    let t = CostTensor::from_fn(4, 4, 4, |i, j, k| {
        if (i, j, k) == (3, 0, 0) {
            0.01
        } else if i == j && j == k {
            0.1
        } else {
            1.0
        }
    });
    let result = TripleDtw::standard()
        .with_mode(BoundaryMode3::Flex { buffer: 1 })
        .solve(&t)
        .unwrap();
    assert_eq!(result.path.last().unwrap(), PathPoint3 { a: 3, b: 3, c: 3 });
}

// ---------------------------------------------------------------------------
// d) composition and codec round trips
// ---------------------------------------------------------------------------

/// Align A to B, compose with the swapped curve, and land back on the
/// identity within one frame.
#[test]
fn composition_round_trip_within_one_frame() {
    let a = chroma_like(30, 0.0);
    let b = chroma_like(22, 0.6);
    let result = PairwiseDtw::standard()
        .align(a.as_view(), b.as_view())
        .unwrap();
    let ab = result.path.to_curve();
    let aa = compose(&ab, &ab.swap_axes()).unwrap();
    assert_eq!(aa.unit(), Unit::Frames);
    for &(x, y) in aa.points() {
        assert!((y - x).abs() <= 1.0, "round trip moved {x} to {y}");
    }
}

/// Frames -> seconds -> composition keeps the unit tag consistent and the
/// coordinates scaled by the hop length.
#[test]
fn seconds_conversion_then_composition() {
    let a = chroma_like(16, 0.1);
    let b = chroma_like(16, 0.4);
    let hop = maestro_dtw::hop_seconds(512, 22050);

    let ab = PairwiseDtw::standard()
        .align(a.as_view(), b.as_view())
        .unwrap()
        .path
        .to_curve()
        .into_seconds(hop)
        .unwrap();
    let bb = compose(&ab.swap_axes(), &ab).unwrap();
    assert_eq!(bb.unit(), Unit::Seconds);
    let &(last_a, _) = bb.points().last().unwrap();
    assert!((last_a - 15.0 * hop).abs() < 1e-9);
}

/// Cosine cost of a sequence against itself is (near) zero along the
/// diagonal, and the solver follows it exactly.
#[test]
fn self_alignment_is_diagonal() {
    let a = chroma_like(40, 0.0);
    let c = cost_matrix(a.as_view(), a.as_view()).unwrap();
    let result = PairwiseDtw::new(StepPattern2::unit()).solve(&c).unwrap();
    for p in result.path.points() {
        assert_eq!(p.a, p.b);
    }
    assert!(result.cost < 1e-6);
}
