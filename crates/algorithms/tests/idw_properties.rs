//! Behavioural properties of the IDW engine over generated station layouts.
//!
//! Layouts come from a fixed linear congruential sequence so every run sees
//! the same data.

use aqsense_algorithms::classification::Band;
use aqsense_algorithms::interpolation::{DistanceMetric, Engine, EngineParams};
use aqsense_core::{Coordinate, Error, ReferenceSet, StationRecord};

struct Lcg(u64);

impl Lcg {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

fn stations(seed: u64, n: usize) -> Vec<StationRecord> {
    let mut rng = Lcg(seed);
    (0..n)
        .map(|_| {
            StationRecord::new(
                (rng.range(8.0, 32.0), rng.range(68.0, 97.0)),
                rng.range(0.0, 300.0),
            )
        })
        .collect()
}

fn queries(seed: u64, n: usize) -> Vec<Coordinate> {
    let mut rng = Lcg(seed);
    (0..n)
        .map(|_| Coordinate::new(rng.range(5.0, 35.0), rng.range(65.0, 100.0)))
        .collect()
}

// ---------------------------------------------------------------------------
// Exact match
// ---------------------------------------------------------------------------

#[test]
fn exact_match_returns_station_value_for_any_k() {
    let records = stations(7, 26);
    let reference = ReferenceSet::build(records.clone()).unwrap();

    for k in [1, 2, 3, 5, 26, 100] {
        let engine = Engine::new(reference.clone(), k).unwrap();
        for record in &records {
            let est = engine.predict(record.coordinate).unwrap();
            assert_eq!(est.value, record.value, "k={}", k);
        }
    }
}

// ---------------------------------------------------------------------------
// Convexity
// ---------------------------------------------------------------------------

#[test]
fn estimate_within_selected_neighbor_range() {
    let reference = ReferenceSet::build(stations(11, 40)).unwrap();

    for k in [1, 3, 7] {
        let engine = Engine::new(reference.clone(), k).unwrap();
        for q in queries(99, 200) {
            let detail = engine.predict_detailed(q).unwrap();
            let values: Vec<f64> = detail.contributions.iter().map(|c| c.neighbor.value).collect();
            let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let v = detail.estimate.value;
            assert!(v >= lo && v <= hi, "k={} q={:?}: {} not in [{}, {}]", k, q, v, lo, hi);
        }
    }
}

// ---------------------------------------------------------------------------
// Neighbor selection
// ---------------------------------------------------------------------------

#[test]
fn selection_invariant_under_uniform_scaling() {
    let records = stations(23, 30);
    let query = Coordinate::new(20.0, 80.0);

    // Push every station away from the query by the same factor
    let scaled: Vec<StationRecord> = records
        .iter()
        .map(|r| {
            let lat = query.latitude + 3.0 * (r.coordinate.latitude - query.latitude);
            let lon = query.longitude + 3.0 * (r.coordinate.longitude - query.longitude);
            StationRecord::new((lat, lon), r.value)
        })
        .collect();

    let near = Engine::new(ReferenceSet::build(records).unwrap(), 5).unwrap();
    let far = Engine::new(ReferenceSet::build(scaled).unwrap(), 5).unwrap();

    let a: Vec<usize> = near.neighbors(query).unwrap().iter().map(|n| n.index).collect();
    let b: Vec<usize> = far.neighbors(query).unwrap().iter().map(|n| n.index).collect();
    assert_eq!(a, b);

    // Same ranking and same relative distances give the same estimate
    let va = near.predict(query).unwrap().value;
    let vb = far.predict(query).unwrap().value;
    assert!((va - vb).abs() < 1e-9, "{} vs {}", va, vb);
}

#[test]
fn kdtree_selection_matches_stable_sort() {
    let records = stations(5, 60);
    let reference = ReferenceSet::build(records.clone()).unwrap();
    let engine = Engine::new(reference, 4).unwrap();

    for q in queries(17, 150) {
        let mut expected: Vec<(usize, f64)> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.coordinate.dist_sq(&q)))
            .collect();
        expected.sort_by(|a, b| a.1.total_cmp(&b.1));
        let expected: Vec<usize> = expected.iter().take(4).map(|e| e.0).collect();

        let got: Vec<usize> = engine.neighbors(q).unwrap().iter().map(|n| n.index).collect();
        assert_eq!(got, expected, "query {:?}", q);
    }
}

#[test]
fn haversine_engine_uses_all_stations_when_k_exceeds_size() {
    let reference = ReferenceSet::build(stations(3, 4)).unwrap();
    let params = EngineParams {
        k: 10,
        metric: DistanceMetric::Haversine,
        ..Default::default()
    };
    let engine = Engine::with_params(reference, params).unwrap();
    let neighbors = engine.neighbors(Coordinate::new(20.0, 80.0)).unwrap();
    assert_eq!(neighbors.len(), 4);
    for pair in neighbors.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
}

// ---------------------------------------------------------------------------
// Determinism and ties
// ---------------------------------------------------------------------------

#[test]
fn equidistant_stations_give_repeatable_estimates() {
    let reference = ReferenceSet::build(vec![
        StationRecord::new((10.0, 20.0), 15.0),
        StationRecord::new((10.0, 22.0), 150.0),
        StationRecord::new((11.0, 21.0), 60.0),
        StationRecord::new((9.0, 21.0), 250.0),
    ])
    .unwrap();
    let engine = Engine::new(reference, 2).unwrap();
    let q = Coordinate::new(10.0, 21.0);

    // All four at distance 1: indices 0 and 1 win over 2 and 3
    let first = engine.predict(q).unwrap();
    assert!((first.value - 82.5).abs() < 1e-12);
    assert_eq!(first.band, Band::Moderate);

    for _ in 0..50 {
        assert_eq!(engine.predict(q).unwrap(), first);
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn empty_reference_rejected() {
    assert!(matches!(ReferenceSet::build(Vec::new()), Err(Error::EmptyInput)));
}

#[test]
fn k_larger_than_reference_uses_everything() {
    let reference = ReferenceSet::build(stations(1, 3)).unwrap();
    let all = Engine::new(reference.clone(), 3).unwrap();
    let oversized = Engine::new(reference, 50).unwrap();

    for q in queries(2, 20) {
        assert_eq!(all.predict(q).unwrap(), oversized.predict(q).unwrap());
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_midpoint_and_exact() {
    let reference = ReferenceSet::build(vec![
        StationRecord::new((0.0, 0.0), 10.0),
        StationRecord::new((0.0, 2.0), 30.0),
    ])
    .unwrap();
    let engine = Engine::new(reference, 2).unwrap();

    let mid = engine.predict(Coordinate::new(0.0, 1.0)).unwrap();
    assert_eq!(mid.value, 20.0);
    // 20 is at or below the 50 threshold
    assert_eq!(mid.band, Band::Good);

    let exact = engine.predict(Coordinate::new(0.0, 0.0)).unwrap();
    assert_eq!(exact.value, 10.0);
    assert_eq!(exact.band, Band::Good);
}

#[test]
fn scenario_distant_station_does_not_pull_to_midpoint() {
    let reference = ReferenceSet::build(vec![
        StationRecord::new((0.0, 0.0), 40.0),
        StationRecord::new((10.0, 10.0), 400.0),
    ])
    .unwrap();
    let engine = Engine::new(reference, 2).unwrap();
    let est = engine.predict(Coordinate::new(0.0, 0.1)).unwrap();
    assert!((est.value - 40.0).abs() < 5.0, "got {}", est.value);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[test]
fn concurrent_queries_agree_with_sequential() {
    let engine = Engine::new(ReferenceSet::build(stations(41, 26)).unwrap(), 3).unwrap();
    let qs = queries(43, 64);
    let expected: Vec<f64> = qs.iter().map(|q| engine.predict(*q).unwrap().value).collect();

    std::thread::scope(|s| {
        let handles: Vec<_> = qs
            .chunks(16)
            .map(|chunk| {
                let engine = &engine;
                s.spawn(move || {
                    chunk
                        .iter()
                        .map(|q| engine.predict(*q).unwrap().value)
                        .collect::<Vec<f64>>()
                })
            })
            .collect();
        let got: Vec<f64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        assert_eq!(got, expected);
    });

    let batch: Vec<f64> = engine
        .predict_batch(&qs)
        .into_iter()
        .map(|r| r.unwrap().value)
        .collect();
    assert_eq!(batch, expected);
}
