//!
//! Mock weight matrices for testing
//!
use super::topology::{n_param_of, Topology};
use crate::common::State;
use ndarray::Array2;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

///
/// Random weights in `[-2, 2)` of shape `(n_blocks, nparam)`
///
pub fn mock_random_weights(n_blocks: usize, nbase: usize, seed: u64) -> Array2<f32> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    Array2::from_shape_simple_fn((n_blocks, n_param_of(nbase)), || {
        rng.gen_range(-2.0f32..2.0)
    })
}

///
/// Random non-negative weights in `[0, 1)`
///
pub fn mock_positive_weights(n_blocks: usize, nbase: usize, seed: u64) -> Array2<f32> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    Array2::from_shape_simple_fn((n_blocks, n_param_of(nbase)), || rng.gen_range(0.0f32..1.0))
}

///
/// Random walk of `n_blocks` legal transitions, `n_blocks + 1` states long.
///
pub fn mock_random_path(n_blocks: usize, nbase: usize, seed: u64) -> Vec<State> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let topology = Topology::new(nbase).expect("nbase >= 1");
    let mut path = vec![rng.gen_range(0..topology.n_state())];
    for _ in 0..n_blocks {
        let s = *path.last().unwrap();
        let targets: Vec<State> = topology.arena().outgoing(s).map(|e| e.target).collect();
        path.push(*targets.choose(&mut rng).unwrap());
    }
    path
}

///
/// Weights whose best path is exactly `path`: the edge used at each block
/// gets `high`, every other edge gets 0.
///
/// `path` must be a legal state path.
///
pub fn mock_path_weights(path: &[State], nbase: usize, high: f32) -> Array2<f32> {
    let topology = Topology::new(nbase).expect("nbase >= 1");
    let n_blocks = path.len() - 1;
    let mut w = Array2::zeros((n_blocks, topology.n_param()));
    for (t, pair) in path.windows(2).enumerate() {
        let param = topology
            .param_of(pair[0], pair[1])
            .expect("mock path must be legal");
        w[[t, param]] = high;
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_shapes() {
        let w = mock_random_weights(7, 4, 0);
        assert_eq!(w.dim(), (7, 40));
        assert!(w.iter().all(|&x| (-2.0..2.0).contains(&x)));
        let w = mock_positive_weights(3, 2, 0);
        assert_eq!(w.dim(), (3, 12));
        assert!(w.iter().all(|&x| x >= 0.0));
    }
    #[test]
    fn mock_path_is_legal() {
        let topology = Topology::new(3).unwrap();
        let path = mock_random_path(20, 3, 5);
        assert_eq!(path.len(), 21);
        for pair in path.windows(2) {
            assert!(topology.is_valid_transition(pair[0], pair[1]));
        }
        let w = mock_path_weights(&path, 3, 10.0);
        assert_eq!(w.dim(), (20, 24));
        assert_abs_diff_eq!(w.sum(), 200.0);
    }
}
