//!
//! Calculate transition/state posteriors from the result of Forward/Backward.
//!
//! - **Transition posterior** (for each block and each edge)
//!     ```text
//!     P(e at t) = F[t, source] w[t, e] B[t+1, target] / Z
//!     ```
//! - **State posterior** (for each block boundary and each state)
//!     ```text
//!     P(s at t) = F[t, s] B[t, s] / Z
//!     ```
//!
//! with `Z = sum_s F[n, s]`, the sum of all path weights.
//!
//! Every path takes exactly one edge per block and sits in exactly one state
//! per boundary, so `Z` can be replaced by the per-row sum of the numerators.
//! This is how the posteriors are normalised, on the rescaled tables.
//!
use super::lattice::{Lattice, SumCombine};
use super::table::ScoreTable;
use super::topology::Topology;
use crate::error::Result;
use crate::prob::logsumexp;
use log::debug;
use ndarray::{Array2, ArrayView2, ArrayViewMut1};

/// Struct for storing the forward and the backward sweeps of a weight matrix.
#[derive(Debug, Clone)]
pub struct ForwardBackward {
    pub forward: ScoreTable,
    pub backward: ScoreTable,
    /// log partition `log Z`
    pub log_partition: f64,
}

impl ForwardBackward {
    ///
    /// Run forward and backward over the full flip-flop lattice with uniform
    /// start and end.
    ///
    pub fn run(topology: &Topology, weights: ArrayView2<f32>) -> Self {
        let lattice = Lattice::new(topology.arena(), weights);
        let uniform = vec![0.0; topology.n_state()];
        let forward = lattice.forward::<SumCombine>(&uniform);
        let backward = lattice.backward::<SumCombine>(&uniform);
        let log_partition = forward.logsumexp_row(forward.n_blocks());
        debug!(
            "forward-backward n_blocks={} log_z(forward)={} log_z(backward)={}",
            forward.n_blocks(),
            log_partition,
            backward.logsumexp_row(0)
        );
        ForwardBackward {
            forward,
            backward,
            log_partition,
        }
    }
    ///
    /// log posterior of every (block, edge), laid out like the weights
    ///
    pub fn to_transition_posteriors(
        &self,
        topology: &Topology,
        weights: ArrayView2<f32>,
    ) -> Array2<f32> {
        let n_blocks = weights.nrows();
        let mut post = Array2::from_elem((n_blocks, topology.n_param()), f32::NEG_INFINITY);
        for t in 0..n_blocks {
            for e in topology.arena().edges() {
                post[[t, e.param]] = self.forward.scores[[t, e.source]]
                    + weights[[t, e.param]]
                    + self.backward.scores[[t + 1, e.target]];
            }
            normalise_row(post.row_mut(t));
        }
        post
    }
    ///
    /// log posterior of every (block boundary, state)
    ///
    pub fn to_state_posteriors(&self) -> Array2<f32> {
        let mut post = &self.forward.scores + &self.backward.scores;
        for row in post.outer_iter_mut() {
            normalise_row(row);
        }
        post
    }
}

/// shift a row of log values so that it sums to 1 in linear space
fn normalise_row(mut row: ArrayViewMut1<f32>) {
    let values: Vec<f32> = row.to_vec();
    let lse = logsumexp(&values);
    if lse.is_finite() {
        row.mapv_inplace(|x| x - lse);
    }
}

///
/// Posterior of each transition given the whole weight matrix.
///
/// Output has the shape of `weights`. With `log = false` the values are
/// probabilities in `[0, 1]`, and each row sums to 1.
///
pub fn transition_posteriors(weights: ArrayView2<f32>, log: bool) -> Result<Array2<f32>> {
    let topology = Topology::for_weights(&weights)?;
    let fb = ForwardBackward::run(&topology, weights);
    let mut post = fb.to_transition_posteriors(&topology, weights);
    if !log {
        post.mapv_inplace(f32::exp);
    }
    Ok(post)
}

///
/// Posterior of occupying each state at each block boundary,
/// shape `(n_blocks + 1, nstate)`.
///
pub fn state_posteriors(weights: ArrayView2<f32>, log: bool) -> Result<Array2<f32>> {
    let topology = Topology::for_weights(&weights)?;
    let fb = ForwardBackward::run(&topology, weights);
    let mut post = fb.to_state_posteriors();
    if !log {
        post.mapv_inplace(f32::exp);
    }
    Ok(post)
}

///
/// `log Z`, the log-sum-exp of the scores of every path
///
pub fn log_partition(weights: ArrayView2<f32>) -> Result<f64> {
    let topology = Topology::for_weights(&weights)?;
    let lattice = Lattice::new(topology.arena(), weights);
    let uniform = vec![0.0; topology.n_state()];
    let forward = lattice.forward::<SumCombine>(&uniform);
    Ok(forward.logsumexp_row(forward.n_blocks()))
}
