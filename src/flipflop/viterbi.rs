//!
//! Viterbi decoding of the most likely state path
//!
use super::basecall::collapse;
use super::lattice::{Lattice, MaxCombine};
use super::topology::Topology;
use crate::common::{Base, State};
use crate::error::Result;
use log::debug;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

///
/// Best path of a weight matrix
///
/// * `path` has `n_blocks + 1` states (the start state first)
/// * `per_step_score[i]` is the score of the transition entering `path[i]`
///   (`per_step_score[0] = 0` for the start)
/// * `total_score` is the sum of `per_step_score`
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViterbiOutput {
    pub path: Vec<State>,
    pub per_step_score: Vec<f32>,
    pub total_score: f32,
}

impl ViterbiOutput {
    /// The number of blocks that were decoded
    pub fn n_blocks(&self) -> usize {
        self.path.len() - 1
    }
    ///
    /// Canonical base of each run of the path
    ///
    pub fn bases(&self, nbase: usize) -> Vec<Base> {
        collapse(&self.path, 0)
            .values
            .iter()
            .map(|&s| s % nbase)
            .collect()
    }
}

///
/// Run Viterbi on `weights` of shape `(n_blocks, nparam)`.
///
/// The start and the end state are unconstrained. Ties of the end state are
/// broken by the lowest state index.
///
pub fn decode_viterbi(weights: ArrayView2<f32>) -> Result<ViterbiOutput> {
    let topology = Topology::for_weights(&weights)?;
    Ok(decode_with(&topology, weights))
}

pub(crate) fn decode_with(topology: &Topology, weights: ArrayView2<f32>) -> ViterbiOutput {
    let n_blocks = weights.nrows();
    let lattice = Lattice::new(topology.arena(), weights);
    let init = vec![0.0; topology.n_state()];
    let table = lattice.forward::<MaxCombine>(&init);

    let (end, total_score) = table.argmax_row(n_blocks);
    debug!(
        "viterbi n_blocks={} nbase={} end_state={} score={}",
        n_blocks,
        topology.n_base(),
        end,
        total_score
    );

    // backtrack
    let mut path = vec![end; n_blocks + 1];
    if let Some(bp) = table.backpointers.as_ref() {
        for t in (0..n_blocks).rev() {
            path[t] = bp[[t, path[t + 1]]];
        }
    }
    let mut per_step_score = Vec::with_capacity(n_blocks + 1);
    per_step_score.push(table.scores[[0, path[0]]]);
    for t in 1..=n_blocks {
        per_step_score.push(table.scores[[t, path[t]]] - table.scores[[t - 1, path[t - 1]]]);
    }

    ViterbiOutput {
        path,
        per_step_score,
        total_score,
    }
}

///
/// Sum of the transition weights along `path`, or `None` if the path uses a
/// transition the topology does not have.
///
pub fn score_path(topology: &Topology, weights: ArrayView2<f32>, path: &[State]) -> Option<f32> {
    if path.len() != weights.nrows() + 1 {
        return None;
    }
    path.windows(2)
        .enumerate()
        .map(|(t, pair)| {
            topology
                .param_of(pair[0], pair[1])
                .map(|param| weights[[t, param]])
        })
        .sum()
}
