//!
//! Log-domain sweeps over a block x state lattice
//!
//! A single forward/backward recursion serves every decoding mode; the
//! per-state reduction of incoming candidates is a `Combine`:
//!
//! * `MaxCombine` : best candidate with its index (Viterbi, forced alignment)
//! * `SumCombine` : log-sum-exp of all candidates (forward/backward, all-paths)
//!
//! ```text
//! F[t+1, s] = combine_{e: l -> s} ( F[t, l] + w[t, e] + x[t, s] )
//! B[t, l]   = combine_{e: l -> s} ( w[t, e] + x[t, s] + B[t+1, s] )
//! ```
//!
//! `x[t, s]` is an optional per-state contribution (modification weights).
//!
//! Sum-combine sweeps rescale every row to a log-sum-exp of 0 and keep the
//! shifts in `ScoreTable::log_scale` (f64), so the stored cells stay near 0
//! however long the read is.
//!
use super::table::ScoreTable;
use super::topology::{Edge, EdgeArena};
use crate::prob::{argmax, logsumexp};
use log::trace;
use ndarray::ArrayView2;

///
/// Reduction of the candidate scores into a single state score
///
pub trait Combine {
    /// backpointers are recorded by forward sweeps
    const TRACEBACK: bool;
    /// rows are shifted to a log-sum-exp of 0 after each block
    const RESCALE: bool;
    /// returns the reduced score and the index of the chosen candidate
    /// (lowest index among the best for max, meaningless for sum)
    fn reduce(candidates: &[f32]) -> (f32, usize);
}

#[derive(Clone, Copy, Debug)]
pub struct MaxCombine;

#[derive(Clone, Copy, Debug)]
pub struct SumCombine;

impl Combine for MaxCombine {
    const TRACEBACK: bool = true;
    const RESCALE: bool = false;
    #[inline]
    fn reduce(candidates: &[f32]) -> (f32, usize) {
        match argmax(candidates) {
            Some((i, x)) => (x, i),
            None => (f32::NEG_INFINITY, 0),
        }
    }
}

impl Combine for SumCombine {
    const TRACEBACK: bool = false;
    const RESCALE: bool = true;
    #[inline]
    fn reduce(candidates: &[f32]) -> (f32, usize) {
        (logsumexp(candidates), 0)
    }
}

///
/// Extra per-(block, state) weights: state `s` reads column `columns[s]`
/// of `weights` at every block.
///
#[derive(Clone, Copy, Debug)]
pub struct StateWeights<'w> {
    pub weights: ArrayView2<'w, f32>,
    pub columns: &'w [usize],
}

///
/// A lattice: edges of the state space and the weights of each block.
///
/// `weights` must already be restricted to the blocks to sweep over.
///
#[derive(Clone, Copy, Debug)]
pub struct Lattice<'a, 'w> {
    pub arena: &'a EdgeArena,
    pub weights: ArrayView2<'w, f32>,
    pub state_weights: Option<StateWeights<'w>>,
}

impl<'a, 'w> Lattice<'a, 'w> {
    pub fn new(arena: &'a EdgeArena, weights: ArrayView2<'w, f32>) -> Self {
        Lattice {
            arena,
            weights,
            state_weights: None,
        }
    }
    pub fn with_state_weights(mut self, state_weights: StateWeights<'w>) -> Self {
        self.state_weights = Some(state_weights);
        self
    }
    pub fn n_blocks(&self) -> usize {
        self.weights.nrows()
    }
    pub fn n_states(&self) -> usize {
        self.arena.n_states()
    }
    ///
    /// score of traversing `edge` at `block`
    ///
    #[inline]
    pub fn edge_score(&self, block: usize, edge: &Edge) -> f32 {
        let w = self.weights[[block, edge.param]];
        match &self.state_weights {
            Some(x) => w + x.weights[[block, x.columns[edge.target]]],
            None => w,
        }
    }
    ///
    /// Run the forward sweep from the `init` scores of the boundary before
    /// block 0.
    ///
    pub fn forward<C: Combine>(&self, init: &[f32]) -> ScoreTable {
        assert_eq!(init.len(), self.n_states());
        let n_blocks = self.n_blocks();
        let mut table = ScoreTable::new(n_blocks, self.n_states(), C::TRACEBACK);
        for (s, &x) in init.iter().enumerate() {
            table.scores[[0, s]] = x;
        }
        trace!(
            "forward sweep n_blocks={} n_states={} traceback={}",
            n_blocks,
            self.n_states(),
            C::TRACEBACK
        );

        let mut candidates = Vec::with_capacity(self.arena.max_in_degree());
        let mut sources = Vec::with_capacity(self.arena.max_in_degree());
        for t in 0..n_blocks {
            for s in 0..self.n_states() {
                candidates.clear();
                sources.clear();
                for e in self.arena.incoming(s) {
                    candidates.push(table.scores[[t, e.source]] + self.edge_score(t, e));
                    sources.push(e.source);
                }
                let (score, chosen) = C::reduce(&candidates);
                table.scores[[t + 1, s]] = score;
                if let Some(bp) = table.backpointers.as_mut() {
                    bp[[t, s]] = sources.get(chosen).copied().unwrap_or(s);
                }
            }
            if C::RESCALE {
                let prev = table.log_scale[t];
                table.rescale_row(t + 1, prev);
            }
        }
        table
    }
    ///
    /// Run the backward sweep from the `terminal` scores of the boundary
    /// after the last block.
    ///
    pub fn backward<C: Combine>(&self, terminal: &[f32]) -> ScoreTable {
        assert_eq!(terminal.len(), self.n_states());
        let n_blocks = self.n_blocks();
        let mut table = ScoreTable::new(n_blocks, self.n_states(), false);
        for (s, &x) in terminal.iter().enumerate() {
            table.scores[[n_blocks, s]] = x;
        }
        trace!(
            "backward sweep n_blocks={} n_states={}",
            n_blocks,
            self.n_states()
        );

        let mut candidates = Vec::with_capacity(self.arena.max_out_degree());
        for t in (0..n_blocks).rev() {
            for s in 0..self.n_states() {
                candidates.clear();
                for e in self.arena.outgoing(s) {
                    candidates.push(self.edge_score(t, e) + table.scores[[t + 1, e.target]]);
                }
                let (score, _) = C::reduce(&candidates);
                table.scores[[t, s]] = score;
            }
            if C::RESCALE {
                let prev = table.log_scale[t + 1];
                table.rescale_row(t, prev);
            }
        }
        table
    }
}
