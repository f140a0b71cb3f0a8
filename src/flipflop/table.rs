//!
//! Table definitions
//!
//! ## ScoreTable
//!
//! the log score assigned for each (block boundary, state)
//!
//! F[t, s] or B[t, s] for `0 <= t <= n_blocks`
//!
use crate::prob::{argmax, logsumexp};
use ndarray::{Array2, ArrayView1};

/// Struct that stores a Forward/Backward/Viterbi sweep result.
///
/// `scores` has `n_blocks + 1` rows; row `t` is the boundary before block `t`.
/// `backpointers[t, s]` is the source state of the best edge of block `t`
/// entering `s`, kept only by max-combine forward sweeps.
///
/// Sum-combine sweeps store each row shifted by its log-sum-exp; the
/// accumulated shift of row `t` is `log_scale[t]`, so the score of a cell is
/// `scores[t, s] + log_scale[t]`.
#[derive(Debug, Clone)]
pub struct ScoreTable {
    pub scores: Array2<f32>,
    pub log_scale: Vec<f64>,
    pub backpointers: Option<Array2<usize>>,
}

impl ScoreTable {
    pub fn new(n_blocks: usize, n_states: usize, with_backpointers: bool) -> Self {
        ScoreTable {
            scores: Array2::from_elem((n_blocks + 1, n_states), f32::NEG_INFINITY),
            log_scale: vec![0.0; n_blocks + 1],
            backpointers: if with_backpointers {
                Some(Array2::zeros((n_blocks, n_states)))
            } else {
                None
            },
        }
    }
    /// The number of blocks that this table covers.
    pub fn n_blocks(&self) -> usize {
        self.scores.nrows() - 1
    }
    pub fn n_states(&self) -> usize {
        self.scores.ncols()
    }
    /// Scores after the last block, without the row shift
    pub fn last_row(&self) -> ArrayView1<f32> {
        self.scores.row(self.n_blocks())
    }
    ///
    /// Shift row `t` so that its log-sum-exp is 0, and carry the shift into
    /// `log_scale`. `prev_scale` is the accumulated shift of the neighbouring
    /// row the sweep came from. Rows without any finite cell are left as-is.
    ///
    pub fn rescale_row(&mut self, t: usize, prev_scale: f64) {
        let row: Vec<f32> = self.scores.row(t).to_vec();
        let lse = logsumexp(&row);
        if lse.is_finite() {
            self.scores.row_mut(t).mapv_inplace(|x| x - lse);
            self.log_scale[t] = prev_scale + lse as f64;
        } else {
            self.log_scale[t] = prev_scale;
        }
    }
    ///
    /// score of a single cell including the row shift
    ///
    pub fn log_score(&self, t: usize, s: usize) -> f64 {
        self.scores[[t, s]] as f64 + self.log_scale[t]
    }
    ///
    /// `logsumexp` of a row including its shift, the log partition if this
    /// is a sum-combine sweep.
    ///
    pub fn logsumexp_row(&self, t: usize) -> f64 {
        let row: Vec<f32> = self.scores.row(t).to_vec();
        logsumexp(&row) as f64 + self.log_scale[t]
    }
    ///
    /// best state of a row (lowest index on ties) and its score
    ///
    pub fn argmax_row(&self, t: usize) -> (usize, f32) {
        let row: Vec<f32> = self.scores.row(t).to_vec();
        argmax(&row).unwrap_or((0, f32::NEG_INFINITY))
    }
}
