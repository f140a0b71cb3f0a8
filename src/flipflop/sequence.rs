//!
//! Scoring of a known base sequence against a weight matrix
//!
//! The lattice is reduced to `2 * len(bases)` states `(position, register)`,
//! with `reduced = 2 * position + register`. At every block a path either
//! stays on its position or advances to the next position on the opposite
//! register; it starts on position 0 and must end on the last position, so
//! it emits exactly `bases`.
//!
use super::lattice::{Combine, Lattice, MaxCombine, StateWeights, SumCombine};
use super::table::ScoreTable;
use super::topology::{Edge, EdgeArena, EdgeKind, Register, Topology};
use crate::common::{Base, State};
use crate::error::{FlipFlopError, Result};
use log::debug;
use ndarray::{s, ArrayView2};
use serde::{Deserialize, Serialize};

///
/// State space of the paths emitting `bases`
///
#[derive(Clone, Debug)]
pub struct SequenceSpace {
    arena: EdgeArena,
    /// full flip-flop state of each reduced state
    states: Vec<State>,
    n_positions: usize,
}

impl SequenceSpace {
    ///
    /// `bases` must be non-empty and `< nbase`; see `validate_sequence`.
    ///
    pub fn new(topology: &Topology, bases: &[Base]) -> Self {
        let n_positions = bases.len();
        let mut edges = Vec::with_capacity(4 * n_positions);
        let mut states = Vec::with_capacity(2 * n_positions);
        for (i, &base) in bases.iter().enumerate() {
            for r in 0..2 {
                let target = 2 * i + r;
                let state = topology.state(base, Register::from_index(r));
                states.push(state);
                edges.push(Edge {
                    source: target,
                    target,
                    param: topology.stay_param(state),
                    kind: EdgeKind::Stay,
                });
                if i > 0 {
                    let prev = topology.state(bases[i - 1], Register::from_index(1 - r));
                    edges.push(Edge {
                        source: 2 * (i - 1) + (1 - r),
                        target,
                        param: topology.stay_param(state) + 1 + topology.base_of(prev),
                        kind: EdgeKind::Move,
                    });
                }
            }
        }
        SequenceSpace {
            arena: EdgeArena::from_edges(2 * n_positions, edges),
            states,
            n_positions,
        }
    }
    pub fn arena(&self) -> &EdgeArena {
        &self.arena
    }
    pub fn n_positions(&self) -> usize {
        self.n_positions
    }
    pub fn position_of(&self, reduced: usize) -> usize {
        reduced / 2
    }
    pub fn state_of(&self, reduced: usize) -> State {
        self.states[reduced]
    }
    ///
    /// start scores: position 0 on either register
    ///
    pub fn init(&self) -> Vec<f32> {
        let mut v = vec![f32::NEG_INFINITY; 2 * self.n_positions];
        v[0] = 0.0;
        v[1] = 0.0;
        v
    }
    ///
    /// end scores: last position on either register
    ///
    pub fn terminal(&self) -> Vec<f32> {
        let n = 2 * self.n_positions;
        let mut v = vec![f32::NEG_INFINITY; n];
        v[n - 2] = 0.0;
        v[n - 1] = 0.0;
        v
    }
    ///
    /// combine the two end states of a forward table
    ///
    pub fn final_score<C: Combine>(&self, table: &ScoreTable) -> (f32, usize) {
        let n = 2 * self.n_positions;
        let last = table.last_row();
        let (score, chosen) = C::reduce(&[last[n - 2], last[n - 1]]);
        let score = (score as f64 + table.log_scale[table.n_blocks()]) as f32;
        (score, n - 2 + chosen)
    }
}

///
/// Checks shared by the sequence scorers, done before any table is allocated.
///
pub(crate) fn validate_sequence(
    topology: &Topology,
    weights: &ArrayView2<f32>,
    bases: &[Base],
    block_start: usize,
    block_end: usize,
) -> Result<()> {
    if block_end <= block_start {
        return Err(FlipFlopError::EmptyRange {
            start: block_start,
            end: block_end,
        });
    }
    if block_end > weights.nrows() {
        return Err(FlipFlopError::ShapeMismatch(format!(
            "block range [{}, {}) exceeds {} blocks",
            block_start,
            block_end,
            weights.nrows()
        )));
    }
    if bases.is_empty() {
        return Err(FlipFlopError::EmptySequence);
    }
    if let Some((pos, &base)) = bases
        .iter()
        .enumerate()
        .find(|(_, &b)| b >= topology.n_base())
    {
        return Err(FlipFlopError::BaseOutOfRange {
            pos,
            base,
            nbase: topology.n_base(),
        });
    }
    if bases.len() > block_end - block_start {
        return Err(FlipFlopError::SequenceTooLong {
            len: bases.len(),
            n_blocks: block_end - block_start,
        });
    }
    Ok(())
}

///
/// Run the forward sweep of `space` on blocks `[block_start, block_end)`
/// and combine the end states.
///
pub(crate) fn sweep_sequence<'w, C: Combine>(
    space: &SequenceSpace,
    weights: ArrayView2<'w, f32>,
    state_weights: Option<StateWeights<'w>>,
) -> (ScoreTable, f32, usize) {
    let mut lattice = Lattice::new(space.arena(), weights);
    if let Some(x) = state_weights {
        lattice = lattice.with_state_weights(x);
    }
    let table = lattice.forward::<C>(&space.init());
    let (score, end) = space.final_score::<C>(&table);
    (table, score, end)
}

///
/// Score of the paths emitting exactly `bases` in blocks
/// `[block_start, block_end)`.
///
/// * `all_paths = false` : score of the best such path
/// * `all_paths = true`  : log-sum-exp over all such paths
///
pub fn score_sequence(
    weights: ArrayView2<f32>,
    bases: &[Base],
    block_start: usize,
    block_end: usize,
    all_paths: bool,
) -> Result<f32> {
    let topology = Topology::for_weights(&weights)?;
    validate_sequence(&topology, &weights, bases, block_start, block_end)?;
    let space = SequenceSpace::new(&topology, bases);
    let w = weights.slice(s![block_start..block_end, ..]);
    let (_, score, _) = if all_paths {
        sweep_sequence::<SumCombine>(&space, w, None)
    } else {
        sweep_sequence::<MaxCombine>(&space, w, None)
    };
    debug!(
        "score_sequence len={} blocks=[{}, {}) all_paths={} score={}",
        bases.len(),
        block_start,
        block_end,
        all_paths,
        score
    );
    Ok(score)
}

///
/// Forced alignment of a base sequence
///
/// * `path` : flip-flop state at each block boundary (`n_blocks + 1`)
/// * `positions` : index into `bases` at each block boundary
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceAlignment {
    pub path: Vec<State>,
    pub positions: Vec<usize>,
    pub per_step_score: Vec<f32>,
    pub total_score: f32,
}

///
/// Best path emitting exactly `bases` in blocks `[block_start, block_end)`.
/// `total_score` equals `score_sequence(.., all_paths = false)`.
///
pub fn align_sequence(
    weights: ArrayView2<f32>,
    bases: &[Base],
    block_start: usize,
    block_end: usize,
) -> Result<SequenceAlignment> {
    let topology = Topology::for_weights(&weights)?;
    validate_sequence(&topology, &weights, bases, block_start, block_end)?;
    let space = SequenceSpace::new(&topology, bases);
    let w = weights.slice(s![block_start..block_end, ..]);
    let (table, total_score, end) = sweep_sequence::<MaxCombine>(&space, w, None);

    let n_blocks = block_end - block_start;
    let mut reduced = vec![end; n_blocks + 1];
    if let Some(bp) = table.backpointers.as_ref() {
        for t in (0..n_blocks).rev() {
            reduced[t] = bp[[t, reduced[t + 1]]];
        }
    }
    let mut per_step_score = Vec::with_capacity(n_blocks + 1);
    per_step_score.push(table.scores[[0, reduced[0]]]);
    for t in 1..=n_blocks {
        per_step_score.push(table.scores[[t, reduced[t]]] - table.scores[[t - 1, reduced[t - 1]]]);
    }
    Ok(SequenceAlignment {
        path: reduced.iter().map(|&r| space.state_of(r)).collect(),
        positions: reduced.iter().map(|&r| space.position_of(r)).collect(),
        per_step_score,
        total_score,
    })
}
