//!
//! Flip-flop state space and its fixed transition topology
//!
//! ## States
//!
//! `state = register * nbase + base` (register 0 = flip, 1 = flop), so
//! `state % nbase` is always the canonical base.
//!
//! ## Edges
//!
//! From `(b, r)` there is a stay edge to `(b, r)` and a move edge to
//! `(c, 1 - r)` for every base `c`. Weight columns are destination-major:
//!
//! ```text
//! column s_to * (nbase + 1)         : stay  s_to -> s_to
//! column s_to * (nbase + 1) + 1 + b : move  (b, 1 - r_to) -> s_to
//! ```
//!
//! so `nparam = 2 * nbase * (nbase + 1)`.
//!
use crate::common::{Base, Param, State};
use crate::error::{FlipFlopError, Result};
use ndarray::ArrayView2;

///
/// Get the canonical base count from a transition parameter count.
///
/// `nparam` must equal `2 * nbase * (nbase + 1)` for an integer `nbase >= 1`,
/// otherwise `InvalidTopology` is returned.
///
pub fn derive_base_count(nparam: usize) -> Result<usize> {
    let root = (0.25 + 0.5 * nparam as f64).sqrt() - 0.5;
    let guess = root.round() as usize;
    // guard the float rounding of huge inputs
    (guess.saturating_sub(1)..=guess.saturating_add(1))
        .find(|&n| n >= 1 && checked_n_param_of(n) == Some(nparam))
        .ok_or(FlipFlopError::InvalidTopology(nparam))
}

/// `n_param_of` that returns `None` instead of overflowing
fn checked_n_param_of(nbase: usize) -> Option<usize> {
    nbase.checked_add(1)?.checked_mul(nbase)?.checked_mul(2)
}

///
/// Lenient version of `derive_base_count` that truncates the root,
/// as the model loader does for models whose output carries extra columns.
///
pub fn nstate_to_nbase(nstate: usize) -> usize {
    ((0.25 + 0.5 * nstate as f64).sqrt() - 0.5) as usize
}

///
/// `nparam` of the flip-flop model with `nbase` canonical bases
///
pub fn n_param_of(nbase: usize) -> usize {
    2 * nbase * (nbase + 1)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    Flip,
    Flop,
}

impl Register {
    pub fn index(self) -> usize {
        match self {
            Register::Flip => 0,
            Register::Flop => 1,
        }
    }
    pub fn from_index(index: usize) -> Register {
        if index % 2 == 0 {
            Register::Flip
        } else {
            Register::Flop
        }
    }
    pub fn opposite(self) -> Register {
        match self {
            Register::Flip => Register::Flop,
            Register::Flop => Register::Flip,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    /// self transition, no base emitted
    Stay,
    /// move emitting the base of the target state
    Move,
}

///
/// A single transition of a lattice
///
/// `param` is the weight column read at every block.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub param: Param,
    pub kind: EdgeKind,
}

///
/// Edges indexed by target and by source
///
/// Built once and shared by every sweep over the same state space.
///
#[derive(Clone, Debug)]
pub struct EdgeArena {
    n_states: usize,
    edges: Vec<Edge>,
    in_offsets: Vec<usize>,
    in_edges: Vec<usize>,
    out_offsets: Vec<usize>,
    out_edges: Vec<usize>,
}

impl EdgeArena {
    ///
    /// Build the arena from a list of edges whose endpoints are `< n_states`.
    /// The order of `edges` is kept inside each adjacency list.
    ///
    pub fn from_edges(n_states: usize, edges: Vec<Edge>) -> Self {
        let (in_offsets, in_edges) = group_by_state(n_states, &edges, |e| e.target);
        let (out_offsets, out_edges) = group_by_state(n_states, &edges, |e| e.source);
        EdgeArena {
            n_states,
            edges,
            in_offsets,
            in_edges,
            out_offsets,
            out_edges,
        }
    }
    pub fn n_states(&self) -> usize {
        self.n_states
    }
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
    ///
    /// create iterator of edges coming into the state
    ///
    pub fn incoming(&self, state: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.in_edges[self.in_offsets[state]..self.in_offsets[state + 1]]
            .iter()
            .map(move |&e| &self.edges[e])
    }
    ///
    /// create iterator of edges going out from the state
    ///
    pub fn outgoing(&self, state: usize) -> impl Iterator<Item = &Edge> + '_ {
        self.out_edges[self.out_offsets[state]..self.out_offsets[state + 1]]
            .iter()
            .map(move |&e| &self.edges[e])
    }
    pub fn max_in_degree(&self) -> usize {
        self.in_offsets
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0)
    }
    pub fn max_out_degree(&self) -> usize {
        self.out_offsets
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0)
    }
}

/// counting sort of edge ids by `key`
fn group_by_state<F>(n_states: usize, edges: &[Edge], key: F) -> (Vec<usize>, Vec<usize>)
where
    F: Fn(&Edge) -> usize,
{
    let mut offsets = vec![0; n_states + 1];
    for e in edges {
        offsets[key(e) + 1] += 1;
    }
    for s in 0..n_states {
        offsets[s + 1] += offsets[s];
    }
    let mut cursor = offsets.clone();
    let mut ids = vec![0; edges.len()];
    for (i, e) in edges.iter().enumerate() {
        let k = key(e);
        ids[cursor[k]] = i;
        cursor[k] += 1;
    }
    (offsets, ids)
}

///
/// The flip-flop transducer of `nbase` canonical bases
///
#[derive(Clone, Debug)]
pub struct Topology {
    nbase: usize,
    arena: EdgeArena,
}

impl Topology {
    pub fn new(nbase: usize) -> Result<Self> {
        if nbase == 0 {
            return Err(FlipFlopError::InvalidTopology(0));
        }
        let n_state = 2 * nbase;
        let mut edges = Vec::with_capacity(n_param_of(nbase));
        for target in 0..n_state {
            let from_register = Register::from_index(target / nbase).opposite();
            edges.push(Edge {
                source: target,
                target,
                param: edges.len(),
                kind: EdgeKind::Stay,
            });
            for b in 0..nbase {
                edges.push(Edge {
                    source: from_register.index() * nbase + b,
                    target,
                    param: edges.len(),
                    kind: EdgeKind::Move,
                });
            }
        }
        Ok(Topology {
            nbase,
            arena: EdgeArena::from_edges(n_state, edges),
        })
    }
    ///
    /// Topology matching a weight matrix with `n_param` columns
    ///
    pub fn from_n_params(n_param: usize) -> Result<Self> {
        Topology::new(derive_base_count(n_param)?)
    }
    ///
    /// Validate the shape of the weight matrix and build its topology.
    /// `ShapeMismatch` is returned if the columns do not form a flip-flop layout.
    ///
    pub fn for_weights(weights: &ArrayView2<f32>) -> Result<Self> {
        let n_param = weights.ncols();
        Topology::from_n_params(n_param).map_err(|_| {
            FlipFlopError::ShapeMismatch(format!(
                "{} columns do not correspond to any flip-flop base count",
                n_param
            ))
        })
    }
    pub fn n_base(&self) -> usize {
        self.nbase
    }
    pub fn n_state(&self) -> usize {
        2 * self.nbase
    }
    pub fn n_param(&self) -> usize {
        n_param_of(self.nbase)
    }
    pub fn arena(&self) -> &EdgeArena {
        &self.arena
    }
    pub fn state(&self, base: Base, register: Register) -> State {
        register.index() * self.nbase + base
    }
    pub fn base_of(&self, state: State) -> Base {
        state % self.nbase
    }
    pub fn register_of(&self, state: State) -> Register {
        Register::from_index(state / self.nbase)
    }
    pub fn edge(&self, param: Param) -> &Edge {
        &self.arena.edges()[param]
    }
    pub fn stay_param(&self, state: State) -> Param {
        state * (self.nbase + 1)
    }
    ///
    /// weight column of the transition `from -> to`, or `None` if the
    /// transition is not allowed.
    ///
    pub fn param_of(&self, from: State, to: State) -> Option<Param> {
        if from == to {
            Some(self.stay_param(to))
        } else if self.register_of(from) != self.register_of(to) {
            Some(self.stay_param(to) + 1 + self.base_of(from))
        } else {
            None
        }
    }
    pub fn is_valid_transition(&self, from: State, to: State) -> bool {
        self.param_of(from, to).is_some()
    }
}
