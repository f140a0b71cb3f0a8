//!
//! Run-length collapse of a state path and basecall assembly
//!
use super::topology::Topology;
use super::viterbi::{decode_with, ViterbiOutput};
use crate::common::{Base, State};
use crate::error::{FlipFlopError, Result};
use itertools::Itertools;
use log::debug;
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};
use std::ops::Sub;

///
/// Maximal runs of a sequence: each run is its first element and its length.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Runs<T> {
    pub values: Vec<T>,
    pub lengths: Vec<usize>,
}

impl<T> Runs<T> {
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn total_length(&self) -> usize {
        self.lengths.iter().sum()
    }
}

///
/// Group consecutive entries of `path` whose absolute difference is
/// `<= tolerance`.
///
/// ```
/// use flipflop::flipflop::basecall::collapse;
/// let runs = collapse(&[0usize, 0, 1, 1, 1, 2], 0);
/// assert_eq!(runs.values, vec![0, 1, 2]);
/// assert_eq!(runs.lengths, vec![2, 3, 1]);
/// ```
///
pub fn collapse<T>(path: &[T], tolerance: T) -> Runs<T>
where
    T: Copy + PartialOrd + Sub<Output = T>,
{
    let mut runs = Runs {
        values: Vec::new(),
        lengths: Vec::new(),
    };
    let mut prev: Option<T> = None;
    for &x in path {
        match prev {
            Some(p) if abs_diff(p, x) <= tolerance => {
                if let Some(l) = runs.lengths.last_mut() {
                    *l += 1;
                }
            }
            _ => {
                runs.values.push(x);
                runs.lengths.push(1);
            }
        }
        prev = Some(x);
    }
    runs
}

#[inline]
fn abs_diff<T: PartialOrd + Sub<Output = T>>(a: T, b: T) -> T {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

///
/// Canonical base of each run of a state path
///
pub fn path_to_bases(topology: &Topology, path: &[State]) -> Vec<Base> {
    collapse(path, 0)
        .values
        .iter()
        .map(|&s| topology.base_of(s))
        .collect()
}

///
/// Final basecall of a read
///
/// `run_lengths[i]` is the number of block boundaries spent in the `i`-th
/// called base; they sum to `n_blocks + 1`.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basecall {
    pub basecall: String,
    pub score: f32,
    pub run_lengths: Vec<usize>,
}

///
/// Check that `alphabet` has exactly `nbase` distinct symbols
///
pub fn validate_alphabet(alphabet: &str, nbase: usize) -> Result<Vec<char>> {
    let symbols: Vec<char> = alphabet.chars().collect();
    let n_unique = symbols.iter().unique().count();
    if n_unique != nbase || symbols.len() != nbase {
        return Err(FlipFlopError::IncompatibleAlphabet {
            alphabet: alphabet.to_string(),
            n_unique,
            nbase,
        });
    }
    Ok(symbols)
}

///
/// Base indices of a sequence written over `alphabet`
///
pub fn encode_bases(seq: &str, alphabet: &str) -> Result<Vec<Base>> {
    seq.chars()
        .enumerate()
        .map(|(pos, symbol)| {
            alphabet
                .chars()
                .position(|a| a == symbol)
                .ok_or(FlipFlopError::UnknownSymbol { pos, symbol })
        })
        .collect()
}

///
/// Run Viterbi and turn its path into a basecall over `alphabet`.
/// Both registers of a base map to the same letter.
///
pub fn assemble(weights: ArrayView2<f32>, alphabet: &str) -> Result<Basecall> {
    let topology = Topology::for_weights(&weights)?;
    let symbols = validate_alphabet(alphabet, topology.n_base())?;
    let viterbi = decode_with(&topology, weights);
    Ok(assemble_path(&topology, &symbols, &viterbi))
}

pub(crate) fn assemble_path(
    topology: &Topology,
    symbols: &[char],
    viterbi: &ViterbiOutput,
) -> Basecall {
    let runs = collapse(&viterbi.path, 0);
    let basecall: String = runs
        .values
        .iter()
        .map(|&s| symbols[topology.base_of(s)])
        .collect();
    debug!(
        "assembled {} bases from {} blocks, score={}",
        basecall.len(),
        viterbi.n_blocks(),
        viterbi.total_score
    );
    Basecall {
        basecall,
        score: viterbi.total_score,
        run_lengths: runs.lengths,
    }
}
