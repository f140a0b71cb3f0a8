//!
//! Sequence scoring with categorical base modifications
//!
//! A categorical modification model emits `nparam + n_mod_columns` columns
//! per block: the canonical flip-flop transitions followed by, for every
//! canonical base `b`, the columns `offsets[b]..offsets[b + 1]` scoring the
//! categories of `b` (category 0 is the unmodified base).
//!
//! While a path occupies position `i` of the sequence, every block adds
//! `mod_weights[t, offsets[bases[i]] + mod_cats[i]]` on top of the
//! transition weight.
//!
use super::lattice::{MaxCombine, StateWeights, SumCombine};
use super::sequence::{sweep_sequence, validate_sequence, SequenceSpace};
use super::topology::{n_param_of, Topology};
use crate::common::Base;
use crate::error::{FlipFlopError, Result};
use itertools::Itertools;
use log::debug;
use ndarray::{s, ArrayView2};

///
/// Layout of the modification columns of a categorical modification model
///
#[derive(Debug, Clone, PartialEq)]
pub struct CatModInfo {
    /// `offsets[b]..offsets[b + 1]` are the columns of base `b`
    pub can_mods_offsets: Vec<usize>,
    /// canonical base letters
    pub can_alphabet: String,
    /// modified base letters of each canonical base
    pub mod_bases: Vec<Vec<char>>,
}

impl CatModInfo {
    ///
    /// Offsets only; letters default to the canonical `ACGT...` order
    /// without modified-base names.
    ///
    pub fn from_offsets(can_mods_offsets: Vec<usize>) -> Result<Self> {
        validate_offsets(&can_mods_offsets)?;
        let nbase = can_mods_offsets.len() - 1;
        Ok(CatModInfo {
            can_alphabet: crate::common::MOD_ALPHABET.chars().take(nbase).collect(),
            mod_bases: vec![Vec::new(); nbase],
            can_mods_offsets,
        })
    }
    ///
    /// From the number of modifications of each canonical base and the
    /// model's output alphabet, which lists every canonical base followed by
    /// its modified bases.
    ///
    /// ```text
    /// can_nmods = [0, 1, 0, 0], output_alphabet = "ACZGT"
    /// => offsets = [0, 1, 3, 4, 5], can_alphabet = "ACGT", C has "Z"
    /// ```
    ///
    pub fn from_can_nmods(can_nmods: &[usize], output_alphabet: &str) -> Result<Self> {
        let letters: Vec<char> = output_alphabet.chars().collect();
        let mut offsets = vec![0];
        for &n in can_nmods {
            offsets.push(offsets[offsets.len() - 1] + n + 1);
        }
        if offsets[can_nmods.len()] != letters.len() {
            return Err(FlipFlopError::InvalidOffsets(format!(
                "output alphabet {:?} does not have {} letters",
                output_alphabet,
                offsets[can_nmods.len()]
            )));
        }
        validate_offsets(&offsets)?;
        let can_alphabet = offsets[..can_nmods.len()]
            .iter()
            .map(|&i| letters[i])
            .collect();
        let mod_bases = offsets
            .iter()
            .tuple_windows()
            .map(|(&a, &b)| letters[a + 1..b].to_vec())
            .collect();
        Ok(CatModInfo {
            can_mods_offsets: offsets,
            can_alphabet,
            mod_bases,
        })
    }
    pub fn n_base(&self) -> usize {
        self.can_mods_offsets.len() - 1
    }
    /// total number of modification columns
    pub fn n_columns(&self) -> usize {
        self.can_mods_offsets[self.n_base()]
    }
    /// number of categories (including the canonical one) of `base`
    pub fn n_cats(&self, base: Base) -> usize {
        self.can_mods_offsets[base + 1] - self.can_mods_offsets[base]
    }
    pub fn n_mods(&self) -> usize {
        self.mod_bases.iter().map(|m| m.len()).sum()
    }
    pub fn mod_column(&self, base: Base, cat: usize) -> Option<usize> {
        if base < self.n_base() && cat < self.n_cats(base) {
            Some(self.can_mods_offsets[base] + cat)
        } else {
            None
        }
    }
    ///
    /// letter of `(base, cat)`: the canonical letter for category 0
    ///
    pub fn label(&self, base: Base, cat: usize) -> Option<char> {
        if cat == 0 {
            self.can_alphabet.chars().nth(base)
        } else {
            self.mod_bases.get(base)?.get(cat - 1).copied()
        }
    }
    ///
    /// Split the output of a categorical modification model into the
    /// canonical transition weights and the modification weights.
    ///
    pub fn split_output<'a>(
        &self,
        output: ArrayView2<'a, f32>,
    ) -> Result<(ArrayView2<'a, f32>, ArrayView2<'a, f32>)> {
        let n_param = n_param_of(self.n_base());
        if output.ncols() != n_param + self.n_columns() {
            return Err(FlipFlopError::ShapeMismatch(format!(
                "model output has {} columns, expected {} transitions + {} modification columns",
                output.ncols(),
                n_param,
                self.n_columns()
            )));
        }
        Ok(output.split_at(ndarray::Axis(1), n_param))
    }
}

fn validate_offsets(offsets: &[usize]) -> Result<()> {
    if offsets.len() < 2 {
        return Err(FlipFlopError::InvalidOffsets(
            "at least one base is required".to_string(),
        ));
    }
    if offsets[0] != 0 {
        return Err(FlipFlopError::InvalidOffsets(format!(
            "offsets must start at 0, not {}",
            offsets[0]
        )));
    }
    if let Some((i, _)) = offsets
        .iter()
        .tuple_windows()
        .enumerate()
        .find(|(_, (a, b))| b < a)
    {
        return Err(FlipFlopError::InvalidOffsets(format!(
            "offsets decrease at base {}",
            i
        )));
    }
    Ok(())
}

///
/// Same as `score_sequence`, with a modification category per position.
///
/// * `mod_weights` : `(n_blocks, can_mods_offsets[nbase])`
/// * `mod_cats[i]` : category of `bases[i]`, `< n_cats(bases[i])`
/// * `can_mods_offsets` : `nbase + 1` non-decreasing column offsets
///
#[allow(clippy::too_many_arguments)]
pub fn score_mod_seq(
    weights: ArrayView2<f32>,
    mod_weights: ArrayView2<f32>,
    bases: &[Base],
    mod_cats: &[usize],
    can_mods_offsets: &[usize],
    block_start: usize,
    block_end: usize,
    all_paths: bool,
) -> Result<f32> {
    let topology = Topology::for_weights(&weights)?;
    validate_offsets(can_mods_offsets)?;
    if can_mods_offsets.len() != topology.n_base() + 1 {
        return Err(FlipFlopError::InvalidOffsets(format!(
            "{} offsets for nbase={}",
            can_mods_offsets.len(),
            topology.n_base()
        )));
    }
    if mod_weights.dim() != (weights.nrows(), can_mods_offsets[topology.n_base()]) {
        return Err(FlipFlopError::ShapeMismatch(format!(
            "modification weights {:?}, expected ({}, {})",
            mod_weights.dim(),
            weights.nrows(),
            can_mods_offsets[topology.n_base()]
        )));
    }
    validate_sequence(&topology, &weights, bases, block_start, block_end)?;
    if mod_cats.len() != bases.len() {
        return Err(FlipFlopError::ShapeMismatch(format!(
            "{} modification categories for {} bases",
            mod_cats.len(),
            bases.len()
        )));
    }
    let mut columns = Vec::with_capacity(2 * bases.len());
    for (pos, (&base, &cat)) in bases.iter().zip(mod_cats.iter()).enumerate() {
        let n_cats = can_mods_offsets[base + 1] - can_mods_offsets[base];
        if cat >= n_cats {
            return Err(FlipFlopError::CategoryOutOfRange { pos, cat, n_cats });
        }
        // both registers of the position read the same column
        columns.push(can_mods_offsets[base] + cat);
        columns.push(can_mods_offsets[base] + cat);
    }

    let space = SequenceSpace::new(&topology, bases);
    let range = s![block_start..block_end, ..];
    let state_weights = StateWeights {
        weights: mod_weights.slice(range),
        columns: &columns,
    };
    let w = weights.slice(range);
    let (_, score, _) = if all_paths {
        sweep_sequence::<SumCombine>(&space, w, Some(state_weights))
    } else {
        sweep_sequence::<MaxCombine>(&space, w, Some(state_weights))
    };
    debug!(
        "score_mod_seq len={} blocks=[{}, {}) all_paths={} score={}",
        bases.len(),
        block_start,
        block_end,
        all_paths,
        score
    );
    Ok(score)
}
