//!
//! Basecalling of many independent reads with rayon
//!
use super::basecall::{assemble_path, validate_alphabet, Basecall};
use super::topology::Topology;
use super::viterbi::decode_with;
use crate::common::ALPHABET;
use crate::error::{FlipFlopError, Result};
use derive_new::new;
use log::info;
use ndarray::Array2;
use rayon::prelude::*;

///
/// Options of batch decoding
///
#[derive(Debug, Clone, new)]
pub struct DecodeConfig {
    /// letters of the canonical bases
    pub alphabet: String,
}

impl Default for DecodeConfig {
    fn default() -> Self {
        DecodeConfig::new(ALPHABET.to_string())
    }
}

///
/// Basecall each weight matrix of `reads` in parallel.
/// Results are in the order of `reads`.
///
/// All reads must share the column count of the first read. Shapes are
/// checked in read order before any decoding, so the error names the first
/// mismatching read.
///
pub fn decode_batch(reads: &[Array2<f32>], config: &DecodeConfig) -> Result<Vec<Basecall>> {
    info!(
        "decoding {} reads on {} threads",
        reads.len(),
        rayon::current_num_threads()
    );
    let topology = match reads.first() {
        Some(w) => Topology::for_weights(&w.view())?,
        None => return Ok(Vec::new()),
    };
    let symbols = validate_alphabet(&config.alphabet, topology.n_base())?;
    if let Some((i, w)) = reads
        .iter()
        .enumerate()
        .find(|(_, w)| w.ncols() != topology.n_param())
    {
        return Err(FlipFlopError::ShapeMismatch(format!(
            "read {} has {} columns, batch has {}",
            i,
            w.ncols(),
            topology.n_param()
        )));
    }
    Ok(reads
        .par_iter()
        .map(|w| {
            let viterbi = decode_with(&topology, w.view());
            assemble_path(&topology, &symbols, &viterbi)
        })
        .collect())
}
