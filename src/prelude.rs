//!
//! globally-available parts
//!
pub use crate::common::{Base, State, ALPHABET};
pub use crate::error::{FlipFlopError, Result};
pub use crate::flipflop::{
    align_sequence, assemble, collapse, decode_batch, decode_viterbi, derive_base_count,
    score_mod_seq, score_sequence, transition_posteriors, Basecall, CatModInfo, DecodeConfig,
    Topology, ViterbiOutput,
};
