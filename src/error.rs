//!
//! Error types of flip-flop decoding
//!
//! All of them are data-contract errors detected before any DP table is
//! allocated.
//!
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlipFlopError {
    /// state/parameter count has no integer base-count solution
    #[error("invalid topology: {0} has no integer base count")]
    InvalidTopology(usize),

    /// matrix dimensions inconsistent with the declared base count
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// `block_end <= block_start`
    #[error("empty block range [{start}, {end})")]
    EmptyRange { start: usize, end: usize },

    /// the block range is too short to host the sequence
    #[error("sequence of length {len} does not fit in {n_blocks} blocks")]
    SequenceTooLong { len: usize, n_blocks: usize },

    /// no bases to score
    #[error("empty base sequence")]
    EmptySequence,

    /// base index `>= nbase`
    #[error("base {base} at position {pos} is out of range (nbase={nbase})")]
    BaseOutOfRange { pos: usize, base: usize, nbase: usize },

    /// modification category outside the offset slice of its base
    #[error("modification category {cat} at position {pos} is out of range (base has {n_cats})")]
    CategoryOutOfRange { pos: usize, cat: usize, n_cats: usize },

    /// malformed `can_mods_offsets` table
    #[error("invalid modification offsets: {0}")]
    InvalidOffsets(String),

    /// alphabet size disagrees with the decoded base count
    #[error("alphabet {alphabet:?} has {n_unique} distinct symbols but nbase={nbase}")]
    IncompatibleAlphabet {
        alphabet: String,
        n_unique: usize,
        nbase: usize,
    },

    /// letter not in the alphabet
    #[error("symbol {symbol:?} at position {pos} is not in the alphabet")]
    UnknownSymbol { pos: usize, symbol: char },

    /// I/O error of weight/result files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// malformed JSON
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlipFlopError>;
