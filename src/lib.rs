//!
//! Decoding of flip-flop basecaller outputs
//!
//! * `flipflop::viterbi` : best state path
//! * `flipflop::posterior` : transition posteriors by forward-backward
//! * `flipflop::sequence` : scores of a known base sequence
//! * `flipflop::modbase` : scores with categorical base modifications
//! * `flipflop::basecall` : basecall assembly from the best path
//!
pub mod common;
pub mod error;
pub mod flipflop;
pub mod io;
pub mod prelude;
pub mod prob;

#[cfg(test)]
#[macro_use]
extern crate approx;
