//!
//! Flip-flop transducer decoding
//!
//! # Overview of calculation
//!
//! w = w[0],...,w[n-1] : transition weights of n blocks, `w[t, e]` for edge `e`
//!
//! Forward
//! F[t][s]
//!  = logsumexp over paths of blocks 0..t ending at s of the summed weights
//!    for 0<=t<=n, F[0][s] = 0
//!
//! Backward
//! B[t][s]
//!  = logsumexp over paths of blocks t..n starting from s
//!    for 0<=t<=n, B[n][s] = 0
//!
//! Viterbi
//! V[t][s] = the same recursion as F with max instead of logsumexp
//!
//! Posterior of edge `e: l -> s` at block t
//!  = exp(F[t][l] + w[t, e] + B[t+1][s] - log Z),  log Z = logsumexp_s F[n][s]
//!
pub mod basecall;
pub mod batch;
pub mod lattice;
pub mod mocks;
pub mod modbase;
pub mod posterior;
pub mod sequence;
pub mod table;
pub mod tests;
pub mod topology;
pub mod viterbi;

pub use basecall::{assemble, collapse, Basecall, Runs};
pub use batch::{decode_batch, DecodeConfig};
pub use modbase::{score_mod_seq, CatModInfo};
pub use posterior::{log_partition, state_posteriors, transition_posteriors};
pub use sequence::{align_sequence, score_sequence, SequenceAlignment};
pub use topology::{derive_base_count, nstate_to_nbase, Register, Topology};
pub use viterbi::{decode_viterbi, ViterbiOutput};
