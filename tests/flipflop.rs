//!
//! test of flip-flop decoding through the public api
//!
#[macro_use]
extern crate approx;

use flipflop::common::ALPHABET;
use flipflop::error::FlipFlopError;
use flipflop::flipflop::basecall::encode_bases;
use flipflop::flipflop::mocks::{mock_path_weights, mock_positive_weights, mock_random_weights};
use flipflop::flipflop::topology::{n_param_of, Register};
use flipflop::prelude::*;
use ndarray::{Array2, Axis};
use test_case::test_case;

#[test_case(4, 1 ; "single base")]
#[test_case(12, 2 ; "two bases")]
#[test_case(40, 4 ; "dna")]
#[test_case(60, 5 ; "five bases")]
#[test_case(2 * 26 * 27, 26 ; "full mod alphabet")]
fn base_count_of_valid_params(nparam: usize, nbase: usize) {
    assert_eq!(derive_base_count(nparam).unwrap(), nbase);
    assert_eq!(n_param_of(nbase), nparam);
}

#[test_case(0 ; "zero")]
#[test_case(1 ; "one")]
#[test_case(39 ; "one less than dna")]
#[test_case(41 ; "one more than dna")]
#[test_case(usize::MAX ; "largest usize")]
fn base_count_of_invalid_params(nparam: usize) {
    assert!(matches!(
        derive_base_count(nparam),
        Err(FlipFlopError::InvalidTopology(n)) if n == nparam
    ));
}

#[test_case(3, 3 ; "empty")]
#[test_case(4, 2 ; "reversed")]
fn empty_block_range(start: usize, end: usize) {
    let w = mock_random_weights(10, 4, 0);
    for &all_paths in &[false, true] {
        assert!(matches!(
            score_sequence(w.view(), &[0, 1], start, end, all_paths),
            Err(FlipFlopError::EmptyRange { .. })
        ));
    }
}

#[test_case(5, true ; "as long as the range")]
#[test_case(6, false ; "one longer than the range")]
fn sequence_length_limit(len: usize, ok: bool) {
    let w = mock_random_weights(8, 4, 1);
    let bases: Vec<usize> = (0..len).map(|i| i % 4).collect();
    let r = score_sequence(w.view(), &bases, 2, 7, false);
    if ok {
        assert!(r.unwrap().is_finite());
    } else {
        assert!(matches!(
            r,
            Err(FlipFlopError::SequenceTooLong { len: 6, n_blocks: 5 })
        ));
    }
}

#[test]
fn viterbi_per_step_scores_add_up() {
    for seed in 0..5 {
        let w = mock_random_weights(40, 4, seed);
        let v = decode_viterbi(w.view()).unwrap();
        assert_eq!(v.path.len(), 41);
        assert_eq!(v.per_step_score.len(), 41);
        assert_abs_diff_eq!(v.per_step_score[0], 0.0);
        let sum: f32 = v.per_step_score.iter().sum();
        assert_abs_diff_eq!(sum, v.total_score, epsilon = 1e-3);
    }
}

#[test]
fn basecall_and_forced_alignment_agree() {
    let topology = Topology::new(4).unwrap();
    let path = vec![
        topology.state(2, Register::Flop),
        topology.state(2, Register::Flop),
        topology.state(0, Register::Flip),
        topology.state(0, Register::Flop),
        topology.state(0, Register::Flop),
        topology.state(3, Register::Flip),
        topology.state(1, Register::Flop),
        topology.state(1, Register::Flop),
    ];
    let w = mock_path_weights(&path, 4, 10.0);
    let bc = assemble(w.view(), ALPHABET).unwrap();
    assert_eq!(bc.basecall, "GAATC");
    assert_eq!(bc.run_lengths, vec![2, 1, 2, 1, 2]);

    let bases = encode_bases(&bc.basecall, ALPHABET).unwrap();
    let alignment = align_sequence(w.view(), &bases, 0, w.nrows()).unwrap();
    assert_eq!(alignment.path, path);
    assert_eq!(alignment.positions, vec![0, 0, 1, 2, 2, 3, 4, 4]);
    assert_abs_diff_eq!(alignment.total_score, bc.score);
    assert_abs_diff_eq!(
        score_sequence(w.view(), &bases, 0, w.nrows(), false).unwrap(),
        bc.score
    );
}

#[test]
fn mod_scores_shift_with_constant_mod_weights() {
    let offsets = vec![0, 1, 3, 4, 5];
    let w = mock_random_weights(12, 4, 3);
    let bases = encode_bases("ACCT", ALPHABET).unwrap();
    let cats = vec![0, 1, 0, 0];
    let zeros = Array2::<f32>::zeros((12, 5));
    let shifted = Array2::<f32>::from_elem((12, 5), 0.5);
    for &all_paths in &[false, true] {
        let plain = score_sequence(w.view(), &bases, 0, 12, all_paths).unwrap();
        let with_zeros =
            score_mod_seq(w.view(), zeros.view(), &bases, &cats, &offsets, 0, 12, all_paths)
                .unwrap();
        let with_shift =
            score_mod_seq(w.view(), shifted.view(), &bases, &cats, &offsets, 0, 12, all_paths)
                .unwrap();
        assert_abs_diff_eq!(plain, with_zeros, epsilon = 1e-4);
        assert_abs_diff_eq!(with_shift, plain + 0.5 * 12.0, epsilon = 1e-3);
    }
}

#[test]
fn mod_scores_prefer_the_weighted_category() {
    let offsets = vec![0, 1, 3, 4, 5];
    let w = mock_positive_weights(10, 4, 4);
    let bases = encode_bases("GCA", ALPHABET).unwrap();
    let mut m = Array2::<f32>::zeros((10, 5));
    // the second category of C
    m.column_mut(2).fill(1.0);
    let canonical = score_mod_seq(w.view(), m.view(), &bases, &[0, 0, 0], &offsets, 0, 10, false)
        .unwrap();
    let modified = score_mod_seq(w.view(), m.view(), &bases, &[0, 1, 0], &offsets, 0, 10, false)
        .unwrap();
    assert!(modified > canonical);
}

#[test]
fn posteriors_of_single_block() {
    let w = mock_random_weights(1, 4, 5);
    let post = transition_posteriors(w.view(), false).unwrap();
    assert_eq!(post.dim(), (1, 40));
    assert_abs_diff_eq!(post.sum(), 1.0, epsilon = 1e-4);
    let log_post = transition_posteriors(w.view(), true).unwrap();
    for (&p, &lp) in post.iter().zip(log_post.iter()) {
        assert_abs_diff_eq!(p, lp.exp(), epsilon = 1e-5);
    }
}

#[test]
fn posterior_rows_sum_to_one() {
    let w = mock_random_weights(30, 4, 6) * 3.0;
    let post = transition_posteriors(w.view(), false).unwrap();
    for row in post.axis_iter(Axis(0)) {
        assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-3);
    }
}

#[test]
fn batch_matches_single_read_decoding() {
    let reads: Vec<Array2<f32>> = (0..6)
        .map(|seed| mock_random_weights(20 + seed as usize, 4, seed))
        .collect();
    let calls = decode_batch(&reads, &DecodeConfig::default()).unwrap();
    assert_eq!(calls.len(), reads.len());
    for (read, call) in reads.iter().zip(calls.iter()) {
        assert_eq!(call.run_lengths.iter().sum::<usize>(), read.nrows() + 1);
        assert_eq!(*call, assemble(read.view(), ALPHABET).unwrap());
    }
}

#[test]
fn shape_is_checked_before_decoding() {
    let w = Array2::<f32>::zeros((5, 39));
    assert!(decode_viterbi(w.view()).is_err());
    assert!(transition_posteriors(w.view(), true).is_err());
    assert!(assemble(w.view(), ALPHABET).is_err());
}
