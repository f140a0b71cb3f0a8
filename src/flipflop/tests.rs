//!
//! Checks of the DP engine against brute-force path enumeration
//!
#[cfg(test)]
mod tests {
    use crate::common::State;
    use crate::flipflop::basecall::path_to_bases;
    use crate::flipflop::mocks::mock_random_weights;
    use crate::flipflop::posterior::{transition_posteriors, ForwardBackward};
    use crate::flipflop::sequence::score_sequence;
    use crate::flipflop::topology::Topology;
    use crate::flipflop::viterbi::{decode_viterbi, score_path};
    use crate::prob::logsumexp;
    use ndarray::{Array2, ArrayView2};

    ///
    /// every legal path of `n_blocks` transitions with its score
    ///
    fn enumerate_paths(topology: &Topology, weights: ArrayView2<f32>) -> Vec<(Vec<State>, f32)> {
        let mut paths: Vec<Vec<State>> = (0..topology.n_state()).map(|s| vec![s]).collect();
        for _ in 0..weights.nrows() {
            paths = paths
                .into_iter()
                .flat_map(|path| {
                    let last = *path.last().unwrap();
                    topology
                        .arena()
                        .outgoing(last)
                        .map(|e| {
                            let mut p = path.clone();
                            p.push(e.target);
                            p
                        })
                        .collect::<Vec<_>>()
                })
                .collect();
        }
        paths
            .into_iter()
            .map(|p| {
                let s = score_path(topology, weights, &p).unwrap();
                (p, s)
            })
            .collect()
    }

    #[test]
    fn brute_force_path_count() {
        let topology = Topology::new(2).unwrap();
        let w = mock_random_weights(3, 2, 0);
        let paths = enumerate_paths(&topology, w.view());
        // 4 start states, 3 choices per block
        assert_eq!(paths.len(), 4 * 27);
    }
    #[test]
    fn brute_force_viterbi() {
        for &(nbase, n_blocks) in &[(1, 5), (2, 4), (3, 3), (4, 3)] {
            let topology = Topology::new(nbase).unwrap();
            for seed in 0..3 {
                let w = mock_random_weights(n_blocks, nbase, seed);
                let best = enumerate_paths(&topology, w.view())
                    .into_iter()
                    .map(|(_, s)| s)
                    .fold(f32::NEG_INFINITY, f32::max);
                let o = decode_viterbi(w.view()).unwrap();
                println!("nbase={} seed={} best={} viterbi={}", nbase, seed, best, o.total_score);
                assert_abs_diff_eq!(o.total_score, best, epsilon = 1e-4);
            }
        }
    }
    #[test]
    fn brute_force_posteriors() {
        let nbase = 2;
        let topology = Topology::new(nbase).unwrap();
        let w = mock_random_weights(4, nbase, 1);
        let paths = enumerate_paths(&topology, w.view());
        let scores: Vec<f32> = paths.iter().map(|(_, s)| *s).collect();
        let log_z = logsumexp(&scores);

        let mut expected = Array2::<f32>::zeros(w.dim());
        for (path, s) in paths.iter() {
            let p = (s - log_z).exp();
            for (t, pair) in path.windows(2).enumerate() {
                let param = topology.param_of(pair[0], pair[1]).unwrap();
                expected[[t, param]] += p;
            }
        }
        let post = transition_posteriors(w.view(), false).unwrap();
        for (a, b) in post.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-4);
        }

        let fb = ForwardBackward::run(&topology, w.view());
        assert_abs_diff_eq!(fb.log_partition, log_z as f64, epsilon = 1e-4);
    }
    #[test]
    fn brute_force_sequence_scores() {
        let nbase = 2;
        let topology = Topology::new(nbase).unwrap();
        let w = mock_random_weights(5, nbase, 2);
        let paths = enumerate_paths(&topology, w.view());
        for bases in &[vec![0], vec![1, 1], vec![0, 1, 0], vec![1, 0, 0, 1]] {
            let matching: Vec<f32> = paths
                .iter()
                .filter(|(p, _)| &path_to_bases(&topology, p) == bases)
                .map(|(_, s)| *s)
                .collect();
            let best = matching.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let all = logsumexp(&matching);
            let s_best = score_sequence(w.view(), bases, 0, 5, false).unwrap();
            let s_all = score_sequence(w.view(), bases, 0, 5, true).unwrap();
            println!("{:?} best={} all={}", bases, s_best, s_all);
            assert_abs_diff_eq!(s_best, best, epsilon = 1e-4);
            assert_abs_diff_eq!(s_all, all, epsilon = 1e-4);
        }
    }
}
