use clap::{Parser, Subcommand};
use flipflop::{
    common::{revcomp, ALPHABET},
    error::Result,
    flipflop::{
        assemble, basecall::encode_bases, score_mod_seq, score_sequence, transition_posteriors,
        CatModInfo,
    },
    io::{read_weights_file, to_rows, write_json},
};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, about, version)]
struct Opts {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Viterbi basecall of a weight matrix
    Basecall {
        /// Input weight JSON filename
        weights: PathBuf,
        /// Letters of the canonical bases
        #[clap(short, long, default_value = ALPHABET)]
        alphabet: String,
        /// Report the reverse complement of the call
        #[clap(long)]
        revcomp: bool,
        /// Output JSON filename of the basecall
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Transition posteriors by forward-backward
    Posterior {
        /// Input weight JSON filename
        weights: PathBuf,
        /// Output probabilities instead of log probabilities
        #[clap(long)]
        linear: bool,
        /// Output JSON filename of the posterior matrix
        #[clap(short, long)]
        output: PathBuf,
    },
    /// Score a base sequence against a weight matrix
    Score {
        /// Input weight JSON filename
        weights: PathBuf,
        /// Sequence to score, written over the alphabet
        #[clap(short, long)]
        bases: String,
        #[clap(short, long, default_value = ALPHABET)]
        alphabet: String,
        /// First block of the range
        #[clap(long, default_value_t = 0)]
        start: usize,
        /// End (exclusive) of the range. Defaults to the number of blocks.
        #[clap(long)]
        end: Option<usize>,
        /// Sum over all alignments instead of the best one
        #[clap(long)]
        all_paths: bool,
    },
    /// Score a base sequence with modification categories
    ScoreMod {
        /// Input weight JSON filename containing `mod_weights`
        weights: PathBuf,
        #[clap(short, long)]
        bases: String,
        /// Modification category of each base, comma separated
        #[clap(short, long, use_value_delimiter = true)]
        mod_cats: Vec<usize>,
        /// Column offsets of each canonical base, comma separated
        #[clap(long, use_value_delimiter = true)]
        offsets: Vec<usize>,
        #[clap(short, long, default_value = ALPHABET)]
        alphabet: String,
        #[clap(long, default_value_t = 0)]
        start: usize,
        #[clap(long)]
        end: Option<usize>,
        #[clap(long)]
        all_paths: bool,
    },
}

fn run(opts: &Opts) -> Result<()> {
    match &opts.command {
        Commands::Basecall {
            weights,
            alphabet,
            revcomp: rc,
            output,
        } => {
            let w = read_weights_file(weights)?.weights()?;
            info!("n_blocks={} n_params={}", w.nrows(), w.ncols());
            let mut bc = assemble(w.view(), alphabet)?;
            if *rc {
                bc.basecall = revcomp(&bc.basecall);
                bc.run_lengths.reverse();
            }
            match output {
                Some(output) => write_json(output, &bc)?,
                None => {
                    println!(">basecall score={}", bc.score);
                    println!("{}", bc.basecall);
                }
            }
        }
        Commands::Posterior {
            weights,
            linear,
            output,
        } => {
            let w = read_weights_file(weights)?.weights()?;
            let post = transition_posteriors(w.view(), !linear)?;
            write_json(output, &to_rows(post.view()))?;
        }
        Commands::Score {
            weights,
            bases,
            alphabet,
            start,
            end,
            all_paths,
        } => {
            let w = read_weights_file(weights)?.weights()?;
            let bases = encode_bases(bases, alphabet)?;
            let end = end.unwrap_or_else(|| w.nrows());
            let score = score_sequence(w.view(), &bases, *start, end, *all_paths)?;
            println!("{}", score);
        }
        Commands::ScoreMod {
            weights,
            bases,
            mod_cats,
            offsets,
            alphabet,
            start,
            end,
            all_paths,
        } => {
            let file = read_weights_file(weights)?;
            let w = file.weights()?;
            let info = CatModInfo::from_offsets(offsets.clone())?;
            // a single combined model output is split at the transition columns
            let (w, m) = match file.mod_weights()? {
                Some(m) => (w, m),
                None => {
                    let (w, m) = info.split_output(w.view())?;
                    (w.to_owned(), m.to_owned())
                }
            };
            let bases = encode_bases(bases, alphabet)?;
            let end = end.unwrap_or_else(|| w.nrows());
            let score = score_mod_seq(
                w.view(),
                m.view(),
                &bases,
                mod_cats,
                &info.can_mods_offsets,
                *start,
                end,
                *all_paths,
            )?;
            println!("{}", score);
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let opts: Opts = Opts::parse();
    println!("# started_at={}", chrono::Local::now());
    println!("# n_threads={}", rayon::current_num_threads());
    println!("# opts={:?}", opts);
    if let Err(e) = run(&opts) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
    println!("# finished_at={}", chrono::Local::now());
}
