//!
//! Shared constants and type aliases
//!

/// canonical base index in `[0, nbase)`
pub type Base = usize;

/// flip-flop state index in `[0, nstate)`
pub type State = usize;

/// transition parameter (= column of the weight matrix) index
pub type Param = usize;

///
/// Default canonical alphabet
///
pub const ALPHABET: &str = "ACGT";

///
/// Output alphabet of categorical modification models: canonical bases
/// followed by the remaining upper-case letters in reverse order.
///
pub const MOD_ALPHABET: &str = "ACGTZYXWVUSRQPONMLKJIHFEDB";

///
/// Complement of a single base. Non-ACGT bytes are kept as-is.
///
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b => b,
    }
}

///
/// Reverse complement of a basecall
///
pub fn revcomp(seq: &str) -> String {
    seq.bytes().rev().map(|b| complement(b) as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revcomp_basecall() {
        assert_eq!(revcomp("AACGT"), "ACGTT");
        assert_eq!(revcomp(""), "");
        assert_eq!(revcomp("GATTACA"), "TGTAATC");
    }
    #[test]
    fn mod_alphabet_extends_canonical() {
        assert!(MOD_ALPHABET.starts_with(ALPHABET));
        assert_eq!(MOD_ALPHABET.len(), 26);
        assert!(MOD_ALPHABET[4..].bytes().all(|b| !ALPHABET.as_bytes().contains(&b)));
    }
}
