//!
//! log-space score helpers
//!
//! DP tables hold raw `f32` log scores; these are the reductions used on
//! their rows.
//!

///
/// `log(sum_i exp(xs[i]))`
///
/// The running maximum is subtracted before exponentiation, so extreme
/// logits never overflow. Returns `-inf` for an empty slice or when every
/// element is `-inf`.
///
pub fn logsumexp(xs: &[f32]) -> f32 {
    let max = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max == f32::NEG_INFINITY {
        return max;
    }
    let sum: f32 = xs.iter().map(|&x| (x - max).exp()).sum();
    max + sum.ln()
}

///
/// index and value of the maximum element.
/// Ties are broken by the lowest index.
///
pub fn argmax(xs: &[f32]) -> Option<(usize, f32)> {
    xs.iter()
        .copied()
        .enumerate()
        .fold(None, |best, (i, x)| match best {
            Some((_, y)) if y >= x => best,
            _ => Some((i, x)),
        })
}
