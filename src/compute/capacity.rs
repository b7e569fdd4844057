//! Upper bound on the number of distinct patterns of a given shape.
//!
//! Patterns are boundary-fixed: the first and last slot are always match
//! positions, so a pattern with `W` matches and `d` don't-cares places the
//! remaining `W - 2` matches among `d + W - 2` interior slots.

use crate::schema::{DontCareRange, OptimizerConfig};

/// Binomial coefficient `C(n, k)` as a float.
///
/// Computed as the running product `Π (n - k + i) / i`, which stays finite
/// far beyond the range where factorials overflow. Arguments are swapped if
/// `n < k`, and the product always runs over the smaller of `k` and `n - k`
/// so that `C(n, k)` and `C(n, n - k)` are bit-identical. The result is
/// rounded to the nearest integer.
pub fn binomial(n: u64, k: u64) -> f64 {
    let (n, k) = if n < k { (k, n) } else { (n, k) };
    let k = k.min(n - k);

    let mut coef = 1.0f64;
    for i in 1..=k {
        coef *= (n - k + i) as f64 / i as f64;
    }
    coef.round()
}

/// Number of structurally distinct patterns of `weight` with a don't-care
/// count anywhere in `range`.
pub fn max_pattern_count(weight: usize, range: DontCareRange) -> f64 {
    let range = DontCareRange::new(range.min, range.max);
    let interior_matches = weight.saturating_sub(2) as u64;

    (range.min..=range.max)
        .map(|d| binomial(d as u64 + interior_matches, interior_matches))
        .sum()
}

/// Clamp `size` to the number of distinct patterns available.
///
/// Returns the adjusted size; logs a warning when clamping happens.
pub fn clamp_size(size: usize, weight: usize, range: DontCareRange) -> usize {
    let max_count = max_pattern_count(weight, range);
    if size as f64 > max_count {
        let clamped = max_count.floor() as usize;
        log::warn!(
            "{} unique patterns of weight {} with {}-{} don't-care positions are not possible; \
             adjusting the set size to {}",
            size,
            weight,
            range.min,
            range.max,
            clamped
        );
        clamped
    } else {
        size
    }
}

/// Clamp `config.size` in place. Returns `true` if it changed.
pub fn clamp_config(config: &mut OptimizerConfig) -> bool {
    let clamped = clamp_size(config.size, config.weight, config.resolved_dont_care());
    let changed = clamped != config.size;
    config.size = clamped;
    changed
}
