/// Lowest ordinal code a stress-level answer can take.
const MIN_ORDINAL: u8 = 1;
/// Highest ordinal code a stress-level answer can take.
const MAX_ORDINAL: u8 = 3;

/// Normalise stress-level ordinal codes to a 0-10 score, rounded to two decimals.
///
/// Uses min-max normalisation `(sum - n) / (2n) * 10` rather than the plain
/// ratio `sum / (3n) * 10`, which would score all-`Low` answers at 3.33 and
/// push calm respondents out of the Meditation band.
///
/// All-`Low` answers score `0.0` and all-`High` answers score `10.0`; the sum is
/// scaled linearly between those two sums. Codes must be in `1..=3`; callers
/// validate answers before scoring. An empty sequence scores `0.0`.
pub fn stress_score(codes: &[u8]) -> f64 {
    if codes.is_empty() {
        return 0.0;
    }
    debug_assert!(codes
        .iter()
        .all(|code| (MIN_ORDINAL..=MAX_ORDINAL).contains(code)));

    let total: u32 = codes.iter().map(|&code| u32::from(code)).sum();
    let count = codes.len() as f64;
    let min_sum = count * f64::from(MIN_ORDINAL);
    let span = count * f64::from(MAX_ORDINAL - MIN_ORDINAL);
    let normalized = (f64::from(total) - min_sum) / span * 10.0;
    round_to_hundredths(normalized.clamp(0.0, 10.0))
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
