//! Descriptive statistics over parameter values.

use dpv_model::Descriptive;

/// Computes descriptive statistics, ignoring non-finite values.
///
/// Returns `None` when no finite value remains. Percentiles use linear
/// interpolation between closest ranks.
pub fn describe(values: &[f64]) -> Option<Descriptive> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let std_dev = if sorted.len() > 1 {
        let squares: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
        Some((squares / (n - 1.0)).sqrt())
    } else {
        None
    };

    Some(Descriptive {
        mean,
        std_dev,
        min: sorted[0],
        p25: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        p75: percentile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Percentile `q` (0.0..=1.0) of an ascending, non-empty slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let last = sorted.len() - 1;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
