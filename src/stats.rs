//! Point-series statistics shared by ingestion and the judge index pass.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n − 1 denominator). Needs at least two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>()
        / (values.len() - 1) as f64;
    Some(var.sqrt())
}

// Linear-interpolation percentile over an already-sorted slice.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

/// Drops values falling outside `[Q1 − 1.5·IQR, Q3 + 1.5·IQR]`.
pub fn iqr_filter(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let q1 = percentile(&sorted, 0.25);
    let q3 = percentile(&sorted, 0.75);
    let spread = (q3 - q1) * 1.5;
    let (lo, hi) = (q1 - spread, q3 + spread);

    values
        .iter()
        .copied()
        .filter(|v| *v >= lo && *v <= hi)
        .collect()
}

/// Outlier-trimmed average: the "adjusted" points shown next to raw
/// averages.
pub fn iqr_trimmed_mean(values: &[f64]) -> Option<f64> {
    mean(&iqr_filter(values))
}

/// Sorts and removes the `trim` highest and `trim` lowest values, then
/// averages the rest. `None` when fewer than `2·trim + 1` values are
/// supplied.
pub fn hi_lo_trimmed_mean(values: &[f64], trim: usize) -> Option<f64> {
    if values.len() <= 2 * trim {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    mean(&sorted[trim..sorted.len() - trim])
}
