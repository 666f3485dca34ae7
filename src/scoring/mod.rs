//! The composite team-strength score ("OTR") and its season aggregate.

use crate::stats;

/// Ballot win percentage; undefined until at least one ballot exists.
pub fn ballot_win_pct(won: i64, lost: i64) -> Option<f64> {
    let total = won + lost;
    if total == 0 {
        None
    } else {
        Some(won as f64 / total as f64)
    }
}

/// Upset reward for one won prelim round against a stronger opponent.
/// `delta` is the opponent's prelim ballot win percentage minus the entry's
/// own; rounds with `delta <= 0` contribute nothing. The term grows with
/// `delta` but saturates, so bigger upsets pay more at a diminishing rate.
pub fn upset_reward(delta: f64) -> f64 {
    if delta <= 0.0 {
        return 0.0;
    }

    let shifted = delta + 0.7;
    0.12 * (shifted.powi(16) / (0.5 + shifted.powi(10))).sqrt()
}

#[derive(Debug, Clone, Copy)]
pub struct CompositeInputs {
    pub p_wp: f64,
    pub break_boost: f64,
    pub op_wp_m: f64,
    pub tournament_boost: f64,
    pub rxr: f64,
}

/// The per-tournament composite.
pub fn composite_score(inputs: &CompositeInputs) -> f64 {
    (inputs.p_wp
        * inputs.break_boost
        * (inputs.op_wp_m + 0.625)
        * inputs.tournament_boost
        + inputs.rxr)
        / 3.0
}

/// Attendance deflator for the season aggregate: rises from `Y0` toward 1
/// as the tournament count grows, suppressing small-sample extremes.
/// Reported to two decimal places.
pub fn otr_deflator(tournaments: usize) -> f64 {
    const N: f64 = 1.0;
    const Y0: f64 = 0.15;
    const K: f64 = 1.3;

    let raw = N / ((N / Y0 - 1.0) * (-K * tournaments as f64).exp() + 1.0);
    (raw * 100.0).round() / 100.0
}

/// Season/scope aggregate: deflated mean of the per-tournament composites.
/// A pure function of the persisted composites, so recomputation is
/// idempotent.
pub fn season_otr(composites: &[f64]) -> Option<f64> {
    let mean = stats::mean(composites)?;
    Some(otr_deflator(composites.len()) * mean)
}
