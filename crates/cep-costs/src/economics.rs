//! Present-value and annuity arithmetic shared by every costing pass.
//!
//! All functions are total: a zero discount rate, an empty horizon, and
//! out-of-range period indices produce `0`/`[]` instead of panicking.

use cep_core::SolutionAlgorithm;

/// Discount factor bringing a value `years` into the future back to the
/// start of the horizon.
///
/// PVF = (1 + r)^-n, or 1 when r = 0
pub fn present_value_factor(rate: f64, years: f64) -> f64 {
    if rate == 0.0 {
        1.0
    } else {
        (1.0 + rate).powf(-years)
    }
}

/// Present value of an annuity paying one unit per year for `years` years.
///
/// PVA = (1 - (1 + r)^-n) / r, or n when r = 0
///
/// Reciprocal of [`capital_recovery_factor`].
pub fn present_value_annuity_factor(rate: f64, years: f64) -> f64 {
    if rate == 0.0 {
        years
    } else {
        (1.0 - (1.0 + rate).powf(-years)) / rate
    }
}

/// Annual repayment recovering one unit of present value over `years` years.
///
/// CRF = r / (1 - (1 + r)^-n), or 1/n when r = 0
///
/// A zero-length horizon recovers nothing and yields 0.
pub fn capital_recovery_factor(rate: f64, years: f64) -> f64 {
    if years == 0.0 {
        0.0
    } else if rate == 0.0 {
        1.0 / years
    } else {
        rate / (1.0 - (1.0 + rate).powf(-years))
    }
}

/// Years elapsed before the start of each period: `[0, l1, l1+l2, ..]`
pub fn period_start_years(lengths: &[u32]) -> Vec<f64> {
    let mut starts = Vec::with_capacity(lengths.len());
    let mut elapsed = 0.0;
    for &len in lengths {
        starts.push(elapsed);
        elapsed += len as f64;
    }
    starts
}

/// Years from the start of the (1-based) period to the end of the horizon
pub fn years_remaining(period_index: usize, lengths: &[u32]) -> f64 {
    if period_index == 0 {
        return 0.0;
    }
    lengths
        .iter()
        .skip(period_index - 1)
        .map(|&len| len as f64)
        .sum()
}

/// Investment horizon a period "sees" under the given solution algorithm:
/// its own length under Myopic, the full remaining horizon otherwise.
pub fn applicable_horizon(
    algorithm: SolutionAlgorithm,
    period_index: usize,
    lengths: &[u32],
) -> f64 {
    match algorithm {
        SolutionAlgorithm::Myopic => period_index
            .checked_sub(1)
            .and_then(|i| lengths.get(i))
            .map(|&len| len as f64)
            .unwrap_or(0.0),
        SolutionAlgorithm::Monolithic | SolutionAlgorithm::Benders => {
            years_remaining(period_index, lengths)
        }
    }
}
