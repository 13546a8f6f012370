//! Confidence arithmetic shared by every pipeline stage
//!
//! All confidence values produced anywhere in the pipeline are f64 in
//! [0, 1]. The helpers here are the single place where clamping and
//! aggregation rules live, so downstream stages can rely on the bounds
//! without re-checking them.

/// Clamps a confidence score into [0, 1].
pub fn clamp(confidence: f64) -> f64 {
    if confidence.is_nan() {
        return 0.0;
    }
    confidence.clamp(0.0, 1.0)
}

/// Mean of the given scores, clamped. Empty input yields 0.0.
pub fn mean(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    clamp(scores.iter().sum::<f64>() / scores.len() as f64)
}

/// Weighted mean over `(score, weight)` pairs, clamped.
///
/// Pairs with non-positive weight are ignored; if no weight remains the
/// result is 0.0.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> f64 {
    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for &(score, weight) in pairs {
        if weight > 0.0 {
            total += score * weight;
            weight_sum += weight;
        }
    }
    if weight_sum <= 0.0 {
        return 0.0;
    }
    clamp(total / weight_sum)
}

/// Completeness-weighted aggregate used for overall extraction confidence.
///
/// Per-category confidences are averaged over the number of *requested*
/// categories, so a category that matched nothing drags the aggregate down
/// instead of being silently skipped.
pub fn completeness_mean(non_empty_scores: &[f64], requested_categories: usize) -> f64 {
    if requested_categories == 0 {
        return 0.0;
    }
    clamp(non_empty_scores.iter().sum::<f64>() / requested_categories as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_bounds() {
        assert_eq!(clamp(1.5), 1.0);
        assert_eq!(clamp(-0.2), 0.0);
        assert_eq!(clamp(0.85), 0.85);
        assert_eq!(clamp(f64::NAN), 0.0);
    }

    #[test]
    fn test_mean_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[0.8, 0.6]) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_completeness_mean_counts_empty_categories() {
        // two categories matched at 0.9 out of four requested
        let overall = completeness_mean(&[0.9, 0.9], 4);
        assert!((overall - 0.45).abs() < 1e-9);
        assert_eq!(completeness_mean(&[0.9], 0), 0.0);
    }
}
