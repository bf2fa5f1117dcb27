//! Shared helpers for guarding weather measurements.
//!
//! Provider payloads and caller-supplied candidate days are plain `f64`s, so
//! NaN and ±Inf can leak in. Both the adapter and the scoring engine treat a
//! non-finite measurement as missing rather than letting it poison a score.

/// Drop non-finite values, logging which field carried them.
pub(crate) fn finite_or_none(v: Option<f64>, field: &str) -> Option<f64> {
    match v {
        Some(x) if !x.is_finite() => {
            tracing::warn!("{} received non-finite value {}, treating as missing", field, x);
            None
        }
        other => other,
    }
}

/// Round a combined fitness in [0,1] to an integer score in [0,100].
pub(crate) fn fitness_to_score(fitness: f64) -> u8 {
    if !fitness.is_finite() {
        tracing::warn!("fitness_to_score received non-finite value {}, defaulting to 0", fitness);
        return 0;
    }
    (fitness * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_or_none_passes_values() {
        assert_eq!(finite_or_none(Some(3.5), "t"), Some(3.5));
        assert_eq!(finite_or_none(None, "t"), None);
    }

    #[test]
    fn test_finite_or_none_drops_nan() {
        assert_eq!(finite_or_none(Some(f64::NAN), "t"), None);
    }

    #[test]
    fn test_finite_or_none_drops_infinity() {
        assert_eq!(finite_or_none(Some(f64::INFINITY), "t"), None);
        assert_eq!(finite_or_none(Some(f64::NEG_INFINITY), "t"), None);
    }

    #[test]
    fn test_fitness_to_score_rounds() {
        assert_eq!(fitness_to_score(1.0), 100);
        assert_eq!(fitness_to_score(0.0), 0);
        assert_eq!(fitness_to_score(0.904), 90);
        assert_eq!(fitness_to_score(0.906), 91);
        assert_eq!(fitness_to_score(0.99999999), 100);
    }

    #[test]
    fn test_fitness_to_score_clamps() {
        assert_eq!(fitness_to_score(1.2), 100);
        assert_eq!(fitness_to_score(-0.3), 0);
        assert_eq!(fitness_to_score(f64::NAN), 0);
    }
}
