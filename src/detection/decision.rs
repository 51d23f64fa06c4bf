//! Threshold rule.

use serde::Serialize;

use crate::level::Severity;

/// Output of one detection cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub recommended: Severity,
    pub should_raise_verbosity: bool,
    pub reason: String,
    /// Errors counted in the window.
    pub score: u64,
}

impl Decision {
    /// Placeholder until the first cycle completes.
    pub fn initialized(economy: Severity) -> Self {
        Self {
            recommended: economy,
            should_raise_verbosity: false,
            reason: "Detector initialized.".to_string(),
            score: 0,
        }
    }
}

/// Inputs of the threshold rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub error_threshold: u32,
    pub window_seconds: u64,
    pub economy: Severity,
    pub high_verbosity: Severity,
}

/// Recommend high verbosity when `errors` reaches the threshold, economy otherwise.
pub fn decide(errors: usize, thresholds: &Thresholds) -> Decision {
    let errors = errors as u64;
    let threshold = u64::from(thresholds.error_threshold);

    if errors >= threshold {
        Decision {
            recommended: thresholds.high_verbosity,
            should_raise_verbosity: true,
            reason: format!(
                "{errors} errors in the last {}s reached the threshold of {threshold}",
                thresholds.window_seconds
            ),
            score: errors,
        }
    } else {
        Decision {
            recommended: thresholds.economy,
            should_raise_verbosity: false,
            reason: format!(
                "{errors} errors in the last {}s, below the threshold of {threshold}",
                thresholds.window_seconds
            ),
            score: errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLDS: Thresholds = Thresholds {
        error_threshold: 5,
        window_seconds: 60,
        economy: Severity::Warning,
        high_verbosity: Severity::Information,
    };

    #[test]
    fn test_threshold_is_inclusive() {
        let high = decide(5, &THRESHOLDS);
        assert_eq!(high.recommended, Severity::Information);
        assert!(high.should_raise_verbosity);
        assert_eq!(high.score, 5);

        let quiet = decide(4, &THRESHOLDS);
        assert_eq!(quiet.recommended, Severity::Warning);
        assert!(!quiet.should_raise_verbosity);
    }

    #[test]
    fn test_reason_mentions_count_and_threshold() {
        let decision = decide(12, &THRESHOLDS);
        assert!(decision.reason.contains("12"));
        assert!(decision.reason.contains('5'));
    }
}
