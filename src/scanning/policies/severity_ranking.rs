use crate::scanning::domain::Severity;
use std::str::FromStr;

/// SeverityRanking policy for comparing free-form severity strings
///
/// Scanners report severities as plain strings. This policy encodes the
/// rules for placing them on the ordinal scale:
///
/// 1. Comparison is case-insensitive
/// 2. Recognized names map to [`Severity::rank`]
/// 3. Anything unrecognized ranks 0, the same as `none`, so new scanner
///    vocabulary is never dropped by a threshold of `none`
pub struct SeverityRanking;

impl SeverityRanking {
    /// Ranks a severity string reported by a scanner
    pub fn rank_of(severity: &str) -> u8 {
        Severity::from_str(severity)
            .map(Severity::rank)
            .unwrap_or(0)
    }

    /// Returns true when `severity` ranks at or above `threshold`
    pub fn meets_threshold(severity: &str, threshold: Severity) -> bool {
        Self::rank_of(severity) >= threshold.rank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_of_known_values() {
        assert_eq!(SeverityRanking::rank_of("none"), 0);
        assert_eq!(SeverityRanking::rank_of("Negligible"), 1);
        assert_eq!(SeverityRanking::rank_of("LOW"), 2);
        assert_eq!(SeverityRanking::rank_of("medium"), 3);
        assert_eq!(SeverityRanking::rank_of("High"), 4);
        assert_eq!(SeverityRanking::rank_of("CRITICAL"), 5);
    }

    #[test]
    fn test_rank_of_unrecognized_is_lowest() {
        assert_eq!(SeverityRanking::rank_of("Unknown"), 0);
        assert_eq!(SeverityRanking::rank_of("catastrophic"), 0);
        assert_eq!(SeverityRanking::rank_of(""), 0);
    }

    #[test]
    fn test_meets_threshold() {
        assert!(SeverityRanking::meets_threshold("critical", Severity::High));
        assert!(SeverityRanking::meets_threshold("High", Severity::High));
        assert!(!SeverityRanking::meets_threshold("medium", Severity::High));
        assert!(SeverityRanking::meets_threshold("whatever", Severity::None));
        assert!(!SeverityRanking::meets_threshold("whatever", Severity::Low));
    }
}
