use crate::scanning::domain::{ReportEntry, SeverityCounts};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Key used to order aggregated report entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Composite: critical, high, medium, low, total (all descending), then repository
    #[default]
    Severity,
    Repository,
    Reference,
    Critical,
    High,
    Medium,
    Low,
    Total,
    VulnCount,
}

impl SortKey {
    /// Parses a key, falling back to [`SortKey::Severity`] for unrecognized input
    ///
    /// # Returns
    /// The key and whether the input was recognized. Callers use the flag to
    /// warn about typos instead of silently sorting by the composite order.
    pub fn parse_lenient(input: &str) -> (Self, bool) {
        if input.trim().is_empty() {
            return (SortKey::Severity, true);
        }
        match Self::from_str(input) {
            Ok(key) => (key, true),
            Err(_) => (SortKey::Severity, false),
        }
    }

    fn count_of(self, counts: &SeverityCounts) -> Option<u32> {
        match self {
            SortKey::Critical => Some(counts.critical),
            SortKey::High => Some(counts.high),
            SortKey::Medium => Some(counts.medium),
            SortKey::Low => Some(counts.low),
            SortKey::Total => Some(counts.total),
            SortKey::VulnCount => Some(counts.vulnerabilities),
            SortKey::Severity | SortKey::Repository | SortKey::Reference => None,
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "severity" => Ok(SortKey::Severity),
            "repository" | "repo" => Ok(SortKey::Repository),
            "reference" | "ref" => Ok(SortKey::Reference),
            "critical" | "crit" => Ok(SortKey::Critical),
            "high" => Ok(SortKey::High),
            "medium" | "med" => Ok(SortKey::Medium),
            "low" => Ok(SortKey::Low),
            "total" => Ok(SortKey::Total),
            "vuln" | "vuln_count" | "count" | "vulnerabilities" => Ok(SortKey::VulnCount),
            _ => Err(format!(
                "Invalid sort key: {}. Valid keys: severity, repository, reference, critical, high, medium, low, total, vuln",
                s
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortKey::Severity => "severity",
            SortKey::Repository => "repository",
            SortKey::Reference => "reference",
            SortKey::Critical => "critical",
            SortKey::High => "high",
            SortKey::Medium => "medium",
            SortKey::Low => "low",
            SortKey::Total => "total",
            SortKey::VulnCount => "vuln",
        };
        write!(f, "{}", name)
    }
}

/// ReportSorter - Orders report entries by a [`SortKey`]
///
/// Sorting is stable: entries comparing equal keep their aggregation order.
/// Numeric keys put the largest counts first; string keys sort ascending.
/// `reverse` inverts the whole comparison, tie-breaks included.
pub struct ReportSorter;

impl ReportSorter {
    pub fn sort(entries: &mut [ReportEntry], key: SortKey, reverse: bool) {
        entries.sort_by(|a, b| {
            let ord = Self::compare(a, b, key);
            if reverse {
                ord.reverse()
            } else {
                ord
            }
        });
    }

    fn compare(a: &ReportEntry, b: &ReportEntry, key: SortKey) -> Ordering {
        match key {
            SortKey::Repository => a.repository.cmp(&b.repository),
            SortKey::Reference => a.reference.cmp(&b.reference),
            SortKey::Severity => Self::compare_composite(a, b),
            numeric => {
                let left = numeric.count_of(&a.counts).unwrap_or(0);
                let right = numeric.count_of(&b.counts).unwrap_or(0);
                right.cmp(&left)
            }
        }
    }

    fn compare_composite(a: &ReportEntry, b: &ReportEntry) -> Ordering {
        let (x, y) = (&a.counts, &b.counts);
        y.critical
            .cmp(&x.critical)
            .then_with(|| y.high.cmp(&x.high))
            .then_with(|| y.medium.cmp(&x.medium))
            .then_with(|| y.low.cmp(&x.low))
            .then_with(|| y.total.cmp(&x.total))
            .then_with(|| a.repository.cmp(&b.repository))
    }
}
