use crate::scanning::domain::{Severity, VulnerabilityItem};
use crate::scanning::policies::SeverityRanking;
use std::str::FromStr;

/// SeverityFilter - Drops vulnerabilities below a minimum severity
///
/// Items keep their original order. Without a threshold every item passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeverityFilter {
    threshold: Option<Severity>,
}

impl SeverityFilter {
    pub fn new(threshold: Option<Severity>) -> Self {
        Self { threshold }
    }

    /// Builds a filter from a user-supplied severity name
    ///
    /// # Arguments
    /// * `name` - Minimum severity; an empty or blank string disables filtering
    ///
    /// # Errors
    /// Returns the parse message when `name` is not a recognized severity
    pub fn from_name(name: &str) -> Result<Self, String> {
        if name.trim().is_empty() {
            return Ok(Self::default());
        }
        Severity::from_str(name).map(|s| Self::new(Some(s)))
    }

    pub fn threshold(&self) -> Option<Severity> {
        self.threshold
    }

    pub fn is_active(&self) -> bool {
        self.threshold.is_some()
    }

    /// Returns true when the item ranks at or above the threshold
    pub fn retains(&self, item: &VulnerabilityItem) -> bool {
        match self.threshold {
            Some(threshold) => SeverityRanking::meets_threshold(&item.severity, threshold),
            None => true,
        }
    }

    /// Removes items ranked strictly below the threshold, preserving order
    pub fn apply(&self, items: Vec<VulnerabilityItem>) -> Vec<VulnerabilityItem> {
        if !self.is_active() {
            return items;
        }
        items.into_iter().filter(|item| self.retains(item)).collect()
    }
}
