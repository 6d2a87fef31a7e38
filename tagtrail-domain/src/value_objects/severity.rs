// Severity value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    /// Grades a leg delay in hours. Only called for positive delays.
    pub fn from_delay_hours(delay_hours: f64) -> Self {
        if delay_hours > 24.0 {
            Severity::Critical
        } else if delay_hours > 6.0 {
            Severity::High
        } else if delay_hours > 2.0 {
            Severity::Medium
        } else {
            Severity::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grades_follow_hour_bands() {
        assert_eq!(Severity::from_delay_hours(0.5), Severity::Low);
        assert_eq!(Severity::from_delay_hours(2.0), Severity::Low);
        assert_eq!(Severity::from_delay_hours(2.01), Severity::Medium);
        assert_eq!(Severity::from_delay_hours(6.5), Severity::High);
        assert_eq!(Severity::from_delay_hours(24.01), Severity::Critical);
    }
}
