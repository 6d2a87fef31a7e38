// Anomaly kind value object
// The closed set of classifications the detector can emit

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    DuplicateRead,
    IsolatedRead,
    OutOfOrder,
    DuplicateResidue,
    Backtracking,
    MissingHop,
    ExcessiveDelay,
    ExcessiveDwell,
}

impl AnomalyKind {
    pub const ALL: [AnomalyKind; 8] = [
        AnomalyKind::DuplicateRead,
        AnomalyKind::IsolatedRead,
        AnomalyKind::OutOfOrder,
        AnomalyKind::DuplicateResidue,
        AnomalyKind::Backtracking,
        AnomalyKind::MissingHop,
        AnomalyKind::ExcessiveDelay,
        AnomalyKind::ExcessiveDwell,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::DuplicateRead => "duplicate_read",
            AnomalyKind::IsolatedRead => "isolated_read",
            AnomalyKind::OutOfOrder => "out_of_order",
            AnomalyKind::DuplicateResidue => "duplicate_residue",
            AnomalyKind::Backtracking => "backtracking",
            AnomalyKind::MissingHop => "missing_hop",
            AnomalyKind::ExcessiveDelay => "excessive_delay",
            AnomalyKind::ExcessiveDwell => "excessive_dwell",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnomalyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        AnomalyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| DomainError::UnknownAnomalyKind(s.to_string()))
    }
}
