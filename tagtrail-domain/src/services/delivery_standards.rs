use std::collections::HashMap;

use crate::entities::StandardsDocument;
use crate::ports::DeliveryStandards;

/// Allowed transit per origin/destination node pair, with an optional
/// fallback for unlisted pairs.
#[derive(Debug, Clone, Default)]
pub struct StandardsTable {
    entries: HashMap<(String, String), f64>,
    default_hours: Option<f64>,
}

impl StandardsTable {
    /// Day-based allowances are converted with `hours_per_business_day`.
    /// Entries with neither hours nor days are ignored.
    pub fn from_document(document: StandardsDocument, hours_per_business_day: f64) -> Self {
        let entries = document
            .standards
            .into_iter()
            .filter_map(|standard| {
                let hours = standard
                    .allowed_business_hours
                    .or_else(|| standard.allowed_business_days.map(|days| days * hours_per_business_day))?;
                Some(((standard.origin_node, standard.destination_node), hours))
            })
            .collect();
        Self {
            entries,
            default_hours: document.default_allowed_business_hours,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DeliveryStandards for StandardsTable {
    fn allowed_business_hours(&self, origin_node: Option<&str>, destination_node: Option<&str>) -> Option<f64> {
        if let (Some(origin), Some(destination)) = (origin_node, destination_node) {
            if let Some(hours) = self
                .entries
                .get(&(origin.to_string(), destination.to_string()))
            {
                return Some(*hours);
            }
        }
        self.default_hours
    }
}
