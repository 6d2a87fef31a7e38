// Reference data documents
// Shapes of the topology and delivery-standard files

use serde::{Deserialize, Serialize};

use crate::value_objects::ReaderClass;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderProfile {
    pub reader_id: String,
    pub node_id: String,
    #[serde(default = "default_reader_class")]
    pub class: ReaderClass,
}

fn default_reader_class() -> ReaderClass {
    ReaderClass::Transit
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyLink {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyDocument {
    #[serde(default)]
    pub readers: Vec<ReaderProfile>,
    #[serde(default)]
    pub links: Vec<TopologyLink>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryStandard {
    pub origin_node: String,
    pub destination_node: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_business_hours: Option<f64>,
    /// J+K style allowance, converted with the calendar's business day length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_business_days: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_allowed_business_hours: Option<f64>,
    #[serde(default)]
    pub standards: Vec<DeliveryStandard>,
}
