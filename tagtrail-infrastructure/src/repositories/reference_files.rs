use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::fs;
use tracing::{info, warn};

use tagtrail_domain::{
    NetworkTopology, ReferenceData, RuntimeConfig, StandardsDocument, StandardsTable,
    TopologyDocument, WeekdayCalendar,
};

use crate::config::validation::validate_hours;

/// Reads `topology.yaml`. A missing file yields an empty document.
pub async fn load_topology_document(path: &str) -> Result<TopologyDocument> {
    if !Path::new(path).exists() {
        warn!("topology file {} not found, every reader is unknown", path);
        return Ok(TopologyDocument::default());
    }
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path))?;
    let document: TopologyDocument =
        serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path))?;
    validate_topology(&document)?;
    Ok(document)
}

/// Reads `standards.yaml`. A missing file yields no standards at all.
pub async fn load_standards_document(path: &str) -> Result<StandardsDocument> {
    if !Path::new(path).exists() {
        warn!("standards file {} not found, no delivery standards apply", path);
        return Ok(StandardsDocument::default());
    }
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path))?;
    let document: StandardsDocument =
        serde_yaml::from_str(&content).with_context(|| format!("parsing {}", path))?;
    validate_standards(&document)?;
    Ok(document)
}

/// Builds the reference snapshot a batch runs against.
pub async fn load_reference_data(config: &RuntimeConfig) -> Result<ReferenceData> {
    let topology = NetworkTopology::from_document(load_topology_document(&config.topology_path).await?);
    let standards = StandardsTable::from_document(
        load_standards_document(&config.standards_path).await?,
        config.calendar.business_hours_per_day(),
    );
    info!(
        readers = topology.reader_count(),
        links = topology.link_count(),
        standards = standards.len(),
        "reference data loaded"
    );
    Ok(ReferenceData {
        topology: Arc::new(topology),
        calendar: Arc::new(WeekdayCalendar::new(config.calendar.clone())),
        standards: Arc::new(standards),
    })
}

/// Inconsistencies found in a reference document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("{field} is empty")]
    EmptyId { field: &'static str },
    #[error("{field} '{value}' has leading or trailing whitespace")]
    PaddedId { field: &'static str, value: String },
    #[error("reader {0} listed twice")]
    DuplicateReader(String),
    #[error("{0} has no allowance")]
    MissingAllowance(String),
}

/// Ids are matched verbatim against reads, so padding would never match.
fn check_id(field: &'static str, value: &str) -> Result<(), ReferenceError> {
    if value.trim().is_empty() {
        return Err(ReferenceError::EmptyId { field });
    }
    if value.trim() != value {
        return Err(ReferenceError::PaddedId {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn validate_topology(document: &TopologyDocument) -> Result<()> {
    let mut seen = HashSet::new();
    for reader in &document.readers {
        check_id("reader_id", &reader.reader_id)?;
        check_id("node_id", &reader.node_id)?;
        if !seen.insert(reader.reader_id.as_str()) {
            return Err(ReferenceError::DuplicateReader(reader.reader_id.clone()).into());
        }
    }
    for link in &document.links {
        check_id("link from", &link.from)?;
        check_id("link to", &link.to)?;
        if let Some(hours) = link.expected_hours {
            validate_hours(&format!("link {} -> {}", link.from, link.to), hours)?;
        }
    }
    Ok(())
}

fn validate_standards(document: &StandardsDocument) -> Result<()> {
    if let Some(hours) = document.default_allowed_business_hours {
        validate_hours("default_allowed_business_hours", hours)?;
    }
    for standard in &document.standards {
        check_id("origin_node", &standard.origin_node)?;
        check_id("destination_node", &standard.destination_node)?;
        let label = format!("standard {} -> {}", standard.origin_node, standard.destination_node);
        match (standard.allowed_business_hours, standard.allowed_business_days) {
            (Some(hours), _) => validate_hours(&label, hours)?,
            (None, Some(days)) => validate_hours(&label, days)?,
            (None, None) => return Err(ReferenceError::MissingAllowance(label).into()),
        }
    }
    Ok(())
}
