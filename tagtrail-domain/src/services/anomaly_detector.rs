use std::collections::HashSet;

use serde_json::json;

use crate::entities::{Anomaly, PipelineSettings, Route, TimeMetric};
use crate::ports::ReferenceData;
use crate::utils::{minutes_between, round_to_decimals};
use crate::value_objects::{AnomalyKind, Severity};

/// Runs the fixed rule set over one built route.
pub struct AnomalyDetector<'a> {
    reference: &'a ReferenceData,
    settings: &'a PipelineSettings,
}

impl<'a> AnomalyDetector<'a> {
    pub fn new(reference: &'a ReferenceData, settings: &'a PipelineSettings) -> Self {
        Self { reference, settings }
    }

    pub fn detect(&self, route: &Route, metrics: &[TimeMetric]) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        self.out_of_order(route, &mut anomalies);
        self.duplicate_residue(route, &mut anomalies);
        let expected_path = self.expected_path(route);
        if let Some(path) = &expected_path {
            self.backtracking(route, path, &mut anomalies);
            self.missing_hops(route, path, &mut anomalies);
        }
        self.excessive_delay(route, metrics, &mut anomalies);
        self.excessive_dwell(route, metrics, &mut anomalies);
        anomalies
    }

    fn expected_path(&self, route: &Route) -> Option<Vec<String>> {
        let topology = &self.reference.topology;
        let origin = topology.node_of(&route.origin_reader_id)?;
        let destination = topology.node_of(&route.destination_reader_id)?;
        topology.expected_path(origin, destination)
    }

    fn out_of_order(&self, route: &Route, anomalies: &mut Vec<Anomaly>) {
        for pair in route.waypoints.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.read_at < previous.read_at {
                anomalies.push(
                    self.build_anomaly(
                        route,
                        AnomalyKind::OutOfOrder,
                        Severity::Medium,
                        format!("Read at {} precedes the read before it", current.reader_id),
                        current.read_at,
                    )
                    .at_reader(&current.reader_id)
                    .with_details(json!({
                        "event_id": current.event_id,
                        "previous_event_id": previous.event_id,
                        "previous_read_at": previous.read_at,
                    })),
                );
            }
        }
    }

    fn duplicate_residue(&self, route: &Route, anomalies: &mut Vec<Anomaly>) {
        for pair in route.waypoints.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.reader_id == previous.reader_id {
                let gap = minutes_between(previous.read_at, current.read_at);
                anomalies.push(
                    self.build_anomaly(
                        route,
                        AnomalyKind::DuplicateResidue,
                        Severity::Low,
                        format!("Repeated read at {} after {:.1} minutes", current.reader_id, gap),
                        current.read_at,
                    )
                    .at_reader(&current.reader_id)
                    .with_details(json!({
                        "event_id": current.event_id,
                        "previous_event_id": previous.event_id,
                        "gap_minutes": round_to_decimals(gap, 2),
                    })),
                );
            }
        }
    }

    fn backtracking(&self, route: &Route, path: &[String], anomalies: &mut Vec<Anomaly>) {
        let topology = &self.reference.topology;
        let mut previous: Option<(usize, &str)> = None;
        for waypoint in &route.waypoints {
            let Some(node) = topology.node_of(&waypoint.reader_id) else {
                continue;
            };
            let Some(position) = path.iter().position(|step| step == node) else {
                continue;
            };
            if let Some((previous_position, previous_node)) = previous {
                if position < previous_position {
                    anomalies.push(
                        self.build_anomaly(
                            route,
                            AnomalyKind::Backtracking,
                            Severity::High,
                            format!("Moved back from {} to {}", previous_node, node),
                            waypoint.read_at,
                        )
                        .at_reader(&waypoint.reader_id)
                        .with_details(json!({
                            "event_id": waypoint.event_id,
                            "node": node,
                            "position": position,
                            "previous_node": previous_node,
                            "previous_position": previous_position,
                            "expected_path": path,
                        })),
                    );
                }
            }
            previous = Some((position, node));
        }
    }

    fn missing_hops(&self, route: &Route, path: &[String], anomalies: &mut Vec<Anomaly>) {
        if path.len() < 3 {
            return;
        }
        let topology = &self.reference.topology;
        let visited: HashSet<&str> = route
            .waypoints
            .iter()
            .filter_map(|waypoint| topology.node_of(&waypoint.reader_id))
            .collect();
        for node in &path[1..path.len() - 1] {
            if !visited.contains(node.as_str()) {
                anomalies.push(
                    self.build_anomaly(
                        route,
                        AnomalyKind::MissingHop,
                        Severity::Low,
                        format!("No read at expected node {}", node),
                        route.ended_at,
                    )
                    .with_details(json!({
                        "node": node,
                        "expected_path": path,
                    })),
                );
            }
        }
    }

    fn excessive_delay(&self, route: &Route, metrics: &[TimeMetric], anomalies: &mut Vec<Anomaly>) {
        for metric in metrics.iter().filter(|metric| !metric.is_aggregate() && metric.is_delayed) {
            let delay = metric.delay_hours.unwrap_or(0.0);
            anomalies.push(
                self.build_anomaly(
                    route,
                    AnomalyKind::ExcessiveDelay,
                    Severity::from_delay_hours(delay),
                    format!(
                        "Leg {} to {} took {:.2} hours over expected",
                        metric.from_reader_id, metric.to_reader_id, delay
                    ),
                    metric.ended_at,
                )
                .at_reader(&metric.to_reader_id)
                .with_details(json!({
                    "leg_index": metric.leg_index,
                    "from_reader_id": metric.from_reader_id,
                    "to_reader_id": metric.to_reader_id,
                    "expected_hours": metric.expected_hours,
                    "actual_hours": round_to_decimals(metric.elapsed_total_hours(), 2),
                    "delay_hours": delay,
                })),
            );
        }
    }

    fn excessive_dwell(&self, route: &Route, metrics: &[TimeMetric], anomalies: &mut Vec<Anomaly>) {
        let topology = &self.reference.topology;
        let Some(allowed) = self.reference.standards.allowed_business_hours(
            topology.node_of(&route.origin_reader_id),
            topology.node_of(&route.destination_reader_id),
        ) else {
            return;
        };
        let threshold = allowed * self.settings.dwell_multiplier;
        for metric in metrics.iter().filter(|metric| !metric.is_aggregate()) {
            let business_hours = metric.elapsed_business_hours();
            if business_hours > threshold {
                anomalies.push(
                    self.build_anomaly(
                        route,
                        AnomalyKind::ExcessiveDwell,
                        Severity::High,
                        format!(
                            "Stalled {:.2} business hours between {} and {}",
                            business_hours, metric.from_reader_id, metric.to_reader_id
                        ),
                        metric.ended_at,
                    )
                    .at_reader(&metric.from_reader_id)
                    .with_details(json!({
                        "leg_index": metric.leg_index,
                        "business_hours": round_to_decimals(business_hours, 2),
                        "allowed_business_hours": allowed,
                        "dwell_multiplier": self.settings.dwell_multiplier,
                    })),
                );
            }
        }
    }

    fn build_anomaly(
        &self,
        route: &Route,
        kind: AnomalyKind,
        severity: Severity,
        description: String,
        detected_at: chrono::DateTime<chrono::Utc>,
    ) -> Anomaly {
        Anomaly::new(route.account_id, &route.tag_id, kind, severity, description, detected_at)
    }
}

/// Convenience wrapper over [`AnomalyDetector`].
pub fn detect_anomalies(
    route: &Route,
    metrics: &[TimeMetric],
    reference: &ReferenceData,
    settings: &PipelineSettings,
) -> Vec<Anomaly> {
    AnomalyDetector::new(reference, settings).detect(route, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{ReaderProfile, StandardsDocument, TopologyDocument, TopologyLink, Waypoint};
    use crate::services::{calculate_time_metrics, NetworkTopology, StandardsTable, WeekdayCalendar};
    use crate::value_objects::ReaderClass;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;
    use uuid::Uuid;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn reference(standard_hours: Option<f64>) -> ReferenceData {
        let reader = |id: &str, node: &str, class| ReaderProfile {
            reader_id: id.to_string(),
            node_id: node.to_string(),
            class,
        };
        let link = |from: &str, to: &str| TopologyLink {
            from: from.to_string(),
            to: to.to_string(),
            expected_hours: Some(4.0),
        };
        let topology = NetworkTopology::from_document(TopologyDocument {
            readers: vec![
                reader("R-MAD", "MAD", ReaderClass::Origin),
                reader("R-HUB", "HUB", ReaderClass::Transit),
                reader("R-ZAR", "ZAR", ReaderClass::Transit),
                reader("R-BCN", "BCN", ReaderClass::Destination),
            ],
            links: vec![link("MAD", "HUB"), link("HUB", "ZAR"), link("ZAR", "BCN")],
        });
        ReferenceData {
            topology: Arc::new(topology),
            calendar: Arc::new(WeekdayCalendar::around_the_clock()),
            standards: Arc::new(StandardsTable::from_document(
                StandardsDocument {
                    default_allowed_business_hours: standard_hours,
                    standards: Vec::new(),
                },
                24.0,
            )),
        }
    }

    fn route(stops: &[(&str, DateTime<Utc>)]) -> Route {
        let waypoints: Vec<Waypoint> = stops
            .iter()
            .enumerate()
            .map(|(i, (reader_id, read_at))| Waypoint {
                reader_id: reader_id.to_string(),
                read_at: *read_at,
                event_id: i as i64 + 1,
            })
            .collect();
        let first = waypoints.first().unwrap().clone();
        let last = waypoints.last().unwrap().clone();
        Route {
            account_id: Uuid::nil(),
            tag_id: "TAG".to_string(),
            origin_reader_id: first.reader_id,
            destination_reader_id: last.reader_id,
            started_at: first.read_at,
            ended_at: last.read_at,
            total_duration_hours: 0.0,
            reader_sequence: Vec::new(),
            event_count: waypoints.len() as i32,
            is_complete: true,
            waypoints,
        }
    }

    fn run(route: &Route, reference: &ReferenceData) -> Vec<Anomaly> {
        let settings = PipelineSettings::default();
        let metrics = calculate_time_metrics(route, reference, &settings);
        detect_anomalies(route, &metrics, reference, &settings)
    }

    fn kinds(anomalies: &[Anomaly]) -> Vec<AnomalyKind> {
        anomalies.iter().map(|anomaly| anomaly.kind).collect()
    }

    #[test]
    fn clean_route_has_no_anomalies() {
        let route = route(&[("R-MAD", at(4, 8)), ("R-HUB", at(4, 10)), ("R-ZAR", at(4, 12)), ("R-BCN", at(4, 14))]);
        assert!(run(&route, &reference(Some(24.0))).is_empty());
    }

    #[test]
    fn reports_skipped_nodes_once_each() {
        let route = route(&[("R-MAD", at(4, 8)), ("R-BCN", at(4, 10))]);
        let anomalies = run(&route, &reference(Some(24.0)));
        assert_eq!(kinds(&anomalies), vec![AnomalyKind::MissingHop, AnomalyKind::MissingHop]);
        assert_eq!(anomalies[0].details["node"], "HUB");
        assert_eq!(anomalies[1].details["node"], "ZAR");
        assert!(anomalies.iter().all(|anomaly| anomaly.route_id.is_none()));
    }

    #[test]
    fn flags_backtracking_and_residue() {
        let route = route(&[
            ("R-MAD", at(4, 8)),
            ("R-ZAR", at(4, 10)),
            ("R-HUB", at(4, 11)),
            ("R-HUB", at(4, 12)),
            ("R-BCN", at(4, 14)),
        ]);
        let anomalies = run(&route, &reference(Some(24.0)));
        assert_eq!(kinds(&anomalies), vec![AnomalyKind::DuplicateResidue, AnomalyKind::Backtracking]);
        assert_eq!(anomalies[1].severity, Severity::High);
        assert_eq!(anomalies[1].reader_id.as_deref(), Some("R-HUB"));
        assert_eq!(anomalies[1].details["previous_node"], "ZAR");
    }

    #[test]
    fn flags_out_of_order_waypoints() {
        let route = route(&[("R-MAD", at(4, 10)), ("R-HUB", at(4, 9)), ("R-ZAR", at(4, 11)), ("R-BCN", at(4, 12))]);
        let anomalies = run(&route, &reference(Some(24.0)));
        assert_eq!(kinds(&anomalies), vec![AnomalyKind::OutOfOrder]);
        assert_eq!(anomalies[0].severity, Severity::Medium);
    }

    #[test]
    fn delayed_legs_are_graded_by_delay() {
        let route = route(&[("R-MAD", at(4, 8)), ("R-HUB", at(4, 19)), ("R-ZAR", at(4, 21)), ("R-BCN", at(4, 23))]);
        let anomalies = run(&route, &reference(None));
        assert_eq!(kinds(&anomalies), vec![AnomalyKind::ExcessiveDelay]);
        // 11 hours against 4 expected
        assert_eq!(anomalies[0].severity, Severity::High);
        assert_eq!(anomalies[0].details["delay_hours"], 7.0);
    }

    #[test]
    fn long_dwell_breaks_the_standard() {
        let route = route(&[("R-MAD", at(4, 8)), ("R-HUB", at(4, 10)), ("R-ZAR", at(7, 10)), ("R-BCN", at(7, 12))]);
        let anomalies = run(&route, &reference(Some(24.0)));
        let dwell: Vec<_> = anomalies
            .iter()
            .filter(|anomaly| anomaly.kind == AnomalyKind::ExcessiveDwell)
            .collect();
        assert_eq!(dwell.len(), 1);
        assert_eq!(dwell[0].details["leg_index"], 1);
        assert_eq!(dwell[0].reader_id.as_deref(), Some("R-HUB"));
        assert!(kinds(&anomalies).contains(&AnomalyKind::ExcessiveDelay));
    }
}
