use crate::entities::{PipelineSettings, Route, TimeMetric, Waypoint, AGGREGATE_LEG_INDEX};
use crate::ports::ReferenceData;
use crate::utils::{round_to_decimals, secs_to_hours};

/// One row per consecutive waypoint pair, then the whole-route row.
pub fn calculate_time_metrics(
    route: &Route,
    reference: &ReferenceData,
    settings: &PipelineSettings,
) -> Vec<TimeMetric> {
    let mut metrics: Vec<TimeMetric> = route
        .waypoints
        .windows(2)
        .enumerate()
        .map(|(index, pair)| leg_metric(route, index, &pair[0], &pair[1], reference, settings))
        .collect();
    metrics.push(aggregate_metric(route, reference));
    metrics
}

fn elapsed_secs(
    from: chrono::DateTime<chrono::Utc>,
    to: chrono::DateTime<chrono::Utc>,
    reference: &ReferenceData,
) -> (i64, i64) {
    let total = (to - from).num_seconds().max(0);
    let business = reference
        .calendar
        .business_duration(from, to)
        .num_seconds()
        .clamp(0, total);
    (total, business)
}

fn leg_metric(
    route: &Route,
    index: usize,
    from: &Waypoint,
    to: &Waypoint,
    reference: &ReferenceData,
    settings: &PipelineSettings,
) -> TimeMetric {
    let (total, business) = elapsed_secs(from.read_at, to.read_at, reference);

    // A dwell at one reader has no expected transit.
    let expected_hours = if from.reader_id == to.reader_id {
        None
    } else {
        let topology = &reference.topology;
        let linked = match (topology.node_of(&from.reader_id), topology.node_of(&to.reader_id)) {
            (Some(from_node), Some(to_node)) => topology.expected_leg_hours(from_node, to_node),
            _ => None,
        };
        Some(linked.unwrap_or(settings.default_leg_expected_hours))
    };
    let (is_delayed, delay_hours) = delay(secs_to_hours(total), expected_hours);

    TimeMetric {
        account_id: route.account_id,
        tag_id: route.tag_id.clone(),
        leg_index: i32::try_from(index).unwrap_or(i32::MAX),
        from_reader_id: from.reader_id.clone(),
        to_reader_id: to.reader_id.clone(),
        started_at: from.read_at,
        ended_at: to.read_at,
        elapsed_total_secs: total,
        elapsed_business_secs: business,
        expected_hours,
        is_delayed,
        delay_hours,
    }
}

fn aggregate_metric(route: &Route, reference: &ReferenceData) -> TimeMetric {
    let (total, business) = elapsed_secs(route.started_at, route.ended_at, reference);
    let topology = &reference.topology;
    let expected_hours = reference.standards.allowed_business_hours(
        topology.node_of(&route.origin_reader_id),
        topology.node_of(&route.destination_reader_id),
    );
    let (is_delayed, delay_hours) = delay(secs_to_hours(business), expected_hours);

    TimeMetric {
        account_id: route.account_id,
        tag_id: route.tag_id.clone(),
        leg_index: AGGREGATE_LEG_INDEX,
        from_reader_id: route.origin_reader_id.clone(),
        to_reader_id: route.destination_reader_id.clone(),
        started_at: route.started_at,
        ended_at: route.ended_at,
        elapsed_total_secs: total,
        elapsed_business_secs: business,
        expected_hours,
        is_delayed,
        delay_hours,
    }
}

fn delay(actual_hours: f64, expected_hours: Option<f64>) -> (bool, Option<f64>) {
    match expected_hours {
        Some(expected) if actual_hours > expected => {
            (true, Some(round_to_decimals(actual_hours - expected, 2)))
        }
        Some(_) => (false, Some(0.0)),
        None => (false, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{CalendarSettings, ReaderProfile, StandardsDocument, TopologyDocument, TopologyLink, DeliveryStandard};
    use crate::services::{NetworkTopology, StandardsTable, WeekdayCalendar};
    use crate::value_objects::ReaderClass;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;
    use uuid::Uuid;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
    }

    fn reader(id: &str, node: &str, class: ReaderClass) -> ReaderProfile {
        ReaderProfile {
            reader_id: id.to_string(),
            node_id: node.to_string(),
            class,
        }
    }

    fn reference(calendar: WeekdayCalendar) -> ReferenceData {
        let topology = NetworkTopology::from_document(TopologyDocument {
            readers: vec![
                reader("R-MAD", "MAD", ReaderClass::Origin),
                reader("R-HUB", "HUB", ReaderClass::Transit),
                reader("R-BCN", "BCN", ReaderClass::Destination),
            ],
            links: vec![
                TopologyLink {
                    from: "MAD".to_string(),
                    to: "HUB".to_string(),
                    expected_hours: Some(3.0),
                },
                TopologyLink {
                    from: "HUB".to_string(),
                    to: "BCN".to_string(),
                    expected_hours: None,
                },
            ],
        });
        let standards = StandardsTable::from_document(
            StandardsDocument {
                default_allowed_business_hours: None,
                standards: vec![DeliveryStandard {
                    origin_node: "MAD".to_string(),
                    destination_node: "BCN".to_string(),
                    allowed_business_hours: Some(24.0),
                    allowed_business_days: None,
                }],
            },
            24.0,
        );
        ReferenceData {
            topology: Arc::new(topology),
            calendar: Arc::new(calendar),
            standards: Arc::new(standards),
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

    #[test]
    fn legs_then_aggregate() {
        let route = route(&[("R-MAD", at(4, 8)), ("R-HUB", at(4, 13)), ("R-BCN", at(4, 14))]);
        let metrics = calculate_time_metrics(
            &route,
            &reference(WeekdayCalendar::around_the_clock()),
            &PipelineSettings::default(),
        );
        assert_eq!(metrics.len(), 3);

        let first = &metrics[0];
        assert_eq!(first.leg_index, 0);
        assert_eq!(first.elapsed_total_secs, 5 * 3600);
        assert_eq!(first.expected_hours, Some(3.0));
        assert!(first.is_delayed);
        assert_eq!(first.delay_hours, Some(2.0));

        // link without hours falls back to the default
        let second = &metrics[1];
        assert_eq!(second.expected_hours, Some(2.0));
        assert!(!second.is_delayed);
        assert_eq!(second.delay_hours, Some(0.0));

        let aggregate = &metrics[2];
        assert!(aggregate.is_aggregate());
        assert_eq!(aggregate.from_reader_id, "R-MAD");
        assert_eq!(aggregate.to_reader_id, "R-BCN");
        assert_eq!(aggregate.elapsed_total_secs, 6 * 3600);
        assert_eq!(aggregate.expected_hours, Some(24.0));
        assert!(!aggregate.is_delayed);
    }

    #[test]
    fn business_time_never_exceeds_total() {
        let route = route(&[("R-MAD", at(8, 12)), ("R-BCN", at(11, 12))]);
        let metrics = calculate_time_metrics(
            &route,
            &reference(WeekdayCalendar::new(CalendarSettings::default())),
            &PipelineSettings::default(),
        );
        for metric in &metrics {
            assert!(metric.elapsed_total_secs >= 0);
            assert!(metric.elapsed_business_secs >= 0);
            assert!(metric.elapsed_business_secs <= metric.elapsed_total_secs);
        }
        // weekend excluded
        assert_eq!(metrics[1].elapsed_business_secs, 24 * 3600);
        assert!(!metrics[1].is_delayed);
    }

    #[test]
    fn dwell_legs_have_no_expectation() {
        let route = route(&[("R-HUB", at(4, 8)), ("R-HUB", at(4, 20))]);
        let metrics = calculate_time_metrics(
            &route,
            &reference(WeekdayCalendar::around_the_clock()),
            &PipelineSettings::default(),
        );
        assert_eq!(metrics[0].expected_hours, None);
        assert!(!metrics[0].is_delayed);
        assert_eq!(metrics[0].delay_hours, None);
    }

    #[test]
    fn aggregate_flags_standard_breach() {
        let route = route(&[("R-MAD", at(4, 8)), ("R-BCN", at(6, 8))]);
        let metrics = calculate_time_metrics(
            &route,
            &reference(WeekdayCalendar::around_the_clock()),
            &PipelineSettings::default(),
        );
        let aggregate = metrics.last().unwrap();
        assert!(aggregate.is_delayed);
        assert_eq!(aggregate.delay_hours, Some(24.0));
    }
}
