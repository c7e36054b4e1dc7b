//! Alarm planning.

use std::collections::{HashMap, HashSet};

use cloudsentry_protocols::{AlarmSpec, Severity, ThresholdPair, ValidationError, ValidationErrors};

use super::dimensions::resource_dimensions;
use super::naming::alarm_name;
use crate::request::{RequestedMetric, RequestedResource};

pub const ALARM_STATISTIC: &str = "Average";
pub const ALARM_PERIOD_SECS: i32 = 300;
pub const ALARM_EVALUATION_PERIODS: i32 = 2;
pub const ALARM_COMPARISON: &str = "GreaterThanThreshold";

/// Errors for requested metrics without a threshold pair.
pub fn missing_thresholds(
    metrics: &[RequestedMetric],
    thresholds: &HashMap<String, ThresholdPair>,
) -> Vec<ValidationError> {
    metrics
        .iter()
        .filter(|m| !thresholds.contains_key(&m.name))
        .map(|m| {
            ValidationError::new(
                format!("thresholds.{}", m.name),
                format!("Missing thresholds for metric: {}", m.name),
            )
        })
        .collect()
}

/// Errors for (resource, metric) pairs whose derived alarm names coincide,
/// e.g. resource `a-b` with metric `c` and resource `a` with metric `b-c`.
pub fn alarm_name_collisions(
    resources: &[RequestedResource],
    metrics: &[RequestedMetric],
) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();
    for resource in resources {
        for metric in metrics {
            let name = alarm_name(&resource.id, &metric.name, Severity::Warning);
            if !seen.insert(name.clone()) {
                errors.push(ValidationError::new(
                    "resources",
                    format!("Duplicate alarm name: {}", name),
                ));
            }
        }
    }
    errors
}

/// Everything that would make [`plan_alarms`] fail, checked before any
/// side effect.
pub fn check_alarm_plan(
    resources: &[RequestedResource],
    metrics: &[RequestedMetric],
    thresholds: &HashMap<String, ThresholdPair>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.errors.extend(missing_thresholds(metrics, thresholds));
    errors.errors.extend(alarm_name_collisions(resources, metrics));
    errors.into_result()
}

/// Two alarms (warning, then critical) per (resource, metric) pair.
///
/// Fails without producing anything when a metric has no threshold pair or
/// two pairs would derive the same alarm name.
pub fn plan_alarms(
    dimension_key: &str,
    resources: &[RequestedResource],
    metrics: &[RequestedMetric],
    thresholds: &HashMap<String, ThresholdPair>,
    topic_arn: &str,
) -> Result<Vec<AlarmSpec>, ValidationErrors> {
    check_alarm_plan(resources, metrics, thresholds)?;

    let mut alarms = Vec::with_capacity(resources.len() * metrics.len() * 2);
    for resource in resources {
        for metric in metrics {
            let Some(pair) = thresholds.get(&metric.name) else {
                continue;
            };
            let dimensions = resource_dimensions(dimension_key, metric, &resource.id);
            for severity in Severity::ALL {
                alarms.push(AlarmSpec {
                    name: alarm_name(&resource.id, &metric.name, severity),
                    metric_name: metric.name.clone(),
                    namespace: metric.namespace.clone(),
                    statistic: ALARM_STATISTIC.to_string(),
                    period_secs: ALARM_PERIOD_SECS,
                    evaluation_periods: ALARM_EVALUATION_PERIODS,
                    threshold: pair.for_severity(severity),
                    comparison_operator: ALARM_COMPARISON.to_string(),
                    alarm_actions: vec![topic_arn.to_string()],
                    ok_actions: vec![topic_arn.to_string()],
                    dimensions: dimensions.clone(),
                    description: format!(
                        "{} threshold exceeded for {} on {}",
                        severity, metric.name, resource.id
                    ),
                    severity,
                });
            }
        }
    }
    Ok(alarms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudsentry_protocols::Dimension;

    const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:EC2_Monitoring_Alerts_i-1";

    fn resource(id: &str) -> RequestedResource {
        RequestedResource {
            id: id.to_string(),
            display_id: None,
            private_address: None,
        }
    }

    fn metric(name: &str) -> RequestedMetric {
        RequestedMetric {
            name: name.to_string(),
            namespace: "AWS/EC2".to_string(),
            dimension_template: None,
            extra_dimension: None,
        }
    }

    fn thresholds(names: &[&str]) -> HashMap<String, ThresholdPair> {
        names
            .iter()
            .map(|n| (n.to_string(), ThresholdPair::new(70.0, 90.0)))
            .collect()
    }

    #[test]
    fn test_cross_product_count_and_uniqueness() {
        let resources: Vec<_> = ["i-1", "i-2", "i-3"].iter().map(|id| resource(id)).collect();
        let metrics = vec![metric("CPUUtilization"), metric("NetworkIn")];
        let alarms = plan_alarms(
            "InstanceId",
            &resources,
            &metrics,
            &thresholds(&["CPUUtilization", "NetworkIn"]),
            TOPIC,
        )
        .unwrap();

        assert_eq!(alarms.len(), 2 * 3 * 2);
        let names: HashSet<_> = alarms.iter().map(|a| a.name.clone()).collect();
        assert_eq!(names.len(), alarms.len());
    }

    #[test]
    fn test_warning_precedes_critical() {
        let alarms = plan_alarms(
            "InstanceId",
            &[resource("i-1")],
            &[metric("CPUUtilization")],
            &thresholds(&["CPUUtilization"]),
            TOPIC,
        )
        .unwrap();

        assert_eq!(alarms[0].name, "i-1-CPUUtilization-Warning");
        assert_eq!(alarms[0].threshold, 70.0);
        assert_eq!(alarms[1].name, "i-1-CPUUtilization-Critical");
        assert_eq!(alarms[1].threshold, 90.0);
    }

    #[test]
    fn test_alarm_parameters() {
        let alarms = plan_alarms(
            "InstanceId",
            &[resource("i-1")],
            &[metric("CPUUtilization")],
            &thresholds(&["CPUUtilization"]),
            TOPIC,
        )
        .unwrap();

        let alarm = &alarms[0];
        assert_eq!(alarm.statistic, "Average");
        assert_eq!(alarm.period_secs, 300);
        assert_eq!(alarm.evaluation_periods, 2);
        assert_eq!(alarm.comparison_operator, "GreaterThanThreshold");
        assert_eq!(alarm.alarm_actions, vec![TOPIC.to_string()]);
        assert_eq!(alarm.ok_actions, vec![TOPIC.to_string()]);
        assert_eq!(alarm.dimensions, vec![Dimension::new("InstanceId", "i-1")]);
        assert_eq!(
            alarm.description,
            "Warning threshold exceeded for CPUUtilization on i-1"
        );
    }

    #[test]
    fn test_missing_threshold_fails_whole_plan() {
        let err = plan_alarms(
            "InstanceId",
            &[resource("i-1")],
            &[metric("CPUUtilization"), metric("NetworkOut")],
            &thresholds(&["CPUUtilization"]),
            TOPIC,
        )
        .unwrap_err();

        assert_eq!(err.len(), 1);
        assert!(err.contains_field("thresholds.NetworkOut"));
    }

    #[test]
    fn test_colliding_resource_ids_rejected() {
        let err = plan_alarms(
            "InstanceId",
            &[resource("i-1"), resource("i-1")],
            &[metric("CPUUtilization")],
            &thresholds(&["CPUUtilization"]),
            TOPIC,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate alarm name: i-1-CPUUtilization-Warning"));
    }

    #[test]
    fn test_hyphen_ambiguous_names_rejected() {
        let err = plan_alarms(
            "InstanceId",
            &[resource("a-b"), resource("a")],
            &[metric("c"), metric("b-c")],
            &thresholds(&["c", "b-c"]),
            TOPIC,
        )
        .unwrap_err();
        assert_eq!(err.len(), 1);
        assert!(err.to_string().contains("Duplicate alarm name: a-b-c-Warning"));
    }

    #[test]
    fn test_missing_threshold_and_collision_reported_together() {
        let err = plan_alarms(
            "InstanceId",
            &[resource("i-1"), resource("i-1")],
            &[metric("CPUUtilization"), metric("NetworkOut")],
            &thresholds(&["CPUUtilization"]),
            TOPIC,
        )
        .unwrap_err();
        assert!(err.contains_field("thresholds.NetworkOut"));
        assert!(err.contains_field("resources"));
    }

    #[test]
    fn test_empty_resources_yield_no_alarms() {
        let alarms = plan_alarms(
            "InstanceId",
            &[],
            &[metric("CPUUtilization")],
            &thresholds(&["CPUUtilization"]),
            TOPIC,
        )
        .unwrap();
        assert!(alarms.is_empty());
    }
}
