//! Dashboard body generation.

use serde_json::{Value, json};

use super::dimensions::resource_dimensions;
use crate::request::{RequestedMetric, RequestedResource};

pub const WIDGET_WIDTH: u32 = 24;
pub const WIDGET_HEIGHT: u32 = 6;
pub const WIDGET_PERIOD_SECS: u32 = 300;

/// One metric widget per metric, stacked vertically in request order.
pub fn dashboard_body(
    dimension_key: &str,
    resources: &[RequestedResource],
    metrics: &[RequestedMetric],
    region: &str,
) -> Value {
    let widgets: Vec<Value> = metrics
        .iter()
        .enumerate()
        .map(|(index, metric)| {
            let mut rows = vec![json!([metric.namespace, metric.name])];
            for resource in resources {
                let mut row = vec![
                    Value::String(metric.namespace.clone()),
                    Value::String(metric.name.clone()),
                ];
                for dimension in resource_dimensions(dimension_key, metric, &resource.id) {
                    row.push(Value::String(dimension.name));
                    row.push(Value::String(dimension.value));
                }
                rows.push(Value::Array(row));
            }
            json!({
                "type": "metric",
                "x": 0,
                "y": index as u32 * WIDGET_HEIGHT,
                "width": WIDGET_WIDTH,
                "height": WIDGET_HEIGHT,
                "properties": {
                    "metrics": rows,
                    "period": WIDGET_PERIOD_SECS,
                    "stat": "Average",
                    "region": region,
                    "title": format!("{} across {} instances", metric.name, resources.len()),
                }
            })
        })
        .collect();
    json!({ "widgets": widgets })
}
