//! Dimension sets for (resource, metric) pairs.

use cloudsentry_protocols::Dimension;

use crate::request::RequestedMetric;

/// Dimensions narrowing `metric` to `resource_id`.
///
/// A metric dimension template replaces the default set entirely; otherwise
/// the service's own dimension comes first, followed by the optional extra
/// dimension from the request.
pub fn resource_dimensions(
    dimension_key: &str,
    metric: &RequestedMetric,
    resource_id: &str,
) -> Vec<Dimension> {
    if let Some(template) = &metric.dimension_template {
        return template.iter().map(|t| t.render(resource_id)).collect();
    }
    let mut dimensions = vec![Dimension::new(dimension_key, resource_id)];
    if let Some(extra) = &metric.extra_dimension {
        dimensions.push(extra.clone());
    }
    dimensions
}
