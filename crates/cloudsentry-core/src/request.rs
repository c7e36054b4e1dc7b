//! Configuration request validation.
//!
//! Loosely-typed request payloads are checked in one exhaustive pass and
//! turned into strongly-typed values; every problem is reported together.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use cloudsentry_protocols::{
    Dimension, DimensionTemplate, ServiceDescriptor, ThresholdPair, ValidationError,
    ValidationErrors,
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::catalog::ServiceCatalog;
use crate::generate::{alarm_name_collisions, missing_thresholds};

/// Fields every request must carry.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "region",
    "service",
    "resources",
    "metrics",
    "alerts",
    "thresholds",
];

/// Service whose resources get identity reconciliation and agent provisioning.
pub const COMPUTE_SERVICE: &str = "EC2";

/// A resource selected for monitoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedResource {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_address: Option<String>,
}

/// A metric selected for monitoring, resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestedMetric {
    pub name: String,
    pub namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension_template: Option<Vec<DimensionTemplate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_dimension: Option<Dimension>,
}

/// A validated configuration request.
#[derive(Debug, Clone)]
pub struct ConfigureRequest {
    pub region: String,
    pub service: ServiceDescriptor,
    pub resources: Vec<RequestedResource>,
    pub metrics: Vec<RequestedMetric>,
    pub alerts: bool,
    pub thresholds: HashMap<String, ThresholdPair>,
    /// Credential files keyed by `key_<resource id>`.
    pub uploaded_credentials: HashMap<String, PathBuf>,
}

impl ConfigureRequest {
    /// Validate a JSON payload.
    ///
    /// `uploaded` holds credential files received out of band (multipart
    /// uploads); they override same-named `uploadedCredentials` entries.
    pub fn from_value(
        value: &Value,
        catalog: &ServiceCatalog,
        uploaded: HashMap<String, PathBuf>,
    ) -> Result<Self, ValidationErrors> {
        let Some(obj) = value.as_object() else {
            return Err(ValidationErrors::single(ValidationError::new(
                "request",
                "No data provided",
            )));
        };

        let mut errors = ValidationErrors::new();
        for field in REQUIRED_FIELDS {
            if obj.get(field).is_none_or(Value::is_null) {
                errors.push(ValidationError::missing(field));
            }
        }

        let region = match obj.get("region") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Null) | None => None,
            Some(_) => {
                errors.push(ValidationError::new(
                    "region",
                    "region must be a non-empty string",
                ));
                None
            }
        };

        let service = match obj.get("service") {
            Some(Value::String(name)) => match catalog.lookup(name) {
                Ok(descriptor) => Some(descriptor.clone()),
                Err(e) => {
                    errors.push(ValidationError::new("service", e.to_string()));
                    None
                }
            },
            Some(Value::Null) | None => None,
            Some(_) => {
                errors.push(ValidationError::new("service", "service must be a string"));
                None
            }
        };

        let resources = parse_resources(obj.get("resources"), &mut errors);
        let metrics = parse_metrics(obj.get("metrics"), service.as_ref(), &mut errors);

        let alerts = match obj.get("alerts") {
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::Null) | None => None,
            Some(_) => {
                errors.push(ValidationError::new("alerts", "alerts must be a boolean"));
                None
            }
        };

        let thresholds = parse_thresholds(obj.get("thresholds"), &mut errors);
        if alerts == Some(true) {
            errors.errors.extend(missing_thresholds(&metrics, &thresholds));
            errors.errors.extend(alarm_name_collisions(&resources, &metrics));
        }

        let mut uploaded_credentials = parse_credentials(obj, &mut errors);
        uploaded_credentials.extend(uploaded);

        match (region, service, alerts) {
            (Some(region), Some(service), Some(alerts)) if errors.is_empty() => Ok(Self {
                region,
                service,
                resources,
                metrics,
                alerts,
                thresholds,
                uploaded_credentials,
            }),
            _ => Err(errors),
        }
    }

    /// Upload field name carrying the credential for a resource.
    pub fn credential_key(resource_id: &str) -> String {
        format!("key_{}", resource_id)
    }

    pub fn credential_for(&self, resource_id: &str) -> Option<&Path> {
        self.uploaded_credentials
            .get(&Self::credential_key(resource_id))
            .map(PathBuf::as_path)
    }

    pub fn resource_ids(&self) -> Vec<&str> {
        self.resources.iter().map(|r| r.id.as_str()).collect()
    }

    /// Whether this request targets the compute service.
    pub fn is_compute(&self) -> bool {
        self.service.id == COMPUTE_SERVICE
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_resources(value: Option<&Value>, errors: &mut ValidationErrors) -> Vec<RequestedResource> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => return Vec::new(),
        Some(_) => {
            errors.push(ValidationError::new("resources", "resources must be a list"));
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut resources = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let field = format!("resources[{}].id", i);
        let resource = match item {
            Value::String(id) if !id.trim().is_empty() => RequestedResource {
                id: id.trim().to_string(),
                display_id: None,
                private_address: None,
            },
            Value::Object(obj) => match str_field(obj, &["id", "Id"]) {
                Some(id) => RequestedResource {
                    id: id.to_string(),
                    display_id: str_field(obj, &["displayId", "Name", "name"]).map(String::from),
                    private_address: str_field(obj, &["privateAddress", "PrivateIpAddress"])
                        .map(String::from),
                },
                None => {
                    errors.push(ValidationError::missing(field));
                    continue;
                }
            },
            _ => {
                errors.push(ValidationError::new(
                    field,
                    "resource must be an id or an object with an id",
                ));
                continue;
            }
        };
        if !seen.insert(resource.id.clone()) {
            errors.push(ValidationError::new(
                field,
                format!("Duplicate resource id: {}", resource.id),
            ));
            continue;
        }
        resources.push(resource);
    }
    resources
}

fn parse_metrics(
    value: Option<&Value>,
    service: Option<&ServiceDescriptor>,
    errors: &mut ValidationErrors,
) -> Vec<RequestedMetric> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => return Vec::new(),
        Some(_) => {
            errors.push(ValidationError::new("metrics", "metrics must be a list"));
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut metrics = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let (name, namespace, extra_dimension) = match item {
            Value::String(name) => (name.trim(), None, None),
            Value::Object(obj) => {
                let extra = match obj.get("dimension") {
                    None | Some(Value::Null) => None,
                    Some(Value::Object(dim)) => match (
                        str_field(dim, &["Name", "name"]),
                        str_field(dim, &["Value", "value"]),
                    ) {
                        (Some(n), Some(v)) => Some(Dimension::new(n, v)),
                        _ => {
                            errors.push(ValidationError::new(
                                format!("metrics[{}].dimension", i),
                                "dimension requires Name and Value",
                            ));
                            None
                        }
                    },
                    Some(_) => {
                        errors.push(ValidationError::new(
                            format!("metrics[{}].dimension", i),
                            "dimension must be an object",
                        ));
                        None
                    }
                };
                (
                    str_field(obj, &["name", "Name"]).unwrap_or(""),
                    str_field(obj, &["namespace", "Namespace"]),
                    extra,
                )
            }
            _ => ("", None, None),
        };

        if name.is_empty() {
            errors.push(ValidationError::missing(format!("metrics[{}].name", i)));
            continue;
        }
        if !seen.insert(name.to_string()) {
            errors.push(ValidationError::new(
                format!("metrics[{}].name", i),
                format!("Duplicate metric: {}", name),
            ));
            continue;
        }

        let known = service.and_then(|s| s.metric(name));
        let Some(namespace) = namespace.or(known.map(|m| m.namespace.as_str())) else {
            // Without a resolved service the namespace error would be noise.
            if service.is_some() {
                errors.push(ValidationError::new(
                    format!("metrics[{}].namespace", i),
                    format!("Missing namespace for metric: {}", name),
                ));
            }
            continue;
        };
        let dimension_template = known
            .filter(|m| m.namespace == namespace)
            .and_then(|m| m.dimension_template.clone());

        metrics.push(RequestedMetric {
            name: name.to_string(),
            namespace: namespace.to_string(),
            dimension_template,
            extra_dimension,
        });
    }
    metrics
}

fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn parse_thresholds(
    value: Option<&Value>,
    errors: &mut ValidationErrors,
) -> HashMap<String, ThresholdPair> {
    let entries = match value {
        Some(Value::Object(entries)) => entries,
        Some(Value::Null) | None => return HashMap::new(),
        Some(_) => {
            errors.push(ValidationError::new(
                "thresholds",
                "thresholds must be an object keyed by metric name",
            ));
            return HashMap::new();
        }
    };

    let mut thresholds = HashMap::with_capacity(entries.len());
    for (metric, pair) in entries {
        let warning = number(pair.get("warning"));
        let critical = number(pair.get("critical"));
        match (warning, critical) {
            (Some(warning), Some(critical)) => {
                thresholds.insert(metric.clone(), ThresholdPair::new(warning, critical));
            }
            _ => errors.push(ValidationError::new(
                format!("thresholds.{}", metric),
                format!(
                    "Thresholds for {} need numeric warning and critical values",
                    metric
                ),
            )),
        }
    }
    thresholds
}

fn parse_credentials(
    obj: &Map<String, Value>,
    errors: &mut ValidationErrors,
) -> HashMap<String, PathBuf> {
    let entries = match obj.get("uploadedCredentials").or_else(|| obj.get("uploaded_keys")) {
        Some(Value::Object(entries)) => entries,
        Some(Value::Null) | None => return HashMap::new(),
        Some(_) => {
            errors.push(ValidationError::new(
                "uploadedCredentials",
                "uploadedCredentials must be an object of file paths",
            ));
            return HashMap::new();
        }
    };
    entries
        .iter()
        .filter_map(|(key, path)| path.as_str().map(|p| (key.clone(), PathBuf::from(p))))
        .collect()
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
