//! Service and metric descriptors.

use serde::{Deserialize, Serialize};

/// Placeholder standing for the resource's own identifier inside a dimension template.
pub const RESOURCE_ID_PLACEHOLDER: &str = "${aws:InstanceId}";

/// Cloud API call used to enumerate the resources of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationMethod {
    DescribeInstances,
    DescribeDbInstances,
    ListFunctions,
    ListTables,
    ListClusters,
    DescribeCacheClusters,
    DescribeLoadBalancers,
    ListQueues,
    ListBuckets,
}

impl EnumerationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DescribeInstances => "describe_instances",
            Self::DescribeDbInstances => "describe_db_instances",
            Self::ListFunctions => "list_functions",
            Self::ListTables => "list_tables",
            Self::ListClusters => "list_clusters",
            Self::DescribeCacheClusters => "describe_cache_clusters",
            Self::DescribeLoadBalancers => "describe_load_balancers",
            Self::ListQueues => "list_queues",
            Self::ListBuckets => "list_buckets",
        }
    }
}

impl std::fmt::Display for EnumerationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete metric dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Value slot of a dimension template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TemplateValue {
    /// Bound to the resource id at generation time.
    ResourceId,
    Literal(String),
}

impl From<String> for TemplateValue {
    fn from(value: String) -> Self {
        if value == RESOURCE_ID_PLACEHOLDER {
            Self::ResourceId
        } else {
            Self::Literal(value)
        }
    }
}

impl From<TemplateValue> for String {
    fn from(value: TemplateValue) -> Self {
        match value {
            TemplateValue::ResourceId => RESOURCE_ID_PLACEHOLDER.to_string(),
            TemplateValue::Literal(v) => v,
        }
    }
}

/// One entry of a metric's dimension template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionTemplate {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: TemplateValue,
}

impl DimensionTemplate {
    pub fn resource_id(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: TemplateValue::ResourceId,
        }
    }

    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: TemplateValue::Literal(value.into()),
        }
    }

    pub fn render(&self, resource_id: &str) -> Dimension {
        let value = match &self.value {
            TemplateValue::ResourceId => resource_id.to_string(),
            TemplateValue::Literal(v) => v.clone(),
        };
        Dimension::new(self.name.clone(), value)
    }
}

/// A monitorable metric of a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub name: String,
    pub namespace: String,
    /// Replaces the service dimension entirely when present.
    #[serde(
        rename = "dimensions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dimension_template: Option<Vec<DimensionTemplate>>,
}

impl MetricDescriptor {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            dimension_template: None,
        }
    }

    pub fn with_dimension_template(mut self, template: Vec<DimensionTemplate>) -> Self {
        self.dimension_template = Some(template);
        self
    }
}

/// Static description of one monitorable cloud service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub id: String,
    pub namespace: String,
    pub dimension_key: String,
    pub enumeration: EnumerationMethod,
    pub metrics: Vec<MetricDescriptor>,
}

impl ServiceDescriptor {
    /// Find a catalog metric by name.
    pub fn metric(&self, name: &str) -> Option<&MetricDescriptor> {
        self.metrics.iter().find(|m| m.name == name)
    }
}
