//! Raw, service-shaped enumeration responses.
//!
//! Backends fill these from the cloud API; catalog translators turn them into
//! [`ResourceRecord`](super::ResourceRecord)s.

use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInstance {
    pub instance_id: String,
    pub instance_type: Option<String>,
    pub state: Option<String>,
    pub tags: HashMap<String, String>,
    pub public_ip_address: Option<String>,
    pub private_ip_address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDbInstance {
    pub identifier: String,
    pub class: Option<String>,
    pub status: Option<String>,
    pub db_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFunction {
    pub name: String,
    pub runtime: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCacheCluster {
    pub cluster_id: String,
    pub engine: Option<String>,
    pub status: Option<String>,
}

/// Response of one [`EnumerationMethod`](super::EnumerationMethod) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Instances(Vec<RawInstance>),
    DbInstances(Vec<RawDbInstance>),
    Functions(Vec<RawFunction>),
    TableNames(Vec<String>),
    ClusterArns(Vec<String>),
    CacheClusters(Vec<RawCacheCluster>),
    LoadBalancerNames(Vec<String>),
    QueueUrls(Vec<String>),
    BucketNames(Vec<String>),
}

impl Listing {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Instances(_) => "instances",
            Self::DbInstances(_) => "db_instances",
            Self::Functions(_) => "functions",
            Self::TableNames(_) => "table_names",
            Self::ClusterArns(_) => "cluster_arns",
            Self::CacheClusters(_) => "cache_clusters",
            Self::LoadBalancerNames(_) => "load_balancer_names",
            Self::QueueUrls(_) => "queue_urls",
            Self::BucketNames(_) => "bucket_names",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Instances(v) => v.len(),
            Self::DbInstances(v) => v.len(),
            Self::Functions(v) => v.len(),
            Self::CacheClusters(v) => v.len(),
            Self::TableNames(v)
            | Self::ClusterArns(v)
            | Self::LoadBalancerNames(v)
            | Self::QueueUrls(v)
            | Self::BucketNames(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
