//! Per-service response translators.

use cloudsentry_protocols::{CloudError, Listing, ResourceRecord};

use super::ResponseTranslator;

const ACTIVE: &str = "Active";

fn mismatch(expected: &str, found: &str) -> CloudError {
    CloudError::UnexpectedResponse(format!("expected {} listing, got {}", expected, found))
}

/// EC2 instances; only running instances are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstanceTranslator;

impl ResponseTranslator for InstanceTranslator {
    fn translate(&self, listing: Listing, region: &str) -> Result<Vec<ResourceRecord>, CloudError> {
        let found = listing.kind();
        let Listing::Instances(instances) = listing else {
            return Err(mismatch("instances", found));
        };
        Ok(instances
            .into_iter()
            .filter(|i| i.state.as_deref() == Some("running"))
            .map(|i| {
                let name = i
                    .tags
                    .get("Name")
                    .cloned()
                    .unwrap_or_else(|| "Unnamed".to_string());
                ResourceRecord::new(
                    i.instance_id,
                    i.instance_type.unwrap_or_default(),
                    "running",
                    name,
                    region,
                )
                .with_addresses(i.public_ip_address, i.private_ip_address)
            })
            .collect())
    }
}

/// RDS database instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct DbInstanceTranslator;

impl ResponseTranslator for DbInstanceTranslator {
    fn translate(&self, listing: Listing, region: &str) -> Result<Vec<ResourceRecord>, CloudError> {
        let found = listing.kind();
        let Listing::DbInstances(instances) = listing else {
            return Err(mismatch("db_instances", found));
        };
        Ok(instances
            .into_iter()
            .map(|db| {
                let name = db.db_name.unwrap_or_else(|| db.identifier.clone());
                ResourceRecord::new(
                    db.identifier,
                    db.class.unwrap_or_default(),
                    db.status.unwrap_or_default(),
                    name,
                    region,
                )
            })
            .collect())
    }
}

/// Lambda functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct FunctionTranslator;

impl ResponseTranslator for FunctionTranslator {
    fn translate(&self, listing: Listing, region: &str) -> Result<Vec<ResourceRecord>, CloudError> {
        let found = listing.kind();
        let Listing::Functions(functions) = listing else {
            return Err(mismatch("functions", found));
        };
        Ok(functions
            .into_iter()
            .map(|f| {
                ResourceRecord::new(
                    f.name.clone(),
                    f.runtime.unwrap_or_default(),
                    f.state.unwrap_or_else(|| ACTIVE.to_string()),
                    f.name,
                    region,
                )
            })
            .collect())
    }
}

/// ElastiCache clusters.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheClusterTranslator;

impl ResponseTranslator for CacheClusterTranslator {
    fn translate(&self, listing: Listing, region: &str) -> Result<Vec<ResourceRecord>, CloudError> {
        let found = listing.kind();
        let Listing::CacheClusters(clusters) = listing else {
            return Err(mismatch("cache_clusters", found));
        };
        Ok(clusters
            .into_iter()
            .map(|c| {
                ResourceRecord::new(
                    c.cluster_id.clone(),
                    c.engine.unwrap_or_default(),
                    c.status.unwrap_or_default(),
                    c.cluster_id,
                    region,
                )
            })
            .collect())
    }
}

/// How a resource id is derived from a listed string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// The string is the name.
    Plain,
    /// The name is the last `/`-separated segment of an ARN or URL.
    LastPathSegment,
}

impl NameSource {
    fn extract(&self, value: &str) -> String {
        match self {
            Self::Plain => value.to_string(),
            Self::LastPathSegment => value.rsplit('/').next().unwrap_or(value).to_string(),
        }
    }
}

/// Services whose listing is a bare list of names, ARNs or URLs.
#[derive(Debug, Clone)]
pub struct NamedResourceTranslator {
    listing_kind: &'static str,
    resource_type: &'static str,
    source: NameSource,
}

impl NamedResourceTranslator {
    pub fn new(listing_kind: &'static str, resource_type: &'static str, source: NameSource) -> Self {
        Self {
            listing_kind,
            resource_type,
            source,
        }
    }
}

impl ResponseTranslator for NamedResourceTranslator {
    fn translate(&self, listing: Listing, region: &str) -> Result<Vec<ResourceRecord>, CloudError> {
        if listing.kind() != self.listing_kind {
            return Err(mismatch(self.listing_kind, listing.kind()));
        }
        let values = match listing {
            Listing::TableNames(v)
            | Listing::ClusterArns(v)
            | Listing::LoadBalancerNames(v)
            | Listing::QueueUrls(v)
            | Listing::BucketNames(v) => v,
            other => return Err(mismatch(self.listing_kind, other.kind())),
        };
        Ok(values
            .iter()
            .map(|value| {
                let name = self.source.extract(value);
                ResourceRecord::new(name.clone(), self.resource_type, ACTIVE, name, region)
            })
            .collect())
    }
}
