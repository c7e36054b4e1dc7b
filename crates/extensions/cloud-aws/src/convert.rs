//! SDK shapes to raw listings and back.

use std::collections::HashMap;

use cloudsentry_protocols::{
    AlarmSpec, CloudError, RawCacheCluster, RawDbInstance, RawFunction, RawInstance,
};
use tracing::warn;

pub(crate) fn instance(instance: &aws_sdk_ec2::types::Instance) -> Option<RawInstance> {
    let instance_id = instance.instance_id()?.to_string();
    let tags: HashMap<String, String> = instance
        .tags()
        .iter()
        .filter_map(|t| Some((t.key()?.to_string(), t.value()?.to_string())))
        .collect();
    Some(RawInstance {
        instance_id,
        instance_type: instance.instance_type().map(|t| t.as_str().to_string()),
        state: instance
            .state()
            .and_then(|s| s.name())
            .map(|n| n.as_str().to_string()),
        tags,
        public_ip_address: instance.public_ip_address().map(String::from),
        private_ip_address: instance.private_ip_address().map(String::from),
    })
}

pub(crate) fn db_instance(db: &aws_sdk_rds::types::DbInstance) -> Option<RawDbInstance> {
    Some(RawDbInstance {
        identifier: db.db_instance_identifier()?.to_string(),
        class: db.db_instance_class().map(String::from),
        status: db.db_instance_status().map(String::from),
        db_name: db.db_name().map(String::from),
    })
}

pub(crate) fn function(
    function: &aws_sdk_lambda::types::FunctionConfiguration,
) -> Option<RawFunction> {
    Some(RawFunction {
        name: function.function_name()?.to_string(),
        runtime: function.runtime().map(|r| r.as_str().to_string()),
        state: function.state().map(|s| s.as_str().to_string()),
    })
}

pub(crate) fn cache_cluster(
    cluster: &aws_sdk_elasticache::types::CacheCluster,
) -> Option<RawCacheCluster> {
    Some(RawCacheCluster {
        cluster_id: cluster.cache_cluster_id()?.to_string(),
        engine: cluster.engine().map(String::from),
        status: cluster.cache_cluster_status().map(String::from),
    })
}

/// Home region of a bucket from its location constraint.
///
/// An empty constraint means `us-east-1`; the legacy `EU` value means `eu-west-1`.
pub fn bucket_home_region(location_constraint: Option<&str>) -> String {
    match location_constraint.map(str::trim) {
        None | Some("") => "us-east-1".to_string(),
        Some("EU") => "eu-west-1".to_string(),
        Some(region) => region.to_string(),
    }
}

/// Names of the buckets homed in `region`.
///
/// A bucket whose home region could not be resolved is skipped so the rest of
/// the region is still listed.
pub(crate) fn buckets_in_region(
    located: Vec<(String, Result<String, CloudError>)>,
    region: &str,
) -> Vec<String> {
    located
        .into_iter()
        .filter_map(|(name, home)| match home {
            Ok(home) => (home == region).then_some(name),
            Err(e) => {
                warn!(bucket = %name, error = %e, "Skipping bucket with unknown location");
                None
            }
        })
        .collect()
}

pub(crate) fn metric_dimensions(
    alarm: &AlarmSpec,
) -> Result<Vec<aws_sdk_cloudwatch::types::Dimension>, CloudError> {
    alarm
        .dimensions
        .iter()
        .map(|d| {
            aws_sdk_cloudwatch::types::Dimension::builder()
                .name(&d.name)
                .value(&d.value)
                .build()
                .map_err(|e| CloudError::UnexpectedResponse(format!("invalid dimension: {}", e)))
        })
        .collect()
}
