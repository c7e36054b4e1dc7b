//! Region enumeration and per-service resource listing.

use async_trait::async_trait;
use cloudsentry_protocols::{CloudError, EnumerationMethod, Listing, ResourceDirectory};
use tracing::debug;

use crate::AwsCloud;
use crate::convert;
use crate::error::sdk_error;

#[async_trait]
impl ResourceDirectory for AwsCloud {
    async fn list_regions(&self, anchor_region: &str) -> Result<Vec<String>, CloudError> {
        let output = self
            .ec2(anchor_region)
            .describe_regions()
            .send()
            .await
            .map_err(sdk_error("DescribeRegions"))?;
        Ok(output
            .regions()
            .iter()
            .filter_map(|r| r.region_name().map(String::from))
            .collect())
    }

    async fn enumerate(
        &self,
        method: EnumerationMethod,
        region: &str,
    ) -> Result<Listing, CloudError> {
        debug!(method = %method, region, "Enumerating resources");
        match method {
            EnumerationMethod::DescribeInstances => self.describe_instances(region).await,
            EnumerationMethod::DescribeDbInstances => self.describe_db_instances(region).await,
            EnumerationMethod::ListFunctions => self.list_functions(region).await,
            EnumerationMethod::ListTables => self.list_tables(region).await,
            EnumerationMethod::ListClusters => self.list_clusters(region).await,
            EnumerationMethod::DescribeCacheClusters => self.describe_cache_clusters(region).await,
            EnumerationMethod::DescribeLoadBalancers => self.describe_load_balancers(region).await,
            EnumerationMethod::ListQueues => self.list_queues(region).await,
            EnumerationMethod::ListBuckets => self.list_buckets(region).await,
        }
    }
}

impl AwsCloud {
    async fn describe_instances(&self, region: &str) -> Result<Listing, CloudError> {
        let pages = self
            .ec2(region)
            .describe_instances()
            .into_paginator()
            .send()
            .try_collect()
            .await
            .map_err(sdk_error("DescribeInstances"))?;
        Ok(Listing::Instances(
            pages
                .iter()
                .flat_map(|p| p.reservations())
                .flat_map(|r| r.instances())
                .filter_map(convert::instance)
                .collect(),
        ))
    }

    async fn describe_db_instances(&self, region: &str) -> Result<Listing, CloudError> {
        let pages = self
            .rds(region)
            .describe_db_instances()
            .into_paginator()
            .send()
            .try_collect()
            .await
            .map_err(sdk_error("DescribeDBInstances"))?;
        Ok(Listing::DbInstances(
            pages
                .iter()
                .flat_map(|p| p.db_instances())
                .filter_map(convert::db_instance)
                .collect(),
        ))
    }

    async fn list_functions(&self, region: &str) -> Result<Listing, CloudError> {
        let pages = self
            .lambda(region)
            .list_functions()
            .into_paginator()
            .send()
            .try_collect()
            .await
            .map_err(sdk_error("ListFunctions"))?;
        Ok(Listing::Functions(
            pages
                .iter()
                .flat_map(|p| p.functions())
                .filter_map(convert::function)
                .collect(),
        ))
    }

    async fn list_tables(&self, region: &str) -> Result<Listing, CloudError> {
        let pages = self
            .dynamodb(region)
            .list_tables()
            .into_paginator()
            .send()
            .try_collect()
            .await
            .map_err(sdk_error("ListTables"))?;
        Ok(Listing::TableNames(
            pages
                .iter()
                .flat_map(|p| p.table_names())
                .cloned()
                .collect(),
        ))
    }

    async fn list_clusters(&self, region: &str) -> Result<Listing, CloudError> {
        let pages = self
            .ecs(region)
            .list_clusters()
            .into_paginator()
            .send()
            .try_collect()
            .await
            .map_err(sdk_error("ListClusters"))?;
        Ok(Listing::ClusterArns(
            pages
                .iter()
                .flat_map(|p| p.cluster_arns())
                .cloned()
                .collect(),
        ))
    }

    async fn describe_cache_clusters(&self, region: &str) -> Result<Listing, CloudError> {
        let pages = self
            .elasticache(region)
            .describe_cache_clusters()
            .into_paginator()
            .send()
            .try_collect()
            .await
            .map_err(sdk_error("DescribeCacheClusters"))?;
        Ok(Listing::CacheClusters(
            pages
                .iter()
                .flat_map(|p| p.cache_clusters())
                .filter_map(convert::cache_cluster)
                .collect(),
        ))
    }

    async fn describe_load_balancers(&self, region: &str) -> Result<Listing, CloudError> {
        let pages = self
            .elb(region)
            .describe_load_balancers()
            .into_paginator()
            .send()
            .try_collect()
            .await
            .map_err(sdk_error("DescribeLoadBalancers"))?;
        Ok(Listing::LoadBalancerNames(
            pages
                .iter()
                .flat_map(|p| p.load_balancer_descriptions())
                .filter_map(|lb| lb.load_balancer_name().map(String::from))
                .collect(),
        ))
    }

    async fn list_queues(&self, region: &str) -> Result<Listing, CloudError> {
        let pages = self
            .sqs(region)
            .list_queues()
            .into_paginator()
            .send()
            .try_collect()
            .await
            .map_err(sdk_error("ListQueues"))?;
        Ok(Listing::QueueUrls(
            pages
                .iter()
                .flat_map(|p| p.queue_urls())
                .cloned()
                .collect(),
        ))
    }

    /// Buckets whose home region is `region`.
    ///
    /// The bucket list is global, so each bucket is attributed to a single
    /// region. The region reported by `ListBuckets` is used when present;
    /// otherwise the location constraint is looked up per bucket.
    async fn list_buckets(&self, region: &str) -> Result<Listing, CloudError> {
        let client = self.s3(region);
        let output = client
            .list_buckets()
            .send()
            .await
            .map_err(sdk_error("ListBuckets"))?;

        let mut located = Vec::new();
        for bucket in output.buckets() {
            let Some(name) = bucket.name() else {
                continue;
            };
            let home = match bucket.bucket_region() {
                Some(home) => Ok(home.to_string()),
                None => client
                    .get_bucket_location()
                    .bucket(name)
                    .send()
                    .await
                    .map(|location| {
                        convert::bucket_home_region(
                            location.location_constraint().map(|c| c.as_str()),
                        )
                    })
                    .map_err(sdk_error("GetBucketLocation")),
            };
            located.push((name.to_string(), home));
        }
        Ok(Listing::BucketNames(convert::buckets_in_region(located, region)))
    }
}
