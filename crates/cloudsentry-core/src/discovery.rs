//! Region fan-out discovery.
//!
//! One worker per region enumerates the requested service through a
//! region-scoped client. A failing region contributes a [`RegionError`] and
//! no records; it never cancels its siblings. Every worker is joined before
//! the call returns.

use std::sync::Arc;
use std::time::Duration;

use cloudsentry_protocols::{CloudError, RegionError, ResourceDirectory, ResourceRecord};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::catalog::ServiceCatalog;
use crate::context::CallContext;
use crate::error::DiscoveryError;

/// Merged result of one discovery call.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Discovery {
    pub resources: Vec<ResourceRecord>,
    pub region_errors: Vec<RegionError>,
}

/// Concurrent cross-region discovery engine.
pub struct RegionFanout {
    directory: Arc<dyn ResourceDirectory>,
    catalog: Arc<ServiceCatalog>,
    anchor_region: String,
    call_timeout: Duration,
    max_parallel: usize,
}

impl RegionFanout {
    pub fn new(
        directory: Arc<dyn ResourceDirectory>,
        catalog: Arc<ServiceCatalog>,
        anchor_region: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            catalog,
            anchor_region: anchor_region.into(),
            call_timeout: Duration::from_secs(30),
            max_parallel: 0,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Bound concurrent region workers; 0 means one worker per region.
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }

    /// Fresh context with the configured per-call timeout.
    pub fn context(&self) -> CallContext {
        CallContext::new(self.call_timeout)
    }

    /// All regions, enumerated through the anchor region.
    pub async fn regions(&self, ctx: &CallContext) -> Result<Vec<String>, DiscoveryError> {
        ctx.run("describe_regions", self.directory.list_regions(&self.anchor_region))
            .await
            .map_err(DiscoveryError::Regions)
    }

    /// Discover every live resource of `service` across all regions.
    pub async fn discover_all(
        &self,
        service: &str,
        ctx: &CallContext,
    ) -> Result<Discovery, DiscoveryError> {
        let entry = self.catalog.entry(service)?;
        let regions = self.regions(ctx).await?;
        let service_id = entry.descriptor.id.clone();

        let permits = match self.max_parallel {
            0 => regions.len(),
            n => n.min(regions.len()),
        }
        .max(1);
        let semaphore = Arc::new(Semaphore::new(permits));
        info!(
            service = %service_id,
            regions = regions.len(),
            workers = permits,
            "Starting region fan-out"
        );

        let mut tasks = JoinSet::new();
        for (index, region) in regions.iter().cloned().enumerate() {
            let directory = self.directory.clone();
            let entry = entry.clone();
            let semaphore = semaphore.clone();
            let ctx = ctx.child();
            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        let method = entry.descriptor.enumeration;
                        match ctx
                            .run(method.as_str(), directory.enumerate(method, &region))
                            .await
                        {
                            Ok(listing) => entry.translator.translate(listing, &region),
                            Err(e) => Err(e),
                        }
                    }
                    Err(e) => Err(CloudError::Cancelled(e.to_string())),
                };
                (index, result)
            });
        }

        let mut slots: Vec<Option<Result<Vec<ResourceRecord>, String>>> = vec![None; regions.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result.map_err(|e| e.to_string())),
                Err(e) => warn!(service = %service_id, "Region worker aborted: {}", e),
            }
        }

        let mut discovery = Discovery::default();
        for (region, slot) in regions.iter().zip(slots) {
            match slot {
                Some(Ok(records)) => {
                    debug!(service = %service_id, region = %region, count = records.len(), "Region enumerated");
                    discovery.resources.extend(records);
                }
                Some(Err(message)) => {
                    warn!(service = %service_id, region = %region, "Region discovery failed: {}", message);
                    discovery.region_errors.push(RegionError::new(region, message));
                }
                None => {
                    discovery
                        .region_errors
                        .push(RegionError::new(region, "region worker did not complete"));
                }
            }
        }

        info!(
            service = %service_id,
            resources = discovery.resources.len(),
            failed_regions = discovery.region_errors.len(),
            "Region fan-out complete"
        );
        Ok(discovery)
    }
}

#[cfg(test)]
#[path = "discovery_tests.rs"]
mod tests;
