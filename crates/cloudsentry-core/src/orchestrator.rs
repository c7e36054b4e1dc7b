//! Configuration orchestration.
//!
//! Validates a request, then sequences topic creation, alarm generation,
//! access reconciliation, agent provisioning and dashboard generation for one
//! run. Topic, alarm and dashboard failures end the run; per-resource access
//! and provisioning failures are recorded in the result and the run goes on.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cloudsentry_config::Config;
use cloudsentry_protocols::{
    AccessOutcome, AlertingApi, ConfigurationResult, IdentityApi, ProvisionOutcome, RemoteShell,
};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::access::AccessReconciler;
use crate::catalog::ServiceCatalog;
use crate::context::CallContext;
use crate::error::ConfigureError;
use crate::generate::{
    MonitorNames, MonitoringGenerator, check_alarm_plan, dashboard_body, plan_alarms,
};
use crate::progress::{ProgressReporter, ProgressStage};
use crate::provision::AgentProvisioner;
use crate::request::ConfigureRequest;

/// A host selected for agent provisioning.
struct ProvisionTarget {
    resource_id: String,
    address: String,
    key_path: PathBuf,
}

/// Entry point for configuration runs.
pub struct Orchestrator {
    catalog: Arc<ServiceCatalog>,
    generator: MonitoringGenerator,
    access: AccessReconciler,
    provisioner: AgentProvisioner,
    call_timeout: Duration,
    max_parallel_targets: usize,
}

impl Orchestrator {
    pub fn new(
        catalog: Arc<ServiceCatalog>,
        identity: Arc<dyn IdentityApi>,
        alerting: Arc<dyn AlertingApi>,
        shell: Arc<dyn RemoteShell>,
        config: &Config,
    ) -> Self {
        Self {
            catalog,
            generator: MonitoringGenerator::new(alerting),
            access: AccessReconciler::new(identity, config.access.clone()),
            provisioner: AgentProvisioner::new(shell, config.agent.clone()),
            call_timeout: Duration::from_secs(config.cloud.call_timeout_secs),
            max_parallel_targets: config.agent.max_parallel_targets,
        }
    }

    pub fn catalog(&self) -> &Arc<ServiceCatalog> {
        &self.catalog
    }

    /// Validate a raw payload without touching any collaborator.
    pub fn validate(
        &self,
        value: &Value,
        uploaded: HashMap<String, PathBuf>,
    ) -> Result<ConfigureRequest, ConfigureError> {
        Ok(ConfigureRequest::from_value(value, &self.catalog, uploaded)?)
    }

    /// Validate a raw payload and run it.
    pub async fn configure_value(
        &self,
        value: &Value,
        uploaded: HashMap<String, PathBuf>,
        progress: &ProgressReporter,
    ) -> Result<ConfigurationResult, ConfigureError> {
        let run_id = Uuid::new_v4().to_string();
        progress.stage(&run_id, ProgressStage::Validating, "Validating request");
        let request = self.validate(value, uploaded).inspect_err(|e| {
            warn!(run_id = %run_id, "Configuration request rejected: {}", e);
        })?;
        let ctx = CallContext::new(self.call_timeout);
        self.run(run_id, request, progress, &ctx).await
    }

    /// Run an already validated request.
    pub async fn configure(
        &self,
        request: ConfigureRequest,
        progress: &ProgressReporter,
    ) -> Result<ConfigurationResult, ConfigureError> {
        self.configure_with_cancellation(request, progress, CancellationToken::new())
            .await
    }

    /// Run a request whose network calls stop once `cancel` fires.
    pub async fn configure_with_cancellation(
        &self,
        request: ConfigureRequest,
        progress: &ProgressReporter,
        cancel: CancellationToken,
    ) -> Result<ConfigurationResult, ConfigureError> {
        let run_id = Uuid::new_v4().to_string();
        progress.stage(&run_id, ProgressStage::Validating, "Request validated");
        let ctx = CallContext::with_token(self.call_timeout, cancel);
        self.run(run_id, request, progress, &ctx).await
    }

    async fn run(
        &self,
        run_id: String,
        request: ConfigureRequest,
        progress: &ProgressReporter,
        ctx: &CallContext,
    ) -> Result<ConfigurationResult, ConfigureError> {
        let span = info_span!(
            "configure",
            run_id = %run_id,
            service = %request.service.id,
            region = %request.region
        );
        let result = self
            .execute(&run_id, &request, progress, ctx)
            .instrument(span)
            .await;
        if let Err(e) = &result {
            error!(run_id = %run_id, service = %request.service.id, "Configuration failed: {}", e);
        }
        result
    }

    async fn execute(
        &self,
        run_id: &str,
        request: &ConfigureRequest,
        progress: &ProgressReporter,
        ctx: &CallContext,
    ) -> Result<ConfigurationResult, ConfigureError> {
        let service = &request.service;
        let region = request.region.as_str();
        let names = MonitorNames::derive(&service.id, &request.resource_ids());
        info!(
            resources = request.resources.len(),
            metrics = request.metrics.len(),
            alerts = request.alerts,
            "Starting configuration"
        );

        let with_alarms = request.alerts && !request.resources.is_empty();
        if with_alarms {
            check_alarm_plan(&request.resources, &request.metrics, &request.thresholds)?;
        }

        progress.stage(
            run_id,
            ProgressStage::Topic,
            format!("Creating notification topic {}", names.topic),
        );
        let topic_arn = self.generator.create_topic(region, &names, ctx).await?;

        let alarms = if with_alarms {
            progress.stage(run_id, ProgressStage::Alarms, "Creating alarms");
            let specs = plan_alarms(
                &service.dimension_key,
                &request.resources,
                &request.metrics,
                &request.thresholds,
                &topic_arn,
            )?;
            self.generator.create_alarms(region, &specs, ctx).await?
        } else {
            Vec::new()
        };

        let (access, provisioning) = if request.is_compute() {
            let access = self.reconcile_access(run_id, request, progress, ctx).await;
            let provisioning = self.provision_agents(run_id, request, progress, ctx).await;
            (access, provisioning)
        } else {
            (Vec::new(), Vec::new())
        };

        progress.stage(
            run_id,
            ProgressStage::Dashboard,
            format!("Publishing dashboard {}", names.dashboard),
        );
        let body = dashboard_body(
            &service.dimension_key,
            &request.resources,
            &request.metrics,
            region,
        );
        self.generator
            .publish_dashboard(region, &names.dashboard, &body, ctx)
            .await?;

        let dashboard_url = names.dashboard_url(region);
        progress.stage(run_id, ProgressStage::Completed, "Configuration complete");
        info!(
            alarms = alarms.len(),
            provisioned = provisioning.len(),
            dashboard = %names.dashboard,
            "Configuration complete"
        );

        Ok(ConfigurationResult {
            topic_arn,
            topic_name: names.topic,
            dashboard_name: names.dashboard,
            dashboard_url,
            alarms,
            provisioning,
            access,
        })
    }

    async fn reconcile_access(
        &self,
        run_id: &str,
        request: &ConfigureRequest,
        progress: &ProgressReporter,
        ctx: &CallContext,
    ) -> Vec<AccessOutcome> {
        let mut outcomes = Vec::with_capacity(request.resources.len());
        for resource in &request.resources {
            progress.stage(
                run_id,
                ProgressStage::Access,
                format!("Checking monitoring access for {}", resource.id),
            );
            outcomes.push(self.access.reconcile(&resource.id, &request.region, ctx).await);
        }
        outcomes
    }

    async fn provision_agents(
        &self,
        run_id: &str,
        request: &ConfigureRequest,
        progress: &ProgressReporter,
        ctx: &CallContext,
    ) -> Vec<ProvisionOutcome> {
        let targets = provision_targets(request);
        if targets.is_empty() {
            return Vec::new();
        }
        progress.stage(
            run_id,
            ProgressStage::Provisioning,
            format!("Installing monitoring agent on {} host(s)", targets.len()),
        );

        let provisioner = &self.provisioner;
        stream::iter(targets)
            .map(|target| async move {
                provisioner
                    .provision(&target.resource_id, &target.address, &target.key_path, ctx)
                    .await
            })
            .buffered(self.max_parallel_targets.max(1))
            .collect()
            .await
    }
}

/// Resources that have both an address and an uploaded credential.
fn provision_targets(request: &ConfigureRequest) -> Vec<ProvisionTarget> {
    let mut targets = Vec::new();
    for resource in &request.resources {
        let Some(address) = &resource.private_address else {
            warn!(resource_id = %resource.id, "No private address, skipping agent installation");
            continue;
        };
        let Some(key_path) = request.credential_for(&resource.id) else {
            warn!(resource_id = %resource.id, "No uploaded key, skipping agent installation");
            continue;
        };
        targets.push(ProvisionTarget {
            resource_id: resource.id.clone(),
            address: address.clone(),
            key_path: key_path.to_path_buf(),
        });
    }
    targets
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
