//! Notification topic, alarm and dashboard generation.

mod alarms;
mod dashboard;
mod dimensions;
mod naming;

use std::collections::HashMap;
use std::sync::Arc;

use cloudsentry_protocols::{AlarmSpec, AlertingApi, ServiceDescriptor, ThresholdPair};
use tracing::{debug, info};

pub use alarms::{
    ALARM_COMPARISON, ALARM_EVALUATION_PERIODS, ALARM_PERIOD_SECS, ALARM_STATISTIC,
    alarm_name_collisions, check_alarm_plan, missing_thresholds, plan_alarms,
};
pub use dashboard::{WIDGET_HEIGHT, WIDGET_PERIOD_SECS, WIDGET_WIDTH, dashboard_body};
pub use dimensions::resource_dimensions;
pub use naming::{MonitorNames, alarm_name};

use crate::context::CallContext;
use crate::error::{ConfigureError, GenerationError};
use crate::request::{RequestedMetric, RequestedResource};

/// Everything one generation pass produced.
#[derive(Debug, Clone)]
pub struct GeneratedMonitoring {
    pub topic_arn: String,
    pub names: MonitorNames,
    pub alarms: Vec<String>,
    pub dashboard_body: String,
}

/// Upserts topics, alarms and dashboards through an [`AlertingApi`].
pub struct MonitoringGenerator {
    alerting: Arc<dyn AlertingApi>,
}

impl MonitoringGenerator {
    pub fn new(alerting: Arc<dyn AlertingApi>) -> Self {
        Self { alerting }
    }

    /// Create (or reuse) the notification topic; returns its ARN.
    pub async fn create_topic(
        &self,
        region: &str,
        names: &MonitorNames,
        ctx: &CallContext,
    ) -> Result<String, GenerationError> {
        let arn = ctx
            .run("create_topic", self.alerting.create_topic(region, &names.topic))
            .await
            .map_err(GenerationError::Topic)?;
        info!(topic = %names.topic, region, "Notification topic ready");
        Ok(arn)
    }

    /// Put alarms in order, stopping at the first failure.
    pub async fn create_alarms(
        &self,
        region: &str,
        alarms: &[AlarmSpec],
        ctx: &CallContext,
    ) -> Result<Vec<String>, GenerationError> {
        let mut created = Vec::with_capacity(alarms.len());
        for alarm in alarms {
            ctx.run("put_metric_alarm", self.alerting.put_alarm(region, alarm))
                .await
                .map_err(|source| GenerationError::Alarm {
                    name: alarm.name.clone(),
                    source,
                })?;
            debug!(alarm = %alarm.name, "Alarm upserted");
            created.push(alarm.name.clone());
        }
        info!(count = created.len(), region, "Alarms upserted");
        Ok(created)
    }

    /// Put the dashboard body under `name`; returns the encoded body.
    pub async fn publish_dashboard(
        &self,
        region: &str,
        name: &str,
        body: &serde_json::Value,
        ctx: &CallContext,
    ) -> Result<String, GenerationError> {
        let encoded =
            serde_json::to_string(body).map_err(|e| GenerationError::DashboardBody(e.to_string()))?;
        ctx.run("put_dashboard", self.alerting.put_dashboard(region, name, &encoded))
            .await
            .map_err(GenerationError::Dashboard)?;
        info!(dashboard = %name, region, "Dashboard upserted");
        Ok(encoded)
    }

    /// Topic, alarms (when `alerts` is set) and dashboard in one call.
    ///
    /// Convenience entry point for callers with nothing to run between the
    /// alarms and the dashboard. [`crate::Orchestrator`] drives the step
    /// methods itself so access reconciliation and provisioning fit in
    /// between. The alarm plan is checked before the topic is created.
    #[allow(clippy::too_many_arguments)]
    pub async fn generate(
        &self,
        service: &ServiceDescriptor,
        region: &str,
        resources: &[RequestedResource],
        metrics: &[RequestedMetric],
        thresholds: &HashMap<String, ThresholdPair>,
        alerts: bool,
        ctx: &CallContext,
    ) -> Result<GeneratedMonitoring, ConfigureError> {
        let ids: Vec<&str> = resources.iter().map(|r| r.id.as_str()).collect();
        let names = MonitorNames::derive(&service.id, &ids);
        let with_alarms = alerts && !resources.is_empty();
        if with_alarms {
            check_alarm_plan(resources, metrics, thresholds)?;
        }

        let topic_arn = self.create_topic(region, &names, ctx).await?;

        let alarms = if with_alarms {
            let specs = plan_alarms(&service.dimension_key, resources, metrics, thresholds, &topic_arn)?;
            self.create_alarms(region, &specs, ctx).await?
        } else {
            Vec::new()
        };

        let body = dashboard_body(&service.dimension_key, resources, metrics, region);
        let dashboard_body = self
            .publish_dashboard(region, &names.dashboard, &body, ctx)
            .await?;

        Ok(GeneratedMonitoring {
            topic_arn,
            names,
            alarms,
            dashboard_body,
        })
    }
}
