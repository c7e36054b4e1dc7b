//! SNS topics and CloudWatch alarms and dashboards.

use async_trait::async_trait;
use aws_sdk_cloudwatch::types::{ComparisonOperator, Statistic};
use cloudsentry_protocols::{AlarmSpec, AlertingApi, CloudError};
use tracing::debug;

use crate::AwsCloud;
use crate::convert::metric_dimensions;
use crate::error::sdk_error;

#[async_trait]
impl AlertingApi for AwsCloud {
    async fn create_topic(&self, region: &str, name: &str) -> Result<String, CloudError> {
        let output = self
            .sns(region)
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(sdk_error("CreateTopic"))?;
        output
            .topic_arn()
            .map(String::from)
            .ok_or_else(|| CloudError::UnexpectedResponse(format!("topic {} has no ARN", name)))
    }

    async fn put_alarm(&self, region: &str, alarm: &AlarmSpec) -> Result<(), CloudError> {
        let dimensions = metric_dimensions(alarm)?;
        self.cloudwatch(region)
            .put_metric_alarm()
            .alarm_name(&alarm.name)
            .alarm_description(&alarm.description)
            .metric_name(&alarm.metric_name)
            .namespace(&alarm.namespace)
            .statistic(Statistic::from(alarm.statistic.as_str()))
            .period(alarm.period_secs)
            .evaluation_periods(alarm.evaluation_periods)
            .threshold(alarm.threshold)
            .comparison_operator(ComparisonOperator::from(alarm.comparison_operator.as_str()))
            .set_alarm_actions(Some(alarm.alarm_actions.clone()))
            .set_ok_actions(Some(alarm.ok_actions.clone()))
            .set_dimensions(Some(dimensions))
            .send()
            .await
            .map_err(sdk_error("PutMetricAlarm"))?;
        debug!(alarm = %alarm.name, region, "PutMetricAlarm succeeded");
        Ok(())
    }

    async fn put_dashboard(&self, region: &str, name: &str, body: &str) -> Result<(), CloudError> {
        let output = self
            .cloudwatch(region)
            .put_dashboard()
            .dashboard_name(name)
            .dashboard_body(body)
            .send()
            .await
            .map_err(sdk_error("PutDashboard"))?;
        for message in output.dashboard_validation_messages() {
            debug!(
                dashboard = name,
                path = message.data_path().unwrap_or_default(),
                "Dashboard validation: {}",
                message.message().unwrap_or_default()
            );
        }
        Ok(())
    }
}
