//! Deterministic resource names.

use cloudsentry_protocols::Severity;

const EMPTY_PLACEHOLDER: &str = "None";

/// Topic and dashboard names for one (service, resource set) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorNames {
    pub topic: String,
    pub dashboard: String,
}

impl MonitorNames {
    /// Derive names from the service id and resource ids.
    ///
    /// Ids are sorted first, so the same set always yields the same names.
    pub fn derive<S: AsRef<str>>(service: &str, resource_ids: &[S]) -> Self {
        let mut ids: Vec<&str> = resource_ids
            .iter()
            .map(|id| id.as_ref())
            .filter(|id| !id.trim().is_empty())
            .collect();
        ids.sort_unstable();
        let joined = if ids.is_empty() {
            EMPTY_PLACEHOLDER.to_string()
        } else {
            ids.join("-")
        };
        Self {
            topic: format!("{}_Monitoring_Alerts_{}", service, joined),
            dashboard: format!("{}-Monitor_{}", service, joined),
        }
    }

    /// Console URL of the dashboard.
    pub fn dashboard_url(&self, region: &str) -> String {
        format!(
            "https://{region}.console.aws.amazon.com/cloudwatch/home?region={region}#dashboards:name={}",
            self.dashboard
        )
    }
}

/// `{resource}-{metric}-{Severity}`.
pub fn alarm_name(resource_id: &str, metric: &str, severity: Severity) -> String {
    format!("{}-{}-{}", resource_id, metric, severity)
}
