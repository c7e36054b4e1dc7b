use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cloudsentry_protocols::{
    AlarmSpec, AlertingApi, CloudError, EnumerationMethod, IdentityApi, InstanceProfile, Listing,
    ResourceDirectory,
};

use super::lock;

/// Region directory backed by fixed listings.
#[derive(Default)]
pub struct FakeDirectory {
    regions: Vec<String>,
    listings: HashMap<String, Listing>,
    failing: HashSet<String>,
    slow: HashMap<String, Duration>,
    region_listing_error: Option<String>,
    calls: Mutex<Vec<(EnumerationMethod, String)>>,
}

impl FakeDirectory {
    pub fn new(regions: &[&str]) -> Self {
        Self {
            regions: regions.iter().map(|r| r.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn with_listing(mut self, region: &str, listing: Listing) -> Self {
        self.listings.insert(region.to_string(), listing);
        self
    }

    pub fn failing_region(mut self, region: &str) -> Self {
        self.failing.insert(region.to_string());
        self
    }

    pub fn slow_region(mut self, region: &str, delay: Duration) -> Self {
        self.slow.insert(region.to_string(), delay);
        self
    }

    pub fn failing_region_listing(mut self, message: &str) -> Self {
        self.region_listing_error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(EnumerationMethod, String)> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ResourceDirectory for FakeDirectory {
    async fn list_regions(&self, _anchor_region: &str) -> Result<Vec<String>, CloudError> {
        match &self.region_listing_error {
            Some(message) => Err(CloudError::api("DescribeRegions", message.clone())),
            None => Ok(self.regions.clone()),
        }
    }

    async fn enumerate(
        &self,
        method: EnumerationMethod,
        region: &str,
    ) -> Result<Listing, CloudError> {
        lock(&self.calls).push((method, region.to_string()));
        if let Some(delay) = self.slow.get(region) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(region) {
            return Err(CloudError::api(method.as_str(), "AuthFailure"));
        }
        Ok(self
            .listings
            .get(region)
            .cloned()
            .unwrap_or_else(|| empty_listing(method)))
    }
}

fn empty_listing(method: EnumerationMethod) -> Listing {
    match method {
        EnumerationMethod::DescribeInstances => Listing::Instances(Vec::new()),
        EnumerationMethod::DescribeDbInstances => Listing::DbInstances(Vec::new()),
        EnumerationMethod::ListFunctions => Listing::Functions(Vec::new()),
        EnumerationMethod::ListTables => Listing::TableNames(Vec::new()),
        EnumerationMethod::ListClusters => Listing::ClusterArns(Vec::new()),
        EnumerationMethod::DescribeCacheClusters => Listing::CacheClusters(Vec::new()),
        EnumerationMethod::DescribeLoadBalancers => Listing::LoadBalancerNames(Vec::new()),
        EnumerationMethod::ListQueues => Listing::QueueUrls(Vec::new()),
        EnumerationMethod::ListBuckets => Listing::BucketNames(Vec::new()),
    }
}

#[derive(Default)]
struct IdentityState {
    instances: HashMap<String, Option<String>>,
    profiles: HashMap<String, InstanceProfile>,
    roles: HashMap<String, Vec<String>>,
    associations: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    calls: Vec<String>,
}

/// IAM and EC2 identity state held in memory.
#[derive(Default)]
pub struct FakeIdentity {
    state: Mutex<IdentityState>,
}

impl FakeIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Known instance without an instance profile.
    pub fn with_instance(self, instance_id: &str) -> Self {
        lock(&self.state)
            .instances
            .insert(instance_id.to_string(), None);
        self
    }

    /// Known instance bound to an existing profile wrapping `role`.
    pub fn with_bound_instance(self, instance_id: &str, profile: &str, role: Option<&str>) -> Self {
        {
            let mut state = lock(&self.state);
            let arn = profile_arn(profile);
            state
                .instances
                .insert(instance_id.to_string(), Some(arn.clone()));
            state.profiles.insert(
                profile.to_string(),
                InstanceProfile {
                    name: profile.to_string(),
                    arn,
                    roles: role.map(|r| vec![r.to_string()]).unwrap_or_default(),
                },
            );
            state
                .associations
                .insert(instance_id.to_string(), vec![format!("iip-assoc-{}", instance_id)]);
        }
        self
    }

    pub fn with_role(self, role: &str, policies: &[&str]) -> Self {
        lock(&self.state).roles.insert(
            role.to_string(),
            policies.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    /// Make every call of the named operation fail.
    pub fn failing(self, operation: &str) -> Self {
        lock(&self.state).failing.insert(operation.to_string());
        self
    }

    pub fn policies(&self, role: &str) -> Vec<String> {
        lock(&self.state).roles.get(role).cloned().unwrap_or_default()
    }

    pub fn profile(&self, name: &str) -> Option<InstanceProfile> {
        lock(&self.state).profiles.get(name).cloned()
    }

    pub fn binding(&self, instance_id: &str) -> Option<String> {
        lock(&self.state).instances.get(instance_id).cloned().flatten()
    }

    pub fn calls(&self) -> Vec<String> {
        lock(&self.state).calls.clone()
    }

    fn record(&self, operation: &str) -> Result<(), CloudError> {
        let mut state = lock(&self.state);
        state.calls.push(operation.to_string());
        if state.failing.contains(operation) {
            return Err(CloudError::api(operation, "AccessDenied"));
        }
        Ok(())
    }
}

fn profile_arn(name: &str) -> String {
    format!("arn:aws:iam::123456789012:instance-profile/{}", name)
}

#[async_trait]
impl IdentityApi for FakeIdentity {
    async fn caller_identity(&self) -> Result<String, CloudError> {
        self.record("get_caller_identity")?;
        Ok("arn:aws:iam::123456789012:user/tester".to_string())
    }

    async fn instance_profile_binding(
        &self,
        _region: &str,
        instance_id: &str,
    ) -> Result<Option<String>, CloudError> {
        self.record("describe_instances")?;
        lock(&self.state)
            .instances
            .get(instance_id)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("instance {}", instance_id)))
    }

    async fn get_instance_profile(
        &self,
        name: &str,
    ) -> Result<Option<InstanceProfile>, CloudError> {
        self.record("get_instance_profile")?;
        Ok(lock(&self.state).profiles.get(name).cloned())
    }

    async fn role_exists(&self, role_name: &str) -> Result<bool, CloudError> {
        self.record("get_role")?;
        Ok(lock(&self.state).roles.contains_key(role_name))
    }

    async fn create_role(&self, role_name: &str, _trust_policy: &str) -> Result<(), CloudError> {
        self.record("create_role")?;
        lock(&self.state)
            .roles
            .entry(role_name.to_string())
            .or_default();
        Ok(())
    }

    async fn attached_policies(&self, role_name: &str) -> Result<Vec<String>, CloudError> {
        self.record("list_attached_role_policies")?;
        lock(&self.state)
            .roles
            .get(role_name)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("role {}", role_name)))
    }

    async fn attach_policy(&self, role_name: &str, policy_arn: &str) -> Result<(), CloudError> {
        self.record("attach_role_policy")?;
        let mut state = lock(&self.state);
        let policies = state
            .roles
            .get_mut(role_name)
            .ok_or_else(|| CloudError::NotFound(format!("role {}", role_name)))?;
        if !policies.iter().any(|p| p == policy_arn) {
            policies.push(policy_arn.to_string());
        }
        Ok(())
    }

    async fn create_instance_profile(&self, name: &str) -> Result<(), CloudError> {
        self.record("create_instance_profile")?;
        lock(&self.state).profiles.insert(
            name.to_string(),
            InstanceProfile {
                name: name.to_string(),
                arn: profile_arn(name),
                roles: Vec::new(),
            },
        );
        Ok(())
    }

    async fn add_role_to_instance_profile(
        &self,
        profile_name: &str,
        role_name: &str,
    ) -> Result<(), CloudError> {
        self.record("add_role_to_instance_profile")?;
        let mut state = lock(&self.state);
        let profile = state
            .profiles
            .get_mut(profile_name)
            .ok_or_else(|| CloudError::NotFound(format!("instance profile {}", profile_name)))?;
        profile.roles.push(role_name.to_string());
        Ok(())
    }

    async fn profile_associations(
        &self,
        _region: &str,
        instance_id: &str,
    ) -> Result<Vec<String>, CloudError> {
        self.record("describe_iam_instance_profile_associations")?;
        Ok(lock(&self.state)
            .associations
            .get(instance_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replace_profile_association(
        &self,
        _region: &str,
        association_id: &str,
        profile_arn: &str,
    ) -> Result<(), CloudError> {
        self.record("replace_iam_instance_profile_association")?;
        let mut state = lock(&self.state);
        let instance = state
            .associations
            .iter()
            .find(|(_, ids)| ids.iter().any(|id| id == association_id))
            .map(|(instance, _)| instance.clone())
            .ok_or_else(|| CloudError::NotFound(format!("association {}", association_id)))?;
        state
            .instances
            .insert(instance, Some(profile_arn.to_string()));
        Ok(())
    }

    async fn associate_profile(
        &self,
        _region: &str,
        instance_id: &str,
        profile_arn: &str,
    ) -> Result<(), CloudError> {
        self.record("associate_iam_instance_profile")?;
        let mut state = lock(&self.state);
        state
            .instances
            .insert(instance_id.to_string(), Some(profile_arn.to_string()));
        state
            .associations
            .insert(instance_id.to_string(), vec![format!("iip-assoc-{}", instance_id)]);
        Ok(())
    }
}

#[derive(Default)]
struct AlertingState {
    topics: Vec<(String, String)>,
    alarms: Vec<(String, AlarmSpec)>,
    dashboards: HashMap<String, (String, String)>,
}

/// Notification topics, alarms and dashboards held in memory.
#[derive(Default)]
pub struct FakeAlerting {
    state: Mutex<AlertingState>,
    fail_topic: bool,
    fail_alarm: Option<String>,
    fail_dashboard: bool,
}

impl FakeAlerting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_topic(mut self) -> Self {
        self.fail_topic = true;
        self
    }

    /// Fail the put of the alarm with this name.
    pub fn failing_alarm(mut self, name: &str) -> Self {
        self.fail_alarm = Some(name.to_string());
        self
    }

    pub fn failing_dashboard(mut self) -> Self {
        self.fail_dashboard = true;
        self
    }

    pub fn topics(&self) -> Vec<String> {
        lock(&self.state).topics.iter().map(|(_, n)| n.clone()).collect()
    }

    pub fn alarms(&self) -> Vec<AlarmSpec> {
        lock(&self.state).alarms.iter().map(|(_, a)| a.clone()).collect()
    }

    pub fn alarm_names(&self) -> Vec<String> {
        lock(&self.state)
            .alarms
            .iter()
            .map(|(_, a)| a.name.clone())
            .collect()
    }

    pub fn dashboard(&self, name: &str) -> Option<String> {
        lock(&self.state)
            .dashboards
            .get(name)
            .map(|(_, body)| body.clone())
    }

    pub fn dashboard_count(&self) -> usize {
        lock(&self.state).dashboards.len()
    }
}

#[async_trait]
impl AlertingApi for FakeAlerting {
    async fn create_topic(&self, region: &str, name: &str) -> Result<String, CloudError> {
        if self.fail_topic {
            return Err(CloudError::api("CreateTopic", "AuthorizationError"));
        }
        let mut state = lock(&self.state);
        // CreateTopic is idempotent by name.
        if !state.topics.iter().any(|(r, n)| r == region && n == name) {
            state.topics.push((region.to_string(), name.to_string()));
        }
        Ok(format!("arn:aws:sns:{}:123456789012:{}", region, name))
    }

    async fn put_alarm(&self, region: &str, alarm: &AlarmSpec) -> Result<(), CloudError> {
        if self.fail_alarm.as_deref() == Some(alarm.name.as_str()) {
            return Err(CloudError::api("PutMetricAlarm", "LimitExceeded"));
        }
        let mut state = lock(&self.state);
        state.alarms.retain(|(r, a)| !(r == region && a.name == alarm.name));
        state.alarms.push((region.to_string(), alarm.clone()));
        Ok(())
    }

    async fn put_dashboard(&self, region: &str, name: &str, body: &str) -> Result<(), CloudError> {
        if self.fail_dashboard {
            return Err(CloudError::api("PutDashboard", "InvalidParameterInput"));
        }
        lock(&self.state)
            .dashboards
            .insert(name.to_string(), (region.to_string(), body.to_string()));
        Ok(())
    }
}
