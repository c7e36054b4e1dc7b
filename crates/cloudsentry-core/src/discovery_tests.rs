use super::*;
use crate::testing::FakeDirectory;
use cloudsentry_protocols::{EnumerationMethod, Listing, RawInstance};
use std::collections::HashMap;

fn regions(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("region-{}", i)).collect()
}

fn running(id: &str) -> RawInstance {
    RawInstance {
        instance_id: id.to_string(),
        instance_type: Some("t3.micro".to_string()),
        state: Some("running".to_string()),
        tags: HashMap::new(),
        public_ip_address: None,
        private_ip_address: None,
    }
}

fn fanout(directory: FakeDirectory) -> RegionFanout {
    RegionFanout::new(
        Arc::new(directory),
        Arc::new(ServiceCatalog::builtin()),
        "us-east-1",
    )
}

#[tokio::test]
async fn test_region_failure_is_isolated() {
    let names = regions(10);
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut directory = FakeDirectory::new(&refs).failing_region("region-7");
    for name in &names {
        directory = directory.with_listing(
            name,
            Listing::Instances(vec![running(&format!("i-{}", name))]),
        );
    }

    let engine = fanout(directory);
    let discovery = engine.discover_all("ec2", &engine.context()).await.unwrap();

    assert_eq!(discovery.resources.len(), 9);
    assert!(discovery.resources.iter().all(|r| r.region != "region-7"));
    assert_eq!(discovery.region_errors.len(), 1);
    assert_eq!(discovery.region_errors[0].region, "region-7");
}

#[tokio::test]
async fn test_results_follow_region_order() {
    let directory = FakeDirectory::new(&["a", "b", "c"])
        .with_listing("a", Listing::BucketNames(vec!["alpha".to_string()]))
        .with_listing("b", Listing::BucketNames(vec!["bravo".to_string()]))
        .with_listing("c", Listing::BucketNames(vec!["charlie".to_string()]))
        .slow_region("a", Duration::from_millis(50));

    let engine = fanout(directory);
    let discovery = engine.discover_all("S3", &engine.context()).await.unwrap();
    let ids: Vec<&str> = discovery.resources.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["alpha", "bravo", "charlie"]);
    let regions: Vec<&str> = discovery.resources.iter().map(|r| r.region.as_str()).collect();
    assert_eq!(regions, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_each_region_uses_service_enumeration() {
    let directory = Arc::new(FakeDirectory::new(&["us-east-1", "eu-west-1"]));
    let engine = RegionFanout::new(
        directory.clone(),
        Arc::new(ServiceCatalog::builtin()),
        "us-east-1",
    )
    .with_max_parallel(1);

    engine.discover_all("sqs", &engine.context()).await.unwrap();
    let mut calls = directory.calls();
    calls.sort_by(|a, b| a.1.cmp(&b.1));
    assert_eq!(
        calls,
        vec![
            (EnumerationMethod::ListQueues, "eu-west-1".to_string()),
            (EnumerationMethod::ListQueues, "us-east-1".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_slow_region_times_out() {
    let directory = FakeDirectory::new(&["fast", "slow"])
        .with_listing("fast", Listing::TableNames(vec!["orders".to_string()]))
        .slow_region("slow", Duration::from_secs(5));

    let engine = fanout(directory).with_call_timeout(Duration::from_millis(50));
    let discovery = engine.discover_all("DynamoDB", &engine.context()).await.unwrap();
    assert_eq!(discovery.resources.len(), 1);
    assert_eq!(discovery.region_errors.len(), 1);
    assert_eq!(discovery.region_errors[0].region, "slow");
    assert!(discovery.region_errors[0].message.contains("timed out"));
}

#[tokio::test]
async fn test_unknown_service_is_rejected() {
    let engine = fanout(FakeDirectory::new(&["us-east-1"]));
    let result = engine.discover_all("EKS", &engine.context()).await;
    assert!(matches!(result, Err(DiscoveryError::Catalog(_))));
}

#[tokio::test]
async fn test_region_listing_failure_is_fatal() {
    let engine = fanout(FakeDirectory::new(&[]).failing_region_listing("UnauthorizedOperation"));
    let result = engine.discover_all("EC2", &engine.context()).await;
    assert!(matches!(result, Err(DiscoveryError::Regions(_))));
    assert!(engine.regions(&engine.context()).await.is_err());
}

#[tokio::test]
async fn test_no_regions_yields_empty_discovery() {
    let engine = fanout(FakeDirectory::new(&[]));
    let discovery = engine.discover_all("EC2", &engine.context()).await.unwrap();
    assert!(discovery.resources.is_empty());
    assert!(discovery.region_errors.is_empty());
}

#[tokio::test]
async fn test_mismatched_listing_becomes_region_error() {
    let directory = FakeDirectory::new(&["us-east-1"])
        .with_listing("us-east-1", Listing::BucketNames(vec!["b".to_string()]));
    let engine = fanout(directory);
    let discovery = engine.discover_all("EC2", &engine.context()).await.unwrap();
    assert!(discovery.resources.is_empty());
    assert_eq!(discovery.region_errors.len(), 1);
}
