//! Built-in AWS service descriptors.

use std::sync::Arc;

use cloudsentry_protocols::{
    DimensionTemplate, EnumerationMethod, MetricDescriptor, ServiceDescriptor,
};

use super::ResponseTranslator;
use super::translate::{
    CacheClusterTranslator, DbInstanceTranslator, FunctionTranslator, InstanceTranslator,
    NameSource, NamedResourceTranslator,
};

const AGENT_NAMESPACE: &str = "CWAgent";

fn service(
    id: &str,
    namespace: &str,
    dimension_key: &str,
    enumeration: EnumerationMethod,
    metric_names: &[&str],
) -> ServiceDescriptor {
    ServiceDescriptor {
        id: id.to_string(),
        namespace: namespace.to_string(),
        dimension_key: dimension_key.to_string(),
        enumeration,
        metrics: metric_names
            .iter()
            .map(|name| MetricDescriptor::new(*name, namespace))
            .collect(),
    }
}

fn ec2() -> ServiceDescriptor {
    let metrics = vec![
        MetricDescriptor::new("CPUUtilization", "AWS/EC2"),
        MetricDescriptor::new("DiskSpaceUtilization", AGENT_NAMESPACE).with_dimension_template(
            vec![
                DimensionTemplate::resource_id("InstanceId"),
                DimensionTemplate::literal("path", "/"),
                DimensionTemplate::literal("device", "xvda1"),
                DimensionTemplate::literal("fstype", "ext4"),
            ],
        ),
        MetricDescriptor::new("MemoryUtilization", AGENT_NAMESPACE)
            .with_dimension_template(vec![DimensionTemplate::resource_id("InstanceId")]),
        MetricDescriptor::new("NetworkIn", "AWS/EC2"),
        MetricDescriptor::new("NetworkOut", "AWS/EC2"),
    ];
    ServiceDescriptor {
        id: "EC2".to_string(),
        namespace: "AWS/EC2".to_string(),
        dimension_key: "InstanceId".to_string(),
        enumeration: EnumerationMethod::DescribeInstances,
        metrics,
    }
}

fn entry(
    descriptor: ServiceDescriptor,
    translator: impl ResponseTranslator + 'static,
) -> (ServiceDescriptor, Arc<dyn ResponseTranslator>) {
    (descriptor, Arc::new(translator))
}

pub(super) fn entries() -> Vec<(ServiceDescriptor, Arc<dyn ResponseTranslator>)> {
    vec![
        entry(ec2(), InstanceTranslator),
        entry(
            service(
                "RDS",
                "AWS/RDS",
                "DBInstanceIdentifier",
                EnumerationMethod::DescribeDbInstances,
                &[
                    "CPUUtilization",
                    "FreeableMemory",
                    "FreeStorageSpace",
                    "DatabaseConnections",
                    "ReadIOPS",
                    "WriteIOPS",
                ],
            ),
            DbInstanceTranslator,
        ),
        entry(
            service(
                "Lambda",
                "AWS/Lambda",
                "FunctionName",
                EnumerationMethod::ListFunctions,
                &[
                    "Invocations",
                    "Errors",
                    "Duration",
                    "Throttles",
                    "ConcurrentExecutions",
                    "IteratorAge",
                ],
            ),
            FunctionTranslator,
        ),
        entry(
            service(
                "DynamoDB",
                "AWS/DynamoDB",
                "TableName",
                EnumerationMethod::ListTables,
                &[
                    "ConsumedReadCapacityUnits",
                    "ConsumedWriteCapacityUnits",
                    "ReadThrottleEvents",
                    "WriteThrottleEvents",
                    "SuccessfulRequestLatency",
                    "SystemErrors",
                ],
            ),
            NamedResourceTranslator::new(
                "table_names",
                "DynamoDB Table",
                NameSource::Plain,
            ),
        ),
        entry(
            service(
                "ECS",
                "AWS/ECS",
                "ClusterName",
                EnumerationMethod::ListClusters,
                &[
                    "CPUUtilization",
                    "MemoryUtilization",
                    "RunningTaskCount",
                    "PendingTaskCount",
                    "StorageReadBytes",
                    "StorageWriteBytes",
                ],
            ),
            NamedResourceTranslator::new(
                "cluster_arns",
                "ECS Cluster",
                NameSource::LastPathSegment,
            ),
        ),
        entry(
            service(
                "ElastiCache",
                "AWS/ElastiCache",
                "CacheClusterId",
                EnumerationMethod::DescribeCacheClusters,
                &[
                    "CPUUtilization",
                    "FreeableMemory",
                    "NetworkBytesIn",
                    "NetworkBytesOut",
                    "CurrConnections",
                    "CacheHits",
                    "CacheMisses",
                ],
            ),
            CacheClusterTranslator,
        ),
        entry(
            service(
                "ELB",
                "AWS/ELB",
                "LoadBalancerName",
                EnumerationMethod::DescribeLoadBalancers,
                &[
                    "RequestCount",
                    "HealthyHostCount",
                    "UnHealthyHostCount",
                    "Latency",
                    "HTTPCode_Backend_2XX",
                    "HTTPCode_Backend_5XX",
                ],
            ),
            NamedResourceTranslator::new(
                "load_balancer_names",
                "Classic Load Balancer",
                NameSource::Plain,
            ),
        ),
        entry(
            service(
                "SQS",
                "AWS/SQS",
                "QueueName",
                EnumerationMethod::ListQueues,
                &[
                    "ApproximateNumberOfMessagesVisible",
                    "ApproximateNumberOfMessagesNotVisible",
                    "ApproximateAgeOfOldestMessage",
                    "NumberOfMessagesReceived",
                    "NumberOfMessagesSent",
                    "NumberOfMessagesDeleted",
                ],
            ),
            NamedResourceTranslator::new(
                "queue_urls",
                "SQS Queue",
                NameSource::LastPathSegment,
            ),
        ),
        entry(
            service(
                "S3",
                "AWS/S3",
                "BucketName",
                EnumerationMethod::ListBuckets,
                &[
                    "BucketSizeBytes",
                    "NumberOfObjects",
                    "AllRequests",
                    "4xxErrors",
                    "5xxErrors",
                    "FirstByteLatency",
                    "TotalRequestLatency",
                ],
            ),
            NamedResourceTranslator::new(
                "bucket_names",
                "S3 Bucket",
                NameSource::Plain,
            ),
        ),
    ]
}
