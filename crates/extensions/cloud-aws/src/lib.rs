//! AWS backend for CloudSentry.
//!
//! [`AwsCloud`] implements every cloud collaborator trait on top of the AWS
//! SDK. Credentials come from the default provider chain; each call builds a
//! client scoped to the region it targets, while IAM and STS calls go through
//! the anchor region.

mod alerting;
mod convert;
mod directory;
mod error;
mod identity;

pub use convert::bucket_home_region;
pub use error::sdk_error;

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Shared AWS configuration plus the region used for global services.
#[derive(Clone, Debug)]
pub struct AwsCloud {
    config: SdkConfig,
    anchor_region: String,
}

impl AwsCloud {
    /// Load configuration from the default credential and profile chain.
    pub async fn load(anchor_region: impl Into<String>) -> Self {
        let anchor_region = anchor_region.into();
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(anchor_region.clone()))
            .load()
            .await;
        Self::from_config(config, anchor_region)
    }

    pub fn from_config(config: SdkConfig, anchor_region: impl Into<String>) -> Self {
        Self {
            config,
            anchor_region: anchor_region.into(),
        }
    }

    pub fn anchor_region(&self) -> &str {
        &self.anchor_region
    }

    pub(crate) fn ec2(&self, region: &str) -> aws_sdk_ec2::Client {
        let conf = aws_sdk_ec2::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_ec2::Client::from_conf(conf)
    }

    pub(crate) fn rds(&self, region: &str) -> aws_sdk_rds::Client {
        let conf = aws_sdk_rds::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_rds::Client::from_conf(conf)
    }

    pub(crate) fn lambda(&self, region: &str) -> aws_sdk_lambda::Client {
        let conf = aws_sdk_lambda::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_lambda::Client::from_conf(conf)
    }

    pub(crate) fn dynamodb(&self, region: &str) -> aws_sdk_dynamodb::Client {
        let conf = aws_sdk_dynamodb::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_dynamodb::Client::from_conf(conf)
    }

    pub(crate) fn ecs(&self, region: &str) -> aws_sdk_ecs::Client {
        let conf = aws_sdk_ecs::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_ecs::Client::from_conf(conf)
    }

    pub(crate) fn elasticache(&self, region: &str) -> aws_sdk_elasticache::Client {
        let conf = aws_sdk_elasticache::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_elasticache::Client::from_conf(conf)
    }

    pub(crate) fn elb(&self, region: &str) -> aws_sdk_elasticloadbalancing::Client {
        let conf = aws_sdk_elasticloadbalancing::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_elasticloadbalancing::Client::from_conf(conf)
    }

    pub(crate) fn sqs(&self, region: &str) -> aws_sdk_sqs::Client {
        let conf = aws_sdk_sqs::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_sqs::Client::from_conf(conf)
    }

    pub(crate) fn s3(&self, region: &str) -> aws_sdk_s3::Client {
        let conf = aws_sdk_s3::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_s3::Client::from_conf(conf)
    }

    pub(crate) fn sns(&self, region: &str) -> aws_sdk_sns::Client {
        let conf = aws_sdk_sns::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_sns::Client::from_conf(conf)
    }

    pub(crate) fn cloudwatch(&self, region: &str) -> aws_sdk_cloudwatch::Client {
        let conf = aws_sdk_cloudwatch::config::Builder::from(&self.config)
            .region(Region::new(region.to_string()))
            .build();
        aws_sdk_cloudwatch::Client::from_conf(conf)
    }

    pub(crate) fn iam(&self) -> aws_sdk_iam::Client {
        aws_sdk_iam::Client::new(&self.config)
    }

    pub(crate) fn sts(&self) -> aws_sdk_sts::Client {
        aws_sdk_sts::Client::new(&self.config)
    }
}
