//! Normalized discovery results.

use serde::{Deserialize, Serialize};

/// One live resource discovered in one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRecord {
    pub id: String,
    #[serde(rename = "Type")]
    pub resource_type: String,
    pub state: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ip_address: Option<String>,
    pub region: String,
}

impl ResourceRecord {
    pub fn new(
        id: impl Into<String>,
        resource_type: impl Into<String>,
        state: impl Into<String>,
        name: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.into(),
            state: state.into(),
            name: name.into(),
            public_ip_address: None,
            private_ip_address: None,
            region: region.into(),
        }
    }

    pub fn with_addresses(mut self, public: Option<String>, private: Option<String>) -> Self {
        self.public_ip_address = public;
        self.private_ip_address = private;
        self
    }
}

/// A region whose discovery call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionError {
    pub region: String,
    pub message: String,
}

impl RegionError {
    pub fn new(region: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            message: message.into(),
        }
    }
}
