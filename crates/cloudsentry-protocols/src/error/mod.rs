//! Error types for the CloudSentry protocol layer.

mod cloud;
mod remote;
mod validation;

pub use cloud::*;
pub use remote::*;
pub use validation::*;
