//! Data model shared by the catalog, the engines and the outward API.

mod alarm;
mod listing;
mod outcome;
mod resource;
mod service;

pub use alarm::*;
pub use listing::*;
pub use outcome::*;
pub use resource::*;
pub use service::*;
