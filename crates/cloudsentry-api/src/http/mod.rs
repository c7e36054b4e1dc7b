//! HTTP interface module.

pub mod catalog;
pub mod configure;
pub mod routes;
