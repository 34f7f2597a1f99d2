//! HTTP inbound adapter exposing REST endpoints.

pub mod alerts;
pub mod dashboard;
pub mod error;
pub mod guests;
pub mod health;
pub mod linen;
pub mod records;
pub mod rooms;
pub mod salesforce;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
