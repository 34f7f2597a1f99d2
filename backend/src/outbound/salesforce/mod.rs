//! CRM outbound adapter.
//!
//! This module provides a thin HTTP implementation of the `CrmAuthenticator`
//! and `CrmApi` ports against the Salesforce REST, OAuth and Tooling APIs.

mod dto;
mod http_client;

pub use http_client::{MAX_QUERY_PAGES, SalesforceHttpClient};
