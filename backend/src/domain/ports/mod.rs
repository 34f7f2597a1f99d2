//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Ports describe how the domain expects to talk to the CRM. Each trait
//! returns the strongly typed [`CrmError`] so adapters map their failures into
//! predictable variants.

mod macros;
pub(crate) use macros::define_port_error;

mod crm_api;
mod crm_authenticator;
mod crm_error;
mod crm_gateway;

#[cfg(test)]
pub use crm_api::MockCrmApi;
pub use crm_api::{CrmApi, CrmRecord, FieldDescription, ObjectDescription, ObjectSummary};
#[cfg(test)]
pub use crm_authenticator::MockCrmAuthenticator;
pub use crm_authenticator::{AccessGrant, CrmAuthenticator};
pub use crm_error::CrmError;
#[cfg(test)]
pub use crm_gateway::MockCrmGateway;
pub use crm_gateway::{ConnectionInfo, CrmGateway, DisconnectedCrmGateway, TokenState};
