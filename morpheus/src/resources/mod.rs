//! Resource implementations

pub mod access;
pub mod infrastructure;
pub mod library;
pub(crate) mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use access::{CredentialResource, UserResource};
pub use infrastructure::{CloudPollConfig, CloudResource, IntegrationResource};
pub use library::{
    ClusterLayoutResource, InstanceLayoutResource, InstanceTypeResource, NodeTypeResource,
};
