mod resource_cloud;
mod resource_integration;

pub use resource_cloud::{CloudPollConfig, CloudResource};
pub use resource_integration::IntegrationResource;
