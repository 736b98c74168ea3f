//! Library catalogue: node types, instance types and layouts

use crate::api::client::Client;

pub mod cluster_layouts;
pub mod instance_layouts;
pub mod instance_types;
pub mod node_types;

/// Library API providing catalogue operations
pub struct LibraryApi<'a> {
    client: &'a Client,
}

impl<'a> LibraryApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn node_types(&self) -> node_types::NodeTypesApi<'a> {
        node_types::NodeTypesApi::new(self.client)
    }

    pub fn instance_types(&self) -> instance_types::InstanceTypesApi<'a> {
        instance_types::InstanceTypesApi::new(self.client)
    }

    pub fn instance_layouts(&self) -> instance_layouts::InstanceLayoutsApi<'a> {
        instance_layouts::InstanceLayoutsApi::new(self.client)
    }

    pub fn cluster_layouts(&self) -> cluster_layouts::ClusterLayoutsApi<'a> {
        cluster_layouts::ClusterLayoutsApi::new(self.client)
    }
}
