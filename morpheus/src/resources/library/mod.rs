//! Library catalogue resources

mod resource_cluster_layout;
mod resource_instance_layout;
mod resource_instance_type;
mod resource_node_type;

pub use resource_cluster_layout::ClusterLayoutResource;
pub use resource_instance_layout::InstanceLayoutResource;
pub use resource_instance_type::InstanceTypeResource;
pub use resource_node_type::NodeTypeResource;
