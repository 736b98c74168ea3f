//! tfplug - Terraform Plugin Framework for Rust
//!
//! The in-process contract between a Terraform provider and its host: the
//! value model, schemas, provider/resource/data source traits, plan
//! modifiers, validators, the plan engine and the state poller.

// Core modules
pub mod context;
pub mod error;
pub mod schema;
pub mod types;

// Provider API modules
pub mod data_source;
pub mod provider;
pub mod resource;

// Helper modules
pub mod logging;
pub mod plan;
pub mod plan_modifier;
pub mod validator;
pub mod wait;

// Re-exports for convenience
pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use logging::{init_logging, try_init_logging, LogLevel};
pub use plan::{plan_resource_change, PlanResourceChangeResponse};
pub use provider::{DataSourceFactory, Provider, ResourceFactory};
pub use resource::{Resource, ResourceWithConfigure};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{AttributePath, Diagnostic, DiagnosticSeverity, Dynamic, DynamicValue};
pub use wait::{StateChangeConf, WaitError};
