//! Data source implementations

mod data_source_cloud;
mod data_source_role;

pub use data_source_cloud::CloudDataSource;
pub use data_source_role::RoleDataSource;

use tfplug::types::Diagnostic;

/// The single object a name lookup resolved to
fn exactly_one<T>(kind: &str, name: &str, mut matches: Vec<T>) -> Result<T, Diagnostic> {
    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(Diagnostic::error(
            format!("{} not found", kind),
            format!("No {} named '{}' exists", kind.to_lowercase(), name),
        )),
        n => Err(Diagnostic::error(
            format!("Multiple {}s found", kind.to_lowercase()),
            format!(
                "{} {}s are named '{}'; the name must be unique",
                n,
                kind.to_lowercase(),
                name
            ),
        )),
    }
}
