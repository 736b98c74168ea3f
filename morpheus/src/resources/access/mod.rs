//! Users and credentials

mod resource_credential;
mod resource_user;

pub use resource_credential::CredentialResource;
pub use resource_user::UserResource;
