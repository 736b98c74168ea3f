//! Role lookup API

use crate::api::common::{ApiQueryParams, ListMeta};
use crate::api::{ApiError, Client};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub authority: String,
    pub description: Option<String>,
    pub role_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleList {
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub meta: ListMeta,
}

pub struct RolesApi<'a> {
    client: &'a Client,
}

impl<'a> RolesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/roles?phrase={phrase}&max=-1
    ///
    /// The phrase is a substring search; callers filter for exact matches.
    /// `max=-1` lifts the default page size so an exact match is never cut off.
    pub async fn search(&self, phrase: &str) -> Result<RoleList, ApiError> {
        let params = ApiQueryParams::new().add("phrase", phrase).add("max", -1);
        self.client.get_with_params("/api/roles", &params).await
    }

    /// Roles whose authority equals `name` exactly
    pub async fn find_by_authority(&self, name: &str) -> Result<Vec<Role>, ApiError> {
        let list = self.search(name).await?;
        Ok(list
            .roles
            .into_iter()
            .filter(|r| r.authority == name)
            .collect())
    }
}
