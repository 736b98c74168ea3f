//! User API implementation

use crate::api::common::{IdRef, SuccessResponse};
use crate::api::{ApiError, Client};
use serde::{Deserialize, Serialize};

const BASE_PATH: &str = "/api/users";

/// Role reference attached to a user
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserRole {
    pub id: i64,
    pub authority: Option<String>,
}

/// User as returned by the API. The password is never returned.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub receive_notifications: bool,
    #[serde(default)]
    pub roles: Vec<UserRole>,
}

impl User {
    pub fn role_ids(&self) -> Vec<i64> {
        self.roles.iter().map(|r| r.id).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Only sent on create or when the password changed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_notifications: Option<bool>,
    pub roles: Vec<IdRef>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserEnvelope<T> {
    user: T,
}

pub struct UsersApi<'a> {
    client: &'a Client,
}

impl<'a> UsersApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /api/users/{id}
    pub async fn get(&self, id: i64) -> Result<User, ApiError> {
        let response: UserEnvelope<User> =
            self.client.get(&format!("{}/{}", BASE_PATH, id)).await?;
        Ok(response.user)
    }

    /// POST /api/users
    pub async fn create(&self, request: &UserRequest) -> Result<User, ApiError> {
        let body = UserEnvelope { user: request };
        let response: UserEnvelope<User> = self.client.post(BASE_PATH, &body).await?;
        Ok(response.user)
    }

    /// PUT /api/users/{id}
    pub async fn update(&self, id: i64, request: &UserRequest) -> Result<User, ApiError> {
        let body = UserEnvelope { user: request };
        let response: UserEnvelope<User> = self
            .client
            .put(&format!("{}/{}", BASE_PATH, id), &body)
            .await?;
        Ok(response.user)
    }

    /// DELETE /api/users/{id}
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete::<SuccessResponse>(&format!("{}/{}", BASE_PATH, id))
            .await
            .map(|_| ())
    }
}
