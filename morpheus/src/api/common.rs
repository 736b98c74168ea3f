//! Common types and utilities for the Morpheus API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error body returned by Morpheus on failed requests
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    #[serde(default)]
    pub success: bool,
    pub msg: Option<String>,
    #[serde(default)]
    pub errors: HashMap<String, String>,
}

#[derive(Debug, thiserror::Error)]
#[error("API error details: message={message:?}, field_errors={field_errors:?}")]
pub struct ApiErrorDetails {
    pub message: Option<String>,
    pub field_errors: HashMap<String, String>,
}

/// Body of mutating calls that return no object
#[derive(Debug, Clone, Deserialize)]
pub struct SuccessResponse {
    #[serde(default)]
    pub success: bool,
    pub msg: Option<String>,
}

/// Paging block attached to list responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListMeta {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub max: i64,
    #[serde(default)]
    pub offset: i64,
}

/// `{"id": n}` reference used for associations in both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

impl From<i64> for IdRef {
    fn from(id: i64) -> Self {
        Self { id }
    }
}

/// `{"code": "..."}` reference to a type catalogue entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRef {
    pub code: String,
}

impl From<&str> for CodeRef {
    fn from(code: &str) -> Self {
        Self {
            code: code.to_string(),
        }
    }
}

/// Reduce a list of references to their ids, keeping server order
pub fn ids_of(refs: &[IdRef]) -> Vec<i64> {
    refs.iter().map(|r| r.id).collect()
}

pub fn id_refs(ids: &[i64]) -> Vec<IdRef> {
    ids.iter().copied().map(IdRef::from).collect()
}

#[derive(Debug, Clone, Default)]
pub struct ApiQueryParams {
    params: Vec<(String, String)>,
}

impl ApiQueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<K: Into<String>, V: ToString>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}
