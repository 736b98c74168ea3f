//! Fixtures shared by resource and data source tests

use crate::api::test_helpers::create_test_client;
use crate::MorpheusProviderData;
use std::collections::HashMap;
use tfplug::types::{Dynamic, DynamicValue};

pub fn test_provider_data(server_url: &str) -> MorpheusProviderData {
    MorpheusProviderData::new(create_test_client(server_url))
}

/// Object value built from `(attribute, value)` pairs
pub fn object(attrs: &[(&str, Dynamic)]) -> DynamicValue {
    DynamicValue::new(Dynamic::Map(
        attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<HashMap<_, _>>(),
    ))
}

pub fn string(value: &str) -> Dynamic {
    Dynamic::String(value.to_string())
}

pub fn ids(values: &[i64]) -> Dynamic {
    Dynamic::List(values.iter().map(|v| Dynamic::Number(*v as f64)).collect())
}

pub fn strings(values: &[&str]) -> Dynamic {
    Dynamic::List(values.iter().map(|v| string(v)).collect())
}
