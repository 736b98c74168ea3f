//! Helpers shared by resource implementations for moving values between
//! Terraform configuration/state and API payloads

use crate::reconcile::{declared_ids, reconcile_ids};
use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::resource::{ImportResourceStateRequest, ImportResourceStateResponse};
use tfplug::schema::{Attribute, AttributeBuilder, AttributeType};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

pub fn not_configured() -> Diagnostic {
    Diagnostic::error(
        "Provider not configured",
        "Provider data was not properly configured",
    )
}

/// Computed string `id` that keeps its value across plans
pub fn id_attribute(description: &str) -> Attribute {
    AttributeBuilder::new("id", AttributeType::String)
        .description(description)
        .computed()
        .plan_modifier(UseStateForUnknown)
        .build()
}

/// Optional + computed `list(number)` of associated ids
pub fn id_list_attribute(name: &str, description: &str) -> Attribute {
    AttributeBuilder::new(name, AttributeType::List(Box::new(AttributeType::Number)))
        .description(description)
        .optional()
        .computed()
        .build()
}

pub fn labels_attribute() -> Attribute {
    AttributeBuilder::new("labels", AttributeType::List(Box::new(AttributeType::String)))
        .description("Labels applied to the object")
        .optional()
        .computed()
        .build()
}

/// Numeric id stored as a string under `id`
pub fn resource_id(state: &DynamicValue) -> Result<i64, Diagnostic> {
    let raw = state
        .get_string(&AttributePath::new("id"))
        .map_err(|_| Diagnostic::error("Missing id", "The resource has no id in state"))?;
    parse_id(&raw)
}

pub fn parse_id(raw: &str) -> Result<i64, Diagnostic> {
    raw.trim().parse::<i64>().map_err(|_| {
        Diagnostic::error(
            "Invalid resource id",
            format!("Expected a numeric id, got '{}'", raw),
        )
    })
}

/// Import by numeric id; the framework refreshes the rest with `read`
pub fn import_by_id(request: ImportResourceStateRequest) -> ImportResourceStateResponse {
    match parse_id(&request.id) {
        Ok(id) => {
            let mut state = DynamicValue::object();
            let _ = state.set_string(&AttributePath::new("id"), id.to_string());
            ImportResourceStateResponse {
                state: Some(state),
                diagnostics: vec![],
            }
        }
        Err(diag) => ImportResourceStateResponse {
            state: None,
            diagnostics: vec![diag],
        },
    }
}

pub fn required_string(config: &DynamicValue, name: &str) -> Result<String, Diagnostic> {
    config.get_string(&AttributePath::new(name)).map_err(|_| {
        Diagnostic::error(
            format!("Missing {}", name),
            format!("The '{}' attribute is required", name),
        )
    })
}

pub fn required_i64(config: &DynamicValue, name: &str) -> Result<i64, Diagnostic> {
    config.get_i64(&AttributePath::new(name)).map_err(|_| {
        Diagnostic::error(
            format!("Missing {}", name),
            format!("The '{}' attribute is required", name),
        )
    })
}

pub fn optional_string(config: &DynamicValue, name: &str) -> Option<String> {
    config.get_string(&AttributePath::new(name)).ok()
}

pub fn optional_bool(config: &DynamicValue, name: &str) -> Option<bool> {
    config.get_bool(&AttributePath::new(name)).ok()
}

pub fn optional_i64(config: &DynamicValue, name: &str) -> Option<i64> {
    config.get_i64(&AttributePath::new(name)).ok()
}

pub fn optional_string_list(config: &DynamicValue, name: &str) -> Option<Vec<String>> {
    config.get_string_list(&AttributePath::new(name)).ok()
}

/// Declared ids ready to send, with reconciliation placeholders removed
pub fn id_list(config: &DynamicValue, name: &str) -> Vec<i64> {
    config
        .get_i64_list(&AttributePath::new(name))
        .map(|ids| declared_ids(&ids))
        .unwrap_or_default()
}

/// Ids for an optional list attribute, `None` when the configuration leaves
/// it unset so the server keeps its current associations
pub fn optional_id_list(config: &DynamicValue, name: &str) -> Option<Vec<i64>> {
    config
        .get_i64_list(&AttributePath::new(name))
        .ok()
        .map(|ids| declared_ids(&ids))
}

/// Plaintext of a secret attribute if it has to be sent to the API.
///
/// Always sent on create (`prior` is `None`). On update it is sent only when
/// the planned digest differs from the one in the prior state.
pub fn secret_to_send(
    config: &DynamicValue,
    planned: &DynamicValue,
    prior: Option<&DynamicValue>,
    name: &str,
) -> Option<String> {
    let path = AttributePath::new(name);
    let plaintext = config.get_string(&path).ok()?;
    match prior {
        None => Some(plaintext),
        Some(prior) => {
            let changed = planned.get_string(&path).ok() != prior.get_string(&path).ok();
            changed.then_some(plaintext)
        }
    }
}

pub fn set_optional_string(state: &mut DynamicValue, name: &str, value: Option<String>) {
    if let Some(value) = value {
        let _ = state.set_string(&AttributePath::new(name), value);
    }
}

/// Write server ids into `state[name]`, ordered against the ids already there.
///
/// An attribute the user never set stays null while the server reports none.
pub fn set_id_list(state: &mut DynamicValue, name: &str, observed: &[i64]) {
    let path = AttributePath::new(name);
    let declared = state.get_i64_list(&path).ok();
    if observed.is_empty() && declared.is_none() && !is_unknown(state, &path) {
        return;
    }

    let ids = reconcile_ids(observed, declared.as_deref().unwrap_or(&[]));
    let _ = state.set_i64_list(&path, &ids);
}

pub fn set_string_list(state: &mut DynamicValue, name: &str, values: &[String]) {
    let path = AttributePath::new(name);
    if values.is_empty() && matches!(state.get(&path), None | Some(Dynamic::Null)) {
        return;
    }

    let _ = state.set_list(
        &path,
        values.iter().cloned().map(Dynamic::String).collect(),
    );
}

/// Replace unknown values left over from planning with null
pub fn clear_unknowns(state: &mut DynamicValue) {
    if let Dynamic::Map(attrs) = &mut state.value {
        for value in attrs.values_mut() {
            if value.is_unknown() {
                *value = Dynamic::Null;
            }
        }
    }
}

fn is_unknown(state: &DynamicValue, path: &AttributePath) -> bool {
    state.get(path).is_some_and(Dynamic::is_unknown)
}
