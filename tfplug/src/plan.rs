//! Resource planning
//!
//! Runs the attribute plan modifiers of a resource schema against a proposed
//! new state, the way the host framework does before calling apply.

use crate::plan_modifier::PlanModifyRequest;
use crate::schema::Schema;
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct PlanResourceChangeResponse {
    pub planned_state: DynamicValue,
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Plan a resource change.
///
/// A null `proposed_new_state` is a destroy and plans null. Otherwise computed
/// attributes without a configured or proposed value become unknown, then each
/// attribute's modifiers run in declaration order, each seeing the value left
/// by the previous one.
pub fn plan_resource_change(
    schema: &Schema,
    prior_state: &DynamicValue,
    proposed_new_state: &DynamicValue,
    config: &DynamicValue,
) -> PlanResourceChangeResponse {
    if proposed_new_state.is_null() {
        return PlanResourceChangeResponse {
            planned_state: DynamicValue::null(),
            requires_replace: vec![],
            diagnostics: vec![],
        };
    }

    let resource_exists = !prior_state.is_null();
    let mut planned_state = proposed_new_state.clone();
    let mut requires_replace = Vec::new();
    let mut diagnostics = Vec::new();

    for attr in &schema.block.attributes {
        let path = AttributePath::new(&attr.name);

        let config_value = value_at(config, &path);
        let state_value = value_at(prior_state, &path);
        let mut plan_value = value_at(&planned_state, &path);

        if attr.computed && plan_value.is_null() && config_value.is_null() {
            plan_value = Dynamic::Unknown;
        }

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify_plan(PlanModifyRequest {
                state: state_value.clone(),
                plan: plan_value,
                config: config_value.clone(),
                attribute_path: attr.name.clone(),
                resource_exists,
            });

            plan_value = response.plan_value;

            if response.requires_replace && !requires_replace.contains(&path) {
                debug!(attribute = %attr.name, "attribute change requires replacement");
                requires_replace.push(path.clone());
            }
            diagnostics.extend(response.diagnostics);
        }

        if let Err(e) = planned_state.set(&path, plan_value) {
            warn!(attribute = %attr.name, error = %e, "failed to set planned value");
            diagnostics.push(
                Diagnostic::error("Failed to plan attribute", e.to_string()).with_attribute(path),
            );
        }
    }

    PlanResourceChangeResponse {
        planned_state,
        requires_replace,
        diagnostics,
    }
}

fn value_at(value: &DynamicValue, path: &AttributePath) -> Dynamic {
    value.get(path).cloned().unwrap_or(Dynamic::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan_modifier::{
        PlanModifier, PlanModifyResponse, RequiresReplaceIfChanged, UseStateForUnknown,
    };
    use crate::schema::{AttributeBuilder, AttributeType, SchemaBuilder};

    fn schema() -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("technology", AttributeType::String)
                    .required()
                    .plan_modifier(RequiresReplaceIfChanged)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("status", AttributeType::String)
                    .computed()
                    .build(),
            )
            .build()
    }

    fn object(pairs: &[(&str, &str)]) -> DynamicValue {
        let mut value = DynamicValue::object();
        for (k, v) in pairs {
            value
                .set_string(&AttributePath::new(k), v.to_string())
                .unwrap();
        }
        value
    }

    #[test]
    fn create_marks_computed_attributes_unknown() {
        let config = object(&[("name", "web"), ("technology", "vmware")]);

        let response = plan_resource_change(&schema(), &DynamicValue::null(), &config, &config);

        assert!(response.requires_replace.is_empty());
        assert_eq!(
            response.planned_state.get(&AttributePath::new("id")),
            Some(&Dynamic::Unknown)
        );
        assert_eq!(
            response.planned_state.get(&AttributePath::new("status")),
            Some(&Dynamic::Unknown)
        );
    }

    #[test]
    fn update_keeps_id_and_flags_replacement() {
        let prior = object(&[
            ("id", "12"),
            ("name", "web"),
            ("technology", "vmware"),
            ("status", "ok"),
        ]);
        let config = object(&[("name", "web"), ("technology", "kvm")]);

        let response = plan_resource_change(&schema(), &prior, &config, &config);

        assert_eq!(
            response
                .planned_state
                .get_string(&AttributePath::new("id"))
                .unwrap(),
            "12"
        );
        assert_eq!(response.requires_replace, vec![AttributePath::new("technology")]);
    }

    #[test]
    fn destroy_plans_null() {
        let prior = object(&[("id", "12"), ("name", "web")]);

        let response =
            plan_resource_change(&schema(), &prior, &DynamicValue::null(), &DynamicValue::null());

        assert!(response.planned_state.is_null());
        assert!(response.requires_replace.is_empty());
    }

    struct Upper;

    impl PlanModifier for Upper {
        fn description(&self) -> String {
            "uppercases".to_string()
        }

        fn modify_plan(&self, request: PlanModifyRequest) -> PlanModifyResponse {
            let plan_value = match &request.plan {
                Dynamic::String(s) => Dynamic::String(s.to_uppercase()),
                _ => request.plan.clone(),
            };
            PlanModifyResponse {
                plan_value,
                requires_replace: false,
                diagnostics: vec![Diagnostic::warning("uppercased", "")],
            }
        }
    }

    #[test]
    fn modifiers_chain_in_order_and_collect_diagnostics() {
        let schema = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("code", AttributeType::String)
                    .required()
                    .plan_modifier(Upper)
                    .plan_modifier(RequiresReplaceIfChanged)
                    .build(),
            )
            .build();

        let prior = object(&[("code", "ABC")]);
        let config = object(&[("code", "abc")]);

        let response = plan_resource_change(&schema, &prior, &config, &config);

        assert_eq!(
            response
                .planned_state
                .get_string(&AttributePath::new("code"))
                .unwrap(),
            "ABC"
        );
        assert!(response.requires_replace.is_empty());
        assert_eq!(response.diagnostics.len(), 1);
    }
}
