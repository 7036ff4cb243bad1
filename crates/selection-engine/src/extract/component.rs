//! Component-binding extraction for instance nodes

use std::collections::BTreeMap;

use scene_graph::{HostValue, SceneNode};

use super::require;
use crate::classifier::Facet;
use crate::error::ExtractError;
use crate::facets::{ComponentFacet, ComponentPropertyValue, ComponentSummary, FacetValue};

/// Keep `{type, value}` pairs whose value is primitive
fn reduce_property(raw: &HostValue) -> Option<ComponentPropertyValue> {
    let kind = raw.get("type")?.as_str()?;
    let value = raw.get("value")?;
    if !value.is_primitive() {
        return None;
    }
    Some(ComponentPropertyValue {
        kind: kind.to_string(),
        value: value.clone(),
    })
}

fn summarize_component(component: &dyn SceneNode) -> ComponentSummary {
    let size = match component.size() {
        Some(Ok(size)) => Some(size),
        _ => None,
    };
    ComponentSummary {
        id: component.id().to_string(),
        name: component.name().to_string(),
        node_type: component.node_type(),
        width: size.map(|s| s.width),
        height: size.map(|s| s.height),
    }
}

pub fn extract_component(node: &dyn SceneNode) -> Result<FacetValue, ExtractError> {
    let binding = require(node.instance(), Facet::Instance, node)?;

    let main_component = match node.main_component() {
        Some(Ok(component)) => Some(summarize_component(component.as_ref())),
        Some(Err(err)) => {
            log::debug!(
                "Main component of instance '{}' unresolved: {}",
                node.id(),
                err
            );
            None
        }
        None => None,
    };

    let component_properties: BTreeMap<String, ComponentPropertyValue> = binding
        .component_properties
        .iter()
        .filter_map(|(key, raw)| match reduce_property(raw) {
            Some(value) => Some((key.clone(), value)),
            None => {
                log::debug!(
                    "Dropping non-primitive component property '{}' on '{}'",
                    key,
                    node.id()
                );
                None
            }
        })
        .collect();

    Ok(FacetValue::Component(ComponentFacet {
        component_id: binding
            .component_id
            .or_else(|| main_component.as_ref().map(|c| c.id.clone())),
        main_component,
        component_properties,
    }))
}
