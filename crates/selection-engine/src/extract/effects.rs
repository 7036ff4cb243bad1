//! Effect extraction

use scene_graph::{HostValue, SceneNode};

use super::paint::read_color;
use super::require;
use crate::classifier::Facet;
use crate::error::ExtractError;
use crate::facets::{EffectSummary, FacetValue, Offset};

/// Reduce one effect entry; entries without a type become `unknown`
pub fn reduce_effect(effect: &HostValue) -> EffectSummary {
    let offset = effect.get("offset").and_then(|offset| {
        Some(Offset {
            x: offset.get("x")?.as_f64()?,
            y: offset.get("y")?.as_f64()?,
        })
    });

    EffectSummary {
        kind: effect
            .get("type")
            .and_then(HostValue::as_str)
            .unwrap_or("unknown")
            .to_string(),
        visible: effect.get("visible").and_then(HostValue::as_bool),
        radius: effect.get("radius").and_then(HostValue::as_f64),
        color: effect.get("color").and_then(read_color),
        offset,
        spread: effect.get("spread").and_then(HostValue::as_f64),
    }
}

pub fn extract_effects(node: &dyn SceneNode) -> Result<FacetValue, ExtractError> {
    let effects = require(node.effects(), Facet::Effects, node)?;
    match effects.as_array() {
        Some(entries) => Ok(FacetValue::Effects(
            entries.iter().map(reduce_effect).collect(),
        )),
        None => Err(ExtractError::malformed(
            Facet::Effects.as_str(),
            node.id(),
            format!("expected an effect array, got {}", effects.kind()),
        )),
    }
}
