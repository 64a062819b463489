//! Serde model of a map style document.
//!
//! Only the parts the rewriter reads are typed: each layer's `id`,
//! `source-layer` and `layout.text-field`. Every other key is kept in a
//! flattened map so a document survives a load/save round trip.

use crate::expression::Expression;
use serde::{Deserialize, Serialize};
use serde_json::Map;

/// Keys without a typed field.
pub type Extra = Map<String, serde_json::Value>;

/// A style document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    /// Layers in drawing order.
    #[serde(default)]
    pub layers: Vec<Layer>,
    /// Remaining top-level keys.
    #[serde(flatten)]
    pub extra: Extra,
}

/// A style layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Source layer within a vector tile source.
    #[serde(
        rename = "source-layer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_layer: Option<String>,
    /// Layout properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,
    /// Remaining layer keys.
    #[serde(flatten)]
    pub extra: Extra,
}

/// Layout properties of a layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Label text expression.
    #[serde(
        rename = "text-field",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub text_field: Option<Expression>,
    /// Remaining layout keys.
    #[serde(flatten)]
    pub extra: Extra,
}

impl Layer {
    /// Build a symbol layer that labels features with `text_field`.
    #[must_use]
    pub fn symbol(id: &str, source_layer: Option<&str>, text_field: Expression) -> Self {
        Self {
            id: Some(id.to_owned()),
            source_layer: source_layer.map(ToOwned::to_owned),
            layout: Some(Layout {
                text_field: Some(text_field),
                extra: Extra::new(),
            }),
            extra: Extra::new(),
        }
    }

    /// Borrow the label text expression, if the layer has one.
    #[must_use]
    pub fn text_field(&self) -> Option<&Expression> {
        self.layout.as_ref()?.text_field.as_ref()
    }

    /// Mutably borrow the label text expression, if the layer has one.
    pub fn text_field_mut(&mut self) -> Option<&mut Expression> {
        self.layout.as_mut()?.text_field.as_mut()
    }
}

impl Style {
    /// Find a layer by identifier.
    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|layer| layer.id.as_deref() == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_keys_survive_a_round_trip() -> serde_json::Result<()> {
        let document = json!({
            "version": 8,
            "layers": [{
                "id": "place-label",
                "type": "symbol",
                "source-layer": "place",
                "layout": {"text-field": ["get", "name"], "text-size": 12},
                "paint": {"text-color": "#000"}
            }]
        });
        let style: Style = serde_json::from_value(document.clone())?;
        assert_eq!(style.layers.len(), 1);
        assert_eq!(
            style.layer("place-label").and_then(Layer::text_field),
            Some(&json!(["get", "name"]))
        );
        assert_eq!(serde_json::to_value(&style)?, document);
        Ok(())
    }

    #[test]
    fn layers_without_layout_have_no_text_field() -> serde_json::Result<()> {
        let layer: Layer = serde_json::from_value(json!({"id": "water", "type": "fill"}))?;
        assert_eq!(layer.text_field(), None);
        Ok(())
    }
}
