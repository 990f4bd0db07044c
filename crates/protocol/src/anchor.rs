use serde::{Deserialize, Serialize};

use crate::layout::{loose_number, loose_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalEdge {
    Left,
    Right,
}

impl HorizontalEdge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalEdge {
    Top,
    Bottom,
}

impl VerticalEdge {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "top" => Some(Self::Top),
            "bottom" => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Pins a widget to one or two viewport edges at a pixel offset.
///
/// An axis whose edge is `None` is positioned by the absolute coordinate
/// instead. An offset without its edge carries no meaning and is dropped
/// by sanitization. An anchor with neither edge set is treated as absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anchor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<HorizontalEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<VerticalEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
}

impl Anchor {
    pub fn new(
        horizontal: Option<(HorizontalEdge, f64)>,
        vertical: Option<(VerticalEdge, f64)>,
    ) -> Self {
        Self {
            horizontal: horizontal.map(|(edge, _)| edge),
            offset_x: horizontal.map(|(_, offset)| offset),
            vertical: vertical.map(|(edge, _)| edge),
            offset_y: vertical.map(|(_, offset)| offset),
        }
    }

    /// Whether at least one axis is pinned.
    pub fn has_axis(&self) -> bool {
        self.horizontal.is_some() || self.vertical.is_some()
    }
}

/// Anchor as found in persisted settings, before sanitization.
///
/// Every field accepts any JSON value. Values of the wrong type become
/// `None`; edge names are kept as strings so that foreign values such as
/// `"centre"` survive deserialization and can be rejected explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnchor {
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<String>,
    #[serde(default, deserialize_with = "loose_number", skip_serializing_if = "Option::is_none")]
    pub offset_x: Option<f64>,
    #[serde(default, deserialize_with = "loose_string", skip_serializing_if = "Option::is_none")]
    pub vertical: Option<String>,
    #[serde(default, deserialize_with = "loose_number", skip_serializing_if = "Option::is_none")]
    pub offset_y: Option<f64>,
}

impl From<&Anchor> for RawAnchor {
    fn from(anchor: &Anchor) -> Self {
        Self {
            horizontal: anchor.horizontal.map(|edge| edge.as_str().to_string()),
            offset_x: anchor.offset_x,
            vertical: anchor.vertical.map(|edge| edge.as_str().to_string()),
            offset_y: anchor.offset_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_uses_camel_case_offsets() {
        let anchor = Anchor::new(
            Some((HorizontalEdge::Right, 40.0)),
            Some((VerticalEdge::Top, 20.0)),
        );
        let json = serde_json::to_value(anchor).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"horizontal": "right", "offsetX": 40.0, "vertical": "top", "offsetY": 20.0})
        );
    }

    #[test]
    fn single_axis_anchor_omits_other_axis() {
        let anchor = Anchor::new(None, Some((VerticalEdge::Bottom, 0.0)));
        let json = serde_json::to_string(&anchor).unwrap();
        assert_eq!(json, r#"{"vertical":"bottom","offsetY":0.0}"#);
        assert!(anchor.has_axis());
        assert!(!Anchor::default().has_axis());
    }

    #[test]
    fn raw_anchor_keeps_foreign_edge_names() {
        let raw: RawAnchor =
            serde_json::from_str(r#"{"horizontal":"centre","offsetX":"12","vertical":7}"#).unwrap();
        assert_eq!(raw.horizontal.as_deref(), Some("centre"));
        assert_eq!(raw.offset_x, None);
        assert_eq!(raw.vertical, None);
    }
}
