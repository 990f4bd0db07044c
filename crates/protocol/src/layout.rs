use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::anchor::{Anchor, RawAnchor};
use crate::widget::WidgetId;

/// One widget's placement: the serializable unit of a layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub id: WidgetId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
}

/// A layout entry exactly as it sits in the persisted settings document.
///
/// Persisted data may come from an older build, another browser instance or
/// manual editing, so nothing here is trusted: the id may name no widget,
/// coordinates may be missing (read as `NaN`) and the anchor may hold any
/// shape. Sanitization into [`LayoutEntry`] happens in the layout engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLayoutEntry {
    #[serde(default, deserialize_with = "loose_id")]
    pub id: String,
    #[serde(default = "missing_number", deserialize_with = "loose_coordinate")]
    pub x: f64,
    #[serde(default = "missing_number", deserialize_with = "loose_coordinate")]
    pub y: f64,
    #[serde(default, deserialize_with = "loose_anchor", skip_serializing_if = "Option::is_none")]
    pub anchor: Option<RawAnchor>,
}

impl From<&LayoutEntry> for StoredLayoutEntry {
    fn from(entry: &LayoutEntry) -> Self {
        Self {
            id: entry.id.as_str().to_string(),
            x: entry.x,
            y: entry.y,
            anchor: entry.anchor.as_ref().map(RawAnchor::from),
        }
    }
}

/// Deserialize a list of stored entries, silently dropping elements that are
/// not objects at all.
pub fn loose_entries<'de, D>(deserializer: D) -> Result<Vec<StoredLayoutEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn missing_number() -> f64 {
    f64::NAN
}

fn loose_coordinate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_number(deserializer)?.unwrap_or(f64::NAN))
}

fn loose_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_string(deserializer)?.unwrap_or_default())
}

fn loose_anchor<'de, D>(deserializer: D) -> Result<Option<RawAnchor>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

pub(crate) fn loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

pub(crate) fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::{HorizontalEdge, VerticalEdge};

    #[test]
    fn stored_entry_tolerates_bad_coordinates() {
        let entry: StoredLayoutEntry =
            serde_json::from_str(r#"{"id":"weather","x":"left","anchor":"nope"}"#).unwrap();
        assert_eq!(entry.id, "weather");
        assert!(entry.x.is_nan());
        assert!(entry.y.is_nan());
        assert_eq!(entry.anchor, None);
    }

    #[test]
    fn loose_entries_skips_non_objects() {
        #[derive(Deserialize)]
        struct Doc {
            #[serde(deserialize_with = "loose_entries")]
            layout: Vec<StoredLayoutEntry>,
        }
        let doc: Doc = serde_json::from_str(
            r#"{"layout":[42,{"id":"tasks","x":10,"y":20},null,"pomodoro"]}"#,
        )
        .unwrap();
        assert_eq!(doc.layout.len(), 1);
        assert_eq!(doc.layout[0].id, "tasks");
        assert_eq!(doc.layout[0].x, 10.0);
    }

    #[test]
    fn stored_form_of_entry_carries_anchor_strings() {
        let entry = LayoutEntry {
            id: WidgetId::Tasks,
            x: 12.0,
            y: 640.0,
            anchor: Some(Anchor::new(
                Some((HorizontalEdge::Left, 12.0)),
                Some((VerticalEdge::Bottom, 0.0)),
            )),
        };
        let stored = StoredLayoutEntry::from(&entry);
        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "tasks",
                "x": 12.0,
                "y": 640.0,
                "anchor": {"horizontal": "left", "offsetX": 12.0, "vertical": "bottom", "offsetY": 0.0}
            })
        );
    }
}
