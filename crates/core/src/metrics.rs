use std::collections::BTreeMap;

use newtab_layout_protocol::{Position, Size, WidgetId};
use serde::{Deserialize, Serialize};

/// Read-only view of the widget elements currently on the page.
pub trait ElementMetrics {
    /// Layout-box size of the widget's element (`offsetWidth`/`offsetHeight`,
    /// unaffected by drag-time transforms), or `None` if the widget has no
    /// element.
    fn size(&self, id: WidgetId) -> Option<Size>;

    /// Top-left corner of the element as currently rendered.
    fn origin(&self, id: WidgetId) -> Option<Position>;

    /// Whether the element is still attached to the document.
    fn is_connected(&self, id: WidgetId) -> bool;

    /// Whether the element still carries the initial-placement marker class.
    fn has_initial_marker(&self, id: WidgetId) -> bool;
}

/// Element size with empty or broken measurements replaced by `fallback`.
pub fn measured_size(metrics: &impl ElementMetrics, id: WidgetId, fallback: Size) -> Size {
    match metrics.size(id) {
        Some(size) if size.is_measurable() => size,
        _ => fallback,
    }
}

/// Measurements of one element, as sent over by the page script.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub top: f64,
    #[serde(default = "connected")]
    pub connected: bool,
    #[serde(default)]
    pub initial: bool,
}

fn connected() -> bool {
    true
}

/// A captured set of element measurements keyed by widget.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsSnapshot {
    elements: BTreeMap<WidgetId, ElementSnapshot>,
}

impl MetricsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: WidgetId, element: ElementSnapshot) {
        self.elements.insert(id, element);
    }

    pub fn remove(&mut self, id: WidgetId) -> Option<ElementSnapshot> {
        self.elements.remove(&id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut ElementSnapshot> {
        self.elements.get_mut(&id)
    }
}

impl ElementMetrics for MetricsSnapshot {
    fn size(&self, id: WidgetId) -> Option<Size> {
        self.elements
            .get(&id)
            .map(|e| Size::new(e.width, e.height))
    }

    fn origin(&self, id: WidgetId) -> Option<Position> {
        self.elements.get(&id).map(|e| Position::new(e.left, e.top))
    }

    fn is_connected(&self, id: WidgetId) -> bool {
        self.elements.get(&id).is_some_and(|e| e.connected)
    }

    fn has_initial_marker(&self, id: WidgetId) -> bool {
        self.elements.get(&id).is_some_and(|e| e.initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_measurement_uses_fallback() {
        let mut metrics = MetricsSnapshot::new();
        metrics.insert(
            WidgetId::Weather,
            ElementSnapshot {
                width: 0.0,
                height: 0.0,
                left: 0.0,
                top: 0.0,
                connected: true,
                initial: false,
            },
        );
        let fallback = Size::new(300.0, 200.0);
        assert_eq!(measured_size(&metrics, WidgetId::Weather, fallback), fallback);
        assert_eq!(measured_size(&metrics, WidgetId::Tasks, fallback), fallback);
    }

    #[test]
    fn snapshot_parses_page_json() {
        let metrics: MetricsSnapshot = serde_json::from_str(
            r#"{"tasks": {"width": 240, "height": 180, "left": 5, "top": 6, "initial": true}}"#,
        )
        .unwrap();
        assert_eq!(metrics.size(WidgetId::Tasks), Some(Size::new(240.0, 180.0)));
        assert_eq!(metrics.origin(WidgetId::Tasks), Some(Position::new(5.0, 6.0)));
        assert!(metrics.is_connected(WidgetId::Tasks));
        assert!(metrics.has_initial_marker(WidgetId::Tasks));
        assert!(!metrics.is_connected(WidgetId::Weather));
    }
}
