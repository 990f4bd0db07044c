use serde::{Deserialize, Serialize};

use crate::widget::WidgetId;

/// Inline CSS edge properties for a widget element, in pixels.
///
/// Exactly one of `left`/`right` and one of `top`/`bottom` is set. The
/// other edge of each pair must be cleared by the renderer so that an
/// element anchored to `right` or `bottom` tracks viewport resizes through
/// CSS alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgePlacement {
    pub left: Option<f64>,
    pub right: Option<f64>,
    pub top: Option<f64>,
    pub bottom: Option<f64>,
}

/// A single, stateless instruction for the host page.
///
/// The layout engine never touches the DOM itself; each operation returns a
/// `Vec<LayoutCommand>` that the page script applies in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LayoutCommand {
    /// Write the element's edge properties.
    Place { id: WidgetId, edges: EdgePlacement },

    /// Toggle drag-active styling on the element.
    SetDragActive { id: WidgetId, active: bool },

    /// `element.setPointerCapture(pointerId)`.
    #[serde(rename_all = "camelCase")]
    CapturePointer { id: WidgetId, pointer_id: i32 },

    /// `element.releasePointerCapture(pointerId)`.
    #[serde(rename_all = "camelCase")]
    ReleasePointer { id: WidgetId, pointer_id: i32 },

    /// Attach (or detach) the window-level pointer move/up/cancel listeners
    /// that feed an active drag.
    ListenGlobalPointer { enabled: bool },

    /// Remove the initial-placement marker class that suppresses the entry
    /// transition on first paint.
    ClearInitialPlacement { id: WidgetId },
}
