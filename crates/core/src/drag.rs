use newtab_layout_protocol::{Point, Position, WidgetId};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Elements inside which a pointerdown never starts a drag. The host tests
/// `target.closest(INTERACTIVE_SELECTOR)` so nested targets count too.
pub const INTERACTIVE_SELECTOR: &str = "button, a, input, select, textarea";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Mouse,
    Touch,
    Pen,
}

/// The fields of a DOM `PointerEvent` the drag controller looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerInput {
    pub pointer_id: i32,
    pub client: Point,
    #[serde(default)]
    pub button: i16,
    pub pointer_type: PointerKind,
    /// The event target is inside an [`INTERACTIVE_SELECTOR`] element.
    #[serde(default)]
    pub target_interactive: bool,
}

impl PointerInput {
    /// Primary mouse button, or any touch/pen contact.
    pub fn is_primary_press(&self) -> bool {
        match self.pointer_type {
            PointerKind::Mouse => self.button == 0,
            PointerKind::Touch | PointerKind::Pen => true,
        }
    }
}

/// An in-progress drag of one widget by one pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub widget: WidgetId,
    pub pointer_id: i32,
    pub origin: Position,
    pub start_client: Point,
    /// Most recent position computed from pointer movement.
    pub last: Position,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Why a pointerdown did not start a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRejection {
    AlreadyDragging,
    InteractiveTarget,
    SecondaryButton,
}

/// Tracks the single drag session allowed at a time.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Start dragging `widget` from `origin` if the press qualifies.
    pub fn begin(
        &mut self,
        widget: WidgetId,
        input: &PointerInput,
        origin: Position,
    ) -> Result<DragSession, DragRejection> {
        if let DragState::Dragging(active) = &self.state {
            debug!(
                %widget,
                active = %active.widget,
                pointer_id = input.pointer_id,
                "ignoring pointerdown during active drag"
            );
            return Err(DragRejection::AlreadyDragging);
        }
        if input.target_interactive {
            return Err(DragRejection::InteractiveTarget);
        }
        if !input.is_primary_press() {
            return Err(DragRejection::SecondaryButton);
        }
        let session = DragSession {
            widget,
            pointer_id: input.pointer_id,
            origin,
            start_client: input.client,
            last: origin,
        };
        self.state = DragState::Dragging(session);
        Ok(session)
    }

    /// Follow the pointer. Returns the widget and its new unclamped position,
    /// or `None` for events from other pointers.
    pub fn track(&mut self, input: &PointerInput) -> Option<(WidgetId, Position)> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };
        if session.pointer_id != input.pointer_id {
            return None;
        }
        session.last = session.origin.translated(session.start_client, input.client);
        Some((session.widget, session.last))
    }

    /// Record a position actually applied for the active drag (after
    /// clamping), so release snaps to what the user saw.
    pub fn settle(&mut self, position: Position) {
        if let DragState::Dragging(session) = &mut self.state {
            session.last = position;
        }
    }

    /// End the session owned by `pointer_id`, returning it.
    pub fn finish(&mut self, pointer_id: i32) -> Option<DragSession> {
        match self.state {
            DragState::Dragging(session) if session.pointer_id == pointer_id => {
                self.state = DragState::Idle;
                Some(session)
            }
            _ => None,
        }
    }
}
