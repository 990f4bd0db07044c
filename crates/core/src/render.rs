use newtab_layout_protocol::{
    Anchor, EdgePlacement, HorizontalEdge, Position, Size, VerticalEdge, ViewportSize,
};

use crate::anchor::{OffsetPrecision, clone_anchor};
use crate::config::LayoutConfig;
use crate::geometry::{clamp_position, resolve_anchored_coordinates};
use crate::store::Placement;

/// Options for [`crate::LayoutController::apply_widget_position`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PositionOptions {
    /// Write the resulting placement back into the layout store.
    pub update_layout: bool,
    /// Anchor to place by; `None` places by absolute coordinates.
    pub anchor: Option<Anchor>,
}

impl PositionOptions {
    pub fn store(anchor: Option<Anchor>) -> Self {
        Self {
            update_layout: true,
            anchor,
        }
    }

    pub fn paint_only(anchor: Option<Anchor>) -> Self {
        Self {
            update_layout: false,
            anchor,
        }
    }
}

/// Where a widget ends up and which CSS edges express it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderedPosition {
    pub placement: Placement,
    pub edges: EdgePlacement,
}

/// Resolve the final placement of a widget and its CSS edges.
///
/// Anchored axes come from the anchor and are not clamped, since the anchor
/// offset already encodes the margin; free axes use `x`/`y` clamped inside
/// the padding. A right- or bottom-anchored axis is written as the `right`
/// or `bottom` property so it keeps tracking that edge when the viewport
/// resizes.
pub fn compute_placement(
    viewport: ViewportSize,
    size: Size,
    config: &LayoutConfig,
    x: f64,
    y: f64,
    anchor: Option<&Anchor>,
) -> RenderedPosition {
    let anchor = anchor.and_then(|a| clone_anchor(a, OffsetPrecision::Hundredths));
    let target = match &anchor {
        Some(anchor) => resolve_anchored_coordinates(viewport, size, anchor, x, y),
        None => Position::new(x, y),
    };
    let clamped = clamp_position(
        viewport.bounds(),
        size,
        config.clamp_padding,
        target.x,
        target.y,
    );

    let horizontal = anchor.and_then(|a| a.horizontal);
    let vertical = anchor.and_then(|a| a.vertical);
    let position = Position::new(
        if horizontal.is_some() { target.x } else { clamped.x },
        if vertical.is_some() { target.y } else { clamped.y },
    );

    let mut edges = EdgePlacement::default();
    match horizontal {
        Some(HorizontalEdge::Right) => {
            edges.right = Some(
                anchor
                    .and_then(|a| a.offset_x)
                    .unwrap_or(viewport.width - size.width - position.x),
            );
        }
        _ => edges.left = Some(position.x),
    }
    match vertical {
        Some(VerticalEdge::Bottom) => {
            edges.bottom = Some(
                anchor
                    .and_then(|a| a.offset_y)
                    .unwrap_or(viewport.height - size.height - position.y),
            );
        }
        _ => edges.top = Some(position.y),
    }

    RenderedPosition {
        placement: Placement::new(position, anchor),
        edges,
    }
}
