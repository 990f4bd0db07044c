use newtab_layout_protocol::{
    Anchor, HorizontalEdge, Position, Size, VerticalEdge, ViewportSize, WidgetId,
};
use tracing::debug;

use crate::anchor::{OffsetPrecision, clone_anchor};
use crate::config::LayoutConfig;
use crate::geometry::{clamp_position, resolve_anchored_coordinates};
use crate::metrics::{ElementMetrics, measured_size};
use crate::store::{LayoutStore, Placement};

/// Give every known widget a valid, clamped placement for `viewport`.
///
/// Missing entries and entries with non-finite coordinates get a default
/// slot: right-aligned, cascading down from the top padding. Existing
/// entries keep their anchor; anchored axes are re-derived against the
/// current viewport, then everything is clamped.
///
/// Idempotent for an unchanged viewport and store.
pub fn ensure_layout_entries(
    store: &mut LayoutStore,
    metrics: &impl ElementMetrics,
    viewport: ViewportSize,
    config: &LayoutConfig,
) {
    let bounds = viewport.bounds();
    let mut cursor_y = bounds.top + config.clamp_padding;

    for id in WidgetId::ALL {
        let size = measured_size(metrics, id, config.fallback_size);

        let current = store
            .get(id)
            .copied()
            .filter(|placement| placement.position.is_finite());
        let placement = match current {
            Some(placement) => placement,
            None => {
                debug!(%id, cursor_y, "assigning default widget position");
                default_placement(viewport, size, cursor_y, config)
            }
        };

        let anchor = placement
            .anchor
            .as_ref()
            .and_then(|a| clone_anchor(a, OffsetPrecision::Hundredths));
        let target = match &anchor {
            Some(anchor) => resolve_anchored_coordinates(
                viewport,
                size,
                anchor,
                placement.position.x,
                placement.position.y,
            ),
            None => placement.position,
        };
        let position = clamp_position(bounds, size, config.clamp_padding, target.x, target.y);
        store.set(id, Placement::new(position, anchor));

        cursor_y = cursor_y.max(position.y + size.height + config.default_gap);
    }
}

/// Default slot for a widget whose top edge sits at `y`: flush right
/// (inside padding), anchored to the top-right corner.
fn default_placement(
    viewport: ViewportSize,
    size: Size,
    y: f64,
    config: &LayoutConfig,
) -> Placement {
    let position = clamp_position(
        viewport.bounds(),
        size,
        config.clamp_padding,
        viewport.width - size.width - config.clamp_padding,
        y,
    );
    let anchor = Anchor::new(
        Some((
            HorizontalEdge::Right,
            (viewport.width - size.width - position.x).max(0.0),
        )),
        Some((VerticalEdge::Top, position.y.max(0.0))),
    );
    Placement::new(position, clone_anchor(&anchor, OffsetPrecision::Whole))
}

/// Default positions for every widget, ignoring whatever is stored.
pub fn default_layout(
    metrics: &impl ElementMetrics,
    viewport: ViewportSize,
    config: &LayoutConfig,
) -> LayoutStore {
    let mut store = LayoutStore::new();
    ensure_layout_entries(&mut store, metrics, viewport, config);
    store
}

/// Position a widget would have with no stored entry and nothing placed
/// above it. Used as a drag origin of last resort.
pub fn first_slot(viewport: ViewportSize, size: Size, config: &LayoutConfig) -> Position {
    default_placement(viewport, size, viewport.bounds().top + config.clamp_padding, config).position
}
