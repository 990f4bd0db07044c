//! Pure coordinate math: clamping and conversion between absolute
//! positions and edge anchors.

use newtab_layout_protocol::{
    Anchor, Bounds, HorizontalEdge, Position, Size, VerticalEdge, ViewportSize,
};

/// Constrain a widget's origin to `bounds`, keeping `pad` pixels clear of
/// every edge.
///
/// When the widget does not fit (the lower limit exceeds the upper one),
/// the lower limit wins so the widget's leading edge stays visible.
pub fn clamp_position(bounds: Bounds, size: Size, pad: f64, x: f64, y: f64) -> Position {
    Position {
        x: clamp_axis(x, bounds.left + pad, bounds.right - size.width - pad),
        y: clamp_axis(y, bounds.top + pad, bounds.bottom - size.height - pad),
    }
}

fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    // `f64::clamp` panics when min > max; this ordering degrades to `min`.
    value.min(max).max(min)
}

/// Absolute coordinates for a widget pinned by `anchor`.
///
/// Axes the anchor pins are measured from their edge; an anchored axis with
/// no explicit offset keeps the distance implied by the fallback coordinate.
/// Unpinned axes pass the fallback through unchanged.
pub fn resolve_anchored_coordinates(
    viewport: ViewportSize,
    size: Size,
    anchor: &Anchor,
    fallback_x: f64,
    fallback_y: f64,
) -> Position {
    let x = match anchor.horizontal {
        Some(HorizontalEdge::Left) => anchor.offset_x.unwrap_or(fallback_x),
        Some(HorizontalEdge::Right) => {
            let far = viewport.width - size.width;
            far - anchor.offset_x.unwrap_or(far - fallback_x)
        }
        None => fallback_x,
    };
    let y = match anchor.vertical {
        Some(VerticalEdge::Top) => anchor.offset_y.unwrap_or(fallback_y),
        Some(VerticalEdge::Bottom) => {
            let far = viewport.height - size.height;
            far - anchor.offset_y.unwrap_or(far - fallback_y)
        }
        None => fallback_y,
    };
    Position { x, y }
}

/// Anchor a widget to every edge it sits within `threshold` pixels of.
///
/// Each axis independently picks the nearer edge, preferring left/top on a
/// tie. Offsets are rounded to whole pixels and never negative, so a widget
/// overhanging an edge snaps flush to it. Returns `None` when neither axis
/// is close enough to an edge.
pub fn derive_anchor_from_position(
    size: Size,
    position: Position,
    viewport: ViewportSize,
    threshold: f64,
) -> Option<Anchor> {
    let horizontal = nearest_edge(
        position.x,
        viewport.width - (position.x + size.width),
        threshold,
    )
    .map(|(start, offset)| {
        let edge = if start {
            HorizontalEdge::Left
        } else {
            HorizontalEdge::Right
        };
        (edge, offset)
    });
    let vertical = nearest_edge(
        position.y,
        viewport.height - (position.y + size.height),
        threshold,
    )
    .map(|(start, offset)| {
        let edge = if start {
            VerticalEdge::Top
        } else {
            VerticalEdge::Bottom
        };
        (edge, offset)
    });

    if horizontal.is_none() && vertical.is_none() {
        return None;
    }
    Some(Anchor::new(horizontal, vertical))
}

/// `(is_start_edge, offset)` for the nearer of two edge distances, if it is
/// within `threshold`.
fn nearest_edge(to_start: f64, to_end: f64, threshold: f64) -> Option<(bool, f64)> {
    if !to_start.is_finite() || !to_end.is_finite() {
        return None;
    }
    let (start, distance) = if to_start <= to_end {
        (true, to_start)
    } else {
        (false, to_end)
    };
    (distance <= threshold).then(|| (start, distance.round().max(0.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAD: f64 = 16.0;
    const THRESHOLD: f64 = 32.0;

    fn viewport() -> ViewportSize {
        ViewportSize::new(1200.0, 800.0)
    }

    fn widget() -> Size {
        Size::new(240.0, 180.0)
    }

    #[test]
    fn clamp_keeps_widget_inside_padding() {
        let bounds = viewport().bounds();
        for (x, y) in [(-500.0, -500.0), (5000.0, 5000.0), (300.0, 200.0), (0.0, 790.0)] {
            let p = clamp_position(bounds, widget(), PAD, x, y);
            assert!(p.x >= bounds.left + PAD && p.x <= bounds.right - 240.0 - PAD);
            assert!(p.y >= bounds.top + PAD && p.y <= bounds.bottom - 180.0 - PAD);
        }
        assert_eq!(
            clamp_position(bounds, widget(), PAD, 300.0, 200.0),
            Position::new(300.0, 200.0)
        );
    }

    #[test]
    fn clamp_oversized_widget_pins_to_min() {
        let bounds = ViewportSize::new(200.0, 100.0).bounds();
        let p = clamp_position(bounds, widget(), PAD, 50.0, 50.0);
        assert_eq!(p, Position::new(PAD, PAD));
        assert!(p.is_finite());
    }

    #[test]
    fn resolve_measures_from_far_edges() {
        let anchor = Anchor::new(
            Some((HorizontalEdge::Right, 40.0)),
            Some((VerticalEdge::Bottom, 10.0)),
        );
        let p = resolve_anchored_coordinates(viewport(), widget(), &anchor, 0.0, 0.0);
        assert_eq!(p, Position::new(1200.0 - 240.0 - 40.0, 800.0 - 180.0 - 10.0));
    }

    #[test]
    fn resolve_passes_through_unanchored_axis() {
        let anchor = Anchor::new(Some((HorizontalEdge::Left, 24.0)), None);
        let p = resolve_anchored_coordinates(viewport(), widget(), &anchor, 500.0, 333.0);
        assert_eq!(p, Position::new(24.0, 333.0));
    }

    #[test]
    fn resolve_without_offset_keeps_fallback_distance() {
        let anchor = Anchor {
            horizontal: Some(HorizontalEdge::Right),
            vertical: Some(VerticalEdge::Top),
            ..Default::default()
        };
        let p = resolve_anchored_coordinates(viewport(), widget(), &anchor, 900.0, 60.0);
        assert_eq!(p, Position::new(900.0, 60.0));
    }

    #[test]
    fn derive_anchors_to_nearby_edges() {
        let top_right =
            derive_anchor_from_position(widget(), Position::new(960.0, 24.0), viewport(), THRESHOLD);
        assert_eq!(
            top_right,
            Some(Anchor::new(
                Some((HorizontalEdge::Right, 0.0)),
                Some((VerticalEdge::Top, 24.0)),
            ))
        );

        let bottom_left =
            derive_anchor_from_position(widget(), Position::new(12.0, 640.0), viewport(), THRESHOLD);
        assert_eq!(
            bottom_left,
            Some(Anchor::new(
                Some((HorizontalEdge::Left, 12.0)),
                Some((VerticalEdge::Bottom, 0.0)),
            ))
        );

        let floating =
            derive_anchor_from_position(widget(), Position::new(400.0, 220.0), viewport(), THRESHOLD);
        assert_eq!(floating, None);
    }

    #[test]
    fn derive_single_axis() {
        let anchor =
            derive_anchor_from_position(widget(), Position::new(500.0, 30.0), viewport(), THRESHOLD)
                .unwrap();
        assert_eq!(anchor.horizontal, None);
        assert_eq!(anchor.offset_x, None);
        assert_eq!(anchor.vertical, Some(VerticalEdge::Top));
        assert_eq!(anchor.offset_y, Some(30.0));
    }

    #[test]
    fn derive_tie_prefers_start_edges() {
        let vp = ViewportSize::new(260.0, 200.0);
        let anchor =
            derive_anchor_from_position(Size::new(240.0, 180.0), Position::new(10.0, 10.0), vp, THRESHOLD)
                .unwrap();
        assert_eq!(anchor.horizontal, Some(HorizontalEdge::Left));
        assert_eq!(anchor.vertical, Some(VerticalEdge::Top));
    }

    #[test]
    fn derive_then_resolve_round_trips() {
        let positions = [
            Position::new(8.4, 300.0),
            Position::new(945.6, 17.2),
            Position::new(950.0, 600.0),
            Position::new(20.0, 590.7),
        ];
        for original in positions {
            let anchor =
                derive_anchor_from_position(widget(), original, viewport(), THRESHOLD).unwrap();
            let resolved =
                resolve_anchored_coordinates(viewport(), widget(), &anchor, original.x, original.y);
            assert!((resolved.x - original.x).abs() <= 1.0, "{original:?} -> {resolved:?}");
            assert!((resolved.y - original.y).abs() <= 1.0, "{original:?} -> {resolved:?}");
        }
    }
}
