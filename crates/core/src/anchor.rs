//! Anchor sanitization. Every anchor that enters the layout store, whether
//! produced by a drag or read back from settings, passes through here.

use newtab_layout_protocol::{Anchor, HorizontalEdge, RawAnchor, VerticalEdge};

/// Rounding applied to anchor offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetPrecision {
    /// Whole pixels, as persisted.
    Whole,
    /// Hundredths of a pixel, kept while a widget is live on the page.
    Hundredths,
}

impl OffsetPrecision {
    pub fn round(&self, value: f64) -> f64 {
        match self {
            Self::Whole => value.round(),
            Self::Hundredths => (value * 100.0).round() / 100.0,
        }
    }
}

/// A finite, non-negative offset rounded to `precision`, or `None`.
pub fn normalize_offset(value: Option<f64>, precision: OffsetPrecision) -> Option<f64> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| precision.round(v))
}

/// Copy an anchor, re-normalizing its offsets. Offsets without an edge are
/// dropped; an anchor left without any axis becomes `None`.
pub fn clone_anchor(anchor: &Anchor, precision: OffsetPrecision) -> Option<Anchor> {
    let horizontal = anchor.horizontal;
    let vertical = anchor.vertical;
    let cloned = Anchor {
        horizontal,
        offset_x: horizontal.and_then(|_| normalize_offset(anchor.offset_x, precision)),
        vertical,
        offset_y: vertical.and_then(|_| normalize_offset(anchor.offset_y, precision)),
    };
    cloned.has_axis().then_some(cloned)
}

/// Build a typed anchor from untrusted persisted data.
///
/// Unknown edge names (e.g. `"centre"`) drop their whole axis; negative or
/// non-finite offsets are discarded.
pub fn sanitize_anchor(raw: &RawAnchor, precision: OffsetPrecision) -> Option<Anchor> {
    let anchor = Anchor {
        horizontal: raw.horizontal.as_deref().and_then(HorizontalEdge::parse),
        offset_x: raw.offset_x,
        vertical: raw.vertical.as_deref().and_then(VerticalEdge::parse),
        offset_y: raw.offset_y,
    };
    clone_anchor(&anchor, precision)
}

/// Whether two anchors are equal once offsets are rounded to whole pixels.
pub fn anchors_equivalent(a: Option<&Anchor>, b: Option<&Anchor>) -> bool {
    let a = a.and_then(|a| clone_anchor(a, OffsetPrecision::Whole));
    let b = b.and_then(|b| clone_anchor(b, OffsetPrecision::Whole));
    a == b
}
