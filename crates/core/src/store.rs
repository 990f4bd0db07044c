use std::collections::BTreeMap;

use newtab_layout_protocol::{Anchor, LayoutEntry, Position, StoredLayoutEntry, WidgetId};
use tracing::debug;

use crate::anchor::{OffsetPrecision, clone_anchor, sanitize_anchor};

/// Current placement of one widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Position,
    pub anchor: Option<Anchor>,
}

impl Placement {
    pub fn new(position: Position, anchor: Option<Anchor>) -> Self {
        Self { position, anchor }
    }
}

/// In-memory map from widget to placement, the source of truth for
/// rendering until the next persist.
///
/// Entries are replaced whole (`set`), never edited in place. Iteration
/// follows canonical widget order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutStore {
    entries: BTreeMap<WidgetId, Placement>,
}

impl LayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-sanitized entries. Later duplicates of an
    /// id are ignored.
    pub fn from_entries(entries: &[LayoutEntry]) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store.entries.entry(entry.id).or_insert_with(|| {
                Placement::new(
                    Position::new(entry.x, entry.y),
                    entry
                        .anchor
                        .as_ref()
                        .and_then(|a| clone_anchor(a, OffsetPrecision::Whole)),
                )
            });
        }
        store
    }

    pub fn get(&self, id: WidgetId) -> Option<&Placement> {
        self.entries.get(&id)
    }

    pub fn set(&mut self, id: WidgetId, placement: Placement) {
        self.entries.insert(id, placement);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WidgetId, &Placement)> {
        self.entries.iter().map(|(id, placement)| (*id, placement))
    }

    /// Serialize every entry, cloning anchors at whole-pixel precision.
    pub fn to_entries(&self) -> Vec<LayoutEntry> {
        self.iter()
            .map(|(id, placement)| LayoutEntry {
                id,
                x: placement.position.x,
                y: placement.position.y,
                anchor: placement
                    .anchor
                    .as_ref()
                    .and_then(|a| clone_anchor(a, OffsetPrecision::Whole)),
            })
            .collect()
    }
}

/// Turn persisted layout records into typed entries.
///
/// Unknown ids and repeated ids are dropped (first occurrence wins) and
/// anchors are sanitized. Coordinates are kept even when non-finite; the
/// reconciler replaces those with defaults.
pub fn sanitize_entries(stored: &[StoredLayoutEntry]) -> Vec<LayoutEntry> {
    let mut seen = Vec::with_capacity(WidgetId::ALL.len());
    let mut entries = Vec::with_capacity(stored.len());
    for record in stored {
        let Ok(id) = record.id.parse::<WidgetId>() else {
            debug!(id = %record.id, "dropping layout entry for unknown widget");
            continue;
        };
        if seen.contains(&id) {
            debug!(%id, "dropping duplicate layout entry");
            continue;
        }
        seen.push(id);
        entries.push(LayoutEntry {
            id,
            x: record.x,
            y: record.y,
            anchor: record
                .anchor
                .as_ref()
                .and_then(|raw| sanitize_anchor(raw, OffsetPrecision::Whole)),
        });
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use newtab_layout_protocol::{HorizontalEdge, RawAnchor};

    fn stored(id: &str, x: f64, y: f64) -> StoredLayoutEntry {
        StoredLayoutEntry {
            id: id.into(),
            x,
            y,
            anchor: None,
        }
    }

    #[test]
    fn sanitize_drops_unknown_and_duplicate_ids() {
        let entries = sanitize_entries(&[
            stored("tasks", 1.0, 2.0),
            stored("clock", 3.0, 4.0),
            stored("tasks", 5.0, 6.0),
            stored("weather", 7.0, 8.0),
        ]);
        let ids: Vec<_> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![WidgetId::Tasks, WidgetId::Weather]);
        assert_eq!(entries[0].x, 1.0);
    }

    #[test]
    fn sanitize_keeps_non_finite_coordinates_for_reconciliation() {
        let entries = sanitize_entries(&[stored("pomodoro", f64::NAN, 10.0)]);
        assert_eq!(entries.len(), 1);
        assert!(entries[0].x.is_nan());
    }

    #[test]
    fn sanitize_strips_invalid_anchor() {
        let mut record = stored("weather", 10.0, 10.0);
        record.anchor = Some(RawAnchor {
            horizontal: Some("centre".into()),
            offset_x: Some(-5.0),
            ..Default::default()
        });
        let entries = sanitize_entries(&[record]);
        assert_eq!(entries[0].anchor, None);
    }

    #[test]
    fn serializes_in_canonical_order_with_rounded_anchors() {
        let mut store = LayoutStore::new();
        store.set(
            WidgetId::Tasks,
            Placement::new(Position::new(1.0, 2.0), None),
        );
        store.set(
            WidgetId::Weather,
            Placement::new(
                Position::new(3.0, 4.0),
                Some(Anchor::new(Some((HorizontalEdge::Right, 12.4)), None)),
            ),
        );
        let entries = store.to_entries();
        assert_eq!(entries[0].id, WidgetId::Weather);
        assert_eq!(entries[0].anchor.unwrap().offset_x, Some(12.0));
        assert_eq!(entries[1].id, WidgetId::Tasks);
    }

    #[test]
    fn from_entries_keeps_first_duplicate() {
        let entry = |x| LayoutEntry {
            id: WidgetId::Pomodoro,
            x,
            y: 0.0,
            anchor: None,
        };
        let store = LayoutStore::from_entries(&[entry(1.0), entry(2.0)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(WidgetId::Pomodoro).unwrap().position.x, 1.0);
    }
}
