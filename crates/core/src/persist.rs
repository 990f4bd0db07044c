use newtab_layout_protocol::{LayoutEntry, StoredLayoutEntry, ViewportSize, WidgetId};
use tracing::{debug, warn};

use crate::anchor::anchors_equivalent;
use crate::config::LayoutConfig;
use crate::geometry::derive_anchor_from_position;
use crate::metrics::{ElementMetrics, measured_size};
use crate::settings::LayoutSink;
use crate::store::{LayoutStore, Placement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The layout matched what was last persisted; nothing was written.
    Unchanged,
    Written,
    /// The sink rejected the write. The store stays authoritative and the
    /// next persist retries the same diff.
    Failed,
}

/// Writes the layout store through to settings, skipping no-op writes.
#[derive(Debug, Clone, Default)]
pub struct PersistenceBridge {
    last_persisted: Option<Vec<LayoutEntry>>,
    /// What `last_persisted` held before the latest accepted write, until the
    /// host confirms or rejects that write.
    before_write: Option<Option<Vec<LayoutEntry>>>,
}

impl PersistenceBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `entries` as what settings currently hold (after hydration).
    pub fn remember(&mut self, entries: Vec<LayoutEntry>) {
        self.last_persisted = Some(entries);
        self.before_write = None;
    }

    pub fn last_persisted(&self) -> Option<&[LayoutEntry]> {
        self.last_persisted.as_deref()
    }

    /// The host failed to store the layout it was handed by the last write.
    /// Forget that write so the next persist diffs against what storage
    /// actually holds and writes again. Returns false when there was no
    /// write to roll back.
    pub fn rollback_write(&mut self) -> bool {
        match self.before_write.take() {
            Some(previous) => {
                warn!("host failed to store widget layout, will retry on next persist");
                self.last_persisted = previous;
                true
            }
            None => false,
        }
    }

    /// Re-derive anchors from current positions, then write the layout if it
    /// differs from the last persisted one.
    ///
    /// Only widgets that have an element get a fresh anchor; the rest are
    /// serialized as stored.
    pub fn persist(
        &mut self,
        store: &mut LayoutStore,
        metrics: &impl ElementMetrics,
        viewport: ViewportSize,
        config: &LayoutConfig,
        sink: &mut impl LayoutSink,
    ) -> PersistOutcome {
        self.before_write = None;
        for id in WidgetId::ALL {
            if metrics.size(id).is_none() {
                continue;
            }
            let Some(current) = store.get(id).copied() else {
                continue;
            };
            let size = measured_size(metrics, id, config.fallback_size);
            let anchor =
                derive_anchor_from_position(size, current.position, viewport, config.anchor_threshold);
            store.set(id, Placement::new(current.position, anchor));
        }

        let entries = store.to_entries();
        if self
            .last_persisted
            .as_deref()
            .is_some_and(|last| layouts_equal(last, &entries))
        {
            debug!("layout unchanged, skipping write");
            return PersistOutcome::Unchanged;
        }

        let stored = entries.iter().map(StoredLayoutEntry::from).collect();
        match sink.write_layout(stored) {
            Ok(()) => {
                debug!(entries = entries.len(), "persisted widget layout");
                self.before_write = Some(self.last_persisted.replace(entries));
                PersistOutcome::Written
            }
            Err(e) => {
                warn!("failed to persist widget layout: {e}");
                PersistOutcome::Failed
            }
        }
    }
}

/// Field-by-field layout comparison: ids, coordinates and anchors with
/// offsets rounded to whole pixels.
pub fn layouts_equal(a: &[LayoutEntry], b: &[LayoutEntry]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(a, b)| {
            a.id == b.id
                && same_coordinate(a.x, b.x)
                && same_coordinate(a.y, b.y)
                && anchors_equivalent(a.anchor.as_ref(), b.anchor.as_ref())
        })
}

fn same_coordinate(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}
