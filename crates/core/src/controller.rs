use newtab_layout_protocol::{LayoutCommand, Position, ViewportSize, WidgetId};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::drag::{DragController, DragSession, PointerInput};
use crate::metrics::{ElementMetrics, measured_size};
use crate::persist::{PersistOutcome, PersistenceBridge};
use crate::reconcile::{self, first_slot};
use crate::render::{PositionOptions, compute_placement};
use crate::settings::{LayoutSink, Settings};
use crate::store::{LayoutStore, Placement, sanitize_entries};

/// Result of writing the layout through to settings, with the repaint that
/// re-derived anchors call for.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    pub outcome: PersistOutcome,
    pub commands: Vec<LayoutCommand>,
}

/// Page-level owner of the widget layout.
///
/// Holds the layout store, the drag session and the persistence state for
/// one page. Every event handler returns the DOM commands the page must
/// apply; nothing here touches the DOM or storage directly.
#[derive(Debug, Clone)]
pub struct LayoutController {
    config: LayoutConfig,
    viewport: ViewportSize,
    store: LayoutStore,
    drag: DragController,
    bridge: PersistenceBridge,
    /// Widgets whose initial-placement marker goes on the next frame.
    next_frame: Vec<WidgetId>,
    persist_pending: bool,
}

impl LayoutController {
    pub fn new(config: LayoutConfig, viewport: ViewportSize) -> Self {
        Self {
            config,
            viewport,
            store: LayoutStore::new(),
            drag: DragController::new(),
            bridge: PersistenceBridge::new(),
            next_frame: Vec::new(),
            persist_pending: false,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    pub fn drag_session(&self) -> Option<&DragSession> {
        self.drag.session()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn has_pending_persist(&self) -> bool {
        self.persist_pending
    }

    /// Rebuild the store from `settings` and paint every widget.
    ///
    /// Also the entry point for settings changed by another browser
    /// instance.
    pub fn load_widget_layout(
        &mut self,
        settings: &Settings,
        metrics: &impl ElementMetrics,
    ) -> Vec<LayoutCommand> {
        let entries = sanitize_entries(&settings.widgets.layout);
        debug!(
            stored = settings.widgets.layout.len(),
            kept = entries.len(),
            "loading widget layout"
        );
        self.store = LayoutStore::from_entries(&entries);
        self.bridge.remember(entries);
        self.ensure_layout_entries(metrics);
        self.render_all(metrics)
    }

    pub fn ensure_layout_entries(&mut self, metrics: &impl ElementMetrics) {
        reconcile::ensure_layout_entries(&mut self.store, metrics, self.viewport, &self.config);
    }

    pub fn on_resize(
        &mut self,
        viewport: ViewportSize,
        metrics: &impl ElementMetrics,
    ) -> Vec<LayoutCommand> {
        self.viewport = viewport;
        self.ensure_layout_entries(metrics);
        self.render_all(metrics)
    }

    /// Paint every widget that has an element, except one being dragged.
    pub fn render_all(&mut self, metrics: &impl ElementMetrics) -> Vec<LayoutCommand> {
        let dragging = self.drag.session().map(|s| s.widget);
        let targets: Vec<(WidgetId, Placement)> = self
            .store
            .iter()
            .filter(|(id, _)| Some(*id) != dragging && metrics.size(*id).is_some())
            .map(|(id, placement)| (id, *placement))
            .collect();

        let mut commands = Vec::with_capacity(targets.len());
        for (id, placement) in targets {
            self.place(
                id,
                placement.position,
                PositionOptions::paint_only(placement.anchor),
                metrics,
                &mut commands,
            );
        }
        commands
    }

    /// Place one widget at `(x, y)`, or by `options.anchor` if given.
    pub fn apply_widget_position(
        &mut self,
        id: WidgetId,
        x: f64,
        y: f64,
        options: PositionOptions,
        metrics: &impl ElementMetrics,
    ) -> Vec<LayoutCommand> {
        let mut commands = Vec::with_capacity(1);
        self.place(id, Position::new(x, y), options, metrics, &mut commands);
        commands
    }

    fn place(
        &mut self,
        id: WidgetId,
        at: Position,
        options: PositionOptions,
        metrics: &impl ElementMetrics,
        out: &mut Vec<LayoutCommand>,
    ) -> Placement {
        let size = measured_size(metrics, id, self.config.fallback_size);
        let rendered = compute_placement(
            self.viewport,
            size,
            &self.config,
            at.x,
            at.y,
            options.anchor.as_ref(),
        );
        out.push(LayoutCommand::Place {
            id,
            edges: rendered.edges,
        });
        if options.update_layout {
            self.store.set(id, rendered.placement);
        }
        if metrics.has_initial_marker(id) && !self.next_frame.contains(&id) {
            self.next_frame.push(id);
        }
        rendered.placement
    }

    /// Commands due on the next animation frame.
    pub fn on_animation_frame(&mut self) -> Vec<LayoutCommand> {
        self.next_frame
            .drain(..)
            .map(|id| LayoutCommand::ClearInitialPlacement { id })
            .collect()
    }

    pub fn on_pointer_down(
        &mut self,
        id: WidgetId,
        input: &PointerInput,
        metrics: &impl ElementMetrics,
    ) -> Vec<LayoutCommand> {
        if !metrics.is_connected(id) {
            return Vec::new();
        }
        let size = measured_size(metrics, id, self.config.fallback_size);
        // Anchored axes paint unclamped, so start from where the widget is
        // painted rather than from the stored coordinates.
        let origin = self
            .store
            .get(id)
            .map(|placement| {
                compute_placement(
                    self.viewport,
                    size,
                    &self.config,
                    placement.position.x,
                    placement.position.y,
                    placement.anchor.as_ref(),
                )
                .placement
                .position
            })
            .or_else(|| metrics.origin(id))
            .unwrap_or_else(|| first_slot(self.viewport, size, &self.config));

        match self.drag.begin(id, input, origin) {
            Ok(session) => {
                debug!(%id, pointer_id = session.pointer_id, "drag started");
                vec![
                    LayoutCommand::CapturePointer {
                        id,
                        pointer_id: session.pointer_id,
                    },
                    LayoutCommand::SetDragActive { id, active: true },
                    LayoutCommand::ListenGlobalPointer { enabled: true },
                ]
            }
            Err(reason) => {
                debug!(%id, ?reason, "pointerdown did not start a drag");
                Vec::new()
            }
        }
    }

    /// Follow the active drag. The widget moves in absolute terms; its
    /// anchor is dropped until the drag is committed.
    pub fn on_pointer_move(
        &mut self,
        input: &PointerInput,
        metrics: &impl ElementMetrics,
    ) -> Vec<LayoutCommand> {
        let Some(session) = self.drag.session() else {
            return Vec::new();
        };
        if session.pointer_id != input.pointer_id || !metrics.is_connected(session.widget) {
            return Vec::new();
        }
        let Some((id, position)) = self.drag.track(input) else {
            return Vec::new();
        };

        let mut commands = Vec::with_capacity(1);
        let placed = self.place(id, position, PositionOptions::store(None), metrics, &mut commands);
        self.drag.settle(placed.position);
        commands
    }

    /// End the drag in place and schedule a persist.
    ///
    /// An element that left the document mid-drag ends the session without
    /// committing anything.
    pub fn on_pointer_up(
        &mut self,
        input: &PointerInput,
        metrics: &impl ElementMetrics,
    ) -> Vec<LayoutCommand> {
        let Some(session) = self.drag.finish(input.pointer_id) else {
            return Vec::new();
        };
        let id = session.widget;

        let mut commands = Vec::with_capacity(4);
        if metrics.is_connected(id) {
            self.place(
                id,
                session.last,
                PositionOptions::store(None),
                metrics,
                &mut commands,
            );
            commands.push(LayoutCommand::ReleasePointer {
                id,
                pointer_id: session.pointer_id,
            });
            commands.push(LayoutCommand::SetDragActive { id, active: false });
            self.persist_pending = true;
            debug!(%id, x = session.last.x, y = session.last.y, "drag committed");
        } else {
            debug!(%id, "dragged widget left the document, dropping drag");
        }
        commands.push(LayoutCommand::ListenGlobalPointer { enabled: false });
        commands
    }

    /// Pointer cancellation commits in place, exactly like release.
    pub fn on_pointer_cancel(
        &mut self,
        input: &PointerInput,
        metrics: &impl ElementMetrics,
    ) -> Vec<LayoutCommand> {
        self.on_pointer_up(input, metrics)
    }

    /// Run the persist scheduled by the last drag release, if any.
    pub fn flush_pending_persist(
        &mut self,
        metrics: &impl ElementMetrics,
        sink: &mut impl LayoutSink,
    ) -> Option<Committed> {
        if !std::mem::take(&mut self.persist_pending) {
            return None;
        }
        Some(self.persist_layout(metrics, sink))
    }

    /// The host could not store the layout handed out by the last persist.
    /// The next persist writes it again.
    pub fn layout_write_failed(&mut self) {
        if !self.bridge.rollback_write() {
            debug!("write failure reported with no write outstanding");
        }
    }

    /// Re-derive anchors, write the layout if it changed, and repaint so
    /// newly anchored widgets switch to their edge properties.
    pub fn persist_layout(
        &mut self,
        metrics: &impl ElementMetrics,
        sink: &mut impl LayoutSink,
    ) -> Committed {
        let outcome = self
            .bridge
            .persist(&mut self.store, metrics, self.viewport, &self.config, sink);
        Committed {
            outcome,
            commands: self.render_all(metrics),
        }
    }

    /// Throw away every stored position, cascade all widgets into their
    /// default slots and persist the result.
    pub fn apply_default_layout(
        &mut self,
        metrics: &impl ElementMetrics,
        sink: &mut impl LayoutSink,
    ) -> Committed {
        self.store.clear();
        self.ensure_layout_entries(metrics);
        self.persist_layout(metrics, sink)
    }
}
