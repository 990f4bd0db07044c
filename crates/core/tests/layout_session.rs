//! Integration test: hydrate a legacy settings document with corrupt layout
//! entries, drag a widget, persist through the settings service and follow
//! a viewport resize.

use std::cell::RefCell;
use std::rc::Rc;

use newtab_layout_core::LayoutController;
use newtab_layout_core::config::LayoutConfig;
use newtab_layout_core::drag::{PointerInput, PointerKind};
use newtab_layout_core::metrics::{ElementSnapshot, MetricsSnapshot};
use newtab_layout_core::persist::PersistOutcome;
use newtab_layout_core::settings::backend::SETTINGS_KEY;
use newtab_layout_core::settings::{
    BackendKind, HostCapabilities, MemoryArea, SettingsService, StorageArea, detect_backend,
};
use newtab_layout_protocol::{
    Anchor, EdgePlacement, HorizontalEdge, LayoutCommand, Point, Position, VerticalEdge,
    ViewportSize, WidgetId,
};

fn metrics() -> MetricsSnapshot {
    let mut metrics = MetricsSnapshot::new();
    for (id, height) in [
        (WidgetId::Weather, 180.0),
        (WidgetId::Pomodoro, 150.0),
        (WidgetId::Tasks, 220.0),
    ] {
        metrics.insert(
            id,
            ElementSnapshot {
                width: 240.0,
                height,
                left: 0.0,
                top: 0.0,
                connected: true,
                initial: true,
            },
        );
    }
    metrics
}

fn mouse(x: f64, y: f64) -> PointerInput {
    PointerInput {
        pointer_id: 1,
        client: Point::new(x, y),
        button: 0,
        pointer_type: PointerKind::Mouse,
        target_interactive: false,
    }
}

fn open_service() -> SettingsService {
    let raw = include_str!("fixtures/settings-legacy-layout.json");
    let mut sync = MemoryArea::new();
    sync.set(SETTINGS_KEY, raw.to_string())
        .expect("memory area accepts writes");
    let backend = detect_backend(HostCapabilities {
        sync: Some(Box::new(sync)),
        local: None,
    });
    SettingsService::open(backend)
}

#[test]
fn legacy_layout_drag_persist_and_resize() {
    let mut service = open_service();
    assert_eq!(service.backend_kind(), BackendKind::Sync);
    assert_eq!(
        service.settings().widgets.layout.len(),
        5,
        "non-object layout elements are dropped on read"
    );

    let writes = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&writes);
    service.subscribe(move |_| *counter.borrow_mut() += 1);

    let metrics = metrics();
    let mut controller =
        LayoutController::new(LayoutConfig::default(), ViewportSize::new(1200.0, 800.0));
    let painted = controller.load_widget_layout(service.settings(), &metrics);
    assert_eq!(painted.len(), 3);

    // Weather keeps its anchor and is resolved against the current viewport.
    let weather = controller.store().get(WidgetId::Weather).expect("weather entry");
    assert_eq!(weather.position, Position::new(920.0, 20.0));
    assert_eq!(
        painted[0],
        LayoutCommand::Place {
            id: WidgetId::Weather,
            edges: EdgePlacement {
                right: Some(40.0),
                top: Some(20.0),
                ..Default::default()
            },
        }
    );

    // Pomodoro had a non-finite x and is cascaded below weather.
    let pomodoro = controller.store().get(WidgetId::Pomodoro).expect("pomodoro entry");
    assert_eq!(pomodoro.position, Position::new(944.0, 220.0));

    // Tasks lost its invalid anchor and was clamped into the padding.
    let tasks = controller.store().get(WidgetId::Tasks).expect("tasks entry");
    assert_eq!(tasks.anchor, None);
    assert_eq!(tasks.position, Position::new(16.0, 564.0));

    let cleared = controller.on_animation_frame();
    assert_eq!(cleared.len(), 3);

    // Drag weather 10px right and up into the top padding.
    assert_eq!(
        controller
            .on_pointer_down(WidgetId::Weather, &mouse(1000.0, 60.0), &metrics)
            .len(),
        3
    );
    controller.on_pointer_move(&mouse(1010.0, 50.0), &metrics);
    controller.on_pointer_up(&mouse(1010.0, 50.0), &metrics);

    let committed = controller
        .flush_pending_persist(&metrics, &mut service)
        .expect("release schedules a persist");
    assert_eq!(committed.outcome, PersistOutcome::Written);
    assert_eq!(*writes.borrow(), 1);

    let weather = controller.store().get(WidgetId::Weather).expect("weather entry");
    assert_eq!(weather.position, Position::new(930.0, 16.0));
    assert_eq!(
        weather.anchor,
        Some(Anchor::new(
            Some((HorizontalEdge::Right, 30.0)),
            Some((VerticalEdge::Top, 16.0)),
        ))
    );

    // The write merged the layout without touching anything else.
    let saved = serde_json::to_value(service.settings()).expect("settings serialize");
    assert_eq!(saved["theme"]["palette"], "dusk");
    assert_eq!(saved["widgets"]["weather"]["city"], "Lisbon");
    let layout = saved["widgets"]["layout"].as_array().expect("layout array");
    let ids: Vec<_> = layout.iter().map(|e| e["id"].as_str()).collect();
    assert_eq!(ids, vec![Some("weather"), Some("pomodoro"), Some("tasks")]);
    assert_eq!(layout[2]["anchor"]["horizontal"], "left");
    assert_eq!(layout[2]["anchor"]["vertical"], "bottom");

    // Persisting again without changes does not write.
    let again = controller.persist_layout(&metrics, &mut service);
    assert_eq!(again.outcome, PersistOutcome::Unchanged);
    assert_eq!(*writes.borrow(), 1);

    // Anchored widgets keep their edge offsets across a resize.
    let resized = controller.on_resize(ViewportSize::new(1600.0, 900.0), &metrics);
    assert_eq!(
        resized[0],
        LayoutCommand::Place {
            id: WidgetId::Weather,
            edges: EdgePlacement {
                right: Some(30.0),
                top: Some(16.0),
                ..Default::default()
            },
        }
    );
    assert_eq!(
        controller.store().get(WidgetId::Weather).expect("weather entry").position,
        Position::new(1330.0, 16.0)
    );
}

#[test]
fn second_instance_hydrates_the_persisted_layout() {
    let mut service = open_service();
    let metrics = metrics();
    let viewport = ViewportSize::new(1200.0, 800.0);

    let mut first = LayoutController::new(LayoutConfig::default(), viewport);
    first.load_widget_layout(service.settings(), &metrics);
    first.persist_layout(&metrics, &mut service);

    let mut second = LayoutController::new(LayoutConfig::default(), viewport);
    second.load_widget_layout(service.settings(), &metrics);
    assert_eq!(second.store(), first.store());

    let committed = second.persist_layout(&metrics, &mut service);
    assert_eq!(committed.outcome, PersistOutcome::Unchanged);
}
