pub mod anchor;
pub mod commands;
pub mod layout;
pub mod types;
pub mod widget;

pub use anchor::{Anchor, HorizontalEdge, RawAnchor, VerticalEdge};
pub use commands::{EdgePlacement, LayoutCommand};
pub use layout::{LayoutEntry, StoredLayoutEntry};
pub use types::{Bounds, Point, Position, Size, ViewportSize};
pub use widget::{UnknownWidget, WidgetId};
