//! Layout engine for the floating widgets of the new tab page.
//!
//! ```text
//!   settings ─▶ sanitize ─▶ LayoutStore ─▶ reconcile ─▶ render ─▶ LayoutCommand[] ─▶ page
//!                   ▲             ▲                                          │
//!                   │             └──────── drag (pointer events) ◀──────────┘
//!                   └──────────── persist (diff, write through) ◀── release
//! ```

pub mod anchor;
pub mod config;
pub mod controller;
pub mod drag;
pub mod geometry;
pub mod metrics;
pub mod persist;
pub mod reconcile;
pub mod render;
pub mod settings;
pub mod store;

pub use config::LayoutConfig;
pub use controller::LayoutController;
