//! Terminal UI layer for the E-Bill Tracker.
//!
//! Provides themes, the header and text-input components, the history and
//! bucket tables, the trend chart and the main application event loop built
//! on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod table_view;
pub mod themes;

pub use tracker_core as core;
