//! Domain types and shared plumbing for the E-Bill Tracker.
//!
//! Holds the reading model, the error taxonomy, configuration, the bill
//! formula, calendar helpers and the atomic JSON storage used by the data
//! layer.

pub mod appliances;
pub mod billing;
pub mod config;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod storage;
pub mod time_utils;

pub use error::{ErrorKind, Result, TrackerError};
