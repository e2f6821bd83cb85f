//! Heavy Duty: a three-day lift log with progressive-overload targets, a
//! daily nutrition checklist, weigh-ins and a rep-cadence coach, stored as
//! local JSON blobs.

pub mod app;
pub mod cadence;
pub mod config;
pub mod cues;
pub mod error;
pub mod export;
pub mod form;
pub mod logging;
pub mod models;
pub mod progression;
pub mod routines;
pub mod storage;
pub mod tracker;

pub use error::{ConfigError, Result, TrackerError};
pub use tracker::Tracker;
