//! A detect-and-avoid (DAA) engine: given an ownship state, a list of
//! traffic states, and a parameter snapshot, computes per-traffic alert
//! levels and per-dimension maneuver-guidance bands over a bounded
//! lookahead horizon.
//!
//! The engine never panics and never returns `Err` from its query surface;
//! malformed input degrades to a documented sentinel and a message on the
//! caller's [`errors::ErrorLog`] (§7). The handful of genuinely fallible
//! operations — parameter setters and config file I/O — return
//! `Result<_, errors::DaidalusError>`.
//!
//! Start at [`coordinator::Daidalus`].

pub mod alerting;
pub mod bands;
pub mod config;
pub mod contours;
pub mod coordinator;
pub mod detectors;
pub mod dimension;
pub mod errors;
pub mod geometry;
pub mod ingest;
pub mod kinematics;
pub mod region;
pub mod state;
pub mod units;

pub use bands::{Band, DimensionBands, RecoveryInfo, Resolution};
pub use config::Parameters;
pub use coordinator::Daidalus;
pub use dimension::Dimension;
pub use errors::{DaidalusError, ErrorLog};
pub use ingest::{StateSource, StepInputs};
pub use region::Region;
pub use state::{AircraftState, Position, Uncertainty, WindVector};
