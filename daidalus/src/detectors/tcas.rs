//! TCASII: the sensitivity-level table detector (§4.1). TA and RA are
//! modelled as two [`TcasParams`] instances (different thresholds) sharing
//! the same table-lookup shape, referenced by two distinct alert levels of
//! one alerter.

use super::{bracket_conflict_interval, ConflictData, RelativeState};

/// One row of the TCAS II sensitivity-level table: altitude band plus the
/// DMOD/ZTHR/TAU thresholds that apply within it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TcasEntry {
    pub alt_min: f64,
    pub alt_max: f64,
    pub dmod: f64,
    pub zthr: f64,
    pub tau: f64,
}

/// A full sensitivity-level table plus the currently-selected row. The
/// coordinator re-selects the row from ownship altitude before each
/// detector call; the detector itself is a pure function of the selected
/// thresholds, matching every other detector in this module.
#[derive(Debug, Clone, PartialEq)]
pub struct TcasParams {
    pub table: Vec<TcasEntry>,
    pub altitude: f64,
}

impl TcasParams {
    pub fn new(table: Vec<TcasEntry>, altitude: f64) -> Self {
        TcasParams { table, altitude }
    }

    pub fn selected(&self) -> Option<TcasEntry> {
        self.table
            .iter()
            .copied()
            .find(|e| self.altitude >= e.alt_min && self.altitude < e.alt_max)
    }

    /// The default DO-185-style table (RA thresholds), in SI units,
    /// altitude bands in metres (converted from the familiar feet bands).
    pub fn default_ra_table() -> Vec<TcasEntry> {
        use crate::units::Unit;
        let ft = |v: f64| Unit::Foot.to_internal(v);
        vec![
            TcasEntry {
                alt_min: f64::NEG_INFINITY,
                alt_max: ft(1000.0),
                dmod: ft(1500.0),
                zthr: ft(600.0),
                tau: 15.0,
            },
            TcasEntry {
                alt_min: ft(1000.0),
                alt_max: ft(2350.0),
                dmod: ft(3000.0),
                zthr: ft(600.0),
                tau: 20.0,
            },
            TcasEntry {
                alt_min: ft(2350.0),
                alt_max: ft(5000.0),
                dmod: ft(4000.0),
                zthr: ft(600.0),
                tau: 25.0,
            },
            TcasEntry {
                alt_min: ft(5000.0),
                alt_max: ft(10000.0),
                dmod: ft(4500.0),
                zthr: ft(600.0),
                tau: 30.0,
            },
            TcasEntry {
                alt_min: ft(10000.0),
                alt_max: ft(20000.0),
                dmod: ft(6000.0),
                zthr: ft(600.0),
                tau: 35.0,
            },
            TcasEntry {
                alt_min: ft(20000.0),
                alt_max: ft(42000.0),
                dmod: ft(7000.0),
                zthr: ft(800.0),
                tau: 35.0,
            },
            TcasEntry {
                alt_min: ft(42000.0),
                alt_max: f64::INFINITY,
                dmod: ft(7000.0),
                zthr: ft(1200.0),
                tau: 35.0,
            },
        ]
    }
}

pub fn conflict(p: &TcasParams, state: RelativeState, b: f64, t: f64) -> ConflictData {
    let entry = match p.selected() {
        Some(e) => e,
        None => return ConflictData::none(state),
    };
    if !(entry.dmod.is_finite() && entry.dmod > 0.0 && entry.zthr.is_finite() && entry.zthr > 0.0)
    {
        return ConflictData::none(state);
    }

    let (sh, vh) = state.horizontal();
    let (sz, vz) = state.vertical();

    let violates = |time: f64| -> bool {
        let s_t = sh + vh * time;
        let range = s_t.norm();
        let tau = crate::geometry::time_of_closest_approach(sh, vh);
        let horizontal = range <= entry.dmod || (tau >= 0.0 && tau <= entry.tau);
        let vertical = (sz + vz * time).abs() <= entry.zthr;
        horizontal && vertical
    };

    match bracket_conflict_interval(b, t, violates) {
        Some((time_in, time_out)) => ConflictData {
            time_in,
            time_out,
            s: state.s,
            v: state.v,
        },
        None => ConflictData::none(state),
    }
}
