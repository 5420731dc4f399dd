//! WCV_TAUMOD / WCV_TCPA / WCV_TEP: the well-clear-volume detector family
//! (§4.1). Violation when horizontal range is inside `DTHR` or a
//! time-variable is below `TTHR`, *and* vertical separation is inside
//! `ZTHR` or time-to-co-altitude is below `TCOA`.

use super::{bracket_conflict_interval, ConflictData, RelativeState};
use crate::geometry::{time_of_closest_approach, Vec2};

/// Which time-variable distinguishes the three WCV detectors (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WcvKind {
    /// Modified tau: time to closure of the DTHR boundary along the
    /// current relative velocity.
    TauMod,
    /// Time to closest point of approach.
    Tcpa,
    /// "Time to entry point": time until the straight-line projection
    /// first enters the DTHR disc, unconditioned on whether the pair is
    /// presently closing (unlike `TauMod`, which requires closure).
    Tep,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WcvParams {
    pub kind: WcvKind,
    pub dthr: f64,
    pub zthr: f64,
    pub tthr: f64,
    pub tcoa: f64,
}

impl WcvParams {
    pub fn new(kind: WcvKind, dthr: f64, zthr: f64, tthr: f64, tcoa: f64) -> Self {
        WcvParams {
            kind,
            dthr,
            zthr,
            tthr,
            tcoa,
        }
    }

    fn is_valid(&self) -> bool {
        self.dthr.is_finite()
            && self.dthr > 0.0
            && self.zthr.is_finite()
            && self.zthr > 0.0
            && self.tthr.is_finite()
            && self.tthr >= 0.0
            && self.tcoa.is_finite()
            && self.tcoa >= 0.0
    }

    /// The time-variable used for the horizontal test, `+inf` when the
    /// pair isn't on a closing geometry for this variable.
    fn time_variable(&self, s: Vec2, v: Vec2) -> f64 {
        let closing = s.dot(&v) < 0.0;
        match self.kind {
            WcvKind::TauMod => {
                if !closing {
                    return f64::INFINITY;
                }
                modified_tau(s, v, self.dthr)
            }
            WcvKind::Tcpa => {
                let tcpa = time_of_closest_approach(s, v);
                if tcpa >= 0.0 {
                    tcpa
                } else {
                    f64::INFINITY
                }
            }
            WcvKind::Tep => time_to_entry(s, v, self.dthr),
        }
    }

    fn horizontal_violation(&self, s: Vec2, v: Vec2) -> bool {
        s.norm() <= self.dthr || self.time_variable(s, v) <= self.tthr
    }

    fn vertical_violation(&self, sz: f64, vz: f64) -> bool {
        if sz.abs() <= self.zthr {
            return true;
        }
        let closing = sz * vz < 0.0;
        if !closing {
            return false;
        }
        let time_to_co_altitude = -sz / vz;
        time_to_co_altitude.is_finite() && time_to_co_altitude <= self.tcoa
    }
}

/// Modified tau: `-(|s|^2 - DTHR^2) / (s.v)`, defined only when
/// `s.v < 0` (closing) and `|s| > DTHR`.
fn modified_tau(s: Vec2, v: Vec2, dthr: f64) -> f64 {
    let sv = s.dot(&v);
    if sv >= 0.0 {
        return f64::INFINITY;
    }
    let range2 = s.dot(&s);
    let dthr2 = dthr * dthr;
    if range2 <= dthr2 {
        return 0.0;
    }
    -(range2 - dthr2) / sv
}

/// Earliest non-negative root of `|s+tv|=DTHR`, `+inf` if none.
fn time_to_entry(s: Vec2, v: Vec2, dthr: f64) -> f64 {
    let roots = crate::geometry::horizontal_range_crossings(s, v, dthr);
    roots
        .into_iter()
        .filter(|r| *r >= 0.0)
        .fold(f64::INFINITY, f64::min)
}

pub fn conflict(p: &WcvParams, state: RelativeState, b: f64, t: f64) -> ConflictData {
    if !p.is_valid() {
        return ConflictData::none(state);
    }
    let (sh, vh) = state.horizontal();
    let (sz, vz) = state.vertical();

    let violates = |time: f64| -> bool {
        let s_t = sh + vh * time;
        p.horizontal_violation(s_t, vh) && p.vertical_violation(sz + vz * time, vz)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use crate::detectors::RelativeState;

    fn params(kind: WcvKind) -> WcvParams {
        WcvParams::new(kind, 926.0, 152.4, 35.0, 35.0) // DO-365-ish MID values
    }

    #[test]
    fn head_on_triggers_for_all_variants() {
        let s = Vec3::new(9260.0, 0.0, 0.0);
        let v = Vec3::new(-150.0, 0.0, 0.0);
        for kind in [WcvKind::TauMod, WcvKind::Tcpa, WcvKind::Tep] {
            let cd = conflict(&params(kind), RelativeState::new(s, v), 0.0, 120.0);
            assert!(cd.is_conflict(), "{kind:?} should detect a head-on closure");
        }
    }

    #[test]
    fn diverging_pair_has_no_conflict() {
        let s = Vec3::new(9260.0, 0.0, 0.0);
        let v = Vec3::new(150.0, 0.0, 0.0);
        let cd = conflict(&params(WcvKind::TauMod), RelativeState::new(s, v), 0.0, 120.0);
        assert!(!cd.is_conflict());
    }

    #[test]
    fn vertical_separation_suppresses_conflict() {
        let s = Vec3::new(9260.0, 0.0, 3000.0);
        let v = Vec3::new(-150.0, 0.0, 0.0); // level flight, well above ZTHR forever
        let cd = conflict(&params(WcvKind::TauMod), RelativeState::new(s, v), 0.0, 120.0);
        assert!(!cd.is_conflict());
    }

    #[test]
    fn symmetry_under_reversal() {
        let s = Vec3::new(9260.0, 1200.0, 50.0);
        let v = Vec3::new(-150.0, 20.0, -1.0);
        let state = RelativeState::new(s, v);
        let p = params(WcvKind::TauMod);
        let a = conflict(&p, state, 0.0, 120.0);
        let b = conflict(&p, state.reversed(), 0.0, 120.0);
        assert_eq!(a.is_conflict(), b.is_conflict());
    }

    #[test]
    fn invalid_params_are_no_conflict() {
        let s = Vec3::new(100.0, 0.0, 0.0);
        let v = Vec3::new(-10.0, 0.0, 0.0);
        let bad = WcvParams::new(WcvKind::TauMod, -1.0, 152.4, 35.0, 35.0);
        let cd = conflict(&bad, RelativeState::new(s, v), 0.0, 60.0);
        assert!(!cd.is_conflict());
    }
}
