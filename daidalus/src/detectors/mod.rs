//! Hazard-volume detectors (§4.1): pure functions from relative state to
//! earliest/latest time of hazard-volume intersection over `[B, T]`.

mod cylinder;
mod tcas;
mod wcv;

pub use cylinder::Cd3dParams;
pub use tcas::{TcasEntry, TcasParams};
pub use wcv::{WcvKind, WcvParams};

use crate::geometry::{horizontal, vertical, Vec3};

/// Relative state the detector family works from: `s` is the intruder's
/// position minus the ownship's, `v` is the intruder's velocity minus the
/// ownship's, both in the (possibly wind-relative) air frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeState {
    pub s: Vec3,
    pub v: Vec3,
}

impl RelativeState {
    pub fn new(s: Vec3, v: Vec3) -> Self {
        RelativeState { s, v }
    }

    pub fn horizontal(&self) -> (crate::geometry::Vec2, crate::geometry::Vec2) {
        (horizontal(self.s), horizontal(self.v))
    }

    pub fn vertical(&self) -> (f64, f64) {
        (vertical(self.s), vertical(self.v))
    }

    /// The state as seen by the other aircraft: negating both position and
    /// velocity. Detectors must be symmetric under this transform (§8
    /// invariant 7).
    pub fn reversed(&self) -> Self {
        RelativeState {
            s: -self.s,
            v: -self.v,
        }
    }
}

/// Result of a detector query over `[b, t]` (§3 Detector).
///
/// `time_in == 0.0` means "currently in violation"; `time_in ==
/// f64::INFINITY` means "no conflict anywhere in `[b, t]`"; always
/// `time_in <= time_out` when `time_in` is finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConflictData {
    pub time_in: f64,
    pub time_out: f64,
    /// Relative position at `b` (closure data, for callers that want the
    /// raw geometry alongside the interval).
    pub s: Vec3,
    pub v: Vec3,
}

impl ConflictData {
    pub fn none(state: RelativeState) -> Self {
        ConflictData {
            time_in: f64::INFINITY,
            time_out: f64::NEG_INFINITY,
            s: state.s,
            v: state.v,
        }
    }

    pub fn is_conflict(&self) -> bool {
        self.time_in.is_finite()
    }

    pub fn violation_now(&self) -> bool {
        self.time_in == 0.0
    }
}

/// Samples `violates` densely over `[b, t]`, then refines the boundary of
/// the first contiguous `true` run by bisection. Used by the WCV and TCAS
/// families, whose violation predicate has no closed-form root (§4.1
/// "interval roots are obtained by bracketed polynomial solves").
pub(crate) fn bracket_conflict_interval(
    b: f64,
    t: f64,
    violates: impl Fn(f64) -> bool,
) -> Option<(f64, f64)> {
    const SAMPLES: usize = 400;
    if !(t > b) {
        return if violates(b) { Some((0.0, 0.0)) } else { None };
    }
    let dt = (t - b) / SAMPLES as f64;

    let bisect = |mut lo: f64, mut hi: f64, want_true_at_hi: bool| -> f64 {
        // invariant: violates(lo) != violates(hi); narrows toward the
        // boundary between them.
        for _ in 0..40 {
            let mid = (lo + hi) / 2.0;
            if violates(mid) == want_true_at_hi {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        (lo + hi) / 2.0
    };

    let mut entry: Option<f64> = None;
    let mut exit: Option<f64> = None;
    let mut prev_time = b;
    let mut prev = violates(b);
    if prev {
        entry = Some(b);
    }
    for i in 1..=SAMPLES {
        let time = b + dt * i as f64;
        let cur = violates(time);
        if cur && !prev && entry.is_none() {
            entry = Some(bisect(prev_time, time, true));
        }
        if !cur && prev && entry.is_some() && exit.is_none() {
            exit = Some(bisect(prev_time, time, false));
        }
        prev = cur;
        prev_time = time;
    }
    let entry = entry?;
    let exit = exit.unwrap_or(t);
    Some((entry - b, exit - b))
}

/// The finite set of detector strategies (§9 design note: tagged variant,
/// dispatch by match rather than virtual dispatch).
#[derive(Debug, Clone, PartialEq)]
pub enum Detector {
    Cylinder(Cd3dParams),
    Wcv(WcvParams),
    Tcas(TcasParams),
}

impl Detector {
    /// Runs the detector over `[b, t]`. Returns `ConflictData::none` (not
    /// an error) whenever the detector's own parameters are invalid,
    /// per §4.1 "Failure mode".
    pub fn conflict(&self, state: RelativeState, b: f64, t: f64) -> ConflictData {
        match self {
            Detector::Cylinder(p) => cylinder::conflict(p, state, b, t),
            Detector::Wcv(p) => wcv::conflict(p, state, b, t),
            Detector::Tcas(p) => tcas::conflict(p, state, b, t),
        }
    }

    /// `true` iff the relative state is currently inside the hazard
    /// volume (`conflict(...).violation_now()`), a convenience used
    /// heavily by the bands engine.
    pub fn violation(&self, state: RelativeState) -> bool {
        self.conflict(state, 0.0, 0.0).violation_now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_state_reversal_negates_both() {
        let s = RelativeState::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, 0.0, 1.0));
        let r = s.reversed();
        assert_eq!(r.s, -s.s);
        assert_eq!(r.v, -s.v);
    }
}
