//! CD3D: a fixed horizontal/vertical cylinder hazard volume (§4.1).

use super::{ConflictData, RelativeState};
use crate::geometry::{horizontal_range_crossings, vertical_range_crossings};

/// Horizontal radius `D` and half-height `H` of the protected cylinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cd3dParams {
    pub d: f64,
    pub h: f64,
}

impl Cd3dParams {
    pub fn new(d: f64, h: f64) -> Self {
        Cd3dParams { d, h }
    }

    fn is_valid(&self) -> bool {
        self.d.is_finite() && self.d > 0.0 && self.h.is_finite() && self.h > 0.0
    }
}

/// `timeIn` is the earliest root in `[b, t]` of `|s+tv|_h = D or |s_z+tv_z|
/// = H` while both are violated simultaneously (§4.1).
pub fn conflict(p: &Cd3dParams, state: RelativeState, b: f64, t: f64) -> ConflictData {
    if !p.is_valid() {
        return ConflictData::none(state);
    }

    let (sh, vh) = state.horizontal();
    let (sz, vz) = state.vertical();

    let horizontal_in_at = |time: f64| -> bool { (sh + vh * time).norm() < p.d };
    let vertical_in_at = |time: f64| -> bool { (sz + vz * time).abs() < p.h };
    let both_in_at = |time: f64| horizontal_in_at(time) && vertical_in_at(time);

    // Candidate crossing times: where either boundary is touched.
    let mut candidates = horizontal_range_crossings(sh, vh, p.d);
    candidates.extend(vertical_range_crossings(sz, vz, p.h));
    candidates.push(b);
    candidates.push(t);
    candidates.retain(|c| c.is_finite() && *c >= b && *c <= t);
    candidates.sort_by(|a, b| a.partial_cmp(b).unwrap());
    candidates.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

    if both_in_at(b) {
        // Currently in violation: time_in = 0 relative to b per the
        // detector contract, time_out is the first exit.
        let time_out = candidates
            .iter()
            .copied()
            .find(|&c| c > b && !both_in_at(c))
            .unwrap_or(t);
        return ConflictData {
            time_in: 0.0,
            time_out: time_out - b,
            s: state.s,
            v: state.v,
        };
    }

    // Find the first window where both are in violation, then walk
    // forward from its start to find the window where they stop being so.
    for (i, window) in candidates.windows(2).enumerate() {
        let mid = (window[0] + window[1]) / 2.0;
        if !both_in_at(mid) {
            continue;
        }
        let time_in = window[0] - b;
        let mut exit = t;
        for w in candidates[i..].windows(2) {
            let m = (w[0] + w[1]) / 2.0;
            if !both_in_at(m) {
                exit = w[0];
                break;
            }
        }
        return ConflictData {
            time_in,
            time_out: exit - b,
            s: state.s,
            v: state.v,
        };
    }

    ConflictData::none(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;

    fn head_on() -> RelativeState {
        // 10nm apart, closing at 200 m/s, same altitude
        RelativeState::new(Vec3::new(18_520.0, 0.0, 0.0), Vec3::new(-200.0, 0.0, 0.0))
    }

    #[test]
    fn detects_future_conflict() {
        let p = Cd3dParams::new(926.0, 150.0); // ~0.5nm, 500ft
        let cd = conflict(&p, head_on(), 0.0, 200.0);
        assert!(cd.is_conflict());
        assert!(cd.time_in > 0.0);
        assert!(cd.time_in < cd.time_out);
    }

    #[test]
    fn no_conflict_when_diverging() {
        let p = Cd3dParams::new(926.0, 150.0);
        let diverging = RelativeState::new(Vec3::new(18_520.0, 0.0, 0.0), Vec3::new(200.0, 0.0, 0.0));
        let cd = conflict(&p, diverging, 0.0, 200.0);
        assert!(!cd.is_conflict());
    }

    #[test]
    fn invalid_params_yield_no_conflict() {
        let p = Cd3dParams::new(0.0, 150.0);
        let cd = conflict(&p, head_on(), 0.0, 200.0);
        assert!(!cd.is_conflict());
    }

    #[test]
    fn violation_now_reports_zero_time_in() {
        let p = Cd3dParams::new(926.0, 150.0);
        let colliding = RelativeState::new(Vec3::new(100.0, 0.0, 0.0), Vec3::new(-10.0, 0.0, 0.0));
        let cd = conflict(&p, colliding, 0.0, 100.0);
        assert!(cd.violation_now());
    }
}
