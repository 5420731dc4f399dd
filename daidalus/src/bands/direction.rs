//! Horizontal-direction dimension: candidates are ground-track offsets
//! from the current track, swept `left_hdir`..`right_hdir` at `step_hdir`
//! (§4.2, §6.1).

use super::Candidate;
use crate::config::{BelowMinAirspeed, Parameters};
use crate::geometry::{wrap_2pi, Vec2, Vec3};
use crate::kinematics::{self, KinematicParams, Mode, State};

pub fn current_value(own_vel: Vec3) -> f64 {
    let vh = Vec2::new(own_vel.x, own_vel.y);
    vh.x.atan2(vh.y)
}

pub fn candidates(params: &Parameters, own_vel: Vec3) -> Vec<Candidate> {
    let vh = Vec2::new(own_vel.x, own_vel.y);
    let speed = vh.norm();
    if speed < params.min_airspeed && params.hdir_bands_below_min_as == BelowMinAirspeed::Disabled {
        return Vec::new();
    }
    let current = current_value(own_vel);
    let mut out = Vec::new();
    let mut offset = -params.left_hdir;
    while offset <= params.right_hdir + 1e-9 {
        out.push(Candidate {
            offset,
            value: wrap_2pi(current + offset),
        });
        offset += params.step_hdir;
    }
    out
}

pub fn trajectory(pos: Vec3, vel: Vec3, target_track: f64, kin: &KinematicParams, mode: Mode, t: f64) -> State {
    kinematics::direction_state(pos, vel, target_track, kin, mode, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_span_the_configured_window() {
        let mut params = Parameters::default();
        params.left_hdir = 10.0_f64.to_radians();
        params.right_hdir = 10.0_f64.to_radians();
        params.step_hdir = 5.0_f64.to_radians();
        let c = candidates(&params, Vec3::new(0.0, 100.0, 0.0));
        assert!(c.len() >= 4);
        assert!(c.iter().any(|x| x.offset < 0.0));
        assert!(c.iter().any(|x| x.offset > 0.0));
    }

    #[test]
    fn below_min_airspeed_is_empty_by_default() {
        let mut params = Parameters::default();
        params.min_airspeed = 50.0;
        let c = candidates(&params, Vec3::new(0.0, 10.0, 0.0));
        assert!(c.is_empty());
    }
}
