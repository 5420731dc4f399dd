//! Vertical-speed dimension: candidates sweep `min_vs`..`max_vs` at
//! `step_vs` (§4.2, §6.1).

use super::Candidate;
use crate::config::Parameters;
use crate::geometry::Vec3;
use crate::kinematics::{self, KinematicParams, Mode, State};

pub fn current_value(own_vel: Vec3) -> f64 {
    own_vel.z
}

pub fn candidates(params: &Parameters, own_vel: Vec3) -> Vec<Candidate> {
    let current = current_value(own_vel);
    let mut out = Vec::new();
    let mut value = params.min_vs;
    while value <= params.max_vs + 1e-9 {
        out.push(Candidate {
            offset: value - current,
            value,
        });
        value += params.step_vs;
    }
    out
}

pub fn trajectory(pos: Vec3, vel: Vec3, target_vs: f64, kin: &KinematicParams, mode: Mode, t: f64) -> State {
    kinematics::vertical_speed_state(pos, vel, target_vs, kin, mode, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_vertical_speed_is_zero_offset_candidate() {
        let params = Parameters::default();
        let c = candidates(&params, Vec3::new(0.0, 100.0, 0.0));
        assert!(c.iter().any(|x| x.offset.abs() < params.step_vs));
    }
}
