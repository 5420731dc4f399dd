//! Horizontal-speed dimension: candidates sweep `min_hs`..`max_hs` at
//! `step_hs`, holding the current ground track fixed (§4.2, §6.1).

use super::Candidate;
use crate::config::Parameters;
use crate::geometry::{Vec2, Vec3};
use crate::kinematics::{self, KinematicParams, Mode, State};

pub fn current_value(own_vel: Vec3) -> f64 {
    Vec2::new(own_vel.x, own_vel.y).norm()
}

pub fn candidates(params: &Parameters, own_vel: Vec3) -> Vec<Candidate> {
    let current = current_value(own_vel);
    let mut out = Vec::new();
    let mut value = params.min_hs;
    while value <= params.max_hs + 1e-9 {
        out.push(Candidate {
            offset: value - current,
            value,
        });
        value += params.step_hs;
    }
    out
}

pub fn trajectory(pos: Vec3, vel: Vec3, target_speed: f64, kin: &KinematicParams, mode: Mode, t: f64) -> State {
    kinematics::speed_state(pos, vel, target_speed, kin, mode, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_are_sorted_ascending_by_offset() {
        let params = Parameters::default();
        let c = candidates(&params, Vec3::new(0.0, 80.0, 0.0));
        for w in c.windows(2) {
            assert!(w[0].offset <= w[1].offset);
        }
    }
}
