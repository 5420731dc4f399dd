//! Altitude dimension: candidates sweep `min_alt`..`max_alt` at
//! `step_alt`, each driven by the vertical-rate capture trajectory rather
//! than a held vertical speed (§4.2, §6.1).

use super::Candidate;
use crate::config::Parameters;
use crate::geometry::Vec3;
use crate::kinematics::{self, KinematicParams, Mode, State};

pub fn candidates(params: &Parameters, current_alt: f64) -> Vec<Candidate> {
    let mut out = Vec::new();
    let mut value = params.min_alt;
    while value <= params.max_alt + 1e-9 {
        out.push(Candidate {
            offset: value - current_alt,
            value,
        });
        value += params.step_alt;
    }
    out
}

pub fn trajectory(pos: Vec3, vel: Vec3, target_alt: f64, kin: &KinematicParams, mode: Mode, t: f64) -> State {
    kinematics::altitude_state(pos, vel, target_alt, kin, mode, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_cover_the_full_altitude_range() {
        let params = Parameters::default();
        let c = candidates(&params, 3000.0);
        assert!((c.first().unwrap().value - params.min_alt).abs() < 1e-6);
        assert!(c.last().unwrap().value <= params.max_alt + 1e-6);
    }
}
