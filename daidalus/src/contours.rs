//! Advisory-only horizontal contours (§4.6): an angular sweep at
//! `contour_thr` resolution reporting which ground-track sectors are
//! presently inside a hazard volume, for cockpit-display-style rendering.
//! Not used by alerting or bands; purely descriptive.

use crate::detectors::RelativeState;
use crate::geometry::{Vec2, Vec3};
use crate::state::{AircraftState, WindVector};
use crate::config::Parameters;
use crate::detectors::Detector;

/// One angular sector (radians, `[0, 2*pi)`, clockwise from north) found to
/// intersect a traffic aircraft's hazard volume along that bearing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourSector {
    pub bearing: f64,
    pub range: f64,
}

/// Sweeps bearings around the ownship at `contour_thr` resolution and
/// reports, for each traffic aircraft, the bearings at which a ray from the
/// ownship's current position first enters `detector`'s hazard volume
/// within `max_range`.
pub fn horizontal_contours(
    params: &Parameters,
    ownship: &AircraftState,
    traffic: &[AircraftState],
    wind: WindVector,
    detector: &Detector,
    max_range: f64,
) -> Vec<(String, Vec<ContourSector>)> {
    let origin_lat = match ownship.position {
        crate::state::Position::Geodesic { lat, .. } => lat,
        crate::state::Position::Euclidean(_) => 0.0,
    };
    let own_pos = ownship.local_position(origin_lat);
    let own_vel = ownship.air_velocity(wind);

    let step = params.contour_thr.max(1.0_f64.to_radians());
    let mut out = Vec::new();
    for a in traffic {
        let t_pos = a.local_position(origin_lat);
        let t_vel = a.air_velocity(wind);
        let mut sectors = Vec::new();
        let mut bearing = 0.0;
        while bearing < std::f64::consts::TAU {
            if let Some(range) = ray_hits_volume(own_pos, own_vel, t_pos, t_vel, bearing, max_range, detector) {
                sectors.push(ContourSector { bearing, range });
            }
            bearing += step;
        }
        out.push((a.id.clone(), sectors));
    }
    out
}

/// Advisory-only "hazard zone": the union of every sector reported by
/// [`horizontal_contours`], flattened across traffic (§4.6).
pub fn horizontal_hazard_zone(
    params: &Parameters,
    ownship: &AircraftState,
    traffic: &[AircraftState],
    wind: WindVector,
    detector: &Detector,
    max_range: f64,
) -> Vec<ContourSector> {
    horizontal_contours(params, ownship, traffic, wind, detector, max_range)
        .into_iter()
        .flat_map(|(_, sectors)| sectors)
        .collect()
}

fn ray_hits_volume(
    own_pos: Vec3,
    own_vel: Vec3,
    t_pos: Vec3,
    t_vel: Vec3,
    bearing: f64,
    max_range: f64,
    detector: &Detector,
) -> Option<f64> {
    const STEPS: usize = 60;
    let dir = Vec2::new(bearing.sin(), bearing.cos());
    for i in 1..=STEPS {
        let range = max_range * i as f64 / STEPS as f64;
        let probe = own_pos + Vec3::new(dir.x * range, dir.y * range, 0.0);
        let rel = RelativeState::new(t_pos - probe, t_vel - own_vel);
        if detector.violation(rel) {
            return Some(range);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::Cd3dParams;
    use crate::state::Position;

    #[test]
    fn no_traffic_yields_no_sectors() {
        let params = Parameters::default();
        let own = AircraftState::new(
            "own",
            Position::Euclidean(Vec3::new(0.0, 0.0, 0.0)),
            Vec3::new(0.0, 100.0, 0.0),
            0.0,
        );
        let detector = Detector::Cylinder(Cd3dParams::new(500.0, 150.0));
        let zone = horizontal_hazard_zone(&params, &own, &[], WindVector::ZERO, &detector, 10_000.0);
        assert!(zone.is_empty());
    }

    #[test]
    fn nearby_traffic_produces_a_sector() {
        let params = Parameters::default();
        let own = AircraftState::new(
            "own",
            Position::Euclidean(Vec3::new(0.0, 0.0, 0.0)),
            Vec3::new(0.0, 0.0, 0.0),
            0.0,
        );
        let traffic = AircraftState::new(
            "t1",
            Position::Euclidean(Vec3::new(0.0, 400.0, 0.0)),
            Vec3::new(0.0, 0.0, 0.0),
            0.0,
        );
        let detector = Detector::Cylinder(Cd3dParams::new(500.0, 150.0));
        let zone = horizontal_hazard_zone(&params, &own, &[traffic], WindVector::ZERO, &detector, 2_000.0);
        assert!(!zone.is_empty());
    }
}
