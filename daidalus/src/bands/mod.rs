//! The maneuver-guidance bands engine (§3 Bands, §4.2). This is the one
//! module every other part of the coordinator is built to feed: parameters,
//! aircraft states, the kinematic trajectory generator, the detector
//! family and the alerter all meet here.
//!
//! Shared skeleton lives in this file; each dimension's candidate
//! enumeration and trajectory wiring live in its own submodule and are
//! dispatched on by `Dimension`, matching the tagged-variant style used for
//! [`crate::detectors::Detector`].

mod altitude;
mod direction;
mod horizontal_speed;
mod vertical_speed;

use crate::alerting::Alerter;
use crate::config::Parameters;
use crate::detectors::{Cd3dParams, Detector, RelativeState};
use crate::dimension::Dimension;
use crate::geometry::Vec3;
use crate::kinematics::{KinematicParams, Mode, State};
use crate::region::Region;
use crate::state::{AircraftState, WindVector};

/// One candidate maneuver value, carried alongside its signed distance from
/// the ownship's current value so up/down/preferred resolution and band
/// merging don't need dimension-specific comparison logic.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    /// Signed offset from the current value; for direction this is the
    /// wrapped angular offset, for the three linear dimensions it's a plain
    /// difference. Ascending order in the vector returned by `candidates`.
    offset: f64,
    /// The absolute value to feed the trajectory generator (a track angle,
    /// a speed, a vertical speed, or an altitude).
    value: f64,
}

/// A contiguous run of candidate values sharing one colour (§3 Bands: "a
/// contiguous range of `Region`-coloured values").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub low: f64,
    pub high: f64,
    pub region: Region,
    /// §4.2 step 8: a conflict band immediately adjacent to a clear one,
    /// within one alerting level's spread, is flagged peripheral rather
    /// than folded into the solid conflict run.
    pub peripheral: bool,
}

/// Nearest conflict-free (or recovery) candidate on each side of the
/// ownship's current value (§4.2 step 7).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Resolution {
    pub up: Option<f64>,
    pub down: Option<f64>,
    pub preferred: Option<f64>,
}

/// Recovery-band search outcome (§4.2 step 6). `saturated` means even the
/// smallest `ca_factor`-scaled volume left no clear candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryInfo {
    pub horizontal_distance: f64,
    pub vertical_distance: f64,
    pub time_to_recovery: f64,
    pub saturated: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DimensionBands {
    pub dimension: Dimension,
    pub bands: Vec<Band>,
    pub recovery: Option<RecoveryInfo>,
    pub resolution: Resolution,
    /// §4.2 step 9: time until continuing the present value first enters a
    /// conflict band, `None` if it never does within the lookahead.
    pub last_time_to_maneuver: Option<f64>,
}

const SAMPLE_COUNT: usize = 40;

/// The public entry point (§3 "Bands computation"): one dimension's full
/// result for the current ownship/traffic/wind/parameter snapshot.
pub fn compute_bands(
    dimension: Dimension,
    params: &Parameters,
    ownship: &AircraftState,
    traffic: &[AircraftState],
    wind: WindVector,
    alerter: &Alerter,
) -> DimensionBands {
    let origin_lat = match ownship.position {
        crate::state::Position::Geodesic { lat, .. } => lat,
        crate::state::Position::Euclidean(_) => 0.0,
    };
    let own_pos = ownship.local_position(origin_lat);
    let own_vel = ownship.air_velocity(wind);
    let kin = params.kinematics();
    let mode = params.mode();

    let traffic_rel: Vec<(Vec3, Vec3)> = traffic
        .iter()
        .map(|a| (a.local_position(origin_lat), a.air_velocity(wind)))
        .collect();

    let times: Vec<f64> = (0..=SAMPLE_COUNT)
        .map(|i| params.lookahead_time * i as f64 / SAMPLE_COUNT as f64)
        .collect();

    let candidates = dimension_candidates(dimension, params, own_pos, own_vel);
    let current_value = dimension_current_value(dimension, own_pos, own_vel);

    let mut coloured: Vec<(Candidate, Region)> = candidates
        .iter()
        .map(|c| {
            let region = worst_region_for_candidate(
                dimension, own_pos, own_vel, c.value, &kin, mode, &times, &traffic_rel, alerter,
            );
            (*c, region)
        })
        .collect();

    let recovery_enabled = dimension_recovery_enabled(dimension, params);
    let all_conflict = !coloured.is_empty() && coloured.iter().all(|(_, r)| r.is_conflict());
    let recovery = if recovery_enabled && all_conflict {
        Some(recovery_search(
            dimension, params, own_pos, own_vel, &kin, mode, &times, &traffic_rel, &candidates,
            &mut coloured,
        ))
    } else {
        None
    };

    let bands = merge_bands(&coloured, params);
    let resolution = compute_resolution(&coloured);
    let last_time_to_maneuver = last_time_to_maneuver(
        dimension, own_pos, own_vel, current_value, &kin, mode, &times, &traffic_rel, alerter,
    );

    DimensionBands {
        dimension,
        bands,
        recovery,
        resolution,
        last_time_to_maneuver,
    }
}

fn dimension_candidates(
    dimension: Dimension,
    params: &Parameters,
    own_pos: Vec3,
    own_vel: Vec3,
) -> Vec<Candidate> {
    match dimension {
        Dimension::HorizontalDirection => direction::candidates(params, own_vel),
        Dimension::HorizontalSpeed => horizontal_speed::candidates(params, own_vel),
        Dimension::VerticalSpeed => vertical_speed::candidates(params, own_vel),
        Dimension::Altitude => altitude::candidates(params, own_pos.z),
    }
}

fn dimension_current_value(dimension: Dimension, own_pos: Vec3, own_vel: Vec3) -> f64 {
    match dimension {
        Dimension::HorizontalDirection => direction::current_value(own_vel),
        Dimension::HorizontalSpeed => horizontal_speed::current_value(own_vel),
        Dimension::VerticalSpeed => vertical_speed::current_value(own_vel),
        Dimension::Altitude => own_pos.z,
    }
}

fn dimension_trajectory(
    dimension: Dimension,
    pos: Vec3,
    vel: Vec3,
    value: f64,
    kin: &KinematicParams,
    mode: Mode,
    t: f64,
) -> State {
    match dimension {
        Dimension::HorizontalDirection => direction::trajectory(pos, vel, value, kin, mode, t),
        Dimension::HorizontalSpeed => horizontal_speed::trajectory(pos, vel, value, kin, mode, t),
        Dimension::VerticalSpeed => vertical_speed::trajectory(pos, vel, value, kin, mode, t),
        Dimension::Altitude => altitude::trajectory(pos, vel, value, kin, mode, t),
    }
}

fn dimension_recovery_enabled(dimension: Dimension, params: &Parameters) -> bool {
    match dimension {
        Dimension::HorizontalDirection => params.recovery_hdir,
        Dimension::HorizontalSpeed => params.recovery_hs,
        Dimension::VerticalSpeed => params.recovery_vs,
        Dimension::Altitude => params.recovery_alt,
    }
}

#[allow(clippy::too_many_arguments)]
fn worst_region_for_candidate(
    dimension: Dimension,
    own_pos: Vec3,
    own_vel: Vec3,
    candidate_value: f64,
    kin: &KinematicParams,
    mode: Mode,
    times: &[f64],
    traffic_rel: &[(Vec3, Vec3)],
    alerter: &Alerter,
) -> Region {
    let mut worst = Region::None;
    for &t in times {
        let own_state = dimension_trajectory(dimension, own_pos, own_vel, candidate_value, kin, mode, t);
        for &(tpos, tvel) in traffic_rel {
            let traffic_pos = tpos + tvel * t;
            let rel = RelativeState::new(traffic_pos - own_state.position, tvel - own_state.velocity);
            worst = worst.max(worst_alerter_region(alerter, rel));
            if worst == Region::Near {
                return worst;
            }
        }
    }
    worst
}

fn worst_alerter_region(alerter: &Alerter, state: RelativeState) -> Region {
    let mut region = Region::None;
    for threshold in alerter.levels() {
        if threshold.detector.violation(state) {
            region = region.max(threshold.region);
        }
    }
    region
}

#[allow(clippy::too_many_arguments)]
fn recovery_search(
    dimension: Dimension,
    params: &Parameters,
    own_pos: Vec3,
    own_vel: Vec3,
    kin: &KinematicParams,
    mode: Mode,
    times: &[f64],
    traffic_rel: &[(Vec3, Vec3)],
    candidates: &[Candidate],
    coloured: &mut [(Candidate, Region)],
) -> RecoveryInfo {
    let mut factor = 1.0_f64;
    loop {
        let d = params.min_horizontal_recovery * factor;
        let h = params.min_vertical_recovery * factor;
        let detector = Detector::Cylinder(Cd3dParams::new(d.max(1.0), h.max(1.0)));

        let mut found_clear = false;
        for (i, candidate) in candidates.iter().enumerate() {
            let clear = is_clear_under(
                dimension, own_pos, own_vel, candidate.value, kin, mode, times, traffic_rel, &detector,
            );
            if clear {
                coloured[i].1 = Region::Recovery;
                found_clear = true;
            }
        }

        if found_clear {
            return RecoveryInfo {
                horizontal_distance: d,
                vertical_distance: h,
                time_to_recovery: params.recovery_stability_time,
                saturated: false,
            };
        }

        if factor <= params.ca_factor {
            return RecoveryInfo {
                horizontal_distance: d,
                vertical_distance: h,
                time_to_recovery: params.recovery_stability_time,
                saturated: true,
            };
        }
        factor = (factor - 0.1).max(params.ca_factor);
    }
}

#[allow(clippy::too_many_arguments)]
fn is_clear_under(
    dimension: Dimension,
    own_pos: Vec3,
    own_vel: Vec3,
    value: f64,
    kin: &KinematicParams,
    mode: Mode,
    times: &[f64],
    traffic_rel: &[(Vec3, Vec3)],
    detector: &Detector,
) -> bool {
    for &t in times {
        let own_state = dimension_trajectory(dimension, own_pos, own_vel, value, kin, mode, t);
        for &(tpos, tvel) in traffic_rel {
            let traffic_pos = tpos + tvel * t;
            let rel = RelativeState::new(traffic_pos - own_state.position, tvel - own_state.velocity);
            if detector.violation(rel) {
                return false;
            }
        }
    }
    true
}

/// Folds the coloured candidate list into bands, flagging peripheral runs
/// (§4.2 step 8): a conflict run at most one step wide, touching a clear
/// run on at least one side, is peripheral rather than solid.
fn merge_bands(coloured: &[(Candidate, Region)], params: &Parameters) -> Vec<Band> {
    if coloured.is_empty() {
        return Vec::new();
    }
    let mut bands = Vec::new();
    let mut start = 0;
    for i in 1..=coloured.len() {
        if i == coloured.len() || coloured[i].1 != coloured[start].1 {
            let low = coloured[start].0.value;
            let high = coloured[i - 1].0.value;
            let region = coloured[start].1;
            let width = i - start;
            let touches_clear = (start > 0 && coloured[start - 1].1 == Region::None)
                || (i < coloured.len() && coloured[i].1 == Region::None);
            let peripheral = region.is_conflict() && width <= 1 && touches_clear && params.ca_bands;
            bands.push(Band {
                low,
                high,
                region,
                peripheral,
            });
            start = i;
        }
    }
    bands
}

fn compute_resolution(coloured: &[(Candidate, Region)]) -> Resolution {
    let is_usable = |r: Region| r == Region::None || r == Region::Recovery;
    let up = coloured
        .iter()
        .filter(|(c, r)| c.offset > 0.0 && is_usable(*r))
        .min_by(|a, b| a.0.offset.partial_cmp(&b.0.offset).unwrap())
        .map(|(c, _)| c.value);
    let down = coloured
        .iter()
        .filter(|(c, r)| c.offset < 0.0 && is_usable(*r))
        .max_by(|a, b| a.0.offset.partial_cmp(&b.0.offset).unwrap())
        .map(|(c, _)| c.value);
    let zero_clear = coloured
        .iter()
        .find(|(c, r)| c.offset == 0.0 && is_usable(*r))
        .map(|(c, _)| c.value);

    let preferred = match (zero_clear, up, down) {
        (Some(z), _, _) => Some(z),
        (None, Some(u), Some(d)) => {
            let up_dist = coloured
                .iter()
                .find(|(c, _)| c.value == u)
                .map(|(c, _)| c.offset.abs())
                .unwrap_or(f64::INFINITY);
            let down_dist = coloured
                .iter()
                .find(|(c, _)| c.value == d)
                .map(|(c, _)| c.offset.abs())
                .unwrap_or(f64::INFINITY);
            Some(if up_dist <= down_dist { u } else { d })
        }
        (None, Some(u), None) => Some(u),
        (None, None, Some(d)) => Some(d),
        (None, None, None) => None,
    };

    Resolution { up, down, preferred }
}

#[allow(clippy::too_many_arguments)]
fn last_time_to_maneuver(
    dimension: Dimension,
    own_pos: Vec3,
    own_vel: Vec3,
    current_value: f64,
    kin: &KinematicParams,
    mode: Mode,
    times: &[f64],
    traffic_rel: &[(Vec3, Vec3)],
    alerter: &Alerter,
) -> Option<f64> {
    let region_at = |t: f64| -> Region {
        let own_state = dimension_trajectory(dimension, own_pos, own_vel, current_value, kin, mode, t);
        let mut worst = Region::None;
        for &(tpos, tvel) in traffic_rel {
            let traffic_pos = tpos + tvel * t;
            let rel = RelativeState::new(traffic_pos - own_state.position, tvel - own_state.velocity);
            worst = worst.max(worst_alerter_region(alerter, rel));
        }
        worst
    };

    if region_at(0.0).is_conflict() {
        return Some(0.0);
    }

    let mut prev_t = times[0];
    for &t in &times[1..] {
        if region_at(t).is_conflict() {
            let mut lo = prev_t;
            let mut hi = t;
            for _ in 0..30 {
                let mid = (lo + hi) / 2.0;
                if region_at(mid).is_conflict() {
                    hi = mid;
                } else {
                    lo = mid;
                }
            }
            return Some((lo + hi) / 2.0);
        }
        prev_t = t;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerting::AlertThreshold;
    use crate::detectors::Cd3dParams;
    use crate::state::Position;

    fn level_alerter() -> Alerter {
        Alerter::new(
            "test",
            vec![AlertThreshold::new(
                Detector::Cylinder(Cd3dParams::new(1000.0, 150.0)),
                60.0,
                90.0,
                Region::Near,
            )],
        )
    }

    fn ownship() -> AircraftState {
        AircraftState::new(
            "own",
            Position::Euclidean(Vec3::new(0.0, 0.0, 3000.0)),
            Vec3::new(0.0, 150.0, 0.0),
            0.0,
        )
    }

    #[test]
    fn direction_bands_clear_when_no_traffic() {
        let params = Parameters::default();
        let bands = compute_bands(
            Dimension::HorizontalDirection,
            &params,
            &ownship(),
            &[],
            WindVector::ZERO,
            &level_alerter(),
        );
        assert!(bands.bands.iter().all(|b| b.region == Region::None));
    }

    #[test]
    fn head_on_traffic_produces_a_conflict_band() {
        let mut params = Parameters::default();
        params.lookahead_time = 120.0;
        let traffic = AircraftState::new(
            "t1",
            Position::Euclidean(Vec3::new(0.0, 18_000.0, 3000.0)),
            Vec3::new(0.0, -150.0, 0.0),
            0.0,
        );
        let bands = compute_bands(
            Dimension::HorizontalDirection,
            &params,
            &ownship(),
            &[traffic],
            WindVector::ZERO,
            &level_alerter(),
        );
        assert!(bands.bands.iter().any(|b| b.region.is_conflict()));
        assert!(bands.last_time_to_maneuver.is_some());
    }

    #[test]
    fn resolution_prefers_current_value_when_clear() {
        let params = Parameters::default();
        let bands = compute_bands(
            Dimension::HorizontalSpeed,
            &params,
            &ownship(),
            &[],
            WindVector::ZERO,
            &level_alerter(),
        );
        assert!(bands.resolution.preferred.is_some());
    }
}
