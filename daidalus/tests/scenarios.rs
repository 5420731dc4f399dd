//! End-to-end boundary scenarios and cross-cutting invariants over the
//! public `Daidalus` coordinator.

use daidalus::coordinator::Daidalus;
use daidalus::dimension::Dimension;
use daidalus::geometry::Vec3;
use daidalus::region::Region;
use daidalus::state::WindVector;
use daidalus::{AircraftState, Position};

fn knots(k: f64) -> f64 {
    k * 0.514444
}

fn track_velocity(track_deg: f64, speed_mps: f64) -> Vec3 {
    let track = track_deg.to_radians();
    Vec3::new(speed_mps * track.sin(), speed_mps * track.cos(), 0.0)
}

#[test]
fn head_on_corrective_scenario() {
    let mut d = Daidalus::new();
    d.set_ownship(AircraftState::new(
        "own",
        Position::Geodesic {
            lat: 33.95_f64.to_radians(),
            lon: (-96.70_f64).to_radians(),
            alt: 8700.0 * 0.3048,
        },
        track_velocity(206.0, knots(151.0)),
        0.0,
    ));
    d.add_traffic(AircraftState::new(
        "t1",
        Position::Geodesic {
            lat: 33.861916_f64.to_radians(),
            lon: (-96.732726_f64).to_radians(),
            alt: 9000.0 * 0.3048,
        },
        track_velocity(0.0, knots(210.0)),
        0.0,
    ));

    let level = d.alert_level("t1", 0.0);
    assert!((1..=3).contains(&level), "expected a corrective-or-worse alert, got {level}");

    let ttc = d.time_to_corrective_volume(0.0);
    assert!(ttc.is_some());
    assert!(ttc.unwrap() < d.parameters().lookahead_time);

    let bands = d.bands(Dimension::HorizontalDirection, 0.0).unwrap();
    assert!(bands.bands.iter().any(|b| b.region.is_conflict()));
}

#[test]
fn co_altitude_diverging_scenario() {
    let mut d = Daidalus::new();
    // Short enough that no heading choice, however aggressive, could close
    // the 10 nmi gap within the horizon; keeps every candidate clear.
    d.parameters_mut().set("lookahead_time", 60.0).unwrap();
    d.set_ownship(AircraftState::new(
        "own",
        Position::Euclidean(Vec3::new(0.0, 0.0, 3000.0)),
        track_velocity(0.0, knots(150.0)),
        0.0,
    ));
    // 10 nmi behind, same track, slower: falling further back every second.
    d.add_traffic(AircraftState::new(
        "t1",
        Position::Euclidean(Vec3::new(0.0, -18_520.0, 3000.0)),
        track_velocity(0.0, knots(100.0)),
        0.0,
    ));

    assert_eq!(d.alert_level("t1", 0.0), 0);
    let bands = d.bands(Dimension::HorizontalDirection, 0.0).unwrap();
    assert!(bands.bands.iter().all(|b| b.region == Region::None));
    assert!(bands.resolution.preferred.is_some());
    let current_track = 0.0_f64;
    let preferred = bands.resolution.preferred.unwrap();
    assert!((preferred - current_track).abs() < d.parameters().step_hdir + 1e-6);
}

#[test]
fn saturated_recovery_scenario() {
    let mut d = Daidalus::new();
    d.set_ownship(AircraftState::new(
        "own",
        Position::Euclidean(Vec3::new(0.0, 0.0, 3000.0)),
        track_velocity(0.0, knots(100.0)),
        0.0,
    ));
    // Stationary traffic 0.3 nmi (~556 m) dead ahead; ownship closing.
    d.add_traffic(AircraftState::new(
        "t1",
        Position::Euclidean(Vec3::new(0.0, 556.0, 3000.0)),
        Vec3::new(0.0, 0.0, 0.0),
        0.0,
    ));

    let bands = d.bands(Dimension::HorizontalDirection, 0.0).unwrap();
    assert!(bands.bands.iter().all(|b| b.region != Region::None));
    assert!(bands.bands.iter().any(|b| b.region == Region::Recovery));
    let recovery = bands.recovery.expect("a saturated conflict must report recovery info");
    assert!(!recovery.saturated);
    assert!(recovery.time_to_recovery > 0.0);
    assert!(recovery.time_to_recovery <= d.parameters().lookahead_time);
}

#[test]
fn nmac_unavoidable_scenario() {
    let mut d = Daidalus::new();
    d.set_ownship(AircraftState::new(
        "own",
        Position::Euclidean(Vec3::new(0.0, 0.0, 3000.0)),
        track_velocity(0.0, knots(200.0)),
        0.0,
    ));
    // 0.05 nmi (~92.6 m) dead ahead, closing fast: no heading choice can
    // escape the shrunk recovery volume at time zero.
    d.add_traffic(AircraftState::new(
        "t1",
        Position::Euclidean(Vec3::new(0.0, 92.6, 3000.0)),
        Vec3::new(0.0, 0.0, 0.0),
        0.0,
    ));

    let level = d.alert_level("t1", 0.0);
    assert_eq!(level, 3, "at NMAC range the most severe level must fire");

    let bands = d.bands(Dimension::HorizontalDirection, 0.0).unwrap();
    assert!(bands.bands.iter().all(|b| b.region != Region::Recovery));
    let recovery = bands.recovery.expect("full saturation must still report recovery info");
    assert!(recovery.saturated);
}

#[test]
fn hysteresis_hold_scenario() {
    let mut d = Daidalus::new();
    d.parameters_mut().set("alerting_m", 2.0).unwrap();
    d.parameters_mut().set("alerting_n", 3.0).unwrap();
    d.set_ownship(AircraftState::new(
        "own",
        Position::Euclidean(Vec3::new(0.0, 0.0, 3000.0)),
        Vec3::new(0.0, 0.0, 0.0),
        0.0,
    ));
    // Inside the MID volume (dthr ~1222 m), outside NEAR's (~610 m): raw 2.
    d.set_traffic(vec![AircraftState::new(
        "t1",
        Position::Euclidean(Vec3::new(0.0, 800.0, 3000.0)),
        Vec3::new(0.0, 0.0, 0.0),
        0.0,
    )]);
    assert_eq!(d.alert_level("t1", 0.0), 2);

    // Traffic jumps far away: raw drops to 0, but the hold keeps level 2
    // until hysteresis_time (5 s) has elapsed.
    d.set_traffic(vec![AircraftState::new(
        "t1",
        Position::Euclidean(Vec3::new(0.0, 50_000.0, 3000.0)),
        Vec3::new(0.0, 0.0, 0.0),
        0.0,
    )]);
    assert_eq!(d.alert_level("t1", 1.0), 2);
}

#[test]
fn wind_invariance_scenario() {
    let air_own = track_velocity(206.0, knots(151.0));
    let air_traffic = track_velocity(0.0, knots(210.0));

    let build = |wind: WindVector| {
        let mut d = Daidalus::new();
        d.set_wind(wind);
        d.set_ownship(AircraftState::new(
            "own",
            Position::Euclidean(Vec3::new(0.0, 0.0, 3000.0)),
            air_own + wind.blowing_to,
            0.0,
        ));
        d.add_traffic(AircraftState::new(
            "t1",
            Position::Euclidean(Vec3::new(-3020.0, -9795.0, 3000.0)),
            air_traffic + wind.blowing_to,
            0.0,
        ));
        d
    };

    let mut still = build(WindVector::ZERO);
    let wind = WindVector::new(track_velocity(90.0, knots(40.0)));
    let mut windy = build(wind);

    assert_eq!(still.alert_level("t1", 0.0), windy.alert_level("t1", 0.0));

    for dim in Dimension::ALL {
        let a = still.bands(dim, 0.0).unwrap();
        let b = windy.bands(dim, 0.0).unwrap();
        assert_eq!(a.bands.len(), b.bands.len());
        for (ba, bb) in a.bands.iter().zip(b.bands.iter()) {
            assert_eq!(ba.region, bb.region);
            assert!((ba.low - bb.low).abs() < 1e-6);
            assert!((ba.high - bb.high).abs() < 1e-6);
        }
    }
}

#[test]
fn bands_cover_the_full_configured_range() {
    let mut d = Daidalus::new();
    d.set_ownship(AircraftState::new(
        "own",
        Position::Euclidean(Vec3::new(0.0, 0.0, 3000.0)),
        track_velocity(0.0, knots(150.0)),
        0.0,
    ));
    let bands = d.bands(Dimension::Altitude, 0.0).unwrap();
    let low = bands.bands.first().unwrap().low;
    let high = bands.bands.last().unwrap().high;
    assert!((low - d.parameters().min_alt).abs() < 1e-6);
    assert!((high - d.parameters().max_alt).abs() < 1.0);
}

#[test]
fn repeated_queries_without_input_changes_are_idempotent() {
    let mut d = Daidalus::new();
    d.set_ownship(AircraftState::new(
        "own",
        Position::Euclidean(Vec3::new(0.0, 0.0, 3000.0)),
        track_velocity(0.0, knots(150.0)),
        0.0,
    ));
    d.add_traffic(AircraftState::new(
        "t1",
        Position::Euclidean(Vec3::new(5_000.0, 5_000.0, 3000.0)),
        Vec3::new(-50.0, -50.0, 0.0),
        0.0,
    ));

    let first = d.bands(Dimension::HorizontalSpeed, 0.0);
    let second = d.bands(Dimension::HorizontalSpeed, 0.0);
    assert_eq!(first, second);
}
