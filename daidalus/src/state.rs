//! Aircraft state, wind, and position-frame handling (§3).

use crate::errors::{DaidalusError, ErrorLog};
use crate::geometry::Vec3;

/// Earth radius used by the internal flat-earth projection, matching the
/// mean radius used by the teacher's haversine helper.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A position in one of the two frames every aircraft in a step must
/// share (§3 invariant: "matching frame across the step").
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Position {
    /// Latitude, longitude (radians) and altitude (metres, above the
    /// projection's local tangent plane).
    Geodesic {
        lat: f64,
        lon: f64,
        alt: f64,
    },
    /// Local East-North-Up metres.
    Euclidean(Vec3),
}

impl Position {
    pub fn is_finite(&self) -> bool {
        match self {
            Position::Geodesic { lat, lon, alt } => {
                lat.is_finite() && lon.is_finite() && alt.is_finite()
            }
            Position::Euclidean(v) => v.x.is_finite() && v.y.is_finite() && v.z.is_finite(),
        }
    }

    fn is_geodesic(&self) -> bool {
        matches!(self, Position::Geodesic { .. })
    }

    /// Projects this position into a local ENU frame centred on `origin`.
    /// `origin` is itself used only for its latitude (equirectangular
    /// projection, consistent with the teacher's haversine-based
    /// projection, which is documented as "good enough, not a full
    /// geodesic library" per the out-of-scope projection collaborator in
    /// §1).
    pub fn to_local(&self, origin_lat: f64) -> Vec3 {
        match *self {
            Position::Euclidean(v) => v,
            Position::Geodesic { lat, lon, alt } => {
                let x = EARTH_RADIUS_M * lon * origin_lat.cos();
                let y = EARTH_RADIUS_M * lat;
                Vec3::new(x, y, alt)
            }
        }
    }
}

/// Horizontal + vertical position/velocity uncertainty for one aircraft
/// (§3, optional sensor covariances).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Uncertainty {
    /// East-west, north-south, east-north position std. deviations (m).
    pub horizontal_position: Option<(f64, f64, f64)>,
    /// Vertical position std. deviation (m).
    pub vertical_position: Option<f64>,
    /// East-west, north-south, east-north velocity std. deviations (m/s).
    pub horizontal_velocity: Option<(f64, f64, f64)>,
    /// Vertical velocity std. deviation (m/s).
    pub vertical_velocity: Option<f64>,
}

/// One aircraft's kinematic state at a single time-of-applicability (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct AircraftState {
    pub id: String,
    pub position: Position,
    /// Ground velocity, east-north-up, m/s.
    pub ground_velocity: Vec3,
    pub time: f64,
    pub uncertainty: Uncertainty,
}

impl AircraftState {
    pub fn new(id: impl Into<String>, position: Position, ground_velocity: Vec3, time: f64) -> Self {
        AircraftState {
            id: id.into(),
            position,
            ground_velocity,
            time,
            uncertainty: Uncertainty::default(),
        }
    }

    /// Validates the §3 invariants that don't depend on sibling aircraft
    /// (finiteness, positive time). Frame-consistency across a step is
    /// checked by the coordinator, which sees the whole traffic list.
    pub fn validate(&self, log: &mut ErrorLog) -> bool {
        let mut ok = true;
        if !self.position.is_finite() {
            log.warn(DaidalusError::NonFiniteInput("position"));
            ok = false;
        }
        if !self.ground_velocity.x.is_finite()
            || !self.ground_velocity.y.is_finite()
            || !self.ground_velocity.z.is_finite()
        {
            log.warn(DaidalusError::NonFiniteInput("ground_velocity"));
            ok = false;
        }
        if !self.time.is_finite() || self.time < 0.0 {
            log.warn(DaidalusError::NonFiniteInput("time"));
            ok = false;
        }
        if self.id.is_empty() {
            log.warn(DaidalusError::NonFiniteInput("id"));
            ok = false;
        }
        ok
    }

    pub fn is_geodesic(&self) -> bool {
        self.position.is_geodesic()
    }

    /// Air velocity = ground velocity - wind (§3).
    pub fn air_velocity(&self, wind: WindVector) -> Vec3 {
        self.ground_velocity - wind.blowing_to
    }

    /// Local ENU position of this aircraft, projected if geodesic, with
    /// `origin_lat` supplied by the coordinator (typically the ownship's
    /// latitude) so every aircraft in a step is projected consistently.
    pub fn local_position(&self, origin_lat: f64) -> Vec3 {
        self.position.to_local(origin_lat)
    }
}

/// A single process-wide "blowing-to" velocity (§3). Zero means no wind.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindVector {
    pub blowing_to: Vec3,
}

impl WindVector {
    pub const ZERO: WindVector = WindVector {
        blowing_to: Vec3::new(0.0, 0.0, 0.0),
    };

    pub fn new(blowing_to: Vec3) -> Self {
        WindVector { blowing_to }
    }

    /// Same vector interpreted as a "from" (meteorological) direction.
    pub fn blowing_from(&self) -> Vec3 {
        -self.blowing_to
    }
}

/// Checks that every aircraft in a step (ownship + traffic) shares the
/// same [`Position`] frame (§3 invariant), logging and dropping mismatched
/// traffic rather than aborting the step (§7).
pub fn check_consistent_frame(
    ownship: &AircraftState,
    traffic: &[AircraftState],
    log: &mut ErrorLog,
) -> Vec<AircraftState> {
    let ownship_geodesic = ownship.is_geodesic();
    traffic
        .iter()
        .filter(|t| {
            if t.is_geodesic() != ownship_geodesic {
                log.warn(DaidalusError::InvalidFrame);
                false
            } else {
                true
            }
        })
        .cloned()
        .collect()
}
