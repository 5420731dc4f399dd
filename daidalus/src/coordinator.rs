//! The `Daidalus` coordinator (§3 Daidalus object, §4.5 caching, §5 input
//! ordering): owns one ownship/traffic/wind/parameter snapshot and answers
//! the alerting/bands/time-to-conflict query surface against it.

use std::collections::HashMap;

use crate::alerting::dta::DtaPhase;
use crate::alerting::hysteresis::{AlertHysteresis, Persistence};
use crate::bands::{compute_bands, DimensionBands};
use crate::config::{default_alerter, default_dta_alerter, Parameters, ParametersEpoch};
use crate::detectors::RelativeState;
use crate::dimension::Dimension;
use crate::errors::{DaidalusError, ErrorLog};
use crate::region::Region;
use crate::state::{check_consistent_frame, AircraftState, WindVector};

/// Cache key (§4.5): a snapshot is reused as long as none of its inputs
/// have changed. `times` are the per-aircraft `AircraftState::time` values,
/// cheap to compare and sufficient since every other field change bumps
/// the owning `AircraftState`'s identity in practice (the coordinator
/// always receives freshly-constructed states per step).
#[derive(Debug, Clone, PartialEq)]
struct Fingerprint {
    epoch: ParametersEpoch,
    ownship: AircraftState,
    traffic: Vec<AircraftState>,
    wind: WindVector,
}

/// The top-level engine object (§3). Input order matters (§5): parameters,
/// then ownship, then wind/uncertainties, then traffic, mirroring the
/// constructor/setter order below.
pub struct Daidalus {
    params: Parameters,
    ownship: Option<AircraftState>,
    traffic: Vec<AircraftState>,
    wind: WindVector,
    log: ErrorLog,

    cache: Option<Fingerprint>,
    cached_bands: HashMap<Dimension, DimensionBands>,
    cached_alerts: HashMap<String, usize>,

    alert_hysteresis: HashMap<(String, String), AlertHysteresis>,
    band_persistence: HashMap<(String, Dimension), Persistence>,
}

impl Default for Daidalus {
    fn default() -> Self {
        let mut params = Parameters::default();
        let _ = params.add_alerter(default_alerter());
        let _ = params.add_alerter(default_dta_alerter());
        params.dta.alerter_name = "dta".to_string();
        Daidalus {
            params,
            ownship: None,
            traffic: Vec::new(),
            wind: WindVector::ZERO,
            log: ErrorLog::new(),
            cache: None,
            cached_bands: HashMap::new(),
            cached_alerts: HashMap::new(),
            alert_hysteresis: HashMap::new(),
            band_persistence: HashMap::new(),
        }
    }
}

impl Daidalus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        self.invalidate();
        &mut self.params
    }

    pub fn log(&self) -> &ErrorLog {
        &self.log
    }

    pub fn set_wind(&mut self, wind: WindVector) {
        self.wind = wind;
        self.invalidate();
    }

    /// Sets the ownship state (§5 step 2). Clears traffic, matching the
    /// reference ordering: a new ownship invalidates any traffic recorded
    /// against the previous one.
    pub fn set_ownship(&mut self, state: AircraftState) {
        if !state.validate(&mut self.log) {
            return;
        }
        self.ownship = Some(state);
        self.traffic.clear();
        self.invalidate();
    }

    /// Adds one traffic aircraft (§5 step 4), dropping it if its frame is
    /// inconsistent with the ownship's or it fails basic validation.
    pub fn add_traffic(&mut self, state: AircraftState) {
        let Some(ownship) = self.ownship.clone() else {
            self.log.warn(DaidalusError::InvalidAircraftIndex(-1));
            return;
        };
        if !state.validate(&mut self.log) {
            return;
        }
        let kept = check_consistent_frame(&ownship, std::slice::from_ref(&state), &mut self.log);
        if let Some(accepted) = kept.into_iter().next() {
            self.traffic.push(accepted);
            self.invalidate();
        }
    }

    pub fn traffic_count(&self) -> usize {
        self.traffic.len()
    }

    /// Replaces the whole traffic list for the current step (§5: traffic is
    /// supplied as a batch after ownship/wind on each cycle), dropping
    /// entries that fail validation or frame-consistency the same way
    /// [`Daidalus::add_traffic`] does.
    pub fn set_traffic(&mut self, states: Vec<AircraftState>) {
        let Some(ownship) = self.ownship.clone() else {
            self.log.warn(DaidalusError::InvalidAircraftIndex(-1));
            return;
        };
        let mut kept = Vec::new();
        for state in states {
            if !state.validate(&mut self.log) {
                continue;
            }
            kept.extend(check_consistent_frame(&ownship, std::slice::from_ref(&state), &mut self.log));
        }
        self.traffic = kept;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.cache = None;
        self.cached_bands.clear();
        self.cached_alerts.clear();
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        let ownship = self.ownship.clone()?;
        Some(Fingerprint {
            epoch: self.params.epoch(),
            ownship,
            traffic: self.traffic.clone(),
            wind: self.wind,
        })
    }

    fn ensure_cache_fresh(&mut self) {
        let fresh = self.fingerprint();
        if fresh != self.cache {
            self.cached_bands.clear();
            self.cached_alerts.clear();
            self.cache = fresh;
        }
    }

    fn active_alerter_name(&self) -> Option<String> {
        if let Some(ownship) = &self.ownship {
            if self.params.dta.enabled() {
                let origin_lat = match ownship.position {
                    crate::state::Position::Geodesic { lat, .. } => lat,
                    crate::state::Position::Euclidean(_) => 0.0,
                };
                let pos = ownship.local_position(origin_lat);
                let horiz = (pos.x * pos.x + pos.y * pos.y).sqrt();
                if self.params.dta.contains(horiz, pos.z) {
                    return Some(self.params.dta.alerter_name.clone());
                }
            }
        }
        self.params.default_alerter_name().map(|s| s.to_string())
    }

    fn dta_phase(&self) -> Option<DtaPhase> {
        self.ownship.as_ref().map(|o| self.params.dta.phase(o.ground_velocity.z))
    }

    /// §4.3: the alert level for one traffic aircraft, after hysteresis
    /// (§4.4). `0` means no alert.
    pub fn alert_level(&mut self, traffic_id: &str, now: f64) -> usize {
        self.ensure_cache_fresh();
        if let Some(cached) = self.cached_alerts.get(traffic_id) {
            return *cached;
        }
        let Some(ownship) = self.ownship.clone() else {
            return 0;
        };
        let Some(alerter_name) = self.active_alerter_name() else {
            return 0;
        };
        let Some(alerter) = self.params.alerter(&alerter_name).cloned() else {
            return 0;
        };
        let Some(traffic) = self.traffic.iter().find(|t| t.id == traffic_id).cloned() else {
            return 0;
        };

        let origin_lat = match ownship.position {
            crate::state::Position::Geodesic { lat, .. } => lat,
            crate::state::Position::Euclidean(_) => 0.0,
        };
        let own_pos = ownship.local_position(origin_lat);
        let own_vel = ownship.air_velocity(self.wind);
        let t_pos = traffic.local_position(origin_lat);
        let t_vel = traffic.air_velocity(self.wind);
        let rel = RelativeState::new(t_pos - own_pos, t_vel - own_vel);

        let raw = alerter.evaluate(rel);
        let key = (traffic_id.to_string(), alerter_name);
        let hysteresis = self.alert_hysteresis.entry(key).or_default();
        let level = hysteresis.update(
            raw,
            now,
            self.params.alerting_m,
            self.params.alerting_n,
            self.params.hysteresis_time,
        );
        self.cached_alerts.insert(traffic_id.to_string(), level);
        level
    }

    /// §4.2, §3 Bands: the full per-dimension result, with the preferred
    /// resolution passed through band persistence (§4.4).
    pub fn bands(&mut self, dimension: Dimension, now: f64) -> Option<DimensionBands> {
        self.ensure_cache_fresh();
        if let Some(cached) = self.cached_bands.get(&dimension) {
            return Some(cached.clone());
        }
        let ownship = self.ownship.clone()?;
        let alerter_name = self.active_alerter_name()?;
        let alerter = self.params.alerter(&alerter_name)?.clone();

        let phase = self.dta_phase();
        let mut result = compute_bands(dimension, &self.params, &ownship, &self.traffic, self.wind, &alerter);

        if let Some(phase) = phase {
            if self.params.dta.suppresses_recovery(dimension, phase) {
                result.recovery = None;
                for band in &mut result.bands {
                    if band.region == Region::Recovery {
                        band.region = Region::Unknown;
                    }
                }
            }
        }

        if let Some(preferred) = result.resolution.preferred {
            let threshold = persistence_threshold(&self.params, dimension);
            let key = (ownship.id.clone(), dimension);
            let persistence = self.band_persistence.entry(key).or_default();
            result.resolution.preferred =
                Some(persistence.update(preferred, now, threshold, self.params.persistence_time));
        }

        self.cached_bands.insert(dimension, result.clone());
        Some(result)
    }

    /// §E.4: earliest time any traffic aircraft enters the ownship's
    /// corrective region, `None` if no such time exists within the
    /// lookahead.
    pub fn time_to_corrective_volume(&mut self, now: f64) -> Option<f64> {
        self.ensure_cache_fresh();
        let ownship = self.ownship.clone()?;
        let alerter_name = self.active_alerter_name()?;
        let alerter = self.params.alerter(&alerter_name)?.clone();
        let origin_lat = match ownship.position {
            crate::state::Position::Geodesic { lat, .. } => lat,
            crate::state::Position::Euclidean(_) => 0.0,
        };
        let own_pos = ownship.local_position(origin_lat);
        let own_vel = ownship.air_velocity(self.wind);

        let mut best: Option<f64> = None;
        for traffic in &self.traffic {
            let t_pos = traffic.local_position(origin_lat);
            let t_vel = traffic.air_velocity(self.wind);
            let rel = RelativeState::new(t_pos - own_pos, t_vel - own_vel);
            for level in alerter.levels() {
                if !level.region.is_corrective(self.params.corrective_region) {
                    continue;
                }
                let cd = level.detector.conflict(rel, 0.0, self.params.lookahead_time);
                if cd.is_conflict() {
                    best = Some(best.map_or(cd.time_in, |b: f64| b.min(cd.time_in)));
                }
            }
        }
        let _ = now;
        best
    }
}

fn persistence_threshold(params: &Parameters, dimension: Dimension) -> f64 {
    match dimension {
        Dimension::HorizontalDirection => params.persistence_preferred_hdir,
        Dimension::HorizontalSpeed => params.persistence_preferred_hs,
        Dimension::VerticalSpeed => params.persistence_preferred_vs,
        Dimension::Altitude => params.persistence_preferred_alt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec3;
    use crate::state::Position;

    fn own() -> AircraftState {
        AircraftState::new(
            "own",
            Position::Euclidean(Vec3::new(0.0, 0.0, 3000.0)),
            Vec3::new(0.0, 150.0, 0.0),
            0.0,
        )
    }

    #[test]
    fn fresh_coordinator_reports_no_alerts() {
        let mut d = Daidalus::new();
        d.set_ownship(own());
        assert_eq!(d.alert_level("nobody", 0.0), 0);
    }

    #[test]
    fn adding_traffic_without_ownship_is_dropped() {
        let mut d = Daidalus::new();
        d.add_traffic(AircraftState::new(
            "t1",
            Position::Euclidean(Vec3::new(100.0, 0.0, 0.0)),
            Vec3::new(0.0, 0.0, 0.0),
            0.0,
        ));
        assert_eq!(d.traffic_count(), 0);
        assert!(d.log().has_message());
    }

    #[test]
    fn head_on_traffic_raises_an_alert() {
        let mut d = Daidalus::new();
        d.set_ownship(own());
        d.add_traffic(AircraftState::new(
            "t1",
            Position::Euclidean(Vec3::new(0.0, 9_000.0, 3000.0)),
            Vec3::new(0.0, -150.0, 0.0),
            0.0,
        ));
        assert_eq!(d.traffic_count(), 1);
        let level = d.alert_level("t1", 0.0);
        assert!(level >= 1);
    }

    #[test]
    fn bands_are_cached_between_calls() {
        let mut d = Daidalus::new();
        d.set_ownship(own());
        let a = d.bands(Dimension::HorizontalDirection, 0.0);
        let b = d.bands(Dimension::HorizontalDirection, 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn mutating_parameters_invalidates_the_cache() {
        let mut d = Daidalus::new();
        d.set_ownship(own());
        let _ = d.bands(Dimension::Altitude, 0.0);
        assert!(d.cache.is_some());
        d.parameters_mut().set("lookahead_time", 200.0).unwrap();
        assert!(d.cache.is_none());
    }

    #[test]
    fn default_dta_alerter_is_registered_and_wired() {
        let d = Daidalus::new();
        assert!(d.parameters().alerter("dta").is_some());
        assert_eq!(d.parameters().dta.alerter_name, "dta");
    }

    #[test]
    fn dta_mode_resolves_a_real_alerter_inside_the_volume() {
        let mut d = Daidalus::new();
        let params = d.parameters_mut();
        params.set("dta_logic", 1.0).unwrap();
        params.set("dta_radius", 10_000.0).unwrap();
        params.set("dta_height", 10_000.0).unwrap();

        d.set_ownship(own());
        d.add_traffic(AircraftState::new(
            "t1",
            Position::Euclidean(Vec3::new(0.0, 9_000.0, 3000.0)),
            Vec3::new(0.0, -150.0, 0.0),
            0.0,
        ));
        assert_eq!(d.active_alerter_name().as_deref(), Some("dta"));
    }
}
