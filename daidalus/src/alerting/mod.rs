//! Alerter taxonomy and per-step alert-level evaluation (§3 Alerter,
//! §4.3).

pub mod dta;
pub mod hysteresis;

use crate::detectors::{ConflictData, Detector, RelativeState};
use crate::region::Region;

/// One severity level of an alerter (§3 AlertThreshold). `spread_*` are
/// the per-dimension extensions applied when this level's detector is
/// used by the bands engine (§4.2 step 3), expressed as additional margin
/// on top of the detector's own thresholds; `0.0` means "use the
/// detector's own geometry unchanged".
#[derive(Debug, Clone, PartialEq)]
pub struct AlertThreshold {
    pub detector: Detector,
    pub alerting_time: f64,
    pub early_alerting_time: f64,
    pub region: Region,
    pub spread_hdir: f64,
    pub spread_hs: f64,
    pub spread_vs: f64,
    pub spread_alt: f64,
}

impl AlertThreshold {
    pub fn new(detector: Detector, alerting_time: f64, early_alerting_time: f64, region: Region) -> Self {
        AlertThreshold {
            detector,
            alerting_time,
            early_alerting_time,
            region,
            spread_hdir: 0.0,
            spread_hs: 0.0,
            spread_vs: 0.0,
            spread_alt: 0.0,
        }
    }

    /// Conflict data for this level's detector over `[0, lookahead]`,
    /// using `early_alerting_time` as the horizon fed to the bands engine
    /// (§4.2 step 3) rather than `alerting_time` (used by §4.3 alerting).
    pub fn early_conflict(&self, state: RelativeState) -> ConflictData {
        self.detector.conflict(state, 0.0, self.early_alerting_time)
    }

    pub fn alerting_conflict(&self, state: RelativeState) -> ConflictData {
        self.detector.conflict(state, 0.0, self.alerting_time)
    }

    /// Whether this level fires right now (§4.3: timeIn <= alerting_time).
    pub fn fires(&self, state: RelativeState) -> bool {
        let cd = self.alerting_conflict(state);
        cd.is_conflict() && cd.time_in <= self.alerting_time
    }
}

/// An ordered, 1-indexed list of severity thresholds for one class of
/// traffic (§3 Alerter). Invariant: level `k+1` strictly dominates level
/// `k` (§8 invariant 4); the region of the most severe level is `Near`.
#[derive(Debug, Clone, PartialEq)]
pub struct Alerter {
    pub name: String,
    levels: Vec<AlertThreshold>,
}

impl Alerter {
    pub fn new(name: impl Into<String>, levels: Vec<AlertThreshold>) -> Self {
        Alerter {
            name: name.into(),
            levels,
        }
    }

    pub fn levels(&self) -> &[AlertThreshold] {
        &self.levels
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// 1-indexed level accessor; `level()` with `k == 0` is meaningless
    /// (level 0 means "no alert" and has no threshold record).
    pub fn level(&self, k: usize) -> Option<&AlertThreshold> {
        if k == 0 {
            None
        } else {
            self.levels.get(k - 1)
        }
    }

    /// Scans from most severe to least severe (§4.3) and returns the
    /// highest level whose detector fires. `0` means no alert.
    pub fn evaluate(&self, state: RelativeState) -> usize {
        for (idx, threshold) in self.levels.iter().enumerate().rev() {
            if threshold.fires(state) {
                return idx + 1;
            }
        }
        0
    }

    /// Validates the §3 dominance invariant: region must be non-decreasing
    /// and alerting_time must be non-increasing as `k` grows, and the
    /// final level's region must be `Near`. Returns the offending level
    /// index on violation.
    pub fn validate_dominance(&self) -> Result<(), usize> {
        if self.levels.is_empty() {
            return Ok(());
        }
        for w in self.levels.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            if b.region.severity_rank() < a.region.severity_rank() || b.alerting_time > a.alerting_time
            {
                return Err(1);
            }
        }
        if self.levels.last().map(|l| l.region) != Some(Region::Near) {
            return Err(self.levels.len());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::{Cd3dParams, Detector};
    use crate::geometry::Vec3;

    fn sample_alerter() -> Alerter {
        Alerter::new(
            "test",
            vec![
                AlertThreshold::new(
                    Detector::Cylinder(Cd3dParams::new(300.0, 100.0)),
                    60.0,
                    90.0,
                    Region::Far,
                ),
                AlertThreshold::new(
                    Detector::Cylinder(Cd3dParams::new(600.0, 150.0)),
                    40.0,
                    60.0,
                    Region::Mid,
                ),
                AlertThreshold::new(
                    Detector::Cylinder(Cd3dParams::new(900.0, 150.0)),
                    20.0,
                    30.0,
                    Region::Near,
                ),
            ],
        )
    }

    #[test]
    fn dominance_holds_for_well_formed_alerter() {
        assert!(sample_alerter().validate_dominance().is_ok());
    }

    #[test]
    fn evaluate_returns_highest_firing_level() {
        let alerter = sample_alerter();
        let state = RelativeState::new(Vec3::new(800.0, 0.0, 0.0), Vec3::new(-50.0, 0.0, 0.0));
        let level = alerter.evaluate(state);
        assert!(level >= 1);
    }

    #[test]
    fn evaluate_returns_zero_when_clear() {
        let alerter = sample_alerter();
        let state = RelativeState::new(Vec3::new(50_000.0, 0.0, 0.0), Vec3::new(50.0, 0.0, 0.0));
        assert_eq!(alerter.evaluate(state), 0);
    }
}
