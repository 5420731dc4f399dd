//! Hysteresis and persistence filters (§3 HysteresisState, §4.4).
//!
//! Two independent filters are applied per (traffic, dimension), in
//! series (§9 open question, resolved as: m-of-n first, then
//! time-dwell): an m-of-n confirmation gates *raising* the alert level,
//! then a time-based hold gates *lowering* it. Bands persistence is a
//! separate, simpler time-dwell filter on the preferred maneuver value.

use std::collections::VecDeque;

/// Filters a raw per-step alert level into a stabilised, committed one
/// (§4.4 "Alert hysteresis").
#[derive(Debug, Clone)]
pub struct AlertHysteresis {
    history: VecDeque<usize>,
    committed_level: usize,
    last_time_at_or_above_committed: f64,
    initialized: bool,
}

impl Default for AlertHysteresis {
    fn default() -> Self {
        AlertHysteresis {
            history: VecDeque::new(),
            committed_level: 0,
            last_time_at_or_above_committed: f64::NEG_INFINITY,
            initialized: false,
        }
    }
}

impl AlertHysteresis {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed_level(&self) -> usize {
        self.committed_level
    }

    /// Applies one step's raw alert level and returns the committed level.
    pub fn update(&mut self, raw_level: usize, now: f64, m: usize, n: usize, hysteresis_time: f64) -> usize {
        if !self.initialized {
            self.committed_level = raw_level;
            self.last_time_at_or_above_committed = now;
            self.initialized = true;
        }

        self.history.push_back(raw_level);
        while self.history.len() > n.max(1) {
            self.history.pop_front();
        }

        let candidate = Self::confirmed_level(&self.history, m);

        if raw_level >= self.committed_level {
            self.last_time_at_or_above_committed = now;
        }

        if candidate > self.committed_level {
            self.committed_level = candidate;
        } else if candidate < self.committed_level
            && now - self.last_time_at_or_above_committed >= hysteresis_time
        {
            self.committed_level = candidate;
        }

        self.committed_level
    }

    /// The highest level `L` observed at least `m` times in `history`
    /// (i.e. at least `m` samples with `raw >= L`); `0` always qualifies.
    fn confirmed_level(history: &VecDeque<usize>, m: usize) -> usize {
        let max_seen = history.iter().copied().max().unwrap_or(0);
        for level in (0..=max_seen).rev() {
            let count = history.iter().filter(|&&raw| raw >= level).count();
            if count >= m {
                return level;
            }
        }
        0
    }
}

/// Filters a raw per-step preferred maneuver value into a stabilised one
/// (§4.4 "Bands persistence"). Generic over the maneuver's scalar type
/// (a direction in radians, a speed, etc.) since all four dimensions use
/// the same rule with a dimension-specific threshold.
#[derive(Debug, Clone)]
pub struct Persistence {
    committed: Option<f64>,
    committed_time: f64,
}

impl Default for Persistence {
    fn default() -> Self {
        Persistence {
            committed: None,
            committed_time: f64::NEG_INFINITY,
        }
    }
}

impl Persistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed(&self) -> Option<f64> {
        self.committed
    }

    pub fn update(&mut self, new_value: f64, now: f64, threshold: f64, persistence_time: f64) -> f64 {
        match self.committed {
            None => {
                self.committed = Some(new_value);
                self.committed_time = now;
                new_value
            }
            Some(committed) => {
                let within_band = (new_value - committed).abs() <= threshold;
                let within_time = now - self.committed_time <= persistence_time;
                if within_band && within_time {
                    committed
                } else {
                    self.committed = Some(new_value);
                    self.committed_time = now;
                    new_value
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s5_hysteresis_hold_scenario() {
        // §8 S5: raw drops 2 -> 0 at step 2; m=2, n=3, hysteresis_time=5s.
        // Expect the committed level at step 2 to remain 2.
        let mut h = AlertHysteresis::new();
        assert_eq!(h.update(2, 0.0, 2, 3, 5.0), 2);
        assert_eq!(h.update(0, 1.0, 2, 3, 5.0), 2);
    }

    #[test]
    fn downgrade_happens_after_hold_expires() {
        let mut h = AlertHysteresis::new();
        h.update(2, 0.0, 2, 3, 5.0);
        h.update(0, 1.0, 2, 3, 5.0);
        h.update(0, 2.0, 2, 3, 5.0);
        let level = h.update(0, 10.0, 2, 3, 5.0);
        assert_eq!(level, 0);
    }

    #[test]
    fn raise_is_immediate_when_confirmed() {
        let mut h = AlertHysteresis::new();
        h.update(0, 0.0, 2, 3, 5.0);
        h.update(3, 1.0, 2, 3, 5.0);
        let level = h.update(3, 2.0, 2, 3, 5.0);
        assert_eq!(level, 3);
    }

    #[test]
    fn persistence_holds_within_band_and_time() {
        let mut p = Persistence::new();
        assert_eq!(p.update(1.0, 0.0, 0.2, 10.0), 1.0);
        // small change within threshold and time window: stays at 1.0
        assert_eq!(p.update(1.1, 1.0, 0.2, 10.0), 1.0);
    }

    #[test]
    fn persistence_releases_outside_band() {
        let mut p = Persistence::new();
        p.update(1.0, 0.0, 0.2, 10.0);
        let updated = p.update(5.0, 1.0, 0.2, 10.0);
        assert_eq!(updated, 5.0);
    }

    #[test]
    fn persistence_releases_after_time_expires() {
        let mut p = Persistence::new();
        p.update(1.0, 0.0, 0.2, 5.0);
        let updated = p.update(1.05, 10.0, 0.2, 5.0);
        assert_eq!(updated, 1.05);
    }
}
