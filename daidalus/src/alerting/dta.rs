//! DTA (Designated Terminal Area) mode switch (§4.2 "Special
//! configurations", glossary "DTA").

use crate::dimension::Dimension;

/// Whether the ownship is flying into (`Approach`) or out of
/// (`Departure`) the terminal area, derived from `dta_logic`'s sign and
/// the ownship's current vertical speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtaPhase {
    Approach,
    Departure,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DtaConfig {
    /// `0` disabled, `+1`/`-1` select which vertical-speed sign counts as
    /// "approaching" (§6.1 `dta_logic`).
    pub logic: i8,
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius: f64,
    pub height: f64,
    pub alerter_name: String,
    pub special_maneuver_guidance: bool,
}

impl Default for DtaConfig {
    fn default() -> Self {
        DtaConfig {
            logic: 0,
            center_lat: 0.0,
            center_lon: 0.0,
            radius: 0.0,
            height: 0.0,
            alerter_name: String::new(),
            special_maneuver_guidance: false,
        }
    }
}

impl DtaConfig {
    pub fn enabled(&self) -> bool {
        self.logic != 0
    }

    /// `true` when the ownship's horizontal distance from the DTA centre
    /// and its altitude both put it inside the designated terminal area.
    pub fn contains(&self, horizontal_distance: f64, altitude: f64) -> bool {
        self.enabled() && horizontal_distance <= self.radius && altitude <= self.height
    }

    pub fn phase(&self, ownship_vertical_speed: f64) -> DtaPhase {
        let approaching = if self.logic >= 0 {
            ownship_vertical_speed <= 0.0
        } else {
            ownship_vertical_speed >= 0.0
        };
        if approaching {
            DtaPhase::Approach
        } else {
            DtaPhase::Departure
        }
    }

    /// §4.2: "if special maneuver guidance is enabled, suppresses
    /// non-horizontal recovery bands during approach while producing them
    /// during departure." Non-horizontal means vertical-speed and
    /// altitude; direction and horizontal-speed recovery are unaffected.
    pub fn suppresses_recovery(&self, dimension: Dimension, phase: DtaPhase) -> bool {
        if !self.enabled() || !self.special_maneuver_guidance {
            return false;
        }
        phase == DtaPhase::Approach
            && matches!(dimension, Dimension::VerticalSpeed | Dimension::Altitude)
    }
}
