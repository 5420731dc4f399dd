//! The parameter store (§3 Parameters, §6.1 recognized keys, §6.2
//! persisted config file format).

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::alerting::dta::DtaConfig;
use crate::alerting::{AlertThreshold, Alerter};
use crate::detectors::{Cd3dParams, Detector, TcasEntry, TcasParams, WcvKind, WcvParams};
use crate::errors::DaidalusError;
use crate::region::Region;
use crate::units::Unit;

/// Bumped on every accepted mutation; the coordinator's cache fingerprint
/// (§4.5) includes this so any setter invalidates the cache (§3
/// "Parameters ... with ... a snapshot identity").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParametersEpoch(pub u64);

/// Tri-valued resolution of the "below minimum airspeed" open question
/// (§9): `0` disables direction bands below `min_airspeed`, `+1` computes
/// them instantaneously, `-1` uses a kinematic turn with a surrogate
/// ground speed (implementation-defined magnitude, `<= min_hs`, §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BelowMinAirspeed {
    Disabled,
    Instantaneous,
    KinematicSurrogate,
}

impl BelowMinAirspeed {
    fn from_i8(v: i8) -> Self {
        match v {
            1 => BelowMinAirspeed::Instantaneous,
            -1 => BelowMinAirspeed::KinematicSurrogate,
            _ => BelowMinAirspeed::Disabled,
        }
    }
    fn to_i8(self) -> i8 {
        match self {
            BelowMinAirspeed::Disabled => 0,
            BelowMinAirspeed::Instantaneous => 1,
            BelowMinAirspeed::KinematicSurrogate => -1,
        }
    }
}

/// Accumulates one `<name>_det_<j>_*` detector definition across however
/// many lines of a config file mention it, in any order, before
/// [`Parameters::load`] finalizes it into a real [`Detector`] (§6.1).
#[derive(Debug, Clone, Default, PartialEq)]
struct DetectorSpec {
    kind: Option<String>,
    d: Option<f64>,
    h: Option<f64>,
    dthr: Option<f64>,
    zthr: Option<f64>,
    tthr: Option<f64>,
    tcoa: Option<f64>,
}

/// Accumulates one `<name>_alert_<k>_*` alert-level definition the same
/// way, referencing a [`DetectorSpec`] by index.
#[derive(Debug, Clone, Default, PartialEq)]
struct LevelSpec {
    detector: Option<usize>,
    region: Option<Region>,
    alerting_time: Option<f64>,
    early_alerting_time: Option<f64>,
    spread_hdir: f64,
    spread_hs: f64,
    spread_vs: f64,
    spread_alt: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub lookahead_time: f64,
    pub left_hdir: f64,
    pub right_hdir: f64,
    pub min_hs: f64,
    pub max_hs: f64,
    pub min_airspeed: f64,
    pub min_vs: f64,
    pub max_vs: f64,
    pub min_alt: f64,
    pub max_alt: f64,
    pub step_hdir: f64,
    pub step_hs: f64,
    pub step_vs: f64,
    pub step_alt: f64,
    pub horizontal_accel: f64,
    pub vertical_accel: f64,
    pub turn_rate: f64,
    pub bank_angle: f64,
    pub vertical_rate: f64,
    pub recovery_stability_time: f64,
    pub min_horizontal_recovery: f64,
    pub min_vertical_recovery: f64,
    pub recovery_hdir: bool,
    pub recovery_hs: bool,
    pub recovery_vs: bool,
    pub recovery_alt: bool,
    pub ca_bands: bool,
    pub ca_factor: f64,
    pub horizontal_nmac: f64,
    pub vertical_nmac: f64,
    pub hysteresis_time: f64,
    pub persistence_time: f64,
    pub persistence_preferred_hdir: f64,
    pub persistence_preferred_hs: f64,
    pub persistence_preferred_vs: f64,
    pub persistence_preferred_alt: f64,
    pub alerting_m: usize,
    pub alerting_n: usize,
    pub contour_thr: f64,
    pub dta: DtaConfig,
    pub corrective_region: Region,
    pub ownship_centric_alerting: bool,
    pub hdir_bands_below_min_as: BelowMinAirspeed,
    pub time_to_maneuver: f64,

    alerter_order: Vec<String>,
    alerters: BTreeMap<String, Alerter>,
    epoch: u64,

    pending_detectors: BTreeMap<(String, usize), DetectorSpec>,
    pending_levels: BTreeMap<(String, usize), LevelSpec>,
}

impl Default for Parameters {
    fn default() -> Self {
        // DO-365B-ish defaults, in internal SI.
        Parameters {
            lookahead_time: 180.0,
            left_hdir: std::f64::consts::PI,
            right_hdir: std::f64::consts::PI,
            min_hs: Unit::Knot.to_internal(0.0),
            max_hs: Unit::Knot.to_internal(1000.0),
            min_airspeed: Unit::Knot.to_internal(30.0),
            min_vs: Unit::FootPerMinute.to_internal(-6000.0),
            max_vs: Unit::FootPerMinute.to_internal(6000.0),
            min_alt: 0.0,
            max_alt: Unit::Foot.to_internal(50000.0),
            step_hdir: 1.0_f64.to_radians(),
            step_hs: Unit::Knot.to_internal(1.0),
            step_vs: Unit::FootPerMinute.to_internal(100.0),
            step_alt: Unit::Foot.to_internal(100.0),
            horizontal_accel: 2.0,
            vertical_accel: 1.0,
            turn_rate: 3.0_f64.to_radians(),
            bank_angle: 0.0,
            vertical_rate: Unit::FootPerMinute.to_internal(1500.0),
            recovery_stability_time: 2.0,
            min_horizontal_recovery: Unit::NauticalMile.to_internal(0.66),
            min_vertical_recovery: Unit::Foot.to_internal(450.0),
            recovery_hdir: true,
            recovery_hs: true,
            recovery_vs: true,
            recovery_alt: true,
            ca_bands: true,
            ca_factor: 0.2,
            horizontal_nmac: Unit::Foot.to_internal(500.0),
            vertical_nmac: Unit::Foot.to_internal(100.0),
            hysteresis_time: 5.0,
            persistence_time: 10.0,
            persistence_preferred_hdir: 15.0_f64.to_radians(),
            persistence_preferred_hs: Unit::Knot.to_internal(10.0),
            persistence_preferred_vs: Unit::FootPerMinute.to_internal(200.0),
            persistence_preferred_alt: Unit::Foot.to_internal(200.0),
            alerting_m: 0,
            alerting_n: 0,
            contour_thr: std::f64::consts::PI,
            dta: DtaConfig::default(),
            corrective_region: Region::Mid,
            ownship_centric_alerting: false,
            hdir_bands_below_min_as: BelowMinAirspeed::Disabled,
            time_to_maneuver: 0.0,
            alerter_order: Vec::new(),
            alerters: BTreeMap::new(),
            epoch: 0,
            pending_detectors: BTreeMap::new(),
            pending_levels: BTreeMap::new(),
        }
    }
}

impl Parameters {
    pub fn epoch(&self) -> ParametersEpoch {
        ParametersEpoch(self.epoch)
    }

    fn bump(&mut self) {
        self.epoch += 1;
    }

    pub fn alerters(&self) -> impl Iterator<Item = &Alerter> {
        self.alerter_order.iter().filter_map(|n| self.alerters.get(n))
    }

    pub fn alerter(&self, name: &str) -> Option<&Alerter> {
        self.alerters.get(name)
    }

    pub fn default_alerter_name(&self) -> Option<&str> {
        self.alerter_order.first().map(|s| s.as_str())
    }

    pub fn add_alerter(&mut self, alerter: Alerter) -> Result<(), DaidalusError> {
        if alerter.validate_dominance().is_err() {
            return Err(DaidalusError::InvalidParameter {
                key: format!("{}_alert_*", alerter.name),
                reason: "alert levels must be strictly dominant and end in NEAR".into(),
            });
        }
        if !self.alerter_order.iter().any(|n| n == &alerter.name) {
            self.alerter_order.push(alerter.name.clone());
        }
        self.alerters.insert(alerter.name.clone(), alerter);
        self.bump();
        Ok(())
    }

    /// Kinematic knob bundle for the trajectory generator (§4.2 step 2).
    pub fn kinematics(&self) -> crate::kinematics::KinematicParams {
        crate::kinematics::KinematicParams {
            horizontal_accel: self.horizontal_accel,
            vertical_accel: self.vertical_accel,
            turn_rate: self.turn_rate,
            bank_angle: self.bank_angle,
            vertical_rate: self.vertical_rate,
            time_to_maneuver: self.time_to_maneuver,
        }
    }

    pub fn mode(&self) -> crate::kinematics::Mode {
        let instantaneous = self.horizontal_accel <= 0.0
            && self.vertical_accel <= 0.0
            && self.turn_rate <= 0.0
            && self.bank_angle <= 0.0
            && self.vertical_rate <= 0.0;
        if instantaneous {
            crate::kinematics::Mode::Instantaneous
        } else {
            crate::kinematics::Mode::Kinematic
        }
    }

    /// Validates and applies a single recognized simple (non-alerter) key.
    /// Rejects with the previous value retained on violation (§7).
    pub fn set(&mut self, key: &str, value: f64) -> Result<(), DaidalusError> {
        macro_rules! reject {
            ($reason:expr) => {
                return Err(DaidalusError::InvalidParameter {
                    key: key.to_string(),
                    reason: $reason.to_string(),
                })
            };
        }
        if let Some((name, j, field)) = parse_det_key(key) {
            let spec = self.pending_detectors.entry((name.to_string(), j)).or_default();
            match field {
                "D" | "H" | "DTHR" | "ZTHR" if value <= 0.0 => reject!("must be > 0"),
                "TTHR" | "TCOA" if value < 0.0 => reject!("must be >= 0"),
                "D" => spec.d = Some(value),
                "H" => spec.h = Some(value),
                "DTHR" => spec.dthr = Some(value),
                "ZTHR" => spec.zthr = Some(value),
                "TTHR" => spec.tthr = Some(value),
                "TCOA" => spec.tcoa = Some(value),
                _ => reject!("unrecognized detector field"),
            }
            self.bump();
            return Ok(());
        }
        if let Some((name, k, field)) = parse_alert_key(key) {
            let spec = self.pending_levels.entry((name.to_string(), k)).or_default();
            match field {
                "alerting_time" | "early_alerting_time" if value < 0.0 => reject!("must be >= 0"),
                "alerting_time" => spec.alerting_time = Some(value),
                "early_alerting_time" => spec.early_alerting_time = Some(value),
                "spread_hdir" => spec.spread_hdir = value,
                "spread_hs" => spec.spread_hs = value,
                "spread_vs" => spec.spread_vs = value,
                "spread_alt" => spec.spread_alt = value,
                "detector" => {
                    if value < 1.0 || value.fract() != 0.0 {
                        reject!("must be a positive detector index");
                    }
                    spec.detector = Some(value as usize);
                }
                _ => reject!("unrecognized alert-level field"),
            }
            self.bump();
            return Ok(());
        }
        match key {
            "lookahead_time" => {
                if value <= 0.0 {
                    reject!("must be > 0");
                }
                self.lookahead_time = value;
            }
            "left_hdir" | "right_hdir" => {
                if !(0.0..=std::f64::consts::PI).contains(&value) {
                    reject!("must be within [0, pi]");
                }
                if key == "left_hdir" {
                    self.left_hdir = value;
                } else {
                    self.right_hdir = value;
                }
            }
            "min_hs" => {
                if value < 0.0 || value >= self.max_hs {
                    reject!("must be >= 0 and < max_hs");
                }
                self.min_hs = value;
            }
            "max_hs" => {
                if value <= self.min_hs {
                    reject!("must be > min_hs");
                }
                self.max_hs = value;
            }
            "min_airspeed" => {
                if value < 0.0 {
                    reject!("must be >= 0");
                }
                self.min_airspeed = value;
            }
            "min_vs" => {
                if value >= self.max_vs {
                    reject!("must be < max_vs");
                }
                self.min_vs = value;
            }
            "max_vs" => {
                if value <= self.min_vs {
                    reject!("must be > min_vs");
                }
                self.max_vs = value;
            }
            "min_alt" => {
                if value < 0.0 || value >= self.max_alt {
                    reject!("must be >= 0 and < max_alt");
                }
                self.min_alt = value;
            }
            "max_alt" => {
                if value <= self.min_alt {
                    reject!("must be > min_alt");
                }
                self.max_alt = value;
            }
            "step_hdir" | "step_hs" | "step_vs" | "step_alt" => {
                if value <= 0.0 {
                    reject!("must be > 0");
                }
                match key {
                    "step_hdir" => self.step_hdir = value,
                    "step_hs" => self.step_hs = value,
                    "step_vs" => self.step_vs = value,
                    _ => self.step_alt = value,
                }
            }
            "horizontal_accel" | "vertical_accel" | "vertical_rate" | "turn_rate" | "bank_angle" => {
                if value < 0.0 {
                    reject!("must be >= 0");
                }
                match key {
                    "horizontal_accel" => self.horizontal_accel = value,
                    "vertical_accel" => self.vertical_accel = value,
                    "vertical_rate" => self.vertical_rate = value,
                    "turn_rate" => self.turn_rate = value,
                    _ => self.bank_angle = value,
                }
            }
            "recovery_stability_time" | "hysteresis_time" | "persistence_time" | "time_to_maneuver" => {
                if value < 0.0 {
                    reject!("must be >= 0");
                }
                match key {
                    "recovery_stability_time" => self.recovery_stability_time = value,
                    "hysteresis_time" => self.hysteresis_time = value,
                    "persistence_time" => self.persistence_time = value,
                    _ => self.time_to_maneuver = value,
                }
            }
            "min_horizontal_recovery" => {
                if value < self.horizontal_nmac {
                    reject!("must be >= horizontal_nmac");
                }
                self.min_horizontal_recovery = value;
            }
            "min_vertical_recovery" => {
                if value < self.vertical_nmac {
                    reject!("must be >= vertical_nmac");
                }
                self.min_vertical_recovery = value;
            }
            "ca_factor" => {
                if !(0.0..=1.0).contains(&value) || value == 0.0 {
                    reject!("must be within (0, 1]");
                }
                self.ca_factor = value;
            }
            "horizontal_nmac" | "vertical_nmac" => {
                if value <= 0.0 {
                    reject!("must be > 0");
                }
                match key {
                    "horizontal_nmac" => self.horizontal_nmac = value,
                    _ => self.vertical_nmac = value,
                }
            }
            "contour_thr" => {
                if !(0.0..=std::f64::consts::PI).contains(&value) {
                    reject!("must be within [0, pi]");
                }
                self.contour_thr = value;
            }
            "persistence_preferred_hdir" | "persistence_preferred_hs" | "persistence_preferred_vs"
            | "persistence_preferred_alt" => {
                if value < 0.0 {
                    reject!("must be >= 0");
                }
                match key {
                    "persistence_preferred_hdir" => self.persistence_preferred_hdir = value,
                    "persistence_preferred_hs" => self.persistence_preferred_hs = value,
                    "persistence_preferred_vs" => self.persistence_preferred_vs = value,
                    _ => self.persistence_preferred_alt = value,
                }
            }
            "alerting_m" | "alerting_n" => {
                if value < 0.0 || value.fract() != 0.0 {
                    reject!("must be a non-negative integer");
                }
                match key {
                    "alerting_m" => self.alerting_m = value as usize,
                    _ => self.alerting_n = value as usize,
                }
                if self.alerting_m > self.alerting_n {
                    reject!("alerting_m must be <= alerting_n");
                }
            }
            "dta_logic" => {
                self.dta.logic = value as i8;
            }
            "dta_latitude" => self.dta.center_lat = value,
            "dta_longitude" => self.dta.center_lon = value,
            "dta_radius" => self.dta.radius = value,
            "dta_height" => self.dta.height = value,
            "hdir_bands_below_min_as" => {
                self.hdir_bands_below_min_as = BelowMinAirspeed::from_i8(value as i8);
            }
            _ => {
                reject!("unrecognized key");
            }
        }
        self.bump();
        Ok(())
    }

    pub fn set_bool(&mut self, key: &str, value: bool) -> Result<(), DaidalusError> {
        match key {
            "recovery_hdir" => self.recovery_hdir = value,
            "recovery_hs" => self.recovery_hs = value,
            "recovery_vs" => self.recovery_vs = value,
            "recovery_alt" => self.recovery_alt = value,
            "ca_bands" => self.ca_bands = value,
            "ownship_centric_alerting" => self.ownship_centric_alerting = value,
            "dta_special_maneuver_guidance" => self.dta.special_maneuver_guidance = value,
            _ => {
                return Err(DaidalusError::InvalidParameter {
                    key: key.to_string(),
                    reason: "unrecognized boolean key".into(),
                })
            }
        }
        self.bump();
        Ok(())
    }

    /// Sets a string-valued key: `dta_alerter`, or the `region`/`type`
    /// fields of the dynamic alerter grammar (§6.1) that can't be carried
    /// through [`Parameters::set`]'s `f64` value.
    fn set_str(&mut self, key: &str, value: &str) -> Result<(), DaidalusError> {
        if key == "dta_alerter" {
            self.dta.alerter_name = value.to_string();
            self.bump();
            return Ok(());
        }
        if let Some((name, j, "type")) = parse_det_key(key) {
            self.pending_detectors.entry((name.to_string(), j)).or_default().kind = Some(value.to_string());
            self.bump();
            return Ok(());
        }
        if let Some((name, k, "region")) = parse_alert_key(key) {
            let region = parse_region(value).ok_or_else(|| DaidalusError::InvalidParameter {
                key: key.to_string(),
                reason: format!("unrecognized region `{value}`"),
            })?;
            self.pending_levels.entry((name.to_string(), k)).or_default().region = Some(region);
            self.bump();
            return Ok(());
        }
        Err(DaidalusError::InvalidParameter {
            key: key.to_string(),
            reason: "unrecognized key".into(),
        })
    }

    /// Every recognized simple key, in the order §6.2 "saving emits every
    /// recognized key" expects them written.
    pub fn recognized_keys() -> &'static [&'static str] {
        &[
            "lookahead_time",
            "left_hdir",
            "right_hdir",
            "min_hs",
            "max_hs",
            "min_airspeed",
            "min_vs",
            "max_vs",
            "min_alt",
            "max_alt",
            "step_hdir",
            "step_hs",
            "step_vs",
            "step_alt",
            "horizontal_accel",
            "vertical_accel",
            "turn_rate",
            "bank_angle",
            "vertical_rate",
            "recovery_stability_time",
            "min_horizontal_recovery",
            "min_vertical_recovery",
            "recovery_hdir",
            "recovery_hs",
            "recovery_vs",
            "recovery_alt",
            "ca_bands",
            "ca_factor",
            "horizontal_nmac",
            "vertical_nmac",
            "hysteresis_time",
            "persistence_time",
            "persistence_preferred_hdir",
            "persistence_preferred_hs",
            "persistence_preferred_vs",
            "persistence_preferred_alt",
            "alerting_m",
            "alerting_n",
            "contour_thr",
            "dta_logic",
            "dta_latitude",
            "dta_longitude",
            "dta_radius",
            "dta_height",
            "dta_special_maneuver_guidance",
            "dta_alerter",
            "ownship_centric_alerting",
            "hdir_bands_below_min_as",
            "time_to_maneuver",
        ]
    }

    /// Serializes the snapshot to the §6.2 text format: one `key = value
    /// [unit]` per line, every recognized key present.
    pub fn save(&self) -> String {
        let mut out = String::new();
        for key in Self::recognized_keys() {
            let (value, unit) = self.raw_value_and_unit(key);
            let _ = writeln!(out, "{key} = {value} [{}]", unit.name());
        }
        // A table-based (Tcas) alerter can't be fully described by the
        // per-level/per-detector key grammar below, so it's left out of
        // both the name list and the detail lines entirely rather than
        // emitted half-complete: a `load()` of this text wouldn't be able
        // to rebuild it anyway, and built-in TCAS alerters are always
        // reconstructed in code (`default_dta_alerter`).
        let text_representable =
            |a: &Alerter| a.levels().iter().all(|l| !matches!(l.detector, Detector::Tcas(_)));
        let representable_names: Vec<&str> =
            self.alerters().filter(|a| text_representable(a)).map(|a| a.name.as_str()).collect();
        if !representable_names.is_empty() {
            let _ = writeln!(out, "alerters = {}", representable_names.join(","));
        }
        for alerter in self.alerters().filter(|a| text_representable(a)) {
            for (idx, level) in alerter.levels().iter().enumerate() {
                let k = idx + 1;
                let name = &alerter.name;
                let _ = writeln!(out, "{name}_alert_{k}_detector = {k}");
                let _ = writeln!(out, "{name}_alert_{k}_region = {}", region_name(level.region));
                let _ = writeln!(out, "{name}_alert_{k}_alerting_time = {} [s]", level.alerting_time);
                let _ = writeln!(
                    out,
                    "{name}_alert_{k}_early_alerting_time = {} [s]",
                    level.early_alerting_time
                );
                if level.spread_hdir != 0.0 {
                    let _ = writeln!(
                        out,
                        "{name}_alert_{k}_spread_hdir = {} [deg]",
                        Unit::Degree.from_internal(level.spread_hdir)
                    );
                }
                if level.spread_hs != 0.0 {
                    let _ = writeln!(
                        out,
                        "{name}_alert_{k}_spread_hs = {} [kn]",
                        Unit::Knot.from_internal(level.spread_hs)
                    );
                }
                if level.spread_vs != 0.0 {
                    let _ = writeln!(
                        out,
                        "{name}_alert_{k}_spread_vs = {} [fpm]",
                        Unit::FootPerMinute.from_internal(level.spread_vs)
                    );
                }
                if level.spread_alt != 0.0 {
                    let _ = writeln!(
                        out,
                        "{name}_alert_{k}_spread_alt = {} [ft]",
                        Unit::Foot.from_internal(level.spread_alt)
                    );
                }
                match &level.detector {
                    Detector::Cylinder(p) => {
                        let _ = writeln!(out, "{name}_det_{k}_type = cylinder");
                        let _ = writeln!(out, "{name}_det_{k}_D = {} [ft]", Unit::Foot.from_internal(p.d));
                        let _ = writeln!(out, "{name}_det_{k}_H = {} [ft]", Unit::Foot.from_internal(p.h));
                    }
                    Detector::Wcv(p) => {
                        let kind = match p.kind {
                            WcvKind::TauMod => "wcv_taumod",
                            WcvKind::Tcpa => "wcv_tcpa",
                            WcvKind::Tep => "wcv_tep",
                        };
                        let _ = writeln!(out, "{name}_det_{k}_type = {kind}");
                        let _ = writeln!(out, "{name}_det_{k}_DTHR = {} [NM]", Unit::NauticalMile.from_internal(p.dthr));
                        let _ = writeln!(out, "{name}_det_{k}_ZTHR = {} [ft]", Unit::Foot.from_internal(p.zthr));
                        let _ = writeln!(out, "{name}_det_{k}_TTHR = {} [s]", p.tthr);
                        let _ = writeln!(out, "{name}_det_{k}_TCOA = {} [s]", p.tcoa);
                    }
                    Detector::Tcas(_) => {
                        // Table-based detectors aren't representable in this flat
                        // per-level grammar; built-in TCAS alerters are wired in
                        // code rather than round-tripped through text.
                    }
                }
            }
        }
        out
    }

    fn raw_value_and_unit(&self, key: &str) -> (String, Unit) {
        let bool_str = |b: bool| if b { "true" } else { "false" }.to_string();
        match key {
            "lookahead_time" => (Unit::Second.from_internal(self.lookahead_time).to_string(), Unit::Second),
            "left_hdir" => (Unit::Degree.from_internal(self.left_hdir).to_string(), Unit::Degree),
            "right_hdir" => (Unit::Degree.from_internal(self.right_hdir).to_string(), Unit::Degree),
            "min_hs" => (Unit::Knot.from_internal(self.min_hs).to_string(), Unit::Knot),
            "max_hs" => (Unit::Knot.from_internal(self.max_hs).to_string(), Unit::Knot),
            "min_airspeed" => (Unit::Knot.from_internal(self.min_airspeed).to_string(), Unit::Knot),
            "min_vs" => (
                Unit::FootPerMinute.from_internal(self.min_vs).to_string(),
                Unit::FootPerMinute,
            ),
            "max_vs" => (
                Unit::FootPerMinute.from_internal(self.max_vs).to_string(),
                Unit::FootPerMinute,
            ),
            "min_alt" => (Unit::Foot.from_internal(self.min_alt).to_string(), Unit::Foot),
            "max_alt" => (Unit::Foot.from_internal(self.max_alt).to_string(), Unit::Foot),
            "step_hdir" => (Unit::Degree.from_internal(self.step_hdir).to_string(), Unit::Degree),
            "step_hs" => (Unit::Knot.from_internal(self.step_hs).to_string(), Unit::Knot),
            "step_vs" => (
                Unit::FootPerMinute.from_internal(self.step_vs).to_string(),
                Unit::FootPerMinute,
            ),
            "step_alt" => (Unit::Foot.from_internal(self.step_alt).to_string(), Unit::Foot),
            "horizontal_accel" => (self.horizontal_accel.to_string(), Unit::Unitless),
            "vertical_accel" => (self.vertical_accel.to_string(), Unit::Unitless),
            "turn_rate" => (Unit::Degree.from_internal(self.turn_rate).to_string(), Unit::Degree),
            "bank_angle" => (Unit::Degree.from_internal(self.bank_angle).to_string(), Unit::Degree),
            "vertical_rate" => (
                Unit::FootPerMinute.from_internal(self.vertical_rate).to_string(),
                Unit::FootPerMinute,
            ),
            "recovery_stability_time" => (self.recovery_stability_time.to_string(), Unit::Second),
            "min_horizontal_recovery" => (
                Unit::NauticalMile.from_internal(self.min_horizontal_recovery).to_string(),
                Unit::NauticalMile,
            ),
            "min_vertical_recovery" => (
                Unit::Foot.from_internal(self.min_vertical_recovery).to_string(),
                Unit::Foot,
            ),
            "recovery_hdir" => (bool_str(self.recovery_hdir), Unit::Unitless),
            "recovery_hs" => (bool_str(self.recovery_hs), Unit::Unitless),
            "recovery_vs" => (bool_str(self.recovery_vs), Unit::Unitless),
            "recovery_alt" => (bool_str(self.recovery_alt), Unit::Unitless),
            "ca_bands" => (bool_str(self.ca_bands), Unit::Unitless),
            "ca_factor" => (self.ca_factor.to_string(), Unit::Unitless),
            "horizontal_nmac" => (Unit::Foot.from_internal(self.horizontal_nmac).to_string(), Unit::Foot),
            "vertical_nmac" => (Unit::Foot.from_internal(self.vertical_nmac).to_string(), Unit::Foot),
            "hysteresis_time" => (self.hysteresis_time.to_string(), Unit::Second),
            "persistence_time" => (self.persistence_time.to_string(), Unit::Second),
            "persistence_preferred_hdir" => (
                Unit::Degree.from_internal(self.persistence_preferred_hdir).to_string(),
                Unit::Degree,
            ),
            "persistence_preferred_hs" => (
                Unit::Knot.from_internal(self.persistence_preferred_hs).to_string(),
                Unit::Knot,
            ),
            "persistence_preferred_vs" => (
                Unit::FootPerMinute
                    .from_internal(self.persistence_preferred_vs)
                    .to_string(),
                Unit::FootPerMinute,
            ),
            "persistence_preferred_alt" => (
                Unit::Foot.from_internal(self.persistence_preferred_alt).to_string(),
                Unit::Foot,
            ),
            "alerting_m" => (self.alerting_m.to_string(), Unit::Unitless),
            "alerting_n" => (self.alerting_n.to_string(), Unit::Unitless),
            "contour_thr" => (Unit::Degree.from_internal(self.contour_thr).to_string(), Unit::Degree),
            "dta_logic" => (self.dta.logic.to_string(), Unit::Unitless),
            "dta_latitude" => (Unit::Degree.from_internal(self.dta.center_lat).to_string(), Unit::Degree),
            "dta_longitude" => (Unit::Degree.from_internal(self.dta.center_lon).to_string(), Unit::Degree),
            "dta_radius" => (Unit::NauticalMile.from_internal(self.dta.radius).to_string(), Unit::NauticalMile),
            "dta_height" => (Unit::Foot.from_internal(self.dta.height).to_string(), Unit::Foot),
            "dta_special_maneuver_guidance" => {
                (bool_str(self.dta.special_maneuver_guidance), Unit::Unitless)
            }
            "dta_alerter" => (self.dta.alerter_name.clone(), Unit::Unitless),
            "ownship_centric_alerting" => (bool_str(self.ownship_centric_alerting), Unit::Unitless),
            "hdir_bands_below_min_as" => (self.hdir_bands_below_min_as.to_i8().to_string(), Unit::Unitless),
            "time_to_maneuver" => (self.time_to_maneuver.to_string(), Unit::Second),
            _ => (String::new(), Unit::Unitless),
        }
    }

    /// Parses the §6.2 text format. Missing keys retain current values:
    /// `load` is called on `self` in place, consistent with "loading
    /// merges into the current snapshot".
    pub fn load(&mut self, text: &str) -> Result<(), DaidalusError> {
        for (line_no, raw_line) in text.lines().enumerate() {
            let line = raw_line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let (key, rest) = line.split_once('=').ok_or_else(|| {
                DaidalusError::ConfigParse(format!("line {}: missing '='", line_no + 1))
            })?;
            let key = key.trim();
            let rest = rest.trim();
            self.load_one(key, rest)?;
        }
        self.finalize_pending_alerters()
    }

    fn load_one(&mut self, key: &str, rest: &str) -> Result<(), DaidalusError> {
        if key == "alerters" {
            for name in rest.split(',') {
                let name = name.trim();
                if !name.is_empty() && !self.alerter_order.iter().any(|n| n == name) {
                    self.alerter_order.push(name.to_string());
                }
            }
            return Ok(());
        }

        // Strip an optional trailing `[unit]` before checking for a bare
        // boolean literal: a saved `recovery_hdir = true [unitless]` line
        // must load back, not fall through to the numeric parser.
        let bare = strip_unit_bracket(rest);
        if bare == "true" {
            return self.set_bool(key, true);
        }
        if bare == "false" {
            return self.set_bool(key, false);
        }

        if key == "dta_alerter" || is_region_key(key) || is_type_key(key) {
            return self.set_str(key, bare);
        }

        let (number, unit) = split_value_unit(rest)?;
        let internal = unit.to_internal(number);
        self.set(key, internal)
    }

    /// Builds any alerters accumulated in `pending_levels`/`pending_detectors`
    /// during this `load` call and registers them via [`Parameters::add_alerter`]
    /// (§6.1). Each alerter's key lines may arrive in any order; this runs
    /// once the whole text has been scanned.
    fn finalize_pending_alerters(&mut self) -> Result<(), DaidalusError> {
        let mut names: Vec<String> = self.pending_levels.keys().map(|(n, _)| n.clone()).collect();
        names.sort();
        names.dedup();
        for name in names {
            let mut indices: Vec<usize> = self
                .pending_levels
                .keys()
                .filter(|(n, _)| n == &name)
                .map(|(_, k)| *k)
                .collect();
            indices.sort_unstable();
            let mut levels = Vec::with_capacity(indices.len());
            for k in indices {
                let spec = self.pending_levels.get(&(name.clone(), k)).cloned().unwrap_or_default();
                let det_idx = spec.detector.ok_or_else(|| DaidalusError::InvalidParameter {
                    key: format!("{name}_alert_{k}_detector"),
                    reason: "missing detector reference".into(),
                })?;
                let det_spec = self.pending_detectors.get(&(name.clone(), det_idx)).ok_or_else(|| {
                    DaidalusError::InvalidParameter {
                        key: format!("{name}_det_{det_idx}"),
                        reason: "referenced detector is undefined".into(),
                    }
                })?;
                let detector = build_detector(&name, det_idx, det_spec)?;
                let region = spec.region.ok_or_else(|| DaidalusError::InvalidParameter {
                    key: format!("{name}_alert_{k}_region"),
                    reason: "missing region".into(),
                })?;
                let alerting_time = spec.alerting_time.ok_or_else(|| DaidalusError::InvalidParameter {
                    key: format!("{name}_alert_{k}_alerting_time"),
                    reason: "missing alerting_time".into(),
                })?;
                let early_alerting_time = spec.early_alerting_time.unwrap_or(alerting_time);
                let mut level = AlertThreshold::new(detector, alerting_time, early_alerting_time, region);
                level.spread_hdir = spec.spread_hdir;
                level.spread_hs = spec.spread_hs;
                level.spread_vs = spec.spread_vs;
                level.spread_alt = spec.spread_alt;
                levels.push(level);
            }
            self.add_alerter(Alerter::new(name, levels))?;
        }
        self.pending_levels.clear();
        self.pending_detectors.clear();
        Ok(())
    }
}

fn strip_unit_bracket(rest: &str) -> &str {
    match rest.find('[') {
        Some(idx) => rest[..idx].trim(),
        None => rest.trim(),
    }
}

fn is_region_key(key: &str) -> bool {
    matches!(parse_alert_key(key), Some((_, _, "region")))
}

fn is_type_key(key: &str) -> bool {
    matches!(parse_det_key(key), Some((_, _, "type")))
}

/// Splits `<name>_alert_<k>_<field>` into its parts. Assumes alerter names
/// don't themselves contain the literal marker `_alert_`.
fn parse_alert_key(key: &str) -> Option<(&str, usize, &str)> {
    let idx = key.find("_alert_")?;
    let name = &key[..idx];
    let rest = &key[idx + "_alert_".len()..];
    let (k_str, field) = rest.split_once('_')?;
    let k: usize = k_str.parse().ok()?;
    Some((name, k, field))
}

/// Splits `<name>_det_<j>_<field>` the same way, assuming alerter names
/// don't themselves contain the literal marker `_det_`.
fn parse_det_key(key: &str) -> Option<(&str, usize, &str)> {
    let idx = key.find("_det_")?;
    let name = &key[..idx];
    let rest = &key[idx + "_det_".len()..];
    let (j_str, field) = rest.split_once('_')?;
    let j: usize = j_str.parse().ok()?;
    Some((name, j, field))
}

fn parse_region(s: &str) -> Option<Region> {
    Some(match s.to_ascii_uppercase().as_str() {
        "NONE" => Region::None,
        "FAR" => Region::Far,
        "MID" => Region::Mid,
        "NEAR" => Region::Near,
        _ => return None,
    })
}

fn region_name(r: Region) -> &'static str {
    match r {
        Region::None => "NONE",
        Region::Far => "FAR",
        Region::Mid => "MID",
        Region::Near => "NEAR",
        Region::Recovery => "RECOVERY",
        Region::Unknown => "UNKNOWN",
    }
}

fn build_detector(name: &str, j: usize, spec: &DetectorSpec) -> Result<Detector, DaidalusError> {
    let missing = |field: &str| DaidalusError::InvalidParameter {
        key: format!("{name}_det_{j}_{field}"),
        reason: "missing".into(),
    };
    match spec.kind.as_deref() {
        Some("cylinder") => Ok(Detector::Cylinder(Cd3dParams::new(
            spec.d.ok_or_else(|| missing("D"))?,
            spec.h.ok_or_else(|| missing("H"))?,
        ))),
        Some(kind @ ("wcv_taumod" | "wcv_tcpa" | "wcv_tep")) => {
            let wcv_kind = match kind {
                "wcv_taumod" => WcvKind::TauMod,
                "wcv_tcpa" => WcvKind::Tcpa,
                _ => WcvKind::Tep,
            };
            Ok(Detector::Wcv(WcvParams::new(
                wcv_kind,
                spec.dthr.ok_or_else(|| missing("DTHR"))?,
                spec.zthr.ok_or_else(|| missing("ZTHR"))?,
                spec.tthr.ok_or_else(|| missing("TTHR"))?,
                spec.tcoa.ok_or_else(|| missing("TCOA"))?,
            )))
        }
        Some(other) => Err(DaidalusError::InvalidParameter {
            key: format!("{name}_det_{j}_type"),
            reason: format!("unrecognized detector type `{other}`"),
        }),
        None => Err(missing("type")),
    }
}

fn split_value_unit(rest: &str) -> Result<(f64, Unit), DaidalusError> {
    let (number_str, unit_str) = match rest.find('[') {
        Some(idx) => {
            let number_str = rest[..idx].trim();
            let unit_str = rest[idx + 1..].trim_end_matches(']').trim();
            (number_str, unit_str)
        }
        None => (rest.trim(), ""),
    };
    let number: f64 = number_str
        .parse()
        .map_err(|_| DaidalusError::ConfigParse(format!("invalid number `{number_str}`")))?;
    let unit = Unit::parse(unit_str).unwrap_or(Unit::Unitless);
    Ok((number, unit))
}

/// Builds the default DO-365B-style alerter (`WC_SC_228_nom_b` in the
/// source system's naming) with three FAR/MID/NEAR levels over
/// `WCV_TAUMOD`, used as the out-of-the-box alerter when none is loaded.
pub fn default_alerter() -> Alerter {
    let far = AlertThreshold::new(
        Detector::Wcv(WcvParams::new(WcvKind::TauMod, Unit::NauticalMile.to_internal(0.66), Unit::Foot.to_internal(700.0), 35.0, 35.0)),
        55.0,
        75.0,
        Region::Far,
    );
    let mid = AlertThreshold::new(
        Detector::Wcv(WcvParams::new(WcvKind::TauMod, Unit::NauticalMile.to_internal(0.66), Unit::Foot.to_internal(450.0), 35.0, 35.0)),
        55.0,
        55.0,
        Region::Mid,
    );
    let near = AlertThreshold::new(
        Detector::Cylinder(Cd3dParams::new(Unit::Foot.to_internal(2000.0), Unit::Foot.to_internal(450.0))),
        35.0,
        35.0,
        Region::Near,
    );
    Alerter::new("default", vec![far, mid, near])
}

/// Builds a TCAS-table-based alerter suitable for the DTA terminal-area
/// context (§4.2 "DTA active: the coordinator substitutes the DTA
/// alerter").
pub fn default_dta_alerter() -> Alerter {
    let ta = AlertThreshold::new(
        Detector::Tcas(TcasParams::new(ta_table(), 0.0)),
        48.0,
        48.0,
        Region::Mid,
    );
    let ra = AlertThreshold::new(
        Detector::Tcas(TcasParams::new(TcasParams::default_ra_table(), 0.0)),
        35.0,
        35.0,
        Region::Near,
    );
    Alerter::new("dta", vec![ta, ra])
}

fn ta_table() -> Vec<TcasEntry> {
    TcasParams::default_ra_table()
        .into_iter()
        .map(|mut e| {
            e.tau += 5.0;
            e.dmod *= 1.2;
            e
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_internally_consistent() {
        let p = Parameters::default();
        assert!(p.min_hs < p.max_hs);
        assert!(p.min_vs < p.max_vs);
        assert!(p.min_alt < p.max_alt);
    }

    #[test]
    fn set_rejects_invalid_and_keeps_previous() {
        let mut p = Parameters::default();
        let before = p.lookahead_time;
        let result = p.set("lookahead_time", -5.0);
        assert!(result.is_err());
        assert_eq!(p.lookahead_time, before);
    }

    #[test]
    fn set_accepts_and_bumps_epoch() {
        let mut p = Parameters::default();
        let epoch_before = p.epoch();
        p.set("lookahead_time", 200.0).unwrap();
        assert_eq!(p.lookahead_time, 200.0);
        assert_ne!(p.epoch(), epoch_before);
    }

    #[test]
    fn save_then_load_round_trips_numeric_keys() {
        let mut p = Parameters::default();
        p.set("lookahead_time", 240.0).unwrap();
        let text = p.save();
        let mut p2 = Parameters::default();
        p2.load(&text).unwrap();
        assert!((p2.lookahead_time - 240.0).abs() < 1e-6);
    }

    #[test]
    fn load_ignores_comments_and_blank_lines() {
        let mut p = Parameters::default();
        p.load("# a comment\n\nlookahead_time = 90 [s]\n").unwrap();
        assert_eq!(p.lookahead_time, 90.0);
    }

    #[test]
    fn default_alerter_is_dominant() {
        assert!(default_alerter().validate_dominance().is_ok());
    }

    #[test]
    fn save_then_load_round_trips_a_boolean_key() {
        let mut p = Parameters::default();
        p.set_bool("recovery_hdir", false).unwrap();
        let text = p.save();
        assert!(text.contains("recovery_hdir = false"));
        let mut p2 = Parameters::default();
        p2.load(&text).unwrap();
        assert!(!p2.recovery_hdir);
    }

    #[test]
    fn load_accepts_bare_bool_without_unit_bracket() {
        let mut p = Parameters::default();
        p.load("ca_bands = false\n").unwrap();
        assert!(!p.ca_bands);
    }

    #[test]
    fn save_then_load_round_trips_a_custom_alerter() {
        let mut p = Parameters::default();
        p.add_alerter(default_alerter()).unwrap();
        let text = p.save();

        let mut p2 = Parameters::default();
        p2.load(&text).unwrap();

        let loaded = p2.alerter("default").expect("alerter round-trips");
        assert_eq!(loaded.num_levels(), 3);
        assert_eq!(loaded.levels()[0].region, Region::Far);
        assert_eq!(loaded.levels()[2].region, Region::Near);
        assert!(matches!(loaded.levels()[2].detector, Detector::Cylinder(_)));
        assert!(matches!(loaded.levels()[0].detector, Detector::Wcv(_)));
        assert!(loaded.validate_dominance().is_ok());
    }

    #[test]
    fn load_rejects_alert_level_missing_its_detector() {
        let mut p = Parameters::default();
        let text = "custom_alert_1_region = NEAR\ncustom_alert_1_alerting_time = 30 [s]\n\
                    custom_alert_1_detector = 1\n";
        assert!(p.load(text).is_err());
    }

    #[test]
    fn dta_alerter_key_sets_dta_alerter_name() {
        let mut p = Parameters::default();
        p.load("dta_alerter = dta\n").unwrap();
        assert_eq!(p.dta.alerter_name, "dta");
    }

    #[test]
    fn saving_a_tcas_alerter_is_left_out_but_does_not_break_the_rest() {
        let mut p = Parameters::default();
        p.add_alerter(default_alerter()).unwrap();
        p.add_alerter(default_dta_alerter()).unwrap();
        let text = p.save();
        assert!(!text.contains("dta_alert_1"));

        let mut p2 = Parameters::default();
        p2.load(&text).unwrap();
        assert!(p2.alerter("default").is_some());
        assert!(p2.alerter("dta").is_none());
    }
}
