//! Unit handling at the API boundary (§9 "Units are carried at the API
//! boundary only; all internal math is SI").
//!
//! Internally every quantity is a plain `f64` in metres, seconds, radians
//! and combinations thereof. This module is where a caller's `uom` values
//! cross into that representation, and where the config text format
//! (§6.2) parses/formats `value [unit]` pairs.

use uom::si::angle::{degree, radian};
use uom::si::f64::{Angle, Length, Time, Velocity};
use uom::si::length::{foot, meter, nautical_mile};
use uom::si::time::second;
use uom::si::velocity::{foot_per_minute, knot, meter_per_second};

pub fn length_m(l: Length) -> f64 {
    l.get::<meter>()
}
pub fn time_s(t: Time) -> f64 {
    t.get::<second>()
}
pub fn angle_rad(a: Angle) -> f64 {
    a.get::<radian>()
}
pub fn velocity_mps(v: Velocity) -> f64 {
    v.get::<meter_per_second>()
}

pub fn length_from_m(v: f64) -> Length {
    Length::new::<meter>(v)
}
pub fn time_from_s(v: f64) -> Time {
    Time::new::<second>(v)
}
pub fn angle_from_rad(v: f64) -> Angle {
    Angle::new::<radian>(v)
}
pub fn velocity_from_mps(v: f64) -> Velocity {
    Velocity::new::<meter_per_second>(v)
}

/// A unit name as it appears in the `value [unit]` config grammar (§6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Meter,
    Foot,
    NauticalMile,
    Second,
    Radian,
    Degree,
    MeterPerSecond,
    Knot,
    FootPerMinute,
    Unitless,
}

impl Unit {
    pub fn parse(name: &str) -> Option<Unit> {
        Some(match name {
            "m" => Unit::Meter,
            "ft" => Unit::Foot,
            "NM" | "nmi" => Unit::NauticalMile,
            "s" => Unit::Second,
            "rad" => Unit::Radian,
            "deg" => Unit::Degree,
            "m/s" => Unit::MeterPerSecond,
            "knot" | "kn" => Unit::Knot,
            "fpm" => Unit::FootPerMinute,
            "unitless" | "" => Unit::Unitless,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Unit::Meter => "m",
            Unit::Foot => "ft",
            Unit::NauticalMile => "NM",
            Unit::Second => "s",
            Unit::Radian => "rad",
            Unit::Degree => "deg",
            Unit::MeterPerSecond => "m/s",
            Unit::Knot => "kn",
            Unit::FootPerMinute => "fpm",
            Unit::Unitless => "unitless",
        }
    }

    /// Converts a raw value expressed in this unit into internal SI.
    pub fn to_internal(self, value: f64) -> f64 {
        match self {
            Unit::Meter => value,
            Unit::Foot => Length::new::<foot>(value).get::<meter>(),
            Unit::NauticalMile => Length::new::<nautical_mile>(value).get::<meter>(),
            Unit::Second => value,
            Unit::Radian => value,
            Unit::Degree => Angle::new::<degree>(value).get::<radian>(),
            Unit::MeterPerSecond => value,
            Unit::Knot => Velocity::new::<knot>(value).get::<meter_per_second>(),
            Unit::FootPerMinute => Velocity::new::<foot_per_minute>(value).get::<meter_per_second>(),
            Unit::Unitless => value,
        }
    }

    /// Converts an internal SI value into this unit, the inverse of
    /// [`Unit::to_internal`].
    pub fn from_internal(self, value: f64) -> f64 {
        match self {
            Unit::Meter => value,
            Unit::Foot => Length::new::<meter>(value).get::<foot>(),
            Unit::NauticalMile => Length::new::<meter>(value).get::<nautical_mile>(),
            Unit::Second => value,
            Unit::Radian => value,
            Unit::Degree => Angle::new::<radian>(value).get::<degree>(),
            Unit::MeterPerSecond => value,
            Unit::Knot => Velocity::new::<meter_per_second>(value).get::<knot>(),
            Unit::FootPerMinute => Velocity::new::<meter_per_second>(value).get::<foot_per_minute>(),
            Unit::Unitless => value,
        }
    }
}
