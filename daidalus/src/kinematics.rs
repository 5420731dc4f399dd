//! Kinematic trajectory generator (§2, §4.2 step 2): closed-form turn,
//! speed-acceleration, vertical-rate and altitude-capture trajectories for
//! a single candidate maneuver value.

use crate::geometry::{turn_rate_from_bank, wrap_pi, Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Instantaneous,
    Kinematic,
}

/// The kinematic knobs of §6.1: `horizontal_accel`, `vertical_accel`,
/// `turn_rate`/`bank_angle` (exactly one non-zero), `vertical_rate`, and
/// the maneuver start delay `time_to_maneuver`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KinematicParams {
    pub horizontal_accel: f64,
    pub vertical_accel: f64,
    pub turn_rate: f64,
    pub bank_angle: f64,
    pub vertical_rate: f64,
    pub time_to_maneuver: f64,
}

impl KinematicParams {
    pub fn effective_turn_rate(&self, ground_speed: f64) -> f64 {
        if self.turn_rate > 0.0 {
            self.turn_rate
        } else {
            turn_rate_from_bank(ground_speed, self.bank_angle).abs()
        }
    }
}

/// Ownship position/velocity at one future sample time, in the same local
/// frame as the inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// Track angle (radians, clockwise from north) of a horizontal velocity.
fn track_of(v: Vec2) -> f64 {
    v.x.atan2(v.y)
}

fn velocity_from_track_speed(track: f64, speed: f64) -> Vec2 {
    Vec2::new(speed * track.sin(), speed * track.cos())
}

/// Horizontal-direction trajectory: turns the ground track toward
/// `target_track` at `effective_turn_rate`, holding ground speed and
/// vertical motion fixed (§4.2 step 2, direction dimension).
pub fn direction_state(
    pos: Vec3,
    vel: Vec3,
    target_track: f64,
    params: &KinematicParams,
    mode: Mode,
    t: f64,
) -> State {
    let delay = params.time_to_maneuver.max(0.0);
    let vh = Vec2::new(vel.x, vel.y);
    let speed = vh.norm();
    let track0 = track_of(vh);

    if t <= delay || speed < f64::EPSILON {
        return State {
            position: pos + vel * t,
            velocity: vel,
        };
    }
    let t_after = t - delay;
    let pos_at_delay = pos + vel * delay;

    if mode == Mode::Instantaneous {
        let new_vh = velocity_from_track_speed(target_track, speed);
        let new_vel = Vec3::new(new_vh.x, new_vh.y, vel.z);
        return State {
            position: pos_at_delay + new_vel * t_after,
            velocity: new_vel,
        };
    }

    let omega = params.effective_turn_rate(speed).max(f64::EPSILON);
    let diff = wrap_pi(target_track - track0);
    let turn_duration = diff.abs() / omega;
    let signed_omega = omega * diff.signum();

    if t_after >= turn_duration {
        // Finished turning; fly the rest of the leg straight.
        let heading_end = track0 + signed_omega * turn_duration;
        let arc_pos = arc_position(pos_at_delay, track0, speed, signed_omega, turn_duration);
        let straight_t = t_after - turn_duration;
        let vh_end = velocity_from_track_speed(heading_end, speed);
        let vel_end = Vec3::new(vh_end.x, vh_end.y, vel.z);
        State {
            position: arc_pos + vel_end * straight_t,
            velocity: vel_end,
        }
    } else {
        let heading = track0 + signed_omega * t_after;
        let vh_now = velocity_from_track_speed(heading, speed);
        State {
            position: arc_position(pos_at_delay, track0, speed, signed_omega, t_after),
            velocity: Vec3::new(vh_now.x, vh_now.y, vel.z),
        }
    }
}

/// Closed-form position after turning at constant rate `omega` for
/// duration `dt`, starting from track `track0` and speed `speed`.
fn arc_position(start: Vec3, track0: f64, speed: f64, omega: f64, dt: f64) -> Vec3 {
    if omega.abs() < f64::EPSILON {
        let v = velocity_from_track_speed(track0, speed);
        return start + Vec3::new(v.x, v.y, 0.0) * dt;
    }
    let heading_end = track0 + omega * dt;
    // x = east = speed*sin(track); integral of sin(track0+omega t) dt from 0..dt
    let dx = (speed / omega) * (track0.cos() - heading_end.cos());
    let dy = (speed / omega) * (heading_end.sin() - track0.sin());
    start + Vec3::new(dx, dy, 0.0)
}

/// Ramps a scalar (speed, vertical speed) from `v0` toward `target` at
/// acceleration magnitude `accel`, clamping on arrival. `accel <= 0` means
/// instantaneous (§6.1: "0 => instantaneous").
fn ramp_value(v0: f64, target: f64, accel: f64, delay: f64, t: f64) -> (f64, f64) {
    // returns (value_at_t, displacement_integral_from_0_to_t)
    if t <= delay {
        return (v0, v0 * t);
    }
    let t_after = t - delay;
    let disp_before = v0 * delay;
    if accel <= f64::EPSILON {
        return (target, disp_before + target * t_after);
    }
    let direction = (target - v0).signum();
    let ramp_time = (target - v0).abs() / accel;
    if t_after >= ramp_time {
        let disp_ramp = v0 * ramp_time + 0.5 * direction * accel * ramp_time * ramp_time;
        let t_cruise = t_after - ramp_time;
        (target, disp_before + disp_ramp + target * t_cruise)
    } else {
        let v = v0 + direction * accel * t_after;
        let disp = v0 * t_after + 0.5 * direction * accel * t_after * t_after;
        (v, disp_before + disp)
    }
}

/// Horizontal-speed trajectory: ramps ground speed toward `target_speed`
/// along the current track, vertical motion unaffected.
pub fn speed_state(
    pos: Vec3,
    vel: Vec3,
    target_speed: f64,
    params: &KinematicParams,
    mode: Mode,
    t: f64,
) -> State {
    let delay = params.time_to_maneuver.max(0.0);
    let vh = Vec2::new(vel.x, vel.y);
    let speed0 = vh.norm();
    let track = track_of(vh);
    let accel = match mode {
        Mode::Instantaneous => 0.0,
        Mode::Kinematic => params.horizontal_accel,
    };
    let (speed, disp) = ramp_value(speed0, target_speed, accel, delay, t);
    let dir = velocity_from_track_speed(track, 1.0);
    let new_vh = velocity_from_track_speed(track, speed);
    State {
        position: pos + Vec3::new(dir.x * disp, dir.y * disp, vel.z * t),
        velocity: Vec3::new(new_vh.x, new_vh.y, vel.z),
    }
}

/// Vertical-speed trajectory: ramps vertical speed toward `target_vs`.
pub fn vertical_speed_state(
    pos: Vec3,
    vel: Vec3,
    target_vs: f64,
    params: &KinematicParams,
    mode: Mode,
    t: f64,
) -> State {
    let delay = params.time_to_maneuver.max(0.0);
    let accel = match mode {
        Mode::Instantaneous => 0.0,
        Mode::Kinematic => params.vertical_accel,
    };
    let (vz, disp) = ramp_value(vel.z, target_vs, accel, delay, t);
    State {
        position: Vec3::new(pos.x + vel.x * t, pos.y + vel.y * t, pos.z + disp),
        velocity: Vec3::new(vel.x, vel.y, vz),
    }
}

/// Altitude-capture trajectory: climbs/descends at `vertical_rate`
/// (ramped by `vertical_accel`) toward `target_alt`, levelling off exactly
/// on arrival rather than overshooting (§2 "vertical-rate capture").
pub fn altitude_state(
    pos: Vec3,
    vel: Vec3,
    target_alt: f64,
    params: &KinematicParams,
    mode: Mode,
    t: f64,
) -> State {
    let delay = params.time_to_maneuver.max(0.0);
    if t <= delay {
        return State {
            position: pos + vel * t,
            velocity: vel,
        };
    }
    let t_after = t - delay;
    let pos_at_delay = pos + vel * delay;
    let remaining = target_alt - pos_at_delay.z;

    if mode == Mode::Instantaneous || params.vertical_rate <= f64::EPSILON {
        // Instantaneous: jump straight to the target altitude at the
        // start of the maneuver window and hold it.
        return State {
            position: Vec3::new(
                pos_at_delay.x + vel.x * t_after,
                pos_at_delay.y + vel.y * t_after,
                target_alt,
            ),
            velocity: Vec3::new(vel.x, vel.y, 0.0),
        };
    }

    let rate = params.vertical_rate * remaining.signum();
    let accel = params.vertical_accel.max(f64::EPSILON);
    let ramp_time = (rate.abs() / accel).max(0.0);
    let ramp_distance = 0.5 * rate.abs() * ramp_time; // symmetric accel+decel capture
    let cruise_distance = (remaining.abs() - 2.0 * ramp_distance).max(0.0);
    let cruise_time = cruise_distance / rate.abs().max(f64::EPSILON);
    let total_time = 2.0 * ramp_time + cruise_time;

    let (z, vz) = if t_after >= total_time {
        (target_alt, 0.0)
    } else if t_after < ramp_time {
        let v = accel * t_after * remaining.signum();
        let d = 0.5 * accel * t_after * t_after * remaining.signum();
        (pos_at_delay.z + d, v)
    } else if t_after < ramp_time + cruise_time {
        let d_ramp = 0.5 * rate.abs() * ramp_time * remaining.signum();
        let d_cruise = rate * (t_after - ramp_time);
        (pos_at_delay.z + d_ramp + d_cruise, rate)
    } else {
        let t_decel = t_after - ramp_time - cruise_time;
        let d_ramp = 0.5 * rate.abs() * ramp_time * remaining.signum();
        let d_cruise = rate * cruise_time;
        let v = rate - accel * t_decel * remaining.signum();
        let d_decel = rate * t_decel - 0.5 * accel * t_decel * t_decel * remaining.signum();
        (pos_at_delay.z + d_ramp + d_cruise + d_decel, v)
    };

    State {
        position: Vec3::new(pos_at_delay.x + vel.x * t_after, pos_at_delay.y + vel.y * t_after, z),
        velocity: Vec3::new(vel.x, vel.y, vz),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn params() -> KinematicParams {
        KinematicParams {
            horizontal_accel: 2.0,
            vertical_accel: 1.0,
            turn_rate: 0.05,
            bank_angle: 0.0,
            vertical_rate: 5.0,
            time_to_maneuver: 0.0,
        }
    }

    #[test]
    fn direction_instantaneous_changes_track_immediately() {
        let pos = Vec3::new(0.0, 0.0, 0.0);
        let vel = Vec3::new(0.0, 100.0, 0.0); // heading north
        let s = direction_state(pos, vel, PI / 2.0, &params(), Mode::Instantaneous, 1.0);
        assert!((s.velocity.x - 100.0).abs() < 1e-6);
    }

    #[test]
    fn direction_kinematic_preserves_speed() {
        let pos = Vec3::new(0.0, 0.0, 0.0);
        let vel = Vec3::new(0.0, 100.0, 0.0);
        let s = direction_state(pos, vel, PI / 2.0, &params(), Mode::Kinematic, 10.0);
        let speed = (s.velocity.x.powi(2) + s.velocity.y.powi(2)).sqrt();
        assert!((speed - 100.0).abs() < 1e-6);
    }

    #[test]
    fn altitude_capture_reaches_target_without_overshoot() {
        let pos = Vec3::new(0.0, 0.0, 1000.0);
        let vel = Vec3::new(50.0, 0.0, 0.0);
        let s = altitude_state(pos, vel, 1300.0, &params(), Mode::Kinematic, 500.0);
        assert!((s.position.z - 1300.0).abs() < 1e-6);
        assert!((s.velocity.z).abs() < 1e-6);
    }

    #[test]
    fn speed_ramp_reaches_target() {
        let pos = Vec3::new(0.0, 0.0, 0.0);
        let vel = Vec3::new(0.0, 100.0, 0.0);
        let s = speed_state(pos, vel, 120.0, &params(), Mode::Kinematic, 60.0);
        let speed = (s.velocity.x.powi(2) + s.velocity.y.powi(2)).sqrt();
        assert!((speed - 120.0).abs() < 1e-6);
    }
}
