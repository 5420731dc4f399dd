//! Vector and kinematics primitives shared by every detector and by the
//! kinematic trajectory generator.
//!
//! All quantities here are plain `f64` in internal SI units (metres,
//! seconds, radians); unit-carrying types only appear at the API boundary
//! (see [`crate::units`]).

use nalgebra::{Vector2, Vector3};

/// A horizontal (east, north) displacement or velocity, metres or m/s.
pub type Vec2 = Vector2<f64>;
/// A full 3-D (east, north, up) displacement or velocity.
pub type Vec3 = Vector3<f64>;

/// Horizontal (2-D) component of a 3-D vector.
pub fn horizontal(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// Vertical (z) component of a 3-D vector.
pub fn vertical(v: Vec3) -> f64 {
    v.z
}

/// Builds a 3-D vector from a horizontal component and a vertical scalar.
pub fn combine(h: Vec2, v: f64) -> Vec3 {
    Vec3::new(h.x, h.y, v)
}

/// Closest point of approach in time for the relative state `(s, v)`:
/// `s` is the relative position (intruder minus ownship, or vice versa as
/// long as both detector and caller agree), `v` is the relative velocity.
///
/// Returns the unconstrained time at which `|s + t*v|` is minimized. The
/// caller is responsible for clamping to whatever horizon applies.
pub fn time_of_closest_approach(s: Vec2, v: Vec2) -> f64 {
    let vv = v.dot(&v);
    if vv < f64::EPSILON {
        // no relative motion: every time is equally "closest"
        return 0.0;
    }
    -(s.dot(&v)) / vv
}

/// Horizontal range (and derivative) at time `t` given initial relative
/// position/velocity.
pub fn range_at(s: Vec2, v: Vec2, t: f64) -> f64 {
    (s + v * t).norm()
}

/// Real roots of `a*t^2 + b*t + c = 0`, ascending order. Empty if no real
/// roots exist. Handles the degenerate linear/constant cases.
pub fn quadratic_roots(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < f64::EPSILON {
        if b.abs() < f64::EPSILON {
            return Vec::new();
        }
        return vec![-c / b];
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }
    let sq = disc.sqrt();
    let r1 = (-b - sq) / (2.0 * a);
    let r2 = (-b + sq) / (2.0 * a);
    if r1 <= r2 {
        vec![r1, r2]
    } else {
        vec![r2, r1]
    }
}

/// Earliest and latest root of `|s + t v|_h = d` (a horizontal-range
/// crossing), if any exist. Used by the cylinder detector and by the
/// recovery search's "time spent inside a disc of radius d" computation.
pub fn horizontal_range_crossings(s: Vec2, v: Vec2, d: f64) -> Vec<f64> {
    // |s + t v|^2 = d^2  =>  (v.v) t^2 + 2 (s.v) t + (s.s - d^2) = 0
    let a = v.dot(&v);
    let b = 2.0 * s.dot(&v);
    let c = s.dot(&s) - d * d;
    quadratic_roots(a, b, c)
}

/// Earliest and latest root of `|s_z + t v_z| = h` (a vertical-separation
/// crossing).
pub fn vertical_range_crossings(sz: f64, vz: f64, h: f64) -> Vec<f64> {
    // two linear crossings: sz + t vz = h  and  sz + t vz = -h
    let mut out = Vec::new();
    if vz.abs() > f64::EPSILON {
        out.push((h - sz) / vz);
        out.push((-h - sz) / vz);
    }
    out.sort_by(|a, b| a.partial_cmp(b).unwrap());
    out
}

/// Turn radius for a given ground speed and bank angle (standard
/// coordinated-turn relation, `r = v^2 / (g tan(phi))`).
pub fn turn_radius(ground_speed: f64, bank_angle: f64) -> f64 {
    const G: f64 = 9.80665;
    ground_speed * ground_speed / (G * bank_angle.tan())
}

/// Turn rate (rad/s) for a given ground speed and bank angle.
pub fn turn_rate_from_bank(ground_speed: f64, bank_angle: f64) -> f64 {
    const G: f64 = 9.80665;
    if ground_speed.abs() < f64::EPSILON {
        return 0.0;
    }
    G * bank_angle.tan() / ground_speed
}

/// Wraps an angle (radians) into `(-pi, pi]`.
pub fn wrap_pi(a: f64) -> f64 {
    use std::f64::consts::PI;
    let mut a = (a + PI) % (2.0 * PI);
    if a < 0.0 {
        a += 2.0 * PI;
    }
    a - PI
}

/// Wraps an angle (radians) into `[0, 2*pi)`.
pub fn wrap_2pi(a: f64) -> f64 {
    use std::f64::consts::PI;
    let two_pi = 2.0 * PI;
    let mut a = a % two_pi;
    if a < 0.0 {
        a += two_pi;
    }
    a
}

/// Signed angular difference `to - from`, wrapped into `(-pi, pi]`.
pub fn angle_diff(from: f64, to: f64) -> f64 {
    wrap_pi(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadratic_roots_basic() {
        let r = quadratic_roots(1.0, 0.0, -4.0);
        assert_eq!(r.len(), 2);
        assert!((r[0] - -2.0).abs() < 1e-9);
        assert!((r[1] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn quadratic_roots_no_solution() {
        let r = quadratic_roots(1.0, 0.0, 4.0);
        assert!(r.is_empty());
    }

    #[test]
    fn horizontal_range_crossings_head_on() {
        // ownship at origin, intruder 10nm east closing at 10 m/s westward
        let s = Vec2::new(10_000.0, 0.0);
        let v = Vec2::new(-10.0, 0.0);
        let crossings = horizontal_range_crossings(s, v, 500.0);
        assert_eq!(crossings.len(), 2);
        assert!(crossings[0] < crossings[1]);
    }

    #[test]
    fn wrap_pi_roundtrip() {
        use std::f64::consts::PI;
        assert!((wrap_pi(3.0 * PI) - PI).abs() < 1e-9 || (wrap_pi(3.0 * PI) + PI).abs() < 1e-9);
        assert!(wrap_pi(0.1) > 0.0);
    }

    #[test]
    fn time_of_closest_approach_zero_velocity() {
        let s = Vec2::new(1.0, 1.0);
        let v = Vec2::new(0.0, 0.0);
        assert_eq!(time_of_closest_approach(s, v), 0.0);
    }
}
