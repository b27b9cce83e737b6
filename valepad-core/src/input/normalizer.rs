// src/input/normalizer.rs

use valepad_common::models::motion::{MotionVector, StickSample};

/// Off-axis tolerance for straight translation and in-place rotation, as a
/// multiple of the deadzone.
const AXIS_LOCK_FACTOR: f64 = 1.5;

/// Maps a stick position to a motion vector.
///
/// Cases are tried in order and the first match wins:
///
/// 1. both axes inside the deadzone: stop;
/// 2. `y` outside the deadzone with `x` near center: drive straight, angle 0;
/// 3. `x` outside the deadzone with `y` near center: spin in place, +/-90;
/// 4. anything else: an arc whose angle follows the stick direction.
///
/// In reverse the turn direction is mirrored so that pushing the stick to the
/// right always swings the robot's nose to the right. Velocity is scaled by
/// `max_speed` and always lands in `[-1, 1]`.
pub fn normalize(sample: StickSample, deadzone: f64, max_speed: f64) -> MotionVector {
    let x = clamp_axis(sample.x);
    let y = clamp_axis(sample.y);
    let (abs_x, abs_y) = (x.abs(), y.abs());
    let lock = deadzone * AXIS_LOCK_FACTOR;

    if abs_x < deadzone && abs_y < deadzone {
        return MotionVector::STOP;
    }

    if abs_y >= deadzone && abs_x < lock {
        let velocity = rescale(abs_y, deadzone) * max_speed;
        return MotionVector::new(clamp_velocity(signed_like(velocity, y)), 0.0);
    }

    if abs_x >= deadzone && abs_y < lock {
        let angle = if x > 0.0 { 90.0 } else { -90.0 };
        return MotionVector::new(0.0, angle);
    }

    let corrected_x = if y < 0.0 { -x } else { x };
    let angle = corrected_x.atan2(y).to_degrees();
    let magnitude = x.hypot(y);
    let velocity = rescale(magnitude, deadzone) * max_speed;
    MotionVector::new(clamp_velocity(signed_like(velocity, y)), angle)
}

/// Maps `[deadzone, 1]` onto `[0, 1]`; anything below the deadzone is 0.
fn rescale(value: f64, deadzone: f64) -> f64 {
    (value - deadzone).max(0.0) / (1.0 - deadzone)
}

fn signed_like(magnitude: f64, y: f64) -> f64 {
    if y > 0.0 { magnitude } else { -magnitude }
}

fn clamp_axis(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) }
}

fn clamp_velocity(value: f64) -> f64 {
    value.clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DZ: f64 = 0.15;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn centered_stick_is_stop() {
        for &(x, y) in &[(0.0, 0.0), (0.14, -0.14), (-0.1, 0.05), (0.149, 0.149)] {
            assert_eq!(normalize(StickSample::new(x, y), DZ, 1.0), MotionVector::STOP);
        }
    }

    #[test]
    fn slight_push_right_spins_in_place() {
        let v = normalize(StickSample::new(0.2, 0.0), DZ, 0.6);
        assert_eq!(v, MotionVector::new(0.0, 90.0));
        let v = normalize(StickSample::new(-0.9, 0.2), DZ, 0.6);
        assert_eq!(v, MotionVector::new(0.0, -90.0));
    }

    #[test]
    fn straight_forward_rescales_past_deadzone() {
        let v = normalize(StickSample::new(0.0, 0.5), DZ, 0.6);
        assert_eq!(v.angle, 0.0);
        assert!(approx(v.velocity, (0.5 - 0.15) / 0.85 * 0.6), "{v:?}");
        assert!(approx(v.velocity, 0.247));
    }

    #[test]
    fn straight_reverse_is_negative() {
        let v = normalize(StickSample::new(0.1, -1.0), DZ, 1.0);
        assert_eq!(v.angle, 0.0);
        assert!(approx(v.velocity, -1.0));
    }

    #[test]
    fn diagonal_is_an_arc() {
        let v = normalize(StickSample::new(0.3, 0.3), DZ, 1.0);
        assert!(approx(v.angle, 45.0), "{v:?}");
        assert!(approx(v.velocity, (0.3f64.hypot(0.3) - 0.15) / 0.85), "{v:?}");
        assert!(approx(v.velocity, 0.322));
    }

    #[test]
    fn reverse_arc_keeps_turn_direction() {
        let forward = normalize(StickSample::new(0.5, 0.5), DZ, 1.0);
        let reverse = normalize(StickSample::new(0.5, -0.5), DZ, 1.0);
        assert!(forward.velocity > 0.0);
        assert!(reverse.velocity < 0.0);
        assert!(approx(forward.angle, 45.0));
        assert!(approx(reverse.angle, -135.0), "{reverse:?}");
    }

    #[test]
    fn translation_sign_follows_y_across_range() {
        let mut y = DZ;
        while y <= 1.0 {
            for x in [-0.2, -0.1, 0.0, 0.1, 0.2] {
                let fwd = normalize(StickSample::new(x, y), DZ, 1.0);
                let rev = normalize(StickSample::new(x, -y), DZ, 1.0);
                assert_eq!(fwd.angle, 0.0);
                assert_eq!(rev.angle, 0.0);
                assert!(fwd.velocity >= 0.0 && rev.velocity <= 0.0);
            }
            y += 0.05;
        }
    }

    #[test]
    fn velocity_is_clamped_for_out_of_range_input() {
        for &(x, y) in &[(5.0, 5.0), (-3.0, -7.0), (0.0, 40.0), (f64::NAN, 0.9)] {
            let v = normalize(StickSample::new(x, y), DZ, 1.0);
            assert!((-1.0..=1.0).contains(&v.velocity), "{v:?}");
        }
        let v = normalize(StickSample::new(0.0, 1.0), DZ, 3.0);
        assert_eq!(v.velocity, 1.0);
    }
}
