//! Kinematics collaborator: the kernel emits velocity intents and reads back
//! integrated positions. There is no force model; velocity is applied
//! directly, matching the prototype's straight-line drive toward a target.

use contracts::Vec2;

/// Velocity intent toward `to` at `speed`. Zero when already at the target.
pub fn steer(from: Vec2, to: Vec2, speed: f64) -> Vec2 {
    Vec2::new(to.x - from.x, to.y - from.y)
        .normalized()
        .scaled(speed)
}

pub fn integrate(position: Vec2, velocity: Vec2, dt: f64) -> Vec2 {
    position.offset(velocity.x * dt, velocity.y * dt)
}

/// Trigger-volume check: inside or on the boundary counts as arrival.
pub fn within(a: Vec2, b: Vec2, radius: f64) -> bool {
    a.distance_to(b) <= radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steer_is_speed_scaled_unit_direction() {
        let velocity = steer(Vec2::ZERO, Vec2::new(10.0, 0.0), 5.0);
        assert!((velocity.x - 5.0).abs() < 1e-9);
        assert!(velocity.y.abs() < 1e-9);
    }

    #[test]
    fn steer_at_target_is_zero() {
        let velocity = steer(Vec2::new(3.0, 4.0), Vec2::new(3.0, 4.0), 5.0);
        assert_eq!(velocity, Vec2::ZERO);
    }

    #[test]
    fn integrate_advances_by_velocity_dt() {
        let next = integrate(Vec2::ZERO, Vec2::new(5.0, 0.0), 0.02);
        assert!((next.x - 0.1).abs() < 1e-9);
    }

    #[test]
    fn within_includes_boundary() {
        assert!(within(Vec2::ZERO, Vec2::new(0.5, 0.0), 0.5));
        assert!(!within(Vec2::ZERO, Vec2::new(0.6, 0.0), 0.5));
    }
}
