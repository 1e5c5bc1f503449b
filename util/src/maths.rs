//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

/// Return the euclidian norm (distance between) of two points.
///
/// If the points do not have the same number of dimentions then `None` is
/// returned.
pub fn norm<T>(point_0: &[T], point_1: &[T]) -> Option<T>
where
    T: Float + std::ops::AddAssign
{
    // Check that the dimentions match
    if point_0.len() != point_1.len() {
        return None;
    }

    // Sum all elements of the points
    let mut sum = T::from(0).unwrap();

    for i in 0..point_0.len() {
        sum += (point_0[i] - point_1[i]).powi(2);
    }

    // Return the squareroot of the sum
    Some(sum.sqrt())
}

pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::AddAssign
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Apply a deadband to a normalised input value.
///
/// Values with a magnitude below the threshold map to zero, values above it
/// are rescaled so the output is still continuous over the full [-1, +1]
/// range.
pub fn apply_deadband<T>(value: T, threshold: T) -> T
where
    T: Float
{
    if value.abs() < threshold {
        return T::from(0).unwrap();
    }

    let one = T::from(1).unwrap();
    value.signum() * (value.abs() - threshold) / (one - threshold)
}

/// Wrap an angle into the range [-pi, pi).
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float + std::ops::Rem
{
    let pi_t: T = T::from(std::f64::consts::PI).unwrap();
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    rem_euclid(angle + pi_t, tau_t) - pi_t
}

/// Get the signed shortest angular distance from `from` to `to`.
///
/// The result is in the range [-pi, pi), accounting for wrapping, such that
/// `wrap_pi(from + ang_dist_pi(from, to)) == wrap_pi(to)`.
pub fn ang_dist_pi<T>(from: T, to: T) -> T
where
    T: Float + std::ops::Rem
{
    wrap_pi(to - from)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::Sub + std::ops::Rem
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_wrap_pi() {
        assert_eq!(wrap_pi(0f64), 0f64);
        assert_eq!(wrap_pi(PI), -PI);
        assert_eq!(wrap_pi(-PI), -PI);
        assert!((wrap_pi(3.0 * PI / 2.0) - (-PI / 2.0)).abs() < 1e-12);
        assert!((wrap_pi(-3.0 * PI / 2.0) - (PI / 2.0)).abs() < 1e-12);
        assert!((wrap_pi(5.0 * PI) - (-PI)).abs() < 1e-12);
    }

    #[test]
    fn test_ang_dist_pi() {
        assert_eq!(ang_dist_pi(1f64, 2f64), 1f64);
        assert_eq!(ang_dist_pi(2f64, 1f64), -1f64);
        assert!((ang_dist_pi(-3.0, 3.0) - (6.0 - std::f64::consts::TAU)).abs() < 1e-12);
        // Distance is shortest-path, never more than half a turn
        assert!(ang_dist_pi(0.0, 5.0).abs() <= PI);
    }

    #[test]
    fn test_apply_deadband() {
        assert_eq!(apply_deadband(0.05, 0.1), 0.0);
        assert_eq!(apply_deadband(-0.05, 0.1), 0.0);
        assert_eq!(apply_deadband(1.0, 0.1), 1.0);
        assert_eq!(apply_deadband(-1.0, 0.1), -1.0);
        // Continuous at the threshold
        assert!(apply_deadband(0.1f64, 0.1).abs() < 1e-12);
    }
}
