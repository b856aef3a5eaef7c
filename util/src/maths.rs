//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, FloatConst};

/// Clamp a value into the range `[min, max]`, returning the clamped value and
/// whether or not the limit was applied.
pub fn clamp<T>(value: T, min: T, max: T) -> (T, bool)
where
    T: Float
{
    if value > max {
        (max, true)
    }
    else if value < min {
        (min, true)
    }
    else {
        (value, false)
    }
}

/// Clamp a value into the symmetric range `[-limit, limit]`.
pub fn clamp_sym<T>(value: T, limit: T) -> (T, bool)
where
    T: Float
{
    clamp(value, -limit, limit)
}

/// Return the sign of the value, or zero if the value is zero.
///
/// Unlike `Float::signum` this does not return `1` for `+0.0`.
pub fn sign<T>(value: T) -> T
where
    T: Float
{
    if value > T::zero() {
        T::one()
    }
    else if value < T::zero() {
        -T::one()
    }
    else {
        T::zero()
    }
}

/// Wrap an angle into the range (-pi, pi].
pub fn wrap_to_pi<T>(angle: T) -> T
where
    T: Float + FloatConst
{
    let pi_t = T::PI();
    let tau_t = pi_t + pi_t;

    let wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    if wrapped <= -pi_t {
        pi_t
    }
    else {
        wrapped
    }
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
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}

#[cfg(test)]
mod test {
    use super::*;

    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_wrap_to_pi() {
        assert!((wrap_to_pi(0.5f64) - 0.5).abs() < 1e-12);
        assert!((wrap_to_pi(2.0 * PI + 0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_to_pi(-2.0 * PI - 0.5) + 0.5).abs() < 1e-12);
        assert!((wrap_to_pi(1.5 * PI) + 0.5 * PI).abs() < 1e-12);
        assert_eq!(wrap_to_pi(PI), PI);
        assert_eq!(wrap_to_pi(-PI), PI);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(0.5f64, 0.0, 0.8), (0.5, false));
        assert_eq!(clamp(1.5f64, 0.0, 0.8), (0.8, true));
        assert_eq!(clamp_sym(-12.0f64, 10.0), (-10.0, true));
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(3.0f64), 1.0);
        assert_eq!(sign(-0.1f64), -1.0);
        assert_eq!(sign(0.0f64), 0.0);
    }
}
