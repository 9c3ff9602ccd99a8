//! Float to rational conversion by continued-fraction expansion.

use num_bigint::BigUint;
use num_traits::{FromPrimitive, One, ToPrimitive, Zero};

use crate::Rational;

pub const DEFAULT_MAX_DENOMINATOR: u64 = 1_000_000;

fn as_f64(n: &BigUint) -> f64 {
    n.to_f64().unwrap_or(f64::INFINITY)
}

/// Best rational approximation of `f` whose convergents stop once the error drops
/// below `1 / max_denominator²` or the denominator reaches `max_denominator`.
///
/// The last convergent may overshoot the bound; exact binary fractions are
/// reproduced exactly. Caller guarantees `f` is finite.
pub fn float_to_rational(f: f64, max_denominator: u64) -> Rational {
    let bound = max_denominator as f64;
    let epsilon = 1.0 / (bound * bound);
    let target = f.abs();
    let (mut n, mut d) = (BigUint::one(), BigUint::zero());
    let (mut a, mut b) = (BigUint::zero(), BigUint::one());
    let mut c = target;
    loop {
        let whole = c.floor();
        let l = BigUint::from_f64(whole).unwrap_or_default();
        let next = c - whole;
        let n_next = &l * &n + &a;
        a = std::mem::replace(&mut n, n_next);
        let d_next = &l * &d + &b;
        b = std::mem::replace(&mut d, d_next);
        if (as_f64(&n) / as_f64(&d) - target).abs() < epsilon || next == 0.0 {
            break;
        }
        c = 1.0 / next;
        if as_f64(&d) >= bound {
            break;
        }
    }
    if d.is_zero() {
        return Rational::zero();
    }
    Rational::raw(n, d, f < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn integers_and_halves_are_exact() {
        assert_eq!(float_to_rational(3.0, DEFAULT_MAX_DENOMINATOR).to_string(), "3");
        assert_eq!(float_to_rational(0.5, DEFAULT_MAX_DENOMINATOR).to_string(), "1/2");
        assert_eq!(float_to_rational(-0.25, DEFAULT_MAX_DENOMINATOR).to_string(), "-1/4");
        assert_eq!(float_to_rational(0.0, DEFAULT_MAX_DENOMINATOR).to_string(), "0");
    }
}
