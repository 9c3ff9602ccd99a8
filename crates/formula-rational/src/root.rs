//! Integer n-th roots.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};

/// Integer `degree`-th root of `val` by Newton's method.
///
/// Returns `(root, val - root^degree)`; the root is corrected by ±1 toward
/// whichever candidate leaves the smallest squared error, so a zero remainder
/// means the root is exact. `degree` must be at least 1.
pub fn root_nth(val: &BigUint, degree: u32) -> (BigUint, BigInt) {
    let v = BigInt::from(val.clone());
    let bits = val.bits();
    // val < 2^degree, so the root is 0 or 1
    if u64::from(degree) >= bits {
        let x = if val.is_zero() { BigUint::zero() } else { BigUint::one() };
        let remainder = &v - BigInt::from(x.clone());
        return (x, remainder);
    }
    let k = BigUint::from(degree);
    let one = BigInt::one();
    // 2^ceil(bits/degree) is above the root; Newton descends from there
    let mut x = BigUint::one() << (bits + u64::from(degree) - 1) / u64::from(degree);
    loop {
        let next = ((&k - 1u32) * &x + val / x.pow(degree - 1)) / &k;
        if next >= x {
            break;
        }
        x = next;
    }
    let mut x = BigInt::from(x);
    let error = |c: &BigInt| {
        let e = &v - c.pow(degree);
        &e * &e
    };
    if x > one && error(&(&x - &one)) < error(&x) {
        x -= &one;
    }
    if error(&(&x + &one)) < error(&x) {
        x += &one;
    }
    let remainder = &v - x.pow(degree);
    (x.to_biguint().unwrap_or_default(), remainder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root(v: u64, k: u32) -> (String, String) {
        let (x, rem) = root_nth(&BigUint::from(v), k);
        (x.to_string(), rem.to_string())
    }

    #[test]
    fn exact_roots_have_no_remainder() {
        assert_eq!(root(16, 2), ("4".into(), "0".into()));
        assert_eq!(root(27, 3), ("3".into(), "0".into()));
        assert_eq!(root(1, 5), ("1".into(), "0".into()));
        assert_eq!(root(0, 2), ("0".into(), "0".into()));
    }

    #[test]
    fn inexact_roots_report_remainder() {
        assert_eq!(root(17, 2), ("4".into(), "1".into()));
        assert_eq!(root(2, 2), ("1".into(), "1".into()));
    }

    #[test]
    fn descent_settles_on_small_roots() {
        assert_eq!(root(7, 3), ("2".into(), "-1".into()));
        assert_eq!(root(1 << 40, 8), ("32".into(), "0".into()));
        assert_eq!(root(u64::MAX, 63), ("2".into(), (u64::MAX - (1 << 63)).to_string()));
    }

    #[test]
    fn huge_degrees_are_immediate() {
        assert_eq!(root(4, u32::MAX), ("1".into(), "3".into()));
        assert_eq!(root(0, u32::MAX), ("0".into(), "0".into()));
    }
}
