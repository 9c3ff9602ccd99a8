//! Exact rational arithmetic for the formula language.
//!
//! This crate provides:
//! - `Rational`: an immutable sign/magnitude fraction over arbitrary-precision integers
//! - `CompareOp`: the six comparison operators understood by [`Rational::compare`]
//! - `RationalError`: domain errors (division by zero, negative exponent, inexact roots, ...)
//! - `float_to_rational` / `root_nth`: the numeric helpers behind float parsing and fractional powers
//!
//! Every operation returns a fresh value; nothing is mutated in place.

mod float;
mod root;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub use float::{float_to_rational, DEFAULT_MAX_DENOMINATOR};
pub use root::root_nth;

/// Rational arithmetic failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RationalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("exponent must be a non-negative integer")]
    NegativeExponent,
    #[error("cannot root a negative base")]
    NegativeRoot,
    #[error("{value} has no exact root of degree {degree}")]
    NonIntegerRoot { value: String, degree: u32 },
    #[error("exponent {0} is too large")]
    ExponentTooLarge(String),
    #[error("invalid operator `{0}`: use one of < > <= >= == !=")]
    InvalidOperator(String),
    #[error("invalid rational `{0}`")]
    Parse(String),
}

/// Comparison operators accepted by [`Rational::compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    /// Apply the operator to an ordering result.
    pub fn holds(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Ne => ord != Ordering::Equal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
        }
    }
}

impl FromStr for CompareOp {
    type Err = RationalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "<" => CompareOp::Lt,
            "<=" => CompareOp::Le,
            ">" => CompareOp::Gt,
            ">=" => CompareOp::Ge,
            "==" => CompareOp::Eq,
            "!=" => CompareOp::Ne,
            other => return Err(RationalError::InvalidOperator(other.to_string())),
        })
    }
}

/// Arbitrary-precision rational number stored as `(numerator, denominator, negative)`.
///
/// Values are not necessarily reduced (`2/4` is representable), but equality and
/// ordering always compare cross-multiplied magnitudes, so `2/4 == 1/2`.
/// The denominator is never zero and zero is never negative.
#[derive(Debug, Clone)]
pub struct Rational {
    num: BigUint,
    den: BigUint,
    negative: bool,
}

impl Rational {
    /// Build from raw parts without reducing. Fails on a zero denominator.
    pub fn from_parts(num: BigUint, den: BigUint, negative: bool) -> Result<Self, RationalError> {
        if den.is_zero() {
            return Err(RationalError::DivisionByZero);
        }
        Ok(Self::raw(num, den, negative))
    }

    /// Caller guarantees `den != 0`.
    fn raw(num: BigUint, den: BigUint, negative: bool) -> Self {
        let negative = negative && !num.is_zero();
        Self { num, den, negative }
    }

    /// Reduce `num/den` by their gcd. Caller guarantees `den != 0`.
    fn reduced(num: BigUint, den: BigUint, negative: bool) -> Self {
        let g = num.gcd(&den);
        if g.is_one() || g.is_zero() {
            return Self::raw(num, den, negative);
        }
        Self::raw(num / &g, den / &g, negative)
    }

    /// Reduce a signed numerator over a positive denominator.
    fn from_signed(n: BigInt, den: BigUint) -> Self {
        let negative = n.sign() == Sign::Minus;
        Self::reduced(n.magnitude().clone(), den, negative)
    }

    pub fn zero() -> Self {
        Self::raw(BigUint::zero(), BigUint::one(), false)
    }

    pub fn one() -> Self {
        Self::raw(BigUint::one(), BigUint::one(), false)
    }

    /// Continued-fraction approximation bounded by [`DEFAULT_MAX_DENOMINATOR`].
    pub fn from_float(f: f64) -> Result<Self, RationalError> {
        Self::from_float_bounded(f, DEFAULT_MAX_DENOMINATOR)
    }

    pub fn from_float_bounded(f: f64, max_denominator: u64) -> Result<Self, RationalError> {
        if !f.is_finite() {
            return Err(RationalError::Parse(f.to_string()));
        }
        Ok(float_to_rational(f, max_denominator))
    }

    pub fn numerator(&self) -> &BigUint {
        &self.num
    }

    pub fn denominator(&self) -> &BigUint {
        &self.den
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    pub fn is_integer(&self) -> bool {
        (&self.num % &self.den).is_zero()
    }

    fn signed_numerator(&self) -> BigInt {
        let sign = if self.negative { Sign::Minus } else { Sign::Plus };
        BigInt::from_biguint(sign, self.num.clone())
    }

    /// Reduced copy of this value.
    pub fn simplify(&self) -> Self {
        Self::reduced(self.num.clone(), self.den.clone(), self.negative)
    }

    pub fn negate(&self) -> Self {
        Self::raw(self.num.clone(), self.den.clone(), !self.negative)
    }

    pub fn add(&self, other: &Rational) -> Rational {
        let n = self.signed_numerator() * BigInt::from(other.den.clone())
            + other.signed_numerator() * BigInt::from(self.den.clone());
        Self::from_signed(n, &self.den * &other.den)
    }

    pub fn subtract(&self, other: &Rational) -> Rational {
        self.add(&other.negate())
    }

    pub fn multiply(&self, other: &Rational) -> Rational {
        Self::reduced(
            &self.num * &other.num,
            &self.den * &other.den,
            self.negative != other.negative,
        )
    }

    pub fn divide(&self, other: &Rational) -> Result<Rational, RationalError> {
        if other.num.is_zero() {
            return Err(RationalError::DivisionByZero);
        }
        Ok(Self::reduced(
            &self.num * &other.den,
            &self.den * &other.num,
            self.negative != other.negative,
        ))
    }

    /// Raise to a non-negative rational exponent.
    ///
    /// A fractional exponent `p/q` takes the exact `q`-th root of numerator and
    /// denominator and then raises the result to `p`.
    pub fn power(&self, exponent: &Rational) -> Result<Rational, RationalError> {
        if exponent.negative {
            return Err(RationalError::NegativeExponent);
        }
        if exponent.num.is_zero() {
            return Ok(Rational::one());
        }
        let exponent = exponent.simplify();
        let base = if exponent.den.is_one() {
            self.clone()
        } else {
            if self.negative {
                return Err(RationalError::NegativeRoot);
            }
            let degree = small_exponent(&exponent.den)?;
            if u64::from(degree) > MAX_POWER_BITS {
                return Err(RationalError::ExponentTooLarge(exponent.den.to_string()));
            }
            let (num_root, num_rem) = root_nth(&self.num, degree);
            let (den_root, den_rem) = root_nth(&self.den, degree);
            if !num_rem.is_zero() || !den_rem.is_zero() {
                return Err(RationalError::NonIntegerRoot { value: self.to_string(), degree });
            }
            Self::raw(num_root, den_root, false)
        };
        let p = small_exponent(&exponent.num)?;
        // 0 and 1 stay put under any power; everything else grows by `bits` per step
        let bits = base.num.bits().max(base.den.bits());
        if bits > 1 && u64::from(p).saturating_mul(bits) > MAX_POWER_BITS {
            return Err(RationalError::ExponentTooLarge(exponent.num.to_string()));
        }
        Ok(Self::reduced(base.num.pow(p), base.den.pow(p), base.negative && p % 2 == 1))
    }

    /// Smallest of `self` and `others`; ties keep the earliest value.
    pub fn min(&self, others: &[Rational]) -> Rational {
        others
            .iter()
            .fold(self, |acc, r| if r < acc { r } else { acc })
            .clone()
    }

    /// Largest of `self` and `others`; ties keep the earliest value.
    pub fn max(&self, others: &[Rational]) -> Rational {
        others
            .iter()
            .fold(self, |acc, r| if r > acc { r } else { acc })
            .clone()
    }

    pub fn compare(&self, op: CompareOp, other: &Rational) -> bool {
        op.holds(self.cmp(other))
    }

    /// Integer division toward negative infinity.
    pub fn floor(&self) -> Rational {
        let (q, r) = self.num.div_rem(&self.den);
        let q = if self.negative && !r.is_zero() { q + 1u32 } else { q };
        Self::raw(q, BigUint::one(), self.negative)
    }

    /// Truncating conversion to an integer.
    pub fn to_bigint(&self) -> BigInt {
        let q = &self.num / &self.den;
        let sign = if self.negative { Sign::Minus } else { Sign::Plus };
        BigInt::from_biguint(sign, q)
    }

    pub fn to_f64(&self) -> f64 {
        let n = self.num.to_f64().unwrap_or(f64::INFINITY);
        let d = self.den.to_f64().unwrap_or(f64::INFINITY);
        if self.negative {
            -n / d
        } else {
            n / d
        }
    }

    /// Non-negative integer value usable as a list index.
    pub fn to_index(&self) -> Option<usize> {
        if self.negative || !self.is_integer() {
            return None;
        }
        (&self.num / &self.den).to_usize()
    }

    /// Always `n/d`, reduced; the form accepted back by [`FromStr`].
    pub fn to_fraction_string(&self) -> String {
        let r = self.simplify();
        format!("{}{}/{}", if r.negative { "-" } else { "" }, r.num, r.den)
    }
}

/// Largest result, in bits, that [`Rational::power`] will build.
const MAX_POWER_BITS: u64 = 1 << 24;

fn small_exponent(n: &BigUint) -> Result<u32, RationalError> {
    n.to_u32().ok_or_else(|| RationalError::ExponentTooLarge(n.to_string()))
}

/// `^-?\d+/\d+$`
pub fn is_rational_string(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    match body.split_once('/') {
        Some((n, d)) => {
            let digits = |x: &str| !x.is_empty() && x.bytes().all(|b| b.is_ascii_digit());
            digits(n) && digits(d)
        }
        None => false,
    }
}

fn parse_integer(s: &str) -> Result<BigInt, RationalError> {
    let err = || RationalError::Parse(s.to_string());
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let magnitude = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => BigUint::parse_bytes(hex.as_bytes(), 16).ok_or_else(err)?,
        None => {
            if body.is_empty() || !body.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            BigUint::parse_bytes(body.as_bytes(), 10).ok_or_else(err)?
        }
    };
    let sign = if negative { Sign::Minus } else { Sign::Plus };
    Ok(BigInt::from_biguint(sign, magnitude))
}

impl FromStr for Rational {
    type Err = RationalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('.') {
            let f: f64 = s.parse().map_err(|_| RationalError::Parse(s.to_string()))?;
            return Rational::from_float(f);
        }
        if let Some((n, d)) = s.split_once('/') {
            let n = parse_integer(n.trim())?;
            let d = parse_integer(d.trim())?;
            if d.sign() == Sign::Minus {
                return Err(RationalError::Parse(s.to_string()));
            }
            return Rational::from_parts(
                n.magnitude().clone(),
                d.magnitude().clone(),
                n.sign() == Sign::Minus,
            );
        }
        Ok(Rational::from(parse_integer(s)?))
    }
}

impl From<BigInt> for Rational {
    fn from(n: BigInt) -> Self {
        let negative = n.sign() == Sign::Minus;
        Self::raw(n.magnitude().clone(), BigUint::one(), negative)
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Rational::from(BigInt::from(n))
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Rational::from(BigInt::from(n))
    }
}

impl From<u64> for Rational {
    fn from(n: u64) -> Self {
        Rational::from(BigInt::from(n))
    }
}

impl From<usize> for Rational {
    fn from(n: usize) -> Self {
        Rational::from(BigInt::from(n))
    }
}

impl TryFrom<f64> for Rational {
    type Error = RationalError;

    fn try_from(f: f64) -> Result<Self, Self::Error> {
        Rational::from_float(f)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.simplify();
        if r.negative {
            f.write_str("-")?;
        }
        write!(f, "{}", r.num)?;
        if r.den > BigUint::one() {
            write!(f, "/{}", r.den)?;
        }
        Ok(())
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Rational {}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.signed_numerator() * BigInt::from(other.den.clone());
        let rhs = other.signed_numerator() * BigInt::from(self.den.clone());
        lhs.cmp(&rhs)
    }
}

impl std::ops::Add for &Rational {
    type Output = Rational;
    fn add(self, rhs: &Rational) -> Rational {
        Rational::add(self, rhs)
    }
}

impl std::ops::Sub for &Rational {
    type Output = Rational;
    fn sub(self, rhs: &Rational) -> Rational {
        self.subtract(rhs)
    }
}

impl std::ops::Mul for &Rational {
    type Output = Rational;
    fn mul(self, rhs: &Rational) -> Rational {
        self.multiply(rhs)
    }
}

impl std::ops::Neg for &Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        self.negate()
    }
}

impl Serialize for Rational {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_fraction_string())
    }
}

struct RationalVisitor;

impl de::Visitor<'_> for RationalVisitor {
    type Value = Rational;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number or a \"num/den\" string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Rational, E> {
        Ok(Rational::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Rational, E> {
        Ok(Rational::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Rational, E> {
        Rational::from_float(v).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Rational, E> {
        if !is_rational_string(v) {
            return Err(E::invalid_value(de::Unexpected::Str(v), &self));
        }
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Rational {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RationalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn r(s: &str) -> Rational {
        s.parse().unwrap()
    }

    #[test]
    fn unreduced_values_compare_equal() {
        let half = Rational::from_parts(1u32.into(), 2u32.into(), false).unwrap();
        let two_quarters = Rational::from_parts(2u32.into(), 4u32.into(), false).unwrap();
        assert_eq!(half, two_quarters);
        assert_eq!(two_quarters.numerator(), &BigUint::from(2u32));
        assert_eq!(two_quarters.simplify().numerator(), &BigUint::from(1u32));
    }

    #[test]
    fn zero_denominator_is_rejected() {
        let err = Rational::from_parts(1u32.into(), BigUint::zero(), false).unwrap_err();
        assert_eq!(err, RationalError::DivisionByZero);
        assert_eq!("3/0".parse::<Rational>().unwrap_err(), RationalError::DivisionByZero);
    }

    #[test]
    fn negative_zero_is_normalized() {
        let z = Rational::from_parts(BigUint::zero(), 5u32.into(), true).unwrap();
        assert!(!z.is_negative());
        assert_eq!(z.to_string(), "0");
        assert_eq!(r("-3").add(&r("3")), Rational::zero());
        assert!(!r("-3").add(&r("3")).is_negative());
    }

    #[test]
    fn display_reduces() {
        assert_eq!(r("6/4").to_string(), "3/2");
        assert_eq!(r("-10/2").to_string(), "-5");
        assert_eq!(r("-6/4").to_fraction_string(), "-3/2");
        assert_eq!(r("7").to_fraction_string(), "7/1");
    }

    #[test]
    fn floor_rounds_toward_negative_infinity() {
        assert_eq!(r("7/2").floor(), r("3"));
        assert_eq!(r("-7/2").floor(), r("-4"));
        assert_eq!(r("-4").floor(), r("-4"));
    }

    #[test]
    fn rational_string_pattern() {
        assert!(is_rational_string("1/2"));
        assert!(is_rational_string("-10/3"));
        assert!(!is_rational_string("1/-2"));
        assert!(!is_rational_string("12"));
        assert!(!is_rational_string("a/b"));
        assert!(!is_rational_string("/2"));
    }
}
