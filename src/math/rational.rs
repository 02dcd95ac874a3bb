use num_traits::checked_pow;
use serde::{Deserialize, Serialize};

use super::RationalError;

// f64 round-trips at most 17 significant decimal digits, so scaling past
// that can never recover more of the input.
const MAX_AUTO_DIGITS: u32 = 17;

/// An exact decimal-rational value `significand / denominator * 10^base`.
///
/// Every live value is canonical: the fraction is fully reduced, trailing
/// powers of ten are folded out of both significand and denominator into
/// `base`, the sign lives in the significand and the denominator is
/// positive. Zero is always `(0, 0, 1)`.
///
/// Values are immutable; arithmetic returns fresh values and uses checked
/// 64-bit arithmetic throughout, so any intermediate outside `i64` reports
/// [`RationalError::Overflow`] instead of wrapping.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "(i64, i64, i64)", into = "(i64, i64, i64)")]
pub struct Rational {
    significand: i64,
    base: i64,
    denominator: i64,
}

impl Rational {
    /// Builds a value from a raw triple and normalizes it.
    pub fn new(significand: i64, base: i64, denominator: i64) -> Result<Self, RationalError> {
        if denominator == 0 {
            return Err(RationalError::DivisionByZero);
        }
        Self {
            significand,
            base,
            denominator,
        }
        .normalized()
    }

    pub const fn zero() -> Self {
        Self {
            significand: 0,
            base: 0,
            denominator: 1,
        }
    }

    pub const fn one() -> Self {
        Self {
            significand: 1,
            base: 0,
            denominator: 1,
        }
    }

    pub fn from_integer(n: i64) -> Self {
        if n == 0 {
            return Self::zero();
        }
        let mut significand = n;
        let mut base = 0;
        while significand % 10 == 0 {
            significand /= 10;
            base += 1;
        }
        Self {
            significand,
            base,
            denominator: 1,
        }
    }

    /// Converts an `f64` to an exact decimal.
    ///
    /// With `digits` given, the value is rounded to that many decimal
    /// places first. Without it, the value is scaled by ten until no
    /// fractional part remains, capped at 17 steps (the decimal precision
    /// an `f64` can round-trip); anything finer is rounded away.
    pub fn from_float(value: f64, digits: Option<u32>) -> Result<Self, RationalError> {
        if value == 0.0 {
            return Ok(Self::zero());
        }
        match digits {
            Some(digits) => {
                // digit counts past i32 saturate; powi then overflows to
                // infinity and the i64 guard below rejects the result
                let exp = i32::try_from(digits).unwrap_or(i32::MAX);
                let scale = 10f64.powi(exp);
                let significand = f64_to_i64((value * scale).round())?;
                Self::new(significand, -i64::from(digits), 1)
            }
            None => {
                let mut scaled = value;
                let mut base = 0i64;
                let mut steps = 0;
                while scaled.fract() != 0.0 && steps < MAX_AUTO_DIGITS {
                    scaled *= 10.0;
                    base -= 1;
                    steps += 1;
                }
                let significand = f64_to_i64(scaled.round())?;
                Self::new(significand, base, 1)
            }
        }
    }

    pub fn mul(&self, other: &Self) -> Result<Self, RationalError> {
        let significand = self
            .significand
            .checked_mul(other.significand)
            .ok_or(RationalError::Overflow)?;
        let base = self
            .base
            .checked_add(other.base)
            .ok_or(RationalError::Overflow)?;
        let denominator = self
            .denominator
            .checked_mul(other.denominator)
            .ok_or(RationalError::Overflow)?;
        Self::new(significand, base, denominator)
    }

    /// Division. A zero divisor surfaces as a zero raw denominator, so it
    /// fails with `DivisionByZero` like any other zero-denominator triple.
    pub fn div(&self, other: &Self) -> Result<Self, RationalError> {
        let significand = self
            .significand
            .checked_mul(other.denominator)
            .ok_or(RationalError::Overflow)?;
        let base = self
            .base
            .checked_sub(other.base)
            .ok_or(RationalError::Overflow)?;
        let denominator = self
            .denominator
            .checked_mul(other.significand)
            .ok_or(RationalError::Overflow)?;
        Self::new(significand, base, denominator)
    }

    /// Addition. The two operands may carry different bases, so the term
    /// with the smaller base is scaled by `10^diff` first; both terms then
    /// share the smaller exponent and combine over the common denominator.
    pub fn add(&self, other: &Self) -> Result<Self, RationalError> {
        let diff = other
            .base
            .checked_sub(self.base)
            .ok_or(RationalError::Overflow)?;
        let (self_scale, other_scale, base) = if diff >= 0 {
            (1, pow10(diff)?, self.base)
        } else {
            let diff = diff.checked_neg().ok_or(RationalError::Overflow)?;
            (pow10(diff)?, 1, other.base)
        };
        let left = self
            .significand
            .checked_mul(self_scale)
            .and_then(|s| s.checked_mul(other.denominator))
            .ok_or(RationalError::Overflow)?;
        let right = other
            .significand
            .checked_mul(other_scale)
            .and_then(|s| s.checked_mul(self.denominator))
            .ok_or(RationalError::Overflow)?;
        let significand = left.checked_add(right).ok_or(RationalError::Overflow)?;
        let denominator = self
            .denominator
            .checked_mul(other.denominator)
            .ok_or(RationalError::Overflow)?;
        Self::new(significand, base, denominator)
    }

    pub fn sub(&self, other: &Self) -> Result<Self, RationalError> {
        self.add(&other.negated()?)
    }

    /// Flips the sign of the significand; base and denominator are
    /// untouched, which keeps the value canonical without renormalizing.
    pub fn negated(&self) -> Result<Self, RationalError> {
        let significand = self
            .significand
            .checked_neg()
            .ok_or(RationalError::Overflow)?;
        Ok(Self {
            significand,
            ..*self
        })
    }

    pub fn to_float(&self, precision: Option<i32>) -> f64 {
        let exp = self.base.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        let value = self.significand as f64 / self.denominator as f64 * 10f64.powi(exp);
        match precision {
            Some(precision) => {
                let scale = 10f64.powi(precision.clamp(-308, 308));
                let scaled = value * scale;
                if scaled.is_finite() {
                    scaled.round() / scale
                } else {
                    // scaling overflowed f64; rounding at that many digits
                    // cannot change the value anyway
                    value
                }
            }
            None => value,
        }
    }

    /// The canonical `(significand, base, denominator)` triple.
    pub fn to_parts(&self) -> (i64, i64, i64) {
        (self.significand, self.base, self.denominator)
    }

    pub fn significand(&self) -> i64 {
        self.significand
    }

    pub fn base(&self) -> i64 {
        self.base
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn is_zero(&self) -> bool {
        self.significand == 0
    }

    fn normalized(mut self) -> Result<Self, RationalError> {
        if self.significand == 0 {
            return Ok(Self::zero());
        }
        let g = gcd(
            self.significand.unsigned_abs(),
            self.denominator.unsigned_abs(),
        );
        if g == 1 << 63 {
            // only possible when both fields are i64::MIN
            self.significand = 1;
            self.denominator = 1;
        } else {
            self.significand /= g as i64;
            self.denominator /= g as i64;
        }
        while self.significand % 10 == 0 {
            self.significand /= 10;
            self.base = self.base.checked_add(1).ok_or(RationalError::Overflow)?;
        }
        while self.denominator % 10 == 0 {
            self.denominator /= 10;
            self.base = self.base.checked_sub(1).ok_or(RationalError::Overflow)?;
        }
        if self.denominator < 0 {
            self.significand = self
                .significand
                .checked_neg()
                .ok_or(RationalError::Overflow)?;
            self.denominator = self
                .denominator
                .checked_neg()
                .ok_or(RationalError::Overflow)?;
        }
        Ok(self)
    }
}

/// Equality is exact: the difference must normalize to canonical zero.
/// Structural comparison alone would miss pairs like `(1, 0, 4)` and
/// `(25, -2, 1)`, which both canonically encode 0.25 because a power of
/// two or five in the denominator can trade against the base.
impl PartialEq for Rational {
    fn eq(&self, other: &Self) -> bool {
        if self.to_parts() == other.to_parts() {
            return true;
        }
        matches!(self.sub(other), Ok(d) if d.significand == 0)
    }
}

impl Eq for Rational {}

impl std::ops::Neg for &Rational {
    type Output = Result<Rational, RationalError>;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

macro_rules! checked_op {
    ($trait:ident, $method:ident) => {
        impl std::ops::$trait for &Rational {
            type Output = Result<Rational, RationalError>;

            fn $method(self, other: &Rational) -> Self::Output {
                Rational::$method(self, other)
            }
        }
    };
}

checked_op!(Add, add);
checked_op!(Sub, sub);
checked_op!(Mul, mul);
checked_op!(Div, div);

impl TryFrom<(i64, i64, i64)> for Rational {
    type Error = RationalError;

    fn try_from((significand, base, denominator): (i64, i64, i64)) -> Result<Self, Self::Error> {
        Self::new(significand, base, denominator)
    }
}

impl From<Rational> for (i64, i64, i64) {
    fn from(n: Rational) -> Self {
        n.to_parts()
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self::from_integer(n)
    }
}

pub(crate) fn pow10(exp: i64) -> Result<i64, RationalError> {
    let exp = usize::try_from(exp).map_err(|_| RationalError::Overflow)?;
    checked_pow(10i64, exp).ok_or(RationalError::Overflow)
}

fn f64_to_i64(value: f64) -> Result<i64, RationalError> {
    if !value.is_finite() || value < i64::MIN as f64 || value >= i64::MAX as f64 {
        return Err(RationalError::Overflow);
    }
    Ok(value as i64)
}

/// Binary GCD over non-negative magnitudes.
///
/// Keeps the deliberate `gcd(a, 0) = 0` convention of the halving
/// algorithm. Public constructors never reach that branch (zero
/// significands short-circuit and zero denominators are rejected first).
fn gcd(mut a: u64, mut b: u64) -> u64 {
    if a == 0 || b == 0 {
        return 0;
    }
    let mut shift = 0;
    loop {
        if a == b {
            return a << shift;
        }
        if a == 1 || b == 1 {
            return 1 << shift;
        }
        if a & 1 == 0 && b & 1 == 0 {
            a >>= 1;
            b >>= 1;
            shift += 1;
        } else if a & 1 == 0 {
            a >>= 1;
        } else if b & 1 == 0 {
            b >>= 1;
        } else if a > b {
            a = (a - b) >> 1;
        } else {
            b = (b - a) >> 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(significand: i64, base: i64, denominator: i64) -> Rational {
        Rational::new(significand, base, denominator).unwrap()
    }

    #[test]
    fn gcd_contract() {
        assert_eq!(gcd(12, 8), 4);
        assert_eq!(gcd(1505, 5), 5);
        assert_eq!(gcd(7, 7), 7);
        assert_eq!(gcd(7, 13), 1);
        assert_eq!(gcd(1, 99), 1);
        assert_eq!(gcd(96, 36), 12);
        // the deliberate zero convention
        assert_eq!(gcd(5, 0), 0);
        assert_eq!(gcd(0, 5), 0);
    }

    #[test]
    fn construction_reduces_and_folds_tens() {
        assert_eq!(parts(150, 0, 1).to_parts(), (15, 1, 1));
        assert_eq!(parts(31400, -2, 1).to_parts(), (314, 0, 1));
        assert_eq!(parts(4, 0, 8).to_parts(), (1, 0, 2));
        assert_eq!(parts(1, 0, 100).to_parts(), (1, -2, 1));
        assert_eq!(parts(1505, -1, 5).to_parts(), (301, -1, 1));
        assert_eq!(Rational::from(150).to_parts(), (15, 1, 1));
        assert_eq!(Rational::from_integer(-400).to_parts(), (-4, 2, 1));
    }

    #[test]
    fn canonical_zero() {
        for (base, denominator) in [(0, 1), (5, -7), (-3, 40), (12, 12)] {
            assert_eq!(parts(0, base, denominator).to_parts(), (0, 0, 1));
        }
        assert_eq!(Rational::zero().to_parts(), (0, 0, 1));
        assert!(Rational::zero().is_zero());
    }

    #[test]
    fn normalization_is_idempotent() {
        for n in [
            parts(1505, -1, 1),
            parts(7, 3, 13),
            parts(-42, 0, 5),
            Rational::zero(),
        ] {
            let (s, b, d) = n.to_parts();
            assert_eq!(parts(s, b, d).to_parts(), n.to_parts());
        }
    }

    #[test]
    fn invariants_hold_after_construction() {
        for n in [
            parts(123456, -3, 720),
            parts(-900, 2, 36),
            parts(17, 0, -68),
        ] {
            let (s, _, d) = n.to_parts();
            assert_ne!(s % 10, 0);
            assert_ne!(d % 10, 0);
            assert_eq!(gcd(s.unsigned_abs(), d.unsigned_abs()), 1);
            assert!(d > 0);
        }
    }

    #[test]
    fn sign_moves_into_significand() {
        assert_eq!(parts(1, 0, -2).to_parts(), (-1, 0, 2));
        assert_eq!(parts(-1, 0, -2).to_parts(), (1, 0, 2));
        let n = Rational::from_integer(1)
            .div(&Rational::from_integer(-2))
            .unwrap();
        assert_eq!(n.to_parts(), (-1, 0, 2));
    }

    #[test]
    fn zero_denominator_is_rejected() {
        assert!(matches!(
            Rational::new(5, 0, 0),
            Err(RationalError::DivisionByZero)
        ));
        assert!(matches!(
            Rational::new(0, 3, 0),
            Err(RationalError::DivisionByZero)
        ));
    }

    #[test]
    fn div_by_zero_value_is_rejected() {
        let x = Rational::from_integer(5);
        assert!(matches!(
            x.div(&Rational::zero()),
            Err(RationalError::DivisionByZero)
        ));
        let tiny_zero = Rational::new(0, -4, 17).unwrap();
        assert!(matches!(
            x.div(&tiny_zero),
            Err(RationalError::DivisionByZero)
        ));
    }

    #[test]
    fn identities() {
        for x in [
            parts(1505, -1, 1),
            parts(-7, 2, 3),
            Rational::from_integer(42),
            Rational::zero(),
        ] {
            assert_eq!(x.mul(&Rational::one()).unwrap(), x);
            assert_eq!(x.add(&Rational::zero()).unwrap(), x);
            assert_eq!(x.sub(&x).unwrap(), Rational::zero());
        }
    }

    #[test]
    fn commutativity() {
        let a = parts(314, -2, 1);
        let b = parts(-5, 1, 7);
        assert_eq!(a.mul(&b).unwrap(), b.mul(&a).unwrap());
        assert_eq!(a.add(&b).unwrap(), b.add(&a).unwrap());
    }

    #[test]
    fn base_alignment_in_add() {
        // 150 + 0.5 == 150.5, aligned at base -1
        let sum = Rational::from_integer(150)
            .add(&Rational::from_float(0.5, Some(1)).unwrap())
            .unwrap();
        assert_eq!(sum.to_parts(), (1505, -1, 1));
        assert_eq!(sum, Rational::from_float(150.5, Some(1)).unwrap());
        // same result with the operands swapped (diff > 0 branch)
        let sum = Rational::from_float(0.5, Some(1))
            .unwrap()
            .add(&Rational::from_integer(150))
            .unwrap();
        assert_eq!(sum.to_parts(), (1505, -1, 1));
    }

    #[test]
    fn thirds_sum_to_one() {
        let third = parts(1, 0, 3);
        let sum = third.add(&third).unwrap().add(&third).unwrap();
        assert_eq!(sum.to_parts(), (1, 0, 1));
        assert_eq!(sum, Rational::one());
    }

    #[test]
    fn equality_is_value_equality() {
        // both triples are canonical encodings of 0.25
        assert_eq!(parts(1, 0, 4), parts(25, -2, 1));
        assert_ne!(parts(1, 0, 4), parts(1, 0, 5));
        assert_eq!(parts(1, 0, 4).to_parts(), (1, 0, 4));
        assert_eq!(parts(25, -2, 1).to_parts(), (25, -2, 1));
    }

    #[test]
    fn equality_via_subtraction() {
        let a = parts(1505, -1, 1);
        let b = parts(301, 0, 2);
        let d = a.sub(&b).unwrap();
        assert_eq!(d.to_parts(), (0, 0, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn overflow_is_reported() {
        let big = Rational::from_integer(i64::MAX);
        assert!(matches!(
            big.mul(&Rational::from_integer(3)),
            Err(RationalError::Overflow)
        ));
        // base alignment needs 10^100
        let high = parts(1, 100, 1);
        assert!(matches!(
            high.add(&Rational::one()),
            Err(RationalError::Overflow)
        ));
        assert!(matches!(
            Rational::from_integer(i64::MIN).negated(),
            Err(RationalError::Overflow)
        ));
    }

    #[test]
    fn trailing_ten_fold_checks_the_base() {
        // folding tens out of the significand would push the base past MAX
        assert!(matches!(
            Rational::new(10, i64::MAX, 1),
            Err(RationalError::Overflow)
        ));
        // the denominator fold decrements the base symmetrically
        assert!(matches!(
            Rational::new(1, i64::MIN, 100),
            Err(RationalError::Overflow)
        ));
        // one step of headroom is enough
        assert_eq!(
            Rational::new(10, i64::MAX - 1, 1).unwrap().to_parts(),
            (1, i64::MAX, 1)
        );
    }

    #[test]
    fn from_float_with_digits() {
        assert_eq!(
            Rational::from_float(3.14, Some(2)).unwrap().to_parts(),
            (314, -2, 1)
        );
        assert_eq!(
            Rational::from_float(-2.5, Some(1)).unwrap().to_parts(),
            (-25, -1, 1)
        );
        // rounding, not truncation
        assert_eq!(
            Rational::from_float(0.15, Some(1)).unwrap().to_parts(),
            (2, -1, 1)
        );
        assert_eq!(Rational::from_float(0.0, Some(5)).unwrap(), Rational::zero());
        assert!(matches!(
            Rational::from_float(f64::NAN, Some(2)),
            Err(RationalError::Overflow)
        ));
        assert!(matches!(
            Rational::from_float(1e40, Some(0)),
            Err(RationalError::Overflow)
        ));
        // digit counts past the f64 exponent range scale to infinity
        assert!(matches!(
            Rational::from_float(2.5, Some(400)),
            Err(RationalError::Overflow)
        ));
        assert!(matches!(
            Rational::from_float(2.5, Some(u32::MAX)),
            Err(RationalError::Overflow)
        ));
    }

    #[test]
    fn from_float_auto_digits() {
        assert_eq!(
            Rational::from_float(0.25, None).unwrap().to_parts(),
            (25, -2, 1)
        );
        // 0.1 * 10 rounds to exactly 1.0 in binary floating point
        assert_eq!(
            Rational::from_float(0.1, None).unwrap().to_parts(),
            (1, -1, 1)
        );
        assert_eq!(
            Rational::from_float(42.0, None).unwrap(),
            Rational::from_integer(42)
        );
        assert!(matches!(
            Rational::from_float(f64::INFINITY, None),
            Err(RationalError::Overflow)
        ));
    }

    #[test]
    fn to_float_round_trips() {
        assert_eq!(Rational::from_integer(42).to_float(None), 42.0);
        assert_eq!(
            Rational::from_float(3.14, Some(2)).unwrap().to_float(Some(2)),
            3.14
        );
        assert_eq!(parts(1, 0, 4).to_float(None), 0.25);
        assert_eq!(parts(1, 0, 3).to_float(Some(3)), 0.333);
    }

    #[test]
    fn to_float_with_extreme_precision_stays_finite() {
        assert!(parts(1, 0, 3).to_float(Some(400)).is_finite());
        assert_eq!(Rational::from_integer(42).to_float(Some(1000)), 42.0);
        assert_eq!(Rational::from_integer(42).to_float(Some(-1000)), 0.0);
    }

    #[test]
    fn operator_impls_delegate() {
        let a = parts(1, 0, 2);
        let b = parts(1, 0, 3);
        assert_eq!((&a + &b).unwrap(), parts(5, 0, 6));
        assert_eq!((&a - &b).unwrap(), parts(1, 0, 6));
        assert_eq!((&a * &b).unwrap(), parts(1, 0, 6));
        assert_eq!((&a / &b).unwrap(), parts(3, 0, 2));
        assert_eq!((-&a).unwrap(), parts(-1, 0, 2));
    }

    #[test]
    fn serde_round_trips_the_triple() {
        let n = parts(1505, -1, 1);
        let encoded = ron::to_string(&n).unwrap();
        assert_eq!(encoded, "(1505,-1,1)");
        let decoded: Rational = ron::from_str(&encoded).unwrap();
        assert_eq!(decoded.to_parts(), n.to_parts());
        // decoding re-normalizes raw triples
        let decoded: Rational = ron::from_str("(150, 0, 1)").unwrap();
        assert_eq!(decoded.to_parts(), (15, 1, 1));
        assert!(ron::from_str::<Rational>("(1, 0, 0)").is_err());
    }
}
