//! Exact rational / floating point numbers used throughout the symbolic core.

use crate::syntax::Expr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
  /// Normalized fraction: denominator > 0 and gcd(num, den) == 1.
  Rational(i128, i128),
  Real(f64),
}

/// Greatest common divisor. `None` only for 2^127, the gcd of `i128::MIN`
/// with itself or zero.
pub fn gcd(a: i128, b: i128) -> Option<i128> {
  let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
  while b != 0 {
    let t = a % b;
    a = b;
    b = t;
  }
  i128::try_from(a).ok()
}

pub fn lcm(a: i128, b: i128) -> Option<i128> {
  if a == 0 || b == 0 {
    return Some(0);
  }
  (a / gcd(a, b)?).checked_mul(b)?.checked_abs()
}

impl Number {
  pub const ZERO: Number = Number::Rational(0, 1);
  pub const ONE: Number = Number::Rational(1, 1);

  pub fn int(n: i128) -> Self {
    Number::Rational(n, 1)
  }

  /// Builds a normalized fraction. Returns `None` for a zero denominator
  /// and for a numerator of `i128::MIN`, which has no negation; callers
  /// fall back to floats.
  pub fn ratio(num: i128, den: i128) -> Option<Self> {
    if den == 0 {
      return None;
    }
    let g = gcd(num, den)?.max(1);
    let (mut n, mut d) = (num / g, den / g);
    if d < 0 {
      n = n.checked_neg()?;
      d = d.checked_neg()?;
    }
    (n != i128::MIN).then_some(Number::Rational(n, d))
  }

  pub fn from_expr(expr: &Expr) -> Option<Self> {
    match expr {
      Expr::Integer(n) => Some(Number::int(*n)),
      Expr::Rational(n, d) => Number::ratio(*n, *d),
      Expr::Real(f) => Some(Number::Real(*f)),
      _ => None,
    }
  }

  pub fn to_expr(self) -> Expr {
    match self {
      Number::Rational(n, 1) => Expr::Integer(n),
      Number::Rational(n, d) => Expr::Rational(n, d),
      Number::Real(f) => Expr::Real(f),
    }
  }

  pub fn to_f64(self) -> f64 {
    match self {
      Number::Rational(n, d) => n as f64 / d as f64,
      Number::Real(f) => f,
    }
  }

  pub fn is_exact(&self) -> bool {
    matches!(self, Number::Rational(..))
  }

  pub fn is_zero(&self) -> bool {
    match self {
      Number::Rational(n, _) => *n == 0,
      Number::Real(f) => *f == 0.0,
    }
  }

  pub fn is_one(&self) -> bool {
    match self {
      Number::Rational(n, d) => *n == 1 && *d == 1,
      Number::Real(f) => *f == 1.0,
    }
  }

  pub fn is_negative(&self) -> bool {
    match self {
      Number::Rational(n, _) => *n < 0,
      Number::Real(f) => *f < 0.0,
    }
  }

  pub fn as_integer(&self) -> Option<i128> {
    match self {
      Number::Rational(n, 1) => Some(*n),
      _ => None,
    }
  }

  pub fn abs(self) -> Self {
    if self.is_negative() {
      -self
    } else {
      self
    }
  }

  pub fn checked_div(self, rhs: Self) -> Option<Self> {
    if rhs.is_zero() {
      return None;
    }
    match (self, rhs) {
      (Number::Rational(a, b), Number::Rational(c, d)) => {
        match (a.checked_mul(d), b.checked_mul(c)) {
          (Some(n), Some(m)) => Number::ratio(n, m),
          _ => Some(Number::Real(self.to_f64() / rhs.to_f64())),
        }
      }
      _ => Some(Number::Real(self.to_f64() / rhs.to_f64())),
    }
  }

  pub fn recip(self) -> Option<Self> {
    Number::ONE.checked_div(self)
  }

  /// Integer power. `None` when raising zero to a negative power.
  pub fn pow_int(self, exp: i128) -> Option<Self> {
    if exp < 0 {
      return self.recip()?.pow_int(exp.checked_neg()?);
    }
    match self {
      Number::Real(f) => Some(Number::Real(f.powf(exp as f64))),
      Number::Rational(n, d) => {
        let e = u32::try_from(exp).ok();
        match e.and_then(|e| Some((n.checked_pow(e)?, d.checked_pow(e)?))) {
          Some((pn, pd)) => Number::ratio(pn, pd),
          None => Some(Number::Real((n as f64 / d as f64).powf(exp as f64))),
        }
      }
    }
  }

  /// Floor of an exact rational.
  pub fn floor(self) -> Option<i128> {
    match self {
      Number::Rational(n, d) => Some(n.div_euclid(d)),
      Number::Real(f) if f.is_finite() => Some(f.floor() as i128),
      Number::Real(_) => None,
    }
  }
}

fn exact_or_real(
  a: Number,
  b: Number,
  exact: impl Fn(i128, i128, i128, i128) -> Option<(i128, i128)>,
  real: impl Fn(f64, f64) -> f64,
) -> Number {
  match (a, b) {
    (Number::Rational(n1, d1), Number::Rational(n2, d2)) => {
      match exact(n1, d1, n2, d2).and_then(|(n, d)| Number::ratio(n, d)) {
        Some(r) => r,
        None => Number::Real(real(a.to_f64(), b.to_f64())),
      }
    }
    _ => Number::Real(real(a.to_f64(), b.to_f64())),
  }
}

impl std::ops::Add for Number {
  type Output = Self;

  fn add(self, rhs: Self) -> Self {
    exact_or_real(
      self,
      rhs,
      |a, b, c, d| {
        let n = a.checked_mul(d)?.checked_add(c.checked_mul(b)?)?;
        Some((n, b.checked_mul(d)?))
      },
      |x, y| x + y,
    )
  }
}

impl std::ops::Sub for Number {
  type Output = Self;

  fn sub(self, rhs: Self) -> Self {
    self + (-rhs)
  }
}

impl std::ops::Mul for Number {
  type Output = Self;

  fn mul(self, rhs: Self) -> Self {
    exact_or_real(
      self,
      rhs,
      |a, b, c, d| Some((a.checked_mul(c)?, b.checked_mul(d)?)),
      |x, y| x * y,
    )
  }
}

impl std::ops::Neg for Number {
  type Output = Self;

  fn neg(self) -> Self {
    match self {
      Number::Rational(n, d) => match n.checked_neg() {
        Some(m) => Number::Rational(m, d),
        None => Number::Real(-(n as f64) / d as f64),
      },
      Number::Real(f) => Number::Real(-f),
    }
  }
}

impl std::iter::Sum for Number {
  fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
    iter.fold(Number::ZERO, |a, b| a + b)
  }
}

/// Splits `n` into `(outside, inside)` with `n = outside^k * inside` and
/// `inside` free of k-th powers. Large inputs are left untouched.
pub fn extract_root(n: i128, k: u32) -> (i128, i128) {
  if n <= 1 || k < 2 || n > 1_000_000_000_000 {
    return (1, n);
  }
  let mut outside = 1i128;
  let mut inside = n;
  let mut base = 2i128;
  while let Some(p) = base.checked_pow(k) {
    if p > inside {
      break;
    }
    while inside % p == 0 {
      inside /= p;
      outside *= base;
    }
    base += 1;
  }
  (outside, inside)
}

/// Formats a float with 15 significant digits, trimming trailing zeros.
pub fn format_real(value: f64) -> String {
  if !value.is_finite() {
    return value.to_string();
  }
  if value == 0.0 {
    return "0".to_string();
  }
  let magnitude = value.abs().log10().floor() as i32;
  if !(-5..15).contains(&magnitude) {
    let s = format!("{:.14e}", value);
    return match s.split_once('e') {
      Some((mantissa, exp)) => format!("{}e{}", trim_zeros(mantissa), exp),
      None => s,
    };
  }
  let decimals = (14 - magnitude).max(0) as usize;
  let s = trim_zeros(&format!("{:.*}", decimals, value));
  if s == "-0" {
    "0".to_string()
  } else {
    s
  }
}

fn trim_zeros(s: &str) -> String {
  if s.contains('.') {
    s.trim_end_matches('0').trim_end_matches('.').to_string()
  } else {
    s.to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gcd_handles_the_extremes() {
    assert_eq!(gcd(i128::MIN, 2), Some(2));
    assert_eq!(gcd(i128::MIN, 3), Some(1));
    assert_eq!(gcd(i128::MIN, 0), None);
    assert_eq!(gcd(-12, 18), Some(6));
  }

  #[test]
  fn most_negative_integer_falls_back_to_float() {
    assert_eq!(Number::ratio(i128::MIN, 1), None);
    let sum = Number::int(-i128::MAX) + Number::int(-1);
    assert!(matches!(sum, Number::Real(f) if f < -1.7e38));
  }

  #[test]
  fn ratio_normalizes_sign_and_gcd() {
    assert_eq!(Number::ratio(4, -6), Some(Number::Rational(-2, 3)));
    assert_eq!(Number::ratio(1, 0), None);
  }

  #[test]
  fn arithmetic_stays_exact() {
    let a = Number::ratio(1, 3).unwrap();
    let b = Number::ratio(1, 6).unwrap();
    assert_eq!(a + b, Number::Rational(1, 2));
    assert_eq!(a * b, Number::Rational(1, 18));
    assert_eq!(a.checked_div(b), Some(Number::int(2)));
  }

  #[test]
  fn overflow_falls_back_to_real() {
    let big = Number::int(i128::MAX);
    assert!(matches!(big + big, Number::Real(_)));
  }

  #[test]
  fn negative_integer_power() {
    assert_eq!(Number::int(2).pow_int(-3), Some(Number::Rational(1, 8)));
    assert_eq!(Number::ZERO.pow_int(-1), None);
  }

  #[test]
  fn extracts_square_factors() {
    assert_eq!(extract_root(8, 2), (2, 2));
    assert_eq!(extract_root(72, 2), (6, 2));
    assert_eq!(extract_root(54, 3), (3, 2));
    assert_eq!(extract_root(7, 2), (1, 7));
  }

  #[test]
  fn formats_reals() {
    assert_eq!(format_real(0.5), "0.5");
    assert_eq!(format_real(2.0), "2");
    assert_eq!(format_real(1.0 / 3.0), "0.333333333333333");
    assert_eq!(format_real(std::f64::consts::SQRT_2), "1.4142135623731");
  }
}
