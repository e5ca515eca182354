//! Univariate polynomials with exact coefficients, rational root search and
//! rational-function cancellation.

use crate::functions::numeric::{lcm, Number};
use crate::functions::simplify::{
  expand, simplify, simplify_plus, simplify_power, simplify_times,
};
use crate::syntax::Expr;

/// Highest degree recognised when reading a polynomial out of an expression.
const MAX_DEGREE: i128 = 64;
/// Largest constant/leading coefficient whose divisors are enumerated.
const MAX_DIVISOR_SEARCH: i128 = 1_000_000_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct Poly {
  /// Coefficients from the constant term upwards, without trailing zeros.
  pub coeffs: Vec<Number>,
}

/// Coefficients of `expr` as a polynomial in `var`, constant term first.
/// Coefficients may contain other symbols. `None` if `expr` is not a
/// polynomial in `var`.
pub fn coefficients(expr: &Expr, var: &str) -> Option<Vec<Expr>> {
  let expanded = expand(expr);
  let terms = match expanded {
    Expr::Plus(ts) => ts,
    other => vec![other],
  };
  let mut out: Vec<Vec<Expr>> = Vec::new();
  for term in terms {
    let factors = match term {
      Expr::Times(fs) => fs,
      other => vec![other],
    };
    let mut degree = 0i128;
    let mut rest = Vec::new();
    for f in factors {
      match &f {
        Expr::Identifier(name) if name == var => degree += 1,
        Expr::Power(b, e) if matches!(b.as_ref(), Expr::Identifier(n) if n == var) => {
          let k = e.as_number()?.as_integer()?;
          if k < 0 {
            return None;
          }
          degree += k;
        }
        _ if f.contains_symbol(var) => return None,
        _ => rest.push(f),
      }
    }
    if degree > MAX_DEGREE {
      return None;
    }
    let idx = degree as usize;
    if out.len() <= idx {
      out.resize(idx + 1, Vec::new());
    }
    out[idx].push(simplify_times(rest));
  }
  let mut coeffs: Vec<Expr> = out.into_iter().map(simplify_plus).collect();
  while coeffs.len() > 1 && coeffs.last().is_some_and(|c| c.is_zero()) {
    coeffs.pop();
  }
  if coeffs.is_empty() {
    coeffs.push(Expr::Integer(0));
  }
  Some(coeffs)
}

impl Poly {
  pub fn new(mut coeffs: Vec<Number>) -> Self {
    while coeffs.last().is_some_and(|c| c.is_zero()) {
      coeffs.pop();
    }
    Poly { coeffs }
  }

  pub fn constant(c: Number) -> Self {
    Poly::new(vec![c])
  }

  /// `x - root`
  pub fn linear_factor(root: Number) -> Self {
    Poly::new(vec![-root, Number::ONE])
  }

  /// Reads a polynomial with purely numeric coefficients.
  pub fn from_expr(expr: &Expr, var: &str) -> Option<Poly> {
    let coeffs = coefficients(expr, var)?;
    let numbers = coeffs
      .iter()
      .map(|c| c.as_number())
      .collect::<Option<Vec<_>>>()?;
    Some(Poly::new(numbers))
  }

  pub fn is_zero(&self) -> bool {
    self.coeffs.is_empty()
  }

  /// `None` for the zero polynomial.
  pub fn degree(&self) -> Option<usize> {
    self.coeffs.len().checked_sub(1)
  }

  pub fn leading(&self) -> Number {
    self.coeffs.last().copied().unwrap_or(Number::ZERO)
  }

  pub fn coeff(&self, i: usize) -> Number {
    self.coeffs.get(i).copied().unwrap_or(Number::ZERO)
  }

  pub fn is_exact(&self) -> bool {
    self.coeffs.iter().all(|c| c.is_exact())
  }

  pub fn eval(&self, x: Number) -> Number {
    self
      .coeffs
      .iter()
      .rev()
      .fold(Number::ZERO, |acc, &c| acc * x + c)
  }

  pub fn derivative(&self) -> Poly {
    Poly::new(
      self
        .coeffs
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, &c)| c * Number::int(i as i128))
        .collect(),
    )
  }

  pub fn add(&self, other: &Poly) -> Poly {
    let n = self.coeffs.len().max(other.coeffs.len());
    Poly::new((0..n).map(|i| self.coeff(i) + other.coeff(i)).collect())
  }

  pub fn sub(&self, other: &Poly) -> Poly {
    self.add(&other.scale(-Number::ONE))
  }

  pub fn scale(&self, k: Number) -> Poly {
    Poly::new(self.coeffs.iter().map(|&c| c * k).collect())
  }

  pub fn mul(&self, other: &Poly) -> Poly {
    if self.is_zero() || other.is_zero() {
      return Poly::new(Vec::new());
    }
    let mut out = vec![Number::ZERO; self.coeffs.len() + other.coeffs.len() - 1];
    for (i, &a) in self.coeffs.iter().enumerate() {
      for (j, &b) in other.coeffs.iter().enumerate() {
        out[i + j] = out[i + j] + a * b;
      }
    }
    Poly::new(out)
  }

  /// Quotient and remainder. `None` when dividing by zero.
  pub fn div_rem(&self, divisor: &Poly) -> Option<(Poly, Poly)> {
    let d = divisor.degree()?;
    let lead = divisor.leading();
    let mut rem = self.coeffs.clone();
    let mut quot = vec![Number::ZERO; rem.len().saturating_sub(d).max(1)];
    while rem.len() > d && !rem.is_empty() {
      let shift = rem.len() - 1 - d;
      let factor = rem[rem.len() - 1].checked_div(lead)?;
      quot[shift] = factor;
      for (i, &c) in divisor.coeffs.iter().enumerate() {
        rem[shift + i] = rem[shift + i] - factor * c;
      }
      // The leading term cancels exactly; drop it even for floats.
      rem.pop();
      while rem.last().is_some_and(|c| c.is_zero()) {
        rem.pop();
      }
    }
    Some((Poly::new(quot), Poly::new(rem)))
  }

  pub fn monic(&self) -> Poly {
    match self.leading().recip() {
      Some(r) => self.scale(r),
      None => self.clone(),
    }
  }

  /// Monic greatest common divisor of two exact polynomials.
  pub fn gcd(a: &Poly, b: &Poly) -> Poly {
    if !a.is_exact() || !b.is_exact() {
      return Poly::constant(Number::ONE);
    }
    let (mut a, mut b) = (a.clone(), b.clone());
    while !b.is_zero() {
      let r = match a.div_rem(&b) {
        Some((_, r)) => r,
        None => break,
      };
      a = b;
      b = r;
    }
    if a.is_zero() {
      Poly::constant(Number::ONE)
    } else {
      a.monic()
    }
  }

  /// Same polynomial with integer coefficients (denominators cleared).
  fn integer_coeffs(&self) -> Option<Vec<i128>> {
    let mut common = 1i128;
    for c in &self.coeffs {
      match c {
        Number::Rational(_, d) => common = lcm(common, *d)?,
        Number::Real(_) => return None,
      }
    }
    self
      .coeffs
      .iter()
      .map(|c| match c {
        Number::Rational(n, d) => n.checked_mul(common / d),
        Number::Real(_) => None,
      })
      .collect()
  }

  /// Exact rational roots with their multiplicities, in increasing order.
  pub fn rational_roots(&self) -> Vec<(Number, usize)> {
    let mut roots: Vec<(Number, usize)> = Vec::new();
    if self.degree().unwrap_or(0) == 0 {
      return roots;
    }
    let mut p = self.clone();

    let zeros = p.coeffs.iter().take_while(|c| c.is_zero()).count();
    if zeros > 0 {
      roots.push((Number::ZERO, zeros));
      p = Poly::new(p.coeffs[zeros..].to_vec());
    }

    let Some(ints) = p.integer_coeffs() else {
      return roots;
    };
    let (Some(&a0), Some(&an)) = (ints.first(), ints.last()) else {
      return roots;
    };
    let (Some(ps), Some(qs)) = (divisors(a0), divisors(an)) else {
      return roots;
    };

    let mut candidates: Vec<Number> = Vec::new();
    for &num in &ps {
      for &den in &qs {
        for sign in [1, -1] {
          if let Some(r) = Number::ratio(sign * num, den) {
            if !candidates.contains(&r) {
              candidates.push(r);
            }
          }
        }
      }
    }
    candidates.sort_by(|a, b| a.to_f64().total_cmp(&b.to_f64()));

    for r in candidates {
      if p.degree().unwrap_or(0) == 0 {
        break;
      }
      let factor = Poly::linear_factor(r);
      let mut multiplicity = 0;
      while p.degree().unwrap_or(0) > 0 && p.eval(r).is_zero() {
        match p.div_rem(&factor) {
          Some((q, _)) => p = q,
          None => break,
        }
        multiplicity += 1;
      }
      if multiplicity > 0 {
        roots.push((r, multiplicity));
      }
    }
    roots.sort_by(|a, b| a.0.to_f64().total_cmp(&b.0.to_f64()));
    roots
  }

  /// Polynomial left after dividing out every rational root.
  pub fn deflate(&self, roots: &[(Number, usize)]) -> Poly {
    let mut p = self.clone();
    for &(r, m) in roots {
      for _ in 0..m {
        if let Some((q, _)) = p.div_rem(&Poly::linear_factor(r)) {
          p = q;
        }
      }
    }
    p
  }

  /// All complex roots by Durand-Kerner iteration, as (re, im) pairs.
  pub fn numeric_roots(&self) -> Vec<(f64, f64)> {
    let n = match self.degree() {
      Some(n) if n > 0 => n,
      _ => return Vec::new(),
    };
    let lead = self.leading().to_f64();
    let coeffs: Vec<f64> = self.coeffs.iter().map(|c| c.to_f64() / lead).collect();
    let eval = |z: Complex| {
      coeffs
        .iter()
        .rev()
        .fold(Complex::new(0.0, 0.0), |acc, &c| acc.mul(z).add(Complex::new(c, 0.0)))
    };

    let seed = Complex::new(0.4, 0.9);
    let mut roots: Vec<Complex> = Vec::with_capacity(n);
    let mut z = Complex::new(1.0, 0.0);
    for _ in 0..n {
      roots.push(z);
      z = z.mul(seed);
    }
    for _ in 0..500 {
      let mut delta = 0.0f64;
      for i in 0..n {
        let mut denom = Complex::new(1.0, 0.0);
        for j in 0..n {
          if i != j {
            denom = denom.mul(roots[i].sub(roots[j]));
          }
        }
        let step = eval(roots[i]).div(denom);
        roots[i] = roots[i].sub(step);
        delta = delta.max(step.norm());
      }
      if delta < 1e-14 {
        break;
      }
    }
    let mut out: Vec<(f64, f64)> = roots
      .into_iter()
      .map(|z| (clean(z.re), clean(z.im)))
      .collect();
    out.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    out
  }

  pub fn to_expr(&self, var: &str) -> Expr {
    let x = Expr::symbol(var);
    let terms = self
      .coeffs
      .iter()
      .enumerate()
      .filter(|(_, c)| !c.is_zero())
      .map(|(i, c)| {
        simplify_times(vec![
          c.to_expr(),
          simplify_power(x.clone(), Expr::Integer(i as i128)),
        ])
      })
      .collect();
    simplify_plus(terms)
  }
}

impl Poly {
  /// `lead * (x - r1)^m1 * ...` when every root is rational, otherwise the
  /// expanded form.
  pub fn factored_expr(&self, var: &str) -> Expr {
    let roots = self.rational_roots();
    let rest = self.deflate(&roots);
    if roots.is_empty() || rest.degree() != Some(0) {
      return self.to_expr(var);
    }
    let mut factors = vec![rest.leading().to_expr()];
    for (r, m) in roots {
      factors.push(simplify_power(
        Poly::linear_factor(r).to_expr(var),
        Expr::Integer(m as i128),
      ));
    }
    simplify_times(factors)
  }
}

fn clean(v: f64) -> f64 {
  if v.abs() < 1e-10 {
    0.0
  } else {
    v
  }
}

/// Positive divisors of `n`. `None` for zero or very large inputs.
fn divisors(n: i128) -> Option<Vec<i128>> {
  let n = n.checked_abs()?;
  if n == 0 || n > MAX_DIVISOR_SEARCH {
    return None;
  }
  let mut small = Vec::new();
  let mut large = Vec::new();
  let mut i = 1i128;
  while i * i <= n {
    if n % i == 0 {
      small.push(i);
      if i * i != n {
        large.push(n / i);
      }
    }
    i += 1;
  }
  small.extend(large.into_iter().rev());
  Some(small)
}

#[derive(Debug, Clone, Copy)]
struct Complex {
  re: f64,
  im: f64,
}

impl Complex {
  fn new(re: f64, im: f64) -> Self {
    Complex { re, im }
  }

  fn add(self, o: Complex) -> Complex {
    Complex::new(self.re + o.re, self.im + o.im)
  }

  fn sub(self, o: Complex) -> Complex {
    Complex::new(self.re - o.re, self.im - o.im)
  }

  fn mul(self, o: Complex) -> Complex {
    Complex::new(
      self.re * o.re - self.im * o.im,
      self.re * o.im + self.im * o.re,
    )
  }

  fn div(self, o: Complex) -> Complex {
    let d = o.re * o.re + o.im * o.im;
    if d == 0.0 {
      return Complex::new(0.0, 0.0);
    }
    Complex::new(
      (self.re * o.re + self.im * o.im) / d,
      (self.im * o.re - self.re * o.im) / d,
    )
  }

  fn norm(self) -> f64 {
    self.re.hypot(self.im)
  }
}

// ─── Rational functions ─────────────────────────────────────────────

/// Numerator and denominator of an expression brought over a common
/// denominator.
pub fn as_numer_denom(expr: &Expr) -> (Expr, Expr) {
  match expr {
    Expr::Rational(n, d) => (Expr::Integer(*n), Expr::Integer(*d)),
    Expr::Power(b, e) if e.as_number().is_some_and(|n| n.is_negative()) => {
      let positive = simplify_times(vec![Expr::Integer(-1), e.as_ref().clone()]);
      (Expr::Integer(1), simplify_power(b.as_ref().clone(), positive))
    }
    Expr::Times(factors) => {
      let mut nums = Vec::new();
      let mut dens = Vec::new();
      for f in factors {
        let (n, d) = as_numer_denom(f);
        nums.push(n);
        dens.push(d);
      }
      (simplify_times(nums), simplify_times(dens))
    }
    Expr::Plus(terms) => {
      let parts: Vec<(Expr, Expr)> = terms.iter().map(as_numer_denom).collect();
      if parts.iter().all(|(_, d)| d.is_one()) {
        return (expr.clone(), Expr::Integer(1));
      }
      let den = simplify_times(parts.iter().map(|(_, d)| d.clone()).collect());
      let num = simplify_plus(
        parts
          .iter()
          .enumerate()
          .map(|(i, (n, _))| {
            let mut factors = vec![n.clone()];
            factors.extend(
              parts
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, (_, d))| d.clone()),
            );
            expand(&simplify_times(factors))
          })
          .collect(),
      );
      (num, den)
    }
    other => (other.clone(), Expr::Integer(1)),
  }
}

/// Cancels common polynomial factors of a univariate rational function:
/// (x^2 - 1)/(x - 1) -> x + 1. `None` when nothing cancels.
pub fn cancel(expr: &Expr) -> Option<Expr> {
  let vars = expr.free_symbols();
  if vars.len() != 1 {
    return None;
  }
  let var = vars.iter().next()?;
  let (num, den) = as_numer_denom(expr);
  if den.as_number().is_some() {
    return None;
  }
  let p = Poly::from_expr(&num, var)?;
  let q = Poly::from_expr(&den, var)?;
  let g = Poly::gcd(&p, &q);
  if g.degree().unwrap_or(0) == 0 {
    return None;
  }
  let (p, _) = p.div_rem(&g)?;
  let (q, _) = q.div_rem(&g)?;
  Some(simplify(Expr::Times(vec![
    p.to_expr(var),
    Expr::recip(q.factored_expr(var)),
  ])))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_expression;

  fn poly(s: &str) -> Poly {
    Poly::from_expr(&parse_expression(s).unwrap(), "x").unwrap()
  }

  #[test]
  fn reads_coefficients() {
    let p = poly("(x + 1)^2");
    assert_eq!(p.coeffs, vec![Number::ONE, Number::int(2), Number::ONE]);
    assert_eq!(p.degree(), Some(2));
  }

  #[test]
  fn rejects_non_polynomials() {
    assert!(Poly::from_expr(&parse_expression("sin(x)").unwrap(), "x").is_none());
    assert!(Poly::from_expr(&parse_expression("1/x").unwrap(), "x").is_none());
  }

  #[test]
  fn symbolic_coefficients() {
    let c = coefficients(&parse_expression("a*x^2 + b*x").unwrap(), "x").unwrap();
    assert_eq!(c.len(), 3);
    assert_eq!(c[2], Expr::symbol("a"));
    assert_eq!(c[0], Expr::Integer(0));
  }

  #[test]
  fn divides_with_remainder() {
    let (q, r) = poly("x^3 - 1").div_rem(&poly("x - 1")).unwrap();
    assert_eq!(q, poly("x^2 + x + 1"));
    assert!(r.is_zero());
  }

  #[test]
  fn finds_rational_roots_with_multiplicity() {
    let roots = poly("(x - 1)^2*(2*x + 3)").rational_roots();
    assert_eq!(
      roots,
      vec![(Number::Rational(-3, 2), 1), (Number::ONE, 2)]
    );
  }

  #[test]
  fn gcd_is_monic() {
    let g = Poly::gcd(&poly("2*x^2 - 2"), &poly("4*x - 4"));
    assert_eq!(g, poly("x - 1"));
  }

  #[test]
  fn numeric_roots_of_quadratic() {
    let roots = poly("x^2 + 1").numeric_roots();
    assert_eq!(roots.len(), 2);
    assert!((roots[0].1.abs() - 1.0).abs() < 1e-9);
    assert!(roots[0].0.abs() < 1e-9);
  }

  #[test]
  fn cancels_common_factor() {
    let expr = simplify(parse_expression("(x^2 - 1)/(x - 1)").unwrap());
    assert_eq!(cancel(&expr).map(|e| e.to_string()), Some("x + 1".into()));
  }
}
