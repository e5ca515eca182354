//! Canonical auto-simplification, expansion and the "pick the shortest form"
//! simplifier used for user-facing results.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use crate::functions::evaluate::apply_real;
use crate::functions::numeric::{extract_root, Number};
use crate::functions::polynomial::cancel;
use crate::syntax::{expr_to_string, split_sign, Constant, Expr};
use crate::TutorError;

/// Largest exponent `expand` multiplies out, and the largest number of
/// terms it will produce.
const MAX_EXPAND_EXPONENT: i128 = 12;
const MAX_EXPAND_TERMS: usize = 4096;

/// Simplify an expression into canonical form.
pub fn simplify(expr: Expr) -> Expr {
  match expr {
    Expr::Rational(n, d) => match Number::ratio(n, d) {
      Some(num) => num.to_expr(),
      None => Expr::Rational(n, d),
    },
    Expr::Plus(terms) => {
      simplify_plus(terms.into_iter().map(simplify).collect())
    }
    Expr::Times(factors) => {
      simplify_times(factors.into_iter().map(simplify).collect())
    }
    Expr::Power(base, exp) => simplify_power(simplify(*base), simplify(*exp)),
    Expr::FunctionCall { name, args } => {
      simplify_function(name, args.into_iter().map(simplify).collect())
    }
    Expr::List(items) => Expr::List(items.into_iter().map(simplify).collect()),
    other => other,
  }
}

/// Simplifies and then keeps the shortest of the canonical, expanded and
/// cancelled forms.
pub fn simplify_full(expr: Expr) -> Expr {
  let canonical = simplify(expr);
  let mut best = canonical.clone();
  let mut best_len = expr_to_string(&best).chars().count();
  let mut candidates = vec![expand(&canonical)];
  if let Some(cancelled) = cancel(&canonical) {
    candidates.push(cancelled);
  }
  for candidate in candidates {
    let len = expr_to_string(&candidate).chars().count();
    if len < best_len {
      best = candidate;
      best_len = len;
    }
  }
  best
}

// ─── Undefined values ───────────────────────────────────────────────

/// True when some subterm has no value: zero to a negative power, `log(0)`,
/// a trig function at one of its poles or a non-finite float.
pub fn is_undefined(expr: &Expr) -> bool {
  match expr {
    Expr::Real(x) => !x.is_finite(),
    Expr::Rational(_, 0) => true,
    Expr::Power(base, exp) => {
      (base.is_zero() && exp.as_number().is_some_and(|n| n.is_negative()))
        || is_undefined(base)
        || is_undefined(exp)
    }
    Expr::FunctionCall { name, args } => {
      args.iter().any(is_undefined)
        || match (name.as_str(), args.as_slice()) {
          ("log", [arg]) => arg.is_zero(),
          ("tan" | "sec", [arg]) => {
            pi_degrees(arg).is_some_and(|deg| deg % 180 == 90)
          }
          ("cot" | "csc", [arg]) => {
            pi_degrees(arg).is_some_and(|deg| deg % 180 == 0)
          }
          _ => false,
        }
    }
    Expr::Plus(items) | Expr::Times(items) | Expr::List(items) => {
      items.iter().any(is_undefined)
    }
    _ => false,
  }
}

/// Rejects an expression with an undefined subterm.
pub fn ensure_defined(expr: &Expr) -> Result<(), TutorError> {
  if is_undefined(expr) {
    return Err(TutorError::EvaluationError(format!(
      "التعبير غير معرّف: {}",
      expr_to_string(expr)
    )));
  }
  Ok(())
}

// ─── Sums ───────────────────────────────────────────────────────────

/// Splits a term into its numeric coefficient and the rest: `3*x*y` -> (3, x*y).
pub fn split_coefficient(term: &Expr) -> (Number, Expr) {
  if let Some(n) = term.as_number() {
    return (n, Expr::Integer(1));
  }
  if let Expr::Times(factors) = term {
    if let Some(n) = factors.first().and_then(|f| f.as_number()) {
      let rest = if factors.len() == 2 {
        factors[1].clone()
      } else {
        Expr::Times(factors[1..].to_vec())
      };
      return (n, rest);
    }
  }
  (Number::ONE, term.clone())
}

/// Adds already simplified terms.
pub fn simplify_plus(terms: Vec<Expr>) -> Expr {
  let mut flat = Vec::new();
  for t in terms {
    match t {
      Expr::Plus(inner) => flat.extend(inner),
      other => flat.push(other),
    }
  }
  if flat.iter().any(is_undefined) {
    return Expr::Plus(flat);
  }

  let mut constant = Number::ZERO;
  let mut collected: Vec<(Expr, Number)> = Vec::new();
  for term in flat {
    if let Some(n) = term.as_number() {
      constant = constant + n;
      continue;
    }
    let (coeff, rest) = split_coefficient(&term);
    match collected.iter_mut().find(|(e, _)| *e == rest) {
      Some(entry) => entry.1 = entry.1 + coeff,
      None => collected.push((rest, coeff)),
    }
  }

  let mut out = Vec::new();
  for (rest, coeff) in collected {
    if coeff.is_zero() {
      continue;
    }
    if coeff.is_one() {
      out.push(rest);
    } else {
      out.push(simplify_times(vec![coeff.to_expr(), rest]));
    }
  }
  if !constant.is_zero() {
    out.push(constant.to_expr());
  }

  out.sort_by(plus_order);
  match out.len() {
    0 => Expr::Integer(0),
    1 => out.remove(0),
    _ => Expr::Plus(out),
  }
}

// ─── Products ───────────────────────────────────────────────────────

fn split_power(factor: &Expr) -> (Expr, Expr) {
  match factor {
    Expr::Power(b, e) => (b.as_ref().clone(), e.as_ref().clone()),
    other => (other.clone(), Expr::Integer(1)),
  }
}

/// Multiplies already simplified factors.
pub fn simplify_times(factors: Vec<Expr>) -> Expr {
  let mut flat = Vec::new();
  for f in factors {
    match f {
      Expr::Times(inner) => flat.extend(inner),
      other => flat.push(other),
    }
  }
  // A zero factor must not swallow 1/0.
  if flat.iter().any(is_undefined) {
    return Expr::Times(flat);
  }

  let mut coeff = Number::ONE;
  let mut groups: Vec<(Expr, Expr)> = Vec::new();
  for factor in flat {
    if let Some(n) = factor.as_number() {
      coeff = coeff * n;
      continue;
    }
    let (base, exp) = split_power(&factor);
    match groups.iter_mut().find(|(b, _)| *b == base) {
      Some(group) => group.1 = simplify_plus(vec![group.1.clone(), exp]),
      None => groups.push((base, exp)),
    }
  }
  if coeff.is_zero() {
    return coeff.to_expr();
  }

  let mut out = Vec::new();
  let mut needs_another_pass = false;
  for (base, exp) in groups {
    match simplify_power(base, exp) {
      p if p.is_number() => {
        if let Some(n) = p.as_number() {
          coeff = coeff * n;
        }
      }
      Expr::Times(inner) => {
        for f in inner {
          match f.as_number() {
            Some(n) => coeff = coeff * n,
            None => {
              needs_another_pass = true;
              out.push(f);
            }
          }
        }
      }
      other => out.push(other),
    }
  }
  if needs_another_pass && out.len() > 1 {
    out.insert(0, coeff.to_expr());
    return simplify_times_once(out);
  }
  finish_times(coeff, out)
}

/// Second grouping pass after powers of products were distributed; does not
/// recurse further.
fn simplify_times_once(factors: Vec<Expr>) -> Expr {
  let mut coeff = Number::ONE;
  let mut groups: Vec<(Expr, Expr)> = Vec::new();
  for factor in factors {
    if let Some(n) = factor.as_number() {
      coeff = coeff * n;
      continue;
    }
    let (base, exp) = split_power(&factor);
    match groups.iter_mut().find(|(b, _)| *b == base) {
      Some(group) => group.1 = simplify_plus(vec![group.1.clone(), exp]),
      None => groups.push((base, exp)),
    }
  }
  let mut out = Vec::new();
  for (base, exp) in groups {
    let p = simplify_power(base, exp);
    match p.as_number() {
      Some(n) => coeff = coeff * n,
      None => out.push(p),
    }
  }
  finish_times(coeff, out)
}

fn finish_times(coeff: Number, mut out: Vec<Expr>) -> Expr {
  if coeff.is_zero() {
    return coeff.to_expr();
  }
  out.retain(|f| !f.is_one());
  out.sort_by(times_order);

  // Number * (a + b) distributes, like 2*(x + 1) -> 2*x + 2.
  if out.len() == 1 && !coeff.is_one() {
    if let Expr::Plus(terms) = &out[0] {
      let c = coeff.to_expr();
      return simplify_plus(
        terms
          .iter()
          .map(|t| simplify_times(vec![c.clone(), t.clone()]))
          .collect(),
      );
    }
  }

  match (coeff.is_one(), out.len()) {
    (true, 0) => Expr::Integer(1),
    (true, 1) => out.remove(0),
    (true, _) => Expr::Times(out),
    (false, 0) => coeff.to_expr(),
    (false, _) => {
      out.insert(0, coeff.to_expr());
      Expr::Times(out)
    }
  }
}

// ─── Powers ─────────────────────────────────────────────────────────

pub fn simplify_power(base: Expr, exp: Expr) -> Expr {
  if exp.is_zero() {
    return Expr::Integer(1);
  }
  if exp.is_one() {
    return base;
  }
  if matches!(base, Expr::Integer(1)) {
    return Expr::Integer(1);
  }
  if let (Some(b), Some(e)) = (base.as_number(), exp.as_number()) {
    return numeric_power(b, e).unwrap_or_else(|| Expr::pow(base, exp));
  }

  let int_exp = exp.as_number().and_then(|n| n.as_integer());
  match (&base, int_exp) {
    (Expr::Constant(Constant::I), Some(k)) => {
      return match k.rem_euclid(4) {
        0 => Expr::Integer(1),
        1 => Expr::Constant(Constant::I),
        2 => Expr::Integer(-1),
        _ => Expr::Times(vec![Expr::Integer(-1), Expr::Constant(Constant::I)]),
      };
    }
    (Expr::Power(b, e), Some(_)) => {
      let new_exp = simplify_times(vec![e.as_ref().clone(), exp]);
      return simplify_power(b.as_ref().clone(), new_exp);
    }
    (Expr::Times(factors), Some(_)) => {
      return simplify_times(
        factors
          .iter()
          .map(|f| simplify_power(f.clone(), exp.clone()))
          .collect(),
      );
    }
    _ => {}
  }

  if matches!(base, Expr::Constant(Constant::E)) {
    if let Some(value) = exp_of_log(&exp) {
      return value;
    }
  }
  if base.is_zero() && exp.as_number().is_some_and(|n| !n.is_negative()) {
    return Expr::Integer(0);
  }
  Expr::pow(base, exp)
}

/// exp(log(u)) -> u and exp(n*log(u)) -> u^n.
fn exp_of_log(exp: &Expr) -> Option<Expr> {
  match exp {
    Expr::FunctionCall { name, args } if name == "log" && args.len() == 1 => {
      Some(args[0].clone())
    }
    Expr::Times(factors) if factors.len() == 2 => {
      let n = factors[0].as_number()?.as_integer()?;
      match &factors[1] {
        Expr::FunctionCall { name, args } if name == "log" && args.len() == 1 => {
          Some(simplify_power(args[0].clone(), Expr::Integer(n)))
        }
        _ => None,
      }
    }
    _ => None,
  }
}

fn numeric_power(base: Number, exp: Number) -> Option<Expr> {
  match (base, exp) {
    (Number::Rational(..), Number::Rational(p, 1)) => {
      base.pow_int(p).map(Number::to_expr)
    }
    (Number::Rational(n, d), Number::Rational(p, q)) => rational_root(n, d, p, q),
    _ => {
      let (b, e) = (base.to_f64(), exp.to_f64());
      if b >= 0.0 || e.fract() == 0.0 {
        Some(Expr::Real(b.powf(e)))
      } else {
        None
      }
    }
  }
}

/// (n/d)^(p/q) with perfect powers pulled out and the denominator
/// rationalized: sqrt(8) -> 2*sqrt(2), sqrt(1/2) -> sqrt(2)/2.
fn rational_root(n: i128, d: i128, p: i128, q: i128) -> Option<Expr> {
  if n == 0 {
    return if p > 0 { Some(Expr::Integer(0)) } else { None };
  }
  if n < 0 {
    if q != 2 {
      return None;
    }
    let positive = numeric_power(Number::ratio(-n, d)?, Number::ratio(p, q)?)
      .unwrap_or_else(|| {
        Expr::pow(Number::Rational(-n, d).to_expr(), Expr::Rational(p, q))
      });
    let i_part = simplify_power(Expr::Constant(Constant::I), Expr::Integer(p));
    return Some(simplify_times(vec![i_part, positive]));
  }

  let qu = u32::try_from(q).ok()?;
  let k = p.div_euclid(q);
  let r = p.rem_euclid(q);
  let ru = u32::try_from(r).ok()?;
  let (out_n, in_n) = extract_root(n, qu);
  let (out_d, in_d) = extract_root(d, qu);

  let mut coeff = Number::Rational(n, d).pow_int(k)?;
  coeff = coeff * Number::ratio(out_n.checked_pow(ru)?, out_d.checked_pow(ru)?)?;
  let mut radicals = Vec::new();
  if in_d != 1 {
    coeff = coeff.checked_div(Number::int(in_d))?;
  }
  if q == 2 {
    let radicand = in_n.checked_mul(in_d)?;
    if radicand != 1 {
      radicals.push(Expr::sqrt(Expr::Integer(radicand)));
    }
  } else {
    if in_n != 1 {
      radicals.push(Expr::pow(Expr::Integer(in_n), Number::ratio(r, q)?.to_expr()));
    }
    if in_d != 1 {
      radicals
        .push(Expr::pow(Expr::Integer(in_d), Number::ratio(q - r, q)?.to_expr()));
    }
  }

  if radicals.is_empty() {
    return Some(coeff.to_expr());
  }
  if coeff.is_one() && radicals.len() == 1 {
    return radicals.pop();
  }
  // Every radical has a distinct k-th-power-free base, so no regrouping.
  radicals.sort_by(times_order);
  if !coeff.is_one() {
    radicals.insert(0, coeff.to_expr());
  }
  Some(Expr::Times(radicals))
}

// ─── Functions ──────────────────────────────────────────────────────

const ODD_FUNCTIONS: &[&str] =
  &["sin", "tan", "cot", "csc", "asin", "atan", "sinh", "tanh"];
const EVEN_FUNCTIONS: &[&str] = &["cos", "sec", "cosh", "abs"];

pub fn simplify_function(name: String, args: Vec<Expr>) -> Expr {
  if args.len() != 1 {
    return Expr::FunctionCall { name, args };
  }
  let arg = &args[0];

  if let Expr::Real(x) = arg {
    if let Some(v) = apply_real(&name, *x) {
      return Expr::Real(v);
    }
  }

  let exact = match name.as_str() {
    "sin" | "cos" | "tan" | "cot" | "sec" | "csc" => {
      pi_degrees(arg).and_then(|deg| trig_exact(&name, deg))
    }
    "asin" | "acos" | "atan" => inverse_trig_exact(&name, arg),
    "sinh" | "tanh" if arg.is_zero() => Some(Expr::Integer(0)),
    "cosh" if arg.is_zero() => Some(Expr::Integer(1)),
    "log" => log_exact(arg),
    "abs" => abs_exact(arg),
    _ => None,
  };
  if let Some(value) = exact {
    return value;
  }

  let (negative, positive) = split_sign(arg);
  if negative {
    if ODD_FUNCTIONS.contains(&name.as_str()) {
      let inner = simplify_function(name, vec![positive]);
      return simplify_times(vec![Expr::Integer(-1), inner]);
    }
    if EVEN_FUNCTIONS.contains(&name.as_str()) {
      return simplify_function(name, vec![positive]);
    }
  }
  Expr::FunctionCall { name, args }
}

fn log_exact(arg: &Expr) -> Option<Expr> {
  match arg {
    Expr::Integer(1) => Some(Expr::Integer(0)),
    Expr::Constant(Constant::E) => Some(Expr::Integer(1)),
    Expr::Power(b, e) if matches!(b.as_ref(), Expr::Constant(Constant::E)) => {
      Some(e.as_ref().clone())
    }
    _ => None,
  }
}

fn abs_exact(arg: &Expr) -> Option<Expr> {
  if let Some(n) = arg.as_number() {
    return Some(n.abs().to_expr());
  }
  match arg {
    Expr::Constant(Constant::Pi) | Expr::Constant(Constant::E) => {
      Some(arg.clone())
    }
    Expr::Power(b, _) if matches!(b.as_ref(), Expr::Constant(Constant::E)) => {
      Some(arg.clone())
    }
    _ => None,
  }
}

/// Degrees represented by `arg` when it is a rational multiple of pi that
/// lands on a whole degree, reduced into [0, 360).
fn pi_degrees(arg: &Expr) -> Option<i128> {
  let ratio = match arg {
    Expr::Constant(Constant::Pi) => Number::ONE,
    Expr::Integer(0) => Number::ZERO,
    Expr::Times(factors)
      if factors.len() == 2
        && matches!(factors[1], Expr::Constant(Constant::Pi)) =>
    {
      factors[0].as_number()?
    }
    _ => return None,
  };
  match ratio {
    Number::Rational(n, d) => {
      let scaled = n.checked_mul(180)?;
      if scaled % d != 0 {
        return None;
      }
      Some((scaled / d).rem_euclid(360))
    }
    Number::Real(_) => None,
  }
}

fn half_sqrt(n: i128) -> Expr {
  simplify_times(vec![Expr::Rational(1, 2), Expr::sqrt(Expr::Integer(n))])
}

fn sin_degrees(deg: i128) -> Option<Expr> {
  let (negative, reference) = match deg {
    0..=90 => (false, deg),
    91..=180 => (false, 180 - deg),
    181..=270 => (true, deg - 180),
    _ => (true, 360 - deg),
  };
  let value = match reference {
    0 => Expr::Integer(0),
    30 => Expr::Rational(1, 2),
    45 => half_sqrt(2),
    60 => half_sqrt(3),
    90 => Expr::Integer(1),
    _ => return None,
  };
  Some(if negative {
    simplify_times(vec![Expr::Integer(-1), value])
  } else {
    value
  })
}

fn exact_ratio(num: Expr, den: Expr) -> Option<Expr> {
  if den.is_zero() {
    return None;
  }
  Some(simplify_times(vec![
    num,
    simplify_power(den, Expr::Integer(-1)),
  ]))
}

fn trig_exact(name: &str, deg: i128) -> Option<Expr> {
  let sin = || sin_degrees(deg);
  let cos = || sin_degrees((deg + 90).rem_euclid(360));
  match name {
    "sin" => sin(),
    "cos" => cos(),
    "tan" => exact_ratio(sin()?, cos()?),
    "cot" => exact_ratio(cos()?, sin()?),
    "sec" => exact_ratio(Expr::Integer(1), cos()?),
    "csc" => exact_ratio(Expr::Integer(1), sin()?),
    _ => None,
  }
}

fn pi_times(n: i128, d: i128) -> Expr {
  match Number::ratio(n, d) {
    Some(r) => simplify_times(vec![r.to_expr(), Expr::Constant(Constant::Pi)]),
    None => Expr::Constant(Constant::Pi),
  }
}

fn inverse_trig_exact(name: &str, arg: &Expr) -> Option<Expr> {
  let half = Expr::Rational(1, 2);
  let sqrt2_2 = half_sqrt(2);
  let sqrt3_2 = half_sqrt(3);
  let sqrt3 = Expr::sqrt(Expr::Integer(3));
  let sqrt3_3 = simplify_power(Expr::Integer(3), Expr::Rational(-1, 2));
  match name {
    "asin" => {
      if arg.is_zero() {
        Some(Expr::Integer(0))
      } else if *arg == half {
        Some(pi_times(1, 6))
      } else if *arg == sqrt2_2 {
        Some(pi_times(1, 4))
      } else if *arg == sqrt3_2 {
        Some(pi_times(1, 3))
      } else if arg.is_one() {
        Some(pi_times(1, 2))
      } else {
        None
      }
    }
    "acos" => {
      let (negative, positive) = split_sign(arg);
      let base = if positive.is_zero() {
        Some((1, 2))
      } else if positive == half {
        Some((1, 3))
      } else if positive == sqrt2_2 {
        Some((1, 4))
      } else if positive == sqrt3_2 {
        Some((1, 6))
      } else if positive.is_one() {
        Some((0, 1))
      } else {
        None
      }?;
      // acos(-a) = pi - acos(a)
      Some(if negative {
        pi_times(base.1 - base.0, base.1)
      } else {
        pi_times(base.0, base.1)
      })
    }
    "atan" => {
      if arg.is_zero() {
        Some(Expr::Integer(0))
      } else if arg.is_one() {
        Some(pi_times(1, 4))
      } else if *arg == sqrt3 {
        Some(pi_times(1, 3))
      } else if *arg == sqrt3_3 {
        Some(pi_times(1, 6))
      } else {
        None
      }
    }
    _ => None,
  }
}

// ─── Ordering ───────────────────────────────────────────────────────

fn factor_class(f: &Expr) -> u8 {
  match f {
    _ if f.is_number() => 0,
    Expr::Power(b, _) if b.is_number() => 1,
    Expr::Constant(Constant::I) => 3,
    Expr::Power(b, _) if matches!(b.as_ref(), Expr::Constant(Constant::E)) => 5,
    Expr::Constant(_) => 2,
    Expr::Identifier(_) => 4,
    Expr::Power(b, _) if matches!(b.as_ref(), Expr::Identifier(_)) => 4,
    Expr::FunctionCall { .. } => 5,
    Expr::Power(b, _) if matches!(b.as_ref(), Expr::FunctionCall { .. }) => 5,
    Expr::Plus(_) => 6,
    Expr::Power(b, _) if matches!(b.as_ref(), Expr::Plus(_)) => 6,
    _ => 7,
  }
}

fn times_order(a: &Expr, b: &Expr) -> Ordering {
  let key = |f: &Expr| {
    let (base, exp) = split_power(f);
    (factor_class(f), expr_to_string(&base), expr_to_string(&exp))
  };
  key(a).cmp(&key(b))
}

/// Exponents of plain symbols in a term: `3*x^2*y` -> {x: 2, y: 1}.
fn monomial(term: &Expr) -> BTreeMap<String, i128> {
  let (_, rest) = split_coefficient(term);
  let factors = match rest {
    Expr::Times(fs) => fs,
    other => vec![other],
  };
  let mut out = BTreeMap::new();
  for f in factors {
    match f {
      Expr::Identifier(name) => *out.entry(name).or_insert(0) += 1,
      Expr::Power(b, e) => {
        if let (Expr::Identifier(name), Some(k)) =
          (b.as_ref(), e.as_number().and_then(|n| n.as_integer()))
        {
          *out.entry(name.clone()).or_insert(0) += k;
        }
      }
      _ => {}
    }
  }
  out
}

fn has_imaginary(expr: &Expr) -> bool {
  match expr {
    Expr::Constant(Constant::I) => true,
    Expr::Plus(items) | Expr::Times(items) | Expr::List(items) => {
      items.iter().any(has_imaginary)
    }
    Expr::Power(b, e) => has_imaginary(b) || has_imaginary(e),
    Expr::FunctionCall { args, .. } => args.iter().any(has_imaginary),
    _ => false,
  }
}

/// Symbolic terms, then real constants, then numbers, then imaginary parts:
/// `x^2 + sqrt(2) + 1`, `-1 + 2*I`.
fn plus_class(term: &Expr) -> u8 {
  if term.is_number() {
    2
  } else if !term.free_symbols().is_empty() {
    0
  } else if has_imaginary(term) {
    3
  } else {
    1
  }
}

/// Polynomial-style ordering: higher total degree first, then by variable,
/// numbers last.
pub fn plus_order(a: &Expr, b: &Expr) -> Ordering {
  let class = plus_class(a).cmp(&plus_class(b));
  if class != Ordering::Equal {
    return class;
  }
  let (ma, mb) = (monomial(a), monomial(b));
  let degree = |m: &BTreeMap<String, i128>| m.values().sum::<i128>();
  let by_degree = degree(&mb).cmp(&degree(&ma));
  if by_degree != Ordering::Equal {
    return by_degree;
  }
  let vars: BTreeSet<&String> = ma.keys().chain(mb.keys()).collect();
  for v in vars {
    let ea = ma.get(v).copied().unwrap_or(0);
    let eb = mb.get(v).copied().unwrap_or(0);
    if ea != eb {
      return eb.cmp(&ea);
    }
  }
  let (_, ra) = split_coefficient(a);
  let (_, rb) = split_coefficient(b);
  expr_to_string(&ra)
    .cmp(&expr_to_string(&rb))
    .then_with(|| expr_to_string(a).cmp(&expr_to_string(b)))
}

// ─── Expansion ──────────────────────────────────────────────────────

/// Distributes products over sums and multiplies out small positive
/// integer powers of sums.
pub fn expand(expr: &Expr) -> Expr {
  match expr {
    Expr::Plus(terms) => simplify_plus(terms.iter().map(expand).collect()),
    Expr::Times(factors) => {
      let expanded: Vec<Expr> = factors.iter().map(expand).collect();
      distribute(&expanded).unwrap_or_else(|| simplify_times(expanded))
    }
    Expr::Power(base, exp) => {
      let base = expand(base);
      let exp = expand(exp);
      match (&base, exp.as_number().and_then(|n| n.as_integer())) {
        (Expr::Plus(_), Some(n)) if (2..=MAX_EXPAND_EXPONENT).contains(&n) => {
          let copies = vec![base.clone(); n as usize];
          distribute(&copies).unwrap_or_else(|| simplify_power(base, exp))
        }
        _ => simplify_power(base, exp),
      }
    }
    Expr::FunctionCall { name, args } => {
      simplify_function(name.clone(), args.iter().map(expand).collect())
    }
    Expr::List(items) => Expr::List(items.iter().map(expand).collect()),
    other => simplify(other.clone()),
  }
}

fn distribute(factors: &[Expr]) -> Option<Expr> {
  let mut acc: Vec<Expr> = vec![Expr::Integer(1)];
  for f in factors {
    let terms: Vec<Expr> = match f {
      Expr::Plus(ts) => ts.clone(),
      other => vec![other.clone()],
    };
    if acc.len() * terms.len() > MAX_EXPAND_TERMS {
      return None;
    }
    let mut next = Vec::with_capacity(acc.len() * terms.len());
    for a in &acc {
      for t in &terms {
        let product = simplify_times(vec![a.clone(), t.clone()]);
        match product {
          Expr::Plus(inner) => next.extend(inner),
          other => next.push(other),
        }
      }
    }
    acc = next;
  }
  Some(simplify_plus(acc))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_expression;

  fn simplified(text: &str) -> Expr {
    simplify(parse_expression(text).unwrap())
  }

  #[test]
  fn zero_times_undefined_stays_undefined() {
    assert!(is_undefined(&simplified("0/0")));
    assert!(is_undefined(&simplified("0*log(0)")));
    assert_eq!(simplified("0*x"), Expr::Integer(0));
  }

  #[test]
  fn poles_of_trig_functions() {
    assert!(is_undefined(&simplified("tan(pi/2)")));
    assert!(is_undefined(&simplified("tan(-pi/2)")));
    assert!(is_undefined(&simplified("sec(3*pi/2)")));
    assert!(is_undefined(&simplified("csc(pi)")));
    assert!(!is_undefined(&simplified("tan(pi/4)")));
    assert!(!is_undefined(&simplified("1/x")));
  }

  #[test]
  fn ensure_defined_reports_the_expression() {
    match ensure_defined(&simplified("log(0)")) {
      Err(TutorError::EvaluationError(message)) => {
        assert!(message.contains("log(0)"), "{message}")
      }
      other => panic!("expected an error, got {other:?}"),
    }
    assert!(ensure_defined(&simplified("log(1)")).is_ok());
  }

  #[test]
  fn exact_trig_values() {
    assert_eq!(simplified("sin(pi/6)"), Expr::Rational(1, 2));
    assert_eq!(simplified("cos(pi)"), Expr::Integer(-1));
    let tan = crate::functions::evaluate::to_f64(&simplified("tan(pi/4)"));
    assert!(tan.is_some_and(|v| (v - 1.0).abs() < 1e-12));
  }

  #[test]
  fn expansion_distributes_powers() {
    let e = expand(&simplified("(x + 1)^2"));
    assert_eq!(expr_to_string(&e), "x^2 + 2*x + 1");
  }
}
