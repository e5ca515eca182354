//! Symbolic differentiation and integration.

use crate::functions::evaluate::{to_f64, to_f64_with};
use crate::functions::linear_algebra::solve_square;
use crate::functions::numeric::Number;
use crate::functions::polynomial::{as_numer_denom, coefficients, Poly};
use crate::functions::simplify::{
  expand, simplify, simplify_full, simplify_plus, simplify_power,
  simplify_times,
};
use crate::syntax::{is_constant_wrt, Constant, Expr};
use crate::TutorError;

/// Recursion bound for integration strategies that call back into
/// `integrate` (substitution, by parts, expansion).
const MAX_INTEGRATION_DEPTH: u32 = 5;

/// Placeholder symbol used while trying a u-substitution.
const SUBSTITUTION_SYMBOL: &str = "u__";

// ─── Differentiation ────────────────────────────────────────────────

/// Differentiation rules, in the order they are first applied to an
/// expression. Used to explain a derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffRule {
  Constant,
  Sum,
  Product,
  Quotient,
  Power,
  Exponential,
  Chain,
}

/// d/dx of `expr`, simplified.
pub fn differentiate(expr: &Expr, var: &str) -> Result<Expr, TutorError> {
  Ok(simplify_full(derive(expr, var)?))
}

/// Highest derivative order a query may ask for.
pub const MAX_DERIVATIVE_ORDER: u32 = 10;

/// The first `order` derivatives of `expr`, in order. Stops early once a
/// derivative is 0, since every later one is too.
pub fn successive_derivatives(
  expr: &Expr,
  var: &str,
  order: u32,
) -> Result<Vec<Expr>, TutorError> {
  if order > MAX_DERIVATIVE_ORDER {
    return Err(TutorError::Unsupported(format!(
      "مشتقة من الرتبة {order} (الحد الأقصى {MAX_DERIVATIVE_ORDER})"
    )));
  }
  let mut out: Vec<Expr> = Vec::new();
  let mut current = expr.clone();
  for _ in 0..order {
    current = differentiate(&current, var)?;
    let vanished = current.is_zero();
    out.push(current.clone());
    if vanished {
      break;
    }
  }
  Ok(out)
}

fn derive(expr: &Expr, var: &str) -> Result<Expr, TutorError> {
  if is_constant_wrt(expr, var) {
    return Ok(Expr::Integer(0));
  }
  match expr {
    Expr::Identifier(_) => Ok(Expr::Integer(1)),

    // d/dx[a + b] = a' + b'
    Expr::Plus(terms) => Ok(simplify_plus(
      terms
        .iter()
        .map(|t| derive(t, var).map(simplify))
        .collect::<Result<Vec<_>, _>>()?,
    )),

    // d/dx[a * b * c] = a'*b*c + a*b'*c + a*b*c'
    Expr::Times(factors) => {
      let mut terms = Vec::new();
      for (i, f) in factors.iter().enumerate() {
        if is_constant_wrt(f, var) {
          continue;
        }
        let mut product = factors.clone();
        product[i] = derive(f, var)?;
        terms.push(simplify(Expr::Times(product)));
      }
      Ok(simplify_plus(terms))
    }

    Expr::Power(base, exp) => {
      let (b, e) = (base.as_ref(), exp.as_ref());
      if is_constant_wrt(e, var) {
        // n * b^(n-1) * b'
        let lowered = Expr::Plus(vec![e.clone(), Expr::Integer(-1)]);
        Ok(simplify(Expr::Times(vec![
          e.clone(),
          Expr::pow(b.clone(), lowered),
          derive(b, var)?,
        ])))
      } else if is_constant_wrt(b, var) {
        // b^u * log(b) * u'
        Ok(simplify(Expr::Times(vec![
          expr.clone(),
          Expr::func("log", b.clone()),
          derive(e, var)?,
        ])))
      } else {
        // b^e * (e' * log(b) + e * b' / b)
        Ok(simplify(Expr::Times(vec![
          expr.clone(),
          Expr::Plus(vec![
            Expr::Times(vec![derive(e, var)?, Expr::func("log", b.clone())]),
            Expr::Times(vec![e.clone(), derive(b, var)?, Expr::recip(b.clone())]),
          ]),
        ])))
      }
    }

    Expr::FunctionCall { name, args } if args.len() == 1 => {
      let u = &args[0];
      let outer = outer_derivative(name, u)?;
      Ok(simplify(Expr::Times(vec![outer, derive(u, var)?])))
    }

    Expr::FunctionCall { name, .. } => Err(TutorError::Unsupported(format!(
      "اشتقاق الدالة {name}"
    ))),
    _ => Err(TutorError::Unsupported("اشتقاق المصفوفات".to_string())),
  }
}

/// f'(u) for the known elementary functions.
fn outer_derivative(name: &str, u: &Expr) -> Result<Expr, TutorError> {
  let f = |n: &str| Expr::func(n, u.clone());
  let squared = |e: Expr| Expr::pow(e, Expr::Integer(2));
  let one_minus_u2 =
    Expr::Plus(vec![Expr::Integer(1), Expr::neg(squared(u.clone()))]);
  Ok(match name {
    "sin" => f("cos"),
    "cos" => Expr::neg(f("sin")),
    "tan" => Expr::Plus(vec![Expr::Integer(1), squared(f("tan"))]),
    "cot" => Expr::neg(Expr::Plus(vec![Expr::Integer(1), squared(f("cot"))])),
    "sec" => Expr::Times(vec![f("sec"), f("tan")]),
    "csc" => Expr::neg(Expr::Times(vec![f("csc"), f("cot")])),
    "asin" => Expr::pow(one_minus_u2, Expr::Rational(-1, 2)),
    "acos" => Expr::neg(Expr::pow(one_minus_u2, Expr::Rational(-1, 2))),
    "atan" => Expr::recip(Expr::Plus(vec![
      Expr::Integer(1),
      squared(u.clone()),
    ])),
    "sinh" => f("cosh"),
    "cosh" => f("sinh"),
    "tanh" => Expr::Plus(vec![Expr::Integer(1), Expr::neg(squared(f("tanh")))]),
    "log" => Expr::recip(u.clone()),
    "abs" => Expr::div(u.clone(), f("abs")),
    other => {
      return Err(TutorError::Unsupported(format!("اشتقاق الدالة {other}")))
    }
  })
}

/// The rules a derivative of `expr` uses, outermost first, without
/// duplicates.
pub fn rules_used(expr: &Expr, var: &str) -> Vec<DiffRule> {
  let mut rules = Vec::new();
  collect_rules(expr, var, &mut rules);
  rules
}

fn push_rule(rules: &mut Vec<DiffRule>, rule: DiffRule) {
  if !rules.contains(&rule) {
    rules.push(rule);
  }
}

fn is_var(expr: &Expr, var: &str) -> bool {
  matches!(expr, Expr::Identifier(name) if name == var)
}

fn collect_rules(expr: &Expr, var: &str, rules: &mut Vec<DiffRule>) {
  if is_constant_wrt(expr, var) {
    return;
  }
  match expr {
    Expr::Plus(terms) => {
      push_rule(rules, DiffRule::Sum);
      if terms.iter().any(|t| is_constant_wrt(t, var)) {
        push_rule(rules, DiffRule::Constant);
      }
      for t in terms {
        collect_rules(t, var, rules);
      }
    }
    Expr::Times(factors) => {
      let dependent: Vec<&Expr> =
        factors.iter().filter(|f| !is_constant_wrt(f, var)).collect();
      let has_denominator = dependent.iter().any(|f| {
        matches!(f, Expr::Power(_, e) if e.as_number().is_some_and(|n| n.is_negative()))
      });
      if dependent.len() > 1 {
        push_rule(
          rules,
          if has_denominator {
            DiffRule::Quotient
          } else {
            DiffRule::Product
          },
        );
      }
      for f in dependent {
        collect_rules(f, var, rules);
      }
    }
    Expr::Power(base, exp) => {
      if is_constant_wrt(exp, var) {
        push_rule(rules, DiffRule::Power);
        if !is_var(base, var) {
          push_rule(rules, DiffRule::Chain);
        }
        collect_rules(base, var, rules);
      } else {
        push_rule(rules, DiffRule::Exponential);
        if !is_var(exp, var) {
          push_rule(rules, DiffRule::Chain);
        }
        collect_rules(exp, var, rules);
      }
    }
    Expr::FunctionCall { args, .. } => {
      if let Some(u) = args.first() {
        if !is_var(u, var) {
          push_rule(rules, DiffRule::Chain);
        }
        collect_rules(u, var, rules);
      }
    }
    _ => {}
  }
}

// ─── Integration ────────────────────────────────────────────────────

/// How an antiderivative was found; drives the explanation.
#[derive(Debug, Clone, PartialEq)]
pub enum IntegrationMethod {
  Constant,
  PowerRule,
  Table,
  Linearity,
  TrigIdentity,
  Substitution { u: Expr },
  ByParts { u: Expr, dv: Expr },
  PartialFractions { decomposition: Expr },
  Expansion,
}

/// An antiderivative of `expr`, without the constant of integration.
pub fn integrate(expr: &Expr, var: &str) -> Option<Expr> {
  integrate_with_method(expr, var).map(|(e, _)| e)
}

pub fn integrate_with_method(
  expr: &Expr,
  var: &str,
) -> Option<(Expr, IntegrationMethod)> {
  let (result, method) = integrate_rec(&simplify(expr.clone()), var, 0)?;
  Some((simplify_full(result), method))
}

fn integrate_rec(
  expr: &Expr,
  var: &str,
  depth: u32,
) -> Option<(Expr, IntegrationMethod)> {
  if depth > MAX_INTEGRATION_DEPTH {
    return None;
  }
  if is_constant_wrt(expr, var) {
    return Some((
      simplify_times(vec![expr.clone(), Expr::symbol(var)]),
      IntegrationMethod::Constant,
    ));
  }

  match expr {
    Expr::Plus(terms) => {
      let parts = terms
        .iter()
        .map(|t| integrate_rec(t, var, depth).map(|(e, _)| e))
        .collect::<Option<Vec<_>>>()?;
      return Some((simplify_plus(parts), IntegrationMethod::Linearity));
    }
    Expr::Times(factors) => {
      let (constant, dependent): (Vec<Expr>, Vec<Expr>) = factors
        .iter()
        .cloned()
        .partition(|f| is_constant_wrt(f, var));
      if !constant.is_empty() {
        let inner = simplify_times(dependent);
        let (result, method) = integrate_rec(&inner, var, depth)?;
        let mut all = constant;
        all.push(result);
        return Some((simplify_times(all), method));
      }
    }
    _ => {}
  }

  if let Some(found) = table(expr, var) {
    return Some(found);
  }
  if let Some(found) = partial_fractions(expr, var) {
    return Some(found);
  }
  if let Some(found) = substitution(expr, var, depth) {
    return Some(found);
  }
  if let Some(found) = by_parts(expr, var, depth) {
    return Some(found);
  }
  let expanded = expand(expr);
  if expanded != *expr && matches!(expanded, Expr::Plus(_)) {
    let (result, _) = integrate_rec(&expanded, var, depth + 1)?;
    return Some((result, IntegrationMethod::Expansion));
  }
  None
}

/// `(a, b)` when `expr == a*var + b` with `a != 0` constant.
fn linear_parts(expr: &Expr, var: &str) -> Option<(Expr, Expr)> {
  let coeffs = coefficients(expr, var)?;
  if coeffs.len() != 2 || coeffs[1].is_zero() {
    return None;
  }
  Some((coeffs[1].clone(), coeffs[0].clone()))
}

fn over(expr: Expr, a: &Expr) -> Expr {
  simplify(Expr::div(expr, a.clone()))
}

/// Direct antiderivatives: power rule, exponentials and the elementary
/// functions of a linear argument.
fn table(expr: &Expr, var: &str) -> Option<(Expr, IntegrationMethod)> {
  if is_var(expr, var) {
    let x2 = Expr::pow(Expr::symbol(var), Expr::Integer(2));
    return Some((
      simplify(Expr::div(x2, Expr::Integer(2))),
      IntegrationMethod::PowerRule,
    ));
  }

  match expr {
    Expr::Power(base, exp) if is_constant_wrt(exp, var) => {
      if let Some((a, _)) = linear_parts(base, var) {
        // (a*x + b)^n
        if exp.as_number().is_some_and(|n| n == Number::int(-1)) {
          return Some((
            over(Expr::func("log", base.as_ref().clone()), &a),
            IntegrationMethod::PowerRule,
          ));
        }
        let n1 = simplify_plus(vec![exp.as_ref().clone(), Expr::Integer(1)]);
        let raised = Expr::pow(base.as_ref().clone(), n1.clone());
        return Some((
          simplify(Expr::div(raised, Expr::Times(vec![n1, a]))),
          IntegrationMethod::PowerRule,
        ));
      }
      trig_power(base, exp, var)
    }
    Expr::Power(base, exp) if is_constant_wrt(base, var) => {
      // c^(a*x + b)
      let (a, _) = linear_parts(exp, var)?;
      if matches!(base.as_ref(), Expr::Constant(Constant::E)) {
        return Some((over(expr.clone(), &a), IntegrationMethod::Table));
      }
      let denom = Expr::Times(vec![a, Expr::func("log", base.as_ref().clone())]);
      Some((
        simplify(Expr::div(expr.clone(), denom)),
        IntegrationMethod::Table,
      ))
    }
    Expr::FunctionCall { name, args } if args.len() == 1 => {
      let u = &args[0];
      let (a, _) = linear_parts(u, var)?;
      let f = |n: &str| Expr::func(n, u.clone());
      let antiderivative = match name.as_str() {
        "sin" => Expr::neg(f("cos")),
        "cos" => f("sin"),
        "tan" => Expr::neg(Expr::func("log", f("cos"))),
        "cot" => Expr::func("log", f("sin")),
        "sec" => Expr::func("log", Expr::Plus(vec![f("sec"), f("tan")])),
        "csc" => Expr::neg(Expr::func(
          "log",
          Expr::Plus(vec![f("csc"), f("cot")]),
        )),
        "sinh" => f("cosh"),
        "cosh" => f("sinh"),
        "tanh" => Expr::func("log", f("cosh")),
        "log" => Expr::Plus(vec![
          Expr::Times(vec![u.clone(), f("log")]),
          Expr::neg(u.clone()),
        ]),
        "asin" => Expr::Plus(vec![
          Expr::Times(vec![u.clone(), f("asin")]),
          Expr::sqrt(Expr::Plus(vec![
            Expr::Integer(1),
            Expr::neg(Expr::pow(u.clone(), Expr::Integer(2))),
          ])),
        ]),
        "atan" => Expr::Plus(vec![
          Expr::Times(vec![u.clone(), f("atan")]),
          Expr::Times(vec![
            Expr::Rational(-1, 2),
            Expr::func(
              "log",
              Expr::Plus(vec![
                Expr::Integer(1),
                Expr::pow(u.clone(), Expr::Integer(2)),
              ]),
            ),
          ]),
        ]),
        _ => return None,
      };
      Some((over(antiderivative, &a), IntegrationMethod::Table))
    }
    _ => None,
  }
}

/// Squares of trig functions and `1/sqrt(c - k*x^2)`.
fn trig_power(
  base: &Expr,
  exp: &Expr,
  var: &str,
) -> Option<(Expr, IntegrationMethod)> {
  let n = exp.as_number()?;

  // (c - k*x^2)^(-1/2) -> asin(sqrt(k/c)*x)/sqrt(k)
  if n == Number::Rational(-1, 2) {
    let p = Poly::from_expr(base, var)?;
    if p.degree() != Some(2) || !p.coeff(1).is_zero() {
      return None;
    }
    let (c, k) = (p.coeff(0), -p.coeff(2));
    if c.is_negative() || c.is_zero() || k.is_negative() {
      return None;
    }
    let scale = simplify_power(k.checked_div(c)?.to_expr(), Expr::Rational(1, 2));
    let arg = simplify_times(vec![scale, Expr::symbol(var)]);
    return Some((
      simplify(Expr::div(
        Expr::func("asin", arg),
        Expr::sqrt(k.to_expr()),
      )),
      IntegrationMethod::Table,
    ));
  }

  let (name, u) = match base {
    Expr::FunctionCall { name, args } if args.len() == 1 => {
      (name.as_str(), &args[0])
    }
    _ => return None,
  };
  let (a, _) = linear_parts(u, var)?;
  let f = |n: &str| Expr::func(n, u.clone());
  let double = |n: &str| {
    Expr::func(n, simplify_times(vec![Expr::Integer(2), u.clone()]))
  };
  let k = n.as_integer()?;
  let result = match (name, k) {
    // sin^2 u = (1 - cos 2u)/2
    ("sin", 2) => Expr::Plus(vec![
      Expr::div(u.clone(), Expr::Integer(2)),
      Expr::Times(vec![Expr::Rational(-1, 4), double("sin")]),
    ]),
    ("cos", 2) => Expr::Plus(vec![
      Expr::div(u.clone(), Expr::Integer(2)),
      Expr::Times(vec![Expr::Rational(1, 4), double("sin")]),
    ]),
    // tan^2 u = sec^2 u - 1
    ("tan", 2) => Expr::Plus(vec![f("tan"), Expr::neg(u.clone())]),
    ("cot", 2) => Expr::Plus(vec![Expr::neg(f("cot")), Expr::neg(u.clone())]),
    ("sec", 2) | ("cos", -2) => f("tan"),
    ("csc", 2) | ("sin", -2) => Expr::neg(f("cot")),
    _ => return None,
  };
  Some((over(result, &a), IntegrationMethod::TrigIdentity))
}

/// Rational functions of `var`: polynomial division, then partial
/// fractions over the rational roots of the denominator and at most one
/// irreducible quadratic factor.
fn partial_fractions(
  expr: &Expr,
  var: &str,
) -> Option<(Expr, IntegrationMethod)> {
  let (num, den) = as_numer_denom(expr);
  let p = Poly::from_expr(&num, var)?;
  let q = Poly::from_expr(&den, var)?;
  if !p.is_exact() || !q.is_exact() {
    return None;
  }
  let x = Expr::symbol(var);

  // Polynomials integrate term by term.
  if q.degree()? == 0 {
    let scaled = p.scale(q.leading().recip()?);
    let terms = scaled
      .coeffs
      .iter()
      .enumerate()
      .filter(|(_, c)| !c.is_zero())
      .map(|(i, c)| {
        let k = i as i128 + 1;
        simplify_times(vec![
          c.checked_div(Number::int(k)).unwrap_or(*c).to_expr(),
          simplify_power(x.clone(), Expr::Integer(k)),
        ])
      })
      .collect();
    return Some((simplify_plus(terms), IntegrationMethod::PowerRule));
  }

  let (quotient, remainder) = p.div_rem(&q)?;
  let lead = q.leading();
  let q = q.monic();
  let remainder = remainder.scale(lead.recip()?);

  let roots = q.rational_roots();
  let rest = q.deflate(&roots);
  let quadratic = match rest.degree()? {
    0 => None,
    2 => {
      let (c, b) = (rest.coeff(0), rest.coeff(1));
      // 4c - b^2 > 0 keeps the quadratic irreducible over the reals.
      let disc = Number::int(4) * c - b * b;
      if disc.is_negative() || disc.is_zero() {
        return None;
      }
      Some(rest.clone())
    }
    _ => return None,
  };

  // Unknown numerators: A_{i,k}/(x - r_i)^k, then (B*x + C)/quadratic.
  let mut basis: Vec<(Poly, Expr)> = Vec::new();
  for &(r, m) in &roots {
    for k in 1..=m {
      let mut cofactor = q.clone();
      for _ in 0..k {
        cofactor = cofactor.div_rem(&Poly::linear_factor(r))?.0;
      }
      let denom = simplify_power(
        Poly::linear_factor(r).to_expr(var),
        Expr::Integer(k as i128),
      );
      basis.push((cofactor, denom));
    }
  }
  if let Some(quad) = &quadratic {
    let cofactor = q.div_rem(quad)?.0;
    let quad_expr = quad.to_expr(var);
    let x_poly = Poly::new(vec![Number::ZERO, Number::ONE]);
    basis.push((cofactor.mul(&x_poly), quad_expr.clone()));
    basis.push((cofactor, quad_expr));
  }

  let n = q.degree()?;
  if basis.len() != n {
    return None;
  }
  let matrix: Vec<Vec<Number>> = (0..n)
    .map(|row| basis.iter().map(|(c, _)| c.coeff(row)).collect())
    .collect();
  let rhs: Vec<Number> = (0..n).map(|i| remainder.coeff(i)).collect();
  let unknowns = solve_square(matrix, rhs)?;

  let linear_count: usize = roots.iter().map(|&(_, m)| m).sum();
  let mut integrals = Vec::new();
  let mut idx = 0;
  for &(r, m) in &roots {
    let factor = Poly::linear_factor(r).to_expr(var);
    for k in 1..=m {
      let a = unknowns[idx];
      idx += 1;
      if a.is_zero() {
        continue;
      }
      if k == 1 {
        integrals.push(simplify_times(vec![
          a.to_expr(),
          Expr::func("log", factor.clone()),
        ]));
      } else {
        // ∫ A/(x-r)^k = -A/((k-1)(x-r)^(k-1))
        let coeff = (-a).checked_div(Number::int(k as i128 - 1))?;
        integrals.push(simplify_times(vec![
          coeff.to_expr(),
          simplify_power(factor.clone(), Expr::Integer(1 - k as i128)),
        ]));
      }
    }
  }

  let mut decomposition: Vec<Expr> = Vec::new();
  if !quotient.is_zero() {
    decomposition.push(quotient.to_expr(var));
  }
  for (i, &a) in unknowns.iter().take(linear_count).enumerate() {
    if !a.is_zero() {
      decomposition.push(simplify(Expr::div(a.to_expr(), basis[i].1.clone())));
    }
  }

  if let Some(quad) = &quadratic {
    let (b_coef, c_coef) = (unknowns[linear_count], unknowns[linear_count + 1]);
    let (p1, p0) = (quad.coeff(1), quad.coeff(0));
    let quad_expr = quad.to_expr(var);
    let numer = Poly::new(vec![c_coef, b_coef]).to_expr(var);
    if !numer.is_zero() {
      decomposition.push(simplify(Expr::div(numer, quad_expr.clone())));
    }
    // (B x + C)/(x^2 + p x + q) = B/2 * (2x + p)/(..) + (C - B p / 2)/(..)
    let half_b = b_coef.checked_div(Number::int(2))?;
    if !half_b.is_zero() {
      integrals.push(simplify_times(vec![
        half_b.to_expr(),
        Expr::func("log", quad_expr.clone()),
      ]));
    }
    let rest_coef = c_coef - half_b * p1;
    if !rest_coef.is_zero() {
      let disc = Number::int(4) * p0 - p1 * p1;
      let root = simplify_power(disc.to_expr(), Expr::Rational(1, 2));
      let arg = simplify(Expr::div(
        Expr::Plus(vec![
          Expr::Times(vec![Expr::Integer(2), x.clone()]),
          p1.to_expr(),
        ]),
        root.clone(),
      ));
      integrals.push(simplify(Expr::Times(vec![
        rest_coef.to_expr(),
        Expr::Integer(2),
        Expr::recip(root),
        Expr::func("atan", arg),
      ])));
    }
  }

  let polynomial_part = partial_fractions(&quotient.to_expr(var), var)
    .map(|(e, _)| e)
    .unwrap_or(Expr::Integer(0));
  integrals.push(polynomial_part);

  let method = if linear_count + usize::from(quadratic.is_some()) > 1
    || !quotient.is_zero()
  {
    IntegrationMethod::PartialFractions {
      decomposition: simplify_plus(decomposition),
    }
  } else {
    IntegrationMethod::Table
  };
  Some((simplify_plus(integrals), method))
}

/// Candidate inner functions `g(x)` for `∫ f(g(x)) g'(x) dx`.
fn substitution_candidates(expr: &Expr, var: &str, out: &mut Vec<Expr>) {
  let mut push = |e: &Expr| {
    if !is_constant_wrt(e, var) && !is_var(e, var) && !out.contains(e) {
      out.push(e.clone());
    }
  };
  match expr {
    Expr::FunctionCall { args, .. } => {
      push(expr);
      for a in args {
        push(a);
      }
    }
    Expr::Power(base, exp) => {
      push(base);
      push(exp);
    }
    _ => {}
  }
  match expr {
    Expr::Plus(items) | Expr::Times(items) => {
      for i in items {
        substitution_candidates(i, var, out);
      }
    }
    Expr::Power(base, exp) => {
      substitution_candidates(base, var, out);
      substitution_candidates(exp, var, out);
    }
    Expr::FunctionCall { args, .. } => {
      for a in args {
        substitution_candidates(a, var, out);
      }
    }
    _ => {}
  }
}

fn substitution(
  expr: &Expr,
  var: &str,
  depth: u32,
) -> Option<(Expr, IntegrationMethod)> {
  let mut candidates = Vec::new();
  substitution_candidates(expr, var, &mut candidates);
  let u = Expr::symbol(SUBSTITUTION_SYMBOL);
  for g in candidates {
    let dg = match differentiate(&g, var) {
      Ok(d) if !d.is_zero() => d,
      _ => continue,
    };
    let ratio = simplify_full(Expr::div(expr.clone(), dg));
    let in_u = simplify(ratio.replace(&g, &u));
    if in_u.contains_symbol(var) {
      continue;
    }
    if let Some((f, _)) = integrate_rec(&in_u, SUBSTITUTION_SYMBOL, depth + 1) {
      let back = simplify(f.substitute(SUBSTITUTION_SYMBOL, &g));
      return Some((back, IntegrationMethod::Substitution { u: g }));
    }
  }
  None
}

fn is_liate_u(f: &Expr, var: &str) -> bool {
  match f {
    Expr::FunctionCall { name, .. } => {
      matches!(name.as_str(), "log" | "asin" | "acos" | "atan")
    }
    _ => Poly::from_expr(f, var).is_some_and(|p| p.degree().unwrap_or(0) > 0),
  }
}

/// ∫ u dv = u v - ∫ v du, choosing u by the LIATE order.
fn by_parts(
  expr: &Expr,
  var: &str,
  depth: u32,
) -> Option<(Expr, IntegrationMethod)> {
  let factors = match expr {
    Expr::Times(fs) => fs.clone(),
    _ => return None,
  };
  let mut order: Vec<usize> = (0..factors.len())
    .filter(|&i| is_liate_u(&factors[i], var))
    .collect();
  // Logarithms and inverse trig first.
  order.sort_by_key(|&i| !matches!(factors[i], Expr::FunctionCall { .. }));

  for i in order {
    let u = factors[i].clone();
    let mut rest = factors.clone();
    rest.remove(i);
    let dv = simplify_times(rest);
    let (v, _) = match integrate_rec(&dv, var, depth + 1) {
      Some(found) => found,
      None => continue,
    };
    let du = match differentiate(&u, var) {
      Ok(d) => d,
      Err(_) => continue,
    };
    let v_du = simplify_full(Expr::Times(vec![v.clone(), du]));
    if let Some((w, _)) = integrate_rec(&v_du, var, depth + 1) {
      let result = simplify(Expr::Plus(vec![
        Expr::Times(vec![u.clone(), v]),
        Expr::neg(w),
      ]));
      return Some((result, IntegrationMethod::ByParts { u, dv }));
    }
  }
  None
}

// ─── Definite integrals ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct DefiniteIntegral {
  /// `None` when the value was found numerically.
  pub antiderivative: Option<Expr>,
  pub method: Option<IntegrationMethod>,
  pub upper_value: Option<Expr>,
  pub lower_value: Option<Expr>,
  pub value: Expr,
}

/// ∫_a^b expr d(var): F(b) - F(a) when an antiderivative exists and is
/// finite at both bounds, otherwise adaptive Simpson.
pub fn definite_integral(
  expr: &Expr,
  var: &str,
  lower: &Expr,
  upper: &Expr,
) -> Result<DefiniteIntegral, TutorError> {
  if let Some((f, method)) = integrate_with_method(expr, var) {
    let at = |bound: &Expr| simplify_full(f.substitute(var, bound));
    let (fb, fa) = (at(upper), at(lower));
    let value = simplify_full(Expr::sub(fb.clone(), fa.clone()));
    let finite = to_f64(&value).is_some();
    let continuous = numeric_value(expr, var, lower, upper).is_some();
    if finite && continuous {
      return Ok(DefiniteIntegral {
        antiderivative: Some(f),
        method: Some(method),
        upper_value: Some(fb),
        lower_value: Some(fa),
        value,
      });
    }
  }
  let value = numeric_value(expr, var, lower, upper).ok_or_else(|| {
    TutorError::EvaluationError(
      "تعذّر حساب التكامل المحدد (قد يكون متباعداً).".to_string(),
    )
  })?;
  Ok(DefiniteIntegral {
    antiderivative: None,
    method: None,
    upper_value: None,
    lower_value: None,
    value: Expr::Real(value),
  })
}

fn numeric_value(expr: &Expr, var: &str, lower: &Expr, upper: &Expr) -> Option<f64> {
  let a = to_f64(lower)?;
  let b = to_f64(upper)?;
  let f = |x: f64| to_f64_with(expr, var, x);
  adaptive_simpson(&f, a, b, 1e-12, 30)
}

/// Adaptive Simpson's quadrature
fn adaptive_simpson(
  f: &dyn Fn(f64) -> Option<f64>,
  a: f64,
  b: f64,
  tol: f64,
  max_depth: u32,
) -> Option<f64> {
  let fa = f(a)?;
  let fb = f(b)?;
  let m = (a + b) / 2.0;
  let fm = f(m)?;
  let whole = (b - a) / 6.0 * (fa + 4.0 * fm + fb);
  adaptive_simpson_rec(f, a, b, tol, whole, [fa, fm, fb], max_depth)
}

fn adaptive_simpson_rec(
  f: &dyn Fn(f64) -> Option<f64>,
  a: f64,
  b: f64,
  tol: f64,
  whole: f64,
  [fa, fm, fb]: [f64; 3],
  depth: u32,
) -> Option<f64> {
  let m = (a + b) / 2.0;
  let fm1 = f((a + m) / 2.0)?;
  let fm2 = f((m + b) / 2.0)?;
  let h = b - a;
  let left = h / 12.0 * (fa + 4.0 * fm1 + fm);
  let right = h / 12.0 * (fm + 4.0 * fm2 + fb);
  let refined = left + right;
  let error = (refined - whole) / 15.0;

  if depth == 0 || error.abs() < tol {
    Some(refined + error)
  } else {
    let l = adaptive_simpson_rec(f, a, m, tol / 2.0, left, [fa, fm1, fm], depth - 1)?;
    let r = adaptive_simpson_rec(f, m, b, tol / 2.0, right, [fm, fm2, fb], depth - 1)?;
    Some(l + r)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_expression;

  fn parsed(text: &str) -> Expr {
    simplify(parse_expression(text).unwrap())
  }

  #[test]
  fn order_cap_is_enforced() {
    let e = parsed("x^2");
    assert!(successive_derivatives(&e, "x", MAX_DERIVATIVE_ORDER).is_ok());
    assert!(matches!(
      successive_derivatives(&e, "x", MAX_DERIVATIVE_ORDER + 1),
      Err(TutorError::Unsupported(_))
    ));
  }

  #[test]
  fn order_zero_is_empty() {
    assert!(successive_derivatives(&parsed("x^2"), "x", 0)
      .unwrap()
      .is_empty());
  }

  #[test]
  fn rules_follow_the_shape() {
    assert_eq!(rules_used(&parsed("x^3"), "x"), vec![DiffRule::Power]);
    assert!(rules_used(&parsed("sin(x)/x"), "x").contains(&DiffRule::Quotient));
    assert!(rules_used(&parsed("x*sin(x)"), "x").contains(&DiffRule::Product));
    assert!(rules_used(&parsed("sin(x^2)"), "x").contains(&DiffRule::Chain));
  }

  #[test]
  fn table_integrals() {
    let (f, method) = integrate_with_method(&parsed("cos(x)"), "x").unwrap();
    assert_eq!(f, Expr::func("sin", Expr::symbol("x")));
    assert_eq!(method, IntegrationMethod::Table);
  }

  #[test]
  fn simpson_matches_a_polynomial() {
    let f = |x: f64| Some(x * x);
    let v = adaptive_simpson(&f, 0.0, 3.0, 1e-12, 30).unwrap();
    assert!((v - 9.0).abs() < 1e-9);
  }
}
