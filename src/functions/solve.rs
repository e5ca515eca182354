//! Equation and system solving.

use crate::functions::evaluate::{to_complex, to_f64, to_f64_with};
use crate::functions::linear_algebra::{Matrix, RowStep};
use crate::functions::numeric::Number;
use crate::functions::polynomial::{as_numer_denom, coefficients, Poly};
use crate::functions::simplify::{
  expand, simplify, simplify_full, simplify_plus, simplify_power,
  simplify_times,
};
use crate::syntax::{is_constant_wrt, Constant, Expr};
use crate::TutorError;

/// Interval and step of the numeric root scan.
const SCAN_RANGE: (f64, f64) = (-100.0, 100.0);
const SCAN_STEP: f64 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct Root {
  pub value: Expr,
  pub multiplicity: usize,
  /// Found numerically rather than in closed form.
  pub approximate: bool,
}

impl Root {
  fn exact(value: Expr) -> Self {
    Root {
      value,
      multiplicity: 1,
      approximate: false,
    }
  }
}

/// Which method produced the roots of a single equation.
#[derive(Debug, Clone, PartialEq)]
pub enum EquationKind {
  /// Holds for every value of the variable.
  Identity,
  Linear { a: Expr, b: Expr },
  Quadratic { a: Expr, b: Expr, c: Expr, discriminant: Expr },
  Polynomial { degree: usize },
  /// Solved by applying the inverse of `function` to both sides.
  Inverse { function: String },
  Numeric,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquationSolution {
  pub var: String,
  /// The equation moved to one side, `standard_form = 0`.
  pub standard_form: Expr,
  /// Denominator of a rational equation, if any.
  pub denominator: Option<Expr>,
  pub kind: EquationKind,
  pub roots: Vec<Root>,
  /// Candidate roots rejected because they make a denominator zero.
  pub excluded: Vec<Expr>,
}

// ─── Polynomial roots ───────────────────────────────────────────────

/// `(discriminant, roots)` of `a x^2 + b x + c`; roots may be symbolic or
/// complex.
pub fn quadratic_roots(a: &Expr, b: &Expr, c: &Expr) -> (Expr, Vec<Root>) {
  let discriminant = simplify_full(Expr::Plus(vec![
    Expr::pow(b.clone(), Expr::Integer(2)),
    Expr::Times(vec![Expr::Integer(-4), a.clone(), c.clone()]),
  ]));
  let two_a = Expr::Times(vec![Expr::Integer(2), a.clone()]);
  if discriminant.is_zero() {
    let root = simplify_full(Expr::div(Expr::neg(b.clone()), two_a));
    return (
      discriminant,
      vec![Root {
        value: root,
        multiplicity: 2,
        approximate: false,
      }],
    );
  }
  let sq = simplify_power(discriminant.clone(), Expr::Rational(1, 2));
  let root = |sign: i128| {
    simplify_full(Expr::div(
      Expr::Plus(vec![
        Expr::neg(b.clone()),
        Expr::Times(vec![Expr::Integer(sign), sq.clone()]),
      ]),
      two_a.clone(),
    ))
  };
  (
    discriminant,
    vec![Root::exact(root(-1)), Root::exact(root(1))],
  )
}

/// Every root of an exact polynomial: rational roots first, then the
/// quadratic formula or Durand-Kerner on what is left.
pub fn poly_roots(p: &Poly) -> Vec<Root> {
  let rational = p.rational_roots();
  let rest = p.deflate(&rational);
  let mut roots: Vec<Root> = rational
    .iter()
    .map(|&(r, m)| Root {
      value: r.to_expr(),
      multiplicity: m,
      approximate: false,
    })
    .collect();
  match rest.degree() {
    Some(1) => {
      if let Some(r) = (-rest.coeff(0)).checked_div(rest.coeff(1)) {
        roots.push(Root::exact(r.to_expr()));
      }
    }
    Some(2) => {
      let (_, quad) = quadratic_roots(
        &rest.coeff(2).to_expr(),
        &rest.coeff(1).to_expr(),
        &rest.coeff(0).to_expr(),
      );
      roots.extend(quad);
    }
    Some(d) if d > 2 => {
      for (re, im) in rest.numeric_roots() {
        let value = if im == 0.0 {
          Expr::Real(re)
        } else {
          simplify(Expr::Plus(vec![
            Expr::Real(re),
            Expr::Times(vec![Expr::Real(im), Expr::Constant(Constant::I)]),
          ]))
        };
        roots.push(Root {
          value,
          multiplicity: 1,
          approximate: true,
        });
      }
    }
    _ => {}
  }
  sort_roots(&mut roots);
  roots
}

/// Real roots by value, then complex roots by real and imaginary part.
fn sort_roots(roots: &mut [Root]) {
  let key = |r: &Root| match to_complex(&r.value) {
    Some((re, im)) if im == 0.0 => (0, re, 0.0),
    Some((re, im)) => (1, re, im),
    None => (2, 0.0, 0.0),
  };
  roots.sort_by(|a, b| {
    let (ka, kb) = (key(a), key(b));
    ka.0
      .cmp(&kb.0)
      .then(ka.1.total_cmp(&kb.1))
      .then(ka.2.total_cmp(&kb.2))
  });
}

// ─── Single equations ───────────────────────────────────────────────

/// Solves `lhs = rhs` for `var`.
pub fn solve_equation(
  lhs: &Expr,
  rhs: &Expr,
  var: &str,
) -> Result<EquationSolution, TutorError> {
  let canonical = simplify(Expr::sub(lhs.clone(), rhs.clone()));
  let standard_form = simplify_full(canonical.clone());
  let (num, den) = as_numer_denom(&canonical);
  let denominator = (!is_constant_wrt(&den, var)).then(|| den.clone());
  let num = expand(&num);

  let mut solution = EquationSolution {
    var: var.to_string(),
    standard_form: standard_form.clone(),
    denominator: denominator.clone(),
    kind: EquationKind::Numeric,
    roots: Vec::new(),
    excluded: Vec::new(),
  };

  if num.is_zero() {
    solution.kind = EquationKind::Identity;
    return Ok(solution);
  }

  let (kind, roots) = match coefficients(&num, var) {
    Some(coeffs) => polynomial_equation(&coeffs, var)?,
    None => match isolate(&num, var)? {
      Some(found) => found,
      None => (EquationKind::Numeric, numeric_scan(&standard_form, var)),
    },
  };
  solution.kind = kind;

  for root in roots {
    let rejected = denominator.as_ref().is_some_and(|d| {
      let at = simplify_full(d.substitute(var, &root.value));
      at.is_zero() || to_f64(&at).is_some_and(|v| v.abs() < 1e-12)
    });
    if rejected {
      solution.excluded.push(root.value);
    } else if !solution.roots.iter().any(|r| r.value == root.value) {
      solution.roots.push(root);
    }
  }

  if solution.roots.is_empty() {
    return Err(TutorError::NoSolution);
  }
  sort_roots(&mut solution.roots);
  Ok(solution)
}

fn polynomial_equation(
  coeffs: &[Expr],
  var: &str,
) -> Result<(EquationKind, Vec<Root>), TutorError> {
  match coeffs.len() {
    0 | 1 => Err(TutorError::NoSolution),
    2 => {
      let (a, b) = (coeffs[1].clone(), coeffs[0].clone());
      let root = simplify_full(Expr::div(Expr::neg(b.clone()), a.clone()));
      Ok((EquationKind::Linear { a, b }, vec![Root::exact(root)]))
    }
    3 => {
      let (a, b, c) = (&coeffs[2], &coeffs[1], &coeffs[0]);
      let (discriminant, roots) = quadratic_roots(a, b, c);
      Ok((
        EquationKind::Quadratic {
          a: a.clone(),
          b: b.clone(),
          c: c.clone(),
          discriminant,
        },
        roots,
      ))
    }
    n => {
      let numbers = coeffs
        .iter()
        .map(|c| c.as_number())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
          TutorError::Unsupported(format!(
            "معادلة من الدرجة {} بمعاملات رمزية في {var}",
            n - 1
          ))
        })?;
      let p = Poly::new(numbers);
      Ok((EquationKind::Polynomial { degree: n - 1 }, poly_roots(&p)))
    }
  }
}

/// `f(u) = c` with a single var-dependent term: apply the inverse of `f`
/// and solve `u = f^-1(c)`.
fn isolate(
  expr: &Expr,
  var: &str,
) -> Result<Option<(EquationKind, Vec<Root>)>, TutorError> {
  let terms = match expr {
    Expr::Plus(ts) => ts.clone(),
    other => vec![other.clone()],
  };
  let (dependent, constant): (Vec<Expr>, Vec<Expr>) =
    terms.into_iter().partition(|t| !is_constant_wrt(t, var));
  if dependent.len() != 1 {
    return Ok(None);
  }
  // k * f(u) + rest = 0  ->  f(u) = -rest / k
  let (k, inner) = match &dependent[0] {
    Expr::Times(fs) => {
      let (ks, us): (Vec<Expr>, Vec<Expr>) =
        fs.iter().cloned().partition(|f| is_constant_wrt(f, var));
      (simplify_times(ks), simplify_times(us))
    }
    other => (Expr::Integer(1), other.clone()),
  };
  let c = simplify_full(Expr::div(
    Expr::neg(simplify_plus(constant)),
    k,
  ));
  let c_value = to_f64(&c);

  let (function, u, candidates) = match &inner {
    Expr::FunctionCall { name, args } if args.len() == 1 => {
      let u = args[0].clone();
      let inv = |f: &str| simplify(Expr::func(f, c.clone()));
      let out_of_range = |limit: f64| c_value.is_some_and(|v| v.abs() > limit);
      let candidates = match name.as_str() {
        "sin" | "cos" if out_of_range(1.0) => {
          return Err(TutorError::NoSolution)
        }
        "abs" if c_value.is_some_and(|v| v < 0.0) => {
          return Err(TutorError::NoSolution)
        }
        "sin" => {
          let principal = inv("asin");
          vec![
            principal.clone(),
            simplify(Expr::sub(Expr::Constant(Constant::Pi), principal)),
          ]
        }
        "cos" => {
          let principal = inv("acos");
          vec![
            principal.clone(),
            simplify(Expr::sub(
              Expr::Times(vec![Expr::Integer(2), Expr::Constant(Constant::Pi)]),
              principal,
            )),
          ]
        }
        "tan" => vec![inv("atan")],
        "log" => vec![simplify_power(Expr::Constant(Constant::E), c.clone())],
        "abs" => vec![c.clone(), simplify(Expr::neg(c.clone()))],
        _ => return Ok(None),
      };
      (name.clone(), u, candidates)
    }
    Expr::Power(base, exp) if is_constant_wrt(base, var) => {
      if c_value.is_some_and(|v| v <= 0.0) {
        return Err(TutorError::NoSolution);
      }
      let log_c = simplify(Expr::func("log", c.clone()));
      let value = if matches!(base.as_ref(), Expr::Constant(Constant::E)) {
        log_c
      } else if let Some(k) = exact_log(base, &c) {
        Expr::Integer(k)
      } else {
        simplify(Expr::div(log_c, Expr::func("log", base.as_ref().clone())))
      };
      ("exp".to_string(), exp.as_ref().clone(), vec![value])
    }
    Expr::Power(base, exp) if is_constant_wrt(exp, var) => {
      // u^(p/q) = c  ->  u = c^(q/p), real branch only
      let n = exp.as_number().ok_or_else(|| {
        TutorError::Unsupported("أس رمزي في المعادلة".to_string())
      })?;
      if c_value.is_some_and(|v| v < 0.0) {
        return Ok(None);
      }
      let inverse = n.recip().ok_or(TutorError::NoSolution)?;
      let principal = simplify_power(c.clone(), inverse.to_expr());
      // u^(2k) = c has the two real roots ±c^(1/2k)
      let even = n.as_integer().is_some_and(|k| k % 2 == 0);
      let candidates = if even && !principal.is_zero() {
        vec![simplify(Expr::neg(principal.clone())), principal]
      } else {
        vec![principal]
      };
      ("pow".to_string(), base.as_ref().clone(), candidates)
    }
    _ => return Ok(None),
  };

  let mut roots = Vec::new();
  for value in candidates {
    if is_matching_var(&u, var) {
      roots.push(Root::exact(value));
      continue;
    }
    match solve_equation(&u, &value, var) {
      Ok(inner) => roots.extend(inner.roots),
      Err(TutorError::NoSolution) => {}
      Err(e) => return Err(e),
    }
  }
  Ok(Some((EquationKind::Inverse { function }, roots)))
}

/// `k` with `base^k == value` for integer bases: 2^k = 8 -> 3, 2^k = 1/4 -> -2.
fn exact_log(base: &Expr, value: &Expr) -> Option<i128> {
  let b = match base {
    Expr::Integer(b) if *b > 1 => *b,
    _ => return None,
  };
  let (target, sign) = match value.as_number()? {
    Number::Rational(n, 1) => (n, 1),
    Number::Rational(1, d) => (d, -1),
    _ => return None,
  };
  let mut power = 1i128;
  for k in 0..128 {
    if power == target {
      return Some(sign * k);
    }
    power = power.checked_mul(b)?;
  }
  None
}

fn is_matching_var(expr: &Expr, var: &str) -> bool {
  matches!(expr, Expr::Identifier(name) if name == var)
}

/// Sign-change scan with bisection; roots that are really poles are
/// dropped.
fn numeric_scan(expr: &Expr, var: &str) -> Vec<Root> {
  let f = |x: f64| to_f64_with(expr, var, x);
  let mut found: Vec<f64> = Vec::new();
  let steps = ((SCAN_RANGE.1 - SCAN_RANGE.0) / SCAN_STEP) as usize;
  let mut prev: Option<(f64, f64)> = None;
  for i in 0..=steps {
    let x = SCAN_RANGE.0 + i as f64 * SCAN_STEP;
    let fx = f(x);
    if let Some(v) = fx {
      if v == 0.0 {
        found.push(x);
      } else if let Some((px, pv)) = prev {
        if pv.signum() != v.signum() && pv != 0.0 {
          if let Some(root) = bisect(&f, px, x) {
            found.push(root);
          }
        }
      }
    }
    prev = fx.map(|v| (x, v));
  }

  let mut roots: Vec<f64> = Vec::new();
  for r in found {
    let r = if (r - r.round()).abs() < 1e-9 { r.round() } else { r };
    if !roots.iter().any(|&q| (q - r).abs() < 1e-7) {
      roots.push(r);
    }
  }
  roots
    .into_iter()
    .map(|r| Root {
      value: Expr::Real(r),
      multiplicity: 1,
      approximate: true,
    })
    .collect()
}

fn bisect(f: &dyn Fn(f64) -> Option<f64>, mut lo: f64, mut hi: f64) -> Option<f64> {
  let mut flo = f(lo)?;
  for _ in 0..200 {
    let mid = (lo + hi) / 2.0;
    let fm = f(mid)?;
    if fm == 0.0 {
      return Some(mid);
    }
    if fm.signum() == flo.signum() {
      lo = mid;
      flo = fm;
    } else {
      hi = mid;
    }
    if hi - lo < 1e-14 {
      break;
    }
  }
  let mid = (lo + hi) / 2.0;
  f(mid).filter(|v| v.abs() < 1e-6).map(|_| mid)
}

// ─── Systems ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum SystemOutcome {
  /// One value per variable.
  Unique(Vec<(String, Expr)>),
  /// Pivot variables expressed through the free ones.
  Infinite {
    assignments: Vec<(String, Expr)>,
    free: Vec<String>,
  },
  /// Several isolated solutions (nonlinear systems).
  Many(Vec<Vec<(String, Expr)>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemSolution {
  pub vars: Vec<String>,
  /// Augmented matrix `[A | b]` of a linear system.
  pub augmented: Option<Matrix>,
  pub steps: Vec<RowStep>,
  /// How the nonlinear branch eliminated a variable, as `(var, expr)`.
  pub substitution: Option<(String, Expr)>,
  pub outcome: SystemOutcome,
}

/// Variables of a system: the sorted free symbols, `x` when there are none.
pub fn system_vars(equations: &[(Expr, Expr)]) -> Vec<String> {
  let mut vars = std::collections::BTreeSet::new();
  for (l, r) in equations {
    vars.extend(l.free_symbols());
    vars.extend(r.free_symbols());
  }
  if vars.is_empty() {
    vec!["x".to_string()]
  } else {
    vars.into_iter().collect()
  }
}

/// Coefficient rows `(a_1..a_n, b)` of `a·v = b` when every equation is
/// linear with numeric coefficients.
fn linear_rows(
  equations: &[(Expr, Expr)],
  vars: &[String],
) -> Option<Vec<Vec<Number>>> {
  let mut rows = Vec::new();
  for (l, r) in equations {
    let diff = simplify(Expr::sub(l.clone(), r.clone()));
    let mut row = Vec::new();
    let mut rebuilt = Vec::new();
    for v in vars {
      let coeffs = coefficients(&diff, v)?;
      let a = match coeffs.len() {
        1 => Number::ZERO,
        2 => coeffs[1].as_number()?,
        _ => return None,
      };
      rebuilt.push(simplify_times(vec![a.to_expr(), Expr::symbol(v)]));
      row.push(a);
    }
    let zero = Expr::Integer(0);
    let constant = vars
      .iter()
      .fold(diff.clone(), |e, v| e.substitute(v, &zero));
    let c = simplify(constant).as_number()?;
    rebuilt.push(c.to_expr());
    // The split must reproduce the equation exactly.
    if !expand(&simplify(Expr::sub(diff, simplify_plus(rebuilt)))).is_zero() {
      return None;
    }
    row.push(-c);
    rows.push(row);
  }
  Some(rows)
}

/// Solves a system of equations `lhs_i = rhs_i`.
pub fn solve_system(
  equations: &[(Expr, Expr)],
) -> Result<SystemSolution, TutorError> {
  let vars = system_vars(equations);
  if let Some(rows) = linear_rows(equations, &vars) {
    return solve_linear_system(rows, vars);
  }
  solve_by_substitution(equations, vars)
}

fn solve_linear_system(
  rows: Vec<Vec<Number>>,
  vars: Vec<String>,
) -> Result<SystemSolution, TutorError> {
  let n = vars.len();
  let augmented = Matrix::new(rows)?;
  let (reduced, steps, pivots) = augmented.rref_in_columns(n);

  let inconsistent = reduced
    .data
    .iter()
    .any(|r| r[..n].iter().all(|c| c.is_zero()) && !r[n].is_zero());
  if inconsistent {
    return Err(TutorError::NoSolution);
  }

  let free: Vec<String> = (0..n)
    .filter(|c| !pivots.contains(c))
    .map(|c| vars[c].clone())
    .collect();
  let assignments: Vec<(String, Expr)> = pivots
    .iter()
    .enumerate()
    .map(|(row, &col)| {
      let mut terms = vec![reduced.data[row][n].to_expr()];
      for f in (0..n).filter(|c| !pivots.contains(c)) {
        let coeff = reduced.data[row][f];
        if !coeff.is_zero() {
          terms.push(simplify_times(vec![
            (-coeff).to_expr(),
            Expr::symbol(&vars[f]),
          ]));
        }
      }
      (vars[col].clone(), simplify_plus(terms))
    })
    .collect();

  let outcome = if free.is_empty() {
    SystemOutcome::Unique(assignments)
  } else {
    SystemOutcome::Infinite { assignments, free }
  };
  Ok(SystemSolution {
    vars,
    augmented: Some(augmented),
    steps,
    substitution: None,
    outcome,
  })
}

/// Two equations in two unknowns where one equation is linear in one of
/// the variables: solve it for that variable and substitute.
fn solve_by_substitution(
  equations: &[(Expr, Expr)],
  vars: Vec<String>,
) -> Result<SystemSolution, TutorError> {
  if equations.len() != 2 || vars.len() != 2 {
    return Err(TutorError::Unsupported(
      "الأنظمة غير الخطية بأكثر من معادلتين أو متغيرين".to_string(),
    ));
  }
  let diffs: Vec<Expr> = equations
    .iter()
    .map(|(l, r)| simplify(Expr::sub(l.clone(), r.clone())))
    .collect();

  for (i, diff) in diffs.iter().enumerate() {
    for (j, v) in vars.iter().enumerate() {
      let Some(coeffs) = coefficients(diff, v) else {
        continue;
      };
      if coeffs.len() != 2 || coeffs[1].as_number().is_none() {
        continue;
      }
      // v = -c0 / c1
      let v_expr = simplify_full(Expr::div(
        Expr::neg(coeffs[0].clone()),
        coeffs[1].clone(),
      ));
      let other_var = &vars[1 - j];
      let other = diffs[1 - i].substitute(v, &v_expr);
      let reduced = solve_equation(&other, &Expr::Integer(0), other_var)?;
      let mut solutions = Vec::new();
      for root in reduced.roots {
        let v_value = simplify_full(v_expr.substitute(other_var, &root.value));
        let mut assignment = vec![
          (v.clone(), v_value),
          (other_var.clone(), root.value),
        ];
        assignment.sort_by(|a, b| a.0.cmp(&b.0));
        solutions.push(assignment);
      }
      if solutions.is_empty() {
        return Err(TutorError::NoSolution);
      }
      let outcome = if solutions.len() == 1 {
        SystemOutcome::Unique(solutions.remove(0))
      } else {
        SystemOutcome::Many(solutions)
      };
      let substitution = Some((v.clone(), v_expr));
      return Ok(SystemSolution {
        vars,
        augmented: None,
        steps: Vec::new(),
        substitution,
        outcome,
      });
    }
  }
  Err(TutorError::Unsupported(
    "لا توجد معادلة خطية في أحد المتغيرين لإجراء التعويض".to_string(),
  ))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_expression;

  fn roots(lhs: &str, rhs: &str) -> Vec<String> {
    let l = parse_expression(lhs).unwrap();
    let r = parse_expression(rhs).unwrap();
    solve_equation(&l, &r, "x")
      .unwrap()
      .roots
      .iter()
      .map(|r| r.value.to_string())
      .collect()
  }

  #[test]
  fn quadratic_with_rational_roots() {
    assert_eq!(roots("x^2 - 5x + 6", "0"), vec!["2", "3"]);
  }

  #[test]
  fn quadratic_with_complex_roots() {
    assert_eq!(roots("x^2 + 1", "0"), vec!["-I", "I"]);
  }

  #[test]
  fn rational_equation_excludes_pole() {
    let l = parse_expression("(x^2 - 1)/(x - 1)").unwrap();
    let solved = solve_equation(&l, &Expr::Integer(0), "x").unwrap();
    let values: Vec<String> =
      solved.roots.iter().map(|r| r.value.to_string()).collect();
    assert_eq!(values, vec!["-1"]);
  }

  #[test]
  fn cubic_by_rational_roots() {
    assert_eq!(roots("x^3 - 6x^2 + 11x - 6", "0"), vec!["1", "2", "3"]);
  }

  #[test]
  fn no_solution_for_contradiction() {
    let l = parse_expression("x + 1").unwrap();
    let r = parse_expression("x + 2").unwrap();
    assert!(matches!(
      solve_equation(&l, &r, "x"),
      Err(TutorError::NoSolution)
    ));
  }

  #[test]
  fn linear_system_unique() {
    let eqs = vec![
      (parse_expression("x + y").unwrap(), Expr::Integer(10)),
      (parse_expression("2x - y").unwrap(), Expr::Integer(2)),
    ];
    let solved = solve_system(&eqs).unwrap();
    assert_eq!(
      solved.outcome,
      SystemOutcome::Unique(vec![
        ("x".to_string(), Expr::Integer(4)),
        ("y".to_string(), Expr::Integer(6)),
      ])
    );
    assert!(!solved.steps.is_empty());
  }

  #[test]
  fn inconsistent_system() {
    let eqs = vec![
      (parse_expression("x + y").unwrap(), Expr::Integer(1)),
      (parse_expression("x + y").unwrap(), Expr::Integer(2)),
    ];
    assert!(matches!(solve_system(&eqs), Err(TutorError::NoSolution)));
  }

  fn approx(value: &Expr, expected: f64) -> bool {
    to_f64(value).is_some_and(|v| (v - expected).abs() < 1e-6)
  }

  #[test]
  fn exponential_with_an_exact_logarithm() {
    assert_eq!(roots("2^x", "8"), vec!["3"]);
    assert_eq!(roots("2^x", "1/4"), vec!["-2"]);
  }

  #[test]
  fn logarithm_is_inverted() {
    let l = parse_expression("log(x)").unwrap();
    let solved = solve_equation(&l, &Expr::Integer(2), "x").unwrap();
    assert_eq!(solved.roots.len(), 1);
    assert!(approx(&solved.roots[0].value, 2f64.exp()));
    assert!(matches!(solved.kind, EquationKind::Inverse { .. }));
  }

  #[test]
  fn sine_has_two_principal_solutions() {
    let l = parse_expression("sin(x)").unwrap();
    let r = parse_expression("1/2").unwrap();
    let solved = solve_equation(&l, &r, "x").unwrap();
    let pi = std::f64::consts::PI;
    assert_eq!(solved.roots.len(), 2);
    assert!(approx(&solved.roots[0].value, pi / 6.0));
    assert!(approx(&solved.roots[1].value, 5.0 * pi / 6.0));
  }

  #[test]
  fn sine_out_of_range_has_no_solution() {
    let l = parse_expression("sin(x)").unwrap();
    assert!(matches!(
      solve_equation(&l, &Expr::Integer(2), "x"),
      Err(TutorError::NoSolution)
    ));
  }

  #[test]
  fn transcendental_equation_is_scanned() {
    let l = parse_expression("exp(x)").unwrap();
    let r = parse_expression("x + 2").unwrap();
    let solved = solve_equation(&l, &r, "x").unwrap();
    assert_eq!(solved.roots.len(), 2);
    assert!(solved.roots.iter().all(|r| r.approximate));
    assert!(approx(&solved.roots[0].value, -1.84140566043696));
    assert!(approx(&solved.roots[1].value, 1.14619322062058));
  }

  #[test]
  fn nonlinear_system_by_substitution() {
    let eqs = vec![
      (parse_expression("x^2 + y^2").unwrap(), Expr::Integer(25)),
      (parse_expression("x - y").unwrap(), Expr::Integer(1)),
    ];
    let solved = solve_system(&eqs).unwrap();
    let (var, _) = solved.substitution.clone().unwrap();
    assert_eq!(var, "x");
    let pair = |x: i128, y: i128| {
      vec![
        ("x".to_string(), Expr::Integer(x)),
        ("y".to_string(), Expr::Integer(y)),
      ]
    };
    match solved.outcome {
      SystemOutcome::Many(solutions) => {
        assert_eq!(solutions.len(), 2);
        assert!(solutions.contains(&pair(-3, -4)));
        assert!(solutions.contains(&pair(4, 3)));
      }
      other => panic!("expected two solutions, got {other:?}"),
    }
  }
}

