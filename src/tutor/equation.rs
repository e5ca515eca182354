use std::collections::BTreeMap;

use crate::classify::{Intent, Query};
use crate::functions::evaluate::to_f64;
use crate::functions::solve::{
  solve_equation, solve_system, EquationKind, SystemOutcome,
};
use crate::parse_expression;
use crate::syntax::{expr_to_latex, expr_to_string, Expr};
use crate::tutor::{phrases, resolve_var, Solution, Steps};
use crate::TutorError;

/// Splits `a = b; c = d` (or `a = b, c = d`) into sides. A part without
/// `=` means `part = 0`.
fn split_equations(text: &str) -> Result<Vec<(Expr, Expr)>, TutorError> {
  let mut parts: Vec<&str> = text
    .split(';')
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .collect();
  if parts.len() == 1 && parts[0].matches('=').count() > 1 {
    parts = parts[0]
      .split(',')
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .collect();
  }
  parts
    .into_iter()
    .map(|part| {
      let sides: Vec<&str> = part.split('=').map(str::trim).collect();
      match sides.as_slice() {
        [expr] => Ok((parse_expression(expr)?, Expr::Integer(0))),
        [lhs, rhs] if !lhs.is_empty() && !rhs.is_empty() => {
          Ok((parse_expression(lhs)?, parse_expression(rhs)?))
        }
        _ => Err(TutorError::InvalidEquation),
      }
    })
    .collect()
}

fn assignment(var: &str, value: &Expr) -> String {
  format!("{var} = {}", expr_to_string(value))
}

fn as_map(pairs: &[(String, Expr)]) -> BTreeMap<String, String> {
  pairs
    .iter()
    .map(|(var, value)| (var.clone(), expr_to_string(value)))
    .collect()
}

pub(super) fn solve(
  query: &Query,
  mut steps: Steps,
) -> Result<Solution, TutorError> {
  let equations = split_equations(&query.expression)?;
  if equations.iter().any(|(l, r)| l.contains_list() || r.contains_list()) {
    return Err(TutorError::InvalidEquation);
  }

  steps.push(phrases::MOVE_TERMS);
  for (i, (lhs, rhs)) in equations.iter().enumerate() {
    steps.push(phrases::equation_line(
      i + 1,
      &expr_to_string(lhs),
      &expr_to_string(rhs),
    ));
  }

  match equations.as_slice() {
    [(lhs, rhs)] => single(query, lhs, rhs, steps),
    _ => system(&equations, steps),
  }
}

fn single(
  query: &Query,
  lhs: &Expr,
  rhs: &Expr,
  mut steps: Steps,
) -> Result<Solution, TutorError> {
  let var = resolve_var(query, &[lhs, rhs]);
  let solution = solve_equation(lhs, rhs, &var)?;

  steps.push(phrases::standard_form(&expr_to_string(&solution.standard_form)));
  if let Some(den) = &solution.denominator {
    steps.explain(phrases::rational_equation(&expr_to_string(den)));
  }

  match &solution.kind {
    EquationKind::Identity => {
      steps.push(phrases::IDENTITY);
      let result = format!("{var} ∈ ℝ");
      let latex = format!("{var} \\in \\mathbb{{R}}");
      return Ok(steps.finish(Intent::Solve, result, latex));
    }
    EquationKind::Linear { a, .. } => {
      steps.explain(phrases::linear(&var, &expr_to_string(a)));
    }
    EquationKind::Quadratic {
      a,
      b,
      c,
      discriminant,
    } => {
      steps.explain(phrases::quadratic(
        &expr_to_string(a),
        &expr_to_string(b),
        &expr_to_string(c),
      ));
      steps.push(phrases::discriminant(&expr_to_string(discriminant)));
      if to_f64(discriminant).is_some_and(|d| d < 0.0) {
        steps.explain(phrases::NEGATIVE_DISCRIMINANT);
      }
      steps.explain(phrases::QUADRATIC_FORMULA);
    }
    EquationKind::Polynomial { degree } => {
      steps.explain(phrases::polynomial(*degree));
    }
    EquationKind::Inverse { function } => {
      steps.explain(phrases::inverse_function(function));
    }
    EquationKind::Numeric => steps.push(phrases::NUMERIC_SCAN),
  }

  if !solution.excluded.is_empty() {
    let excluded: Vec<String> =
      solution.excluded.iter().map(expr_to_string).collect();
    steps.push(phrases::rejected(&excluded));
  }

  for root in &solution.roots {
    let mut line = phrases::we_get(&var, &expr_to_string(&root.value));
    if root.multiplicity > 1 {
      line.push_str(&phrases::repeated_root(root.multiplicity));
    }
    if root.approximate {
      line.push_str(phrases::APPROXIMATE_ROOT);
    }
    steps.push(line);
  }

  let result = solution
    .roots
    .iter()
    .map(|root| assignment(&var, &root.value))
    .collect::<Vec<_>>()
    .join(", ");
  let latex = solution
    .roots
    .iter()
    .map(|root| format!("{var} = {}", expr_to_latex(&root.value)))
    .collect::<Vec<_>>()
    .join(",\\quad ");
  let maps = solution
    .roots
    .iter()
    .map(|root| as_map(&[(var.clone(), root.value.clone())]))
    .collect();

  let mut out = steps.finish(Intent::Solve, result, latex);
  out.solutions = Some(maps);
  Ok(out)
}

fn system(
  equations: &[(Expr, Expr)],
  mut steps: Steps,
) -> Result<Solution, TutorError> {
  let solution = solve_system(equations)?;
  steps.push(phrases::SYSTEM_METHOD);

  if let Some(augmented) = &solution.augmented {
    steps.push(phrases::augmented(&expr_to_string(&augmented.to_expr())));
    for step in &solution.steps {
      steps.push(phrases::row_step(step));
    }
  }
  if let Some((var, expr)) = &solution.substitution {
    steps.push(phrases::substituted(var, &expr_to_string(expr)));
  }

  let (result, latex, maps) = match &solution.outcome {
    SystemOutcome::Unique(pairs) => {
      for (var, value) in pairs {
        steps.push(phrases::we_get(var, &expr_to_string(value)));
      }
      (
        joined(pairs, ", "),
        joined_latex(pairs),
        vec![as_map(pairs)],
      )
    }
    SystemOutcome::Infinite { assignments, free } => {
      steps.push(phrases::free_variables(free));
      for (var, value) in assignments {
        steps.push(phrases::we_get(var, &expr_to_string(value)));
      }
      (
        joined(assignments, ", "),
        joined_latex(assignments),
        vec![as_map(assignments)],
      )
    }
    SystemOutcome::Many(all) => {
      let mut texts = Vec::new();
      for (i, pairs) in all.iter().enumerate() {
        let text = phrases::numbered_solution(i + 1, &joined(pairs, ", "));
        steps.push(text.clone());
        texts.push(text);
      }
      let latex = all
        .iter()
        .map(|pairs| joined_latex(pairs))
        .collect::<Vec<_>>()
        .join(";\\quad ");
      (texts.join("; "), latex, all.iter().map(|p| as_map(p)).collect())
    }
  };

  let mut out = steps.finish(Intent::Solve, result, latex);
  out.solutions = Some(maps);
  Ok(out)
}

fn joined(pairs: &[(String, Expr)], sep: &str) -> String {
  pairs
    .iter()
    .map(|(var, value)| assignment(var, value))
    .collect::<Vec<_>>()
    .join(sep)
}

fn joined_latex(pairs: &[(String, Expr)]) -> String {
  pairs
    .iter()
    .map(|(var, value)| format!("{var} = {}", expr_to_latex(value)))
    .collect::<Vec<_>>()
    .join(",\\; ")
}
