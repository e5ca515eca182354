use crate::classify::{Intent, Query};
use crate::functions::evaluate::to_f64;
use crate::functions::polynomial::{as_numer_denom, cancel, Poly};
use crate::functions::simplify::{ensure_defined, simplify, simplify_full};
use crate::functions::solve::solve_equation;
use crate::parse_expression;
use crate::syntax::{expr_to_latex, expr_to_string, Expr};
use crate::tutor::{phrases, resolve_var, Solution, Steps};
use crate::TutorError;

pub(super) fn solve(
  query: &Query,
  steps: Steps,
) -> Result<Solution, TutorError> {
  let expr = parse_expression(&query.expression)?;
  explain(query, expr, steps)
}

/// Real values of `var` that make `den` vanish.
fn excluded_values(den: &Expr, var: &str) -> Vec<String> {
  match solve_equation(den, &Expr::Integer(0), var) {
    Ok(solution) => solution
      .roots
      .iter()
      .filter(|root| to_f64(&root.value).is_some())
      .map(|root| expr_to_string(&root.value))
      .collect(),
    Err(_) => Vec::new(),
  }
}

pub(super) fn explain(
  query: &Query,
  expr: Expr,
  mut steps: Steps,
) -> Result<Solution, TutorError> {
  let var = resolve_var(query, &[&expr]);
  let canonical = simplify(expr.clone());
  ensure_defined(&canonical)?;
  let (num, den) = as_numer_denom(&canonical);

  steps.explain(phrases::rational_function(&var));
  steps.explain(phrases::DENOMINATOR_NONZERO);
  steps.push(phrases::denominator(&expr_to_string(&den)));

  let excluded = excluded_values(&den, &var);
  if !excluded.is_empty() {
    steps.push(phrases::excluded_values(&var, &excluded));
  }

  if steps.detailed() {
    if let (Some(p), Some(q)) =
      (Poly::from_expr(&num, &var), Poly::from_expr(&den, &var))
    {
      steps.explain(phrases::factored(
        &expr_to_string(&p.factored_expr(&var)),
        &expr_to_string(&q.factored_expr(&var)),
      ));
    }
  }

  let result = simplify_full(expr);
  let text = expr_to_string(&result);
  if cancel(&canonical).is_some() {
    steps.push(phrases::cancelled(&text));
  } else {
    steps.explain(phrases::NOTHING_TO_CANCEL);
  }
  steps.push(phrases::final_value(&text));

  let latex = expr_to_latex(&result);
  Ok(steps.finish(Intent::Fraction, text, latex))
}
