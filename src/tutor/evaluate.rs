use crate::classify::{Intent, Query};
use crate::functions::evaluate::to_f64;
use crate::functions::numeric::format_real;
use crate::functions::polynomial::as_numer_denom;
use crate::functions::simplify::{ensure_defined, simplify, simplify_full};
use crate::parse_expression;
use crate::syntax::{expr_to_latex, expr_to_string, Expr};
use crate::tutor::{fraction, phrases, Solution, Steps};
use crate::TutorError;

pub(super) fn solve(
  query: &Query,
  mut steps: Steps,
) -> Result<Solution, TutorError> {
  let expr = parse_expression(&query.expression)?;

  let canonical = simplify(expr.clone());
  ensure_defined(&canonical)?;

  // A variable in a denominator makes this a rational function.
  let (_, den) = as_numer_denom(&canonical);
  if !den.free_symbols().is_empty() {
    return fraction::explain(query, expr, steps);
  }

  steps.push(phrases::SIMPLIFY_INTRO);
  let simplified = simplify_full(expr.clone());
  let before = expr_to_string(&expr);
  let after = expr_to_string(&simplified);
  if before != after {
    steps.push(phrases::simplified(&before, &after));
  }

  if !simplified.free_symbols().is_empty() {
    steps.explain(phrases::REAL_FUNCTION);
    steps.push(phrases::final_value(&after));
    let latex = expr_to_latex(&simplified);
    return Ok(steps.finish(Intent::Evaluate, after, latex));
  }

  let (result, latex) = match (&simplified, to_f64(&simplified)) {
    (Expr::Integer(_), _) | (_, None) => (after, expr_to_latex(&simplified)),
    (_, Some(value)) => {
      let text = format_real(value);
      (text.clone(), text)
    }
  };
  steps.push(phrases::final_value(&result));
  Ok(steps.finish(Intent::Evaluate, result, latex))
}
