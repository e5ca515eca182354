use crate::classify::{Intent, Query};
use crate::functions::calculus::{
  definite_integral, integrate, integrate_with_method, IntegrationMethod,
};
use crate::functions::evaluate::to_f64;
use crate::functions::numeric::format_real;
use crate::functions::simplify::simplify;
use crate::parse_expression;
use crate::syntax::{expr_to_latex, expr_to_string, is_constant_wrt, Expr};
use crate::tutor::{phrases, resolve_var, Solution, Steps};
use crate::TutorError;

fn method_phrase(method: &IntegrationMethod) -> String {
  match method {
    IntegrationMethod::Constant => phrases::CONSTANT_INTEGRAL.to_string(),
    IntegrationMethod::PowerRule => phrases::POWER_RULE_INTEGRAL.to_string(),
    IntegrationMethod::Table => phrases::TABLE.to_string(),
    IntegrationMethod::Linearity => phrases::LINEARITY.to_string(),
    IntegrationMethod::TrigIdentity => phrases::TRIG_IDENTITY.to_string(),
    IntegrationMethod::Substitution { u } => {
      phrases::substitution(&expr_to_string(u))
    }
    IntegrationMethod::ByParts { u, dv } => {
      phrases::by_parts(&expr_to_string(u), &expr_to_string(dv))
    }
    IntegrationMethod::PartialFractions { decomposition } => {
      phrases::partial_fractions(&expr_to_string(decomposition))
    }
    IntegrationMethod::Expansion => phrases::EXPANSION.to_string(),
  }
}

/// Per-term antiderivatives of a sum, for the detailed explanation.
fn explain_terms(steps: &mut Steps, expr: &Expr, var: &str) {
  let Expr::Plus(terms) = simplify(expr.clone()) else {
    return;
  };
  for term in terms {
    if let Some(f) = integrate(&term, var) {
      steps.explain(phrases::term_integral(
        var,
        &expr_to_string(&term),
        &expr_to_string(&f),
      ));
    }
  }
}

fn no_closed_form(expr: &Expr) -> TutorError {
  TutorError::EvaluationError(format!(
    "تعذّر إيجاد تكامل بصيغة مغلقة للدالة {}.",
    expr_to_string(expr)
  ))
}

pub(super) fn solve(
  query: &Query,
  mut steps: Steps,
) -> Result<Solution, TutorError> {
  let expr = parse_expression(&query.expression)?;
  if expr.contains_list() {
    return Err(TutorError::Unsupported("تكامل المصفوفات".to_string()));
  }
  let var = resolve_var(query, &[&expr]);
  steps.push(phrases::integral_intro(&var));

  if let Some((lower, upper)) = &query.bounds {
    return definite(query, &expr, &var, lower, upper, steps);
  }

  let (f, method) =
    integrate_with_method(&expr, &var).ok_or_else(|| no_closed_form(&expr))?;
  if let Expr::Times(factors) = simplify(expr.clone()) {
    let has_function = factors.iter().any(|f| {
      !is_constant_wrt(f, &var) && matches!(f, Expr::FunctionCall { .. })
    });
    if has_function && factors.len() > 1 {
      steps.explain(phrases::SUBSTITUTION_HINT);
    }
  }
  steps.explain(method_phrase(&method));
  if method == IntegrationMethod::Linearity {
    explain_terms(&mut steps, &expr, &var);
  }

  let f_text = expr_to_string(&f);
  steps.push(phrases::antiderivative(&var, &expr_to_string(&expr), &f_text));
  steps.explain(phrases::CONSTANT_NOTE);

  let result = format!("{f_text} + C");
  let latex = format!("{} + C", expr_to_latex(&f));
  Ok(steps.finish(Intent::Integral, result, latex))
}

fn definite(
  query: &Query,
  expr: &Expr,
  var: &str,
  lower: &str,
  upper: &str,
  mut steps: Steps,
) -> Result<Solution, TutorError> {
  let a = parse_expression(lower)?;
  let b = parse_expression(upper)?;
  steps.push(phrases::definite_setup(
    var,
    &expr_to_string(expr),
    &expr_to_string(&a),
    &expr_to_string(&b),
  ));

  let integral = definite_integral(expr, var, &a, &b)?;
  match (
    &integral.antiderivative,
    &integral.upper_value,
    &integral.lower_value,
  ) {
    (Some(f), Some(fb), Some(fa)) => {
      if let Some(method) = &integral.method {
        steps.explain(method_phrase(method));
      }
      steps.push(phrases::primitive(var, &expr_to_string(f)));
      steps.push(phrases::fundamental_theorem(
        &expr_to_string(&a),
        &expr_to_string(&b),
        &expr_to_string(fb),
        &expr_to_string(fa),
      ));
    }
    _ => steps.push(phrases::NUMERIC_INTEGRAL),
  }

  let value = &integral.value;
  let text = expr_to_string(value);
  steps.push(phrases::definite_value(&text));
  if !value.is_number() {
    if let Some(v) = to_f64(value) {
      steps.push(phrases::approximate_value(&format_real(v)));
    }
  }
  tracing::debug!(query = %query.expression, value = %text, "definite integral");

  let latex = expr_to_latex(value);
  Ok(steps.finish(Intent::Integral, text, latex))
}
