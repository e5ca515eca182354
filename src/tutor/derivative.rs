use crate::classify::{Intent, Query};
use crate::functions::calculus::{
  differentiate, rules_used, successive_derivatives, DiffRule,
};
use crate::functions::simplify::simplify;
use crate::parse_expression;
use crate::syntax::{expr_to_latex, expr_to_string, is_constant_wrt, Expr};
use crate::tutor::{phrases, resolve_var, Solution, Steps};
use crate::TutorError;

fn rule_phrase(rule: DiffRule) -> &'static str {
  match rule {
    DiffRule::Constant => phrases::CONSTANT_RULE,
    DiffRule::Sum => phrases::SUM_RULE,
    DiffRule::Product => phrases::PRODUCT_RULE,
    DiffRule::Quotient => phrases::QUOTIENT_RULE,
    DiffRule::Power => phrases::POWER_RULE,
    DiffRule::Exponential => phrases::EXPONENTIAL_RULE,
    DiffRule::Chain => phrases::CHAIN_RULE,
  }
}

pub(super) fn solve(
  query: &Query,
  mut steps: Steps,
) -> Result<Solution, TutorError> {
  let expr = parse_expression(&query.expression)?;
  if expr.contains_list() {
    return Err(TutorError::Unsupported("اشتقاق المصفوفات".to_string()));
  }
  let var = resolve_var(query, &[&expr]);
  let canonical = simplify(expr.clone());

  steps.push(phrases::derivative_intro(&var));
  if is_constant_wrt(&canonical, &var) {
    steps.explain(phrases::CONSTANT_RULE);
  }
  for rule in rules_used(&canonical, &var) {
    steps.explain(rule_phrase(rule));
  }

  // Term by term for sums.
  if let (true, Expr::Plus(terms)) = (steps.detailed(), &canonical) {
    for term in terms.iter().filter(|t| !is_constant_wrt(t, &var)) {
      let d = differentiate(term, &var)?;
      steps.explain(phrases::term_derivative(
        &var,
        &expr_to_string(term),
        &expr_to_string(&d),
      ));
    }
  }

  let order = query.order.max(1);
  let derivatives = successive_derivatives(&expr, &var, order)?;
  let Some((d, higher)) = derivatives.split_first() else {
    return Err(TutorError::EvaluationError(
      "تعذّر حساب المشتقة.".to_string(),
    ));
  };
  steps.push(phrases::derivative_result(
    &var,
    &expr_to_string(&expr),
    &expr_to_string(d),
  ));
  for (i, next) in higher.iter().enumerate() {
    steps.push(phrases::nth_derivative(i as u32 + 2, &expr_to_string(next)));
  }
  let reached = derivatives.len() as u32;
  if reached < order {
    steps.push(phrases::vanishing_derivatives(reached, order));
  }
  let d = derivatives.last().unwrap_or(d);

  let result = expr_to_string(d);
  let latex = expr_to_latex(d);
  Ok(steps.finish(Intent::Derivative, result, latex))
}
