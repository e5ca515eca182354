use mathtutor::classify::{classify, MatrixOp};
use mathtutor::normalize::normalize;

use super::*;

fn query(text: &str) -> mathtutor::classify::Query {
  let normalized = normalize(text, AngleUnit::Degrees).unwrap();
  classify(&normalized.text, None).unwrap()
}

#[test]
fn arabic_equation_after_normalizing() {
  let q = query("حل المعادلة 2س زائد 3 يساوي 7");
  assert_eq!(q.intent, Intent::Solve);
  assert_eq!(q.expression, "2x + 3 = 7");
}

#[test]
fn integral_sign_with_bounds() {
  let q = query("∫ x^2 dx from 1 to 2");
  assert_eq!(q.intent, Intent::Integral);
  assert_eq!(q.expression, "x^2");
  assert_eq!(q.bounds, Some(("1".to_string(), "2".to_string())));
}

#[test]
fn braces_are_a_matrix() {
  let q = query("rank {{1, 2}, {2, 4}}");
  assert_eq!(q.intent, Intent::Matrix);
  assert_eq!(q.matrix_op, MatrixOp::Rank);
  assert_eq!(q.expression, "[[1, 2], [2, 4]]");
}

#[test]
fn plain_arithmetic() {
  let q = query("احسب ٢ + ٣");
  assert_eq!(q.intent, Intent::Evaluate);
  assert_eq!(q.expression, "2 + 3");
}

#[test]
fn forced_mode_from_options() {
  let options = Options {
    mode: Some(Intent::Derivative),
    ..Options::default()
  };
  let s = solve_with("x^2 + 1", options);
  assert_eq!(s.kind, Intent::Derivative);
  assert_eq!(s.result, "2*x");
}
