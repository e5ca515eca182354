use mathtutor::normalize::normalize;

use super::*;

fn text(input: &str) -> String {
  normalize(input, AngleUnit::Degrees).unwrap().text
}

#[test]
fn arabic_indic_digits() {
  assert_eq!(text("١٢٣ + ٤٥"), "123 + 45");
  assert_eq!(text("٣٫٥"), "3.5");
}

#[test]
fn unicode_operators() {
  assert_eq!(text("6 ÷ 2 × 3 − 1"), "6 / 2 * 3 - 1");
  assert_eq!(text("x² + √(x)"), "x^2 + sqrt(x)");
}

#[test]
fn arabic_functions_and_variables() {
  assert_eq!(text("جا(س) زائد جتا(ص)"), "sin(x) + cos(y)");
  assert_eq!(text("الجذر التربيعي (16)"), "sqrt (16)");
}

#[test]
fn degree_symbol_is_always_converted() {
  let n = normalize("cos(60°)", AngleUnit::Radians).unwrap();
  assert_eq!(n.text, "cos(pi*60/180)");
  assert!(n.degrees_converted);
}

#[test]
fn radians_keep_bare_arguments() {
  let n = normalize("sin(30)", AngleUnit::Radians).unwrap();
  assert_eq!(n.text, "sin(30)");
  assert!(!n.degrees_converted);
}

#[test]
fn symbolic_arguments_are_untouched() {
  let n = normalize("sin(x)", AngleUnit::Degrees).unwrap();
  assert_eq!(n.text, "sin(x)");
  assert!(!n.degrees_converted);
}

#[test]
fn python_style_power() {
  assert_eq!(text("2**3 ** 2"), "2^3^2");
}

#[test]
fn matrix_braces_become_brackets() {
  assert_eq!(text("{{1, 2}, {3, 4}}"), "[[1, 2], [3, 4]]");
}
