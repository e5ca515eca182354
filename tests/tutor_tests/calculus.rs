use super::*;

mod derivative {
  use super::*;
  use mathtutor::functions::calculus::{differentiate, successive_derivatives};
  use mathtutor::TutorError;
  use mathtutor::parse_expression;

  fn d(expr: &str) -> String {
    differentiate(&parse_expression(expr).unwrap(), "x")
      .unwrap()
      .to_string()
  }

  #[test]
  fn power_rule() {
    assert_eq!(d("x^3"), "3*x^2");
    assert_eq!(d("5"), "0");
  }

  #[test]
  fn elementary_functions() {
    assert_eq!(d("sin(x)"), "cos(x)");
    assert_eq!(d("cos(x)"), "-sin(x)");
  }

  #[test]
  fn higher_order() {
    let e = parse_expression("x^3").unwrap();
    let all: Vec<String> = successive_derivatives(&e, "x", 4)
      .unwrap()
      .iter()
      .map(|d| d.to_string())
      .collect();
    assert_eq!(all, ["3*x^2", "6*x", "6", "0"]);
  }

  #[test]
  fn derivatives_stop_once_zero() {
    let e = parse_expression("x^2").unwrap();
    assert_eq!(successive_derivatives(&e, "x", 9).unwrap().len(), 3);
  }

  #[test]
  fn product_rule() {
    let s = solve("derivative x*sin(x)");
    assert!(s.steps.iter().any(|l| l.contains("الضرب")), "{:?}", s.steps);
  }

  #[test]
  fn quotient_rule_is_explained() {
    let s = solve("derivative sin(x)/x");
    assert!(s.steps.iter().any(|l| l.contains("القسمة")), "{:?}", s.steps);
  }

  #[test]
  fn chain_rule() {
    assert_eq!(d("sin(x^2)"), "2*x*cos(x^2)");
    let s = solve("derivative sin(x^2)");
    assert!(s.steps.iter().any(|l| l.contains("السلسلة")), "{:?}", s.steps);
  }

  #[test]
  fn order_above_the_cap_is_rejected() {
    assert!(matches!(
      solve_query("derivative order 1000000 of x^2", &Options::default()),
      Err(TutorError::Unsupported(_))
    ));
    assert!(matches!(
      solve_query("derivative order 3000000000 of x^2", &Options::default()),
      Err(TutorError::Unsupported(_))
    ));
  }

  #[test]
  fn order_past_a_polynomial_degree_is_zero() {
    let s = solve("derivative order 5 of x^2");
    assert_eq!(s.result, "0");
    assert!(s.steps.len() < 12, "{:?}", s.steps);
  }

  #[test]
  fn arabic_query() {
    let s = solve("مشتقة س^3");
    assert_eq!(s.kind, Intent::Derivative);
    assert_eq!(s.result, "3*x^2");
    assert!(s.steps.iter().any(|l| l.contains("قاعدة القوة")));
  }

  #[test]
  fn second_derivative_query() {
    let s = solve("المشتقة الثانية x^3");
    assert_eq!(s.result, "6*x");
  }

  #[test]
  fn leibniz_notation_names_the_variable() {
    let s = solve("d/dy y^2");
    assert_eq!(s.kind, Intent::Derivative);
    assert_eq!(s.result, "2*y");
  }

  #[test]
  fn brief_mode_drops_rule_explanations() {
    let full = solve("مشتقة x^3 + x^2");
    let short = solve_with("مشتقة x^3 + x^2", brief());
    assert_eq!(full.result, short.result);
    assert!(short.steps.len() < full.steps.len());
  }
}

mod integral {
  use super::*;
  use mathtutor::functions::calculus::{
    definite_integral, differentiate, integrate, integrate_with_method,
    IntegrationMethod,
  };
  use mathtutor::functions::evaluate::{to_f64, to_f64_with};
  use mathtutor::parse_expression;
  use mathtutor::syntax::Expr;

  /// Integrates `text` and checks F' against the integrand at a few points.
  fn antiderivative(text: &str) -> IntegrationMethod {
    let f = parse_expression(text).unwrap();
    let (big_f, method) = integrate_with_method(&f, "x").unwrap();
    let back = differentiate(&big_f, "x").unwrap();
    for x in [1.5, 2.5, 3.7] {
      let want = to_f64_with(&f, "x", x).unwrap();
      let got = to_f64_with(&back, "x", x).unwrap();
      assert!((want - got).abs() < 1e-9, "{text}: {big_f} at {x}");
    }
    method
  }

  #[test]
  fn u_substitution() {
    let method = antiderivative("2*x*cos(x^2)");
    assert!(matches!(method, IntegrationMethod::Substitution { .. }));
  }

  #[test]
  fn by_parts() {
    let method = antiderivative("x*exp(x)");
    assert!(matches!(method, IntegrationMethod::ByParts { .. }));
  }

  #[test]
  fn partial_fractions() {
    let method = antiderivative("1/(x^2 - 1)");
    assert!(matches!(method, IntegrationMethod::PartialFractions { .. }));
  }

  #[test]
  fn simpson_fallback_without_closed_form() {
    let result = definite_integral(
      &parse_expression("exp(-x^2)").unwrap(),
      "x",
      &Expr::Integer(0),
      &Expr::Integer(1),
    )
    .unwrap();
    assert!(result.antiderivative.is_none());
    let value = to_f64(&result.value).unwrap();
    assert!((value - 0.746824132812427).abs() < 1e-8, "{value}");
  }

  #[test]
  fn indefinite_without_closed_form_is_an_error() {
    assert!(solve_query("تكامل exp(-x^2) dx", &Options::default()).is_err());
  }

  #[test]
  fn power_rule() {
    let f = integrate(&parse_expression("x^2").unwrap(), "x").unwrap();
    assert_eq!(f.to_string(), "x^3/3");
  }

  #[test]
  fn definite_by_antiderivative() {
    let result = definite_integral(
      &parse_expression("x^2").unwrap(),
      "x",
      &Expr::Integer(0),
      &Expr::Integer(1),
    )
    .unwrap();
    assert!(result.antiderivative.is_some());
    assert_eq!(result.value.to_string(), "1/3");
  }

  #[test]
  fn indefinite_query_adds_constant() {
    let s = solve("تكامل 2x dx");
    assert_eq!(s.kind, Intent::Integral);
    assert_eq!(s.result, "x^2 + C");
    assert!(s.latex.ends_with("+ C"));
  }

  #[test]
  fn integral_sign_is_understood() {
    let s = solve("∫ sin(x) dx");
    assert_eq!(s.result, "-cos(x) + C");
  }

  #[test]
  fn definite_query_with_arabic_bounds() {
    let s = solve("تكامل x^2 من 0 إلى 1");
    assert_eq!(s.result, "1/3");
    assert!(s.steps.iter().any(|l| l.contains("1/3")));
  }
}
