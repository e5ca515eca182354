use mathtutor::{interpret, parse, parse_expression};

#[cfg(test)]
mod tests {
  use mathtutor::syntax::Expr;
  use mathtutor::Rule;

  use super::*;

  #[test]
  fn test_parse_calculation() {
    let pair = parse("1 + 2").unwrap().next().unwrap();
    assert_eq!(pair.as_rule(), Rule::Program);
  }

  #[test]
  fn test_parse_implicit_multiplication() {
    let pair = parse("2x(x + 1)").unwrap().next().unwrap();
    assert_eq!(pair.as_rule(), Rule::Program);
  }

  #[test]
  fn test_parse_function_call() {
    assert!(parse("sin(x) + log(x, 2)").is_ok());
    assert!(parse("sin x").is_ok());
  }

  #[test]
  fn test_parse_matrix() {
    let expr = parse_expression("[[1, 2], [3, 4]]").unwrap();
    assert!(expr.is_matrix());
  }

  #[test]
  fn test_parse_errors() {
    assert!(parse("1 +").is_err());
    assert!(parse("(x").is_err());
    assert!(parse_expression("").is_err());
  }

  #[test]
  fn test_difference_is_not_implicit_product() {
    assert_eq!(interpret("2 - x").unwrap(), "2 - x");
  }

  #[test]
  fn test_integer_literal() {
    assert_eq!(parse_expression("42").unwrap(), Expr::Integer(42));
  }
}

mod interpret_tests {
  use super::*;

  #[test]
  fn arithmetic() {
    assert_eq!(interpret("1 + 2*3").unwrap(), "7");
    assert_eq!(interpret("2^10").unwrap(), "1024");
    assert_eq!(interpret("6/4").unwrap(), "3/2");
  }

  #[test]
  fn collects_like_terms() {
    assert_eq!(interpret("x + 2x").unwrap(), "3*x");
    assert_eq!(interpret("x*x").unwrap(), "x^2");
  }

  #[test]
  fn exact_radicals() {
    assert_eq!(interpret("sqrt(16)").unwrap(), "4");
    assert_eq!(interpret("sqrt(8)").unwrap(), "2*sqrt(2)");
  }

  #[test]
  fn special_values() {
    assert_eq!(interpret("sin(0)").unwrap(), "0");
    assert_eq!(interpret("cos(0)").unwrap(), "1");
  }

  #[test]
  fn zero_denominator_is_an_error() {
    assert!(interpret("0/0").is_err());
    assert!(interpret("x/0").is_err());
    assert_eq!(interpret("0/2").unwrap(), "0");
  }

  #[test]
  fn imaginary_unit() {
    assert_eq!(interpret("I^2").unwrap(), "-1");
    assert_eq!(interpret("I^3").unwrap(), "-I");
    assert_eq!(interpret("I*I + 1").unwrap(), "0");
  }

  #[test]
  fn sum_over_sum_is_parenthesized_once() {
    assert_eq!(interpret("(x + 1)/(x - 1)").unwrap(), "(x + 1)/(x - 1)");
  }

  #[test]
  fn latex_fraction_has_a_bare_sum_numerator() {
    let expr = mathtutor::functions::simplify::simplify(
      parse_expression("(x + 1)/(x - 1)").unwrap(),
    );
    let latex = mathtutor::syntax::expr_to_latex(&expr);
    assert!(latex.starts_with("\\frac{x + 1}"), "{latex}");
  }
}
