use super::*;

mod arithmetic {
  use super::*;

  #[test]
  fn integer_result_is_exact() {
    let s = solve("2 + 3*4");
    assert_eq!(s.result, "14");
    assert_eq!(s.kind, Intent::Evaluate);
  }

  #[test]
  fn arabic_digits_and_operators() {
    assert_eq!(solve("٢ × ٣ + ٤").result, "10");
  }

  #[test]
  fn rational_result_is_decimal() {
    assert_eq!(solve("1/2 + 1/4").result, "0.75");
  }

  #[test]
  fn degrees_are_the_default_angle_unit() {
    let s = solve("sin(30)");
    assert_eq!(s.result, "0.5");
    assert!(s.steps.iter().any(|l| l.contains("درجات")), "{:?}", s.steps);
  }

  #[test]
  fn radians_leave_arguments_alone() {
    let options = Options {
      angle_unit: AngleUnit::Radians,
      ..Options::default()
    };
    assert_eq!(solve_with("sin(0)", options).result, "0");
  }

  #[test]
  fn overflowing_integers_become_floats() {
    let s = solve("-170141183460469231731687303715884105727 - 1");
    assert!(s.result.starts_with("-1.7014118346"), "{}", s.result);
  }

  #[test]
  fn last_step_names_the_value() {
    let s = solve("10 - 4");
    assert_eq!(s.result, "6");
    assert!(s.steps.last().is_some_and(|l| l.contains('6')));
  }
}

mod symbolic {
  use super::*;

  #[test]
  fn like_terms_are_collected() {
    assert_eq!(solve("x + x + 3").result, "2*x + 3");
  }

  #[test]
  fn expand_keeps_only_the_expression() {
    let s = solve("expand (x + 1)^2");
    assert_eq!(s.kind, Intent::Evaluate);
    for letter in ['e', 'p', 'a', 'n', 'd'] {
      assert!(!s.result.contains(letter), "{}", s.result);
    }
  }

  #[test]
  fn variable_in_denominator_becomes_a_fraction() {
    let s = solve("(x^2 - 1)/(x - 1)");
    assert_eq!(s.kind, Intent::Fraction);
    assert_eq!(s.result, "x + 1");
  }
}

mod fraction {
  use super::*;

  #[test]
  fn forced_mode_cancels_common_factor() {
    let options = Options {
      mode: Some(Intent::Fraction),
      ..Options::default()
    };
    let s = solve_with("(x^2 - 1)/(x - 1)", options);
    assert_eq!(s.kind, Intent::Fraction);
    assert_eq!(s.result, "x + 1");
    assert!(s.steps.iter().any(|l| l.contains("x - 1")));
  }
}

mod errors {
  use mathtutor::TutorError;

  use super::*;

  #[test]
  fn blank_input() {
    assert!(matches!(
      solve_query("   ", &Options::default()),
      Err(TutorError::EmptyInput)
    ));
  }

  #[test]
  fn command_words_only() {
    assert!(matches!(
      solve_query("احسب", &Options::default()),
      Err(TutorError::EmptyInput)
    ));
  }

  #[test]
  fn garbage_does_not_parse() {
    assert!(solve_query("2 + * )", &Options::default()).is_err());
  }

  fn undefined(text: &str) -> bool {
    matches!(
      solve_query(text, &Options::default()),
      Err(TutorError::EvaluationError(_))
    )
  }

  #[test]
  fn division_by_zero_is_undefined() {
    assert!(undefined("1/0"));
    assert!(undefined("0/0"));
    assert!(undefined("5 + 2/(3 - 3)"));
  }

  #[test]
  fn functions_at_their_poles_are_undefined() {
    assert!(undefined("log(0)"));
    assert!(undefined("tan(90)"));
    assert!(undefined("cot(0)"));
  }

  #[test]
  fn undefined_terms_do_not_cancel() {
    assert!(undefined("1/0 - 1/0"));
    assert!(undefined("0 * log(0)"));
  }
}
