use super::*;

mod single_equation {
  use super::*;

  #[test]
  fn quadratic_with_two_roots() {
    let s = solve("x^2 - 5x + 6 = 0");
    assert_eq!(s.kind, Intent::Solve);
    assert_eq!(s.result, "x = 2, x = 3");
    let solutions = s.solutions.unwrap();
    assert_eq!(solutions.len(), 2);
    assert_eq!(solutions[0]["x"], "2");
    assert_eq!(solutions[1]["x"], "3");
  }

  #[test]
  fn quadratic_shows_discriminant() {
    let s = solve("x^2 - 5x + 6 = 0");
    assert!(s.steps.iter().any(|l| l.contains("المميز")), "{:?}", s.steps);
  }

  #[test]
  fn arabic_linear_equation() {
    let s = solve("حل 2س زائد 3 يساوي 7");
    assert_eq!(s.result, "x = 2");
  }

  #[test]
  fn complex_roots() {
    assert_eq!(solve("x^2 + 1 = 0").result, "x = -I, x = I");
  }

  #[test]
  fn identity_holds_for_every_value() {
    assert_eq!(solve("x + 1 = x + 1").result, "x ∈ ℝ");
  }

  #[test]
  fn exponential_equation() {
    let s = solve("2^x = 8");
    assert_eq!(s.result, "x = 3");
  }

  #[test]
  fn transcendental_equation_gives_approximate_roots() {
    let s = solve("exp(x) = x + 2");
    assert_eq!(s.kind, Intent::Solve);
    let solutions = s.solutions.unwrap();
    assert_eq!(solutions.len(), 2);
    assert!(solutions[1]["x"].starts_with("1.14619"), "{:?}", solutions);
  }

  #[test]
  fn rational_equation_rejects_pole() {
    let s = solve("(x^2 - 1)/(x - 1) = 0");
    assert_eq!(s.result, "x = -1");
  }
}

mod system {
  use super::*;

  #[test]
  fn two_by_two() {
    let s = solve("x + y = 10; 2x - y = 2");
    assert_eq!(s.result, "x = 4, y = 6");
    let solutions = s.solutions.unwrap();
    assert_eq!(solutions.len(), 1);
    assert_eq!(solutions[0]["y"], "6");
  }

  #[test]
  fn lines_are_separate_equations() {
    let s = solve("x + y = 10\n2x - y = 2");
    assert_eq!(s.result, "x = 4, y = 6");
  }

  #[test]
  fn nonlinear_system_by_substitution() {
    let s = solve("x^2 + y^2 = 25; x - y = 1");
    assert!(s.result.contains("x = -3, y = -4"), "{}", s.result);
    assert!(s.result.contains("x = 4, y = 3"), "{}", s.result);
    assert_eq!(s.solutions.unwrap().len(), 2);
  }

  #[test]
  fn comma_separated() {
    let s = solve("x + y = 3, x - y = 1");
    assert_eq!(s.result, "x = 2, y = 1");
  }
}

mod errors {
  use mathtutor::TutorError;

  use super::*;

  #[test]
  fn contradiction_has_no_solution() {
    assert!(matches!(
      solve_query("x + 1 = x + 2", &Options::default()),
      Err(TutorError::NoSolution)
    ));
  }

  #[test]
  fn two_equals_signs() {
    let options = Options {
      mode: Some(Intent::Solve),
      ..Options::default()
    };
    assert!(matches!(
      solve_query("x = = 2", &options),
      Err(TutorError::InvalidEquation)
    ));
  }

  #[test]
  fn inconsistent_system() {
    assert!(matches!(
      solve_query("x + y = 1; x + y = 2", &Options::default()),
      Err(TutorError::NoSolution)
    ));
  }
}
