use super::*;

#[test]
fn determinant_of_two_by_two() {
  let s = solve("محدد [[1, 2], [3, 4]]");
  assert_eq!(s.kind, Intent::Matrix);
  assert_eq!(s.result, "-2");
  assert!(s.steps.iter().any(|l| l.contains("المحدد = -2")));
}

#[test]
fn square_matrix_defaults_to_determinant() {
  assert_eq!(solve("[[2, 0], [0, 3]]").result, "6");
}

#[test]
fn inverse_uses_fractions() {
  let s = solve("معكوس المصفوفة [[1, 2], [3, 4]]");
  assert_eq!(s.result, "[[-2, 1], [3/2, -1/2]]");
  assert!(s.latex.starts_with("\\begin{pmatrix}"));
}

#[test]
fn singular_matrix_has_no_inverse() {
  assert!(solve_query("inverse [[1, 2], [2, 4]]", &Options::default()).is_err());
}

#[test]
fn transpose() {
  let s = solve("transpose [[1, 2, 3], [4, 5, 6]]");
  assert_eq!(s.result, "[[1, 4], [2, 5], [3, 6]]");
}

#[test]
fn rank_of_dependent_rows() {
  assert_eq!(solve("رتبة [[1, 2], [2, 4]]").result, "1");
}

#[test]
fn rref_traces_row_operations() {
  let s = solve("rref [[0, 1], [2, 4]]");
  assert_eq!(s.result, "[[1, 0], [0, 1]]");
  assert!(s.steps.iter().any(|l| l.contains("R1 ↔ R2")), "{:?}", s.steps);
}

#[test]
fn eigenvalues_of_diagonal_matrix() {
  let s = solve("القيم الذاتية [[2, 0], [0, 3]]");
  assert_eq!(s.result, "λ = 2, λ = 3");
}

#[test]
fn eigenvectors_are_listed() {
  let s = solve("eigenvectors [[2, 1], [1, 2]]");
  assert_eq!(s.result, "λ = 1, λ = 3");
  assert!(s.steps.iter().any(|l| l.contains("[-1, 1]")), "{:?}", s.steps);
  assert!(s.steps.iter().any(|l| l.contains("[1, 1]")), "{:?}", s.steps);
}

#[test]
fn product_of_two_matrices() {
  let s = solve("[[1, 2], [3, 4]] * [[0, 1], [1, 0]]");
  assert_eq!(s.result, "[[2, 1], [4, 3]]");
}

#[test]
fn scalar_multiple() {
  let s = solve("2*[[1, 2], [3, 4]]");
  assert_eq!(s.result, "[[2, 4], [6, 8]]");
}
