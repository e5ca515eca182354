use crate::classify::{Intent, MatrixOp, Query};
use crate::functions::linear_algebra::{
  evaluate_matrix_expr, Matrix, RowStep, EIGEN_SYMBOL,
};
use crate::parse_expression;
use crate::syntax::{expr_to_latex, expr_to_string, Expr};
use crate::tutor::{phrases, Solution, Steps};
use crate::TutorError;

fn show(m: &Matrix) -> String {
  expr_to_string(&m.to_expr())
}

fn trace(steps: &mut Steps, rows: &[RowStep]) {
  for step in rows {
    steps.push(phrases::row_step(step));
  }
}

fn finish(steps: Steps, value: &Expr) -> Solution {
  steps.finish(Intent::Matrix, expr_to_string(value), expr_to_latex(value))
}

pub(super) fn solve(
  query: &Query,
  mut steps: Steps,
) -> Result<Solution, TutorError> {
  let expr = parse_expression(&query.expression)?;
  if query.matrix_op == MatrixOp::Arithmetic || !expr.is_matrix() {
    return arithmetic(&expr, steps);
  }

  let m = Matrix::from_expr(&expr)?;
  steps.push(phrases::matrix_input(&show(&m)));
  let op = match query.matrix_op {
    MatrixOp::Auto if m.is_square() => MatrixOp::Determinant,
    MatrixOp::Auto => MatrixOp::Rref,
    op => op,
  };

  match op {
    MatrixOp::Determinant => {
      if m.rows == 2 && m.cols == 2 {
        let e = |r: usize, c: usize| expr_to_string(&m.data[r][c].to_expr());
        steps.explain(phrases::determinant_2x2(
          &e(0, 0),
          &e(0, 1),
          &e(1, 0),
          &e(1, 1),
        ));
      }
      steps.explain(phrases::TRIANGULAR);
      let (det, rows) = m.determinant_with_steps()?;
      trace(&mut steps, &rows);
      let value = det.to_expr();
      steps.push(phrases::determinant_value(&expr_to_string(&value)));
      Ok(finish(steps, &value))
    }
    MatrixOp::Inverse => {
      steps.explain(phrases::INVERSE_METHOD);
      let (inverse, rows) = m.inverse_with_steps()?;
      trace(&mut steps, &rows);
      steps.push(phrases::inverse_value(&show(&inverse)));
      Ok(finish(steps, &inverse.to_expr()))
    }
    MatrixOp::Transpose => {
      let t = m.transpose();
      steps.push(phrases::transpose_value(&show(&t)));
      Ok(finish(steps, &t.to_expr()))
    }
    MatrixOp::Rank => {
      steps.explain(phrases::RREF_METHOD);
      let (reduced, rows, pivots) = m.rref_with_steps();
      trace(&mut steps, &rows);
      steps.push(phrases::rref_value(&show(&reduced)));
      steps.push(phrases::rank_value(pivots.len()));
      Ok(finish(steps, &Expr::Integer(pivots.len() as i128)))
    }
    MatrixOp::Rref => {
      steps.explain(phrases::RREF_METHOD);
      let (reduced, rows, _) = m.rref_with_steps();
      trace(&mut steps, &rows);
      steps.push(phrases::rref_value(&show(&reduced)));
      Ok(finish(steps, &reduced.to_expr()))
    }
    MatrixOp::Eigen => eigen(&m, steps),
    MatrixOp::Arithmetic | MatrixOp::Auto => arithmetic(&expr, steps),
  }
}

fn eigen(m: &Matrix, mut steps: Steps) -> Result<Solution, TutorError> {
  let p = m.characteristic_polynomial()?;
  steps.push(phrases::characteristic(&expr_to_string(
    &p.to_expr(EIGEN_SYMBOL),
  )));
  let eigen = m.eigen()?;
  for e in &eigen {
    let mut line = phrases::eigenvalue(&expr_to_string(&e.value));
    if e.multiplicity > 1 {
      line.push_str(&phrases::repeated_root(e.multiplicity));
    }
    if e.approximate {
      line.push_str(phrases::APPROXIMATE_ROOT);
    }
    steps.push(line);
    for v in &e.vectors {
      let vector = Expr::List(v.iter().map(|n| n.to_expr()).collect());
      steps.explain(phrases::eigenvector(&expr_to_string(&vector)));
    }
  }

  let result = eigen
    .iter()
    .map(|e| format!("λ = {}", expr_to_string(&e.value)))
    .collect::<Vec<_>>()
    .join(", ");
  let latex = eigen
    .iter()
    .map(|e| format!("\\lambda = {}", expr_to_latex(&e.value)))
    .collect::<Vec<_>>()
    .join(",\\quad ");
  Ok(steps.finish(Intent::Matrix, result, latex))
}

fn arithmetic(expr: &Expr, mut steps: Steps) -> Result<Solution, TutorError> {
  let value = evaluate_matrix_expr(expr)?.to_expr();
  steps.push(phrases::matrix_expression(&expr_to_string(expr)));
  steps.push(phrases::matrix_result(&expr_to_string(&value)));
  Ok(finish(steps, &value))
}
