//! Exact matrices over `Number`: determinant, inverse, rank, traced
//! Gauss-Jordan elimination and eigenvalues.
//!
//! Matrix expressions (`A + B`, `A*B`, `2*A`, `A^-1`) are evaluated on the
//! unsimplified parse tree so the order of factors is kept.

use crate::functions::numeric::Number;
use crate::functions::polynomial::Poly;
use crate::functions::simplify::simplify;
use crate::functions::solve::{poly_roots, Root};
use crate::syntax::Expr;
use crate::TutorError;

/// Symbol used for the characteristic polynomial.
pub const EIGEN_SYMBOL: &str = "λ";

fn matrix_error(msg: &str) -> TutorError {
  TutorError::MatrixError(msg.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
  pub rows: usize,
  pub cols: usize,
  pub data: Vec<Vec<Number>>,
}

/// One elementary row operation of a Gauss-Jordan trace, with the matrix it
/// produced. Rows are 0-based.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOp {
  Swap(usize, usize),
  Scale { row: usize, factor: Number },
  AddMultiple { target: usize, source: usize, factor: Number },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowStep {
  pub op: RowOp,
  pub after: Matrix,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Eigen {
  pub value: Expr,
  pub multiplicity: usize,
  pub approximate: bool,
  /// Basis of the eigenspace; only computed for rational eigenvalues.
  pub vectors: Vec<Vec<Number>>,
}

impl Matrix {
  pub fn new(data: Vec<Vec<Number>>) -> Result<Self, TutorError> {
    let rows = data.len();
    let cols = data.first().map(|r| r.len()).unwrap_or(0);
    if rows == 0 || cols == 0 {
      return Err(matrix_error("المصفوفة فارغة"));
    }
    if data.iter().any(|r| r.len() != cols) {
      return Err(matrix_error("صفوف المصفوفة غير متساوية الطول"));
    }
    Ok(Matrix { rows, cols, data })
  }

  /// Reads a matrix literal. A flat list is a single row.
  pub fn from_expr(expr: &Expr) -> Result<Self, TutorError> {
    let entry = |e: &Expr| {
      simplify(e.clone())
        .as_number()
        .ok_or_else(|| matrix_error("عناصر المصفوفة يجب أن تكون أعداداً"))
    };
    match expr {
      Expr::List(items) if expr.is_matrix() => Matrix::new(
        items
          .iter()
          .map(|row| match row {
            Expr::List(cols) => cols.iter().map(entry).collect(),
            _ => Err(matrix_error("صفوف المصفوفة غير صالحة")),
          })
          .collect::<Result<Vec<_>, _>>()?,
      ),
      Expr::List(items) => {
        Matrix::new(vec![items.iter().map(entry).collect::<Result<_, _>>()?])
      }
      _ => Err(matrix_error("لم يتم العثور على مصفوفة")),
    }
  }

  pub fn to_expr(&self) -> Expr {
    Expr::List(
      self
        .data
        .iter()
        .map(|row| Expr::List(row.iter().map(|n| n.to_expr()).collect()))
        .collect(),
    )
  }

  pub fn identity(n: usize) -> Self {
    let data = (0..n)
      .map(|i| {
        (0..n)
          .map(|j| if i == j { Number::ONE } else { Number::ZERO })
          .collect()
      })
      .collect();
    Matrix {
      rows: n,
      cols: n,
      data,
    }
  }

  pub fn is_square(&self) -> bool {
    self.rows == self.cols
  }

  fn require_square(&self) -> Result<(), TutorError> {
    if self.is_square() {
      Ok(())
    } else {
      Err(matrix_error("المصفوفة ليست مربعة"))
    }
  }

  pub fn transpose(&self) -> Matrix {
    let data = (0..self.cols)
      .map(|j| (0..self.rows).map(|i| self.data[i][j]).collect())
      .collect();
    Matrix {
      rows: self.cols,
      cols: self.rows,
      data,
    }
  }

  fn zip_with(
    &self,
    other: &Matrix,
    f: impl Fn(Number, Number) -> Number,
  ) -> Result<Matrix, TutorError> {
    if self.rows != other.rows || self.cols != other.cols {
      return Err(matrix_error("أبعاد المصفوفات غير متوافقة"));
    }
    let data = self
      .data
      .iter()
      .zip(&other.data)
      .map(|(a, b)| a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect())
      .collect();
    Matrix::new(data)
  }

  pub fn add(&self, other: &Matrix) -> Result<Matrix, TutorError> {
    self.zip_with(other, |a, b| a + b)
  }

  pub fn sub(&self, other: &Matrix) -> Result<Matrix, TutorError> {
    self.zip_with(other, |a, b| a - b)
  }

  pub fn scale(&self, k: Number) -> Matrix {
    Matrix {
      rows: self.rows,
      cols: self.cols,
      data: self
        .data
        .iter()
        .map(|r| r.iter().map(|&x| x * k).collect())
        .collect(),
    }
  }

  pub fn mul(&self, other: &Matrix) -> Result<Matrix, TutorError> {
    if self.cols != other.rows {
      return Err(matrix_error("أبعاد المصفوفات غير متوافقة للضرب"));
    }
    let data = (0..self.rows)
      .map(|i| {
        (0..other.cols)
          .map(|j| (0..self.cols).map(|k| self.data[i][k] * other.data[k][j]).sum())
          .collect()
      })
      .collect();
    Matrix::new(data)
  }

  pub fn trace(&self) -> Number {
    (0..self.rows.min(self.cols)).map(|i| self.data[i][i]).sum()
  }

  // ─── Elimination ──────────────────────────────────────────────────

  /// Reduced row echelon form with the trace of row operations and the
  /// pivot columns.
  pub fn rref_with_steps(&self) -> (Matrix, Vec<RowStep>, Vec<usize>) {
    self.rref_in_columns(self.cols)
  }

  /// Gauss-Jordan that only picks pivots in the first `pivot_cols`
  /// columns (the coefficient part of an augmented matrix).
  pub fn rref_in_columns(&self, pivot_cols: usize) -> (Matrix, Vec<RowStep>, Vec<usize>) {
    let mut m = self.clone();
    let mut steps = Vec::new();
    let mut pivots = Vec::new();
    let mut row = 0;
    for col in 0..pivot_cols.min(m.cols) {
      if row >= m.rows {
        break;
      }
      let Some(pivot) = (row..m.rows).find(|&r| !m.data[r][col].is_zero()) else {
        continue;
      };
      if pivot != row {
        m.data.swap(pivot, row);
        steps.push(RowStep {
          op: RowOp::Swap(row, pivot),
          after: m.clone(),
        });
      }
      let lead = m.data[row][col];
      if !lead.is_one() {
        if let Some(factor) = lead.recip() {
          for x in m.data[row].iter_mut() {
            *x = *x * factor;
          }
          steps.push(RowStep {
            op: RowOp::Scale { row, factor },
            after: m.clone(),
          });
        }
      }
      for r in 0..m.rows {
        let value = m.data[r][col];
        if r == row || value.is_zero() {
          continue;
        }
        let factor = -value;
        for c in 0..m.cols {
          let delta = factor * m.data[row][c];
          m.data[r][c] = m.data[r][c] + delta;
        }
        steps.push(RowStep {
          op: RowOp::AddMultiple {
            target: r,
            source: row,
            factor,
          },
          after: m.clone(),
        });
      }
      pivots.push(col);
      row += 1;
    }
    (m, steps, pivots)
  }

  pub fn rank(&self) -> usize {
    self.rref_with_steps().2.len()
  }

  /// Determinant by forward elimination; the trace lists the swaps and
  /// eliminations that produced the upper triangular matrix.
  pub fn determinant_with_steps(&self) -> Result<(Number, Vec<RowStep>), TutorError> {
    self.require_square()?;
    let mut m = self.clone();
    let mut steps = Vec::new();
    let mut sign = Number::ONE;
    for col in 0..m.cols {
      let Some(pivot) = (col..m.rows).find(|&r| !m.data[r][col].is_zero()) else {
        return Ok((Number::ZERO, steps));
      };
      if pivot != col {
        m.data.swap(pivot, col);
        sign = -sign;
        steps.push(RowStep {
          op: RowOp::Swap(col, pivot),
          after: m.clone(),
        });
      }
      for r in col + 1..m.rows {
        let value = m.data[r][col];
        if value.is_zero() {
          continue;
        }
        let factor = -(value
          .checked_div(m.data[col][col])
          .ok_or_else(|| matrix_error("قسمة على صفر"))?);
        for c in col..m.cols {
          let delta = factor * m.data[col][c];
          m.data[r][c] = m.data[r][c] + delta;
        }
        steps.push(RowStep {
          op: RowOp::AddMultiple {
            target: r,
            source: col,
            factor,
          },
          after: m.clone(),
        });
      }
    }
    let diagonal: Number = (0..m.rows).fold(Number::ONE, |acc, i| acc * m.data[i][i]);
    Ok((sign * diagonal, steps))
  }

  pub fn determinant(&self) -> Result<Number, TutorError> {
    self.determinant_with_steps().map(|(d, _)| d)
  }

  /// Inverse by Gauss-Jordan on `[A | I]`; the trace is on the augmented
  /// matrix.
  pub fn inverse_with_steps(&self) -> Result<(Matrix, Vec<RowStep>), TutorError> {
    self.require_square()?;
    let n = self.rows;
    let identity = Matrix::identity(n);
    let augmented = Matrix {
      rows: n,
      cols: 2 * n,
      data: self
        .data
        .iter()
        .zip(&identity.data)
        .map(|(a, i)| a.iter().chain(i).copied().collect())
        .collect(),
    };
    let (reduced, steps, pivots) = augmented.rref_in_columns(n);
    if pivots.len() < n {
      return Err(matrix_error(
        "المصفوفة منفردة (محددها يساوي صفراً) فليس لها معكوس",
      ));
    }
    let inverse = Matrix {
      rows: n,
      cols: n,
      data: reduced.data.iter().map(|r| r[n..].to_vec()).collect(),
    };
    Ok((inverse, steps))
  }

  pub fn inverse(&self) -> Result<Matrix, TutorError> {
    self.inverse_with_steps().map(|(m, _)| m)
  }

  pub fn pow(&self, k: i128) -> Result<Matrix, TutorError> {
    self.require_square()?;
    let base = if k < 0 { self.inverse()? } else { self.clone() };
    let mut out = Matrix::identity(self.rows);
    for _ in 0..k.unsigned_abs() {
      out = out.mul(&base)?;
    }
    Ok(out)
  }

  /// Basis of the null space, one vector per free column.
  pub fn null_space(&self) -> Vec<Vec<Number>> {
    let (r, _, pivots) = self.rref_with_steps();
    let mut basis = Vec::new();
    for free in (0..self.cols).filter(|c| !pivots.contains(c)) {
      let mut v = vec![Number::ZERO; self.cols];
      v[free] = Number::ONE;
      for (row, &p) in pivots.iter().enumerate() {
        v[p] = -r.data[row][free];
      }
      basis.push(v);
    }
    basis
  }

  // ─── Eigenvalues ──────────────────────────────────────────────────

  /// det(λI - A) by Faddeev-LeVerrier.
  pub fn characteristic_polynomial(&self) -> Result<Poly, TutorError> {
    self.require_square()?;
    let n = self.rows;
    let mut coeffs = vec![Number::ZERO; n + 1];
    coeffs[n] = Number::ONE;
    let mut m = Matrix {
      rows: n,
      cols: n,
      data: vec![vec![Number::ZERO; n]; n],
    };
    for k in 1..=n {
      // M_k = A M_{k-1} + c_{n-k+1} I
      m = self.mul(&m)?.add(&Matrix::identity(n).scale(coeffs[n - k + 1]))?;
      let am = self.mul(&m)?;
      coeffs[n - k] = -(am
        .trace()
        .checked_div(Number::int(k as i128))
        .ok_or_else(|| matrix_error("قسمة على صفر"))?);
    }
    Ok(Poly::new(coeffs))
  }

  pub fn eigen(&self) -> Result<Vec<Eigen>, TutorError> {
    let p = self.characteristic_polynomial()?;
    let roots = poly_roots(&p);
    Ok(
      roots
        .into_iter()
        .map(|Root { value, multiplicity, approximate }| {
          let vectors = match value.as_number() {
            Some(lambda) if lambda.is_exact() => self
              .sub(&Matrix::identity(self.rows).scale(lambda))
              .map(|shifted| shifted.null_space())
              .unwrap_or_default(),
            _ => Vec::new(),
          };
          Eigen {
            value,
            multiplicity,
            approximate,
            vectors,
          }
        })
        .collect(),
    )
  }
}

/// Solves the square system `a x = b`. `None` when it has no unique
/// solution.
pub fn solve_square(a: Vec<Vec<Number>>, b: Vec<Number>) -> Option<Vec<Number>> {
  let n = a.len();
  let data = a
    .into_iter()
    .zip(b)
    .map(|(mut row, rhs)| {
      row.push(rhs);
      row
    })
    .collect();
  let augmented = Matrix::new(data).ok()?;
  let (reduced, _, pivots) = augmented.rref_in_columns(n);
  if pivots.len() != n || augmented.cols != n + 1 {
    return None;
  }
  Some(reduced.data.iter().map(|r| r[n]).collect())
}

// ─── Matrix expressions ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum MatrixValue {
  Scalar(Number),
  Matrix(Matrix),
}

impl MatrixValue {
  pub fn to_expr(&self) -> Expr {
    match self {
      MatrixValue::Scalar(n) => n.to_expr(),
      MatrixValue::Matrix(m) => m.to_expr(),
    }
  }
}

fn add_values(a: MatrixValue, b: MatrixValue) -> Result<MatrixValue, TutorError> {
  match (a, b) {
    (MatrixValue::Scalar(x), MatrixValue::Scalar(y)) => Ok(MatrixValue::Scalar(x + y)),
    (MatrixValue::Matrix(x), MatrixValue::Matrix(y)) => Ok(MatrixValue::Matrix(x.add(&y)?)),
    _ => Err(matrix_error("لا يمكن جمع عدد ومصفوفة")),
  }
}

fn mul_values(a: MatrixValue, b: MatrixValue) -> Result<MatrixValue, TutorError> {
  match (a, b) {
    (MatrixValue::Scalar(x), MatrixValue::Scalar(y)) => Ok(MatrixValue::Scalar(x * y)),
    (MatrixValue::Scalar(k), MatrixValue::Matrix(m))
    | (MatrixValue::Matrix(m), MatrixValue::Scalar(k)) => Ok(MatrixValue::Matrix(m.scale(k))),
    (MatrixValue::Matrix(x), MatrixValue::Matrix(y)) => Ok(MatrixValue::Matrix(x.mul(&y)?)),
  }
}

/// Evaluates sums, products, scalar multiples and integer powers of matrix
/// literals. Expects the unsimplified parse tree.
pub fn evaluate_matrix_expr(expr: &Expr) -> Result<MatrixValue, TutorError> {
  match expr {
    Expr::List(_) => Ok(MatrixValue::Matrix(Matrix::from_expr(expr)?)),
    Expr::Plus(terms) => {
      let mut acc: Option<MatrixValue> = None;
      for t in terms {
        let v = evaluate_matrix_expr(t)?;
        acc = Some(match acc {
          None => v,
          Some(a) => add_values(a, v)?,
        });
      }
      acc.ok_or_else(|| matrix_error("تعبير فارغ"))
    }
    Expr::Times(factors) => {
      let mut acc = MatrixValue::Scalar(Number::ONE);
      for f in factors {
        acc = mul_values(acc, evaluate_matrix_expr(f)?)?;
      }
      Ok(acc)
    }
    Expr::Power(base, exp) => {
      let k = simplify(exp.as_ref().clone())
        .as_number()
        .and_then(|n| n.as_integer())
        .ok_or_else(|| matrix_error("الأس يجب أن يكون عدداً صحيحاً"))?;
      match evaluate_matrix_expr(base)? {
        MatrixValue::Matrix(m) => Ok(MatrixValue::Matrix(m.pow(k)?)),
        MatrixValue::Scalar(n) => n
          .pow_int(k)
          .map(MatrixValue::Scalar)
          .ok_or_else(|| matrix_error("قسمة على صفر")),
      }
    }
    other => simplify(other.clone())
      .as_number()
      .map(MatrixValue::Scalar)
      .ok_or_else(|| matrix_error("عناصر المصفوفة يجب أن تكون أعداداً")),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_expression;

  fn matrix(s: &str) -> Matrix {
    Matrix::from_expr(&parse_expression(s).unwrap()).unwrap()
  }

  #[test]
  fn determinant_by_elimination() {
    assert_eq!(matrix("[[1, 2], [3, 4]]").determinant().unwrap(), Number::int(-2));
    assert_eq!(
      matrix("[[2, 0, 1], [1, 3, 2], [1, 1, 2]]").determinant().unwrap(),
      Number::int(6)
    );
  }

  #[test]
  fn inverse_of_two_by_two() {
    let inv = matrix("[[1, 2], [3, 4]]").inverse().unwrap();
    assert_eq!(inv.to_expr().to_string(), "[[-2, 1], [3/2, -1/2]]");
  }

  #[test]
  fn singular_matrix_has_no_inverse() {
    assert!(matrix("[[1, 2], [2, 4]]").inverse().is_err());
  }

  #[test]
  fn rref_traces_row_operations() {
    let (r, steps, pivots) = matrix("[[0, 1], [2, 4]]").rref_with_steps();
    assert_eq!(r, Matrix::identity(2));
    assert_eq!(pivots, vec![0, 1]);
    assert_eq!(steps[0].op, RowOp::Swap(0, 1));
  }

  #[test]
  fn characteristic_polynomial_of_diagonal() {
    let p = matrix("[[2, 0], [0, 3]]").characteristic_polynomial().unwrap();
    assert_eq!(p.coeffs, vec![Number::int(6), Number::int(-5), Number::ONE]);
  }

  #[test]
  fn solves_square_system() {
    let x = solve_square(
      vec![
        vec![Number::int(1), Number::int(1)],
        vec![Number::int(1), Number::int(-1)],
      ],
      vec![Number::int(3), Number::int(1)],
    );
    assert_eq!(x, Some(vec![Number::int(2), Number::int(1)]));
  }

  #[test]
  fn matrix_products_keep_order() {
    let v = evaluate_matrix_expr(
      &parse_expression("[[1, 2], [3, 4]]*[[0, 1], [1, 0]]").unwrap(),
    )
    .unwrap();
    assert_eq!(v.to_expr().to_string(), "[[2, 1], [4, 3]]");
  }
}
