//! Floating point evaluation of expressions.

use crate::syntax::{Constant, Expr};

/// Applies an elementary function to a real argument. `None` when the
/// function is unknown or the result is not a finite real.
pub fn apply_real(name: &str, x: f64) -> Option<f64> {
  let value = match name {
    "sin" => x.sin(),
    "cos" => x.cos(),
    "tan" => x.tan(),
    "cot" => 1.0 / x.tan(),
    "sec" => 1.0 / x.cos(),
    "csc" => 1.0 / x.sin(),
    "asin" => x.asin(),
    "acos" => x.acos(),
    "atan" => x.atan(),
    "sinh" => x.sinh(),
    "cosh" => x.cosh(),
    "tanh" => x.tanh(),
    "log" => x.ln(),
    "abs" => x.abs(),
    _ => return None,
  };
  value.is_finite().then_some(value)
}

/// Numeric value of a closed expression. `None` if it has free symbols,
/// a non-real part or an undefined operation.
pub fn to_f64(expr: &Expr) -> Option<f64> {
  let value = match expr {
    Expr::Integer(n) => *n as f64,
    Expr::Rational(n, d) => *n as f64 / *d as f64,
    Expr::Real(f) => *f,
    Expr::Constant(Constant::Pi) => std::f64::consts::PI,
    Expr::Constant(Constant::E) => std::f64::consts::E,
    Expr::Constant(Constant::I) | Expr::Identifier(_) | Expr::List(_) => {
      return None
    }
    Expr::Plus(terms) => {
      terms.iter().map(to_f64).sum::<Option<f64>>()?
    }
    Expr::Times(factors) => {
      factors.iter().map(to_f64).product::<Option<f64>>()?
    }
    Expr::Power(base, exp) => {
      let (b, e) = (to_f64(base)?, to_f64(exp)?);
      if b < 0.0 && e.fract() != 0.0 {
        return None;
      }
      b.powf(e)
    }
    Expr::FunctionCall { name, args } if args.len() == 1 => {
      apply_real(name, to_f64(&args[0])?)?
    }
    Expr::FunctionCall { .. } => return None,
  };
  value.is_finite().then_some(value)
}

/// Numeric value with `var` bound to `value`.
pub fn to_f64_with(expr: &Expr, var: &str, value: f64) -> Option<f64> {
  to_f64(&expr.substitute(var, &Expr::Real(value)))
}

/// Real and imaginary parts of a closed expression that may contain `I`.
pub fn to_complex(expr: &Expr) -> Option<(f64, f64)> {
  match expr {
    Expr::Constant(Constant::I) => Some((0.0, 1.0)),
    Expr::Plus(terms) => terms.iter().try_fold((0.0, 0.0), |acc, t| {
      let (re, im) = to_complex(t)?;
      Some((acc.0 + re, acc.1 + im))
    }),
    Expr::Times(factors) => {
      factors.iter().try_fold((1.0, 0.0), |acc: (f64, f64), f| {
        let (re, im) = to_complex(f)?;
        Some((acc.0 * re - acc.1 * im, acc.0 * im + acc.1 * re))
      })
    }
    _ => to_f64(expr).map(|v| (v, 0.0)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn evaluates_closed_expressions() {
    let expr = Expr::Plus(vec![
      Expr::func("sin", Expr::Constant(Constant::Pi)),
      Expr::sqrt(Expr::Integer(4)),
    ]);
    let v = to_f64(&expr).unwrap();
    assert!((v - 2.0).abs() < 1e-12);
  }

  #[test]
  fn rejects_free_symbols_and_domain_errors() {
    assert_eq!(to_f64(&Expr::symbol("x")), None);
    assert_eq!(to_f64(&Expr::func("log", Expr::Integer(-1))), None);
    assert_eq!(to_f64(&Expr::sqrt(Expr::Integer(-4))), None);
  }

  #[test]
  fn binds_variable() {
    let expr = Expr::pow(Expr::symbol("x"), Expr::Integer(2));
    assert_eq!(to_f64_with(&expr, "x", 3.0), Some(9.0));
  }

  #[test]
  fn complex_parts() {
    let expr = Expr::Plus(vec![
      Expr::Integer(1),
      Expr::Times(vec![Expr::Integer(2), Expr::Constant(Constant::I)]),
    ]);
    assert_eq!(to_complex(&expr), Some((1.0, 2.0)));
  }
}
