use std::collections::BTreeSet;
use std::fmt;

use pest::iterators::Pair;

use crate::functions::numeric::{format_real, Number};
use crate::{Rule, TutorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constant {
  Pi,
  E,
  I,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Integer(i128),
  Rational(i128, i128),
  Real(f64),
  Identifier(String),
  Constant(Constant),
  Plus(Vec<Expr>),
  Times(Vec<Expr>),
  Power(Box<Expr>, Box<Expr>),
  FunctionCall { name: String, args: Vec<Expr> },
  /// Row vectors and matrices (a list of equally long lists).
  List(Vec<Expr>),
}

impl Expr {
  pub fn symbol(name: &str) -> Expr {
    Expr::Identifier(name.to_string())
  }

  pub fn func(name: &str, arg: Expr) -> Expr {
    Expr::FunctionCall {
      name: name.to_string(),
      args: vec![arg],
    }
  }

  pub fn pow(base: Expr, exp: Expr) -> Expr {
    Expr::Power(Box::new(base), Box::new(exp))
  }

  pub fn neg(expr: Expr) -> Expr {
    Expr::Times(vec![Expr::Integer(-1), expr])
  }

  pub fn recip(expr: Expr) -> Expr {
    Expr::pow(expr, Expr::Integer(-1))
  }

  pub fn sqrt(expr: Expr) -> Expr {
    Expr::pow(expr, Expr::Rational(1, 2))
  }

  pub fn sub(left: Expr, right: Expr) -> Expr {
    Expr::Plus(vec![left, Expr::neg(right)])
  }

  pub fn div(num: Expr, den: Expr) -> Expr {
    Expr::Times(vec![num, Expr::recip(den)])
  }

  pub fn as_number(&self) -> Option<Number> {
    Number::from_expr(self)
  }

  pub fn is_number(&self) -> bool {
    matches!(self, Expr::Integer(_) | Expr::Rational(..) | Expr::Real(_))
  }

  pub fn is_zero(&self) -> bool {
    self.as_number().is_some_and(|n| n.is_zero())
  }

  pub fn is_one(&self) -> bool {
    self.as_number().is_some_and(|n| n.is_one())
  }

  pub fn is_matrix(&self) -> bool {
    matches!(self, Expr::List(rows) if rows.iter().all(|r| matches!(r, Expr::List(_))))
  }

  pub fn contains_list(&self) -> bool {
    match self {
      Expr::List(_) => true,
      _ => self.children().iter().any(|c| c.contains_list()),
    }
  }

  fn children(&self) -> Vec<&Expr> {
    match self {
      Expr::Plus(items) | Expr::Times(items) | Expr::List(items) => {
        items.iter().collect()
      }
      Expr::Power(b, e) => vec![b.as_ref(), e.as_ref()],
      Expr::FunctionCall { args, .. } => args.iter().collect(),
      _ => Vec::new(),
    }
  }

  pub fn contains_symbol(&self, var: &str) -> bool {
    match self {
      Expr::Identifier(name) => name == var,
      _ => self.children().iter().any(|c| c.contains_symbol(var)),
    }
  }

  pub fn free_symbols(&self) -> BTreeSet<String> {
    let mut out = BTreeSet::new();
    self.collect_symbols(&mut out);
    out
  }

  fn collect_symbols(&self, out: &mut BTreeSet<String>) {
    if let Expr::Identifier(name) = self {
      out.insert(name.clone());
    }
    for child in self.children() {
      child.collect_symbols(out);
    }
  }

  fn map_children(&self, f: &dyn Fn(&Expr) -> Expr) -> Expr {
    match self {
      Expr::Plus(items) => Expr::Plus(items.iter().map(f).collect()),
      Expr::Times(items) => Expr::Times(items.iter().map(f).collect()),
      Expr::List(items) => Expr::List(items.iter().map(f).collect()),
      Expr::Power(b, e) => Expr::pow(f(b), f(e)),
      Expr::FunctionCall { name, args } => Expr::FunctionCall {
        name: name.clone(),
        args: args.iter().map(f).collect(),
      },
      other => other.clone(),
    }
  }

  /// Replaces every occurrence of the symbol `var` with `value` (unsimplified).
  pub fn substitute(&self, var: &str, value: &Expr) -> Expr {
    match self {
      Expr::Identifier(name) if name == var => value.clone(),
      _ => self.map_children(&|c| c.substitute(var, value)),
    }
  }

  /// Structural replacement of a whole subexpression.
  pub fn replace(&self, target: &Expr, with: &Expr) -> Expr {
    if self == target {
      return with.clone();
    }
    self.map_children(&|c| c.replace(target, with))
  }
}

/// True if `expr` does not depend on `var`.
pub fn is_constant_wrt(expr: &Expr, var: &str) -> bool {
  !expr.contains_symbol(var)
}

// ─── Parsing ────────────────────────────────────────────────────────

fn parse_error(msg: &str) -> TutorError {
  TutorError::EvaluationError(msg.to_string())
}

/// Converts a pest pair (any expression-level rule) into an unsimplified `Expr`.
pub fn pair_to_expr(pair: Pair<Rule>) -> Result<Expr, TutorError> {
  match pair.as_rule() {
    Rule::Program => {
      let inner = pair
        .into_inner()
        .find(|p| p.as_rule() != Rule::EOI)
        .ok_or(TutorError::EmptyInput)?;
      pair_to_expr(inner)
    }
    Rule::Expression => {
      let mut terms = Vec::new();
      let mut negate_next = false;
      for p in pair.into_inner() {
        match p.as_rule() {
          Rule::AddOp => negate_next = p.as_str() == "-",
          _ => {
            let term = pair_to_expr(p)?;
            terms.push(if negate_next { Expr::neg(term) } else { term });
            negate_next = false;
          }
        }
      }
      Ok(collapse(terms, Expr::Plus))
    }
    Rule::Term => {
      let mut factors = Vec::new();
      let mut divide_next = false;
      for p in pair.into_inner() {
        match p.as_rule() {
          Rule::MulOp => divide_next = p.as_str() == "/",
          _ => {
            let factor = pair_to_expr(p)?;
            factors.push(if divide_next {
              Expr::recip(factor)
            } else {
              factor
            });
            divide_next = false;
          }
        }
      }
      Ok(collapse(factors, Expr::Times))
    }
    Rule::Factor | Rule::Exponent => {
      let mut negative = false;
      let mut value = None;
      for p in pair.into_inner() {
        match p.as_rule() {
          Rule::Sign => {
            if p.as_str() == "-" {
              negative = !negative;
            }
          }
          _ => value = Some(pair_to_expr(p)?),
        }
      }
      let value = value.ok_or_else(|| parse_error("عامل فارغ"))?;
      Ok(match (negative, value) {
        (true, Expr::Integer(n)) => Expr::Integer(-n),
        (true, v) => Expr::neg(v),
        (false, v) => v,
      })
    }
    Rule::ImplicitFactor => {
      let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| parse_error("عامل فارغ"))?;
      pair_to_expr(inner)
    }
    Rule::Power => {
      let mut inner = pair.into_inner();
      let base = pair_to_expr(
        inner.next().ok_or_else(|| parse_error("أساس مفقود"))?,
      )?;
      match inner.next() {
        Some(exp) => Ok(Expr::pow(base, pair_to_expr(exp)?)),
        None => Ok(base),
      }
    }
    Rule::Number => number_from_str(pair.as_str()),
    Rule::Identifier => Ok(Expr::Identifier(pair.as_str().to_string())),
    Rule::Constant => Ok(match pair.as_str() {
      "e" | "E" => Expr::Constant(Constant::E),
      "I" => Expr::Constant(Constant::I),
      _ => Expr::Constant(Constant::Pi),
    }),
    Rule::FunctionCall => {
      let mut inner = pair.into_inner();
      let name = inner
        .next()
        .ok_or_else(|| parse_error("اسم دالة مفقود"))?
        .as_str()
        .to_string();
      let args = inner.map(pair_to_expr).collect::<Result<Vec<_>, _>>()?;
      build_function(&name, args)
    }
    Rule::Matrix | Rule::Row => Ok(Expr::List(
      pair
        .into_inner()
        .map(pair_to_expr)
        .collect::<Result<Vec<_>, _>>()?,
    )),
    other => Err(parse_error(&format!("قاعدة غير متوقعة: {other:?}"))),
  }
}

fn collapse(mut items: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
  if items.len() == 1 {
    items.remove(0)
  } else {
    wrap(items)
  }
}

fn number_from_str(s: &str) -> Result<Expr, TutorError> {
  if let Ok(n) = s.parse::<i128>() {
    return Ok(Expr::Integer(n));
  }
  // Finite decimals stay exact: 0.25 -> 1/4.
  if let Some((int_part, frac_part)) = s.split_once('.') {
    if frac_part.len() <= 18 {
      let digits = format!("{int_part}{frac_part}");
      if let (Ok(n), Some(d)) =
        (digits.parse::<i128>(), 10i128.checked_pow(frac_part.len() as u32))
      {
        if let Some(num) = Number::ratio(n, d) {
          return Ok(num.to_expr());
        }
      }
    }
  }
  s.parse::<f64>()
    .map(Expr::Real)
    .map_err(|_| parse_error(&format!("عدد غير صالح: {s}")))
}

fn build_function(name: &str, mut args: Vec<Expr>) -> Result<Expr, TutorError> {
  let canonical = match name {
    "arcsin" => "asin",
    "arccos" => "acos",
    "arctan" => "atan",
    "ln" => "log",
    "Abs" => "abs",
    other => other,
  };
  match (canonical, args.len()) {
    ("sqrt", 1) => Ok(Expr::sqrt(args.remove(0))),
    ("exp", 1) => Ok(Expr::pow(Expr::Constant(Constant::E), args.remove(0))),
    // log(x, b): logarithm of x in base b
    ("log", 2) => {
      let base = args.remove(1);
      let x = args.remove(0);
      Ok(Expr::div(Expr::func("log", x), Expr::func("log", base)))
    }
    (_, 1) => Ok(Expr::func(canonical, args.remove(0))),
    _ => Err(TutorError::EvaluationError(format!(
      "عدد وسائط غير صحيح للدالة {name}"
    ))),
  }
}

// ─── Printing ───────────────────────────────────────────────────────

const PREC_PLUS: u8 = 1;
const PREC_TIMES: u8 = 2;
const PREC_POWER: u8 = 3;
const PREC_ATOM: u8 = 4;

fn precedence(expr: &Expr) -> u8 {
  match expr {
    Expr::Plus(_) => PREC_PLUS,
    Expr::Times(_) => PREC_TIMES,
    Expr::Integer(n) if *n < 0 => PREC_PLUS,
    Expr::Real(f) if *f < 0.0 => PREC_PLUS,
    Expr::Rational(..) => PREC_TIMES,
    Expr::Power(_, e) => match e.as_number() {
      Some(n) if n.is_negative() => PREC_TIMES,
      _ if is_exp_or_sqrt(expr) => PREC_ATOM,
      _ => PREC_POWER,
    },
    _ => PREC_ATOM,
  }
}

fn is_exp_or_sqrt(expr: &Expr) -> bool {
  match expr {
    Expr::Power(b, e) => {
      matches!(b.as_ref(), Expr::Constant(Constant::E))
        || matches!(e.as_ref(), Expr::Rational(1, 2))
    }
    _ => false,
  }
}

/// Splits a leading negative sign off a term: `-3*x` -> (true, `3*x`).
pub fn split_sign(expr: &Expr) -> (bool, Expr) {
  match expr {
    Expr::Integer(n) if *n < 0 => (true, Expr::Integer(-n)),
    Expr::Rational(n, d) if *n < 0 => (true, Expr::Rational(-n, *d)),
    Expr::Real(f) if *f < 0.0 => (true, Expr::Real(-f)),
    Expr::Times(factors) => match factors.first().and_then(|f| f.as_number()) {
      Some(n) if n.is_negative() => {
        let mut rest: Vec<Expr> = factors[1..].to_vec();
        let positive = -n;
        if !positive.is_one() {
          rest.insert(0, positive.to_expr());
        }
        (true, collapse(rest, Expr::Times))
      }
      _ => (false, expr.clone()),
    },
    _ => (false, expr.clone()),
  }
}

/// Numerator and denominator factor lists of a (canonical) product.
fn split_fraction(factors: &[Expr]) -> (Vec<Expr>, Vec<Expr>) {
  let mut num = Vec::new();
  let mut den = Vec::new();
  for f in factors {
    match f {
      Expr::Rational(n, d) => {
        if *n != 1 {
          num.push(Expr::Integer(*n));
        }
        den.push(Expr::Integer(*d));
      }
      Expr::Power(b, e) => match e.as_number() {
        Some(n) if n.is_negative() => {
          let positive = -n;
          if positive.is_one() {
            den.push(b.as_ref().clone());
          } else {
            den.push(Expr::pow(b.as_ref().clone(), positive.to_expr()));
          }
        }
        _ => num.push(f.clone()),
      },
      other => num.push(other.clone()),
    }
  }
  (num, den)
}

trait Printer {
  fn atom(&self, expr: &Expr) -> String;
  fn power(&self, base: &Expr, exp: &Expr) -> String;
  fn function(&self, name: &str, args: &[Expr]) -> String;
  fn list(&self, items: &[Expr]) -> String;
  fn fraction(&self, num: &str, den: &str, den_is_compound: bool) -> String;
  fn product(&self, parts: &[String]) -> String;
  fn paren(&self, s: &str) -> String;

  fn parenthesize_sum_numerator(&self) -> bool {
    true
  }

  fn print(&self, expr: &Expr) -> String {
    match expr {
      Expr::Plus(terms) => {
        // `1 - x^2` rather than `-x^2 + 1`; a leading number stays put.
        let mut terms: Vec<&Expr> = terms.iter().collect();
        if terms.first().is_some_and(|t| !t.is_number() && split_sign(t).0) {
          if let Some(pos) = terms.iter().position(|t| !split_sign(t).0) {
            let first_positive = terms.remove(pos);
            terms.insert(0, first_positive);
          }
        }
        let mut out = String::new();
        for (i, term) in terms.iter().enumerate() {
          let (negative, positive) = split_sign(term);
          let body = self.print_at(&positive, PREC_PLUS + 1);
          match (i, negative) {
            (0, true) => out.push_str(&format!("-{body}")),
            (0, false) => out.push_str(&body),
            (_, true) => out.push_str(&format!(" - {body}")),
            (_, false) => out.push_str(&format!(" + {body}")),
          }
        }
        out
      }
      Expr::Times(factors) => self.print_product(factors),
      Expr::Power(b, e) => {
        if e.as_number().is_some_and(|n| n.is_negative()) {
          self.print_product(std::slice::from_ref(expr))
        } else {
          self.power(b, e)
        }
      }
      Expr::FunctionCall { name, args } => self.function(name, args),
      Expr::List(items) => self.list(items),
      Expr::Rational(n, d) => {
        let (num, den) = (Expr::Integer(n.abs()), Expr::Integer(*d));
        let frac = self.fraction(&self.atom(&num), &self.atom(&den), false);
        if *n < 0 {
          format!("-{frac}")
        } else {
          frac
        }
      }
      _ => self.atom(expr),
    }
  }

  fn print_at(&self, expr: &Expr, min_prec: u8) -> String {
    let s = self.print(expr);
    if precedence(expr) < min_prec {
      self.paren(&s)
    } else {
      s
    }
  }

  fn print_product(&self, factors: &[Expr]) -> String {
    let (negative, positive) = split_sign(&Expr::Times(factors.to_vec()));
    let factors = match positive {
      Expr::Times(fs) => fs,
      other => vec![other],
    };
    let (num, den) = split_fraction(&factors);
    let sum_over_den =
      !den.is_empty() && num.len() == 1 && matches!(num[0], Expr::Plus(_));
    let num_str = if num.is_empty() {
      "1".to_string()
    } else if sum_over_den {
      let sum = self.print(&num[0]);
      if self.parenthesize_sum_numerator() {
        self.paren(&sum)
      } else {
        sum
      }
    } else {
      let parts: Vec<String> =
        num.iter().map(|f| self.print_at(f, PREC_TIMES + 1)).collect();
      self.product(&parts)
    };
    let body = if den.is_empty() {
      num_str
    } else {
      let compound = den.len() > 1 || matches!(den[0], Expr::Plus(_));
      let den_str = if den.len() == 1 {
        self.print(&den[0])
      } else {
        let parts: Vec<String> =
          den.iter().map(|f| self.print_at(f, PREC_TIMES + 1)).collect();
        self.product(&parts)
      };
      self.fraction(&num_str, &den_str, compound)
    };
    if negative {
      format!("-{body}")
    } else {
      body
    }
  }
}

struct PlainPrinter;

impl Printer for PlainPrinter {
  fn atom(&self, expr: &Expr) -> String {
    match expr {
      Expr::Integer(n) => n.to_string(),
      Expr::Real(f) => format_real(*f),
      Expr::Identifier(name) => name.clone(),
      Expr::Constant(Constant::Pi) => "pi".to_string(),
      Expr::Constant(Constant::E) => "E".to_string(),
      Expr::Constant(Constant::I) => "I".to_string(),
      other => self.print(other),
    }
  }

  fn power(&self, base: &Expr, exp: &Expr) -> String {
    if matches!(base, Expr::Constant(Constant::E)) {
      return format!("exp({})", self.print(exp));
    }
    if matches!(exp, Expr::Rational(1, 2)) {
      return format!("sqrt({})", self.print(base));
    }
    let b = self.print_at(base, PREC_ATOM);
    let e = match exp {
      Expr::Integer(n) if *n >= 0 => n.to_string(),
      Expr::Identifier(_) | Expr::Constant(_) => self.print(exp),
      _ => self.paren(&self.print(exp)),
    };
    format!("{b}^{e}")
  }

  fn function(&self, name: &str, args: &[Expr]) -> String {
    let args: Vec<String> = args.iter().map(|a| self.print(a)).collect();
    format!("{name}({})", args.join(", "))
  }

  fn list(&self, items: &[Expr]) -> String {
    let items: Vec<String> = items.iter().map(|a| self.print(a)).collect();
    format!("[{}]", items.join(", "))
  }

  fn fraction(&self, num: &str, den: &str, den_is_compound: bool) -> String {
    if den_is_compound {
      format!("{num}/({den})")
    } else {
      format!("{num}/{den}")
    }
  }

  fn product(&self, parts: &[String]) -> String {
    parts.join("*")
  }

  fn paren(&self, s: &str) -> String {
    format!("({s})")
  }
}

struct LatexPrinter;

impl Printer for LatexPrinter {
  fn atom(&self, expr: &Expr) -> String {
    match expr {
      Expr::Integer(n) => n.to_string(),
      Expr::Real(f) => format_real(*f),
      Expr::Identifier(name) => match name.as_str() {
        "λ" => "\\lambda".to_string(),
        "θ" => "\\theta".to_string(),
        _ => name.clone(),
      },
      Expr::Constant(Constant::Pi) => "\\pi".to_string(),
      Expr::Constant(Constant::E) => "e".to_string(),
      Expr::Constant(Constant::I) => "i".to_string(),
      other => self.print(other),
    }
  }

  fn power(&self, base: &Expr, exp: &Expr) -> String {
    if matches!(base, Expr::Constant(Constant::E)) {
      return format!("e^{{{}}}", self.print(exp));
    }
    match exp {
      Expr::Rational(1, 2) => format!("\\sqrt{{{}}}", self.print(base)),
      Expr::Rational(1, n) => {
        format!("\\sqrt[{n}]{{{}}}", self.print(base))
      }
      _ => {
        let b = if matches!(base, Expr::FunctionCall { .. }) {
          self.paren(&self.print(base))
        } else {
          self.print_at(base, PREC_ATOM)
        };
        format!("{b}^{{{}}}", self.print(exp))
      }
    }
  }

  fn function(&self, name: &str, args: &[Expr]) -> String {
    let args: Vec<String> = args.iter().map(|a| self.print(a)).collect();
    let joined = args.join(", ");
    match name {
      "abs" => format!("\\left|{joined}\\right|"),
      "sin" | "cos" | "tan" | "cot" | "sec" | "csc" | "sinh" | "cosh"
      | "tanh" | "log" => format!("\\{name}\\left({joined}\\right)"),
      "asin" | "acos" | "atan" => {
        format!("\\arc{}\\left({joined}\\right)", &name[1..])
      }
      _ => format!("\\operatorname{{{name}}}\\left({joined}\\right)"),
    }
  }

  fn list(&self, items: &[Expr]) -> String {
    let rows: Vec<String> = items
      .iter()
      .map(|row| match row {
        Expr::List(cols) => cols
          .iter()
          .map(|c| self.print(c))
          .collect::<Vec<_>>()
          .join(" & "),
        other => self.print(other),
      })
      .collect();
    if items.iter().all(|r| matches!(r, Expr::List(_))) {
      format!("\\begin{{pmatrix}} {} \\end{{pmatrix}}", rows.join(" \\\\ "))
    } else {
      format!("\\begin{{pmatrix}} {} \\end{{pmatrix}}", rows.join(" & "))
    }
  }

  fn fraction(&self, num: &str, den: &str, _den_is_compound: bool) -> String {
    format!("\\frac{{{num}}}{{{den}}}")
  }

  fn parenthesize_sum_numerator(&self) -> bool {
    false
  }

  fn product(&self, parts: &[String]) -> String {
    let mut out = String::new();
    for (i, p) in parts.iter().enumerate() {
      if i > 0 {
        let numeric_next = p.chars().next().is_some_and(|c| c.is_ascii_digit());
        out.push_str(if numeric_next { " \\cdot " } else { " " });
      }
      out.push_str(p);
    }
    out
  }

  fn paren(&self, s: &str) -> String {
    format!("\\left({s}\\right)")
  }
}

/// Plain infix rendering: `2*x^2 + sqrt(2)/2`.
pub fn expr_to_string(expr: &Expr) -> String {
  PlainPrinter.print(expr)
}

/// LaTeX rendering for MathJax.
pub fn expr_to_latex(expr: &Expr) -> String {
  LatexPrinter.print(expr)
}

impl fmt::Display for Expr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", expr_to_string(self))
  }
}
