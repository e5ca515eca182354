//! Keyword based intent detection on normalized text.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::TutorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
  #[serde(alias = "calc")]
  Evaluate,
  #[serde(alias = "frac")]
  Fraction,
  #[serde(alias = "diff")]
  Derivative,
  #[serde(alias = "int")]
  Integral,
  #[serde(alias = "eq", alias = "equation")]
  Solve,
  Matrix,
}

impl Intent {
  /// Name used in the `type` field of a response.
  pub fn as_str(&self) -> &'static str {
    match self {
      Intent::Evaluate => "evaluate",
      Intent::Fraction => "fraction",
      Intent::Derivative => "derivative",
      Intent::Integral => "integral",
      Intent::Solve => "solve",
      Intent::Matrix => "matrix",
    }
  }
}

impl FromStr for Intent {
  type Err = TutorError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "evaluate" | "calc" => Ok(Intent::Evaluate),
      "fraction" | "frac" => Ok(Intent::Fraction),
      "derivative" | "diff" => Ok(Intent::Derivative),
      "integral" | "int" => Ok(Intent::Integral),
      "solve" | "eq" | "equation" => Ok(Intent::Solve),
      "matrix" => Ok(Intent::Matrix),
      other => Err(TutorError::Unsupported(format!("نوع المسألة '{other}'"))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixOp {
  Determinant,
  Inverse,
  Transpose,
  Rank,
  Rref,
  Eigen,
  /// `A + B`, `A*B`, `2*A`, `A^3`.
  Arithmetic,
  /// No operation named: determinant for square matrices, RREF otherwise.
  Auto,
}

/// A classified query with its command words removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
  pub intent: Intent,
  pub expression: String,
  pub var: Option<String>,
  /// Derivative order, 1 unless the query asks for a higher one.
  pub order: u32,
  /// `(lower, upper)` of a definite integral, as text.
  pub bounds: Option<(String, String)>,
  pub matrix_op: MatrixOp,
}

const MATRIX_KEYWORDS: &[&str] = &["مصفوفة", "matrix", "matrices"];
const DERIVATIVE_KEYWORDS: &[&str] =
  &["تفاضل", "اشتق", "مشتقة", "derivative", "differentiate", "diff", "d/d"];
const INTEGRAL_KEYWORDS: &[&str] = &["تكامل", "integral", "integrate"];

/// Checked in order; the first hit names the operation.
const MATRIX_OPS: &[(MatrixOp, &[&str])] = &[
  (MatrixOp::Eigen, &["ذاتية", "ذاتي", "eigen"]),
  (MatrixOp::Inverse, &["معكوس", "النظير الضربي", "inverse"]),
  (MatrixOp::Transpose, &["منقول", "مدور", "transpose"]),
  (MatrixOp::Rank, &["رتبة", "rank"]),
  (
    MatrixOp::Rref,
    &["مختزل", "جاوس", "rref", "gauss", "echelon", "row reduce"],
  ),
  (MatrixOp::Determinant, &["محدد", "det"]),
];

/// English command words removed from the expression.
const STOP_WORDS: &str = "find|compute|calculate|evaluate|simplify|what|is|\
  the|of|value|please|derivatives?|differentiate|diff|first|second|third|\
  order|integrals?|integrate|indefinite|definite|solve|for|equations?|\
  system|fraction|matrix|matrices|determinant|det|inverse|transpose|rank|\
  rref|gauss|jordan|echelon|row|reduce|eigenvalues|eigenvectors|eigen|and|\
  expand|expanded";

struct Rules {
  solve_word: Regex,
  respect_to: Regex,
  leibniz: Regex,
  differential: Regex,
  bounds: Regex,
  order_number: Regex,
  arabic: Regex,
  stop_words: Regex,
  spaces: Regex,
}

impl Rules {
  fn compile() -> Result<Self, regex::Error> {
    Ok(Rules {
      solve_word: Regex::new(r"(?i)(?:^|\s)(?:حل|حلّ|solve)(?:\s|$)")?,
      respect_to: Regex::new(
        r"(?i)(?:بالنسبة\s+(?:إلى|الى|ل)|with\s+respect\s+to|wrt|\bfor)\s+([a-z]\d*)\b",
      )?,
      leibniz: Regex::new(r"(?i)d\s*/\s*d([a-z])\b")?,
      differential: Regex::new(r"\bd([a-z])\b")?,
      bounds: Regex::new(
        r"(?i)(?:من|from)\s+(\S+)\s+(?:إلى|الى|حتى|to)\s+(\S+)",
      )?,
      order_number: Regex::new(
        r"(?i)(?:order|الرتبة|الدرجة|رتبة)\s+(\d+)",
      )?,
      arabic: Regex::new(r"\p{Arabic}+")?,
      stop_words: Regex::new(&format!(r"(?i)\b(?:{STOP_WORDS})\b"))?,
      spaces: Regex::new(r"\s+")?,
    })
  }
}

static RULES: LazyLock<Result<Rules, regex::Error>> =
  LazyLock::new(Rules::compile);

fn contains_any(text: &str, keywords: &[&str]) -> bool {
  keywords.iter().any(|k| text.contains(k))
}

fn detect_intent(rules: &Rules, text: &str) -> Intent {
  let lower = text.to_lowercase();
  if lower.contains("[[") || contains_any(&lower, MATRIX_KEYWORDS) {
    Intent::Matrix
  } else if contains_any(&lower, DERIVATIVE_KEYWORDS) {
    Intent::Derivative
  } else if contains_any(&lower, INTEGRAL_KEYWORDS) {
    Intent::Integral
  } else if lower.contains('=')
    || lower.contains(';')
    || rules.solve_word.is_match(&lower)
  {
    Intent::Solve
  } else {
    Intent::Evaluate
  }
}

fn detect_order(rules: &Rules, text: &str) -> u32 {
  let lower = text.to_lowercase();
  // Too many digits for a u32 still has to reach the order cap.
  if let Some(caps) = rules.order_number.captures(&lower) {
    return caps[1].parse::<u32>().unwrap_or(u32::MAX).max(1);
  }
  if lower.contains("الثالثة") || lower.contains("third") || text.contains("'''")
  {
    3
  } else if lower.contains("الثانية")
    || lower.contains("second")
    || text.contains("''")
  {
    2
  } else {
    1
  }
}

fn detect_matrix_op(text: &str, expression: &str) -> MatrixOp {
  let lower = text.to_lowercase();
  for (op, keywords) in MATRIX_OPS {
    if contains_any(&lower, keywords) {
      return *op;
    }
  }
  let literals = expression.matches("[[").count();
  let mut depth = 0;
  let outside = expression.chars().any(|c| {
    match c {
      '[' => depth += 1,
      ']' => depth -= 1,
      _ => {}
    }
    depth == 0 && ("+-*/^".contains(c) || c.is_ascii_digit())
  });
  if literals > 1 || (literals == 1 && outside) {
    MatrixOp::Arithmetic
  } else {
    MatrixOp::Auto
  }
}

/// Classifies normalized text. An explicit `mode` overrides the keywords.
pub fn classify(
  text: &str,
  mode: Option<Intent>,
) -> Result<Query, TutorError> {
  let rules = RULES.as_ref().map_err(|e| {
    TutorError::EvaluationError(format!("قواعد التصنيف غير صالحة: {e}"))
  })?;

  let intent = mode.unwrap_or_else(|| detect_intent(rules, text));
  let order = if intent == Intent::Derivative {
    detect_order(rules, text)
  } else {
    1
  };

  let mut rest = text.to_string();
  let mut var = None;
  let mut bounds = None;

  if let Some(caps) = rules.respect_to.captures(&rest) {
    var = Some(caps[1].to_string());
    rest = rules.respect_to.replace(&rest, " ").into_owned();
  }
  if let Some(caps) = rules.leibniz.captures(&rest) {
    var.get_or_insert_with(|| caps[1].to_string());
    rest = rules.leibniz.replace(&rest, " ").into_owned();
  }
  if intent == Intent::Integral {
    if let Some(caps) = rules.bounds.captures(&rest) {
      bounds = Some((caps[1].to_string(), caps[2].to_string()));
      rest = rules.bounds.replace(&rest, " ").into_owned();
    }
  }
  if matches!(intent, Intent::Integral | Intent::Derivative) {
    if let Some(caps) = rules.differential.captures(&rest) {
      var.get_or_insert_with(|| caps[1].to_string());
      rest = rules.differential.replace_all(&rest, " ").into_owned();
    }
  }
  if intent == Intent::Derivative {
    rest = rules.order_number.replace_all(&rest, " ").into_owned();
    rest = rest.replace('\'', "");
  }

  rest = rules.arabic.replace_all(&rest, " ").into_owned();
  rest = rules.stop_words.replace_all(&rest, " ").into_owned();
  let expression = rules
    .spaces
    .replace_all(&rest, " ")
    .trim_matches(|c: char| c.is_whitespace() || c == ':' || c == ',')
    .to_string();

  let matrix_op = if intent == Intent::Matrix {
    detect_matrix_op(text, &expression)
  } else {
    MatrixOp::Auto
  };

  tracing::debug!(?intent, %expression, ?var, "classified query");
  Ok(Query {
    intent,
    expression,
    var,
    order,
    bounds,
    matrix_op,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn intents_in_priority_order() {
    let intent = |t: &str| classify(t, None).unwrap().intent;
    assert_eq!(intent("محدد [[1, 2], [3, 4]]"), Intent::Matrix);
    assert_eq!(intent("مشتقة x^2 = 3"), Intent::Derivative);
    assert_eq!(intent("تكامل x^2"), Intent::Integral);
    assert_eq!(intent("x^2 - 5x + 6 = 0"), Intent::Solve);
    assert_eq!(intent("x + y = 3; x - y = 1"), Intent::Solve);
    assert_eq!(intent("solve x^2 - 4"), Intent::Solve);
    assert_eq!(intent("2 + 3*4"), Intent::Evaluate);
  }

  #[test]
  fn explicit_mode_wins() {
    let q = classify("x^2 + 1", Some(Intent::Derivative)).unwrap();
    assert_eq!(q.intent, Intent::Derivative);
    assert_eq!(q.expression, "x^2 + 1");
  }

  #[test]
  fn mode_aliases() {
    assert_eq!("calc".parse::<Intent>().unwrap(), Intent::Evaluate);
    assert_eq!("eq".parse::<Intent>().unwrap(), Intent::Solve);
    let parsed: Intent = serde_json::from_str("\"int\"").unwrap();
    assert_eq!(parsed, Intent::Integral);
    assert!("plot".parse::<Intent>().is_err());
  }

  #[test]
  fn strips_command_words_and_finds_the_variable() {
    let q = classify("اشتق sin(y) بالنسبة إلى y", None).unwrap();
    assert_eq!(q.expression, "sin(y)");
    assert_eq!(q.var.as_deref(), Some("y"));

    let q = classify("derivative of x^3 with respect to x", None).unwrap();
    assert_eq!(q.expression, "x^3");

    let q = classify("d/dt t^2", None).unwrap();
    assert_eq!(q.var.as_deref(), Some("t"));
    assert_eq!(q.expression, "t^2");
  }

  #[test]
  fn expand_is_a_command_word() {
    let q = classify("expand (x+1)^30", None).unwrap();
    assert_eq!(q.intent, Intent::Evaluate);
    assert_eq!(q.expression, "(x+1)^30");
  }

  #[test]
  fn derivative_order() {
    assert_eq!(classify("المشتقة الثانية x^4", None).unwrap().order, 2);
    assert_eq!(classify("third derivative of x^5", None).unwrap().order, 3);
    assert_eq!(classify("derivative x^5", None).unwrap().order, 1);
    let q = classify("derivative order 3000000000 of x^2", None).unwrap();
    assert_eq!(q.order, u32::MAX);
    assert_eq!(q.expression, "x^2");
  }

  #[test]
  fn definite_bounds() {
    let q = classify("تكامل x^2 dx من 0 إلى 3", None).unwrap();
    assert_eq!(q.expression, "x^2");
    assert_eq!(q.var.as_deref(), Some("x"));
    assert_eq!(q.bounds, Some(("0".to_string(), "3".to_string())));
  }

  #[test]
  fn matrix_operations() {
    let op = |t: &str| classify(t, None).unwrap().matrix_op;
    assert_eq!(op("معكوس [[1, 2], [3, 4]]"), MatrixOp::Inverse);
    assert_eq!(op("eigenvalues [[2, 0], [0, 3]]"), MatrixOp::Eigen);
    assert_eq!(op("[[1, 2], [3, 4]] * [[0, 1], [1, 0]]"), MatrixOp::Arithmetic);
    assert_eq!(op("[[1, 2], [3, 4]]"), MatrixOp::Auto);
  }
}
