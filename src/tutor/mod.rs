//! Request flow: normalize, classify, compute and explain.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::classify::{classify, Intent, Query};
use crate::normalize::normalize;
use crate::syntax::Expr;
use crate::TutorError;

mod derivative;
mod equation;
mod evaluate;
mod fraction;
mod integral;
mod matrix;
pub mod phrases;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
  /// Core computation steps only.
  Brief,
  /// Adds rule explanations and per-term work.
  #[default]
  Detailed,
}

impl FromStr for Verbosity {
  type Err = TutorError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "brief" | "short" => Ok(Verbosity::Brief),
      "detailed" | "full" => Ok(Verbosity::Detailed),
      other => Err(TutorError::Unsupported(format!("مستوى الشرح '{other}'"))),
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
  /// Bare numeric trig arguments are read as degrees.
  #[default]
  #[serde(alias = "deg")]
  Degrees,
  #[serde(alias = "rad")]
  Radians,
}

impl FromStr for AngleUnit {
  type Err = TutorError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "degrees" | "deg" => Ok(AngleUnit::Degrees),
      "radians" | "rad" => Ok(AngleUnit::Radians),
      other => Err(TutorError::Unsupported(format!("وحدة الزاوية '{other}'"))),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
  /// Forces an intent instead of guessing it from keywords.
  pub mode: Option<Intent>,
  pub verbosity: Verbosity,
  pub angle_unit: AngleUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
  pub result: String,
  pub latex: String,
  pub steps: Vec<String>,
  #[serde(rename = "type")]
  pub kind: Intent,
  /// One variable → value map per solution of an equation or system.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub solutions: Option<Vec<BTreeMap<String, String>>>,
}

/// Collects explanation lines; rule explanations are kept only in
/// detailed mode.
pub(crate) struct Steps {
  verbosity: Verbosity,
  lines: Vec<String>,
}

impl Steps {
  fn new(verbosity: Verbosity) -> Self {
    Steps {
      verbosity,
      lines: Vec::new(),
    }
  }

  pub(crate) fn push(&mut self, line: impl Into<String>) {
    self.lines.push(line.into());
  }

  pub(crate) fn explain(&mut self, line: impl Into<String>) {
    if self.detailed() {
      self.lines.push(line.into());
    }
  }

  pub(crate) fn detailed(&self) -> bool {
    self.verbosity == Verbosity::Detailed
  }

  pub(crate) fn finish(
    self,
    kind: Intent,
    result: String,
    latex: String,
  ) -> Solution {
    Solution {
      result,
      latex,
      steps: self.lines,
      kind,
      solutions: None,
    }
  }
}

/// The variable to work with: the one the query names, else `x` when
/// present, else the first free symbol, else `x`.
pub(crate) fn resolve_var(query: &Query, exprs: &[&Expr]) -> String {
  if let Some(var) = &query.var {
    return var.clone();
  }
  let mut symbols = std::collections::BTreeSet::new();
  for e in exprs {
    symbols.extend(e.free_symbols());
  }
  if symbols.is_empty() || symbols.contains("x") {
    "x".to_string()
  } else {
    symbols.into_iter().next().unwrap_or_else(|| "x".to_string())
  }
}

/// Solves a free-form query and explains the work.
pub fn solve_query(
  text: &str,
  options: &Options,
) -> Result<Solution, TutorError> {
  if text.trim().is_empty() {
    return Err(TutorError::EmptyInput);
  }
  let started = Instant::now();
  let normalized = normalize(text, options.angle_unit)?;
  let query = classify(&normalized.text, options.mode)?;
  if query.expression.is_empty() {
    return Err(TutorError::EmptyInput);
  }

  let mut steps = Steps::new(options.verbosity);
  if normalized.degrees_converted {
    steps.explain(phrases::DEGREE_NOTE);
  }

  let solution = match query.intent {
    Intent::Evaluate => evaluate::solve(&query, steps),
    Intent::Fraction => fraction::solve(&query, steps),
    Intent::Derivative => derivative::solve(&query, steps),
    Intent::Integral => integral::solve(&query, steps),
    Intent::Solve => equation::solve(&query, steps),
    Intent::Matrix => matrix::solve(&query, steps),
  }?;

  tracing::info!(
    intent = solution.kind.as_str(),
    steps = solution.steps.len(),
    elapsed_ms = started.elapsed().as_millis() as u64,
    "solved query"
  );
  Ok(solution)
}
