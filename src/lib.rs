use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

pub mod classify;
pub mod config;
pub mod functions;
pub mod normalize;
pub mod server;
pub mod syntax;
pub mod tutor;

pub use classify::{Intent, MatrixOp};
pub use tutor::{solve_query, AngleUnit, Options, Solution, Verbosity};

#[derive(Parser)]
#[grammar = "tutor.pest"]
pub struct TutorParser;

/// Errors surfaced to the user. The messages are Arabic because they are
/// returned verbatim in the `error` field of `/solve` responses.
#[derive(Error, Debug)]
pub enum TutorError {
  #[error("تعذّر قراءة التعبير: {0}")]
  ParseError(#[from] Box<pest::error::Error<Rule>>),
  #[error("يرجى كتابة مسألة.")]
  EmptyInput,
  #[error("المسألة أطول من المسموح ({0} حرفاً كحد أقصى).")]
  InputTooLong(usize),
  #[error("المعادلة غير صحيحة. يرجى كتابة '=' مرة واحدة في كل معادلة.")]
  InvalidEquation,
  #[error("{0}")]
  EvaluationError(String),
  #[error("غير مدعوم: {0}")]
  Unsupported(String),
  #[error("لم يتم العثور على حلول (قد لا يكون للنظام حل أو غير محدد).")]
  NoSolution,
  #[error("خطأ في المصفوفة: {0}")]
  MatrixError(String),
  #[error("استغرق الحل وقتاً أطول من المسموح.")]
  Timeout,
}

pub fn parse(
  input: &str,
) -> Result<pest::iterators::Pairs<'_, Rule>, Box<pest::error::Error<Rule>>> {
  TutorParser::parse(Rule::Program, input).map_err(Box::new)
}

/// Parses a (normalized) expression into an unsimplified `Expr`.
pub fn parse_expression(input: &str) -> Result<syntax::Expr, TutorError> {
  if input.trim().is_empty() {
    return Err(TutorError::EmptyInput);
  }
  let mut pairs = parse(input)?;
  let program = pairs.next().ok_or(TutorError::EmptyInput)?;
  syntax::pair_to_expr(program)
}

/// Parses and simplifies, returning the plain-text form. Mostly a test and
/// CLI convenience.
pub fn interpret(input: &str) -> Result<String, TutorError> {
  let expr = functions::simplify::simplify(parse_expression(input)?);
  functions::simplify::ensure_defined(&expr)?;
  Ok(syntax::expr_to_string(&expr))
}
