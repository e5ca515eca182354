//! Text clean-up run before classification: Arabic digits and vocabulary,
//! Unicode operators, degree literals and matrix braces.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::tutor::AngleUnit;
use crate::TutorError;

#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
  pub text: String,
  /// A trig argument was read in degrees and rewritten in radians.
  pub degrees_converted: bool,
}

/// Whole Arabic words with an ASCII meaning.
const WORDS: &[(&str, &str)] = &[
  ("جا", "sin"),
  ("جتا", "cos"),
  ("ظا", "tan"),
  ("ظتا", "cot"),
  ("قا", "sec"),
  ("قتا", "csc"),
  ("لو", "log"),
  ("جذر", "sqrt"),
  ("ط", "pi"),
  ("س", "x"),
  ("ص", "y"),
  ("ع", "z"),
  ("زائد", " + "),
  ("ناقص", " - "),
  ("يساوي", " = "),
  ("أس", " ^ "),
  ("تربيع", "^2"),
  ("تكعيب", "^3"),
];

/// Multi-word phrases, rewritten before single words.
const PHRASES: &[(&str, &str)] = &[
  (r"مضروب[اًا]*\s+في", " * "),
  (r"مقسوم[اًا]*\s+على", " / "),
  (r"(?:ال)?جذر\s+(?:ال)?تربيعي(?:\s+ل\b)?", " sqrt "),
  (r"(?:إلى|الى)\s+(?:ال)?قوة", " ^ "),
];

const TRIG: &str = "sin|cos|tan|cot|sec|csc";

struct Rules {
  phrases: Vec<(Regex, &'static str)>,
  arabic_word: Regex,
  trig_power: Regex,
  degree_literal: Regex,
  double_parens: Regex,
  bare_trig_call: Regex,
  bare_trig_applied: Regex,
  caret: Regex,
  spaces: Regex,
}

impl Rules {
  fn compile() -> Result<Self, regex::Error> {
    let phrases = PHRASES
      .iter()
      .map(|(pattern, with)| Regex::new(pattern).map(|re| (re, *with)))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Rules {
      phrases,
      arabic_word: Regex::new(r"\p{Arabic}+")?,
      trig_power: Regex::new(&format!(
        r"({TRIG})\^(\d+)\s*\(([^()]*)\)"
      ))?,
      degree_literal: Regex::new(
        r"(\d+(?:\.\d+)?)\s*(?:°|º|˚|درجات|درجة|deg(?:rees?)?\b)",
      )?,
      double_parens: Regex::new(r"\(\((pi\*[\d.]+/180)\)\)")?,
      bare_trig_call: Regex::new(&format!(
        r"({TRIG})\s*\(\s*([+\-]?)\s*(\d+(?:\.\d+)?)\s*\)"
      ))?,
      bare_trig_applied: Regex::new(&format!(
        r"({TRIG})\s+(\d+(?:\.\d+)?)(\s*(?:$|[+\-*/)=;,]))"
      ))?,
      caret: Regex::new(r"\s*\^\s*")?,
      spaces: Regex::new(r"\s+")?,
    })
  }
}

static RULES: LazyLock<Result<Rules, regex::Error>> =
  LazyLock::new(Rules::compile);

fn map_char(c: char, out: &mut String) {
  match c {
    '\u{0660}'..='\u{0669}' => {
      out.push(char::from(b'0' + (c as u32 - 0x0660) as u8))
    }
    '\u{06F0}'..='\u{06F9}' => {
      out.push(char::from(b'0' + (c as u32 - 0x06F0) as u8))
    }
    '٫' => out.push('.'),
    '،' => out.push(','),
    '؛' | '\n' => out.push(';'),
    '؟' | 'ـ' | '٬' | '\r' => {}
    '×' | '·' | '⋅' => out.push('*'),
    '÷' | '∕' => out.push('/'),
    '−' | '–' | '—' => out.push('-'),
    '＝' => out.push('='),
    'π' => out.push_str("pi"),
    '√' => out.push_str("sqrt"),
    '²' => out.push_str("^2"),
    '³' => out.push_str("^3"),
    '∫' => out.push_str(" integral "),
    _ => out.push(c),
  }
}

/// `asin(0.5)` contains `sin(0.5)`; only standalone names count.
fn after_letter(source: &str, start: usize) -> bool {
  source[..start]
    .chars()
    .next_back()
    .is_some_and(|c| c.is_ascii_alphabetic())
}

fn radians(sign: &str, degrees: &str) -> String {
  let sign = if sign == "-" { "-" } else { "" };
  format!("{sign}pi*{degrees}/180")
}

/// Rewrites a free-form query into the ASCII form the parser and the
/// classifier understand.
pub fn normalize(
  text: &str,
  unit: AngleUnit,
) -> Result<Normalized, TutorError> {
  let rules = RULES.as_ref().map_err(|e| {
    TutorError::EvaluationError(format!("قواعد التطبيع غير صالحة: {e}"))
  })?;

  let mut text = {
    let source = text.trim().replace("**", "^");
    let mut out = String::with_capacity(source.len());
    for c in source.chars() {
      map_char(c, &mut out);
    }
    out
  };

  for (re, with) in &rules.phrases {
    text = re.replace_all(&text, *with).into_owned();
  }
  text = rules
    .arabic_word
    .replace_all(&text, |caps: &Captures| {
      let word = &caps[0];
      WORDS
        .iter()
        .find(|(arabic, _)| *arabic == word)
        .map_or_else(|| word.to_string(), |(_, ascii)| ascii.to_string())
    })
    .into_owned();

  // sin^2(x) → sin(x)^2
  text = rules
    .trig_power
    .replace_all(&text, "$1($3)^$2")
    .into_owned();

  let mut degrees_converted = false;
  if rules.degree_literal.is_match(&text) {
    degrees_converted = true;
    text = rules
      .degree_literal
      .replace_all(&text, |caps: &Captures| {
        format!("({})", radians("", &caps[1]))
      })
      .into_owned();
    text = rules.double_parens.replace_all(&text, "($1)").into_owned();
  }

  if unit == AngleUnit::Degrees {
    let mut converted = false;
    let source = text.clone();
    text = rules
      .bare_trig_call
      .replace_all(&source, |caps: &Captures| {
        let start = caps.get(0).map_or(0, |m| m.start());
        if after_letter(&source, start)
          || caps[3].trim_start_matches(['0', '.']).is_empty()
        {
          return caps[0].to_string();
        }
        converted = true;
        format!("{}({})", &caps[1], radians(&caps[2], &caps[3]))
      })
      .into_owned();
    let source = text.clone();
    text = rules
      .bare_trig_applied
      .replace_all(&source, |caps: &Captures| {
        let start = caps.get(0).map_or(0, |m| m.start());
        if after_letter(&source, start)
          || caps[2].trim_start_matches(['0', '.']).is_empty()
        {
          return caps[0].to_string();
        }
        converted = true;
        format!("{}({}){}", &caps[1], radians("", &caps[2]), &caps[3])
      })
      .into_owned();
    degrees_converted |= converted;
  }

  if text.contains("{{") {
    text = text.replace('{', "[").replace('}', "]");
  }

  let text = rules.caret.replace_all(&text, "^");
  let text = rules.spaces.replace_all(&text, " ").trim().to_string();
  Ok(Normalized {
    text,
    degrees_converted,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn norm(text: &str) -> String {
    normalize(text, AngleUnit::Degrees).unwrap().text
  }

  #[test]
  fn arabic_digits_and_separators() {
    assert_eq!(norm("٣٫٥ + ۴"), "3.5 + 4");
    assert_eq!(norm("كم ناتج ٢×٣؟"), "كم ناتج 2*3");
  }

  #[test]
  fn vocabulary() {
    assert_eq!(norm("2س زائد 3 يساوي 7"), "2x + 3 = 7");
    assert_eq!(norm("جتا(س) مضروب في ص"), "cos(x) * y");
    assert_eq!(norm("س تربيع ناقص 1"), "x^2 - 1");
  }

  #[test]
  fn trig_power_is_moved_after_the_call() {
    assert_eq!(norm("sin²(x) + cos^2(x)"), "sin(x)^2 + cos(x)^2");
  }

  #[test]
  fn degree_conversion() {
    let n = normalize("جا(٣٠)", AngleUnit::Degrees).unwrap();
    assert_eq!(n.text, "sin(pi*30/180)");
    assert!(n.degrees_converted);

    let n = normalize("sin(30)", AngleUnit::Radians).unwrap();
    assert_eq!(n.text, "sin(30)");
    assert!(!n.degrees_converted);

    let n = normalize("cos(60°)", AngleUnit::Radians).unwrap();
    assert_eq!(n.text, "cos(pi*60/180)");
    assert!(n.degrees_converted);

    assert_eq!(norm("sin(-45)"), "sin(-pi*45/180)");
    assert_eq!(norm("sin(0)"), "sin(0)");
    assert_eq!(norm("2sin(30)"), "2sin(pi*30/180)");
    assert_eq!(norm("asin(0.5)"), "asin(0.5)");
  }

  #[test]
  fn matrix_braces() {
    assert_eq!(norm("{{1, 2}, {3, 4}}"), "[[1, 2], [3, 4]]");
  }
}
