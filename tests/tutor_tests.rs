use mathtutor::{solve_query, AngleUnit, Intent, Options, Verbosity};

fn solve(text: &str) -> mathtutor::Solution {
  solve_query(text, &Options::default()).unwrap()
}

fn solve_with(text: &str, options: Options) -> mathtutor::Solution {
  solve_query(text, &options).unwrap()
}

fn brief() -> Options {
  Options {
    verbosity: Verbosity::Brief,
    ..Options::default()
  }
}

mod tutor_tests {
  use super::*;

  mod calculus;
  mod classify;
  mod evaluate;
  mod matrix;
  mod normalize;
  mod solve;
}
