use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;

use crate::tutor::{AngleUnit, Verbosity};

pub const DEFAULT_CONFIG_FILE: &str = "mathtutor.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub bind_addr: String,
  pub default_verbosity: Verbosity,
  pub default_angle_unit: AngleUnit,
  pub max_input_chars: usize,
  pub max_body_bytes: usize,
  pub solve_timeout_ms: u64,
  /// Adds a permissive CORS layer.
  pub cors: bool,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      bind_addr: "0.0.0.0:10000".into(),
      default_verbosity: Verbosity::Detailed,
      default_angle_unit: AngleUnit::Degrees,
      max_input_chars: 500,
      max_body_bytes: 16 * 1024,
      solve_timeout_ms: 5000,
      cors: true,
    }
  }
}

/// Reads settings from `path` (or `mathtutor.toml` when present), then
/// applies environment overrides.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
  let mut settings = match path {
    Some(path) => read_file(path)?,
    None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
      read_file(Path::new(DEFAULT_CONFIG_FILE))?
    }
    None => Settings::default(),
  };
  apply_env(&mut settings, |key| std::env::var(key).ok())?;
  Ok(settings)
}

fn read_file(path: &Path) -> anyhow::Result<Settings> {
  let raw = fs::read_to_string(path)
    .with_context(|| format!("failed to read config '{}'", path.display()))?;
  toml::from_str(&raw)
    .with_context(|| format!("invalid config '{}'", path.display()))
}

/// Later keys win: `PORT` < `MATHTUTOR_BIND` < `APP__BIND_ADDR`.
pub fn apply_env(
  settings: &mut Settings,
  var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
  if let Some(port) = var("PORT") {
    let port: u16 = port
      .trim()
      .parse()
      .with_context(|| format!("invalid PORT '{port}'"))?;
    settings.bind_addr = format!("0.0.0.0:{port}");
  }
  if let Some(v) = var("MATHTUTOR_BIND") {
    settings.bind_addr = v;
  }
  if let Some(v) = var("APP__BIND_ADDR") {
    settings.bind_addr = v;
  }

  if let Some(v) = var("MATHTUTOR_VERBOSITY") {
    settings.default_verbosity = v.parse().map_err(anyhow::Error::from)?;
  }
  if let Some(v) = var("MATHTUTOR_ANGLE_UNIT") {
    settings.default_angle_unit = v.parse().map_err(anyhow::Error::from)?;
  }
  if let Some(v) = var("MATHTUTOR_TIMEOUT_MS") {
    settings.solve_timeout_ms = v
      .trim()
      .parse()
      .with_context(|| format!("invalid MATHTUTOR_TIMEOUT_MS '{v}'"))?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;

  fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn defaults_match_the_hosting_port() {
    let settings = Settings::default();
    assert_eq!(settings.bind_addr, "0.0.0.0:10000");
    assert_eq!(settings.default_angle_unit, AngleUnit::Degrees);
  }

  #[test]
  fn port_and_bind_overrides() {
    let mut settings = Settings::default();
    apply_env(&mut settings, env(&[("PORT", "8080")])).unwrap();
    assert_eq!(settings.bind_addr, "0.0.0.0:8080");

    apply_env(
      &mut settings,
      env(&[("PORT", "8080"), ("APP__BIND_ADDR", "127.0.0.1:9000")]),
    )
    .unwrap();
    assert_eq!(settings.bind_addr, "127.0.0.1:9000");
  }

  #[test]
  fn tutor_defaults_from_env() {
    let mut settings = Settings::default();
    apply_env(
      &mut settings,
      env(&[
        ("MATHTUTOR_VERBOSITY", "brief"),
        ("MATHTUTOR_ANGLE_UNIT", "rad"),
        ("MATHTUTOR_TIMEOUT_MS", "250"),
      ]),
    )
    .unwrap();
    assert_eq!(settings.default_verbosity, Verbosity::Brief);
    assert_eq!(settings.default_angle_unit, AngleUnit::Radians);
    assert_eq!(settings.solve_timeout_ms, 250);
  }

  #[test]
  fn rejects_bad_values() {
    let mut settings = Settings::default();
    assert!(apply_env(&mut settings, env(&[("PORT", "http")])).is_err());
    assert!(
      apply_env(&mut settings, env(&[("MATHTUTOR_VERBOSITY", "loud")]))
        .is_err()
    );
  }

  #[test]
  fn partial_toml_keeps_defaults() {
    let settings: Settings =
      toml::from_str("bind_addr = \"127.0.0.1:3000\"\ncors = false\n")
        .unwrap();
    assert_eq!(settings.bind_addr, "127.0.0.1:3000");
    assert!(!settings.cors);
    assert_eq!(settings.max_input_chars, 500);
  }
}
