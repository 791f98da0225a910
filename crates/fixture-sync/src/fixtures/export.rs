//! Export of materialized fixtures to serialized formats.
//!
//! Supports JSON and YAML (both lossless round-trips) plus a Python literal
//! rendering for pasting fixture data into Python test suites.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{FixtureError, FixtureResult};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum ExportFormat {
	/// Pretty-printed JSON (default).
	#[default]
	Json,

	/// Python list-literal expression.
	Python,

	/// YAML (requires the `yaml` feature).
	Yaml,
}

impl ExportFormat {
	/// Determines the export format from a file extension.
	///
	/// # Example
	///
	/// ```
	/// # use fixture_sync::fixtures::ExportFormat;
	/// assert_eq!(ExportFormat::from_extension("json"), Some(ExportFormat::Json));
	/// assert_eq!(ExportFormat::from_extension("py"), Some(ExportFormat::Python));
	/// assert_eq!(ExportFormat::from_extension("yml"), Some(ExportFormat::Yaml));
	/// assert_eq!(ExportFormat::from_extension("xml"), None);
	/// ```
	pub fn from_extension(ext: &str) -> Option<Self> {
		match ext.to_lowercase().as_str() {
			"json" => Some(Self::Json),
			"py" | "python" => Some(Self::Python),
			"yaml" | "yml" => Some(Self::Yaml),
			_ => None,
		}
	}

	/// Returns the default file extension for this format.
	pub fn extension(&self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Python => "py",
			Self::Yaml => "yaml",
		}
	}

	/// Renders materialized fixture configs to a string in this format.
	pub fn render(&self, fixtures: &[Map<String, Value>]) -> FixtureResult<String> {
		match self {
			Self::Json => Ok(serde_json::to_string_pretty(fixtures)?),
			Self::Python => Ok(python_literal(&Value::Array(
				fixtures.iter().cloned().map(Value::Object).collect(),
			))),
			Self::Yaml => render_yaml(fixtures),
		}
	}
}

#[cfg(feature = "yaml")]
fn render_yaml(fixtures: &[Map<String, Value>]) -> FixtureResult<String> {
	Ok(serde_yaml::to_string(fixtures)?)
}

/// Stub for YAML rendering when the feature is not enabled.
#[cfg(not(feature = "yaml"))]
fn render_yaml(_fixtures: &[Map<String, Value>]) -> FixtureResult<String> {
	Err(FixtureError::UnsupportedFormat(
		"YAML export requires the 'yaml' feature".to_string(),
	))
}

impl std::fmt::Display for ExportFormat {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Json => write!(f, "json"),
			Self::Python => write!(f, "python"),
			Self::Yaml => write!(f, "yaml"),
		}
	}
}

impl FromStr for ExportFormat {
	type Err = FixtureError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"json" => Ok(Self::Json),
			"python" | "py" => Ok(Self::Python),
			"yaml" | "yml" => Ok(Self::Yaml),
			other => Err(FixtureError::UnsupportedFormat(other.to_string())),
		}
	}
}

/// Renders a JSON value as a Python literal expression.
///
/// `null`/`true`/`false` become `None`/`True`/`False`; strings are
/// single-quoted with Python escaping. Re-parsing the output in a Python
/// runtime reconstructs an equivalent structure.
pub fn python_literal(value: &Value) -> String {
	match value {
		Value::Null => "None".to_string(),
		Value::Bool(true) => "True".to_string(),
		Value::Bool(false) => "False".to_string(),
		Value::Number(n) => n.to_string(),
		Value::String(s) => python_string(s),
		Value::Array(items) => {
			let rendered: Vec<String> = items.iter().map(python_literal).collect();
			format!("[{}]", rendered.join(", "))
		}
		Value::Object(map) => {
			let rendered: Vec<String> = map
				.iter()
				.map(|(key, value)| format!("{}: {}", python_string(key), python_literal(value)))
				.collect();
			format!("{{{}}}", rendered.join(", "))
		}
	}
}

fn python_string(s: &str) -> String {
	let mut out = String::with_capacity(s.len() + 2);
	out.push('\'');
	for c in s.chars() {
		match c {
			'\\' => out.push_str("\\\\"),
			'\'' => out.push_str("\\'"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
			c => out.push(c),
		}
	}
	out.push('\'');
	out
}
