//! Convention-based pairing of generator definitions with fixture data.
//!
//! A generator definition file named `<base>_generator.{json,yaml,yml}` is
//! paired with a fixture data file named `<base>_fixtures.{json,yaml,yml}`
//! whose top-level mapping exposes an uppercase `<BASE>_FIXTURES` key. Any
//! deviation from the convention is a recorded [`DiscoveryFailure`], never a
//! silent skip, and never fatal to the discovery of sibling candidates.

use std::path::{Path, PathBuf};

use serde_json::Value;

use super::generator::{DefinedGenerator, GeneratorDef};
use super::source::FixtureSource;
use crate::client::ApiClient;
use crate::error::FixtureResult;

/// Suffix identifying generator definition files.
pub const GENERATOR_SUFFIX: &str = "_generator";

/// Suffix of the paired fixture data file stem.
pub const FIXTURE_MODULE_SUFFIX: &str = "_fixtures";

/// Suffix of the exported fixture mapping keys.
pub const FIXTURE_EXPORT_SUFFIX: &str = "_FIXTURES";

const RECOGNIZED_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// A generator candidate located during a directory scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorDescriptor {
	/// Base name, the file stem with the `_generator` suffix stripped.
	pub base: String,

	/// Path to the definition file.
	pub path: PathBuf,
}

impl GeneratorDescriptor {
	/// Builds a descriptor from a candidate path.
	///
	/// Returns `None` for paths that are not generator candidates: wrong
	/// suffix or extension, underscore-prefixed names, or the shared
	/// `base_generator` definition.
	pub fn from_path(path: &Path) -> Option<Self> {
		let stem = path.file_stem()?.to_str()?;
		let ext = path.extension()?.to_str()?;
		if !RECOGNIZED_EXTENSIONS.contains(&ext.to_lowercase().as_str()) {
			return None;
		}
		if stem.starts_with('_') {
			return None;
		}
		let base = stem.strip_suffix(GENERATOR_SUFFIX)?;
		if base.is_empty() || base == "base" {
			return None;
		}
		Some(Self {
			base: base.to_string(),
			path: path.to_path_buf(),
		})
	}

	/// Returns the expected fixture data file stem (`<base>_fixtures`).
	pub fn fixture_module(&self) -> String {
		format!("{}{}", self.base, FIXTURE_MODULE_SUFFIX)
	}

	/// Returns the expected exported mapping key (`<BASE>_FIXTURES`).
	pub fn fixture_export(&self) -> String {
		format!("{}{}", self.base.to_uppercase(), FIXTURE_EXPORT_SUFFIX)
	}
}

/// Why a candidate failed discovery or instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryFailure {
	/// No paired fixture data file exists and the definition has no defaults.
	MissingFixtureSource,

	/// The fixture data file exists but lacks the expected uppercase export.
	MissingFixtureExport {
		/// The expected key name (`<BASE>_FIXTURES`).
		expected: String,
	},

	/// The definition or fixture data could not be parsed; carries the
	/// original error text.
	Invalid(String),
}

impl std::fmt::Display for DiscoveryFailure {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::MissingFixtureSource => write!(f, "no fixture source found"),
			Self::MissingFixtureExport { expected } => {
				write!(f, "fixture export not found (expected '{}')", expected)
			}
			Self::Invalid(message) => write!(f, "{}", message),
		}
	}
}

/// Directory pair the resolver operates on.
#[derive(Debug, Clone)]
pub struct DiscoverySettings {
	/// Directory containing `<base>_generator.*` definition files.
	pub generators_dir: PathBuf,

	/// Directory containing `<base>_fixtures.*` data files.
	pub fixtures_dir: PathBuf,
}

impl DiscoverySettings {
	/// Creates settings for the given directory pair.
	pub fn new(generators_dir: impl Into<PathBuf>, fixtures_dir: impl Into<PathBuf>) -> Self {
		Self {
			generators_dir: generators_dir.into(),
			fixtures_dir: fixtures_dir.into(),
		}
	}
}

/// Locates generator candidates and pairs them with their fixture data.
#[derive(Debug, Clone)]
pub struct DiscoveryResolver {
	settings: DiscoverySettings,
}

impl DiscoveryResolver {
	/// Creates a resolver over the given settings.
	pub fn new(settings: DiscoverySettings) -> Self {
		Self { settings }
	}

	/// Scans the generators directory for candidates, in lexical file-name
	/// order so listing output is reproducible across runs.
	///
	/// # Errors
	///
	/// An unreadable generators directory is a wholesale error; individual
	/// non-candidate files are skipped silently.
	pub fn scan(&self) -> FixtureResult<Vec<GeneratorDescriptor>> {
		let mut candidates = Vec::new();
		for entry in std::fs::read_dir(&self.settings.generators_dir)? {
			let entry = entry?;
			if !entry.file_type()?.is_file() {
				continue;
			}
			if let Some(descriptor) = GeneratorDescriptor::from_path(&entry.path()) {
				candidates.push(descriptor);
			}
		}
		candidates.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
		Ok(candidates)
	}

	/// Pairs a candidate with its fixture data and instantiates it.
	///
	/// The fixture pairing rules, in order:
	/// - a paired `<base>_fixtures.*` file must expose the `<BASE>_FIXTURES`
	///   key (its absence is the distinct "fixture export not found" failure);
	/// - with no paired file, the definition's inline `defaults` are used;
	/// - with neither, the candidate fails with "no fixture source found".
	pub fn resolve(
		&self,
		descriptor: &GeneratorDescriptor,
		client: Option<&ApiClient>,
	) -> Result<DefinedGenerator, DiscoveryFailure> {
		let def = self.load_definition(descriptor)?;

		let source = match self.load_fixture_source(descriptor)? {
			Some(source) => source,
			None => match def.defaults.clone() {
				Some(defaults) => {
					tracing::debug!(
						base = %descriptor.base,
						"no fixture source file; using definition defaults"
					);
					defaults
				}
				None => return Err(DiscoveryFailure::MissingFixtureSource),
			},
		};

		let mut generator = DefinedGenerator::new(descriptor.base.clone(), def, source);
		if let Some(client) = client {
			generator = generator.with_client(client.clone());
		}
		Ok(generator)
	}

	fn load_definition(
		&self,
		descriptor: &GeneratorDescriptor,
	) -> Result<GeneratorDef, DiscoveryFailure> {
		let content = std::fs::read_to_string(&descriptor.path).map_err(|e| {
			DiscoveryFailure::Invalid(format!(
				"failed to read {}: {}",
				descriptor.path.display(),
				e
			))
		})?;
		let value = parse_value(&content, &descriptor.path)?;
		serde_json::from_value(value).map_err(|e| {
			DiscoveryFailure::Invalid(format!(
				"invalid generator definition {}: {}",
				descriptor.path.display(),
				e
			))
		})
	}

	/// Loads and merges the paired fixture data, or `Ok(None)` when no
	/// fixture file exists for this base name.
	fn load_fixture_source(
		&self,
		descriptor: &GeneratorDescriptor,
	) -> Result<Option<FixtureSource>, DiscoveryFailure> {
		let module = descriptor.fixture_module();
		let path = match RECOGNIZED_EXTENSIONS
			.iter()
			.map(|ext| self.settings.fixtures_dir.join(format!("{}.{}", module, ext)))
			.find(|candidate| candidate.is_file())
		{
			Some(path) => path,
			None => return Ok(None),
		};

		let content = std::fs::read_to_string(&path).map_err(|e| {
			DiscoveryFailure::Invalid(format!("failed to read {}: {}", path.display(), e))
		})?;
		let value = parse_value(&content, &path)?;

		let exports = match value {
			Value::Object(map) => map,
			_ => {
				return Err(DiscoveryFailure::Invalid(format!(
					"fixture file {} must be a top-level mapping",
					path.display()
				)))
			}
		};

		let expected = descriptor.fixture_export();
		if !exports.contains_key(&expected) {
			return Err(DiscoveryFailure::MissingFixtureExport { expected });
		}

		// The primary export first, then every other *_FIXTURES key in file
		// order.
		let mut source = FixtureSource::new();
		let mut loaded = Vec::new();
		for (key, export) in exports {
			if key != expected && !key.ends_with(FIXTURE_EXPORT_SUFFIX) {
				continue;
			}
			let part: FixtureSource = serde_json::from_value(export).map_err(|e| {
				DiscoveryFailure::Invalid(format!(
					"invalid fixture export '{}' in {}: {}",
					key,
					path.display(),
					e
				))
			})?;
			if key == expected {
				let mut primary = part;
				primary.merge(std::mem::take(&mut source));
				source = primary;
			} else {
				source.merge(part);
			}
			loaded.push(key);
		}
		tracing::info!(
			module = %module,
			exports = %loaded.join(", "),
			"loaded fixtures"
		);
		Ok(Some(source))
	}
}

#[cfg(feature = "yaml")]
fn parse_value(content: &str, path: &Path) -> Result<Value, DiscoveryFailure> {
	let is_yaml = matches!(
		path.extension().and_then(|e| e.to_str()),
		Some("yaml") | Some("yml")
	);
	if is_yaml {
		serde_yaml::from_str(content).map_err(|e| {
			DiscoveryFailure::Invalid(format!("invalid YAML in {}: {}", path.display(), e))
		})
	} else {
		serde_json::from_str(content).map_err(|e| {
			DiscoveryFailure::Invalid(format!("invalid JSON in {}: {}", path.display(), e))
		})
	}
}

/// Stub for YAML parsing when the feature is not enabled.
#[cfg(not(feature = "yaml"))]
fn parse_value(content: &str, path: &Path) -> Result<Value, DiscoveryFailure> {
	if matches!(
		path.extension().and_then(|e| e.to_str()),
		Some("yaml") | Some("yml")
	) {
		return Err(DiscoveryFailure::Invalid(
			"YAML support requires the 'yaml' feature".to_string(),
		));
	}
	serde_json::from_str(content)
		.map_err(|e| DiscoveryFailure::Invalid(format!("invalid JSON in {}: {}", path.display(), e)))
}
