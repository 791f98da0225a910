//! Generator registry and cross-generator orchestration.
//!
//! The registry is built once per invocation: discovery instantiates every
//! pairable candidate and records a failure reason for the rest. Operations
//! run either against one named generator or across all of them, aggregating
//! per-generator outcomes so a single broken generator never prevents its
//! siblings from completing.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;

use super::discovery::{DiscoveryFailure, DiscoveryResolver, DiscoverySettings};
use super::generator::Generator;
use crate::client::{ApiClient, ApiTarget};
use crate::error::{FixtureError, FixtureResult};

/// The result of running one operation against one generator.
#[derive(Debug)]
pub struct GeneratorOutcome<T> {
	/// Generator base name.
	pub generator: String,

	/// The operation's result for this generator.
	pub result: FixtureResult<T>,
}

/// Aggregated outcomes of running an operation across generators.
///
/// Outcomes appear in discovery order. Failures sit alongside successes; the
/// run itself only errors for problems outside any single generator (an
/// unknown generator name).
#[derive(Debug, Default)]
pub struct RunReport<T> {
	/// Per-generator outcomes, in discovery order.
	pub outcomes: Vec<GeneratorOutcome<T>>,
}

impl<T> RunReport<T> {
	/// Returns the number of outcomes.
	pub fn len(&self) -> usize {
		self.outcomes.len()
	}

	/// Returns true if no generator was run.
	pub fn is_empty(&self) -> bool {
		self.outcomes.is_empty()
	}

	/// Returns true if every generator succeeded.
	pub fn is_all_ok(&self) -> bool {
		self.outcomes.iter().all(|outcome| outcome.result.is_ok())
	}

	/// Iterates over `(generator, value)` pairs for successful outcomes.
	pub fn successes(&self) -> impl Iterator<Item = (&str, &T)> {
		self.outcomes.iter().filter_map(|outcome| {
			outcome
				.result
				.as_ref()
				.ok()
				.map(|value| (outcome.generator.as_str(), value))
		})
	}

	/// Iterates over `(generator, error)` pairs for failed outcomes.
	pub fn failures(&self) -> impl Iterator<Item = (&str, &FixtureError)> {
		self.outcomes.iter().filter_map(|outcome| {
			outcome
				.result
				.as_ref()
				.err()
				.map(|error| (outcome.generator.as_str(), error))
		})
	}
}

/// Insertion-ordered registry of generators plus discovery failures.
#[derive(Default)]
pub struct GeneratorRegistry {
	generators: IndexMap<String, Arc<dyn Generator>>,
	failures: IndexMap<String, DiscoveryFailure>,
}

impl GeneratorRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Discovers and instantiates every pairable generator under `settings`.
	///
	/// When `target` is given, each instantiated generator carries an API
	/// client for database operations; file-generation callers pass `None`.
	///
	/// Per-candidate failures are recorded, never raised. Only an unreadable
	/// generators directory (or an unusable target configuration) is a
	/// wholesale error.
	pub fn discover(
		settings: DiscoverySettings,
		target: Option<&ApiTarget>,
	) -> FixtureResult<Self> {
		let client = target.map(ApiClient::new).transpose()?;
		let resolver = DiscoveryResolver::new(settings);

		let mut registry = Self::new();
		for descriptor in resolver.scan()? {
			match resolver.resolve(&descriptor, client.as_ref()) {
				Ok(generator) => {
					tracing::info!(base = %descriptor.base, "loaded generator");
					registry.register(Arc::new(generator));
				}
				Err(failure) => {
					tracing::warn!(base = %descriptor.base, %failure, "skipping generator");
					registry.record_failure(descriptor.base.clone(), failure);
				}
			}
		}
		Ok(registry)
	}

	/// Registers a generator explicitly, replacing any generator with the
	/// same name. This is the registration path for programmatic generators
	/// that are not backed by definition files.
	pub fn register(&mut self, generator: Arc<dyn Generator>) {
		self.generators.insert(generator.name().to_string(), generator);
	}

	/// Records a discovery failure for a candidate base name.
	pub fn record_failure(&mut self, base: impl Into<String>, failure: DiscoveryFailure) {
		self.failures.insert(base.into(), failure);
	}

	/// Returns the generator registered under `name`.
	pub fn get(&self, name: &str) -> Option<&Arc<dyn Generator>> {
		self.generators.get(name)
	}

	/// Returns registered generator names, in discovery order.
	pub fn names(&self) -> Vec<&str> {
		self.generators.keys().map(String::as_str).collect()
	}

	/// Iterates over `(name, generator)` pairs in discovery order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Generator>)> {
		self.generators
			.iter()
			.map(|(name, generator)| (name.as_str(), generator))
	}

	/// Returns the base-name → failure-reason map for skipped candidates.
	pub fn failures(&self) -> &IndexMap<String, DiscoveryFailure> {
		&self.failures
	}

	/// Returns the number of registered generators.
	pub fn len(&self) -> usize {
		self.generators.len()
	}

	/// Returns true if no generator is registered.
	pub fn is_empty(&self) -> bool {
		self.generators.is_empty()
	}

	/// Runs `operation` against one named generator, or against every
	/// registered generator when `name` is `None`.
	///
	/// With no name, generators run sequentially in discovery order and every
	/// outcome is captured in the report; one generator's failure never stops
	/// its siblings. With a name, an unknown name errors with the known
	/// generator names, and the operation's own error propagates immediately
	/// (a setup defect for a specifically requested generator should not be
	/// silently folded into a report).
	pub async fn run_for<T, F>(&self, name: Option<&str>, operation: F) -> FixtureResult<RunReport<T>>
	where
		F: Fn(Arc<dyn Generator>) -> BoxFuture<'static, FixtureResult<T>>,
	{
		match name {
			Some(name) => {
				let generator = self.get(name).ok_or_else(|| FixtureError::GeneratorNotFound {
					name: name.to_string(),
					known: self.names().iter().map(|n| n.to_string()).collect(),
				})?;
				let value = operation(Arc::clone(generator)).await?;
				Ok(RunReport {
					outcomes: vec![GeneratorOutcome {
						generator: name.to_string(),
						result: Ok(value),
					}],
				})
			}
			None => {
				let mut outcomes = Vec::with_capacity(self.generators.len());
				for (gen_name, generator) in &self.generators {
					let result = operation(Arc::clone(generator)).await;
					if let Err(error) = &result {
						tracing::warn!(generator = %gen_name, %error, "generator operation failed");
					}
					outcomes.push(GeneratorOutcome {
						generator: gen_name.clone(),
						result,
					});
				}
				Ok(RunReport { outcomes })
			}
		}
	}
}
