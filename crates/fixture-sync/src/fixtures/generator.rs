//! The unified generator contract.
//!
//! Every generator exposes the same operation set: enumerate fixtures, export
//! them to a file format, and create/list/clear them in a target HTTP API.
//! [`Generator`] provides default implementations for everything except
//! [`Generator::list_existing_fixtures`], which has no usable generic default
//! because list-response shapes vary between APIs.
//!
//! [`DefinedGenerator`] is the declarative implementation instantiated by
//! discovery from a `<base>_generator.{json,yaml,yml}` definition file.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::export::ExportFormat;
use super::source::{FixtureSource, FIXTURE_ID_KEY};
use crate::client::ApiClient;
use crate::error::{FixtureError, FixtureResult};

/// Placeholder substituted with the fixture name in create endpoint templates.
pub const FIXTURE_ID_PLACEHOLDER: &str = "{fixture_id}";

/// Instance-level endpoint templates for database operations.
///
/// All three are optional; a generator with no explicit configuration falls
/// back to contract-level endpoints derived from its base name.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EndpointConfig {
	/// Create/replace endpoint template; must contain `{fixture_id}`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub create_endpoint: Option<String>,

	/// Endpoint for listing existing fixtures.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub list_endpoint: Option<String>,

	/// Endpoint for clearing all fixtures.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub clear_endpoint: Option<String>,
}

/// Name and description of a single fixture, for listing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureSummary {
	/// Fixture name within its source.
	pub name: String,
	/// Human-readable description (may be empty).
	pub description: String,
}

/// Per-fixture failure collected during a batch create.
#[derive(Debug)]
pub struct SetupFailure {
	/// Name of the fixture that failed.
	pub fixture_id: String,
	/// The underlying error.
	pub error: FixtureError,
}

/// Outcome of [`Generator::setup_fixtures`].
///
/// A request failure for one record does not abort the rest; successes and
/// failures are reported side by side, in enumeration order.
#[derive(Debug, Default)]
pub struct SetupReport {
	/// Created fixture configs, each annotated with its `fixture_id`.
	pub created: Vec<Map<String, Value>>,
	/// Per-fixture failures.
	pub failures: Vec<SetupFailure>,
}

impl SetupReport {
	/// Returns true if every fixture was created.
	pub fn is_complete(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Completion status of a reset operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStatus {
	/// All fixtures were cleared.
	Completed,
	/// The clear endpoint rejected the method; nothing was deleted.
	Warning,
}

/// Outcome of [`Generator::reset_fixtures`].
#[derive(Debug)]
pub struct ResetReport {
	/// Human-readable summary.
	pub message: String,
	/// Identifiers that existed before the clear.
	pub fixtures_deleted: Vec<String>,
	/// Number of deleted fixtures, from the API response when available.
	pub count: u64,
	/// Completion status.
	pub status: ResetStatus,
}

/// Outcome of [`Generator::reset_and_setup`].
#[derive(Debug)]
pub struct ResetAndSetupReport {
	/// The reset phase outcome.
	pub reset: ResetReport,
	/// The setup phase outcome; `None` when the reset degraded to a warning.
	pub setup: Option<SetupReport>,
}

/// The shared contract every fixture generator implements.
///
/// Default methods cover enumeration, export and database sync uniformly;
/// implementors supply the fixture source, endpoint configuration and an
/// optional API client. `list_existing_fixtures` must be overridden to map
/// the target API's native list response to flat identifiers.
#[async_trait]
pub trait Generator: Send + Sync {
	/// Returns the generator's base name (e.g., "user").
	fn name(&self) -> &str;

	/// Returns a human-readable description of the generator.
	fn description(&self) -> &str {
		""
	}

	/// Returns the fixture source. Shared and read-only; repeated enumeration
	/// never copies or mutates it.
	fn source(&self) -> &FixtureSource;

	/// Returns the instance-level endpoint configuration.
	fn endpoints(&self) -> &EndpointConfig;

	/// Returns the API client, when a target was configured.
	fn client(&self) -> Option<&ApiClient> {
		None
	}

	/// Returns the API client or a configuration error for file-only instances.
	fn api(&self) -> FixtureResult<&ApiClient> {
		self.client().ok_or_else(|| {
			FixtureError::Configuration(format!(
				"Generator '{}' has no API target configured",
				self.name()
			))
		})
	}

	/// Enumerates `(name, description)` pairs in source order, without side
	/// effects.
	fn list_fixtures(&self) -> Vec<FixtureSummary> {
		self.source()
			.iter()
			.map(|(name, record)| FixtureSummary {
				name: name.clone(),
				description: record.description.clone(),
			})
			.collect()
	}

	/// Materializes every fixture: a copy of each record's config with
	/// `fixture_id` set to the record's name, in source order.
	///
	/// Safe to call repeatedly; the source is never mutated. A user-defined
	/// `fixture_id` config key is overwritten by the fixture name.
	fn get_fixtures(&self) -> Vec<Map<String, Value>> {
		self.source()
			.iter()
			.map(|(name, record)| record.materialize(name))
			.collect()
	}

	/// Materializes a single fixture by name.
	fn get_fixture(&self, name: &str) -> FixtureResult<Map<String, Value>> {
		match self.source().get(name) {
			Some(record) => Ok(record.materialize(name)),
			None => Err(FixtureError::FixtureNotFound {
				name: name.to_string(),
				available: self.source().names().iter().map(|n| n.to_string()).collect(),
			}),
		}
	}

	/// Renders the materialized fixtures in the given format.
	fn export(&self, format: ExportFormat) -> FixtureResult<String> {
		format.render(&self.get_fixtures())
	}

	/// Resolves the create endpoint template: explicit argument, then the
	/// instance default, then the contract fallback `/{base}/{fixture_id}/`.
	///
	/// # Errors
	///
	/// Returns a [`FixtureError::Configuration`] if the resolved template does
	/// not contain the `{fixture_id}` placeholder.
	fn resolve_create_endpoint(&self, endpoint_template: Option<&str>) -> FixtureResult<String> {
		let template = endpoint_template
			.map(str::to_string)
			.or_else(|| self.endpoints().create_endpoint.clone())
			.unwrap_or_else(|| format!("/{}/{}/", self.name(), FIXTURE_ID_PLACEHOLDER));

		if !template.contains(FIXTURE_ID_PLACEHOLDER) {
			return Err(FixtureError::Configuration(format!(
				"Create endpoint template '{}' is missing the {} placeholder",
				template, FIXTURE_ID_PLACEHOLDER
			)));
		}
		Ok(template)
	}

	/// Resolves the list endpoint: explicit argument, then the instance
	/// default, then the contract fallback `/{base}/`.
	fn resolve_list_endpoint(&self, list_endpoint: Option<&str>) -> String {
		list_endpoint
			.map(str::to_string)
			.or_else(|| self.endpoints().list_endpoint.clone())
			.unwrap_or_else(|| format!("/{}/", self.name()))
	}

	/// Resolves the clear endpoint: explicit argument, then the instance
	/// default, then the contract fallback `/{base}/`.
	fn resolve_clear_endpoint(&self, clear_endpoint: Option<&str>) -> String {
		clear_endpoint
			.map(str::to_string)
			.or_else(|| self.endpoints().clear_endpoint.clone())
			.unwrap_or_else(|| format!("/{}/", self.name()))
	}

	/// Creates every fixture in the target via PUT-by-id.
	///
	/// The `fixture_id` is path-encoded through the endpoint template and
	/// removed from the request body. Per-record failures are collected in the
	/// report instead of aborting the batch.
	async fn setup_fixtures(&self, endpoint_template: Option<&str>) -> FixtureResult<SetupReport> {
		let client = self.api()?;
		let template = self.resolve_create_endpoint(endpoint_template)?;

		let mut report = SetupReport::default();
		for mut config in self.get_fixtures() {
			let fixture_id = match config.shift_remove(FIXTURE_ID_KEY) {
				Some(Value::String(id)) => id,
				_ => {
					report.failures.push(SetupFailure {
						fixture_id: "(unknown)".to_string(),
						error: FixtureError::Configuration(format!(
							"materialized fixture is missing a string '{}' key",
							FIXTURE_ID_KEY
						)),
					});
					continue;
				}
			};

			let path = template.replace(FIXTURE_ID_PLACEHOLDER, &fixture_id);
			match client.put(&path, &Value::Object(config.clone())).await {
				Ok(_) => {
					tracing::debug!(generator = self.name(), fixture_id = %fixture_id, "created fixture");
					config.insert(FIXTURE_ID_KEY.to_string(), Value::String(fixture_id));
					report.created.push(config);
				}
				Err(error) => {
					tracing::warn!(generator = self.name(), fixture_id = %fixture_id, %error, "failed to create fixture");
					report.failures.push(SetupFailure { fixture_id, error });
				}
			}
		}
		Ok(report)
	}

	/// Fetches the raw list response from the target.
	async fn get_existing_fixtures(&self, list_endpoint: Option<&str>) -> FixtureResult<Value> {
		let client = self.api()?;
		client.get(&self.resolve_list_endpoint(list_endpoint)).await
	}

	/// Lists existing fixture identifiers in the target.
	///
	/// There is no generic default: list-response shapes vary between APIs, so
	/// every generator must override this (declarative generators do so via
	/// their `id_field` setting).
	async fn list_existing_fixtures(
		&self,
		_list_endpoint: Option<&str>,
	) -> FixtureResult<Vec<String>> {
		Err(FixtureError::NotImplemented {
			generator: self.name().to_string(),
			operation: "list_existing_fixtures".to_string(),
		})
	}

	/// Deletes all fixtures from the target and returns the raw response.
	///
	/// Destructive; callers confirm intent before invoking this.
	async fn clear_fixtures(&self, clear_endpoint: Option<&str>) -> FixtureResult<Value> {
		let client = self.api()?;
		client.delete(&self.resolve_clear_endpoint(clear_endpoint)).await
	}

	/// Lists existing fixtures, then clears them.
	///
	/// An HTTP 405 from the clear endpoint degrades to a
	/// [`ResetStatus::Warning`] outcome instead of an error, since some APIs
	/// do not expose a bulk delete.
	async fn reset_fixtures(
		&self,
		clear_endpoint: Option<&str>,
		list_endpoint: Option<&str>,
	) -> FixtureResult<ResetReport> {
		let existing = self.list_existing_fixtures(list_endpoint).await?;

		match self.clear_fixtures(clear_endpoint).await {
			Ok(result) => {
				let count = result
					.get("count")
					.and_then(Value::as_u64)
					.unwrap_or(existing.len() as u64);
				Ok(ResetReport {
					message: format!("Reset completed - deleted {} fixtures", count),
					fixtures_deleted: existing,
					count,
					status: ResetStatus::Completed,
				})
			}
			Err(FixtureError::Transport {
				status: Some(405),
				path,
				message,
			}) => Ok(ResetReport {
				message: format!(
					"Reset skipped - no fixtures were deleted because the method is not allowed on {}: {}",
					path, message
				),
				fixtures_deleted: Vec::new(),
				count: 0,
				status: ResetStatus::Warning,
			}),
			Err(e) => Err(e),
		}
	}

	/// Resets all fixtures and recreates the defaults.
	///
	/// The setup phase is skipped when the reset degraded to a warning.
	async fn reset_and_setup(
		&self,
		clear_endpoint: Option<&str>,
		list_endpoint: Option<&str>,
		setup_endpoint: Option<&str>,
	) -> FixtureResult<ResetAndSetupReport> {
		let reset = self.reset_fixtures(clear_endpoint, list_endpoint).await?;
		if reset.status == ResetStatus::Warning {
			return Ok(ResetAndSetupReport { reset, setup: None });
		}

		let setup = self.setup_fixtures(setup_endpoint).await?;
		Ok(ResetAndSetupReport {
			reset,
			setup: Some(setup),
		})
	}

	/// Checks whether the target API is ready, with bounded retries.
	async fn health_check(
		&self,
		path: &str,
		max_retries: u32,
		delay: Duration,
	) -> FixtureResult<bool> {
		Ok(self.api()?.health_check(path, max_retries, delay).await)
	}
}

/// Declarative generator definition parsed from a
/// `<base>_generator.{json,yaml,yml}` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GeneratorDef {
	/// Human-readable description of the generator.
	#[serde(default)]
	pub description: String,

	/// Instance-level endpoint templates.
	#[serde(flatten)]
	pub endpoints: EndpointConfig,

	/// Name of the identifier field in the target's list response. Supplying
	/// it enables `list_existing_fixtures` for this generator.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id_field: Option<String>,

	/// Inline fixture data used when no paired fixture file exists.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub defaults: Option<FixtureSource>,
}

/// Generator instantiated from a declarative definition.
#[derive(Debug, Clone)]
pub struct DefinedGenerator {
	name: String,
	description: String,
	source: Arc<FixtureSource>,
	endpoints: EndpointConfig,
	id_field: Option<String>,
	client: Option<ApiClient>,
}

impl DefinedGenerator {
	/// Creates a generator from its definition and a loaded fixture source.
	pub fn new(name: impl Into<String>, def: GeneratorDef, source: FixtureSource) -> Self {
		Self {
			name: name.into(),
			description: def.description,
			source: Arc::new(source),
			endpoints: def.endpoints,
			id_field: def.id_field,
			client: None,
		}
	}

	/// Attaches an API client for database operations.
	pub fn with_client(mut self, client: ApiClient) -> Self {
		self.client = Some(client);
		self
	}
}

#[async_trait]
impl Generator for DefinedGenerator {
	fn name(&self) -> &str {
		&self.name
	}

	fn description(&self) -> &str {
		&self.description
	}

	fn source(&self) -> &FixtureSource {
		&self.source
	}

	fn endpoints(&self) -> &EndpointConfig {
		&self.endpoints
	}

	fn client(&self) -> Option<&ApiClient> {
		self.client.as_ref()
	}

	async fn list_existing_fixtures(
		&self,
		list_endpoint: Option<&str>,
	) -> FixtureResult<Vec<String>> {
		let id_field = self.id_field.as_deref().ok_or_else(|| {
			FixtureError::NotImplemented {
				generator: self.name.clone(),
				operation: "list_existing_fixtures".to_string(),
			}
		})?;

		let response = self.get_existing_fixtures(list_endpoint).await?;
		extract_identifiers(&self.name, &response, id_field)
	}
}

/// Maps a list response to flat identifiers.
///
/// Accepts a JSON array, or an object whose first array-valued entry is the
/// fixture list. String elements pass through; object elements yield their
/// `id_field` value.
fn extract_identifiers(
	generator: &str,
	response: &Value,
	id_field: &str,
) -> FixtureResult<Vec<String>> {
	let items = match response {
		Value::Array(items) => items,
		Value::Object(map) => map
			.values()
			.find_map(Value::as_array)
			.ok_or_else(|| {
				FixtureError::Configuration(format!(
					"list response for '{}' contains no array of fixtures",
					generator
				))
			})?,
		_ => {
			return Err(FixtureError::Configuration(format!(
				"list response for '{}' is neither an array nor an object",
				generator
			)))
		}
	};

	let mut ids = Vec::with_capacity(items.len());
	for item in items {
		match item {
			Value::String(id) => ids.push(id.clone()),
			Value::Object(fields) => match fields.get(id_field) {
				Some(Value::String(id)) => ids.push(id.clone()),
				Some(Value::Number(id)) => ids.push(id.to_string()),
				_ => {
					return Err(FixtureError::Configuration(format!(
						"list response item for '{}' has no usable '{}' field",
						generator, id_field
					)))
				}
			},
			_ => {
				return Err(FixtureError::Configuration(format!(
					"list response item for '{}' is neither a string nor an object",
					generator
				)))
			}
		}
	}
	Ok(ids)
}
