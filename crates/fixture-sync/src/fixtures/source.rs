//! Fixture record and fixture source definitions.
//!
//! A [`FixtureSource`] is an insertion-ordered mapping from fixture name to
//! [`FixtureRecord`], loaded once at discovery time and read-only afterwards.

use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// The key added to every materialized fixture config.
pub const FIXTURE_ID_KEY: &str = "fixture_id";

/// A single named unit of test data.
///
/// Accepted input shapes, most explicit first:
///
/// ```yaml
/// # explicit config
/// admin:
///   description: Administrator account
///   config: { username: admin }
///
/// # "data" wrapper, taken verbatim as the config
/// admin:
///   description: Administrator account
///   data: { username: admin }
///
/// # flat form: everything except description/tags is config
/// admin:
///   description: Administrator account
///   username: admin
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct FixtureRecord {
	/// Human-readable description of the fixture.
	#[serde(default)]
	pub description: String,

	/// Optional classification tags.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tags: Vec<String>,

	/// Opaque configuration payload sent to the target API.
	pub config: Map<String, Value>,
}

impl FixtureRecord {
	/// Creates a new fixture record.
	pub fn new(description: impl Into<String>, config: Map<String, Value>) -> Self {
		Self {
			description: description.into(),
			tags: Vec::new(),
			config,
		}
	}

	/// Sets the classification tags.
	pub fn with_tags(mut self, tags: Vec<String>) -> Self {
		self.tags = tags;
		self
	}

	/// Returns a copy of the config with `fixture_id` set to `name`.
	///
	/// A user-supplied `fixture_id` key inside the config is overwritten; this
	/// is documented behavior, not an error.
	pub fn materialize(&self, name: &str) -> Map<String, Value> {
		let mut config = self.config.clone();
		config.insert(FIXTURE_ID_KEY.to_string(), Value::String(name.to_string()));
		config
	}
}

impl<'de> Deserialize<'de> for FixtureRecord {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = Value::deserialize(deserializer)?;
		let obj = match value {
			Value::Object(obj) => obj,
			other => {
				return Err(D::Error::custom(format!(
					"expected a fixture mapping, got {}",
					type_name(&other)
				)))
			}
		};

		let description = match obj.get("description") {
			Some(Value::String(s)) => s.clone(),
			Some(other) => {
				return Err(D::Error::custom(format!(
					"fixture description must be a string, got {}",
					type_name(other)
				)))
			}
			None => String::new(),
		};

		let tags = match obj.get("tags") {
			Some(value) => Vec::<String>::deserialize(value)
				.map_err(|e| D::Error::custom(format!("invalid fixture tags: {}", e)))?,
			None => Vec::new(),
		};

		let config = if let Some(value) = obj.get("config") {
			match value {
				Value::Object(config) => config.clone(),
				other => {
					return Err(D::Error::custom(format!(
						"fixture config must be a mapping, got {}",
						type_name(other)
					)))
				}
			}
		} else if let Some(value) = obj.get("data") {
			match value {
				Value::Object(data) => data.clone(),
				other => {
					return Err(D::Error::custom(format!(
						"fixture data must be a mapping, got {}",
						type_name(other)
					)))
				}
			}
		} else {
			// Flat form: every key except the metadata keys is config.
			obj.into_iter()
				.filter(|(key, _)| key != "description" && key != "tags")
				.collect()
		};

		Ok(Self {
			description,
			tags,
			config,
		})
	}
}

fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "a mapping",
	}
}

/// Insertion-ordered mapping from fixture name to [`FixtureRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct FixtureSource {
	entries: IndexMap<String, FixtureRecord>,
}

impl FixtureSource {
	/// Creates an empty fixture source.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a fixture record, replacing any record with the same name.
	pub fn insert(&mut self, name: impl Into<String>, record: FixtureRecord) {
		self.entries.insert(name.into(), record);
	}

	/// Returns the record for `name`, if present.
	pub fn get(&self, name: &str) -> Option<&FixtureRecord> {
		self.entries.get(name)
	}

	/// Returns true if a record named `name` exists.
	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	/// Returns the number of fixture records.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if there are no fixture records.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Returns the fixture names in insertion order.
	pub fn names(&self) -> Vec<&str> {
		self.entries.keys().map(String::as_str).collect()
	}

	/// Iterates over `(name, record)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&String, &FixtureRecord)> {
		self.entries.iter()
	}

	/// Merges another source into this one, in the other source's order.
	///
	/// Records with the same name are replaced by the incoming value.
	pub fn merge(&mut self, other: FixtureSource) {
		for (name, record) in other.entries {
			self.entries.insert(name, record);
		}
	}

	/// Reconstructs a fixture source from materialized configs.
	///
	/// Each entry must carry a string `fixture_id` key, which becomes the
	/// fixture name and is removed from the stored config. This is the inverse
	/// of materializing every record for export.
	pub fn from_materialized(
		configs: Vec<Map<String, Value>>,
	) -> crate::error::FixtureResult<Self> {
		let mut source = Self::new();
		for mut config in configs {
			let name = match config.shift_remove(FIXTURE_ID_KEY) {
				Some(Value::String(name)) => name,
				_ => {
					return Err(crate::error::FixtureError::Discovery(format!(
						"materialized fixture is missing a string '{}' key",
						FIXTURE_ID_KEY
					)))
				}
			};
			source.insert(name, FixtureRecord::new("", config));
		}
		Ok(source)
	}
}

impl FromIterator<(String, FixtureRecord)> for FixtureSource {
	fn from_iter<I: IntoIterator<Item = (String, FixtureRecord)>>(iter: I) -> Self {
		Self {
			entries: iter.into_iter().collect(),
		}
	}
}

impl<'a> IntoIterator for &'a FixtureSource {
	type Item = (&'a String, &'a FixtureRecord);
	type IntoIter = indexmap::map::Iter<'a, String, FixtureRecord>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn config(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => panic!("expected an object"),
		}
	}

	#[rstest]
	fn test_materialize_adds_fixture_id() {
		let record = FixtureRecord::new("d", config(json!({"username": "admin"})));
		let materialized = record.materialize("admin");
		assert_eq!(materialized["username"], json!("admin"));
		assert_eq!(materialized[FIXTURE_ID_KEY], json!("admin"));
		// The source record is untouched
		assert!(!record.config.contains_key(FIXTURE_ID_KEY));
	}

	#[rstest]
	fn test_materialize_overwrites_user_fixture_id() {
		let record = FixtureRecord::new("d", config(json!({"fixture_id": "stale"})));
		let materialized = record.materialize("fresh");
		assert_eq!(materialized[FIXTURE_ID_KEY], json!("fresh"));
	}

	#[rstest]
	fn test_deserialize_explicit_config() {
		let record: FixtureRecord = serde_json::from_value(json!({
			"description": "Administrator account",
			"config": {"username": "admin"}
		}))
		.unwrap();
		assert_eq!(record.description, "Administrator account");
		assert_eq!(record.config["username"], json!("admin"));
	}

	#[rstest]
	fn test_deserialize_data_wrapper() {
		let record: FixtureRecord = serde_json::from_value(json!({
			"description": "d",
			"data": {"username": "admin", "active": true}
		}))
		.unwrap();
		assert_eq!(record.config["username"], json!("admin"));
		assert_eq!(record.config["active"], json!(true));
	}

	#[rstest]
	fn test_deserialize_flat_form() {
		let record: FixtureRecord = serde_json::from_value(json!({
			"description": "d",
			"tags": ["test"],
			"username": "admin",
			"role": "user"
		}))
		.unwrap();
		assert_eq!(record.tags, vec!["test".to_string()]);
		assert_eq!(record.config.len(), 2);
		assert_eq!(record.config["username"], json!("admin"));
		assert!(!record.config.contains_key("description"));
	}

	#[rstest]
	fn test_deserialize_rejects_non_mapping_config() {
		let result: Result<FixtureRecord, _> = serde_json::from_value(json!({
			"description": "d",
			"config": "not a mapping"
		}));
		assert!(result.is_err());
	}

	#[rstest]
	fn test_deserialize_rejects_scalar_record() {
		let result: Result<FixtureRecord, _> = serde_json::from_value(json!("admin"));
		assert!(result.is_err());
	}

	#[rstest]
	fn test_source_insertion_order() {
		let mut source = FixtureSource::new();
		source.insert("zeta", FixtureRecord::default());
		source.insert("alpha", FixtureRecord::default());
		source.insert("mid", FixtureRecord::default());
		assert_eq!(source.names(), vec!["zeta", "alpha", "mid"]);
		assert_eq!(source.len(), 3);
	}

	#[rstest]
	fn test_source_merge_replaces_duplicates() {
		let mut base = FixtureSource::new();
		base.insert("a", FixtureRecord::new("old", Map::new()));
		let mut extra = FixtureSource::new();
		extra.insert("a", FixtureRecord::new("new", Map::new()));
		extra.insert("b", FixtureRecord::new("b", Map::new()));

		base.merge(extra);
		assert_eq!(base.len(), 2);
		assert_eq!(base.get("a").unwrap().description, "new");
	}

	#[rstest]
	fn test_from_materialized_round_trip() {
		let mut source = FixtureSource::new();
		source.insert(
			"admin",
			FixtureRecord::new("", config(json!({"username": "admin"}))),
		);

		let materialized: Vec<_> = source
			.iter()
			.map(|(name, record)| record.materialize(name))
			.collect();
		let rebuilt = FixtureSource::from_materialized(materialized).unwrap();
		assert_eq!(rebuilt.names(), vec!["admin"]);
		assert_eq!(
			rebuilt.get("admin").unwrap().config["username"],
			json!("admin")
		);
		assert!(!rebuilt.get("admin").unwrap().config.contains_key(FIXTURE_ID_KEY));
	}

	#[rstest]
	fn test_from_materialized_requires_fixture_id() {
		let result = FixtureSource::from_materialized(vec![config(json!({"username": "x"}))]);
		assert!(result.is_err());
	}
}
