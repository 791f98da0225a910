//! Integration tests for directory scanning and generator/fixture pairing.

use std::fs;

use fixture_sync::fixtures::{DiscoveryFailure, DiscoveryResolver, DiscoverySettings};
use fixture_sync::{FixtureError, GeneratorRegistry};
use serde_json::json;
use tempfile::TempDir;

struct FixtureTree {
	_root: TempDir,
	settings: DiscoverySettings,
}

impl FixtureTree {
	fn new() -> Self {
		let root = TempDir::new().unwrap();
		let generators_dir = root.path().join("generators");
		let fixtures_dir = root.path().join("fixtures");
		fs::create_dir(&generators_dir).unwrap();
		fs::create_dir(&fixtures_dir).unwrap();
		let settings = DiscoverySettings::new(&generators_dir, &fixtures_dir);
		Self {
			_root: root,
			settings,
		}
	}

	fn write_generator(&self, file_name: &str, content: &str) {
		fs::write(self.settings.generators_dir.join(file_name), content).unwrap();
	}

	fn write_fixtures(&self, file_name: &str, content: &str) {
		fs::write(self.settings.fixtures_dir.join(file_name), content).unwrap();
	}

	fn discover(&self) -> GeneratorRegistry {
		GeneratorRegistry::discover(self.settings.clone(), None).unwrap()
	}
}

fn user_fixtures_json() -> String {
	json!({
		"USER_FIXTURES": {
			"admin": {"description": "Administrator", "config": {"username": "admin"}},
			"guest": {"description": "Guest", "config": {"username": "guest"}}
		}
	})
	.to_string()
}

#[test]
fn pairs_generator_with_fixture_source() {
	let tree = FixtureTree::new();
	tree.write_generator("user_generator.json", "{}");
	tree.write_fixtures("user_fixtures.json", &user_fixtures_json());

	let registry = tree.discover();
	assert_eq!(registry.names(), vec!["user"]);
	assert!(registry.failures().is_empty());

	let generator = registry.get("user").unwrap();
	assert_eq!(generator.source().len(), 2);
	assert_eq!(generator.source().names(), vec!["admin", "guest"]);
}

#[test]
fn get_fixtures_materializes_admin_scenario() {
	let tree = FixtureTree::new();
	tree.write_generator("user_generator.json", "{}");
	tree.write_fixtures(
		"user_fixtures.json",
		&json!({
			"USER_FIXTURES": {
				"admin": {"description": "d", "config": {"username": "admin"}}
			}
		})
		.to_string(),
	);

	let registry = tree.discover();
	let fixtures = registry.get("user").unwrap().get_fixtures();
	assert_eq!(
		serde_json::to_value(&fixtures).unwrap(),
		json!([{"username": "admin", "fixture_id": "admin"}])
	);
}

#[test]
fn missing_fixture_source_is_recorded_not_fatal() {
	let tree = FixtureTree::new();
	tree.write_generator("agent_generator.json", "{}");
	tree.write_generator("user_generator.json", "{}");
	tree.write_fixtures("user_fixtures.json", &user_fixtures_json());

	let registry = tree.discover();
	assert_eq!(registry.names(), vec!["user"]);
	assert_eq!(
		registry.failures().get("agent"),
		Some(&DiscoveryFailure::MissingFixtureSource)
	);
	assert_eq!(registry.failures().get("agent").unwrap().to_string(), "no fixture source found");
}

#[test]
fn missing_export_is_a_distinct_failure() {
	let tree = FixtureTree::new();
	tree.write_generator("agent_generator.json", "{}");
	tree.write_fixtures(
		"agent_fixtures.json",
		&json!({"OTHER_FIXTURES": {}}).to_string(),
	);

	let registry = tree.discover();
	assert_eq!(
		registry.failures().get("agent"),
		Some(&DiscoveryFailure::MissingFixtureExport {
			expected: "AGENT_FIXTURES".to_string()
		})
	);
}

#[test]
fn definition_defaults_substitute_for_missing_fixture_file() {
	let tree = FixtureTree::new();
	tree.write_generator(
		"agent_generator.json",
		&json!({
			"defaults": {
				"scout": {"description": "Scout agent", "config": {"kind": "scout"}}
			}
		})
		.to_string(),
	);

	let registry = tree.discover();
	assert_eq!(registry.names(), vec!["agent"]);
	let fixtures = registry.get("agent").unwrap().get_fixtures();
	assert_eq!(fixtures.len(), 1);
	assert_eq!(fixtures[0]["fixture_id"], json!("scout"));
}

#[test]
fn corrupt_candidate_does_not_affect_siblings() {
	let tree = FixtureTree::new();
	tree.write_generator("broken_generator.json", "{not json");
	tree.write_generator("user_generator.json", "{}");
	tree.write_fixtures("user_fixtures.json", &user_fixtures_json());

	let registry = tree.discover();
	assert_eq!(registry.names(), vec!["user"]);
	assert!(matches!(
		registry.failures().get("broken"),
		Some(DiscoveryFailure::Invalid(_))
	));

	// Corrupting the sibling's fixture data instead changes nothing for "user"
	let tree = FixtureTree::new();
	tree.write_generator("broken_generator.json", "{}");
	tree.write_fixtures("broken_fixtures.json", "also not json");
	tree.write_generator("user_generator.json", "{}");
	tree.write_fixtures("user_fixtures.json", &user_fixtures_json());

	let registry = tree.discover();
	assert_eq!(registry.names(), vec!["user"]);
	assert!(matches!(
		registry.failures().get("broken"),
		Some(DiscoveryFailure::Invalid(_))
	));
}

#[test]
fn discovery_order_is_lexical_by_file_name() {
	let tree = FixtureTree::new();
	for base in ["zeta", "alpha", "mid"] {
		tree.write_generator(&format!("{}_generator.json", base), "{}");
		tree.write_fixtures(
			&format!("{}_fixtures.json", base),
			&format!(
				r#"{{"{}_FIXTURES": {{"one": {{"description": "", "config": {{}}}}}}}}"#,
				base.to_uppercase()
			),
		);
	}

	let registry = tree.discover();
	assert_eq!(registry.names(), vec!["alpha", "mid", "zeta"]);
}

#[test]
fn base_and_underscore_prefixed_files_are_not_candidates() {
	let tree = FixtureTree::new();
	tree.write_generator("base_generator.json", "{}");
	tree.write_generator("_draft_generator.json", "{}");
	tree.write_generator("notes.txt", "not a generator");

	let registry = tree.discover();
	assert!(registry.is_empty());
	assert!(registry.failures().is_empty());
}

#[test]
fn extra_fixtures_exports_are_merged_after_primary() {
	let tree = FixtureTree::new();
	tree.write_generator("user_generator.json", "{}");
	tree.write_fixtures(
		"user_fixtures.json",
		&json!({
			"USER_FIXTURES": {
				"admin": {"description": "Administrator", "config": {"username": "admin"}}
			},
			"CUSTOM_FIXTURES": {
				"bot": {"description": "Bot", "config": {"username": "bot"}}
			},
			"not_an_export": {"ignored": true}
		})
		.to_string(),
	);

	let registry = tree.discover();
	let source = registry.get("user").unwrap().source();
	assert_eq!(source.names(), vec!["admin", "bot"]);
}

#[test]
fn yaml_fixture_sources_are_supported() {
	let tree = FixtureTree::new();
	tree.write_generator(
		"user_generator.yaml",
		"description: User fixtures\nid_field: id\n",
	);
	tree.write_fixtures(
		"user_fixtures.yaml",
		concat!(
			"USER_FIXTURES:\n",
			"  admin:\n",
			"    description: Administrator\n",
			"    config:\n",
			"      username: admin\n",
		),
	);

	let registry = tree.discover();
	assert_eq!(registry.names(), vec!["user"]);
	let generator = registry.get("user").unwrap();
	assert_eq!(generator.description(), "User fixtures");
	assert_eq!(
		generator.get_fixtures()[0]["username"],
		json!("admin")
	);
}

#[test]
fn unreadable_generators_dir_is_a_wholesale_error() {
	let settings = DiscoverySettings::new("/nonexistent/generators", "/nonexistent/fixtures");
	let result = GeneratorRegistry::discover(settings, None);
	assert!(matches!(result, Err(FixtureError::IoError(_))));
}

#[test]
fn scan_is_deterministic_across_runs() {
	let tree = FixtureTree::new();
	tree.write_generator("b_generator.json", "{}");
	tree.write_generator("a_generator.json", "{}");

	let resolver = DiscoveryResolver::new(tree.settings.clone());
	let first: Vec<_> = resolver.scan().unwrap().into_iter().map(|d| d.base).collect();
	let second: Vec<_> = resolver.scan().unwrap().into_iter().map(|d| d.base).collect();
	assert_eq!(first, vec!["a", "b"]);
	assert_eq!(first, second);
}

#[test]
fn fixture_file_extension_fallback_order() {
	// A json fixture file pairs with a yaml generator definition and vice versa
	let tree = FixtureTree::new();
	tree.write_generator("user_generator.yaml", "description: d\n");
	tree.write_fixtures("user_fixtures.json", &user_fixtures_json());

	let registry = tree.discover();
	assert_eq!(registry.names(), vec!["user"]);
}
