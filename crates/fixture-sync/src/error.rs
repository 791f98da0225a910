//! Error types for fixture generation and synchronization.
//!
//! This module defines the error taxonomy used throughout the fixture-sync crate.

use thiserror::Error;

/// Errors that can occur during fixture operations.
#[derive(Debug, Error)]
pub enum FixtureError {
	/// A generator candidate could not be discovered or instantiated.
	#[error("Discovery error: {0}")]
	Discovery(String),

	/// Generator or endpoint configuration is unusable.
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// The target API returned a failure or could not be reached.
	#[error("Transport error for {path}{}: {message}", .status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default())]
	Transport {
		/// Request path relative to the base URL.
		path: String,
		/// HTTP status code, when a response was received.
		status: Option<u16>,
		/// Error detail or response body.
		message: String,
	},

	/// The request did not complete within the configured timeout.
	#[error("Request timed out for {path}")]
	Timeout {
		/// Request path relative to the base URL.
		path: String,
	},

	/// A generator was invoked for an operation it does not provide.
	#[error("Generator '{generator}' does not implement {operation}")]
	NotImplemented {
		/// Generator base name.
		generator: String,
		/// Name of the missing operation.
		operation: String,
	},

	/// A named generator was not found in the registry.
	#[error("Generator '{name}' not found. Known generators: {}", .known.join(", "))]
	GeneratorNotFound {
		/// The requested generator name.
		name: String,
		/// All registered generator names, in discovery order.
		known: Vec<String>,
	},

	/// A named fixture was not found in a generator's fixture source.
	#[error("Fixture '{name}' not found. Available: {}", .available.join(", "))]
	FixtureNotFound {
		/// The requested fixture name.
		name: String,
		/// All fixture names in the source, in insertion order.
		available: Vec<String>,
	},

	/// Unsupported export format or file extension.
	#[error("Unsupported format: {0}")]
	UnsupportedFormat(String),

	/// I/O operation failed.
	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	JsonError(#[from] serde_json::Error),

	/// YAML serialization/deserialization error (when the yaml feature is enabled).
	#[cfg(feature = "yaml")]
	#[error("YAML error: {0}")]
	YamlError(#[from] serde_yaml::Error),
}

/// Result type alias for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_generator_not_found_lists_known_names() {
		let error = FixtureError::GeneratorNotFound {
			name: "agent".to_string(),
			known: vec!["example".to_string(), "user".to_string()],
		};
		assert_eq!(
			error.to_string(),
			"Generator 'agent' not found. Known generators: example, user"
		);
	}

	#[rstest]
	fn test_transport_error_with_status() {
		let error = FixtureError::Transport {
			path: "/users/".to_string(),
			status: Some(404),
			message: "not found".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"Transport error for /users/ (HTTP 404): not found"
		);
	}

	#[rstest]
	fn test_transport_error_without_status() {
		let error = FixtureError::Transport {
			path: "/users/".to_string(),
			status: None,
			message: "connection refused".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"Transport error for /users/: connection refused"
		);
	}

	#[rstest]
	fn test_not_implemented_error() {
		let error = FixtureError::NotImplemented {
			generator: "example".to_string(),
			operation: "list_existing_fixtures".to_string(),
		};
		assert_eq!(
			error.to_string(),
			"Generator 'example' does not implement list_existing_fixtures"
		);
	}

	#[rstest]
	fn test_io_error_from() {
		let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
		let fixture_error: FixtureError = io_error.into();
		assert!(matches!(fixture_error, FixtureError::IoError(_)));
	}

	#[rstest]
	fn test_json_error_from() {
		let json_error: serde_json::Error =
			serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
		let fixture_error: FixtureError = json_error.into();
		assert!(matches!(fixture_error, FixtureError::JsonError(_)));
	}
}
