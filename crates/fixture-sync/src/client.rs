//! Generic HTTP client for target API operations.
//!
//! Every database-facing generator operation goes through [`ApiClient`], a thin
//! reqwest wrapper configured with a base URL and a request timeout. Non-2xx
//! responses surface as [`FixtureError::Transport`] carrying the status code and
//! response body; timeouts surface as [`FixtureError::Timeout`], never a hang.

use std::time::Duration;

use serde_json::Value;

use crate::error::{FixtureError, FixtureResult};

/// Target API address and timeout configuration.
#[derive(Debug, Clone)]
pub struct ApiTarget {
	/// Base URL of the target API (e.g., "http://localhost:8000").
	pub base_url: String,

	/// Per-request timeout.
	pub timeout: Duration,
}

impl ApiTarget {
	/// Creates a new target configuration with the default 30 second timeout.
	pub fn new(base_url: impl Into<String>) -> Self {
		Self {
			base_url: base_url.into(),
			timeout: Duration::from_secs(30),
		}
	}

	/// Sets the request timeout.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;
		self
	}
}

/// HTTP client for fixture database operations.
#[derive(Debug, Clone)]
pub struct ApiClient {
	base_url: String,
	client: reqwest::Client,
}

impl ApiClient {
	/// Creates a new client for the given target.
	///
	/// # Errors
	///
	/// Returns a [`FixtureError::Configuration`] if the underlying HTTP client
	/// cannot be constructed.
	pub fn new(target: &ApiTarget) -> FixtureResult<Self> {
		let client = reqwest::Client::builder()
			.timeout(target.timeout)
			.build()
			.map_err(|e| FixtureError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			base_url: target.base_url.trim_end_matches('/').to_string(),
			client,
		})
	}

	/// Returns the configured base URL (without a trailing slash).
	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	fn build_url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	async fn request(
		&self,
		method: reqwest::Method,
		path: &str,
		body: Option<&Value>,
	) -> FixtureResult<Value> {
		let url = self.build_url(path);
		let mut req = self.client.request(method, &url);

		if let Some(body) = body {
			req = req.json(body);
		}

		let response = req.send().await.map_err(|e| {
			if e.is_timeout() {
				FixtureError::Timeout {
					path: path.to_string(),
				}
			} else {
				FixtureError::Transport {
					path: path.to_string(),
					status: None,
					message: e.to_string(),
				}
			}
		})?;

		let status = response.status();
		if !status.is_success() {
			let body = response
				.text()
				.await
				.unwrap_or_else(|_| "(unreadable body)".to_string());
			return Err(FixtureError::Transport {
				path: path.to_string(),
				status: Some(status.as_u16()),
				message: body,
			});
		}

		// DELETE endpoints commonly return an empty body
		let text = response.text().await.map_err(|e| FixtureError::Transport {
			path: path.to_string(),
			status: None,
			message: format!("Failed to read response body: {}", e),
		})?;

		if text.trim().is_empty() {
			return Ok(Value::Null);
		}

		serde_json::from_str(&text).map_err(|e| FixtureError::Transport {
			path: path.to_string(),
			status: Some(status.as_u16()),
			message: format!("Failed to parse response as JSON: {}", e),
		})
	}

	/// Issues a GET request and returns the parsed JSON response.
	pub async fn get(&self, path: &str) -> FixtureResult<Value> {
		self.request(reqwest::Method::GET, path, None).await
	}

	/// Issues a POST request with a JSON body and returns the parsed response.
	pub async fn post(&self, path: &str, body: &Value) -> FixtureResult<Value> {
		self.request(reqwest::Method::POST, path, Some(body)).await
	}

	/// Issues a PUT request with a JSON body and returns the parsed response.
	pub async fn put(&self, path: &str, body: &Value) -> FixtureResult<Value> {
		self.request(reqwest::Method::PUT, path, Some(body)).await
	}

	/// Issues a DELETE request and returns the parsed response, or
	/// [`Value::Null`] for an empty body.
	pub async fn delete(&self, path: &str) -> FixtureResult<Value> {
		self.request(reqwest::Method::DELETE, path, None).await
	}

	/// Checks whether the target API responds with HTTP 200 on `path`.
	///
	/// Retries up to `max_retries` times, sleeping `delay` between attempts.
	/// Returns `false` once the attempts are exhausted; never returns an error.
	pub async fn health_check(&self, path: &str, max_retries: u32, delay: Duration) -> bool {
		for attempt in 0..max_retries {
			match self.client.get(self.build_url(path)).send().await {
				Ok(response) if response.status() == reqwest::StatusCode::OK => return true,
				Ok(response) => {
					tracing::debug!(status = %response.status(), "health check attempt failed");
				}
				Err(e) => {
					tracing::debug!(error = %e, "health check attempt failed");
				}
			}
			if attempt + 1 < max_retries {
				tokio::time::sleep(delay).await;
			}
		}
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_base_url_trailing_slash_stripped() {
		let target = ApiTarget::new("http://localhost:8000/");
		let client = ApiClient::new(&target).unwrap();
		assert_eq!(client.base_url(), "http://localhost:8000");
		assert_eq!(client.build_url("/users/"), "http://localhost:8000/users/");
	}

	#[rstest]
	fn test_target_builder() {
		let target = ApiTarget::new("http://localhost:8000").with_timeout(Duration::from_secs(5));
		assert_eq!(target.timeout, Duration::from_secs(5));
	}
}
