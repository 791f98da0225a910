//! Convenience re-exports for common usage.
//!
//! This module provides a single import for the most commonly used items
//! from the fixture-sync crate.
//!
//! # Example
//!
//! ```ignore
//! use fixture_sync::prelude::*;
//! ```

// Error types
pub use crate::error::{FixtureError, FixtureResult};

// Transport
pub use crate::client::{ApiClient, ApiTarget};

// Fixture model
pub use crate::fixtures::{FixtureRecord, FixtureSource, FIXTURE_ID_KEY};

// Discovery
pub use crate::fixtures::{
	DiscoveryFailure, DiscoveryResolver, DiscoverySettings, GeneratorDescriptor,
};

// Generator contract
pub use crate::fixtures::{
	DefinedGenerator, EndpointConfig, ExportFormat, FixtureSummary, Generator, GeneratorDef,
	ResetAndSetupReport, ResetReport, ResetStatus, SetupReport,
};

// Registry
pub use crate::fixtures::{GeneratorOutcome, GeneratorRegistry, RunReport};
