//! Fixture model, discovery, generator contract and registry.

pub mod discovery;
pub mod export;
pub mod generator;
pub mod registry;
pub mod source;

pub use discovery::{
	DiscoveryFailure, DiscoveryResolver, DiscoverySettings, GeneratorDescriptor,
	FIXTURE_EXPORT_SUFFIX, FIXTURE_MODULE_SUFFIX, GENERATOR_SUFFIX,
};
pub use export::{python_literal, ExportFormat};
pub use generator::{
	DefinedGenerator, EndpointConfig, FixtureSummary, Generator, GeneratorDef,
	ResetAndSetupReport, ResetReport, ResetStatus, SetupFailure, SetupReport,
	FIXTURE_ID_PLACEHOLDER,
};
pub use registry::{GeneratorOutcome, GeneratorRegistry, RunReport};
pub use source::{FixtureRecord, FixtureSource, FIXTURE_ID_KEY};
