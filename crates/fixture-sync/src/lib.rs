//! Test fixture generation and HTTP API synchronization.
//!
//! This crate pairs declarative *generator definitions* with *fixture data*
//! files by naming convention, instantiates each pair as a generator, and
//! exposes file-export and database-sync operations uniformly across all
//! discovered generators:
//!
//! - **Discovery**: a `<base>_generator.{json,yaml,yml}` definition file is
//!   paired with `<base>_fixtures.{json,yaml,yml}` data whose top-level
//!   mapping exposes an uppercase `<BASE>_FIXTURES` key. Broken candidates
//!   are skipped with a recorded reason, never aborting the scan.
//! - **Generator contract**: every generator enumerates its fixtures, exports
//!   them (JSON, YAML, or a Python literal), and creates/lists/clears them in
//!   a target HTTP API via PUT-by-id semantics.
//! - **Registry**: operations run against one named generator or across all
//!   of them, aggregating per-generator successes and failures into one
//!   report.
//!
//! # Quick Start
//!
//! ```ignore
//! use fixture_sync::prelude::*;
//!
//! let settings = DiscoverySettings::new("generators", "fixtures");
//! let registry = GeneratorRegistry::discover(settings, None)?;
//!
//! for (name, generator) in registry.iter() {
//!     println!("{}: {}", name, generator.export(ExportFormat::Json)?);
//! }
//! for (base, reason) in registry.failures() {
//!     eprintln!("skipped {}: {}", base, reason);
//! }
//! ```
//!
//! Database synchronization attaches an API target:
//!
//! ```ignore
//! use fixture_sync::prelude::*;
//! use futures::FutureExt;
//!
//! let target = ApiTarget::new("http://localhost:8000");
//! let registry = GeneratorRegistry::discover(settings, Some(&target))?;
//! let report = registry
//!     .run_for(None, |generator| {
//!         async move { generator.setup_fixtures(None).await }.boxed()
//!     })
//!     .await?;
//! ```
//!
//! # Features
//!
//! - `json` - JSON fixture and export support (enabled by default)
//! - `yaml` - YAML fixture and export support (enabled by default)

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod error;
pub mod fixtures;
pub mod prelude;

// Re-export commonly used types at crate root
pub use client::{ApiClient, ApiTarget};
pub use error::{FixtureError, FixtureResult};
pub use fixtures::{
	DefinedGenerator, DiscoverySettings, ExportFormat, FixtureRecord, FixtureSource, Generator,
	GeneratorRegistry,
};
