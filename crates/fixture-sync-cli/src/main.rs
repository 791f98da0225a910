//! Fixture Sync CLI
//!
//! Command-line tool for generating test fixtures from declarative generator
//! definitions and syncing them into a running service via its HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! fixture-sync generate --format json
//! fixture-sync generate --generator user --save user_fixtures.json
//! fixture-sync database --api-url http://localhost:8000 --setup
//! fixture-sync database --reset-and-setup --confirm
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use fixture_sync::fixtures::{Generator, ResetStatus};
use fixture_sync::{
	ApiTarget, DiscoverySettings, ExportFormat, FixtureError, FixtureResult, GeneratorRegistry,
};

#[derive(Parser)]
#[command(name = "fixture-sync")]
#[command(about = "Generate test fixtures and sync them into a database via API", long_about = None)]
#[command(version)]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Generate fixtures from the available generators
	Generate {
		/// Output format for the fixtures
		#[arg(short, long, default_value = "json")]
		format: ExportFormat,

		/// Save output to file instead of printing to stdout
		#[arg(short, long, value_name = "FILE")]
		save: Option<PathBuf>,

		/// List all available fixture types
		#[arg(long)]
		list_available: bool,

		/// Use a specific generator; all generators when omitted
		#[arg(short, long, value_name = "NAME")]
		generator: Option<String>,

		/// Directory containing generator definition files
		#[arg(long, value_name = "DIR", default_value = "generators")]
		generators_dir: PathBuf,

		/// Directory containing fixture data files
		#[arg(long, value_name = "DIR", default_value = "fixtures")]
		fixtures_dir: PathBuf,
	},

	/// Create, list, or reset fixtures directly in the database via API
	Database {
		/// Base URL of the API
		#[arg(long, default_value = "http://localhost:8000")]
		api_url: String,

		/// Request timeout in seconds
		#[arg(long, default_value = "30")]
		timeout: u64,

		/// List all available fixture types
		#[arg(long)]
		list_available: bool,

		/// Create fixtures in the database (the default action)
		#[arg(long)]
		setup: bool,

		/// Reset all fixtures in the database
		#[arg(long)]
		reset: bool,

		/// Reset all fixtures and recreate the defaults
		#[arg(long)]
		reset_and_setup: bool,

		/// Skip interactive confirmation (for automation)
		#[arg(long)]
		confirm: bool,

		/// List existing fixtures in the database
		#[arg(long)]
		list_existing: bool,

		/// Use a specific generator; all generators when omitted
		#[arg(short, long, value_name = "NAME")]
		generator: Option<String>,

		/// Directory containing generator definition files
		#[arg(long, value_name = "DIR", default_value = "generators")]
		generators_dir: PathBuf,

		/// Directory containing fixture data files
		#[arg(long, value_name = "DIR", default_value = "fixtures")]
		fixtures_dir: PathBuf,
	},
}

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
		)
		.with_writer(io::stderr)
		.init();

	let cli = Cli::parse();

	let result = match cli.command {
		Commands::Generate {
			format,
			save,
			list_available,
			generator,
			generators_dir,
			fixtures_dir,
		} => {
			run_generate(
				format,
				save,
				list_available,
				generator,
				generators_dir,
				fixtures_dir,
			)
			.await
		}
		Commands::Database {
			api_url,
			timeout,
			list_available,
			setup,
			reset,
			reset_and_setup,
			confirm,
			list_existing,
			generator,
			generators_dir,
			fixtures_dir,
		} => {
			run_database(DatabaseArgs {
				api_url,
				timeout,
				list_available,
				setup,
				reset,
				reset_and_setup,
				confirm,
				list_existing,
				generator,
				generators_dir,
				fixtures_dir,
			})
			.await
		}
	};

	if let Err(e) = result {
		eprintln!("{} {}", "Error:".red().bold(), e);
		process::exit(1);
	}
}

async fn run_generate(
	format: ExportFormat,
	save: Option<PathBuf>,
	list_available: bool,
	generator: Option<String>,
	generators_dir: PathBuf,
	fixtures_dir: PathBuf,
) -> FixtureResult<()> {
	// File generation never touches the API; no client is constructed.
	let registry = load_registry(generators_dir, fixtures_dir, None)?;

	if list_available {
		print_available(&registry);
		return Ok(());
	}

	let selected = select_generators(&registry, generator.as_deref())?;

	let mut fixtures = Vec::new();
	for (name, gen) in &selected {
		let mut batch = gen.get_fixtures();
		println!(
			"{}",
			format!("Generated {} fixtures from {} generator", batch.len(), name).green()
		);
		if selected.len() > 1 {
			// Tag each fixture with its origin when output is combined.
			for fixture in &mut batch {
				fixture.insert("_generator".to_string(), serde_json::json!(name));
			}
		}
		fixtures.extend(batch);
	}

	let output = format.render(&fixtures)?;

	match save {
		Some(path) => {
			std::fs::write(&path, output)?;
			println!("{}", format!("Saved fixtures to {}", path.display()).green());
		}
		None => println!("{}", output),
	}

	Ok(())
}

struct DatabaseArgs {
	api_url: String,
	timeout: u64,
	list_available: bool,
	setup: bool,
	reset: bool,
	reset_and_setup: bool,
	confirm: bool,
	list_existing: bool,
	generator: Option<String>,
	generators_dir: PathBuf,
	fixtures_dir: PathBuf,
}

async fn run_database(args: DatabaseArgs) -> FixtureResult<()> {
	let target =
		ApiTarget::new(&args.api_url).with_timeout(Duration::from_secs(args.timeout));
	let registry = load_registry(args.generators_dir, args.fixtures_dir, Some(&target))?;

	if args.list_available {
		print_available(&registry);
		return Ok(());
	}

	let selected = select_generators(&registry, args.generator.as_deref())?;

	let (_, first) = &selected[0];
	if !first.health_check("/", 30, Duration::from_secs(1)).await? {
		return Err(FixtureError::Configuration(format!(
			"API at {} is not ready. Make sure your service is running.",
			args.api_url
		)));
	}

	if args.list_existing {
		run_list_existing(&selected).await;
		return Ok(());
	}

	if args.reset_and_setup {
		run_reset_and_setup(&selected, args.confirm).await?;
	} else if args.reset {
		run_reset(&selected, args.confirm).await?;
	} else {
		// `--setup` is the default action; the flag exists to make it
		// explicit in scripts.
		let _ = args.setup;
		run_setup(&selected).await?;
	}

	Ok(())
}

async fn run_list_existing(selected: &[(&str, &std::sync::Arc<dyn Generator>)]) {
	println!("{}", "Existing Fixtures in Database:".blue().bold());
	for (name, generator) in selected {
		println!("\n{}", format!("{} Generator:", name.to_uppercase()).cyan());
		match generator.list_existing_fixtures(None).await {
			Ok(existing) if existing.is_empty() => {
				println!("{}", "No fixtures found".yellow());
			}
			Ok(existing) => {
				for fixture_id in &existing {
					println!("  • {}", fixture_id);
				}
				println!("{}", format!("Found {} fixtures", existing.len()).green());
			}
			Err(e) => {
				println!("{}", format!("Error listing existing fixtures: {}", e).red());
			}
		}
	}
}

async fn run_setup(selected: &[(&str, &std::sync::Arc<dyn Generator>)]) -> FixtureResult<()> {
	println!("{}", "Setting up fixtures in database...".yellow());

	let mut total_created = 0;
	for (name, generator) in selected {
		println!("\n{}", format!("Processing {} generator...", name).cyan());
		let report = generator.setup_fixtures(None).await?;
		total_created += report.created.len();
		println!(
			"{}",
			format!("Created {} fixtures in database", report.created.len()).green()
		);
		for fixture in &report.created {
			if let Some(id) = fixture.get("fixture_id") {
				println!("  • {}", id.as_str().unwrap_or_default());
			}
		}
		for failure in &report.failures {
			println!(
				"{}",
				format!("Failed to create {}: {}", failure.fixture_id, failure.error).red()
			);
		}
	}

	println!(
		"\n{}",
		format!("Total: Created {} fixtures across all generators", total_created)
			.green()
			.bold()
	);
	Ok(())
}

async fn run_reset(
	selected: &[(&str, &std::sync::Arc<dyn Generator>)],
	confirm: bool,
) -> FixtureResult<()> {
	println!(
		"{}",
		"WARNING: This will DELETE all fixtures from the database!".red().bold()
	);
	println!("This action cannot be undone.");
	if !confirm && !confirm_proceed("Are you sure you want to continue?")? {
		println!("{}", "Reset cancelled.".yellow());
		return Ok(());
	}

	println!("{}", "Resetting all fixtures...".yellow());

	let mut total_deleted = 0;
	for (name, generator) in selected {
		println!("\n{}", format!("Processing {} generator...", name).cyan());
		let report = generator.reset_fixtures(None, None).await?;
		match report.status {
			ResetStatus::Warning => println!("{}", report.message.yellow()),
			ResetStatus::Completed => println!("{}", report.message.green()),
		}
		total_deleted += report.count;
		if !report.fixtures_deleted.is_empty() {
			println!("{}", "Deleted fixtures:".yellow());
			for fixture_id in &report.fixtures_deleted {
				println!("  • {}", fixture_id);
			}
		}
	}

	println!(
		"\n{}",
		format!("Total: Deleted {} fixtures across all generators", total_deleted)
			.green()
			.bold()
	);
	Ok(())
}

async fn run_reset_and_setup(
	selected: &[(&str, &std::sync::Arc<dyn Generator>)],
	confirm: bool,
) -> FixtureResult<()> {
	println!(
		"{}",
		"WARNING: This will DELETE all fixtures and recreate defaults!".red().bold()
	);
	println!("This action cannot be undone.");
	if !confirm && !confirm_proceed("Are you sure you want to continue?")? {
		println!("{}", "Reset cancelled.".yellow());
		return Ok(());
	}

	println!("{}", "Resetting all fixtures and recreating defaults...".yellow());

	let mut total_created = 0;
	for (name, generator) in selected {
		println!("\n{}", format!("Processing {} generator...", name).cyan());
		let report = generator.reset_and_setup(None, None, None).await?;
		match report.reset.status {
			ResetStatus::Warning => println!("{}", report.reset.message.yellow()),
			ResetStatus::Completed => println!("{}", report.reset.message.green()),
		}

		if let Some(setup) = report.setup {
			total_created += setup.created.len();
			if setup.created.is_empty() {
				println!("{}", "No new fixtures created".yellow());
			} else {
				println!(
					"{}",
					format!("Created {} new fixtures", setup.created.len()).green()
				);
				for fixture in &setup.created {
					if let Some(id) = fixture.get("fixture_id") {
						println!("  • {}", id.as_str().unwrap_or_default());
					}
				}
			}
			for failure in &setup.failures {
				println!(
					"{}",
					format!("Failed to create {}: {}", failure.fixture_id, failure.error).red()
				);
			}
		}
	}

	println!(
		"\n{}",
		format!("Total: Created {} fixtures across all generators", total_created)
			.green()
			.bold()
	);
	Ok(())
}

/// Discovers generators and reports per-candidate failures without aborting.
fn load_registry(
	generators_dir: PathBuf,
	fixtures_dir: PathBuf,
	target: Option<&ApiTarget>,
) -> FixtureResult<GeneratorRegistry> {
	let settings = DiscoverySettings::new(generators_dir, fixtures_dir);
	let registry = GeneratorRegistry::discover(settings, target)?;

	for (base, failure) in registry.failures() {
		println!(
			"{}",
			format!("Warning: Could not load generator {}: {}", base, failure).yellow()
		);
	}
	for name in registry.names() {
		println!("{}", format!("✓ Loaded generator: {}", name).green());
	}

	if registry.is_empty() {
		return Err(FixtureError::Discovery(
			"no generators available; make sure you have generator definitions in the generators/ directory"
				.to_string(),
		));
	}
	Ok(registry)
}

/// Narrows the registry to one generator when `--generator` is given.
fn select_generators<'a>(
	registry: &'a GeneratorRegistry,
	name: Option<&'a str>,
) -> FixtureResult<Vec<(&'a str, &'a std::sync::Arc<dyn Generator>)>> {
	match name {
		Some(name) => {
			let generator =
				registry
					.get(name)
					.ok_or_else(|| FixtureError::GeneratorNotFound {
						name: name.to_string(),
						known: registry.names().iter().map(|n| n.to_string()).collect(),
					})?;
			Ok(vec![(name, generator)])
		}
		None => Ok(registry.iter().collect()),
	}
}

fn print_available(registry: &GeneratorRegistry) {
	println!("{}", "Available Generators and Fixture Types:".blue().bold());
	for (name, generator) in registry.iter() {
		for summary in generator.list_fixtures() {
			println!(
				"  {}  {}  {}",
				name.cyan(),
				summary.name.green(),
				summary.description.yellow()
			);
		}
	}
}

fn confirm_proceed(prompt: &str) -> FixtureResult<bool> {
	print!("{} [y/N]: ", prompt);
	io::stdout().flush()?;

	let mut input = String::new();
	io::stdin().read_line(&mut input)?;
	let answer = input.trim().to_lowercase();
	Ok(answer == "y" || answer == "yes")
}
