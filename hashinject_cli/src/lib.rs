use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Keep hashed bundle references in server templates in sync with every build.",
	long_about = "hashinject rewrites the references to bundler output inside server-side \
	              templates (ASP.NET pages, Razor layouts, plain HTML) after each build.\n\nIt \
	              either replaces an existing `app.bundle.js` style reference with the newly \
	              hashed filename, or regenerates the <link>/<script> tags between a pair of \
	              `<!-- INJECT-CSS -->` / `<!-- INJECT-JS -->` markers.\n\nQuick start:\n  \
	              hashinject init     Create a hashinject.toml\n  hashinject run      Inject the \
	              latest build\n  hashinject check    Verify templates match the build\n  \
	              hashinject targets  Show where each entry is injected"
)]
pub struct HashinjectCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Config file to use instead of discovering `hashinject.toml`.
	#[arg(long, short, global = true)]
	pub config: Option<PathBuf>,

	/// Build manifest to read. Defaults to the `manifest` config key.
	#[arg(long, short, global = true)]
	pub manifest: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize hashinject in a project by creating a sample config file.
	///
	/// Creates a `hashinject.toml` in the project root documenting every
	/// option. If a config file already exists, this command is a no-op and
	/// exits successfully.
	Init,
	/// Inject the artifacts of the latest build into their templates.
	///
	/// Reads the build manifest, resolves each entry's target template and
	/// rewrites it using the configured strategy. Templates are only written
	/// when their content changes.
	Run {
		/// Preview changes without writing files. Prints which templates
		/// would be modified.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Show a line diff for each template that is (or would be) written.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for the pass summary.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,

		/// Watch the build manifest and output directory and re-run the pass
		/// after every build. Cannot be combined with `--dry-run`.
		#[arg(long, default_value_t = false, conflicts_with = "dry_run")]
		watch: bool,
	},
	/// Check that every template already references the latest build.
	///
	/// Runs the pass without writing anything. Exits with a non-zero status
	/// code when a template would change or a marker has no partner.
	///
	/// Ideal for CI pipelines after the build step.
	Check {
		/// Show a line diff for each template that would be written.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List every entry of the build with its resolved target template.
	Targets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each result includes the
	/// entry, template path, subject and outcome.
	Json,
}
