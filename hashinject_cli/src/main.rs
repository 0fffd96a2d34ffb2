use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use hashinject_cli::Commands;
use hashinject_cli::HashinjectCli;
use hashinject_cli::OutputFormat;
use hashinject_core::BuildContext;
use hashinject_core::DryRunFs;
use hashinject_core::InjectConfig;
use hashinject_core::InjectError;
use hashinject_core::InjectionOutcome;
use hashinject_core::InjectionReport;
use hashinject_core::LocalFs;
use hashinject_core::PendingWrite;
use hashinject_core::TargetResolver;
use hashinject_core::TemplateFs;
use hashinject_core::inject_build;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const SAMPLE_CONFIG: &str = r#"# hashinject configuration

# "reference" rewrites an existing `app.bundle.js` style reference with the
# hashed filename. "block" regenerates the tags between a pair of
# `<!-- INJECT-CSS -->` / `<!-- INJECT-JS -->` markers.
strategy = "reference"

# Built-in reference naming: "dotted" (app.bundle.3f2a.js) or "dashed"
# (app-3f2a-bundle.js). `match_pattern` replaces it with a custom regex
# fragment placed between the entry name and the extension.
reference_style = "dotted"
# match_pattern = "\\.min\\.?\\w*?"

# Template file placed next to each entry's source when no target is set.
default_write_file = "index.aspx"

# URL prefix for generated tags in block mode. Falls back to the manifest's
# public_path, then "/".
# public_path = "/dist/"

# Build manifest written by your bundler.
manifest = "build-manifest.json"

# Source paths that belong to dev tooling rather than the entry itself.
# exclude_sources = ["**/node_modules/**", "**/webpack-dev-server/**", "**/webpack/hot/**"]

# Per-entry targets. Set exactly one of `absolute_path`, `relative_path`
# (resolved against this file's directory) or `file`.
# [targets.admin]
# relative_path = "Views/Admin/Index.cshtml"

# [logging]
# injection = true
# warnings = true
# skipped = true
"#;

fn main() {
	let args = HashinjectCli::parse();

	// Respect NO_COLOR env var, --no-color flag and non-terminal output.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stdout).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	init_tracing(args.verbose);

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Run {
			dry_run,
			diff,
			format,
			watch,
		}) => run_pass(&args, dry_run, diff, format, watch),
		Some(Commands::Check { diff, format }) => run_check(&args, diff, format),
		Some(Commands::Targets) => run_targets(&args),
		None => {
			eprintln!("No subcommand specified. Run `hashinject --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Render core errors through miette for codes and help text.
		match e.downcast::<InjectError>() {
			Ok(inject_err) => {
				let report: miette::Report = (*inject_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Diagnostics from the core go to stderr. `RUST_LOG` takes precedence over
/// the `--verbose` default.
fn init_tracing(verbose: bool) {
	let default_directive = if verbose {
		"hashinject=debug"
	} else {
		"hashinject=info"
	};
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.without_time()
		.init();
}

fn resolve_root(args: &HashinjectCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Everything a pass needs, loaded fresh for every run.
struct Session {
	root: PathBuf,
	config: InjectConfig,
	manifest: PathBuf,
}

fn load_session(args: &HashinjectCli) -> CliResult<Session> {
	let root = resolve_root(args);
	let config = match &args.config {
		Some(path) => InjectConfig::load_file(&root.join(path))?,
		None => InjectConfig::load_or_default(&root)?,
	};
	let manifest = match &args.manifest {
		Some(path) => root.join(path),
		None => config.base_dir.join(&config.manifest),
	};

	if args.verbose {
		match args
			.config
			.as_ref()
			.map(|path| root.join(path))
			.or_else(|| InjectConfig::resolve_path(&root))
		{
			Some(path) => eprintln!("Using config: {}", make_relative(&path, &root)),
			None => eprintln!("No config file found, using defaults."),
		}
		eprintln!("Using manifest: {}", make_relative(&manifest, &root));
		eprintln!("Strategy: {}", config.strategy);
	}

	Ok(Session {
		root,
		config,
		manifest,
	})
}

/// Result of a pass computed against a [`DryRunFs`].
struct Pass {
	root: PathBuf,
	report: InjectionReport,
	pending: Vec<PendingWrite>,
}

fn compute_pass(args: &HashinjectCli) -> CliResult<Pass> {
	let session = load_session(args)?;
	let ctx = BuildContext::from_manifest_file(&session.manifest)?;

	let fs = DryRunFs::new();
	let report = inject_build(&ctx, &session.config, &fs)?;

	Ok(Pass {
		root: session.root,
		report,
		pending: fs.pending_writes(),
	})
}

fn write_pending(pending: &[PendingWrite]) -> CliResult<()> {
	for write in pending {
		LocalFs.write(&write.path, &write.updated)?;
	}

	Ok(())
}

fn run_init(args: &HashinjectCli) -> CliResult<()> {
	let root = resolve_root(args);

	if let Some(existing) = InjectConfig::resolve_path(&root) {
		println!("Config file already exists: {}", existing.display());
		return Ok(());
	}

	let config_path = root.join("hashinject.toml");
	std::fs::write(&config_path, SAMPLE_CONFIG)?;
	println!("Created config file: {}", config_path.display());

	println!();
	println!("Next steps:");
	println!("  1. Have your bundler write build-manifest.json after each build");
	println!("  2. Adjust {} for your templates", config_path.display());
	println!("  3. Run `hashinject run` after every build");

	Ok(())
}

fn run_pass(
	args: &HashinjectCli,
	dry_run: bool,
	show_diff: bool,
	format: OutputFormat,
	watch: bool,
) -> CliResult<()> {
	// Run the initial pass.
	let has_failures = run_pass_once(args, dry_run, show_diff, format)?;

	if !watch {
		if has_failures {
			process::exit(1);
		}
		return Ok(());
	}

	// Watch mode
	let session = load_session(args)?;
	let ctx = BuildContext::from_manifest_file(&session.manifest)?;
	println!("\nWatching for new builds... (press Ctrl+C to stop)");

	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	let manifest_dir = session.manifest.parent().unwrap_or(&session.root);
	watcher.watch(manifest_dir, notify::RecursiveMode::NonRecursive)?;
	if ctx.output_dir.is_dir() && !ctx.output_dir.starts_with(manifest_dir) {
		watcher.watch(&ctx.output_dir, notify::RecursiveMode::Recursive)?;
	}

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nBuild change detected, injecting...");
		if let Err(e) = run_pass_once(args, false, show_diff, format) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

/// Run a single pass and return whether any marker pair was broken.
fn run_pass_once(
	args: &HashinjectCli,
	dry_run: bool,
	show_diff: bool,
	format: OutputFormat,
) -> CliResult<bool> {
	let pass = compute_pass(args)?;

	if !dry_run {
		write_pending(&pass.pending)?;
	}

	match format {
		OutputFormat::Json => {
			let output = serde_json::json!({
				"ok": !pass.report.has_failures(),
				"dry_run": dry_run,
				"writes": pass.report.writes,
				"templates": pending_paths(&pass),
				"results": result_entries(&pass),
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			let written = pass.report.count(InjectionOutcome::Written);

			if pass.pending.is_empty() {
				println!("All templates already reference the latest build.");
			} else if dry_run {
				println!(
					"Dry run: would inject {written} change(s) into {} template(s):",
					pass.pending.len()
				);
				print_pending(&pass, show_diff);
			} else {
				println!(
					"Injected {written} change(s) into {} template(s).",
					pass.pending.len()
				);
				if args.verbose || show_diff {
					print_pending(&pass, show_diff);
				}
			}

			print_problems(&pass);
		}
	}

	Ok(pass.report.has_failures())
}

fn run_check(args: &HashinjectCli, show_diff: bool, format: OutputFormat) -> CliResult<()> {
	let pass = compute_pass(args)?;
	let is_ok = pass.pending.is_empty() && !pass.report.has_failures();

	match format {
		OutputFormat::Json => {
			let output = serde_json::json!({
				"ok": is_ok,
				"stale": pending_paths(&pass),
				"results": result_entries(&pass),
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			if is_ok {
				println!("Check passed: all templates reference the latest build.");
			} else {
				eprintln!("Check failed.");
				eprintln!("  stale templates: {}", pass.pending.len());
				eprintln!(
					"  broken marker pairs: {}",
					pass.report.count(InjectionOutcome::FailedMissingPair)
				);

				if !pass.pending.is_empty() {
					eprintln!();
					eprintln!("Stale templates:");
					for write in &pass.pending {
						eprintln!("  {}", make_relative(&write.path, &pass.root));
						if show_diff {
							print_diff(&write.original, &write.updated);
						}
					}
				}

				print_problems(&pass);

				eprintln!();
				eprintln!("Run `hashinject run` to fix.");
			}
		}
	}

	if !is_ok {
		process::exit(1);
	}

	Ok(())
}

fn run_targets(args: &HashinjectCli) -> CliResult<()> {
	let session = load_session(args)?;
	let ctx = BuildContext::from_manifest_file(&session.manifest)?;
	let resolver = TargetResolver::new(&session.config)?;

	if ctx.entries.is_empty() {
		println!("The build manifest declares no entries.");
		return Ok(());
	}

	let mut unresolved = 0;
	for entry in &ctx.entries {
		let rule = resolver.rule_for(entry);
		match resolver.resolve(entry) {
			Ok(target) => {
				println!(
					"{} -> {} ({rule})",
					colored!(entry.name.as_str(), bold),
					make_relative(&target, &session.root)
				);
			}
			Err(e) => {
				unresolved += 1;
				println!(
					"{} -> {} {e}",
					colored!(entry.name.as_str(), bold),
					colored!("error:", red)
				);
			}
		}
	}

	if unresolved > 0 {
		return Err(format!("{unresolved} entry target(s) could not be resolved").into());
	}

	Ok(())
}

fn pending_paths(pass: &Pass) -> Vec<String> {
	pass.pending
		.iter()
		.map(|write| make_relative(&write.path, &pass.root))
		.collect()
}

fn result_entries(pass: &Pass) -> Vec<serde_json::Value> {
	pass.report
		.results
		.iter()
		.map(|result| {
			serde_json::json!({
				"entry": result.entry,
				"template": make_relative(&result.target, &pass.root),
				"subject": result.subject.to_string(),
				"outcome": result.outcome.as_str(),
				"replaced": result.replaced,
			})
		})
		.collect()
}

fn print_pending(pass: &Pass, show_diff: bool) {
	for write in &pass.pending {
		println!("  {}", make_relative(&write.path, &pass.root));
		if show_diff {
			print_diff(&write.original, &write.updated);
		}
	}
}

/// Summarize results that left a template out of sync.
fn print_problems(pass: &Pass) {
	for result in &pass.report.results {
		let rel = make_relative(&result.target, &pass.root);
		if result.outcome.is_failure() {
			eprintln!(
				"{} `{}` in {rel}: {} for entry `{}`",
				colored!("error:", red),
				result.subject,
				result.outcome,
				result.entry
			);
		} else if result.outcome.is_warning() {
			eprintln!(
				"{} `{}` in {rel}: {} for entry `{}`",
				colored!("warning:", yellow),
				result.subject,
				result.outcome,
				result.entry
			);
		}
	}
}

/// Print a line diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
