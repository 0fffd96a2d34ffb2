use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use crate::BuildContext;
use crate::ContentType;
use crate::InjectConfig;
use crate::InjectResult;
use crate::LoggingConfig;
use crate::MatchSpec;
use crate::PreviousBuilds;
use crate::Strategy;
use crate::TagBlock;
use crate::TargetResolver;
use crate::TemplateFs;
use crate::block::inject_blocks;
use crate::reference::inject_references;

/// What happened to one artifact (reference mode) or one content type
/// (block mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionOutcome {
	/// The template now references the new artifact.
	Written,
	/// The template already referenced the artifact; nothing was written.
	SkippedUnchanged,
	/// The reference pattern or begin marker is missing from the template.
	SkippedNoMatch,
	/// The artifact is neither a stylesheet nor a script.
	SkippedUnsupported,
	/// Only one marker occurrence exists, so no region can be replaced.
	FailedMissingPair,
}

impl InjectionOutcome {
	/// Outcomes that leave a template out of sync with the build.
	pub fn is_warning(self) -> bool {
		matches!(self, Self::SkippedNoMatch | Self::SkippedUnsupported)
	}

	pub fn is_failure(self) -> bool {
		matches!(self, Self::FailedMissingPair)
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Written => "written",
			Self::SkippedUnchanged => "unchanged",
			Self::SkippedNoMatch => "no-match",
			Self::SkippedUnsupported => "unsupported",
			Self::FailedMissingPair => "missing-pair",
		}
	}
}

impl fmt::Display for InjectionOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The unit an outcome applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionSubject {
	/// One emitted file, in reference mode.
	Artifact(String),
	/// All tags of one content type, in block mode.
	Block(ContentType),
}

impl fmt::Display for InjectionSubject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Artifact(filename) => f.write_str(filename),
			Self::Block(content_type) => write!(f, "{} block", content_type.marker_name()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionResult {
	pub entry: String,
	pub target: PathBuf,
	pub subject: InjectionSubject,
	pub outcome: InjectionOutcome,
	/// Text that was replaced, for [`InjectionOutcome::Written`].
	pub replaced: Option<String>,
}

/// Result of one build pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InjectionReport {
	/// Outcomes in processing order.
	pub results: Vec<InjectionResult>,
	/// Number of template writes performed.
	pub writes: usize,
}

impl InjectionReport {
	pub fn count(&self, outcome: InjectionOutcome) -> usize {
		self.results
			.iter()
			.filter(|result| result.outcome == outcome)
			.count()
	}

	pub fn has_failures(&self) -> bool {
		self.results.iter().any(|result| result.outcome.is_failure())
	}

	pub fn has_warnings(&self) -> bool {
		self.results.iter().any(|result| result.outcome.is_warning())
	}

	/// Templates that received at least one injection.
	pub fn written_targets(&self) -> BTreeSet<&Path> {
		self.results
			.iter()
			.filter(|result| result.outcome == InjectionOutcome::Written)
			.map(|result| result.target.as_path())
			.collect()
	}

	pub(crate) fn push(
		&mut self,
		entry: &str,
		target: &Path,
		subject: InjectionSubject,
		outcome: InjectionOutcome,
		replaced: Option<String>,
	) {
		self.results.push(InjectionResult {
			entry: entry.to_string(),
			target: target.to_path_buf(),
			subject,
			outcome,
			replaced,
		});
	}
}

/// Run one injection pass over every entry of a build.
///
/// Entries are processed in order and each entry's target is resolved
/// immediately before it is injected. Configuration and filesystem errors
/// abort the pass; every other problem is recorded in the report and the pass
/// moves on.
pub fn inject_build(
	ctx: &BuildContext,
	config: &InjectConfig,
	fs: &impl TemplateFs,
) -> InjectResult<InjectionReport> {
	let resolver = TargetResolver::new(config)?;
	let log = Diagnostics::new(config.logging);
	let mut report = InjectionReport::default();

	match config.strategy {
		Strategy::Reference => {
			let previous = PreviousBuilds::snapshot(fs, &ctx.output_dir)?;
			for entry in &ctx.entries {
				let target = resolver.resolve(entry)?;
				inject_references(
					entry,
					&target,
					config.reference_fragment(),
					&previous,
					fs,
					&log,
					&mut report,
				)?;
			}
		}
		Strategy::Block => {
			let public_path = config.effective_public_path(ctx.public_path.as_deref());
			for entry in &ctx.entries {
				let target = resolver.resolve(entry)?;
				let tags = TagBlock::from_artifacts(&entry.artifacts, public_path);
				inject_blocks(entry, &target, &tags, fs, &log, &mut report)?;
			}
		}
	}

	Ok(report)
}

/// Emits the diagnostics of a pass, honoring the logging toggles.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Diagnostics {
	toggles: LoggingConfig,
}

impl Diagnostics {
	pub(crate) fn new(toggles: LoggingConfig) -> Self {
		Self { toggles }
	}

	pub(crate) fn injected(
		&self,
		entry: &str,
		target: &Path,
		subject: &InjectionSubject,
		replaced: &str,
	) {
		if self.toggles.injection {
			tracing::info!(
				entry,
				template = %target.display(),
				subject = %subject,
				replaced = %replaced.trim(),
				"injected"
			);
		}
	}

	pub(crate) fn unchanged(
		&self,
		entry: &str,
		target: &Path,
		subject: &InjectionSubject,
		reason: &str,
	) {
		if self.toggles.skipped {
			tracing::info!(
				entry,
				template = %target.display(),
				subject = %subject,
				"skipping injection, {reason}"
			);
		}
	}

	pub(crate) fn no_match(
		&self,
		entry: &str,
		target: &Path,
		subject: &InjectionSubject,
		matcher: &MatchSpec,
	) {
		if self.toggles.warnings {
			tracing::warn!(
				entry,
				template = %target.display(),
				subject = %subject,
				"{matcher} was not found; nothing was injected"
			);
		}
	}

	pub(crate) fn unsupported(&self, entry: &str, filename: &str) {
		if self.toggles.warnings {
			tracing::warn!(entry, artifact = filename, "unsupported file extension, skipping");
		}
	}

	pub(crate) fn missing_pair(&self, entry: &str, target: &Path, matcher: &MatchSpec) {
		tracing::error!(
			entry,
			template = %target.display(),
			"only one {matcher} was found; a pair is required to delimit the injected tags"
		);
	}

	pub(crate) fn wrote(&self, target: &Path) {
		tracing::debug!(template = %target.display(), "writing template");
	}
}
