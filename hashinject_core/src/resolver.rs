use std::fmt;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use globset::GlobSet;

use crate::EntryPoint;
use crate::InjectConfig;
use crate::InjectError;
use crate::InjectResult;
use crate::OverrideRule;

/// The rule that decides an entry's target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetRule<'a> {
	Override(&'a OverrideRule),
	/// Substitute this file name into the entry's source directory.
	Default(&'a str),
}

impl fmt::Display for TargetRule<'_> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Override(rule) => write!(f, "{rule}"),
			Self::Default(file) => write!(f, "default ({file})"),
		}
	}
}

/// Resolves target paths for every entry of a pass using one configuration.
#[derive(Debug, Clone)]
pub struct TargetResolver<'a> {
	config: &'a InjectConfig,
	exclusions: GlobSet,
}

impl<'a> TargetResolver<'a> {
	pub fn new(config: &'a InjectConfig) -> InjectResult<Self> {
		Ok(Self {
			config,
			exclusions: config.exclusion_set()?,
		})
	}

	/// The rule that applies to `entry`.
	pub fn rule_for(&self, entry: &EntryPoint) -> TargetRule<'a> {
		match self.config.targets.get(&entry.name) {
			Some(rule) => TargetRule::Override(rule),
			None => TargetRule::Default(&self.config.default_write_file),
		}
	}

	/// Path of the file to inject into for `entry`.
	pub fn resolve(&self, entry: &EntryPoint) -> InjectResult<PathBuf> {
		resolve_target(
			entry,
			self.rule_for(entry),
			&self.config.base_dir,
			&self.exclusions,
		)
	}
}

/// Compute the target path of `entry` under `rule`.
///
/// Absolute overrides are used as given and relative overrides join onto
/// `base_dir`; neither looks at the entry's sources. File-name overrides and
/// the default rule replace the file name of the first source candidate that
/// `exclusions` does not match.
///
/// The result is lexically normalized, so two entries naming one template
/// through different `.`/`..` spellings share a single path.
pub fn resolve_target(
	entry: &EntryPoint,
	rule: TargetRule<'_>,
	base_dir: &Path,
	exclusions: &GlobSet,
) -> InjectResult<PathBuf> {
	let target = match rule {
		TargetRule::Override(OverrideRule::AbsolutePath(path)) => path.clone(),
		TargetRule::Override(OverrideRule::RelativePath(path)) => base_dir.join(path),
		TargetRule::Override(OverrideRule::FileName(file)) => {
			select_source(entry, exclusions)?.with_file_name(file)
		}
		TargetRule::Default(file) => select_source(entry, exclusions)?.with_file_name(file),
	};

	Ok(normalize_path(&target))
}

/// Drop `.` segments and fold `..` into the preceding directory without
/// touching the filesystem. Leading `..` segments of a relative path are
/// kept; `..` directly under the root is dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
	let mut normalized = PathBuf::new();

	for component in path.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				match normalized.components().next_back() {
					Some(Component::Normal(_)) => {
						normalized.pop();
					}
					Some(Component::RootDir | Component::Prefix(_)) => {}
					Some(Component::ParentDir | Component::CurDir) | None => {
						normalized.push(Component::ParentDir);
					}
				}
			}
			other => normalized.push(other),
		}
	}

	normalized
}

/// The first declared source path not claimed by other tooling.
pub fn select_source<'e>(entry: &'e EntryPoint, exclusions: &GlobSet) -> InjectResult<&'e Path> {
	entry
		.source_paths
		.iter()
		.map(PathBuf::as_path)
		.find(|path| !exclusions.is_match(path))
		.ok_or_else(|| {
			InjectError::NoUsableSource {
				entry: entry.name.clone(),
				candidates: entry
					.source_paths
					.iter()
					.map(|path| path.display().to_string())
					.collect(),
			}
		})
}
