use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum InjectError {
	#[error(transparent)]
	#[diagnostic(code(hashinject::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to read template `{}`", .path.display())]
	#[diagnostic(
		code(hashinject::read_template),
		help("check that the target file exists or add a `[targets]` override for this entry")
	)]
	ReadTemplate {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write template `{}`", .path.display())]
	#[diagnostic(code(hashinject::write_template))]
	WriteTemplate {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to list build output directory `{}`", .path.display())]
	#[diagnostic(
		code(hashinject::list_output_dir),
		help("run the build before injecting so the output directory exists")
	)]
	ListOutputDir {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to read config file `{}`", .path.display())]
	#[diagnostic(
		code(hashinject::read_config),
		help("pass an existing file to `--config` or remove the flag to use discovery")
	)]
	ReadConfig {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(hashinject::config_parse),
		help("check that hashinject.toml is valid TOML")
	)]
	ConfigParse(String),

	#[error("failed to parse build manifest `{path}`: {reason}")]
	#[diagnostic(code(hashinject::manifest_parse))]
	ManifestParse { path: String, reason: String },

	#[error("entry `{entry}` has no usable source path (candidates: {candidates:?})")]
	#[diagnostic(
		code(hashinject::no_usable_source),
		help(
			"every candidate matched `exclude_sources`; narrow the exclusions or add an \
			 `absolute_path` / `relative_path` target for this entry"
		)
	)]
	NoUsableSource {
		entry: String,
		candidates: Vec<String>,
	},

	#[error("invalid match pattern `{pattern}`: {reason}")]
	#[diagnostic(
		code(hashinject::invalid_pattern),
		help("`match_pattern` is a regex fragment placed between the entry name and the extension")
	)]
	InvalidPattern { pattern: String, reason: String },

	#[error("invalid source exclusion glob `{pattern}`: {reason}")]
	#[diagnostic(code(hashinject::invalid_exclude_pattern))]
	InvalidExcludePattern { pattern: String, reason: String },
}

impl InjectError {
	/// Returns true for errors caused by configuration rather than the
	/// filesystem.
	pub fn is_configuration(&self) -> bool {
		matches!(
			self,
			Self::ConfigParse(_)
				| Self::ManifestParse { .. }
				| Self::NoUsableSource { .. }
				| Self::InvalidPattern { .. }
				| Self::InvalidExcludePattern { .. }
		)
	}
}

pub type InjectResult<T> = Result<T, InjectError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
