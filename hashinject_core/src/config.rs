use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use serde::Deserialize;

use crate::InjectError;
use crate::InjectResult;
use crate::matcher::reference_pattern;

/// File name substituted into an entry's source directory when the entry has
/// no `[targets]` override.
pub const DEFAULT_WRITE_FILE: &str = "index.aspx";

/// Build manifest read by the CLI when none is configured.
pub const DEFAULT_MANIFEST: &str = "build-manifest.json";

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"hashinject.toml",
	".hashinject.toml",
	".config/hashinject.toml",
];

/// Source paths injected by dev tooling alongside the real entry module.
pub const DEFAULT_EXCLUDE_SOURCES: [&str; 3] = [
	"**/node_modules/**",
	"**/webpack-dev-server/**",
	"**/webpack/hot/**",
];

/// How templates reference build artifacts.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
	/// Each artifact filename replaces one existing reference in the template.
	#[default]
	Reference,
	/// Generated `<link>`/`<script>` tags replace the region between a pair of
	/// `<!-- INJECT-CSS -->` or `<!-- INJECT-JS -->` markers.
	Block,
}

impl fmt::Display for Strategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Reference => write!(f, "reference"),
			Self::Block => write!(f, "block"),
		}
	}
}

/// Built-in naming schemes for hashed bundle references.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceStyle {
	/// `app.bundle.js` and `app.bundle.3f2a9c.js`.
	#[default]
	Dotted,
	/// `app-bundle.js` and `app-3f2a9c-bundle.js`.
	Dashed,
}

impl ReferenceStyle {
	/// Regex fragment matched between the entry name and the extension.
	pub fn fragment(self) -> &'static str {
		match self {
			Self::Dotted => r"\.bundle\.?\w*?",
			Self::Dashed => r"-?\w*?-bundle",
		}
	}
}

/// Where to inject for one entry, replacing the default
/// `<source dir>/<default_write_file>` target.
///
/// ```toml
/// [targets.admin]
/// absolute_path = "/srv/www/admin/index.aspx"
///
/// [targets.shop]
/// relative_path = "views/shop/layout.cshtml"
///
/// [targets.blog]
/// file = "blog.html"
/// ```
///
/// When a table sets more than one key the most specific wins:
/// `absolute_path`, then `relative_path`, then `file`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawOverrideRule")]
pub enum OverrideRule {
	/// Used verbatim.
	AbsolutePath(PathBuf),
	/// Joined onto the config's base directory.
	RelativePath(PathBuf),
	/// Replaces the file name of the entry's source path.
	FileName(String),
}

#[derive(Debug, Deserialize)]
struct RawOverrideRule {
	#[serde(default, alias = "path", alias = "absolutePath")]
	absolute_path: Option<PathBuf>,
	#[serde(default, alias = "relativePath")]
	relative_path: Option<PathBuf>,
	#[serde(default)]
	file: Option<String>,
}

impl TryFrom<RawOverrideRule> for OverrideRule {
	type Error = String;

	fn try_from(raw: RawOverrideRule) -> Result<Self, Self::Error> {
		if let Some(path) = raw.absolute_path {
			return Ok(Self::AbsolutePath(path));
		}
		if let Some(path) = raw.relative_path {
			return Ok(Self::RelativePath(path));
		}
		if let Some(file) = raw.file {
			return Ok(Self::FileName(file));
		}

		Err("a target must set one of `absolute_path`, `relative_path` or `file`".to_string())
	}
}

impl fmt::Display for OverrideRule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::AbsolutePath(path) => write!(f, "absolute_path = {}", path.display()),
			Self::RelativePath(path) => write!(f, "relative_path = {}", path.display()),
			Self::FileName(name) => write!(f, "file = {name}"),
		}
	}
}

/// Toggles for the diagnostics emitted during a pass. They never change which
/// files are written.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
	/// Report each successful injection.
	#[serde(default = "enabled")]
	pub injection: bool,
	/// Report missing references and markers and unsupported artifacts.
	#[serde(default = "enabled")]
	pub warnings: bool,
	/// Report artifacts that were already up to date.
	#[serde(default = "enabled")]
	pub skipped: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			injection: true,
			warnings: true,
			skipped: true,
		}
	}
}

fn enabled() -> bool {
	true
}

/// Configuration loaded from a `hashinject.toml` file.
///
/// ```toml
/// strategy = "reference"
/// reference_style = "dotted"
/// default_write_file = "index.aspx"
/// public_path = "/dist/"
/// exclude_sources = ["**/node_modules/**"]
///
/// [targets.admin]
/// relative_path = "views/admin/index.cshtml"
///
/// [logging]
/// skipped = false
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct InjectConfig {
	/// Matching strategy used for every entry.
	#[serde(default)]
	pub strategy: Strategy,
	/// Built-in reference naming scheme, ignored when `match_pattern` is set.
	#[serde(default)]
	pub reference_style: ReferenceStyle,
	/// Custom regex fragment placed between the escaped entry name and
	/// `\.<ext>`.
	#[serde(default, alias = "pattern_to_match", alias = "patternToMatch")]
	pub match_pattern: Option<String>,
	/// Target file name used when an entry has no override.
	#[serde(default = "default_write_file", alias = "defaultWriteFile")]
	pub default_write_file: String,
	/// URL prefix for generated `href`/`src` attributes in block mode.
	#[serde(default, alias = "publicPath")]
	pub public_path: Option<String>,
	/// Globs for entry source candidates that belong to other tooling.
	#[serde(default = "default_exclude_sources")]
	pub exclude_sources: Vec<String>,
	/// Build manifest describing the entries of the latest build.
	#[serde(default = "default_manifest")]
	pub manifest: PathBuf,
	/// Per-entry target overrides keyed by entry name.
	#[serde(
		default,
		alias = "overrides",
		alias = "chunk_overrides",
		alias = "chunkOverrides"
	)]
	pub targets: BTreeMap<String, OverrideRule>,
	#[serde(default)]
	pub logging: LoggingConfig,
	/// Directory that `relative_path` overrides resolve against. Set to the
	/// directory of the loaded config file.
	#[serde(skip)]
	pub base_dir: PathBuf,
}

impl Default for InjectConfig {
	fn default() -> Self {
		Self {
			strategy: Strategy::default(),
			reference_style: ReferenceStyle::default(),
			match_pattern: None,
			default_write_file: default_write_file(),
			public_path: None,
			exclude_sources: default_exclude_sources(),
			manifest: default_manifest(),
			targets: BTreeMap::new(),
			logging: LoggingConfig::default(),
			base_dir: PathBuf::new(),
		}
	}
}

fn default_write_file() -> String {
	DEFAULT_WRITE_FILE.to_string()
}

fn default_exclude_sources() -> Vec<String> {
	DEFAULT_EXCLUDE_SOURCES.map(String::from).to_vec()
}

fn default_manifest() -> PathBuf {
	PathBuf::from(DEFAULT_MANIFEST)
}

impl InjectConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no candidate exists.
	pub fn load(root: &Path) -> InjectResult<Option<InjectConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::load_file(&config_path).map(Some)
	}

	/// Load the config file at `path`. Its base directory becomes the
	/// directory the file lives in, except for the `.config/` candidate which
	/// resolves against the project root above it.
	pub fn load_file(path: &Path) -> InjectResult<InjectConfig> {
		let content = std::fs::read_to_string(path).map_err(|source| {
			InjectError::ReadConfig {
				path: path.to_path_buf(),
				source,
			}
		})?;
		let mut config = Self::from_toml(&content)?;

		let parent = path.parent().unwrap_or_else(|| Path::new("."));
		config.base_dir = if parent.file_name().is_some_and(|name| name == ".config") {
			parent.parent().unwrap_or(parent).to_path_buf()
		} else {
			parent.to_path_buf()
		};

		Ok(config)
	}

	/// Load the discovered config, falling back to defaults rooted at `root`.
	pub fn load_or_default(root: &Path) -> InjectResult<InjectConfig> {
		match Self::load(root)? {
			Some(config) => Ok(config),
			None => Ok(Self::default().with_base_dir(root)),
		}
	}

	/// Parse configuration text. The base directory is left empty.
	pub fn from_toml(content: &str) -> InjectResult<InjectConfig> {
		let config: InjectConfig =
			toml::from_str(content).map_err(|e| InjectError::ConfigParse(e.to_string()))?;
		config.validate()?;

		Ok(config)
	}

	#[must_use]
	pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
		self.base_dir = base_dir.into();
		self
	}

	/// Check everything that can be checked before a pass starts: the custom
	/// match fragment and the exclusion globs must compile.
	pub fn validate(&self) -> InjectResult<()> {
		if let Some(fragment) = &self.match_pattern {
			reference_pattern("entry", "js", fragment)?;
		}
		self.exclusion_set()?;

		Ok(())
	}

	/// Regex fragment used by the single-reference strategy.
	pub fn reference_fragment(&self) -> &str {
		self.match_pattern
			.as_deref()
			.unwrap_or_else(|| self.reference_style.fragment())
	}

	/// Compile `exclude_sources` into a glob set.
	pub fn exclusion_set(&self) -> InjectResult<GlobSet> {
		let mut builder = GlobSetBuilder::new();
		for pattern in &self.exclude_sources {
			let glob = Glob::new(pattern).map_err(|e| {
				InjectError::InvalidExcludePattern {
					pattern: pattern.clone(),
					reason: e.to_string(),
				}
			})?;
			builder.add(glob);
		}

		builder.build().map_err(|e| {
			InjectError::InvalidExcludePattern {
				pattern: self.exclude_sources.join(", "),
				reason: e.to_string(),
			}
		})
	}

	/// Public path for generated tags: the configured value, then the build's
	/// own public path, then `/`.
	pub fn effective_public_path<'a>(&'a self, build_public_path: Option<&'a str>) -> &'a str {
		self.public_path
			.as_deref()
			.filter(|path| !path.is_empty())
			.or(build_public_path.filter(|path| !path.is_empty()))
			.unwrap_or("/")
	}
}
