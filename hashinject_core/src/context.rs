use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::InjectError;
use crate::InjectResult;

/// The two kinds of artifact the engine knows how to reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContentType {
	Css,
	Js,
}

impl ContentType {
	/// Processing order within one entry.
	pub const ALL: [ContentType; 2] = [ContentType::Css, ContentType::Js];

	pub fn extension(self) -> &'static str {
		match self {
			Self::Css => "css",
			Self::Js => "js",
		}
	}

	/// Upper-case name used in block markers.
	pub fn marker_name(self) -> &'static str {
		match self {
			Self::Css => "CSS",
			Self::Js => "JS",
		}
	}
}

impl fmt::Display for ContentType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.extension())
	}
}

/// Classification of an emitted file by its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
	Css,
	Js,
	/// Anything else, e.g. source maps. Holds the extension without the dot
	/// (empty when the file has none).
	Other(String),
}

impl ArtifactKind {
	pub fn from_filename(filename: &str) -> Self {
		let extension = Path::new(filename)
			.extension()
			.and_then(|ext| ext.to_str())
			.unwrap_or("");

		match extension {
			"css" => Self::Css,
			"js" => Self::Js,
			other => Self::Other(other.to_string()),
		}
	}

	pub fn content_type(&self) -> Option<ContentType> {
		match self {
			Self::Css => Some(ContentType::Css),
			Self::Js => Some(ContentType::Js),
			Self::Other(_) => None,
		}
	}
}

/// One file emitted by the build for an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArtifact {
	pub filename: String,
	pub kind: ArtifactKind,
}

impl BuildArtifact {
	pub fn new(filename: impl Into<String>) -> Self {
		let filename = filename.into();
		let kind = ArtifactKind::from_filename(&filename);
		Self { filename, kind }
	}
}

/// A named build input together with everything it emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
	pub name: String,
	/// Declared source paths. Usually one, but dev tooling may add auxiliary
	/// candidates ahead of the real entry module.
	pub source_paths: Vec<PathBuf>,
	/// Emitted artifacts in emit order.
	pub artifacts: Vec<BuildArtifact>,
}

impl EntryPoint {
	pub fn new<S, A>(name: impl Into<String>, source_paths: S, artifacts: A) -> Self
	where
		S: IntoIterator,
		S::Item: Into<PathBuf>,
		A: IntoIterator,
		A::Item: Into<String>,
	{
		Self {
			name: name.into(),
			source_paths: source_paths.into_iter().map(Into::into).collect(),
			artifacts: artifacts.into_iter().map(BuildArtifact::new).collect(),
		}
	}
}

/// Everything the host pipeline knows about one completed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
	/// Directory the build emitted into.
	pub output_dir: PathBuf,
	/// Public path configured in the build, if any.
	pub public_path: Option<String>,
	/// Entries in declaration order.
	pub entries: Vec<EntryPoint>,
}

impl BuildContext {
	pub fn new(output_dir: impl Into<PathBuf>) -> Self {
		Self {
			output_dir: output_dir.into(),
			public_path: None,
			entries: Vec::new(),
		}
	}

	#[must_use]
	pub fn with_public_path(mut self, public_path: impl Into<String>) -> Self {
		self.public_path = Some(public_path.into());
		self
	}

	#[must_use]
	pub fn with_entry(mut self, entry: EntryPoint) -> Self {
		self.entries.push(entry);
		self
	}

	/// Load a build manifest from disk. Relative paths inside it resolve
	/// against the manifest's directory.
	pub fn from_manifest_file(path: &Path) -> InjectResult<BuildContext> {
		let content = std::fs::read_to_string(path).map_err(|e| {
			InjectError::ManifestParse {
				path: path.display().to_string(),
				reason: e.to_string(),
			}
		})?;
		let base = path.parent().unwrap_or_else(|| Path::new("."));

		Self::from_manifest_str(&content, base, &path.display().to_string())
	}

	/// Parse manifest JSON.
	///
	/// ```json
	/// {
	///   "output_dir": "dist",
	///   "public_path": "/dist/",
	///   "entries": [
	///     { "name": "app", "source": "./src/app/index.js", "artifacts": ["app.bundle.3f2a.js"] }
	///   ]
	/// }
	/// ```
	pub fn from_manifest_str(
		content: &str,
		base: &Path,
		path_display: &str,
	) -> InjectResult<BuildContext> {
		let manifest: Manifest =
			serde_json::from_str(content).map_err(|e| {
				InjectError::ManifestParse {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})?;

		let entries = manifest
			.entries
			.into_iter()
			.map(|entry| {
				let source_paths = match entry.source {
					ManifestSource::One(path) => vec![base.join(path)],
					ManifestSource::Many(paths) => {
						paths.into_iter().map(|path| base.join(path)).collect()
					}
				};
				EntryPoint::new(entry.name, source_paths, entry.artifacts)
			})
			.collect();

		Ok(BuildContext {
			output_dir: base.join(manifest.output_dir),
			public_path: manifest.public_path,
			entries,
		})
	}
}

#[derive(Debug, Deserialize)]
struct Manifest {
	#[serde(alias = "outputDir", alias = "path")]
	output_dir: PathBuf,
	#[serde(default, alias = "publicPath")]
	public_path: Option<String>,
	#[serde(default)]
	entries: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
	name: String,
	#[serde(alias = "sources", alias = "entry")]
	source: ManifestSource,
	#[serde(default, alias = "files")]
	artifacts: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ManifestSource {
	One(PathBuf),
	Many(Vec<PathBuf>),
}
