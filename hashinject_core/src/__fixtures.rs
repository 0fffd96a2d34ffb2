use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use crate::BuildContext;
use crate::EntryPoint;
use crate::InjectConfig;
use crate::InjectError;
use crate::InjectResult;
use crate::Strategy;
use crate::TemplateFs;

pub const OUTPUT_DIR: &str = "/site/dist";
pub const APP_SOURCE: &str = "/site/src/app/index.js";
pub const APP_TARGET: &str = "/site/src/app/index.aspx";

/// In-memory filesystem that records every write.
#[derive(Debug, Default)]
pub struct MemoryFs {
	files: RefCell<BTreeMap<PathBuf, String>>,
	dirs: BTreeMap<PathBuf, Vec<String>>,
	writes: RefCell<Vec<PathBuf>>,
}

impl MemoryFs {
	pub fn new() -> Self {
		Self::default().with_dir(OUTPUT_DIR, Vec::<String>::new())
	}

	pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
		self.files.borrow_mut().insert(path.into(), content.to_string());
		self
	}

	pub fn with_dir<I>(mut self, path: impl Into<PathBuf>, names: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		self.dirs
			.insert(path.into(), names.into_iter().map(Into::into).collect());
		self
	}

	pub fn content(&self, path: impl AsRef<Path>) -> String {
		self.files
			.borrow()
			.get(path.as_ref())
			.cloned()
			.unwrap_or_default()
	}

	pub fn write_count(&self) -> usize {
		self.writes.borrow().len()
	}

	pub fn writes_to(&self, path: impl AsRef<Path>) -> usize {
		self.writes
			.borrow()
			.iter()
			.filter(|written| written.as_path() == path.as_ref())
			.count()
	}
}

impl TemplateFs for MemoryFs {
	fn read_to_string(&self, path: &Path) -> InjectResult<String> {
		self.files.borrow().get(path).cloned().ok_or_else(|| {
			InjectError::ReadTemplate {
				path: path.to_path_buf(),
				source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
			}
		})
	}

	fn write(&self, path: &Path, content: &str) -> InjectResult<()> {
		self.files
			.borrow_mut()
			.insert(path.to_path_buf(), content.to_string());
		self.writes.borrow_mut().push(path.to_path_buf());
		Ok(())
	}

	fn list_file_names(&self, dir: &Path) -> InjectResult<Vec<String>> {
		self.dirs.get(dir).cloned().ok_or_else(|| {
			InjectError::ListOutputDir {
				path: dir.to_path_buf(),
				source: std::io::Error::new(std::io::ErrorKind::NotFound, "directory not found"),
			}
		})
	}
}

/// A build with a single `app` entry emitting `artifacts`.
pub fn app_build(artifacts: &[&str]) -> BuildContext {
	BuildContext::new(OUTPUT_DIR).with_entry(EntryPoint::new(
		"app",
		[APP_SOURCE],
		artifacts.iter().copied(),
	))
}

pub fn block_config() -> InjectConfig {
	InjectConfig {
		strategy: Strategy::Block,
		public_path: Some("/dist/".to_string()),
		..InjectConfig::default()
	}
	.with_base_dir("/site")
}

pub fn reference_config() -> InjectConfig {
	InjectConfig::default().with_base_dir("/site")
}

pub fn aspx_page(head: &str, body: &str) -> String {
	format!(
		"<%@ Page Language=\"C#\" %>\n<html>\n<head>\n  {head}\n</head>\n<body>\n  {body}\n</body>\n</html>\n"
	)
}
