use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use crate::InjectError;
use crate::InjectResult;

/// The filesystem primitives the engine needs from its host.
///
/// All calls are synchronous. The engine never holds a file open across calls,
/// so a read followed by a write is not atomic against outside edits.
pub trait TemplateFs {
	/// Read a whole template as UTF-8 text.
	fn read_to_string(&self, path: &Path) -> InjectResult<String>;

	/// Replace the whole content of a template.
	fn write(&self, path: &Path, content: &str) -> InjectResult<()>;

	/// List the names of the entries directly inside `dir`.
	fn list_file_names(&self, dir: &Path) -> InjectResult<Vec<String>>;
}

/// Reads and writes templates on the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl TemplateFs for LocalFs {
	fn read_to_string(&self, path: &Path) -> InjectResult<String> {
		std::fs::read_to_string(path).map_err(|source| {
			InjectError::ReadTemplate {
				path: path.to_path_buf(),
				source,
			}
		})
	}

	fn write(&self, path: &Path, content: &str) -> InjectResult<()> {
		std::fs::write(path, content).map_err(|source| {
			InjectError::WriteTemplate {
				path: path.to_path_buf(),
				source,
			}
		})
	}

	fn list_file_names(&self, dir: &Path) -> InjectResult<Vec<String>> {
		let list_error = |source: std::io::Error| {
			InjectError::ListOutputDir {
				path: dir.to_path_buf(),
				source,
			}
		};

		let mut names = Vec::new();
		for entry in std::fs::read_dir(dir).map_err(list_error)? {
			let entry = entry.map_err(list_error)?;
			names.push(entry.file_name().to_string_lossy().into_owned());
		}
		names.sort();

		Ok(names)
	}
}

/// A write that [`DryRunFs`] captured instead of performing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrite {
	pub path: PathBuf,
	/// Content on disk before the pass started.
	pub original: String,
	/// Content the pass would have written.
	pub updated: String,
}

/// Reads through to the local disk but keeps every write in memory.
///
/// Later reads of a captured path observe the captured content, so a dry run
/// follows exactly the same sequence of decisions as a real pass.
#[derive(Debug, Default)]
pub struct DryRunFs {
	captured: RefCell<BTreeMap<PathBuf, PendingWrite>>,
}

impl DryRunFs {
	pub fn new() -> Self {
		Self::default()
	}

	/// Writes that would have been performed, ordered by path. Paths whose
	/// final content matches the original are left out.
	pub fn pending_writes(&self) -> Vec<PendingWrite> {
		self.captured
			.borrow()
			.values()
			.filter(|write| write.original != write.updated)
			.cloned()
			.collect()
	}
}

impl TemplateFs for DryRunFs {
	fn read_to_string(&self, path: &Path) -> InjectResult<String> {
		if let Some(write) = self.captured.borrow().get(path) {
			return Ok(write.updated.clone());
		}

		LocalFs.read_to_string(path)
	}

	fn write(&self, path: &Path, content: &str) -> InjectResult<()> {
		let mut captured = self.captured.borrow_mut();
		if let Some(write) = captured.get_mut(path) {
			content.clone_into(&mut write.updated);
			return Ok(());
		}

		let original = LocalFs.read_to_string(path)?;
		captured.insert(
			path.to_path_buf(),
			PendingWrite {
				path: path.to_path_buf(),
				original,
				updated: content.to_string(),
			},
		);

		Ok(())
	}

	fn list_file_names(&self, dir: &Path) -> InjectResult<Vec<String>> {
		LocalFs.list_file_names(dir)
	}
}
