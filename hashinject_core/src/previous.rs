use std::collections::HashSet;
use std::path::Path;

use crate::InjectResult;
use crate::TemplateFs;

/// File names present in the build output directory when a pass starts.
///
/// Taken once per pass and never refreshed; entries are processed
/// synchronously and the directory is not expected to change mid-pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviousBuilds {
	names: HashSet<String>,
}

impl PreviousBuilds {
	pub fn snapshot(fs: &impl TemplateFs, output_dir: &Path) -> InjectResult<Self> {
		let names = fs.list_file_names(output_dir)?.into_iter().collect();
		Ok(Self { names })
	}

	pub fn contains(&self, filename: &str) -> bool {
		self.names.contains(filename)
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}
}

impl<S: Into<String>> FromIterator<S> for PreviousBuilds {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self {
			names: iter.into_iter().map(Into::into).collect(),
		}
	}
}
