use std::fmt;
use std::ops::Range;

use regex::Regex;

use crate::ContentType;
use crate::InjectError;
use crate::InjectResult;

/// How a template location is described for one (entry, content type) pair.
#[derive(Debug, Clone)]
pub enum MatchSpec {
	/// The first match of a regex is the reference to replace.
	SingleReference(ReferencePattern),
	/// The region strictly between two occurrences of a marker token.
	MarkerPair(MarkerPair),
}

impl fmt::Display for MatchSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::SingleReference(pattern) => write!(f, "pattern `{}`", pattern.as_str()),
			Self::MarkerPair(pair) => write!(f, "marker `{}`", pair.begin),
		}
	}
}

impl From<ReferencePattern> for MatchSpec {
	fn from(pattern: ReferencePattern) -> Self {
		Self::SingleReference(pattern)
	}
}

impl From<MarkerPair> for MatchSpec {
	fn from(pair: MarkerPair) -> Self {
		Self::MarkerPair(pair)
	}
}

/// Matches `<entry><fragment>.<ext>`: a bare reference on the first build and
/// a hashed one afterwards.
#[derive(Debug, Clone)]
pub struct ReferencePattern(Regex);

impl ReferencePattern {
	pub fn new(entry: &str, content_type: ContentType, fragment: &str) -> InjectResult<Self> {
		reference_pattern(entry, content_type.extension(), fragment).map(Self)
	}

	/// Byte range of the first match.
	pub fn find(&self, content: &str) -> Option<Range<usize>> {
		self.0.find(content).map(|found| found.range())
	}

	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
}

/// Build `<entry><fragment>\.<extension>`. The entry name and extension are
/// matched literally; the fragment is a regex.
pub fn reference_pattern(entry: &str, extension: &str, fragment: &str) -> InjectResult<Regex> {
	let pattern = format!(
		r"{}{fragment}\.{}",
		regex::escape(entry),
		regex::escape(extension)
	);

	Regex::new(&pattern).map_err(|e| {
		InjectError::InvalidPattern {
			pattern: fragment.to_string(),
			reason: e.to_string(),
		}
	})
}

/// Literal marker delimiting the block region for a content type, e.g.
/// `<!-- INJECT-CSS -->`.
pub fn marker_token(content_type: ContentType) -> String {
	format!("<!-- INJECT-{} -->", content_type.marker_name())
}

/// Begin and end tokens of a replaceable region. The standard convention
/// repeats one token, so both are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPair {
	pub begin: String,
	pub end: String,
}

impl MarkerPair {
	pub fn new(content_type: ContentType) -> Self {
		let token = marker_token(content_type);
		Self {
			begin: token.clone(),
			end: token,
		}
	}

	/// Locate the region after the first `begin` and before the next `end`.
	pub fn locate(&self, content: &str) -> MarkerRegion {
		let Some(at) = content.find(&self.begin) else {
			return MarkerRegion::Missing;
		};

		let start = at + self.begin.len();
		match content[start..].find(&self.end) {
			Some(offset) => MarkerRegion::Paired(start..start + offset),
			None => MarkerRegion::Unpaired { at },
		}
	}
}

/// Where a [`MarkerPair`] sits in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerRegion {
	/// The marker does not occur.
	Missing,
	/// The marker occurs once at byte `at`; it cannot delimit a region.
	Unpaired { at: usize },
	/// Byte range strictly between the two occurrences.
	Paired(Range<usize>),
}
