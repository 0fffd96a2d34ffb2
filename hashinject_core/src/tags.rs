use crate::BuildArtifact;
use crate::ContentType;

/// Separator written before every generated tag.
pub const TAG_INDENT: &str = "\n  ";

/// Render the markup that references one artifact.
pub fn render_tag(content_type: ContentType, public_path: &str, filename: &str) -> String {
	match content_type {
		ContentType::Css => {
			format!(r#"<link rel="Stylesheet" href="{public_path}{filename}" />"#)
		}
		ContentType::Js => {
			format!(r#"<script type="text/javascript" src="{public_path}{filename}"></script>"#)
		}
	}
}

/// Generated markup for one entry, grouped by content type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBlock {
	pub css: String,
	pub js: String,
	/// Artifacts that are neither stylesheets nor scripts, in emit order.
	pub unsupported: Vec<String>,
}

impl TagBlock {
	/// Fold the artifacts, in order, into one block per content type.
	pub fn from_artifacts(artifacts: &[BuildArtifact], public_path: &str) -> Self {
		let mut block = Self::default();

		for artifact in artifacts {
			let Some(content_type) = artifact.kind.content_type() else {
				block.unsupported.push(artifact.filename.clone());
				continue;
			};

			let tags = block.get_mut(content_type);
			tags.push_str(TAG_INDENT);
			tags.push_str(&render_tag(content_type, public_path, &artifact.filename));
		}

		block
	}

	pub fn get(&self, content_type: ContentType) -> &str {
		match content_type {
			ContentType::Css => &self.css,
			ContentType::Js => &self.js,
		}
	}

	fn get_mut(&mut self, content_type: ContentType) -> &mut String {
		match content_type {
			ContentType::Css => &mut self.css,
			ContentType::Js => &mut self.js,
		}
	}
}
