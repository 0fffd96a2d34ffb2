use std::path::Path;

use crate::ContentType;
use crate::EntryPoint;
use crate::InjectResult;
use crate::InjectionOutcome;
use crate::InjectionReport;
use crate::InjectionSubject;
use crate::MarkerPair;
use crate::MarkerRegion;
use crate::MatchSpec;
use crate::TAG_INDENT;
use crate::TagBlock;
use crate::TemplateFs;
use crate::engine::Diagnostics;

/// The change one content type's block makes to a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEdit {
	/// The begin marker does not occur.
	Missing,
	/// The marker occurs exactly once.
	Unpaired,
	/// The region already holds the generated tags.
	Unchanged,
	/// The region was replaced.
	Replaced { replaced: String, content: String },
}

/// Replace the region delimited by `markers` with `block`, followed by the
/// closing indentation.
///
/// A non-empty block that already appears inside the region leaves the
/// template untouched, as does a region that is byte-identical to the
/// replacement.
pub fn splice_block(content: &str, markers: &MarkerPair, block: &str) -> BlockEdit {
	let region = match markers.locate(content) {
		MarkerRegion::Missing => return BlockEdit::Missing,
		MarkerRegion::Unpaired { .. } => return BlockEdit::Unpaired,
		MarkerRegion::Paired(region) => region,
	};

	let current = &content[region.clone()];
	if !block.is_empty() && current.contains(block) {
		return BlockEdit::Unchanged;
	}

	let mut replacement = String::with_capacity(block.len() + TAG_INDENT.len());
	replacement.push_str(block);
	replacement.push_str(TAG_INDENT);
	if current == replacement {
		return BlockEdit::Unchanged;
	}

	let mut updated = String::with_capacity(content.len() - region.len() + replacement.len());
	updated.push_str(&content[..region.start]);
	updated.push_str(&replacement);
	updated.push_str(&content[region.end..]);

	BlockEdit::Replaced {
		replaced: current.to_string(),
		content: updated,
	}
}

/// Inject the CSS block, then the JS block, of one entry into `target`.
///
/// The template is read once. The JS splice operates on the output of the CSS
/// splice and the file is written at most once, after both.
pub(crate) fn inject_blocks(
	entry: &EntryPoint,
	target: &Path,
	tags: &TagBlock,
	fs: &impl TemplateFs,
	log: &Diagnostics,
	report: &mut InjectionReport,
) -> InjectResult<()> {
	for filename in &tags.unsupported {
		log.unsupported(&entry.name, filename);
		report.push(
			&entry.name,
			target,
			InjectionSubject::Artifact(filename.clone()),
			InjectionOutcome::SkippedUnsupported,
			None,
		);
	}

	let original = fs.read_to_string(target)?;
	let mut content = original.clone();

	for content_type in ContentType::ALL {
		let block = tags.get(content_type);
		let markers = MarkerPair::new(content_type);
		let subject = InjectionSubject::Block(content_type);

		match splice_block(&content, &markers, block) {
			BlockEdit::Missing => {
				// Templates without markers for an unused content type are fine.
				if block.is_empty() {
					continue;
				}
				log.no_match(&entry.name, target, &subject, &MatchSpec::from(markers));
				report.push(
					&entry.name,
					target,
					subject,
					InjectionOutcome::SkippedNoMatch,
					None,
				);
			}
			BlockEdit::Unpaired => {
				log.missing_pair(&entry.name, target, &MatchSpec::from(markers));
				report.push(
					&entry.name,
					target,
					subject,
					InjectionOutcome::FailedMissingPair,
					None,
				);
			}
			BlockEdit::Unchanged => {
				log.unchanged(&entry.name, target, &subject, "all generated tags already exist");
				report.push(
					&entry.name,
					target,
					subject,
					InjectionOutcome::SkippedUnchanged,
					None,
				);
			}
			BlockEdit::Replaced {
				replaced,
				content: updated,
			} => {
				content = updated;
				log.injected(&entry.name, target, &subject, &replaced);
				report.push(
					&entry.name,
					target,
					subject,
					InjectionOutcome::Written,
					Some(replaced),
				);
			}
		}
	}

	if content != original {
		log.wrote(target);
		fs.write(target, &content)?;
		report.writes += 1;
	}

	Ok(())
}
