use std::path::Path;

use crate::ContentType;
use crate::EntryPoint;
use crate::InjectResult;
use crate::InjectionOutcome;
use crate::InjectionReport;
use crate::InjectionSubject;
use crate::MatchSpec;
use crate::PreviousBuilds;
use crate::ReferencePattern;
use crate::TemplateFs;
use crate::engine::Diagnostics;

/// The change a single artifact makes to a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceEdit {
	/// The pattern does not occur.
	NoMatch,
	/// The first match already is the artifact's filename.
	Unchanged {
		/// The filename was also present in the previous build's output.
		previously_built: bool,
	},
	/// The first match was replaced.
	Replaced { matched: String, content: String },
}

/// Replace the first reference matched by `pattern` with `filename`.
pub fn replace_reference(
	content: &str,
	pattern: &ReferencePattern,
	filename: &str,
	previous: &PreviousBuilds,
) -> ReferenceEdit {
	let Some(range) = pattern.find(content) else {
		return ReferenceEdit::NoMatch;
	};

	let matched = &content[range.clone()];
	if matched == filename {
		return ReferenceEdit::Unchanged {
			previously_built: previous.contains(filename),
		};
	}

	let mut updated = String::with_capacity(content.len() - range.len() + filename.len());
	updated.push_str(&content[..range.start]);
	updated.push_str(filename);
	updated.push_str(&content[range.end..]);

	ReferenceEdit::Replaced {
		matched: matched.to_string(),
		content: updated,
	}
}

/// Inject every artifact of `entry` into `target`, one at a time and in emit
/// order. The template is re-read for each artifact so later artifacts see
/// earlier writes.
pub(crate) fn inject_references(
	entry: &EntryPoint,
	target: &Path,
	fragment: &str,
	previous: &PreviousBuilds,
	fs: &impl TemplateFs,
	log: &Diagnostics,
	report: &mut InjectionReport,
) -> InjectResult<()> {
	let css = ReferencePattern::new(&entry.name, ContentType::Css, fragment)?;
	let js = ReferencePattern::new(&entry.name, ContentType::Js, fragment)?;

	for artifact in &entry.artifacts {
		let subject = InjectionSubject::Artifact(artifact.filename.clone());
		let pattern = match artifact.kind.content_type() {
			Some(ContentType::Css) => &css,
			Some(ContentType::Js) => &js,
			None => {
				log.unsupported(&entry.name, &artifact.filename);
				report.push(
					&entry.name,
					target,
					subject,
					InjectionOutcome::SkippedUnsupported,
					None,
				);
				continue;
			}
		};

		let content = fs.read_to_string(target)?;
		match replace_reference(&content, pattern, &artifact.filename, previous) {
			ReferenceEdit::NoMatch => {
				let matcher = MatchSpec::from(pattern.clone());
				log.no_match(&entry.name, target, &subject, &matcher);
				report.push(
					&entry.name,
					target,
					subject,
					InjectionOutcome::SkippedNoMatch,
					None,
				);
			}
			ReferenceEdit::Unchanged { previously_built } => {
				let reason = if previously_built {
					"already injected by a previous build"
				} else {
					"already up to date"
				};
				log.unchanged(&entry.name, target, &subject, reason);
				report.push(
					&entry.name,
					target,
					subject,
					InjectionOutcome::SkippedUnchanged,
					None,
				);
			}
			ReferenceEdit::Replaced { matched, content } => {
				log.wrote(target);
				fs.write(target, &content)?;
				report.writes += 1;
				log.injected(&entry.name, target, &subject, &matched);
				report.push(
					&entry.name,
					target,
					subject,
					InjectionOutcome::Written,
					Some(matched),
				);
			}
		}
	}

	Ok(())
}
