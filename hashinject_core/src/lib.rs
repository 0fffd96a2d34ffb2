//! `hashinject_core` keeps server-side templates pointing at the files a
//! bundler emitted. After every build it rewrites references such as
//! `app.bundle.js` to the freshly hashed `app.bundle.3f2a9c.js`, or replaces a
//! marked region of the template with generated `<link>` and `<script>` tags.
//!
//! ## Processing Pipeline
//!
//! ```text
//! BuildContext (entries + emitted artifacts) + InjectConfig
//!   → Target resolver (override rules, default file, source exclusions)
//!   → Pattern matcher / tag generator (reference regex or marker pair)
//!   → Injector (read, compare, conditional write)
//!   → InjectionReport (one outcome per artifact or content type)
//! ```
//!
//! ## Strategies
//!
//! - [`Strategy::Reference`] replaces the first match of
//!   `<entry>.bundle[.<hash>].<ext>` (or a custom fragment) with each
//!   artifact's filename. A template is only written when the reference
//!   actually changes.
//! - [`Strategy::Block`] replaces everything between two
//!   `<!-- INJECT-CSS -->` (or `<!-- INJECT-JS -->`) markers with one tag per
//!   artifact. Both content types are spliced in memory and the template is
//!   written once per entry.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hashinject_core::{BuildContext, InjectConfig, LocalFs, inject_build};
//! use std::path::Path;
//!
//! let config = InjectConfig::load_or_default(Path::new(".")).unwrap();
//! let ctx = BuildContext::from_manifest_file(Path::new("build-manifest.json")).unwrap();
//!
//! let report = inject_build(&ctx, &config, &LocalFs).unwrap();
//! println!("{} template write(s)", report.writes);
//! ```

pub use block::*;
pub use config::*;
pub use context::*;
pub use engine::*;
pub use error::*;
pub use fs::*;
pub use matcher::*;
pub use previous::*;
pub use reference::*;
pub use resolver::*;
pub use tags::*;

mod block;
pub mod config;
mod context;
mod engine;
#[allow(unused_assignments)]
mod error;
mod fs;
mod matcher;
mod previous;
mod reference;
mod resolver;
mod tags;

#[cfg(test)]
mod __fixtures;
