use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;

#[allow(dead_code)]
pub const REFERENCE_TEMPLATE: &str = "<html>\n<head>\n<link href=\"/dist/app.bundle.css\" \
                                      rel=\"stylesheet\" />\n</head>\n<body>\n<script \
                                      src=\"/dist/app.bundle.js\"></script>\n</body>\n</html>\n";

pub fn hashinject_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("hashinject"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

/// Write `content` to `root/relative`, creating parent directories.
#[allow(dead_code)]
pub fn write_file(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent)?;
	}
	std::fs::write(path, content)
}

/// A project with one `app` entry at `src/app/index.js`, its template at
/// `src/app/index.aspx` and a `dist/` output directory holding `artifacts`.
#[allow(dead_code)]
pub fn scaffold_project(root: &Path, template: &str, artifacts: &[&str]) -> std::io::Result<()> {
	write_file(root, "src/app/index.aspx", template)?;
	std::fs::create_dir_all(root.join("dist"))?;
	for artifact in artifacts {
		std::fs::write(root.join("dist").join(artifact), "")?;
	}

	let artifacts = artifacts
		.iter()
		.map(|artifact| format!("\"{artifact}\""))
		.collect::<Vec<_>>()
		.join(", ");
	write_file(
		root,
		"build-manifest.json",
		&format!(
			"{{\n  \"output_dir\": \"dist\",\n  \"public_path\": \"/dist/\",\n  \"entries\": [\n    \
			 {{ \"name\": \"app\", \"source\": [\"webpack/hot/dev-server\", \"src/app/index.js\"], \
			 \"artifacts\": [{artifacts}] }}\n  ]\n}}\n"
		),
	)
}
