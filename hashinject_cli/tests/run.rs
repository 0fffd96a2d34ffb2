mod common;

use common::REFERENCE_TEMPLATE;
use common::scaffold_project;
use common::write_file;
use hashinject_core::AnyEmptyResult;
use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;

const ARTIFACTS: [&str; 2] = ["app.bundle.abc123.js", "app.bundle.abc123.css"];

#[test]
fn run_injects_hashed_references() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	scaffold_project(tmp.path(), REFERENCE_TEMPLATE, &ARTIFACTS)?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Injected 2 change(s) into 1 template(s).",
		));

	let content = std::fs::read_to_string(tmp.path().join("src/app/index.aspx"))?;
	assert!(content.contains("<script src=\"/dist/app.bundle.abc123.js\"></script>"));
	assert!(content.contains("<link href=\"/dist/app.bundle.abc123.css\""));
	assert!(!content.contains("app.bundle.js"));

	Ok(())
}

#[test]
fn run_twice_is_a_no_op() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	scaffold_project(tmp.path(), REFERENCE_TEMPLATE, &ARTIFACTS)?;

	let mut first = common::hashinject_cmd();
	first.arg("run").arg("--path").arg(tmp.path()).assert().success();
	let after_first = std::fs::read_to_string(tmp.path().join("src/app/index.aspx"))?;

	let mut second = common::hashinject_cmd();
	second
		.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"All templates already reference the latest build.",
		));

	let after_second = std::fs::read_to_string(tmp.path().join("src/app/index.aspx"))?;
	assert_eq!(after_first, after_second);

	Ok(())
}

#[test]
fn run_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	scaffold_project(tmp.path(), REFERENCE_TEMPLATE, &ARTIFACTS)?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run")
		.arg("--dry-run")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Dry run: would inject 2 change(s)"))
		.stdout(predicates::str::contains("src/app/index.aspx"))
		.stderr(predicates::str::contains(
			"+<script src=\"/dist/app.bundle.abc123.js\"></script>",
		));

	let content = std::fs::read_to_string(tmp.path().join("src/app/index.aspx"))?;
	assert_eq!(content, REFERENCE_TEMPLATE);

	Ok(())
}

#[test]
fn run_reports_missing_references() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let template = "<html><body><script src=\"/dist/vendor.js\"></script></body></html>\n";
	scaffold_project(tmp.path(), template, &["app.bundle.abc123.js"])?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("All templates already reference"))
		.stderr(predicates::str::contains("was not found"))
		.stderr(predicates::str::contains("no-match for entry `app`"));

	let content = std::fs::read_to_string(tmp.path().join("src/app/index.aspx"))?;
	assert_eq!(content, template);

	Ok(())
}

#[test]
fn run_block_strategy_from_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let template = "<head>\n  <!-- INJECT-CSS -->\n  <!-- INJECT-CSS -->\n</head>\n<body>\n  <!-- \
	                INJECT-JS --><!-- INJECT-JS -->\n</body>\n";
	scaffold_project(tmp.path(), template, &ARTIFACTS)?;
	write_file(
		tmp.path(),
		"hashinject.toml",
		"strategy = \"block\"\npublic_path = \"/assets/\"\n",
	)?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run").arg("--path").arg(tmp.path()).assert().success();

	let content = std::fs::read_to_string(tmp.path().join("src/app/index.aspx"))?;
	assert_eq!(
		content,
		"<head>\n  <!-- INJECT-CSS -->\n  <link rel=\"Stylesheet\" \
		 href=\"/assets/app.bundle.abc123.css\" />\n  <!-- INJECT-CSS -->\n</head>\n<body>\n  \
		 <!-- INJECT-JS -->\n  <script type=\"text/javascript\" \
		 src=\"/assets/app.bundle.abc123.js\"></script>\n  <!-- INJECT-JS -->\n</body>\n"
	);

	Ok(())
}

#[test]
fn run_fails_on_unpaired_marker() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	let template = "<body>\n  <!-- INJECT-JS -->\n</body>\n";
	scaffold_project(tmp.path(), template, &["app.bundle.abc123.js"])?;
	write_file(tmp.path(), "hashinject.toml", "strategy = \"block\"\n")?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(predicates::str::contains("a pair is required"))
		.stderr(predicates::str::contains("missing-pair"));

	let content = std::fs::read_to_string(tmp.path().join("src/app/index.aspx"))?;
	assert_eq!(content, template);

	Ok(())
}

#[test]
fn run_json_output() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	scaffold_project(tmp.path(), REFERENCE_TEMPLATE, &["app.bundle.abc123.js"])?;

	let mut cmd = common::hashinject_cmd();
	let output = cmd
		.arg("run")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;
	assert!(output.status.success());

	let json: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(json["ok"], true);
	assert_eq!(json["dry_run"], false);
	assert_eq!(json["writes"], 1);
	assert_eq!(json["templates"][0], "src/app/index.aspx");
	assert_eq!(json["results"][0]["entry"], "app");
	assert_eq!(json["results"][0]["outcome"], "written");
	assert_eq!(json["results"][0]["replaced"], "app.bundle.js");

	Ok(())
}

#[test]
fn run_with_explicit_manifest() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"src/app/index.aspx",
		"<script src=\"app.bundle.js\"></script>\n",
	)?;
	std::fs::create_dir_all(tmp.path().join("public"))?;
	write_file(
		tmp.path(),
		"build/stats.json",
		r#"{ "outputDir": "../public", "entries": [{ "name": "app", "source": "../src/app/index.js", "files": ["app.bundle.77.js"] }] }"#,
	)?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run")
		.arg("--manifest")
		.arg("build/stats.json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let content = std::fs::read_to_string(tmp.path().join("src/app/index.aspx"))?;
	assert_eq!(content, "<script src=\"app.bundle.77.js\"></script>\n");

	Ok(())
}

#[test]
fn run_without_manifest_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse build manifest"));

	Ok(())
}

#[test]
fn run_with_invalid_config_fails() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	scaffold_project(tmp.path(), REFERENCE_TEMPLATE, &ARTIFACTS)?;
	write_file(tmp.path(), "hashinject.toml", "strategy = \"inline\"\n")?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	let content = std::fs::read_to_string(tmp.path().join("src/app/index.aspx"))?;
	assert_eq!(content, REFERENCE_TEMPLATE);

	Ok(())
}

#[test]
fn run_respects_logging_toggles() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	scaffold_project(tmp.path(), REFERENCE_TEMPLATE, &ARTIFACTS)?;
	write_file(
		tmp.path(),
		"hashinject.toml",
		"[logging]\ninjection = false\n",
	)?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("injected").not());

	let content = std::fs::read_to_string(tmp.path().join("src/app/index.aspx"))?;
	assert!(content.contains("app.bundle.abc123.js"));

	Ok(())
}

#[test]
fn run_merges_entries_that_share_a_template() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_file(
		tmp.path(),
		"src/app/index.aspx",
		"<script src=\"/dist/app.bundle.js\"></script>\n<script \
		 src=\"/dist/admin.bundle.js\"></script>\n",
	)?;
	write_file(
		tmp.path(),
		"dist/build-manifest.json",
		r#"{ "output_dir": ".", "entries": [
			{ "name": "app", "source": "../src/app/index.js", "artifacts": ["app.bundle.111.js"] },
			{ "name": "admin", "source": "../src/admin/main.js", "artifacts": ["admin.bundle.222.js"] }
		] }"#,
	)?;
	write_file(
		tmp.path(),
		"hashinject.toml",
		"manifest = \"dist/build-manifest.json\"\n\n[targets.admin]\nrelative_path = \
		 \"src/app/index.aspx\"\n",
	)?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Injected 2 change(s) into 1 template(s).",
		));

	let content = std::fs::read_to_string(tmp.path().join("src/app/index.aspx"))?;
	assert_eq!(
		content,
		"<script src=\"/dist/app.bundle.111.js\"></script>\n<script \
		 src=\"/dist/admin.bundle.222.js\"></script>\n"
	);

	Ok(())
}

#[test]
fn run_rejects_watch_with_dry_run() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run")
		.arg("--watch")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.failure()
		.stderr(predicates::str::contains("cannot be used with"));

	Ok(())
}

#[test]
fn run_with_missing_config_names_the_file() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = common::hashinject_cmd();
	cmd.arg("run")
		.arg("--config")
		.arg("missing.toml")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to read config file"))
		.stderr(predicates::str::contains("missing.toml"));

	Ok(())
}
