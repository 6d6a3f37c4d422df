use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn intake_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("intake");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let scans = root.join("scans");
    fs::create_dir_all(scans.join("personal")).unwrap();
    fs::write(scans.join("1.png"), b"scan one").unwrap();
    fs::write(scans.join("6.jpg"), b"scan six").unwrap();
    fs::write(scans.join("9.JPEG"), b"scan nine").unwrap();
    fs::write(scans.join("20.png"), b"scan twenty").unwrap();
    fs::write(scans.join("id6.jpg"), b"id card").unwrap();
    fs::write(scans.join("lic1.jpg"), b"licence").unwrap();
    fs::write(scans.join("notes.txt"), b"not an image").unwrap();
    fs::write(
        scans.join("personal").join("musaddiq visa.jpg"),
        b"visa page",
    )
    .unwrap();

    fs::create_dir_all(root.join("query")).unwrap();
    fs::write(root.join("query").join("us3.jpg"), b"reference").unwrap();

    (tmp, root)
}

fn run_intake(root: &Path, args: &[&str]) -> Output {
    Command::new(intake_binary())
        .arg("--config")
        .arg(root.join("config").join("intake.toml"))
        .args(args)
        .current_dir(root)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run intake")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_groups_lists_steps() {
    let (_tmp, root) = setup_test_env();
    let output = run_intake(&root, &["groups", "scans"]);
    assert!(output.status.success(), "groups failed: {}", stderr_of(&output));

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Step 1: Numbered documents (1-14) (3 documents)"));
    assert!(stdout.contains("Step 2: Musaddiq documents (1 documents)"));
    assert!(stdout.contains("Not grouped (3):"));
    assert!(stdout.contains("20.png"));
    assert!(!stdout.contains("notes.txt"));
    assert!(stderr_of(&output).contains("Uploaded 7 document(s)"));
}

#[test]
fn test_classify_with_scripted_labels() {
    let (_tmp, root) = setup_test_env();
    let output = run_intake(
        &root,
        &[
            "classify",
            "scans",
            "--label",
            "ID",
            "--label",
            "Personal",
            "--classification",
            "ID",
            "--json",
        ],
    );
    assert!(output.status.success(), "classify failed: {}", stderr_of(&output));

    let docs: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    let names: Vec<&str> = docs
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["1.png", "6.jpg", "9.JPEG"]);
    assert!(docs
        .as_array()
        .unwrap()
        .iter()
        .all(|d| d["classification"] == "ID"));
    assert!(stderr_of(&output).contains("Classification complete!"));
}

#[test]
fn test_classify_reads_labels_from_stdin() {
    let (_tmp, root) = setup_test_env();
    let mut child = Command::new(intake_binary())
        .arg("--config")
        .arg(root.join("config").join("intake.toml"))
        .args(["classify", "scans", "--search", "visa"])
        .current_dir(&root)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // The blank line is rejected and the step asked again.
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"ID\n\nPersonal\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "classify failed: {}", stderr_of(&output));

    let stderr = stderr_of(&output);
    assert!(stderr.contains("classification required"));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("musaddiq visa.jpg"));
    assert!(stdout.contains("Personal"));
    assert!(stdout.contains("Classifications: ID, Personal"));
    assert!(stdout.contains("Showing 1 of 7 documents"));
}

#[test]
fn test_classify_without_enough_labels_fails() {
    let (_tmp, root) = setup_test_env();
    let output = run_intake(&root, &["classify", "scans", "--label", "ID"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("no label for step 2"));
}

#[test]
fn test_blank_scripted_label_fails() {
    let (_tmp, root) = setup_test_env();
    let output = run_intake(&root, &["classify", "scans", "--label", "  "]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("classification required"));
}

#[test]
fn test_classify_empty_collection_still_browses() {
    let (_tmp, root) = setup_test_env();
    fs::create_dir_all(root.join("empty")).unwrap();
    let output = run_intake(&root, &["classify", "empty"]);
    assert!(output.status.success(), "classify failed: {}", stderr_of(&output));
    assert!(stderr_of(&output).contains("no documents"));
    assert!(stdout_of(&output).contains("Showing 0 of 0 documents"));
}

#[test]
fn test_export_when_no_rule_matches() {
    let (_tmp, root) = setup_test_env();
    let other = root.join("other");
    fs::create_dir_all(&other).unwrap();
    fs::write(other.join("holiday.jpg"), b"beach").unwrap();
    fs::write(other.join("receipt.png"), b"coffee").unwrap();

    let output = run_intake(&root, &["export", "other", "--out", "out"]);
    assert!(output.status.success(), "export failed: {}", stderr_of(&output));

    let stderr = stderr_of(&output);
    assert!(stderr.contains("Uploaded 2 document(s) (11 bytes)"));
    assert!(stderr.contains("no classification groups matched"));
    assert!(stdout_of(&output).contains("Exported 2 documents"));
    assert_eq!(fs::read(root.join("out").join("receipt.png")).unwrap(), b"coffee");
}

#[test]
fn test_unused_labels_are_reported() {
    let (_tmp, root) = setup_test_env();
    let output = run_intake(
        &root,
        &[
            "classify", "scans", "--label", "ID", "--label", "Personal", "--label", "Extra",
        ],
    );
    assert!(output.status.success(), "classify failed: {}", stderr_of(&output));
    assert!(stderr_of(&output).contains("ignoring 1 unused --label value(s)"));
    assert!(!stdout_of(&output).contains("Extra"));
}

#[test]
fn test_search_image_us3() {
    let (_tmp, root) = setup_test_env();
    let output = run_intake(
        &root,
        &["search-image", "query/us3.jpg", "scans", "--no-delay", "--json"],
    );
    assert!(output.status.success(), "search failed: {}", stderr_of(&output));

    let found: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(found["rule"], "us3");
    let names: Vec<&str> = found["documents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["id6.jpg", "lic1.jpg", "musaddiq visa.jpg"]);
}

#[test]
fn test_search_prompt() {
    let (_tmp, root) = setup_test_env();
    let output = run_intake(
        &root,
        &["search-prompt", "passport scans", "scans", "--no-delay"],
    );
    assert!(output.status.success(), "search failed: {}", stderr_of(&output));

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Results (2)"));
    assert!(stdout.contains("6.jpg"));
    assert!(stdout.contains("9.JPEG"));
    assert!(!stdout.contains("1.png"));
}

#[test]
fn test_search_prompt_blank_fails() {
    let (_tmp, root) = setup_test_env();
    let output = run_intake(&root, &["search-prompt", " ", "scans", "--no-delay"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("must not be empty"));
}

#[test]
fn test_export_writes_manifest() {
    let (_tmp, root) = setup_test_env();
    let output = run_intake(
        &root,
        &[
            "export", "scans", "--out", "out", "--label", "ID", "--label", "Personal",
        ],
    );
    assert!(output.status.success(), "export failed: {}", stderr_of(&output));
    assert!(stdout_of(&output).contains("Exported 7 documents"));

    let out = root.join("out");
    assert_eq!(fs::read(out.join("lic1.jpg")).unwrap(), b"licence");
    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("manifest.json")).unwrap()).unwrap();
    let visa = manifest["documents"]
        .as_array()
        .unwrap()
        .iter()
        .find(|d| d["name"] == "musaddiq visa.jpg")
        .unwrap();
    assert_eq!(visa["classification"], "Personal");
}

#[test]
fn test_custom_config_rules() {
    let (_tmp, root) = setup_test_env();
    fs::create_dir_all(root.join("config")).unwrap();
    fs::write(
        root.join("config").join("intake.toml"),
        r#"
[[grouping.rules]]
name = "licences"
label = "Driving licences"
match = { kind = "regex", pattern = "^lic\\d+\\.jpg$" }
"#,
    )
    .unwrap();

    let output = run_intake(&root, &["groups", "scans", "--json"]);
    assert!(output.status.success(), "groups failed: {}", stderr_of(&output));

    let groups: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["label"], "Driving licences");
    assert_eq!(groups[0]["member_ids"].as_array().unwrap().len(), 1);
}

#[test]
fn test_invalid_config_fails() {
    let (_tmp, root) = setup_test_env();
    fs::create_dir_all(root.join("config")).unwrap();
    fs::write(
        root.join("config").join("intake.toml"),
        "[intake]\ninclude_globs = []\n",
    )
    .unwrap();

    let output = run_intake(&root, &["groups", "scans"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("include_globs"));
}
