use std::fs;

use predicates::prelude::*;

const MANIFEST: &str = r#"{
  "volumes": [
    { "number": 1, "title": "Harbor", "pages": 2 },
    { "number": 2, "title": "Lighthouse", "subtitle": "Part two", "pages": 3 }
  ],
  "conceptArt": [
    { "src": "assets/art/sketch-0.jpg", "title": "Sketch" }
  ]
}
"#;

fn cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("pageturn");
    cmd.env_remove("PAGETURN_ASSET_ROOT")
        .env_remove("PAGETURN_IMAGE_EXT")
        .env_remove("PAGETURN_DRAG_THRESHOLD_PX")
        .env_remove("PAGETURN_LOG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn route_normalizes_fragments() {
    cmd()
        .args(["route", "#//read//4"])
        .assert()
        .success()
        .stdout("#/read/4/0\n");

    cmd()
        .args(["route", "#/read/2/3/extra"])
        .assert()
        .success()
        .stdout("#/\n");
}

#[test]
fn route_accepts_full_location() {
    cmd()
        .args(["route", "https://example.com/book/#/gallery/4"])
        .assert()
        .success()
        .stdout("#/art/4\n");
}

#[test]
fn assets_lists_cover_then_pages() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("manifest.json");
    fs::write(&manifest, MANIFEST).unwrap();

    cmd()
        .args(["assets", "--manifest"])
        .arg(&manifest)
        .args(["--volume", "1"])
        .assert()
        .success()
        .stdout(
            "assets/pages/chapter-01/cover.jpg\n\
             assets/pages/chapter-01/001.jpg\n\
             assets/pages/chapter-01/002.jpg\n",
        );
}

#[test]
fn assets_honours_layout_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("manifest.json");
    fs::write(&manifest, MANIFEST).unwrap();

    cmd()
        .env("PAGETURN_ASSET_ROOT", "https://cdn.example.com/media")
        .args(["assets", "--manifest"])
        .arg(&manifest)
        .args(["--image-ext", "webp"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://cdn.example.com/media/pages/chapter-02/003.webp\n",
        ))
        .stdout(predicate::str::contains("chapter-01/cover.webp\n"));
}

#[test]
fn assets_rejects_unknown_volume() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("manifest.json");
    fs::write(&manifest, MANIFEST).unwrap();

    cmd()
        .args(["assets", "--manifest"])
        .arg(&manifest)
        .args(["--volume", "9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("volume not found in manifest: 9"));
}

#[test]
fn invalid_drag_threshold_names_the_variable() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("manifest.json");
    fs::write(&manifest, MANIFEST).unwrap();

    cmd()
        .env("PAGETURN_DRAG_THRESHOLD_PX", "wide")
        .args(["assets", "--manifest"])
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("PAGETURN_DRAG_THRESHOLD_PX"));
}

#[test]
fn replay_persists_progress_for_the_progress_command() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("manifest.json");
    let script = dir.path().join("session.txt");
    let storage = dir.path().join("storage.json");
    fs::write(&manifest, MANIFEST).unwrap();
    fs::write(
        &script,
        "# open the cover, then read two pages\nkey Space\nclick 800 900\nloaded\n",
    )
    .unwrap();

    cmd()
        .args(["progress", "--storage"])
        .arg(&storage)
        .assert()
        .success()
        .stdout("no saved progress\n");

    let output = cmd()
        .args(["replay", "--start", "#/read/2", "--manifest"])
        .arg(&manifest)
        .arg("--script")
        .arg(&script)
        .arg("--storage")
        .arg(&storage)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let reports: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(reports.len(), 4);
    assert_eq!(reports[0]["event"], "start");
    assert_eq!(reports[0]["state"]["reader"]["mode"], "cover");
    assert_eq!(reports[2]["state"]["fragment"], "#/read/2/2");
    assert_eq!(reports[3]["effects"][0]["type"], "image_ready");
    assert_eq!(reports[3]["state"]["image_loaded"], true);

    cmd()
        .args(["progress", "--storage"])
        .arg(&storage)
        .assert()
        .success()
        .stdout("volume 2 page 2\n");
}

#[test]
fn replay_without_manifest_shows_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("session.txt");
    fs::write(&script, "next\n").unwrap();

    cmd()
        .args(["replay", "--start", "#/art/1", "--manifest"])
        .arg(dir.path().join("missing.json"))
        .arg("--script")
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"placeholder""#))
        .stdout(predicate::str::contains(r#""content_available":false"#))
        .stderr(predicate::str::contains("manifest unavailable"));
}

#[test]
fn replay_reports_bad_script_line() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("manifest.json");
    let script = dir.path().join("session.txt");
    fs::write(&manifest, MANIFEST).unwrap();
    fs::write(&script, "next\nclick 10\n").unwrap();

    cmd()
        .args(["replay", "--manifest"])
        .arg(&manifest)
        .arg("--script")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("script line 2"));
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    cmd()
        .env("RUST_LOG", "debug")
        .args(["route", "#/"])
        .assert()
        .success()
        .stderr(predicate::str::contains("parsed cli"));
}
