use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn qrsmith() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("qrsmith"))
}

#[test]
fn csv_batch_reports_per_row_outcomes() {
    let tmp = TempDir::new().unwrap();
    let manifest = tmp.path().join("batch.csv");
    std::fs::write(
        &manifest,
        "content,filename,size,theme\n\
         https://one.example,first,150,rounded\n\
         ,second,150,classic\n\
         tel:+15550100,third,150,circular\n",
    )
    .unwrap();
    let out = tmp.path().join("out");

    qrsmith()
        .args(["batch", manifest.to_str().unwrap()])
        .args(["--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("2 successful, 1 failed"));

    assert!(out.join("first.png").exists());
    assert!(out.join("third.png").exists());
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 2);
}

#[test]
fn json_batch_honors_base_config() {
    let tmp = TempDir::new().unwrap();
    let config = tmp.path().join("base.json");
    std::fs::write(&config, r#"{"size": 180, "format": "BMP"}"#).unwrap();
    let manifest = tmp.path().join("batch.json");
    std::fs::write(
        &manifest,
        r#"[
            {"content": "https://a.example", "filename": "a"},
            {"content": "https://b.example", "filename": "b", "format": "PNG"}
        ]"#,
    )
    .unwrap();
    let out = tmp.path().join("out");

    qrsmith()
        .args(["batch", manifest.to_str().unwrap()])
        .args(["--output", out.to_str().unwrap()])
        .args(["--config", config.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("2 successful, 0 failed"));

    // Base format applies unless the row overrides it.
    assert!(out.join("a.bmp").exists());
    assert!(out.join("b.png").exists());
    assert_eq!(image::open(out.join("a.bmp")).unwrap().width(), 180);
}

#[test]
fn unknown_manifest_kind_fails_with_message() {
    let tmp = TempDir::new().unwrap();
    let manifest = tmp.path().join("batch.txt");
    std::fs::write(&manifest, "whatever").unwrap();
    qrsmith()
        .args(["batch", manifest.to_str().unwrap()])
        .args(["--output", tmp.path().join("out").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(contains(".csv or .json"));
}
