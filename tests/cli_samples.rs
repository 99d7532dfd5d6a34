use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn qrsmith() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("qrsmith"))
}

#[test]
fn samples_default_writes_all_three() {
    let tmp = TempDir::new().unwrap();
    qrsmith()
        .current_dir(tmp.path())
        .arg("samples")
        .assert()
        .success()
        .stdout(contains("enhanced_batch.csv"))
        .stdout(contains("enhanced_batch.json"))
        .stdout(contains("config_template.json"));

    assert!(tmp.path().join("enhanced_batch.csv").exists());
    assert!(tmp.path().join("enhanced_batch.json").exists());
    assert!(tmp.path().join("config_template.json").exists());
}

#[test]
fn samples_csv_flag_writes_only_csv() {
    let tmp = TempDir::new().unwrap();
    qrsmith()
        .current_dir(tmp.path())
        .args(["samples", "--csv"])
        .assert()
        .success();

    assert!(tmp.path().join("enhanced_batch.csv").exists());
    assert!(!tmp.path().join("enhanced_batch.json").exists());
    assert!(!tmp.path().join("config_template.json").exists());
}

#[test]
fn sample_json_feeds_straight_into_batch() {
    let tmp = TempDir::new().unwrap();
    qrsmith()
        .current_dir(tmp.path())
        .args(["samples", "--json"])
        .assert()
        .success();

    let out = tmp.path().join("out");
    qrsmith()
        .current_dir(tmp.path())
        .args(["batch", "enhanced_batch.json"])
        .args(["--output", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("3 successful, 0 failed"));
    assert!(out.join("github_qr.png").exists());
    assert!(out.join("phone_support.png").exists());
    assert!(out.join("sms_thanks.png").exists());
}
