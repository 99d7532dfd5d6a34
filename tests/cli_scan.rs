use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

fn qrsmith() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("qrsmith"))
}

fn generated(tmp: &TempDir, content: &str) -> std::path::PathBuf {
    let out = tmp.path().join("code.png");
    qrsmith()
        .args(["generate", content, "--size", "330"])
        .args(["--out", out.to_str().unwrap()])
        .assert()
        .success();
    out
}

#[test]
fn scan_round_trips_generated_code() {
    let tmp = TempDir::new().unwrap();
    let file = generated(&tmp, "https://round.trip/example");
    qrsmith()
        .args(["scan", "--file", file.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("QR 1: https://round.trip/example"));
}

#[test]
fn scan_analyze_classifies_wifi() {
    let tmp = TempDir::new().unwrap();
    let file = generated(&tmp, "WIFI:T:WPA;S:CoffeeShop;P:pw123;H:false;");
    qrsmith()
        .args(["scan", "--file", file.to_str().unwrap(), "--analyze"])
        .assert()
        .success()
        .stdout(contains("type: wifi"))
        .stdout(contains("ssid"));
}

#[test]
fn scan_writes_json_report() {
    let tmp = TempDir::new().unwrap();
    let file = generated(&tmp, "tel:+15550100");
    let report = tmp.path().join("report.json");
    qrsmith()
        .args(["scan", "--file", file.to_str().unwrap(), "--analyze"])
        .args(["--output", report.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("Report saved"));

    let raw = std::fs::read_to_string(&report).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed[0]["content"], "tel:+15550100");
    assert_eq!(parsed[0]["analysis"]["type"], "phone");
}

#[test]
fn scan_blank_image_reports_nothing_found() {
    let tmp = TempDir::new().unwrap();
    let blank = tmp.path().join("blank.png");
    image::GrayImage::from_pixel(200, 200, image::Luma([255]))
        .save(&blank)
        .unwrap();
    qrsmith()
        .args(["scan", "--file", blank.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("No QR codes found"));
}

#[test]
fn scan_missing_file_fails() {
    qrsmith()
        .args(["scan", "--file", "/nonexistent/image.png"])
        .assert()
        .failure()
        .stderr(contains("scan of"));
}
