use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn fo_page_setup_comes_from_config() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("guide.apt");
    fs::write(&input, "Intro\n\n Text.\n").unwrap();

    let config_path = dir.path().join("doxa.toml");
    fs::write(
        &config_path,
        r#"[convert.fo]
page_size = "letter"
font_family = "Times"
"#,
    )
    .unwrap();

    cargo_bin_cmd!("doxa")
        .arg(&input)
        .arg("--to")
        .arg("fo")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("page-width=\"8.5in\" page-height=\"11in\""))
        .stdout(predicate::str::contains("font-family=\"Times\""));
}

#[test]
fn extras_win_over_config() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("guide.apt");
    fs::write(&input, "Intro\n\n Text.\n").unwrap();

    let config_path = dir.path().join("doxa.toml");
    fs::write(&config_path, "[convert.fo]\nfont_family = \"Times\"\n").unwrap();

    cargo_bin_cmd!("doxa")
        .arg(&input)
        .arg("--to")
        .arg("fo")
        .arg("--config")
        .arg(&config_path)
        .arg("--extra-font-family")
        .arg("Courier")
        .assert()
        .success()
        .stdout(predicate::str::contains("font-family=\"Courier\""))
        .stdout(predicate::str::contains("font-family=\"Times\"").not());
}

#[test]
fn html_anchors_from_config() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("guide.apt");
    fs::write(&input, "Intro\n\n Text.\n").unwrap();

    let config_path = dir.path().join("doxa.toml");
    fs::write(&config_path, "[convert.html]\ngenerate_anchors = true\n").unwrap();

    cargo_bin_cmd!("doxa")
        .arg(&input)
        .arg("--to")
        .arg("html")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("<h1><a id=\"Intro\"></a>Intro</h1>"));
}

#[test]
fn macros_can_be_disabled_in_config() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("guide.apt");
    fs::write(&input, "Intro\n\n%{nothing}\n").unwrap();

    let config_path = dir.path().join("doxa.toml");
    fs::write(&config_path, "[parse]\nmacros = false\n").unwrap();

    cargo_bin_cmd!("doxa")
        .arg(&input)
        .arg("--to")
        .arg("tag")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success();
}

#[test]
fn missing_config_file_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("guide.apt");
    fs::write(&input, "Intro\n").unwrap();

    cargo_bin_cmd!("doxa")
        .arg(&input)
        .arg("--to")
        .arg("html")
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
