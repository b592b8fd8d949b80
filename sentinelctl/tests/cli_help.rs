use assert_cmd::cargo::cargo_bin_cmd;

fn help_text(args: &[&str]) -> String {
    let mut cmd = cargo_bin_cmd!("sentinelctl");
    let output = cmd
        .args(args)
        .arg("--help")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&output).into_owned()
}

#[test]
fn top_level_help_lists_subcommands() {
    let text = help_text(&[]);
    for command in ["watch", "triage", "probe", "check"] {
        assert!(text.contains(command), "help missing '{command}'");
    }
    assert!(text.contains("--env-file"), "help missing --env-file");
}

#[test]
fn watch_accepts_a_camera_filter() {
    let text = help_text(&["watch"]);
    assert!(text.contains("--camera"), "watch help missing --camera");
    assert!(
        text.contains("--summary-every"),
        "watch help missing --summary-every"
    );
}

#[test]
fn probe_requires_a_url() {
    let mut cmd = cargo_bin_cmd!("sentinelctl");
    cmd.arg("probe").assert().failure();
}

#[test]
fn check_rejects_a_bad_backoff_cap() {
    let mut cmd = cargo_bin_cmd!("sentinelctl");
    cmd.arg("check")
        .arg("--env-file")
        .arg("does-not-exist.env")
        .env("SENTINEL_BACKOFF_CAP", "0s")
        .assert()
        .failure();
}

#[test]
fn check_prints_resolved_settings() {
    let mut cmd = cargo_bin_cmd!("sentinelctl");
    let output = cmd
        .arg("check")
        .arg("--env-file")
        .arg("does-not-exist.env")
        .env("SENTINEL_USE_SYNTHETIC", "true")
        .env("SENTINEL_BACKOFF_CAP", "45s")
        .env_remove("SENTINEL_EVENTS_URL")
        .env_remove("SENTINEL_CAMERAS_PATH")
        .env_remove("SENTINEL_CAMERAS_JSON")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8_lossy(&output);
    assert!(text.contains("synthetic"), "check output missing ingress");
    assert!(text.contains("45s"), "check output missing backoff cap");
}
