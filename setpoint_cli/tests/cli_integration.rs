use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Reference plants with no waiting between cycles
fn write_fast_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[pressure]
initial = 1.0

[pressure.schedule]
interval_ms = 1
initial_delay_ms = 0

[temperature.schedule]
interval_ms = 1
initial_delay_ms = 0

[logging]
level = "warn"
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn write_history(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("history.csv");
    let mut f = fs::File::create(&path).unwrap();
    writeln!(f, "zone_temp,outdoor_temp,duration_min").unwrap();
    for (z, o, m) in [
        (50, 10, 120),
        (48, 12, 115),
        (52, 8, 125),
        (50, 11, 118),
        (51, 9, 122),
        (49, 13, 110),
        (47, 14, 108),
    ] {
        writeln!(f, "{z},{o},{m}").unwrap();
    }
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["check-config"], 0, "config ok", "stdout")]
#[case(&["pressure", "--cycles", "3", "--seed", "7"], 0, "pressure cycle 3", "stdout")]
#[case(&["temperature", "--cycles", "2", "--seed", "7"], 0, "stopped after 2 cycles", "stdout")]
#[case(&["optimal-start"], 2, "required", "stderr")]
#[case(&["pressure", "--loop"], 2, "--replay", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);

    let mut cmd = Command::cargo_bin("setpoint_cli").unwrap();
    // Always include a config to avoid relying on the default path
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn replay_drives_the_pressure_loop() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let fixture = dir.path().join("frames.csv");
    fs::write(
        &fixture,
        "condition,r1,r2,r3,r4\n,0.95,0.90,0.86,0.40\n,0.50,0.40,0.30,0.20\n",
    )
    .unwrap();

    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["pressure", "--replay"])
        .arg(&fixture)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "pressure cycle 1: requests=1 max_remaining=0.86 setpoint 1.000 -> 1.060 (increase)",
        ))
        .stdout(predicate::str::contains("setpoint 1.060 -> 1.040 (decrease)"))
        .stdout(predicate::str::contains("stopped after 2 cycles"));
}

#[rstest]
fn shipped_config_passes_check_config() {
    let shipped = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../etc/setpoint.toml");
    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&shipped)
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("config ok"));
}

#[rstest]
fn invalid_config_exits_3_and_names_the_key() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[pressure]\nmin = 2.0\nmax = 1.0\ninitial = 1.5\n").unwrap();

    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("check-config")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("pressure.min must be <= pressure.max"));
}

#[rstest]
fn unknown_key_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("typo.toml");
    fs::write(&path, "[pressure]\nignore = 3\n").unwrap();

    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&path)
        .arg("check-config")
        .assert()
        .code(3);
}

#[rstest]
fn missing_explicit_config_exits_3() {
    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .args(["--config", "/nonexistent/setpoint.toml", "check-config"])
        .assert()
        .code(3);
}

#[rstest]
fn missing_replay_fixture_exits_4() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["pressure", "--replay", "/nonexistent/frames.csv"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Could not read input data"));
}

#[rstest]
fn optimal_start_with_occupancy_prints_clock_time() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let history = write_history(&dir);

    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("optimal-start")
        .arg("--history")
        .arg(&history)
        .args(["--zone-temp", "48", "--outdoor-temp", "12", "--occupancy", "06:30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("learned from 7 of 7 observations"))
        .stdout(predicate::str::contains("min before occupancy"))
        .stdout(predicate::str::contains("for occupancy at 06:30"));
}

#[rstest]
fn interpolation_blends_nearest_days() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let history = dir.path().join("h.csv");
    fs::write(
        &history,
        "zone_temp,outdoor_temp,duration_min\n60,5,111\n61,9,100\n62,15,90\n66,10,111\n",
    )
    .unwrap();

    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("optimal-start")
        .arg("--history")
        .arg(&history)
        .args(["--zone-temp", "50", "--outdoor-temp", "11", "--method", "interpolate"])
        .args(["--occupancy", "06:30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("optimal start: 96.0 min"))
        .stdout(predicate::str::contains("start at 04:54"));
}

#[rstest]
fn degenerate_conditions_exit_5() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let history = write_history(&dir);

    // Nothing to learn from, so the zero outdoor coefficient reaches the estimate.
    let zero_b = dir.path().join("zero_b.toml");
    fs::write(
        &zero_b,
        "[optimal_start]\ninitial_b = 0.0\nforgetting_factor = 0.1\n",
    )
    .unwrap();
    let empty = dir.path().join("empty.csv");
    fs::write(&empty, "zone_temp,outdoor_temp,duration_min\n").unwrap();

    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&zero_b)
        .arg("optimal-start")
        .arg("--history")
        .arg(&empty)
        .args(["--zone-temp", "50", "--outdoor-temp", "10"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("outdoor coefficient is zero"));

    // Same conditions, learned coefficients
    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("optimal-start")
        .arg("--history")
        .arg(&history)
        .args(["--zone-temp", "50", "--outdoor-temp", "10"])
        .assert()
        .success();
}

#[rstest]
fn very_large_start_limit_still_prints_a_start_time() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("wide.toml");
    fs::write(
        &cfg,
        "[optimal_start]\nearly_start_limit_min = 1e20\ninitial_d = 1e20\n",
    )
    .unwrap();
    let empty = dir.path().join("empty.csv");
    fs::write(&empty, "zone_temp,outdoor_temp,duration_min\n").unwrap();

    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("optimal-start")
        .arg("--history")
        .arg(&empty)
        .args(["--zone-temp", "50", "--outdoor-temp", "10", "--occupancy", "06:30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("for occupancy at 06:30"));
}

#[rstest]
fn bad_history_header_exits_4() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let history = dir.path().join("bad.csv");
    fs::write(&history, "zone,outdoor,minutes\n50,10,120\n").unwrap();

    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("optimal-start")
        .arg("--history")
        .arg(&history)
        .args(["--zone-temp", "50", "--outdoor-temp", "10"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("zone_temp,outdoor_temp,duration_min"));
}

#[rstest]
fn negative_outdoor_temperature_parses() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);
    let history = write_history(&dir);
    Command::cargo_bin("setpoint_cli")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("optimal-start")
        .arg("--history")
        .arg(&history)
        .args(["--zone-temp", "45", "--outdoor-temp", "-5"])
        .assert()
        .success();
}
