#![cfg(unix)]
#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// Params tree with both tankplayer configs, a fake tanksniff reporting
    /// seismic at 100.25 and geodetic at 100.0, and a fake tankplayer that
    /// appends its config name to `played.txt`.
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let f = Fixture { dir };
        let inp = f.params().join("inp");
        std::fs::create_dir_all(&inp).unwrap();
        std::fs::write(
            inp.join("tankplayer.d.seismic"),
            "# seismic tankplayer\nRingName WAVE_RING\nWaveFile /tanks/seismic.tnk # napa\n",
        )
        .unwrap();
        std::fs::write(
            inp.join("tankplayer.d.geodetic"),
            "RingName WAVE_RING\nWaveFile /tanks/geodetic.tnk\n",
        )
        .unwrap();
        f.script(
            "tanksniff",
            "case \"$1\" in\n\
             */seismic.tnk) echo 'BKS.HHZ.BK.00 (0x32 0x30) (100.2500) (100.9900)' ;;\n\
             */geodetic.tnk) echo 'P225.LYE.PW.-- (0x32 0x30) (100.0000) (100.9900)' ;;\n\
             *) exit 5 ;;\n\
             esac\n",
        );
        f.player(0);
        f
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn params(&self) -> PathBuf {
        self.path().join("params")
    }

    fn logs(&self) -> PathBuf {
        self.path().join("logs")
    }

    fn played(&self) -> PathBuf {
        self.path().join("played.txt")
    }

    fn start_log(&self) -> PathBuf {
        self.logs().join("tank_start.log")
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn player(&self, exit_code: i32) {
        self.script(
            "tankplayer",
            &format!(
                "echo \"$(basename \"$1\") $EW_INSTALLATION\" >> {}\nexit {exit_code}\n",
                self.played().display()
            ),
        );
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("tankplay").unwrap();
        cmd.current_dir(self.path())
            .env("EW_PARAMS", self.params())
            .env_remove("EW_LOG")
            .env_remove("TANKPLAY_CONFIG")
            .env_remove("TANKPLAY_LOG_DIR")
            .env_remove("TANKPLAY_PLAYER")
            .env_remove("TANKPLAY_SNIFF")
            .arg("--tankplayer")
            .arg(self.path().join("tankplayer"))
            .arg("--tanksniff")
            .arg(self.path().join("tanksniff"))
            .arg("--log-dir")
            .arg(self.logs());
        cmd
    }

    fn played_lines(&self) -> Vec<String> {
        std::fs::read_to_string(self.played())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// environment
// ---------------------------------------------------------------------------

#[test]
fn unsourced_environment_exits_2_without_launching() {
    let fx = Fixture::new();
    fx.cmd()
        .env_remove("EW_PARAMS")
        .args(["napa", "--offset_time", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "You must source an EW env before running this!",
        ));

    assert!(!fx.played().exists());
    assert!(!fx.start_log().exists());
}

#[test]
fn unsourced_environment_wins_over_bad_settings() {
    let fx = Fixture::new();
    fx.cmd()
        .env_remove("EW_PARAMS")
        .args(["napa", "--offset_time", "0", "--config", "does-not-exist.yaml"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "You must source an EW env before running this!",
        ));
    assert!(!fx.played().exists());
}

#[test]
fn children_see_earthworm_installation() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["napa", "--offset_time", "0"])
        .assert()
        .success();

    let mut lines = fx.played_lines();
    lines.sort();
    assert_eq!(
        lines,
        vec![
            "tankplayer.d.geodetic INST_UNKNOWN".to_string(),
            "tankplayer.d.seismic INST_UNKNOWN".to_string(),
        ]
    );
}

// ---------------------------------------------------------------------------
// launching
// ---------------------------------------------------------------------------

#[test]
fn explicit_offset_launches_both_and_writes_start_log() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["napa", "--offset_time", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Doing napa with offset 0s"));

    let log = std::fs::read_to_string(fx.start_log()).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Seismic start: "));
    assert!(lines[1].starts_with("Geodetic start: "));
    assert!(lines[0].ends_with("+00:00"));
    assert_eq!(fx.played_lines().len(), 2);
}

#[test]
fn computed_offset_starts_geodetic_first() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("napa")
        .assert()
        .success()
        .stdout(predicate::str::contains("with offset 0.25s"));

    let lines = fx.played_lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("tankplayer.d.geodetic"));
    assert!(lines[1].starts_with("tankplayer.d.seismic"));
}

#[test]
fn player_failure_is_reported() {
    let fx = Fixture::new();
    fx.player(3);
    fx.cmd()
        .args(["napa", "--offset_time", "-0.1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("tankplayer failed"));

    // Both launches still happened and were logged.
    assert!(fx.start_log().exists());
    assert_eq!(fx.played_lines().len(), 2);
}

#[test]
fn missing_tankplayer_config_fails_before_launch() {
    let fx = Fixture::new();
    std::fs::remove_file(fx.params().join("inp/tankplayer.d.seismic")).unwrap();
    fx.cmd()
        .arg("napa")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not be opened"));
    assert!(!fx.played().exists());
}

// ---------------------------------------------------------------------------
// dry run / json / settings
// ---------------------------------------------------------------------------

#[test]
fn dry_run_prints_plan_without_launching() {
    let fx = Fixture::new();
    let out = fx
        .cmd()
        .args(["napa", "--dry-run", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["event"], "napa");
    assert_eq!(v["plan"]["first"], "geodetic");
    assert_eq!(v["plan"]["second"], "seismic");
    assert_eq!(v["plan"]["delay"], 0.25);
    assert_eq!(v["offset_source"]["seismic"]["start"], 100.25);
    assert!(!fx.played().exists());
    assert!(!fx.start_log().exists());
}

#[test]
fn json_report_lists_both_players() {
    let fx = Fixture::new();
    let out = fx
        .cmd()
        .args(["napa", "--offset_time", "0", "-j"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let players = v["players"].as_array().unwrap();
    assert_eq!(players.len(), 2);
    assert_eq!(players[0]["stream"], "seismic");
    assert_eq!(players[0]["success"], true);
    assert_eq!(players[1]["exit_code"], 0);
}

#[test]
fn settings_file_supplies_installation() {
    let fx = Fixture::new();
    let settings = fx.path().join("tankplay.yaml");
    std::fs::write(&settings, "earthworm:\n  installation: INST_UW\n").unwrap();
    fx.cmd()
        .args(["napa", "--offset_time", "0", "--config"])
        .arg(&settings)
        .assert()
        .success();
    assert!(fx
        .played_lines()
        .iter()
        .all(|l| l.ends_with("INST_UW")));
}

#[test]
fn missing_settings_file_fails() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["napa", "--config", "does-not-exist.yaml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("settings file not found"));
}

#[test]
fn huge_offset_is_an_error_not_a_crash() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["napa", "--offset_time", "1e300", "--dry-run"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("out of range"));
    assert!(!fx.played().exists());
}

#[test]
fn rust_log_debug_shows_overwritten_wave_file() {
    let fx = Fixture::new();
    std::fs::write(
        fx.params().join("inp/tankplayer.d.seismic"),
        "WaveFile /tanks/old.tnk\nWaveFile /tanks/seismic.tnk\n",
    )
    .unwrap();
    fx.cmd()
        .env("RUST_LOG", "debug")
        .args(["napa", "--dry-run"])
        .assert()
        .success()
        .stderr(predicate::str::contains("keeping the later entry"));
}
