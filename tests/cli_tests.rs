//! Command-line tests for the stackclip binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn stackclip(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stackclip").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("STACKCLIP_FFMPEG")
        .env_remove("STACKCLIP_YTDLP")
        .env_remove("STACKCLIP_TOOL_TIMEOUT")
        .env_remove("STACKCLIP_CONFIG");
    cmd
}

#[test]
fn test_plan_fixed_length_text() {
    let dir = TempDir::new().unwrap();
    stackclip(&dir)
        .args(["plan", "--duration", "130", "--segment-length", "60"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Boundaries: [60, 120, 130]"))
        .stdout(predicate::str::contains("video1_02.mp4  10.000s"));
}

#[test]
fn test_plan_count_json() {
    let dir = TempDir::new().unwrap();
    let output = stackclip(&dir)
        .args(["plan", "--duration", "01:40", "--segments", "4", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["boundaries"], serde_json::json!([25.0, 50.0, 75.0]));
    assert_eq!(json["segment_count"], 4);
    assert_eq!(json["mode"]["kind"], "count");
}

#[test]
fn test_plan_reads_config_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("stackclip.toml"),
        "[segment]\nmode = \"fixed_length\"\nseconds = 50.0\npad_width = 3\n",
    )
    .unwrap();

    stackclip(&dir)
        .args(["plan", "--duration", "120"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Boundaries: [50, 100, 120]"))
        .stdout(predicate::str::contains("video1_000.mp4"));
}

#[test]
fn test_plan_overflowing_padding_fails() {
    let dir = TempDir::new().unwrap();
    stackclip(&dir)
        .args(["plan", "--duration", "1000", "--segment-length", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("padding"));
}

#[test]
fn test_crf_range_enforced() {
    let dir = TempDir::new().unwrap();
    stackclip(&dir)
        .args(["stack", "--primary", "a.mp4", "--secondary", "b.mp4", "--crf", "99"])
        .assert()
        .failure();
}

#[test]
fn test_stack_missing_local_source_fails() {
    let dir = TempDir::new().unwrap();
    stackclip(&dir)
        .args(["stack", "--primary", "absent.mp4", "--secondary", "also-absent.mp4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Source file does not exist"));
}

#[cfg(unix)]
#[test]
fn test_stack_with_scripted_ffmpeg() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let ffmpeg = dir.path().join("fake-ffmpeg");
    std::fs::write(
        &ffmpeg,
        "#!/bin/sh\n\
         last=\"\"\n\
         for arg in \"$@\"; do last=\"$arg\"; done\n\
         case \" $* \" in\n\
           *\" -f null \"*) echo '  Duration: 00:01:00.00, start: 0.0' 1>&2 ;;\n\
           *\" segment \"*) d=$(dirname \"$last\"); b=$(basename \"$last\"); l=${b%%_%*}; : > \"$d/${l}_00.mp4\"; : > \"$d/${l}_01.mp4\" ;;\n\
           *) : > \"$last\" ;;\n\
         esac\n",
    )
    .unwrap();
    std::fs::set_permissions(&ffmpeg, std::fs::Permissions::from_mode(0o755)).unwrap();
    std::fs::write(dir.path().join("main.mp4"), b"main").unwrap();
    std::fs::write(dir.path().join("filler.mp4"), b"filler").unwrap();

    stackclip(&dir)
        .arg("--ffmpeg")
        .arg(&ffmpeg)
        .args(["stack", "--primary", "main.mp4", "--secondary", "filler.mp4", "--segments", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("final_part1.mp4"));

    assert!(dir.path().join("final_output").join("final_part0.mp4").exists());
    assert!(dir.path().join("final_output").join("run_report.json").exists());
    assert!(!dir.path().join("output_parts").exists());
}
