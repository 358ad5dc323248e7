use std::process::Command;

fn recsort() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_recsort"));
    cmd.env_remove("RECSORT_SORT_PROGRAM")
        .env_remove("RECSORT_STABLE")
        .env("RECSORT_LOG", "warn");
    cmd
}

fn sort_available() -> bool {
    Command::new("sort")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[test]
fn version_flag() {
    let out = recsort().arg("--version").output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("recsort "), "{stdout}");
}

#[test]
fn sort_subcommand_version_flag() {
    let out = recsort().args(["sort", "--version"]).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "{stdout}");
}

#[test]
fn sorts_jsonl_file_by_timestamp() {
    if !sort_available() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pos.jsonl");
    std::fs::write(
        &input,
        concat!(
            "{\"timestamp\":\"2014-03-01T00:00:00Z\",\"mmsi\":3}\n",
            "{\"timestamp\":\"2014-01-01T00:00:00Z\",\"mmsi\":1}\n",
            "{\"timestamp\":\"2014-02-01T00:00:00Z\",\"mmsi\":2}\n",
        ),
    )
    .unwrap();
    let output = dir.path().join("sorted.jsonl");

    let out = recsort().arg("sort").arg(&input).arg(&output).output().unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let text = std::fs::read_to_string(&output).unwrap();
    let mmsi: Vec<&str> = text
        .lines()
        .map(|l| l.rsplit(':').next().unwrap().trim_end_matches('}'))
        .collect();
    assert_eq!(mmsi, ["1", "2", "3"]);
    assert!(!dir.path().join("sorted.jsonl.tmp1").exists());
    assert!(!dir.path().join("sorted.jsonl.tmp2").exists());
}

#[test]
fn missing_sort_program_exits_with_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.jsonl");
    std::fs::write(&input, "{\"timestamp\":\"2014-01-01T00:00:00Z\"}\n").unwrap();
    let output = dir.path().join("out.jsonl");

    let out = recsort()
        .args(["sort", "--sort-program", "recsort-no-such-sort-program"])
        .arg(&input)
        .arg(&output)
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Error:"), "{stderr}");
    assert!(stderr.contains("recsort-no-such-sort-program"), "{stderr}");
    assert!(!output.exists());
}

#[test]
fn unknown_extension_needs_explicit_driver() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.dat");
    std::fs::write(&input, "").unwrap();

    let out = recsort()
        .arg("sort")
        .arg(&input)
        .arg(dir.path().join("out.jsonl"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
}
