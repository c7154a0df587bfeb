// Integration tests for the `numbot` binary: replies, exit codes, settings and history.
// Run with: cargo test -p numbot-cli --test cli_tests -- --nocapture

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn numbot(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_numbot"));
    cmd.env("NUMBOT_HOME", home);
    cmd.env_remove("NUMBOT_LOG");
    cmd.arg("--color").arg("never");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    numbot(home).args(args).output().expect("spawn numbot")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// ask
// ---------------------------------------------------------------------------

#[test]
fn ask_two_is_closer_to_one() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["ask", "2"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("TinyNumberBot: 2 is closer to 1!\n"), "got: {text}");
    assert!(text.contains("Have a nice day ☺️"));
    assert!(text.contains("[Confidence: 67%]"));
    assert!(text.contains("[Data Verified: "));
}

#[test]
fn ask_negative_thirty_range_mode() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["ask", "-30", "--mode", "range"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("-30 is closest to 0"), "got: {text}");
    assert!(text.contains("Closest distance: 30"));
    assert!(text.contains("[Region: 0 → 20]"));
    assert!(text.contains("[Confidence: 51%]"));
}

#[test]
fn ask_rank_with_inline_refs() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["ask", "7", "--refs", "10, 0, 5", "--mode", "rank"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    let five = text.find("5 (dist 2)").expect("5 ranked");
    let ten = text.find("10 (dist 3)").expect("10 ranked");
    let zero = text.find("0 (dist 7)").expect("0 ranked");
    assert!(five < ten && ten < zero, "ranking order wrong: {text}");
}

#[test]
fn ask_json_contract() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["ask", "2", "--json", "--seed", "7"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(json["input"], "2");
    assert_eq!(json["query"], 2.0);
    assert_eq!(json["best"]["value"], 1.0);
    assert_eq!(json["best"]["distance"], 1.0);
    assert_eq!(json["runner_up"]["value"], 0.0);
    assert_eq!(json["confidence"], 67);
    assert_eq!(json["mode"], "closest");

    let dv = json["dv"].as_str().expect("dv string");
    assert_eq!(dv.len(), 12);
    assert_eq!(&dv[4..5], "-");
    assert_eq!(&dv[7..8], "-");
}

#[test]
fn ask_exp_formula_caps_below_hundred() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["ask", "1.001", "--conf", "exp", "--json"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["confidence"], 99);
}

#[test]
fn seed_makes_verification_ids_repeatable() {
    let home = TempDir::new().unwrap();
    let a = run(home.path(), &["ask", "3", "--seed", "42", "--no-history", "--json"]);
    let b = run(home.path(), &["ask", "3", "--seed", "42", "--no-history", "--json"]);

    let a: serde_json::Value = serde_json::from_str(&stdout(&a)).unwrap();
    let b: serde_json::Value = serde_json::from_str(&stdout(&b)).unwrap();
    assert_eq!(a["dv"], b["dv"]);
}

#[test]
fn ask_unparseable_exits_4() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["ask", "twelve"]);

    assert_eq!(output.status.code(), Some(4));
    assert!(stderr(&output).contains("couldn't parse \"twelve\" as a number"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn ask_without_valid_refs_exits_5() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["ask", "3", "--refs", "a,,b"]);

    assert_eq!(output.status.code(), Some(5));
    let err = stderr(&output);
    assert!(err.contains("no reference numbers provided"), "got: {err}");
    assert!(err.contains("hint:"));
}

#[test]
fn ask_bad_mode_is_usage_error() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["ask", "3", "--mode", "nearest"]);
    assert_eq!(output.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// refs / config / theme
// ---------------------------------------------------------------------------

#[test]
fn refs_set_persists_and_reset_restores() {
    let home = TempDir::new().unwrap();

    let set = run(home.path(), &["refs", "set", "100, x, -5"]);
    assert!(set.status.success(), "stderr: {}", stderr(&set));
    assert_eq!(stdout(&set).trim(), "Saved refs: 100,-5");

    let show = run(home.path(), &["refs", "show"]);
    assert_eq!(stdout(&show).trim(), "100,-5");

    let ask = run(home.path(), &["ask", "90", "--no-history"]);
    assert!(stdout(&ask).contains("90 is closer to 100!"));

    let reset = run(home.path(), &["refs", "reset"]);
    assert_eq!(stdout(&reset).trim(), "Reset to defaults: 0,1,20");
    assert!(home.path().join("settings.json").exists());
}

#[test]
fn refs_set_with_nothing_valid_is_rejected() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["refs", "set", "a,b"]);

    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("Provide at least one reference number."));

    let show = run(home.path(), &["refs"]);
    assert_eq!(stdout(&show).trim(), "0,1,20");
}

#[test]
fn config_set_changes_default_mode() {
    let home = TempDir::new().unwrap();

    let set = run(home.path(), &["config", "set", "mode", "range"]);
    assert!(set.status.success(), "stderr: {}", stderr(&set));
    assert_eq!(stdout(&set).trim(), "mode = range");

    let ask = run(home.path(), &["ask", "-30", "--no-history"]);
    assert!(stdout(&ask).contains("[Region: 0 → 20]"));

    let show = run(home.path(), &["config", "show", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&show)).unwrap();
    assert_eq!(json["mode"], "range");
    assert_eq!(json["conf"], "ratio");
}

#[test]
fn config_unknown_key_is_usage_error() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["config", "set", "colour", "red"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("known settings: refs, mode, conf, scale, theme"));
}

#[test]
fn config_path_points_into_home() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["config", "path"]);
    assert_eq!(
        stdout(&output).trim(),
        home.path().join("settings.json").display().to_string()
    );
}

#[test]
fn settings_file_tolerates_comment_lines() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("settings.json"),
        "// edited by hand\n{\n  \"refs\": [3, 9]\n}\n",
    )
    .unwrap();

    let output = run(home.path(), &["refs", "show"]);
    assert_eq!(stdout(&output).trim(), "3,9");
}

#[test]
fn theme_toggle_round_trips() {
    let home = TempDir::new().unwrap();
    assert_eq!(stdout(&run(home.path(), &["theme"])).trim(), "dark");
    assert_eq!(stdout(&run(home.path(), &["theme", "toggle"])).trim(), "light");
    assert_eq!(stdout(&run(home.path(), &["theme"])).trim(), "light");
    assert_eq!(stdout(&run(home.path(), &["theme", "toggle"])).trim(), "dark");
}

// ---------------------------------------------------------------------------
// history
// ---------------------------------------------------------------------------

#[test]
fn history_records_show_and_export() {
    let home = TempDir::new().unwrap();
    run(home.path(), &["ask", "2", "--seed", "1"]);
    run(home.path(), &["ask", "-30", "--mode", "rank", "--seed", "2"]);

    let show = run(home.path(), &["history", "show"]);
    let lines: Vec<String> = stdout(&show).lines().map(String::from).collect();
    assert_eq!(lines, vec!["-30 → ranked (51%)", "2 → 1 (67%)"]);

    let json = run(home.path(), &["history", "show", "--json", "-n", "1"]);
    let entries: Vec<serde_json::Value> = serde_json::from_str(&stdout(&json)).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["output"], "ranked");

    let export = run(home.path(), &["history", "export"]);
    assert!(export.status.success(), "stderr: {}", stderr(&export));
    let csv = stdout(&export);
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows[0], "input,output,confidence,dv,time");
    assert_eq!(rows.len(), 3);
    assert!(rows[1].starts_with("2,1,67,"));
    assert!(rows[2].starts_with("-30,ranked,51,"));
    assert!(rows[1].ends_with('Z'));
}

#[test]
fn history_export_to_file() {
    let home = TempDir::new().unwrap();
    run(home.path(), &["ask", "5"]);

    let target = home.path().join("out.csv");
    let output = run(home.path(), &["history", "export", "-o", target.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("exported 1 rows"));
    let contents = std::fs::read_to_string(&target).unwrap();
    assert!(contents.starts_with("input,output,confidence,dv,time\n5,1,"));
}

#[test]
fn empty_history_export_exits_6() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["history", "export"]);

    assert_eq!(output.status.code(), Some(6));
    assert!(stderr(&output).contains("No history"));
    assert!(stdout(&output).is_empty());
}

#[test]
fn history_clear_empties_log() {
    let home = TempDir::new().unwrap();
    run(home.path(), &["ask", "1"]);
    run(home.path(), &["ask", "4"]);

    let clear = run(home.path(), &["history", "clear"]);
    assert_eq!(stdout(&clear).trim(), "Cleared 2 entries.");

    let show = run(home.path(), &["history", "show", "--json"]);
    let entries: Vec<serde_json::Value> = serde_json::from_str(&stdout(&show)).unwrap();
    assert!(entries.is_empty());
}

#[test]
fn no_history_flag_skips_recording() {
    let home = TempDir::new().unwrap();
    run(home.path(), &["ask", "2", "--no-history"]);
    let show = run(home.path(), &["history", "show", "--json"]);
    assert_eq!(stdout(&show).trim(), "[]");
}

// ---------------------------------------------------------------------------
// chat / examples
// ---------------------------------------------------------------------------

#[test]
fn chat_reads_queries_from_stdin() {
    let home = TempDir::new().unwrap();
    let mut child = numbot(home.path())
        .args(["chat", "--seed", "9"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn numbot chat");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"2\n\nabc\n/clear\n/quit\n15\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("-- References: 0, 1, 20."), "got: {text}");
    assert!(text.contains("You: 2\n"));
    assert!(text.contains("2 is closer to 1!"));
    assert!(text.contains("Couldn't parse \"abc\" as a number."));
    assert!(text.contains("-- Cleared. Try another number. --"));
    // Input after /quit is ignored
    assert!(!text.contains("You: 15"));
}

#[test]
fn examples_runs_both_queries() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["examples", "--no-history"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("2 is closer to 1!"));
    assert!(text.contains("-30 is closer to 0!"));
    assert!(text.contains("[Confidence: 51%]"));
}

#[test]
fn examples_typing_announces_each_reply() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["examples", "--typing", "--no-history"]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stderr(&output).matches("TinyNumberBot is typing…").count(), 2);
    let text = stdout(&output);
    let question = text.find("You: 2\n").expect("user card");
    let answer = text.find("2 is closer to 1!").expect("reply card");
    assert!(question < answer);
}
