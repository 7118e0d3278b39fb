use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn temp_path(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "gamebook-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn gamebook(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gamebook"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(["--seed", "7"])
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("run cli")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stored_sheet(data_dir: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(data_dir.join("storage.json")).expect("read storage");
    let storage: serde_json::Value = serde_json::from_str(&text).expect("storage is json");
    let sheet = storage["gamebook.sheet"].as_str().expect("sheet key present");
    serde_json::from_str(sheet).expect("sheet is json")
}

#[test]
fn sheet_edits_persist_between_runs() {
    let dir = temp_path("persist");
    let output = gamebook(
        &dir,
        &["character", "--name", "Rook", "--skill", "10", "--health", "20", "--luck", "9"],
    );
    assert!(output.status.success());
    assert!(gamebook(&dir, &["lock"]).status.success());
    assert!(gamebook(&dir, &["chapter", "78", "--annotate", "good"]).status.success());

    let sheet = stored_sheet(&dir);
    assert_eq!(sheet["character"]["name"], "Rook");
    assert_eq!(sheet["character"]["maxHealth"], 20);
    assert_eq!(sheet["trail"][1]["number"], 78);
    assert_eq!(sheet["trail"][1]["annotation"], "good");
    assert!(sheet["metadata"]["lastSaved"].is_string());

    let show = stdout(&gamebook(&dir, &["show"]));
    assert!(show.contains("Rook"));
    assert!(show.contains("20/20"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn fight_round_updates_the_encounter() {
    let dir = temp_path("fight");
    assert!(
        gamebook(&dir, &["character", "--skill", "10", "--health", "20", "--luck", "9"])
            .status
            .success()
    );
    assert!(
        gamebook(&dir, &["monster", "Goblin", "--skill", "5", "--health", "6"])
            .status
            .success()
    );
    let output = gamebook(&dir, &["fight"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("you rolled"));
    assert!(text.contains("Goblin"));

    let sheet = stored_sheet(&dir);
    assert!(sheet["fight"]["fightResult"].is_object());
    assert!(sheet["fight"]["heroDiceRolls"]["sum"].is_number());
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn fighting_without_a_monster_is_refused() {
    let dir = temp_path("no-monster");
    let output = gamebook(&dir, &["fight"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no monster"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn export_then_import_restores_notes() {
    let dir = temp_path("export");
    assert!(gamebook(&dir, &["book", "Deathtrap Dungeon"]).status.success());
    assert!(gamebook(&dir, &["character", "--name", "Ash"]).status.success());
    assert!(gamebook(&dir, &["note", "the key is under the idol"]).status.success());
    assert!(gamebook(&dir, &["export"]).status.success());

    let exports: Vec<PathBuf> = std::fs::read_dir(dir.join("exports"))
        .expect("exports dir")
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    assert_eq!(exports.len(), 1);
    let name = exports[0].file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("deathtrap-dungeon-ash-"));
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(&exports[0]).unwrap()).unwrap();
    assert_eq!(yaml["notes"].as_str(), Some("the key is under the idol"));

    assert!(gamebook(&dir, &["reset"]).status.success());
    assert_eq!(stored_sheet(&dir)["notes"], "");

    let output = gamebook(&dir, &["import"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Sheet imported."));
    assert_eq!(stored_sheet(&dir)["notes"], "the key is under the idol");
    let _ = std::fs::remove_dir_all(dir);
}
