use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

const FLEET_CSV: &str = "\
Drone QR Code ID,Drone ID,Broken code,Rack No,Category,In/Out,Current Location
QR-001,D-1,,3,Quadcopter,In,Main Hangar
QR-002,D-2,Broken,1,Quadcopter,In,Repair Bay
QR-003,D-3,,7,VTOL,Out,Field Office
";

fn hangar(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hangar").expect("bin");
    cmd.env("HOME", home).env_remove("HANGAR_LOG");
    cmd
}

fn init_with_fleet(home: &Path) {
    let data_dir = home.join("data");
    hangar(home)
        .args(["init", "--data-dir"])
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized hangar"));

    let csv = home.join("fleet.csv");
    fs::write(&csv, FLEET_CSV).expect("write csv");
    hangar(home)
        .arg("import")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 records imported (10 columns)"));
}

#[test]
fn views_require_init() {
    let home = tempfile::tempdir().expect("tempdir");
    hangar(home.path())
        .arg("summary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("hangar init"));
}

#[test]
fn import_then_summary_and_table() {
    let home = tempfile::tempdir().expect("tempdir");
    init_with_fleet(home.path());

    hangar(home.path())
        .args(["summary", "--category", "Quadcopter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fleet Summary (2 records"));

    hangar(home.path())
        .args(["table", "--sort", "Rack No", "--desc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QR-003"))
        .stdout(predicate::str::contains("Page 1 of 1 (3 rows)"));

    hangar(home.path())
        .args(["table", "--sort", "Condition", "--condition", "Bad"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QR-002"))
        .stdout(predicate::str::contains("Page 1 of 1 (1 rows)"));

    hangar(home.path())
        .args(["table", "--sort", "Altitude"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown column: Altitude"));
}

#[test]
fn reimport_same_file_is_skipped() {
    let home = tempfile::tempdir().expect("tempdir");
    init_with_fleet(home.path());
    hangar(home.path())
        .arg("import")
        .arg(home.path().join("fleet.csv"))
        .assert()
        .success()
        .stdout(predicate::str::contains("already the active dataset"));
}

#[test]
fn transit_lifecycle() {
    let home = tempfile::tempdir().expect("tempdir");
    init_with_fleet(home.path());

    hangar(home.path())
        .args(["transit", "available"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QR-001"))
        .stdout(predicate::str::contains("QR-002").not());

    hangar(home.path())
        .args([
            "transit", "add", "QR-002", "--from", "A", "--to", "B", "--ship", "now", "--eta", "soon",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing changed"));

    hangar(home.path())
        .args([
            "transit", "add", "QR-001", "--from", "Main Hangar", "--to", "Range", "--ship", "09:00",
            "--eta", "12:00",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shipped"));

    hangar(home.path())
        .args(["transit", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("In Transit"))
        .stdout(predicate::str::contains("1 entries"));

    hangar(home.path())
        .args(["table", "--search", "QR-001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("In Transit"));

    hangar(home.path())
        .args(["transit", "status", "1", "lost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown transit status"));

    hangar(home.path())
        .args(["transit", "clear"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 1 transit entries."));
}

#[test]
fn clear_needs_confirmation() {
    let home = tempfile::tempdir().expect("tempdir");
    init_with_fleet(home.path());

    hangar(home.path())
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("--yes"));

    hangar(home.path())
        .args(["clear", "--yes"])
        .assert()
        .success();

    hangar(home.path())
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No dataset loaded"));
}

#[test]
fn edit_broken_code_updates_condition() {
    let home = tempfile::tempdir().expect("tempdir");
    init_with_fleet(home.path());

    hangar(home.path())
        .args(["edit", "QR-001", "Broken code", "Destroyed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Condition is now Destroyed."));

    hangar(home.path())
        .args(["table", "--condition", "Destroyed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("QR-001"))
        .stdout(predicate::str::contains("(1 rows)"));
}
