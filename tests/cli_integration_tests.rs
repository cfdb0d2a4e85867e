use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn desk(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("enrollment-desk").unwrap();
    cmd.current_dir(dir.path())
        .env(
            "ENROLLMENT_DESK__STORAGE__SNAPSHOT_PATH",
            dir.path().join("desk.json"),
        )
        .env("RUST_LOG", "error");
    cmd
}

fn seed(dir: &TempDir) {
    desk(dir)
        .args(["student", "add", "Alice", "Smith", "alice@example.com"])
        .assert()
        .success();
    desk(dir)
        .args(["course", "add", "Intro to Go", "Learn Go basics"])
        .assert()
        .success();
}

#[test]
fn help_lists_workflow_commands() {
    let dir = TempDir::new().unwrap();
    desk(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("enroll"))
        .stdout(predicate::str::contains("approve"))
        .stdout(predicate::str::contains("reset"));
}

#[test]
fn enroll_then_approve_across_invocations() {
    let dir = TempDir::new().unwrap();
    seed(&dir);

    desk(&dir)
        .args(["enroll", "Alice", "Smith", "Intro to Go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Enrollment request submitted successfully!"))
        .stdout(predicate::str::contains("PENDING"));

    desk(&dir).args(["approve", "1"]).assert().success();

    desk(&dir)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APPROVED"))
        .stdout(predicate::str::contains("courseTitle"));
}

#[test]
fn duplicate_enrollment_exits_with_conflict_code() {
    let dir = TempDir::new().unwrap();
    seed(&dir);

    desk(&dir)
        .args(["enroll", "Alice", "Smith", "Intro to Go"])
        .assert()
        .success();
    desk(&dir)
        .args(["enroll", "Alice", "Smith", "Intro to Go"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("You are already enrolled in 'Intro to Go'"));
}

#[test]
fn unknown_course_lists_available_titles() {
    let dir = TempDir::new().unwrap();
    seed(&dir);

    desk(&dir)
        .args(["enroll", "Alice", "Smith", "Nonexistent Course"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains(
            "Course 'Nonexistent Course' not found. Available courses: [Intro to Go]",
        ));
}

#[test]
fn bad_status_is_a_validation_failure() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    desk(&dir)
        .args(["enroll", "Alice", "Smith", "Intro to Go"])
        .assert()
        .success();

    desk(&dir)
        .args(["status", "1", "finished"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Valid statuses: PENDING, APPROVED, REJECTED"));
}

#[test]
fn renamed_course_is_enrolled_by_its_new_title() {
    let dir = TempDir::new().unwrap();
    seed(&dir);

    desk(&dir)
        .args(["course", "update", "1", "--title", "Go in Practice"])
        .assert()
        .success();

    desk(&dir)
        .args(["enroll", "Alice", "Smith", "Intro to Go"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Available courses: [Go in Practice]"));
    desk(&dir)
        .args(["enroll", "Alice", "Smith", "Go in Practice"])
        .assert()
        .success();
}

#[test]
fn course_with_enrollments_cannot_be_deleted() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    desk(&dir)
        .args(["enroll", "Alice", "Smith", "Intro to Go"])
        .assert()
        .success();

    desk(&dir)
        .args(["course", "delete", "1"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("still has enrollments"));

    desk(&dir).args(["delete", "1"]).assert().success();
    desk(&dir).args(["course", "delete", "1"]).assert().success();
    desk(&dir)
        .args(["course", "show", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Course not found with id: 1"));
}

#[test]
fn course_image_is_written_back_out() {
    let dir = TempDir::new().unwrap();
    let image = dir.path().join("cover.png");
    std::fs::write(&image, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]).unwrap();

    desk(&dir)
        .args(["course", "add", "Rust 101", "Ownership", "--image"])
        .arg(&image)
        .assert()
        .success();

    let out = dir.path().join("copy.png");
    desk(&dir)
        .args(["course", "show", "1", "--image-out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("image/png"));
    assert_eq!(std::fs::read(&out).unwrap(), std::fs::read(&image).unwrap());
}
