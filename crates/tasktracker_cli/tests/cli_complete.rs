use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use time::OffsetDateTime;
use time::macros::format_description;

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("tasktracker-{nanos}-{file_name}"))
}

fn run(store_path: &Path, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_tasktracker");
    Command::new(exe)
        .args(args)
        .arg("--file")
        .arg(store_path)
        .env("TASKTRACKER_CONFIG_PATH", temp_path("no-config.json"))
        .env_remove("TASKTRACKER_STORE_PATH")
        .output()
        .expect("failed to run tasktracker")
}

#[test]
fn complete_command_closes_open_task() {
    let store_path = temp_path("cli-complete.data");
    std::fs::write(&store_path, "2024.03.01 090000+0000;Write;\n").unwrap();

    let output = run(&store_path, &["complete"]);
    let content = std::fs::read_to_string(&store_path).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Completed task: Write"));

    let fields: Vec<&str> = content.trim_end().split(';').collect();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[0], "2024.03.01 090000+0000");
    OffsetDateTime::parse(
        fields[2],
        format_description!(
            "[year].[month].[day] [hour][minute][second][offset_hour sign:mandatory][offset_minute]"
        ),
    )
    .expect("end timestamp in store format");
}

#[test]
fn complete_command_without_open_task_is_not_fatal() {
    let store_path = temp_path("cli-complete-none.data");
    let original = "2024.03.01 090000+0000;Write;2024.03.01 093000+0000;\n";
    std::fs::write(&store_path, original).unwrap();

    let output = run(&store_path, &["c"]);
    let content = std::fs::read_to_string(&store_path).unwrap();
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No incomplete task."));
    assert_eq!(content, original);
}

#[test]
fn complete_command_on_empty_store_is_not_fatal() {
    let store_path = temp_path("cli-complete-empty.data");

    let output = run(&store_path, &["complete"]);
    let exists = store_path.exists();
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    assert!(exists);
}

#[test]
fn status_command_shows_current_task() {
    let store_path = temp_path("cli-status.data");
    std::fs::write(&store_path, "2024.03.01 090000+0000;Write;\n").unwrap();

    let output = run(&store_path, &["status"]);
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Current task: Write"));
}
