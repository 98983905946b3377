// Drives CrontabGateway against a stand-in `crontab` shell script that keeps
// its table in a temp directory.
#![cfg(unix)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use cronui_sync::{CrontabGateway, Reconciler, SyncError, TableGateway};
use tempfile::TempDir;

/// Write an executable script into `dir` and return its path.
fn script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("crontab");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A fake `crontab` that behaves like the real one for `-l` and `<file>`.
fn fake_crontab(dir: &Path) -> PathBuf {
    let store = dir.join("table");
    let log = dir.join("installed-from");
    script(
        dir,
        &format!(
            r#"if [ "$1" = "-l" ]; then
  if [ -f "{store}" ]; then cat "{store}"; else echo "no crontab for tester" >&2; exit 1; fi
else
  echo "$1" > "{log}"
  cp "$1" "{store}"
fi"#,
            store = store.display(),
            log = log.display(),
        ),
    )
}

fn gateway(program: &Path, staging: &Path) -> CrontabGateway {
    CrontabGateway::new(program.to_string_lossy(), Duration::from_secs(5)).with_staging_dir(staging)
}

#[tokio::test]
async fn missing_table_is_reported_as_no_table() {
    let dir = TempDir::new().unwrap();
    let program = fake_crontab(dir.path());
    let err = gateway(&program, dir.path()).read().await.unwrap_err();
    assert!(matches!(err, SyncError::NoTable));
}

#[tokio::test]
async fn write_then_read_round_trips_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let program = fake_crontab(dir.path());
    let gateway = gateway(&program, staging.path());

    gateway.write(b"0 5 * * * echo hi\n").await.unwrap();
    assert_eq!(gateway.read().await.unwrap(), b"0 5 * * * echo hi\n");

    let installed_from = fs::read_to_string(dir.path().join("installed-from")).unwrap();
    let installed_from = PathBuf::from(installed_from.trim());
    assert!(installed_from.starts_with(staging.path()));
    assert!(installed_from
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("cronui-"));
    assert_eq!(fs::read_dir(staging.path()).unwrap().count(), 0, "staging file left behind");
}

#[tokio::test]
async fn tool_failure_becomes_write_error() {
    let dir = TempDir::new().unwrap();
    let program = script(
        dir.path(),
        r#"echo 'crontab: "bad minute" errors in crontab file, can'"'"'t install.' >&2; exit 1"#,
    );
    let err = gateway(&program, dir.path()).write(b"junk\n").await.unwrap_err();
    match err {
        SyncError::GatewayWrite(message) => assert!(message.contains("bad minute"), "{message}"),
        other => panic!("expected write error, got {other:?}"),
    }
}

#[tokio::test]
async fn other_read_failure_is_read_error() {
    let dir = TempDir::new().unwrap();
    let program = script(dir.path(), "echo 'crontab: permission denied' >&2; exit 1");
    let err = gateway(&program, dir.path()).read().await.unwrap_err();
    assert!(matches!(err, SyncError::GatewayRead(ref m) if m.contains("permission denied")));
}

#[tokio::test]
async fn hung_tool_times_out() {
    let dir = TempDir::new().unwrap();
    let program = script(dir.path(), "sleep 10");
    let gateway = CrontabGateway::new(program.to_string_lossy(), Duration::from_millis(200));
    let err = gateway.read().await.unwrap_err();
    assert!(matches!(err, SyncError::Timeout { ms: 200 }));
}

#[tokio::test]
async fn missing_program_is_read_error() {
    let gateway = CrontabGateway::new("/nonexistent/crontab", Duration::from_secs(1));
    let err = gateway.read().await.unwrap_err();
    assert!(matches!(err, SyncError::GatewayRead(_)));
}

#[tokio::test]
async fn reconciler_over_real_process() {
    let dir = TempDir::new().unwrap();
    let program = fake_crontab(dir.path());
    let reconciler = Reconciler::new(Arc::new(gateway(&program, dir.path())));

    let empty = reconciler.list().await.unwrap();
    assert!(empty.is_empty());

    let edited = empty
        .with_job_added("@reboot".parse().unwrap(), "/opt/start")
        .unwrap();
    let saved = reconciler.save(&edited).await.unwrap();
    assert_eq!(saved.jobs().count(), 1);
    assert_eq!(
        fs::read(dir.path().join("table")).unwrap(),
        b"@reboot /opt/start\n"
    );
}
