use std::fs;

use chrono::NaiveDate;
use std::future::pending;

use ramp_mailer::{
    run_locked, ContactSource, CsvContacts, FileQuotaStore, QuotaState, QuotaStore, QuotaTracker,
    RampPolicy, RunLock, StorageError,
};
use tempfile::tempdir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, d).unwrap()
}

#[test]
fn missing_file_loads_as_none() {
    let temp = tempdir().expect("failed to create temp dir");
    let store = FileQuotaStore::new(temp.path().join("send_history.json"));

    assert_eq!(store.load().unwrap(), None);
}

#[test]
fn save_then_load_returns_same_state() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join("nested").join("send_history.json");
    let store = FileQuotaStore::new(&path);
    let state = QuotaState {
        date: day(3),
        limit: 400,
        count: 17,
    };

    store.save(&state).unwrap();

    assert_eq!(store.load().unwrap(), Some(state));
    let raw = fs::read_to_string(&path).unwrap();
    assert_eq!(raw, r#"{"date":"2024-11-03","limit":400,"count":17}"#);
    assert!(!temp
        .path()
        .join("nested")
        .join("send_history.json.tmp")
        .exists());
}

#[test]
fn reads_file_written_by_hand() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join("send_history.json");
    fs::write(&path, "{\"date\": \"2024-11-02\", \"limit\": 300, \"count\": 12}\n").unwrap();

    let state = FileQuotaStore::new(&path).load().unwrap().unwrap();

    assert_eq!(state.date, day(2));
    assert_eq!(state.limit, 300);
    assert_eq!(state.count, 12);
}

#[test]
fn malformed_file_is_a_corrupt_error() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join("send_history.json");
    fs::write(&path, "{\"date\": \"yesterday\"").unwrap();

    let err = FileQuotaStore::new(&path).load().unwrap_err();

    assert!(matches!(err, StorageError::Corrupt { .. }));
}

#[test]
fn corrupt_state_is_not_overwritten_by_tracker() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join("send_history.json");
    fs::write(&path, "not json").unwrap();
    let tracker = QuotaTracker::new(FileQuotaStore::new(&path), RampPolicy::default());

    assert!(tracker.current(day(5)).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
}

#[test]
fn tracker_rollover_lands_on_disk() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join("send_history.json");
    let store = FileQuotaStore::new(&path);
    store
        .save(&QuotaState {
            date: day(4),
            limit: 100,
            count: 100,
        })
        .unwrap();
    let tracker = QuotaTracker::new(FileQuotaStore::new(&path), RampPolicy::default());

    tracker.current(day(5)).unwrap();

    assert_eq!(
        store.load().unwrap(),
        Some(QuotaState {
            date: day(5),
            limit: 200,
            count: 0,
        })
    );
}

#[test]
fn second_lock_is_refused_until_release() {
    let temp = tempdir().expect("failed to create temp dir");
    let state_path = temp.path().join("send_history.json");

    let first = RunLock::acquire(&state_path).unwrap();
    assert!(first.path().ends_with("send_history.json.lock"));

    match RunLock::acquire(&state_path) {
        Err(StorageError::Locked { pid, .. }) => assert_eq!(pid, Some(std::process::id())),
        other => panic!("expected lock contention, got {other:?}"),
    }

    first.release().unwrap();
    let again = RunLock::acquire(&state_path).unwrap();
    drop(again);
    assert!(!temp.path().join("send_history.json.lock").exists());
}

#[test]
fn csv_contacts_load_from_disk() {
    let temp = tempdir().expect("failed to create temp dir");
    let path = temp.path().join("contacts.csv");
    fs::write(
        &path,
        "name,email,notes\nAda,ada@example.com,vip\n,missing@example.com,\nBob,bob@example.com,\n",
    )
    .unwrap();

    let contacts = CsvContacts::new(&path).load().unwrap();

    let emails: Vec<_> = contacts.iter().map(|c| c.email.as_str()).collect();
    assert_eq!(emails, vec!["ada@example.com", "bob@example.com"]);
}

#[tokio::test]
async fn interrupted_run_releases_lock_for_next_run() {
    let temp = tempdir().expect("failed to create temp dir");
    let state_path = temp.path().join("send_history.json");
    let lock = RunLock::acquire(&state_path).unwrap();

    let result = run_locked(lock, pending::<()>(), async { "SIGTERM" }).await;

    let interrupted = result.unwrap_err();
    assert_eq!(interrupted.signal, "SIGTERM");
    assert!(!temp.path().join("send_history.json.lock").exists());
    RunLock::acquire(&state_path).expect("next run should get the lock");
}

#[tokio::test]
async fn completed_run_releases_lock() {
    let temp = tempdir().expect("failed to create temp dir");
    let state_path = temp.path().join("send_history.json");
    let lock = RunLock::acquire(&state_path).unwrap();

    let output = run_locked(lock, async { 7 }, pending::<&'static str>())
        .await
        .unwrap();

    assert_eq!(output, 7);
    assert!(!temp.path().join("send_history.json.lock").exists());
}
