mod common;

use assert_cmd::prelude::*;
use common::{grocer, script};
use predicates::prelude::*;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    let uploads = tempfile::tempdir().unwrap();
    let input = script(&["register,,alice,pw"]);

    grocer(uploads.path())
        .arg(input.path())
        .arg("--db-path")
        .arg("some_db")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage.",
        ));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let uploads = tempfile::tempdir().unwrap();
    let input = script(&["register,,alice,pw"]);
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    grocer(uploads.path())
        .arg(input.path())
        .arg("--db-path")
        .arg(&db_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
