#![cfg(feature = "storage-rocksdb")]

mod common;

use common::{CATALOG, grocer, script};
use tempfile::tempdir;

#[test]
fn test_cart_and_catalog_survive_restart() {
    let dir = tempdir().unwrap();
    let uploads = tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    // 1. First run: build the catalog and fill a cart.
    let mut rows = CATALOG.to_vec();
    rows.extend(["register,,alice,pw", "login,,alice,pw", "add_to_cart,alice,3,2"]);
    let first = script(&rows);

    let output = grocer(uploads.path())
        .arg(first.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 1);

    // 2. Second run: sessions are gone but the cart is not.
    let second = script(&["login,,alice,pw", "checkout,alice,1 Main St,555-0100"]);

    let output = grocer(uploads.path())
        .arg(second.path())
        .arg("--db-path")
        .arg(&db_path)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].ends_with(",3,2,1 Main St,555-0100"));
}
