mod common;

use assert_cmd::prelude::*;
use common::{CATALOG, grocer, script};
use predicates::prelude::*;
use serde_json::Value;

fn report(kind: &str, extra: &[&str]) -> Value {
    let uploads = tempfile::tempdir().unwrap();
    let input = script(&CATALOG);

    let output = grocer(uploads.path())
        .arg(input.path())
        .arg("--report")
        .arg(kind)
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_products_report() {
    let products = report("products", &[]);
    let products = products.as_array().unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0]["product_id"], 3);
    assert_eq!(products[0]["product_name"], "Eggs");
    assert_eq!(products[0]["product_price"], 3.0);
    assert_eq!(products[1]["product_price"], 5.0);
    assert_eq!(products[0]["description"], "Free range");
    assert_eq!(products[0]["category_id"], 2);
    assert_eq!(products[1]["product_name"], "Butter");
    assert_eq!(products[1]["description"], Value::Null);
}

#[test]
fn test_categories_report() {
    let categories = report("categories", &[]);
    assert_eq!(categories, serde_json::json!([{ "id": 2, "name": "Dairy" }]));
}

#[test]
fn test_search_report() {
    let matches = report("search", &["--query", "RANGE"]);
    let names: Vec<&str> = matches
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|p| p["product_name"].as_str())
        .collect();
    assert_eq!(names, vec!["Eggs"]);

    // Category names match too.
    assert_eq!(report("search", &["--query", "dairy"]).as_array().unwrap().len(), 2);
}

#[test]
fn test_unknown_report_is_rejected() {
    let uploads = tempfile::tempdir().unwrap();
    let input = script(&[]);

    grocer(uploads.path())
        .arg(input.path())
        .arg("--report")
        .arg("invoices")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
