use std::fs;
use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use predicates::prelude::*;
use tempfile::TempDir;

const HEADER: &str = "Order Number,Tracking Number,Due Date,Trade-In Devices\n";

/// `shipx` isolated from the user's config directory, running inside `dir`.
fn shipx(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("shipx").unwrap();
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env("HOME", dir)
        .env_remove("RUST_LOG");
    cmd
}

/// One-page PDF with each line drawn as its own text line.
fn label_pdf(path: &Path, lines: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), 12.into()]),
        Operation::new("TL", vec![16.into()]),
        Operation::new("Td", vec![50.into(), 700.into()]),
    ];
    for line in lines {
        operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        operations.push(Operation::new("T*", vec![]));
    }
    operations.push(Operation::new("ET", vec![]));

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn test_batch_exports_rows_in_document_order() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels");
    fs::create_dir(&labels).unwrap();

    // Written out of order; processing follows the sorted names.
    label_pdf(
        &labels.join("doc_c.pdf"),
        &["Order ID: SA987654321", "Tracking ID: 333333333333"],
    );
    label_pdf(
        &labels.join("doc_b.pdf"),
        &["Order ID: SA123456789", "Tracking ID: 222222222222"],
    );
    label_pdf(
        &labels.join("doc_a.pdf"),
        &[
            "Thanks for reaching out about your Galaxy S23 trade-in.",
            "Order ID: SA123456789",
            "Tracking ID: 111111111111",
            "Tracking ID: 111111111112",
        ],
    );
    fs::write(labels.join("broken.pdf"), b"this is not a pdf").unwrap();

    shipx(tmp.path())
        .arg("extract")
        .arg(&labels)
        .args(["--output", "rows.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SA123456789     111111111111"))
        .stderr(predicate::str::contains("broken.pdf"));

    assert_eq!(
        fs::read_to_string(tmp.path().join("rows.csv")).unwrap(),
        format!(
            "{}{}{}{}{}",
            HEADER,
            "SA123456789,111111111111,,Galaxy S23\n",
            "SA123456789,111111111112,,Galaxy S23\n",
            "SA123456789,222222222222,,\n",
            "SA987654321,333333333333,,\n",
        )
    );
}

#[test]
fn test_single_label_with_due_date() {
    let tmp = TempDir::new().unwrap();
    let label = tmp.path().join("label.pdf");
    label_pdf(
        &label,
        &[
            "Order ID: SA123456789",
            "Tracking ID: 123456789012",
            "Be sure to ship your package by October 25, 2024.",
        ],
    );

    let assert = shipx(tmp.path())
        .arg("extract")
        .arg(&label)
        .args(["--no-export", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let entry = &value["orders"][0]["entries"][0];
    assert_eq!(value["orders"][0]["order_id"], "SA123456789");
    assert_eq!(entry["tracking_ids"], serde_json::json!(["123456789012"]));
    assert!(entry["due_date"].as_str().unwrap().starts_with("October 25, 2024"));
}

#[test]
fn test_extract_help_describes_interrupts() {
    let tmp = TempDir::new().unwrap();

    shipx(tmp.path())
        .args(["extract", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ctrl-C again to exit"));
}

#[test]
fn test_config_set_creates_missing_file() {
    let tmp = TempDir::new().unwrap();

    shipx(tmp.path())
        .args(["--config", "fresh.json", "config", "set", "batch.jobs", "4"])
        .assert()
        .success();

    shipx(tmp.path())
        .args(["--config", "fresh.json", "config", "get", "batch.jobs"])
        .assert()
        .success()
        .stdout("4\n");
}

#[test]
fn test_invalid_path_fails() {
    let tmp = TempDir::new().unwrap();

    shipx(tmp.path())
        .args(["extract", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("neither a file nor a directory"));
}

#[test]
fn test_empty_directory_writes_header_only() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels");
    fs::create_dir(&labels).unwrap();
    let out = tmp.path().join("out.csv");

    shipx(tmp.path())
        .arg("extract")
        .arg(&labels)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("No tracking numbers found."))
        .stderr(predicate::str::contains("No documents found"));

    assert_eq!(fs::read_to_string(&out).unwrap(), HEADER);
}

#[test]
fn test_batch_skips_undecodable_documents() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels");
    fs::create_dir(&labels).unwrap();
    fs::write(labels.join("broken.pdf"), b"this is not a pdf").unwrap();
    fs::write(labels.join("notes.txt"), b"Order ID: SA123456789").unwrap();

    shipx(tmp.path())
        .arg("extract")
        .arg(&labels)
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipped 1 documents:"))
        .stderr(predicate::str::contains("broken.pdf"));

    assert_eq!(fs::read_to_string(tmp.path().join("output.csv")).unwrap(), HEADER);
}

#[test]
fn test_single_document_failure_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let label = tmp.path().join("broken.pdf");
    fs::write(&label, b"this is not a pdf").unwrap();

    shipx(tmp.path())
        .arg("extract")
        .arg(&label)
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.pdf"));

    assert!(!tmp.path().join("output.csv").exists());
}

#[test]
fn test_no_export_leaves_no_file() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels");
    fs::create_dir(&labels).unwrap();

    shipx(tmp.path())
        .arg("extract")
        .arg(&labels)
        .args(["--no-export", "--format", "csv"])
        .assert()
        .success()
        .stdout(HEADER);

    assert!(!tmp.path().join("output.csv").exists());
}

#[test]
fn test_json_format() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels");
    fs::create_dir(&labels).unwrap();

    let assert = shipx(tmp.path())
        .arg("extract")
        .arg(&labels)
        .args(["--no-export", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["status"], "no_documents_found");
    assert_eq!(value["orders"], serde_json::json!([]));
    assert_eq!(value["skipped"], serde_json::json!([]));
}

#[test]
fn test_config_path() {
    let tmp = TempDir::new().unwrap();

    shipx(tmp.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file:"))
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn test_config_init_then_use() {
    let tmp = TempDir::new().unwrap();
    let labels = tmp.path().join("labels");
    fs::create_dir(&labels).unwrap();

    shipx(tmp.path())
        .args(["config", "init", "--output", "custom.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(tmp.path().join("custom.json").exists());

    shipx(tmp.path())
        .args(["config", "init", "--output", "custom.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    shipx(tmp.path())
        .args(["--config", "custom.json", "config", "set", "export.delimiter", ";"])
        .assert()
        .success();

    shipx(tmp.path())
        .args(["--config", "custom.json", "extract"])
        .arg(&labels)
        .args(["--output", "semi.csv"])
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(tmp.path().join("semi.csv")).unwrap(),
        "Order Number;Tracking Number;Due Date;Trade-In Devices\n"
    );
}

#[test]
fn test_config_get() {
    let tmp = TempDir::new().unwrap();

    shipx(tmp.path())
        .args(["config", "get", "batch.extension"])
        .assert()
        .success()
        .stdout("\"pdf\"\n");

    shipx(tmp.path())
        .args(["config", "get", "extraction.rules.0.field"])
        .assert()
        .success()
        .stdout("\"order_id\"\n");

    shipx(tmp.path())
        .args(["config", "get", "batch.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn test_config_set_rejects_unusable_rules() {
    let tmp = TempDir::new().unwrap();

    shipx(tmp.path())
        .args(["config", "init", "--output", "c.json"])
        .assert()
        .success();

    // A pattern without a capture group cannot yield a value
    shipx(tmp.path())
        .args(["--config", "c.json", "config", "set", "extraction.rules.0.pattern", "Order ID"])
        .assert()
        .failure();

    shipx(tmp.path())
        .args(["--config", "c.json", "config", "get", "extraction.rules.0.pattern"])
        .assert()
        .success()
        .stdout(predicate::str::contains("SA"));
}
