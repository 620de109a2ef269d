use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

const QUOTE: [&str; 7] = [
    "ACME Roofing Ltd",
    "info@acme-roofing.co.uk",
    "Quote Ref: AB_123",
    "John Smith",
    "12 High Street",
    "Roof repairs",
    "Total £400",
];

fn docx(lines: &[&str]) -> Vec<u8> {
    let body: String = lines
        .iter()
        .map(|l| format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, l))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

fn document_xml(path: &Path) -> String {
    let mut archive = ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

/// A command with its configuration directory inside `home`.
fn quotefill(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("quotefill").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("HOME", home.path());
    cmd
}

#[test]
fn help_lists_commands() {
    let home = TempDir::new().unwrap();
    quotefill(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fill"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn extract_prints_json_fields() {
    let home = TempDir::new().unwrap();
    let source = home.path().join("quote.docx");
    fs::write(&source, docx(&QUOTE)).unwrap();

    quotefill(&home)
        .arg("extract")
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""reference": "AB_123""#))
        .stdout(predicate::str::contains(r#""amount_raw": "£400""#))
        .stdout(predicate::str::contains(r#""name": "John Smith""#));
}

#[test]
fn extract_writes_csv_file() {
    let home = TempDir::new().unwrap();
    let source = home.path().join("quote.docx");
    let output = home.path().join("fields.csv");
    fs::write(&source, docx(&QUOTE)).unwrap();

    quotefill(&home)
        .args(["extract", "-f", "csv", "-o"])
        .arg(&output)
        .arg(&source)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    assert!(csv.starts_with("reference,date,amount_raw,name,address"));
    assert!(csv.contains("AB_123,,£400,John Smith,12 High Street,,"));
}

#[test]
fn fill_docx_template() {
    let home = TempDir::new().unwrap();
    let source = home.path().join("Quotation_Example.docx");
    let template = home.path().join("T&Cs_Template.docx");
    fs::write(&source, docx(&QUOTE)).unwrap();
    fs::write(
        &template,
        docx(&["Ref: {{figure1}}, Amount: {{figure7}}", "{{figure6}}", "From {{figure8}}"]),
    )
    .unwrap();

    quotefill(&home)
        .arg("fill")
        .arg(&source)
        .arg(&template)
        .args(["--today", "2026-10-19", "--proposed-week", "3/11/26"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"))
        .stdout(predicate::str::contains("figure1"));

    let xml = document_xml(&home.path().join("final_output.docx"));
    assert!(xml.contains("Ref: AB_123, Amount: four hundred pounds and zero pence (£400)"));
    assert!(xml.contains("dated 19th October 2026"));
    assert!(xml.contains("From 3rd November 2026"));
}

#[test]
fn fill_without_reference_fails_without_output() {
    let home = TempDir::new().unwrap();
    let source = home.path().join("quote.docx");
    let template = home.path().join("template.docx");
    let output = home.path().join("out.docx");
    fs::write(&source, docx(&["Total £400"])).unwrap();
    fs::write(&template, docx(&["{{figure1}}"])).unwrap();

    quotefill(&home)
        .arg("fill")
        .arg(&source)
        .arg(&template)
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing required field: reference"));

    assert!(!output.exists());
}

#[test]
fn fill_conversion_failure_keeps_output() {
    let home = TempDir::new().unwrap();
    let source = home.path().join("quote.docx");
    let template = home.path().join("template.docx");
    let output = home.path().join("out.docx");
    let config = home.path().join("quotefill.json");
    fs::write(&source, docx(&QUOTE)).unwrap();
    fs::write(&template, docx(&["{{figure1}}"])).unwrap();
    fs::write(
        &config,
        r#"{"conversion": {"docx": {"program": "quotefill-no-such-converter", "args": ["{input}"]}}}"#,
    )
    .unwrap();

    quotefill(&home)
        .arg("--config")
        .arg(&config)
        .arg("fill")
        .arg(&source)
        .arg(&template)
        .arg("-o")
        .arg(&output)
        .arg("--convert")
        .assert()
        .success()
        .stderr(predicate::str::contains("Conversion failed"));

    assert!(output.exists());
}

#[test]
fn batch_continues_and_writes_summary() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("quotes");
    let out_dir = home.path().join("filled");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("first.docx"), docx(&QUOTE)).unwrap();
    fs::write(inputs.join("second.docx"), docx(&["No reference here"])).unwrap();
    let template = home.path().join("template.docx");
    fs::write(&template, docx(&["{{figure1}}"])).unwrap();

    quotefill(&home)
        .arg("batch")
        .arg(format!("{}/*.docx", inputs.display()))
        .arg(&template)
        .arg("-d")
        .arg(&out_dir)
        .args(["--continue-on-error", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    assert!(out_dir.join("first.docx").exists());
    assert!(!out_dir.join("second.docx").exists());

    let summary = fs::read_to_string(out_dir.join("summary.csv")).unwrap();
    assert!(summary.contains("first.docx,success,AB_123"));
    assert!(summary.contains("second.docx,error"));
}

#[test]
fn batch_keeps_sources_with_same_stem_apart() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("quotes");
    let out_dir = home.path().join("filled");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("quote.docx"), docx(&QUOTE)).unwrap();
    let mut other = QUOTE;
    other[2] = "Quote Ref: ZZ_999";
    fs::write(inputs.join("quote.docm"), docx(&other)).unwrap();
    let template = home.path().join("template.docx");
    fs::write(&template, docx(&["Ref {{figure1}}"])).unwrap();

    quotefill(&home)
        .arg("batch")
        .arg(format!("{}/quote.*", inputs.display()))
        .arg(&template)
        .arg("-d")
        .arg(&out_dir)
        .assert()
        .success();

    assert!(document_xml(&out_dir.join("quote_docx.docx")).contains("Ref AB_123"));
    assert!(document_xml(&out_dir.join("quote_docm.docx")).contains("Ref ZZ_999"));
}

#[test]
fn config_set_rejects_unknown_key() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("config.json");

    quotefill(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.refrence_label", "Our Ref"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown configuration key"));

    assert!(!config.exists());
}

#[test]
fn batch_stops_on_first_error() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("quotes");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("broken.docx"), docx(&["No reference here"])).unwrap();
    let template = home.path().join("template.docx");
    fs::write(&template, docx(&["{{figure1}}"])).unwrap();

    quotefill(&home)
        .arg("batch")
        .arg(format!("{}/*.docx", inputs.display()))
        .arg(&template)
        .arg("-d")
        .arg(home.path().join("filled"))
        .assert()
        .failure();
}

#[test]
fn config_init_get_set() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("settings/config.json");

    quotefill(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    quotefill(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "set", "extraction.reference_label", "Our Ref"])
        .assert()
        .success();

    quotefill(&home)
        .arg("--config")
        .arg(&config)
        .args(["config", "get", "extraction.reference_label"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""Our Ref""#));
}

#[test]
fn config_path_uses_config_dir() {
    let home = TempDir::new().unwrap();
    quotefill(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("quotefill"))
        .stdout(predicate::str::contains("not created"));
}
