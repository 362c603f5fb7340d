//! Multi-format ingestion through the compiled binary: DOCX, PDF, JSON,
//! and Latin-1 text fixtures are built by hand so no binary test assets
//! live in the repository.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn secrag_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.push("secrag");
    path
}

fn setup_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();
    fs::create_dir_all(root.join("files")).unwrap();

    let config_content = format!(
        r#"[store]
path = "{}/data/secrag.jsonl"
"#,
        root.display()
    );
    let config_path = root.join("secrag.toml");
    fs::write(&config_path, config_content).unwrap();
    (tmp, config_path)
}

fn run_secrag(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = secrag_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run secrag: {}", e));
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Minimal docx (ZIP) whose word/document.xml carries the given phrase.
fn minimal_docx_with_text(phrase: &str) -> Vec<u8> {
    use std::io::Write;
    let mut buf = Vec::new();
    {
        let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
        zip.start_file(
            "word/document.xml",
            zip::write::SimpleFileOptions::default(),
        )
        .unwrap();
        let xml = format!(
            "<?xml version=\"1.0\"?><w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>",
            phrase
        );
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }
    buf
}

#[test]
fn file_support_docx_ingest_and_search() {
    let (tmp, config_path) = setup_env();
    let doc = tmp.path().join("files").join("playbook.docx");
    fs::write(
        &doc,
        minimal_docx_with_text("Ransomware containment playbook for the security team"),
    )
    .unwrap();

    let (stdout, stderr, success) = run_secrag(&config_path, &["add", doc.to_str().unwrap()]);
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("chunks written: 1"), "got: {}", stdout);

    let (search_out, _, success) = run_secrag(&config_path, &["search", "ransomware security"]);
    assert!(success);
    assert!(
        search_out.contains("playbook.docx"),
        "docx content should be searchable, got: {}",
        search_out
    );
}

#[test]
fn file_support_corrupt_docx_fails_cleanly() {
    let (tmp, config_path) = setup_env();
    let doc = tmp.path().join("files").join("bad.docx");
    fs::write(&doc, b"not a zip archive").unwrap();

    let (_, stderr, success) = run_secrag(&config_path, &["add", doc.to_str().unwrap()]);
    assert!(!success, "corrupt docx must fail");
    assert!(
        stderr.contains("extraction failed"),
        "should report extraction failure, got: {}",
        stderr
    );

    // Nothing was committed.
    let (stats, _, _) = run_secrag(&config_path, &["stats"]);
    assert!(stats.contains("Chunks:      0"));
}

#[test]
fn file_support_corrupt_pdf_fails_cleanly() {
    let (tmp, config_path) = setup_env();
    let doc = tmp.path().join("files").join("bad.pdf");
    fs::write(&doc, b"%PDF-1.4 truncated garbage").unwrap();

    let (_, stderr, success) = run_secrag(&config_path, &["add", doc.to_str().unwrap()]);
    assert!(!success, "corrupt pdf must fail");
    assert!(stderr.contains("extraction failed"), "got: {}", stderr);
}

#[test]
fn file_support_latin1_text() {
    let (tmp, config_path) = setup_env();
    let doc = tmp.path().join("files").join("resume.txt");
    // "café sécurité" in Latin-1, invalid as UTF-8.
    fs::write(
        &doc,
        b"Malware incident r\xe9sum\xe9 from the s\xe9curit\xe9 review team",
    )
    .unwrap();

    let (stdout, stderr, success) = run_secrag(&config_path, &["add", doc.to_str().unwrap()]);
    assert!(
        success,
        "Latin-1 text must not be rejected for encoding: stdout={}, stderr={}",
        stdout, stderr
    );

    let (search_out, _, _) = run_secrag(&config_path, &["search", "malware"]);
    assert!(search_out.contains("resume.txt"), "got: {}", search_out);
}

#[test]
fn file_support_json_document() {
    let (tmp, config_path) = setup_env();
    let doc = tmp.path().join("files").join("alert.json");
    fs::write(
        &doc,
        br#"{"alert": "intrusion detected", "severity": "high", "source": "perimeter firewall"}"#,
    )
    .unwrap();

    let (stdout, stderr, success) = run_secrag(&config_path, &["add", doc.to_str().unwrap()]);
    assert!(success, "stdout={}, stderr={}", stdout, stderr);

    let (search_out, _, _) = run_secrag(&config_path, &["search", "intrusion firewall"]);
    assert!(
        search_out.contains("alert.json"),
        "JSON keys/values should be searchable, got: {}",
        search_out
    );
}

#[test]
fn file_support_malformed_json_fails_cleanly() {
    let (tmp, config_path) = setup_env();
    let doc = tmp.path().join("files").join("bad.json");
    fs::write(&doc, b"{\"truncated\": ").unwrap();

    let (_, stderr, success) = run_secrag(&config_path, &["add", doc.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("extraction failed"), "got: {}", stderr);
}
