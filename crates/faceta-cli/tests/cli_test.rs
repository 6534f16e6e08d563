//! CLI integration tests

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn faceta() -> Command {
    Command::cargo_bin("faceta").expect("binary exists")
}

#[test]
fn inspect_file_emits_turtle_with_hash_node() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("hi.txt");
    std::fs::write(&input, b"hi\n").unwrap();

    faceta()
        .args(["inspect", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("urn:md5:764EFA883DDA1E11DB47671C4A3BBD9E"))
        .stdout(predicate::str::contains("@prefix nfo:"))
        .stdout(predicate::str::contains("dk76iD3aHhHbR2ccSju9ng=="));
}

#[test]
fn inspect_zip_writes_ntriples_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("test.zip");
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("hello.txt", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"hi").unwrap();
    let bytes = writer.finish().unwrap().into_inner();
    std::fs::write(&input, bytes).unwrap();

    let output = dir.path().join("out.nt");
    faceta()
        .args([
            "inspect",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--syntax",
            "ntriples",
        ])
        .assert()
        .success();

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("belongsToContainer"));
    assert!(text.contains("#hello.txt"));
    // one statement per line, all terminated
    assert!(text.lines().all(|line| line.ends_with(" .")));
}

#[test]
fn missing_input_is_an_io_error() {
    faceta()
        .args(["inspect", "/nonexistent/nowhere.bin"])
        .assert()
        .code(2);
}

#[test]
fn unknown_hash_algorithm_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("x.txt");
    std::fs::write(&input, b"x").unwrap();

    faceta()
        .args(["inspect", input.to_str().unwrap(), "--hash", "sha512"])
        .assert()
        .code(3);
}

#[test]
fn unreadable_query_file_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("x.txt");
    std::fs::write(&input, b"x").unwrap();

    faceta()
        .args([
            "inspect",
            input.to_str().unwrap(),
            "--query",
            "/nonexistent/query.rq",
            "--extract-dir",
            dir.path().to_str().unwrap(),
        ])
        .assert()
        .code(3);
}

#[test]
fn formats_lists_the_builtin_set() {
    faceta()
        .arg("formats")
        .assert()
        .success()
        .stdout(predicate::str::contains("application/zip"))
        .stdout(predicate::str::contains("md5"))
        .stdout(predicate::str::contains("blake3"));
}
