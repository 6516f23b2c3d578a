use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

const RSA_KID: &str = "vOG9pwNJN3SPRH1KMeskSzy-RYMu32x3xCGAFWS9A6A";

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn jwks_gen(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jwks-gen"))
        .current_dir(cwd)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run jwks-gen")
}

fn dir_entries(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

#[test]
fn writes_jwks_and_prints_kid() {
    let temp_dir = tempfile::tempdir().unwrap();
    let key = fixture("rsa2048.pem");

    let output = jwks_gen(
        temp_dir.path(),
        &[key.to_str().unwrap(), "-jwks", "out.jwks.json"],
    );
    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8(output.stdout).unwrap(), format!("{RSA_KID}\n"));

    let contents = fs::read_to_string(temp_dir.path().join("out.jwks.json")).unwrap();
    assert!(contents.starts_with("{ \"keys\":[ {\"kty\":\"RSA\",\"n\":\""));
    assert!(contents.ends_with("}]}"));

    let document: Value = serde_json::from_str(&contents).unwrap();
    let object = document.as_object().unwrap();
    assert_eq!(object.len(), 1);
    let keys = object["keys"].as_array().unwrap();
    assert_eq!(keys.len(), 1);

    let jwk = keys[0].as_object().unwrap();
    assert_eq!(jwk["kty"], "RSA");
    assert_eq!(jwk["e"], "AQAB");
    assert_eq!(jwk["kid"], RSA_KID);
    assert!(!jwk.contains_key("d"));
}

#[test]
fn double_dash_flag_is_accepted() {
    let temp_dir = tempfile::tempdir().unwrap();
    let key = fixture("ed25519.pem");
    let out = temp_dir.path().join("nested.json");

    let output = jwks_gen(
        temp_dir.path(),
        &[key.to_str().unwrap(), "--jwks", out.to_str().unwrap()],
    );
    assert!(output.status.success(), "{output:?}");
    assert!(out.is_file());
}

#[test]
fn no_file_without_jwks_flag() {
    let temp_dir = tempfile::tempdir().unwrap();
    let key = fixture("rsa2048.pem");

    let output = jwks_gen(temp_dir.path(), &[key.to_str().unwrap()]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), RSA_KID);
    assert_eq!(dir_entries(temp_dir.path()), 0);
}

#[test]
fn kid_is_stable_across_runs() {
    let temp_dir = tempfile::tempdir().unwrap();
    let key = fixture("rsa2048-pkcs1.pem");

    let first = jwks_gen(temp_dir.path(), &[key.to_str().unwrap()]);
    let second = jwks_gen(temp_dir.path(), &[key.to_str().unwrap()]);
    assert!(first.status.success() && second.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert_eq!(String::from_utf8(first.stdout).unwrap().trim(), RSA_KID);
}

#[test]
fn missing_key_fails_without_output() {
    let temp_dir = tempfile::tempdir().unwrap();

    let output = jwks_gen(temp_dir.path(), &["missing.pem", "-jwks", "out.json"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8(output.stderr).unwrap().contains("missing.pem"));
    assert_eq!(dir_entries(temp_dir.path()), 0);
}

#[test]
fn truncated_key_fails_with_parse_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let key = fixture("truncated.pem");

    let output = jwks_gen(
        temp_dir.path(),
        &[key.to_str().unwrap(), "-jwks", "out.json"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8(output.stderr).unwrap().contains("parse"));
    assert_eq!(dir_entries(temp_dir.path()), 0);
}

#[test]
fn unwritable_destination_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let key = fixture("rsa2048.pem");

    let output = jwks_gen(
        temp_dir.path(),
        &[key.to_str().unwrap(), "-jwks", "no/such/dir/out.json"],
    );
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8(output.stderr).unwrap().contains("cannot write JWKS file"));
    assert_eq!(dir_entries(temp_dir.path()), 0);
}

#[test]
fn missing_key_argument_is_a_usage_error() {
    let temp_dir = tempfile::tempdir().unwrap();

    let output = jwks_gen(temp_dir.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn public_key_input_prints_the_private_key_kid() {
    let temp_dir = tempfile::tempdir().unwrap();
    let key = fixture("rsa2048-pkcs1-public.pem");

    let output = jwks_gen(
        temp_dir.path(),
        &[key.to_str().unwrap(), "-jwks", "out.json"],
    );
    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), RSA_KID);
    assert!(temp_dir.path().join("out.json").is_file());
}

#[test]
fn binary_der_key_fails_with_parse_error() {
    let temp_dir = tempfile::tempdir().unwrap();
    let key = fixture("rsa2048.der");

    let output = jwks_gen(
        temp_dir.path(),
        &[key.to_str().unwrap(), "-jwks", "out.json"],
    );
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to parse key"), "{stderr}");
    assert!(!stderr.contains("cannot read key file"), "{stderr}");
    assert_eq!(dir_entries(temp_dir.path()), 0);
}
