use flate2::write::GzEncoder;
use flate2::Compression;
use insbin::{BufferStrategy, InsbinError, Installer, InstallerConfig, SilentReporter};
use mockito::{Mock, Server, ServerGuard};
use pretty_assertions::assert_eq;
use sha2::{Digest, Sha256};
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use test_log::test;

const APP_SCRIPT: &[u8] = b"#!/bin/sh\nprintf 'hello\\n'\nprintf 'world\\n'\nexit 3\n";

fn archive(files: &[(&str, &[u8], u32)]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, data, mode) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        builder.append_data(&mut header, path, *data).unwrap();
    }
    let raw = builder.into_inner().unwrap();
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(&raw).unwrap();
    enc.finish().unwrap()
}

fn app_archive() -> Vec<u8> {
    archive(&[("app", APP_SCRIPT, 0o755), ("LICENSE", b"MIT", 0o644)])
}

fn serve(server: &mut ServerGuard, body: Vec<u8>, hits: usize) -> Mock {
    server
        .mock("GET", "/releases/app-v1.tar.gz")
        .with_status(200)
        .with_body(body)
        .expect(hits)
        .create()
}

fn config(server: &ServerGuard, root: &Path) -> InstallerConfig {
    InstallerConfig::new(
        &format!("{}/releases/app-v1.tar.gz", server.url()),
        root,
        "app",
    )
    .unwrap()
    .with_tick_interval(Duration::from_millis(20))
}

fn installer(cfg: InstallerConfig) -> Installer {
    Installer::new(cfg).with_reporter(Box::new(SilentReporter))
}

#[test]
fn install_then_resolve_binary() {
    let mut server = Server::new();
    let m = serve(&mut server, app_archive(), 1);
    let td = tempfile::tempdir().unwrap();
    let root = td.path().join(".app");

    let mut ins = installer(config(&server, &root));
    assert!(!ins.is_installed());
    ins.install().unwrap();
    assert!(ins.is_installed());

    let path = ins.resolve_binary_path().unwrap();
    assert_eq!(path, root.join("bin").join("app"));
    assert!(path.is_file());
    assert_eq!(std::fs::read_to_string(root.join("bin/LICENSE")).unwrap(), "MIT");

    let status = ins.status();
    assert!(status.installed);
    assert!(status.binary_exists);
    #[cfg(unix)]
    assert!(status.executable);
    m.assert();
}

#[test]
fn second_install_is_a_noop() {
    let mut server = Server::new();
    let m = serve(&mut server, app_archive(), 1);
    let td = tempfile::tempdir().unwrap();

    let mut ins = installer(config(&server, td.path()));
    ins.install().unwrap();
    ins.install().unwrap();

    // A fresh instance over the same directory does not fetch either.
    let mut again = installer(config(&server, td.path()));
    again.install().unwrap();
    again.resolve_binary_path().unwrap();
    m.assert();
}

#[test]
fn install_replaces_unrelated_root_contents() {
    let mut server = Server::new();
    let _m = serve(&mut server, app_archive(), 1);
    let td = tempfile::tempdir().unwrap();
    let root = td.path().join("existing");
    std::fs::create_dir_all(root.join("stale/nested")).unwrap();
    std::fs::write(root.join("notes.txt"), "old").unwrap();

    installer(config(&server, &root)).install().unwrap();

    let mut names: Vec<String> = std::fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["bin".to_string()]);
}

#[test]
fn corrupted_archive_is_not_installed() {
    let mut server = Server::new();
    let mut raw = {
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(APP_SCRIPT.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, "app", APP_SCRIPT).unwrap();
        builder.into_inner().unwrap()
    };
    raw.truncate(raw.len() - 1024);
    raw.extend_from_slice(&[0xAB; 512]);
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(&raw).unwrap();
    let m = serve(&mut server, enc.finish().unwrap(), 2);

    let td = tempfile::tempdir().unwrap();
    let mut ins = installer(config(&server, td.path()));
    let err = ins.install().unwrap_err();
    assert!(matches!(err, InsbinError::Extraction { .. }), "{err}");
    assert!(!ins.is_installed());
    assert!(!td.path().join("bin").exists());

    // The failed attempt is not mistaken for an installation.
    assert!(ins.install().is_err());
    m.assert();
}

#[test]
fn http_error_surfaces_status() {
    let mut server = Server::new();
    let _m = server
        .mock("GET", "/releases/app-v1.tar.gz")
        .with_status(404)
        .create();
    let td = tempfile::tempdir().unwrap();

    let mut ins = installer(config(&server, td.path()));
    match ins.install() {
        Err(InsbinError::DownloadStatus { status, .. }) => assert_eq!(status, 404),
        other => panic!("expected DownloadStatus, got {other:?}"),
    }
    assert!(!ins.is_installed());
}

#[test]
fn body_failure_mid_transfer_is_not_installed() {
    let mut server = Server::new();
    let _m = server
        .mock("GET", "/releases/app-v1.tar.gz")
        .with_chunked_body(|w| {
            w.write_all(b"partial")?;
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "upstream went away",
            ))
        })
        .create();
    let td = tempfile::tempdir().unwrap();

    let mut ins = installer(config(&server, td.path()));
    assert!(matches!(ins.install(), Err(InsbinError::Download { .. })));
    assert!(!ins.is_installed());
    assert!(!td.path().join("bin").exists());
}

#[test]
fn checksum_is_verified() {
    let body = app_archive();
    let digest = hex::encode(Sha256::digest(&body));

    let mut server = Server::new();
    let _m = serve(&mut server, body, 2);
    let td = tempfile::tempdir().unwrap();

    let mut bad = installer(config(&server, td.path()).with_sha256("00".repeat(32)));
    assert!(matches!(bad.install(), Err(InsbinError::Download { .. })));
    assert!(!bad.is_installed());

    let mut good = installer(config(&server, td.path()).with_sha256(digest));
    good.install().unwrap();
    assert!(good.is_installed());
}

#[test]
fn temp_file_buffer_installs() {
    let mut server = Server::new();
    let _m = serve(&mut server, app_archive(), 1);
    let td = tempfile::tempdir().unwrap();

    let mut ins = installer(config(&server, td.path()).with_buffer(BufferStrategy::TempFile));
    assert!(ins.resolve_binary_path().unwrap().is_file());
}

#[test]
fn empty_archive_reports_missing_binary() {
    let mut server = Server::new();
    let _m = serve(&mut server, archive(&[]), 1);
    let td = tempfile::tempdir().unwrap();

    let mut ins = installer(config(&server, td.path()));
    ins.install().unwrap();
    assert!(ins.is_installed());
    match ins.resolve_binary_path() {
        Err(InsbinError::BinaryNotFound { name, .. }) => assert_eq!(name, "app"),
        other => panic!("expected BinaryNotFound, got {other:?}"),
    }
}

#[test]
fn invalid_url_is_rejected_before_any_request() {
    let err = InstallerConfig::new("not-a-url", "/tmp/insbin-test", "app").unwrap_err();
    assert!(matches!(err, InsbinError::InvalidConfiguration { .. }));
    assert!(matches!(
        Installer::install_to_home("app", "not-a-url", None),
        Err(InsbinError::InvalidConfiguration { .. })
    ));
}

#[test]
fn install_to_home_prefers_explicit_dir() {
    let td = tempfile::tempdir().unwrap();
    let ins =
        Installer::install_to_home("app", "https://example.com/app.tar.gz", Some(td.path()))
            .unwrap();
    assert_eq!(ins.layout().root(), td.path());
}

#[cfg(unix)]
#[test]
fn run_installs_lazily_and_streams_output() {
    let mut server = Server::new();
    let m = serve(&mut server, app_archive(), 1);
    let td = tempfile::tempdir().unwrap();

    let mut ins = installer(config(&server, td.path()));
    let mut out = Vec::new();
    let res = ins.run_to(["ignored", "args"], &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "hello\nworld\n");
    assert_eq!(res.exit_code, 3);
    assert!(res.streamed);

    // Cached path, no second download.
    let res = ins.run_to(Vec::<String>::new(), &mut Vec::new()).unwrap();
    assert_eq!(res.exit_code, 3);
    m.assert();
}
