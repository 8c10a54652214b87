//! Integration tests for Zipline
//!
//! End-to-end scenarios run the real binary against a loopback HTTP
//! fixture server and a temporary cache root, so no test touches the
//! network or the user's cache.

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::thread::JoinHandle;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

fn zipline() -> Command {
    cargo_bin_cmd!("zipline")
}

/// Build a zip bundle from (name, contents) pairs
fn build_bundle(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(contents.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A bundle whose entrypoint exits with `code`
fn exit_bundle(code: i32) -> Vec<u8> {
    build_bundle(&[("run.sh", &format!("#!/bin/sh\nexit {code}\n"))])
}

fn sha256_hex(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

/// Serve `payload` for `requests` sequential GETs on a loopback port.
///
/// Returns the bundle URL and the server thread handle.
fn serve_bundle(
    payload: Vec<u8>,
    etag: Option<&str>,
    requests: usize,
) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let etag_header = etag
        .map(|tag| format!("ETag: \"{tag}\"\r\n"))
        .unwrap_or_default();

    let handle = std::thread::spawn(move || {
        for _ in 0..requests {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
                payload.len(),
                etag_header
            );
            stream.write_all(header.as_bytes()).unwrap();
            stream.write_all(&payload).unwrap();
        }
    });

    (format!("http://{}/bundle.zip", addr), handle)
}

/// A loopback URL that refuses connections
fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/bundle.zip", addr)
}

/// Tag directories currently present under a cache root
fn tag_dirs(root: &std::path::Path) -> Vec<String> {
    let mut tags: Vec<String> = std::fs::read_dir(root)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .filter_map(|e| e.file_name().into_string().ok())
                .collect()
        })
        .unwrap_or_default();
    tags.sort();
    tags
}

mod cli_tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn help_displays() {
        zipline()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Self-Updating Zip-Bundle Launcher"));
    }

    #[test]
    fn version_displays() {
        zipline()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("zipline"));
    }

    #[test]
    fn network_failure_exits_1() {
        let cache = tempfile::TempDir::new().unwrap();
        zipline()
            .args(["--bundle-url", &refused_url()])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Failed to fetch bundle"));
    }

    #[test]
    fn invalid_config_exits_4() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "this is not toml ===").unwrap();

        zipline()
            .args(["--config".as_ref(), config.as_os_str()])
            .assert()
            .code(4)
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}

mod pipeline_tests {
    use super::*;
    use predicates::prelude::*;

    #[test]
    fn digest_mismatch_exits_2_and_installs_nothing() {
        let payload = exit_bundle(0);
        let (url, server) = serve_bundle(payload, Some("v1"), 1);
        let cache = tempfile::TempDir::new().unwrap();

        zipline()
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &"ab".repeat(32)])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("SHA256 mismatch"));

        assert!(tag_dirs(cache.path()).is_empty());
        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn first_run_adopts_child_exit_code_and_keeps_install() {
        let payload = exit_bundle(7);
        let digest = sha256_hex(&payload);
        let (url, server) = serve_bundle(payload, Some("v1"), 1);
        let cache = tempfile::TempDir::new().unwrap();

        zipline()
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(7);

        assert_eq!(tag_dirs(cache.path()), vec!["v1"]);
        assert!(cache.path().join("v1/run.sh").is_file());
        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn empty_expected_sha_disables_verification() {
        let payload = exit_bundle(0);
        let (url, server) = serve_bundle(payload, Some("skipcheck"), 1);
        let cache = tempfile::TempDir::new().unwrap();

        zipline()
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", ""])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(0);

        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn digest_prefix_tag_used_without_validators() {
        let payload = exit_bundle(0);
        let digest = sha256_hex(&payload);
        let (url, server) = serve_bundle(payload, None, 1);
        let cache = tempfile::TempDir::new().unwrap();

        zipline()
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(0);

        assert_eq!(tag_dirs(cache.path()), vec![digest[..12].to_string()]);
        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn ephemeral_removes_install_after_run() {
        let payload = exit_bundle(0);
        let digest = sha256_hex(&payload);
        let (url, server) = serve_bundle(payload, Some("gone"), 1);
        let cache = tempfile::TempDir::new().unwrap();

        zipline()
            .arg("--ephemeral")
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(0);

        assert!(tag_dirs(cache.path()).is_empty());
        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn fourth_tag_evicts_the_oldest() {
        let payload = exit_bundle(0);
        let digest = sha256_hex(&payload);
        let (url, server) = serve_bundle(payload, Some("zzz-latest"), 1);
        let cache = tempfile::TempDir::new().unwrap();
        for stale in ["0001", "0002", "0003"] {
            std::fs::create_dir(cache.path().join(stale)).unwrap();
        }

        zipline()
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(0);

        assert_eq!(tag_dirs(cache.path()), vec!["0002", "0003", "zzz-latest"]);
        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn reused_install_is_not_re_extracted() {
        let payload = exit_bundle(0);
        let digest = sha256_hex(&payload);
        let (url, server) = serve_bundle(payload, Some("stable"), 2);
        let cache = tempfile::TempDir::new().unwrap();

        zipline()
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(0);

        // Plant a marker; the fast path must leave it untouched
        let marker = cache.path().join("stable/marker.txt");
        std::fs::write(&marker, b"untouched").unwrap();

        zipline()
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(0);

        assert!(marker.is_file());
        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn force_reinstall_replaces_install() {
        let payload = exit_bundle(0);
        let digest = sha256_hex(&payload);
        let (url, server) = serve_bundle(payload, Some("stable"), 2);
        let cache = tempfile::TempDir::new().unwrap();

        zipline()
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(0);

        let marker = cache.path().join("stable/marker.txt");
        std::fs::write(&marker, b"stale").unwrap();

        zipline()
            .arg("--force-reinstall")
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(0);

        assert!(!marker.exists());
        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn no_entrypoint_exits_3() {
        let payload = build_bundle(&[("notes.txt", "nothing runnable here")]);
        let digest = sha256_hex(&payload);
        let (url, server) = serve_bundle(payload, Some("v1"), 1);
        let cache = tempfile::TempDir::new().unwrap();

        zipline()
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("No runnable entrypoint"));

        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn trailing_args_reach_the_child() {
        let bundle = build_bundle(&[(
            "run.sh",
            "#!/bin/sh\necho \"$@\" > \"$ZIPLINE_TEST_OUT\"\n",
        )]);
        let digest = sha256_hex(&bundle);
        let (url, server) = serve_bundle(bundle, Some("argv"), 1);
        let cache = tempfile::TempDir::new().unwrap();
        let out = cache.path().join("argv.txt");

        zipline()
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .args(["--", "check", "--fast", "-x"])
            .env("ZIPLINE_TEST_OUT", &out)
            .assert()
            .code(0);

        assert_eq!(
            std::fs::read_to_string(&out).unwrap().trim(),
            "check --fast -x"
        );
        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn entrypoint_found_under_dist() {
        let bundle = build_bundle(&[
            ("README.md", "docs only at the root"),
            ("dist/run.sh", "#!/bin/sh\nexit 0\n"),
        ]);
        let digest = sha256_hex(&bundle);
        let (url, server) = serve_bundle(bundle, Some("nested"), 1);
        let cache = tempfile::TempDir::new().unwrap();

        zipline()
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(0);

        server.join().unwrap();
    }
}

mod config_tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn config_file_supplies_bundle_settings() {
        let payload = exit_bundle(0);
        let digest = sha256_hex(&payload);
        let (url, server) = serve_bundle(payload, Some("from-config"), 1);
        let cache = tempfile::TempDir::new().unwrap();

        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(
            &config,
            format!(
                "[bundle]\nurl = \"{url}\"\nsha256 = \"{digest}\"\n\n[cache]\nroot = \"{}\"\n",
                cache.path().display()
            ),
        )
        .unwrap();

        zipline()
            .args(["--config".as_ref(), config.as_os_str()])
            .assert()
            .code(0);

        assert_eq!(tag_dirs(cache.path()), vec!["from-config"]);
        server.join().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn config_keep_count_controls_eviction() {
        let payload = exit_bundle(0);
        let digest = sha256_hex(&payload);
        let (url, server) = serve_bundle(payload, Some("zz-new"), 1);
        let cache = tempfile::TempDir::new().unwrap();
        for stale in ["0001", "0002"] {
            std::fs::create_dir(cache.path().join(stale)).unwrap();
        }

        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        std::fs::write(&config, "[cache]\nkeep = 1\n").unwrap();

        zipline()
            .args(["--config".as_ref(), config.as_os_str()])
            .args(["--bundle-url", &url])
            .args(["--expected-sha256", &digest])
            .args(["--cache-root".as_ref(), cache.path().as_os_str()])
            .assert()
            .code(0);

        assert_eq!(tag_dirs(cache.path()), vec!["zz-new"]);
        server.join().unwrap();
    }
}
