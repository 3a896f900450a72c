#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::TempDir;

/// Request as seen by the loopback responder.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Answers at most one HTTP request with a canned response.
pub struct MockServer {
    pub url: String,
    stop: Arc<AtomicBool>,
    handle: JoinHandle<Option<CapturedRequest>>,
}

impl MockServer {
    pub fn respond(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        listener.set_nonblocking(true).expect("nonblocking listener");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let body = body.to_string();

        let handle = thread::spawn(move || loop {
            match listener.accept() {
                Ok((stream, _)) => return Some(handle_one(stream, status, &body)),
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if flag.load(Ordering::SeqCst) {
                        return None;
                    }
                    thread::sleep(Duration::from_millis(10));
                }
                Err(e) => panic!("accept failed: {e}"),
            }
        });

        MockServer { url, stop, handle }
    }

    /// Stop listening and return the request, if one arrived.
    pub fn finish(self) -> Option<CapturedRequest> {
        self.stop.store(true, Ordering::SeqCst);
        self.handle.join().expect("mock server thread")
    }
}

fn handle_one(mut stream: TcpStream, status: u16, body: &str) -> CapturedRequest {
    stream.set_nonblocking(false).expect("blocking stream");
    stream
        .set_read_timeout(Some(Duration::from_secs(10)))
        .expect("read timeout");

    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).expect("read request head");
        assert!(n > 0, "connection closed before request head");
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut request_body = buf[header_end + 4..].to_vec();
    while request_body.len() < content_length {
        let n = stream.read(&mut chunk).expect("read request body");
        assert!(n > 0, "connection closed before request body");
        request_body.extend_from_slice(&chunk[..n]);
    }

    let response = format!(
        "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        reason(status),
        body.len()
    );
    stream.write_all(response.as_bytes()).expect("write response");
    stream.flush().expect("flush response");

    CapturedRequest {
        request_line,
        headers,
        body: String::from_utf8(request_body).expect("utf-8 request body"),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Scratch working directory with a clean environment for the binary.
pub struct TestEnv {
    tmp: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        TestEnv {
            tmp: TempDir::new().expect("create temp dir"),
        }
    }

    pub fn dir(&self) -> PathBuf {
        self.tmp.path().to_path_buf()
    }

    pub fn write_rules(&self, name: &str, text: &str) -> PathBuf {
        let path = self.tmp.path().join(name);
        fs::write(&path, text).expect("write rules file");
        path
    }

    /// Create an empty directory under the scratch dir.
    pub fn subdir(&self, name: &str) -> PathBuf {
        let path = self.tmp.path().join(name);
        fs::create_dir_all(&path).expect("create subdir");
        path
    }

    /// A `gcloud` stand-in that fails the way an expired login does.
    #[cfg(unix)]
    pub fn failing_gcloud(&self) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.subdir("bin").join("gcloud");
        fs::write(
            &path,
            "#!/bin/sh\necho 'Reauthentication failed.' >&2\nexit 1\n",
        )
        .expect("write fake gcloud");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod fake gcloud");
        path
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("deploy-rules").expect("binary built");
        cmd.current_dir(self.tmp.path())
            .env_remove("FIREBASE_PROJECT")
            .env_remove("FIRESTORE_RULES")
            .env_remove("FIREBASE_RULES_ENDPOINT")
            .env_remove("FIREBASE_ACCESS_TOKEN")
            .env_remove("RUST_LOG")
            .env_remove("CLOUDSDK_CONFIG")
            .env("NO_PROXY", "127.0.0.1,localhost");
        cmd
    }
}

/// An endpoint nothing is listening on.
pub fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}
