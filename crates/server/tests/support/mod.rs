#![forbid(unsafe_code)]
#![allow(dead_code)]

use serde_json::{Value, json};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tv_core::ItemId;
use tv_storage::SqliteStore;

pub(crate) struct Server {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    storage_dir: PathBuf,
    next_id: i64,
}

impl Server {
    /// Starts a server over a fresh store with the given catalog items registered.
    pub(crate) fn start_with_items(test_name: &str, items: &[i64]) -> Self {
        let storage_dir = temp_dir(test_name);
        {
            let mut store = SqliteStore::open(&storage_dir).expect("open store");
            for raw in items {
                let item = ItemId::try_new(*raw).expect("item id");
                store.item_register(item).expect("register item");
            }
        }

        let mut child = Command::new(env!("CARGO_BIN_EXE_tv_server"))
            .arg("--storage-dir")
            .arg(&storage_dir)
            .env("TAGVOTE_LOG", "warn")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .expect("spawn tv_server");

        let stdin = child.stdin.take().expect("stdin");
        let stdout = BufReader::new(child.stdout.take().expect("stdout"));

        Self {
            child,
            stdin,
            stdout,
            storage_dir,
            next_id: 1,
        }
    }

    pub(crate) fn send_line(&mut self, line: &str) {
        writeln!(self.stdin, "{line}").expect("write request");
        self.stdin.flush().expect("flush request");
    }

    pub(crate) fn send(&mut self, req: Value) {
        self.send_line(&req.to_string());
    }

    pub(crate) fn recv(&mut self) -> Value {
        let mut line = String::new();
        self.stdout.read_line(&mut line).expect("read response");
        assert!(!line.trim().is_empty(), "empty response line");
        serde_json::from_str(&line).expect("parse response json")
    }

    pub(crate) fn request(&mut self, req: Value) -> Value {
        self.send(req);
        self.recv()
    }

    /// Sends `method` with a fresh id and returns the whole response envelope.
    pub(crate) fn call(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;
        let resp = self.request(json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        }));
        assert_eq!(resp.get("id"), Some(&json!(id)), "response id mismatch");
        resp
    }

    /// Like `call`, but unwraps `result` and fails the test on an error response.
    pub(crate) fn call_ok(&mut self, method: &str, params: Value) -> Value {
        let resp = self.call(method, params);
        match resp.get("result") {
            Some(result) => result.clone(),
            None => panic!("{method} failed: {resp}"),
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.storage_dir);
    }
}

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("tv_server_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

pub(crate) fn auth(user_id: i64) -> Value {
    json!({ "user_id": user_id })
}

pub(crate) fn assert_error(resp: &Value, expected_code: i64, expected_kind: &str) {
    let error = resp.get("error").unwrap_or_else(|| panic!("expected error: {resp}"));
    assert_eq!(
        error.get("code").and_then(|v| v.as_i64()),
        Some(expected_code),
        "{resp}"
    );
    assert_eq!(
        error
            .get("data")
            .and_then(|v| v.get("kind"))
            .and_then(|v| v.as_str()),
        Some(expected_kind),
        "{resp}"
    );
}

pub(crate) fn tag_names(result: &Value) -> Vec<String> {
    result
        .get("tags")
        .and_then(|v| v.as_array())
        .expect("tags array")
        .iter()
        .map(|tag| tag["name"].as_str().expect("tag name").to_string())
        .collect()
}
