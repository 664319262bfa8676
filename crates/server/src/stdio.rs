#![forbid(unsafe_code)]

use crate::{JsonRpcRequest, TagServer, json_rpc_error};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};

fn write_newline_json(
    stdout: &mut impl Write,
    resp: &Value,
) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer(&mut *stdout, resp)?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}

/// Serves newline-delimited JSON-RPC until stdin closes.
pub(crate) fn run_stdio(server: &mut TagServer) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = std::io::stdout().lock();

    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        let raw = line.trim();
        if raw.is_empty() {
            continue;
        }
        handle_newline_request(server, &mut stdout, raw)?;
    }

    tracing::info!("stdin closed; shutting down");
    Ok(())
}

fn handle_newline_request(
    server: &mut TagServer,
    stdout: &mut impl Write,
    raw: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let data: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            let resp = json_rpc_error(None, -32700, &format!("Parse error: {e}"));
            return write_newline_json(stdout, &resp);
        }
    };

    let (id, has_method) = match data.as_object() {
        Some(obj) => (obj.get("id").cloned(), obj.contains_key("method")),
        None => {
            let resp = json_rpc_error(None, -32600, "Invalid Request");
            return write_newline_json(stdout, &resp);
        }
    };
    if !has_method {
        let resp = json_rpc_error(id, -32600, "Invalid Request");
        return write_newline_json(stdout, &resp);
    }

    let request: JsonRpcRequest = match serde_json::from_value(data) {
        Ok(v) => v,
        Err(e) => {
            let resp = json_rpc_error(id, -32600, &format!("Invalid Request: {e}"));
            return write_newline_json(stdout, &resp);
        }
    };

    if let Some(resp) = server.handle(request) {
        write_newline_json(stdout, &resp)?;
    }
    Ok(())
}
