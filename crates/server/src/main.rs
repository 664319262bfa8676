#![forbid(unsafe_code)]

mod clock;
mod error;
mod handlers;
mod jsonrpc;
mod logging;
mod runtime;
mod server;
mod stdio;

pub(crate) use error::ApiError;
pub(crate) use jsonrpc::*;
pub(crate) use server::TagServer;

use tv_storage::{SqliteStore, StoreOptions};

const SERVER_NAME: &str = "tagvote";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn usage() -> &'static str {
    "tv_server: tag voting service (JSON-RPC 2.0 over stdio, one request per line)\n\n\
USAGE:\n\
  tv_server [--storage-dir DIR] [--busy-timeout-ms N] [--log-json]\n\
\n\
FLAGS:\n\
  -h, --help       Print this help and exit\n\
  -V, --version    Print version and exit\n\
\n\
ENVIRONMENT:\n\
  TAGVOTE_STORAGE_DIR, TAGVOTE_BUSY_TIMEOUT_MS, TAGVOTE_LOG_JSON,\n\
  TAGVOTE_LOG (falls back to RUST_LOG)\n"
}

fn version_line() -> String {
    format!("{SERVER_NAME} {SERVER_VERSION}")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = std::env::args().collect::<Vec<_>>();
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print!("{}", usage());
        return Ok(());
    }
    if args
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        println!("{}", version_line());
        return Ok(());
    }

    let config = runtime::ServerConfig::from_env();
    logging::init(config.log_json);

    let store = SqliteStore::open_with(
        &config.storage_dir,
        StoreOptions {
            busy_timeout: config.busy_timeout,
        },
    )?;
    tracing::info!(
        storage_dir = %config.storage_dir.display(),
        busy_timeout_ms = config.busy_timeout.as_millis() as u64,
        "{}",
        version_line()
    );

    let mut server = TagServer::new(store);
    let result = stdio::run_stdio(&mut server);
    if let Err(err) = &result {
        tracing::error!(error = %err, "stdio loop terminated");
    }
    result
}
