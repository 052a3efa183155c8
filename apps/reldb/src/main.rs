//! # reldb server
//!
//! Main entry point for the **reldb** database server: a small multi-client
//! SQL server over single-file paged storage.
//!
//! The engine itself lives under `/crates` of this workspace:
//!
//! - `/crates/storage`: slotted pages, pager, binary helpers.
//! - `/crates/sql`: lexer, parser, statement AST.
//! - `/crates/engine`: catalog, row codec, executor.
//!
//! This binary owns the wire: a TCP acceptor with bounded admission, a
//! fixed-width pool of statement workers, and the line-in / lines-plus-NUL
//! out protocol. Every statement takes the single database mutex for its
//! whole execution, so statements from all clients are totally ordered; the
//! response is buffered under the lock and streamed to the socket outside
//! it.

use crate::config::EngineConfig;
use engine::{Database, ExecOutcome};
use sql::Statement;
use std::error::Error;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpSocket, tcp::OwnedWriteHalf};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

mod config;

/// Listen backlog for the acceptor socket.
const LISTEN_BACKLOG: u32 = 5;

#[tokio::main]
async fn main() {
    let cfg = match EngineConfig::load_from_file("reldb.toml") {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    let _logging_guard = init_logging(&cfg.storage.logs_dir);

    let db = match Database::open(&cfg.storage.data_file) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("could not open database {}: {e}", cfg.storage.data_file.display());
            std::process::exit(1);
        }
    };
    tracing::info!(
        tables = db.tables().len(),
        indexes = db.indexes().len(),
        data_file = %cfg.storage.data_file.display(),
        "database ready"
    );
    let db = Arc::new(Mutex::new(db));

    // Statement workers: how many statements may be executing at once. The
    // admission semaphore bounds connections the way the dispatch queue in
    // front of a fixed pool would; with no permit left, the connection is
    // dropped on the floor.
    let workers = Arc::new(Semaphore::new(cfg.server.workers.get()));
    let connections = Arc::new(Semaphore::new(cfg.server.max_connections.get()));

    let shutdown = CancellationToken::new();

    // Spawn a task that waits for OS shutdown signals and triggers cancellation.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            tracing::info!("shutdown signal received; beginning graceful shutdown");
            shutdown.cancel();
        });
    }

    let listener = match bind_listener(&cfg.server.listen_addr) {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("could not listen on {}: {e}", cfg.server.listen_addr);
            std::process::exit(1);
        }
    };
    tracing::info!("listening on {:?}", listener.local_addr());

    let mut sessions = JoinSet::new();

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("stop accepting new connections");
                break;
            }

            res = listener.accept() => {
                let (socket, addr) = match res {
                    Ok(v) => v,
                    Err(e) => {
                        if shutdown.is_cancelled() { break; }
                        tracing::warn!("accept failed: {e}");
                        continue;
                    }
                };

                // Bounded admission: a full house drops the connection.
                let Ok(permit) = connections.clone().try_acquire_owned() else {
                    tracing::warn!(%addr, "connection limit reached; connection dropped");
                    drop(socket);
                    continue;
                };

                let db = db.clone();
                let workers = workers.clone();
                let shutdown = shutdown.clone();

                sessions.spawn(async move {
                    tracing::info!(%addr, "client connected");
                    handle_client(socket, addr, db, workers, shutdown).await;
                    tracing::info!(%addr, "client disconnected");
                    drop(permit);
                });
            }
        }
    }

    tracing::info!("waiting for existing connections to finish");
    while let Some(res) = sessions.join_next().await {
        if let Err(join_err) = res {
            tracing::warn!("session task ended with error: {join_err}");
        }
    }

    tracing::info!("shutdown complete");
}

/// Binds the acceptor with SO_REUSEADDR/SO_REUSEPORT and a short backlog.
fn bind_listener(addr: &str) -> Result<TcpListener, Box<dyn Error + Send + Sync>> {
    let addr: SocketAddr = addr.parse()?;

    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };
    socket.set_reuseaddr(true)?;
    #[cfg(unix)]
    socket.set_reuseport(true)?;
    socket.bind(addr)?;

    Ok(socket.listen(LISTEN_BACKLOG)?)
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt()).expect("sigint handler");
        let mut sigterm = signal(SignalKind::terminate()).expect("sigterm handler");

        tokio::select! {
            _ = sigint.recv() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("ctrl_c handler");
    }
}

/// One connection end to end: read a statement line, run it under a worker
/// permit, write the buffered response (rows, status line, NUL terminator).
async fn handle_client(
    socket: tokio::net::TcpStream,
    addr: SocketAddr,
    db: Arc<Mutex<Database>>,
    workers: Arc<Semaphore>,
    shutdown: CancellationToken,
) {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    loop {
        line.clear();

        let read_res = tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!(%addr, "shutdown: stop reading new statements");
                return;
            }
            r = reader.read_line(&mut line) => r,
        };

        match read_res {
            Ok(0) => break, // client closed the connection
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(%addr, "error while reading from socket: {e}");
                break;
            }
        }

        let statement = line.trim();
        if statement.is_empty() {
            continue;
        }
        tracing::info!(%addr, statement, "statement received");

        let permit = tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!(%addr, "shutdown: refuse starting new statement");
                return;
            }
            p = workers.clone().acquire_owned() => match p {
                Ok(p) => p,
                Err(_) => return, // semaphore closed: shutting down
            },
        };

        if !run_statement(&mut writer, addr, &db, statement, permit).await {
            break;
        }
    }
}

/// Executes one statement on the blocking pool and writes its response.
/// Returns false when the connection should end.
async fn run_statement(
    writer: &mut OwnedWriteHalf,
    addr: SocketAddr,
    db: &Arc<Mutex<Database>>,
    statement: &str,
    permit: OwnedSemaphorePermit,
) -> bool {
    let db = db.clone();
    let text = statement.to_string();

    let response = match task::spawn_blocking(move || process_statement(&db, &text)).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(%addr, "statement task failed: {e}");
            return false;
        }
    };
    drop(permit);

    if let Err(e) = writer.write_all(&response).await {
        tracing::info!(%addr, "client went away mid-response: {e}");
        return false;
    }
    true
}

/// Parse + execute + frame one statement. Runs on the blocking pool; takes
/// the database mutex for the whole execution. Rows and the status line are
/// buffered here and streamed to the socket by the caller, so a slow reader
/// never holds the lock.
fn process_statement(db: &Mutex<Database>, text: &str) -> Vec<u8> {
    let mut response = Vec::new();

    match sql::parse_statement(text) {
        Err(e) => {
            response.extend_from_slice(format!("Error: {e}\n").as_bytes());
        }
        Ok(statement) => {
            let mut db = match db.lock() {
                Ok(guard) => guard,
                // A poisoned lock means some statement panicked; the data on
                // disk is still write-through consistent, keep serving.
                Err(poisoned) => poisoned.into_inner(),
            };

            match engine::execute(&mut db, &statement, &mut response) {
                Ok(outcome) => {
                    // A successful SELECT is just its rows; everything else
                    // gets a status line.
                    let silent = outcome.is_success() && matches!(statement, Statement::Select(_));
                    if !silent {
                        response.extend_from_slice(outcome.status_line().as_bytes());
                    }
                }
                Err(e) => {
                    tracing::error!("execution failed: {e}");
                    response.extend_from_slice(ExecOutcome::Fail.status_line().as_bytes());
                }
            }
        }
    }

    // End-of-response marker.
    response.push(0);
    response
}

/// Sets up the logging for the server: compact console output plus a daily
/// rolling JSON file.
fn init_logging(log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, "reldb.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_level(true)
        .compact();

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .json()
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}
