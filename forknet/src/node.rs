// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Runs the simulator as a supervised child process.

use std::{io, process::Stdio};

use lazy_static::lazy_static;
use regex::Regex;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::{Child, Command},
    sync::oneshot,
    task::JoinHandle,
};

use crate::error::{Error, Result};

const LOG_TARGET: &str = "forknet::node";

lazy_static! {
    static ref LISTENING: Regex = Regex::new(r"Listening on (\S+)").unwrap();
}

/// Port for the given worker: `base + id`, or `base` when the id is missing or not numeric.
pub fn worker_port(base: u16, worker_id: Option<&str>) -> u16 {
    worker_id
        .and_then(|id| id.trim().parse::<u16>().ok())
        .map_or(base, |id| base.saturating_add(id))
}

/// A forked simulator waiting to be started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    program: String,
    host: String,
    port: u16,
    fork_url: String,
    fork_block_number: Option<u64>,
    chain_id: Option<u64>,
    args: Vec<String>,
}

impl Node {
    pub fn new(
        program: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        fork_url: impl Into<String>,
    ) -> Self {
        Self {
            program: program.into(),
            host: host.into(),
            port,
            fork_url: fork_url.into(),
            fork_block_number: None,
            chain_id: None,
            args: Vec::new(),
        }
    }

    pub fn fork_block_number(mut self, block_number: Option<u64>) -> Self {
        self.fork_block_number = block_number;
        self
    }

    pub fn chain_id(mut self, chain_id: Option<u64>) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Extra arguments, passed ahead of the generated ones.
    pub fn extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "--host".into(),
            self.host.clone(),
            "--port".into(),
            self.port.to_string(),
            "--fork-url".into(),
            self.fork_url.clone(),
        ]);
        if let Some(block_number) = self.fork_block_number {
            args.extend(["--fork-block-number".into(), block_number.to_string()]);
        }
        if let Some(chain_id) = self.chain_id {
            args.extend(["--chain-id".into(), chain_id.to_string()]);
        }
        args
    }

    /// Spawns the node and a task supervising it.
    ///
    /// The returned [`NodeTask::ready`] resolves once the node reports its listening address.
    /// It fails if the node exits first, in which case [`NodeTask::run`] holds the reason.
    pub fn start(self) -> Result<NodeTask> {
        log::debug!(target: LOG_TARGET, "{} {}", self.program, self.args().join(" "));
        let mut child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| match err.kind() {
                io::ErrorKind::NotFound => Error::MissingSimulator {
                    program: self.program.clone(),
                },
                _ => err.into(),
            })?;
        let stdout = child.stdout.take().ok_or(Error::NodeNotReady)?;
        let (ready_tx, ready) = oneshot::channel();
        let run = tokio::spawn(supervise(child, stdout, ready_tx));
        Ok(NodeTask { ready, run })
    }
}

/// A started node.
#[derive(Debug)]
pub struct NodeTask {
    pub ready: oneshot::Receiver<ServerReady>,
    pub run: JoinHandle<Result<()>>,
}

/// Sent once the node accepts connections.
#[derive(Debug)]
pub struct ServerReady {
    pub url: String,
    pub server: ServerHandle,
}

/// Keeps the node running. Closing or dropping it stops the node.
#[derive(Debug)]
pub struct ServerHandle {
    shutdown: oneshot::Sender<()>,
}

impl ServerHandle {
    pub fn close(self) {
        let _ = self.shutdown.send(());
    }
}

async fn supervise(
    mut child: Child,
    stdout: tokio::process::ChildStdout,
    ready: oneshot::Sender<ServerReady>,
) -> Result<()> {
    let (shutdown_tx, mut shutdown) = oneshot::channel();
    let mut pending = Some((ready, shutdown_tx));
    let mut lines = BufReader::new(stdout).lines();
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                if let Err(err) = child.kill().await {
                    log::debug!(target: LOG_TARGET, "node already exited: {err}");
                }
                return Ok(());
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    let status = child.wait().await?;
                    return Err(Error::NodeExited(status));
                };
                log::debug!(target: LOG_TARGET, "{line}");
                match (pending.take(), listening_url(&line)) {
                    (Some((ready, shutdown)), Some(url)) => {
                        let server = ServerHandle { shutdown };
                        // The receiver gave up: dropping the handle stops the node.
                        let _ = ready.send(ServerReady { url, server });
                    }
                    (unsent, _) => pending = unsent,
                }
            }
        }
    }
}

fn listening_url(line: &str) -> Option<String> {
    LISTENING
        .captures(line)
        .map(|captures| format!("http://{}", &captures[1]))
}
