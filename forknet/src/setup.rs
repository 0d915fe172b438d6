// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Boots a forked network for a test run and tears it down afterward.

use std::{env, fmt, process::Stdio, sync::Arc, time::Instant};

use serde_json::json;
use tokio::{process::Command, task::JoinHandle};

use crate::{
    accounts::{derive_accounts, DerivedAccount},
    config::{Config, ForkingConfig},
    connection::Connection,
    error::{Error, Result},
    global,
    hardhat::Hardhat,
    node::{worker_port, Node, NodeTask, ServerHandle, ServerReady},
};

/// Above this many accounts, startup time suffers noticeably.
const ADVISORY_THRESHOLD: usize = 4;

/// Lifecycle of a forked network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Unstarted,
    Starting,
    Ready,
    Stopped,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self {
            Self::Unstarted => "unstarted",
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Stopped => "stopped",
        };
        f.write_str(phase)
    }
}

/// Starts a forked network and installs it globally.
pub async fn setup(config: &Config) -> Result<Teardown> {
    let forking = preflight(config).await?;
    start(config, forking).await
}

/// Checks that the simulator runs and that a fork source is configured.
pub async fn preflight(config: &Config) -> Result<ForkingConfig> {
    let program = &config.node.program;
    let runs = Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .is_ok_and(|status| status.success());
    if !runs {
        return Err(Error::MissingSimulator {
            program: program.clone(),
        });
    }
    config.network.forking.clone().ok_or(Error::MissingForking)
}

/// Starts the node on this worker's port, then builds and installs the network handle.
///
/// Accounts are derived while the node boots. If anything fails once the node is running,
/// the node is stopped before the error is returned.
pub async fn start(config: &Config, forking: ForkingConfig) -> Result<Teardown> {
    let started = Instant::now();
    let worker_id = env::var(&config.node.worker_id_var).ok();
    let port = worker_port(config.node.base_port, worker_id.as_deref());
    let NodeTask { ready, run } = Node::new(
        &config.node.program,
        &config.node.host,
        port,
        &forking.url,
    )
    .fork_block_number(forking.block_number)
    .chain_id(config.network.chain_id)
    .extra_args(&config.node.args)
    .start()?;

    let accounts_config = config.network.accounts.clone();
    let derive = tokio::task::spawn_blocking(move || derive_accounts(&accounts_config));
    let (ready, accounts) = tokio::join!(ready, derive);

    let Ok(ServerReady { url, server }) = ready else {
        return Err(match run.await? {
            Err(err) => err,
            Ok(()) => Error::NodeNotReady,
        });
    };
    let hardhat = match initialize(config, forking, url, accounts.map_err(Error::from)).await {
        Ok(hardhat) => hardhat,
        Err(err) => {
            server.close();
            if let Ok(Err(stop)) = run.await {
                log::debug!("node stopped with: {stop}");
            }
            return Err(err);
        }
    };
    log::info!(
        "Initialized forked network in {:.2} s",
        started.elapsed().as_secs_f64()
    );
    Ok(Teardown {
        hardhat,
        server,
        run,
    })
}

async fn initialize(
    config: &Config,
    forking: ForkingConfig,
    url: String,
    accounts: Result<Result<Vec<DerivedAccount>>>,
) -> Result<Arc<Hardhat>> {
    let accounts = accounts??;
    if let Some(advisory) = advisory(accounts.len()) {
        eprintln!("{advisory}");
    }
    let balances = config.network.accounts.balances()?;
    let connection = Connection::new(&url, config.node.polling_interval())?
        .with_chain_id(config.network.chain_id);
    let hardhat = Arc::new(Hardhat::new(url, accounts, balances, connection, forking)?);
    hardhat.seed_accounts().await?;
    if config.network.logging_enabled || verbose() {
        hardhat
            .send("hardhat_setLoggingEnabled", vec![json!(true)])
            .await?;
    }
    global::install(hardhat.clone());
    Ok(hardhat)
}

fn advisory(accounts: usize) -> Option<String> {
    (accounts > ADVISORY_THRESHOLD).then(|| {
        format!(
            "{accounts} accounts specified - consider specifying fewer.\n\
             Specifying multiple accounts will noticeably slow your test startup time.\n"
        )
    })
}

fn verbose() -> bool {
    env::args().skip(1).any(|arg| arg == "--verbose")
}

/// Stops a network started by [`setup`].
#[derive(Debug)]
pub struct Teardown {
    hardhat: Arc<Hardhat>,
    server: ServerHandle,
    run: JoinHandle<Result<()>>,
}

impl Teardown {
    pub fn hardhat(&self) -> &Arc<Hardhat> {
        &self.hardhat
    }

    /// Cancels outstanding polls, stops the node and uninstalls the network.
    pub async fn run(self) -> Result<()> {
        self.hardhat.connection().clear_timers();
        self.server.close();
        let stopped = self.run.await;
        global::release(&self.hardhat);
        stopped??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn config(program: &str) -> Config {
        let mut config = Config::default();
        config.node.program = program.into();
        config
    }

    #[test]
    fn advises_fewer_accounts() {
        assert_eq!(advisory(1), None);
        assert_eq!(advisory(4), None);
        assert_eq!(
            advisory(5).as_deref(),
            Some(
                "5 accounts specified - consider specifying fewer.\n\
                 Specifying multiple accounts will noticeably slow your test startup time.\n"
            )
        );
    }

    #[tokio::test]
    async fn requires_simulator() {
        let result = setup(&config("forknet-missing-simulator")).await;
        assert!(matches!(
            result,
            Err(Error::MissingSimulator { program }) if program == "forknet-missing-simulator"
        ));
    }

    #[tokio::test]
    async fn requires_forking() {
        // Any program that answers `--version` passes the simulator check.
        let result = setup(&config("cargo")).await;
        assert!(matches!(result, Err(Error::MissingForking)));
    }

    #[test]
    fn names_phases() {
        assert_eq!(Phase::default(), Phase::Unstarted);
        assert_eq!(Phase::Ready.to_string(), "ready");
    }
}
