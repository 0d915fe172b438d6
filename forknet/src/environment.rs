// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Test environments: setup and teardown hooks around an isolated scope.
//!
//! [`HardhatEnvironment`] wraps any other [`Environment`] and adds a forked network to it:
//!
//! ```no_run
//! use forknet::{environment::{Environment, HardhatEnvironment}, Config};
//!
//! # async fn example() -> forknet::Result<()> {
//! let mut env = HardhatEnvironment::new(Config::discover()?);
//! env.setup().await?;
//! let hardhat = env.scope().hardhat().cloned().expect("installed by setup");
//! hardhat.fork(None).await?;
//! env.teardown().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use crate::{
    config::Config,
    error::Result,
    hardhat::Hardhat,
    setup::{self, Phase, Teardown},
};

/// Setup and teardown hooks run around a test file.
#[allow(async_fn_in_trait)]
pub trait Environment {
    async fn setup(&mut self) -> Result<()>;
    async fn teardown(&mut self) -> Result<()>;
    /// Values visible to the tests run in this environment.
    fn scope(&self) -> &Scope;
    fn scope_mut(&mut self) -> &mut Scope;
}

#[derive(Clone, Debug, Default)]
pub struct Scope {
    hardhat: Option<Arc<Hardhat>>,
}

impl Scope {
    pub fn hardhat(&self) -> Option<&Arc<Hardhat>> {
        self.hardhat.as_ref()
    }

    pub fn set_hardhat(&mut self, hardhat: Arc<Hardhat>) {
        self.hardhat = Some(hardhat);
    }

    pub fn clear(&mut self) {
        self.hardhat = None;
    }
}

/// An environment with nothing beyond its scope.
#[derive(Debug, Default)]
pub struct NodeEnvironment {
    scope: Scope,
}

impl Environment for NodeEnvironment {
    async fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    async fn teardown(&mut self) -> Result<()> {
        self.scope.clear();
        Ok(())
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }
}

/// Adds a forked network to a base environment.
#[derive(Debug)]
pub struct HardhatEnvironment<E = NodeEnvironment> {
    base: E,
    config: Config,
    teardown: Option<Teardown>,
    phase: Phase,
}

impl HardhatEnvironment {
    pub fn new(config: Config) -> Self {
        Self::with_base(NodeEnvironment::default(), config)
    }
}

impl<E: Environment> HardhatEnvironment<E> {
    pub fn with_base(base: E, config: Config) -> Self {
        Self {
            base,
            config,
            teardown: None,
            phase: Phase::Unstarted,
        }
    }

    pub fn base(&self) -> &E {
        &self.base
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn transition(&mut self, phase: Phase) {
        log::debug!("forked network {} -> {phase}", self.phase);
        self.phase = phase;
    }
}

impl<E: Environment> Environment for HardhatEnvironment<E> {
    async fn setup(&mut self) -> Result<()> {
        self.base.setup().await?;
        let forking = setup::preflight(&self.config).await?;
        self.transition(Phase::Starting);
        let teardown = match setup::start(&self.config, forking).await {
            Ok(teardown) => teardown,
            Err(err) => {
                self.transition(Phase::Stopped);
                return Err(err);
            }
        };
        self.base.scope_mut().set_hardhat(teardown.hardhat().clone());
        self.teardown = Some(teardown);
        self.transition(Phase::Ready);
        Ok(())
    }

    async fn teardown(&mut self) -> Result<()> {
        let stopped = match self.teardown.take() {
            Some(teardown) => {
                let stopped = teardown.run().await;
                self.transition(Phase::Stopped);
                stopped
            }
            None => Ok(()),
        };
        self.base.scope_mut().clear();
        self.base.teardown().await?;
        stopped
    }

    fn scope(&self) -> &Scope {
        self.base.scope()
    }

    fn scope_mut(&mut self) -> &mut Scope {
        self.base.scope_mut()
    }
}
