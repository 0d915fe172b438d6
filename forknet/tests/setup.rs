// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

#![cfg(feature = "integration-tests")]

mod common;

use std::sync::Arc;

use alloy::providers::Provider;
use common::exclusive;
use eyre::Result;
use forknet::{
    config::AccountsConfig,
    environment::{Environment, HardhatEnvironment},
    Phase,
};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn installs_and_releases_the_network() -> Result<()> {
    let _guard = exclusive().await;
    let teardown = forknet::setup(&common::config()?).await?;
    let installed = forknet::hardhat().expect("installed by setup");
    assert!(Arc::ptr_eq(&installed, teardown.hardhat()));
    assert_eq!(installed.accounts().len(), 2);
    assert_eq!(installed.provider().get_chain_id().await?, 1);

    teardown.run().await?;
    assert!(forknet::hardhat().is_none());
    Ok(())
}

#[tokio::test]
async fn clears_pollers_on_teardown() -> Result<()> {
    let _guard = exclusive().await;
    let teardown = forknet::setup(&common::config()?).await?;
    let connection = teardown.hardhat().connection().clone();
    let mut blocks = connection.on_block();
    assert_eq!(connection.pollers().active(), 1);

    teardown.run().await?;
    assert_eq!(connection.pollers().active(), 0);
    assert_eq!(connection.pollers().listeners(), 0);
    assert_eq!(blocks.recv().await, None);
    Ok(())
}

#[tokio::test]
async fn clears_pollers_on_reset() -> Result<()> {
    let _guard = exclusive().await;
    let teardown = forknet::setup(&common::config()?).await?;
    let hardhat = teardown.hardhat().clone();
    let _blocks = hardhat.connection().on_block();
    hardhat.fork(None).await?;
    assert_eq!(hardhat.connection().pollers().active(), 0);
    teardown.run().await?;
    Ok(())
}

#[tokio::test]
async fn starts_with_many_accounts() -> Result<()> {
    let _guard = exclusive().await;
    let mut config = common::config()?;
    let AccountsConfig::HdWallet(hd) = &mut config.network.accounts else {
        panic!("expected an HD wallet");
    };
    hd.count = 5;
    let teardown = forknet::setup(&config).await?;
    assert_eq!(teardown.hardhat().accounts().len(), 5);
    teardown.run().await?;
    Ok(())
}

#[tokio::test]
async fn enables_logging() -> Result<()> {
    let _guard = exclusive().await;
    let mut config = common::config()?;
    config.network.logging_enabled = true;
    let teardown = forknet::setup(&config).await?;
    teardown.run().await?;
    Ok(())
}

#[tokio::test]
async fn environment_injects_the_network() -> Result<()> {
    let _guard = exclusive().await;
    let mut env = HardhatEnvironment::new(common::config()?);
    env.setup().await?;
    assert_eq!(env.phase(), Phase::Ready);
    let hardhat = env.scope().hardhat().cloned().expect("injected by setup");
    hardhat.fork(None).await?;

    env.teardown().await?;
    assert_eq!(env.phase(), Phase::Stopped);
    assert!(env.scope().hardhat().is_none());
    assert!(forknet::hardhat().is_none());
    Ok(())
}
