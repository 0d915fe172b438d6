// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use crate::{common_args::ConfigArgs, error::ForknetResult, utils::BOLD};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Block to fork at (overrides the configuration)
    #[arg(long)]
    fork_block_number: Option<u64>,
    /// Port to listen on, before the worker offset (overrides the configuration)
    #[arg(long)]
    port: Option<u16>,

    #[command(flatten)]
    config: ConfigArgs,
}

pub async fn exec(args: Args) -> ForknetResult {
    let mut config = args.config.load()?;
    if let Some(port) = args.port {
        config.node.base_port = port;
    }
    if let (Some(block_number), Some(forking)) =
        (args.fork_block_number, config.network.forking.as_mut())
    {
        forking.block_number = Some(block_number);
    }

    let teardown = forknet::setup(&config).await?;
    let hardhat = teardown.hardhat();
    println!("{BOLD}Listening on{BOLD:#} {}", hardhat.url());
    for (index, account) in hardhat.accounts().iter().enumerate() {
        println!("({index}) {}", account.address());
    }

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down");
    teardown.run().await?;
    Ok(())
}
