// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use crate::error::ForknetResult;

mod accounts;
mod node;

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Print the accounts derived from the configuration
    #[clap(visible_alias = "a")]
    Accounts(accounts::Args),
    /// Run a forked node until interrupted
    #[clap(visible_alias = "n")]
    Node(node::Args),
}

pub async fn exec(cmd: Command) -> ForknetResult {
    match cmd {
        Command::Accounts(args) => accounts::exec(args),
        Command::Node(args) => node::exec(args).await,
    }
}
